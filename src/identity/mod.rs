//! Identity capability: who is signed in, and the two ways to become signed in.
//!
//! [`Session`] is the single shared value every store observes. It is created
//! at the composition root (or per request) and handed to store constructors.

mod external;
mod local;
mod session;

pub use external::{ExternalEmail, ExternalUser};
pub use local::{Claims, LocalAuth, Registration, SignedIn};
pub use session::Session;
