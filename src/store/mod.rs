//! Client-side state stores. Each store reads through a [`Gateway`], keeps the
//! last good snapshot for rendering, and re-fetches after every mutation.
//!
//! [`Gateway`]: crate::gateway::Gateway

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
mod error;
pub mod fallback;
pub mod orders;
pub mod profile;
pub mod wishlist;

use uuid::Uuid;

use crate::identity::Session;

pub use admin::AdminConsole;
pub use cart::CartStore;
pub use catalog::{CatalogCache, ProductQuery, ProductSort};
pub use checkout::{CheckoutForm, submit_checkout};
pub use error::{StoreError, StoreResult};
pub use wishlist::WishlistStore;

/// Gateway user key for the signed-in identity.
pub(crate) fn confirmed_user(session: &Session) -> StoreResult<Uuid> {
    let identity = session.current_identity().ok_or(StoreError::NotSignedIn)?;
    identity.user_id().ok_or(StoreError::UnconfirmedIdentity)
}
