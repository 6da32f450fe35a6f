use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sign in required")]
    NotSignedIn,

    /// The session carries an identifier the gateway cannot key rows by.
    #[error("identity is not confirmed yet")]
    UnconfirmedIdentity,

    #[error("cart is empty")]
    EmptyCart,

    #[error("cart item {0} has no product details")]
    IncompleteCart(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
