use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    gateway::GatewayError,
    response::{ApiResponse, Meta},
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict {0}")]
    Conflict(String),

    #[error("Service Unavailable")]
    Unavailable,

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotSignedIn => AppError::Unauthorized(err.to_string()),
            StoreError::InvalidCredentials | StoreError::InvalidToken => {
                AppError::Unauthorized(err.to_string())
            }
            StoreError::UnconfirmedIdentity => AppError::Forbidden,
            StoreError::Forbidden => AppError::Forbidden,
            StoreError::EmptyCart
            | StoreError::IncompleteCart(_)
            | StoreError::Validation(_) => AppError::BadRequest(err.to_string()),
            StoreError::Gateway(GatewayError::NotFound) => AppError::NotFound,
            StoreError::Gateway(GatewayError::Rejected(reason)) => AppError::Conflict(reason),
            StoreError::Gateway(GatewayError::Unavailable(reason)) => {
                tracing::error!(reason = %reason, "gateway unavailable");
                AppError::Unavailable
            }
            StoreError::Gateway(other) => AppError::Internal(other.into()),
            StoreError::Internal(reason) => AppError::Internal(anyhow::anyhow!(reason)),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = ApiResponse {
            message,
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_statuses() {
        let status = |err: StoreError| AppError::from(err).into_response().status();
        assert_eq!(status(StoreError::NotSignedIn), StatusCode::UNAUTHORIZED);
        assert_eq!(status(StoreError::UnconfirmedIdentity), StatusCode::FORBIDDEN);
        assert_eq!(status(StoreError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(StoreError::Gateway(GatewayError::Rejected("out of stock".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(StoreError::Gateway(GatewayError::Unavailable("offline".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(StoreError::Gateway(GatewayError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }
}
