use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Identity;

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub identity: Identity,
}
