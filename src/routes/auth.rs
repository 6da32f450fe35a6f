use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    identity::{ExternalUser, Registration},
    middleware::auth::AuthUser,
    models::{Identity, UserProfile},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/external", post(external_sign_in))
        .route("/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = Registration,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Registration>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let profile = state.auth.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created", profile, None)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let signed_in = state.auth.login(&payload.email, &payload.password).await?;
    let resp = LoginResponse {
        token: format!("Bearer {}", signed_in.token),
        identity: signed_in.identity,
    };
    Ok(Json(ApiResponse::success("Logged in", resp, Some(Meta::empty()))))
}

const PROVIDER_SECRET_HEADER: &str = "x-provider-secret";

#[utoipa::path(
    post,
    path = "/api/auth/external",
    request_body = ExternalUser,
    params(
        ("x-provider-secret" = String, Header, description = "Shared provider secret")
    ),
    responses(
        (status = 200, description = "Provider user bridged to a profile", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Wrong provider secret"),
        (status = 404, description = "Provider exchange is not configured")
    ),
    tag = "Auth"
)]
pub async fn external_sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ExternalUser>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let expected = state.provider_secret.as_deref().ok_or(AppError::NotFound)?;
    let presented = headers
        .get(PROVIDER_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if presented != Some(expected) {
        tracing::warn!(provider_id = %payload.id, "provider exchange refused");
        return Err(AppError::Unauthorized("Invalid provider secret".into()));
    }

    let signed_in = state.auth.sign_in_external(&payload).await?;
    let resp = LoginResponse {
        token: format!("Bearer {}", signed_in.token),
        identity: signed_in.identity,
    };
    Ok(Json(ApiResponse::success("Logged in", resp, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current identity", body = ApiResponse<Identity>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::success("OK", user.identity, None))
}
