use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    state::AppState,
    store::profile::{ProfileEdit, load_profile, update_profile},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(edit_profile))
}

#[utoipa::path(
    get,
    path = "/api/account/profile",
    responses(
        (status = 200, description = "Profile of current user", body = ApiResponse<UserProfile>)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = load_profile(&state.gateway, &user.session()).await?;
    Ok(Json(ApiResponse::success("OK", profile, None)))
}

#[utoipa::path(
    put,
    path = "/api/account/profile",
    request_body = ProfileEdit,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn edit_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(edit): Json<ProfileEdit>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = update_profile(&state.gateway, &user.session(), edit).await?;
    Ok(Json(ApiResponse::success("Profile updated", profile, None)))
}
