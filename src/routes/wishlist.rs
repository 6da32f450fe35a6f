use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{WishlistToggle, WishlistView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/{product_id}", post(add_to_wishlist).delete(remove_from_wishlist))
        .route("/{product_id}/toggle", post(toggle_wishlist))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses(
        (status = 200, description = "Saved products for current user", body = ApiResponse<WishlistView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<WishlistView>>> {
    let mut wishlist = state.wishlist(&user);
    wishlist.refresh().await?;
    Ok(Json(ApiResponse::success(
        "OK",
        WishlistView::from(&wishlist),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Saved to wishlist", body = ApiResponse<WishlistView>),
        (status = 409, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistView>>> {
    let mut wishlist = state.wishlist(&user);
    wishlist.add(product_id).await?;
    Ok(Json(ApiResponse::success(
        "Added to wishlist",
        WishlistView::from(&wishlist),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed from wishlist", body = ApiResponse<WishlistView>),
        (status = 404, description = "Not in wishlist"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistView>>> {
    let mut wishlist = state.wishlist(&user);
    wishlist.remove(product_id).await?;
    Ok(Json(ApiResponse::success(
        "Removed from wishlist",
        WishlistView::from(&wishlist),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{product_id}/toggle",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Membership after the toggle", body = ApiResponse<WishlistToggle>),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistToggle>>> {
    let mut wishlist = state.wishlist(&user);
    wishlist.refresh().await?;
    let saved = wishlist.toggle(product_id).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        WishlistToggle { product_id, saved },
        None,
    )))
}
