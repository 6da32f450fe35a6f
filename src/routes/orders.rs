use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::orders::OrderList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderWithItems,
    response::{ApiResponse, Meta},
    state::AppState,
    store::{CheckoutForm, orders::order_history, submit_checkout},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Order history for current user, newest first", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let items = order_history(&state.gateway, &user.session()).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        OrderList { items },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutForm,
    responses(
        (status = 201, description = "Order placed from the current cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart or missing shipping details"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<CheckoutForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let mut cart = state.cart(&user);
    cart.refresh().await?;
    let placed = submit_checkout(&mut cart, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Order placed", placed, None)),
    ))
}
