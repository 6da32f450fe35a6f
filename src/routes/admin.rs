use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{OrderListQuery, ProfileList, SetRoleRequest, UpdateOrderStatusRequest},
        orders::OrderList,
        products::CategoryList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Category, DashboardStats, Order, Product, UserProfile},
    response::{ApiResponse, Meta},
    state::AppState,
    store::admin::{CategoryDraft, ProductDraft, ProductPatch},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/products", axum::routing::post(create_product))
        .route("/products/{id}", patch(update_product).delete(delete_product))
        .route("/staff", get(list_staff))
        .route("/users", get(list_users))
        .route("/users/{id}/role", put(set_role))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let stats = state.admin(&user).stats().await?;
    Ok(Json(ApiResponse::success("OK", stats, None)))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "All orders, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let orders = state.admin(&user).orders(query.status).await?;
    let (items, paging) = query.pagination().slice(orders);
    Ok(Json(ApiResponse::success(
        "OK",
        OrderList { items },
        Some(Meta::paged(paging)),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<Order>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .admin(&user)
        .set_order_status(id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success("Order status updated", order, None)))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "Stored categories", body = ApiResponse<CategoryList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = state.admin(&user).categories().await?;
    Ok(Json(ApiResponse::success(
        "OK",
        CategoryList { items },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryDraft,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Slug already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<CategoryDraft>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = state.admin(&user).create_category(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Category created", category, None)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    state.admin(&user).delete_category(id).await?;
    Ok(Json(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductDraft,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<ProductDraft>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = state.admin(&user).create_product(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created", product, None)),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.admin(&user).update_product(id, patch).await?;
    Ok(Json(ApiResponse::success("Product updated", product, None)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    state.admin(&user).delete_product(id).await?;
    Ok(Json(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/staff",
    responses(
        (status = 200, description = "Staff and admin accounts (admin only)", body = ApiResponse<ProfileList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileList>>> {
    let items = state.admin(&user).staff().await?;
    Ok(Json(ApiResponse::success(
        "OK",
        ProfileList { items },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Every account (admin only)", body = ApiResponse<ProfileList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileList>>> {
    let items = state.admin(&user).users().await?;
    Ok(Json(ApiResponse::success(
        "OK",
        ProfileList { items },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role changed (admin only)", body = ApiResponse<UserProfile>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRoleRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.admin(&user).set_role(id, payload.role).await?;
    Ok(Json(ApiResponse::success("Role updated", profile, None)))
}
