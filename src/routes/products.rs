use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductList, ProductListQuery},
    error::{AppError, AppResult},
    models::Product,
    response::ApiResponse,
    state::AppState,
    store::ProductQuery,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/featured", get(featured_products))
        .route("/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("category" = Option<String>, Query, description = "Category slug"),
        ("featured" = Option<bool>, Query, description = "Only featured products"),
        ("q" = Option<String>, Query, description = "Search name and description"),
        ("sort" = Option<String>, Query, description = "name, price-low, price-high, newest"),
        ("limit" = Option<u64>, Query, description = "At most this many products, 1-100"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Json<ApiResponse<ProductList>> {
    let query = ProductQuery::from(query);
    let mut catalog = state.catalog();
    let items = catalog.load_products(&query).await.to_vec();
    Json(ApiResponse::catalog(ProductList { items }, catalog.is_fallback()))
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses(
        (status = 200, description = "Featured products for the home page", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn featured_products(State(state): State<AppState>) -> Json<ApiResponse<ProductList>> {
    let mut catalog = state.catalog();
    let items = catalog.load_featured().await.to_vec();
    Json(ApiResponse::catalog(ProductList { items }, catalog.is_fallback()))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.catalog().product(id).await.ok_or(AppError::NotFound)?;
    Ok(Json(ApiResponse::success("OK", product, None)))
}
