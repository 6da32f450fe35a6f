use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::products::{CategoryList, CategoryProducts, SortQuery},
    response::ApiResponse,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{slug}/products", get(category_products))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<ApiResponse<CategoryList>> {
    let mut catalog = state.catalog();
    let items = catalog.load_categories().await.to_vec();
    Json(ApiResponse::catalog(CategoryList { items }, catalog.is_fallback()))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/products",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("sort" = Option<String>, Query, description = "name, price-low, price-high, newest"),
    ),
    responses(
        (status = 200, description = "Category header and its products", body = ApiResponse<CategoryProducts>)
    ),
    tag = "Categories"
)]
pub async fn category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<SortQuery>,
) -> Json<ApiResponse<CategoryProducts>> {
    let mut catalog = state.catalog();
    let (category, items) = catalog.load_category_products(&slug, query.sort).await;
    let data = CategoryProducts {
        category,
        items: items.to_vec(),
    };
    Json(ApiResponse::catalog(data, catalog.is_fallback()))
}
