use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{Category, Product},
    store::{ProductQuery, ProductSort},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductListQuery {
    /// Category slug
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// Case-insensitive match on name or description
    pub q: Option<String>,
    pub sort: Option<ProductSort>,
    pub limit: Option<u64>,
}

impl From<ProductListQuery> for ProductQuery {
    fn from(query: ProductListQuery) -> Self {
        ProductQuery {
            category_slug: query.category,
            featured_only: query.featured,
            search: query.q,
            sort: query.sort,
            limit: query.limit.map(|l| l.clamp(1, 100)),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SortQuery {
    pub sort: Option<ProductSort>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryProducts {
    pub category: Option<Category>,
    pub items: Vec<Product>,
}
