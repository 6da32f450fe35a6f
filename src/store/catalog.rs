use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StoreResult, fallback};
use crate::{
    gateway::{Gateway, ProductFilter},
    models::{Category, Product},
};

pub const FEATURED_LIMIT: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    Name,
    PriceLow,
    PriceHigh,
    Newest,
}

impl ProductSort {
    pub fn apply(self, products: &mut [Product]) {
        products.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ProductSort::PriceLow => a.price.cmp(&b.price),
            ProductSort::PriceHigh => b.price.cmp(&a.price),
            ProductSort::Newest => b.created_at.cmp(&a.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub category_slug: Option<String>,
    pub featured_only: bool,
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
    pub limit: Option<u64>,
}

impl ProductQuery {
    pub fn featured() -> Self {
        Self {
            featured_only: true,
            limit: Some(FEATURED_LIMIT),
            ..Self::default()
        }
    }

    pub fn in_category(slug: impl Into<String>) -> Self {
        Self {
            category_slug: Some(slug.into()),
            ..Self::default()
        }
    }

    fn slug(&self) -> Option<&str> {
        self.category_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn filter(&self, category_id: Option<Uuid>) -> ProductFilter {
        ProductFilter {
            category_id,
            featured_only: self.featured_only,
            search: self.search.clone(),
            limit: self.limit,
        }
    }

    /// Empty results for a search or for a stored category are answers, not outages.
    fn empty_means_fallback(&self) -> bool {
        self.filter(None).needle().is_none() && self.slug().is_none()
    }
}

/// Read-through cache of categories and the last product listing.
///
/// Gateway failures never surface here: the cache switches to the built-in
/// sample catalog and records that it did so.
pub struct CatalogCache<G> {
    gateway: G,
    categories: Vec<Category>,
    products: Vec<Product>,
    using_fallback: bool,
}

impl<G: Gateway> CatalogCache<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            categories: Vec::new(),
            products: Vec::new(),
            using_fallback: false,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Whether the last load served sample data.
    pub fn is_fallback(&self) -> bool {
        self.using_fallback
    }

    pub async fn load_categories(&mut self) -> &[Category] {
        self.categories = match self.gateway.list_categories().await {
            Ok(categories) if !categories.is_empty() => {
                self.using_fallback = false;
                categories
            }
            Ok(_) => {
                tracing::debug!("no categories stored, serving sample catalog");
                self.using_fallback = true;
                fallback::sample_categories()
            }
            Err(err) => {
                tracing::warn!(error = %err, "category load failed, serving sample catalog");
                self.using_fallback = true;
                fallback::sample_categories()
            }
        };
        &self.categories
    }

    pub async fn load_products(&mut self, query: &ProductQuery) -> &[Product] {
        let mut products = match self.fetch_products(query).await {
            Ok(Some(products)) if !products.is_empty() || !query.empty_means_fallback() => {
                self.using_fallback = false;
                products
            }
            Ok(_) => {
                tracing::debug!(slug = ?query.slug(), "nothing stored, serving sample catalog");
                self.using_fallback = true;
                sample_products_matching(query)
            }
            Err(err) => {
                tracing::warn!(error = %err, "product load failed, serving sample catalog");
                self.using_fallback = true;
                sample_products_matching(query)
            }
        };
        if let Some(sort) = query.sort {
            sort.apply(&mut products);
        }
        self.products = products;
        &self.products
    }

    pub async fn load_featured(&mut self) -> &[Product] {
        self.load_products(&ProductQuery::featured()).await
    }

    /// Category header plus its listing; the category is `None` for unknown slugs.
    pub async fn load_category_products(
        &mut self,
        slug: &str,
        sort: Option<ProductSort>,
    ) -> (Option<Category>, &[Product]) {
        let category = match self.gateway.category_by_slug(slug).await {
            Ok(Some(category)) => Some(category),
            Ok(None) | Err(_) => sample_category(slug),
        };
        let query = ProductQuery {
            sort,
            ..ProductQuery::in_category(slug)
        };
        let products = self.load_products(&query).await;
        (category, products)
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        match self.gateway.product_by_id(id).await {
            Ok(Some(product)) => Some(product),
            Ok(None) => sample_product(id),
            Err(err) => {
                tracing::warn!(error = %err, product_id = %id, "product load failed");
                sample_product(id)
            }
        }
    }

    /// `None` when the query names a category the gateway does not know.
    async fn fetch_products(&self, query: &ProductQuery) -> StoreResult<Option<Vec<Product>>> {
        let category_id = match query.slug() {
            Some(slug) => match self.gateway.category_by_slug(slug).await? {
                Some(category) => Some(category.id),
                None => return Ok(None),
            },
            None => None,
        };
        let products = self.gateway.list_products(&query.filter(category_id)).await?;
        Ok(Some(products))
    }
}

fn sample_category(slug: &str) -> Option<Category> {
    fallback::sample_categories()
        .into_iter()
        .find(|c| c.slug == slug)
}

fn sample_product(id: Uuid) -> Option<Product> {
    fallback::sample_products().into_iter().find(|p| p.id == id)
}

fn sample_products_matching(query: &ProductQuery) -> Vec<Product> {
    let category_id = match query.slug() {
        Some(slug) => match sample_category(slug) {
            Some(category) => Some(category.id),
            None => return Vec::new(),
        },
        None => None,
    };
    let filter = query.filter(category_id);
    let limit = filter
        .limit
        .and_then(|l| usize::try_from(l).ok())
        .unwrap_or(usize::MAX);
    fallback::sample_products()
        .into_iter()
        .filter(|p| filter.matches(p))
        .take(limit)
        .collect()
}
