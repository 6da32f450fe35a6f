//! Remote data gateway: the row store that owns every persisted entity.
//!
//! Stores never hold authoritative data; they read through a [`Gateway`] and
//! re-fetch after each mutation. Two adapters exist: [`DbGateway`] over
//! Postgres via SeaORM, and [`MemoryGateway`] for tests and offline runs.
//! [`Backend`] picks one at the composition root.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CartItem, Category, DashboardStats, Order, OrderStatus, OrderWithItems, PaymentMethod,
    Product, Role, UserProfile, WishlistItem,
};

mod backend;
mod db;
mod memory;

pub use backend::Backend;
pub use db::DbGateway;
pub use memory::MemoryGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("row not found")]
    NotFound,

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("ORM error")]
    Orm(#[from] sea_orm::DbErr),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Row filter for product listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub featured_only: bool,
    pub search: Option<String>,
    pub limit: Option<u64>,
}

impl ProductFilter {
    /// Normalized search needle, `None` when blank.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Applies every predicate except `limit`.
    pub fn matches(&self, product: &Product) -> bool {
        if self.featured_only && !product.featured {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != Some(category_id) {
                return false;
            }
        }
        match self.needle() {
            Some(needle) => {
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub image_url: String,
    pub specifications: BTreeMap<String, String>,
    pub stock: i32,
    pub featured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A profile together with its password hash, for the self-hosted auth flow.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub profile: UserProfile,
    pub password_hash: Option<String>,
}

pub trait Gateway: Clone + Send + Sync + 'static {
    // catalog
    fn list_categories(&self) -> impl Future<Output = GatewayResult<Vec<Category>>> + Send;
    fn category_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = GatewayResult<Option<Category>>> + Send;
    fn insert_category(
        &self,
        input: NewCategory,
    ) -> impl Future<Output = GatewayResult<Category>> + Send;
    fn delete_category(&self, id: Uuid) -> impl Future<Output = GatewayResult<()>> + Send;
    fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = GatewayResult<Vec<Product>>> + Send;
    fn product_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = GatewayResult<Option<Product>>> + Send;
    fn insert_product(
        &self,
        input: NewProduct,
    ) -> impl Future<Output = GatewayResult<Product>> + Send;
    fn update_product(
        &self,
        id: Uuid,
        input: ProductUpdate,
    ) -> impl Future<Output = GatewayResult<Product>> + Send;
    fn delete_product(&self, id: Uuid) -> impl Future<Output = GatewayResult<()>> + Send;

    // cart
    fn cart_items(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = GatewayResult<Vec<CartItem>>> + Send;
    /// Inserts a row, or adds `quantity` to the existing row for the same product.
    fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
    fn update_cart_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
    fn delete_cart_item(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
    fn clear_cart(&self, user_id: Uuid) -> impl Future<Output = GatewayResult<()>> + Send;

    // wishlist
    fn wishlist_items(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = GatewayResult<Vec<WishlistItem>>> + Send;
    fn insert_wishlist_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
    fn delete_wishlist_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    // orders
    /// Writes the order, its items and empties the user's cart as one unit.
    fn place_order(
        &self,
        input: NewOrder,
    ) -> impl Future<Output = GatewayResult<OrderWithItems>> + Send;
    fn orders_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = GatewayResult<Vec<OrderWithItems>>> + Send;
    fn all_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> impl Future<Output = GatewayResult<Vec<OrderWithItems>>> + Send;
    fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> impl Future<Output = GatewayResult<Order>> + Send;

    // profiles
    fn profile_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = GatewayResult<Option<UserProfile>>> + Send;
    fn credentials_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = GatewayResult<Option<StoredCredentials>>> + Send;
    fn insert_profile(
        &self,
        input: NewProfile,
    ) -> impl Future<Output = GatewayResult<UserProfile>> + Send;
    fn update_profile(
        &self,
        id: Uuid,
        input: ProfileUpdate,
    ) -> impl Future<Output = GatewayResult<UserProfile>> + Send;
    fn list_profiles(
        &self,
        roles: &[Role],
    ) -> impl Future<Output = GatewayResult<Vec<UserProfile>>> + Send;
    fn set_role(
        &self,
        id: Uuid,
        role: Role,
    ) -> impl Future<Output = GatewayResult<UserProfile>> + Send;

    fn dashboard_stats(&self) -> impl Future<Output = GatewayResult<DashboardStats>> + Send;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn product(name: &str, description: &str, featured: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            price: Decimal::ONE,
            category_id: None,
            image_url: String::new(),
            specifications: BTreeMap::new(),
            stock: 1,
            featured,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn search_matches_name_or_description_ignoring_case() {
        let filter = ProductFilter {
            search: Some("  SMART ".into()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product("LG 43\" Smart TV", "", false)));
        assert!(filter.matches(&product("Fridge", "smart cooling", false)));
        assert!(!filter.matches(&product("Oven", "digital", false)));
    }

    #[test]
    fn blank_search_matches_everything() {
        let filter = ProductFilter {
            search: Some("   ".into()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.needle(), None);
        assert!(filter.matches(&product("Oven", "digital", false)));
    }

    #[test]
    fn featured_filter_excludes_regular_products() {
        let filter = ProductFilter {
            featured_only: true,
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product("AC", "", true)));
        assert!(!filter.matches(&product("AC", "", false)));
    }
}
