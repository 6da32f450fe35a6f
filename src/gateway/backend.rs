use uuid::Uuid;

use super::{
    DbGateway, Gateway, GatewayResult, MemoryGateway, NewCategory, NewOrder, NewProduct,
    NewProfile, ProductFilter, ProductUpdate, ProfileUpdate, StoredCredentials,
};
use crate::models::{
    CartItem, Category, DashboardStats, Order, OrderStatus, OrderWithItems, Product, Role,
    UserProfile, WishlistItem,
};

/// The gateway chosen at startup: Postgres when configured, memory otherwise.
#[derive(Clone)]
pub enum Backend {
    Db(DbGateway),
    Memory(MemoryGateway),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Db(_) => "postgres",
            Backend::Memory(_) => "memory",
        }
    }
}

impl From<DbGateway> for Backend {
    fn from(gateway: DbGateway) -> Self {
        Backend::Db(gateway)
    }
}

impl From<MemoryGateway> for Backend {
    fn from(gateway: MemoryGateway) -> Self {
        Backend::Memory(gateway)
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            Backend::Db(g) => g.$method($($arg),*).await,
            Backend::Memory(g) => g.$method($($arg),*).await,
        }
    };
}

impl Gateway for Backend {
    async fn list_categories(&self) -> GatewayResult<Vec<Category>> {
        dispatch!(self, list_categories())
    }

    async fn category_by_slug(&self, slug: &str) -> GatewayResult<Option<Category>> {
        dispatch!(self, category_by_slug(slug))
    }

    async fn insert_category(&self, input: NewCategory) -> GatewayResult<Category> {
        dispatch!(self, insert_category(input))
    }

    async fn delete_category(&self, id: Uuid) -> GatewayResult<()> {
        dispatch!(self, delete_category(id))
    }

    async fn list_products(&self, filter: &ProductFilter) -> GatewayResult<Vec<Product>> {
        dispatch!(self, list_products(filter))
    }

    async fn product_by_id(&self, id: Uuid) -> GatewayResult<Option<Product>> {
        dispatch!(self, product_by_id(id))
    }

    async fn insert_product(&self, input: NewProduct) -> GatewayResult<Product> {
        dispatch!(self, insert_product(input))
    }

    async fn update_product(&self, id: Uuid, input: ProductUpdate) -> GatewayResult<Product> {
        dispatch!(self, update_product(id, input))
    }

    async fn delete_product(&self, id: Uuid) -> GatewayResult<()> {
        dispatch!(self, delete_product(id))
    }

    async fn cart_items(&self, user_id: Uuid) -> GatewayResult<Vec<CartItem>> {
        dispatch!(self, cart_items(user_id))
    }

    async fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> GatewayResult<()> {
        dispatch!(self, add_to_cart(user_id, product_id, quantity))
    }

    async fn update_cart_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> GatewayResult<()> {
        dispatch!(self, update_cart_quantity(user_id, cart_item_id, quantity))
    }

    async fn delete_cart_item(&self, user_id: Uuid, cart_item_id: Uuid) -> GatewayResult<()> {
        dispatch!(self, delete_cart_item(user_id, cart_item_id))
    }

    async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()> {
        dispatch!(self, clear_cart(user_id))
    }

    async fn wishlist_items(&self, user_id: Uuid) -> GatewayResult<Vec<WishlistItem>> {
        dispatch!(self, wishlist_items(user_id))
    }

    async fn insert_wishlist_item(&self, user_id: Uuid, product_id: Uuid) -> GatewayResult<()> {
        dispatch!(self, insert_wishlist_item(user_id, product_id))
    }

    async fn delete_wishlist_item(&self, user_id: Uuid, product_id: Uuid) -> GatewayResult<()> {
        dispatch!(self, delete_wishlist_item(user_id, product_id))
    }

    async fn place_order(&self, input: NewOrder) -> GatewayResult<OrderWithItems> {
        dispatch!(self, place_order(input))
    }

    async fn orders_for_user(&self, user_id: Uuid) -> GatewayResult<Vec<OrderWithItems>> {
        dispatch!(self, orders_for_user(user_id))
    }

    async fn all_orders(&self, status: Option<OrderStatus>) -> GatewayResult<Vec<OrderWithItems>> {
        dispatch!(self, all_orders(status))
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> GatewayResult<Order> {
        dispatch!(self, update_order_status(order_id, status))
    }

    async fn profile_by_id(&self, id: Uuid) -> GatewayResult<Option<UserProfile>> {
        dispatch!(self, profile_by_id(id))
    }

    async fn credentials_by_email(&self, email: &str) -> GatewayResult<Option<StoredCredentials>> {
        dispatch!(self, credentials_by_email(email))
    }

    async fn insert_profile(&self, input: NewProfile) -> GatewayResult<UserProfile> {
        dispatch!(self, insert_profile(input))
    }

    async fn update_profile(&self, id: Uuid, input: ProfileUpdate) -> GatewayResult<UserProfile> {
        dispatch!(self, update_profile(id, input))
    }

    async fn list_profiles(&self, roles: &[Role]) -> GatewayResult<Vec<UserProfile>> {
        dispatch!(self, list_profiles(roles))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> GatewayResult<UserProfile> {
        dispatch!(self, set_role(id, role))
    }

    async fn dashboard_stats(&self) -> GatewayResult<DashboardStats> {
        dispatch!(self, dashboard_stats())
    }
}
