//! In-process gateway. Rows live behind a mutex; product expansion happens at
//! read time so cart totals follow live prices while order items do not.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    Gateway, GatewayError, GatewayResult, NewCategory, NewOrder, NewProduct, NewProfile,
    ProductFilter, ProductUpdate, ProfileUpdate, StoredCredentials,
};
use crate::models::{
    CartItem, Category, DashboardStats, Order, OrderItem, OrderStatus, OrderWithItems, Product,
    Role, UserProfile, WishlistItem,
};

#[derive(Debug, Clone)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct WishlistRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ProfileRow {
    profile: UserProfile,
    password_hash: Option<String>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
    cart_items: Vec<CartRow>,
    wishlist_items: Vec<WishlistRow>,
    orders: Vec<OrderWithItems>,
    profiles: Vec<ProfileRow>,
}

impl Tables {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn expand_order(&self, order: &OrderWithItems) -> OrderWithItems {
        let mut order = order.clone();
        for item in &mut order.items {
            item.product = self.product(item.product_id).cloned();
        }
        order
    }
}

#[derive(Clone, Default)]
pub struct MemoryGateway {
    tables: Arc<Mutex<Tables>>,
    offline: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(categories: Vec<Category>, products: Vec<Product>) -> Self {
        let tables = Tables {
            categories,
            products,
            ..Tables::default()
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with [`GatewayError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of gateway operations attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Changes a product's live price; placed orders keep their snapshot.
    pub async fn reprice(&self, product_id: Uuid, price: Decimal) {
        let mut tables = self.tables.lock().await;
        if let Some(product) = tables.products.iter_mut().find(|p| p.id == product_id) {
            product.price = price;
            product.updated_at = Utc::now();
        }
    }

    fn enter(&self) -> GatewayResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory gateway is offline".into()));
        }
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    async fn list_categories(&self) -> GatewayResult<Vec<Category>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let mut categories = tables.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category_by_slug(&self, slug: &str) -> GatewayResult<Option<Category>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn insert_category(&self, input: NewCategory) -> GatewayResult<Category> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.slug == input.slug) {
            return Err(GatewayError::Rejected(format!(
                "slug `{}` is already in use",
                input.slug
            )));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            slug: input.slug,
            description: input.description,
            image_url: input.image_url,
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(GatewayError::NotFound);
        }
        for product in tables.products.iter_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> GatewayResult<Vec<Product>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            products.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(products)
    }

    async fn product_by_id(&self, id: Uuid) -> GatewayResult<Option<Product>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        Ok(tables.product(id).cloned())
    }

    async fn insert_product(&self, input: NewProduct) -> GatewayResult<Product> {
        self.enter()?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            category_id: input.category_id,
            image_url: input.image_url,
            specifications: input.specifications,
            stock: input.stock,
            featured: input.featured,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, input: ProductUpdate) -> GatewayResult<Product> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GatewayError::NotFound)?;
        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(category_id) = input.category_id {
            product.category_id = Some(category_id);
        }
        if let Some(image_url) = input.image_url {
            product.image_url = image_url;
        }
        if let Some(specifications) = input.specifications {
            product.specifications = specifications;
        }
        if let Some(stock) = input.stock {
            product.stock = stock;
        }
        if let Some(featured) = input.featured {
            product.featured = featured;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let ordered = tables
            .orders
            .iter()
            .flat_map(|o| &o.items)
            .any(|item| item.product_id == id);
        if ordered {
            return Err(GatewayError::Rejected(
                "product appears in placed orders".into(),
            ));
        }
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(GatewayError::NotFound);
        }
        tables.cart_items.retain(|row| row.product_id != id);
        tables.wishlist_items.retain(|row| row.product_id != id);
        Ok(())
    }

    async fn cart_items(&self, user_id: Uuid) -> GatewayResult<Vec<CartItem>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let items = tables
            .cart_items
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| CartItem {
                id: row.id,
                user_id: row.user_id,
                product_id: row.product_id,
                quantity: row.quantity,
                created_at: row.created_at,
                product: tables.product(row.product_id).cloned(),
            })
            .collect();
        Ok(items)
    }

    async fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> GatewayResult<()> {
        self.enter()?;
        if quantity <= 0 {
            return Err(GatewayError::Rejected(
                "quantity must be greater than 0".into(),
            ));
        }
        let mut tables = self.tables.lock().await;
        let product = tables
            .product(product_id)
            .ok_or_else(|| GatewayError::Rejected("product not found".into()))?;
        if !product.is_purchasable() {
            return Err(GatewayError::Rejected(format!(
                "{} is out of stock",
                product.name
            )));
        }

        match tables
            .cart_items
            .iter_mut()
            .find(|row| row.user_id == user_id && row.product_id == product_id)
        {
            Some(row) => row.quantity = row.quantity.saturating_add(quantity),
            None => tables.cart_items.push(CartRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity,
                created_at: Utc::now(),
            }),
        }
        Ok(())
    }

    async fn update_cart_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .cart_items
            .iter_mut()
            .find(|row| row.id == cart_item_id && row.user_id == user_id)
            .ok_or(GatewayError::NotFound)?;
        row.quantity = quantity;
        Ok(())
    }

    async fn delete_cart_item(&self, user_id: Uuid, cart_item_id: Uuid) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|row| !(row.id == cart_item_id && row.user_id == user_id));
        if tables.cart_items.len() == before {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.cart_items.retain(|row| row.user_id != user_id);
        Ok(())
    }

    async fn wishlist_items(&self, user_id: Uuid) -> GatewayResult<Vec<WishlistItem>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let mut items: Vec<WishlistItem> = tables
            .wishlist_items
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| WishlistItem {
                id: row.id,
                user_id: row.user_id,
                product_id: row.product_id,
                created_at: row.created_at,
                product: tables.product(row.product_id).cloned(),
            })
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert_wishlist_item(&self, user_id: Uuid, product_id: Uuid) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        if tables.product(product_id).is_none() {
            return Err(GatewayError::Rejected("product not found".into()));
        }
        let exists = tables
            .wishlist_items
            .iter()
            .any(|row| row.user_id == user_id && row.product_id == product_id);
        if !exists {
            tables.wishlist_items.push(WishlistRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn delete_wishlist_item(&self, user_id: Uuid, product_id: Uuid) -> GatewayResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let before = tables.wishlist_items.len();
        tables
            .wishlist_items
            .retain(|row| !(row.user_id == user_id && row.product_id == product_id));
        if tables.wishlist_items.len() == before {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn place_order(&self, input: NewOrder) -> GatewayResult<OrderWithItems> {
        self.enter()?;
        if input.items.is_empty() {
            return Err(GatewayError::Rejected("order has no items".into()));
        }
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            total_amount: input.total_amount,
            status: OrderStatus::Pending,
            shipping_address: input.shipping_address,
            phone: input.phone,
            payment_method: input.payment_method,
            created_at: now,
            updated_at: now,
        };
        let items = input
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                product: None,
            })
            .collect();
        let placed = OrderWithItems { order, items };

        // single lock scope: the order and the cart clear land together
        let mut tables = self.tables.lock().await;
        tables.orders.push(placed.clone());
        tables.cart_items.retain(|row| row.user_id != input.user_id);
        Ok(placed)
    }

    async fn orders_for_user(&self, user_id: Uuid) -> GatewayResult<Vec<OrderWithItems>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let mut orders: Vec<OrderWithItems> = tables
            .orders
            .iter()
            .filter(|o| o.order.user_id == user_id)
            .map(|o| tables.expand_order(o))
            .collect();
        orders.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        Ok(orders)
    }

    async fn all_orders(&self, status: Option<OrderStatus>) -> GatewayResult<Vec<OrderWithItems>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let mut orders: Vec<OrderWithItems> = tables
            .orders
            .iter()
            .filter(|o| status.is_none_or(|s| o.order.status == s))
            .map(|o| tables.expand_order(o))
            .collect();
        orders.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> GatewayResult<Order> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.order.id == order_id)
            .ok_or(GatewayError::NotFound)?;
        order.order.status = status;
        order.order.updated_at = Utc::now();
        Ok(order.order.clone())
    }

    async fn profile_by_id(&self, id: Uuid) -> GatewayResult<Option<UserProfile>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .iter()
            .find(|row| row.profile.id == id)
            .map(|row| row.profile.clone()))
    }

    async fn credentials_by_email(&self, email: &str) -> GatewayResult<Option<StoredCredentials>> {
        self.enter()?;
        let email = email.trim().to_lowercase();
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .iter()
            .find(|row| row.profile.email == email)
            .map(|row| StoredCredentials {
                profile: row.profile.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn insert_profile(&self, input: NewProfile) -> GatewayResult<UserProfile> {
        self.enter()?;
        let email = input.email.trim().to_lowercase();
        let mut tables = self.tables.lock().await;
        if tables.profiles.iter().any(|row| row.profile.email == email) {
            return Err(GatewayError::Rejected("Email is already taken".into()));
        }
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email,
            full_name: input.full_name,
            phone: None,
            address: None,
            role: input.role,
            created_at: Utc::now(),
        };
        tables.profiles.push(ProfileRow {
            profile: profile.clone(),
            password_hash: input.password_hash,
        });
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, input: ProfileUpdate) -> GatewayResult<UserProfile> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .profiles
            .iter_mut()
            .find(|row| row.profile.id == id)
            .ok_or(GatewayError::NotFound)?;
        if let Some(full_name) = input.full_name {
            row.profile.full_name = full_name;
        }
        if let Some(phone) = input.phone {
            row.profile.phone = Some(phone);
        }
        if let Some(address) = input.address {
            row.profile.address = Some(address);
        }
        Ok(row.profile.clone())
    }

    async fn list_profiles(&self, roles: &[Role]) -> GatewayResult<Vec<UserProfile>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let mut profiles: Vec<UserProfile> = tables
            .profiles
            .iter()
            .filter(|row| roles.is_empty() || roles.contains(&row.profile.role))
            .map(|row| row.profile.clone())
            .collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> GatewayResult<UserProfile> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .profiles
            .iter_mut()
            .find(|row| row.profile.id == id)
            .ok_or(GatewayError::NotFound)?;
        row.profile.role = role;
        Ok(row.profile.clone())
    }

    async fn dashboard_stats(&self) -> GatewayResult<DashboardStats> {
        self.enter()?;
        let tables = self.tables.lock().await;
        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        Ok(DashboardStats {
            total_products: count(tables.products.len()),
            total_categories: count(tables.categories.len()),
            total_orders: count(tables.orders.len()),
            pending_orders: count(
                tables
                    .orders
                    .iter()
                    .filter(|o| o.order.status == OrderStatus::Pending)
                    .count(),
            ),
            total_revenue: tables.orders.iter().map(|o| o.order.total_amount).sum(),
            total_users: count(tables.profiles.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::gateway::NewOrderItem;
    use crate::models::PaymentMethod;

    fn product(stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Walton 25L Microwave Oven".into(),
            description: "Digital microwave oven with grill function".into(),
            price: Decimal::from(12000),
            category_id: None,
            image_url: String::new(),
            specifications: BTreeMap::new(),
            stock,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn repeated_adds_merge_into_one_row() {
        let oven = product(5);
        let gateway = MemoryGateway::with_catalog(vec![], vec![oven.clone()]);
        let user = Uuid::new_v4();

        gateway.add_to_cart(user, oven.id, 1).await.unwrap();
        gateway.add_to_cart(user, oven.id, 2).await.unwrap();

        let items = gateway.cart_items(user).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[tokio::test]
    async fn simultaneous_first_adds_both_succeed() {
        let oven = product(5);
        let gateway = MemoryGateway::with_catalog(vec![], vec![oven.clone()]);
        let user = Uuid::new_v4();

        let (first, second) = tokio::join!(
            gateway.add_to_cart(user, oven.id, 1),
            gateway.add_to_cart(user, oven.id, 1),
        );
        first.unwrap();
        second.unwrap();
        let (first, second) = tokio::join!(
            gateway.insert_wishlist_item(user, oven.id),
            gateway.insert_wishlist_item(user, oven.id),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(gateway.cart_items(user).await.unwrap()[0].quantity, 2);
        assert_eq!(gateway.wishlist_items(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_stock_products_are_rejected() {
        let sold_out = product(0);
        let gateway = MemoryGateway::with_catalog(vec![], vec![sold_out.clone()]);

        let err = gateway
            .add_to_cart(Uuid::new_v4(), sold_out.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn offline_gateway_fails_and_counts_calls() {
        let gateway = MemoryGateway::new();
        gateway.set_offline(true);

        let err = gateway.list_categories().await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn placing_an_order_clears_only_that_users_cart() {
        let oven = product(5);
        let gateway = MemoryGateway::with_catalog(vec![], vec![oven.clone()]);
        let (buyer, other) = (Uuid::new_v4(), Uuid::new_v4());
        gateway.add_to_cart(buyer, oven.id, 1).await.unwrap();
        gateway.add_to_cart(other, oven.id, 1).await.unwrap();

        gateway
            .place_order(NewOrder {
                user_id: buyer,
                total_amount: oven.price,
                shipping_address: "House 1, Road 2, Dhaka".into(),
                phone: "01700000000".into(),
                payment_method: PaymentMethod::Cash,
                items: vec![NewOrderItem {
                    product_id: oven.id,
                    quantity: 1,
                    price: oven.price,
                }],
            })
            .await
            .unwrap();

        assert!(gateway.cart_items(buyer).await.unwrap().is_empty());
        assert_eq!(gateway.cart_items(other).await.unwrap().len(), 1);
        assert_eq!(gateway.orders_for_user(buyer).await.unwrap().len(), 1);
    }
}
