//! Postgres-backed gateway over SeaORM.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::Value as Json;
use uuid::Uuid;

use super::{
    Gateway, GatewayError, GatewayResult, NewCategory, NewOrder, NewProduct, NewProfile,
    ProductFilter, ProductUpdate, ProfileUpdate, StoredCredentials,
};
use crate::{
    entity::{
        cart_items::{
            ActiveModel as CartActive, Column as CartCol, Entity as CartItems,
            Model as CartModel,
        },
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
        user_profiles::{
            ActiveModel as ProfileActive, Column as ProfileCol, Entity as UserProfiles,
            Model as ProfileModel,
        },
        wishlist_items::{
            ActiveModel as WishlistActive, Column as WishlistCol, Entity as WishlistItems,
            Model as WishlistModel,
        },
    },
    models::{
        CartItem, Category, DashboardStats, Order, OrderItem, OrderStatus, OrderWithItems,
        Product, Role, UserProfile, WishlistItem,
    },
};

#[derive(Clone)]
pub struct DbGateway {
    conn: DatabaseConnection,
}

impl DbGateway {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn attach_items(&self, orders: Vec<OrderModel>) -> GatewayResult<Vec<OrderWithItems>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let item_rows = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .order_by_asc(OrderItemCol::CreatedAt)
            .all(&self.conn)
            .await?;

        let product_ids: Vec<Uuid> = item_rows.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, Product> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            Products::find()
                .filter(ProdCol::Id.is_in(product_ids))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|p| (p.id, product_from_entity(p)))
                .collect()
        };

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            let product = products.get(&row.product_id).cloned();
            grouped
                .entry(row.order_id)
                .or_default()
                .push(order_item_from_entity(row, product));
        }

        orders
            .into_iter()
            .map(|order| {
                let items = grouped.remove(&order.id).unwrap_or_default();
                Ok(OrderWithItems {
                    order: order_from_entity(order)?,
                    items,
                })
            })
            .collect()
    }

    async fn find_profile(&self, id: Uuid) -> GatewayResult<ProfileModel> {
        UserProfiles::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(GatewayError::NotFound)
    }
}

impl Gateway for DbGateway {
    async fn list_categories(&self) -> GatewayResult<Vec<Category>> {
        let categories = Categories::find()
            .order_by_asc(CategoryCol::Name)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(category_from_entity)
            .collect();
        Ok(categories)
    }

    async fn category_by_slug(&self, slug: &str) -> GatewayResult<Option<Category>> {
        let category = Categories::find()
            .filter(CategoryCol::Slug.eq(slug))
            .one(&self.conn)
            .await?
            .map(category_from_entity);
        Ok(category)
    }

    async fn insert_category(&self, input: NewCategory) -> GatewayResult<Category> {
        let taken = Categories::find()
            .filter(CategoryCol::Slug.eq(input.slug.as_str()))
            .one(&self.conn)
            .await?;
        if taken.is_some() {
            return Err(GatewayError::Rejected(format!(
                "slug `{}` is already in use",
                input.slug
            )));
        }

        let category = CategoryActive {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            image_url: Set(input.image_url),
            created_at: NotSet,
        }
        .insert(&self.conn)
        .await?;
        Ok(category_from_entity(category))
    }

    async fn delete_category(&self, id: Uuid) -> GatewayResult<()> {
        let result = Categories::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> GatewayResult<Vec<Product>> {
        let mut condition = Condition::all();

        if let Some(category_id) = filter.category_id {
            condition = condition.add(ProdCol::CategoryId.eq(category_id));
        }

        if filter.featured_only {
            condition = condition.add(ProdCol::Featured.eq(true));
        }

        if let Some(needle) = filter.needle() {
            let pattern = format!("%{}%", needle);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                    .add(Expr::col(ProdCol::Description).ilike(pattern)),
            );
        }

        let mut finder = Products::find()
            .filter(condition)
            .order_by_desc(ProdCol::CreatedAt);
        if let Some(limit) = filter.limit {
            finder = finder.limit(limit);
        }

        let products = finder
            .all(&self.conn)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(products)
    }

    async fn product_by_id(&self, id: Uuid) -> GatewayResult<Option<Product>> {
        let product = Products::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(product_from_entity);
        Ok(product)
    }

    async fn insert_product(&self, input: NewProduct) -> GatewayResult<Product> {
        let product = ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category_id: Set(input.category_id),
            image_url: Set(input.image_url),
            specifications: Set(specifications_to_json(input.specifications)),
            stock: Set(input.stock),
            featured: Set(input.featured),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.conn)
        .await?;
        Ok(product_from_entity(product))
    }

    async fn update_product(&self, id: Uuid, input: ProductUpdate) -> GatewayResult<Product> {
        let existing = Products::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(GatewayError::NotFound)?;

        let mut active: ProductActive = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(specifications) = input.specifications {
            active.specifications = Set(specifications_to_json(specifications));
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(featured) = input.featured {
            active.featured = Set(featured);
        }
        active.updated_at = Set(Utc::now().into());

        let product = active.update(&self.conn).await?;
        Ok(product_from_entity(product))
    }

    async fn delete_product(&self, id: Uuid) -> GatewayResult<()> {
        let ordered = OrderItems::find()
            .filter(OrderItemCol::ProductId.eq(id))
            .count(&self.conn)
            .await?;
        if ordered > 0 {
            return Err(GatewayError::Rejected(
                "product appears in placed orders".into(),
            ));
        }
        let result = Products::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn cart_items(&self, user_id: Uuid) -> GatewayResult<Vec<CartItem>> {
        let rows = CartItems::find()
            .filter(CartCol::UserId.eq(user_id))
            .order_by_asc(CartCol::CreatedAt)
            .find_also_related(Products)
            .all(&self.conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(row, product)| cart_item_from_entity(row, product.map(product_from_entity)))
            .collect();
        Ok(items)
    }

    async fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> GatewayResult<()> {
        if quantity <= 0 {
            return Err(GatewayError::Rejected(
                "quantity must be greater than 0".into(),
            ));
        }

        let product = Products::find_by_id(product_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| GatewayError::Rejected("product not found".into()))?;
        if product.stock <= 0 {
            return Err(GatewayError::Rejected(format!(
                "{} is out of stock",
                product.name
            )));
        }

        // one row per (user, product); a concurrent first add lands on the conflict arm
        let row = CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: NotSet,
        };
        CartItems::insert(row)
            .on_conflict(
                OnConflict::columns([CartCol::UserId, CartCol::ProductId])
                    .value(
                        CartCol::Quantity,
                        Expr::col((CartItems, CartCol::Quantity)).add(quantity),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    async fn update_cart_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> GatewayResult<()> {
        let result = CartItems::update_many()
            .col_expr(CartCol::Quantity, Expr::value(quantity))
            .filter(CartCol::Id.eq(cart_item_id))
            .filter(CartCol::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn delete_cart_item(&self, user_id: Uuid, cart_item_id: Uuid) -> GatewayResult<()> {
        let result = CartItems::delete_many()
            .filter(CartCol::Id.eq(cart_item_id))
            .filter(CartCol::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()> {
        CartItems::delete_many()
            .filter(CartCol::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn wishlist_items(&self, user_id: Uuid) -> GatewayResult<Vec<WishlistItem>> {
        let rows = WishlistItems::find()
            .filter(WishlistCol::UserId.eq(user_id))
            .order_by_desc(WishlistCol::CreatedAt)
            .find_also_related(Products)
            .all(&self.conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(row, product)| wishlist_item_from_entity(row, product.map(product_from_entity)))
            .collect();
        Ok(items)
    }

    async fn insert_wishlist_item(&self, user_id: Uuid, product_id: Uuid) -> GatewayResult<()> {
        let product_exists = Products::find_by_id(product_id).one(&self.conn).await?;
        if product_exists.is_none() {
            return Err(GatewayError::Rejected("product not found".into()));
        }

        let row = WishlistActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            created_at: NotSet,
        };
        WishlistItems::insert(row)
            .on_conflict(
                OnConflict::columns([WishlistCol::UserId, WishlistCol::ProductId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    async fn delete_wishlist_item(&self, user_id: Uuid, product_id: Uuid) -> GatewayResult<()> {
        let result = WishlistItems::delete_many()
            .filter(WishlistCol::UserId.eq(user_id))
            .filter(WishlistCol::ProductId.eq(product_id))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn place_order(&self, input: NewOrder) -> GatewayResult<OrderWithItems> {
        if input.items.is_empty() {
            return Err(GatewayError::Rejected("order has no items".into()));
        }

        let txn = self.conn.begin().await?;

        let order = OrderActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            total_amount: Set(input.total_amount),
            status: Set(OrderStatus::Pending.as_str().to_owned()),
            shipping_address: Set(input.shipping_address),
            phone: Set(input.phone),
            payment_method: Set(input.payment_method.as_str().to_owned()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            let row = OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price: Set(item.price),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            items.push(order_item_from_entity(row, None));
        }

        // clear cart
        CartItems::delete_many()
            .filter(CartCol::UserId.eq(order.user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(OrderWithItems {
            order: order_from_entity(order)?,
            items,
        })
    }

    async fn orders_for_user(&self, user_id: Uuid) -> GatewayResult<Vec<OrderWithItems>> {
        let orders = Orders::find()
            .filter(OrderCol::UserId.eq(user_id))
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?;
        self.attach_items(orders).await
    }

    async fn all_orders(&self, status: Option<OrderStatus>) -> GatewayResult<Vec<OrderWithItems>> {
        let mut condition = Condition::all();
        if let Some(status) = status {
            condition = condition.add(OrderCol::Status.eq(status.as_str()));
        }
        let orders = Orders::find()
            .filter(condition)
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?;
        self.attach_items(orders).await
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> GatewayResult<Order> {
        let order = Orders::find_by_id(order_id)
            .one(&self.conn)
            .await?
            .ok_or(GatewayError::NotFound)?;

        let mut active: OrderActive = order.into();
        active.status = Set(status.as_str().to_owned());
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&self.conn).await?;
        order_from_entity(order)
    }

    async fn profile_by_id(&self, id: Uuid) -> GatewayResult<Option<UserProfile>> {
        UserProfiles::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(profile_from_entity)
            .transpose()
    }

    async fn credentials_by_email(&self, email: &str) -> GatewayResult<Option<StoredCredentials>> {
        let row = UserProfiles::find()
            .filter(ProfileCol::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await?;
        match row {
            Some(row) => {
                let password_hash = row.password_hash.clone();
                Ok(Some(StoredCredentials {
                    profile: profile_from_entity(row)?,
                    password_hash,
                }))
            }
            None => Ok(None),
        }
    }

    async fn insert_profile(&self, input: NewProfile) -> GatewayResult<UserProfile> {
        let email = normalize_email(&input.email);
        let exist = UserProfiles::find()
            .filter(ProfileCol::Email.eq(email.as_str()))
            .one(&self.conn)
            .await?;
        if exist.is_some() {
            return Err(GatewayError::Rejected("Email is already taken".into()));
        }

        let profile = ProfileActive {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            full_name: Set(input.full_name),
            phone: Set(None),
            address: Set(None),
            role: Set(input.role.as_str().to_owned()),
            password_hash: Set(input.password_hash),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.conn)
        .await?;
        profile_from_entity(profile)
    }

    async fn update_profile(&self, id: Uuid, input: ProfileUpdate) -> GatewayResult<UserProfile> {
        let existing = self.find_profile(id).await?;

        let mut active: ProfileActive = existing.into();
        if let Some(full_name) = input.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Utc::now().into());

        let profile = active.update(&self.conn).await?;
        profile_from_entity(profile)
    }

    async fn list_profiles(&self, roles: &[Role]) -> GatewayResult<Vec<UserProfile>> {
        let mut finder = UserProfiles::find().order_by_desc(ProfileCol::CreatedAt);
        if !roles.is_empty() {
            finder = finder.filter(ProfileCol::Role.is_in(roles.iter().map(Role::as_str)));
        }
        finder
            .all(&self.conn)
            .await?
            .into_iter()
            .map(profile_from_entity)
            .collect()
    }

    async fn set_role(&self, id: Uuid, role: Role) -> GatewayResult<UserProfile> {
        let existing = self.find_profile(id).await?;

        let mut active: ProfileActive = existing.into();
        active.role = Set(role.as_str().to_owned());
        active.updated_at = Set(Utc::now().into());

        let profile = active.update(&self.conn).await?;
        profile_from_entity(profile)
    }

    async fn dashboard_stats(&self) -> GatewayResult<DashboardStats> {
        let total_products = Products::find().count(&self.conn).await?;
        let total_categories = Categories::find().count(&self.conn).await?;
        let total_orders = Orders::find().count(&self.conn).await?;
        let pending_orders = Orders::find()
            .filter(OrderCol::Status.eq(OrderStatus::Pending.as_str()))
            .count(&self.conn)
            .await?;
        let total_users = UserProfiles::find().count(&self.conn).await?;

        let revenue: Option<Option<Decimal>> = Orders::find()
            .select_only()
            .column_as(Expr::col(OrderCol::TotalAmount).sum(), "revenue")
            .into_tuple()
            .one(&self.conn)
            .await?;

        Ok(DashboardStats {
            total_products,
            total_categories,
            total_orders,
            pending_orders,
            total_revenue: revenue.flatten().unwrap_or(Decimal::ZERO),
            total_users,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn specifications_to_json(specifications: BTreeMap<String, String>) -> Json {
    Json::Object(
        specifications
            .into_iter()
            .map(|(k, v)| (k, Json::String(v)))
            .collect(),
    )
}

/// Non-string values are kept as their JSON text; anything but an object is empty.
fn specifications_from_json(value: Json) -> BTreeMap<String, String> {
    match value {
        Json::Object(map) => map
            .into_iter()
            .map(|(k, v)| match v {
                Json::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        image_url: model.image_url,
        specifications: specifications_from_json(model.specifications),
        stock: model.stock,
        featured: model.featured,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn cart_item_from_entity(model: CartModel, product: Option<Product>) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
        product,
    }
}

fn wishlist_item_from_entity(model: WishlistModel, product: Option<Product>) -> WishlistItem {
    WishlistItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        created_at: model.created_at.with_timezone(&Utc),
        product,
    }
}

fn order_from_entity(model: OrderModel) -> GatewayResult<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        status: model.status.parse().map_err(GatewayError::Corrupt)?,
        shipping_address: model.shipping_address,
        phone: model.phone,
        payment_method: model.payment_method.parse().map_err(GatewayError::Corrupt)?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(model: OrderItemModel, product: Option<Product>) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        product,
    }
}

fn profile_from_entity(model: ProfileModel) -> GatewayResult<UserProfile> {
    Ok(UserProfile {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        phone: model.phone,
        address: model.address,
        role: model.role.parse().map_err(GatewayError::Corrupt)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specifications_survive_non_string_values() {
        let value = serde_json::json!({ "capacity": "1.5 Ton", "rpm": 1200, "smart": true });
        let specs = specifications_from_json(value);
        assert_eq!(specs.get("capacity").map(String::as_str), Some("1.5 Ton"));
        assert_eq!(specs.get("rpm").map(String::as_str), Some("1200"));
        assert_eq!(specs.get("smart").map(String::as_str), Some("true"));
    }

    #[test]
    fn specifications_ignore_non_objects() {
        assert!(specifications_from_json(serde_json::json!(["a", "b"])).is_empty());
        assert!(specifications_from_json(Json::Null).is_empty());
    }

    #[test]
    fn emails_are_compared_case_insensitively() {
        assert_eq!(normalize_email("  Shopper@Example.COM "), "shopper@example.com");
    }
}
