//! Back-office operations. Staff and admins manage the catalog and orders;
//! only admins manage who is staff.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StoreError, StoreResult, confirmed_user};
use crate::{
    gateway::{Gateway, NewCategory, NewProduct, ProductUpdate},
    identity::Session,
    models::{
        Category, DashboardStats, Identity, Order, OrderStatus, OrderWithItems, Product, Role,
        UserProfile,
    },
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
}

/// Lowercase, ASCII alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_price_and_stock(price: Option<Decimal>, stock: Option<i32>) -> StoreResult<()> {
    if price.is_some_and(|p| p.is_sign_negative()) {
        return Err(StoreError::Validation("price cannot be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(StoreError::Validation("stock cannot be negative".into()));
    }
    Ok(())
}

pub struct AdminConsole<G> {
    gateway: G,
    session: Session,
}

impl<G: Gateway> AdminConsole<G> {
    pub fn new(gateway: G, session: Session) -> Self {
        Self { gateway, session }
    }

    /// Gates on the stored profile role, so a role change applies to tokens
    /// issued before it.
    async fn require(&self, admin_only: bool) -> StoreResult<Identity> {
        let user_id = confirmed_user(&self.session)?;
        let profile = self.gateway.profile_by_id(user_id).await?;
        let Some(profile) = profile else {
            tracing::warn!(user = %user_id, "back office access denied, no profile");
            return Err(StoreError::Forbidden);
        };
        let allowed = if admin_only {
            profile.role == Role::Admin
        } else {
            profile.role.is_back_office()
        };
        if !allowed {
            tracing::warn!(user = %user_id, role = %profile.role, "back office access denied");
            return Err(StoreError::Forbidden);
        }
        Ok(profile.identity())
    }

    pub async fn stats(&self) -> StoreResult<DashboardStats> {
        self.require(false).await?;
        Ok(self.gateway.dashboard_stats().await?)
    }

    pub async fn orders(&self, status: Option<OrderStatus>) -> StoreResult<Vec<OrderWithItems>> {
        self.require(false).await?;
        Ok(self.gateway.all_orders(status).await?)
    }

    pub async fn set_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> StoreResult<Order> {
        let actor = self.require(false).await?;
        let order = self.gateway.update_order_status(order_id, status).await?;
        tracing::info!(
            actor = %actor.id,
            order_id = %order_id,
            status = status.as_str(),
            "order status changed"
        );
        Ok(order)
    }

    pub async fn categories(&self) -> StoreResult<Vec<Category>> {
        self.require(false).await?;
        Ok(self.gateway.list_categories().await?)
    }

    pub async fn create_category(&self, draft: CategoryDraft) -> StoreResult<Category> {
        let actor = self.require(false).await?;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Validation("category name is required".into()));
        }
        let slug = match draft.slug.trim() {
            "" => slugify(&name),
            slug => slug.to_string(),
        };
        if !valid_slug(&slug) {
            return Err(StoreError::Validation(format!("invalid slug `{slug}`")));
        }
        let category = self
            .gateway
            .insert_category(NewCategory {
                name,
                slug,
                description: draft.description.trim().to_string(),
                image_url: draft.image_url.trim().to_string(),
            })
            .await?;
        tracing::info!(actor = %actor.id, category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let actor = self.require(false).await?;
        self.gateway.delete_category(id).await?;
        tracing::info!(actor = %actor.id, category_id = %id, "category deleted");
        Ok(())
    }

    pub async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product> {
        let actor = self.require(false).await?;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Validation("product name is required".into()));
        }
        check_price_and_stock(Some(draft.price), Some(draft.stock))?;
        let product = self
            .gateway
            .insert_product(NewProduct {
                name,
                description: draft.description,
                price: draft.price,
                category_id: draft.category_id,
                image_url: draft.image_url,
                specifications: draft.specifications,
                stock: draft.stock,
                featured: draft.featured,
            })
            .await?;
        tracing::info!(actor = %actor.id, product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        let actor = self.require(false).await?;
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(StoreError::Validation("product name is required".into()));
        }
        check_price_and_stock(patch.price, patch.stock)?;
        let product = self
            .gateway
            .update_product(
                id,
                ProductUpdate {
                    name: patch.name.map(|n| n.trim().to_string()),
                    description: patch.description,
                    price: patch.price,
                    category_id: patch.category_id,
                    image_url: patch.image_url,
                    specifications: patch.specifications,
                    stock: patch.stock,
                    featured: patch.featured,
                },
            )
            .await?;
        tracing::info!(actor = %actor.id, product_id = %id, "product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let actor = self.require(false).await?;
        self.gateway.delete_product(id).await?;
        tracing::info!(actor = %actor.id, product_id = %id, "product deleted");
        Ok(())
    }

    /// Staff and admin accounts.
    pub async fn staff(&self) -> StoreResult<Vec<UserProfile>> {
        self.require(true).await?;
        Ok(self.gateway.list_profiles(&[Role::Staff, Role::Admin]).await?)
    }

    pub async fn users(&self) -> StoreResult<Vec<UserProfile>> {
        self.require(true).await?;
        Ok(self.gateway.list_profiles(&[]).await?)
    }

    pub async fn set_role(&self, user_id: Uuid, role: Role) -> StoreResult<UserProfile> {
        let actor = self.require(true).await?;
        if actor.user_id() == Some(user_id) {
            return Err(StoreError::Validation("you cannot change your own role".into()));
        }
        let profile = self.gateway.set_role(user_id, role).await?;
        tracing::info!(actor = %actor.id, user = %user_id, role = %role, "role changed");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        gateway::{GatewayError, MemoryGateway, NewOrder, NewOrderItem, NewProfile},
        models::PaymentMethod,
        store::fallback,
    };

    async fn account(gateway: &MemoryGateway, email: &str, role: Role) -> UserProfile {
        gateway
            .insert_profile(NewProfile {
                email: email.into(),
                full_name: email.into(),
                role,
                password_hash: None,
            })
            .await
            .unwrap()
    }

    fn console(gateway: &MemoryGateway, profile: &UserProfile) -> AdminConsole<MemoryGateway> {
        AdminConsole::new(gateway.clone(), Session::signed_in(profile.identity()))
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Washing   Machines! "), "washing-machines");
        assert_eq!(slugify("4K & 8K TVs"), "4k-8k-tvs");
        assert!(valid_slug("deep-freezers"));
        assert!(!valid_slug("Deep Freezers"));
    }

    #[tokio::test]
    async fn shoppers_are_kept_out() {
        let gateway = MemoryGateway::new();
        let shopper = account(&gateway, "shopper@example.com", Role::User).await;
        let err = console(&gateway, &shopper).stats().await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));

        let anonymous = AdminConsole::new(gateway.clone(), Session::anonymous());
        assert!(matches!(anonymous.stats().await, Err(StoreError::NotSignedIn)));
    }

    #[tokio::test]
    async fn staff_manage_catalog_but_not_roles() {
        let gateway = MemoryGateway::new();
        let staff = account(&gateway, "staff@example.com", Role::Staff).await;
        let shopper = account(&gateway, "shopper@example.com", Role::User).await;
        let console = console(&gateway, &staff);

        let category = console
            .create_category(CategoryDraft {
                name: "Air Coolers".into(),
                slug: String::new(),
                description: String::new(),
                image_url: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(category.slug, "air-coolers");

        let product = console
            .create_product(ProductDraft {
                name: "Vision Air Cooler".into(),
                description: String::new(),
                price: dec!(9500),
                category_id: Some(category.id),
                image_url: String::new(),
                specifications: BTreeMap::new(),
                stock: 4,
                featured: false,
            })
            .await
            .unwrap();
        let patched = console
            .update_product(
                product.id,
                ProductPatch {
                    price: Some(dec!(8900)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.price, dec!(8900));

        let err = console
            .update_product(
                product.id,
                ProductPatch {
                    stock: Some(-1),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = console.set_role(shopper.id, Role::Staff).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));
    }

    #[tokio::test]
    async fn admin_promotes_staff_and_sees_stats() {
        let gateway =
            MemoryGateway::with_catalog(fallback::sample_categories(), fallback::sample_products());
        let admin = account(&gateway, "admin@example.com", Role::Admin).await;
        let shopper = account(&gateway, "shopper@example.com", Role::User).await;
        let console = console(&gateway, &admin);

        let promoted = console.set_role(shopper.id, Role::Staff).await.unwrap();
        assert_eq!(promoted.role, Role::Staff);
        assert_eq!(console.staff().await.unwrap().len(), 2);

        let err = console.set_role(admin.id, Role::User).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let stats = console.stats().await.unwrap();
        assert_eq!(stats.total_products, 6);
        assert_eq!(stats.total_categories, 6);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.pending_orders, 0);
    }

    #[tokio::test]
    async fn ordered_products_cannot_be_deleted() {
        let gateway =
            MemoryGateway::with_catalog(fallback::sample_categories(), fallback::sample_products());
        let admin = account(&gateway, "admin@example.com", Role::Admin).await;
        let shopper = account(&gateway, "shopper@example.com", Role::User).await;
        let console = console(&gateway, &admin);
        let ordered = fallback::product_id(2);
        gateway
            .place_order(NewOrder {
                user_id: shopper.id,
                total_amount: dec!(35000),
                shipping_address: "Mirpur, Dhaka".into(),
                phone: "01700000000".into(),
                payment_method: PaymentMethod::Cash,
                items: vec![NewOrderItem {
                    product_id: ordered,
                    quantity: 1,
                    price: dec!(35000),
                }],
            })
            .await
            .unwrap();

        let err = console.delete_product(ordered).await.unwrap_err();
        assert!(matches!(err, StoreError::Gateway(GatewayError::Rejected(_))));
        console.delete_product(fallback::product_id(6)).await.unwrap();
        assert_eq!(console.stats().await.unwrap().total_products, 5);
    }

    #[tokio::test]
    async fn demotion_applies_to_an_open_session() {
        let gateway = MemoryGateway::new();
        let admin = account(&gateway, "admin@example.com", Role::Admin).await;
        let staff = account(&gateway, "staff@example.com", Role::Staff).await;
        let staff_console = console(&gateway, &staff);
        staff_console.stats().await.unwrap();

        console(&gateway, &admin)
            .set_role(staff.id, Role::User)
            .await
            .unwrap();

        // the session still carries the staff role it signed in with
        assert_eq!(staff_console.session.current_identity().unwrap().role, Role::Staff);
        let err = staff_console.stats().await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));
    }

    #[tokio::test]
    async fn claimed_role_without_a_profile_is_refused() {
        let gateway = MemoryGateway::new();
        let ghost = Identity {
            id: Uuid::new_v4().to_string(),
            email: "ghost@example.com".into(),
            display_name: "Ghost".into(),
            role: Role::Admin,
        };
        let console = AdminConsole::new(gateway.clone(), Session::signed_in(ghost));
        assert!(matches!(console.users().await, Err(StoreError::Forbidden)));
    }
}
