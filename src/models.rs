use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Staff and admins may use the back-office.
    pub fn is_back_office(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in shopper or staff member as reported by the identity provider.
///
/// `id` is opaque: a provider may hand out identifiers that are not (yet) the
/// gateway's UUID user key, see [`Identity::user_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    /// The gateway user key, if `id` is a canonical RFC 4122 UUID (versions 1-5).
    pub fn user_id(&self) -> Option<Uuid> {
        let id = Uuid::parse_str(&self.id).ok()?;
        let version_ok = (1..=5).contains(&id.get_version_num());
        let variant_ok = id.get_variant() == uuid::Variant::RFC4122;
        (version_ok && variant_ok).then_some(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub image_url: String,
    pub specifications: BTreeMap<String, String>,
    pub stock: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub const PLACEHOLDER_IMAGE: &'static str = "/images/placeholder-product.png";

    /// Zero stock means the product cannot be added to a cart.
    pub fn is_purchasable(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub product: Option<Product>,
}

impl CartItem {
    /// Price of one unit, zero when the product expansion is missing.
    pub fn unit_price(&self) -> Decimal {
        self.product
            .as_ref()
            .map(|p| p.price)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }

    pub fn image_url(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.image_url.as_str())
            .unwrap_or(Product::PLACEHOLDER_IMAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    Rocket,
    Card,
    #[default]
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Nagad => "nagad",
            PaymentMethod::Rocket => "rocket",
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bkash" => Ok(PaymentMethod::Bkash),
            "nagad" => Ok(PaymentMethod::Nagad),
            "rocket" => Ok(PaymentMethod::Rocket),
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("unknown payment method `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order. `price` is the unit price frozen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.to_string(),
            email: self.email.clone(),
            display_name: self.full_name.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_categories: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    pub total_users: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            email: "shopper@example.com".into(),
            display_name: "Shopper".into(),
            role: Role::User,
        }
    }

    #[test]
    fn user_id_accepts_canonical_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(identity(&id.to_string()).user_id(), Some(id));
    }

    #[test]
    fn user_id_rejects_provider_ids() {
        assert_eq!(identity("user_2abcXYZ").user_id(), None);
        assert_eq!(identity("").user_id(), None);
        // nil uuid carries no version
        assert_eq!(identity(&Uuid::nil().to_string()).user_id(), None);
    }

    #[test]
    fn cart_item_without_product_is_worth_nothing() {
        let item = CartItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 3,
            created_at: Utc::now(),
            product: None,
        };
        assert_eq!(item.line_total(), Decimal::ZERO);
        assert_eq!(item.image_url(), Product::PLACEHOLDER_IMAGE);
    }

    #[test]
    fn order_status_round_trips_through_wire_names() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("paid".parse::<OrderStatus>().is_err());
    }
}
