use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{gateway::Gateway, models::CartItem, store::CartStore};

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_items: i64,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
}

impl<G: Gateway> From<&CartStore<G>> for CartView {
    fn from(cart: &CartStore<G>) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            total_amount: cart.total_amount(),
        }
    }
}
