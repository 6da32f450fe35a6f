use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{gateway::Gateway, models::WishlistItem, store::WishlistStore};

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistView {
    pub items: Vec<WishlistItem>,
    pub count: usize,
}

impl<G: Gateway> From<&WishlistStore<G>> for WishlistView {
    fn from(wishlist: &WishlistStore<G>) -> Self {
        Self {
            items: wishlist.items().to_vec(),
            count: wishlist.count(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistToggle {
    pub product_id: Uuid,
    pub saved: bool,
}
