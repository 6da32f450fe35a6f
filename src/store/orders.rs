use super::{StoreResult, confirmed_user};
use crate::{gateway::Gateway, identity::Session, models::OrderWithItems};

/// The signed-in user's orders, newest first, items expanded with products.
pub async fn order_history<G: Gateway>(
    gateway: &G,
    session: &Session,
) -> StoreResult<Vec<OrderWithItems>> {
    let user_id = confirmed_user(session)?;
    gateway.orders_for_user(user_id).await.map_err(|err| {
        tracing::warn!(error = %err, user = %user_id, "order history load failed");
        err.into()
    })
}
