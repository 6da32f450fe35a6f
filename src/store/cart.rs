use rust_decimal::Decimal;
use uuid::Uuid;

use super::{StoreError, StoreResult, confirmed_user};
use crate::{gateway::Gateway, identity::Session, models::CartItem};

/// The signed-in user's cart as last read from the gateway.
///
/// Every mutation goes to the gateway first and is followed by a full
/// re-fetch; the local list is never edited in place. A failed call leaves
/// the previous snapshot untouched.
pub struct CartStore<G> {
    gateway: G,
    session: Session,
    items: Vec<CartItem>,
    loading: bool,
}

impl<G: Gateway> CartStore<G> {
    pub fn new(gateway: G, session: Session) -> Self {
        Self {
            gateway,
            session,
            items: Vec::new(),
            loading: false,
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    /// Sum of line totals; items without a product expansion count as zero.
    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Reloads the cart. Signed out means empty; an unconfirmed identity
    /// leaves the snapshot alone.
    pub async fn refresh(&mut self) -> StoreResult<()> {
        if !self.session.is_signed_in() {
            self.items.clear();
            return Ok(());
        }
        let user_id = confirmed_user(&self.session)?;

        self.loading = true;
        let result = self.gateway.cart_items(user_id).await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, user = %user_id, "cart refresh failed");
                Err(err.into())
            }
        }
    }

    pub async fn add(&mut self, product_id: Uuid, quantity: i32) -> StoreResult<()> {
        let user_id = confirmed_user(&self.session)?;
        if quantity <= 0 {
            return Err(StoreError::Validation(
                "quantity must be greater than 0".into(),
            ));
        }
        if let Err(err) = self.gateway.add_to_cart(user_id, product_id, quantity).await {
            tracing::warn!(error = %err, product_id = %product_id, "add to cart failed");
            return Err(err.into());
        }
        self.reload().await;
        Ok(())
    }

    /// Sets a line's quantity; zero or less removes the line.
    pub async fn update_quantity(&mut self, cart_item_id: Uuid, quantity: i32) -> StoreResult<()> {
        if quantity <= 0 {
            return self.remove(cart_item_id).await;
        }
        let user_id = confirmed_user(&self.session)?;
        if let Err(err) = self
            .gateway
            .update_cart_quantity(user_id, cart_item_id, quantity)
            .await
        {
            tracing::warn!(
                error = %err,
                cart_item_id = %cart_item_id,
                "cart quantity update failed"
            );
            return Err(err.into());
        }
        self.reload().await;
        Ok(())
    }

    pub async fn remove(&mut self, cart_item_id: Uuid) -> StoreResult<()> {
        let user_id = confirmed_user(&self.session)?;
        if let Err(err) = self.gateway.delete_cart_item(user_id, cart_item_id).await {
            tracing::warn!(error = %err, cart_item_id = %cart_item_id, "cart removal failed");
            return Err(err.into());
        }
        self.reload().await;
        Ok(())
    }

    pub async fn clear(&mut self) -> StoreResult<()> {
        let user_id = confirmed_user(&self.session)?;
        if let Err(err) = self.gateway.clear_cart(user_id).await {
            tracing::warn!(error = %err, "cart clear failed");
            return Err(err.into());
        }
        self.reload().await;
        Ok(())
    }

    /// Re-fetch after a successful mutation. The mutation already happened,
    /// so a failed read is logged by `refresh` and not reported again.
    pub(crate) async fn reload(&mut self) {
        let _ = self.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        gateway::MemoryGateway,
        models::{Identity, Role},
        store::fallback,
    };

    fn shopper() -> Identity {
        Identity {
            id: Uuid::new_v4().to_string(),
            email: "shopper@example.com".into(),
            display_name: "Shopper".into(),
            role: Role::User,
        }
    }

    fn seeded() -> MemoryGateway {
        MemoryGateway::with_catalog(fallback::sample_categories(), fallback::sample_products())
    }

    #[tokio::test]
    async fn totals_follow_gateway_rows() {
        let ac = fallback::product_id(1);
        let tv = fallback::product_id(2);
        let mut cart = CartStore::new(seeded(), Session::signed_in(shopper()));

        cart.add(ac, 1).await.unwrap();
        cart.add(tv, 2).await.unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_amount(), dec!(115000));
    }

    #[tokio::test]
    async fn adding_the_same_product_merges_rows() {
        let mut cart = CartStore::new(seeded(), Session::signed_in(shopper()));
        cart.add(fallback::product_id(3), 1).await.unwrap();
        cart.add(fallback::product_id(3), 2).await.unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[tokio::test]
    async fn zero_quantity_removes_the_line() {
        let mut cart = CartStore::new(seeded(), Session::signed_in(shopper()));
        cart.add(fallback::product_id(1), 2).await.unwrap();
        let line = cart.items()[0].id;

        cart.update_quantity(line, 5).await.unwrap();
        assert_eq!(cart.total_items(), 5);

        cart.update_quantity(line, 0).await.unwrap();
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn negative_quantity_removes_the_line() {
        let mut cart = CartStore::new(seeded(), Session::signed_in(shopper()));
        cart.add(fallback::product_id(4), 1).await.unwrap();
        cart.add(fallback::product_id(5), 1).await.unwrap();
        let line = cart.items()[0].id;

        cart.update_quantity(line, -1).await.unwrap();
        assert_eq!(cart.items().len(), 1);
        assert!(cart.items().iter().all(|item| item.id != line));
    }

    #[tokio::test]
    async fn anonymous_and_unconfirmed_sessions_make_no_gateway_calls() {
        let gateway = seeded();
        let mut anonymous = CartStore::new(gateway.clone(), Session::anonymous());
        let err = anonymous.add(fallback::product_id(1), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotSignedIn));
        let err = anonymous.remove(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotSignedIn));
        anonymous.refresh().await.unwrap();
        assert!(anonymous.items().is_empty());

        let mut pending = shopper();
        pending.id = "user_2xYz".into();
        let mut unconfirmed = CartStore::new(gateway.clone(), Session::signed_in(pending));
        let err = unconfirmed.add(fallback::product_id(1), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::UnconfirmedIdentity));

        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn failed_mutation_keeps_previous_snapshot() {
        let gateway = seeded();
        let mut cart = CartStore::new(gateway.clone(), Session::signed_in(shopper()));
        cart.add(fallback::product_id(1), 1).await.unwrap();

        gateway.set_offline(true);
        assert!(cart.add(fallback::product_id(2), 1).await.is_err());
        assert!(cart.refresh().await.is_err());
        assert_eq!(cart.items().len(), 1);
        assert!(!cart.is_loading());
    }

    #[tokio::test]
    async fn sign_out_empties_the_cart_on_refresh() {
        let session = Session::signed_in(shopper());
        let mut cart = CartStore::new(seeded(), session.clone());
        cart.add(fallback::product_id(4), 1).await.unwrap();

        session.sign_out();
        cart.refresh().await.unwrap();
        assert!(cart.items().is_empty());
        assert_eq!(cart.total_amount(), Decimal::ZERO);
    }
}
