use uuid::Uuid;

use super::{StoreResult, confirmed_user};
use crate::{gateway::Gateway, identity::Session, models::WishlistItem};

/// Saved products for the signed-in user. Mutations re-fetch like the cart.
pub struct WishlistStore<G> {
    gateway: G,
    session: Session,
    items: Vec<WishlistItem>,
    loading: bool,
}

impl<G: Gateway> WishlistStore<G> {
    pub fn new(gateway: G, session: Session) -> Self {
        Self {
            gateway,
            session,
            items: Vec::new(),
            loading: false,
        }
    }

    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_member(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    pub async fn refresh(&mut self) -> StoreResult<()> {
        if !self.session.is_signed_in() {
            self.items.clear();
            return Ok(());
        }
        let user_id = confirmed_user(&self.session)?;

        self.loading = true;
        let result = self.gateway.wishlist_items(user_id).await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, user = %user_id, "wishlist refresh failed");
                Err(err.into())
            }
        }
    }

    pub async fn add(&mut self, product_id: Uuid) -> StoreResult<()> {
        let user_id = confirmed_user(&self.session)?;
        if let Err(err) = self.gateway.insert_wishlist_item(user_id, product_id).await {
            tracing::warn!(error = %err, product_id = %product_id, "wishlist add failed");
            return Err(err.into());
        }
        let _ = self.refresh().await;
        Ok(())
    }

    pub async fn remove(&mut self, product_id: Uuid) -> StoreResult<()> {
        let user_id = confirmed_user(&self.session)?;
        if let Err(err) = self.gateway.delete_wishlist_item(user_id, product_id).await {
            tracing::warn!(error = %err, product_id = %product_id, "wishlist removal failed");
            return Err(err.into());
        }
        let _ = self.refresh().await;
        Ok(())
    }

    /// Adds or removes based on the current snapshot. Returns the new membership.
    pub async fn toggle(&mut self, product_id: Uuid) -> StoreResult<bool> {
        if self.is_member(product_id) {
            self.remove(product_id).await?;
        } else {
            self.add(product_id).await?;
        }
        Ok(self.is_member(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::MemoryGateway,
        models::{Identity, Role},
        store::{StoreError, fallback},
    };

    fn session() -> Session {
        Session::signed_in(Identity {
            id: Uuid::new_v4().to_string(),
            email: "fan@example.com".into(),
            display_name: "Fan".into(),
            role: Role::User,
        })
    }

    fn seeded() -> MemoryGateway {
        MemoryGateway::with_catalog(fallback::sample_categories(), fallback::sample_products())
    }

    #[tokio::test]
    async fn add_remove_and_membership() {
        let fridge = fallback::product_id(5);
        let mut wishlist = WishlistStore::new(seeded(), session());

        wishlist.add(fridge).await.unwrap();
        assert!(wishlist.is_member(fridge));
        assert_eq!(wishlist.count(), 1);
        assert!(wishlist.items()[0].product.is_some());

        wishlist.remove(fridge).await.unwrap();
        assert!(!wishlist.is_member(fridge));
        assert_eq!(wishlist.count(), 0);
    }

    #[tokio::test]
    async fn toggle_flips_membership() {
        let freezer = fallback::product_id(6);
        let mut wishlist = WishlistStore::new(seeded(), session());
        assert!(wishlist.toggle(freezer).await.unwrap());
        assert!(!wishlist.toggle(freezer).await.unwrap());
    }

    #[tokio::test]
    async fn anonymous_visitor_gets_failures_and_no_calls() {
        let gateway = seeded();
        let mut wishlist = WishlistStore::new(gateway.clone(), Session::anonymous());
        let product = fallback::product_id(2);
        assert!(matches!(wishlist.add(product).await, Err(StoreError::NotSignedIn)));
        assert!(matches!(wishlist.remove(product).await, Err(StoreError::NotSignedIn)));
        wishlist.refresh().await.unwrap();
        assert_eq!(wishlist.count(), 0);
        assert!(!wishlist.is_loading());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn unconfirmed_identity_is_refused_without_gateway_call() {
        let gateway = seeded();
        let session = Session::signed_in(Identity {
            id: "00000000-0000-0000-0000-000000000000".into(),
            email: "nil@example.com".into(),
            display_name: "Nil".into(),
            role: Role::User,
        });
        let mut wishlist = WishlistStore::new(gateway.clone(), session);

        let err = wishlist.add(fallback::product_id(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::UnconfirmedIdentity));
        assert!(matches!(wishlist.refresh().await, Err(StoreError::UnconfirmedIdentity)));
        assert_eq!(gateway.calls(), 0);
    }
}
