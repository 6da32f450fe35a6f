use serde::Deserialize;
use utoipa::ToSchema;

use super::{CartStore, StoreError, StoreResult, confirmed_user};
use crate::{
    gateway::{Gateway, NewOrder, NewOrderItem},
    models::{OrderWithItems, PaymentMethod},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutForm {
    pub phone: String,
    pub shipping_address: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    fn validate(&self) -> StoreResult<()> {
        if self.phone.trim().is_empty() {
            return Err(StoreError::Validation("phone is required".into()));
        }
        if self.shipping_address.trim().is_empty() {
            return Err(StoreError::Validation("shipping address is required".into()));
        }
        Ok(())
    }
}

/// Turns the current cart snapshot into an order.
///
/// Each line's unit price is copied from the product as it is in the
/// snapshot; later price changes do not touch placed orders. Every refusal
/// happens before the first gateway call. The gateway writes the order, its
/// items and the cart clearing as one unit, after which the cart is re-read.
pub async fn submit_checkout<G: Gateway>(
    cart: &mut CartStore<G>,
    form: &CheckoutForm,
) -> StoreResult<OrderWithItems> {
    let user_id = confirmed_user(cart.session())?;
    if cart.items().is_empty() {
        return Err(StoreError::EmptyCart);
    }
    form.validate()?;

    let items = cart
        .items()
        .iter()
        .map(|item| {
            let product = item
                .product
                .as_ref()
                .ok_or(StoreError::IncompleteCart(item.id))?;
            Ok(NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: product.price,
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    let order = NewOrder {
        user_id,
        total_amount: cart.total_amount(),
        shipping_address: form.shipping_address.trim().to_string(),
        phone: form.phone.trim().to_string(),
        payment_method: form.payment_method,
        items,
    };

    let placed = match cart.gateway().place_order(order).await {
        Ok(placed) => placed,
        Err(err) => {
            tracing::warn!(error = %err, user = %user_id, "order placement failed");
            return Err(err.into());
        }
    };
    tracing::info!(
        order_id = %placed.order.id,
        total = %placed.order.total_amount,
        items = placed.items.len(),
        "order placed"
    );

    cart.reload().await;
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::{
        gateway::MemoryGateway,
        identity::Session,
        models::{Identity, OrderStatus, Role},
        store::fallback,
    };

    fn shopper() -> Identity {
        Identity {
            id: Uuid::new_v4().to_string(),
            email: "buyer@example.com".into(),
            display_name: "Buyer".into(),
            role: Role::User,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            phone: "01700000000".into(),
            shipping_address: "House 12, Road 5, Dhanmondi, Dhaka".into(),
            payment_method: PaymentMethod::Bkash,
        }
    }

    fn seeded() -> MemoryGateway {
        MemoryGateway::with_catalog(fallback::sample_categories(), fallback::sample_products())
    }

    #[tokio::test]
    async fn checkout_snapshots_prices_and_clears_cart() {
        let gateway = seeded();
        let ac = fallback::product_id(1);
        let tv = fallback::product_id(2);
        let mut cart = CartStore::new(gateway.clone(), Session::signed_in(shopper()));
        cart.add(ac, 1).await.unwrap();
        cart.add(tv, 2).await.unwrap();

        let placed = submit_checkout(&mut cart, &form()).await.unwrap();
        assert_eq!(placed.order.total_amount, dec!(115000));
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.order.payment_method, PaymentMethod::Bkash);
        assert_eq!(placed.items.len(), 2);
        assert!(cart.items().is_empty());

        gateway.reprice(tv, dec!(30000)).await;
        let history = gateway
            .orders_for_user(placed.order.user_id)
            .await
            .unwrap();
        let tv_line = history[0]
            .items
            .iter()
            .find(|item| item.product_id == tv)
            .unwrap();
        assert_eq!(tv_line.price, dec!(35000));
        assert_eq!(tv_line.quantity, 2);
    }

    #[tokio::test]
    async fn anonymous_or_empty_cart_is_refused_before_any_call() {
        let gateway = seeded();
        let mut anonymous = CartStore::new(gateway.clone(), Session::anonymous());
        let err = submit_checkout(&mut anonymous, &form()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotSignedIn));

        let mut empty = CartStore::new(gateway.clone(), Session::signed_in(shopper()));
        let err = submit_checkout(&mut empty, &form()).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyCart));

        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn blank_form_fields_are_rejected() {
        let mut cart = CartStore::new(seeded(), Session::signed_in(shopper()));
        cart.add(fallback::product_id(3), 1).await.unwrap();

        let blank_phone = CheckoutForm {
            phone: "   ".into(),
            ..form()
        };
        let err = submit_checkout(&mut cart, &blank_phone).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn gateway_failure_keeps_the_cart() {
        let gateway = seeded();
        let mut cart = CartStore::new(gateway.clone(), Session::signed_in(shopper()));
        cart.add(fallback::product_id(3), 1).await.unwrap();

        gateway.set_offline(true);
        let err = submit_checkout(&mut cart, &form()).await.unwrap_err();
        assert!(matches!(err, StoreError::Gateway(_)));

        gateway.set_offline(false);
        cart.refresh().await.unwrap();
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn payment_method_defaults_to_cash() {
        let form: CheckoutForm =
            serde_json::from_str(r#"{"phone":"017","shipping_address":"Dhaka"}"#).unwrap();
        assert_eq!(form.payment_method, PaymentMethod::Cash);
    }
}
