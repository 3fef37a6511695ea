use super::checkout::{CheckoutOutcome, GENERIC_FAILURE, checkout};
use super::in_flight::InFlight;
use super::view::CartView;
use crate::domain::cart::{Cart, CartLine, ProductId, Quantity};
use crate::domain::ports::{NotifierBox, PurchaseError, PurchaseServiceBox};
use crate::domain::product::Product;
use crate::domain::store::CartStore;
use rust_decimal::Decimal;

/// The storefront's cart engine, as handed to presentation code.
///
/// `CartEngine` owns the cart, its view state and the collaborators checkout
/// needs. There is exactly one owner; callers that need to share it across
/// tasks wrap it in a `tokio::sync::Mutex`. Every cart mutation funnels
/// through here or through [`Cart`]'s own API.
pub struct CartEngine {
    cart: Cart,
    view: CartView,
    in_flight: InFlight,
    purchases: PurchaseServiceBox,
    notifier: NotifierBox,
}

impl CartEngine {
    /// Creates a new `CartEngine`, rehydrating the cart from `store`.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for the cart's lines.
    /// * `purchases` - The remote purchase operation.
    /// * `notifier` - Where user-facing messages go.
    pub fn new(store: CartStore, purchases: PurchaseServiceBox, notifier: NotifierBox) -> Self {
        Self {
            cart: Cart::load(store),
            view: CartView::new(),
            in_flight: InFlight::new(),
            purchases,
            notifier,
        }
    }

    /// Adds `quantity` units of `product` and asks for the cart view to open.
    pub fn add_item(&mut self, product: &Product, quantity: i64) {
        self.cart.add_item(product, quantity);
        self.view.open();
    }

    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.cart.remove_item(product_id);
    }

    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        self.cart.update_quantity(product_id, quantity);
    }

    /// Empties the cart and tells the user so.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.notifier.info("Cart cleared");
    }

    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn view(&self) -> &CartView {
        &self.view
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Purchases every line in the cart. The view is closed only when no line
    /// failed.
    pub async fn checkout(&mut self) -> CheckoutOutcome {
        let outcome = checkout(
            &mut self.cart,
            self.purchases.as_ref(),
            self.notifier.as_ref(),
            &self.in_flight,
        )
        .await;

        if !outcome.is_empty() && outcome.is_clean() {
            self.view.close();
        }
        outcome
    }

    /// Purchases `quantity` units of `product` directly, leaving the cart alone.
    pub async fn buy_now(&self, product: &Product, quantity: i64) -> Result<(), PurchaseError> {
        let quantity = Quantity::new(quantity);
        let result = {
            let _guard = self.in_flight.mark(product.id.clone());
            self.purchases.purchase(&product.id, quantity).await
        };

        match &result {
            Ok(()) => self
                .notifier
                .success(&format!("Purchased {} × {}", quantity, product.name)),
            Err(e) => self
                .notifier
                .error(e.server_message().unwrap_or(GENERIC_FAILURE)),
        }
        result
    }
}
