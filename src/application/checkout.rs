use super::in_flight::InFlight;
use crate::domain::cart::{Cart, CartLine};
use crate::domain::ports::{Notifier, PurchaseService};
use tracing::instrument;

pub const GENERIC_FAILURE: &str = "Purchase failed";

/// A cart line whose purchase did not go through.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFailure {
    pub line: CartLine,
    pub message: String,
}

/// Result of one checkout run, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutOutcome {
    pub successes: Vec<CartLine>,
    pub failures: Vec<CheckoutFailure>,
}

impl CheckoutOutcome {
    /// No line was attempted.
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.failures.is_empty()
    }

    /// Every attempted line succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Purchases every line of `cart`, one remote call at a time.
///
/// Lines are attempted in cart order; line N+1 is not started until line N's
/// response has been observed and its in-flight mark cleared. A failed line
/// never stops the batch. Successful lines are removed from the cart once the
/// loop is done; failed lines stay with their quantity untouched.
#[instrument(skip_all, fields(lines = cart.len()))]
pub async fn checkout(
    cart: &mut Cart,
    purchases: &dyn PurchaseService,
    notifier: &dyn Notifier,
    in_flight: &InFlight,
) -> CheckoutOutcome {
    let mut outcome = CheckoutOutcome::default();

    if cart.is_empty() {
        notifier.info("Cart is empty");
        return outcome;
    }

    let lines = cart.lines().to_vec();
    for line in lines {
        let _guard = in_flight.mark(line.product_id.clone());
        match purchases.purchase(&line.product_id, line.quantity).await {
            Ok(()) => {
                tracing::debug!(product_id = %line.product_id, "Line purchased");
                outcome.successes.push(line);
            }
            Err(e) => {
                tracing::info!(product_id = %line.product_id, "Line failed: {e}");
                let message = e.server_message().unwrap_or(GENERIC_FAILURE).to_string();
                outcome.failures.push(CheckoutFailure { line, message });
            }
        }
    }

    for line in &outcome.successes {
        cart.remove_item(&line.product_id);
    }

    if !outcome.successes.is_empty() {
        notifier.success(&format!("Purchased {} item(s)", outcome.successes.len()));
    }

    if !outcome.failures.is_empty() {
        for failure in &outcome.failures {
            notifier.error(&format!("{}: {}", failure.line.name, failure.message));
        }
        notifier.info("Some items failed to purchase. Check messages above.");
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::{ProductId, Quantity, UnitPrice};
    use crate::domain::ports::PurchaseError;
    use crate::domain::product::Product;
    use crate::domain::store::CartStore;
    use crate::infrastructure::in_memory::{InMemorySlot, Notification, RecordingNotifier};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;

    /// Answers from a fixed script and records what was in flight at each call.
    struct ScriptedPurchases {
        failures: HashMap<ProductId, PurchaseError>,
        in_flight: InFlight,
        calls: Mutex<Vec<(ProductId, u32, BTreeSet<ProductId>)>>,
    }

    impl ScriptedPurchases {
        fn new(in_flight: &InFlight) -> Self {
            Self {
                failures: HashMap::new(),
                in_flight: in_flight.clone(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, id: &str, error: PurchaseError) -> Self {
            self.failures.insert(ProductId::from(id), error);
            self
        }

        fn calls(&self) -> Vec<(ProductId, u32, BTreeSet<ProductId>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PurchaseService for ScriptedPurchases {
        async fn purchase(
            &self,
            product_id: &ProductId,
            quantity: Quantity,
        ) -> Result<(), PurchaseError> {
            self.calls.lock().unwrap().push((
                product_id.clone(),
                quantity.get(),
                self.in_flight.snapshot(),
            ));
            tokio::task::yield_now().await;
            match self.failures.get(product_id) {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            category: "Sweets".to_string(),
            description: None,
            price: UnitPrice::new(dec!(5)).unwrap(),
            quantity: 100,
            image: None,
        }
    }

    fn cart_with(items: &[(&str, &str, i64)]) -> Cart {
        let mut cart = Cart::load(CartStore::new(Box::new(InMemorySlot::new())));
        for (id, name, qty) in items {
            cart.add_item(&product(id, name), *qty);
        }
        cart
    }

    fn out_of_stock() -> PurchaseError {
        PurchaseError::Rejected {
            status: 400,
            message: Some("out of stock".to_string()),
        }
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let mut cart = cart_with(&[("A", "Apple Pie", 2), ("B", "Barfi", 1)]);
        let in_flight = InFlight::new();
        let purchases = ScriptedPurchases::new(&in_flight).failing("B", out_of_stock());
        let notifier = RecordingNotifier::new();

        let outcome = checkout(&mut cart, &purchases, &notifier, &in_flight).await;

        assert_eq!(outcome.successes.len(), 1);
        assert_eq!(outcome.successes[0].product_id.as_str(), "A");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].line.product_id.as_str(), "B");
        assert_eq!(outcome.failures[0].message, "out of stock");
        assert!(!outcome.is_clean());

        assert_eq!(cart.len(), 1);
        let remaining = &cart.lines()[0];
        assert_eq!(remaining.product_id.as_str(), "B");
        assert_eq!(remaining.quantity.get(), 1);

        assert_eq!(
            notifier.notifications(),
            vec![
                Notification::Success("Purchased 1 item(s)".to_string()),
                Notification::Error("Barfi: out of stock".to_string()),
                Notification::Info(
                    "Some items failed to purchase. Check messages above.".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_calls() {
        let mut cart = cart_with(&[]);
        let in_flight = InFlight::new();
        let purchases = ScriptedPurchases::new(&in_flight);
        let notifier = RecordingNotifier::new();

        let outcome = checkout(&mut cart, &purchases, &notifier, &in_flight).await;

        assert!(outcome.is_empty());
        assert!(purchases.calls().is_empty());
        assert_eq!(
            notifier.notifications(),
            vec![Notification::Info("Cart is empty".to_string())]
        );
    }

    #[tokio::test]
    async fn test_calls_in_order_one_at_a_time() {
        let mut cart = cart_with(&[("c", "C", 3), ("a", "A", 1), ("b", "B", 2)]);
        let in_flight = InFlight::new();
        let purchases = ScriptedPurchases::new(&in_flight).failing("a", out_of_stock());
        let notifier = RecordingNotifier::new();

        checkout(&mut cart, &purchases, &notifier, &in_flight).await;

        let calls = purchases.calls();
        let order: Vec<(&str, u32)> = calls.iter().map(|(id, q, _)| (id.as_str(), *q)).collect();
        assert_eq!(order, vec![("c", 3), ("a", 1), ("b", 2)]);

        for (id, _, marked) in &calls {
            assert_eq!(marked.len(), 1, "only the current line may be in flight");
            assert!(marked.contains(id));
        }
        assert!(in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_generic_message_when_server_gives_none() {
        let mut cart = cart_with(&[("a", "Ladoo", 1), ("b", "Jalebi", 1)]);
        let in_flight = InFlight::new();
        let purchases = ScriptedPurchases::new(&in_flight)
            .failing("a", PurchaseError::Network("connection refused".to_string()))
            .failing(
                "b",
                PurchaseError::Rejected {
                    status: 500,
                    message: Some("   ".to_string()),
                },
            );
        let notifier = RecordingNotifier::new();

        let outcome = checkout(&mut cart, &purchases, &notifier, &in_flight).await;

        assert!(outcome.successes.is_empty());
        assert!(outcome.failures.iter().all(|f| f.message == GENERIC_FAILURE));
        assert_eq!(cart.len(), 2);
        assert!(
            !notifier
                .notifications()
                .iter()
                .any(|n| matches!(n, Notification::Success(_)))
        );
    }

    #[tokio::test]
    async fn test_all_succeed_empties_cart() {
        let mut cart = cart_with(&[("a", "A", 1), ("b", "B", 4)]);
        let in_flight = InFlight::new();
        let purchases = ScriptedPurchases::new(&in_flight);
        let notifier = RecordingNotifier::new();

        let outcome = checkout(&mut cart, &purchases, &notifier, &in_flight).await;

        assert!(outcome.is_clean());
        assert_eq!(outcome.successes.len(), 2);
        assert!(cart.is_empty());
        assert_eq!(
            notifier.notifications(),
            vec![Notification::Success("Purchased 2 item(s)".to_string())]
        );
    }
}
