use crate::domain::cart::ProductId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable set of product ids whose purchase is awaiting a response.
///
/// Presentation code subscribes to disable per-item controls while a line is
/// being processed. Clones share the same set.
#[derive(Clone)]
pub struct InFlight {
    ids: Arc<watch::Sender<BTreeSet<ProductId>>>,
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            ids: Arc::new(watch::Sender::new(BTreeSet::new())),
        }
    }

    /// Marks `product_id` as in flight until the returned guard is dropped.
    #[must_use = "the id is unmarked as soon as the guard is dropped"]
    pub fn mark(&self, product_id: ProductId) -> InFlightGuard {
        self.ids.send_modify(|ids| {
            ids.insert(product_id.clone());
        });
        InFlightGuard {
            ids: Arc::clone(&self.ids),
            product_id,
        }
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.ids.borrow().contains(product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }

    pub fn snapshot(&self) -> BTreeSet<ProductId> {
        self.ids.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BTreeSet<ProductId>> {
        self.ids.subscribe()
    }
}

/// Clears its product id from the in-flight set on drop.
pub struct InFlightGuard {
    ids: Arc<watch::Sender<BTreeSet<ProductId>>>,
    product_id: ProductId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids.send_modify(|ids| {
            ids.remove(&self.product_id);
        });
    }
}
