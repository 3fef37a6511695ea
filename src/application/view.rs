use std::sync::Arc;
use tokio::sync::watch;

/// Open/closed state of the cart drawer.
///
/// Kept apart from the cart itself: the engine opens it on add and closes it
/// after a clean checkout, but the cart model never sees it.
#[derive(Clone)]
pub struct CartView {
    open: Arc<watch::Sender<bool>>,
}

impl Default for CartView {
    fn default() -> Self {
        Self::new()
    }
}

impl CartView {
    pub fn new() -> Self {
        Self {
            open: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    pub fn close(&self) {
        self.open.send_replace(false);
    }

    pub fn toggle(&self) {
        self.open.send_modify(|open| *open = !*open);
    }

    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.open.subscribe()
    }
}
