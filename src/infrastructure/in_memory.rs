use crate::domain::cart::{ProductId, Quantity};
use crate::domain::ports::{CartSlot, Catalog, Notifier, PurchaseError, PurchaseService};
use crate::domain::product::{Product, ProductQuery};
use crate::error::{CartError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A thread-safe in-memory key-value slot.
///
/// Clones share the same map, so a test can keep a handle and inspect what the
/// cart wrote.
#[derive(Default, Clone)]
pub struct InMemorySlot {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemorySlot {
    /// Creates a new, empty in-memory slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites `key` directly, bypassing the cart.
    pub fn put(&self, key: &str, value: &[u8]) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }
}

impl CartSlot for InMemorySlot {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CartError::StorageError(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CartError::StorageError(e.to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// A stock-aware stand-in for the remote storefront.
///
/// Serves the catalog from memory and decrements stock on purchase, rejecting
/// requests the stock cannot cover.
#[derive(Default, Clone)]
pub struct InMemoryInventory {
    products: Arc<tokio::sync::RwLock<Vec<Product>>>,
}

impl InMemoryInventory {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(tokio::sync::RwLock::new(products)),
        }
    }

    /// Units currently in stock, or `None` for an unknown product.
    pub async fn stock(&self, product_id: &ProductId) -> Option<u32> {
        let products = self.products.read().await;
        products
            .iter()
            .find(|p| &p.id == product_id)
            .map(|p| p.quantity)
    }
}

#[async_trait]
impl Catalog for InMemoryInventory {
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|p| query.matches(p)).cloned().collect())
    }
}

#[async_trait]
impl PurchaseService for InMemoryInventory {
    async fn purchase(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> std::result::Result<(), PurchaseError> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|p| &p.id == product_id)
            .ok_or_else(|| PurchaseError::Rejected {
                status: 404,
                message: Some("Sweet not found".to_string()),
            })?;

        if product.quantity < quantity.get() {
            return Err(PurchaseError::Rejected {
                status: 400,
                message: Some("Insufficient stock".to_string()),
            });
        }
        product.quantity -= quantity.get();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
    Info(String),
}

/// Notifier that keeps every message, in order.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, notification: Notification) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, text: &str) {
        self.push(Notification::Success(text.to_string()));
    }

    fn error(&self, text: &str) {
        self.push(Notification::Error(text.to_string()));
    }

    fn info(&self, text: &str) {
        self.push(Notification::Info(text.to_string()));
    }
}
