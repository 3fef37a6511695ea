use super::cart::{ProductId, Quantity};
use super::product::{Product, ProductQuery};
use crate::error::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Why a single remote purchase did not go through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PurchaseError {
    /// The service answered with a non-success status.
    #[error("purchase rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// The session token is missing or expired.
    #[error("not authorized: {}", .message.as_deref().unwrap_or("session expired"))]
    Unauthorized { message: Option<String> },
    /// No response was observed (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(String),
}

impl PurchaseError {
    /// The human-readable message supplied by the server, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PurchaseError::Rejected { message, .. } | PurchaseError::Unauthorized { message } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            PurchaseError::Network(_) => None,
        }
    }
}

/// Remote "purchase(itemId, quantity)" operation.
///
/// Implementations own authentication; a call may suspend on I/O and may fail.
#[async_trait]
pub trait PurchaseService: Send + Sync {
    async fn purchase(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> std::result::Result<(), PurchaseError>;
}

/// Source of purchasable products.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>>;
}

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier: Send + Sync {
    fn success(&self, text: &str);
    fn error(&self, text: &str);
    fn info(&self, text: &str);
}

/// A durable key-value slot holding serialized bytes.
///
/// Reads and writes are synchronous: cart mutations persist before returning.
pub trait CartSlot: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&self, key: &str, value: &[u8]) -> Result<()>;
}

pub type CartSlotBox = Box<dyn CartSlot>;
pub type PurchaseServiceBox = Box<dyn PurchaseService>;
pub type CatalogBox = Box<dyn Catalog>;
pub type NotifierBox = Box<dyn Notifier>;
