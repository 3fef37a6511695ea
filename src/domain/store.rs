use super::cart::CartLine;
use super::ports::CartSlotBox;

/// Fixed key under which the cart is serialized.
pub const CART_KEY: &str = "sweetify_cart_v1";

/// Fail-soft persistence for the cart's lines.
///
/// Wraps a durable [`CartSlot`](super::ports::CartSlot) and a key. Neither
/// direction ever returns an error: unreadable data loads as an empty cart, and
/// a failed write leaves the in-memory cart authoritative for the session.
pub struct CartStore {
    slot: CartSlotBox,
    key: String,
}

impl CartStore {
    /// Creates a store bound to the default [`CART_KEY`].
    pub fn new(slot: CartSlotBox) -> Self {
        Self::with_key(slot, CART_KEY)
    }

    pub fn with_key(slot: CartSlotBox, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load(&self) -> Vec<CartLine> {
        let bytes = match self.slot.read(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, "Failed to read cart slot: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(key = %self.key, "Discarding unreadable cart data: {e}");
                Vec::new()
            }
        }
    }

    pub fn save(&self, lines: &[CartLine]) {
        let bytes = match serde_json::to_vec(lines) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %self.key, "Failed to serialize cart: {e}");
                return;
            }
        };

        if let Err(e) = self.slot.write(&self.key, &bytes) {
            tracing::warn!(key = %self.key, "Failed to persist cart: {e}");
        }
    }
}
