use super::product::Product;
use super::store::CartStore;
use crate::error::CartError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

/// Opaque, stable product identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Number of units of one product, always within `1..=Quantity::MAX`.
///
/// Construction never fails: out-of-range input is coerced into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(9999);

    /// Coerces any integer into range: non-positive becomes 1, anything above
    /// the cap becomes the cap.
    pub fn new(value: i64) -> Self {
        if value < 1 {
            Self::MIN
        } else if value > i64::from(Self::MAX.0) {
            Self::MAX
        } else {
            Self(value as u32)
        }
    }

    /// Parses free-form user input. Fractions are floored, anything that is not
    /// a finite number counts as 1.
    pub fn parse_lenient(input: &str) -> Self {
        input.trim().parse::<f64>().map_or(Self::MIN, Self::from)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Adds `other` units, clamping at the cap.
    pub fn saturating_add(self, other: Quantity) -> Self {
        Self::new(i64::from(self.0) + i64::from(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

/// Floors fractional values; NaN and infinities count as 1.
impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::new(value.floor() as i64)
        } else {
            Self::MIN
        }
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative price of a single unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, CartError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CartError::ValidationError(
                "Price must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for UnitPrice {
    type Error = CartError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitPrice> for Decimal {
    fn from(price: UnitPrice) -> Self {
        price.0
    }
}

impl Mul<Quantity> for UnitPrice {
    type Output = Decimal;

    /// Saturates at `Decimal::MAX` instead of overflowing.
    fn mul(self, rhs: Quantity) -> Decimal {
        self.0.saturating_mul(Decimal::from(rhs.0))
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// One product-quantity pair held in the cart.
///
/// Display metadata and price are copied from the product when it is added and
/// are never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "_id", alias = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "price", default)]
    pub unit_price: UnitPrice,
    #[serde(default)]
    pub quantity: Quantity,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * self.quantity
    }
}

/// The visitor's cart: an ordered list of lines, unique by product id.
///
/// All mutation goes through this type. Every mutator writes the new state
/// through to the backing [`CartStore`] before returning; a failed write is
/// logged by the store and the in-memory state stays authoritative.
pub struct Cart {
    lines: Vec<CartLine>,
    store: CartStore,
}

impl Cart {
    /// Rehydrates a cart from `store`.
    ///
    /// Lines sharing a product id are merged with the same additive, capped
    /// rule `add_item` uses.
    pub fn load(store: CartStore) -> Self {
        let mut lines: Vec<CartLine> = Vec::new();
        for line in store.load() {
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity)
                }
                None => lines.push(line),
            }
        }
        Self { lines, store }
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    pub fn add_item(&mut self, product: &Product, quantity: i64) {
        let quantity = Quantity::new(quantity);
        match self.position(&product.id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(quantity);
            }
            None => self.lines.push(CartLine::from_product(product, quantity)),
        }
        self.persist();
    }

    /// Removes the line for `product_id`; absent ids are ignored.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
        self.persist();
    }

    /// Sets the quantity of an existing line. Zero or negative input collapses
    /// to 1; it never removes the line.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if let Some(idx) = self.position(product_id) {
            self.lines[idx].quantity = Quantity::new(quantity);
        }
        self.persist();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of `unit_price * quantity` across all lines, saturating at
    /// `Decimal::MAX`.
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| &line.product_id == product_id)
    }

    fn persist(&self) {
        self.store.save(&self.lines);
    }
}
