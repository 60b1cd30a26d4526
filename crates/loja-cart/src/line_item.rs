//! Line items and the cart they live in
//!
//! The cart is keyed by line item name. Two products sharing a display name
//! collapse into one line; the persisted format carries no stronger identity.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reserved name of the synthetic installation add-on
pub const INSTALLATION_SERVICE: &str = "Installation Service";

/// One named entry in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product id, when the page knew it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name, unique within the cart
    pub name: String,
    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Always >= 1 while the item is in a cart
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item with quantity 1
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            quantity: 1,
        }
    }

    /// With catalog id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    /// With quantity
    #[inline]
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// `price * quantity`, unrounded
    #[inline]
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Whether this is the installation add-on
    #[inline]
    #[must_use]
    pub fn is_installation(&self) -> bool {
        self.name == INSTALLATION_SERVICE
    }
}

/// Sum of `price * quantity` over the given items
pub fn subtotal<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Decimal {
    items.into_iter().map(LineItem::line_total).sum()
}

/// Reasons a persisted item list is not a valid cart
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartShapeError {
    /// Two entries share a name
    #[error("duplicate line item: {0}")]
    DuplicateName(String),

    /// Entry stored with quantity 0
    #[error("non-positive quantity for: {0}")]
    ZeroQuantity(String),
}

/// Ordered line items, unique by name
///
/// Serialized as a plain JSON array of line items in insertion order.
/// Equality is order-sensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: IndexMap<String, LineItem>,
}

impl Cart {
    /// Create empty cart
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All items in insertion order, installation included
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.values()
    }

    /// Items shown in the cart modal: everything but the installation add-on
    pub fn display_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.values().filter(|item| !item.is_installation())
    }

    /// Look up an item by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LineItem> {
        self.items.get(name)
    }

    /// Number of distinct line items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart holds no items at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if nothing but (possibly) the installation add-on is present
    #[must_use]
    pub fn is_display_empty(&self) -> bool {
        self.display_items().next().is_none()
    }

    /// Add one unit; an existing line keeps its own price and id
    pub fn add(&mut self, name: &str, price: Decimal, id: Option<i64>) {
        match self.items.get_mut(name) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => {
                let item = LineItem::new(name, price).with_id(id);
                self.items.insert(item.name.clone(), item);
            }
        }
    }

    /// Remove the named line, preserving the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<LineItem> {
        self.items.shift_remove(name)
    }

    /// Shift the named line's quantity by `delta`
    ///
    /// A result <= 0 removes the line. The installation add-on stays at
    /// quantity 1: a negative delta removes it, any other is ignored.
    /// Returns `false` if nothing changed.
    pub fn apply_delta(&mut self, name: &str, delta: i64) -> bool {
        if name == INSTALLATION_SERVICE {
            return delta < 0 && self.items.shift_remove(name).is_some();
        }
        let Some(item) = self.items.get_mut(name) else {
            return false;
        };
        let next = i64::from(item.quantity).saturating_add(delta);
        if next <= 0 {
            self.items.shift_remove(name);
        } else {
            item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        true
    }

    /// Insert the installation add-on, or reset it to quantity 1 at `price`
    pub fn upsert_installation(&mut self, price: Decimal) {
        let item = self
            .items
            .entry(INSTALLATION_SERVICE.to_string())
            .or_insert_with(|| LineItem::new(INSTALLATION_SERVICE, price));
        item.price = price;
        item.quantity = 1;
    }

    /// Whether the installation add-on is present
    #[inline]
    #[must_use]
    pub fn has_installation(&self) -> bool {
        self.items.contains_key(INSTALLATION_SERVICE)
    }

    /// Drop every line
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities, installation excluded
    #[must_use]
    pub fn badge_count(&self) -> u32 {
        self.display_items()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Subtotal shown in the cart modal, installation excluded
    #[must_use]
    pub fn display_subtotal(&self) -> Decimal {
        subtotal(self.display_items())
    }

    /// Subtotal over the whole cart, installation included
    #[must_use]
    pub fn checkout_subtotal(&self) -> Decimal {
        subtotal(self.items())
    }
}

impl PartialEq for Cart {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.items.values().eq(other.items.values())
    }
}

impl Eq for Cart {}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartShapeError;

    fn try_from(list: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut items = IndexMap::with_capacity(list.len());
        for item in list {
            if item.quantity == 0 {
                return Err(CartShapeError::ZeroQuantity(item.name));
            }
            if items.contains_key(&item.name) {
                return Err(CartShapeError::DuplicateName(item.name));
            }
            items.insert(item.name.clone(), item);
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items.into_values().collect()
    }
}

/// Item count label, e.g. "1 item" / "3 items"
#[must_use]
pub fn item_label(count: u32) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}
