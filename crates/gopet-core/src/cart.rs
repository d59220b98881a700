//! # Cart Aggregator
//!
//! The in-memory cart for one checkout: line items, an optional discount,
//! an optional client, and the totals pipeline.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Totals                                      │
//! │                                                                         │
//! │  subtotal   = Σ (unit_price × quantity)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount   = percentage-of-subtotal  OR  fixed amount                 │
//! │               (always clamped to the subtotal — the taxable base       │
//! │                and the grand total can never go negative)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tax        = (subtotal − discount) × tax_rate                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total      = (subtotal − discount) + tax                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `(item_id, kind)`; adding the same item again
//!   merges quantities. Insertion order is display order.
//! - Quantity is always ≥ 1 (an update to 0 removes the line).
//! - At most one discount is active; applying a new one replaces it.
//! - Nothing here touches I/O; persistence happens at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{ItemKind, TaxRate};
use crate::validation::{validate_item_name, validate_price_cents, validate_quantity};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart: a product or service with a frozen unit price.
///
/// ## Price Freezing
/// The price is captured when the line is built from the catalog. If the
/// groomer updates the service price mid-checkout, this cart keeps the
/// price the customer was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Catalog id of the product or service.
    pub item_id: String,

    /// Product vs. service; part of the line key.
    pub kind: ItemKind,

    /// Display name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart, always ≥ 1.
    pub quantity: i64,

    /// When this line was first added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Builds a validated cart line.
    ///
    /// ## Validation
    /// - name: non-empty, ≤ 200 chars
    /// - unit price: ≥ 0 (zero allowed for comped items)
    /// - quantity: 1..=999
    pub fn new(
        item_id: impl Into<String>,
        kind: ItemKind,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_item_name(&name)?;
        validate_price_cents(unit_price.cents())?;
        validate_quantity(quantity)?;

        Ok(CartLine {
            item_id: item_id.into(),
            kind,
            name,
            unit_price_cents: unit_price.cents(),
            quantity,
            added_at: Utc::now(),
        })
    }

    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    fn matches(&self, item_id: &str, kind: ItemKind) -> bool {
        self.item_id == item_id && self.kind == kind
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A cart-level discount. At most one is active per cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Discount {
    /// Percentage off the subtotal, in basis points (1500 = 15%).
    Percentage { bps: u32 },
    /// Fixed amount off the subtotal.
    Fixed { amount: Money },
}

impl Discount {
    /// Builds a percentage discount, bounded to 0..=100%.
    pub fn percentage(bps: u32) -> Result<Self, ValidationError> {
        if bps > 10000 {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 10000,
            });
        }
        Ok(Discount::Percentage { bps })
    }

    /// Builds a fixed discount; the amount must not be negative.
    pub fn fixed(amount: Money) -> Result<Self, ValidationError> {
        if amount.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "discount amount".to_string(),
            });
        }
        Ok(Discount::Fixed { amount })
    }

    /// Resolves the discount against a subtotal.
    ///
    /// The result is clamped to the subtotal: a $20-off coupon on a $15
    /// cart discounts $15, never more. This is the single place the clamp
    /// policy lives.
    pub fn amount_off(&self, subtotal: Money) -> Money {
        let raw = match self {
            Discount::Percentage { bps } => subtotal.percentage(*bps),
            Discount::Fixed { amount } => *amount,
        };
        raw.min(subtotal)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The checkout cart.
///
/// Created empty per POS session, mutated by cashier actions, cleared on
/// successful payment or explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    /// Lines in insertion order (= display order).
    pub lines: Vec<CartLine>,

    /// Active discount, if any.
    pub discount: Option<Discount>,

    /// Client the sale will be attached to, if any.
    pub client_id: Option<String>,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            discount: None,
            client_id: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a line to the cart, merging quantities for an existing
    /// `(item_id, kind)` key.
    ///
    /// ## Behavior
    /// - Key already in cart: quantity increases by `line.quantity`
    /// - New key: line is appended at the end
    pub fn add_line(&mut self, line: CartLine) -> Result<(), CoreError> {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(&line.item_id, line.kind))
        {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Updates the quantity of a line.
    ///
    /// ## Behavior
    /// - quantity ≤ 0: removes the line (same as `remove_item`)
    /// - line not found: `LineNotFound` error
    pub fn update_quantity(
        &mut self,
        item_id: &str,
        kind: ItemKind,
        quantity: i64,
    ) -> Result<(), CoreError> {
        if quantity <= 0 {
            self.remove_item(item_id, kind);
            return Ok(());
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        match self.lines.iter_mut().find(|l| l.matches(item_id, kind)) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound {
                item_id: item_id.to_string(),
            }),
        }
    }

    /// Removes a line by key. No-op if the line is absent.
    pub fn remove_item(&mut self, item_id: &str, kind: ItemKind) {
        self.lines.retain(|l| !l.matches(item_id, kind));
    }

    /// Replaces the active discount; `None` clears it.
    pub fn apply_discount(&mut self, discount: Option<Discount>) {
        self.discount = discount;
    }

    /// Attaches or detaches a client.
    pub fn set_client(&mut self, client_id: Option<String>) {
        self.client_id = client_id;
    }

    /// Clears lines, discount, and client.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = None;
        self.client_id = None;
        self.created_at = Utc::now();
    }

    /// Returns the number of unique lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Calculates the subtotal (before discount and tax).
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Computes the full totals breakdown for the given business tax rate.
    ///
    /// Pure: same cart + same rate always yields the same totals.
    pub fn totals(&self, tax_rate: TaxRate) -> CartTotals {
        let subtotal = self.subtotal();
        let discount = self
            .discount
            .map(|d| d.amount_off(subtotal))
            .unwrap_or_else(Money::zero);
        let taxed_base = subtotal.saturating_sub(discount);
        let tax = taxed_base.calculate_tax(tax_rate);
        let total = taxed_base + tax;

        CartTotals {
            line_count: self.line_count(),
            total_quantity: self.total_quantity(),
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
            tax_cents: tax.cents(),
            total_cents: total.cents(),
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Totals summary for API responses and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl CartTotals {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn groom_line(qty: i64) -> CartLine {
        CartLine::new(
            "svc-groom-lg",
            ItemKind::Service,
            "Full Groom - Large Breed",
            Money::from_cents(4599),
            qty,
        )
        .unwrap()
    }

    fn shampoo_line(qty: i64) -> CartLine {
        CartLine::new(
            "prod-shampoo",
            ItemKind::Product,
            "Oatmeal Dog Shampoo 500ml",
            Money::from_cents(1250),
            qty,
        )
        .unwrap()
    }

    #[test]
    fn test_line_validation() {
        assert!(CartLine::new("x", ItemKind::Product, "", Money::from_cents(100), 1).is_err());
        assert!(CartLine::new("x", ItemKind::Product, "ok", Money::from_cents(-1), 1).is_err());
        assert!(CartLine::new("x", ItemKind::Product, "ok", Money::from_cents(100), 0).is_err());
        // Zero price is allowed (comped items)
        assert!(CartLine::new("x", ItemKind::Product, "ok", Money::zero(), 1).is_ok());
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut cart = Cart::new();
        cart.add_line(groom_line(1)).unwrap();
        cart.add_line(groom_line(1)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 9198);
    }

    #[test]
    fn test_same_id_different_kind_is_a_new_line() {
        // A service and a product can share a raw id; the key is (id, kind)
        let mut cart = Cart::new();
        let svc =
            CartLine::new("42", ItemKind::Service, "Nail Trim", Money::from_cents(1500), 1).unwrap();
        let prod =
            CartLine::new("42", ItemKind::Product, "Nail Clipper", Money::from_cents(899), 1)
                .unwrap();
        cart.add_line(svc).unwrap();
        cart.add_line(prod).unwrap();

        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_line(groom_line(2)).unwrap();

        cart.update_quantity("svc-groom-lg", ItemKind::Service, 3)
            .unwrap();
        assert_eq!(cart.total_quantity(), 3);

        // Zero removes
        cart.update_quantity("svc-groom-lg", ItemKind::Service, 0)
            .unwrap();
        assert!(cart.is_empty());

        // Updating a missing line errors; removing one is a no-op
        assert!(cart
            .update_quantity("svc-groom-lg", ItemKind::Service, 1)
            .is_err());
        cart.remove_item("svc-groom-lg", ItemKind::Service);
    }

    #[test]
    fn test_quantity_ops_are_order_independent() {
        // add twice then remove the merged line once → gone entirely;
        // add(2), update(5), add(1) → 6 regardless of interleaving
        let mut cart = Cart::new();
        cart.add_line(shampoo_line(2)).unwrap();
        cart.update_quantity("prod-shampoo", ItemKind::Product, 5)
            .unwrap();
        cart.add_line(shampoo_line(1)).unwrap();
        assert_eq!(cart.total_quantity(), 6);

        let mut cart2 = Cart::new();
        cart2.add_line(shampoo_line(5)).unwrap();
        cart2.add_line(shampoo_line(1)).unwrap();
        assert_eq!(cart2.total_quantity(), 6);
    }

    #[test]
    fn test_totals_no_discount() {
        // $45.99 × 2, no discount, 8.5% tax
        let mut cart = Cart::new();
        cart.add_line(groom_line(2)).unwrap();

        let totals = cart.totals(TaxRate::from_bps(850));
        assert_eq!(totals.subtotal_cents, 9198); // $91.98
        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.tax_cents, 782); // $7.8183 → $7.82
        assert_eq!(totals.total_cents, 9980); // $99.80
    }

    #[test]
    fn test_totals_percentage_discount() {
        let mut cart = Cart::new();
        cart.add_line(
            CartLine::new("svc", ItemKind::Service, "Daycare Day", Money::from_cents(10000), 1)
                .unwrap(),
        )
        .unwrap();
        cart.apply_discount(Some(Discount::percentage(1500).unwrap())); // 15%

        let totals = cart.totals(TaxRate::from_bps(1000)); // 10%
        assert_eq!(totals.subtotal_cents, 10000);
        assert_eq!(totals.discount_cents, 1500);
        assert_eq!(totals.tax_cents, 850); // tax on $85.00
        assert_eq!(totals.total_cents, 9350);
    }

    #[test]
    fn test_fixed_discount_exceeding_subtotal_clamps_total_at_zero() {
        let mut cart = Cart::new();
        cart.add_line(
            CartLine::new("svc", ItemKind::Service, "Nail Trim", Money::from_cents(1500), 1)
                .unwrap(),
        )
        .unwrap();
        cart.apply_discount(Some(Discount::fixed(Money::from_cents(2000)).unwrap()));

        let totals = cart.totals(TaxRate::from_bps(850));
        assert_eq!(totals.discount_cents, 1500); // clamped to subtotal
        assert_eq!(totals.tax_cents, 0);
        assert_eq!(totals.total_cents, 0);
        assert!(totals.total_cents >= 0);
    }

    #[test]
    fn test_discount_constructors_validate() {
        assert!(Discount::percentage(10001).is_err());
        assert!(Discount::percentage(10000).is_ok());
        assert!(Discount::fixed(Money::from_cents(-1)).is_err());
        assert!(Discount::fixed(Money::zero()).is_ok());
    }

    #[test]
    fn test_apply_discount_replaces_and_clears() {
        let mut cart = Cart::new();
        cart.add_line(shampoo_line(1)).unwrap();

        cart.apply_discount(Some(Discount::percentage(1000).unwrap()));
        cart.apply_discount(Some(Discount::fixed(Money::from_cents(200)).unwrap()));
        assert_eq!(
            cart.discount,
            Some(Discount::Fixed {
                amount: Money::from_cents(200)
            })
        );

        cart.apply_discount(None);
        assert!(cart.discount.is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        cart.add_line(groom_line(1)).unwrap();
        cart.apply_discount(Some(Discount::percentage(500).unwrap()));
        cart.set_client(Some("client-7".to_string()));

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.discount.is_none());
        assert!(cart.client_id.is_none());
    }
}
