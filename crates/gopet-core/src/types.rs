//! # Domain Types
//!
//! Core domain types used throughout GoPet POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │ TransactionItem │   │  PaymentTender  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (TRX-...)   │   │  item snapshot  │   │  Cash{tendered} │       │
//! │  │  totals (cents) │   │  price frozen   │   │  Card           │       │
//! │  │  method, status │   │  at checkout    │   │  Qr{reference}  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    ItemKind     │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Product        │   │  Cash           │       │
//! │  │  850 = 8.5%     │   │  Service        │   │  Card / Qr      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `TransactionItem` freezes the cart line (name, unit price) at checkout
//! time, so receipts stay correct even when the catalog changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 850 bps = 8.5% — a typical combined state/local sales tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Item Kind
// =============================================================================

/// What a cart line sells: a retail product or a performed service.
///
/// A grooming salon rings up "Dog Shampoo 500ml" (product) and
/// "Full Groom - Large Breed" (service) in the same cart; the two kinds
/// share an id namespace with their respective catalogs, so a line is
/// identified by `(item_id, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Physical retail item (food, toys, shampoo).
    Product,
    /// Performed work (grooming, daycare day, exam).
    Service,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a completed transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; feeds the open register session.
    Cash,
    /// Card, authorized through a simulated processing step.
    Card,
    /// QR payment reference, confirmed by the cashier.
    Qr,
}

// =============================================================================
// Payment Tender
// =============================================================================

/// The payment offered at checkout, with method-specific data.
///
/// This is the transfer object the checkout UI submits; it is validated by
/// the payment finalizer before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentTender {
    /// Cash handed over; must cover the total, change is returned.
    Cash { tendered: Money },
    /// Card on the terminal.
    Card,
    /// Static QR reference displayed to the customer.
    Qr { reference: String },
}

impl PaymentTender {
    /// Returns the payment method this tender settles with.
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentTender::Cash { .. } => PaymentMethod::Cash,
            PaymentTender::Card => PaymentMethod::Card,
            PaymentTender::Qr { .. } => PaymentMethod::Qr,
        }
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a POS transaction.
///
/// Transactions are written as `Completed` and never mutated afterwards,
/// with one exception: voiding flips the status (the row itself survives
/// as the audit record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Paid and finalized.
    Completed,
    /// Cancelled after completion; kept for reporting.
    Voided,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable record of a completed checkout.
///
/// Created once by the payment finalizer, persisted together with its line
/// snapshots in a single database transaction, and read back by dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    /// Receipt id, e.g. `TRX-20260807-142530-0042`.
    pub id: String,
    /// Client the sale is attached to, if any.
    pub client_id: Option<String>,
    /// Open register session credited for cash payments.
    pub register_session_id: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// For cash: amount the customer handed over.
    pub tendered_cents: Option<i64>,
    /// For cash: change returned.
    pub change_cents: Option<i64>,
    /// For QR: the generated payment reference.
    pub payment_reference: Option<String>,
    pub status: TransactionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the change due as Money (zero for non-cash).
    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents.unwrap_or(0))
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item snapshot inside a transaction.
/// Uses the snapshot pattern to freeze cart data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    /// Catalog id of the product or service sold.
    pub item_id: String,
    pub kind: ItemKind,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    /// Display order, mirrors cart insertion order.
    pub position: i64,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(850);
        assert_eq!(rate.bps(), 850);
        assert!((rate.percentage() - 8.5).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.5);
        assert_eq!(rate.bps(), 850);
    }

    #[test]
    fn test_tender_method() {
        let cash = PaymentTender::Cash {
            tendered: Money::from_cents(2500),
        };
        assert_eq!(cash.method(), PaymentMethod::Cash);
        assert_eq!(PaymentTender::Card.method(), PaymentMethod::Card);
        let qr = PaymentTender::Qr {
            reference: "GOPET-QR-1".to_string(),
        };
        assert_eq!(qr.method(), PaymentMethod::Qr);
    }

    #[test]
    fn test_transaction_status_default() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Completed);
    }
}
