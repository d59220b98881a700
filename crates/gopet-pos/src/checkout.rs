//! # Checkout Service (Payment Finalizer)
//!
//! Turns the active cart into an immutable transaction record.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       process_payment                                   │
//! │                                                                         │
//! │  1. Snapshot the cart under its lock (lines, discount, client)         │
//! │  2. Validate before any I/O:                                           │
//! │       empty cart?            → CART_ERROR                              │
//! │       cash, tendered < total → PAYMENT_ERROR                           │
//! │  3. Method-specific step:                                              │
//! │       Cash  → require an open register session                         │
//! │       Card  → simulated authorization delay (no real gateway)          │
//! │       Qr    → carry the generated payment reference                    │
//! │  4. Persist transaction + line snapshots (+ drawer credit for cash)    │
//! │     in ONE database transaction                                        │
//! │  5. Success → clear cart, discount, and client; build receipt          │
//! │     Failure → cart untouched, typed error, caller may retry            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PosConfig;
use crate::error::ServiceError;
use crate::state::CartState;
use gopet_core::{
    CoreError, Money, PaymentMethod, PaymentTender, Transaction, TransactionItem,
    TransactionStatus,
};
use gopet_db::repository::transaction::{generate_item_id, generate_transaction_id};
use gopet_db::Database;

// =============================================================================
// Receipt
// =============================================================================

/// What the customer takes home.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_id: String,
    pub store_name: String,
    /// RFC 3339 completion time.
    pub timestamp: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub tendered_cents: Option<i64>,
    pub change_cents: Option<i64>,
    pub payment_reference: Option<String>,
}

/// One printed line on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The payment finalizer.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    config: PosConfig,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(db: Database, config: PosConfig) -> Self {
        CheckoutService { db, config }
    }

    /// Generates a QR payment reference for display.
    ///
    /// There is no payment-status callback behind it; the cashier confirms
    /// completion and then submits the `Qr` tender carrying this reference.
    pub fn qr_payment_reference(&self) -> String {
        format!("{}-{}", self.config.qr_reference_prefix, Uuid::new_v4())
    }

    /// Finalizes the active cart against the given tender.
    ///
    /// On success the cart (and its discount/client selection) is cleared
    /// and the receipt is returned. On any failure the cart is untouched
    /// and the action can simply be re-attempted.
    pub async fn process_payment(
        &self,
        cart: &CartState,
        tender: PaymentTender,
    ) -> Result<Receipt, ServiceError> {
        // Snapshot a consistent view; the lock is not held across awaits.
        let (lines, client_id, totals) = cart.with_cart(|c| {
            (
                c.lines.clone(),
                c.client_id.clone(),
                c.totals(self.config.tax_rate()),
            )
        });

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let total = totals.total();
        debug!(
            total = total.cents(),
            method = ?tender.method(),
            lines = lines.len(),
            "Processing payment"
        );

        // Method-specific validation and side inputs
        let mut tendered_cents = None;
        let mut change_cents = None;
        let mut payment_reference = None;
        let mut register_session_id = None;
        let mut register_version = None;

        match &tender {
            PaymentTender::Cash { tendered } => {
                if *tendered < total {
                    return Err(CoreError::InsufficientCash {
                        total_cents: total.cents(),
                        tendered_cents: tendered.cents(),
                    }
                    .into());
                }

                // Cash requires an open drawer; card/QR do not.
                let session = self
                    .db
                    .registers()
                    .get_open()
                    .await?
                    .ok_or(CoreError::RegisterNotOpen)?;

                tendered_cents = Some(tendered.cents());
                change_cents = Some((*tendered - total).cents());
                register_version = Some(session.version);
                register_session_id = Some(session.id);
            }
            PaymentTender::Card => {
                // Simulated authorization; stands in for the gateway round
                // trip. Failure here would leave the cart untouched.
                tokio::time::sleep(self.config.card_processing_delay()).await;
            }
            PaymentTender::Qr { reference } => {
                payment_reference = Some(reference.clone());
            }
        }

        let transaction = Transaction {
            id: generate_transaction_id(),
            client_id,
            register_session_id,
            subtotal_cents: totals.subtotal_cents,
            discount_cents: totals.discount_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
            payment_method: tender.method(),
            tendered_cents,
            change_cents,
            payment_reference,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };

        let items: Vec<TransactionItem> = lines
            .iter()
            .enumerate()
            .map(|(position, line)| TransactionItem {
                id: generate_item_id(),
                transaction_id: transaction.id.clone(),
                item_id: line.item_id.clone(),
                kind: line.kind,
                name_snapshot: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line.line_total().cents(),
                position: position as i64,
            })
            .collect();

        // One database transaction: receipt, lines, drawer credit.
        self.db
            .transactions()
            .insert_completed(&transaction, &items, register_version)
            .await?;

        // Only now is the cart released.
        cart.with_cart_mut(|c| c.clear());

        info!(
            transaction_id = %transaction.id,
            total = transaction.total_cents,
            method = ?transaction.payment_method,
            "Payment completed"
        );

        Ok(self.build_receipt(&transaction, &items))
    }

    /// Re-assembles a receipt for a persisted transaction (reprint).
    pub async fn get_receipt(&self, transaction_id: &str) -> Result<Receipt, ServiceError> {
        let transaction = self
            .db
            .transactions()
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction", transaction_id))?;

        let items = self.db.transactions().get_items(transaction_id).await?;
        Ok(self.build_receipt(&transaction, &items))
    }

    /// Voids a completed transaction.
    ///
    /// The record survives for reporting; no money movement is attempted.
    pub async fn void_transaction(&self, transaction_id: &str) -> Result<(), ServiceError> {
        self.db
            .transactions()
            .void_transaction(transaction_id)
            .await?;
        info!(transaction_id = %transaction_id, "Transaction voided");
        Ok(())
    }

    /// Lists recent transactions for the dashboard.
    pub async fn recent_transactions(&self, limit: i64) -> Result<Vec<Transaction>, ServiceError> {
        Ok(self.db.transactions().list_recent(limit).await?)
    }

    fn build_receipt(&self, transaction: &Transaction, items: &[TransactionItem]) -> Receipt {
        Receipt {
            transaction_id: transaction.id.clone(),
            store_name: self.config.store_name.clone(),
            timestamp: transaction.created_at.to_rfc3339(),
            lines: items
                .iter()
                .map(|i| ReceiptLine {
                    name: i.name_snapshot.clone(),
                    quantity: i.quantity,
                    unit_price_cents: i.unit_price_cents,
                    line_total_cents: i.line_total_cents,
                })
                .collect(),
            subtotal_cents: transaction.subtotal_cents,
            discount_cents: transaction.discount_cents,
            tax_cents: transaction.tax_cents,
            total_cents: transaction.total_cents,
            payment_method: transaction.payment_method,
            tendered_cents: transaction.tendered_cents,
            change_cents: transaction.change_cents,
            payment_reference: transaction.payment_reference.clone(),
        }
    }
}

/// Convenience constructor for a cash tender from raw cents.
pub fn cash_tender(cents: i64) -> PaymentTender {
    PaymentTender::Cash {
        tendered: Money::from_cents(cents),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::register::RegisterService;
    use gopet_core::{CartLine, ItemKind};
    use gopet_db::DbConfig;

    fn test_config(tax_bps: u32) -> PosConfig {
        PosConfig {
            tax_rate_bps: tax_bps,
            card_processing_delay_ms: 0,
            ..PosConfig::default()
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn cart_with(name: &str, cents: i64, qty: i64) -> CartState {
        let cart = CartState::new();
        let line =
            CartLine::new("item-1", ItemKind::Service, name, Money::from_cents(cents), qty)
                .unwrap();
        cart.with_cart_mut(|c| c.add_line(line)).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = test_db().await;
        let service = CheckoutService::new(db, test_config(850));
        let cart = CartState::new();

        let err = service
            .process_payment(&cart, PaymentTender::Card)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_card_checkout_clears_cart() {
        let db = test_db().await;
        let service = CheckoutService::new(db.clone(), test_config(850));
        let cart = cart_with("Full Groom - Large Breed", 4599, 2);
        cart.with_cart_mut(|c| c.set_client(Some("client-1".to_string())));

        let receipt = service
            .process_payment(&cart, PaymentTender::Card)
            .await
            .unwrap();

        assert_eq!(receipt.subtotal_cents, 9198);
        assert_eq!(receipt.tax_cents, 782);
        assert_eq!(receipt.total_cents, 9980);
        assert_eq!(receipt.payment_method, PaymentMethod::Card);
        assert_eq!(receipt.lines.len(), 1);

        // Cart, client selection cleared
        assert!(cart.with_cart(|c| c.is_empty()));
        assert!(cart.with_cart(|c| c.client_id.is_none()));

        // Persisted and reprintable
        let reprint = service.get_receipt(&receipt.transaction_id).await.unwrap();
        assert_eq!(reprint.total_cents, 9980);
    }

    /// Register at $100.00, cash sale $23.50 tendered $25.00 → change
    /// $1.50; close at $123.50 balances.
    #[tokio::test]
    async fn test_cash_checkout_feeds_register() {
        let db = test_db().await;
        let registers = RegisterService::new(db.clone());
        registers
            .open_register("sam", Money::from_cents(10000))
            .await
            .unwrap();

        let service = CheckoutService::new(db.clone(), test_config(0));
        let cart = cart_with("Nail Trim", 2350, 1);

        let receipt = service
            .process_payment(&cart, cash_tender(2500))
            .await
            .unwrap();
        assert_eq!(receipt.total_cents, 2350);
        assert_eq!(receipt.tendered_cents, Some(2500));
        assert_eq!(receipt.change_cents, Some(150));

        let summary = registers
            .close_register(Money::from_cents(12350))
            .await
            .unwrap();
        assert_eq!(summary.expected_cents, 12350);
        assert_eq!(summary.discrepancy_cents, 0);
    }

    #[tokio::test]
    async fn test_cash_without_open_register_rejected() {
        let db = test_db().await;
        let service = CheckoutService::new(db, test_config(0));
        let cart = cart_with("Nail Trim", 2350, 1);

        let err = service
            .process_payment(&cart, cash_tender(2500))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegisterError);

        // Cart untouched; the action is retryable after opening the drawer
        assert!(!cart.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_insufficient_cash_rejected_before_persisting() {
        let db = test_db().await;
        let registers = RegisterService::new(db.clone());
        registers
            .open_register("sam", Money::from_cents(10000))
            .await
            .unwrap();

        let service = CheckoutService::new(db.clone(), test_config(0));
        let cart = cart_with("Nail Trim", 2350, 1);

        let err = service
            .process_payment(&cart, cash_tender(2000))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(!cart.with_cart(|c| c.is_empty()));

        // Nothing was persisted
        let recent = service.recent_transactions(10).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_qr_checkout_records_reference() {
        let db = test_db().await;
        let service = CheckoutService::new(db, test_config(850));
        let cart = cart_with("Daycare Day", 3500, 1);

        let reference = service.qr_payment_reference();
        assert!(reference.starts_with("GOPET-QR-"));

        let receipt = service
            .process_payment(
                &cart,
                PaymentTender::Qr {
                    reference: reference.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.payment_reference, Some(reference));
        assert_eq!(receipt.payment_method, PaymentMethod::Qr);
    }

    #[tokio::test]
    async fn test_void_transaction() {
        let db = test_db().await;
        let service = CheckoutService::new(db, test_config(850));
        let cart = cart_with("Daycare Day", 3500, 1);

        let receipt = service
            .process_payment(&cart, PaymentTender::Card)
            .await
            .unwrap();
        service.void_transaction(&receipt.transaction_id).await.unwrap();

        let recent = service.recent_transactions(10).await.unwrap();
        assert_eq!(recent[0].status, TransactionStatus::Voided);
    }
}
