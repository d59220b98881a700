//! # Transaction Repository
//!
//! Database operations for POS transactions and their line snapshots.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Checkout Persistence (one SQL transaction)              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO pos_transactions (...)                                   │
//! │    INSERT INTO pos_transaction_items (...)   × N lines                  │
//! │    [cash only]                                                          │
//! │    UPDATE register_sessions                                             │
//! │      SET cash_total += total, transaction_count += 1, version += 1      │
//! │      WHERE id = ? AND status = 'open' AND version = ?                   │
//! │      └── 0 rows? → ROLLBACK (stale session or drawer closed under us)   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either the receipt, its lines, and the drawer credit all land, or     │
//! │  none of them do.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gopet_core::{PaymentMethod, Transaction, TransactionItem, TransactionStatus};

/// Repository for POS transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Persists a completed transaction, its line snapshots, and (for cash)
    /// the register session credit — all in one database transaction.
    ///
    /// ## Arguments
    /// * `transaction` - the finalized record from the payment finalizer
    /// * `items` - line snapshots, already priced and ordered
    /// * `register_version` - the version of the open register session that
    ///   was read before checkout; required when the transaction is cash
    ///   and carries a `register_session_id`
    ///
    /// ## Errors
    /// * `VersionConflict` - the session changed (or closed) since it was
    ///   read; nothing is persisted
    pub async fn insert_completed(
        &self,
        transaction: &Transaction,
        items: &[TransactionItem],
        register_version: Option<i64>,
    ) -> DbResult<()> {
        debug!(
            id = %transaction.id,
            total = transaction.total_cents,
            items = items.len(),
            "Persisting transaction"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pos_transactions (
                id, client_id, register_session_id,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                payment_method, tendered_cents, change_cents, payment_reference,
                status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.client_id)
        .bind(&transaction.register_session_id)
        .bind(transaction.subtotal_cents)
        .bind(transaction.discount_cents)
        .bind(transaction.tax_cents)
        .bind(transaction.total_cents)
        .bind(transaction.payment_method)
        .bind(transaction.tendered_cents)
        .bind(transaction.change_cents)
        .bind(&transaction.payment_reference)
        .bind(transaction.status)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO pos_transaction_items (
                    id, transaction_id, item_id, kind,
                    name_snapshot, unit_price_cents, quantity,
                    line_total_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.item_id)
            .bind(item.kind)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.position)
            .execute(&mut *tx)
            .await?;
        }

        // Cash feeds the open drawer, guarded by the version read at
        // checkout time.
        if transaction.payment_method == PaymentMethod::Cash {
            if let (Some(session_id), Some(version)) =
                (&transaction.register_session_id, register_version)
            {
                let result = sqlx::query(
                    r#"
                    UPDATE register_sessions SET
                        cash_total_cents = cash_total_cents + ?1,
                        transaction_count = transaction_count + 1,
                        version = version + 1
                    WHERE id = ?2 AND status = 'open' AND version = ?3
                    "#,
                )
                .bind(transaction.total_cents)
                .bind(session_id)
                .bind(version)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    // Dropping `tx` rolls back; be explicit anyway.
                    tx.rollback().await?;
                    return Err(DbError::version_conflict("RegisterSession", session_id));
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT
                id, client_id, register_session_id,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                payment_method, tendered_cents, change_cents, payment_reference,
                status, created_at
            FROM pos_transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Gets all line snapshots for a transaction, in display order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT
                id, transaction_id, item_id, kind,
                name_snapshot, unit_price_cents, quantity,
                line_total_cents, position
            FROM pos_transaction_items
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the most recent transactions (dashboard view).
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT
                id, client_id, register_session_id,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                payment_method, tendered_cents, change_cents, payment_reference,
                status, created_at
            FROM pos_transactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Lists cash transactions recorded against a register session.
    pub async fn list_for_session(&self, session_id: &str) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT
                id, client_id, register_session_id,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                payment_method, tendered_cents, change_cents, payment_reference,
                status, created_at
            FROM pos_transactions
            WHERE register_session_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Voids a completed transaction.
    ///
    /// The row survives as the audit record; only the status flips.
    pub async fn void_transaction(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Voiding transaction");

        let result = sqlx::query(
            r#"
            UPDATE pos_transactions SET status = ?1
            WHERE id = ?2 AND status = ?3
            "#,
        )
        .bind(TransactionStatus::Voided)
        .bind(id)
        .bind(TransactionStatus::Completed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction (completed)", id));
        }

        Ok(())
    }
}

/// Generates a receipt-style transaction id: `TRX-YYYYMMDD-HHMMSS-NNNN`.
///
/// The trailing sequence keeps same-second checkouts on a busy counter
/// from colliding.
pub fn generate_transaction_id() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let seq = (nanos % 10000) as u16;
    format!("TRX-{}-{:04}", now.format("%Y%m%d-%H%M%S"), seq)
}

/// Generates a new transaction item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
