//! # Cash Register Session
//!
//! The open/close lifecycle of one physical cash drawer, bounding one
//! shift's cash transactions.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register Session Lifecycle                           │
//! │                                                                         │
//! │            open(opening ≥ 0)                close(actual)               │
//! │  Closed ───────────────────────► Open ───────────────────► Closed      │
//! │  (initial)                        │                        (terminal)   │
//! │                                   │                                     │
//! │                     record_cash_transaction(amount)                     │
//! │                     current = opening + Σ cash amounts                  │
//! │                                                                         │
//! │  At close:  expected    = opening + Σ cash amounts                      │
//! │             discrepancy = actual − expected                             │
//! │                                                                         │
//! │  The discrepancy is reported, not remediated. There is no rollback.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only one session may be open at a time; the persistence layer backs this
//! up with a partial unique index, and the domain type refuses operations
//! in the wrong state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;
use crate::money::Money;
use crate::validation::validate_opening_balance;

// =============================================================================
// Register Status
// =============================================================================

/// Whether the drawer is currently open for business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    Open,
    Closed,
}

// =============================================================================
// Register Session
// =============================================================================

/// One cash drawer shift.
///
/// The running balance is maintained as `opening + cash_total`; individual
/// cash transactions live in `pos_transactions` keyed by this session's id,
/// so the session itself only carries the totals it needs for
/// reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RegisterSession {
    pub id: String,
    /// Who opened the drawer.
    pub cashier: String,
    pub status: RegisterStatus,
    /// Float counted into the drawer at open.
    pub opening_cents: i64,
    /// Running sum of cash transaction totals recorded while open.
    pub cash_total_cents: i64,
    /// Number of cash transactions recorded while open.
    pub transaction_count: i64,
    /// Manually counted balance, set at close.
    pub actual_cents: Option<i64>,
    /// actual − expected, set at close.
    pub discrepancy_cents: Option<i64>,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token; bumped on every persisted update.
    pub version: i64,
}

impl RegisterSession {
    /// Opens a new register session with the given opening float.
    ///
    /// ## Errors
    /// Rejects a negative opening balance. Zero is allowed (card-only
    /// mornings happen).
    pub fn open(cashier: impl Into<String>, opening: Money) -> Result<Self, CoreError> {
        validate_opening_balance(opening.cents())?;

        Ok(RegisterSession {
            id: Uuid::new_v4().to_string(),
            cashier: cashier.into(),
            status: RegisterStatus::Open,
            opening_cents: opening.cents(),
            cash_total_cents: 0,
            transaction_count: 0,
            actual_cents: None,
            discrepancy_cents: None,
            opened_at: Utc::now(),
            closed_at: None,
            version: 0,
        })
    }

    /// Checks whether the session is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }

    /// Returns the running drawer balance: opening + Σ cash amounts.
    #[inline]
    pub fn current(&self) -> Money {
        Money::from_cents(self.opening_cents + self.cash_total_cents)
    }

    /// Returns the balance the drawer should hold at close.
    #[inline]
    pub fn expected(&self) -> Money {
        self.current()
    }

    /// Records a cash transaction total against the open drawer.
    ///
    /// ## Errors
    /// - `RegisterNotOpen` if the session is closed
    /// - `InvalidCashAmount` for a negative amount
    pub fn record_cash_transaction(&mut self, amount: Money) -> Result<(), CoreError> {
        if !self.is_open() {
            return Err(CoreError::RegisterNotOpen);
        }
        if amount.is_negative() {
            return Err(CoreError::InvalidCashAmount {
                cents: amount.cents(),
            });
        }

        self.cash_total_cents += amount.cents();
        self.transaction_count += 1;
        Ok(())
    }

    /// Closes the session against a manually counted drawer balance.
    ///
    /// Transitions Open → Closed, records the close time, and reports the
    /// reconciliation. Closing is terminal; a closed session cannot be
    /// reopened or corrected.
    pub fn close(&mut self, actual: Money) -> Result<RegisterCloseSummary, CoreError> {
        if !self.is_open() {
            return Err(CoreError::RegisterNotOpen);
        }

        let expected = self.expected();
        let discrepancy = actual - expected;

        self.status = RegisterStatus::Closed;
        self.actual_cents = Some(actual.cents());
        self.discrepancy_cents = Some(discrepancy.cents());
        self.closed_at = Some(Utc::now());

        Ok(RegisterCloseSummary {
            session_id: self.id.clone(),
            cashier: self.cashier.clone(),
            opening_cents: self.opening_cents,
            cash_total_cents: self.cash_total_cents,
            transaction_count: self.transaction_count,
            expected_cents: expected.cents(),
            actual_cents: actual.cents(),
            discrepancy_cents: discrepancy.cents(),
            opened_at: self.opened_at,
            closed_at: self.closed_at.unwrap_or_else(Utc::now),
        })
    }
}

// =============================================================================
// Close Summary
// =============================================================================

/// The reconciliation report produced when a drawer closes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterCloseSummary {
    pub session_id: String,
    pub cashier: String,
    pub opening_cents: i64,
    pub cash_total_cents: i64,
    pub transaction_count: i64,
    pub expected_cents: i64,
    pub actual_cents: i64,
    /// actual − expected; negative means the drawer came up short.
    pub discrepancy_cents: i64,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
}

impl RegisterCloseSummary {
    /// Checks whether the count matched exactly.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.discrepancy_cents == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_negative_float() {
        assert!(RegisterSession::open("sam", Money::from_cents(-1)).is_err());
        assert!(RegisterSession::open("sam", Money::zero()).is_ok());
    }

    #[test]
    fn test_running_balance() {
        let mut session = RegisterSession::open("sam", Money::from_cents(10000)).unwrap();
        assert_eq!(session.current().cents(), 10000);

        session
            .record_cash_transaction(Money::from_cents(2350))
            .unwrap();
        session
            .record_cash_transaction(Money::from_cents(1000))
            .unwrap();

        assert_eq!(session.current().cents(), 13350);
        assert_eq!(session.transaction_count, 2);
    }

    /// Open $100.00, one cash sale $23.50, count $123.50 → balanced.
    #[test]
    fn test_close_balanced() {
        let mut session = RegisterSession::open("sam", Money::from_cents(10000)).unwrap();
        session
            .record_cash_transaction(Money::from_cents(2350))
            .unwrap();

        let summary = session.close(Money::from_cents(12350)).unwrap();
        assert_eq!(summary.expected_cents, 12350);
        assert_eq!(summary.actual_cents, 12350);
        assert_eq!(summary.discrepancy_cents, 0);
        assert!(summary.is_balanced());
        assert!(!session.is_open());
    }

    #[test]
    fn test_close_short_drawer() {
        let mut session = RegisterSession::open("sam", Money::from_cents(10000)).unwrap();
        session
            .record_cash_transaction(Money::from_cents(5000))
            .unwrap();

        // Counted $5 short
        let summary = session.close(Money::from_cents(14500)).unwrap();
        assert_eq!(summary.discrepancy_cents, -500);
        assert!(!summary.is_balanced());
    }

    #[test]
    fn test_closed_session_rejects_everything() {
        let mut session = RegisterSession::open("sam", Money::from_cents(1000)).unwrap();
        session.close(Money::from_cents(1000)).unwrap();

        assert!(matches!(
            session.record_cash_transaction(Money::from_cents(100)),
            Err(CoreError::RegisterNotOpen)
        ));
        assert!(matches!(
            session.close(Money::from_cents(1000)),
            Err(CoreError::RegisterNotOpen)
        ));
    }

    #[test]
    fn test_negative_cash_amount_rejected() {
        let mut session = RegisterSession::open("sam", Money::from_cents(1000)).unwrap();
        assert!(session
            .record_cash_transaction(Money::from_cents(-100))
            .is_err());
    }
}
