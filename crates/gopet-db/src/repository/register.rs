//! # Register Repository
//!
//! Database operations for cash register sessions.
//!
//! ## Session Lifecycle in the Database
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  register_sessions Lifecycle                            │
//! │                                                                         │
//! │  1. OPEN                                                                │
//! │     └── insert_open() → row with status = 'open'                        │
//! │         (partial unique index rejects a second open row)                │
//! │                                                                         │
//! │  2. ONGOING                                                             │
//! │     └── TransactionRepository credits cash_total_cents atomically       │
//! │         with each cash checkout (version-guarded UPDATE)                │
//! │                                                                         │
//! │  3. CLOSE                                                               │
//! │     └── close() → status = 'closed', actual/discrepancy recorded        │
//! │         WHERE version = ? — a drawer credited after our read refuses    │
//! │         the close, the cashier re-reads and closes against fresh totals │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use gopet_core::{RegisterSession, RegisterStatus};

/// Repository for register session database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Persists a freshly opened session.
    ///
    /// ## Errors
    /// `UniqueViolation` when another session is already open — the
    /// single-open rule is enforced by a partial unique index, so two
    /// terminals racing to open both see a typed error instead of two
    /// drawers.
    pub async fn insert_open(&self, session: &RegisterSession) -> DbResult<()> {
        debug!(id = %session.id, cashier = %session.cashier, "Opening register session");

        sqlx::query(
            r#"
            INSERT INTO register_sessions (
                id, cashier, status, opening_cents,
                cash_total_cents, transaction_count,
                actual_cents, discrepancy_cents,
                opened_at, closed_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&session.id)
        .bind(&session.cashier)
        .bind(session.status)
        .bind(session.opening_cents)
        .bind(session.cash_total_cents)
        .bind(session.transaction_count)
        .bind(session.actual_cents)
        .bind(session.discrepancy_cents)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .bind(session.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the currently open session, if any.
    pub async fn get_open(&self) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(
            r#"
            SELECT
                id, cashier, status, opening_cents,
                cash_total_cents, transaction_count,
                actual_cents, discrepancy_cents,
                opened_at, closed_at, version
            FROM register_sessions
            WHERE status = 'open'
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(
            r#"
            SELECT
                id, cashier, status, opening_cents,
                cash_total_cents, transaction_count,
                actual_cents, discrepancy_cents,
                opened_at, closed_at, version
            FROM register_sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Lists past sessions, newest first (shift reports).
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<RegisterSession>> {
        let sessions = sqlx::query_as::<_, RegisterSession>(
            r#"
            SELECT
                id, cashier, status, opening_cents,
                cash_total_cents, transaction_count,
                actual_cents, discrepancy_cents,
                opened_at, closed_at, version
            FROM register_sessions
            ORDER BY opened_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Persists a close produced by `RegisterSession::close`.
    ///
    /// The session passed in already carries the closed state; its
    /// `version` field still holds the value read from the database, which
    /// guards the update.
    ///
    /// ## Errors
    /// `VersionConflict` when the row changed since it was read (a cash
    /// checkout credited the drawer mid-close). The caller re-reads and
    /// closes against the fresh totals.
    pub async fn close(&self, session: &RegisterSession) -> DbResult<()> {
        debug!(
            id = %session.id,
            discrepancy = ?session.discrepancy_cents,
            "Closing register session"
        );

        let result = sqlx::query(
            r#"
            UPDATE register_sessions SET
                status = ?1,
                actual_cents = ?2,
                discrepancy_cents = ?3,
                closed_at = ?4,
                version = version + 1
            WHERE id = ?5 AND status = 'open' AND version = ?6
            "#,
        )
        .bind(RegisterStatus::Closed)
        .bind(session.actual_cents)
        .bind(session.discrepancy_cents)
        .bind(session.closed_at)
        .bind(&session.id)
        .bind(session.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::version_conflict("RegisterSession", &session.id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
