//! # Register Service
//!
//! Open/close lifecycle of the store's cash drawer.
//!
//! The database is the source of truth for which session is open; the
//! service re-reads it on every call rather than caching, so two terminals
//! pointed at the same store see the same drawer.

use tracing::info;

use crate::error::ServiceError;
use gopet_core::{CoreError, Money, RegisterCloseSummary, RegisterSession};
use gopet_db::Database;

/// Register session lifecycle operations.
#[derive(Debug, Clone)]
pub struct RegisterService {
    db: Database,
}

impl RegisterService {
    /// Creates a new register service.
    pub fn new(db: Database) -> Self {
        RegisterService { db }
    }

    /// Opens the drawer with a counted opening float.
    ///
    /// ## Errors
    /// - `RegisterError` when a session is already open (checked up front,
    ///   and enforced again by the database's single-open index for two
    ///   terminals racing)
    /// - `ValidationError` for a negative opening balance
    pub async fn open_register(
        &self,
        cashier: &str,
        opening: Money,
    ) -> Result<RegisterSession, ServiceError> {
        if let Some(existing) = self.db.registers().get_open().await? {
            return Err(CoreError::RegisterAlreadyOpen {
                session_id: existing.id,
            }
            .into());
        }

        let session = RegisterSession::open(cashier, opening)?;
        self.db.registers().insert_open(&session).await?;

        info!(
            session_id = %session.id,
            cashier = %cashier,
            opening = opening.cents(),
            "Register opened"
        );
        Ok(session)
    }

    /// Returns the currently open session, if any.
    pub async fn current(&self) -> Result<Option<RegisterSession>, ServiceError> {
        Ok(self.db.registers().get_open().await?)
    }

    /// Closes the drawer against a manually counted balance and reports
    /// the reconciliation.
    ///
    /// ## Errors
    /// - `RegisterError` when no session is open
    /// - `Conflict` when a cash checkout credited the drawer between our
    ///   read and the close; re-invoke to close against fresh totals
    pub async fn close_register(
        &self,
        actual: Money,
    ) -> Result<RegisterCloseSummary, ServiceError> {
        let mut session = self
            .db
            .registers()
            .get_open()
            .await?
            .ok_or(CoreError::RegisterNotOpen)?;

        let summary = session.close(actual)?;
        self.db.registers().close(&session).await?;

        info!(
            session_id = %summary.session_id,
            expected = summary.expected_cents,
            actual = summary.actual_cents,
            discrepancy = summary.discrepancy_cents,
            "Register closed"
        );
        Ok(summary)
    }

    /// Lists past sessions, newest first (shift reports).
    pub async fn recent_sessions(&self, limit: i64) -> Result<Vec<RegisterSession>, ServiceError> {
        Ok(self.db.registers().list_recent(limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use gopet_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_close_lifecycle() {
        let service = RegisterService::new(test_db().await);

        assert!(service.current().await.unwrap().is_none());

        let session = service
            .open_register("sam", Money::from_cents(10000))
            .await
            .unwrap();
        assert_eq!(session.opening_cents, 10000);
        assert!(service.current().await.unwrap().is_some());

        let summary = service
            .close_register(Money::from_cents(10000))
            .await
            .unwrap();
        assert!(summary.is_balanced());
        assert!(service.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_double_open_rejected() {
        let service = RegisterService::new(test_db().await);
        service
            .open_register("sam", Money::from_cents(5000))
            .await
            .unwrap();

        let err = service
            .open_register("alex", Money::from_cents(5000))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegisterError);
    }

    #[tokio::test]
    async fn test_close_without_open_rejected() {
        let service = RegisterService::new(test_db().await);
        let err = service
            .close_register(Money::from_cents(0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegisterError);
    }

    #[tokio::test]
    async fn test_reopen_after_close_allowed() {
        let service = RegisterService::new(test_db().await);
        service
            .open_register("sam", Money::from_cents(5000))
            .await
            .unwrap();
        service
            .close_register(Money::from_cents(5000))
            .await
            .unwrap();

        // Yesterday's drawer is closed; today's opens fresh
        let session = service
            .open_register("alex", Money::from_cents(7500))
            .await
            .unwrap();
        assert_eq!(session.opening_cents, 7500);
    }

    #[tokio::test]
    async fn test_negative_opening_rejected() {
        let service = RegisterService::new(test_db().await);
        let err = service
            .open_register("sam", Money::from_cents(-100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
