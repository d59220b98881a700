//! # Service Error Type
//!
//! Unified error type for the orchestration services.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in GoPet POS                              │
//! │                                                                         │
//! │  Frontend                      Rust Services                            │
//! │  ────────                      ─────────────                            │
//! │                                                                         │
//! │  processPayment(...)                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method                                                  │  │
//! │  │  Result<T, ServiceError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database error?  ── DbError ──────────────────────┐            │  │
//! │  │         │                                          ▼            │  │
//! │  │  Business error?  ── CoreError ─────────────► ServiceError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) { e.code === 'INSUFFICIENT_STAMPS' → show inline hint }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The error serializes with both a machine-readable `code` and a
//! human-readable `message`, so the frontend can branch without parsing
//! strings.

use serde::Serialize;

use gopet_core::CoreError;
use gopet_db::DbError;

/// Error returned from service methods.
///
/// ## Serialization
/// This is what the frontend receives when a call fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_CASH",
///   "message": "Insufficient cash: total 2350 cents, tendered 2000 cents"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Another device wrote the same entity first; re-read and retry
    Conflict,

    /// Cart operation failed
    CartError,

    /// Cash/card/QR tender rejected
    PaymentError,

    /// Register session lifecycle violation
    RegisterError,

    /// Stamp accrual/redemption rejected
    LoyaltyError,

    /// Internal error
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ServiceError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::VersionConflict { entity, id } => ServiceError::new(
                ErrorCode::Conflict,
                format!("{} {} was modified concurrently, please retry", entity, id),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ServiceError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ServiceError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ServiceError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ServiceError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::EmptyCart => ServiceError::new(ErrorCode::CartError, err.to_string()),
            CoreError::LineNotFound { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. } => {
                ServiceError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::InsufficientCash { .. } | CoreError::InvalidCashAmount { .. } => {
                ServiceError::new(ErrorCode::PaymentError, err.to_string())
            }
            CoreError::RegisterNotOpen | CoreError::RegisterAlreadyOpen { .. } => {
                ServiceError::new(ErrorCode::RegisterError, err.to_string())
            }
            CoreError::InsufficientStamps { .. }
            | CoreError::RewardInactive { .. }
            | CoreError::ProgramInactive { .. } => {
                ServiceError::new(ErrorCode::LoyaltyError, err.to_string())
            }
            CoreError::Validation(e) => ServiceError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ServiceError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: ServiceError = CoreError::InsufficientStamps {
            available: 8,
            required: 10,
        }
        .into();
        assert_eq!(err.code, ErrorCode::LoyaltyError);

        let err: ServiceError = CoreError::RegisterNotOpen.into();
        assert_eq!(err.code, ErrorCode::RegisterError);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ServiceError = DbError::version_conflict("ClientStampCard", "card-1").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ServiceError = DbError::not_found("Transaction", "TRX-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serializes_with_code_and_message() {
        let err = ServiceError::new(ErrorCode::PaymentError, "Insufficient cash");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "PAYMENT_ERROR");
        assert_eq!(json["message"], "Insufficient cash");
    }
}
