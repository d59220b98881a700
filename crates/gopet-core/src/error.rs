//! # Error Types
//!
//! Domain-specific error types for gopet-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gopet-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gopet-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  gopet-pos errors (service crate)                                      │
//! │  └── ServiceError     - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError → caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids, thresholds)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are raised before
/// any I/O happens, so a caller that sees one knows nothing was persisted.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash handed over does not cover the total.
    ///
    /// ## User Workflow
    /// ```text
    /// Total: $23.50, customer hands over $20.00
    ///      │
    ///      ▼
    /// InsufficientCash { total_cents: 2350, tendered_cents: 2000 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient cash: total $23.50, tendered $20.00"
    /// ```
    #[error("Insufficient cash: total {total_cents} cents, tendered {tendered_cents} cents")]
    InsufficientCash {
        total_cents: i64,
        tendered_cents: i64,
    },

    /// A cash operation needs an open register session and none exists.
    #[error("No open register session")]
    RegisterNotOpen,

    /// Opening a register while another session is still open.
    #[error("A register session is already open: {session_id}")]
    RegisterAlreadyOpen { session_id: String },

    /// Cash amount recorded against the drawer is negative.
    #[error("Invalid cash amount: {cents} cents")]
    InvalidCashAmount { cents: i64 },

    /// Cart line lookup failed for an update.
    #[error("Item not in cart: {item_id}")]
    LineNotFound { item_id: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Redemption requires more stamps than the card can use.
    ///
    /// `available` already accounts for expiry lapse, so a lapsed card
    /// reports 0 here even when its raw balance is positive.
    #[error("Insufficient stamps: {available} available, {required} required")]
    InsufficientStamps { available: i64, required: i64 },

    /// Redemption against a soft-disabled reward.
    #[error("Reward is not active: {reward_id}")]
    RewardInactive { reward_id: String },

    /// Operation against a soft-disabled program.
    #[error("Reward program is not active: {program_id}")]
    ProgramInactive { program_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
