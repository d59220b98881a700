//! # gopet-core: Pure Business Logic for GoPet POS
//!
//! This crate is the **heart** of the GoPet point-of-sale and loyalty
//! system. It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoPet POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (TypeScript)                        │   │
//! │  │    Catalog UI ──► Cart UI ──► Tender UI ──► Receipt UI         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gopet-pos (Services)                             │   │
//! │  │    CheckoutService, RegisterService, LoyaltyService            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gopet-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │ register  │  │  loyalty  │  │   │
//! │  │   │   Money   │  │   Cart    │  │  Session  │  │ StampCard │  │   │
//! │  │   │  TaxCalc  │  │ Discount  │  │ CloseRpt  │  │  Rewards  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    gopet-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (Transaction, TaxRate, PaymentTender, ...)
//! - [`cart`] - Cart aggregator: lines, discounts, totals pipeline
//! - [`register`] - Cash register session state machine
//! - [`loyalty`] - Stamp cards, reward programs, accrual/redemption math
//! - [`error`] - Domain error types
//! - [`validation`] - Constructor-level rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use gopet_core::cart::{Cart, CartLine};
//! use gopet_core::money::Money;
//! use gopet_core::types::{ItemKind, TaxRate};
//!
//! let mut cart = Cart::new();
//! let groom = CartLine::new(
//!     "svc-groom-lg",
//!     ItemKind::Service,
//!     "Full Groom - Large Breed",
//!     Money::from_cents(4599),
//!     2,
//! ).unwrap();
//! cart.add_line(groom).unwrap();
//!
//! let totals = cart.totals(TaxRate::from_bps(850)); // 8.5%
//! assert_eq!(totals.subtotal_cents, 9198);
//! assert_eq!(totals.total_cents, 9980);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod loyalty;
pub mod money;
pub mod register;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gopet_core::Money` instead of
// `use gopet_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals, Discount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use loyalty::{
    available_rewards, ClientStampCard, Reward, RewardProgram, StampTransaction,
};
pub use money::Money;
pub use register::{RegisterCloseSummary, RegisterSession, RegisterStatus};
pub use types::{
    ItemKind, PaymentMethod, PaymentTender, TaxRate, Transaction, TransactionItem,
    TransactionStatus,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default business ID for v0.1 (single-business runtime with
/// multi-business schema)
///
/// ## Why a constant?
/// v0.1 serves one business per deployment, but the schema keys loyalty
/// programs by business_id for the hosted multi-tenant rollout. This
/// constant is used throughout the codebase until dynamic business
/// resolution lands.
pub const DEFAULT_BUSINESS_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum unique lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a product/service display name
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of free-text notes on a stamp ledger row
pub const MAX_NOTES_LEN: usize = 500;
