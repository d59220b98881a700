//! # gopet-pos: Orchestration Services for GoPet POS
//!
//! The layer the frontend talks to. Each service wires gopet-core's pure
//! logic to gopet-db's repositories and nothing else.
//!
//! ## Module Organization
//! ```text
//! gopet_pos/
//! ├── lib.rs          ◄─── You are here (exports + tracing init)
//! ├── config.rs       ◄─── PosConfig: store identity, tax rate, delays
//! ├── state.rs        ◄─── CartState: shared mutable cart
//! ├── checkout.rs     ◄─── CheckoutService: the payment finalizer
//! ├── register.rs     ◄─── RegisterService: drawer open/close lifecycle
//! ├── loyalty.rs      ◄─── LoyaltyService: stamps, rewards, ledger
//! └── error.rs        ◄─── ServiceError for callers
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Service Startup                                   │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • init_tracing(): tracing-subscriber with env filter                │
//! │     • Default: INFO, override with RUST_LOG                             │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • PosConfig::from_env(): GOPET_* overrides on defaults              │
//! │                                                                         │
//! │  3. Connect to Database ──────────────────────────────────────────────► │
//! │     • Database::new(DbConfig::new(path)): pool + migrations             │
//! │                                                                         │
//! │  4. Build Services ───────────────────────────────────────────────────► │
//! │     • CartState::new()                                                  │
//! │     • CheckoutService / RegisterService / LoyaltyService                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use gopet_pos::{CartState, CheckoutService, PosConfig, RegisterService};
//! use gopet_core::{CartLine, ItemKind, Money, PaymentTender};
//! use gopet_db::{Database, DbConfig};
//!
//! gopet_pos::init_tracing();
//!
//! let db = Database::new(DbConfig::new("./gopet.db")).await?;
//! let config = PosConfig::from_env();
//!
//! let registers = RegisterService::new(db.clone());
//! registers.open_register("sam", Money::from_cents(10000)).await?;
//!
//! let cart = CartState::new();
//! cart.with_cart_mut(|c| c.add_line(CartLine::new(
//!     "svc-groom-lg", ItemKind::Service,
//!     "Full Groom - Large Breed", Money::from_cents(4599), 1,
//! )?))?;
//!
//! let checkout = CheckoutService::new(db, config);
//! let receipt = checkout
//!     .process_payment(&cart, PaymentTender::Cash { tendered: Money::from_cents(5000) })
//!     .await?;
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod loyalty;
pub mod register;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutService, Receipt, ReceiptLine};
pub use config::PosConfig;
pub use error::{ErrorCode, ServiceError};
pub use loyalty::{LoyaltyService, NewReward, NewRewardProgram};
pub use register::RegisterService;
pub use state::{CartState, CartView};

// =============================================================================
// Logging
// =============================================================================

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gopet=trace` - Show trace for gopet crates only
/// - Default: INFO level, sqlx noise suppressed
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gopet=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
