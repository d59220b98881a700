//! # gopet-db: Database Layer for GoPet POS
//!
//! This crate provides database access for the GoPet POS and loyalty
//! system. It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoPet POS Data Flow                              │
//! │                                                                         │
//! │  Service call (process_payment, add_stamps, close_register)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     gopet-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Transaction   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Register      │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FKs     │    │ Loyalty       │    │ ...          │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (one file per store)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (transaction, register,
//!   loyalty)
//!
//! ## Multi-Write Atomicity
//!
//! The two places the domain requires more than one row to change at once
//! — a checkout (transaction + line snapshots + register credit) and a
//! stamp event (card balance + ledger row) — are each a single SQLite
//! transaction with an optimistic version guard. A concurrent write makes
//! the whole batch roll back with [`DbError::VersionConflict`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gopet_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/gopet.db")).await?;
//!
//! let recent = db.transactions().list_recent(20).await?;
//! let open = db.registers().get_open().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::loyalty::LoyaltyRepository;
pub use repository::register::RegisterRepository;
pub use repository::transaction::TransactionRepository;
