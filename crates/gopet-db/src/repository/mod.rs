//! # Repository Implementations
//!
//! One repository type per aggregate, each a thin wrapper over the shared
//! connection pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repository Layout                                 │
//! │                                                                         │
//! │  TransactionRepository   pos_transactions + pos_transaction_items      │
//! │                          (insert is atomic with the register credit)   │
//! │                                                                         │
//! │  RegisterRepository      register_sessions                             │
//! │                          (single-open index, versioned updates)        │
//! │                                                                         │
//! │  LoyaltyRepository       reward_programs, rewards, client_stamps,      │
//! │                          stamp_transactions                            │
//! │                          (card + ledger written in one transaction)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories never contain business rules; they persist what gopet-core
//! already validated.

pub mod loyalty;
pub mod register;
pub mod transaction;
