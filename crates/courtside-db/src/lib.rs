//! # courtside-db: Local Store for Courtside POS
//!
//! Everything the register must remember across restarts: the quantity
//! ledgers, the payment record list, the game slot and the walk-in running
//! total. Backed by SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Courtside Data Flow                              │
//! │                                                                         │
//! │  Register command (add, confirm, schedule, ...)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  courtside-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │   │
//! │  │   │  LocalStore   │   │  Repositories  │   │  Migrations  │    │   │
//! │  │   │  (store.rs)   │──►│ ledger.rs      │   │  (embedded)  │    │   │
//! │  │   │ Database      │   │ payments.rs    │   │ 001_local_   │    │   │
//! │  │   │ MemoryStore   │   │ settings.rs    │   │   state.sql  │    │   │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file in the platform data dir (courtside.db)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courtside_db::{Database, DbConfig, LocalStore};
//!
//! let db = Database::new(DbConfig::new("courtside.db")).await?;
//! let ledger = db.load_ledger(LedgerScope::ExpensePending).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::{LocalStore, MemoryStore};

pub use repository::ledger::LedgerRepository;
pub use repository::payments::PaymentRepository;
pub use repository::settings::SettingsRepository;
