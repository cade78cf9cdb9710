//! # Repository Module
//!
//! SQL for each table lives in exactly one repository.
//!
//! ```text
//! LocalStore for Database
//!       │
//!       ├── db.ledgers()   ──► LedgerRepository   ──► quantity_ledger
//!       ├── db.payments()  ──► PaymentRepository  ──► payment_records
//!       └── db.settings()  ──► SettingsRepository ──► local_settings
//! ```

pub mod ledger;
pub mod payments;
pub mod settings;
