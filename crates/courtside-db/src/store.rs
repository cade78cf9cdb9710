//! # Local Store
//!
//! The seam between the register and whatever keeps its state across
//! restarts.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   register commands ──► Arc<dyn LocalStore>                             │
//! │                               │                                         │
//! │               ┌───────────────┴────────────────┐                        │
//! │               ▼                                ▼                        │
//! │         Database (SQLite)               MemoryStore                     │
//! │         survives restart                tests, --ephemeral              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers load on mount and save after every mutation; nothing is cached
//! here.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use courtside_core::{LedgerScope, Money, PaymentRecord, QuantityLedger, ScheduledSlot};

/// Register-local persisted state.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Loads a ledger; never-saved scopes are empty.
    async fn load_ledger(&self, scope: LedgerScope) -> DbResult<QuantityLedger>;

    /// Replaces a ledger.
    async fn save_ledger(&self, scope: LedgerScope, ledger: &QuantityLedger) -> DbResult<()>;

    /// Adds one unit per name to a ledger.
    async fn count_items(&self, scope: LedgerScope, names: &[String]) -> DbResult<()>;

    /// Appends payment records, all or nothing.
    async fn append_payments(&self, records: &[PaymentRecord]) -> DbResult<()>;

    /// Every payment record, oldest first.
    async fn payments(&self) -> DbResult<Vec<PaymentRecord>>;

    async fn scheduled_slot(&self) -> DbResult<Option<ScheduledSlot>>;

    async fn set_scheduled_slot(&self, slot: &ScheduledSlot) -> DbResult<()>;

    async fn loose_sale_total(&self) -> DbResult<Money>;

    /// Adds to the walk-in running total; returns the new total.
    async fn add_loose_sale_total(&self, amount: Money) -> DbResult<Money>;
}

// =============================================================================
// SQLite
// =============================================================================

#[async_trait]
impl LocalStore for Database {
    async fn load_ledger(&self, scope: LedgerScope) -> DbResult<QuantityLedger> {
        self.ledgers().load(scope).await
    }

    async fn save_ledger(&self, scope: LedgerScope, ledger: &QuantityLedger) -> DbResult<()> {
        self.ledgers().save(scope, ledger).await
    }

    async fn count_items(&self, scope: LedgerScope, names: &[String]) -> DbResult<()> {
        self.ledgers()
            .add_all(scope, names.iter().map(String::as_str))
            .await
    }

    async fn append_payments(&self, records: &[PaymentRecord]) -> DbResult<()> {
        self.payments().append(records).await
    }

    async fn payments(&self) -> DbResult<Vec<PaymentRecord>> {
        Database::payments(self).list().await
    }

    async fn scheduled_slot(&self) -> DbResult<Option<ScheduledSlot>> {
        self.settings().scheduled_slot().await
    }

    async fn set_scheduled_slot(&self, slot: &ScheduledSlot) -> DbResult<()> {
        self.settings().set_scheduled_slot(slot).await
    }

    async fn loose_sale_total(&self) -> DbResult<Money> {
        self.settings().loose_sale_total().await
    }

    async fn add_loose_sale_total(&self, amount: Money) -> DbResult<Money> {
        self.settings().add_loose_sale_total(amount).await
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    ledgers: HashMap<LedgerScope, QuantityLedger>,
    payments: Vec<PaymentRecord>,
    slot: Option<ScheduledSlot>,
    loose_sale_total: Money,
}

/// Process-lifetime store. Everything is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> DbResult<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| DbError::Internal(format!("Memory store lock poisoned: {}", e)))?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn load_ledger(&self, scope: LedgerScope) -> DbResult<QuantityLedger> {
        self.with_state(|s| s.ledgers.get(&scope).cloned().unwrap_or_default())
    }

    async fn save_ledger(&self, scope: LedgerScope, ledger: &QuantityLedger) -> DbResult<()> {
        self.with_state(|s| {
            s.ledgers.insert(scope, ledger.clone());
        })
    }

    async fn count_items(&self, scope: LedgerScope, names: &[String]) -> DbResult<()> {
        self.with_state(|s| {
            let ledger = s.ledgers.entry(scope).or_default();
            for name in names {
                ledger.increment(name);
            }
        })
    }

    async fn append_payments(&self, records: &[PaymentRecord]) -> DbResult<()> {
        self.with_state(|s| s.payments.extend_from_slice(records))
    }

    async fn payments(&self) -> DbResult<Vec<PaymentRecord>> {
        self.with_state(|s| s.payments.clone())
    }

    async fn scheduled_slot(&self) -> DbResult<Option<ScheduledSlot>> {
        self.with_state(|s| s.slot.clone())
    }

    async fn set_scheduled_slot(&self, slot: &ScheduledSlot) -> DbResult<()> {
        self.with_state(|s| s.slot = Some(slot.clone()))
    }

    async fn loose_sale_total(&self) -> DbResult<Money> {
        self.with_state(|s| s.loose_sale_total)
    }

    async fn add_loose_sale_total(&self, amount: Money) -> DbResult<Money> {
        self.with_state(|s| {
            s.loose_sale_total += amount;
            s.loose_sale_total
        })
    }
}
