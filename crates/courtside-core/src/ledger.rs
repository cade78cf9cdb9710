//! # Quantity Ledger
//!
//! Running count of items per name, used to reflect stock consumption
//! before the backend's stock sync catches up.
//!
//! ## Lifecycle
//! ```text
//! board mount ──► LocalStore::load_ledger(scope) ──► QuantityLedger
//!                                                        │
//!        add item ──► increment(name) ───────────────────┤
//!     remove item ──► decrement(name) ───────────────────┤
//!                                                        ▼
//!                              LocalStore::save_ledger(scope, &ledger)
//! ```
//!
//! ## Invariants
//! - A count is never negative
//! - A name whose count reaches zero is removed, never stored as `0`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Item name → count. Serializes as the bare map (`{"Coke": 2}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuantityLedger(BTreeMap<String, u32>);

impl QuantityLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted entries.
    ///
    /// Zero and negative entries (left behind by older writers) are dropped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let counts: BTreeMap<String, u32> = entries
            .into_iter()
            .filter(|(_, qty)| *qty > 0)
            .map(|(name, qty)| (name.into(), qty.min(u32::MAX as i64) as u32))
            .collect();
        QuantityLedger(counts)
    }

    /// Adds one unit of `name`.
    pub fn increment(&mut self, name: &str) -> u32 {
        let count = self.0.entry(name.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Removes one unit of `name`, pruning the entry at zero.
    ///
    /// Returns the remaining count. Decrementing an absent name is a no-op.
    pub fn decrement(&mut self, name: &str) -> u32 {
        let Some(count) = self.0.get_mut(name) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            self.0.remove(name);
        }
        remaining
    }

    /// Count for `name` (0 when absent).
    pub fn get(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Whether an entry exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates `(name, count)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total_units(&self) -> u64 {
        self.0.values().map(|c| *c as u64).sum()
    }
}
