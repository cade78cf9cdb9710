//! # Settlement State
//!
//! At most one settlement is open at a time, like the payment modal it
//! replaces.

use std::sync::{Arc, Mutex, PoisonError};

use courtside_core::Settlement;

use crate::error::{ApiError, ErrorCode};

#[derive(Debug, Clone, Default)]
pub struct SettlementState {
    current: Arc<Mutex<Option<Settlement>>>,
}

impl SettlementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new settlement, returning the one it replaced.
    pub fn begin(&self, settlement: Settlement) -> Option<Settlement> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.replace(settlement)
    }

    /// Removes and returns the current settlement.
    pub fn take(&self) -> Option<Settlement> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.take()
    }

    /// A copy of the current settlement, if any.
    pub fn snapshot(&self) -> Option<Settlement> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.clone()
    }

    pub fn is_active(&self) -> bool {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.is_some()
    }

    /// Executes a function with write access to the open settlement.
    ///
    /// Fails with `NO_SETTLEMENT` when no ticket is being closed.
    pub fn with_current_mut<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Settlement) -> R,
    {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.as_mut().map(f).ok_or_else(|| {
            ApiError::new(ErrorCode::NoSettlement, "No ticket is being closed")
        })
    }
}
