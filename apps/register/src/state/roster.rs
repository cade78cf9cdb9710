//! # Roster State
//!
//! The pre-scheduled team list and the open detail view.

use std::sync::{Arc, Mutex, PoisonError};

use courtside_core::RosterView;

#[derive(Debug, Clone, Default)]
pub struct RosterState {
    view: Arc<Mutex<RosterView>>,
}

impl RosterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RosterView) -> R,
    {
        let view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&view)
    }

    pub fn with_view_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RosterView) -> R,
    {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }
}
