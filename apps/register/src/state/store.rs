//! # Store and Remote State
//!
//! Wrap the local store and the HTTP collaborators behind trait objects so
//! commands run the same against SQLite, the in-memory store, and test
//! fakes.

use std::sync::Arc;

use courtside_api::{Backend, RosterSource};
use courtside_db::LocalStore;

use crate::error::{ApiError, ErrorCode};

/// Register-local persistence.
#[derive(Clone)]
pub struct StoreState {
    store: Arc<dyn LocalStore>,
}

impl StoreState {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        StoreState { store }
    }

    /// Returns the inner store.
    pub fn inner(&self) -> &dyn LocalStore {
        self.store.as_ref()
    }
}

/// Backend functions and the optional roster database.
#[derive(Clone)]
pub struct RemoteState {
    backend: Arc<dyn Backend>,
    roster: Option<Arc<dyn RosterSource>>,
}

impl RemoteState {
    pub fn new(backend: Arc<dyn Backend>, roster: Option<Arc<dyn RosterSource>>) -> Self {
        RemoteState { backend, roster }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// The roster source, or a notification when none is configured.
    pub fn roster(&self) -> Result<&dyn RosterSource, ApiError> {
        self.roster.as_deref().ok_or_else(|| {
            ApiError::new(
                ErrorCode::NotConfigured,
                "Roster database is not configured (set [roster] url and anon_key)",
            )
        })
    }
}
