//! # courtside-api: Remote Collaborators for Courtside
//!
//! HTTP clients for the two services the register talks to.
//!
//! ```text
//! ┌───────────────────────────┐        ┌──────────────────────────────┐
//! │  Backend (HttpBackend)    │        │  RosterSource (RestRoster)   │
//! │                           │        │                              │
//! │  GET  api-estoque         │        │  GET rest/v1/equipes         │
//! │  GET  api-descontos       │        │  GET rest/v1/jogadores       │
//! │  POST api-pedidos         │        │  apikey + bearer headers     │
//! └─────────────┬─────────────┘        └──────────────┬───────────────┘
//!               └──────────────┬──────────────────────┘
//!                              ▼
//!                   ┌─────────────────────┐
//!                   │     HttpClient      │
//!                   │  reqwest + timeout  │
//!                   │  error body → text  │
//!                   └─────────────────────┘
//! ```
//!
//! Wire formats stay in this crate. Callers get `courtside_core` types and
//! a `ClientError` whose `Display` is the backend's own message when one was
//! sent.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod roster;

pub use backend::{Backend, HttpBackend};
pub use config::{ClientConfig, RosterConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use roster::{RestRoster, RosterSource};
