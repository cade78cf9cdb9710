//! # State Module
//!
//! Manages register state. Each concern gets its own holder so commands
//! declare exactly what they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  StoreState  │  │ RemoteState  │  │   ConfigState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │ dyn Local-   │  │ dyn Backend  │  │ venue, backend,  │              │
//! │  │ Store        │  │ dyn Roster-  │  │ roster, policy   │              │
//! │  │              │  │ Source       │  │                  │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  BoardState  │  │ Settlement-  │  │   RosterState    │              │
//! │  │              │  │ State        │  │                  │              │
//! │  │ Arc<Mutex<   │  │ Arc<Mutex<   │  │  Arc<Mutex<      │              │
//! │  │   Boards>>   │  │  Option<..>>>│  │   RosterView>>   │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • StoreState/RemoteState: shared trait objects (Send + Sync)          │
//! │  • Board/Settlement/Roster: Arc<Mutex<T>>, closures only, never       │
//! │    held across an .await                                               │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod board;
mod config;
mod roster;
mod settlement;
mod store;

pub use board::{BoardState, Boards};
pub use config::{ConfigError, ConfigState};
pub use roster::RosterState;
pub use settlement::SettlementState;
pub use store::{RemoteState, StoreState};
