//! # Commands Module
//!
//! Everything the shell can ask the register to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── ticket.rs      ◄─── Boards, tickets, items, close/reopen
//! ├── settlement.rs  ◄─── Discount, payment split, confirm, records
//! ├── catalog.rs     ◄─── Catalog and discount fetch on mount
//! └── roster.rs      ◄─── Pre-scheduled teams and players
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs boards
//! fn add_ticket(boards: &BoardState) -> TicketView
//!
//! // Boards and the local store
//! async fn add_item(boards: &BoardState, store: &StoreState, index: usize)
//!
//! // Everything a confirmation touches
//! async fn confirm_settlement(boards, settlement, store, remote, config)
//! ```
//!
//! Commands return `Result<T, ApiError>`; the shell prints the error's
//! message as a notification and carries on.

pub mod catalog;
pub mod roster;
pub mod settlement;
pub mod ticket;

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators for command tests.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use courtside_api::{Backend, ClientError, ClientResult, RosterSource};
    use courtside_core::{
        CatalogItem, DiscountRate, DiscountTable, Money, OrderRequest, Player, RosterTeam,
        TicketKind,
    };
    use courtside_db::MemoryStore;

    use crate::state::{
        BoardState, ConfigState, RemoteState, RosterState, SettlementState, StoreState,
    };

    fn unavailable() -> ClientError {
        ClientError::Backend {
            status: 503,
            message: "Service unavailable".to_string(),
        }
    }

    pub fn catalog_item(name: &str, cents: i64) -> CatalogItem {
        CatalogItem {
            id: format!("id-{}", name.to_lowercase()),
            name: name.to_string(),
            price: Money::from_cents(cents),
            available_quantity: 10,
        }
    }

    pub fn roster_team(id: &str, name: &str, players: &[(&str, Option<&str>)]) -> RosterTeam {
        RosterTeam {
            id: id.to_string(),
            name: name.to_string(),
            players: players
                .iter()
                .map(|(name, contact)| Player {
                    name: Some(name.to_string()),
                    contact: contact.map(str::to_string),
                })
                .collect(),
        }
    }

    #[derive(Default)]
    struct BackendData {
        catalog: Vec<CatalogItem>,
        discounts: DiscountTable,
        orders: Vec<OrderRequest>,
        order_error: Option<String>,
        failing: bool,
    }

    /// Backend that answers from memory and records posted orders.
    #[derive(Default)]
    pub struct FakeBackend {
        data: Mutex<BackendData>,
    }

    impl FakeBackend {
        pub fn set_catalog(&self, items: Vec<CatalogItem>) {
            self.data.lock().unwrap().catalog = items;
        }

        pub fn set_discount(&self, label: &str, bps: u32) {
            self.data
                .lock()
                .unwrap()
                .discounts
                .insert(label, DiscountRate::from_bps(bps));
        }

        pub fn fail_orders_with(&self, message: &str) {
            self.data.lock().unwrap().order_error = Some(message.to_string());
        }

        pub fn set_failing(&self, failing: bool) {
            self.data.lock().unwrap().failing = failing;
        }

        pub fn orders(&self) -> Vec<OrderRequest> {
            self.data.lock().unwrap().orders.clone()
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn catalog(&self) -> ClientResult<Vec<CatalogItem>> {
            let data = self.data.lock().unwrap();
            if data.failing {
                return Err(unavailable());
            }
            Ok(data.catalog.clone())
        }

        async fn discounts(&self) -> ClientResult<DiscountTable> {
            let data = self.data.lock().unwrap();
            if data.failing {
                return Err(unavailable());
            }
            Ok(data.discounts.clone())
        }

        async fn post_order(&self, order: &OrderRequest) -> ClientResult<()> {
            let mut data = self.data.lock().unwrap();
            if let Some(message) = data.order_error.clone() {
                return Err(ClientError::Backend {
                    status: 409,
                    message,
                });
            }
            data.orders.push(order.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RosterData {
        teams: Vec<RosterTeam>,
        failing: bool,
    }

    /// Roster source over a fixed team list.
    #[derive(Default)]
    pub struct FakeRoster {
        data: Mutex<RosterData>,
    }

    impl FakeRoster {
        pub fn set_teams(&self, teams: Vec<RosterTeam>) {
            self.data.lock().unwrap().teams = teams;
        }

        pub fn set_failing(&self, failing: bool) {
            self.data.lock().unwrap().failing = failing;
        }
    }

    #[async_trait]
    impl RosterSource for FakeRoster {
        async fn pre_scheduled_teams(&self) -> ClientResult<Vec<RosterTeam>> {
            let data = self.data.lock().unwrap();
            if data.failing {
                return Err(unavailable());
            }
            Ok(data.teams.clone())
        }

        async fn players(&self, team_id: &str) -> ClientResult<Vec<Player>> {
            let data = self.data.lock().unwrap();
            if data.failing {
                return Err(unavailable());
            }
            Ok(data
                .teams
                .iter()
                .find(|team| team.id == team_id)
                .map(|team| team.players.clone())
                .unwrap_or_default())
        }
    }

    /// Every state holder wired to in-memory collaborators.
    pub struct Harness {
        pub boards: BoardState,
        pub settlement: SettlementState,
        pub roster: RosterState,
        pub store: StoreState,
        pub remote: RemoteState,
        pub config: ConfigState,
        pub backend: Arc<FakeBackend>,
        pub roster_source: Arc<FakeRoster>,
    }

    impl Harness {
        pub fn new() -> Self {
            let backend = Arc::new(FakeBackend::default());
            let roster_source = Arc::new(FakeRoster::default());
            let source: Arc<dyn RosterSource> = roster_source.clone();
            Harness {
                boards: BoardState::default(),
                settlement: SettlementState::new(),
                roster: RosterState::new(),
                store: StoreState::new(Arc::new(MemoryStore::new())),
                remote: RemoteState::new(backend.clone(), Some(source)),
                config: ConfigState::default(),
                backend,
                roster_source,
            }
        }

        /// Installs a catalog on the active board.
        pub fn load_catalog(&self, items: Vec<CatalogItem>) {
            self.boards
                .with_boards_mut(|b| b.active_board_mut().replace_catalog(items));
        }

        pub fn load_catalog_for(&self, kind: TicketKind, items: Vec<CatalogItem>) {
            self.boards.with_board_mut(kind, |b| b.replace_catalog(items));
        }
    }
}
