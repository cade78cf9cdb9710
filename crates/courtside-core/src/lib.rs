//! # courtside-core: Pure Business Logic for Courtside POS
//!
//! Tickets, boards, payment settlement, quantity ledgers and the roster
//! view model, as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Courtside POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Register shell (apps/register)                 │   │
//! │  │     new / add / close ──► discount / amount ──► confirm         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ courtside-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐   │   │
//! │  │   │   board   │  │   money   │  │ settlement │  │  roster  │   │   │
//! │  │   │  Ticket   │  │   Money   │  │ TenderLine │  │ TeamView │   │   │
//! │  │   │  Ledger   │  │ Discount  │  │ OrderReq.  │  │          │   │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                 │                                   │                   │
//! │  ┌──────────────▼──────────────┐   ┌────────────────▼──────────────┐   │
//! │  │  courtside-db (LocalStore)  │   │ courtside-api (Backend, Roster)│   │
//! │  └─────────────────────────────┘   └───────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, LineItem, Tender, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`ticket`] - A single ticket
//! - [`board`] - Tickets of one kind plus catalog and pending ledger
//! - [`ledger`] - Per-item running counts
//! - [`settlement`] - Discount, tender split and confirm validation
//! - [`roster`] - Pre-scheduled teams view model
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use courtside_core::{CloseOutcome, DiscountRate, DiscountTable, Money, RecordPolicy};
//! use courtside_core::{CatalogItem, Tender, TicketBoard, TicketKind};
//!
//! let mut board = TicketBoard::new(TicketKind::Expense);
//! board.replace_catalog(vec![CatalogItem {
//!     id: "1".into(),
//!     name: "Coke".into(),
//!     price: Money::from_cents(500),
//!     available_quantity: 10,
//! }]);
//! board.add_ticket();
//! board.select_catalog_item(0, "Coke").unwrap();
//! board.add_selected_item(0).unwrap();
//!
//! let CloseOutcome::Settle(mut settlement) = board.toggle_close(0).unwrap() else {
//!     unreachable!()
//! };
//! let mut discounts = DiscountTable::new();
//! discounts.insert("Member", DiscountRate::from_bps(1000));
//! settlement.select_discount(Some("Member"), &discounts).unwrap();
//! settlement.set_tender_amount(Tender::Cash, "4.50").unwrap();
//! settlement.toggle_tender(Tender::Cash, true).unwrap();
//!
//! let plan = settlement.confirm(&board, RecordPolicy::default(), None).unwrap();
//! assert_eq!(plan.final_total, Money::from_cents(450));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod board;
pub mod error;
pub mod ledger;
pub mod money;
pub mod roster;
pub mod settlement;
pub mod ticket;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use board::{CloseOutcome, TicketBoard};
pub use error::{CoreError, CoreResult, SettlementRejection, ValidationError};
pub use ledger::QuantityLedger;
pub use money::Money;
pub use roster::{Player, RosterTeam, RosterView, TeamDetail, TeamSummary};
pub use settlement::{OrderRequest, Settlement, SettlementPlan, SettlementStatus, TenderLine};
pub use ticket::Ticket;
pub use types::*;
