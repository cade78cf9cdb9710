//! # Ticket Commands
//!
//! Board and ticket manipulation for the active board.
//!
//! ## Ticket Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────┐     ┌──────────┐   │
//! │  │  Empty   │────►│  Items   │────►│  Settlement  │────►│  Closed  │   │
//! │  │  ticket  │     │  added   │     │  (modal)     │     │          │   │
//! │  └──────────┘     └──────────┘     └──────────────┘     └────┬─────┘   │
//! │                    select/add/drop    confirm_settlement      │         │
//! │                                       (settlement.rs)         │         │
//! │        ▲                                                      │         │
//! │        └──────────── toggle_close (items discarded) ◄─────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Indices are zero-based here; the shell converts from the 1-based
//! positions it prints.

use serde::Serialize;
use tracing::{debug, info};

use courtside_core::{
    CatalogItem, CloseOutcome, LedgerScope, LineItem, Money, QuantityLedger, Ticket, TicketKind,
};

use crate::commands::settlement::SettlementView;
use crate::error::ApiError;
use crate::state::{BoardState, SettlementState, StoreState};

/// One ticket as the shell shows it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: String,
    pub number: String,
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub selected: Option<String>,
    pub total: Money,
    pub is_closed: bool,
}

impl From<&Ticket> for TicketView {
    fn from(ticket: &Ticket) -> Self {
        TicketView {
            id: ticket.id.clone(),
            number: ticket.number.clone(),
            customer_name: ticket.customer_name.clone(),
            items: ticket.items.clone(),
            selected: ticket.selected.as_ref().map(|item| item.name.clone()),
            total: ticket.total(),
            is_closed: ticket.is_closed,
        }
    }
}

/// The active board.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub kind: TicketKind,
    pub tickets: Vec<TicketView>,
}

/// What `toggle_close` did.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum CloseResponse {
    /// A closed ticket was reopened and emptied.
    Reopened { number: String, discarded: usize },
    /// A settlement was opened for the ticket.
    Settling(SettlementView),
}

/// Pending ledger of the active board plus the walk-in sold ledger.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    pub kind: TicketKind,
    pub pending: QuantityLedger,
    pub sold: QuantityLedger,
}

/// Shows the active board.
pub fn get_board(boards: &BoardState) -> BoardView {
    boards.with_boards(|b| {
        let board = b.active_board();
        BoardView {
            kind: board.kind(),
            tickets: board.tickets().iter().map(TicketView::from).collect(),
        }
    })
}

/// Makes `kind` the active board.
///
/// The caller refreshes the catalog afterwards, as a board mount does.
pub fn switch_board(boards: &BoardState, kind: TicketKind) -> BoardView {
    debug!(kind = %kind, "switch_board command");
    boards.with_boards_mut(|b| b.set_active(kind));
    get_board(boards)
}

/// Appends a new empty ticket with the next sequence number.
pub fn add_ticket(boards: &BoardState) -> TicketView {
    debug!("add_ticket command");
    boards.with_boards_mut(|b| TicketView::from(b.active_board_mut().add_ticket()))
}

/// Removes a ticket, open or closed. The pending ledger is left as is.
pub fn remove_ticket(boards: &BoardState, index: usize) -> Result<TicketView, ApiError> {
    debug!(index, "remove_ticket command");
    let removed = boards.with_boards_mut(|b| b.active_board_mut().remove_ticket(index))?;
    info!(id = %removed.id, number = %removed.number, "Ticket removed");
    Ok(TicketView::from(&removed))
}

pub fn rename_ticket(boards: &BoardState, index: usize, name: String) -> Result<(), ApiError> {
    debug!(index, "rename_ticket command");
    boards.with_boards_mut(|b| b.active_board_mut().rename_ticket(index, name))?;
    Ok(())
}

pub fn set_ticket_number(
    boards: &BoardState,
    index: usize,
    number: String,
) -> Result<(), ApiError> {
    debug!(index, "set_ticket_number command");
    boards.with_boards_mut(|b| b.active_board_mut().set_number(index, number))?;
    Ok(())
}

/// Picks a catalog item by exact name. `None` means no match and the
/// selection was cleared.
pub fn select_item(
    boards: &BoardState,
    index: usize,
    name: &str,
) -> Result<Option<CatalogItem>, ApiError> {
    debug!(index, name, "select_item command");
    let selected = boards.with_boards_mut(|b| {
        b.active_board_mut()
            .select_catalog_item(index, name)
            .map(|item| item.cloned())
    })?;
    Ok(selected)
}

/// Adds the pending selection to the ticket and saves the pending ledger.
///
/// Returns `None` when nothing was selected.
pub async fn add_item(
    boards: &BoardState,
    store: &StoreState,
    index: usize,
) -> Result<Option<LineItem>, ApiError> {
    debug!(index, "add_item command");
    let (kind, added) = boards.with_boards_mut(|b| {
        let board = b.active_board_mut();
        board.add_selected_item(index).map(|item| (board.kind(), item))
    })?;

    if added.is_some() {
        save_pending_ledger(boards, store, kind).await?;
    }
    Ok(added)
}

/// Removes an item and saves the pending ledger.
pub async fn remove_item(
    boards: &BoardState,
    store: &StoreState,
    ticket_index: usize,
    item_index: usize,
) -> Result<LineItem, ApiError> {
    debug!(ticket_index, item_index, "remove_item command");
    let (kind, removed) = boards.with_boards_mut(|b| {
        let board = b.active_board_mut();
        board
            .remove_item(ticket_index, item_index)
            .map(|item| (board.kind(), item))
    })?;

    save_pending_ledger(boards, store, kind).await?;
    Ok(removed)
}

/// Reopens a closed ticket or starts settling an open one.
///
/// Starting a settlement replaces any settlement already open.
pub fn toggle_close(
    boards: &BoardState,
    settlement: &SettlementState,
    index: usize,
) -> Result<CloseResponse, ApiError> {
    debug!(index, "toggle_close command");
    let (number, outcome) = boards.with_boards_mut(|b| {
        let board = b.active_board_mut();
        let outcome = board.toggle_close(index)?;
        let number = board.ticket(index)?.number.clone();
        Ok::<_, ApiError>((number, outcome))
    })?;

    match outcome {
        CloseOutcome::Reopened { discarded } => {
            info!(number = %number, discarded = discarded.len(), "Ticket reopened");
            Ok(CloseResponse::Reopened {
                number,
                discarded: discarded.len(),
            })
        }
        CloseOutcome::Settle(opened) => {
            let view = SettlementView::from(&opened);
            if let Some(previous) = settlement.begin(opened) {
                info!(number = %previous.ticket_number(), "Open settlement replaced");
            }
            Ok(CloseResponse::Settling(view))
        }
    }
}

/// Pending ledger of the active board and the persisted walk-in sold ledger.
pub async fn get_ledgers(boards: &BoardState, store: &StoreState) -> Result<LedgerReport, ApiError> {
    debug!("get_ledgers command");
    let (kind, pending) = boards.with_boards(|b| {
        let board = b.active_board();
        (board.kind(), board.ledger().clone())
    });
    let sold = store.inner().load_ledger(LedgerScope::WalkInSold).await?;
    Ok(LedgerReport { kind, pending, sold })
}

/// Writes a board's pending ledger to the local store.
///
/// The ledger is copied out first so no lock is held across the write.
pub(crate) async fn save_pending_ledger(
    boards: &BoardState,
    store: &StoreState,
    kind: TicketKind,
) -> Result<(), ApiError> {
    let ledger = boards.with_board(kind, |b| b.ledger().clone());
    store
        .inner()
        .save_ledger(kind.pending_scope(), &ledger)
        .await?;
    Ok(())
}
