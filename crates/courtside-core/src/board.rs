//! # Ticket Board
//!
//! The set of tickets of one kind (expense cards or walk-in sales), the
//! catalog they pick items from, and the pending-quantity ledger for that
//! kind.
//!
//! ## Board Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shell command         Board operation            State change          │
//! │  ─────────────         ───────────────            ────────────          │
//! │  new ────────────────► add_ticket() ────────────► tickets.push(..)      │
//! │  rm 2 ───────────────► remove_ticket(2) ────────► tickets.remove(2)     │
//! │  select 0 Coke ──────► select_catalog_item() ───► selected = Some(..)   │
//! │  add 0 ──────────────► add_selected_item(0) ────► items.push, ledger +1 │
//! │  drop 0 1 ───────────► remove_item(0, 1) ───────► items.remove, -1      │
//! │  close 0 ────────────► toggle_close(0) ─────────► Settlement / reopen   │
//! │                                                                         │
//! │  Every index is checked first. A bad index is an error and leaves the   │
//! │  board exactly as it was.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The board never performs I/O. Callers persist [`TicketBoard::ledger`]
//! after any operation that reports a ledger change.

use tracing::debug;

use crate::error::{CoreError, CoreResult, SettlementRejection};
use crate::ledger::QuantityLedger;
use crate::settlement::{Settlement, SettlementPlan};
use crate::ticket::Ticket;
use crate::types::{CatalogItem, LineItem, TicketKind};

/// Result of [`TicketBoard::toggle_close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The ticket was closed; it is open again and its items were discarded.
    Reopened { discarded: Vec<LineItem> },
    /// The ticket was open; settle it to close it.
    Settle(Settlement),
}

/// Tickets of one kind plus their catalog and pending ledger.
#[derive(Debug, Clone)]
pub struct TicketBoard {
    kind: TicketKind,
    tickets: Vec<Ticket>,
    catalog: Vec<CatalogItem>,
    ledger: QuantityLedger,
    next_number: u32,
}

impl TicketBoard {
    /// Creates an empty board with an empty catalog and ledger.
    pub fn new(kind: TicketKind) -> Self {
        Self::with_ledger(kind, QuantityLedger::new())
    }

    /// Creates a board whose pending ledger was loaded from storage.
    pub fn with_ledger(kind: TicketKind, ledger: QuantityLedger) -> Self {
        TicketBoard {
            kind,
            tickets: Vec::new(),
            catalog: Vec::new(),
            ledger,
            next_number: 1,
        }
    }

    pub fn kind(&self) -> TicketKind {
        self.kind
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    pub fn ledger(&self) -> &QuantityLedger {
        &self.ledger
    }

    pub fn ticket(&self, index: usize) -> CoreResult<&Ticket> {
        let len = self.tickets.len();
        self.tickets
            .get(index)
            .ok_or(CoreError::TicketIndexOutOfRange { index, len })
    }

    /// Finds a ticket by its stable id.
    pub fn ticket_by_id(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Current position of a ticket, if it is still on the board.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tickets.iter().position(|t| t.id == id)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Installs the catalog fetched when the board is mounted.
    ///
    /// Line items already on tickets keep their snapshot prices.
    pub fn replace_catalog(&mut self, items: Vec<CatalogItem>) {
        debug!(kind = %self.kind, count = items.len(), "Catalog replaced");
        self.catalog = items;
    }

    // =========================================================================
    // Ticket Management
    // =========================================================================

    /// Appends a ticket numbered by the board's sequence.
    pub fn add_ticket(&mut self) -> &Ticket {
        let number = self.next_number;
        self.add_ticket_with(|| Ticket::new(number.to_string()))
    }

    /// Appends a ticket built by `factory`.
    ///
    /// The board's sequence still advances so the next default number does
    /// not collide.
    pub fn add_ticket_with<F>(&mut self, factory: F) -> &Ticket
    where
        F: FnOnce() -> Ticket,
    {
        let ticket = factory();
        debug!(kind = %self.kind, id = %ticket.id, number = %ticket.number, "Ticket added");
        self.next_number = self.next_number.saturating_add(1);
        let index = self.tickets.len();
        self.tickets.push(ticket);
        &self.tickets[index]
    }

    /// Removes the ticket at `index`, open or closed.
    ///
    /// The pending ledger is left as is: items on a removed ticket are not
    /// returned to stock.
    pub fn remove_ticket(&mut self, index: usize) -> CoreResult<Ticket> {
        self.ticket(index)?;
        let ticket = self.tickets.remove(index);
        debug!(kind = %self.kind, id = %ticket.id, "Ticket removed");
        Ok(ticket)
    }

    pub fn rename_ticket(&mut self, index: usize, name: impl Into<String>) -> CoreResult<()> {
        let ticket = self.open_ticket_mut(index)?;
        ticket.customer_name = name.into();
        Ok(())
    }

    pub fn set_number(&mut self, index: usize, number: impl Into<String>) -> CoreResult<()> {
        let ticket = self.open_ticket_mut(index)?;
        ticket.number = number.into();
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Picks the catalog item whose name matches exactly.
    ///
    /// An unknown name clears the pending selection. Returns the selection.
    pub fn select_catalog_item(&mut self, index: usize, name: &str) -> CoreResult<Option<&CatalogItem>> {
        self.open_ticket_mut(index)?;
        let found = self.catalog.iter().find(|item| item.name == name).cloned();
        if found.is_none() {
            debug!(kind = %self.kind, name, "No catalog item with that name");
        }
        let ticket = &mut self.tickets[index];
        ticket.selected = found;
        Ok(ticket.selected.as_ref())
    }

    /// Adds the pending selection to the ticket and counts it in the ledger.
    ///
    /// Returns `None` (and changes nothing) when nothing is selected.
    pub fn add_selected_item(&mut self, index: usize) -> CoreResult<Option<LineItem>> {
        let ticket = self.open_ticket_mut(index)?;
        let Some(selected) = ticket.selected.take() else {
            return Ok(None);
        };
        let line = LineItem::snapshot(&selected);
        ticket.items.push(line.clone());
        let count = self.ledger.increment(&line.name);
        debug!(kind = %self.kind, item = %line.name, count, "Item added");
        Ok(Some(line))
    }

    /// Removes one item and uncounts it from the ledger.
    pub fn remove_item(&mut self, ticket_index: usize, item_index: usize) -> CoreResult<LineItem> {
        let ticket = self.open_ticket_mut(ticket_index)?;
        let len = ticket.items.len();
        if item_index >= len {
            return Err(CoreError::ItemIndexOutOfRange {
                ticket: ticket_index,
                index: item_index,
                len,
            });
        }
        let line = ticket.items.remove(item_index);
        let count = self.ledger.decrement(&line.name);
        debug!(kind = %self.kind, item = %line.name, count, "Item removed");
        Ok(line)
    }

    // =========================================================================
    // Close / Settle
    // =========================================================================

    /// Reopens a closed ticket (discarding its items) or starts settling an
    /// open one. An open ticket is not closed here; see [`Self::finalize`].
    pub fn toggle_close(&mut self, index: usize) -> CoreResult<CloseOutcome> {
        let kind = self.kind;
        let len = self.tickets.len();
        let ticket = self
            .tickets
            .get_mut(index)
            .ok_or(CoreError::TicketIndexOutOfRange { index, len })?;

        if ticket.is_closed {
            let discarded = ticket.reopen();
            debug!(kind = %kind, id = %ticket.id, discarded = discarded.len(), "Ticket reopened");
            return Ok(CloseOutcome::Reopened { discarded });
        }

        Ok(CloseOutcome::Settle(Settlement::open(kind, ticket)))
    }

    /// Marks the settled ticket closed and returns the items it sold.
    pub fn finalize(&mut self, plan: &SettlementPlan) -> CoreResult<Vec<LineItem>> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == plan.ticket_id)
            .ok_or(SettlementRejection::TicketNotFound)?;
        ticket.is_closed = true;
        ticket.selected = None;
        debug!(kind = %self.kind, id = %ticket.id, total = %plan.final_total, "Ticket closed");
        Ok(ticket.items.clone())
    }

    fn open_ticket_mut(&mut self, index: usize) -> CoreResult<&mut Ticket> {
        let len = self.tickets.len();
        let ticket = self
            .tickets
            .get_mut(index)
            .ok_or(CoreError::TicketIndexOutOfRange { index, len })?;
        if ticket.is_closed {
            return Err(CoreError::TicketClosed {
                number: ticket.number.clone(),
            });
        }
        Ok(ticket)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
