//! # Ticket
//!
//! A numbered card on a board that accumulates line items until it is
//! settled.
//!
//! ## Ticket Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   add_ticket() ──► OPEN ──── add / remove items ────┐                   │
//! │                     │  ▲                             │                   │
//! │                     │  └─────────────────────────────┘                   │
//! │        toggle_close │                                                    │
//! │                     ▼                                                    │
//! │              settlement open ── cancel ──► OPEN (unchanged)              │
//! │                     │                                                    │
//! │             confirm │                                                    │
//! │                     ▼                                                    │
//! │                  CLOSED ── toggle_close ──► OPEN (items cleared)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::{CatalogItem, LineItem};

/// A ticket on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Stable identity; survives reordering and removal of other tickets.
    pub id: String,

    /// Staff-facing sequence number (free text).
    pub number: String,

    /// Customer or player name (free text).
    pub customer_name: String,

    /// Items in the order they were added.
    pub items: Vec<LineItem>,

    /// Catalog item picked but not yet added.
    pub selected: Option<CatalogItem>,

    pub is_closed: bool,
}

impl Ticket {
    /// Creates an empty open ticket with the given sequence number.
    pub fn new(number: impl Into<String>) -> Self {
        Ticket {
            id: Uuid::new_v4().to_string(),
            number: number.into(),
            customer_name: String::new(),
            items: Vec::new(),
            selected: None,
            is_closed: false,
        }
    }

    /// Sum of the current line item prices, saturating at the `i64` limit.
    pub fn total(&self) -> Money {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Reopens the ticket. Items and any pending selection are discarded.
    pub(crate) fn reopen(&mut self) -> Vec<LineItem> {
        self.is_closed = false;
        self.selected = None;
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, cents: i64) -> LineItem {
        LineItem {
            catalog_id: None,
            name: name.to_string(),
            price: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_new_ticket_is_open_and_empty() {
        let ticket = Ticket::new("1");
        assert!(!ticket.is_closed);
        assert!(ticket.items.is_empty());
        assert_eq!(ticket.total(), Money::zero());
        assert_eq!(ticket.id.len(), 36);
    }

    #[test]
    fn test_total_is_sum_of_items() {
        let mut ticket = Ticket::new("1");
        ticket.items.push(line("Coke", 500));
        ticket.items.push(line("Chips", 350));
        assert_eq!(ticket.total(), Money::from_cents(850));
    }

    #[test]
    fn test_reopen_clears_items() {
        let mut ticket = Ticket::new("1");
        ticket.items.push(line("Coke", 500));
        ticket.is_closed = true;
        let dropped = ticket.reopen();
        assert_eq!(dropped.len(), 1);
        assert!(ticket.items.is_empty());
        assert!(!ticket.is_closed);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Ticket::new("1").id, Ticket::new("1").id);
    }
}
