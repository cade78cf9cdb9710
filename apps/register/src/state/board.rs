//! # Board State
//!
//! Both ticket boards plus the discount table they share.
//!
//! ## Board Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shell Command           Command fn               Board Change          │
//! │  ─────────────           ──────────               ────────────          │
//! │  new ──────────────────► add_ticket() ──────────► tickets.push          │
//! │  select 1 Coke ────────► select_item() ─────────► ticket.selected       │
//! │  add 1 ────────────────► add_item() ────────────► items.push, ledger +1 │
//! │  drop 1 2 ─────────────► remove_item() ─────────► items.remove, ledger-1│
//! │  close 1 ──────────────► toggle_close() ────────► reopen | settlement   │
//! │                                                                         │
//! │  Ledger changes are saved to the local store after the lock is          │
//! │  released.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use courtside_core::{DiscountTable, QuantityLedger, TicketBoard, TicketKind};

/// The two boards and which one the shell is looking at.
#[derive(Debug)]
pub struct Boards {
    expense: TicketBoard,
    walk_in: TicketBoard,
    active: TicketKind,
    discounts: DiscountTable,
}

impl Boards {
    /// Creates both boards from their persisted pending ledgers.
    pub fn new(expense_ledger: QuantityLedger, walk_in_ledger: QuantityLedger) -> Self {
        Boards {
            expense: TicketBoard::with_ledger(TicketKind::Expense, expense_ledger),
            walk_in: TicketBoard::with_ledger(TicketKind::WalkIn, walk_in_ledger),
            active: TicketKind::Expense,
            discounts: DiscountTable::new(),
        }
    }

    pub fn active(&self) -> TicketKind {
        self.active
    }

    pub fn set_active(&mut self, kind: TicketKind) {
        self.active = kind;
    }

    pub fn board(&self, kind: TicketKind) -> &TicketBoard {
        match kind {
            TicketKind::Expense => &self.expense,
            TicketKind::WalkIn => &self.walk_in,
        }
    }

    pub fn board_mut(&mut self, kind: TicketKind) -> &mut TicketBoard {
        match kind {
            TicketKind::Expense => &mut self.expense,
            TicketKind::WalkIn => &mut self.walk_in,
        }
    }

    pub fn active_board(&self) -> &TicketBoard {
        self.board(self.active)
    }

    pub fn active_board_mut(&mut self) -> &mut TicketBoard {
        self.board_mut(self.active)
    }

    pub fn discounts(&self) -> &DiscountTable {
        &self.discounts
    }

    pub fn set_discounts(&mut self, discounts: DiscountTable) {
        self.discounts = discounts;
    }
}

impl Default for Boards {
    fn default() -> Self {
        Boards::new(QuantityLedger::new(), QuantityLedger::new())
    }
}

/// Shared board state.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    boards: Arc<Mutex<Boards>>,
}

impl BoardState {
    pub fn new(boards: Boards) -> Self {
        BoardState {
            boards: Arc::new(Mutex::new(boards)),
        }
    }

    /// Executes a function with read access to the boards.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let kind = board_state.with_boards(|b| b.active());
    /// ```
    pub fn with_boards<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Boards) -> R,
    {
        let boards = self.boards.lock().unwrap_or_else(PoisonError::into_inner);
        f(&boards)
    }

    /// Executes a function with write access to the boards.
    pub fn with_boards_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Boards) -> R,
    {
        let mut boards = self.boards.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut boards)
    }

    /// Read access to one board.
    pub fn with_board<F, R>(&self, kind: TicketKind, f: F) -> R
    where
        F: FnOnce(&TicketBoard) -> R,
    {
        self.with_boards(|b| f(b.board(kind)))
    }

    /// Write access to one board.
    pub fn with_board_mut<F, R>(&self, kind: TicketKind, f: F) -> R
    where
        F: FnOnce(&mut TicketBoard) -> R,
    {
        self.with_boards_mut(|b| f(b.board_mut(kind)))
    }
}
