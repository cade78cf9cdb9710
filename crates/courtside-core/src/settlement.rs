//! # Payment Settlement
//!
//! Closes a ticket against a discount choice and a split of the amount
//! across tenders.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   toggle_close(open ticket)                                             │
//! │            │                                                            │
//! │            ▼                                                            │
//! │        ┌────────┐  confirm() rejected (mismatch, no tender, ...)        │
//! │        │  OPEN  │◄───────────────────────────┐                          │
//! │        └───┬────┘────────────────────────────┘                          │
//! │            │                                                            │
//! │    confirm()│ ok ──► SettlementPlan ──► OrderSink ──► mark_confirmed()  │
//! │            │                                              │             │
//! │    cancel()│                                              ▼             │
//! │            ▼                                        ┌───────────┐       │
//! │      ┌───────────┐                                  │ CONFIRMED │       │
//! │      │ CANCELLED │                                  └───────────┘       │
//! │      └───────────┘                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `confirm()` is pure: it validates and builds a [`SettlementPlan`] but
//! does not touch the board. The caller posts the order and only then
//! calls [`TicketBoard::finalize`](crate::board::TicketBoard::finalize) and
//! [`Settlement::mark_confirmed`]. A failed post leaves the ticket open and
//! the settlement still open.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::board::TicketBoard;
use crate::error::{CoreError, CoreResult, SettlementRejection};
use crate::money::Money;
use crate::ticket::Ticket;
use crate::types::{
    DiscountRate, DiscountTable, LineItem, PaymentRecord, RecordPolicy, ScheduledSlot, Tender,
    TicketKind,
};

// =============================================================================
// Settlement Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Open,
    Confirmed,
    Cancelled,
}

impl SettlementStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Open => "open",
            SettlementStatus::Confirmed => "confirmed",
            SettlementStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Tender Line
// =============================================================================

/// Amount entered for one tender and whether it counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderLine {
    pub amount: Money,
    pub selected: bool,
}

// =============================================================================
// Order Request
// =============================================================================

/// The finalized order handed to the order sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_name: String,
    pub items: Vec<LineItem>,
    /// First selected tender in enumeration order.
    pub tender: Tender,
    pub total: Money,
    /// `"YYYY-MM-DD HH:MM:00"`, or `None` when no game slot is set.
    pub scheduled_date_time: Option<String>,
}

/// Everything needed to finish a validated settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub ticket_id: String,
    pub kind: TicketKind,
    pub final_total: Money,
    pub order: OrderRequest,
    /// One record per selected tender, per the record policy.
    pub records: Vec<PaymentRecord>,
}

// =============================================================================
// Settlement
// =============================================================================

/// An in-progress payment split for one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    ticket_id: String,
    ticket_number: String,
    kind: TicketKind,
    base_total: Money,
    discount: Option<(String, DiscountRate)>,
    tenders: [TenderLine; 4],
    status: SettlementStatus,
}

impl Settlement {
    /// Starts settling `ticket`. The base total is the ticket's current total.
    pub fn open(kind: TicketKind, ticket: &Ticket) -> Self {
        debug!(kind = %kind, id = %ticket.id, total = %ticket.total(), "Settlement opened");
        Settlement {
            ticket_id: ticket.id.clone(),
            ticket_number: ticket.number.clone(),
            kind,
            base_total: ticket.total(),
            discount: None,
            tenders: [TenderLine::default(); 4],
            status: SettlementStatus::Open,
        }
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn ticket_number(&self) -> &str {
        &self.ticket_number
    }

    pub fn kind(&self) -> TicketKind {
        self.kind
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == SettlementStatus::Open
    }

    pub fn base_total(&self) -> Money {
        self.base_total
    }

    /// Label of the selected discount, if any.
    pub fn discount_label(&self) -> Option<&str> {
        self.discount.as_ref().map(|(label, _)| label.as_str())
    }

    /// Discounted total, or `None` when no discount is selected.
    ///
    /// A 100% discount yields `Some(R$ 0.00)`, not the base total.
    pub fn discounted_total(&self) -> Option<Money> {
        self.discount
            .as_ref()
            .map(|(_, rate)| self.base_total.apply_discount(*rate))
    }

    /// The amount the selected tenders must add up to.
    pub fn final_total(&self) -> Money {
        self.discounted_total().unwrap_or(self.base_total)
    }

    pub fn tender(&self, tender: Tender) -> TenderLine {
        self.tenders[tender.index()]
    }

    /// `(tender, line)` pairs in enumeration order.
    pub fn tenders(&self) -> impl Iterator<Item = (Tender, TenderLine)> + '_ {
        Tender::ALL.iter().map(move |t| (*t, self.tenders[t.index()]))
    }

    /// Sum of the amounts of the selected tenders.
    pub fn selected_sum(&self) -> Money {
        self.tenders()
            .filter(|(_, line)| line.selected)
            .map(|(_, line)| line.amount)
            .sum()
    }

    /// First selected tender in enumeration order.
    pub fn chosen_tender(&self) -> Option<Tender> {
        self.tenders()
            .find(|(_, line)| line.selected)
            .map(|(tender, _)| tender)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Selects a discount by label, or clears it with `None`.
    pub fn select_discount(&mut self, label: Option<&str>, table: &DiscountTable) -> CoreResult<()> {
        self.ensure_open()?;
        match label {
            None => {
                self.discount = None;
            }
            Some(label) => {
                let rate = table
                    .get(label)
                    .ok_or_else(|| CoreError::UnknownDiscount(label.to_string()))?;
                self.discount = Some((label.to_string(), rate));
            }
        }
        debug!(
            id = %self.ticket_id,
            discount = ?self.discount_label(),
            final_total = %self.final_total(),
            "Discount selected"
        );
        Ok(())
    }

    /// Stores the amount typed for `tender`.
    ///
    /// Input that is not a non-negative amount with at most two decimal
    /// places is stored as zero. Returns the stored amount.
    pub fn set_tender_amount(&mut self, tender: Tender, input: &str) -> CoreResult<Money> {
        let amount = match Money::parse_amount(input) {
            Some(amount) => amount,
            None => {
                debug!(%tender, input, "Unusable amount, storing zero");
                Money::zero()
            }
        };
        self.set_tender_amount_cents(tender, amount)?;
        Ok(amount)
    }

    /// Stores an already parsed amount for `tender`. Negative or
    /// out-of-limit amounts become zero.
    pub fn set_tender_amount_cents(&mut self, tender: Tender, amount: Money) -> CoreResult<()> {
        self.ensure_open()?;
        let amount = if amount.is_negative() || !amount.is_within_limit() {
            Money::zero()
        } else {
            amount
        };
        self.tenders[tender.index()].amount = amount;
        Ok(())
    }

    /// Turns a tender on or off. The entered amount is kept either way.
    pub fn toggle_tender(&mut self, tender: Tender, enabled: bool) -> CoreResult<()> {
        self.ensure_open()?;
        self.tenders[tender.index()].selected = enabled;
        Ok(())
    }

    /// Abandons the settlement. The ticket is not touched.
    pub fn cancel(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.status = SettlementStatus::Cancelled;
        debug!(id = %self.ticket_id, "Settlement cancelled");
        Ok(())
    }

    /// Validates the split against the ticket as it is now on `board`.
    ///
    /// ## Validation Order
    /// 1. The ticket must still be on the board
    /// 2. Selected amounts must add up to the final total, to the centavo
    /// 3. At least one tender must be selected
    ///
    /// The base total is recomputed from the ticket's current items, so
    /// items added while the settlement was open are charged.
    pub fn confirm(
        &mut self,
        board: &TicketBoard,
        policy: RecordPolicy,
        slot: Option<&ScheduledSlot>,
    ) -> CoreResult<SettlementPlan> {
        self.ensure_open()?;

        let ticket = board
            .ticket_by_id(&self.ticket_id)
            .ok_or(SettlementRejection::TicketNotFound)?;

        self.base_total = ticket.total();
        let final_total = self.final_total();
        let exact_base = Money::checked_sum(ticket.items.iter().map(|item| item.price));
        let exact_entered = Money::checked_sum(
            self.tenders()
                .filter(|(_, line)| line.selected)
                .map(|(_, line)| line.amount),
        );
        let balanced = exact_base.is_some() && exact_entered == Some(final_total);
        if !balanced {
            return Err(SettlementRejection::TotalMismatch {
                expected: final_total,
                entered: self.selected_sum(),
            }
            .into());
        }

        let tender = self
            .chosen_tender()
            .ok_or(SettlementRejection::NoTenderSelected)?;

        let scheduled_date_time = slot.map(ScheduledSlot::date_time);
        if scheduled_date_time.is_none() {
            warn!(id = %self.ticket_id, "No game date/time set; order will carry no dataJogo");
        }

        let records = self.build_records(policy, final_total);

        Ok(SettlementPlan {
            ticket_id: self.ticket_id.clone(),
            kind: self.kind,
            final_total,
            order: OrderRequest {
                customer_name: ticket.customer_name.clone(),
                items: ticket.items.clone(),
                tender,
                total: final_total,
                scheduled_date_time,
            },
            records,
        })
    }

    /// Moves the settlement to its terminal confirmed state.
    pub fn mark_confirmed(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.status = SettlementStatus::Confirmed;
        Ok(())
    }

    fn build_records(&self, policy: RecordPolicy, final_total: Money) -> Vec<PaymentRecord> {
        let selected: Vec<(Tender, TenderLine)> =
            self.tenders().filter(|(_, line)| line.selected).collect();

        let amounts: Vec<Money> = match policy {
            RecordPolicy::EnteredAmounts => selected.iter().map(|(_, line)| line.amount).collect(),
            RecordPolicy::EvenSplit => final_total.split_evenly(selected.len()),
        };

        let recorded_at = Utc::now();
        selected
            .iter()
            .zip(amounts)
            .map(|((tender, _), amount)| PaymentRecord {
                id: Uuid::new_v4().to_string(),
                ticket_id: self.ticket_id.clone(),
                ticket_kind: self.kind,
                tender: *tender,
                amount,
                recorded_at,
            })
            .collect()
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::SettlementNotOpen {
                status: self.status.as_str().to_string(),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CloseOutcome;
    use crate::types::CatalogItem;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem {
                id: "1".to_string(),
                name: "Coke".to_string(),
                price: Money::from_cents(500),
                available_quantity: 20,
            },
            CatalogItem {
                id: "2".to_string(),
                name: "Chips".to_string(),
                price: Money::from_cents(350),
                available_quantity: 8,
            },
        ]
    }

    fn discounts() -> DiscountTable {
        let mut table = DiscountTable::new();
        table.insert("Member", DiscountRate::from_bps(1000));
        table.insert("Staff", DiscountRate::from_bps(10000));
        table
    }

    /// Board with one ticket holding Coke and Chips (R$ 8.50).
    fn board_and_settlement() -> (TicketBoard, Settlement) {
        let mut board = TicketBoard::new(TicketKind::Expense);
        board.replace_catalog(catalog());
        board.add_ticket();
        board.rename_ticket(0, "Ana").unwrap();
        for name in ["Coke", "Chips"] {
            board.select_catalog_item(0, name).unwrap();
            board.add_selected_item(0).unwrap();
        }
        let settlement = match board.toggle_close(0).unwrap() {
            CloseOutcome::Settle(settlement) => settlement,
            other => panic!("expected settlement, got {other:?}"),
        };
        (board, settlement)
    }

    fn slot() -> ScheduledSlot {
        ScheduledSlot::new("2024-05-10", "19:30").unwrap()
    }

    #[test]
    fn test_discount_applies_and_none_restores() {
        let (_, mut settlement) = board_and_settlement();
        assert_eq!(settlement.base_total(), Money::from_cents(850));

        settlement.select_discount(Some("Member"), &discounts()).unwrap();
        assert_eq!(settlement.final_total(), Money::from_cents(765));

        settlement.select_discount(None, &discounts()).unwrap();
        assert_eq!(settlement.discounted_total(), None);
        assert_eq!(settlement.final_total(), Money::from_cents(850));
    }

    #[test]
    fn test_full_discount_is_zero_not_base() {
        let (_, mut settlement) = board_and_settlement();
        settlement.select_discount(Some("Staff"), &discounts()).unwrap();
        assert_eq!(settlement.discounted_total(), Some(Money::zero()));
        assert_eq!(settlement.final_total(), Money::zero());
    }

    #[test]
    fn test_unknown_discount_is_rejected() {
        let (_, mut settlement) = board_and_settlement();
        let err = settlement
            .select_discount(Some("Birthday"), &discounts())
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownDiscount("Birthday".to_string()));
        assert_eq!(settlement.final_total(), Money::from_cents(850));
    }

    #[test]
    fn test_bad_amount_input_becomes_zero() {
        let (_, mut settlement) = board_and_settlement();
        assert_eq!(
            settlement.set_tender_amount(Tender::Cash, "abc").unwrap(),
            Money::zero()
        );
        assert_eq!(
            settlement.set_tender_amount(Tender::Cash, "-3").unwrap(),
            Money::zero()
        );
        assert_eq!(
            settlement.set_tender_amount(Tender::Cash, "7,65").unwrap(),
            Money::from_cents(765)
        );
    }

    #[test]
    fn test_disabling_tender_keeps_amount() {
        let (_, mut settlement) = board_and_settlement();
        settlement.set_tender_amount(Tender::Debit, "4.00").unwrap();
        settlement.toggle_tender(Tender::Debit, true).unwrap();
        settlement.toggle_tender(Tender::Debit, false).unwrap();
        let line = settlement.tender(Tender::Debit);
        assert_eq!(line.amount, Money::from_cents(400));
        assert!(!line.selected);
        assert_eq!(settlement.selected_sum(), Money::zero());
    }

    #[test]
    fn test_discounted_cash_settlement_succeeds() {
        let (mut board, mut settlement) = board_and_settlement();
        settlement.select_discount(Some("Member"), &discounts()).unwrap();
        settlement.set_tender_amount(Tender::Cash, "7.65").unwrap();
        settlement.toggle_tender(Tender::Cash, true).unwrap();

        let plan = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, Some(&slot()))
            .unwrap();
        assert_eq!(plan.final_total, Money::from_cents(765));
        assert_eq!(plan.order.tender, Tender::Cash);
        assert_eq!(plan.order.customer_name, "Ana");
        assert_eq!(plan.order.items.len(), 2);
        assert_eq!(
            plan.order.scheduled_date_time.as_deref(),
            Some("2024-05-10 19:30:00")
        );
        assert_eq!(plan.records.len(), 1);
        assert_eq!(plan.records[0].tender, Tender::Cash);
        assert_eq!(plan.records[0].amount, Money::from_cents(765));

        board.finalize(&plan).unwrap();
        settlement.mark_confirmed().unwrap();
        assert!(board.ticket(0).unwrap().is_closed);
        assert_eq!(settlement.status(), SettlementStatus::Confirmed);
    }

    #[test]
    fn test_unselected_amount_does_not_count() {
        let (board, mut settlement) = board_and_settlement();
        settlement.set_tender_amount(Tender::Cash, "5.00").unwrap();
        settlement.set_tender_amount(Tender::Credit, "3.50").unwrap();
        settlement.toggle_tender(Tender::Cash, true).unwrap();

        let err = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, Some(&slot()))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Rejected(SettlementRejection::TotalMismatch {
                expected: Money::from_cents(850),
                entered: Money::from_cents(500),
            })
        );
        assert!(settlement.is_open());
        assert!(!board.ticket(0).unwrap().is_closed);
    }

    #[test]
    fn test_near_equal_amount_is_rejected() {
        let (board, mut settlement) = board_and_settlement();
        settlement.select_discount(Some("Member"), &discounts()).unwrap();
        settlement.set_tender_amount(Tender::Cash, "7.649").unwrap();
        settlement.toggle_tender(Tender::Cash, true).unwrap();
        assert!(matches!(
            settlement.confirm(&board, RecordPolicy::EnteredAmounts, None),
            Err(CoreError::Rejected(SettlementRejection::TotalMismatch { .. }))
        ));

        settlement.set_tender_amount(Tender::Cash, "7.64").unwrap();
        assert!(settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, None)
            .is_err());
    }

    #[test]
    fn test_oversized_split_cannot_wrap_into_a_match() {
        let (board, mut settlement) = board_and_settlement();
        settlement.set_tender_amount(Tender::Cash, "92233720368547758.07").unwrap();
        settlement.set_tender_amount(Tender::Credit, "92233720368547758.07").unwrap();
        settlement.set_tender_amount(Tender::Debit, "8.52").unwrap();
        settlement
            .set_tender_amount_cents(Tender::InstantTransfer, Money::from_cents(i64::MAX))
            .unwrap();
        for tender in Tender::ALL {
            settlement.toggle_tender(tender, true).unwrap();
        }

        assert_eq!(settlement.tender(Tender::Cash).amount, Money::zero());
        assert_eq!(settlement.tender(Tender::InstantTransfer).amount, Money::zero());
        let err = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, None)
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Rejected(SettlementRejection::TotalMismatch {
                expected: Money::from_cents(850),
                entered: Money::from_cents(852),
            })
        );
        assert!(settlement.is_open());
    }

    #[test]
    fn test_overflowing_ticket_total_is_rejected() {
        let mut board = TicketBoard::new(TicketKind::Expense);
        board.replace_catalog(vec![CatalogItem {
            id: "9".to_string(),
            name: "Suite".to_string(),
            price: Money::from_cents(i64::MAX),
            available_quantity: 2,
        }]);
        board.add_ticket();
        for _ in 0..2 {
            board.select_catalog_item(0, "Suite").unwrap();
            board.add_selected_item(0).unwrap();
        }
        let mut settlement = match board.toggle_close(0).unwrap() {
            CloseOutcome::Settle(settlement) => settlement,
            other => panic!("expected settlement, got {other:?}"),
        };
        settlement.toggle_tender(Tender::Cash, true).unwrap();

        assert!(matches!(
            settlement.confirm(&board, RecordPolicy::EnteredAmounts, None),
            Err(CoreError::Rejected(SettlementRejection::TotalMismatch { .. }))
        ));
    }

    #[test]
    fn test_no_tender_selected_is_rejected() {
        let (board, mut settlement) = board_and_settlement();
        settlement.select_discount(Some("Staff"), &discounts()).unwrap();
        let err = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, None)
            .unwrap_err();
        assert_eq!(err, CoreError::Rejected(SettlementRejection::NoTenderSelected));
    }

    #[test]
    fn test_removed_ticket_is_not_found() {
        let (mut board, mut settlement) = board_and_settlement();
        board.remove_ticket(0).unwrap();
        let err = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, None)
            .unwrap_err();
        assert_eq!(err, CoreError::Rejected(SettlementRejection::TicketNotFound));
    }

    #[test]
    fn test_chosen_tender_is_first_in_enumeration_order() {
        let (board, mut settlement) = board_and_settlement();
        settlement.set_tender_amount(Tender::InstantTransfer, "5").unwrap();
        settlement.set_tender_amount(Tender::Credit, "3.50").unwrap();
        settlement.toggle_tender(Tender::InstantTransfer, true).unwrap();
        settlement.toggle_tender(Tender::Credit, true).unwrap();

        let plan = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, None)
            .unwrap();
        assert_eq!(plan.order.tender, Tender::Credit);
        assert_eq!(plan.order.scheduled_date_time, None);
        let tenders: Vec<Tender> = plan.records.iter().map(|r| r.tender).collect();
        assert_eq!(tenders, vec![Tender::Credit, Tender::InstantTransfer]);
    }

    #[test]
    fn test_even_split_records_sum_to_total() {
        let (board, mut settlement) = board_and_settlement();
        settlement.set_tender_amount(Tender::Cash, "8.00").unwrap();
        settlement.set_tender_amount(Tender::Debit, "0.25").unwrap();
        settlement.set_tender_amount(Tender::InstantTransfer, "0.25").unwrap();
        for tender in [Tender::Cash, Tender::Debit, Tender::InstantTransfer] {
            settlement.toggle_tender(tender, true).unwrap();
        }

        let plan = settlement
            .confirm(&board, RecordPolicy::EvenSplit, None)
            .unwrap();
        let amounts: Vec<i64> = plan.records.iter().map(|r| r.amount.cents()).collect();
        assert_eq!(amounts, vec![284, 283, 283]);
        let total: Money = plan.records.iter().map(|r| r.amount).sum();
        assert_eq!(total, plan.final_total);
    }

    #[test]
    fn test_confirm_charges_items_added_while_open() {
        let (mut board, mut settlement) = board_and_settlement();
        board.select_catalog_item(0, "Coke").unwrap();
        board.add_selected_item(0).unwrap();

        settlement.set_tender_amount(Tender::Cash, "8.50").unwrap();
        settlement.toggle_tender(Tender::Cash, true).unwrap();
        let err = settlement
            .confirm(&board, RecordPolicy::EnteredAmounts, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Rejected(SettlementRejection::TotalMismatch { expected, .. })
                if expected == Money::from_cents(1350)
        ));
    }

    #[test]
    fn test_cancel_leaves_ticket_open_and_is_terminal() {
        let (board, mut settlement) = board_and_settlement();
        settlement.cancel().unwrap();
        assert_eq!(settlement.status(), SettlementStatus::Cancelled);
        assert!(!board.ticket(0).unwrap().is_closed);
        assert_eq!(board.ticket(0).unwrap().items.len(), 2);

        assert!(matches!(
            settlement.confirm(&board, RecordPolicy::EnteredAmounts, None),
            Err(CoreError::SettlementNotOpen { .. })
        ));
        assert!(settlement.cancel().is_err());
    }
}
