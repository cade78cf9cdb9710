//! # Settlement Commands
//!
//! Discount, payment split and confirmation for the ticket being closed.
//!
//! ## Confirm Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  confirm_settlement                                                     │
//! │                                                                         │
//! │  1. Read the game slot from the local store                             │
//! │  2. Settlement::confirm(board) ──► SettlementPlan      (locks held)     │
//! │        └─ rejection ──► notification, settlement stays open             │
//! │  3. Backend::post_order(plan.order)                    (no lock held)   │
//! │        └─ failure ──► notification, ticket stays open                   │
//! │  4. board.finalize(plan) ─► ticket closed                               │
//! │  5. settlement confirmed and dismissed                                  │
//! │  6. append payment records                                              │
//! │  7. walk-in only: sold ledger + loose-sale running total                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Posting and local bookkeeping are not one transaction. Once the backend
//! accepts the order the local steps run to completion even if one fails;
//! the failure is returned after the rest is written.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use courtside_core::{
    LedgerScope, LineItem, Money, PaymentRecord, PaymentSummary, ScheduledSlot, Settlement,
    SettlementStatus, Tender, TenderLine, TicketKind,
};

use crate::error::ApiError;
use crate::state::{BoardState, ConfigState, RemoteState, SettlementState, StoreState};

/// The open settlement as the shell shows it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettlementView {
    pub ticket_number: String,
    pub kind: TicketKind,
    pub base_total: Money,
    pub discount: Option<String>,
    pub final_total: Money,
    pub tenders: Vec<(Tender, TenderLine)>,
    pub selected_sum: Money,
    pub status: SettlementStatus,
}

impl From<&Settlement> for SettlementView {
    fn from(s: &Settlement) -> Self {
        SettlementView {
            ticket_number: s.ticket_number().to_string(),
            kind: s.kind(),
            base_total: s.base_total(),
            discount: s.discount_label().map(str::to_string),
            final_total: s.final_total(),
            tenders: s.tenders().collect(),
            selected_sum: s.selected_sum(),
            status: s.status(),
        }
    }
}

/// What a confirmed settlement produced.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmReceipt {
    pub ticket_number: String,
    pub kind: TicketKind,
    pub tender: Tender,
    pub total: Money,
    pub records: Vec<PaymentRecord>,
    /// New walk-in running total; `None` for expense tickets.
    pub loose_sale_total: Option<Money>,
}

/// Persisted payment records and their per-tender totals.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReport {
    pub records: Vec<PaymentRecord>,
    pub summary: PaymentSummary,
    pub loose_sale_total: Money,
}

/// Shows the open settlement, if any.
pub fn get_settlement(settlement: &SettlementState) -> Option<SettlementView> {
    settlement.snapshot().as_ref().map(SettlementView::from)
}

/// Applies a discount label; `None` restores the base total.
pub fn select_discount(
    boards: &BoardState,
    settlement: &SettlementState,
    label: Option<&str>,
) -> Result<SettlementView, ApiError> {
    debug!(?label, "select_discount command");
    let table = boards.with_boards(|b| b.discounts().clone());
    let view = settlement.with_current_mut(|s| {
        s.select_discount(label, &table)?;
        Ok::<_, ApiError>(SettlementView::from(&*s))
    })??;
    Ok(view)
}

/// Records the amount typed for a tender. Unusable input counts as zero.
pub fn set_tender_amount(
    settlement: &SettlementState,
    tender: Tender,
    input: &str,
) -> Result<SettlementView, ApiError> {
    debug!(tender = %tender, input, "set_tender_amount command");
    let view = settlement.with_current_mut(|s| {
        s.set_tender_amount(tender, input)?;
        Ok::<_, ApiError>(SettlementView::from(&*s))
    })??;
    Ok(view)
}

/// Ticks or unticks a tender. Unticking keeps the typed amount.
pub fn toggle_tender(
    settlement: &SettlementState,
    tender: Tender,
    enabled: bool,
) -> Result<SettlementView, ApiError> {
    debug!(tender = %tender, enabled, "toggle_tender command");
    let view = settlement.with_current_mut(|s| {
        s.toggle_tender(tender, enabled)?;
        Ok::<_, ApiError>(SettlementView::from(&*s))
    })??;
    Ok(view)
}

/// Dismisses the settlement; the ticket stays open and unchanged.
pub fn cancel_settlement(settlement: &SettlementState) -> Result<SettlementView, ApiError> {
    debug!("cancel_settlement command");
    let view = settlement.with_current_mut(|s| {
        s.cancel()?;
        Ok::<_, ApiError>(SettlementView::from(&*s))
    })??;
    settlement.take();
    info!(number = %view.ticket_number, "Settlement cancelled");
    Ok(view)
}

/// Validates the split, posts the order and records the payments.
pub async fn confirm_settlement(
    boards: &BoardState,
    settlement: &SettlementState,
    store: &StoreState,
    remote: &RemoteState,
    config: &ConfigState,
) -> Result<ConfirmReceipt, ApiError> {
    debug!("confirm_settlement command");
    let slot = store.inner().scheduled_slot().await?;
    let policy = config.record_policy();

    let (number, plan) = settlement.with_current_mut(|s| {
        let kind = s.kind();
        let plan = boards.with_board(kind, |board| s.confirm(board, policy, slot.as_ref()))?;
        Ok::<_, ApiError>((s.ticket_number().to_string(), plan))
    })??;

    if let Err(e) = remote.backend().post_order(&plan.order).await {
        warn!(number = %number, error = %e, "Order rejected; ticket stays open");
        return Err(e.into());
    }

    // From here on the backend holds the order.
    let mut first_failure: Option<ApiError> = None;

    match boards.with_board_mut(plan.kind, |b| b.finalize(&plan)) {
        Ok(items) => info!(number = %number, items = items.len(), "Ticket closed"),
        Err(e) => {
            error!(number = %number, error = %e, "Order posted but ticket could not be closed");
            first_failure.get_or_insert(e.into());
        }
    }

    if let Err(e) = settlement
        .with_current_mut(|s| s.mark_confirmed())
        .and_then(|confirmed| confirmed.map_err(ApiError::from))
    {
        first_failure.get_or_insert(e);
    }
    settlement.take();

    if let Err(e) = store.inner().append_payments(&plan.records).await {
        error!(number = %number, error = %e, "Payment records not saved");
        first_failure.get_or_insert(e.into());
    }

    let loose_sale_total = if plan.kind == TicketKind::WalkIn {
        record_walk_in_sale(store, &plan.order.items, plan.final_total, &mut first_failure).await
    } else {
        None
    };

    if let Some(failure) = first_failure {
        return Err(failure);
    }

    info!(
        number = %number,
        kind = %plan.kind,
        total = %plan.final_total,
        records = plan.records.len(),
        "Settlement confirmed"
    );

    Ok(ConfirmReceipt {
        ticket_number: number,
        kind: plan.kind,
        tender: plan.order.tender,
        total: plan.final_total,
        records: plan.records,
        loose_sale_total,
    })
}

async fn record_walk_in_sale(
    store: &StoreState,
    items: &[LineItem],
    total: Money,
    first_failure: &mut Option<ApiError>,
) -> Option<Money> {
    let names: Vec<String> = items.iter().map(|item| item.name.clone()).collect();
    if let Err(e) = store.inner().count_items(LedgerScope::WalkInSold, &names).await {
        error!(error = %e, "Sold ledger not updated");
        first_failure.get_or_insert(e.into());
    }

    match store.inner().add_loose_sale_total(total).await {
        Ok(running) => {
            debug!(running = %running, "Loose-sale total updated");
            Some(running)
        }
        Err(e) => {
            error!(error = %e, "Loose-sale total not updated");
            first_failure.get_or_insert(e.into());
            None
        }
    }
}

/// Every persisted payment record with per-tender totals.
pub async fn list_payments(store: &StoreState) -> Result<PaymentReport, ApiError> {
    debug!("list_payments command");
    let records = store.inner().payments().await?;
    let loose_sale_total = store.inner().loose_sale_total().await?;
    let summary = PaymentSummary::from_records(&records);
    Ok(PaymentReport {
        records,
        summary,
        loose_sale_total,
    })
}

/// Sets the game date (`YYYY-MM-DD`) and time (`HH:MM`) sent with orders.
pub async fn set_schedule(
    store: &StoreState,
    date: &str,
    time: &str,
) -> Result<ScheduledSlot, ApiError> {
    debug!(date, time, "set_schedule command");
    let slot = ScheduledSlot::new(date, time)?;
    store.inner().set_scheduled_slot(&slot).await?;
    info!(date_time = %slot.date_time(), "Game slot set");
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{catalog_item, Harness};
    use crate::commands::ticket::{add_item, add_ticket, get_board, select_item, toggle_close};
    use crate::error::ErrorCode;
    use courtside_core::{DiscountRate, RecordPolicy};

    /// Board with one ticket holding Coke 5.00 and Chips 3.50, settling.
    async fn settling_ticket(h: &Harness, kind: TicketKind) {
        h.load_catalog_for(kind, vec![catalog_item("Coke", 500), catalog_item("Chips", 350)]);
        h.boards.with_boards_mut(|b| {
            b.set_active(kind);
            let mut table = courtside_core::DiscountTable::new();
            table.insert("Member", DiscountRate::from_bps(1000));
            b.set_discounts(table);
        });
        add_ticket(&h.boards);
        for name in ["Coke", "Chips"] {
            select_item(&h.boards, 0, name).unwrap();
            add_item(&h.boards, &h.store, 0).await.unwrap();
        }
        toggle_close(&h.boards, &h.settlement, 0).unwrap();
    }

    #[tokio::test]
    async fn test_discounted_cash_settlement() {
        let h = Harness::new();
        settling_ticket(&h, TicketKind::Expense).await;
        set_schedule(&h.store, "2024-05-10", "19:30").await.unwrap();

        let view = select_discount(&h.boards, &h.settlement, Some("Member")).unwrap();
        assert_eq!(view.base_total, Money::from_cents(850));
        assert_eq!(view.final_total, Money::from_cents(765));

        set_tender_amount(&h.settlement, Tender::Cash, "7.65").unwrap();
        toggle_tender(&h.settlement, Tender::Cash, true).unwrap();

        let receipt = confirm_settlement(&h.boards, &h.settlement, &h.store, &h.remote, &h.config)
            .await
            .unwrap();
        assert_eq!(receipt.total, Money::from_cents(765));
        assert_eq!(receipt.tender, Tender::Cash);
        assert_eq!(receipt.loose_sale_total, None);

        assert!(get_board(&h.boards).tickets[0].is_closed);
        assert!(!h.settlement.is_active());

        let posted = h.backend.orders();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].total, Money::from_cents(765));
        assert_eq!(posted[0].scheduled_date_time.as_deref(), Some("2024-05-10 19:30:00"));

        let report = list_payments(&h.store).await.unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].tender, Tender::Cash);
        assert_eq!(report.records[0].amount, Money::from_cents(765));
        assert_eq!(report.summary.grand_total(), Money::from_cents(765));
    }

    #[tokio::test]
    async fn test_unselected_tender_is_rejected() {
        let h = Harness::new();
        settling_ticket(&h, TicketKind::Expense).await;

        set_tender_amount(&h.settlement, Tender::Cash, "5.00").unwrap();
        set_tender_amount(&h.settlement, Tender::Credit, "3.50").unwrap();
        toggle_tender(&h.settlement, Tender::Cash, true).unwrap();

        let err = confirm_settlement(&h.boards, &h.settlement, &h.store, &h.remote, &h.config)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SettlementRejected);
        assert!(h.settlement.is_active());
        assert!(!get_board(&h.boards).tickets[0].is_closed);
        assert!(h.backend.orders().is_empty());
        assert!(list_payments(&h.store).await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_ticket_open() {
        let h = Harness::new();
        settling_ticket(&h, TicketKind::Expense).await;
        h.backend.fail_orders_with("Estoque insuficiente");

        set_tender_amount(&h.settlement, Tender::InstantTransfer, "8.50").unwrap();
        toggle_tender(&h.settlement, Tender::InstantTransfer, true).unwrap();

        let err = confirm_settlement(&h.boards, &h.settlement, &h.store, &h.remote, &h.config)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendError);
        assert_eq!(err.message, "Estoque insuficiente");
        assert!(h.settlement.is_active());
        assert!(!get_board(&h.boards).tickets[0].is_closed);
    }

    #[tokio::test]
    async fn test_walk_in_updates_sold_ledger_and_running_total() {
        let h = Harness::new();
        settling_ticket(&h, TicketKind::WalkIn).await;

        set_tender_amount(&h.settlement, Tender::Debit, "8.50").unwrap();
        toggle_tender(&h.settlement, Tender::Debit, true).unwrap();
        let receipt = confirm_settlement(&h.boards, &h.settlement, &h.store, &h.remote, &h.config)
            .await
            .unwrap();
        assert_eq!(receipt.loose_sale_total, Some(Money::from_cents(850)));

        let sold = h
            .store
            .inner()
            .load_ledger(LedgerScope::WalkInSold)
            .await
            .unwrap();
        assert_eq!(sold.get("Coke"), 1);
        assert_eq!(sold.get("Chips"), 1);

        // Settling does not touch the pending ledger
        let pending = h
            .store
            .inner()
            .load_ledger(LedgerScope::WalkInPending)
            .await
            .unwrap();
        assert_eq!(pending.get("Coke"), 1);
    }

    #[tokio::test]
    async fn test_even_split_policy() {
        let mut h = Harness::new();
        h.config.settlement.record_policy = RecordPolicy::EvenSplit;
        settling_ticket(&h, TicketKind::Expense).await;

        set_tender_amount(&h.settlement, Tender::Cash, "5.00").unwrap();
        set_tender_amount(&h.settlement, Tender::Credit, "3.50").unwrap();
        toggle_tender(&h.settlement, Tender::Cash, true).unwrap();
        toggle_tender(&h.settlement, Tender::Credit, true).unwrap();

        let receipt = confirm_settlement(&h.boards, &h.settlement, &h.store, &h.remote, &h.config)
            .await
            .unwrap();
        let amounts: Vec<i64> = receipt.records.iter().map(|r| r.amount.cents()).collect();
        assert_eq!(amounts, vec![425, 425]);
    }

    #[tokio::test]
    async fn test_cancel_leaves_ticket_untouched() {
        let h = Harness::new();
        settling_ticket(&h, TicketKind::Expense).await;
        set_tender_amount(&h.settlement, Tender::Cash, "8.50").unwrap();

        let view = cancel_settlement(&h.settlement).unwrap();
        assert_eq!(view.status, SettlementStatus::Cancelled);
        assert!(!h.settlement.is_active());

        let board = get_board(&h.boards);
        assert!(!board.tickets[0].is_closed);
        assert_eq!(board.tickets[0].items.len(), 2);

        let err = cancel_settlement(&h.settlement).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoSettlement);
    }

    #[tokio::test]
    async fn test_unknown_discount_and_bad_schedule() {
        let h = Harness::new();
        settling_ticket(&h, TicketKind::Expense).await;

        let err = select_discount(&h.boards, &h.settlement, Some("Staff")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = set_schedule(&h.store, "10/05/2024", "19:30").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(h.store.inner().scheduled_slot().await.unwrap().is_none());
    }
}
