//! # Domain Types
//!
//! Core domain types shared by the board, settlement and storage layers.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │    LineItem     │   │ PaymentRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  name (frozen)  │   │  ticket_id      │       │
//! │  │  name           │   │  price (frozen) │   │  tender         │       │
//! │  │  price          │   └─────────────────┘   │  amount         │       │
//! │  │  available_qty  │                          └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │     Tender      │   │   TicketKind    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Cash, Credit   │   │  Expense        │       │
//! │  │  1000 = 10%     │   │  Debit, Pix     │   │  WalkIn         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_discount_bps, validate_scheduled_date, validate_scheduled_time};

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 10000 bps = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a discount rate from a percentage such as `12.5`.
    ///
    /// Percentages finer than a basis point round half away from zero.
    ///
    /// ## Rules
    /// - Must be between 0 and 100
    ///
    /// ## Example
    /// ```rust
    /// use courtside_core::types::DiscountRate;
    /// use rust_decimal::Decimal;
    ///
    /// let rate = DiscountRate::from_decimal_percentage(Decimal::new(125, 1)).unwrap();
    /// assert_eq!(rate.bps(), 1250);
    /// ```
    pub fn from_decimal_percentage(pct: Decimal) -> Result<Self, ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        let bps = pct
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(out_of_range)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .ok_or_else(out_of_range)?;
        validate_discount_bps(bps)?;
        Ok(DiscountRate(bps))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Discount Table
// =============================================================================

/// Discount label → rate, as published by the backend.
///
/// Labels are kept sorted so the shell lists them in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountTable {
    entries: BTreeMap<String, DiscountRate>,
}

impl DiscountTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a discount.
    pub fn insert(&mut self, label: impl Into<String>, rate: DiscountRate) {
        self.entries.insert(label.into(), rate);
    }

    /// Looks up a discount by exact label.
    pub fn get(&self, label: &str) -> Option<DiscountRate> {
        self.entries.get(label).copied()
    }

    /// Iterates `(label, rate)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DiscountRate)> {
        self.entries.iter().map(|(label, rate)| (label.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, DiscountRate)> for DiscountTable {
    fn from_iter<I: IntoIterator<Item = (String, DiscountRate)>>(iter: I) -> Self {
        DiscountTable {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Tender
// =============================================================================

/// Payment method category.
///
/// The declaration order is the fixed enumeration order used when picking
/// the order's "chosen tender" and when listing tenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Tender {
    /// Physical cash.
    Cash,
    /// Credit card on the venue terminal.
    Credit,
    /// Debit card on the venue terminal.
    Debit,
    /// Instant bank transfer (Pix).
    InstantTransfer,
}

impl Tender {
    /// Every tender, in enumeration order.
    pub const ALL: [Tender; 4] = [
        Tender::Cash,
        Tender::Credit,
        Tender::Debit,
        Tender::InstantTransfer,
    ];

    /// Name the backend expects in `formaPagamento`.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Tender::Cash => "dinheiro",
            Tender::Credit => "credito",
            Tender::Debit => "debito",
            Tender::InstantTransfer => "pix",
        }
    }

    /// Position in [`Tender::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            Tender::Cash => 0,
            Tender::Credit => 1,
            Tender::Debit => 2,
            Tender::InstantTransfer => 3,
        }
    }
}

impl fmt::Display for Tender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tender::Cash => write!(f, "cash"),
            Tender::Credit => write!(f, "credit"),
            Tender::Debit => write!(f, "debit"),
            Tender::InstantTransfer => write!(f, "pix"),
        }
    }
}

impl FromStr for Tender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(Tender::Cash),
            "credit" | "credito" | "crédito" => Ok(Tender::Credit),
            "debit" | "debito" | "débito" => Ok(Tender::Debit),
            "pix" | "instant" | "instant_transfer" | "instant-transfer" => {
                Ok(Tender::InstantTransfer)
            }
            _ => Err(ValidationError::NotAllowed {
                field: "tender".to_string(),
                allowed: Tender::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Ticket Kind
// =============================================================================

/// Which board a ticket lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Expense card: a tab run by a player during a game.
    Expense,
    /// Walk-in sale: counter purchase by someone not on a tab.
    WalkIn,
}

impl TicketKind {
    /// Ledger that tracks items sitting on open tickets of this kind.
    pub const fn pending_scope(&self) -> LedgerScope {
        match self {
            TicketKind::Expense => LedgerScope::ExpensePending,
            TicketKind::WalkIn => LedgerScope::WalkInPending,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketKind::Expense => "expense",
            TicketKind::WalkIn => "walk_in",
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketKind::Expense => write!(f, "Expenses"),
            TicketKind::WalkIn => write!(f, "Walk-in sale"),
        }
    }
}

impl FromStr for TicketKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" | "despesas" => Ok(TicketKind::Expense),
            "walk-in" | "walk_in" | "walkin" | "avulsa" => Ok(TicketKind::WalkIn),
            _ => Err(ValidationError::NotAllowed {
                field: "board".to_string(),
                allowed: vec!["expense".to_string(), "walk-in".to_string()],
            }),
        }
    }
}

// =============================================================================
// Ledger Scope
// =============================================================================

/// Which persisted quantity ledger an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerScope {
    /// Items currently on open expense tickets.
    ExpensePending,
    /// Items currently on open walk-in tickets.
    WalkInPending,
    /// Items sold through confirmed walk-in settlements.
    WalkInSold,
}

impl LedgerScope {
    pub const ALL: [LedgerScope; 3] = [
        LedgerScope::ExpensePending,
        LedgerScope::WalkInPending,
        LedgerScope::WalkInSold,
    ];

    /// Storage key.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerScope::ExpensePending => "expense_pending",
            LedgerScope::WalkInPending => "walk_in_pending",
            LedgerScope::WalkInSold => "walk_in_sold",
        }
    }
}

impl fmt::Display for LedgerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A purchasable stock item. Owned by the backend; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub available_quantity: i64,
}

// =============================================================================
// Line Item
// =============================================================================

/// An item on a ticket.
/// Uses snapshot pattern to freeze catalog data at the time it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Catalog id at time of adding, when the catalog supplied one.
    pub catalog_id: Option<String>,
    /// Item name at time of adding (frozen).
    pub name: String,
    /// Price at time of adding (frozen).
    pub price: Money,
}

impl LineItem {
    /// Freezes a catalog item into a line item.
    pub fn snapshot(item: &CatalogItem) -> Self {
        LineItem {
            catalog_id: Some(item.id.clone()).filter(|id| !id.is_empty()),
            name: item.name.clone(),
            price: item.price,
        }
    }
}

// =============================================================================
// Payment Record
// =============================================================================

/// One tender's share of a settled ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub ticket_id: String,
    pub ticket_kind: TicketKind,
    pub tender: Tender,
    pub amount: Money,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

/// How settled payments are written to the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecordPolicy {
    /// Each selected tender records the amount staff entered for it.
    #[default]
    EnteredAmounts,
    /// The final total is divided evenly across the selected tenders.
    EvenSplit,
}

impl fmt::Display for RecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordPolicy::EnteredAmounts => write!(f, "entered_amounts"),
            RecordPolicy::EvenSplit => write!(f, "even_split"),
        }
    }
}

impl FromStr for RecordPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "entered_amounts" | "entered" => Ok(RecordPolicy::EnteredAmounts),
            "even_split" | "even" => Ok(RecordPolicy::EvenSplit),
            _ => Err(ValidationError::NotAllowed {
                field: "record_policy".to_string(),
                allowed: vec!["entered_amounts".to_string(), "even_split".to_string()],
            }),
        }
    }
}

/// Running totals per tender over the persisted records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub totals: BTreeMap<Tender, Money>,
    pub record_count: usize,
}

impl PaymentSummary {
    /// Folds a record list into per-tender totals.
    pub fn from_records(records: &[PaymentRecord]) -> Self {
        let mut totals = BTreeMap::new();
        for record in records {
            *totals.entry(record.tender).or_insert_with(Money::zero) += record.amount;
        }
        PaymentSummary {
            totals,
            record_count: records.len(),
        }
    }

    /// Grand total across tenders.
    pub fn grand_total(&self) -> Money {
        self.totals.values().sum()
    }
}

// =============================================================================
// Scheduled Slot
// =============================================================================

/// The game date and time set elsewhere in the venue workflow.
///
/// Orders carry it as `"YYYY-MM-DD HH:MM:00"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSlot {
    date: String,
    time: String,
}

impl ScheduledSlot {
    /// Validates and builds a slot from `YYYY-MM-DD` and `HH:MM`.
    pub fn new(date: &str, time: &str) -> Result<Self, ValidationError> {
        validate_scheduled_date(date)?;
        validate_scheduled_time(time)?;
        Ok(ScheduledSlot {
            date: date.trim().to_string(),
            time: time.trim().to_string(),
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// The `dataJogo` string sent with orders.
    pub fn date_time(&self) -> String {
        format!("{} {}:00", self.date, self.time)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_from_percentage() {
        let rate = |text: &str| DiscountRate::from_decimal_percentage(Decimal::from_str(text).unwrap());
        assert_eq!(rate("10").unwrap().bps(), 1000);
        assert_eq!(rate("12.5").unwrap().bps(), 1250);
        assert_eq!(rate("100").unwrap().bps(), 10000);
        assert!(rate("101").is_err());
        assert!(rate("-5").is_err());
    }

    #[test]
    fn test_discount_percentage_is_exact() {
        let rate = |text: &str| DiscountRate::from_decimal_percentage(Decimal::from_str(text).unwrap());
        assert_eq!(rate("0.29").unwrap().bps(), 29);
        assert_eq!(rate("33.335").unwrap().bps(), 3334);
        assert_eq!(rate("0.004").unwrap().bps(), 0);
    }

    #[test]
    fn test_tender_order_and_names() {
        assert_eq!(Tender::ALL[0], Tender::Cash);
        assert_eq!(Tender::InstantTransfer.wire_name(), "pix");
        assert_eq!("dinheiro".parse::<Tender>().unwrap(), Tender::Cash);
        assert_eq!("Credit".parse::<Tender>().unwrap(), Tender::Credit);
        assert!("cheque".parse::<Tender>().is_err());
        for (i, tender) in Tender::ALL.iter().enumerate() {
            assert_eq!(tender.index(), i);
        }
    }

    #[test]
    fn test_ticket_kind_scopes_are_separate() {
        assert_ne!(
            TicketKind::Expense.pending_scope(),
            TicketKind::WalkIn.pending_scope()
        );
        assert_eq!("walk-in".parse::<TicketKind>().unwrap(), TicketKind::WalkIn);
    }

    #[test]
    fn test_line_item_snapshot_is_frozen() {
        let mut item = CatalogItem {
            id: "7".to_string(),
            name: "Coke".to_string(),
            price: Money::from_cents(500),
            available_quantity: 10,
        };
        let line = LineItem::snapshot(&item);
        item.price = Money::from_cents(900);
        assert_eq!(line.price, Money::from_cents(500));
        assert_eq!(line.catalog_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_record_policy_parse() {
        assert_eq!(RecordPolicy::default(), RecordPolicy::EnteredAmounts);
        assert_eq!(
            "even-split".parse::<RecordPolicy>().unwrap(),
            RecordPolicy::EvenSplit
        );
        assert!("random".parse::<RecordPolicy>().is_err());
    }

    #[test]
    fn test_payment_summary() {
        let record = |tender, cents| PaymentRecord {
            id: "r".to_string(),
            ticket_id: "t".to_string(),
            ticket_kind: TicketKind::Expense,
            tender,
            amount: Money::from_cents(cents),
            recorded_at: Utc::now(),
        };
        let summary = PaymentSummary::from_records(&[
            record(Tender::Cash, 500),
            record(Tender::Credit, 350),
            record(Tender::Cash, 100),
        ]);
        assert_eq!(summary.totals[&Tender::Cash], Money::from_cents(600));
        assert_eq!(summary.grand_total(), Money::from_cents(950));
        assert_eq!(summary.record_count, 3);
    }

    #[test]
    fn test_scheduled_slot_date_time() {
        let slot = ScheduledSlot::new("2024-05-10", "19:30").unwrap();
        assert_eq!(slot.date_time(), "2024-05-10 19:30:00");
        assert!(ScheduledSlot::new("10/05/2024", "19:30").is_err());
        assert!(ScheduledSlot::new("2024-05-10", "7pm").is_err());
    }
}
