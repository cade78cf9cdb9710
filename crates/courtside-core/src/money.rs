//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Ticket: Coke R$5.00 + Chips R$3.50 = R$8.50, 10% off                   │
//! │    8.5 * (1 - 10/100) = 7.6499999999999995   ❌ never equals 7.65       │
//! │                                                                         │
//! │  A split of { cash: 7.65 } would be rejected forever.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    850 cents - round(850 * 1000 / 10000) = 850 - 85 = 765 cents         │
//! │    Split comparison is exact integer equality                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use courtside_core::money::Money;
//!
//! let coke = Money::from_cents(500);
//! let chips = Money::parse_amount("3.50").unwrap();
//! assert_eq!((coke + chips).cents(), 850);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// Largest amount accepted from staff or the backend: R$ 1,000,000,000.00.
///
/// Keeps a ticket's tender split (four tenders) far from `i64` overflow.
pub const MAX_AMOUNT: Money = Money(100_000_000_000);

/// A monetary value in centavos (the smallest unit of the Brazilian real).
///
/// ## Where Money is Used
/// ```text
/// CatalogItem.price ──► LineItem.price (snapshot) ──► Ticket.total()
///                                                         │
///                                   DiscountRate ─────────┤
///                                                         ▼
///                         Settlement.final_total() == Σ selected tender amounts
///                                                         │
///                                                         ▼
///                                               PaymentRecord.amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use courtside_core::money::Money;
    ///
    /// let price = Money::from_cents(765); // R$ 7.65
    /// assert_eq!(price.cents(), 765);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-real portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whether the amount is within [`MAX_AMOUNT`] either side of zero.
    #[inline]
    pub const fn is_within_limit(&self) -> bool {
        self.0.unsigned_abs() <= MAX_AMOUNT.0.unsigned_abs()
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, returning `None` if the total overflows.
    ///
    /// ## Example
    /// ```rust
    /// use courtside_core::money::Money;
    ///
    /// let ok = [Money::from_cents(500), Money::from_cents(350)];
    /// assert_eq!(Money::checked_sum(ok), Some(Money::from_cents(850)));
    ///
    /// let huge = [Money::from_cents(i64::MAX), Money::from_cents(1)];
    /// assert_eq!(Money::checked_sum(huge), None);
    /// ```
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Converts an exact decimal amount (in reais) to cents.
    ///
    /// Returns `None` when the amount carries sub-centavo precision
    /// (`7.649`) or lies beyond [`MAX_AMOUNT`]. Trailing zeros are fine
    /// (`7.650` is 765 cents).
    pub fn from_decimal(amount: Decimal) -> Option<Money> {
        let cents = amount.checked_mul(Decimal::ONE_HUNDRED)?;
        if !cents.fract().is_zero() {
            return None;
        }
        cents.to_i64().map(Money).filter(Money::is_within_limit)
    }

    /// Converts a decimal amount to cents, rounding half away from zero.
    ///
    /// Used for backend prices, which arrive as loosely formatted numbers.
    pub fn from_decimal_rounded(amount: Decimal) -> Option<Money> {
        amount
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
            .filter(Money::is_within_limit)
    }

    /// Returns the amount in reais as an exact decimal.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parses an amount typed by staff (`"7.65"`, `"7,65"`, `" 12 "`).
    ///
    /// ## Rules
    /// - Comma is accepted as the decimal separator
    /// - Negative amounts are rejected
    /// - More than two decimal places is rejected
    /// - Amounts above [`MAX_AMOUNT`] are rejected
    ///
    /// ## Example
    /// ```rust
    /// use courtside_core::money::Money;
    ///
    /// assert_eq!(Money::parse_amount("7,65"), Some(Money::from_cents(765)));
    /// assert_eq!(Money::parse_amount("7.649"), None);
    /// assert_eq!(Money::parse_amount("abc"), None);
    /// ```
    pub fn parse_amount(input: &str) -> Option<Money> {
        let normalized = input.trim().replace(',', ".");
        if normalized.is_empty() {
            return None;
        }
        let amount = Decimal::from_str(&normalized).ok()?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return None;
        }
        Money::from_decimal(amount)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// The discount itself is rounded half-up to the centavo, the same
    /// way a cashier would round it by hand.
    ///
    /// ## Example
    /// ```rust
    /// use courtside_core::money::Money;
    /// use courtside_core::types::DiscountRate;
    ///
    /// let total = Money::from_cents(850);
    /// let discounted = total.apply_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(discounted.cents(), 765);
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        let discount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(self.0 - discount as i64)
    }

    /// Splits the amount into `parts` shares that sum back to the amount.
    ///
    /// Leftover centavos go one each to the leading shares:
    /// R$ 10.00 / 3 = [3.34, 3.33, 3.33].
    pub fn split_evenly(&self, parts: usize) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }
        let n = parts as i64;
        let base = self.0.div_euclid(n);
        let remainder = self.0.rem_euclid(n);
        (0..n)
            .map(|i| Money(base + if i < remainder { 1 } else { 0 }))
            .collect()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `R$ 7.65` (debugging and terminal output).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}R$ {}.{:02}",
            sign,
            self.reais().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate so display totals never panic or wrap. Anything that
// must be exact (settlement validation) goes through `checked_sum`.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
