//! # Error Types
//!
//! Domain-specific error types for courtside-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  courtside-core errors (this file)                                     │
//! │  ├── CoreError            - Board and settlement contract violations   │
//! │  ├── ValidationError      - Input validation failures                  │
//! │  └── SettlementRejection  - Why confirm() refused a payment split      │
//! │                                                                         │
//! │  courtside-db errors        └── DbError                                 │
//! │  courtside-api errors       └── ClientError                             │
//! │  register app               └── ApiError (what the shell shows)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → notification           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Ticket index does not point at a ticket on the board.
    ///
    /// ## When This Occurs
    /// - The shell passed a stale index after a ticket was removed
    /// - A caller computed the index from another board kind
    #[error("No ticket at position {index} (board has {len})")]
    TicketIndexOutOfRange { index: usize, len: usize },

    /// Item index does not point at an item on the ticket.
    #[error("No item at position {index} on ticket {ticket} (ticket has {len})")]
    ItemIndexOutOfRange {
        ticket: usize,
        index: usize,
        len: usize,
    },

    /// Team index does not point at a listed team.
    #[error("No team at position {index} (list has {len})")]
    TeamIndexOutOfRange { index: usize, len: usize },

    /// Ticket is closed; only reopening or removal is allowed.
    #[error("Ticket {number} is closed")]
    TicketClosed { number: String },

    /// Discount label is not in the discount table.
    #[error("Unknown discount: {0}")]
    UnknownDiscount(String),

    /// Settlement already confirmed or cancelled.
    #[error("Settlement is {status}, cannot perform operation")]
    SettlementNotOpen { status: String },

    /// Settlement refused the payment split; the settlement stays open.
    #[error("{0}")]
    Rejected(#[from] SettlementRejection),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid date, unknown tender).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Settlement Rejection
// =============================================================================

/// Why a settlement attempt was refused.
///
/// A rejection leaves the settlement open so staff can correct the split.
///
/// ## Validation Order
/// ```text
/// confirm()
///    │
///    ├── ticket gone?                 → TicketNotFound
///    ├── Σ selected ≠ final total?    → TotalMismatch
///    └── no tender ticked?            → NoTenderSelected
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettlementRejection {
    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Payment total {entered} must equal the final total {expected}")]
    TotalMismatch { expected: Money, entered: Money },

    #[error("Select at least one payment method")]
    NoTenderSelected,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TicketIndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "No ticket at position 4 (board has 2)");

        let err = SettlementRejection::TotalMismatch {
            expected: Money::from_cents(850),
            entered: Money::from_cents(500),
        };
        assert_eq!(
            err.to_string(),
            "Payment total R$ 5.00 must equal the final total R$ 8.50"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "scheduled date".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_rejection_message_passes_through() {
        let core_err: CoreError = SettlementRejection::NoTenderSelected.into();
        assert_eq!(core_err.to_string(), "Select at least one payment method");
    }
}
