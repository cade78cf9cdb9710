//! # API Error Type
//!
//! Unified error type for register commands. The shell prints every
//! failure as a notification; nothing is fatal.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Courtside                              │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── ValidationError ───────► VALIDATION_ERROR                   │
//! │         ├── CoreError ─────────────► NOT_FOUND / TICKET_CLOSED /        │
//! │         │                            SETTLEMENT_REJECTED / ...          │
//! │         ├── DbError ───────────────► DATABASE_ERROR (generic text)      │
//! │         └── ClientError ───────────► BACKEND_ERROR (backend's text)     │
//! │                                      UNREACHABLE                        │
//! │                                           │                             │
//! │                                           ▼                             │
//! │  Shell: "✗ Payment total R$ 5.00 must equal the final total R$ 7.65"    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use courtside_api::ClientError;
use courtside_core::{CoreError, SettlementRejection, ValidationError};
use courtside_db::DbError;

/// Error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SETTLEMENT_REJECTED",
///   "message": "Select at least one payment method"
/// }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for the notification
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Index does not point at a ticket, item or team
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Edit attempted on a closed ticket
    TicketClosed,

    /// Settlement refused the payment split
    SettlementRejected,

    /// Settlement already confirmed or cancelled
    SettlementClosed,

    /// No settlement is open
    NoSettlement,

    /// Local store failed
    DatabaseError,

    /// Backend or roster database answered with an error
    BackendError,

    /// Backend or roster database did not answer
    Unreachable,

    /// A collaborator is not configured
    NotConfigured,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts local store errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Local store connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Local store migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Local store query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Local store operation failed")
            }
            DbError::InvalidData { field, value } => {
                tracing::error!(%field, %value, "Local store holds unreadable data");
                ApiError::new(ErrorCode::DatabaseError, "Local store holds unreadable data")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Local store is busy")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal local store error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Local store operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::TicketIndexOutOfRange { .. }
            | CoreError::ItemIndexOutOfRange { .. }
            | CoreError::TeamIndexOutOfRange { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::TicketClosed { .. } => ApiError::new(ErrorCode::TicketClosed, message),
            CoreError::UnknownDiscount(_) => ApiError::validation(message),
            CoreError::SettlementNotOpen { .. } => {
                ApiError::new(ErrorCode::SettlementClosed, message)
            }
            CoreError::Rejected(rejection) => ApiError::from(rejection),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<SettlementRejection> for ApiError {
    fn from(err: SettlementRejection) -> Self {
        ApiError::new(ErrorCode::SettlementRejected, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts client errors to API errors. Backend messages pass through
/// verbatim.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        if err.is_unreachable() {
            return ApiError::new(ErrorCode::Unreachable, err.to_string());
        }
        match err {
            ClientError::Backend { message, .. } => ApiError::new(ErrorCode::BackendError, message),
            ClientError::Config(message) => ApiError::new(ErrorCode::NotConfigured, message),
            other => ApiError::new(ErrorCode::BackendError, other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::Money;

    #[test]
    fn test_rejection_keeps_message() {
        let err = ApiError::from(CoreError::from(SettlementRejection::TotalMismatch {
            expected: Money::from_cents(765),
            entered: Money::from_cents(500),
        }));
        assert_eq!(err.code, ErrorCode::SettlementRejected);
        assert!(err.message.contains("R$ 7.65"));
    }

    #[test]
    fn test_backend_message_passes_through() {
        let err = ApiError::from(ClientError::Backend {
            status: 409,
            message: "Estoque insuficiente".to_string(),
        });
        assert_eq!(err.code, ErrorCode::BackendError);
        assert_eq!(err.to_string(), "Estoque insuficiente");
    }

    #[test]
    fn test_db_errors_are_generic() {
        let err = ApiError::from(DbError::QueryFailed("no such table: x".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("no such table"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::new(ErrorCode::TicketClosed, "Ticket 3 is closed");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "TICKET_CLOSED");
        assert_eq!(json["message"], "Ticket 3 is closed");
    }
}
