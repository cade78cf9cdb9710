//! # Validation Module
//!
//! Input validation for values that cross into the core from the
//! backend, the config file, or the shell.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Shell / config parsing                                        │
//! │  ├── Type validation (clap, serde)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Discount range, catalog prices, schedule strings                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Settlement rules (settlement.rs)                              │
//! │  └── Split must equal total, one tender minimum                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a discount rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
///
/// ## Example
/// ```rust
/// use courtside_core::validation::validate_discount_bps;
///
/// assert!(validate_discount_bps(1000).is_ok());
/// assert!(validate_discount_bps(10001).is_err());
/// ```
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a catalog price coming from the backend.
///
/// Zero is allowed (complimentary items); negative prices are not.
pub fn validate_catalog_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a scheduled game date (`YYYY-MM-DD`).
///
/// ## Example
/// ```rust
/// use courtside_core::validation::validate_scheduled_date;
///
/// assert!(validate_scheduled_date("2024-05-10").is_ok());
/// assert!(validate_scheduled_date("2024-13-10").is_err());
/// assert!(validate_scheduled_date("").is_err());
/// ```
pub fn validate_scheduled_date(date: &str) -> ValidationResult<()> {
    let date = date.trim();

    if date.is_empty() {
        return Err(ValidationError::Required {
            field: "scheduled date".to_string(),
        });
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: "scheduled date".to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })?;

    Ok(())
}

/// Validates a scheduled game time (`HH:MM`, 24-hour clock).
pub fn validate_scheduled_time(time: &str) -> ValidationResult<()> {
    let time = time.trim();

    if time.is_empty() {
        return Err(ValidationError::Required {
            field: "scheduled time".to_string(),
        });
    }

    NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| ValidationError::InvalidFormat {
        field: "scheduled time".to_string(),
        reason: "expected HH:MM".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
