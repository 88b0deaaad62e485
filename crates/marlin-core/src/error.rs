//! # Error Types
//!
//! Domain-specific error types for marlin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marlin-core errors (this file)                                         │
//! │  ├── CoreError        - General domain errors                           │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  marlin-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  marlin-recalc errors (separate crate)                                  │
//! │  └── RecalcError      - Batch-fatal recalculation failures              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → RecalcError              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (country, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Undefined arithmetic (zero rate, zero selling price) is NOT an error:
//!    the calculators return a safe 0 and the caller may warn

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core pricing errors.
///
/// These errors represent business rule violations or missing reference
/// data. They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No freight rate row matches the customer's country.
    ///
    /// ## When This Occurs
    /// - Customer's country has no air/sea rate history at all
    /// - The resolver's country-wide fallback subset came up empty
    ///
    /// ## How Callers React
    /// Freight costs are short-circuited to 0 and the absence is surfaced
    /// as a warning; the rest of the price computation still succeeds.
    #[error("No freight rate available for {country}{}", .location.as_deref().map(|l| format!(" ({l})")).unwrap_or_default())]
    RateUnavailable {
        country: String,
        location: Option<String>,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any calculation or write runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Percentage out of the allowed range.
    ///
    /// ## When This Occurs
    /// - Margin percentage of 100 or more (the inversion formula divides by
    ///   `100 - pct`)
    /// - Negative percentage
    #[error("{field} must be at least 0 and below 100")]
    PercentOutOfRange { field: String },

    /// Gross-weight divisor below 1.
    #[error("divisor must be at least 1, got {got}")]
    DivisorTooSmall { got: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_rate_unavailable_messages() {
        let err = CoreError::RateUnavailable {
            country: "Japan".to_string(),
            location: Some("KIX".to_string()),
        };
        assert_eq!(err.to_string(), "No freight rate available for Japan (KIX)");

        let err = CoreError::RateUnavailable {
            country: "Norway".to_string(),
            location: None,
        };
        assert_eq!(err.to_string(), "No freight rate available for Norway");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "purchasing_price".to_string(),
        };
        assert_eq!(err.to_string(), "purchasing_price is required");

        let err = ValidationError::PercentOutOfRange {
            field: "profit_margin".to_string(),
        };
        assert_eq!(err.to_string(), "profit_margin must be at least 0 and below 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "usd_rate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
