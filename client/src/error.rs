//! Error types for the overseer loan scanner.
//!
//! This module defines all error types that can occur while querying the overseer,
//! custody, market and oracle contracts and while decoding their responses.

use thiserror::Error;

/// Main error type for overseer scanning operations
#[derive(Error, Debug)]
pub enum OverseerError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The LCD rejected a smart query
    #[error("Contract query error: {0}")]
    QueryError(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A numeric field in a contract response could not be parsed
    #[error("Invalid amount in field `{field}`: {value:?}")]
    InvalidAmount {
        /// Name of the offending field
        field: &'static str,
        /// Raw value as returned by the contract
        value: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

/// Result type alias for overseer operations
pub type Result<T> = std::result::Result<T, OverseerError>;

/// Parse a decimal string returned by a contract (`Uint256`, `Decimal256`, ...).
///
/// These types are unsigned and always rendered as plain digits with an
/// optional fraction, so signs and exponents are rejected.
pub(crate) fn parse_amount(field: &'static str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    Some(trimmed)
        .filter(|s| s.chars().all(|c| c.is_ascii_digit() || c == '.'))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| OverseerError::InvalidAmount {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverseerError::QueryError("contract not found".to_string());
        assert_eq!(err.to_string(), "Contract query error: contract not found");
    }

    #[test]
    fn test_invalid_amount_display() {
        let err = OverseerError::InvalidAmount {
            field: "loan_amount",
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("loan_amount"));
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("balance", "100").unwrap(), 100.0);
        assert_eq!(parse_amount("max_ltv", "0.6").unwrap(), 0.6);
        assert_eq!(parse_amount("price", " 1000.5 ").unwrap(), 1000.5);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("balance", "").is_err());
        assert!(parse_amount("balance", "12ab").is_err());
        assert!(parse_amount("balance", "NaN").is_err());
        assert!(parse_amount("balance", "inf").is_err());
        assert!(parse_amount("balance", ".").is_err());
        assert!(parse_amount("balance", "1.2.3").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_signs_and_exponents() {
        for value in ["-3", "+3", "-0.5", "1e3", "2E-2"] {
            assert!(
                matches!(
                    parse_amount("collaterals", value),
                    Err(OverseerError::InvalidAmount { field: "collaterals", .. })
                ),
                "accepted {}",
                value
            );
        }
        assert_eq!(parse_amount("balance", "0").unwrap(), 0.0);
    }
}
