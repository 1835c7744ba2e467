//! Error types for the restyling engine.
//!
//! Numeral conversion and configuration problems are domain errors that a
//! caller must be able to tell apart: a paragraph without a numeral is the
//! normal case and never produces an error, while a numeral that cannot be
//! converted points at a misconfigured style.

use thiserror::Error;

/// A numeral could not be converted between the Arabic and Roman systems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Decimal segment outside the classical Roman range.
    #[error("{value} cannot be written as a Roman numeral (supported range is 1..={max})")]
    OutOfRange { value: String, max: u32 },

    /// Alphabetic segment that is not a canonical Roman numeral.
    #[error("'{segment}' is not a valid Roman numeral")]
    InvalidRoman { segment: String },
}

/// A style definition is missing or carries unusable fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `numbering_format` is present but `type` or `side` is missing.
    #[error("style '{style}' has an incomplete numbering_format (missing {missing})")]
    IncompleteNumbering { style: String, missing: &'static str },

    /// A bullet key that is not in the bullet character table.
    #[error("unknown bullet character '{key}' for list level {level}")]
    UnknownBullet { key: String, level: u8 },

    /// List levels only go from 0 to 8.
    #[error("list level {level} is out of range (0..=8)")]
    LevelOutOfRange { level: u8 },

    /// Termination characters are appended verbatim and must stay short.
    #[error("termination character '{value}' for {field} must be at most one character")]
    TerminationTooLong { field: &'static str, value: String },

    /// A regex from the `patterns` section or a caption template did not compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors that stop the rule pipeline before or while it runs. Per-paragraph
/// conversion failures never end up here; they go to the report.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("unknown rule '{0}' in pipeline")]
    UnknownRule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_display() {
        let err = ConversionError::OutOfRange {
            value: "4000".to_string(),
            max: 3999,
        };
        assert!(err.to_string().contains("4000"));
        assert!(err.to_string().contains("3999"));
    }

    #[test]
    fn test_format_error_wraps_configuration() {
        let err: FormatError = ConfigurationError::LevelOutOfRange { level: 9 }.into();
        assert!(err.to_string().contains("level 9"));
    }
}
