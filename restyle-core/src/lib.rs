// Restyle Core Library
//
// Numbering and list-structure engine for document restyling.
// Main interface for renumbering headings and captions, converting numerals
// and normalising bullet lists in an in-memory document.

pub mod config;
pub mod error;
pub mod lists;
pub mod numbering;
pub mod processor;
pub mod report;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use config::FormatterConfig;
pub use error::{ConfigurationError, ConversionError, FormatError};
pub use processor::{DocumentFormatter, StepProfiler};
pub use report::FormattingReport;
pub use types::*;
