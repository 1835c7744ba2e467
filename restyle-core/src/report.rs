use crate::error::{ConfigurationError, ConversionError};
use crate::lists::ListStructure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A paragraph whose numeral could not be converted. Its text was left as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub paragraph_index: usize,
    pub style_name: String,
    pub text: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTiming {
    pub rule: String,
    pub millis: f64,
}

/// Everything one formatting pass did or could not do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingReport {
    pub started_at: DateTime<Utc>,
    pub rules_applied: Vec<String>,
    pub paragraphs_renumbered: usize,
    pub numerals_converted: usize,
    pub page_breaks_set: usize,
    pub bullet_levels_updated: usize,
    pub list_items_terminated: usize,
    /// Styled paragraphs without a numeral where one was expected
    pub pattern_mismatches: usize,
    pub conversion_failures: Vec<ConversionFailure>,
    pub configuration_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_structure: Option<ListStructure>,
    #[serde(default)]
    pub rule_timings: Vec<RuleTiming>,
}

impl FormattingReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            rules_applied: Vec::new(),
            paragraphs_renumbered: 0,
            numerals_converted: 0,
            page_breaks_set: 0,
            bullet_levels_updated: 0,
            list_items_terminated: 0,
            pattern_mismatches: 0,
            conversion_failures: Vec::new(),
            configuration_errors: Vec::new(),
            list_structure: None,
            rule_timings: Vec::new(),
        }
    }

    pub fn record_conversion_failure(
        &mut self,
        paragraph_index: usize,
        style_name: &str,
        text: &str,
        error: &ConversionError,
    ) {
        self.conversion_failures.push(ConversionFailure {
            paragraph_index,
            style_name: style_name.to_string(),
            text: text.to_string(),
            error: error.to_string(),
        });
    }

    /// Same problem reported by validation and by a rule is kept once.
    pub fn record_configuration_error(&mut self, error: &ConfigurationError) {
        let message = error.to_string();
        if !self.configuration_errors.contains(&message) {
            self.configuration_errors.push(message);
        }
    }

    pub fn has_problems(&self) -> bool {
        !self.conversion_failures.is_empty() || !self.configuration_errors.is_empty()
    }
}

impl Default for FormattingReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_deduplicated() {
        let mut report = FormattingReport::new();
        let error = ConfigurationError::LevelOutOfRange { level: 9 };
        report.record_configuration_error(&error);
        report.record_configuration_error(&error);
        assert_eq!(report.configuration_errors.len(), 1);
        assert!(report.has_problems());
    }

    #[test]
    fn test_pattern_mismatches_are_not_problems() {
        let mut report = FormattingReport::new();
        report.pattern_mismatches = 3;
        assert!(!report.has_problems());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = FormattingReport::new();
        report.record_conversion_failure(
            4,
            "Heading 1",
            "4000 Intro",
            &ConversionError::OutOfRange {
                value: "4000".to_string(),
                max: 3999,
            },
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["conversion_failures"][0]["paragraph_index"], 4);
        assert!(json.get("list_structure").is_none());
    }
}
