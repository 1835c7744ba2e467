use super::engine::FormatRule;
use crate::config::FormatterConfig;
use crate::lists::{analyze_list_structure, apply_termination, group_list_items};
use crate::report::FormattingReport;
use crate::types::Document;
use anyhow::Result;
use tracing::info;

// ListTerminationRule - groups list paragraphs into list instances, records
// their structure and writes item punctuation
pub struct ListTerminationRule<'a> {
    config: &'a FormatterConfig,
}

impl<'a> ListTerminationRule<'a> {
    pub fn new(config: &'a FormatterConfig) -> Self {
        Self { config }
    }
}

impl<'a> FormatRule for ListTerminationRule<'a> {
    fn apply(&self, document: &mut Document, report: &mut FormattingReport) -> Result<()> {
        let groups = group_list_items(&document.list_items());
        report.list_structure = Some(analyze_list_structure(&groups));

        let termination = &self.config.list_rules.list_item_termination;
        if !termination.is_enabled() {
            info!("list termination: no terminators configured, {} lists found", groups.len());
            return Ok(());
        }

        let changed = apply_termination(
            &mut document.paragraphs,
            &groups,
            &termination.intermediate,
            &termination.last_item,
        );
        report.list_items_terminated += changed;
        info!(
            "list termination: {changed} items updated in {} lists",
            groups.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "ListTermination"
    }
}
