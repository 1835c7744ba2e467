use super::engine::FormatRule;
use crate::config::FormatterConfig;
use crate::lists::apply_bullet_levels;
use crate::report::FormattingReport;
use crate::types::Document;
use anyhow::Result;
use tracing::info;

// BulletLevelsRule - sets glyph and indentation on every level of every
// abstract numbering definition
pub struct BulletLevelsRule<'a> {
    config: &'a FormatterConfig,
}

impl<'a> BulletLevelsRule<'a> {
    pub fn new(config: &'a FormatterConfig) -> Self {
        Self { config }
    }
}

impl<'a> FormatRule for BulletLevelsRule<'a> {
    fn apply(&self, document: &mut Document, report: &mut FormattingReport) -> Result<()> {
        let list = &self.config.list_rules;
        if !list.has_level_styling() {
            info!("bullet levels: nothing configured");
            return Ok(());
        }

        let updated = apply_bullet_levels(
            &mut document.numbering,
            list,
            &self.config.bullet_characters,
        );
        report.bullet_levels_updated += updated;
        info!(
            "bullet levels: {updated} levels updated across {} numbering definitions",
            document.numbering.abstract_numberings.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "BulletLevels"
    }
}
