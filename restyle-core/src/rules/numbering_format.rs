use super::engine::FormatRule;
use super::section_numbering::StyleNumberingTable;
use crate::config::FormatterConfig;
use crate::numbering::{NumberingOutcome, NumberingPatterns, UnchangedReason};
use crate::report::FormattingReport;
use crate::types::Document;
use anyhow::Result;
use tracing::{debug, info, warn};

/// Rewrites numerals already present in styled paragraphs into the style's
/// alphabet without recounting them ("2. Scope" -> "II. Scope").
pub struct NumberingFormatRule<'a> {
    config: &'a FormatterConfig,
    patterns: &'a NumberingPatterns,
    table: &'a StyleNumberingTable,
}

impl<'a> NumberingFormatRule<'a> {
    pub fn new(
        config: &'a FormatterConfig,
        patterns: &'a NumberingPatterns,
        table: &'a StyleNumberingTable,
    ) -> Self {
        Self {
            config,
            patterns,
            table,
        }
    }
}

impl<'a> FormatRule for NumberingFormatRule<'a> {
    fn apply(&self, document: &mut Document, report: &mut FormattingReport) -> Result<()> {
        if self.table.is_empty() {
            info!("numbering format: no numbered styles configured");
            return Ok(());
        }

        let roles = self.config.style_roles();
        let mut converted = 0;
        for (index, paragraph) in document.paragraphs.iter_mut().enumerate() {
            let role = roles.role_of(&paragraph.style_name);
            let Some(style) = self.table.get(&role) else {
                continue;
            };

            match self.patterns.convert(&paragraph.text, &style.spec) {
                Ok(NumberingOutcome::Rewritten(text)) => {
                    debug!("paragraph {index}: '{}' -> '{text}'", paragraph.text);
                    paragraph.text = text;
                    converted += 1;
                }
                Ok(NumberingOutcome::Unchanged(UnchangedReason::PatternMismatch)) => {
                    report.pattern_mismatches += 1;
                }
                Ok(NumberingOutcome::Unchanged(_)) => {}
                Err(e) => {
                    warn!("paragraph {index} keeps its numeral: {e}");
                    report.record_conversion_failure(
                        index,
                        &paragraph.style_name,
                        &paragraph.text,
                        &e,
                    );
                }
            }
        }

        report.numerals_converted += converted;
        info!("numbering format: {converted} numerals converted");
        Ok(())
    }

    fn name(&self) -> &str {
        "NumberingFormat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParagraphRecord;

    #[test]
    fn test_converts_existing_numerals_in_place() {
        let yaml = r#"
chapter_and_section_rules:
  chapter_titles:
    numbering_format: { type: ROMAN, side: LEFT, separator: " " }
  subchapter_titles_level_2:
    numbering_format: { type: ARABIC, side: RIGHT, separator: " " }
"#;
        let config: FormatterConfig = serde_yaml::from_str(yaml).unwrap();
        let patterns = NumberingPatterns::new(&config.patterns).unwrap();
        let mut document = Document::new(vec![
            ParagraphRecord::new("chapter_titles", "2. Scope"),
            ParagraphRecord::new("chapter_titles", "Preface"),
            ParagraphRecord::new("subchapter_titles_level_2", "Terms - II.I"),
            ParagraphRecord::new("chapter_titles", "4000 Too big"),
            ParagraphRecord::new("main_text", "3. Not a heading"),
        ]);
        let mut report = FormattingReport::new();
        let table = StyleNumberingTable::build(&config, &mut report);

        NumberingFormatRule::new(&config, &patterns, &table)
            .apply(&mut document, &mut report)
            .unwrap();

        let texts: Vec<_> = document.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "II. Scope",
                "Preface",
                "Terms - 2.1",
                "4000 Too big",
                "3. Not a heading"
            ]
        );
        assert_eq!(report.numerals_converted, 2);
        assert_eq!(report.pattern_mismatches, 1);
        assert_eq!(report.conversion_failures.len(), 1);
        assert_eq!(report.conversion_failures[0].paragraph_index, 3);
    }
}
