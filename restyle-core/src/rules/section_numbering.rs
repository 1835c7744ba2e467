use super::engine::FormatRule;
use crate::config::{roles, FormatterConfig};
use crate::numbering::{CommonPattern, NumberingPatterns, SectionCounter, SectionEvent};
use crate::report::FormattingReport;
use crate::types::{Document, FontSpec, NumberingSpec, StyleRole};
use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Numbering settings of one role, compiled once per run.
#[derive(Debug, Clone)]
pub struct StyleNumbering {
    pub spec: NumberingSpec,
    pub common: Option<CommonPattern>,
    pub caption_font: Option<FontSpec>,
    pub base_font: Option<FontSpec>,
}

/// Role key -> compiled numbering, for every role that has a complete
/// `numbering_format`. Incomplete styles are reported and left out.
#[derive(Debug, Clone, Default)]
pub struct StyleNumberingTable {
    by_role: BTreeMap<String, StyleNumbering>,
}

impl StyleNumberingTable {
    pub fn build(config: &FormatterConfig, report: &mut FormattingReport) -> Self {
        let mut by_role = BTreeMap::new();
        let numbered_roles = [
            roles::CHAPTER_TITLES,
            roles::SUBCHAPTER_TITLES_LEVEL_2,
            roles::SUBCHAPTER_TITLES_LEVEL_3,
        ]
        .into_iter()
        .chain(config.caption_roles.iter().map(String::as_str));

        for role in numbered_roles {
            let Some(definition) = config.style_definition(role) else {
                continue;
            };
            let spec = match definition.numbering(role) {
                None => continue,
                Some(Ok(spec)) => spec,
                Some(Err(e)) => {
                    warn!("numbering disabled for '{role}': {e}");
                    report.record_configuration_error(&e);
                    continue;
                }
            };
            let common = match definition.common_pattern() {
                Some(pattern) => match CommonPattern::compile(pattern, spec.kind, &config.patterns) {
                    Ok(compiled) => Some(compiled),
                    Err(e) => {
                        warn!("caption pattern ignored for '{role}': {e}");
                        report.record_configuration_error(&e);
                        None
                    }
                },
                None => None,
            };
            let caption_font = common
                .as_ref()
                .and_then(|c| c.spec().emphasis.clone());

            by_role.insert(
                role.to_string(),
                StyleNumbering {
                    spec,
                    common,
                    caption_font,
                    base_font: definition.font_format.clone(),
                },
            );
        }

        Self { by_role }
    }

    pub fn get(&self, role: &StyleRole) -> Option<&StyleNumbering> {
        role_key(role).and_then(|key| self.by_role.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.by_role.is_empty()
    }
}

/// Role key used in `chapter_and_section_rules`.
pub fn role_key(role: &StyleRole) -> Option<&str> {
    match role {
        StyleRole::Chapter => Some(roles::CHAPTER_TITLES),
        StyleRole::Subchapter2 => Some(roles::SUBCHAPTER_TITLES_LEVEL_2),
        StyleRole::Subchapter3 => Some(roles::SUBCHAPTER_TITLES_LEVEL_3),
        StyleRole::Caption(name) => Some(name.as_str()),
        StyleRole::Other => None,
    }
}

/// Renumbers chapter, subchapter and caption paragraphs from their
/// position in the document, and breaks the page before each chapter.
pub struct SectionNumberingRule<'a> {
    config: &'a FormatterConfig,
    patterns: &'a NumberingPatterns,
    table: &'a StyleNumberingTable,
}

impl<'a> SectionNumberingRule<'a> {
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

impl<'a> FormatRule for SectionNumberingRule<'a> {
    fn apply(&self, document: &mut Document, report: &mut FormattingReport) -> Result<()> {
        let roles = self.config.style_roles();
        let mut counter = SectionCounter::new();

        for (index, paragraph) in document.paragraphs.iter_mut().enumerate() {
            let role = roles.role_of(&paragraph.style_name);
            let label = match counter.advance(&role) {
                SectionEvent::NewChapter { label } => {
                    if self.config.chapter_page_breaks && !paragraph.page_break_before {
                        paragraph.page_break_before = true;
                        report.page_breaks_set += 1;
                    }
                    label
                }
                SectionEvent::Subchapter { label } | SectionEvent::Caption { label, .. } => label,
                SectionEvent::ChapterContinuation | SectionEvent::Skipped | SectionEvent::Other => {
                    continue
                }
            };

            let Some(style) = self.table.get(&role) else {
                continue;
            };

            match self
                .patterns
                .layout(&paragraph.text, &label, &style.spec, style.common.as_ref())
            {
                Ok(Some(layout)) => {
                    let text = layout.text();
                    if text != paragraph.text {
                        debug!("paragraph {index}: '{}' -> '{text}'", paragraph.text);
                        paragraph.text = text;
                        report.paragraphs_renumbered += 1;
                    }
                    if style.caption_font.is_some() {
                        paragraph.runs =
                            layout.runs(style.caption_font.as_ref(), style.base_font.as_ref());
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("paragraph {index} keeps its numbering: {e}");
                    report.record_conversion_failure(
                        index,
                        &paragraph.style_name,
                        &paragraph.text,
                        &e,
                    );
                }
            }
        }

        info!(
            "section numbering: {} paragraphs renumbered, {} page breaks",
            report.paragraphs_renumbered, report.page_breaks_set
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "SectionNumbering"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParagraphRecord;

    const CONFIG: &str = r#"
style_names:
  chapter_titles: "Heading 1"
  subchapter_titles_level_2: "Heading 2"
  subchapter_titles_level_3: "Heading 3"
  table_titles: "Caption"
chapter_and_section_rules:
  chapter_titles:
    numbering_format: { type: ROMAN, side: LEFT, separator: " " }
  subchapter_titles_level_2:
    numbering_format: { type: ARABIC, side: LEFT, separator: " " }
  subchapter_titles_level_3:
    numbering_format: { type: ARABIC, side: LEFT, separator: " " }
  table_titles:
    numbering_format: { type: ARABIC, side: LEFT, separator: ": " }
    common_pattern_format:
      pattern: "Table"
      font_format: { bold: true }
"#;

    fn run(paragraphs: Vec<ParagraphRecord>) -> (Document, FormattingReport) {
        let config: FormatterConfig = serde_yaml::from_str(CONFIG).unwrap();
        let patterns = NumberingPatterns::new(&config.patterns).unwrap();
        let mut document = Document::new(paragraphs);
        let mut report = FormattingReport::new();
        let table = StyleNumberingTable::build(&config, &mut report);
        SectionNumberingRule::new(&config, &patterns, &table)
            .apply(&mut document, &mut report)
            .unwrap();
        (document, report)
    }

    #[test]
    fn test_first_occurrence_only() {
        let (document, report) = run(vec![
            ParagraphRecord::new("Heading 1", "1. Introduction"),
            ParagraphRecord::new("Heading 1", "and motivation"),
            ParagraphRecord::new("Heading 1", "3 more"),
        ]);
        let texts: Vec<_> = document.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["I Introduction", "and motivation", "3 more"]);
        let breaks: Vec<_> = document
            .paragraphs
            .iter()
            .map(|p| p.page_break_before)
            .collect();
        assert_eq!(breaks, vec![true, false, false]);
        assert_eq!(report.page_breaks_set, 1);
    }

    #[test]
    fn test_hierarchy_and_sub3_gating() {
        let (document, _) = run(vec![
            ParagraphRecord::new("Heading 1", "Scope"),
            ParagraphRecord::new("Heading 3", "Orphan detail"),
            ParagraphRecord::new("Heading 2", "7 Terms"),
            ParagraphRecord::new("Heading 3", "Detail"),
            ParagraphRecord::new("Normal", "Body 12 text"),
            ParagraphRecord::new("Heading 1", "Methods"),
            ParagraphRecord::new("Heading 2", "Setup"),
        ]);
        let texts: Vec<_> = document.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "I Scope",
                "Orphan detail",
                "1.1 Terms",
                "1.1.1 Detail",
                "Body 12 text",
                "II Methods",
                "2.1 Setup",
            ]
        );
    }

    #[test]
    fn test_caption_numbering_with_runs() {
        let (document, report) = run(vec![
            ParagraphRecord::new("Caption", "Table 9 Before any chapter"),
            ParagraphRecord::new("Heading 1", "Results"),
            ParagraphRecord::new("Caption", "Table 4: Costs"),
            ParagraphRecord::new("Caption", "Revenue"),
        ]);
        assert_eq!(document.paragraphs[0].text, "Table 9 Before any chapter");
        assert_eq!(document.paragraphs[2].text, "Table 1.1: Costs");
        assert_eq!(document.paragraphs[3].text, "Table 1.2: Revenue");

        let runs = &document.paragraphs[2].runs;
        assert_eq!(runs[0].text, "Table");
        assert_eq!(runs[0].font.as_ref().and_then(|f| f.bold), Some(true));
        assert_eq!(report.paragraphs_renumbered, 3);
    }

    #[test]
    fn test_incomplete_style_is_reported_and_skipped() {
        let yaml = r#"
chapter_and_section_rules:
  chapter_titles:
    numbering_format: { side: LEFT }
"#;
        let config: FormatterConfig = serde_yaml::from_str(yaml).unwrap();
        let patterns = NumberingPatterns::default();
        let mut document = Document::new(vec![ParagraphRecord::new("chapter_titles", "1 Intro")]);
        let mut report = FormattingReport::new();
        let table = StyleNumberingTable::build(&config, &mut report);
        SectionNumberingRule::new(&config, &patterns, &table)
            .apply(&mut document, &mut report)
            .unwrap();
        assert_eq!(document.paragraphs[0].text, "1 Intro");
        // Page break still marks the chapter start
        assert!(document.paragraphs[0].page_break_before);
        assert_eq!(report.configuration_errors.len(), 1);
    }
}
