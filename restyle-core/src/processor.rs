use crate::config::FormatterConfig;
use crate::report::FormattingReport;
use crate::rules::RuleEngine;
use crate::types::Document;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        self.record(step_name, start.elapsed());
        result
    }

    pub fn record(&mut self, step_name: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Runs validation and the rule pipeline over documents.
pub struct DocumentFormatter {
    engine: RuleEngine,
}

impl DocumentFormatter {
    pub fn new(config: FormatterConfig) -> Result<Self> {
        Ok(Self {
            engine: RuleEngine::new(config)?,
        })
    }

    pub fn config(&self) -> &FormatterConfig {
        self.engine.config()
    }

    /// Format `document` in place. Configuration problems and per-paragraph
    /// conversion failures end up in the report; only pipeline errors fail.
    pub fn format(&self, document: &mut Document) -> Result<FormattingReport> {
        self.format_with_profiling(document, &mut StepProfiler::new(false))
    }

    pub fn format_with_profiling(
        &self,
        document: &mut Document,
        profiler: &mut StepProfiler,
    ) -> Result<FormattingReport> {
        let mut report = FormattingReport::new();

        for problem in profiler.time_step("Config validation", || self.config().validate()) {
            warn!("configuration problem: {problem}");
            report.record_configuration_error(&problem);
        }

        self.engine.apply_rules(document, &mut report)?;
        for (rule, duration) in self.engine.rule_timings.borrow().iter() {
            profiler.record(rule, *duration);
        }

        info!(
            "formatted {} paragraphs: {} renumbered, {} converted, {} conversion failures",
            document.paragraphs.len(),
            report.paragraphs_renumbered,
            report.numerals_converted,
            report.conversion_failures.len()
        );
        Ok(report)
    }

    /// Read a JSON document, format it and write the result as JSON.
    pub fn format_file(&self, input: &Path, output: &Path) -> Result<FormattingReport> {
        self.format_file_with_profiling(input, output, &mut StepProfiler::new(false))
    }

    pub fn format_file_with_profiling(
        &self,
        input: &Path,
        output: &Path,
        profiler: &mut StepProfiler,
    ) -> Result<FormattingReport> {
        let mut document = profiler.time_step("Document loading", || load_document(input))?;
        let report = self.format_with_profiling(&mut document, profiler)?;
        profiler.time_step("Document writing", || save_document(&document, output))?;
        Ok(report)
    }
}

pub fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let document = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse document {}", path.display()))?;
    Ok(document)
}

pub fn save_document(document: &Document, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write document {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParagraphRecord;

    #[test]
    fn test_profiler_disabled_records_nothing() {
        let mut profiler = StepProfiler::new(false);
        let value = profiler.time_step("step", || 42);
        assert_eq!(value, 42);
        assert!(profiler.timings().is_empty());
    }

    #[test]
    fn test_format_reports_validation_problems() {
        let yaml = r#"
list_rules:
  levels:
    - { level: 9, bullet_char: bullet }
"#;
        let config: FormatterConfig = serde_yaml::from_str(yaml).unwrap();
        let formatter = DocumentFormatter::new(config).unwrap();
        let mut document = Document::new(vec![ParagraphRecord::new("Normal", "Body")]);
        let report = formatter.format(&mut document).unwrap();
        assert_eq!(report.configuration_errors.len(), 1);
        assert_eq!(document.paragraphs[0].text, "Body");
    }

    #[test]
    fn test_format_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("restyle_processor_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("input.json");
        let output = dir.join("output.json");

        let document = Document::new(vec![
            ParagraphRecord::new("chapter_titles", "Intro"),
            ParagraphRecord::new("Normal", "Body"),
        ]);
        save_document(&document, &input).unwrap();

        let formatter = DocumentFormatter::new(FormatterConfig::default()).unwrap();
        let report = formatter.format_file(&input, &output).unwrap();
        let formatted = load_document(&output).unwrap();

        // No numbering configured by default, only the page break
        assert_eq!(formatted.paragraphs[0].text, "Intro");
        assert!(formatted.paragraphs[0].page_break_before);
        assert_eq!(report.page_breaks_set, 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let formatter = DocumentFormatter::new(FormatterConfig::default()).unwrap();
        let missing = std::env::temp_dir().join("restyle_does_not_exist.json");
        assert!(formatter
            .format_file(&missing, &std::env::temp_dir().join("restyle_out.json"))
            .is_err());
    }
}
