use chrono::{DateTime, Utc};
use restyle_core::FormattingReport;
use serde::Serialize;
use std::path::Path;

/// What `--report` writes: where the run read and wrote, plus the engine's
/// formatting report.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub input: String,
    pub output: String,
    pub config: Option<String>,
    pub finished_at: DateTime<Utc>,
    pub report: &'a FormattingReport,
}

impl<'a> RunSummary<'a> {
    pub fn new(
        input: &Path,
        output: &Path,
        config: Option<&str>,
        report: &'a FormattingReport,
    ) -> Self {
        Self {
            input: input.display().to_string(),
            output: output.display().to_string(),
            config: config.map(str::to_string),
            finished_at: Utc::now(),
            report,
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Default output path: `<stem>_restyled.json` next to the input.
pub fn default_output_path(input: &Path) -> std::path::PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}_restyled.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("docs/thesis.json")),
            Path::new("docs/thesis_restyled.json")
        );
    }

    #[test]
    fn test_summary_embeds_report() {
        let report = FormattingReport::new();
        let summary = RunSummary::new(
            Path::new("in.json"),
            Path::new("out.json"),
            Some("style.yaml"),
            &report,
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["config"], "style.yaml");
        assert_eq!(json["report"]["paragraphs_renumbered"], 0);
    }
}
