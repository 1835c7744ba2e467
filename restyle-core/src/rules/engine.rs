use crate::config::FormatterConfig;
use crate::error::FormatError;
use crate::numbering::NumberingPatterns;
use crate::report::{FormattingReport, RuleTiming};
use crate::types::Document;
use anyhow::Result;
use std::cell::RefCell;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::bullet_levels::BulletLevelsRule;
use super::list_termination::ListTerminationRule;
use super::numbering_format::NumberingFormatRule;
use super::section_numbering::{SectionNumberingRule, StyleNumberingTable};

/// Rules that read the per-role numbering table.
const NUMBERING_RULES: [&str; 2] = ["NumberingFormat", "SectionNumbering"];

// Sequential rule pipeline infrastructure
pub trait FormatRule {
    fn apply(&self, document: &mut Document, report: &mut FormattingReport) -> Result<()>;
    fn name(&self) -> &str;
}

pub struct RuleEngine {
    config: FormatterConfig,
    patterns: NumberingPatterns,
    pub rule_timings: RefCell<Vec<(String, Duration)>>,
}

impl RuleEngine {
    /// Compiles the numeral patterns; a bad `patterns` section fails here.
    pub fn new(config: FormatterConfig) -> Result<Self> {
        let patterns = NumberingPatterns::new(&config.patterns).map_err(FormatError::from)?;
        Ok(Self {
            config,
            patterns,
            rule_timings: RefCell::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn patterns(&self) -> &NumberingPatterns {
        &self.patterns
    }

    /// Run the enabled rules of `pipeline.rules` in order.
    pub fn apply_rules(&self, document: &mut Document, report: &mut FormattingReport) -> Result<()> {
        info!(
            "applying rule pipeline to {} paragraphs",
            document.paragraphs.len()
        );

        // Clear previous timings
        self.rule_timings.borrow_mut().clear();

        // Built once per run so style problems are logged once
        let numbered = self
            .config
            .pipeline
            .rules
            .iter()
            .any(|r| r.enabled && NUMBERING_RULES.contains(&r.name.as_str()));
        let table = if numbered {
            StyleNumberingTable::build(&self.config, report)
        } else {
            StyleNumberingTable::default()
        };

        for rule_config in &self.config.pipeline.rules {
            if !rule_config.enabled {
                info!("skipping disabled rule: {}", rule_config.name);
                continue;
            }

            self.apply_rule_by_name(&rule_config.name, &table, document, report)?;
            report.rules_applied.push(rule_config.name.clone());
        }

        report.rule_timings = self
            .rule_timings
            .borrow()
            .iter()
            .map(|(rule, duration)| RuleTiming {
                rule: rule.clone(),
                millis: duration.as_secs_f64() * 1000.0,
            })
            .collect();
        Ok(())
    }

    fn apply_rule_by_name<'a>(
        &'a self,
        rule_name: &str,
        table: &'a StyleNumberingTable,
        document: &mut Document,
        report: &mut FormattingReport,
    ) -> Result<()> {
        let rule: Box<dyn FormatRule + 'a> = match rule_name {
            "NumberingFormat" => Box::new(NumberingFormatRule::new(
                &self.config,
                &self.patterns,
                table,
            )),
            "SectionNumbering" => Box::new(SectionNumberingRule::new(
                &self.config,
                &self.patterns,
                table,
            )),
            "BulletLevels" => Box::new(BulletLevelsRule::new(&self.config)),
            "ListTermination" => Box::new(ListTerminationRule::new(&self.config)),
            _ => {
                warn!("unknown rule in pipeline: {rule_name}");
                return Err(FormatError::UnknownRule(rule_name.to_string()).into());
            }
        };

        info!("applying rule: {}", rule.name());
        let rule_start = Instant::now();
        let result = rule.apply(document, report);
        self.rule_timings
            .borrow_mut()
            .push((rule_name.to_string(), rule_start.elapsed()));
        result
    }
}
