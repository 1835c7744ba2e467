use super::converter::is_numeral_token;
use crate::config::PatternConfig;
use crate::error::ConfigurationError;
use crate::types::{CommonPatternSpec, NumberingKind};
use regex::{Captures, Regex};

/// Placeholder word in caption templates.
pub const NUMBER_PLACEHOLDER: &str = "number";

const REGEX_MARKERS: [char; 5] = ['\\', '(', ')', '[', ']'];

/// Expand a caption template into a regex fragment.
///
/// Templates without the placeholder and without a dot are plain caption
/// words and come back unchanged. Otherwise every `number` is replaced by
/// the numeral alphabet of `kind`; ROMAN uses the mixed roman-or-digit
/// class so captions from legacy documents with Arabic numerals still match.
pub fn expand(template: &str, kind: NumberingKind, patterns: &PatternConfig) -> String {
    if template.is_empty() {
        return String::new();
    }
    if !template.contains(NUMBER_PLACEHOLDER) && !template.contains('.') {
        return template.to_string();
    }
    let number = match kind {
        NumberingKind::Roman => &patterns.roman_number,
        NumberingKind::Arabic => &patterns.arabic_number,
    };
    template.replace(NUMBER_PLACEHOLDER, number)
}

/// A literal fragment can be inserted into text as-is.
pub fn is_literal(fragment: &str) -> bool {
    !fragment.contains(&REGEX_MARKERS[..])
}

/// A caption pattern compiled for one style.
#[derive(Debug, Clone)]
pub struct CommonPattern {
    spec: CommonPatternSpec,
    expanded: String,
    literal: bool,
    strip: Regex,
}

impl CommonPattern {
    pub fn compile(
        spec: &CommonPatternSpec,
        kind: NumberingKind,
        patterns: &PatternConfig,
    ) -> Result<Self, ConfigurationError> {
        let expanded = expand(&spec.pattern, kind, patterns);
        let literal = is_literal(&expanded);

        let strip_source = if literal {
            format!(
                r"\b{}\s+({})\b",
                regex::escape(expanded.trim()),
                patterns.mixed_number
            )
        } else if expanded.contains('.') {
            format!(r"(?:^|\s){expanded}(?:\s|$)")
        } else {
            format!(r"\b{expanded}\b")
        };

        let strip = Regex::new(&strip_source).map_err(|e| ConfigurationError::InvalidPattern {
            pattern: spec.pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            spec: spec.clone(),
            expanded,
            literal,
            strip,
        })
    }

    pub fn spec(&self) -> &CommonPatternSpec {
        &self.spec
    }

    /// The caption word to render next to the numeral. Templates that
    /// expanded into a real regex are only used for stripping.
    pub fn caption(&self) -> Option<&str> {
        self.literal.then_some(self.expanded.as_str())
    }

    pub fn expanded(&self) -> &str {
        &self.expanded
    }

    /// Remove every caption-prefixed numeral from `text`. A literal caption
    /// followed by a word ("Table civil") is left alone.
    pub fn strip(&self, text: &str) -> String {
        self.strip
            .replace_all(text, |caps: &Captures| {
                if self.carries_numeral(caps) {
                    " ".to_string()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Whether `text` carries this caption with a numeral.
    pub fn is_match(&self, text: &str) -> bool {
        self.strip
            .captures_iter(text)
            .any(|caps| self.carries_numeral(&caps))
    }

    fn carries_numeral(&self, caps: &Captures) -> bool {
        if !self.literal {
            return true;
        }
        caps.get(1)
            .map_or(false, |numeral| is_numeral_token(numeral.as_str()))
    }
}
