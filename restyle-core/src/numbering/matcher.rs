use super::common_pattern::CommonPattern;
use super::converter::{is_numeral_token, to_arabic, to_roman};
use crate::config::PatternConfig;
use crate::error::{ConfigurationError, ConversionError};
use crate::types::{FontSpec, NumberingKind, NumberingSpec, SeparatorPolicy, Side, TextRun};
use regex::{Captures, Regex};

/// Result of rewriting one paragraph's numeral in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberingOutcome {
    Rewritten(String),
    Unchanged(UnchangedReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// No numeral where side and kind expect one
    PatternMismatch,
    /// The numeral was already in the target alphabet
    NoChange,
    EmptyText,
}

/// Piece of a renumbered paragraph, kept apart so the caption word can be
/// rendered with its own font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Caption,
    Numeral,
    Separator,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingLayout {
    pub segments: Vec<(SegmentKind, String)>,
}

impl NumberingLayout {
    pub fn text(&self) -> String {
        self.segments.iter().map(|(_, s)| s.as_str()).collect()
    }

    /// Runs for the document collaborator: caption in `caption_font`,
    /// numeral and text in `base_font`, separators unstyled.
    pub fn runs(&self, caption_font: Option<&FontSpec>, base_font: Option<&FontSpec>) -> Vec<TextRun> {
        self.segments
            .iter()
            .map(|(kind, text)| {
                let font = match kind {
                    SegmentKind::Caption => caption_font.or(base_font),
                    SegmentKind::Numeral | SegmentKind::Text => base_font,
                    SegmentKind::Separator => None,
                };
                TextRun {
                    text: text.clone(),
                    font: font.cloned(),
                }
            })
            .collect()
    }

    fn push(&mut self, kind: SegmentKind, text: &str) {
        if !text.is_empty() {
            self.segments.push((kind, text.to_string()));
        }
    }
}

/// Compiled numeral detection and strip regexes.
///
/// Built once per run from `PatternConfig` and passed to whoever needs it;
/// there is no global regex table.
#[derive(Debug, Clone)]
pub struct NumberingPatterns {
    roman_uppercase: Regex,
    roman_lowercase: Regex,
    arabic_numbers: Regex,
    extra_spaces: Regex,
    leading_punctuation: Regex,
    trailing_punctuation: Regex,
    // Edge numerals, keyed by target alphabet (source is the other one)
    roman_left: Regex,
    roman_right: Regex,
    arabic_left: Regex,
    arabic_right: Regex,
    // Punctuation next to an edge numeral, with or without a caption word
    adjacent_left: Regex,
    adjacent_right: Regex,
}

fn compile(source: String) -> Result<Regex, ConfigurationError> {
    Regex::new(&source).map_err(|e| ConfigurationError::InvalidPattern {
        pattern: source.clone(),
        reason: e.to_string(),
    })
}

impl NumberingPatterns {
    pub fn new(patterns: &PatternConfig) -> Result<Self, ConfigurationError> {
        let decimal = &patterns.decimal_number;
        let mixed = &patterns.mixed_number;
        let p = &patterns.punctuation;

        Ok(Self {
            roman_uppercase: compile(r"\b[IVXLCDM]+\b".to_string())?,
            roman_lowercase: compile(r"\b[ivxlcdm]+\b".to_string())?,
            arabic_numbers: compile(format!(r"\b(?:{decimal})\b"))?,
            extra_spaces: compile(r"\s+".to_string())?,
            leading_punctuation: compile(format!(r"^(?:\s|{p})+"))?,
            trailing_punctuation: compile(format!(r"(?:\s|{p})+$"))?,
            roman_left: compile(format!(r"^\s*({decimal})\b\s*((?:{p})?\s*)"))?,
            roman_right: compile(format!(r"(\s*(?:{p})?\s*)\b({decimal})\s*$"))?,
            arabic_left: compile(format!(r"(?i)^\s*({mixed})\b\s*((?:{p})?\s*)"))?,
            arabic_right: compile(format!(r"(?i)(\s*(?:{p})?\s*)\b({mixed})\s*$"))?,
            adjacent_left: compile(format!(
                r"^\s*(?:\p{{L}}+\.?\s+)?(?:{mixed})\b(\s*(?:{p})\s*)"
            ))?,
            adjacent_right: compile(format!(
                r"(\s*(?:{p})\s*)\b(?:{mixed})(?:\s+\p{{L}}+\.?)?\s*$"
            ))?,
        })
    }

    /// Strip every numbering token from `text`.
    ///
    /// Order: caption-prefixed numerals, standalone uppercase Roman runs,
    /// standalone lowercase Roman runs, standalone dotted decimals. After
    /// each step whitespace is collapsed and dangling `.`, `:`, `-` at either
    /// end are trimmed. Roman runs are only removed when they read as a
    /// numeral on their own, so words such as "civil", "did" or "mix" stay.
    /// Running this twice gives the same result as running it once.
    pub fn remove_all_numbering(&self, text: &str, common: Option<&CommonPattern>) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let mut result = text.to_string();
        if let Some(common) = common {
            result = self.clean(&common.strip(&result));
        }
        for roman in [&self.roman_uppercase, &self.roman_lowercase] {
            result = self.clean(&remove_roman_numerals(roman, &result));
        }
        result = self.clean(&self.arabic_numbers.replace_all(&result, ""));
        result
    }

    fn clean(&self, text: &str) -> String {
        let text = self.extra_spaces.replace_all(text, " ");
        let text = self.leading_punctuation.replace(&text, "");
        let text = self.trailing_punctuation.replace(&text, "");
        text.trim().to_string()
    }

    /// Lay out `text` with a fresh numeral: strip whatever numbering it
    /// carries, then place `label` (dotted decimal, converted to the target
    /// alphabet) and the optional caption word on the configured side.
    /// `None` for blank text, which is never numbered.
    pub fn layout(
        &self,
        text: &str,
        label: &str,
        spec: &NumberingSpec,
        common: Option<&CommonPattern>,
    ) -> Result<Option<NumberingLayout>, ConversionError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let numeral = match spec.kind {
            NumberingKind::Roman => to_roman(label)?,
            NumberingKind::Arabic => label.to_string(),
        };

        let separator = match spec.separator_policy {
            SeparatorPolicy::Configured => spec.separator.clone(),
            SeparatorPolicy::PreferExisting => self
                .adjacent_separator(text, spec.side)
                .unwrap_or_else(|| spec.separator.clone()),
        };

        let cleaned = self.remove_all_numbering(text, common);

        let mut numbering = NumberingLayout {
            segments: Vec::new(),
        };
        match common.and_then(|c| c.caption().map(|word| (word, c.spec()))) {
            Some((word, caption)) if caption.side == Side::Left => {
                numbering.push(SegmentKind::Caption, word);
                numbering.push(SegmentKind::Separator, &caption.separator);
                numbering.push(SegmentKind::Numeral, &numeral);
            }
            Some((word, caption)) => {
                numbering.push(SegmentKind::Numeral, &numeral);
                numbering.push(SegmentKind::Separator, &caption.separator);
                numbering.push(SegmentKind::Caption, word);
            }
            None => numbering.push(SegmentKind::Numeral, &numeral),
        }

        if cleaned.is_empty() {
            return Ok(Some(numbering));
        }

        let mut layout = NumberingLayout {
            segments: Vec::new(),
        };
        match spec.side {
            Side::Left => {
                layout.segments.extend(numbering.segments);
                layout.push(SegmentKind::Separator, &separator);
                layout.push(SegmentKind::Text, &cleaned);
            }
            Side::Right => {
                layout.push(SegmentKind::Text, &cleaned);
                layout.push(SegmentKind::Separator, &separator);
                layout.segments.extend(numbering.segments);
            }
        }
        Ok(Some(layout))
    }

    /// Text-only form of [`layout`](Self::layout); blank text comes back as is.
    pub fn renumber(
        &self,
        text: &str,
        label: &str,
        spec: &NumberingSpec,
        common: Option<&CommonPattern>,
    ) -> Result<String, ConversionError> {
        Ok(self
            .layout(text, label, spec, common)?
            .map(|layout| layout.text())
            .unwrap_or_else(|| text.to_string()))
    }

    /// Convert the numeral already present at `spec.side` into `spec.kind`.
    ///
    /// Punctuation that adjoined the old numeral is kept in preference to
    /// the configured separator. An edge token that is not a numeral on its
    /// own ("Civil", "did", "mix", "IIII") is a word and counts as a
    /// mismatch; a numeral that cannot be converted is an error.
    pub fn convert(
        &self,
        text: &str,
        spec: &NumberingSpec,
    ) -> Result<NumberingOutcome, ConversionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(NumberingOutcome::Unchanged(UnchangedReason::EmptyText));
        }

        let (regex, number_group, separator_group) = match (spec.kind, spec.side) {
            (NumberingKind::Roman, Side::Left) => (&self.roman_left, 1, 2),
            (NumberingKind::Roman, Side::Right) => (&self.roman_right, 2, 1),
            (NumberingKind::Arabic, Side::Left) => (&self.arabic_left, 1, 2),
            (NumberingKind::Arabic, Side::Right) => (&self.arabic_right, 2, 1),
        };

        let Some(caps) = regex.captures(trimmed) else {
            return Ok(NumberingOutcome::Unchanged(UnchangedReason::PatternMismatch));
        };
        let (Some(number), Some(existing)) = (caps.get(number_group), caps.get(separator_group))
        else {
            return Ok(NumberingOutcome::Unchanged(UnchangedReason::PatternMismatch));
        };

        if !is_numeral_token(number.as_str()) {
            return Ok(NumberingOutcome::Unchanged(UnchangedReason::PatternMismatch));
        }

        let converted = match spec.kind {
            NumberingKind::Roman => to_roman(number.as_str())?,
            NumberingKind::Arabic => to_arabic(number.as_str())?,
        };
        let separator = if existing.as_str().is_empty() {
            spec.separator.as_str()
        } else {
            existing.as_str()
        };

        let rewritten = match spec.side {
            Side::Left => format!(
                "{}{}{}{}",
                &trimmed[..number.start()],
                converted,
                separator,
                &trimmed[existing.end()..]
            ),
            Side::Right => format!(
                "{}{}{}{}",
                &trimmed[..existing.start()],
                separator,
                converted,
                &trimmed[number.end()..]
            ),
        };
        let rewritten = rewritten.split_whitespace().collect::<Vec<_>>().join(" ");

        if rewritten == text {
            Ok(NumberingOutcome::Unchanged(UnchangedReason::NoChange))
        } else {
            Ok(NumberingOutcome::Rewritten(rewritten))
        }
    }

    /// Punctuation (with its surrounding spaces) that joins the edge numeral
    /// to the rest of the text, e.g. ": " in "Table 3: Results".
    pub fn adjacent_separator(&self, text: &str, side: Side) -> Option<String> {
        let regex = match side {
            Side::Left => &self.adjacent_left,
            Side::Right => &self.adjacent_right,
        };
        regex
            .captures(text.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for NumberingPatterns {
    fn default() -> Self {
        // The built-in building blocks are known to compile
        match Self::new(&PatternConfig::default()) {
            Ok(patterns) => patterns,
            Err(e) => unreachable!("default numbering patterns failed to compile: {e}"),
        }
    }
}

fn remove_roman_numerals(regex: &Regex, text: &str) -> String {
    regex
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            if is_numeral_token(token) {
                String::new()
            } else {
                token.to_string()
            }
        })
        .into_owned()
}
