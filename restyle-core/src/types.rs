use serde::{Deserialize, Serialize};
use std::fmt;

// ===== NUMBERING TYPES =====

/// Numeral alphabet a style is numbered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NumberingKind {
    #[serde(alias = "roman", alias = "Roman")]
    Roman,
    #[serde(alias = "arabic", alias = "Arabic")]
    Arabic,
}

/// Edge of the text a numeral (or caption word) is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[serde(alias = "left", alias = "Left")]
    Left,
    #[serde(alias = "right", alias = "Right")]
    Right,
}

impl fmt::Display for NumberingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberingKind::Roman => write!(f, "ROMAN"),
            NumberingKind::Arabic => write!(f, "ARABIC"),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "LEFT"),
            Side::Right => write!(f, "RIGHT"),
        }
    }
}

/// Which separator joins a renumbered numeral to the rest of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorPolicy {
    /// Always use the separator from the style definition.
    #[default]
    Configured,
    /// Reuse the punctuation that adjoined the old numeral, if there was any.
    PreferExisting,
}

/// Fully specified numbering for one style. Built from a
/// `NumberingFormatConfig` only when both kind and side are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingSpec {
    pub kind: NumberingKind,
    pub side: Side,
    pub separator: String,
    pub separator_policy: SeparatorPolicy,
}

impl NumberingSpec {
    pub fn new(kind: NumberingKind, side: Side, separator: impl Into<String>) -> Self {
        Self {
            kind,
            side,
            separator: separator.into(),
            separator_policy: SeparatorPolicy::Configured,
        }
    }

    pub fn with_separator_policy(mut self, policy: SeparatorPolicy) -> Self {
        self.separator_policy = policy;
        self
    }
}

fn default_side_left() -> Side {
    Side::Left
}

fn default_space() -> String {
    " ".to_string()
}

/// Caption prefix rendered next to a numeral, e.g. "Table" in "Table 2.1".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonPatternSpec {
    /// Caption word or template; the literal word `number` is a numeral placeholder
    pub pattern: String,
    #[serde(default = "default_side_left")]
    pub side: Side,
    #[serde(default = "default_space")]
    pub separator: String,
    /// Font for the caption word when it is rendered as its own run
    #[serde(default, rename = "font_format", alias = "emphasis")]
    pub emphasis: Option<FontSpec>,
}

impl CommonPatternSpec {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            side: Side::Left,
            separator: default_space(),
            emphasis: None,
        }
    }
}

// ===== FONT TYPES =====

/// Flat font definition as it appears in style configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub underline: Option<bool>,
    /// "#RRGGBB"
    #[serde(default)]
    pub color_rgb: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
}

/// One attribute assignment the document collaborator performs on a font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum FontSetting {
    Name(String),
    SizePt(f32),
    Bold(bool),
    Italic(bool),
    Underline(bool),
    ColorRgb(u8, u8, u8),
    Highlight(String),
}

impl FontSpec {
    /// Setter operations for every attribute that is set. Colors that are
    /// not valid "#RRGGBB" strings are dropped.
    pub fn settings(&self) -> Vec<FontSetting> {
        let mut settings = Vec::new();
        if let Some(name) = &self.name {
            settings.push(FontSetting::Name(name.clone()));
        }
        if let Some(size) = self.size {
            settings.push(FontSetting::SizePt(size));
        }
        if let Some(bold) = self.bold {
            settings.push(FontSetting::Bold(bold));
        }
        if let Some(italic) = self.italic {
            settings.push(FontSetting::Italic(italic));
        }
        if let Some(underline) = self.underline {
            settings.push(FontSetting::Underline(underline));
        }
        if let Some(color) = &self.color_rgb {
            match parse_hex_color(color) {
                Some((r, g, b)) => settings.push(FontSetting::ColorRgb(r, g, b)),
                None => tracing::warn!(color = %color, "ignoring invalid color_rgb"),
            }
        }
        if let Some(highlight) = &self.highlight {
            settings.push(FontSetting::Highlight(highlight.clone()));
        }
        settings
    }
}

fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

// ===== STRUCTURE TYPES =====

/// Logical role of a paragraph style in the chapter hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleRole {
    Chapter,
    Subchapter2,
    Subchapter3,
    /// Chapter-relative caption such as table or figure titles (role key)
    Caption(String),
    Other,
}

/// Current chapter/subchapter counters during one document pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalPosition {
    pub chapter: u32,
    pub sub2: u32,
    pub sub3: u32,
}

impl HierarchicalPosition {
    /// Dotted label down to `depth` (1 = chapter, 2 = chapter.sub2, 3 = full).
    pub fn label(&self, depth: usize) -> String {
        [self.chapter, self.sub2, self.sub3]
            .iter()
            .take(depth.clamp(1, 3))
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Per-level bullet configuration. Absent fields are inherited or defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletLevelConfig {
    pub level: u8,
    #[serde(default, alias = "bullet_key")]
    pub bullet_char: Option<String>,
    #[serde(default)]
    pub left: Option<i32>,
    #[serde(default)]
    pub hanging: Option<i32>,
}

/// Indentation fallback when neither an explicit level nor the default
/// level table provides values. Units are twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentConfig {
    pub left: i32,
    pub hanging: i32,
    /// Added to `left` once per nesting level
    #[serde(default)]
    pub increment: i32,
}

// ===== DOCUMENT MODEL =====

/// A paragraph as handed over by the document collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub style_name: String,
    pub text: String,
    #[serde(default)]
    pub page_break_before: bool,
    /// Present when the paragraph belongs to a numbered or bulleted list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListMembership>,
    /// Styled runs; only filled when a caption word carries its own font
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<TextRun>,
}

impl ParagraphRecord {
    pub fn new(style_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style_name: style_name.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn in_list(mut self, numbering_id: impl Into<String>, level: u8) -> Self {
        self.list = Some(ListMembership {
            numbering_id: numbering_id.into(),
            level,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMembership {
    pub numbering_id: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
}

/// One list paragraph in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemRef {
    pub paragraph_index: usize,
    pub numbering_id: String,
    pub level: u8,
}

/// A level node of an abstract numbering definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelNode {
    pub level: u8,
    /// Level text, i.e. the rendered bullet glyph
    #[serde(default)]
    pub glyph: Option<String>,
    #[serde(default)]
    pub left: Option<i32>,
    #[serde(default)]
    pub hanging: Option<i32>,
    /// Run-level font override on the glyph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_font: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractNumbering {
    pub id: String,
    #[serde(default)]
    pub levels: Vec<LevelNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingTree {
    #[serde(default)]
    pub abstract_numberings: Vec<AbstractNumbering>,
}

/// In-memory document: ordered paragraphs plus the numbering-level tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<ParagraphRecord>,
    #[serde(default)]
    pub numbering: NumberingTree,
}

impl Document {
    pub fn new(paragraphs: Vec<ParagraphRecord>) -> Self {
        Self {
            paragraphs,
            numbering: NumberingTree::default(),
        }
    }

    /// All list paragraphs in document order.
    pub fn list_items(&self) -> Vec<ListItemRef> {
        self.paragraphs
            .iter()
            .enumerate()
            .filter_map(|(paragraph_index, paragraph)| {
                paragraph.list.as_ref().map(|membership| ListItemRef {
                    paragraph_index,
                    numbering_id: membership.numbering_id.clone(),
                    level: membership.level,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_labels() {
        let position = HierarchicalPosition {
            chapter: 3,
            sub2: 2,
            sub3: 7,
        };
        assert_eq!(position.label(1), "3");
        assert_eq!(position.label(2), "3.2");
        assert_eq!(position.label(3), "3.2.7");
    }

    #[test]
    fn test_font_settings_skip_unset_and_bad_color() {
        let font = FontSpec {
            bold: Some(true),
            color_rgb: Some("#12ZZ56".to_string()),
            ..Default::default()
        };
        assert_eq!(font.settings(), vec![FontSetting::Bold(true)]);

        let font = FontSpec {
            color_rgb: Some("#FF8000".to_string()),
            size: Some(11.0),
            ..Default::default()
        };
        assert_eq!(
            font.settings(),
            vec![FontSetting::SizePt(11.0), FontSetting::ColorRgb(255, 128, 0)]
        );
    }

    #[test]
    fn test_list_items_accessor() {
        let doc = Document::new(vec![
            ParagraphRecord::new("main_text", "intro"),
            ParagraphRecord::new("List Bullet", "one").in_list("5", 0),
            ParagraphRecord::new("List Bullet", "two").in_list("5", 1),
        ]);
        let items = doc.list_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].paragraph_index, 1);
        assert_eq!(items[1].level, 1);
    }

    #[test]
    fn test_numbering_kind_accepts_lowercase() {
        let kind: NumberingKind = serde_yaml::from_str("roman").unwrap();
        assert_eq!(kind, NumberingKind::Roman);
        let side: Side = serde_yaml::from_str("RIGHT").unwrap();
        assert_eq!(side, Side::Right);
    }
}
