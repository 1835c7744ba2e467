use crate::error::ConfigurationError;
use crate::types::{
    BulletLevelConfig, CommonPatternSpec, FontSpec, IndentConfig, NumberingKind, NumberingSpec,
    SeparatorPolicy, Side, StyleRole,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Role keys used in `style_names` and `chapter_and_section_rules`.
pub mod roles {
    pub const MAIN_TEXT: &str = "main_text";
    pub const CHAPTER_TITLES: &str = "chapter_titles";
    pub const SUBCHAPTER_TITLES_LEVEL_2: &str = "subchapter_titles_level_2";
    pub const SUBCHAPTER_TITLES_LEVEL_3: &str = "subchapter_titles_level_3";
    pub const TABLE_TITLES: &str = "table_titles";
    pub const FIGURE_TITLES: &str = "figure_titles";
    pub const SOURCE_TEXT: &str = "source_text";
}

/// Highest list nesting level a numbering definition can carry.
pub const MAX_LIST_LEVEL: u8 = 8;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_space() -> String {
    " ".to_string()
}

fn default_style_names() -> BTreeMap<String, String> {
    [
        roles::MAIN_TEXT,
        roles::CHAPTER_TITLES,
        roles::SUBCHAPTER_TITLES_LEVEL_2,
        roles::SUBCHAPTER_TITLES_LEVEL_3,
        roles::TABLE_TITLES,
        roles::FIGURE_TITLES,
        roles::SOURCE_TEXT,
    ]
    .iter()
    .map(|role| (role.to_string(), role.to_string()))
    .collect()
}

fn default_bullet_characters() -> BTreeMap<String, String> {
    [
        ("bullet", "•"),
        ("arrow", "→"),
        ("diamond", "♦"),
        ("square", "▪"),
        ("circle", "○"),
        ("dash", "–"),
        ("star", "★"),
        ("check", "✓"),
    ]
    .iter()
    .map(|(key, glyph)| (key.to_string(), glyph.to_string()))
    .collect()
}

fn default_caption_roles() -> Vec<String> {
    vec![roles::TABLE_TITLES.to_string(), roles::FIGURE_TITLES.to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Role key -> concrete paragraph style name in the document
    #[serde(default = "default_style_names")]
    pub style_names: BTreeMap<String, String>,
    /// Per-role style definitions (keyed by role, not by concrete style name)
    #[serde(default)]
    pub chapter_and_section_rules: BTreeMap<String, StyleDefinition>,
    /// Bullet glyphs, indentation and termination punctuation
    #[serde(default)]
    pub list_rules: ListConfig,
    /// Regex building blocks for numeral detection
    #[serde(default)]
    pub patterns: PatternConfig,
    /// Bullet key -> glyph
    #[serde(default = "default_bullet_characters")]
    pub bullet_characters: BTreeMap<String, String>,
    /// Roles numbered as `chapter.n` captions
    #[serde(default = "default_caption_roles")]
    pub caption_roles: Vec<String>,
    /// Start each chapter run on a new page
    #[serde(default = "default_true")]
    pub chapter_page_breaks: bool,
    /// Pipeline configuration - defines which rules to run and in what order
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// List of rules to run in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleConfig {
    fn new(name: &str, enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            enabled,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                // Renumbering rewrites every numeral anyway; conversion is opt-in
                RuleConfig::new("NumberingFormat", false),
                RuleConfig::new("SectionNumbering", true),
                RuleConfig::new("BulletLevels", true),
                RuleConfig::new("ListTermination", true),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleDefinition {
    #[serde(default)]
    pub numbering_format: Option<NumberingFormatConfig>,
    #[serde(default)]
    pub common_pattern_format: Option<CommonPatternSpec>,
    /// Base font of the style; used for the numeral and text runs
    #[serde(default)]
    pub font_format: Option<FontSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingFormatConfig {
    #[serde(default, rename = "type")]
    pub kind: Option<NumberingKind>,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default = "default_space")]
    pub separator: String,
    #[serde(default)]
    pub separator_policy: SeparatorPolicy,
}

impl NumberingFormatConfig {
    /// Kind and side are evaluated together; either one missing disables
    /// numbering for the style.
    pub fn to_spec(&self, style: &str) -> Result<NumberingSpec, ConfigurationError> {
        let missing = match (self.kind, self.side) {
            (Some(kind), Some(side)) => {
                return Ok(NumberingSpec::new(kind, side, self.separator.clone())
                    .with_separator_policy(self.separator_policy))
            }
            (None, None) => "type and side",
            (None, Some(_)) => "type",
            (Some(_), None) => "side",
        };
        Err(ConfigurationError::IncompleteNumbering {
            style: style.to_string(),
            missing,
        })
    }
}

impl StyleDefinition {
    /// `None` when the style has no numbering at all.
    pub fn numbering(&self, style: &str) -> Option<Result<NumberingSpec, ConfigurationError>> {
        self.numbering_format.as_ref().map(|format| format.to_spec(style))
    }

    /// Common pattern with an empty `pattern` counts as not configured.
    pub fn common_pattern(&self) -> Option<&CommonPatternSpec> {
        self.common_pattern_format
            .as_ref()
            .filter(|spec| !spec.pattern.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListConfig {
    /// Bullet for level 0, inherited by deeper levels without their own
    #[serde(default)]
    pub bullet_char: Option<String>,
    /// Indentation fallback for levels without explicit values
    #[serde(default)]
    pub indent: Option<IndentConfig>,
    /// Explicit per-level overrides
    #[serde(default)]
    pub levels: Vec<BulletLevelConfig>,
    /// Table consulted after the explicit overrides
    #[serde(default)]
    pub default_levels: Vec<BulletLevelConfig>,
    #[serde(default)]
    pub list_item_termination: TerminationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminationConfig {
    #[serde(default)]
    pub intermediate: String,
    #[serde(default)]
    pub last_item: String,
}

impl TerminationConfig {
    pub fn is_enabled(&self) -> bool {
        !self.intermediate.is_empty() || !self.last_item.is_empty()
    }
}

impl ListConfig {
    /// Explicit levels with the top-level `bullet_char` folded into level 0.
    pub fn explicit_levels(&self) -> Vec<BulletLevelConfig> {
        let mut levels = self.levels.clone();
        if let Some(bullet) = &self.bullet_char {
            match levels.iter_mut().find(|level| level.level == 0) {
                Some(level0) if level0.bullet_char.is_none() => {
                    level0.bullet_char = Some(bullet.clone())
                }
                Some(_) => {}
                None => levels.push(BulletLevelConfig {
                    level: 0,
                    bullet_char: Some(bullet.clone()),
                    left: None,
                    hanging: None,
                }),
            }
        }
        levels
    }

    /// Whether there is anything for the bullet resolver to apply.
    pub fn has_level_styling(&self) -> bool {
        self.bullet_char.is_some()
            || self.indent.is_some()
            || !self.levels.is_empty()
            || !self.default_levels.is_empty()
    }
}

fn default_arabic_number() -> String {
    r"\d+".to_string()
}

fn default_roman_number() -> String {
    r"[IVXLCDMivxlcdm\d]+".to_string()
}

fn default_decimal_number() -> String {
    r"\d+(?:\.\d+)*".to_string()
}

fn default_mixed_number() -> String {
    r"[IVXLCDMivxlcdm\d]+(?:\.[IVXLCDMivxlcdm\d]+)*".to_string()
}

fn default_punctuation() -> String {
    r"[.:-]".to_string()
}

/// Regex building blocks. All detection and strip regexes are assembled
/// from these, so a document family with unusual numerals only needs to
/// override them here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Substituted for `number` in ARABIC caption templates
    #[serde(default = "default_arabic_number")]
    pub arabic_number: String,
    /// Substituted for `number` in ROMAN caption templates
    #[serde(default = "default_roman_number")]
    pub roman_number: String,
    /// Dotted decimal numeral, e.g. 2.3.1
    #[serde(default = "default_decimal_number")]
    pub decimal_number: String,
    /// Dotted numeral mixing roman letters and digits, e.g. II.3
    #[serde(default = "default_mixed_number")]
    pub mixed_number: String,
    /// Single punctuation character that may adjoin a numeral
    #[serde(default = "default_punctuation")]
    pub punctuation: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            arabic_number: default_arabic_number(),
            roman_number: default_roman_number(),
            decimal_number: default_decimal_number(),
            mixed_number: default_mixed_number(),
            punctuation: default_punctuation(),
        }
    }
}

/// Reverse lookup from concrete style name to logical role.
#[derive(Debug, Clone, Default)]
pub struct StyleRoles {
    by_style: HashMap<String, StyleRole>,
}

impl StyleRoles {
    pub fn role_of(&self, style_name: &str) -> StyleRole {
        self.by_style
            .get(style_name)
            .cloned()
            .unwrap_or(StyleRole::Other)
    }
}

impl FormatterConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FormatterConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {p}, using defaults: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Concrete style name for a role key; unmapped roles use the key itself.
    pub fn style_name<'a>(&'a self, role: &'a str) -> &'a str {
        self.style_names.get(role).map(String::as_str).unwrap_or(role)
    }

    /// Style definition by role key.
    pub fn style_definition(&self, role: &str) -> Option<&StyleDefinition> {
        self.chapter_and_section_rules.get(role)
    }

    pub fn style_roles(&self) -> StyleRoles {
        let mut by_style = HashMap::new();
        let hierarchy = [
            (roles::CHAPTER_TITLES, StyleRole::Chapter),
            (roles::SUBCHAPTER_TITLES_LEVEL_2, StyleRole::Subchapter2),
            (roles::SUBCHAPTER_TITLES_LEVEL_3, StyleRole::Subchapter3),
        ];
        for (role, style_role) in hierarchy {
            by_style.insert(self.style_name(role).to_string(), style_role);
        }
        for caption in &self.caption_roles {
            by_style
                .entry(self.style_name(caption).to_string())
                .or_insert_with(|| StyleRole::Caption(caption.clone()));
        }
        StyleRoles { by_style }
    }

    /// Structural checks the schema layer does not cover. Returns every
    /// problem found rather than stopping at the first.
    pub fn validate(&self) -> Vec<ConfigurationError> {
        let mut problems = Vec::new();

        for (role, definition) in &self.chapter_and_section_rules {
            if let Some(Err(e)) = definition.numbering(role) {
                problems.push(e);
            }
        }

        let list = &self.list_rules;
        let all_levels = list
            .explicit_levels()
            .into_iter()
            .chain(list.default_levels.iter().cloned());
        for level in all_levels {
            if level.level > MAX_LIST_LEVEL {
                problems.push(ConfigurationError::LevelOutOfRange { level: level.level });
            }
            if let Some(key) = &level.bullet_char {
                if !self.bullet_characters.contains_key(key) {
                    problems.push(ConfigurationError::UnknownBullet {
                        key: key.clone(),
                        level: level.level,
                    });
                }
            }
        }

        let termination = &list.list_item_termination;
        for (field, value) in [
            ("intermediate", &termination.intermediate),
            ("last_item", &termination.last_item),
        ] {
            if value.chars().count() > 1 {
                problems.push(ConfigurationError::TerminationTooLong {
                    field,
                    value: value.clone(),
                });
            }
        }

        let patterns = &self.patterns;
        for pattern in [
            &patterns.arabic_number,
            &patterns.roman_number,
            &patterns.decimal_number,
            &patterns.mixed_number,
            &patterns.punctuation,
        ] {
            if let Err(e) = regex::Regex::new(pattern) {
                problems.push(ConfigurationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }

        problems
    }
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            style_names: default_style_names(),
            chapter_and_section_rules: BTreeMap::new(),
            list_rules: ListConfig::default(),
            patterns: PatternConfig::default(),
            bullet_characters: default_bullet_characters(),
            caption_roles: default_caption_roles(),
            chapter_page_breaks: true,
            pipeline: PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
style_names:
  chapter_titles: "Heading 1"
  subchapter_titles_level_2: "Heading 2"
chapter_and_section_rules:
  chapter_titles:
    numbering_format: { type: ROMAN, side: LEFT, separator: " " }
  table_titles:
    numbering_format: { type: ARABIC, side: LEFT, separator: ": " }
    common_pattern_format: { pattern: "Table", side: LEFT, separator: " " }
list_rules:
  bullet_char: bullet
  indent: { left: 720, hanging: 360, increment: 360 }
  levels:
    - { level: 1, bullet_char: circle }
  list_item_termination: { intermediate: ";", last_item: "." }
"#;

    #[test]
    fn test_parse_sample_config() {
        let config: FormatterConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.style_name(roles::CHAPTER_TITLES), "Heading 1");
        // Unmapped roles fall back to their key
        assert_eq!(config.style_name(roles::TABLE_TITLES), "table_titles");

        let chapter = config.style_definition(roles::CHAPTER_TITLES).unwrap();
        let spec = chapter.numbering(roles::CHAPTER_TITLES).unwrap().unwrap();
        assert_eq!(spec.kind, NumberingKind::Roman);
        assert_eq!(spec.side, Side::Left);
        assert_eq!(spec.separator_policy, SeparatorPolicy::Configured);

        let table = config.style_definition(roles::TABLE_TITLES).unwrap();
        assert_eq!(table.common_pattern().unwrap().pattern, "Table");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_style_roles_lookup() {
        let config: FormatterConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let roles = config.style_roles();
        assert_eq!(roles.role_of("Heading 1"), StyleRole::Chapter);
        assert_eq!(roles.role_of("Heading 2"), StyleRole::Subchapter2);
        assert_eq!(
            roles.role_of("table_titles"),
            StyleRole::Caption("table_titles".to_string())
        );
        assert_eq!(roles.role_of("Normal"), StyleRole::Other);
    }

    #[test]
    fn test_incomplete_numbering_is_reported() {
        let yaml = r#"
chapter_and_section_rules:
  chapter_titles:
    numbering_format: { type: ROMAN }
"#;
        let config: FormatterConfig = serde_yaml::from_str(yaml).unwrap();
        let problems = config.validate();
        assert_eq!(
            problems,
            vec![ConfigurationError::IncompleteNumbering {
                style: "chapter_titles".to_string(),
                missing: "side",
            }]
        );
    }

    #[test]
    fn test_list_validation_problems() {
        let yaml = r#"
list_rules:
  levels:
    - { level: 9, bullet_char: hexagon }
  list_item_termination: { intermediate: ";;" }
"#;
        let config: FormatterConfig = serde_yaml::from_str(yaml).unwrap();
        let problems = config.validate();
        assert_eq!(problems.len(), 3);
        assert!(problems.contains(&ConfigurationError::LevelOutOfRange { level: 9 }));
        assert!(problems.contains(&ConfigurationError::UnknownBullet {
            key: "hexagon".to_string(),
            level: 9,
        }));
    }

    #[test]
    fn test_legacy_bullet_char_becomes_level_zero() {
        let config: FormatterConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let levels = config.list_rules.explicit_levels();
        let level0 = levels.iter().find(|l| l.level == 0).unwrap();
        assert_eq!(level0.bullet_char.as_deref(), Some("bullet"));
        let level1 = levels.iter().find(|l| l.level == 1).unwrap();
        assert_eq!(level1.bullet_char.as_deref(), Some("circle"));
    }

    #[test]
    fn test_load_with_fallback_uses_defaults_for_missing_file() {
        let config = FormatterConfig::load_with_fallback(Some("/nonexistent/restyle.yaml"));
        assert!(config.chapter_page_breaks);
        assert_eq!(config.pipeline.rules.len(), 4);
        assert_eq!(config.bullet_characters.get("circle").map(String::as_str), Some("○"));
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        let path = std::env::temp_dir().join("restyle_config_test.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = FormatterConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(
            config.list_rules.list_item_termination.intermediate,
            ";"
        );

        std::fs::remove_file(path).ok();
    }
}
