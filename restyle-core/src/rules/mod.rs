// Main rules module - delegates to one file per pipeline rule:
// - engine.rs: FormatRule trait and RuleEngine
// - numbering_format.rs: converts numerals already present in headings
// - section_numbering.rs: hierarchical renumbering and chapter page breaks
// - bullet_levels.rs: bullet glyphs and indentation per list level
// - list_termination.rs: list grouping and item punctuation

pub mod bullet_levels;
pub mod engine;
pub mod list_termination;
pub mod numbering_format;
pub mod section_numbering;

pub use engine::*;
pub use section_numbering::{role_key, StyleNumbering, StyleNumberingTable};
