// Numbering of chapter, subchapter and caption paragraphs:
// - converter.rs: Arabic <-> Roman over dotted numbers
// - common_pattern.rs: caption templates ("Table", "Figure number")
// - matcher.rs: strip, insert and convert numerals in paragraph text
// - counter.rs: first-occurrence hierarchical counter

pub mod common_pattern;
pub mod converter;
pub mod counter;
pub mod matcher;

pub use common_pattern::CommonPattern;
pub use converter::{is_numeral_token, to_arabic, to_roman, MAX_ROMAN};
pub use counter::{SectionCounter, SectionEvent};
pub use matcher::{NumberingLayout, NumberingOutcome, NumberingPatterns, SegmentKind, UnchangedReason};
