// List handling:
// - bullets.rs: per-level bullet glyph and indentation resolution
// - termination.rs: list instance grouping and item punctuation

pub mod bullets;
pub mod termination;

pub use bullets::{apply_bullet_levels, resolve, ResolvedLevel};
pub use termination::{
    analyze_list_structure, apply_termination, group_list_items, ListGroup, ListStructure,
};
