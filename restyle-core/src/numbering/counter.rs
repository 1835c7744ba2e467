use crate::types::{HierarchicalPosition, StyleRole};
use std::collections::BTreeMap;

/// What the counter decided for one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEvent {
    /// First paragraph of a chapter run: renumber and break the page.
    NewChapter { label: String },
    /// Chapter paragraph directly after another one (multi-line title).
    ChapterContinuation,
    Subchapter { label: String },
    Caption { role: String, label: String },
    /// Heading outside the numbering scope (before any chapter, or a
    /// level-3 heading with no level-2 parent).
    Skipped,
    Other,
}

/// Hierarchical counter for one pass over a document.
///
/// Only the first paragraph of a run of consecutive chapter paragraphs
/// starts a new chapter. Subchapter and caption counters are scoped to the
/// current chapter.
#[derive(Debug, Default)]
pub struct SectionCounter {
    position: HierarchicalPosition,
    in_chapter: bool,
    previous_was_chapter: bool,
    caption_counts: BTreeMap<String, u32>,
}

impl SectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> HierarchicalPosition {
        self.position
    }

    pub fn advance(&mut self, role: &StyleRole) -> SectionEvent {
        if *role == StyleRole::Chapter {
            if self.previous_was_chapter {
                return SectionEvent::ChapterContinuation;
            }
            self.previous_was_chapter = true;
            self.in_chapter = true;
            self.position.chapter += 1;
            self.position.sub2 = 0;
            self.position.sub3 = 0;
            self.caption_counts.clear();
            return SectionEvent::NewChapter {
                label: self.position.label(1),
            };
        }

        self.previous_was_chapter = false;
        match role {
            StyleRole::Subchapter2 if self.in_chapter => {
                self.position.sub2 += 1;
                self.position.sub3 = 0;
                SectionEvent::Subchapter {
                    label: self.position.label(2),
                }
            }
            StyleRole::Subchapter3 if self.in_chapter && self.position.sub2 > 0 => {
                self.position.sub3 += 1;
                SectionEvent::Subchapter {
                    label: self.position.label(3),
                }
            }
            StyleRole::Caption(name) if self.in_chapter => {
                let count = self.caption_counts.entry(name.clone()).or_insert(0);
                *count += 1;
                SectionEvent::Caption {
                    role: name.clone(),
                    label: format!("{}.{}", self.position.chapter, count),
                }
            }
            StyleRole::Subchapter2 | StyleRole::Subchapter3 | StyleRole::Caption(_) => {
                SectionEvent::Skipped
            }
            _ => SectionEvent::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(roles: &[StyleRole]) -> Vec<SectionEvent> {
        let mut counter = SectionCounter::new();
        roles.iter().map(|role| counter.advance(role)).collect()
    }

    #[test]
    fn test_consecutive_chapters_count_once() {
        let events = labels(&[
            StyleRole::Chapter,
            StyleRole::Chapter,
            StyleRole::Other,
            StyleRole::Chapter,
        ]);
        assert_eq!(
            events,
            vec![
                SectionEvent::NewChapter {
                    label: "1".to_string()
                },
                SectionEvent::ChapterContinuation,
                SectionEvent::Other,
                SectionEvent::NewChapter {
                    label: "2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_subchapters_reset_per_chapter() {
        let events = labels(&[
            StyleRole::Chapter,
            StyleRole::Subchapter2,
            StyleRole::Subchapter3,
            StyleRole::Subchapter3,
            StyleRole::Subchapter2,
            StyleRole::Subchapter3,
            StyleRole::Chapter,
            StyleRole::Subchapter2,
        ]);
        let subs: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SectionEvent::Subchapter { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(subs, vec!["1.1", "1.1.1", "1.1.2", "1.2", "1.2.1", "2.1"]);
    }

    #[test]
    fn test_headings_outside_scope_are_skipped() {
        let events = labels(&[
            StyleRole::Subchapter2,
            StyleRole::Caption("table_titles".to_string()),
            StyleRole::Chapter,
            StyleRole::Subchapter3,
        ]);
        assert_eq!(
            events,
            vec![
                SectionEvent::Skipped,
                SectionEvent::Skipped,
                SectionEvent::NewChapter {
                    label: "1".to_string()
                },
                SectionEvent::Skipped,
            ]
        );
    }

    #[test]
    fn test_caption_counters_are_per_role_and_chapter() {
        let table = StyleRole::Caption("table_titles".to_string());
        let figure = StyleRole::Caption("figure_titles".to_string());
        let events = labels(&[
            StyleRole::Chapter,
            table.clone(),
            figure.clone(),
            table.clone(),
            StyleRole::Chapter,
            table,
        ]);
        let captions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SectionEvent::Caption { role, label } => Some((role.as_str(), label.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            captions,
            vec![
                ("table_titles", "1.1"),
                ("figure_titles", "1.1"),
                ("table_titles", "1.2"),
                ("table_titles", "2.1"),
            ]
        );
    }
}
