use crate::types::{ListItemRef, ParagraphRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TRAILING_PUNCTUATION: [char; 4] = ['.', ';', ',', ':'];

/// One list instance: consecutive items sharing a numbering id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroup {
    pub numbering_id: String,
    pub items: Vec<ListItemRef>,
}

impl ListGroup {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split list paragraphs into list instances.
///
/// A new group starts when the numbering id changes, or when an item at
/// level 0 follows an item nested deeper (same id reused for a new list).
pub fn group_list_items(items: &[ListItemRef]) -> Vec<ListGroup> {
    let mut groups: Vec<ListGroup> = Vec::new();

    for item in items {
        let starts_new = match groups.last().and_then(|g| g.items.last().map(|last| (g, last))) {
            Some((group, last)) => {
                group.numbering_id != item.numbering_id || (item.level == 0 && last.level > 0)
            }
            None => true,
        };
        if starts_new {
            groups.push(ListGroup {
                numbering_id: item.numbering_id.clone(),
                items: Vec::new(),
            });
        }
        if let Some(group) = groups.last_mut() {
            group.items.push(item.clone());
        }
    }

    groups
}

/// Trim the text and replace trailing `. ; , :` with `terminator`. Text
/// that is blank or only punctuation, and an empty terminator, leave the
/// paragraph alone.
pub fn terminate(text: &str, terminator: &str) -> Option<String> {
    if terminator.is_empty() {
        return None;
    }
    let stripped = text
        .trim()
        .trim_end_matches(&TRAILING_PUNCTUATION[..])
        .trim_end();
    if stripped.is_empty() {
        return None;
    }
    Some(format!("{stripped}{terminator}"))
}

/// Write terminators into every group. Returns the number of paragraphs
/// whose text changed.
pub fn apply_termination(
    paragraphs: &mut [ParagraphRecord],
    groups: &[ListGroup],
    intermediate: &str,
    last_item: &str,
) -> usize {
    let mut changed = 0;
    for group in groups {
        let last = group.items.len().saturating_sub(1);
        for (position, item) in group.items.iter().enumerate() {
            let terminator = if position == last { last_item } else { intermediate };
            let Some(paragraph) = paragraphs.get_mut(item.paragraph_index) else {
                continue;
            };
            if let Some(text) = terminate(&paragraph.text, terminator) {
                if text != paragraph.text {
                    paragraph.text = text;
                    changed += 1;
                }
            }
        }
    }
    changed
}

/// Shape of the lists in a document, reported after formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStructure {
    pub group_count: usize,
    pub item_count: usize,
    pub max_depth: u8,
    /// Numbering id -> number of items
    pub items_per_numbering: BTreeMap<String, usize>,
    /// Group sizes in document order
    pub group_sizes: Vec<usize>,
}

pub fn analyze_list_structure(groups: &[ListGroup]) -> ListStructure {
    let mut structure = ListStructure {
        group_count: groups.len(),
        ..Default::default()
    };
    for group in groups {
        structure.group_sizes.push(group.len());
        structure.item_count += group.len();
        *structure
            .items_per_numbering
            .entry(group.numbering_id.clone())
            .or_insert(0) += group.len();
        for item in &group.items {
            structure.max_depth = structure.max_depth.max(item.level);
        }
    }
    structure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(paragraph_index: usize, id: &str, level: u8) -> ListItemRef {
        ListItemRef {
            paragraph_index,
            numbering_id: id.to_string(),
            level,
        }
    }

    #[test]
    fn test_level_restart_splits_group() {
        let items = vec![item(0, "5", 0), item(1, "5", 1), item(2, "5", 1), item(3, "5", 0)];
        let groups = group_list_items(&items);
        let sizes: Vec<_> = groups.iter().map(ListGroup::len).collect();
        assert_eq!(sizes, vec![3, 1]);
    }

    #[test]
    fn test_numbering_id_change_splits_group() {
        let items = vec![item(0, "1", 0), item(1, "1", 0), item(2, "2", 0), item(3, "1", 0)];
        let sizes: Vec<_> = group_list_items(&items).iter().map(ListGroup::len).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
        assert!(group_list_items(&[]).is_empty());
    }

    #[test]
    fn test_apply_termination_per_group() {
        let mut paragraphs: Vec<_> = ["a.", "b,", "c", "d"]
            .iter()
            .map(|t| ParagraphRecord::new("List Paragraph", *t))
            .collect();
        let items = vec![item(0, "5", 0), item(1, "5", 1), item(2, "5", 1), item(3, "5", 0)];
        let groups = group_list_items(&items);

        let changed = apply_termination(&mut paragraphs, &groups, ";", ".");
        let texts: Vec<_> = paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a;", "b;", "c.", "d."]);
        assert_eq!(changed, 4);
    }

    #[test]
    fn test_terminate_edge_cases() {
        assert_eq!(terminate("item :;", "."), Some("item.".to_string()));
        assert_eq!(terminate("   ", "."), None);
        assert_eq!(terminate("item", ""), None);
        assert_eq!(terminate(".", ";"), None);
        assert_eq!(terminate(" ;, ", "."), None);
        assert_eq!(terminate(" item ", ";"), Some("item;".to_string()));
    }

    #[test]
    fn test_analyze_structure() {
        let items = vec![item(0, "5", 0), item(1, "5", 2), item(2, "7", 0)];
        let structure = analyze_list_structure(&group_list_items(&items));
        assert_eq!(structure.group_count, 2);
        assert_eq!(structure.item_count, 3);
        assert_eq!(structure.max_depth, 2);
        assert_eq!(structure.items_per_numbering.get("5"), Some(&2));
        assert_eq!(structure.group_sizes, vec![2, 1]);
    }
}
