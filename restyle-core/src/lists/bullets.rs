use crate::config::{ListConfig, MAX_LIST_LEVEL};
use crate::types::{BulletLevelConfig, IndentConfig, NumberingTree};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Effective settings for one nesting level. `None` fields leave the level
/// node as the document has it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLevel {
    pub bullet_key: Option<String>,
    pub left: Option<i32>,
    pub hanging: Option<i32>,
}

fn entry(table: &[BulletLevelConfig], level: u8) -> Option<&BulletLevelConfig> {
    table.iter().find(|config| config.level == level)
}

/// Merge explicit, inherited and default settings for `level`.
///
/// Indents come from the explicit level, then the default table entry for
/// the same level, then `indent` scaled by depth. The bullet comes from the
/// explicit level, then the nearest explicit ancestor, then the nearest
/// default table entry at or above this level.
pub fn resolve(
    level: u8,
    explicit: &[BulletLevelConfig],
    default_table: &[BulletLevelConfig],
    indent: Option<&IndentConfig>,
) -> ResolvedLevel {
    let own = entry(explicit, level);
    let default = entry(default_table, level);

    let left = own
        .and_then(|c| c.left)
        .or_else(|| default.and_then(|c| c.left))
        .or_else(|| indent.map(|i| i.left + i32::from(level) * i.increment));
    let hanging = own
        .and_then(|c| c.hanging)
        .or_else(|| default.and_then(|c| c.hanging))
        .or_else(|| indent.map(|i| i.hanging));

    let bullet_key = (0..=level)
        .rev()
        .find_map(|l| entry(explicit, l).and_then(|c| c.bullet_char.clone()))
        .or_else(|| {
            (0..=level)
                .rev()
                .find_map(|l| entry(default_table, l).and_then(|c| c.bullet_char.clone()))
        });

    ResolvedLevel {
        bullet_key,
        left,
        hanging,
    }
}

/// Apply the list configuration to every abstract numbering definition.
/// Returns how many level nodes were changed.
pub fn apply_bullet_levels(
    tree: &mut NumberingTree,
    list: &ListConfig,
    bullet_characters: &BTreeMap<String, String>,
) -> usize {
    let explicit = list.explicit_levels();
    let mut changed = 0;

    for numbering in &mut tree.abstract_numberings {
        for node in &mut numbering.levels {
            if node.level > MAX_LIST_LEVEL {
                continue;
            }
            let resolved = resolve(
                node.level,
                &explicit,
                &list.default_levels,
                list.indent.as_ref(),
            );
            let before = node.clone();

            if let Some(key) = &resolved.bullet_key {
                match bullet_characters.get(key) {
                    Some(glyph) => {
                        node.glyph = Some(glyph.clone());
                        node.glyph_font = None;
                    }
                    None => warn!(
                        "unknown bullet key '{key}' for level {} of numbering {}",
                        node.level, numbering.id
                    ),
                }
            }
            if resolved.left.is_some() {
                node.left = resolved.left;
            }
            if resolved.hanging.is_some() {
                node.hanging = resolved.hanging;
            }

            if *node != before {
                debug!(
                    "numbering {} level {}: glyph={:?} left={:?} hanging={:?}",
                    numbering.id, node.level, node.glyph, node.left, node.hanging
                );
                changed += 1;
            }
        }
    }

    changed
}
