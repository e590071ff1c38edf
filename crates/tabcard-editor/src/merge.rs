//! Configuration merge protocol
//!
//! Each function takes the current snapshot and returns a new one. Tabs that
//! an edit does not touch are carried over as the same `Arc`.

use std::sync::Arc;

use tabcard_tabs::{CardConfig, Result, Tab, TabError, TabPatch, TabSkeleton, TabsCardConfig};

/// Shallow-merge form fields into the tab at `index`
pub fn merge_fields(
    config: &TabsCardConfig,
    index: usize,
    patch: &TabPatch,
) -> Result<TabsCardConfig> {
    let current = config.tab(index).ok_or(TabError::IndexOutOfRange {
        index,
        len: config.len(),
    })?;

    if let Some(id) = &patch.id {
        if id.is_empty() {
            return Err(TabError::MissingIdentifier);
        }
        if config.position(id).is_some_and(|other| other != index) {
            return Err(TabError::DuplicateId(id.clone()));
        }
    }

    let mut tabs = config.tabs.clone();
    tabs[index] = Arc::new(current.patched(patch));
    Ok(config.with_tabs(tabs))
}

/// Attach a card at `index`.
///
/// `index == len` appends the skeleton as a new tab, provided its id is
/// not already taken; a smaller index replaces the card of an existing
/// tab, keeping its id and label.
pub fn merge_card(
    config: &TabsCardConfig,
    index: usize,
    card: CardConfig,
    skeleton: &TabSkeleton,
) -> Result<TabsCardConfig> {
    let len = config.len();
    let mut tabs = config.tabs.clone();

    if index == len {
        if config.position(&skeleton.id).is_some() {
            return Err(TabError::DuplicateId(skeleton.id.clone()));
        }
        tabs.push(Arc::new(Tab::from_skeleton(skeleton, card)));
    } else if let Some(current) = config.tab(index) {
        tabs[index] = Arc::new(current.with_card(card));
    } else {
        return Err(TabError::IndexOutOfRange { index, len });
    }

    Ok(config.with_tabs(tabs))
}

/// Remove the tab at `index`, keeping the others in order
pub fn remove_tab(config: &TabsCardConfig, index: usize) -> Result<TabsCardConfig> {
    let len = config.len();
    if index >= len {
        return Err(TabError::IndexOutOfRange { index, len });
    }

    let mut tabs = config.tabs.clone();
    tabs.remove(index);
    Ok(config.with_tabs(tabs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ids: &[&str]) -> TabsCardConfig {
        let tabs = ids
            .iter()
            .map(|id| {
                Arc::new(Tab {
                    id: id.to_string(),
                    label: id.to_uppercase(),
                    card: CardConfig::of_type("markdown"),
                })
            })
            .collect();
        TabsCardConfig::stub().with_tabs(tabs)
    }

    #[test]
    fn test_merge_fields_touches_one_tab() {
        let before = config(&["a", "b", "c"]);
        let after = merge_fields(&before, 1, &TabPatch::label("Bee")).unwrap();

        assert_eq!(after.tabs[1].label, "Bee");
        assert_eq!(after.tabs[1].id, "b");
        assert_eq!(after.tabs[1].card, before.tabs[1].card);
        assert!(Arc::ptr_eq(&after.tabs[0], &before.tabs[0]));
        assert!(Arc::ptr_eq(&after.tabs[2], &before.tabs[2]));
        assert_eq!(before.tabs[1].label, "B");
    }

    #[test]
    fn test_merge_fields_rejects_duplicate_id() {
        let before = config(&["a", "b"]);
        let patch = TabPatch {
            id: Some("a".into()),
            label: None,
        };
        assert!(matches!(
            merge_fields(&before, 1, &patch),
            Err(TabError::DuplicateId(_))
        ));

        // Re-submitting a tab's own id is fine.
        assert!(merge_fields(&before, 0, &patch).is_ok());
    }

    #[test]
    fn test_merge_fields_out_of_range() {
        let before = config(&["a"]);
        assert!(matches!(
            merge_fields(&before, 1, &TabPatch::label("x")),
            Err(TabError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_merge_card_appends_skeleton() {
        let before = config(&["a"]);
        let skeleton = TabSkeleton::for_position(before.len());
        let after = merge_card(&before, 1, CardConfig::of_type("gauge"), &skeleton).unwrap();

        assert_eq!(after.len(), 2);
        assert_eq!(after.tabs[1].id, skeleton.id);
        assert_eq!(after.tabs[1].label, "Tab 2");
        assert_eq!(after.tabs[1].card.card_type(), Some("gauge"));
    }

    #[test]
    fn test_merge_card_rejects_taken_skeleton_id() {
        let before = config(&["a"]);
        let skeleton = TabSkeleton::for_position(before.len());
        let once = merge_card(&before, 1, CardConfig::of_type("gauge"), &skeleton).unwrap();

        let result = merge_card(&once, 2, CardConfig::of_type("gauge"), &skeleton);
        assert!(matches!(result, Err(TabError::DuplicateId(id)) if id == skeleton.id));
    }

    #[test]
    fn test_merge_card_replaces_existing() {
        let before = config(&["a", "b"]);
        let skeleton = TabSkeleton::for_position(before.len());
        let after = merge_card(&before, 0, CardConfig::of_type("gauge"), &skeleton).unwrap();

        assert_eq!(after.len(), 2);
        assert_eq!(after.tabs[0].id, "a");
        assert_eq!(after.tabs[0].label, "A");
        assert_eq!(after.tabs[0].card.card_type(), Some("gauge"));
        assert!(Arc::ptr_eq(&after.tabs[1], &before.tabs[1]));
    }

    #[test]
    fn test_merge_card_past_end() {
        let before = config(&["a"]);
        let skeleton = TabSkeleton::for_position(before.len());
        assert!(merge_card(&before, 5, CardConfig::of_type("x"), &skeleton).is_err());
    }

    #[test]
    fn test_remove_preserves_order() {
        let before = config(&["a", "b", "c", "d"]);
        let after = remove_tab(&before, 1).unwrap();

        let ids: Vec<&str> = after.tab_ids().collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        assert_eq!(before.len(), 4);
    }
}
