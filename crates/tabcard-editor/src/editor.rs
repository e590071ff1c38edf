//! Tab editor
//!
//! Holds the editor's selection, the new-tab skeleton and the current
//! snapshot. Edits go through the merge protocol, are validated, and are
//! then broadcast as `ConfigChanged` to whoever persists them.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use tabcard_tabs::{
    CardConfig, ConfigValidator, Snapshot, StructuralValidator, Tab, TabError, TabPatch,
    TabSkeleton, TabsCardConfig,
};
use tokio::sync::broadcast;

use crate::error::EditorError;
use crate::merge;
use crate::selection::EditSelection;
use crate::Result;

const EVENT_CAPACITY: usize = 64;

/// Toolbar flavour. Both share the same merge behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarVariant {
    /// `1. Lights`, `2. Climate`, ...
    #[default]
    Numbered,
    /// Bare labels
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorOptions {
    pub toolbar: ToolbarVariant,
    /// Offer the GUI/code toggle for the embedded card editor
    pub code_mode_toggle: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            toolbar: ToolbarVariant::Numbered,
            code_mode_toggle: true,
        }
    }
}

/// One edit command
#[derive(Debug, Clone, PartialEq)]
pub enum TabEdit {
    /// Form fields (label, id) of the tab at `index`
    Fields { index: usize, patch: TabPatch },
    /// Child card config; `index == len` commits the skeleton
    Card { index: usize, card: CardConfig },
    /// Remove the tab at `index`
    Remove { index: usize },
    /// Nested card editor switched between GUI and code mode
    GuiMode { gui_mode: bool, available: bool },
}

/// Notification sent after every accepted edit
#[derive(Debug, Clone)]
pub struct ConfigChanged {
    pub config: Snapshot,
    pub revision: u64,
    pub emitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorView {
    /// No configuration has been set yet
    Loading,
    /// "Select a tab to edit or click + to add a new one"
    Empty,
    NewTab {
        index: usize,
        skeleton: TabSkeleton,
    },
    EditTab {
        index: usize,
        tab: Arc<Tab>,
        gui_mode: bool,
        gui_mode_available: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarItemKind {
    Tab(usize),
    AddTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarItem {
    pub kind: ToolbarItemKind,
    pub label: String,
    pub selected: bool,
}

struct EditorState {
    config: Option<Snapshot>,
    selection: EditSelection,
    skeleton: TabSkeleton,
    gui_mode: bool,
    gui_mode_available: bool,
    revision: u64,
}

pub struct TabsCardEditor {
    state: Arc<RwLock<EditorState>>,
    validator: Arc<dyn ConfigValidator>,
    options: EditorOptions,
    events: broadcast::Sender<ConfigChanged>,
}

impl TabsCardEditor {
    pub fn new(options: EditorOptions) -> Self {
        Self::with_validator(options, Arc::new(StructuralValidator))
    }

    pub fn with_validator(options: EditorOptions, validator: Arc<dyn ConfigValidator>) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(RwLock::new(EditorState {
                config: None,
                selection: EditSelection::None,
                skeleton: TabSkeleton::for_position(0),
                gui_mode: true,
                gui_mode_available: true,
                revision: 0,
            })),
            validator,
            options,
            events,
        }
    }

    /// Adopt a configuration from the host. Rejected configs leave the
    /// current one in place.
    pub fn set_config(&self, config: TabsCardConfig) -> Result<()> {
        self.validator.validate(&config)?;

        let mut state = self.state.write();
        let len = config.len();
        state.selection = state.selection.clamp(len);
        if state.config.is_none() {
            state.skeleton = TabSkeleton::for_position(len);
        }
        state.config = Some(Arc::new(config));

        tracing::debug!(tabs = len, "Editor configuration set");
        Ok(())
    }

    /// Same as [`set_config`](Self::set_config) for a raw host value
    pub fn set_config_value(&self, value: Value) -> Result<()> {
        let config = TabsCardConfig::from_value(value, self.validator.as_ref())?;
        self.set_config(config)
    }

    pub fn config(&self) -> Option<Snapshot> {
        self.state.read().config.clone()
    }

    pub fn options(&self) -> EditorOptions {
        self.options
    }

    pub fn selection(&self) -> EditSelection {
        self.state.read().selection
    }

    /// Selection as a raw index: -1 for none, `len` for the new-tab slot
    pub fn edited_index(&self) -> i64 {
        let state = self.state.read();
        state.selection.index(Self::len_of(&state))
    }

    pub fn skeleton(&self) -> TabSkeleton {
        self.state.read().skeleton.clone()
    }

    pub fn gui_mode(&self) -> (bool, bool) {
        let state = self.state.read();
        (state.gui_mode, state.gui_mode_available)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChanged> {
        self.events.subscribe()
    }

    /// Select a tab for editing. Out-of-range requests are ignored.
    ///
    /// Entering the new-tab slot starts a fresh skeleton.
    pub fn select_tab(&self, index: i64) -> bool {
        let mut state = self.state.write();
        let len = Self::len_of(&state);

        let Some(selection) = EditSelection::from_index(index, len) else {
            tracing::debug!(index, len, "Ignoring out-of-range tab selection");
            return false;
        };
        if selection == EditSelection::None {
            tracing::debug!("Ignoring request to clear the selection");
            return false;
        }

        if selection.is_new_tab() {
            state.skeleton = TabSkeleton::for_position(len);
        }
        state.selection = selection;

        tracing::debug!(index, "Selected tab for editing");
        true
    }

    /// Handle a raw `selected-changed` payload (`{"value": n}`)
    pub fn on_selected_changed(&self, detail: &Value) -> bool {
        match detail.get("value").and_then(Value::as_i64) {
            Some(index) => self.select_tab(index),
            None => {
                tracing::debug!(detail = %detail, "Ignoring malformed tab selection");
                false
            }
        }
    }

    /// Apply an edit. Returns the new snapshot, or `None` for edits that
    /// only affect the editor's own display.
    pub fn apply(&self, edit: TabEdit) -> Result<Option<Snapshot>> {
        match edit {
            TabEdit::Fields { index, patch } => self.update_fields(index, &patch),
            TabEdit::Card { index, card } => self.set_card(index, card).map(Some),
            TabEdit::Remove { index } => self.remove_tab(index).map(Some),
            TabEdit::GuiMode {
                gui_mode,
                available,
            } => {
                self.set_gui_mode(gui_mode, available);
                Ok(None)
            }
        }
    }

    /// Merge form fields into the tab at `index`.
    ///
    /// While composing a new tab the skeleton takes the edit instead and
    /// nothing is emitted.
    pub fn update_fields(&self, index: usize, patch: &TabPatch) -> Result<Option<Snapshot>> {
        let mut state = self.state.write();
        let current = state.config.clone().ok_or(EditorError::NoConfiguration)?;

        if index == current.len() {
            state.skeleton.apply(patch);
            return Ok(None);
        }

        let next = merge::merge_fields(&current, index, patch)?;
        let changed = self.commit(&mut state, next)?;
        drop(state);

        self.emit(&changed);
        Ok(Some(changed.config))
    }

    /// Form edit on whatever tab is currently selected
    pub fn update_selected_fields(&self, patch: &TabPatch) -> Result<Option<Snapshot>> {
        let index = {
            let state = self.state.read();
            match state.selection {
                EditSelection::None => return Ok(None),
                EditSelection::Tab(i) => i,
                EditSelection::NewTab => Self::len_of(&state),
            }
        };
        self.update_fields(index, patch)
    }

    /// Attach a child card at `index`; `index == len` appends the skeleton
    pub fn set_card(&self, index: usize, card: CardConfig) -> Result<Snapshot> {
        let mut state = self.state.write();
        let current = state.config.clone().ok_or(EditorError::NoConfiguration)?;
        let appended = index == current.len();

        let next = merge::merge_card(&current, index, card, &state.skeleton)?;
        let changed = self.commit(&mut state, next)?;
        state.selection = EditSelection::Tab(index);
        if appended {
            // The skeleton is now a persisted tab
            state.skeleton = TabSkeleton::for_position(changed.config.len());
        }
        drop(state);

        if appended {
            tracing::info!(index, tab_id = %changed.config.tabs[index].id, "Added tab");
        }
        self.emit(&changed);
        Ok(changed.config)
    }

    pub fn remove_tab(&self, index: usize) -> Result<Snapshot> {
        let mut state = self.state.write();
        let current = state.config.clone().ok_or(EditorError::NoConfiguration)?;
        if current.is_empty() {
            return Err(EditorError::EmptyTabList);
        }

        let removed_id = current
            .tab(index)
            .map(|t| t.id.clone())
            .ok_or(TabError::IndexOutOfRange {
                index,
                len: current.len(),
            })?;

        let next = merge::remove_tab(&current, index)?;
        let len = next.len();
        let changed = self.commit(&mut state, next)?;
        state.selection = EditSelection::None;
        state.skeleton = TabSkeleton::for_position(len);
        drop(state);

        tracing::info!(index, tab_id = %removed_id, "Removed tab");
        self.emit(&changed);
        Ok(changed.config)
    }

    /// Remove whichever tab is selected for editing
    pub fn remove_selected(&self) -> Result<Option<Snapshot>> {
        match self.selection() {
            EditSelection::Tab(index) => self.remove_tab(index).map(Some),
            _ => Ok(None),
        }
    }

    pub fn set_gui_mode(&self, gui_mode: bool, available: bool) {
        if !self.options.code_mode_toggle {
            return;
        }

        let mut state = self.state.write();
        state.gui_mode = gui_mode;
        state.gui_mode_available = available;
    }

    pub fn view(&self) -> EditorView {
        let state = self.state.read();
        let Some(config) = &state.config else {
            return EditorView::Loading;
        };

        match state.selection {
            EditSelection::None => EditorView::Empty,
            EditSelection::NewTab => EditorView::NewTab {
                index: config.len(),
                skeleton: state.skeleton.clone(),
            },
            EditSelection::Tab(index) => match config.tab(index) {
                Some(tab) => EditorView::EditTab {
                    index,
                    tab: Arc::clone(tab),
                    gui_mode: state.gui_mode,
                    gui_mode_available: state.gui_mode_available,
                },
                None => EditorView::Empty,
            },
        }
    }

    /// Toolbar entries: one per tab plus the trailing add entry
    pub fn toolbar(&self) -> Vec<ToolbarItem> {
        let state = self.state.read();
        let tabs = state
            .config
            .as_ref()
            .map(|c| c.tabs.as_slice())
            .unwrap_or_default();

        let mut items: Vec<ToolbarItem> = tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| ToolbarItem {
                kind: ToolbarItemKind::Tab(i),
                label: match self.options.toolbar {
                    ToolbarVariant::Numbered => format!("{}. {}", i + 1, tab.label),
                    ToolbarVariant::Plain => tab.label.clone(),
                },
                selected: state.selection == EditSelection::Tab(i),
            })
            .collect();

        items.push(ToolbarItem {
            kind: ToolbarItemKind::AddTab,
            label: "+".to_string(),
            selected: state.selection.is_new_tab(),
        });

        items
    }

    fn commit(&self, state: &mut EditorState, next: TabsCardConfig) -> Result<ConfigChanged> {
        self.validator.validate(&next)?;

        let config = Arc::new(next);
        state.config = Some(Arc::clone(&config));
        state.revision += 1;

        Ok(ConfigChanged {
            config,
            revision: state.revision,
            emitted_at: Utc::now(),
        })
    }

    fn emit(&self, changed: &ConfigChanged) {
        tracing::debug!(
            revision = changed.revision,
            tabs = changed.config.len(),
            "Configuration changed"
        );
        // No subscribers is fine; the returned snapshot still reaches the caller.
        let _ = self.events.send(changed.clone());
    }

    fn len_of(state: &EditorState) -> usize {
        state.config.as_ref().map_or(0, |c| c.len())
    }
}

impl Clone for TabsCardEditor {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            validator: Arc::clone(&self.validator),
            options: self.options,
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tab(id: &str, label: &str) -> Arc<Tab> {
        Arc::new(Tab {
            id: id.to_string(),
            label: label.to_string(),
            card: CardConfig::of_type("markdown"),
        })
    }

    fn editor_with(tabs: Vec<Arc<Tab>>) -> TabsCardEditor {
        let editor = TabsCardEditor::new(EditorOptions::default());
        editor
            .set_config(TabsCardConfig::stub().with_tabs(tabs))
            .unwrap();
        editor
    }

    #[test]
    fn test_initial_state() {
        let editor = TabsCardEditor::new(EditorOptions::default());
        assert_eq!(editor.view(), EditorView::Loading);
        assert_eq!(editor.edited_index(), -1);
        assert_eq!(editor.skeleton().label, "Tab 1");
    }

    #[test]
    fn test_scenario_add_first_tab() {
        let editor = editor_with(vec![]);
        let mut events = editor.subscribe();

        assert!(editor.select_tab(0));
        let skeleton = editor.skeleton();
        assert_eq!(skeleton.label, "Tab 1");
        assert!(matches!(editor.view(), EditorView::NewTab { index: 0, .. }));

        let snapshot = editor
            .apply(TabEdit::Card {
                index: 0,
                card: CardConfig::new(json!({ "type": "markdown" })),
            })
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.tabs[0].id, skeleton.id);
        assert_eq!(snapshot.tabs[0].label, "Tab 1");
        assert_eq!(snapshot.tabs[0].card.card_type(), Some("markdown"));
        assert_eq!(editor.edited_index(), 0);
        assert_eq!(editor.selection(), EditSelection::Tab(0));

        let event = events.try_recv().unwrap();
        assert!(Arc::ptr_eq(&event.config, &snapshot));
        assert_eq!(event.revision, 1);
    }

    #[test]
    fn test_scenario_remove_selected() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        assert!(editor.select_tab(1));

        let snapshot = editor.apply(TabEdit::Remove { index: 1 }).unwrap().unwrap();

        let ids: Vec<&str> = snapshot.tab_ids().collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(editor.edited_index(), -1);
        assert_eq!(editor.skeleton().label, "Tab 2");
        assert_eq!(editor.view(), EditorView::Empty);
    }

    #[test]
    fn test_remove_regenerates_skeleton_id() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        let before = editor.skeleton().id;
        editor.remove_tab(0).unwrap();
        assert_ne!(editor.skeleton().id, before);
    }

    #[test]
    fn test_remove_from_empty_list() {
        let editor = editor_with(vec![]);
        assert!(matches!(
            editor.remove_tab(0),
            Err(EditorError::EmptyTabList)
        ));
    }

    #[test]
    fn test_field_edit_emits_new_snapshot() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        let before = editor.config().unwrap();
        let mut events = editor.subscribe();

        let after = editor
            .apply(TabEdit::Fields {
                index: 0,
                patch: TabPatch::label("Lights"),
            })
            .unwrap()
            .unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.tabs[0].label, "Lights");
        assert!(Arc::ptr_eq(&after.tabs[1], &before.tabs[1]));
        assert_eq!(before.tabs[0].label, "A");
        assert!(events.try_recv().is_ok());
    }

    #[test]
    fn test_field_edit_on_new_tab_updates_skeleton() {
        let editor = editor_with(vec![tab("a", "A")]);
        let mut events = editor.subscribe();
        editor.select_tab(1);

        let result = editor
            .update_selected_fields(&TabPatch::label("Climate"))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(editor.skeleton().label, "Climate");
        assert_eq!(editor.config().unwrap().len(), 1);
        assert!(events.try_recv().is_err());

        let snapshot = editor.set_card(1, CardConfig::of_type("thermostat")).unwrap();
        assert_eq!(snapshot.tabs[1].label, "Climate");
    }

    #[test]
    fn test_consecutive_appends_get_distinct_ids() {
        let editor = editor_with(vec![]);
        editor.select_tab(0);
        let first = editor.set_card(0, CardConfig::of_type("entities")).unwrap();
        assert_eq!(editor.skeleton().label, "Tab 2");
        assert_ne!(editor.skeleton().id, first.tabs[0].id);

        let second = editor.set_card(1, CardConfig::of_type("gauge")).unwrap();
        assert_eq!(second.len(), 2);
        assert_ne!(second.tabs[0].id, second.tabs[1].id);
        assert_eq!(second.tabs[1].label, "Tab 2");
    }

    #[test]
    fn test_consecutive_appends_with_permissive_validator() {
        let pass_all = |_: &TabsCardConfig| -> tabcard_tabs::Result<()> { Ok(()) };
        let editor = TabsCardEditor::with_validator(EditorOptions::default(), Arc::new(pass_all));
        editor.set_config(TabsCardConfig::stub()).unwrap();

        editor.set_card(0, CardConfig::of_type("entities")).unwrap();
        let snapshot = editor.set_card(1, CardConfig::of_type("gauge")).unwrap();

        let ids: std::collections::HashSet<&str> = snapshot.tab_ids().collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_rejected_edit_keeps_snapshot() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        let before = editor.config().unwrap();
        let mut events = editor.subscribe();

        let result = editor.update_fields(
            1,
            &TabPatch {
                id: Some("a".into()),
                label: None,
            },
        );
        assert!(matches!(
            result,
            Err(EditorError::Tab(TabError::DuplicateId(_)))
        ));
        assert!(Arc::ptr_eq(&before, &editor.config().unwrap()));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_validator_blocks_edit() {
        let validator = |config: &TabsCardConfig| {
            if config.len() > 1 {
                Err(TabError::InvalidConfiguration("one tab only".into()))
            } else {
                Ok(())
            }
        };
        let editor = TabsCardEditor::with_validator(EditorOptions::default(), Arc::new(validator));
        editor
            .set_config(TabsCardConfig::stub().with_tabs(vec![tab("a", "A")]))
            .unwrap();

        editor.select_tab(1);
        assert!(editor.set_card(1, CardConfig::of_type("x")).is_err());
        assert_eq!(editor.config().unwrap().len(), 1);
        assert_eq!(editor.selection(), EditSelection::NewTab);
    }

    #[test]
    fn test_invalid_host_config_rejected() {
        let editor = editor_with(vec![tab("a", "A")]);
        let result = editor.set_config_value(json!({ "type": "custom:standard-tabs-card", "tabs": [{ "id": "x" }] }));
        assert!(result.is_err());
        assert_eq!(editor.config().unwrap().tabs[0].id, "a");
    }

    #[test]
    fn test_select_ignores_out_of_range() {
        let editor = editor_with(vec![tab("a", "A")]);
        assert!(editor.select_tab(0));
        assert!(!editor.select_tab(2));
        assert!(!editor.select_tab(-5));
        assert_eq!(editor.selection(), EditSelection::Tab(0));

        assert!(!editor.on_selected_changed(&json!({ "value": "1" })));
        assert!(!editor.on_selected_changed(&json!({})));
        assert!(editor.on_selected_changed(&json!({ "value": 1 })));
        assert_eq!(editor.selection(), EditSelection::NewTab);
    }

    #[test]
    fn test_entering_new_tab_resets_skeleton() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        editor.select_tab(2);
        let first = editor.skeleton();
        assert_eq!(first.label, "Tab 3");

        editor.select_tab(0);
        editor.select_tab(2);
        assert_ne!(editor.skeleton().id, first.id);
    }

    #[test]
    fn test_card_edit_on_existing_tab() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        let snapshot = editor.set_card(1, CardConfig::of_type("gauge")).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.tabs[1].id, "b");
        assert_eq!(snapshot.tabs[1].card.card_type(), Some("gauge"));
        assert_eq!(editor.edited_index(), 1);
    }

    #[test]
    fn test_gui_mode_is_local() {
        let editor = editor_with(vec![tab("a", "A")]);
        let before = editor.config().unwrap();
        editor.select_tab(0);

        let result = editor
            .apply(TabEdit::GuiMode {
                gui_mode: false,
                available: true,
            })
            .unwrap();
        assert!(result.is_none());
        assert!(Arc::ptr_eq(&before, &editor.config().unwrap()));
        assert!(matches!(
            editor.view(),
            EditorView::EditTab { gui_mode: false, .. }
        ));

        let fixed = TabsCardEditor::new(EditorOptions {
            toolbar: ToolbarVariant::Plain,
            code_mode_toggle: false,
        });
        fixed.set_gui_mode(false, false);
        assert_eq!(fixed.gui_mode(), (true, true));
    }

    #[test]
    fn test_toolbar_variants() {
        let editor = editor_with(vec![tab("a", "Lights"), tab("b", "Climate")]);
        editor.select_tab(1);

        let labels: Vec<String> = editor.toolbar().into_iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["1. Lights", "2. Climate", "+"]);
        assert!(editor.toolbar()[1].selected);

        let plain = TabsCardEditor::new(EditorOptions {
            toolbar: ToolbarVariant::Plain,
            code_mode_toggle: true,
        });
        plain
            .set_config(TabsCardConfig::stub().with_tabs(vec![tab("a", "Lights")]))
            .unwrap();
        let labels: Vec<String> = plain.toolbar().into_iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["Lights", "+"]);
    }

    #[test]
    fn test_external_config_clamps_selection() {
        let editor = editor_with(vec![tab("a", "A"), tab("b", "B")]);
        editor.select_tab(1);
        editor
            .set_config(TabsCardConfig::stub().with_tabs(vec![tab("a", "A")]))
            .unwrap();
        assert_eq!(editor.selection(), EditSelection::None);
    }
}
