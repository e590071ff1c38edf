//! Card configuration snapshot

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::TabError;
use crate::tab::Tab;
use crate::validator::ConfigValidator;
use crate::Result;

pub const CARD_TAG_NAME: &str = "standard-tabs-card";
pub const EDITOR_TAG_NAME: &str = "standard-tabs-card-editor";
pub const CARD_TYPE: &str = "custom:standard-tabs-card";
pub const CARD_NAME: &str = "Standard Tabs Card";
pub const CARD_DESCRIPTION: &str = "Use this card to display multiple tabs of different cards.";

/// An emitted configuration. Never mutated after it is handed out, so a
/// host comparing `Arc::ptr_eq` sees every change.
pub type Snapshot = Arc<TabsCardConfig>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Horizontal,
    Vertical,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabsCardConfig {
    /// Card type as registered with the host
    #[serde(rename = "type")]
    pub card_type: String,
    /// Ordered tab list
    #[serde(default)]
    pub tabs: Vec<Arc<Tab>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_container: Option<bool>,
    /// Render a warning instead of the tabs
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_warning: bool,
    /// Render an error instead of the tabs
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_error: bool,
    /// Ask the host to enter edit mode on load
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub test_gui: bool,
    /// Host-owned keys (view_index, grid_options, visibility, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabsCardConfig {
    /// Initial configuration for a freshly added card
    pub fn stub() -> Self {
        Self {
            card_type: CARD_TYPE.to_string(),
            tabs: Vec::new(),
            layout: Some(Layout::Horizontal),
            fill_container: None,
            show_warning: false,
            show_error: false,
            test_gui: false,
            extra: Map::new(),
        }
    }

    /// Deserialize a raw host value and run it through the validator
    pub fn from_value(value: Value, validator: &dyn ConfigValidator) -> Result<Self> {
        if value.is_null() {
            return Err(TabError::InvalidConfiguration(
                "configuration is missing".to_string(),
            ));
        }

        let config: Self = serde_json::from_value(value).map_err(|e| {
            tracing::warn!(error = %e, "Rejected malformed card configuration");
            TabError::InvalidConfiguration(e.to_string())
        })?;

        if let Err(e) = validator.validate(&config) {
            tracing::warn!(error = %e, "Card configuration failed validation");
            return Err(e);
        }

        Ok(config)
    }

    /// Copy of this configuration with a different tab list
    pub fn with_tabs(&self, tabs: Vec<Arc<Tab>>) -> Self {
        Self {
            tabs,
            ..self.clone()
        }
    }

    pub fn tab(&self, index: usize) -> Option<&Arc<Tab>> {
        self.tabs.get(index)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn position(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    pub fn tab_ids(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|t| t.id.as_str())
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Default for TabsCardConfig {
    fn default() -> Self {
        Self::stub()
    }
}
