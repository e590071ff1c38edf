//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use tabcard_editor::{EditorOptions, ToolbarVariant};

use crate::error::CoreError;
use crate::Result;

/// What happens to cached widgets of tabs that leave the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Keep them until the card is dropped; they just become unreachable
    #[default]
    RetainForSession,
    /// Drop them when a configuration without their tab is set
    EvictOnRemoval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How often to check whether the widget factory has arrived
    pub factory_poll_interval_ms: u64,
    pub eviction: EvictionPolicy,
    /// Editor toolbar flavour
    pub toolbar: ToolbarVariant,
    /// Offer the GUI/code toggle in the editor
    pub code_mode_toggle: bool,
    /// Rows taken by the tab bar when sizing the card
    pub tab_bar_height: u32,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.factory_poll_interval_ms == 0 {
            return Err(CoreError::Config(
                "factory_poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.factory_poll_interval_ms)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            toolbar: self.toolbar,
            code_mode_toggle: self.code_mode_toggle,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            factory_poll_interval_ms: 100,
            eviction: EvictionPolicy::RetainForSession,
            toolbar: ToolbarVariant::Numbered,
            code_mode_toggle: true,
            tab_bar_height: 2,
        }
    }
}
