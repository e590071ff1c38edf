//! Tab data structure
//!
//! A tab is a named slot holding one child card's configuration. Identity is
//! the `id`; `label` and `card` may change without affecting it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::TabError;
use crate::Result;

/// Generate a process-unique tab identifier
pub fn generate_tab_id() -> String {
    Uuid::new_v4().to_string()
}

/// Opaque child card configuration.
///
/// The only structure this crate relies on is a string `type` key, which
/// the host uses to pick the card implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardConfig(Value);

impl CardConfig {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Minimal config for a card of the given type
    pub fn of_type(card_type: &str) -> Self {
        Self(serde_json::json!({ "type": card_type }))
    }

    pub fn card_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for CardConfig {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    /// Unique identifier, assigned once by the editor
    pub id: String,
    /// User-visible label, not required to be unique
    pub label: String,
    /// Embedded child card configuration
    pub card: CardConfig,
}

impl Tab {
    pub fn new(id: String, label: String, card: CardConfig) -> Result<Self> {
        if id.is_empty() {
            return Err(TabError::MissingIdentifier);
        }

        Ok(Self { id, label, card })
    }

    /// Promote a draft into a real tab by attaching its card
    pub fn from_skeleton(skeleton: &TabSkeleton, card: CardConfig) -> Self {
        Self {
            id: skeleton.id.clone(),
            label: skeleton.label.clone(),
            card,
        }
    }

    /// Copy of this tab with the patched fields merged in
    pub fn patched(&self, patch: &TabPatch) -> Self {
        Self {
            id: patch.id.clone().unwrap_or_else(|| self.id.clone()),
            label: patch.label.clone().unwrap_or_else(|| self.label.clone()),
            card: self.card.clone(),
        }
    }

    /// Copy of this tab with a replaced card, keeping id and label
    pub fn with_card(&self, card: CardConfig) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            card,
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Draft of a tab that has not been committed to the list yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSkeleton {
    pub id: String,
    pub label: String,
}

impl TabSkeleton {
    /// Fresh skeleton for a tab appended to a list of `len` tabs
    pub fn for_position(len: usize) -> Self {
        Self {
            id: generate_tab_id(),
            label: format!("Tab {}", len + 1),
        }
    }

    /// Apply a label edit. The id of a draft is read-only.
    pub fn apply(&mut self, patch: &TabPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
    }
}

/// Partial edit of the form fields of a tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TabPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: Some(label.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.label.is_none()
    }
}
