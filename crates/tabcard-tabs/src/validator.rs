//! Configuration validation
//!
//! A validator is a pass/fail gate. A configuration that fails is never
//! adopted; the caller keeps whatever it had before.

use std::collections::HashSet;

use crate::config::TabsCardConfig;
use crate::error::TabError;
use crate::Result;

pub trait ConfigValidator: Send + Sync {
    fn validate(&self, config: &TabsCardConfig) -> Result<()>;
}

/// Checks the invariants the card relies on: a card type, non-empty and
/// unique tab ids, and a typed child card in every tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl ConfigValidator for StructuralValidator {
    fn validate(&self, config: &TabsCardConfig) -> Result<()> {
        if config.card_type.trim().is_empty() {
            return Err(TabError::InvalidConfiguration(
                "card type cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, tab) in config.tabs.iter().enumerate() {
            if !tab.has_id() {
                return Err(TabError::InvalidConfiguration(format!(
                    "tab {} has no id",
                    index
                )));
            }
            if !seen.insert(tab.id.as_str()) {
                return Err(TabError::DuplicateId(tab.id.clone()));
            }
            if !tab.card.as_value().is_object() || tab.card.card_type().is_none() {
                return Err(TabError::InvalidConfiguration(format!(
                    "tab {} card must be an object with a string type",
                    tab.id
                )));
            }
        }

        Ok(())
    }
}

impl<F> ConfigValidator for F
where
    F: Fn(&TabsCardConfig) -> Result<()> + Send + Sync,
{
    fn validate(&self, config: &TabsCardConfig) -> Result<()> {
        self(config)
    }
}
