//! Card catalog registration and version banner

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tabcard_tabs::{CARD_DESCRIPTION, CARD_NAME, CARD_TAG_NAME};

pub const CARD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One entry of the host's custom card list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub card_type: String,
    pub name: String,
    pub description: String,
    pub preview: bool,
}

/// Host-maintained list of available cards
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    entries: Arc<RwLock<Vec<CatalogEntry>>>,
}

impl CardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a type that is already listed is left alone
    pub fn register(&self, entry: CatalogEntry) -> bool {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.card_type == entry.card_type) {
            return false;
        }
        entries.push(entry);
        true
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.read().clone()
    }

    pub fn contains(&self, card_type: &str) -> bool {
        self.entries.read().iter().any(|e| e.card_type == card_type)
    }
}

/// Announce the tabs card to the host catalog
pub fn register_card(catalog: &CardCatalog) {
    let added = catalog.register(CatalogEntry {
        card_type: CARD_TAG_NAME.to_string(),
        name: CARD_NAME.to_string(),
        description: CARD_DESCRIPTION.to_string(),
        preview: true,
    });

    if added {
        tracing::debug!(card_type = CARD_TAG_NAME, "Registered card");
    }
}

pub fn print_version() {
    tracing::info!(card = CARD_NAME, version = CARD_VERSION, "Card loaded");
}
