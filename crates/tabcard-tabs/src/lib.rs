//! Standard Tabs Card - Tab Model
//!
//! A tabbed card is described by one immutable configuration snapshot.
//! The snapshot owns an ordered tab list; order defines display order and
//! the mapping from a numeric selected index to a tab.

mod config;
mod error;
mod tab;
mod validator;

pub use config::{
    Layout, Snapshot, TabsCardConfig, CARD_DESCRIPTION, CARD_NAME, CARD_TAG_NAME, CARD_TYPE,
    EDITOR_TAG_NAME,
};
pub use error::TabError;
pub use tab::{generate_tab_id, CardConfig, Tab, TabPatch, TabSkeleton};
pub use validator::{ConfigValidator, StructuralValidator};

pub type Result<T> = std::result::Result<T, TabError>;
