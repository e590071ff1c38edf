//! Widget error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeferredError {
    #[error("Deferred value rejected: {0}")]
    Rejected(String),

    #[error("Deferred value dropped before it was settled")]
    Dropped,
}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Tab has no id")]
    MissingIdentifier,

    #[error("Failed to create card element for tab {tab_id}")]
    CreationFailed { tab_id: String },

    #[error("Widget factory is not available")]
    FactoryUnavailable,

    #[error("Wait failed: {0}")]
    Deferred(#[from] DeferredError),
}
