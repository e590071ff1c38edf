//! Editor error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Tab error: {0}")]
    Tab(#[from] tabcard_tabs::TabError),

    #[error("Editor has no configuration yet")]
    NoConfiguration,

    #[error("There are no tabs to remove")]
    EmptyTabList,
}
