//! Standard Tabs Card - Editor
//!
//! Lets a user add, remove, select and configure tabs. Every accepted edit
//! produces a new configuration snapshot and announces it to the host,
//! which alone decides whether to persist it.

mod editor;
mod error;
pub mod merge;
mod selection;

pub use editor::{
    ConfigChanged, EditorOptions, EditorView, TabEdit, TabsCardEditor, ToolbarItem,
    ToolbarItemKind, ToolbarVariant,
};
pub use error::EditorError;
pub use selection::EditSelection;

pub type Result<T> = std::result::Result<T, EditorError>;
