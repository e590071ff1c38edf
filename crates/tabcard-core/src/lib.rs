//! Standard Tabs Card - Core
//!
//! Wires the tab model, the child widget cache and the editor into the
//! card the host mounts. The host supplies the widget factory and the host
//! context; nothing is looked up from ambient state.

mod card;
mod catalog;
mod config;
mod error;

pub use card::{GridOptions, RenderData, TabsCard, TabsView, ERROR_MESSAGE, WARNING_MESSAGE};
pub use catalog::{print_version, register_card, CardCatalog, CatalogEntry, CARD_VERSION};
pub use config::{Config, EvictionPolicy};
pub use error::CoreError;

// Re-export core components
pub use tabcard_editor::{
    ConfigChanged, EditSelection, EditorError, EditorOptions, EditorView, TabEdit,
    TabsCardEditor, ToolbarItem, ToolbarItemKind, ToolbarVariant,
};
pub use tabcard_tabs::{
    generate_tab_id, CardConfig, ConfigValidator, Layout, Snapshot, StructuralValidator, Tab,
    TabError, TabPatch, TabSkeleton, TabsCardConfig,
};
pub use tabcard_widgets::{
    ChildWidget, FactorySlot, HostContext, RenderSignal, WidgetCache, WidgetError, WidgetFactory,
    WidgetHandle,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A host may already have installed a subscriber.
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
