//! Tabs card display surface
//!
//! Tracks which tab is shown and makes sure its child widget exists.
//! Widget creation runs in the background; its failures are logged and
//! never reach the render path.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tabcard_editor::TabsCardEditor;
use tabcard_tabs::{ConfigValidator, Layout, Snapshot, StructuralValidator, Tab, TabsCardConfig};
use tabcard_widgets::{FactorySlot, HostContext, RenderSignal, WidgetCache, WidgetHandle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{Config, EvictionPolicy};
use crate::Result;

pub const WARNING_MESSAGE: &str = "Show Warning";
pub const ERROR_MESSAGE: &str = "Show Error";

/// What the host should paint
pub enum RenderData {
    Warning {
        message: String,
    },
    Error {
        message: String,
        config: Snapshot,
    },
    Tabs(TabsView),
}

pub struct TabsView {
    /// Index of the shown tab; 0 with no tab when the list is empty
    pub active_index: usize,
    pub labels: Vec<String>,
    /// Widget of the active tab, if it has been created yet
    pub active_widget: Option<WidgetHandle>,
    pub layout: Option<Layout>,
    pub fill_container: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridOptions {
    pub columns: String,
    pub rows: u32,
}

pub struct TabsCard {
    /// Current configuration snapshot
    config: Arc<RwLock<Snapshot>>,
    /// Tab shown on the display surface
    active_index: Arc<RwLock<usize>>,
    /// Set by the first render; later configurations materialize the
    /// active tab on arrival
    mounted: Arc<AtomicBool>,
    /// Child widgets by tab id
    cache: WidgetCache,
    validator: Arc<dyn ConfigValidator>,
    settings: Config,
    signal: RenderSignal,
}

impl TabsCard {
    pub fn new(factory: FactorySlot, settings: Config) -> Self {
        Self::with_validator(factory, settings, Arc::new(StructuralValidator))
    }

    pub fn with_validator(
        factory: FactorySlot,
        settings: Config,
        validator: Arc<dyn ConfigValidator>,
    ) -> Self {
        let signal = RenderSignal::new();
        let cache = WidgetCache::new(factory, signal.clone())
            .with_poll_interval(settings.poll_interval());

        Self {
            config: Arc::new(RwLock::new(Arc::new(TabsCardConfig::stub()))),
            active_index: Arc::new(RwLock::new(0)),
            mounted: Arc::new(AtomicBool::new(false)),
            cache,
            validator,
            settings,
            signal,
        }
    }

    /// Configuration a freshly added card starts with
    pub fn stub_config() -> TabsCardConfig {
        TabsCardConfig::stub()
    }

    /// Editor for this card type, set up with the same runtime settings
    pub fn config_editor(&self) -> TabsCardEditor {
        TabsCardEditor::with_validator(self.settings.editor_options(), Arc::clone(&self.validator))
    }

    /// Adopt a new configuration. A rejected configuration leaves the
    /// previous one active.
    ///
    /// Once mounted, the tab now at the active index is materialized and
    /// its creation handle returned.
    pub fn set_config(&self, config: TabsCardConfig) -> Result<Option<JoinHandle<()>>> {
        self.validator.validate(&config)?;

        if config.test_gui {
            tracing::info!("Configuration requests edit mode");
        }

        if self.settings.eviction == EvictionPolicy::EvictOnRemoval {
            let keep: HashSet<&str> = config.tab_ids().collect();
            self.cache.retain_ids(&keep);
        }

        let active = {
            let mut active = self.active_index.write();
            if *active >= config.len() {
                *active = 0;
            }
            *active
        };
        let shown = config.tab(active).cloned();

        tracing::debug!(tabs = config.len(), "Card configuration set");
        *self.config.write() = Arc::new(config);
        self.signal.bump();

        if !self.mounted.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(shown.map(|tab| self.spawn_materialize(tab)))
    }

    /// Same as [`set_config`](Self::set_config) for a raw host value
    pub fn set_config_value(&self, value: Value) -> Result<Option<JoinHandle<()>>> {
        let config = TabsCardConfig::from_value(value, self.validator.as_ref())?;
        self.set_config(config)
    }

    pub fn config(&self) -> Snapshot {
        Arc::clone(&self.config.read())
    }

    /// Whether the configuration asked the host to switch to edit mode
    pub fn edit_mode_requested(&self) -> bool {
        self.config.read().test_gui
    }

    /// Store a new host context and push it into every cached widget
    pub fn set_host_context(&self, context: HostContext) {
        self.cache.propagate_context(context);
    }

    pub fn active_index(&self) -> usize {
        *self.active_index.read()
    }

    /// First render: materialize the initially selected tab
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        self.mounted.store(true, Ordering::SeqCst);
        let tab = self.config.read().tab(self.active_index()).cloned()?;
        Some(self.spawn_materialize(tab))
    }

    /// Show the tab at `index` and start creating its widget.
    ///
    /// Out-of-range requests are ignored; the returned handle completes
    /// once the widget exists or its creation failed.
    pub fn activate(&self, index: usize) -> Option<JoinHandle<()>> {
        let tab = {
            let config = self.config.read();
            match config.tab(index) {
                Some(tab) => Arc::clone(tab),
                None => {
                    tracing::debug!(index, len = config.len(), "Ignoring out-of-range tab activation");
                    return None;
                }
            }
        };

        *self.active_index.write() = index;
        self.signal.bump();
        tracing::debug!(index, tab_id = %tab.id, "Activated tab");

        Some(self.spawn_materialize(tab))
    }

    /// Handle a raw tab bar activation payload (`{"index": n}`)
    pub fn on_tab_activated(&self, detail: &Value) -> Option<JoinHandle<()>> {
        let index = detail.get("index").and_then(Value::as_u64);
        match index.and_then(|i| usize::try_from(i).ok()) {
            Some(index) => self.activate(index),
            None => {
                tracing::debug!(detail = %detail, "Ignoring malformed tab activation");
                None
            }
        }
    }

    pub fn render_data(&self) -> RenderData {
        let config = self.config();

        if config.show_warning {
            return RenderData::Warning {
                message: WARNING_MESSAGE.to_string(),
            };
        }

        if config.show_error {
            return RenderData::Error {
                message: ERROR_MESSAGE.to_string(),
                config,
            };
        }

        let active_index = self.active_index();
        let active_widget = config
            .tab(active_index)
            .and_then(|tab| self.cache.get(&tab.id));

        RenderData::Tabs(TabsView {
            active_index,
            labels: config.tabs.iter().map(|t| t.label.clone()).collect(),
            active_widget,
            layout: config.layout,
            fill_container: config.fill_container.unwrap_or(false),
        })
    }

    /// Height in rows: the tab bar plus the active widget (1 if unknown)
    pub async fn card_size(&self) -> u32 {
        let config = self.config();
        let active = config
            .tab(self.active_index())
            .and_then(|tab| self.cache.get(&tab.id));

        let card_size = match active {
            Some(widget) => widget.card_size().await.unwrap_or(1),
            None => 1,
        };

        self.settings.tab_bar_height.saturating_add(card_size)
    }

    pub async fn grid_options(&self) -> GridOptions {
        GridOptions {
            columns: "full".to_string(),
            rows: self.card_size().await,
        }
    }

    /// Revision counter bumped on every render-relevant change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.signal.subscribe()
    }

    pub fn cache(&self) -> &WidgetCache {
        &self.cache
    }

    fn spawn_materialize(&self, tab: Arc<Tab>) -> JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.ensure(&tab).await {
                tracing::error!(tab_id = %tab.id, error = %e, "Failed to prepare card element");
            }
        })
    }
}

impl Clone for TabsCard {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            active_index: Arc::clone(&self.active_index),
            mounted: Arc::clone(&self.mounted),
            cache: self.cache.clone(),
            validator: Arc::clone(&self.validator),
            settings: self.settings.clone(),
            signal: self.signal.clone(),
        }
    }
}
