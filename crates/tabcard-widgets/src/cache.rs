//! Child widget cache
//!
//! One widget per tab id, created on first use and reused afterwards.
//! Concurrent `ensure` calls for the same id share a single creation.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, OnceCell};

use tabcard_tabs::Tab;

use crate::error::WidgetError;
use crate::factory::{FactorySlot, HostContext, WidgetHandle};
use crate::readiness::DEFAULT_POLL_INTERVAL;
use crate::Result;

/// Monotonic counter bumped whenever render-relevant state changes
#[derive(Clone)]
pub struct RenderSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl RenderSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn bump(&self) {
        self.tx.send_modify(|revision| *revision += 1);
    }

    pub fn revision(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for RenderSignal {
    fn default() -> Self {
        Self::new()
    }
}

type Slot = Arc<OnceCell<WidgetHandle>>;

pub struct WidgetCache {
    /// Creation slots keyed by tab id; an empty cell is in flight or failed
    entries: Arc<RwLock<HashMap<String, Slot>>>,
    /// Host factory, possibly not loaded yet
    factory: FactorySlot,
    /// Context handed to every widget
    context: Arc<RwLock<HostContext>>,
    signal: RenderSignal,
    poll_interval: Duration,
}

impl WidgetCache {
    pub fn new(factory: FactorySlot, signal: RenderSignal) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            factory,
            context: Arc::new(RwLock::new(HostContext::default())),
            signal,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Make sure a widget exists for `tab`, creating it if needed.
    ///
    /// Suspends until the factory is available. A second call for the same
    /// id while the first is in flight waits for that creation instead of
    /// starting another one.
    pub async fn ensure(&self, tab: &Tab) -> Result<()> {
        if self.get(&tab.id).is_some() {
            return Ok(());
        }

        self.factory.wait_ready(self.poll_interval).await?;

        if !tab.has_id() {
            return Err(WidgetError::MissingIdentifier);
        }

        let slot = self.slot(&tab.id);
        let mut created = false;
        let created_here = &mut created;
        slot.get_or_try_init(|| async move {
            let widget = self.create(tab).await?;
            *created_here = true;
            Ok::<_, WidgetError>(widget)
        })
        .await?;

        if created {
            tracing::info!(tab_id = %tab.id, card_type = ?tab.card.card_type(), "Created card element");
            self.signal.bump();
        }

        Ok(())
    }

    /// Cached widget for `tab_id`. Never creates.
    pub fn get(&self, tab_id: &str) -> Option<WidgetHandle> {
        self.entries
            .read()
            .get(tab_id)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.get(tab_id).is_some()
    }

    /// Number of created widgets
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assign a new host context to every cached widget, active or not
    pub fn propagate_context(&self, context: HostContext) {
        *self.context.write() = context.clone();

        let widgets: Vec<WidgetHandle> = self
            .entries
            .read()
            .values()
            .filter_map(|slot| slot.get().cloned())
            .collect();

        for widget in &widgets {
            widget.set_host_context(context.clone());
        }

        tracing::debug!(widgets = widgets.len(), "Propagated host context");
    }

    pub fn host_context(&self) -> HostContext {
        self.context.read().clone()
    }

    /// Drop every entry whose id is not in `keep`
    pub fn retain_ids(&self, keep: &HashSet<&str>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|id, _| keep.contains(id.as_str()));
        let evicted = before - entries.len();

        if evicted > 0 {
            tracing::debug!(evicted, "Evicted card elements of removed tabs");
        }

        evicted
    }

    pub fn factory(&self) -> &FactorySlot {
        &self.factory
    }

    pub fn signal(&self) -> &RenderSignal {
        &self.signal
    }

    fn slot(&self, tab_id: &str) -> Slot {
        if let Some(slot) = self.entries.read().get(tab_id) {
            return Arc::clone(slot);
        }

        let mut entries = self.entries.write();
        Arc::clone(entries.entry(tab_id.to_string()).or_default())
    }

    async fn create(&self, tab: &Tab) -> Result<WidgetHandle> {
        let factory = self.factory.get().ok_or(WidgetError::FactoryUnavailable)?;

        let widget = factory
            .create_widget(&tab.card)
            .await
            .ok_or_else(|| WidgetError::CreationFailed {
                tab_id: tab.id.clone(),
            })?;

        widget.set_host_context(self.context.read().clone());
        Ok(widget)
    }
}

impl Clone for WidgetCache {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            factory: self.factory.clone(),
            context: Arc::clone(&self.context),
            signal: self.signal.clone(),
            poll_interval: self.poll_interval,
        }
    }
}
