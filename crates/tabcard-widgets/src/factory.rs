//! Host collaborators: the widget factory and the host context

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tabcard_tabs::CardConfig;

use crate::deferred::Promise;
use crate::readiness::wait_until_every;

/// Opaque environment data owned by the host.
///
/// Every assignment is a new value; children only ever read it.
#[derive(Debug, Clone)]
pub struct HostContext(Arc<Value>);

impl HostContext {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// True if both handles come from the same assignment
    pub fn same_as(&self, other: &HostContext) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

/// An instantiated child card
#[async_trait]
pub trait ChildWidget: Send + Sync {
    /// Replace the host context the widget renders against
    fn set_host_context(&self, context: HostContext);

    /// Height in grid rows, if the widget knows it
    async fn card_size(&self) -> Option<u32> {
        None
    }
}

pub type WidgetHandle = Arc<dyn ChildWidget>;

/// Host-provided card factory
#[async_trait]
pub trait WidgetFactory: Send + Sync {
    /// Build a widget for `config`, or `None` if the host could not
    async fn create_widget(&self, config: &CardConfig) -> Option<WidgetHandle>;
}

/// Holder for a factory that arrives some time after mount
#[derive(Clone, Default)]
pub struct FactorySlot {
    factory: Arc<RwLock<Option<Arc<dyn WidgetFactory>>>>,
}

impl FactorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that is ready from the start
    pub fn ready(factory: Arc<dyn WidgetFactory>) -> Self {
        let slot = Self::new();
        slot.install(factory);
        slot
    }

    pub fn install(&self, factory: Arc<dyn WidgetFactory>) {
        *self.factory.write() = Some(factory);
        tracing::info!("Widget factory installed");
    }

    /// Install whatever `loader` produces once it completes
    pub fn load_with<F>(&self, loader: F)
    where
        F: Future<Output = Arc<dyn WidgetFactory>> + Send + 'static,
    {
        let slot = self.clone();
        tokio::spawn(async move {
            let factory = loader.await;
            slot.install(factory);
        });
    }

    pub fn get(&self) -> Option<Arc<dyn WidgetFactory>> {
        self.factory.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.factory.read().is_some()
    }

    /// Resolves once a factory has been installed
    pub fn wait_ready(&self, period: Duration) -> Promise<()> {
        let slot = self.clone();
        wait_until_every(period, move || slot.is_ready(), |ready| *ready)
    }
}

impl std::fmt::Debug for FactorySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactorySlot")
            .field("ready", &self.is_ready())
            .finish()
    }
}
