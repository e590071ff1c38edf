//! Standard Tabs Card - Child Widgets
//!
//! Child cards are created lazily, once per tab id, by a factory the host
//! hands over some time after mount. Creation failures stay local to the
//! tab that triggered them.

mod cache;
mod deferred;
mod error;
mod factory;
mod readiness;

pub use cache::{RenderSignal, WidgetCache};
pub use deferred::{deferred, Promise, Resolver};
pub use error::{DeferredError, WidgetError};
pub use factory::{ChildWidget, FactorySlot, HostContext, WidgetFactory, WidgetHandle};
pub use readiness::{wait_until, wait_until_every, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};

pub type Result<T> = std::result::Result<T, WidgetError>;
