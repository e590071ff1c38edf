//! Deferred value
//!
//! A future whose outcome is decided from the outside through a
//! [`Resolver`]. Dropping the resolver without settling fails the promise.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::DeferredError;

/// Create a linked resolver/promise pair
pub fn deferred<T>() -> (Resolver<T>, Promise<T>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx }, Promise { rx })
}

#[derive(Debug)]
pub struct Resolver<T> {
    tx: oneshot::Sender<Result<T, DeferredError>>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        // The promise may already be gone; nobody is left to tell.
        let _ = self.tx.send(Ok(value));
    }

    pub fn reject(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(DeferredError::Rejected(reason.into())));
    }

    /// True once the promise side has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
#[must_use = "a promise does nothing unless awaited"]
pub struct Promise<T> {
    rx: oneshot::Receiver<Result<T, DeferredError>>,
}

impl<T> Future for Promise<T> {
    type Output = Result<T, DeferredError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(DeferredError::Dropped)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve() {
        let (resolver, promise) = deferred();
        resolver.resolve(7);
        assert_eq!(promise.await, Ok(7));
    }

    #[tokio::test]
    async fn test_reject() {
        let (resolver, promise) = deferred::<()>();
        resolver.reject("no helpers");
        assert_eq!(
            promise.await,
            Err(DeferredError::Rejected("no helpers".to_string()))
        );
    }

    #[tokio::test]
    async fn test_dropped_resolver() {
        let (resolver, promise) = deferred::<u32>();
        drop(resolver);
        assert_eq!(promise.await, Err(DeferredError::Dropped));
    }

    #[tokio::test]
    async fn test_resolved_from_another_task() {
        let (resolver, promise) = deferred();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            resolver.resolve("ready");
        });
        assert_eq!(promise.await, Ok("ready"));
    }

    #[test]
    fn test_abandoned() {
        let (resolver, promise) = deferred::<()>();
        assert!(!resolver.is_abandoned());
        drop(promise);
        assert!(resolver.is_abandoned());
    }
}
