//! Readiness waiter
//!
//! Polls a getter on a fixed period until a predicate holds. There is no
//! timeout: callers must not assume bounded latency.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::deferred::{deferred, Promise};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest period the poller will run at
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Resolve once `is_ready(getter())` holds, polling every 100ms
pub fn wait_until<T, G, P>(getter: G, is_ready: P) -> Promise<()>
where
    G: FnMut() -> T + Send + 'static,
    P: FnMut(&T) -> bool + Send + 'static,
{
    wait_until_every(DEFAULT_POLL_INTERVAL, getter, is_ready)
}

/// Same as [`wait_until`] with an explicit polling period.
///
/// If the predicate already holds the promise is settled before this
/// returns and no timer is started. Otherwise a polling task is spawned on
/// the current tokio runtime; it stops on success or when the promise is
/// dropped. Periods below [`MIN_POLL_INTERVAL`] are raised to it.
pub fn wait_until_every<T, G, P>(period: Duration, mut getter: G, mut is_ready: P) -> Promise<()>
where
    G: FnMut() -> T + Send + 'static,
    P: FnMut(&T) -> bool + Send + 'static,
{
    let (resolver, promise) = deferred();

    let ready = is_ready(&getter());
    if ready {
        resolver.resolve(());
        return promise;
    }

    let period = period.max(MIN_POLL_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if resolver.is_abandoned() {
                tracing::trace!("Readiness wait abandoned");
                return;
            }

            let ready = is_ready(&getter());
            if ready {
                resolver.resolve(());
                return;
            }
        }
    });

    promise
}
