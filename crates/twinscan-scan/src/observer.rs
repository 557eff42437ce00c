//! Periodic progress polling.

use std::time::Duration;

use crate::progress::{ProgressHandle, ScanProgress};

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls a running scan at a fixed interval.
///
/// The observer only reads counters; dropping or aborting it has no effect
/// on the scan.
#[derive(Debug, Clone)]
pub struct ProgressObserver {
    handle: ProgressHandle,
    interval: Duration,
}

impl ProgressObserver {
    /// Create an observer with the default one-second interval.
    pub fn new(handle: ProgressHandle) -> Self {
        Self {
            handle,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the polling interval. A zero interval is bumped to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Call `on_tick` with a fresh snapshot every interval until the scan is
    /// done, then return the final snapshot.
    ///
    /// `on_tick` is not called for the final snapshot.
    pub async fn watch<F>(self, mut on_tick: F) -> ScanProgress
    where
        F: FnMut(&ScanProgress),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let snapshot = self.handle.snapshot();
            if snapshot.done {
                tracing::debug!(total_size = snapshot.total_size, "scan finished, observer stopping");
                return snapshot;
            }
            on_tick(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressState;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_watch_returns_final_snapshot() {
        let state = Arc::new(ProgressState::new());
        let observer = ProgressObserver::new(ProgressHandle::new(Arc::clone(&state)))
            .with_interval(Duration::from_millis(5));

        let writer = {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                for _ in 0..5 {
                    state.add_size(100);
                    tokio::time::sleep(Duration::from_millis(3)).await;
                }
                state.mark_done();
            })
        };

        let mut seen = Vec::new();
        let last = observer.watch(|p| seen.push(p.total_size)).await;
        writer.await.unwrap();

        assert!(last.done);
        assert_eq!(last.total_size, 500);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|&size| size <= 500));
    }

    #[tokio::test]
    async fn test_watch_on_finished_scan_skips_ticks() {
        let state = Arc::new(ProgressState::new());
        state.add_size(42);
        state.mark_done();

        let mut ticks = 0;
        let last = ProgressObserver::new(ProgressHandle::new(state))
            .watch(|_| ticks += 1)
            .await;

        assert_eq!(ticks, 0);
        assert_eq!(last.total_size, 42);
    }

    #[test]
    fn test_zero_interval_is_bumped() {
        let observer = ProgressObserver::new(ProgressHandle::new(Arc::new(ProgressState::new())))
            .with_interval(Duration::ZERO);
        assert_eq!(observer.interval(), Duration::from_millis(1));
    }
}
