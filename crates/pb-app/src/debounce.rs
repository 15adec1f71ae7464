//! Debounced task scheduling

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// Runs only the last of a burst of calls, once `delay` has passed
/// without a newer call.
///
/// A call that has already started running is never interrupted.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task`, superseding anything still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) != ticket {
                trace!("Debounced call {} superseded", ticket);
                return;
            }
            task.await;
        });
    }

    /// Drop whatever is waiting
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_burst_runs_last_call_once() {
        let debouncer = Debouncer::new(Duration::from_millis(30));
        let seen = Arc::new(Mutex::new(Vec::new()));

        for keyword in ["a", "al", "ali"] {
            let seen = Arc::clone(&seen);
            debouncer.call(async move {
                seen.lock().unwrap().push(keyword);
            });
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["ali"]);
    }

    #[tokio::test]
    async fn test_spaced_calls_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let count = Arc::new(AtomicU64::new(0));

        for _ in 0..2 {
            let count = Arc::clone(&count);
            debouncer.call(async move {
                count.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(60)).await;
        }

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        debouncer.call(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
