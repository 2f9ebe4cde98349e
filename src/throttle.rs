//! Throttled execution of deferred writes.
//!
//! [`Throttle`] coalesces a burst of requests into one action: each
//! [`Throttle::queue`] call replaces whatever is pending and restarts the
//! delay, so only the last action of a burst runs, once, after the caller has
//! been quiet for the configured delay.
//!
//! A failing action is logged and dropped; it never takes the timer down.
//! [`Throttle::flush`] runs the pending action immediately and hands its
//! result back, which is how callers persist state on shutdown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Action = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

struct Pending {
    action: Action,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    // Bumped on every queue/cancel/flush so a timer that lost a race with a
    // newer request never runs that request early.
    generation: u64,
    pending: Option<Pending>,
}

/// Debounces deferred actions to at most one run per settled window.
///
/// Must be used from within a tokio runtime. Dropping a `Throttle` with an
/// action pending does not cancel it; call [`Throttle::flush`] or
/// [`Throttle::cancel`] first if the outcome matters.
pub struct Throttle {
    delay: Duration,
    slot: Arc<Mutex<Slot>>,
    // Held while an action runs so flush can wait out an in-flight timer.
    running: Arc<tokio::sync::Mutex<()>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Arc::new(Mutex::new(Slot::default())),
            running: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Schedule `action` to run after the delay, superseding any pending one.
    pub fn queue<F>(&self, action: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.pending.take() {
            previous.timer.abort();
            debug!("Superseded pending deferred action");
        }
        slot.generation += 1;

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let running = Arc::clone(&self.running);
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _running = running.lock().await;
            let pending = {
                let mut slot = lock(&shared);
                if slot.generation == generation {
                    slot.pending.take()
                } else {
                    None
                }
            };
            if let Some(pending) = pending
                && let Err(e) = (pending.action)()
            {
                warn!("Deferred action failed: {:#}", e);
            }
        });

        slot.pending = Some(Pending {
            action: Box::new(action),
            timer,
        });
    }

    /// Whether an action is waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }

    /// Drop the pending action without running it.
    ///
    /// Returns `true` if there was one.
    pub fn cancel(&self) -> bool {
        match self.take_pending() {
            Some(pending) => {
                pending.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Run the pending action now and return its result.
    ///
    /// Waits for an action already being run by the timer to finish first.
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn flush(&self) -> anyhow::Result<bool> {
        let _running = self.running.lock().await;
        match self.take_pending() {
            Some(pending) => {
                pending.timer.abort();
                (pending.action)()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn take_pending(&self) -> Option<Pending> {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        slot.pending.take()
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use tokio::time::sleep;

    const DELAY: Duration = Duration::from_millis(500);

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Action) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let make = move |n: u32| {
            let log = Arc::clone(&log_clone);
            Box::new(move || {
                log.lock().unwrap().push(n);
                Ok(())
            }) as Action
        };
        (log, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_action_in_window_runs_once() {
        let throttle = Throttle::new(DELAY);
        let (log, make) = recorder();

        for n in 1..=5 {
            throttle.queue(make(n));
            sleep(Duration::from_millis(100)).await;
        }
        assert!(log.lock().unwrap().is_empty());

        sleep(DELAY * 2).await;
        assert_eq!(*log.lock().unwrap(), vec![5]);
        assert!(!throttle.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_settled_window_runs_its_last_action() {
        let throttle = Throttle::new(DELAY);
        let (log, make) = recorder();

        throttle.queue(make(1));
        throttle.queue(make(2));
        sleep(DELAY + Duration::from_millis(10)).await;
        throttle.queue(make(3));
        sleep(DELAY + Duration::from_millis(10)).await;

        assert_eq!(*log.lock().unwrap(), vec![2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_restarts_delay() {
        let throttle = Throttle::new(DELAY);
        let (log, make) = recorder();

        throttle.queue(make(1));
        sleep(Duration::from_millis(400)).await;
        throttle.queue(make(2));
        sleep(Duration::from_millis(400)).await;
        // 800ms since the first request, 400ms since the last.
        assert!(log.lock().unwrap().is_empty());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(*log.lock().unwrap(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_action_does_not_stop_later_ones() {
        let throttle = Throttle::new(DELAY);
        let (log, make) = recorder();

        throttle.queue(|| Err(anyhow!("disk full")));
        sleep(DELAY * 2).await;
        throttle.queue(make(7));
        sleep(DELAY * 2).await;

        assert_eq!(*log.lock().unwrap(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_action() {
        let throttle = Throttle::new(DELAY);
        let (log, make) = recorder();

        throttle.queue(make(1));
        assert!(throttle.is_pending());
        assert!(throttle.cancel());
        assert!(!throttle.cancel());

        sleep(DELAY * 2).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_runs_immediately_and_only_once() {
        let throttle = Throttle::new(DELAY);
        let (log, make) = recorder();

        throttle.queue(make(1));
        throttle.queue(make(2));
        assert!(throttle.flush().await.unwrap());
        assert_eq!(*log.lock().unwrap(), vec![2]);

        sleep(DELAY * 2).await;
        assert_eq!(*log.lock().unwrap(), vec![2]);
        assert!(!throttle.flush().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_returns_action_error() {
        let throttle = Throttle::new(DELAY);
        throttle.queue(|| Err(anyhow!("read-only filesystem")));
        let err = throttle.flush().await.unwrap_err();
        assert!(err.to_string().contains("read-only"));
        assert!(!throttle.is_pending());
    }
}
