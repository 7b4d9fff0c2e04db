//! # Timing Utilities
//!
//! Debounce and throttle on the tokio clock. Both are cheap to share behind an
//! `Arc` and are safe to call from any task on the runtime.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Boxed future returned by debounced callbacks
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type Callback<A> = Arc<dyn Fn(A) -> BoxFuture + Send + Sync>;

/// Runs a callback once after `wait` has passed without another call.
///
/// Each call restarts the wait, and the callback receives the arguments of the
/// last call. Once the callback has started, later calls no longer affect it.
pub struct Debouncer<A> {
    wait: Duration,
    callback: Callback<A>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F, Fut>(wait: Duration, callback: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            wait,
            callback: Arc::new(move |args| Box::pin(callback(args)) as BoxFuture),
            pending: Mutex::new(None),
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn call(&self, args: A) {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("debounced call outside a tokio runtime dropped");
            return;
        };
        let callback = self.callback.clone();
        let wait = self.wait;
        let task = handle.spawn(async move {
            tokio::time::sleep(wait).await;
            tokio::spawn(callback(args));
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }

    /// Drop a pending call without running it
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
        }
    }

    /// Whether a call is still waiting out its quiet period
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }
}

/// Lets a call through immediately, then ignores calls for `limit`
pub struct Throttle {
    limit: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            last: Mutex::new(None),
        }
    }

    /// Claim the slot if the previous call is at least `limit` ago
    pub fn try_acquire(&self) -> bool {
        let Ok(mut last) = self.last.lock() else {
            return false;
        };
        let now = Instant::now();
        match *last {
            Some(at) if now.duration_since(at) < self.limit => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Run `f` unless throttled
    pub fn call<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.try_acquire().then(f)
    }
}
