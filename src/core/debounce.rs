//! Leading-plus-trailing rate limiting for notifications.
//!
//! [`Debouncer`] wraps a function so that a burst of calls produces at most one
//! immediate invocation plus one trailing invocation carrying the newest arguments.
//! Consecutive invocations are never closer than the configured interval.

use crate::core::error::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;

type DebouncedFn<T> = Box<dyn Fn(T) + Send + Sync>;

pub struct Debouncer<T: Send + 'static> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    func: DebouncedFn<T>,
    interval: Duration,
    alive: AtomicBool,
    runtime: Handle,
    state: Mutex<DebounceState<T>>,
}

struct DebounceState<T> {
    last_invoked: Option<Instant>,
    pending: Option<T>,
    timer_armed: bool,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Wrap `func`, scheduling trailing calls on `runtime`
    pub fn new<F>(interval: Duration, runtime: Handle, func: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                func: Box::new(func),
                interval,
                alive: AtomicBool::new(true),
                runtime,
                state: Mutex::new(DebounceState {
                    last_invoked: None,
                    pending: None,
                    timer_armed: false,
                }),
            }),
        }
    }

    /// Wrap `func` on the current tokio runtime
    pub fn wrap<F>(func: F, interval: Duration) -> Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Ok(Self::new(interval, Handle::try_current()?, func))
    }

    /// Invoke now if no cooldown is active, otherwise record `args` for the
    /// trailing invocation (replacing any older recorded args).
    pub fn call(&self, args: T) {
        if !self.inner.alive.load(Ordering::Acquire) {
            return;
        }

        let now = Instant::now();
        let mut state = self.inner.state.lock();

        if state.timer_armed {
            state.pending = Some(args);
            return;
        }

        let cooling = state
            .last_invoked
            .is_some_and(|at| now.duration_since(at) < self.inner.interval);

        if !cooling {
            state.last_invoked = Some(now);
            drop(state);
            (self.inner.func)(args);
            return;
        }

        state.pending = Some(args);
        state.timer_armed = true;
        drop(state);

        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            tokio::time::sleep(inner.interval).await;
            inner.fire_pending();
        });
    }

    /// Drop any recorded call; nothing fires after this returns
    pub fn cancel(&self) {
        self.inner.alive.store(false, Ordering::Release);
        self.inner.state.lock().pending = None;
    }

    pub fn is_cancelled(&self) -> bool {
        !self.inner.alive.load(Ordering::Acquire)
    }
}

impl<T> Inner<T> {
    fn fire_pending(&self) {
        let mut state = self.state.lock();
        state.timer_armed = false;

        let Some(args) = state.pending.take() else {
            return;
        };
        if !self.alive.load(Ordering::Acquire) {
            return;
        }

        state.last_invoked = Some(Instant::now());
        drop(state);
        (self.func)(args);
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
