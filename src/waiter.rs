//! Polling a remote operation until it finishes

use crate::api::{Operation, ResourceApi};
use crate::error::{ReleaseError, Result};
use std::cell::Cell;
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Time source for the waiter
pub trait Clock {
    /// Time since the clock was created
    fn elapsed(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [Instant] and [std::thread::sleep]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock: sleeping advances time instantly
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: Cell<usize>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sleeps taken so far
    pub fn sleeps(&self) -> usize {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
        self.sleeps.set(self.sleeps.get() + 1);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

/// Polls an operation at a fixed interval until it is done
pub struct OperationWaiter<A: ResourceApi, C: Clock> {
    api: A,
    clock: C,
    options: WaitOptions,
}

impl<A: ResourceApi, C: Clock> OperationWaiter<A, C> {
    pub fn new(api: A, clock: C, options: WaitOptions) -> Self {
        OperationWaiter {
            api,
            clock,
            options,
        }
    }

    pub fn options(&self) -> WaitOptions {
        self.options
    }

    /// Wait for `operation` to finish.
    ///
    /// A finished operation carrying an error fails with its message
    /// unchanged. Poll failures abort the wait. The operation is checked
    /// before the first sleep, so an already-finished operation returns
    /// without polling.
    pub fn wait(&self, operation: Operation) -> Result<Operation> {
        let started = self.clock.elapsed();
        let mut current = operation;

        loop {
            if let Some(outcome) = current.outcome() {
                return outcome.map(|_| current);
            }

            if let Some(timeout) = self.options.timeout {
                if self.clock.elapsed().saturating_sub(started) >= timeout {
                    return Err(ReleaseError::Timeout(format!(
                        "operation {} did not finish within {}s",
                        current.name,
                        timeout.as_secs()
                    )));
                }
            }

            log::debug!(
                "Operation {} still running, checking again in {}s",
                current.name,
                self.options.poll_interval.as_secs()
            );
            self.clock.sleep(self.options.poll_interval);
            current = self.api.get_operation(&current.name)?;
        }
    }
}
