use std::cell::Cell;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::waiter::Clock;

const TICK: Duration = Duration::from_millis(120);

/// Clock that shows a spinner while the waiter sleeps between polls.
///
/// The spinner starts on the first sleep, so an operation that is already
/// finished never draws one. The time it shows counts from that first
/// sleep, not from when the clock was created. It is cleared when the
/// clock is dropped.
pub struct SpinnerClock<C: Clock> {
    inner: C,
    bar: ProgressBar,
    message: String,
    since: Cell<Option<Duration>>,
}

impl<C: Clock> SpinnerClock<C> {
    pub fn new(inner: C, message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        SpinnerClock {
            inner,
            bar,
            message: message.into(),
            since: Cell::new(None),
        }
    }

    /// Time spent waiting since the spinner started
    fn waited(&self) -> Duration {
        let now = self.inner.elapsed();
        match self.since.get() {
            Some(since) => now.saturating_sub(since),
            None => {
                self.since.set(Some(now));
                Duration::ZERO
            }
        }
    }
}

impl<C: Clock> Clock for SpinnerClock<C> {
    fn elapsed(&self) -> Duration {
        self.inner.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if self.since.get().is_none() {
            self.bar.enable_steady_tick(TICK);
        }
        self.bar
            .set_message(format!("{} ({}s)", self.message, self.waited().as_secs()));
        self.inner.sleep(duration);
    }
}

impl<C: Clock> Drop for SpinnerClock<C> {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
