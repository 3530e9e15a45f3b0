// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Timing of tier calls.

use std::time::Duration;

use tick::Clock;
use tick::runtime::InactiveClock;

/// Result of a timed async operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimedResult<R> {
    /// The result of the operation.
    pub result: R,
    /// The duration of the operation.
    pub duration: Duration,
}

/// Extension trait for timing async operations.
pub(crate) trait ClockExt {
    /// Awaits `future` and returns both its output and the elapsed duration.
    fn timed_async<F>(&self, future: F) -> impl Future<Output = TimedResult<F::Output>> + Send
    where
        F: Future + Send,
        F::Output: Send;
}

impl ClockExt for Clock {
    async fn timed_async<F>(&self, future: F) -> TimedResult<F::Output>
    where
        F: Future + Send,
        F::Output: Send,
    {
        let start = self.instant();
        let result = future.await;
        TimedResult {
            result,
            duration: self.instant().saturating_duration_since(start),
        }
    }
}

/// Clock reading the system's monotonic time.
///
/// Only instants are read from it, so the timer driver is not kept.
pub(crate) fn system_clock() -> Clock {
    InactiveClock::default().activate().0
}
