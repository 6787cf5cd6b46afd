//! Time source for the monitor loop.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Monotonic time, wall time and sleeping, injectable for tests.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic instant used to measure cycle duration.
    fn now(&self) -> Instant;

    /// Wall-clock time stamped on alerts and `last_updated`.
    fn wall_time(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// The real clock, sleeping on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_sleep_advances_time() {
        let clock = ManualClock::new();
        let start = clock.now();
        let wall_start = clock.wall_time();

        clock.sleep(Duration::from_secs(4)).await;
        clock.advance(Duration::from_millis(500));

        assert_eq!(clock.now() - start, Duration::from_millis(4500));
        assert_eq!(
            (clock.wall_time() - wall_start).num_milliseconds(),
            4500
        );
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(4)]);
    }
}
