use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};

/// Represents an entity responsible for providing the wall clock to the scheduler. Workday math
/// happens in the user's local offset, so the clock hands out offset-aware times. Tests replace it
/// with a simulated clock that advances on every sleep.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<FixedOffset>;

    async fn sleep(&self, duration: Duration);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
