//! Production clock backed by the tokio timer.

use std::time::Duration;

use crate::application::ports::Clock;

/// Real wall-clock sleeps. Tests substitute an instant clock.
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
