use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Spaces request starts at least `interval` apart across every caller.
///
/// Each caller reserves the next free slot under the lock and sleeps outside
/// it, so concurrent workers queue up instead of bursting.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next_start: Mutex<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_start: Mutex::new(Instant::now()),
        }
    }

    pub async fn wait(&self) {
        let slot = {
            let mut next_start = self.next_start.lock().await;
            let slot = (*next_start).max(Instant::now());
            *next_start = slot + self.interval;
            slot
        };
        sleep_until(slot).await;
    }
}
