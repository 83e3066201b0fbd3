// Stage timing
// Wraps a unit of work with `starting` / `completed in` log lines

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::info;

pub fn timed<T>(stage: &str, work: impl FnOnce() -> T) -> T {
    info!(stage, "{} starting", stage);
    let started = Instant::now();
    let out = work();
    log_completion(stage, started.elapsed());
    out
}

pub async fn timed_async<F: Future>(stage: &str, work: F) -> F::Output {
    info!(stage, "{} starting", stage);
    let started = Instant::now();
    let out = work.await;
    log_completion(stage, started.elapsed());
    out
}

fn log_completion(stage: &str, elapsed: Duration) {
    info!(
        stage,
        elapsed_ms = elapsed.as_millis() as u64,
        "{} completed in {:.2}s",
        stage,
        elapsed.as_secs_f64()
    );
}
