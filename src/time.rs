//! Time abstraction for testability.
//!
//! The job poller waits between status queries through a [`Sleeper`], so
//! tests can observe the delay schedule without actually waiting.

use std::future::Future;
use std::time::Duration;

/// Abstraction over asynchronous delays.
///
/// # Example
///
/// ```
/// use task_sync::time::{InstantSleeper, Sleeper};
/// use std::time::Duration;
///
/// # async fn example() {
/// // Returns immediately regardless of the requested duration.
/// InstantSleeper.sleep(Duration::from_secs(3)).await;
/// # }
/// ```
pub trait Sleeper: Send + Sync {
    /// Waits for (at least) the given duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately.
///
/// Useful in tests that only care about the sequence of polls.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
