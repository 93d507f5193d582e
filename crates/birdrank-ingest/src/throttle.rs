//! Delay gate between successive requests to the same service
//!
//! Hotspot enrichment waits at the gate before every target-species query. The actual
//! waiting is done by a [`Delay`] so tests can record pauses instead of sleeping.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Default pause before each target-species query
pub const DEFAULT_PAUSE_SECS: u64 = 3;

/// Something that can wait for a duration
#[async_trait]
pub trait Delay: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Waits on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed pause applied before each request
#[derive(Clone)]
pub struct Throttle {
    pause: Duration,
    delay: Arc<dyn Delay>,
}

impl Throttle {
    pub fn new(pause: Duration, delay: Arc<dyn Delay>) -> Self {
        Self { pause, delay }
    }

    /// Throttle sleeping on the tokio timer
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs), Arc::new(TokioDelay))
    }

    /// Throttle that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Arc::new(TokioDelay))
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Wait before the next request
    pub async fn wait(&self) {
        if self.pause.is_zero() {
            return;
        }
        trace!(pause_ms = self.pause.as_millis() as u64, "Throttling before request");
        self.delay.pause(self.pause).await;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::from_secs(DEFAULT_PAUSE_SECS)
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").field("pause", &self.pause).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDelay {
        pauses: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn pause(&self, duration: Duration) {
            self.pauses.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_wait_delegates_to_delay() {
        let delay = Arc::new(RecordingDelay::default());
        let throttle = Throttle::new(Duration::from_secs(3), delay.clone());

        throttle.wait().await;
        throttle.wait().await;

        assert_eq!(
            *delay.pauses.lock().unwrap(),
            vec![Duration::from_secs(3), Duration::from_secs(3)]
        );
    }

    #[tokio::test]
    async fn test_zero_pause_skips_delay() {
        let delay = Arc::new(RecordingDelay::default());
        let throttle = Throttle::new(Duration::ZERO, delay.clone());

        throttle.wait().await;

        assert!(delay.pauses.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_delay_advances_paused_clock() {
        let throttle = Throttle::from_secs(3);
        let start = tokio::time::Instant::now();

        throttle.wait().await;

        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
