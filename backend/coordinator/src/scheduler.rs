//! Polling scheduler: one read cycle per interval tick, run to completion.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::cycle::Coordinator;

/// Drives scheduled reads. Exactly one scheduled cycle runs at a time; a
/// tick missed while a cycle is still in flight is delayed, not bursted.
/// Manual triggers bypass this loop entirely via `Coordinator::read_now`.
pub struct PollScheduler {
    coordinator: Arc<Coordinator>,
    interval: Duration,
}

impl PollScheduler {
    pub fn new(coordinator: Arc<Coordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Run until the shutdown signal flips. The first tick fires
    /// immediately, giving a reading right after startup.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(interval_secs = self.interval.as_secs(), "Poll scheduler started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = self.coordinator.read_now().await;
                    info!(status = result.status.as_str(), "Scheduled read finished");
                }
                _ = shutdown.changed() => {
                    info!("Poll scheduler shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{MeterInfo, StatePublisher};
    use async_trait::async_trait;
    use meterwatch_core::{ImageSource, MeterError, VisionReader};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCamera {
        captures: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ImageSource for CountingCamera {
        fn name(&self) -> &str {
            "meter_cam"
        }
        async fn get_image(&self) -> Result<Vec<u8>, MeterError> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            Ok(b"jpeg".to_vec())
        }
    }

    struct FixedVision;

    #[async_trait]
    impl VisionReader for FixedVision {
        async fn read_value(&self, _image: &[u8], _prompt: &str) -> Result<f64, MeterError> {
            Ok(87.18)
        }
    }

    fn coordinator(captures: Arc<AtomicUsize>) -> Arc<Coordinator> {
        Arc::new(Coordinator::new(
            Arc::new(CountingCamera { captures }),
            None,
            Arc::new(FixedVision),
            "p",
            Duration::from_secs(1),
            Arc::new(StatePublisher::new(
                MeterInfo {
                    camera: "meter_cam".into(),
                    led: None,
                    led_delay_seconds: 1,
                    poll_interval_seconds: 300,
                },
                None,
            )),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate_and_interval_spaced_after() {
        let captures = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(coordinator(Arc::clone(&captures)), Duration::from_secs(300));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

        tokio::task::yield_now().await;
        assert_eq!(captures.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(299)).await;
        tokio::task::yield_now().await;
        assert_eq!(captures.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(captures.load(Ordering::SeqCst), 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_signal_stops_the_loop() {
        let captures = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(coordinator(captures), Duration::from_secs(300));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });
        tokio::task::yield_now().await;

        shutdown_tx.send(true).unwrap();
        let joined = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(joined.is_ok());
    }
}
