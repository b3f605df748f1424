//! The read-cycle orchestrator.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use meterwatch_core::{ImageSource, LightSink, MeterError, ReadResult, VisionReader};

use crate::illumination::{IlluminationGuard, PendingOff};
use crate::publisher::StatePublisher;

/// Sequences one meter read: illumination on, capture, vision inference,
/// delayed illumination off, result record. Capabilities are injected at
/// construction; a configuration change means building a new coordinator.
pub struct Coordinator {
    camera: Arc<dyn ImageSource>,
    light: Option<Arc<dyn LightSink>>,
    vision: Arc<dyn VisionReader>,
    prompt: String,
    led_delay: Duration,
    publisher: Arc<StatePublisher>,
    pending_off: PendingOff,
}

impl Coordinator {
    pub fn new(
        camera: Arc<dyn ImageSource>,
        light: Option<Arc<dyn LightSink>>,
        vision: Arc<dyn VisionReader>,
        prompt: impl Into<String>,
        led_delay: Duration,
        publisher: Arc<StatePublisher>,
    ) -> Self {
        Self {
            camera,
            light,
            vision,
            prompt: prompt.into(),
            led_delay,
            publisher,
            pending_off: Arc::new(Mutex::new(None)),
        }
    }

    pub fn publisher(&self) -> Arc<StatePublisher> {
        Arc::clone(&self.publisher)
    }

    /// Run one read cycle and record the result. Used by both the scheduler
    /// tick and the manual trigger; manual calls are not throttled and may
    /// overlap a previous cycle's pending light-off.
    pub async fn read_now(&self) -> ReadResult {
        let result = self.run_cycle().await;
        self.publisher.record(&result).await;
        result
    }

    /// Run one read cycle without publishing. Never returns an error: every
    /// failure is folded into an error `ReadResult`, so callers above this
    /// boundary only ever see a result record.
    pub async fn run_cycle(&self) -> ReadResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("read_cycle", run_id = %run_id);
        async {
            // The guard's drop schedules the delayed light-off on every
            // exit path, so the obligation cannot be missed by an error.
            let _illumination = IlluminationGuard::acquire(
                self.light.clone(),
                self.led_delay,
                Arc::clone(&self.pending_off),
            )
            .await;

            match self.capture_and_read().await {
                Ok(value) => {
                    info!(value, "Meter read succeeded");
                    ReadResult::success(value)
                }
                Err(e) => {
                    error!(error = %e, "Error reading meter");
                    ReadResult::failure(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Wait out the delayed light-off left behind by the most recent cycle.
    /// One-shot callers must call this before their runtime is dropped,
    /// since dropping the runtime aborts the detached off-task and would
    /// leave the light on. The long-running service never needs this.
    pub async fn settle_illumination(&self) {
        let pending = match self.pending_off.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = pending {
            if let Err(e) = handle.await {
                warn!(error = %e, "Delayed light-off task failed");
            }
        }
    }

    async fn capture_and_read(&self) -> Result<f64, MeterError> {
        let image = self
            .camera
            .get_image()
            .await
            .map_err(|e| MeterError::UpdateFailed(format!("no image: {e}")))?;

        let value = self
            .vision
            .read_value(&image, &self.prompt)
            .await
            .map_err(|e| MeterError::UpdateFailed(format!("no value: {e}")))?;

        Ok(value)
    }
}
