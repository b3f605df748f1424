//! Scoped illumination obligation for the read cycle.
//!
//! Acquiring the guard turns the light on; dropping it schedules the
//! delayed light-off. Since the guard is dropped on every exit path of the
//! cycle (success, capture failure, inference failure), the off-sequence
//! runs exactly once per cycle without duplicating the call at each branch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use meterwatch_core::LightSink;

/// Slot holding the most recent cycle's delayed off-task. The task runs
/// detached; the handle only exists so one-shot callers can await it
/// before tearing down the runtime.
pub(crate) type PendingOff = Arc<Mutex<Option<JoinHandle<()>>>>;

pub struct IlluminationGuard {
    light: Option<Arc<dyn LightSink>>,
    delay: Duration,
    pending: PendingOff,
}

impl IlluminationGuard {
    /// Turn the light on (if one is configured) and take on the obligation
    /// to turn it off later. Light errors are logged and swallowed: a broken
    /// LED must never block a meter reading.
    pub(crate) async fn acquire(
        light: Option<Arc<dyn LightSink>>,
        delay: Duration,
        pending: PendingOff,
    ) -> Self {
        if let Some(light) = &light {
            match light.set_light(true).await {
                Ok(()) => debug!(light = light.name(), "Turned on illumination"),
                Err(e) => warn!(light = light.name(), error = %e, "Failed to turn on illumination"),
            }
        }
        Self {
            light,
            delay,
            pending,
        }
    }
}

impl Drop for IlluminationGuard {
    fn drop(&mut self) {
        let Some(light) = self.light.take() else { return };
        let delay = self.delay;
        // Detached: the cycle result is produced immediately while the
        // delayed off runs in the background, possibly overlapping the next
        // cycle. The light's on/off state is last-write-wins.
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match light.set_light(false).await {
                Ok(()) => debug!(
                    light = light.name(),
                    delay_secs = delay.as_secs(),
                    "Turned off illumination"
                ),
                Err(e) => warn!(light = light.name(), error = %e, "Failed to turn off illumination"),
            }
        });
        if let Ok(mut slot) = self.pending.lock() {
            *slot = Some(handle);
        }
    }
}
