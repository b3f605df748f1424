use async_trait::async_trait;

use crate::error::MeterError;

/// A camera-like capability that can produce a single still image.
///
/// One attempt per call; retry policy lives with the caller.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Configured reference of this source (e.g. "meter_cam").
    fn name(&self) -> &str;

    /// Fetch one still image as opaque bytes (any common encoding).
    async fn get_image(&self) -> Result<Vec<u8>, MeterError>;
}

/// A light-like capability with a simple on/off state.
#[async_trait]
pub trait LightSink: Send + Sync {
    /// Configured reference of this sink (e.g. "meter_led").
    fn name(&self) -> &str;

    /// Switch the light on or off.
    async fn set_light(&self, on: bool) -> Result<(), MeterError>;
}

/// Extracts a numeric meter reading from an image via a vision model.
#[async_trait]
pub trait VisionReader: Send + Sync {
    /// Returns the parsed reading, or an error once all fallbacks are spent.
    async fn read_value(&self, image: &[u8], prompt: &str) -> Result<f64, MeterError>;
}
