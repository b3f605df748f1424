use thiserror::Error;

/// Top-level error type for the meterwatch service.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("image source not found: {0}")]
    SourceNotFound(String),

    #[error("image capture failed: {0}")]
    CaptureError(String),

    #[error("transient provider error ({model}): {message}")]
    TransientProvider { model: String, message: String },

    #[error("authentication rejected by provider (HTTP {status}) - check API key")]
    AuthenticationError { status: u16 },

    #[error("model reply is not a number: '{0}'")]
    ParseError(String),

    #[error("model reported the meter as unreadable")]
    Unreadable,

    #[error("all model candidates exhausted without a reading")]
    AllModelsExhausted,

    #[error("meter update failed: {0}")]
    UpdateFailed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
