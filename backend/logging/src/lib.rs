pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_secrets;
