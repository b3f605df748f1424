pub mod error;
pub mod reading;
pub mod traits;

pub use error::MeterError;
pub use reading::{ReadResult, ReadStatus};
pub use traits::{ImageSource, LightSink, VisionReader};
