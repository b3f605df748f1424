pub mod light;
pub mod registry;
pub mod snapshot;

pub use light::HttpLight;
pub use registry::DeviceRegistry;
pub use snapshot::SnapshotCamera;
