pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use io::{config_dir, config_file_path, load_config, state_file_path};
pub use schema::{
    CameraSpec, DevicesConfig, GatewayConfig, LightSpec, LoggingConfig, MeterConfig,
    MeterOverrides, MeterWatchConfig,
};
pub use validation::{validate, ValidationReport};
