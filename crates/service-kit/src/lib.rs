//! # service-kit
//!
//! Process bootstrap shared by the echo service: layered configuration
//! loading, runtime environment detection and logging setup.
//!
//! Nothing in here knows about HTTP. The service crate builds its own
//! typed configuration on top of [`ConfigBuilder`].
//!
//! ## Features
//!
//! - `tracing` (default) - logging initialization with tracing-subscriber

mod config;
mod environment;
mod logging;

pub use config::{load_config_file, load_from_env, ConfigBuilder, ConfigError, ConfigFormat};
pub use environment::Environment;
pub use logging::LogFormat;

#[cfg(feature = "tracing")]
pub use logging::init_logging;
