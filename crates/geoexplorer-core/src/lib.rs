pub mod app_config;
pub mod code;
pub mod config;
pub mod dataset;
pub mod selection;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, UpstreamSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{DatasetError, LocationDataset, LocationPoint};
pub use selection::{Selection, SelectionView, Viewport};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
