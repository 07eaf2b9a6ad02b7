//! Shared pieces of the brain tumor detector.
//!
//! - [`config`]: explicit configuration read once from the environment
//! - [`labels`]: the fixed classification table of the model

pub mod config;
pub mod labels;

pub use config::{AppConfig, ConfigError, ConfigResult, load_environment_value};
pub use labels::{TumorClass, label_from_class};
