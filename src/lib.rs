pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{
    cli::{FileSnapshot, LocalStorage},
    toml_config::TomlConfig,
};

pub use core::{
    calculator::{calculate, Calculator},
    delivery::ReportClient,
    estimator::EstimatorEngine,
    wizard::{Step, Wizard},
};
pub use utils::error::{EstimatorError, Result};
