pub mod cli;
pub mod toml_config;

use crate::domain::model::CalculatorInput;
use crate::utils::error::{EstimatorError, Result};
use std::path::Path;

#[cfg(feature = "cli")]
use crate::core::calculator::{BreakdownPolicy, ElectricityUnits};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_url, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "carbon-estimator")]
#[command(about = "Estimate a monthly carbon footprint and deliver the report")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Answers file (TOML or JSON) with the calculator input
    #[arg(short, long)]
    pub input: Option<String>,

    /// Walk through the steps on the terminal
    #[arg(long)]
    pub interactive: bool,

    /// Require contact details before showing results
    #[arg(long)]
    pub contact_step: bool,

    /// Leave zero-valued categories out of the breakdown
    #[arg(long)]
    pub drop_zero: bool,

    /// Convert MWh electricity usage to kWh before applying the factor
    #[arg(long)]
    pub normalize_units: bool,

    /// Write the downloadable report bundle
    #[arg(long)]
    pub export: bool,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Email the report to the contact
    #[arg(long)]
    pub send: bool,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Agree to receive the report by email
    #[arg(long)]
    pub consent: bool,

    /// Pre-rendered PDF snapshot of the results
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Report delivery endpoint (overrides the config file)
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if self.contact_step {
            config.wizard.contact_step = true;
        }
        if self.drop_zero {
            config.calculation.breakdown_policy = BreakdownPolicy::DropZero;
        }
        if self.normalize_units {
            config.calculation.electricity_units = ElectricityUnits::NormalizeToKwh;
        }
        if self.export {
            config.export.enabled = true;
        }
        if let Some(output_path) = &self.output_path {
            config.export.output_path = output_path.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.delivery.endpoint = Some(endpoint.clone());
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }
        if let Some(output_path) = &self.output_path {
            validate_path("output_path", output_path)?;
        }
        if self.send && self.snapshot.is_none() {
            return Err(EstimatorError::MissingConfigError {
                field: "snapshot".to_string(),
            });
        }
        if self.input.is_some() && self.interactive {
            return Err(EstimatorError::ConfigError {
                message: "--input and --interactive cannot be combined".to_string(),
            });
        }
        Ok(())
    }
}

/// 載入答案檔；副檔名為 .json 時用 JSON，其餘當作 TOML
pub fn load_answers<P: AsRef<Path>>(path: P) -> Result<CalculatorInput> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        toml::from_str(&content).map_err(|e| EstimatorError::ConfigValidationError {
            field: path.display().to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}
