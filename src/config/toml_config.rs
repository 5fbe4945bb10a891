use crate::core::calculator::{BreakdownPolicy, Calculator, ElectricityUnits};
use crate::core::delivery::DEFAULT_SUBJECT;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EstimatorError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub estimator: EstimatorSection,
    pub calculation: CalculationConfig,
    pub wizard: WizardConfig,
    pub delivery: DeliveryConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSection {
    pub name: String,
    pub version: String,
}

impl Default for EstimatorSection {
    fn default() -> Self {
        Self {
            name: "carbon-estimator".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    pub breakdown_policy: BreakdownPolicy,
    pub electricity_units: ElectricityUnits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub contact_step: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub endpoint: Option<String>,
    pub subject: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub enabled: bool,
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_path: "./output".to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EstimatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EstimatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${REPORT_ENDPOINT})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EstimatorError::ConfigError {
            message: format!("env substitution pattern failed to compile: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(endpoint) = &self.delivery.endpoint {
            crate::utils::validation::validate_url("delivery.endpoint", endpoint)?;
        }

        if let Some(subject) = &self.delivery.subject {
            if subject.trim().is_empty() {
                return Err(EstimatorError::InvalidConfigValueError {
                    field: "delivery.subject".to_string(),
                    value: subject.clone(),
                    reason: "Subject cannot be empty".to_string(),
                });
            }
        }

        if let Some(timeout) = self.delivery.timeout_seconds {
            crate::utils::validation::validate_range("delivery.timeout_seconds", timeout, 1, 300)?;
        }

        crate::utils::validation::validate_path("export.output_path", &self.export.output_path)?;

        Ok(())
    }

    pub fn calculator(&self) -> Calculator {
        Calculator::new(
            self.calculation.breakdown_policy,
            self.calculation.electricity_units,
        )
    }

    pub fn contact_step_enabled(&self) -> bool {
        self.wizard.contact_step
    }
}

impl ConfigProvider for TomlConfig {
    fn delivery_endpoint(&self) -> Option<&str> {
        self.delivery.endpoint.as_deref()
    }

    fn report_subject(&self) -> &str {
        self.delivery.subject.as_deref().unwrap_or(DEFAULT_SUBJECT)
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.delivery.timeout_seconds
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[estimator]
name = "site-calculator"
version = "2.0.0"

[calculation]
breakdown_policy = "drop_zero"
electricity_units = "normalize_to_kwh"

[wizard]
contact_step = true

[delivery]
endpoint = "https://reports.example.com/send-report"
subject = "Footprint"
timeout_seconds = 20

[export]
enabled = true
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.estimator.name, "site-calculator");
        assert_eq!(config.calculation.breakdown_policy, BreakdownPolicy::DropZero);
        assert_eq!(
            config.calculator().electricity_units(),
            ElectricityUnits::NormalizeToKwh
        );
        assert!(config.contact_step_enabled());
        assert_eq!(
            config.delivery_endpoint(),
            Some("https://reports.example.com/send-report")
        );
        assert_eq!(config.report_subject(), "Footprint");
        assert_eq!(config.request_timeout_seconds(), Some(20));
        assert_eq!(config.output_path(), "./reports");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.calculator(), Calculator::default());
        assert!(!config.contact_step_enabled());
        assert_eq!(config.delivery_endpoint(), None);
        assert_eq!(config.report_subject(), DEFAULT_SUBJECT);
        assert_eq!(config.output_path(), "./output");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_REPORT_ENDPOINT", "https://test.reports.com/send");

        let toml_content = r#"
[delivery]
endpoint = "${TEST_REPORT_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.delivery.endpoint.as_deref(),
            Some("https://test.reports.com/send")
        );

        std::env::remove_var("TEST_REPORT_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid_endpoint = TomlConfig::from_toml_str(
            r#"
[delivery]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(invalid_endpoint.validate().is_err());

        let invalid_timeout = TomlConfig::from_toml_str(
            r#"
[delivery]
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(invalid_timeout.validate().is_err());
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let result = TomlConfig::from_toml_str(
            r#"
[calculation]
breakdown_policy = "sometimes"
"#,
        );
        assert!(matches!(
            result,
            Err(EstimatorError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[estimator]
name = "file-test"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.estimator.name, "file-test");
    }
}
