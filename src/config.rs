//! Configuration types for the spam protection client.

use crate::error::{Error, Result};
use crate::policy::{check_confidence, check_frequency, ClassificationPolicy, ThresholdPreset};
use crate::query::{DEFAULT_API_URL, DEFAULT_REPORT_URL};
use crate::transport::DEFAULT_TIMEOUT_MS;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Service endpoints and credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Classification thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Tor exit node policy.
    #[serde(default)]
    pub tor: TorConfig,
}

/// Service endpoints and credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Lookup endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Report submission endpoint.
    #[serde(default = "default_report_url")]
    pub report_url: String,

    /// API key (supports ${ENV_VAR} syntax). Only needed to submit reports.
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            report_url: default_report_url(),
            api_key: String::new(),
            timeout_ms: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_report_url() -> String {
    DEFAULT_REPORT_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Classification thresholds.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Thresholds {
    /// Report count at which a subject is spam, or a preset name.
    #[serde(default)]
    pub frequency: FrequencySetting,

    /// Minimum confidence (0-100) required on top of the frequency.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Frequency threshold given either as a number or as a preset name.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FrequencySetting {
    Count(u32),
    Preset(ThresholdPreset),
}

impl FrequencySetting {
    pub fn value(&self) -> u32 {
        match self {
            FrequencySetting::Count(n) => *n,
            FrequencySetting::Preset(preset) => preset.frequency(),
        }
    }
}

impl std::str::FromStr for FrequencySetting {
    type Err = Error;

    /// Accepts a report count or a preset name, in any case.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        match token.parse::<u32>() {
            Ok(count) => Ok(FrequencySetting::Count(count)),
            Err(_) => token.parse::<ThresholdPreset>().map(FrequencySetting::Preset),
        }
    }
}

impl<'de> Deserialize<'de> for FrequencySetting {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer) {
            Ok(Raw::Count(count)) => Ok(FrequencySetting::Count(count)),
            Ok(Raw::Text(text)) => text.parse().map_err(serde::de::Error::custom),
            Err(_) => Err(serde::de::Error::custom(
                "expected a report count or one of strict, high, medium, low",
            )),
        }
    }
}

impl Default for FrequencySetting {
    fn default() -> Self {
        FrequencySetting::Preset(ThresholdPreset::default())
    }
}

/// Tor exit node policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TorConfig {
    /// Treat Tor exit nodes as clean unless they have their own reports.
    #[serde(default)]
    pub allow_tor_nodes: bool,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Config =
            serde_yaml::from_str(&expanded).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::config("api.base_url must not be empty"));
        }

        if self.api.report_url.trim().is_empty() {
            return Err(Error::config("api.report_url must not be empty"));
        }

        if self.api.timeout_ms == 0 {
            return Err(Error::config("api.timeout_ms must be greater than 0"));
        }

        check_frequency(self.thresholds.frequency.value())
            .map_err(|e| Error::config(format!("thresholds.frequency: {e}")))?;

        if let Some(confidence) = self.thresholds.confidence {
            check_confidence(confidence)
                .map_err(|e| Error::config(format!("thresholds.confidence: {e}")))?;
        }

        Ok(())
    }

    /// Classification policy described by the thresholds section.
    pub fn policy(&self) -> Result<ClassificationPolicy> {
        let mut policy = ClassificationPolicy::new(self.thresholds.frequency.value())?;
        policy.set_confidence_threshold(self.thresholds.confidence)?;
        Ok(policy)
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# Spam Protection Configuration

api:
  base_url: "http://api.stopforumspam.org/api"
  report_url: "http://www.stopforumspam.com/add.php"
  api_key: "${STOPFORUMSPAM_API_KEY}"  # Only needed to submit reports
  timeout_ms: 5000

# A subject is spam once it has at least `frequency` reports.
# Use a number or a preset: strict (1), high (3), medium (5), low (10).
thresholds:
  frequency: strict
  # confidence: 50.0           # Optionally also require this confidence (0-100)

tor:
  allow_tor_nodes: false       # false = Tor exit nodes count as spam sources
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let var_value = std::env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://api.stopforumspam.org/api");
        assert_eq!(config.api.report_url, "http://www.stopforumspam.com/add.php");
        assert!(config.api.api_key.is_empty());
        assert_eq!(config.api.timeout_ms, 5000);
        assert_eq!(config.thresholds.frequency.value(), 1);
        assert!(config.thresholds.confidence.is_none());
        assert!(!config.tor.allow_tor_nodes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_SFS_API_KEY", "secret123");
        let input = "api_key: \"${TEST_SFS_API_KEY}\"";
        let result = expand_env_vars(input);
        assert_eq!(result, "api_key: \"secret123\"");
        std::env::remove_var("TEST_SFS_API_KEY");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let input = "api_key: \"${NONEXISTENT_SFS_VAR}\"";
        let result = expand_env_vars(input);
        assert_eq!(result, "api_key: \"\"");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
api:
  api_key: "abc"
  timeout_ms: 1500

thresholds:
  frequency: 4
  confidence: 60

tor:
  allow_tor_nodes: true
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.api.api_key, "abc");
        assert_eq!(config.api.timeout_ms, 1500);
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.thresholds.frequency, FrequencySetting::Count(4));
        assert_eq!(config.thresholds.confidence, Some(60.0));
        assert!(config.tor.allow_tor_nodes);

        let policy = config.policy().unwrap();
        assert_eq!(policy.frequency_threshold(), 4);
        assert_eq!(policy.confidence_threshold(), Some(60.0));
    }

    #[test]
    fn test_parse_preset_threshold() {
        let config = Config::from_yaml("thresholds:\n  frequency: medium\n").unwrap();
        assert_eq!(
            config.thresholds.frequency,
            FrequencySetting::Preset(ThresholdPreset::Medium)
        );
        assert_eq!(config.policy().unwrap().frequency_threshold(), 5);
    }

    #[test]
    fn test_preset_threshold_any_case() {
        let config = Config::from_yaml("thresholds:\n  frequency: High\n").unwrap();
        assert_eq!(
            config.thresholds.frequency,
            FrequencySetting::Preset(ThresholdPreset::High)
        );
        assert_eq!(config.policy().unwrap().frequency_threshold(), 3);
    }

    #[test]
    fn test_quoted_count_threshold() {
        let config = Config::from_yaml("thresholds:\n  frequency: \"3\"\n").unwrap();
        assert_eq!(config.thresholds.frequency, FrequencySetting::Count(3));
    }

    #[test]
    fn test_unknown_threshold_name() {
        let err = Config::from_yaml("thresholds:\n  frequency: lenient\n").unwrap_err();
        assert!(err.to_string().contains("lenient"));
        assert!(Config::from_yaml("thresholds:\n  frequency: -2\n").is_err());
    }

    #[test]
    fn test_frequency_setting_from_str() {
        assert_eq!(" 7 ".parse::<FrequencySetting>().unwrap(), FrequencySetting::Count(7));
        assert_eq!(
            "LOW".parse::<FrequencySetting>().unwrap(),
            FrequencySetting::Preset(ThresholdPreset::Low)
        );
    }

    #[test]
    fn test_example_parses() {
        let config = Config::from_yaml(&Config::example()).unwrap();
        assert_eq!(config.thresholds.frequency.value(), 1);
        assert!(!config.tor.allow_tor_nodes);
    }

    #[test]
    fn test_validate_zero_frequency() {
        let result = Config::from_yaml("thresholds:\n  frequency: 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_confidence_range() {
        let mut config = Config::default();
        config.thresholds.confidence = Some(150.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/spam-protection.yaml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
