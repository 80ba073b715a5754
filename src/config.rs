//! Engine configuration
//!
//! `EngineOptions` carries every tunable of a pagination engine. It can be
//! built in code, or loaded from YAML / JSON where every field is optional.

use crate::error::{Error, Result, ResultExt};
use crate::retry::RetryPolicy;
use crate::types::{BackoffType, PaginationMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Options recognized by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Items requested per fetch
    pub page_size: u32,
    /// Run the initial load when the engine is first attached
    pub auto_load: bool,
    /// First page index (page mode only)
    pub initial_page: u32,
    /// Optional total count hint, passed through to the state
    pub total_items: Option<u64>,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    pub retry_delay_ms: u64,
    /// Upper bound for a single retry delay, in milliseconds
    pub max_retry_delay_ms: u64,
    /// Growth of the retry delay
    pub backoff: BackoffType,
    /// Expected pagination mode; checked against the supplied source
    pub pagination_mode: Option<PaginationMode>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            auto_load: true,
            initial_page: 0,
            total_items: None,
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            backoff: BackoffType::Exponential,
            pagination_mode: None,
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_retry_delay_ms() -> u64 {
    60_000
}

impl EngineOptions {
    /// Parse options from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check values that cannot be expressed in the type
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value(
                "page_size",
                "must be greater than 0",
            ));
        }

        if self.max_retry_delay_ms < self.retry_delay_ms {
            return Err(Error::invalid_value(
                "max_retry_delay_ms",
                format!(
                    "must be at least retry_delay_ms ({})",
                    self.retry_delay_ms
                ),
            ));
        }

        Ok(())
    }

    /// Delay before the first retry
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Build the retry policy described by these options
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay())
            .with_backoff(self.backoff)
            .with_max_delay(Duration::from_millis(self.max_retry_delay_ms))
    }
}

/// Load options from a `.yaml`/`.yml` or `.json` file
pub fn load_options(path: impl AsRef<Path>) -> Result<EngineOptions> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file '{}'", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => EngineOptions::from_json_str(&content),
        Some("yaml" | "yml") => EngineOptions::from_yaml_str(&content),
        other => Err(Error::config(format!(
            "Unsupported options file extension: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.page_size, 20);
        assert!(options.auto_load);
        assert_eq!(options.initial_page, 0);
        assert_eq!(options.total_items, None);
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.retry_delay(), Duration::from_millis(1000));
        assert!(options.pagination_mode.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r"
page_size: 10
auto_load: false
pagination_mode: cursor
backoff: linear
";
        let options = EngineOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.page_size, 10);
        assert!(!options.auto_load);
        assert_eq!(options.pagination_mode, Some(PaginationMode::Cursor));
        assert_eq!(options.backoff, BackoffType::Linear);
        assert_eq!(options.max_retries, 3);
    }

    #[test]
    fn test_parse_json() {
        let options =
            EngineOptions::from_json_str(r#"{"initial_page": 1, "total_items": 250}"#).unwrap();
        assert_eq!(options.initial_page, 1);
        assert_eq!(options.total_items, Some(250));
        assert_eq!(options.page_size, 20);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineOptions::from_yaml_str("pagesize: 10").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = EngineOptions::from_json_str(r#"{"page_size": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "page_size"));
    }

    #[test]
    fn test_retry_policy_from_options() {
        let options = EngineOptions {
            max_retries: 5,
            retry_delay_ms: 250,
            max_retry_delay_ms: 2000,
            backoff: BackoffType::Constant,
            ..Default::default()
        };
        let policy = options.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_millis(2000));
        assert_eq!(policy.backoff_type, BackoffType::Constant);
    }

    #[test]
    fn test_load_options_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("options.yaml");
        let mut file = fs::File::create(&yaml_path).unwrap();
        writeln!(file, "page_size: 50").unwrap();
        assert_eq!(load_options(&yaml_path).unwrap().page_size, 50);

        let json_path = dir.path().join("options.json");
        fs::write(&json_path, r#"{"max_retries": 0}"#).unwrap();
        assert_eq!(load_options(&json_path).unwrap().max_retries, 0);

        let txt_path = dir.path().join("options.txt");
        fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            load_options(&txt_path).unwrap_err(),
            Error::Config { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_options("/nonexistent/options.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read options file"));
    }
}
