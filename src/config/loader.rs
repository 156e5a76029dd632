//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and environment overrides
//! using the `config` crate, then validates the merged result.

use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::BulkOpsConfig;
use crate::constants::env;

const DEFAULT_CONFIG_FILE: &str = "config/bulkops.toml";

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: BulkOpsConfig,
    source_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `BULKOPS_CONFIG` (or `config/bulkops.toml` when
    /// present) and process environment overrides
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        match std::env::var(env::CONFIG_PATH) {
            Ok(path) => Self::load_from_file(Path::new(&path)),
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                let file = default_path.is_file().then_some(default_path);
                Self::build(file, None)
            }
        }
    }

    /// Load configuration from an explicit file; the file must exist
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        if !path.is_file() {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Self::build(Some(path.to_path_buf()), None)
    }

    /// Load configuration with an explicit override map instead of the process
    /// environment. Keys use the same `BULKOPS_SECTION__FIELD` form.
    pub fn load_with_overrides(
        path: Option<&Path>,
        overrides: HashMap<String, String>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::build(path.map(Path::to_path_buf), Some(overrides))
    }

    fn build(
        file: Option<PathBuf>,
        overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let mut builder = Config::builder().add_source(Config::try_from(&BulkOpsConfig::default())?);

        if let Some(path) = &file {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let environment = Environment::with_prefix(env::OVERRIDE_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(overrides);
        builder = builder.add_source(environment);

        let config: BulkOpsConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            base_url = %config.api.base_url,
            decision_limit = config.batching.decision_limit,
            reassignment_limit = config.batching.reassignment_limit,
            source_file = ?file,
            "⚙️ Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            source_file: file,
        }))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: BulkOpsConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            source_file: None,
        }))
    }

    pub fn config(&self) -> &BulkOpsConfig {
        &self.config
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    /// Configuration as JSON with credentials masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    fn sanitize_config_for_logging(config: &BulkOpsConfig) -> serde_json::Value {
        let mut value = serde_json::json!(config);
        Self::sanitize_json_recursive(&mut value, &["token", "secret", "password"]);
        value
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        if let serde_json::Value::String(s) = val {
                            let chars: Vec<char> = s.chars().collect();
                            let masked = if chars.len() > 4 {
                                let head: String = chars[..2].iter().collect();
                                let tail: String = chars[chars.len() - 2..].iter().collect();
                                format!("{head}***{tail}")
                            } else {
                                "***".to_string()
                            };
                            *val = serde_json::Value::String(format!("[MASKED: {masked}]"));
                        }
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file = write_config(
            r#"
            [api]
            base_url = "https://acme.api.example.com"

            [batching]
            decision_limit = 100
            "#,
        );

        let manager = ConfigManager::load_with_overrides(Some(file.path()), HashMap::new()).unwrap();
        let config = manager.config();

        assert_eq!(config.api.base_url, "https://acme.api.example.com");
        assert_eq!(config.batching.decision_limit, 100);
        assert_eq!(config.batching.reassignment_limit, 50);
        assert_eq!(config.polling.config_job_interval_ms, 1000);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("[batching]\nreminder_limit = 10\n");
        let overrides = HashMap::from([
            (
                "BULKOPS_BATCHING__REMINDER_LIMIT".to_string(),
                "20".to_string(),
            ),
            (
                "BULKOPS_POLLING__AGGREGATION_INTERVAL_MS".to_string(),
                "250".to_string(),
            ),
        ]);

        let manager = ConfigManager::load_with_overrides(Some(file.path()), overrides).unwrap();

        assert_eq!(manager.config().batching.reminder_limit, 20);
        assert_eq!(manager.config().polling.aggregation_interval_ms, 250);
    }

    #[test]
    fn test_invalid_file_value_fails_validation() {
        let file = write_config("[batching]\ndecision_limit = 0\n");

        let err = ConfigManager::load_with_overrides(Some(file.path()), HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ConfigManager::load_from_file(Path::new("/nonexistent/bulkops.toml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::FileNotFound { .. }));
    }

    #[test]
    fn test_access_token_masked_in_debug_output() {
        let mut config = BulkOpsConfig::default();
        config.api.access_token = Some("eyJhbGciOiJSUzI1NiJ9".to_string());

        let manager = ConfigManager::from_config(config).unwrap();
        let dump = manager.debug_config();

        assert_eq!(dump["api"]["access_token"], "[MASKED: ey***J9]");
        assert_eq!(dump["batching"]["decision_limit"], 250);
    }

    #[test]
    fn test_masking_keeps_multibyte_characters_whole() {
        let mut config = BulkOpsConfig::default();
        config.api.access_token = Some("aé-secret-valueü".to_string());

        let manager = ConfigManager::from_config(config).unwrap();

        assert_eq!(
            manager.debug_config()["api"]["access_token"],
            "[MASKED: aé***eü]"
        );
    }
}
