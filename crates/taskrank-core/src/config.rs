//! TOML-based application configuration.
//!
//! Stores:
//! - Model scorer settings (endpoint, model, timeout, credential env var)
//! - Heuristic weights and keyword lists
//! - Output defaults for the CLI
//!
//! Configuration is stored at `~/.config/taskrank/config.toml`.
//! The API credential itself is never written here; only the name of the
//! environment variable it is read from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::export::OutputFormat;
use crate::scoring::{HeuristicConfig, ModelConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Bound on heuristic base score and keyword weights.
const WEIGHT_LIMIT: i32 = 100;

/// Model scorer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    /// Try the model before the offline heuristic
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Output defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub show_matrix: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskrank/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub heuristic: HeuristicConfig,
    #[serde(default)]
    pub output: OutputSection,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_matrix: false,
        }
    }
}

impl ModelSection {
    /// Scorer settings with the given credential injected.
    pub fn model_config(&self, api_key: Option<String>) -> ModelConfig {
        ModelConfig {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Returns `~/.config/taskrank[-dev]/` based on TASKRANK_ENV.
///
/// Set TASKRANK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("TASKRANK_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("taskrank-dev")
    } else {
        base_dir.join("taskrank")
    })
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Array(_) => parse_list(value),
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, creating it with defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, creating it with defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };

        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation. On error `self` is
    /// unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let url = url::Url::parse(&self.model.base_url)
            .map_err(|e| invalid("model.base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "model.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(invalid(
                "model.temperature",
                "must be between 0.0 and 2.0".into(),
            ));
        }
        if self.model.timeout_secs == 0 {
            return Err(invalid("model.timeout_secs", "must be positive".into()));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(invalid("model.api_key_env", "must not be empty".into()));
        }

        let h = &self.heuristic;
        for (key, value) in [
            ("heuristic.base_score", h.base_score),
            ("heuristic.urgency_weight", h.urgency_weight),
            ("heuristic.impact_weight", h.impact_weight),
        ] {
            if !(-WEIGHT_LIMIT..=WEIGHT_LIMIT).contains(&value) {
                return Err(invalid(
                    key,
                    format!("must be between -{WEIGHT_LIMIT} and {WEIGHT_LIMIT}"),
                ));
            }
        }
        if h.max_score > 100 {
            return Err(invalid("heuristic.max_score", "must be at most 100".into()));
        }
        if h.min_score > h.max_score {
            return Err(invalid(
                "heuristic.min_score",
                format!("{} exceeds max_score {}", h.min_score, h.max_score),
            ));
        }
        if h.length_divisor == 0 {
            return Err(invalid("heuristic.length_divisor", "must be positive".into()));
        }
        Ok(())
    }
}

/// Parse a list value: a JSON array, or comma-separated items.
fn parse_list(value: &str) -> serde_json::Value {
    if let Ok(list @ serde_json::Value::Array(_)) = serde_json::from_str::<serde_json::Value>(value) {
        return list;
    }
    serde_json::Value::Array(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| serde_json::Value::String(s.to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[model]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(parsed.model.model, "gpt-4o-mini");
        assert_eq!(parsed.model.timeout_secs, 30);
        assert_eq!(parsed.heuristic.base_score, 40);
        assert_eq!(parsed.output.format, OutputFormat::Text);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("model.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("model.timeout_secs").as_deref(), Some("30"));
        assert_eq!(cfg.get("model.api_key_env").as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(cfg.get("output.format").as_deref(), Some("text"));
        assert!(cfg.get("model.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_values_of_each_type() {
        let mut cfg = Config::default();
        cfg.set("model.enabled", "false").unwrap();
        cfg.set("model.timeout_secs", "10").unwrap();
        cfg.set("model.temperature", "0.7").unwrap();
        cfg.set("model.model", "gpt-4o").unwrap();
        cfg.set("output.format", "csv").unwrap();
        assert!(!cfg.model.enabled);
        assert_eq!(cfg.model.timeout_secs, 10);
        assert_eq!(cfg.model.temperature, 0.7);
        assert_eq!(cfg.model.model, "gpt-4o");
        assert_eq!(cfg.output.format, OutputFormat::Csv);
    }

    #[test]
    fn set_keyword_list_from_csv_or_json() {
        let mut cfg = Config::default();
        cfg.set("heuristic.urgency_keywords", "now, overdue").unwrap();
        assert_eq!(cfg.heuristic.urgency_keywords, vec!["now", "overdue"]);
        cfg.set("heuristic.impact_keywords", r#"["invoice"]"#).unwrap();
        assert_eq!(cfg.heuristic.impact_keywords, vec!["invoice"]);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("model.nonexistent", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("", "x").is_err());
    }

    #[test]
    fn set_rejects_invalid_type_and_leaves_config_unchanged() {
        let mut cfg = Config::default();
        assert!(cfg.set("model.enabled", "not_a_bool").is_err());
        assert!(cfg.set("model.timeout_secs", "soon").is_err());
        assert!(cfg.set("output.format", "xml").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_values_failing_validation() {
        let mut cfg = Config::default();
        assert!(cfg.set("model.base_url", "not a url").is_err());
        assert!(cfg.set("model.base_url", "ftp://example.com").is_err());
        assert!(cfg.set("model.timeout_secs", "0").is_err());
        assert!(cfg.set("heuristic.min_score", "99").is_err());
        assert!(cfg.set("heuristic.max_score", "120").is_err());
        assert!(cfg.set("heuristic.urgency_weight", "2147483647").is_err());
        assert!(cfg.set("heuristic.impact_weight", "-101").is_err());
        assert!(cfg.set("heuristic.base_score", "1000").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn model_config_injects_credential() {
        let section = ModelSection::default();
        let mc = section.model_config(Some("sk-test".into()));
        assert_eq!(mc.api_key.as_deref(), Some("sk-test"));
        assert_eq!(mc.base_url, DEFAULT_BASE_URL);
        assert_eq!(mc.model, DEFAULT_MODEL);
        assert_eq!(mc.timeout_secs, 30);
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("heuristic.urgency_weight", "20").unwrap();
        cfg.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.heuristic.urgency_weight, 20);
    }

    #[test]
    fn load_from_rejects_out_of_range_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[heuristic]\nurgency_weight = 2147483647\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [[[").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
