//! Configuration loader for the credential hasher. Values come either from the
//! process environment or from a JSON file; the pepper itself never lives on
//! disk, the file only names the environment variable that carries it.

use std::env::{self, VarError};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::crypto::cost::CostFactor;
use crate::crypto::pepper::Pepper;

/// Environment variable holding the bcrypt cost factor.
pub const COST_ENV: &str = "BCRYPT_ROUNDS";
/// Environment variable holding the optional pepper.
pub const PEPPER_ENV: &str = "PASSWORD_PEPPER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct RawHasherConfig {
    /// Cost factor as a number or a string; anything else falls back to the default.
    #[serde(rename = "bcryptRounds", default)]
    pub bcrypt_rounds: Value,
    /// Name of the environment variable that stores the pepper.
    #[serde(rename = "pepperEnv")]
    pub pepper_env: Option<String>,
}

/// Immutable hasher settings, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct HasherConfig {
    pub cost: CostFactor,
    pub pepper: Option<Pepper>,
}

impl HasherConfig {
    /// Normalizes raw values. Never fails.
    pub fn from_values(raw_cost: Option<&str>, raw_pepper: Option<&str>) -> Self {
        let config = Self {
            cost: CostFactor::normalize(raw_cost),
            pepper: Pepper::load(raw_pepper),
        };
        config.log_summary();
        config
    }

    /// Reads `BCRYPT_ROUNDS` and `PASSWORD_PEPPER` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(read_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_cost = lookup(COST_ENV);
        let raw_pepper = lookup(PEPPER_ENV);
        Self::from_values(raw_cost.as_deref(), raw_pepper.as_deref())
    }

    fn log_summary(&self) {
        tracing::info!(
            cost = self.cost.get(),
            pepper = self.pepper.is_some(),
            "hasher configuration loaded"
        );
    }
}

fn read_env(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            tracing::warn!(var = name, "environment variable is not valid unicode; ignoring it");
            None
        }
    }
}

fn cost_from_json(value: &Value) -> CostFactor {
    match value {
        Value::Null => CostFactor::DEFAULT,
        Value::String(text) => CostFactor::normalize(Some(text.as_str())),
        Value::Number(number) => {
            if let Some(signed) = number.as_i64() {
                CostFactor::clamp(signed)
            } else if number.as_u64().is_some() {
                CostFactor::MAX
            } else {
                tracing::warn!(raw_cost = %number, "fractional cost factor; using default");
                CostFactor::DEFAULT
            }
        }
        other => {
            tracing::warn!(raw_cost = %other, "unsupported cost factor type; using default");
            CostFactor::DEFAULT
        }
    }
}

/// Loads a JSON configuration file and resolves the pepper from the
/// environment variable it names (`PASSWORD_PEPPER` when unset).
pub fn load_config(path: impl AsRef<Path>) -> Result<HasherConfig, ConfigError> {
    load_config_with(path, read_env)
}

/// Same as [`load_config`] with a custom environment lookup.
pub fn load_config_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<HasherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let raw_config: RawHasherConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;

    let pepper_env = raw_config.pepper_env.as_deref().unwrap_or(PEPPER_ENV);
    let raw_pepper = lookup(pepper_env);

    let config = HasherConfig {
        cost: cost_from_json(&raw_config.bcrypt_rounds),
        pepper: Pepper::load(raw_pepper.as_deref()),
    };
    config.log_summary();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{load_config_with, ConfigError, HasherConfig, COST_ENV, PEPPER_ENV};
    use crate::crypto::cost::CostFactor;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn write_config(payload: &serde_json::Value) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), serde_json::to_vec(payload).unwrap()).unwrap();
        file
    }

    #[test]
    fn reads_values_from_lookup() {
        let config = HasherConfig::from_lookup(lookup_from(&[(COST_ENV, "14"), (PEPPER_ENV, "spice")]));
        assert_eq!(config.cost.get(), 14);
        assert_eq!(config.pepper.unwrap().as_bytes(), b"spice");
    }

    #[test]
    fn missing_values_degrade_to_defaults() {
        let config = HasherConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.cost, CostFactor::DEFAULT);
        assert!(config.pepper.is_none());

        let config = HasherConfig::from_lookup(lookup_from(&[(COST_ENV, "lots"), (PEPPER_ENV, "")]));
        assert_eq!(config.cost, CostFactor::DEFAULT);
        assert!(config.pepper.is_none());
    }

    #[test]
    fn debug_output_hides_pepper() {
        let config = HasherConfig::from_values(Some("10"), Some("do-not-print"));
        let printed = format!("{config:?}");
        assert!(!printed.contains("do-not-print"));
    }

    #[test]
    fn loads_config_file_with_named_pepper_var() {
        let file = write_config(&json!({
            "bcryptRounds": "11",
            "pepperEnv": "APP_PEPPER"
        }));
        let config = load_config_with(file.path(), lookup_from(&[("APP_PEPPER", "file-pepper")]))
            .expect("config should load");
        assert_eq!(config.cost.get(), 11);
        assert_eq!(config.pepper.unwrap().as_bytes(), b"file-pepper");
    }

    #[test]
    fn config_file_accepts_numeric_and_missing_costs() {
        let file = write_config(&json!({ "bcryptRounds": 2 }));
        let config = load_config_with(file.path(), lookup_from(&[(PEPPER_ENV, "fallback")]))
            .expect("config should load");
        assert_eq!(config.cost, CostFactor::MIN);
        assert_eq!(config.pepper.unwrap().as_bytes(), b"fallback");

        let file = write_config(&json!({ "bcryptRounds": 18446744073709551615u64 }));
        let config = load_config_with(file.path(), lookup_from(&[])).expect("config should load");
        assert_eq!(config.cost, CostFactor::MAX);

        let file = write_config(&json!({ "bcryptRounds": 12.5 }));
        let config = load_config_with(file.path(), lookup_from(&[])).expect("config should load");
        assert_eq!(config.cost, CostFactor::DEFAULT);

        let file = write_config(&json!({}));
        let config = load_config_with(file.path(), lookup_from(&[])).expect("config should load");
        assert_eq!(config.cost, CostFactor::DEFAULT);
        assert!(config.pepper.is_none());
    }

    #[test]
    fn reports_unreadable_and_invalid_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_config_with(dir.path().join("missing.json"), lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));

        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), b"{ not json").unwrap();
        let err = load_config_with(file.path(), lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
