//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::TrackerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var} value {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<TrackerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration: file (or defaults), then environment overrides, then
/// validation.
pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => TrackerConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Export the variables of an env file into the process environment.
///
/// Variables that are already set keep their value. Returns `false` when the
/// file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Apply `PORT`, `DATA_DIR`, `GITHUB_OWNER` and `GITHUB_REPO`.
pub fn apply_env_overrides<F>(config: &mut TrackerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            value: port.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(dir) = lookup("DATA_DIR").filter(|d| !d.is_empty()) {
        config.storage.path = dir;
    }
    if let Some(owner) = lookup("GITHUB_OWNER").filter(|o| !o.is_empty()) {
        config.github.owner = owner;
    }
    if let Some(repo) = lookup("GITHUB_REPO").filter(|r| !r.is_empty()) {
        config.github.repo = repo;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StorageBackendKind;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_read_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        fs::write(
            &path,
            r#"
            [storage]
            backend = "tree"
            path = "/var/lib/fitness"
            layout = "day"

            [refresh]
            interval_secs = 0
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.storage.backend, StorageBackendKind::Tree);
        assert_eq!(config.storage.path, "/var/lib/fitness");
        assert_eq!(config.refresh.interval_secs, 0);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_port_override_keeps_host() {
        let mut config = TrackerConfig::default();
        config.listener.bind_address = "127.0.0.1:8080".into();

        apply_env_overrides(&mut config, env(&[("PORT", "9000"), ("DATA_DIR", "/tmp/x")])).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.storage.path, "/tmp/x");
    }

    #[test]
    fn test_env_file_exports_unset_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "FITNESS_ENVFILE_TOKEN=from-file\nFITNESS_ENVFILE_PRESET=from-file\n",
        )
        .unwrap();
        std::env::set_var("FITNESS_ENVFILE_PRESET", "from-process");

        assert!(load_env_file(&path).unwrap());
        assert_eq!(std::env::var("FITNESS_ENVFILE_TOKEN").unwrap(), "from-file");
        assert_eq!(std::env::var("FITNESS_ENVFILE_PRESET").unwrap(), "from-process");

        assert!(!load_env_file(&dir.path().join("missing.env")).unwrap());
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut config = TrackerConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("request_secs"));
    }
}
