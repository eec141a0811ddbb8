//! Application configuration for the TubeLab CLI.
//!
//! User config lives at `~/.tubelab/tubelab.toml`.
//! CLI flags override config file values, which override defaults.
//! The API key itself is never stored; only the name of the env var
//! holding it is.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeLabError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tubelab.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tubelab";

/// Base URL of the TubeLab public API.
pub const DEFAULT_BASE_URL: &str = "https://public-api.tubelab.net";

// ---------------------------------------------------------------------------
// Config structs (matching tubelab.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Search defaults.
    #[serde(default)]
    pub defaults: SearchDefaultsConfig,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the TubeLab API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_api_key_env() -> String {
    "TUBELAB_API_KEY".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaultsConfig {
    /// Default result limit for searches.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Default channel language filter (empty = all languages).
    #[serde(default)]
    pub language: String,
}

impl Default for SearchDefaultsConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            language: String::new(),
        }
    }
}

fn default_limit() -> usize {
    50
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tubelab/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TubeLabError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tubelab/tubelab.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TubeLabError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TubeLabError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TubeLabError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TubeLabError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TubeLabError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.api.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(TubeLabError::config(format!(
            "TubeLab API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://tubelab.ai/docs/api"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("TUBELAB_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.api.api_key_env, "TUBELAB_API_KEY");
        assert_eq!(parsed.defaults.limit, 50);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[api]
base_url = "http://localhost:9999"

[defaults]
limit = 200
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.base_url, "http://localhost:9999");
        assert_eq!(config.api.api_key_env, "TUBELAB_API_KEY");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.defaults.limit, 200);
    }

    #[test]
    fn api_key_resolution_fails_when_unset() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.api.api_key_env = "TUBELAB_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
