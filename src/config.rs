//! Configuration for the docsift client.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DOCSIFT_ENDPOINT, DOCSIFT_KEY, DOCSIFT_OUTPUT_DIR)
//! 2. Config file (.docsift/config.yaml)
//! 3. Defaults (~/.docsift)
//!
//! Config file discovery:
//! - Searches current directory and parents for .docsift/config.yaml
//! - Relative paths in the config file resolve against the config file's
//!   project root (the parent of .docsift/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::export::DEFAULT_FIELDS_POINTER;
use crate::core::poller::PollSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub service: Option<ServiceConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
    #[serde(default)]
    pub polling: Option<PollingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the analysis service
    pub endpoint: Option<String>,
    /// Credential sent with every request
    pub api_key: Option<String>,
    /// API version query parameter
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Artifact directory (relative to the project root)
    pub dir: Option<String>,
    /// JSON pointer to the named-fields collection in a result tree
    pub fields_pointer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollingConfig {
    pub interval_seconds: Option<u64>,
    pub max_wait_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths and defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Service endpoint, when configured
    pub endpoint: Option<String>,
    /// Service credential, when configured
    pub api_key: Option<String>,
    /// API version to request
    pub api_version: String,
    /// Absolute path of the artifact directory
    pub output_dir: PathBuf,
    /// JSON pointer to the named-fields collection
    pub fields_pointer: String,
    /// Poll interval
    pub interval: Duration,
    /// Hard wall-clock bound for one poll call
    pub max_wait: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

const DEFAULT_API_VERSION: &str = "2024-11-30";
const DEFAULT_INTERVAL_SECONDS: u64 = 2;
const DEFAULT_MAX_WAIT_SECONDS: u64 = 300;

impl ResolvedConfig {
    /// Poll settings derived from this configuration.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            max_wait: self.max_wait,
            interval: self.interval,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".docsift").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_output = dirs::home_dir()
        .context("failed to determine home directory")?
        .join(".docsift")
        .join("results");

    let config_file = find_config_file();

    let mut endpoint = None;
    let mut api_key = None;
    let mut api_version = DEFAULT_API_VERSION.to_string();
    let mut output_dir = default_output;
    let mut fields_pointer = DEFAULT_FIELDS_POINTER.to_string();
    let mut interval_seconds = DEFAULT_INTERVAL_SECONDS;
    let mut max_wait_seconds = DEFAULT_MAX_WAIT_SECONDS;

    if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Project root is the parent of .docsift/
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        if let Some(service) = config.service {
            endpoint = service.endpoint;
            api_key = service.api_key;
            if let Some(version) = service.api_version {
                api_version = version;
            }
        }

        if let Some(output) = config.output {
            if let Some(dir) = output.dir {
                output_dir = resolve_path(base_dir, &dir);
            }
            if let Some(pointer) = output.fields_pointer {
                fields_pointer = pointer;
            }
        }

        if let Some(polling) = config.polling {
            if let Some(seconds) = polling.interval_seconds {
                interval_seconds = seconds;
            }
            if let Some(seconds) = polling.max_wait_seconds {
                max_wait_seconds = seconds;
            }
        }
    }

    // Environment overrides beat the config file
    if let Ok(env_endpoint) = std::env::var("DOCSIFT_ENDPOINT") {
        endpoint = Some(env_endpoint);
    }
    if let Ok(env_key) = std::env::var("DOCSIFT_KEY") {
        api_key = Some(env_key);
    }
    if let Ok(env_dir) = std::env::var("DOCSIFT_OUTPUT_DIR") {
        output_dir = PathBuf::from(env_dir);
    }

    Ok(ResolvedConfig {
        endpoint,
        api_key,
        api_version,
        output_dir,
        fields_pointer,
        interval: Duration::from_secs(interval_seconds),
        max_wait: Duration::from_secs(max_wait_seconds),
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let docsift_dir = temp.path().join(".docsift");
        std::fs::create_dir_all(&docsift_dir).unwrap();

        let config_path = docsift_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
service:
  endpoint: https://svc.example.com
  api_key: SECRET
  api_version: "2025-05-01"
output:
  dir: ./results
  fields_pointer: /analyzeResult/documents/0/fields
polling:
  interval_seconds: 5
  max_wait_seconds: 120
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");

        let service = config.service.unwrap();
        assert_eq!(service.endpoint.as_deref(), Some("https://svc.example.com"));
        assert_eq!(service.api_version.as_deref(), Some("2025-05-01"));

        let output = config.output.unwrap();
        assert_eq!(
            output.fields_pointer.as_deref(),
            Some("/analyzeResult/documents/0/fields")
        );

        let polling = config.polling.unwrap();
        assert_eq!(polling.interval_seconds, Some(5));
        assert_eq!(polling.max_wait_seconds, Some(120));
    }

    #[test]
    fn test_config_file_minimal() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "version: \"1.0\"\n").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.service.is_none());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./results"),
            PathBuf::from("/home/user/project/./results")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_poll_settings_from_config() {
        let config = ResolvedConfig {
            endpoint: None,
            api_key: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            output_dir: PathBuf::from("/out"),
            fields_pointer: DEFAULT_FIELDS_POINTER.to_string(),
            interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(60),
            config_file: None,
        };

        let settings = config.poll_settings();
        assert_eq!(settings.interval, Duration::from_secs(3));
        assert_eq!(settings.max_wait, Duration::from_secs(60));
    }
}
