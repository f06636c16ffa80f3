//! Application configuration for the compendium converter.
//!
//! User config lives at `~/.compendium/compendium.toml`.
//! CLI flags override config file values, which override defaults.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompendiumError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "compendium.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".compendium";

// ---------------------------------------------------------------------------
// Config structs (matching compendium.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Run the debug validator on every entry.
    #[serde(default)]
    pub debug: bool,

    /// Number of categories converted in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            debug: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}

// ---------------------------------------------------------------------------
// Convert config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime conversion configuration, merged from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Run the debug validator.
    pub debug: bool,
    /// Maximum categories converted at once (at least 1).
    pub concurrency: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ConvertConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            debug: config.defaults.debug,
            concurrency: config.defaults.concurrency.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// `~/.compendium/`.
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or_else(|| CompendiumError::config("no home directory to hold .compendium/"))
}

/// `~/.compendium/compendium.toml`.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// The user config, or defaults when no config file has been written yet.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&path, &content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(?path, "no config file, converting with defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(CompendiumError::io(path, e)),
    }
}

/// Config from an explicit file; a missing file is an error here.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CompendiumError::io(path, e))?;
    parse_config(path, &content)
}

fn parse_config(path: &Path, content: &str) -> Result<AppConfig> {
    toml::from_str(content)
        .map_err(|e| CompendiumError::config(format!("{}: {e}", path.display())))
}

/// Write a default `compendium.toml` under `~/.compendium/`, replacing any existing one.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default `compendium.toml` into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| CompendiumError::io(dir, e))?;

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| CompendiumError::config(e.to_string()))?;
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, content).map_err(|e| CompendiumError::io(&path, e))?;

    tracing::info!(?path, "wrote default config");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("concurrency"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.concurrency, 4);
        assert!(!parsed.defaults.debug);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
debug = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.defaults.debug);
        assert_eq!(config.defaults.concurrency, 4);
    }

    #[test]
    fn convert_config_clamps_concurrency() {
        let mut app = AppConfig::default();
        app.defaults.concurrency = 0;
        let convert = ConvertConfig::from(&app);
        assert_eq!(convert.concurrency, 1);
        assert!(!convert.debug);
    }

    #[test]
    fn init_config_in_writes_loadable_defaults() {
        let dir = std::env::temp_dir().join(format!("compendium-config-test-{}", uuid::Uuid::now_v7()));

        let path = init_config_in(&dir).unwrap();
        assert_eq!(path, dir.join(CONFIG_FILE_NAME));

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.concurrency, 4);
        assert!(!config.defaults.debug);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unparsable_config_names_the_file() {
        let dir = std::env::temp_dir().join(format!("compendium-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[defaults]\nconcurrency = \"many\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, CompendiumError::Config { .. }));
        assert!(err.to_string().contains("compendium.toml"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/compendium.toml")).unwrap_err();
        assert!(matches!(err, CompendiumError::Io { .. }));
    }
}
