//! Application configuration for the SWIFT code registry.
//!
//! User config lives at `~/.swiftcodes/swiftcodes.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwiftCodesError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "swiftcodes.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".swiftcodes";

// ---------------------------------------------------------------------------
// Config structs (matching swiftcodes.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Startup seeding from the canonical CSV.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP API binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "var/swift_codes.db".into()
}

/// `[seed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Canonical CSV source loaded when the registry is empty.
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Skip malformed rows instead of aborting the whole load.
    #[serde(default)]
    pub skip_invalid_rows: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            skip_invalid_rows: false,
        }
    }
}

fn default_csv_path() -> String {
    "data/swift_codes.csv".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.swiftcodes/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SwiftCodesError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.swiftcodes/swiftcodes.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SwiftCodesError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SwiftCodesError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SwiftCodesError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SwiftCodesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SwiftCodesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
