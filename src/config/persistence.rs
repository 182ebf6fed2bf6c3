//! Configuration file persistence for Tandem
//!
//! This module handles loading and saving the settings file in the
//! platform-specific config directory, falling back to defaults when the
//! file is missing or unreadable.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "tandem";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Backup configuration file name (used during atomic writes)
const CONFIG_BACKUP_NAME: &str = "config.json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\tandem\`
/// - **macOS**: `~/Library/Application Support/tandem/`
/// - **Linux**: `~/.config/tandem/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load configuration from the default config file location.
///
/// Never fails: a missing file yields defaults, and any read or parse
/// error is logged at warning level and replaced with defaults.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Load and sanitize settings from a specific file.
///
/// Missing and empty files are not errors; both yield `Settings::default()`.
fn load_config_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    debug!("Loading config from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Config file at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded successfully from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save configuration to the default config file location.
///
/// # Errors
///
/// - `Error::ConfigDirNotFound`: Config directory cannot be determined
/// - `Error::ConfigSave`: Failed to write the config file
pub fn save_config(settings: &Settings) -> Result<()> {
    let config_dir = get_config_dir()?;
    save_config_to(&config_dir, settings)
}

/// Write settings as pretty JSON into `config_dir`, creating the directory
/// if needed.
///
/// The write is atomic: the JSON goes to a sibling backup file first, which
/// then replaces the config file in a single rename.
fn save_config_to(config_dir: &Path, settings: &Settings) -> Result<()> {
    if !config_dir.exists() {
        debug!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(config_dir).map_err(|e| Error::ConfigSave {
            path: config_dir.to_path_buf(),
            source: Box::new(e),
        })?;
    }

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    let backup_path = config_dir.join(CONFIG_BACKUP_NAME);

    debug!("Saving config to: {}", config_path.display());

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, &config_path).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    info!(
        "Configuration saved successfully to {}",
        config_path.display()
    );
    Ok(())
}

/// Save configuration, ignoring errors.
///
/// This is useful for "best effort" saves where failure shouldn't
/// interrupt the application flow (e.g., saving on exit).
///
/// # Returns
///
/// Returns `true` if the save was successful, `false` otherwise.
pub fn save_config_silent(settings: &Settings) -> bool {
    match save_config(settings) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save configuration: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
