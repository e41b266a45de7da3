//! Settings file discovery and loading

use searchfleet_core::{ClusterConfig, ConfigError, parse_settings};
use std::path::{Path, PathBuf};

/// Find the cluster settings file.
///
/// Search order:
/// 1. The explicit `--config` path
/// 2. The FLEET_CONFIG_PATH environment variable
/// 3. `fleet.kdl` / `.fleet.kdl` in the current directory
pub fn find_settings_file(explicit: Option<&Path>) -> searchfleet_core::Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::SettingsFileNotFound(path.to_path_buf()));
    }

    if let Ok(env_path) = std::env::var("FLEET_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::SettingsFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["fleet.kdl", ".fleet.kdl"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(ConfigError::SettingsFileNotFound(current_dir))
}

/// Load and validate the cluster settings.
pub fn load_settings(explicit: Option<&Path>) -> searchfleet_core::Result<ClusterConfig> {
    let path = find_settings_file(explicit)?;
    tracing::debug!(path = %path.display(), "loading settings");
    let content = std::fs::read_to_string(&path)?;
    parse_settings(&content)
}
