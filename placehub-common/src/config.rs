//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the PlaceHub data folder
pub const ROOT_FOLDER_ENV: &str = "PLACEHUB_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "placehub.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    // Try ~/.config/placehub/config.toml first, then /etc/placehub/config.toml
    if let Some(path) = dirs::config_dir().map(|d| d.join("placehub").join("config.toml")) {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/placehub/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Default data folder when nothing else is configured
fn default_root_folder() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("placehub"))
        .unwrap_or_else(|| PathBuf::from("./placehub"))
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Path of the SQLite database inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_wins() {
        let root = resolve_root_folder(Some(Path::new("/tmp/ph-test")));
        assert_eq!(root, PathBuf::from("/tmp/ph-test"));
    }

    #[test]
    fn test_database_path_is_inside_root() {
        let db = database_path(Path::new("/data/placehub"));
        assert_eq!(db, PathBuf::from("/data/placehub/placehub.db"));
    }
}
