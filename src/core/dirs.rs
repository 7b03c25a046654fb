use crate::core::error::StatusCacheError;
use std::path::PathBuf;

const APP_DIR: &str = "git-status-cache";

pub fn get_config_directory() -> Result<PathBuf, StatusCacheError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config"))),
        "macos" => dirs::home_dir().map(|home| home.join("Library/Application Support")),
        _ => dirs::config_dir(),
    };

    base.map(|base| base.join(APP_DIR))
        .ok_or(StatusCacheError::ConfigDirectoryNotFound)
}

pub fn get_config_file() -> Result<PathBuf, StatusCacheError> {
    Ok(get_config_directory()?.join("config.json"))
}
