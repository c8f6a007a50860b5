//! Constants and default values for nodelog

use std::path::PathBuf;

/// Default nodelog home directory name
pub const NODELOG_DIR: &str = ".nodelog";

/// Config file name inside the home directory
pub const HOME_CONFIG_FILE: &str = "config.toml";

/// Config file names searched in the working directory (in priority order)
pub const CONFIG_FILES: &[&str] = &["nodelog.toml", "nodelog.yaml", "nodelog.yml", "nodelog.json"];

/// Literal prefix of every log file name
pub const LOG_PREFIX: &str = "node-";

/// Stem of the "current log" symbolic link
pub const SYMLINK_STEM: &str = "node";

/// Timestamp embedded in log file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Default interval between rotation passes in seconds
pub const DEFAULT_FREQUENCY_SECS: u64 = 20;

/// Get the nodelog home directory
pub fn nodelog_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(NODELOG_DIR))
        .unwrap_or_else(|| PathBuf::from(NODELOG_DIR))
}

/// Get the config file path in the home directory
pub fn home_config_path() -> PathBuf {
    nodelog_home().join(HOME_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodelog_home() {
        let home = nodelog_home();
        assert!(home.to_string_lossy().contains(".nodelog"));
    }

    #[test]
    fn test_home_config_path() {
        let path = home_config_path();
        assert!(path.ends_with(".nodelog/config.toml"));
    }
}
