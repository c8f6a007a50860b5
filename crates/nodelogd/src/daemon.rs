//! Daemon orchestration

use nodelog_core::{ConfigFile, Result, RootSpec, RotationParams};
use nodelog_rotator::{scheduler, CheckReport};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main daemon struct
pub struct Daemon {
    roots: Vec<RootSpec>,
    params: Option<RotationParams>,
}

impl Daemon {
    /// Load configuration from `path`, or search the usual locations
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let (config, config_path) = match path {
            Some(path) => (ConfigFile::load(path)?, path.to_path_buf()),
            None => ConfigFile::find_and_load(&std::env::current_dir()?)?,
        };
        info!("Loaded config from {}", config_path.display());

        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_config(config, &base_dir)
    }

    pub fn from_config(config: ConfigFile, base_dir: &Path) -> Result<Self> {
        let params = config.rotation_params();
        let roots = config.into_roots(base_dir);

        for root in &roots {
            if !root.path.is_dir() {
                warn!("Root {} ({}) does not exist yet", root.path.display(), root.format);
            }
        }

        Ok(Self { roots, params })
    }

    pub fn is_enabled(&self) -> bool {
        self.params.is_some()
    }

    /// Run a single pass
    pub async fn run_once(&self) -> Vec<CheckReport> {
        match &self.params {
            Some(params) => scheduler::run_once(&self.roots, params).await,
            None => {
                info!("No rotation parameters configured, nothing to do");
                Vec::new()
            }
        }
    }

    /// Run the rotation loop until the process is stopped
    pub async fn run(&self) {
        if !self.is_enabled() {
            info!("No rotation parameters configured, idling until shutdown");
            std::future::pending::<()>().await;
        }
        scheduler::run(self.roots.clone(), self.params.clone()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodelog_core::{ConfigFormat, LogFormat};
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_daemon_from_config_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(
            b"[[roots]]\npath = \"logs\"\nformat = \"json\"\n\n[rotation]\nmax_size_bytes = 10\nmax_age_hours = 1\nkeep_files = 1\n",
        )
        .unwrap();

        let daemon = Daemon::new(Some(file.path())).unwrap();
        let base = file.path().parent().unwrap();

        assert!(daemon.is_enabled());
        assert_eq!(daemon.roots, vec![RootSpec::new(base.join("logs"), LogFormat::Json)]);
    }

    #[test]
    fn test_daemon_missing_config() {
        assert!(Daemon::new(Some(Path::new("/nonexistent/nodelog.toml"))).is_err());
    }

    #[tokio::test]
    async fn test_run_once_disabled() {
        let config = ConfigFile::parse("[[roots]]\npath = \"/logs\"\n", ConfigFormat::Toml).unwrap();
        let daemon = Daemon::from_config(config, Path::new("/")).unwrap();

        assert!(!daemon.is_enabled());
        assert!(daemon.run_once().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_once_repairs_root() {
        let root = TempDir::new().unwrap();
        let node = root.path().join("1");
        fs::create_dir(&node).unwrap();
        fs::write(node.join("node-2024-01-01T00-00-00.log"), b"").unwrap();

        let content = format!(
            "[[roots]]\npath = \"{}\"\n\n[rotation]\nmax_size_bytes = 1024\nmax_age_hours = 876000\nkeep_files = 1\n",
            root.path().display()
        );
        let config = ConfigFile::parse(&content, ConfigFormat::Toml).unwrap();
        let daemon = Daemon::from_config(config, Path::new("/")).unwrap();

        let reports = daemon.run_once().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].checked, 1);
        assert_eq!(
            fs::read_link(node.join("node.log")).unwrap(),
            PathBuf::from("node-2024-01-01T00-00-00.log")
        );
    }
}
