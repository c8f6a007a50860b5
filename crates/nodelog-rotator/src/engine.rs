//! Rotation engine
//!
//! Every pass re-reads the directory and derives what to do from the listing
//! alone. Nothing is cached between passes.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use nodelog_core::{Error, LogFormat, Result, RootSpec, RotationParams};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::naming;

/// Outcome of one pass over a root directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub root: PathBuf,
    /// Subdirectories checked without error
    pub checked: usize,
    /// Subdirectories (or the root itself) that failed
    pub failed: usize,
}

fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Visible subdirectories of a root; stray files are ignored
fn list_subdirs(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(root)?
        .into_iter()
        .filter(|p| p.is_dir() && !is_hidden(p))
        .collect())
}

/// Check every subdirectory of a root concurrently.
///
/// Failures are reported per subdirectory and never stop the others.
pub async fn check_root(root: &RootSpec, params: &RotationParams) -> CheckReport {
    let mut report = CheckReport {
        root: root.path.clone(),
        ..Default::default()
    };

    let root_path = root.path.clone();
    let listing = tokio::task::spawn_blocking(move || list_subdirs(&root_path))
        .await
        .map_err(|e| Error::task(e.to_string()))
        .and_then(|r| r);
    let subdirs = match listing {
        Ok(subdirs) => subdirs,
        Err(e) => {
            error!("Cannot list root {}: {}", root.path.display(), e);
            report.failed += 1;
            return report;
        }
    };
    if subdirs.is_empty() {
        debug!("No subdirectories under {}", root.path.display());
        return report;
    }

    let tasks = subdirs.into_iter().map(|dir| {
        let format = root.format;
        let params = params.clone();
        async move {
            let task_dir = dir.clone();
            let result = tokio::task::spawn_blocking(move || check_node(&task_dir, format, &params))
                .await
                .map_err(|e| Error::task(e.to_string()))
                .and_then(|r| r);
            (dir, result)
        }
    });

    for (dir, result) in join_all(tasks).await {
        match result {
            Ok(()) => report.checked += 1,
            Err(e) => {
                error!("Log rotation failed in {}: {}", dir.display(), e);
                report.failed += 1;
            }
        }
    }

    report
}

/// Check a single subdirectory
pub fn check_node(dir: &Path, format: LogFormat, params: &RotationParams) -> Result<()> {
    let entries = list_entries(dir)?;
    match entries.as_slice() {
        [] => Ok(()),
        [single] => fix_single_file(single, format),
        _ => check_logs(params, format, &entries),
    }
}

/// Repair a subdirectory whose only entry is a lone link or a lone log
pub fn fix_single_file(path: &Path, format: LogFormat) -> Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };

    if naming::is_symlink(path, format) {
        info!("Replacing dangling link {}", path.display());
        remove_if_present(path)?;
        naming::create_log_and_link(dir, format)?;
    } else if naming::is_log(format, path) {
        info!("Restoring link to {}", path.display());
        naming::relink(dir, format, path)?;
    } else {
        warn!("Ignoring unrecognized entry {}", path.display());
    }
    Ok(())
}

/// Apply the size and retention policies to the logs among `paths`
pub fn check_logs(params: &RotationParams, format: LogFormat, paths: &[PathBuf]) -> Result<()> {
    let mut logs: Vec<PathBuf> = paths
        .iter()
        .filter(|p| naming::is_log(format, p))
        .cloned()
        .collect();
    logs.sort();

    if let Some(new_log) = check_size(&logs, format, params.max_size_bytes)? {
        logs.push(new_log);
    }
    check_retention(&logs, format, params.max_age_hours, params.keep_files)?;

    if let Some(dir) = logs.first().and_then(|l| l.parent()) {
        ensure_link(dir, format)?;
    }
    Ok(())
}

/// Rotate when the newest log has reached `max_bytes`.
///
/// Returns the new log, if one was created.
pub fn check_size(logs: &[PathBuf], format: LogFormat, max_bytes: u64) -> Result<Option<PathBuf>> {
    let Some(current) = logs.last() else {
        return Ok(None);
    };
    let Some(dir) = current.parent() else {
        return Ok(None);
    };

    let size = fs::metadata(current)?.len();
    if size < max_bytes {
        return Ok(None);
    }

    match naming::create_log_and_relink(dir, format) {
        Ok(new_log) => {
            info!(
                "Rotated {} ({} bytes) to {}",
                current.display(),
                size,
                new_log.display()
            );
            Ok(Some(new_log))
        }
        // Retried on the next pass, a second later at the earliest
        Err(Error::LogExists(path)) => {
            warn!("Skipping rotation, {} already exists", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Delete logs older than `max_age_hours`, keeping at least `keep_count`
pub fn check_retention(
    logs: &[PathBuf],
    format: LogFormat,
    max_age_hours: u64,
    keep_count: usize,
) -> Result<()> {
    let max_age_secs = i64::try_from(max_age_hours.saturating_mul(3600)).unwrap_or(i64::MAX);
    check_retention_at(logs, format, max_age_secs, keep_count, Utc::now())
}

/// Retention relative to a fixed `now`. `logs` must be sorted oldest first.
pub fn check_retention_at(
    logs: &[PathBuf],
    format: LogFormat,
    max_age_secs: i64,
    keep_count: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(dir) = logs.first().and_then(|l| l.parent()) else {
        return Ok(());
    };

    let mut old = Vec::new();
    for log in logs {
        let created = naming::timestamp_of(format, log).ok_or_else(|| Error::NotALog(log.clone()))?;
        if (now - created).num_seconds() >= max_age_secs {
            old.push(log);
        }
    }
    if old.is_empty() {
        return Ok(());
    }

    let remaining = logs.len() - old.len();
    if remaining >= keep_count {
        for log in &old {
            info!("Removing expired log {}", log.display());
            remove_if_present(log)?;
        }
        if remaining == 0 {
            let link = dir.join(naming::symlink_name(format));
            info!("All logs in {} expired, starting a fresh one", dir.display());
            remove_if_present(&link)?;
            naming::create_log_and_link(dir, format)?;
        }
    } else {
        // Keep the newest of the expired logs to make up the deficit
        let deficit = keep_count - remaining;
        for log in old.into_iter().rev().skip(deficit) {
            info!("Removing expired log {}", log.display());
            remove_if_present(log)?;
        }
    }
    Ok(())
}

/// Point the link at the newest log unless it already does.
///
/// Also recovers from a rotation that created a log but never relinked.
fn ensure_link(dir: &Path, format: LogFormat) -> Result<()> {
    let link = dir.join(naming::symlink_name(format));
    if fs::symlink_metadata(&link).is_ok() && !naming::is_symlink(&link, format) {
        warn!("{} exists but is not a symlink, leaving it", link.display());
        return Ok(());
    }

    let newest = list_entries(dir)?
        .into_iter()
        .filter(|p| naming::is_log(format, p))
        .max();
    let Some(newest) = newest else {
        return Ok(());
    };

    let current = fs::read_link(&link).ok().map(|target| dir.join(target));
    if current.as_deref() == Some(newest.as_path()) && naming::is_symlink_valid(&link) {
        return Ok(());
    }

    info!("Repointing link in {} to {}", dir.display(), newest.display());
    naming::relink(dir, format, &newest)
}
