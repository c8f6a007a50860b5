//! Log naming conventions and the "current log" symlink
//!
//! A subdirectory holds logs named `node-YYYY-MM-DDTHH-MM-SS.<ext>` plus a
//! single symlink `node.<ext>` that points at the log being appended to.
//! Lexicographic order of log names is chronological order.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use nodelog_core::{constants, Error, LogFormat, Result};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Width of a formatted timestamp, e.g. `2024-01-31T23-59-59`
const TIMESTAMP_LEN: usize = 19;

/// Name of the symlink for `format`
pub fn symlink_name(format: LogFormat) -> String {
    format.symlink_name()
}

/// File name of a log created at `timestamp`
pub fn log_file_name(format: LogFormat, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}{}.{}",
        constants::LOG_PREFIX,
        timestamp.format(constants::TIMESTAMP_FORMAT),
        format.extension()
    )
}

/// Subdirectory name for a log source: `<id>` or `<name>-<id>`
pub fn node_dir_name(id: u64, name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("{}-{}", name, id),
        _ => id.to_string(),
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn parse_timestamp(format: LogFormat, name: &str) -> Option<DateTime<Utc>> {
    let stamp = name
        .strip_prefix(constants::LOG_PREFIX)?
        .strip_suffix(format.extension())?
        .strip_suffix('.')?;
    if stamp.len() != TIMESTAMP_LEN {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, constants::TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whether `path` names a log file of `format`
pub fn is_log(format: LogFormat, path: &Path) -> bool {
    file_name(path).and_then(|name| parse_timestamp(format, name)).is_some()
}

/// Creation time encoded in a log file name
pub fn timestamp_of(format: LogFormat, path: &Path) -> Option<DateTime<Utc>> {
    file_name(path).and_then(|name| parse_timestamp(format, name))
}

/// Whether `path` is the symlink for `format`, by name and by file type
pub fn is_symlink(path: &Path, format: LogFormat) -> bool {
    if file_name(path) != Some(symlink_name(format).as_str()) {
        return false;
    }
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Whether the symlink at `path` resolves to an existing regular file
pub fn is_symlink_valid(path: &Path) -> bool {
    let Ok(target) = fs::read_link(path) else {
        return false;
    };
    let resolved = match path.parent() {
        Some(dir) if target.is_relative() => dir.join(target),
        _ => target,
    };
    fs::metadata(resolved)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Create an empty log in `dir` named after the current second
pub fn create_log(dir: &Path, format: LogFormat) -> Result<PathBuf> {
    let now = Utc::now().trunc_subsecs(0);
    let path = dir.join(log_file_name(format, now));

    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(_) => {
            debug!("Created log {}", path.display());
            Ok(path)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::LogExists(path)),
        Err(e) => Err(e.into()),
    }
}

/// Create a fresh log and a new symlink to it; the symlink must not exist
pub fn create_log_and_link(dir: &Path, format: LogFormat) -> Result<PathBuf> {
    let log = create_log(dir, format)?;
    symlink(link_target(&log)?, dir.join(symlink_name(format)))?;
    Ok(log)
}

/// Create a fresh log and atomically repoint the existing symlink to it
pub fn create_log_and_relink(dir: &Path, format: LogFormat) -> Result<PathBuf> {
    let log = create_log(dir, format)?;
    if let Err(e) = relink(dir, format, &log) {
        // An unlinked newer log would hide the full one from the size check
        let _ = fs::remove_file(&log);
        return Err(e);
    }
    Ok(log)
}

/// Point the symlink in `dir` at `target` without it ever going missing.
///
/// The new link is made under a temporary name in the same directory and
/// renamed over the real one; `rename(2)` replaces the old link atomically,
/// so a writer resolving `node.<ext>` sees either the old or the new target.
pub fn relink(dir: &Path, format: LogFormat, target: &Path) -> Result<()> {
    let name = symlink_name(format);
    let tmp = dir.join(format!(".{}.tmp", name));

    // Leftover from an interrupted relink
    if fs::symlink_metadata(&tmp).is_ok() {
        fs::remove_file(&tmp)?;
    }

    symlink(link_target(target)?, &tmp)?;
    fs::rename(&tmp, dir.join(&name))?;
    Ok(())
}

/// Links store the bare file name, resolved against the link's directory
fn link_target(log: &Path) -> Result<&Path> {
    log.file_name()
        .map(Path::new)
        .ok_or_else(|| Error::NotALog(log.to_path_buf()))
}
