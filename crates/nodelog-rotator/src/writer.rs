//! Reference writer for a node subdirectory
//!
//! Appends through the `node.<ext>` symlink, resolving it on every write so
//! that a rotation is picked up by the very next record.

use nodelog_core::{LogFormat, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::naming;

/// Appends to the current log of one subdirectory
pub struct LogWriter {
    dir: PathBuf,
    format: LogFormat,
}

impl LogWriter {
    /// Create a writer for `root/<subdir>`
    pub fn new(root: &Path, subdir: &str, format: LogFormat) -> Self {
        Self {
            dir: root.join(subdir),
            format,
        }
    }

    /// Write a line to the current log
    pub fn write_line(&self, line: &str) -> Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');
        self.write_raw(&record)
    }

    /// Write raw bytes to the current log
    pub fn write_raw(&self, data: &[u8]) -> Result<()> {
        let link = self.ensure_current()?;
        // No create: a dangling link is repaired by the rotator, not here
        let mut file = OpenOptions::new().append(true).open(&link)?;
        file.write_all(data)?;
        Ok(())
    }

    /// Create the subdirectory and the first log/link pair if absent
    fn ensure_current(&self) -> Result<PathBuf> {
        let link = self.dir.join(naming::symlink_name(self.format));
        match fs::symlink_metadata(&link) {
            Ok(_) => Ok(link),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir)?;
                let log = naming::create_log_and_link(&self.dir, self.format)?;
                debug!("Started {} for {}", log.display(), self.dir.display());
                Ok(link)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the subdirectory this writer appends to
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
