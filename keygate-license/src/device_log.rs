//! Append-only device log.
//!
//! One `deviceId,originAddress` line per verification attempt,
//! whatever the outcome. The sweeper periodically compacts the file:
//! lines whose device field is the `undefined` marker or that are
//! missing the origin field are dropped, then exact duplicates are
//! removed.

use crate::error::{LicenseError, LicenseResult};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Device id written by clients that never resolved their identifier.
pub const MALFORMED_DEVICE_MARKER: &str = "undefined";

/// Append-only log of `(deviceId, originAddress)` pairs.
pub struct DeviceLog {
    path: PathBuf,
    // Serializes appends against compaction's rewrite.
    lock: Mutex<()>,
}

impl DeviceLog {
    /// Creates a log over `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Appends one `device_id,origin` line.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::LogAppend`] if the file cannot be
    /// opened or written.
    pub fn append(&self, device_id: &str, origin: &str) -> LicenseResult<()> {
        let _guard = self.lock.lock().unwrap();
        let append_err = |source| LicenseError::LogAppend {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        writeln!(file, "{device_id},{origin}").map_err(append_err)
    }

    /// Rewrites the log without malformed lines or duplicates,
    /// preserving first-occurrence order. Returns how many lines were
    /// dropped. A missing log file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::LogCompact`] if the file cannot be read
    /// or rewritten.
    pub fn compact(&self) -> LicenseResult<usize> {
        let _guard = self.lock.lock().unwrap();
        let compact_err = |source| LicenseError::LogCompact {
            path: self.path.clone(),
            source,
        };

        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => return Err(compact_err(source)),
        };

        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut removed = 0;
        for line in data.lines() {
            let Some((device_id, _origin)) = line.split_once(',') else {
                removed += 1;
                continue;
            };
            if device_id == MALFORMED_DEVICE_MARKER {
                removed += 1;
                continue;
            }
            if seen.insert(line) {
                kept.push(line);
            } else {
                removed += 1;
            }
        }

        let mut out = kept.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        fs::write(&self.path, out).map_err(compact_err)?;
        Ok(removed)
    }
}
