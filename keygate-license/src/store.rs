//! Flat-file license store.
//!
//! The in-memory record list is the source of truth; the file is a
//! mirror, fully rewritten after every mutation. The store itself is
//! not synchronized. [`LicenseService`](crate::LicenseService) wraps
//! it in the single lock that serializes verification against the
//! sweep.

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Authoritative collection of license records plus its backing file.
pub struct LicenseStore {
    path: PathBuf,
    records: Vec<LicenseRecord>,
}

impl LicenseStore {
    /// Opens the store, loading records from `path`.
    ///
    /// An unreadable file is not fatal: the store starts empty and the
    /// failure is logged. A fresh deployment has no file yet.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match Self::load(&path) {
            Ok(records) => records,
            Err(err) => {
                warn!("license store unreadable, starting empty: {err}");
                Vec::new()
            }
        };
        Self { path, records }
    }

    fn load(path: &Path) -> LicenseResult<Vec<LicenseRecord>> {
        let data = fs::read_to_string(path).map_err(|source| LicenseError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(data.lines().filter_map(LicenseRecord::from_line).collect())
    }

    /// Rewrites the backing file with the current record set.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Persist`] if the write fails. The
    /// in-memory records are unaffected.
    pub fn persist(&self) -> LicenseResult<()> {
        let mut data = self
            .records
            .iter()
            .map(LicenseRecord::to_line)
            .collect::<Vec<_>>()
            .join("\n");
        if !data.is_empty() {
            data.push('\n');
        }
        fs::write(&self.path, data).map_err(|source| LicenseError::Persist {
            path: self.path.clone(),
            source,
        })
    }

    /// Looks up a record by exact key.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&LicenseRecord> {
        self.records.iter().find(|record| record.key == key)
    }

    /// Mutable lookup by exact key.
    pub fn find_by_key_mut(&mut self, key: &str) -> Option<&mut LicenseRecord> {
        self.records.iter_mut().find(|record| record.key == key)
    }

    /// Returns a used record bound to `device_id` under a different
    /// key, if any. This is the device-exclusivity check consulted
    /// before an activation.
    #[must_use]
    pub fn find_active_by_device(
        &self,
        device_id: &str,
        excluding_key: &str,
    ) -> Option<&LicenseRecord> {
        if device_id.is_empty() {
            return None;
        }
        self.records.iter().find(|record| {
            record.used && record.computer_sid == device_id && record.key != excluding_key
        })
    }

    /// Inserts a record. Intended for provisioning tooling and tests.
    pub fn insert(&mut self, record: LicenseRecord) {
        self.records.push(record);
    }

    /// Drops every used record whose expiry is before `now`, returning
    /// the evicted keys. Callers persist afterwards.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let (kept, evicted): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|record| !record.is_expired_at(now));
        self.records = kept;
        evicted.into_iter().map(|record| record.key).collect()
    }

    /// Returns all records.
    #[must_use]
    pub fn records(&self) -> &[LicenseRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
