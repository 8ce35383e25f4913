//! Service façade: one lock around the store, the activation state
//! machine, and the expiry sweep.

use crate::device_log::DeviceLog;
use crate::error::LicenseResult;
use crate::store::LicenseStore;
use crate::verify::{self, Verification};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};

/// What a sweep pass removed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Keys of evicted expired licenses.
    pub evicted: Vec<String>,
    /// Device-log lines dropped by compaction.
    pub log_lines_removed: usize,
}

/// The license server core.
///
/// Owns the store behind a single mutex so that each verification's
/// read-decide-mutate-persist sequence and each sweep's
/// scan-evict-persist sequence are serialized against each other.
/// The device log has its own lock: appends contend only with the
/// sweeper's compaction, never with store mutations.
pub struct LicenseService {
    store: Mutex<LicenseStore>,
    device_log: DeviceLog,
}

impl LicenseService {
    /// Opens the service over the two backing files.
    #[must_use]
    pub fn open(license_file: impl Into<PathBuf>, device_log: impl Into<PathBuf>) -> Self {
        Self {
            store: Mutex::new(LicenseStore::open(license_file)),
            device_log: DeviceLog::new(device_log),
        }
    }

    /// Verifies `key` for `device_id`, activating the license on first
    /// use.
    ///
    /// The device log records every attempt, whatever the outcome; a
    /// failed append is logged and does not fail the verification.
    ///
    /// # Errors
    ///
    /// Returns an error only when an activation could not be written
    /// to the store file. The in-memory mutation is rolled back so
    /// memory never runs ahead of the mirror, and a retry re-runs the
    /// whole transition including the write.
    pub fn verify(
        &self,
        key: &str,
        device_id: &str,
        origin: &str,
    ) -> LicenseResult<Verification> {
        let result = {
            let mut store = self.store.lock().unwrap();
            let snapshot = store.find_by_key(key).cloned();
            let (outcome, mutated) = verify::verify(&mut store, key, device_id, Utc::now());
            if mutated {
                match store.persist() {
                    Ok(()) => Ok(outcome),
                    Err(err) => {
                        // Un-activate the record; the file never saw it.
                        if let (Some(original), Some(record)) =
                            (snapshot, store.find_by_key_mut(key))
                        {
                            *record = original;
                        }
                        Err(err)
                    }
                }
            } else {
                Ok(outcome)
            }
        };

        if let Err(err) = self.device_log.append(device_id, origin) {
            warn!("device log append failed: {err}");
        }
        result
    }

    /// Runs one maintenance pass: evicts expired licenses, persists
    /// the kept set, then compacts the device log.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rewrite or the log compaction
    /// fails; eviction itself cannot fail.
    pub fn sweep(&self) -> LicenseResult<SweepReport> {
        let evicted = {
            let mut store = self.store.lock().unwrap();
            let evicted = store.evict_expired(Utc::now());
            store.persist()?;
            evicted
        };
        if !evicted.is_empty() {
            info!(keys = ?evicted, "evicted expired licenses");
        }

        let log_lines_removed = self.device_log.compact()?;
        Ok(SweepReport {
            evicted,
            log_lines_removed,
        })
    }

    /// Runs `f` with exclusive access to the store. Used by
    /// provisioning tooling and tests.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut LicenseStore) -> T) -> T {
        let mut store = self.store.lock().unwrap();
        f(&mut store)
    }
}
