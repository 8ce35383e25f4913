//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use keygate_license::{LicenseRecord, LicenseService};
use tempfile::TempDir;

/// Creates a service over fresh files in a temp dir, seeded with `records`.
pub fn service_with(records: Vec<LicenseRecord>) -> (LicenseService, TempDir) {
    let dir = TempDir::new().unwrap();
    let service = LicenseService::open(license_path(&dir), log_path(&dir));
    service.with_store(|store| {
        for record in records {
            store.insert(record);
        }
    });
    (service, dir)
}

pub fn license_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("license-keys.txt")
}

pub fn log_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("device-log.txt")
}

/// An unissued, unbound record.
pub fn unused(key: &str, period: &str) -> LicenseRecord {
    LicenseRecord::provisioned(key, period)
}

/// An activated record bound to `sid` with the given expiry.
pub fn used(key: &str, period: &str, sid: &str, expiration: DateTime<Utc>) -> LicenseRecord {
    LicenseRecord {
        key: key.to_string(),
        used: true,
        expiration_period: period.to_string(),
        expiration: Some(expiration),
        computer_sid: sid.to_string(),
    }
}

/// A fixed reference instant.
pub fn t0() -> DateTime<Utc> {
    "2026-01-15T10:00:00Z".parse().unwrap()
}
