mod common;

use chrono::Duration;
use common::{t0, unused, used};
use keygate_license::{LicenseRecord, LicenseStore};
use tempfile::TempDir;

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn missing_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = LicenseStore::open(dir.path().join("nope.txt"));
    assert!(store.is_empty());
}

#[test]
fn load_drops_blank_and_keyless_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("licenses.txt");
    std::fs::write(&path, "ABC,false,1D,,\n\n,true,1D,,GHOST\nDEF,false,2W,,\n").unwrap();

    let store = LicenseStore::open(&path);
    assert_eq!(store.len(), 2);
    assert!(store.find_by_key("ABC").is_some());
    assert!(store.find_by_key("DEF").is_some());
}

#[test]
fn persist_then_reopen_roundtrips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("licenses.txt");

    let mut store = LicenseStore::open(&path);
    store.insert(unused("ABC", "30D"));
    store.insert(used("DEF", "1D", "SID1", t0()));
    store.persist().unwrap();

    let reopened = LicenseStore::open(&path);
    assert_eq!(reopened.records(), store.records());
}

#[test]
fn persist_after_full_eviction_truncates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("licenses.txt");

    let mut store = LicenseStore::open(&path);
    store.insert(used("GONE", "1D", "SID1", t0() - Duration::days(2)));
    store.persist().unwrap();
    assert!(!std::fs::read_to_string(&path).unwrap().is_empty());

    store.evict_expired(t0());
    store.persist().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

// ── Lookups ──────────────────────────────────────────────────────

#[test]
fn find_by_key_is_exact() {
    let dir = TempDir::new().unwrap();
    let mut store = LicenseStore::open(dir.path().join("licenses.txt"));
    store.insert(unused("ABC", "1D"));

    assert!(store.find_by_key("ABC").is_some());
    assert!(store.find_by_key("abc").is_none());
    assert!(store.find_by_key("AB").is_none());
}

#[test]
fn find_active_by_device_matches_only_used_records() {
    let dir = TempDir::new().unwrap();
    let mut store = LicenseStore::open(dir.path().join("licenses.txt"));
    store.insert(unused("FREE", "1D"));
    store.insert(used("HELD", "1D", "SID1", t0()));

    let hit = store.find_active_by_device("SID1", "OTHER").unwrap();
    assert_eq!(hit.key, "HELD");
    // The held key itself is excluded.
    assert!(store.find_active_by_device("SID1", "HELD").is_none());
    // An empty device id never matches anything.
    assert!(store.find_active_by_device("", "OTHER").is_none());
}

// ── Eviction ─────────────────────────────────────────────────────

#[test]
fn evict_expired_partitions_records() {
    let now = t0();
    let dir = TempDir::new().unwrap();
    let mut store = LicenseStore::open(dir.path().join("licenses.txt"));
    store.insert(used("EXPIRED", "1D", "SID1", now - Duration::hours(1)));
    store.insert(used("LIVE", "1D", "SID2", now + Duration::hours(1)));
    store.insert(unused("FRESH", "1D"));

    let evicted = store.evict_expired(now);
    assert_eq!(evicted, vec!["EXPIRED".to_string()]);

    let kept: Vec<&str> = store.records().iter().map(|r| r.key.as_str()).collect();
    assert_eq!(kept, vec!["LIVE", "FRESH"]);
}

#[test]
fn evict_expired_keeps_record_expiring_exactly_now() {
    let now = t0();
    let dir = TempDir::new().unwrap();
    let mut store = LicenseStore::open(dir.path().join("licenses.txt"));
    store.insert(used("EDGE", "1D", "SID1", now));

    assert!(store.evict_expired(now).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn insert_accepts_prebuilt_records() {
    let dir = TempDir::new().unwrap();
    let mut store = LicenseStore::open(dir.path().join("licenses.txt"));
    store.insert(LicenseRecord::provisioned("NEW", "1M"));
    assert_eq!(store.len(), 1);
}
