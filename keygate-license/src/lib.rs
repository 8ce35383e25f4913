//! License storage and activation for Keygate.
//!
//! This crate implements the core of the license server:
//! - Flat-file license store with device-bound activation
//! - One-time activation: expiry is computed once, at first use
//! - Device binding: a key is exclusively bound to one device id
//! - Periodic sweep that evicts expired licenses and compacts the
//!   device log
//!
//! # Design Principles
//!
//! - **Single exclusion domain**: every read-decide-mutate-persist
//!   sequence runs under one lock, so two concurrent activations
//!   cannot both win a device
//! - **Fail open on load**: a missing or partly malformed license file
//!   never prevents the service from starting
//! - **Business denials are values**: an unknown, expired, or
//!   conflicting key is a normal verification outcome, not an error

mod device_log;
mod error;
mod period;
mod record;
mod service;
mod store;
mod verify;

pub use device_log::{DeviceLog, MALFORMED_DEVICE_MARKER};
pub use error::{LicenseError, LicenseResult};
pub use period::{ExpirationPeriod, PeriodUnit};
pub use record::LicenseRecord;
pub use service::{LicenseService, SweepReport};
pub use store::LicenseStore;
pub use verify::{DenialReason, Verification};
