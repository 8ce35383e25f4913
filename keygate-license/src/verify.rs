//! The activation state machine.
//!
//! Given a key and a device id, decides the next state of the record
//! and the response outcome. Exactly one transition mutates the store:
//! first activation, which computes the expiry once and binds the
//! device. Every other branch is read-only.

use crate::period::ExpirationPeriod;
use crate::store::LicenseStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Why a verification was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No record with this key exists.
    UnknownKey,
    /// The device already has a different active license.
    DeviceConflict,
    /// The key is provisioned for a different device.
    WrongDevice,
    /// The key was activated on this device but its period elapsed.
    Expired,
    /// The key is active on another device.
    BoundElsewhere,
    /// The record's expiration period code is malformed, so no expiry
    /// can be computed. The record is left unissued.
    BadPeriod,
    /// No device identifier was supplied with the request.
    MissingDevice,
}

impl DenialReason {
    /// User-facing denial text.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownKey => "Invalid license key.",
            Self::DeviceConflict => {
                "This device already has an active license; use the license registered to this device."
            }
            Self::WrongDevice => "License key is not valid for this computer.",
            Self::Expired => "License key has expired.",
            Self::BoundElsewhere => "License key has already been used on another computer.",
            Self::BadPeriod => "License key has an invalid expiration period.",
            Self::MissingDevice => "A device identifier is required.",
        }
    }
}

/// Outcome of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verification {
    /// The key is valid for this device.
    Granted {
        /// When the license expires.
        expiration: DateTime<Utc>,
        /// True when the key was already active on this device.
        already_active: bool,
    },
    /// The key is not valid for this device.
    Denied(DenialReason),
}

impl Verification {
    /// True for granted outcomes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Runs one verification against the store.
///
/// Returns the outcome plus whether the store was mutated and so must
/// be persisted. The caller holds the store lock across both this
/// call and the persist that follows.
pub(crate) fn verify(
    store: &mut LicenseStore,
    key: &str,
    device_id: &str,
    now: DateTime<Utc>,
) -> (Verification, bool) {
    let Some(record) = store.find_by_key(key) else {
        return (Verification::Denied(DenialReason::UnknownKey), false);
    };

    if record.used {
        if record.computer_sid != device_id {
            return (Verification::Denied(DenialReason::BoundElsewhere), false);
        }
        return match record.expiration {
            Some(expiration) if expiration >= now => (
                Verification::Granted {
                    expiration,
                    already_active: true,
                },
                false,
            ),
            _ => (Verification::Denied(DenialReason::Expired), false),
        };
    }

    // An activated record always carries a non-empty device id, so an
    // empty id can never be bound.
    if device_id.is_empty() {
        return (Verification::Denied(DenialReason::MissingDevice), false);
    }
    if store.find_active_by_device(device_id, key).is_some() {
        return (Verification::Denied(DenialReason::DeviceConflict), false);
    }
    if !record.computer_sid.is_empty() && record.computer_sid != device_id {
        return (Verification::Denied(DenialReason::WrongDevice), false);
    }

    activate(store, key, device_id, now)
}

/// The one state-changing transition: marks the record used, computes
/// the expiry if it was never set, and binds the device.
fn activate(
    store: &mut LicenseStore,
    key: &str,
    device_id: &str,
    now: DateTime<Utc>,
) -> (Verification, bool) {
    let Some(record) = store.find_by_key_mut(key) else {
        // The caller just found this key under the same lock.
        return (Verification::Denied(DenialReason::UnknownKey), false);
    };

    let expiration = match record.expiration {
        Some(expiration) => expiration,
        None => {
            let computed = ExpirationPeriod::parse(&record.expiration_period)
                .and_then(|period| period.advance(now));
            match computed {
                Ok(expiration) => expiration,
                Err(err) => {
                    warn!(key = %record.key, "activation refused: {err}");
                    return (Verification::Denied(DenialReason::BadPeriod), false);
                }
            }
        }
    };

    record.used = true;
    record.expiration = Some(expiration);
    record.computer_sid = device_id.to_string();

    (
        Verification::Granted {
            expiration,
            already_active: false,
        },
        true,
    )
}
