//! License records and the flat-file line codec.
//!
//! Each record is one comma-separated line in the fixed order
//! `key,used,expirationPeriod,expirationDateTime,computerSID`.
//! Timestamps are RFC 3339; booleans are literal `true`/`false`.
//! Commas are not escaped, so keys and device ids must not contain
//! commas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single license entry in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Unique license key. Never empty.
    pub key: String,
    /// True once the license has been activated.
    pub used: bool,
    /// Raw period code set at provisioning time, e.g. `"30D"`.
    pub expiration_period: String,
    /// Expiry timestamp, set exactly once at first activation.
    pub expiration: Option<DateTime<Utc>>,
    /// Device the license is bound to. Empty means unbound.
    pub computer_sid: String,
}

impl LicenseRecord {
    /// Creates an unissued, unbound record, as provisioning would.
    #[must_use]
    pub fn provisioned(key: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            used: false,
            expiration_period: period.into(),
            expiration: None,
            computer_sid: String::new(),
        }
    }

    /// True if the record is activated and its expiry is in the past.
    ///
    /// An activated record without an expiry never expires; that state
    /// only arises from a hand-edited file.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.used && self.expiration.is_some_and(|expiration| expiration < now)
    }

    /// Parses one store line. Returns `None` for lines without a key.
    ///
    /// Malformed `used` or timestamp fields coerce to `false`/unset
    /// instead of failing the whole load.
    #[must_use]
    pub fn from_line(line: &str) -> Option<Self> {
        let mut fields = line.trim().split(',');
        let key = fields.next().unwrap_or_default().trim();
        if key.is_empty() {
            return None;
        }
        let used = fields.next() == Some("true");
        let expiration_period = fields.next().unwrap_or_default().to_string();
        let expiration = fields
            .next()
            .and_then(|field| DateTime::parse_from_rfc3339(field).ok())
            .map(|parsed| parsed.with_timezone(&Utc));
        let computer_sid = fields.next().unwrap_or_default().to_string();

        Some(Self {
            key: key.to_string(),
            used,
            expiration_period,
            expiration,
            computer_sid,
        })
    }

    /// Renders the record as one store line.
    #[must_use]
    pub fn to_line(&self) -> String {
        let expiration = self
            .expiration
            .map(|expiration| expiration.to_rfc3339())
            .unwrap_or_default();
        format!(
            "{},{},{},{},{}",
            self.key, self.used, self.expiration_period, expiration, self.computer_sid
        )
    }
}
