//! Expiration period codes.
//!
//! A period is a compact code: an integer magnitude followed by one
//! unit letter, e.g. `"30D"`, `"2W"`, `"1M"`, `"12H"`. The unit letter
//! is matched case-insensitively. Anything else is `InvalidPeriod`;
//! there is no default unit and no guessed magnitude.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Duration, Months, Utc};
use std::fmt;
use std::str::FromStr;

/// Time unit of an expiration period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    /// Calendar days.
    Days,
    /// Seven-day weeks.
    Weeks,
    /// Calendar months.
    Months,
    /// Hours.
    Hours,
}

/// A parsed expiration period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPeriod {
    magnitude: u32,
    unit: PeriodUnit,
}

impl ExpirationPeriod {
    /// Parses a period code.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPeriod`] when the unit letter is
    /// unknown or the magnitude is not an unsigned integer.
    pub fn parse(code: &str) -> LicenseResult<Self> {
        code.parse()
    }

    /// Returns the integer magnitude.
    #[must_use]
    pub const fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Returns the time unit.
    #[must_use]
    pub const fn unit(&self) -> PeriodUnit {
        self.unit
    }

    /// Returns `from` advanced by this period.
    ///
    /// Months are calendar months, so `1M` from January 31 lands on
    /// the last day of February.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPeriod`] if the resulting
    /// timestamp is not representable.
    pub fn advance(&self, from: DateTime<Utc>) -> LicenseResult<DateTime<Utc>> {
        let overflow = || LicenseError::InvalidPeriod(self.to_string());
        match self.unit {
            PeriodUnit::Days => from
                .checked_add_signed(Duration::days(i64::from(self.magnitude)))
                .ok_or_else(overflow),
            PeriodUnit::Weeks => from
                .checked_add_signed(Duration::days(7 * i64::from(self.magnitude)))
                .ok_or_else(overflow),
            PeriodUnit::Months => from
                .checked_add_months(Months::new(self.magnitude))
                .ok_or_else(overflow),
            PeriodUnit::Hours => from
                .checked_add_signed(Duration::hours(i64::from(self.magnitude)))
                .ok_or_else(overflow),
        }
    }
}

impl FromStr for ExpirationPeriod {
    type Err = LicenseError;

    fn from_str(code: &str) -> LicenseResult<Self> {
        let code = code.trim();
        let invalid = || LicenseError::InvalidPeriod(code.to_string());

        let unit_char = code.chars().next_back().ok_or_else(invalid)?;
        let unit = match unit_char.to_ascii_uppercase() {
            'D' => PeriodUnit::Days,
            'W' => PeriodUnit::Weeks,
            'M' => PeriodUnit::Months,
            'H' => PeriodUnit::Hours,
            _ => return Err(invalid()),
        };

        let magnitude: u32 = code[..code.len() - unit_char.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;

        Ok(Self { magnitude, unit })
    }
}

impl fmt::Display for ExpirationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            PeriodUnit::Days => 'D',
            PeriodUnit::Weeks => 'W',
            PeriodUnit::Months => 'M',
            PeriodUnit::Hours => 'H',
        };
        write!(f, "{}{}", self.magnitude, unit)
    }
}
