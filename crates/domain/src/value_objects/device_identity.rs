//! Synthetic mobile-equipment identity
//!
//! A 15-digit identifier laid out like an IMEI: two-digit reporting body,
//! six-digit device code, six-digit serial and a Luhn check digit. It is
//! generated locally and not tied to any real handset.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Total number of digits in an identity
pub const IDENTITY_DIGITS: usize = 15;

/// Reporting body identifiers that have been assigned in practice
pub const REPORTING_BODY_IDS: [&str; 13] = [
    "01", "33", "35", "44", "45", "49", "50", "51", "52", "53", "86", "91", "98",
];

/// A synthesized 15-digit device identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceIdentity {
    reporting_body_id: String,
    device_code: String,
    serial: String,
    check_digit: u8,
}

impl DeviceIdentity {
    /// Generate an identity from the given random source
    ///
    /// Deterministic for a seeded source.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let reporting_body_id =
            REPORTING_BODY_IDS[rng.random_range(0..REPORTING_BODY_IDS.len())].to_string();
        let device_code = random_digits(rng, 6);
        let serial = random_digits(rng, 6);
        let partial = format!("{reporting_body_id}{device_code}{serial}");
        let check_digit = check_digit(&partial);
        Self {
            reporting_body_id,
            device_code,
            serial,
            check_digit,
        }
    }

    /// Generate an identity from fresh thread-local entropy
    #[must_use]
    pub fn generate_random() -> Self {
        Self::generate(&mut rand::rng())
    }

    /// Parse a 15-digit identity, verifying its check digit
    ///
    /// # Errors
    ///
    /// Returns a validation error if the input is not exactly 15 ASCII digits
    /// or the check digit does not match.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() != IDENTITY_DIGITS || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "device identity must be {IDENTITY_DIGITS} digits"
            )));
        }
        let (partial, last) = value.split_at(IDENTITY_DIGITS - 1);
        let expected = check_digit(partial);
        if last.as_bytes()[0] - b'0' != expected {
            return Err(DomainError::validation("device identity check digit mismatch"));
        }
        Ok(Self {
            reporting_body_id: partial[..2].to_string(),
            device_code: partial[2..8].to_string(),
            serial: partial[8..].to_string(),
            check_digit: expected,
        })
    }

    /// Two-digit reporting body identifier
    #[must_use]
    pub fn reporting_body_id(&self) -> &str {
        &self.reporting_body_id
    }

    /// Six-digit device code
    #[must_use]
    pub fn device_code(&self) -> &str {
        &self.device_code
    }

    /// Six-digit serial number
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Luhn check digit
    #[must_use]
    pub const fn check_digit(&self) -> u8 {
        self.check_digit
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.reporting_body_id, self.device_code, self.serial, self.check_digit
        )
    }
}

impl From<DeviceIdentity> for String {
    fn from(identity: DeviceIdentity) -> Self {
        identity.to_string()
    }
}

impl TryFrom<String> for DeviceIdentity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Luhn check digit for a partial identity
///
/// Walking from the rightmost digit, every other digit (starting with the
/// rightmost) is doubled and folded to a single digit; the rest are summed
/// as-is. The digit is `(sum * 9) mod 10`. Non-digit characters are ignored.
#[must_use]
pub fn check_digit(partial: &str) -> u8 {
    let sum: u32 = partial
        .bytes()
        .rev()
        .filter(u8::is_ascii_digit)
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { fold_doubled(d) } else { d })
        .sum();
    // sum * 9 mod 10 is always below 10
    #[allow(clippy::cast_possible_truncation)]
    let digit = ((sum * 9) % 10) as u8;
    digit
}

/// Returns true if the full identifier passes the Luhn check
#[must_use]
pub fn passes_luhn(full: &str) -> bool {
    if full.is_empty() || !full.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = full
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| if i % 2 == 1 { fold_doubled(d) } else { d })
        .sum();
    sum % 10 == 0
}

const fn fold_doubled(digit: u32) -> u32 {
    let doubled = digit * 2;
    if doubled >= 10 { doubled - 9 } else { doubled }
}

fn random_digits<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
