//! Fixed-point recipe price
//!
//! Prices are kept as whole cents so that no floating point value is ever
//! stored. On the wire they are rendered as decimal strings with exactly two
//! places, e.g. `"2.30"`.

use serde::{Serialize, Serializer};
use std::fmt;

/// Maximum number of digits of a price, both sides of the point
pub const MAX_DIGITS: usize = 5;
/// Number of digits after the decimal point
pub const DECIMAL_PLACES: usize = 2;

const MAX_CENTS: i64 = 99_999;

/// Non-negative price with two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i64);

impl Price {
    /// Build a price from cents, rejecting negative and out-of-range values
    pub fn from_cents(cents: i64) -> Option<Self> {
        (0..=MAX_CENTS).contains(&cents).then_some(Price(cents))
    }

    /// Price in cents
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Parse a decimal string such as `"2.3"`, `"12"` or `"5.70"`
    ///
    /// The error is a user-facing validation message.
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let invalid = || "A valid number is required.".to_string();

        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole = whole.trim_start_matches('0');
        let whole_digits = whole.len();
        let decimal_digits = fraction.len();

        if whole_digits + decimal_digits > MAX_DIGITS {
            return Err(format!(
                "Ensure that there are no more than {} digits in total.",
                MAX_DIGITS
            ));
        }
        if decimal_digits > DECIMAL_PLACES {
            return Err(format!(
                "Ensure that there are no more than {} decimal places.",
                DECIMAL_PLACES
            ));
        }
        if whole_digits > MAX_DIGITS - DECIMAL_PLACES {
            return Err(format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                MAX_DIGITS - DECIMAL_PLACES
            ));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut fraction_value: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        if decimal_digits == 1 {
            fraction_value *= 10;
        }

        let cents = whole_value * 100 + fraction_value;
        if negative && cents > 0 {
            return Err("Ensure this value is greater than or equal to 0.".to_string());
        }

        Price::from_cents(cents).ok_or_else(invalid)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
