//! # Fixed-Point Weight
//!
//! Facility unit is the ton, carried with 3-decimal precision. Internally a
//! weight is an integer count of milli-tons (kilograms), so guards such as
//! "must exceed 0.000" and `net = |gross - tare|` are exact.

use crate::errors::WeightParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Milli-tons per ton.
const SCALE: i64 = 1_000;

/// A weight in tons with 3-decimal precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(i64);

impl Weight {
    /// 0.000 t
    pub const ZERO: Weight = Weight(0);

    /// Build a weight from a count of milli-tons.
    #[must_use]
    pub const fn from_milli(milli: i64) -> Self {
        Self(milli)
    }

    /// Build a weight from whole tons.
    #[must_use]
    pub const fn from_tons(tons: i64) -> Self {
        Self(tons.saturating_mul(SCALE))
    }

    /// Round a floating-point reading (as delivered by scale hardware) to the
    /// nearest milli-ton.
    #[must_use]
    pub fn from_tons_f64(tons: f64) -> Self {
        Self((tons * SCALE as f64).round() as i64)
    }

    /// Raw milli-ton count.
    #[must_use]
    pub const fn milli(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_tons_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// True when strictly greater than 0.000 t.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `|self - other|`, never negative.
    #[must_use]
    pub fn abs_diff(self, other: Weight) -> Weight {
        Weight(self.0.saturating_sub(other.0).saturating_abs())
    }

    /// Clamp negative values to zero.
    #[must_use]
    pub fn clamp_non_negative(self) -> Weight {
        Weight(self.0.max(0))
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Weight {
    type Output = Weight;

    fn sub(self, rhs: Weight) -> Weight {
        Weight(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Weight {
        iter.fold(Weight::ZERO, Add::add)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:03}", sign, abs / SCALE as u64, abs % SCALE as u64)
    }
}

impl FromStr for Weight {
    type Err = WeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if body.is_empty() {
            return Err(WeightParseError::Empty);
        }

        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(WeightParseError::Invalid(s.to_string()));
        }
        if frac.len() > 3 {
            return Err(WeightParseError::TooPrecise(s.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| WeightParseError::OutOfRange(s.to_string()))?
        };
        let frac_milli: i64 = if frac.is_empty() {
            0
        } else {
            // "5" -> 500, "25" -> 250, "125" -> 125
            format!("{:0<3}", frac)
                .parse()
                .map_err(|_| WeightParseError::Invalid(s.to_string()))?
        };

        let milli = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac_milli))
            .ok_or_else(|| WeightParseError::OutOfRange(s.to_string()))?;

        Ok(Weight(if negative { -milli } else { milli }))
    }
}
