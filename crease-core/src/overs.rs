//! Ball-accurate overs representation and decimal conversion helpers.
//!
//! Cricket records bowling workload as `overs.balls` where the fractional
//! digit counts legal deliveries 1-6 into the current over. The decimal form
//! is what scorecards carry on the wire; every run-rate computation in this
//! crate goes through [`Overs`] so the conversion happens in exactly one
//! place.

use num_traits::cast::cast;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Legal deliveries per completed over.
pub const BALLS_PER_OVER: u32 = 6;

/// Errors raised when a decimal overs value cannot be interpreted.
#[derive(Debug, Error, PartialEq)]
pub enum OversFormatError {
    #[error("overs value is not a finite number")]
    NotANumber,
    #[error("overs value {value:.1} is negative")]
    Negative { value: f64 },
    #[error("ball digit {digit} exceeds 6 in overs value {value:.1}")]
    BallDigitOutOfRange { value: f64, digit: u32 },
}

/// Whole overs plus balls into the current over.
///
/// A remainder of 0 balls is valid: an innings can close on a completed over
/// or end early (declaration, all out) with the scorer recording `.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overs {
    pub whole: u32,
    pub balls: u8,
}

impl Overs {
    /// Build from a raw ball count.
    #[must_use]
    pub const fn from_balls(balls: u32) -> Self {
        Self {
            whole: balls / BALLS_PER_OVER,
            balls: (balls % BALLS_PER_OVER) as u8,
        }
    }

    /// Parse the decimal `overs.balls` wire form.
    ///
    /// # Errors
    ///
    /// Returns [`OversFormatError`] for non-finite or negative input, or when
    /// the fractional digit exceeds 6.
    pub fn from_decimal(value: f64) -> Result<Self, OversFormatError> {
        if !value.is_finite() {
            return Err(OversFormatError::NotANumber);
        }
        if value < 0.0 {
            return Err(OversFormatError::Negative { value });
        }
        let whole_f = value.floor();
        // Round the first fractional digit so 4.299999 reads back as 4.3.
        let digit_f = ((value - whole_f) * 10.0).round();
        let whole = cast::<f64, u32>(whole_f).ok_or(OversFormatError::NotANumber)?;
        let digit = cast::<f64, u32>(digit_f).ok_or(OversFormatError::NotANumber)?;
        if digit > BALLS_PER_OVER {
            return Err(OversFormatError::BallDigitOutOfRange {
                value,
                digit,
            });
        }
        // A rounded digit of exactly 6 is a completed over.
        if digit == BALLS_PER_OVER {
            return Ok(Self {
                whole: whole.saturating_add(1),
                balls: 0,
            });
        }
        Ok(Self {
            whole,
            balls: digit as u8,
        })
    }

    /// Total legal deliveries represented.
    #[must_use]
    pub const fn total_balls(&self) -> u32 {
        self.whole
            .saturating_mul(BALLS_PER_OVER)
            .saturating_add(self.balls as u32)
    }

    /// Decimal `overs.balls` wire form.
    #[must_use]
    pub fn as_decimal(&self) -> f64 {
        f64::from(self.whole) + f64::from(self.balls) / 10.0
    }

    /// Overs expressed as a fraction for run-rate math (e.g. 4.3 -> 4.5).
    #[must_use]
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.total_balls()) / f64::from(BALLS_PER_OVER)
    }

    /// Sum two workloads ball-by-ball.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self::from_balls(self.total_balls().saturating_add(other.total_balls()))
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole, self.balls)
    }
}

/// Convert a decimal overs value to a raw ball count.
///
/// # Errors
///
/// Returns [`OversFormatError`] when the input is not a valid overs value.
pub fn overs_to_balls(overs: f64) -> Result<u32, OversFormatError> {
    Overs::from_decimal(overs).map(|o| o.total_balls())
}

/// Convert a raw ball count back to the decimal overs form.
#[must_use]
pub fn balls_to_overs(balls: u32) -> f64 {
    Overs::from_balls(balls).as_decimal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_values() {
        assert_eq!(overs_to_balls(4.3).unwrap(), 27);
        assert_eq!(overs_to_balls(4.0).unwrap(), 24);
        assert_eq!(overs_to_balls(0.0).unwrap(), 0);
        assert_eq!(overs_to_balls(0.5).unwrap(), 5);
    }

    #[test]
    fn round_trips_every_ball_digit() {
        for whole in 0u32..=50 {
            for digit in 0u8..=5 {
                let decimal = f64::from(whole) + f64::from(digit) / 10.0;
                let balls = overs_to_balls(decimal).unwrap();
                let back = balls_to_overs(balls);
                assert!(
                    (back - decimal).abs() < 1e-9,
                    "round trip drifted: {decimal} -> {balls} -> {back}"
                );
            }
        }
    }

    #[test]
    fn digit_six_rolls_into_next_over() {
        let overs = Overs::from_decimal(3.6).unwrap();
        assert_eq!(overs, Overs { whole: 4, balls: 0 });
        assert_eq!(overs.total_balls(), 24);
    }

    #[test]
    fn rejects_digit_above_six() {
        assert_eq!(
            overs_to_balls(2.7),
            Err(OversFormatError::BallDigitOutOfRange {
                value: 2.7,
                digit: 7
            })
        );
        assert_eq!(
            overs_to_balls(19.9),
            Err(OversFormatError::BallDigitOutOfRange {
                value: 19.9,
                digit: 9
            })
        );
    }

    #[test]
    fn rejects_non_finite_and_negative() {
        assert_eq!(overs_to_balls(f64::NAN), Err(OversFormatError::NotANumber));
        assert_eq!(
            overs_to_balls(f64::INFINITY),
            Err(OversFormatError::NotANumber)
        );
        assert_eq!(
            overs_to_balls(-1.2),
            Err(OversFormatError::Negative { value: -1.2 })
        );
    }

    #[test]
    fn tolerates_float_noise_in_wire_values() {
        assert_eq!(overs_to_balls(4.299_999_999).unwrap(), 27);
        assert_eq!(overs_to_balls(12.100_000_001).unwrap(), 73);
    }

    #[test]
    fn fraction_used_for_run_rates() {
        let overs = Overs::from_decimal(4.3).unwrap();
        assert!((overs.as_fraction() - 4.5).abs() < 1e-9);
    }

    #[test]
    fn addition_carries_balls() {
        let a = Overs::from_decimal(3.4).unwrap();
        let b = Overs::from_decimal(2.5).unwrap();
        let sum = a.add(b);
        assert_eq!(sum, Overs { whole: 6, balls: 3 });
    }
}
