//! Fixed-point percentage with 4 decimal places precision.
//!
//! Uses `rust_decimal` internally so progress figures are exact and
//! reproducible instead of drifting through floating point.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// A percentage that always carries exactly 4 decimal places.
///
/// # Examples
///
/// ```
/// use stream_engine::Percent4;
///
/// let p = Percent4::of(1, 4);
/// assert_eq!(p.to_string(), "25.0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percent4(Decimal);

impl Percent4 {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 4;

    /// Zero percent.
    pub const ZERO: Self = Percent4(Decimal::ZERO);

    /// Creates a new `Percent4` from a `Decimal`, normalizing to 4 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value.round_dp(Self::SCALE);
        normalized.rescale(Self::SCALE);
        Percent4(normalized)
    }

    /// Returns `part` as a percentage of `whole`.
    ///
    /// A zero `whole` yields zero rather than dividing by zero.
    pub fn of(part: u64, whole: u64) -> Self {
        if whole == 0 {
            return Self::new(Decimal::ZERO);
        }
        let ratio = Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole);
        Self::new(ratio)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Percent4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl Serialize for Percent4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.4}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_normalizes_scale() {
        assert_eq!(Percent4::of(1, 2).to_string(), "50.0000");
        assert_eq!(Percent4::of(5, 5).to_string(), "100.0000");
        assert_eq!(Percent4::of(0, 5).to_string(), "0.0000");
    }

    #[test]
    fn test_of_repeating_fraction_is_rounded_to_scale() {
        assert_eq!(Percent4::of(1, 3).to_string(), "33.3333");
        assert_eq!(Percent4::of(2, 3).to_string(), "66.6667");
        assert_eq!(Percent4::of(864_000, 2_592_000).to_string(), "33.3333");
    }

    #[test]
    fn test_of_zero_whole() {
        assert!(Percent4::of(10, 0).is_zero());
    }

    #[test]
    fn test_ordering() {
        assert!(Percent4::of(1, 4) < Percent4::of(1, 2));
        assert!(Percent4::ZERO < Percent4::of(1, 1_000_000));
    }
}
