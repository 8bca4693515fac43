//! Decoded wire values and the scanner/valuer traits a driver calls.
//!
//! A driver reads raw column bytes into one of [`Numeric`], [`Float8`] or
//! [`Int8`] and then hands it to a scanner; for parameters it asks a valuer
//! for one of these values and writes it out. Every type carries a `valid`
//! flag, and when it is false all other fields are ignored.

use crate::Result;
use num_bigint::BigInt;
use std::fmt;

/// Whether a numeric wire value is finite or one of the two infinities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InfinityModifier {
    /// Positive infinity.
    Infinity,
    /// A finite value.
    #[default]
    Finite,
    /// Negative infinity.
    NegativeInfinity,
}

impl InfinityModifier {
    /// Map a decomposition form code to a modifier.
    ///
    /// `0` is finite, `1` is positive infinity, `2` with the sign set is
    /// negative infinity, and anything else is treated as finite.
    pub fn from_form(form: u8, negative: bool) -> Self {
        match form {
            0 => InfinityModifier::Finite,
            1 => InfinityModifier::Infinity,
            2 if negative => InfinityModifier::NegativeInfinity,
            _ => InfinityModifier::Finite,
        }
    }
}

impl fmt::Display for InfinityModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfinityModifier::Infinity => "infinity",
            InfinityModifier::Finite => "finite",
            InfinityModifier::NegativeInfinity => "-infinity",
        })
    }
}

/// A decomposed `numeric` value: `int * 10^exp`.
///
/// At most one of `nan`, a non-finite `infinity_modifier`, or a finite
/// value holds at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Numeric {
    /// Signed magnitude.
    pub int: BigInt,
    /// Base-10 exponent.
    pub exp: i32,
    /// The value is NaN.
    pub nan: bool,
    /// Finite, or which infinity.
    pub infinity_modifier: InfinityModifier,
    /// False for SQL NULL.
    pub valid: bool,
}

impl Numeric {
    /// A finite value `int * 10^exp`.
    pub fn new(int: impl Into<BigInt>, exp: i32) -> Self {
        Numeric {
            int: int.into(),
            exp,
            valid: true,
            ..Default::default()
        }
    }

    /// SQL NULL.
    pub fn null() -> Self {
        Numeric::default()
    }

    /// A NaN value.
    pub fn nan() -> Self {
        Numeric {
            nan: true,
            valid: true,
            ..Default::default()
        }
    }

    /// An infinite value. Passing [`InfinityModifier::Finite`] yields zero.
    pub fn infinite(modifier: InfinityModifier) -> Self {
        Numeric {
            infinity_modifier: modifier,
            valid: true,
            ..Default::default()
        }
    }
}

/// A nullable `float8` value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float8 {
    /// The float, ignored when `valid` is false.
    pub value: f64,
    /// False for SQL NULL.
    pub valid: bool,
}

impl Float8 {
    /// A non-null float.
    pub fn new(value: f64) -> Self {
        Float8 { value, valid: true }
    }

    /// SQL NULL.
    pub fn null() -> Self {
        Float8::default()
    }
}

/// A nullable `int8` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int8 {
    /// The integer, ignored when `valid` is false.
    pub value: i64,
    /// False for SQL NULL.
    pub valid: bool,
}

impl Int8 {
    /// A non-null integer.
    pub fn new(value: i64) -> Self {
        Int8 { value, valid: true }
    }

    /// SQL NULL.
    pub fn null() -> Self {
        Int8::default()
    }
}

/// Receives a decoded `numeric` value.
pub trait NumericScanner {
    /// Replace `self` with the value of `v`.
    ///
    /// On error `self` is left unchanged.
    fn scan_numeric(&mut self, v: &Numeric) -> Result<()>;
}

/// Produces a `numeric` value for encoding.
pub trait NumericValuer {
    /// Return `self` as a numeric wire value.
    fn numeric_value(&self) -> Result<Numeric>;
}

/// Receives a decoded `float8` value.
pub trait Float64Scanner {
    /// Replace `self` with the value of `v`.
    ///
    /// On error `self` is left unchanged.
    fn scan_float64(&mut self, v: Float8) -> Result<()>;
}

/// Produces a `float8` value for encoding.
pub trait Float64Valuer {
    /// Return `self` as a float wire value.
    fn float64_value(&self) -> Result<Float8>;
}

/// Receives a decoded `int8` value.
pub trait Int64Scanner {
    /// Replace `self` with the value of `v`.
    ///
    /// On error `self` is left unchanged.
    fn scan_int64(&mut self, v: Int8) -> Result<()>;
}

/// Produces an `int8` value for encoding.
pub trait Int64Valuer {
    /// Return `self` as an integer wire value.
    fn int64_value(&self) -> Result<Int8>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infinity_modifier_from_form() {
        assert_eq!(InfinityModifier::from_form(0, false), InfinityModifier::Finite);
        assert_eq!(InfinityModifier::from_form(0, true), InfinityModifier::Finite);
        assert_eq!(InfinityModifier::from_form(1, false), InfinityModifier::Infinity);
        assert_eq!(
            InfinityModifier::from_form(2, true),
            InfinityModifier::NegativeInfinity
        );
        assert_eq!(InfinityModifier::from_form(2, false), InfinityModifier::Finite);
        assert_eq!(InfinityModifier::from_form(7, true), InfinityModifier::Finite);
    }

    #[test]
    fn test_infinity_modifier_display() {
        assert_eq!(InfinityModifier::Infinity.to_string(), "infinity");
        assert_eq!(InfinityModifier::Finite.to_string(), "finite");
        assert_eq!(InfinityModifier::NegativeInfinity.to_string(), "-infinity");
    }

    #[test]
    fn test_constructors() {
        let n = Numeric::new(12345, -2);
        assert!(n.valid && !n.nan);
        assert_eq!(n.infinity_modifier, InfinityModifier::Finite);
        assert_eq!(n.int, BigInt::from(12345));

        assert!(!Numeric::null().valid);
        assert!(Numeric::nan().nan);
        assert_eq!(
            Numeric::infinite(InfinityModifier::NegativeInfinity).infinity_modifier,
            InfinityModifier::NegativeInfinity
        );

        assert!(!Float8::null().valid);
        assert_eq!(Float8::new(1.5).value, 1.5);
        assert!(!Int8::null().valid);
        assert_eq!(Int8::new(-7), Int8 { value: -7, valid: true });
    }
}
