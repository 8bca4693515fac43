//! Interop with the `dec` crate's `Decimal128`.
//!
//! [`Decimal128`] is an IEEE 754 decimal128 value: a sign, a coefficient of
//! up to 34 decimal digits and a base-10 exponent, plus NaN and the two
//! infinities. This module adds the pieces the wire codecs need on top of
//! it through [`Decimal128Ext`]:
//!
//! - splitting a value into sign, big-endian coefficient bytes and exponent
//!   ([`Decimal128Ext::decompose`]) and building one back
//!   ([`Decimal128Ext::compose`])
//! - conversion to machine numbers (`to_f64`, `to_i64`)
//!
//! Representations are kept: `150e-2` decomposes with coefficient `150`
//! and exponent `-2`, not as `15e-1`.
//!
//! ## Usage
//!
//! ```
//! use pg_decimal128::{Decimal128, Decimal128Ext, Form};
//!
//! let d: Decimal128 = "-1.50".parse().unwrap();
//! let parts = d.decompose();
//! assert_eq!(parts.form, Form::Finite);
//! assert_eq!(parts.coefficient(), &[150]);
//! assert_eq!(parts.exponent, -2);
//!
//! let back = Decimal128::compose(parts.form, parts.negative, parts.coefficient(), parts.exponent)
//!     .unwrap();
//! assert_eq!(back.to_string(), "-1.50");
//! ```

use crate::error::DecimalError;
use dec::Context;

pub use dec::Decimal128;

/// Sign bit of the first big-endian byte of an IEEE 754 decimal128.
const SIGN_BIT: u8 = 0x80;

/// First big-endian byte of positive infinity.
const INFINITY_BYTE: u8 = 0x78;

/// The state reported by [`Decimal128Ext::decompose`] and accepted by
/// [`Decimal128Ext::compose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Form {
    /// A finite number.
    Finite = 0,
    /// Positive infinity.
    Infinity = 1,
    /// Negative infinity.
    NegativeInfinity = 2,
    /// Not a number.
    NaN = 3,
}

/// A decimal split into its sign, big-endian coefficient bytes and exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposed {
    /// Which state the value is in.
    pub form: Form,
    /// Sign of the value.
    pub negative: bool,
    /// Base-10 exponent (zero for non-finite values).
    pub exponent: i32,
    bytes: [u8; 16],
}

impl Decomposed {
    /// The coefficient as big-endian bytes without leading zero bytes.
    ///
    /// A zero coefficient yields an empty slice.
    pub fn coefficient(&self) -> &[u8] {
        trim_leading_zeros(&self.bytes)
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Set the sign bit without touching the coefficient or exponent.
fn with_sign(d: Decimal128) -> Decimal128 {
    let mut bytes = d.to_be_bytes();
    bytes[0] |= SIGN_BIT;
    Decimal128::from_be_bytes(bytes)
}

/// Parse a decimal literal, reporting the input on failure.
pub(crate) fn parse_decimal(s: &str) -> Result<Decimal128, DecimalError> {
    s.parse().map_err(|_| DecimalError::Parse(s.to_string()))
}

/// Extension methods for converting [`Decimal128`] to and from its parts.
pub trait Decimal128Ext: Sized {
    /// Positive infinity.
    fn infinity() -> Self;

    /// Negative infinity.
    fn neg_infinity() -> Self;

    /// Build a decimal from its parts.
    ///
    /// Any representation is accepted, including non-minimal ones such as
    /// coefficient `1500` with exponent `-3`. A coefficient of more than 34
    /// digits is rounded half-to-even. Fails with
    /// [`DecimalError::CoefficientTooLarge`] when the coefficient does not
    /// fit 16 bytes, and with [`DecimalError::Overflow`] when the exponent
    /// is out of range.
    fn compose(
        form: Form,
        negative: bool,
        coefficient: &[u8],
        exponent: i32,
    ) -> Result<Self, DecimalError>;

    /// Split the decimal into form, sign, coefficient bytes and exponent.
    fn decompose(&self) -> Decomposed;

    /// The nearest `f64`.
    fn to_f64(&self) -> f64;

    /// The exact `i64` value, or `None` for a fractional part, an
    /// out-of-range magnitude, NaN or infinity.
    fn to_i64(&self) -> Option<i64>;
}

impl Decimal128Ext for Decimal128 {
    fn infinity() -> Self {
        let mut bytes = [0u8; 16];
        bytes[0] = INFINITY_BYTE;
        Decimal128::from_be_bytes(bytes)
    }

    fn neg_infinity() -> Self {
        with_sign(Self::infinity())
    }

    fn compose(
        form: Form,
        negative: bool,
        coefficient: &[u8],
        exponent: i32,
    ) -> Result<Self, DecimalError> {
        let value = match form {
            Form::NaN => return Ok(Decimal128::NAN),
            Form::NegativeInfinity => return Ok(Self::neg_infinity()),
            Form::Infinity => Self::infinity(),
            Form::Finite => {
                let coefficient = trim_leading_zeros(coefficient);
                if coefficient.len() > 16 {
                    return Err(DecimalError::CoefficientTooLarge(coefficient.len()));
                }
                let mut bytes = [0u8; 16];
                bytes[16 - coefficient.len()..].copy_from_slice(coefficient);

                let mut cx = Context::<Decimal128>::default();
                let d = cx.from_u128(u128::from_be_bytes(bytes));
                let d = cx.scaleb(d, Decimal128::from(exponent));
                if !d.is_finite() {
                    return Err(DecimalError::Overflow);
                }
                d
            }
        };

        Ok(if negative { with_sign(value) } else { value })
    }

    fn decompose(&self) -> Decomposed {
        let negative = self.is_signed();
        let (form, exponent, bytes) = if self.is_nan() {
            (Form::NaN, 0, [0u8; 16])
        } else if self.is_infinite() {
            let form = if negative {
                Form::NegativeInfinity
            } else {
                Form::Infinity
            };
            (form, 0, [0u8; 16])
        } else {
            (
                Form::Finite,
                self.exponent(),
                self.coefficient().unsigned_abs().to_be_bytes(),
            )
        };

        Decomposed {
            form,
            negative,
            exponent,
            bytes,
        }
    }

    fn to_f64(&self) -> f64 {
        if self.is_nan() {
            return f64::NAN;
        }
        if self.is_infinite() {
            return if self.is_signed() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
        }

        let sign = if self.is_signed() { "-" } else { "" };
        format!(
            "{sign}{}e{}",
            self.coefficient().unsigned_abs(),
            self.exponent()
        )
        .parse()
        .unwrap_or(f64::NAN)
    }

    fn to_i64(&self) -> Option<i64> {
        if !self.is_finite() {
            return None;
        }

        let coefficient = self.coefficient().unsigned_abs();
        if coefficient == 0 {
            return Some(0);
        }

        let exponent = self.exponent();
        let magnitude = if exponent >= 0 {
            coefficient.checked_mul(10u128.checked_pow(exponent.unsigned_abs())?)?
        } else {
            let divisor = 10u128.checked_pow(exponent.unsigned_abs())?;
            if coefficient % divisor != 0 {
                return None;
            }
            coefficient / divisor
        };

        let value = i128::try_from(magnitude).ok()?;
        i64::try_from(if self.is_signed() { -value } else { value }).ok()
    }
}
