//! Conversions between [`Decimal128`] and the `numeric`, `float8` and `int8`
//! wire values.
//!
//! These are the shared routines behind the scanner and valuer
//! implementations of [`Decimal`](crate::Decimal) and
//! [`NullDecimal`](crate::NullDecimal). Each takes the name of the Rust
//! type it works for so that errors name the type the caller used.
//!
//! ## Numeric
//!
//! A finite numeric value `int * 10^exp` maps to a decimal with the same
//! sign, the magnitude of `int` as its coefficient, and the same exponent.
//! No digits are added or removed, so a decimal round-trips through
//! [`encode_numeric`] and [`decode_numeric`] with its representation intact.
//!
//! ## Float
//!
//! Floats are decoded through their shortest round-trip decimal rendering,
//! so `0.1_f64` becomes exactly `0.1` rather than the 55-digit binary
//! expansion, and encoding it again gives back the same bits.
//!
//! ## Integer
//!
//! A NULL integer decodes to nothing rather than failing; the caller decides
//! what "nothing" means for its type.

use crate::decimal128::{parse_decimal, Decimal128, Decimal128Ext, Form};
use crate::error::CodecError;
use crate::wire::{Float8, InfinityModifier, Int8, Numeric};
use crate::Result;
use num_bigint::{BigInt, Sign};

/// Widest magnitude, in bits, a numeric value may carry.
pub const MAX_MAGNITUDE_BITS: u64 = 128;

/// Wire type names used in error messages.
pub(crate) const NUMERIC: &str = "numeric";
pub(crate) const FLOAT8: &str = "float8";
pub(crate) const INT8: &str = "int8";

/// Types of special floating-point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialValueKind {
    /// Positive infinity (+∞).
    PositiveInfinity,
    /// Negative infinity (-∞).
    NegativeInfinity,
    /// Not a Number (NaN).
    NaN,
}

impl SpecialValueKind {
    /// The numeric infinity modifier matching this value.
    ///
    /// NaN has no modifier and maps to [`InfinityModifier::Finite`].
    pub fn infinity_modifier(self) -> InfinityModifier {
        match self {
            SpecialValueKind::PositiveInfinity => InfinityModifier::Infinity,
            SpecialValueKind::NegativeInfinity => InfinityModifier::NegativeInfinity,
            SpecialValueKind::NaN => InfinityModifier::Finite,
        }
    }
}

/// Classify a float value as regular or special.
pub fn classify_float(v: f64) -> Option<SpecialValueKind> {
    if v.is_nan() {
        Some(SpecialValueKind::NaN)
    } else if v == f64::INFINITY {
        Some(SpecialValueKind::PositiveInfinity)
    } else if v == f64::NEG_INFINITY {
        Some(SpecialValueKind::NegativeInfinity)
    } else {
        None
    }
}

/// Decode a numeric wire value into a decimal.
///
/// Fails with `NullValue`, `NotANumber` or `NonFiniteValue` for the
/// corresponding wire states, and with `Range` when the exponent cannot be
/// represented.
///
/// # Panics
///
/// Panics if the magnitude is wider than [`MAX_MAGNITUDE_BITS`]. Such a
/// value cannot come from a well-formed decimal and indicates a caller bug.
///
/// # Example
/// ```
/// use pg_decimal128::codec::decode_numeric;
/// use pg_decimal128::Numeric;
///
/// let d = decode_numeric(&Numeric::new(-12345, -2), "Decimal").unwrap();
/// assert_eq!(d.to_string(), "-123.45");
/// ```
pub fn decode_numeric(v: &Numeric, target: &'static str) -> Result<Decimal128> {
    if !v.valid {
        return Err(CodecError::NullValue { target });
    }

    if v.nan {
        return Err(CodecError::NotANumber {
            source_type: NUMERIC,
            target,
        });
    }

    if v.infinity_modifier != InfinityModifier::Finite {
        return Err(CodecError::NonFiniteValue {
            source_type: NUMERIC,
            target,
            modifier: v.infinity_modifier,
        });
    }

    compose_decimal(v, target)
}

/// Build a decimal from the finite part of a numeric value.
pub(crate) fn compose_decimal(v: &Numeric, target: &'static str) -> Result<Decimal128> {
    let bits = v.int.bits();
    assert!(
        bits <= MAX_MAGNITUDE_BITS,
        "numeric magnitude of {bits} bits exceeds {MAX_MAGNITUDE_BITS} bits"
    );

    let (sign, magnitude) = v.int.to_bytes_be();
    Decimal128::compose(Form::Finite, sign == Sign::Minus, &magnitude, v.exp).map_err(|_| {
        CodecError::Range {
            source_type: NUMERIC,
            value: format!("{}e{}", v.int, v.exp),
            target,
        }
    })
}

/// Encode a decimal as a numeric wire value.
///
/// Finite values and both infinities always succeed. NaN fails with
/// `NotANumber`, since the numeric encoding path never produces a NaN.
pub fn encode_numeric(d: &Decimal128, source_type: &'static str) -> Result<Numeric> {
    if d.is_nan() {
        return Err(CodecError::NotANumber {
            source_type,
            target: NUMERIC,
        });
    }

    let parts = d.decompose();
    let infinity_modifier = InfinityModifier::from_form(parts.form as u8, parts.negative);

    let sign = if parts.negative {
        Sign::Minus
    } else {
        Sign::Plus
    };
    let int = BigInt::from_bytes_be(sign, parts.coefficient());

    Ok(Numeric {
        int,
        exp: parts.exponent,
        nan: false,
        infinity_modifier,
        valid: true,
    })
}

/// Decode a float wire value into a decimal.
///
/// The float is rendered with the shortest digits that parse back to the
/// same bits, and that rendering is parsed as the decimal.
pub fn decode_float(v: Float8, target: &'static str) -> Result<Decimal128> {
    if !v.valid {
        return Err(CodecError::NullValue { target });
    }

    match classify_float(v.value) {
        Some(SpecialValueKind::NaN) => Err(CodecError::NotANumber {
            source_type: FLOAT8,
            target,
        }),
        Some(kind) => Err(CodecError::NonFiniteValue {
            source_type: FLOAT8,
            target,
            modifier: kind.infinity_modifier(),
        }),
        None => Ok(parse_decimal(&v.value.to_string())?),
    }
}

/// Encode a decimal as the nearest float. Never fails.
pub fn encode_float(d: &Decimal128) -> Float8 {
    Float8::new(d.to_f64())
}

/// Decode an integer wire value, or `None` for NULL.
pub fn decode_int(v: Int8) -> Option<Decimal128> {
    v.valid.then(|| Decimal128::from(v.value))
}

/// Encode a decimal as an integer wire value.
///
/// Fails with `Range` for a fractional part, a magnitude outside `i64`,
/// NaN or infinity.
pub fn encode_int(d: &Decimal128, source_type: &'static str) -> Result<Int8> {
    d.to_i64().map(Int8::new).ok_or_else(|| CodecError::Range {
        source_type,
        value: d.to_string(),
        target: INT8,
    })
}
