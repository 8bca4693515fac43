//! Nullable decimals.
//!
//! [`NullDecimal`] pairs a [`Decimal128`] with a validity flag. A NULL wire
//! value of any type scans into an invalid `NullDecimal` without error, and
//! an invalid `NullDecimal` encodes as NULL. All other failures are the same
//! as for [`Decimal`](crate::Decimal), reported under the `NullDecimal`
//! name.

use crate::codec;
use crate::decimal128::Decimal128;
use crate::wire::{
    Float64Scanner, Float64Valuer, Float8, Int64Scanner, Int64Valuer, Int8, Numeric,
    NumericScanner, NumericValuer,
};
use crate::Result;

/// A decimal that may be NULL.
///
/// When `valid` is false, `decimal` is unspecified and must not be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDecimal {
    /// The value, meaningful only when `valid` is true.
    pub decimal: Decimal128,
    /// False for SQL NULL.
    pub valid: bool,
}

impl NullDecimal {
    /// Name used in error messages.
    pub const TYPE_NAME: &'static str = "NullDecimal";

    /// A non-null value.
    pub fn new(decimal: Decimal128) -> Self {
        NullDecimal {
            decimal,
            valid: true,
        }
    }

    /// SQL NULL.
    pub fn null() -> Self {
        NullDecimal::default()
    }

    /// The value, or `None` for NULL.
    pub fn get(&self) -> Option<Decimal128> {
        self.valid.then_some(self.decimal)
    }
}

impl From<Option<Decimal128>> for NullDecimal {
    fn from(value: Option<Decimal128>) -> Self {
        value.map_or_else(NullDecimal::null, NullDecimal::new)
    }
}

impl From<NullDecimal> for Option<Decimal128> {
    fn from(value: NullDecimal) -> Self {
        value.get()
    }
}

impl PartialEq for NullDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl NumericScanner for NullDecimal {
    fn scan_numeric(&mut self, v: &Numeric) -> Result<()> {
        if !v.valid {
            *self = NullDecimal::null();
            return Ok(());
        }
        *self = NullDecimal::new(codec::decode_numeric(v, Self::TYPE_NAME)?);
        Ok(())
    }
}

/// A NaN value fails with `NotANumber`; only an invalid `NullDecimal` is
/// sent as NULL.
impl NumericValuer for NullDecimal {
    fn numeric_value(&self) -> Result<Numeric> {
        match self.get() {
            Some(d) => codec::encode_numeric(&d, Self::TYPE_NAME),
            None => Ok(Numeric::null()),
        }
    }
}

impl Float64Scanner for NullDecimal {
    fn scan_float64(&mut self, v: Float8) -> Result<()> {
        if !v.valid {
            *self = NullDecimal::null();
            return Ok(());
        }
        *self = NullDecimal::new(codec::decode_float(v, Self::TYPE_NAME)?);
        Ok(())
    }
}

impl Float64Valuer for NullDecimal {
    fn float64_value(&self) -> Result<Float8> {
        Ok(self.get().map_or_else(Float8::null, |d| codec::encode_float(&d)))
    }
}

impl Int64Scanner for NullDecimal {
    fn scan_int64(&mut self, v: Int8) -> Result<()> {
        *self = codec::decode_int(v).into();
        Ok(())
    }
}

impl Int64Valuer for NullDecimal {
    fn int64_value(&self) -> Result<Int8> {
        match self.get() {
            // NaN has no integer form and is sent as NULL.
            Some(d) if d.is_nan() => Ok(Int8::null()),
            Some(d) => codec::encode_int(&d, Self::TYPE_NAME),
            None => Ok(Int8::null()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::wire::InfinityModifier;

    fn dec(s: &str) -> Decimal128 {
        s.parse().unwrap()
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(NullDecimal::from(Some(dec("1"))), NullDecimal::new(dec("1")));
        assert_eq!(NullDecimal::from(None), NullDecimal::null());
        assert_eq!(Option::<Decimal128>::from(NullDecimal::null()), None);

        // The payload of a NULL is not compared.
        let stale = NullDecimal {
            decimal: dec("9"),
            valid: false,
        };
        assert_eq!(stale, NullDecimal::null());
    }

    #[test]
    fn test_null_in_null_out() {
        let mut d = NullDecimal::new(dec("1"));
        d.scan_numeric(&Numeric::null()).unwrap();
        assert!(!d.valid);

        let mut d = NullDecimal::new(dec("1"));
        d.scan_float64(Float8::null()).unwrap();
        assert!(!d.valid);

        let mut d = NullDecimal::new(dec("1"));
        d.scan_int64(Int8::null()).unwrap();
        assert!(!d.valid);

        let null = NullDecimal::null();
        assert_eq!(null.numeric_value().unwrap(), Numeric::null());
        assert_eq!(null.float64_value().unwrap(), Float8::null());
        assert_eq!(null.int64_value().unwrap(), Int8::null());
    }

    #[test]
    fn test_scan_values() {
        let mut d = NullDecimal::null();
        d.scan_numeric(&Numeric::new(12345, -2)).unwrap();
        assert_eq!(d.get(), Some(dec("123.45")));

        d.scan_float64(Float8::new(-0.25)).unwrap();
        assert_eq!(d.get(), Some(dec("-0.25")));

        d.scan_int64(Int8::new(i64::MIN)).unwrap();
        assert_eq!(d.get(), Some(Decimal128::from(i64::MIN)));
    }

    #[test]
    fn test_errors_name_nullable_type() {
        let mut d = NullDecimal::new(dec("2"));

        let err = d.scan_numeric(&Numeric::nan()).unwrap_err();
        assert_eq!(
            err,
            CodecError::NotANumber {
                source_type: "numeric",
                target: "NullDecimal"
            }
        );

        let err = d
            .scan_numeric(&Numeric::infinite(InfinityModifier::NegativeInfinity))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert -infinity numeric to NullDecimal"
        );

        let err = d.scan_float64(Float8::new(f64::INFINITY)).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert infinity float8 to NullDecimal");

        // Failed scans leave the destination as it was.
        assert_eq!(d.get(), Some(dec("2")));

        let err = NullDecimal::new(dec("1.5")).int64_value().unwrap_err();
        assert_eq!(err.to_string(), "cannot convert NullDecimal 1.5 to int8");
    }

    #[test]
    fn test_encode_values() {
        let d = NullDecimal::new(dec("-7.25"));
        assert_eq!(d.numeric_value().unwrap(), Numeric::new(-725, -2));
        assert_eq!(d.float64_value().unwrap(), Float8::new(-7.25));

        let d = NullDecimal::new(dec("42.00"));
        assert_eq!(d.int64_value().unwrap(), Int8::new(42));
    }

    #[test]
    fn test_nan_encoding() {
        let d = NullDecimal::new(Decimal128::NAN);
        assert_eq!(d.int64_value().unwrap(), Int8::null());
        assert!(matches!(
            d.numeric_value(),
            Err(CodecError::NotANumber {
                source_type: "NullDecimal",
                ..
            })
        ));
        assert!(d.float64_value().unwrap().value.is_nan());
    }
}
