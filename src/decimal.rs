//! The `Decimal` adapter type.
//!
//! [`Decimal`] is a transparent wrapper around [`Decimal128`] that implements
//! the driver-facing scanner and valuer traits. Because the two types share a
//! layout, a `&Decimal128` or `&mut Decimal128` can be viewed as a `Decimal`
//! without copying, which is what the plan-wrapping hooks rely on.
//!
//! NULL handling differs per wire type: scanning NULL numeric or float8
//! values fails with `NullValue`, while a NULL int8 scans to zero.

use crate::codec;
use crate::decimal128::{parse_decimal, Decimal128};
use crate::wire::{
    Float64Scanner, Float64Valuer, Float8, Int64Scanner, Int64Valuer, Int8, Numeric,
    NumericScanner, NumericValuer,
};
use crate::Result;
use bytemuck::TransparentWrapper;
use std::fmt;
use std::str::FromStr;

/// A [`Decimal128`] that can be scanned from and encoded to wire values.
#[derive(Clone, Copy, Default, PartialEq, TransparentWrapper)]
#[repr(transparent)]
pub struct Decimal(pub Decimal128);

impl Decimal {
    /// Name used in error messages.
    pub const TYPE_NAME: &'static str = "Decimal";

    /// View a `Decimal128` reference as a `Decimal`.
    #[inline]
    pub fn from_ref(value: &Decimal128) -> &Decimal {
        Decimal::wrap_ref(value)
    }

    /// View a mutable `Decimal128` reference as a `Decimal`.
    #[inline]
    pub fn from_mut(value: &mut Decimal128) -> &mut Decimal {
        Decimal::wrap_mut(value)
    }

    /// The wrapped decimal.
    #[inline]
    pub fn into_inner(self) -> Decimal128 {
        self.0
    }
}

impl From<Decimal128> for Decimal {
    fn from(value: Decimal128) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for Decimal128 {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl FromStr for Decimal {
    type Err = crate::DecimalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_decimal(s).map(Decimal)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({})", self.0)
    }
}

impl NumericScanner for Decimal {
    fn scan_numeric(&mut self, v: &Numeric) -> Result<()> {
        self.0 = codec::decode_numeric(v, Self::TYPE_NAME)?;
        Ok(())
    }
}

impl NumericValuer for Decimal {
    fn numeric_value(&self) -> Result<Numeric> {
        codec::encode_numeric(&self.0, Self::TYPE_NAME)
    }
}

impl Float64Scanner for Decimal {
    fn scan_float64(&mut self, v: Float8) -> Result<()> {
        self.0 = codec::decode_float(v, Self::TYPE_NAME)?;
        Ok(())
    }
}

impl Float64Valuer for Decimal {
    fn float64_value(&self) -> Result<Float8> {
        Ok(codec::encode_float(&self.0))
    }
}

impl Int64Scanner for Decimal {
    fn scan_int64(&mut self, v: Int8) -> Result<()> {
        self.0 = codec::decode_int(v).unwrap_or_default();
        Ok(())
    }
}

impl Int64Valuer for Decimal {
    fn int64_value(&self) -> Result<Int8> {
        codec::encode_int(&self.0, Self::TYPE_NAME)
    }
}
