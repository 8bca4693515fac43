//! `serde` support for the adapter types.
//!
//! Decimals serialize as strings so no digits are lost. They deserialize
//! from strings, integers or floats. A [`NullDecimal`] serializes as an
//! optional decimal.

use crate::decimal::Decimal;
use crate::decimal128::{parse_decimal, Decimal128, Decimal128Ext};
use crate::nullable::NullDecimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal value (integer, float, or decimal string)")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        parse_decimal(v).map(Decimal).map_err(de::Error::custom)
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let d = if v.is_nan() {
            Decimal128::NAN
        } else if v.is_infinite() {
            if v > 0.0 {
                Decimal128::infinity()
            } else {
                Decimal128::neg_infinity()
            }
        } else {
            parse_decimal(&v.to_string()).map_err(de::Error::custom)?
        };
        Ok(Decimal(d))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Decimal(Decimal128::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Decimal(Decimal128::from(v)))
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NullDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Decimal>::deserialize(deserializer).map(|d| NullDecimal::from(d.map(|d| d.0)))
    }
}

impl Serialize for NullDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.get().map(Decimal).serialize(serializer)
    }
}
