//! # pg-decimal128
//!
//! Adapts a fixed-width 128-bit decimal to the PostgreSQL `numeric`,
//! `float8` and `int8` wire values.
//!
//! ## Overview
//!
//! The crate is organised in layers:
//!
//! 1. **Primitive**: [`Decimal128`], the IEEE 754 decimal128 type of the
//!    `dec` crate, with [`Decimal128Ext`] to compose and decompose it
//! 2. **Codecs**: conversions between decimals and the decoded wire values
//!    [`Numeric`], [`Float8`] and [`Int8`] (see [`codec`])
//! 3. **Adapters**: [`Decimal`] and [`NullDecimal`], which implement the
//!    scanner and valuer traits a driver calls
//! 4. **Plans**: a caller-owned [`TypeMap`] that resolves encode and scan
//!    plans for raw bytes in text or binary [`Format`]
//!
//! ## Quick Start
//!
//! ```rust
//! use pg_decimal128::{Decimal, NullDecimal, Numeric, NumericScanner, NumericValuer};
//!
//! // Scan a numeric wire value
//! let mut d = Decimal::default();
//! d.scan_numeric(&Numeric::new(978901234567890123456789i128, -18)).unwrap();
//! assert_eq!(d.to_string(), "978901.234567890123456789");
//!
//! // Encode it again; the representation is kept
//! assert_eq!(d.numeric_value().unwrap(), Numeric::new(978901234567890123456789i128, -18));
//!
//! // NULL scans into a NullDecimal without error
//! let mut n = NullDecimal::default();
//! n.scan_numeric(&Numeric::null()).unwrap();
//! assert_eq!(n.get(), None);
//! ```
//!
//! ## Decoding raw bytes
//!
//! ```rust
//! use pg_decimal128::registry::{register, NUMERIC_OID};
//! use pg_decimal128::{Format, NumericCodec, TypeMap};
//!
//! let mut map = TypeMap::new();
//! register(&mut map);
//!
//! let d = NumericCodec
//!     .decode_value(&map, NUMERIC_OID, Format::Text, Some(b"12.50"))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(d.to_string(), "12.50");
//! ```
//!
//! ## NULL handling
//!
//! | Wire value | `Decimal` | `NullDecimal` |
//! |------------|-----------|---------------|
//! | NULL numeric | error | NULL |
//! | NULL float8 | error | NULL |
//! | NULL int8 | zero | NULL |
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Decimal`] and [`NullDecimal`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
mod decimal;
mod decimal128;
mod error;
pub mod format;
mod nullable;
pub mod plan;
pub mod registry;
mod wire;

#[cfg(feature = "serde")]
mod serde_impl;

pub use decimal::Decimal;
pub use decimal128::{Decimal128, Decimal128Ext, Decomposed, Form};
pub use error::{CodecError, DecimalError};
pub use format::Format;
pub use nullable::NullDecimal;
pub use plan::{IsNull, ValueKind};
pub use registry::{register, NumericCodec, TypeMap};
pub use wire::{
    Float64Scanner, Float64Valuer, Float8, InfinityModifier, Int64Scanner, Int64Valuer, Int8,
    Numeric, NumericScanner, NumericValuer,
};

/// Convenience type alias for Results with CodecError.
pub type Result<T> = std::result::Result<T, CodecError>;
