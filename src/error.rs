//! Error types for decimal conversion and wire encoding/decoding.

use crate::wire::InfinityModifier;
use thiserror::Error;

/// Errors produced when building a `Decimal128`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// The input string is not a decimal literal.
    #[error("invalid decimal literal {0:?}")]
    Parse(String),

    /// The exponent cannot be represented.
    #[error("decimal exponent out of range")]
    Overflow,

    /// A composed coefficient is wider than 128 bits.
    #[error("coefficient of {0} bytes exceeds 16 bytes")]
    CoefficientTooLarge(usize),
}

/// Errors that can occur while converting between decimals and wire values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// A NULL wire value was scanned into a non-nullable target.
    #[error("cannot scan NULL into {target}")]
    NullValue {
        /// Name of the destination type.
        target: &'static str,
    },

    /// A NaN was found where it cannot be represented.
    #[error("cannot convert NaN {source_type} to {target}")]
    NotANumber {
        /// Name of the source type.
        source_type: &'static str,
        /// Name of the destination type.
        target: &'static str,
    },

    /// An infinite value was found where only finite values are accepted.
    #[error("cannot convert {modifier} {source_type} to {target}")]
    NonFiniteValue {
        /// Name of the source type.
        source_type: &'static str,
        /// Name of the destination type.
        target: &'static str,
        /// Which infinity was found.
        modifier: InfinityModifier,
    },

    /// The value does not fit the target width, or has a disallowed fractional part.
    #[error("cannot convert {source_type} {value} to {target}")]
    Range {
        /// Name of the source type.
        source_type: &'static str,
        /// Text rendering of the offending value.
        value: String,
        /// Name of the destination type.
        target: &'static str,
    },

    /// The raw wire bytes are malformed.
    #[error("invalid numeric wire value: {0}")]
    InvalidWire(String),

    /// The type map could not produce a plan.
    #[error("no {0} plan found")]
    PlanNotFound(String),

    /// The decimal primitive rejected a value.
    #[error(transparent)]
    Decimal(#[from] DecimalError),
}
