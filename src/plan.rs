//! Encode and scan plans, and the hooks that adapt raw decimals to them.
//!
//! A plan is resolved once per (type, format, value kind) and then reused for
//! every value of that shape. Codecs only know how to serve the adapter
//! types [`Decimal`] and [`NullDecimal`]. The hooks in this module let a
//! [`TypeMap`](crate::TypeMap) serve a plain [`Decimal128`] as well by
//! wrapping the plan for `Decimal` in a plan that reinterprets the value in
//! place.
//!
//! Values are identified by an explicit [`ValueKind`] rather than by runtime
//! type inspection.

use crate::decimal::Decimal;
use crate::decimal128::Decimal128;
use crate::error::CodecError;
use crate::nullable::NullDecimal;
use crate::Result;

/// The decimal types plans can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A bare [`Decimal128`].
    Decimal128,
    /// The [`Decimal`] adapter.
    Decimal,
    /// The nullable [`NullDecimal`].
    NullDecimal,
}

/// A borrowed value to encode.
#[derive(Debug, Clone, Copy)]
pub enum EncodeValue<'a> {
    /// A bare decimal.
    Decimal128(&'a Decimal128),
    /// The adapter type.
    Decimal(&'a Decimal),
    /// A nullable decimal.
    NullDecimal(&'a NullDecimal),
}

impl EncodeValue<'_> {
    /// The kind of the borrowed value.
    pub fn kind(&self) -> ValueKind {
        match self {
            EncodeValue::Decimal128(_) => ValueKind::Decimal128,
            EncodeValue::Decimal(_) => ValueKind::Decimal,
            EncodeValue::NullDecimal(_) => ValueKind::NullDecimal,
        }
    }
}

impl<'a> From<&'a Decimal128> for EncodeValue<'a> {
    fn from(value: &'a Decimal128) -> Self {
        EncodeValue::Decimal128(value)
    }
}

impl<'a> From<&'a Decimal> for EncodeValue<'a> {
    fn from(value: &'a Decimal) -> Self {
        EncodeValue::Decimal(value)
    }
}

impl<'a> From<&'a NullDecimal> for EncodeValue<'a> {
    fn from(value: &'a NullDecimal) -> Self {
        EncodeValue::NullDecimal(value)
    }
}

/// A borrowed destination to scan into.
#[derive(Debug)]
pub enum ScanTarget<'a> {
    /// A bare decimal.
    Decimal128(&'a mut Decimal128),
    /// The adapter type.
    Decimal(&'a mut Decimal),
    /// A nullable decimal.
    NullDecimal(&'a mut NullDecimal),
}

impl ScanTarget<'_> {
    /// The kind of the borrowed destination.
    pub fn kind(&self) -> ValueKind {
        match self {
            ScanTarget::Decimal128(_) => ValueKind::Decimal128,
            ScanTarget::Decimal(_) => ValueKind::Decimal,
            ScanTarget::NullDecimal(_) => ValueKind::NullDecimal,
        }
    }
}

impl<'a> From<&'a mut Decimal128> for ScanTarget<'a> {
    fn from(value: &'a mut Decimal128) -> Self {
        ScanTarget::Decimal128(value)
    }
}

impl<'a> From<&'a mut Decimal> for ScanTarget<'a> {
    fn from(value: &'a mut Decimal) -> Self {
        ScanTarget::Decimal(value)
    }
}

impl<'a> From<&'a mut NullDecimal> for ScanTarget<'a> {
    fn from(value: &'a mut NullDecimal) -> Self {
        ScanTarget::NullDecimal(value)
    }
}

/// Whether an encoded value is SQL NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsNull {
    /// The value is NULL and nothing was written.
    Yes,
    /// The value was written to the buffer.
    No,
}

/// Encodes values of one kind into wire bytes.
pub trait EncodePlan: Send + Sync {
    /// Append the wire form of `value` to `buf`.
    fn encode(&self, value: EncodeValue<'_>, buf: &mut Vec<u8>) -> Result<IsNull>;
}

/// Scans wire bytes into destinations of one kind.
pub trait ScanPlan: Send + Sync {
    /// Scan `src` into `target`; `None` is SQL NULL.
    fn scan(&self, src: Option<&[u8]>, target: ScanTarget<'_>) -> Result<()>;
}

/// An encode plan that adapts the value and delegates to another plan.
pub trait WrappedEncodePlan: EncodePlan {
    /// Set the plan to delegate to.
    fn set_next(&mut self, next: Box<dyn EncodePlan>);

    /// Convert into a plain plan once `next` is set.
    fn into_plan(self: Box<Self>) -> Box<dyn EncodePlan>;
}

/// A scan plan that adapts the destination and delegates to another plan.
pub trait WrappedScanPlan: ScanPlan {
    /// Set the plan to delegate to.
    fn set_next(&mut self, next: Box<dyn ScanPlan>);

    /// Convert into a plain plan once `next` is set.
    fn into_plan(self: Box<Self>) -> Box<dyn ScanPlan>;
}

/// A hook that may wrap an encode plan.
///
/// Returns the wrapper and the kind the delegate plan must accept, or
/// `None` when the hook does not apply to `kind`.
pub type TryWrapEncodePlanFn = fn(ValueKind) -> Option<(Box<dyn WrappedEncodePlan>, ValueKind)>;

/// A hook that may wrap a scan plan. See [`TryWrapEncodePlanFn`].
pub type TryWrapScanPlanFn = fn(ValueKind) -> Option<(Box<dyn WrappedScanPlan>, ValueKind)>;

/// Wrap encode plans for bare decimals and nullable decimals.
///
/// A [`Decimal128`] is handed on as a [`Decimal`] and a [`NullDecimal`] is
/// handed on unchanged. Any other kind is left alone.
pub fn try_wrap_numeric_encode_plan(
    kind: ValueKind,
) -> Option<(Box<dyn WrappedEncodePlan>, ValueKind)> {
    match kind {
        ValueKind::Decimal128 => {
            log::trace!("wrapping Decimal128 encode plan as Decimal");
            Some((Box::new(WrapDecimalEncodePlan::default()), ValueKind::Decimal))
        }
        ValueKind::NullDecimal => {
            log::trace!("wrapping NullDecimal encode plan");
            Some((
                Box::new(WrapNullDecimalEncodePlan::default()),
                ValueKind::NullDecimal,
            ))
        }
        ValueKind::Decimal => None,
    }
}

/// Wrap scan plans for bare decimals and nullable decimals.
///
/// A [`Decimal128`] destination is filled through a [`Decimal`] view and a
/// [`NullDecimal`] destination is handed on unchanged. Any other kind is left
/// alone.
pub fn try_wrap_numeric_scan_plan(kind: ValueKind) -> Option<(Box<dyn WrappedScanPlan>, ValueKind)> {
    match kind {
        ValueKind::Decimal128 => {
            log::trace!("wrapping Decimal128 scan plan as Decimal");
            Some((Box::new(WrapDecimalScanPlan::default()), ValueKind::Decimal))
        }
        ValueKind::NullDecimal => {
            log::trace!("wrapping NullDecimal scan plan");
            Some((
                Box::new(WrapNullDecimalScanPlan::default()),
                ValueKind::NullDecimal,
            ))
        }
        ValueKind::Decimal => None,
    }
}

fn missing_next(what: &str) -> CodecError {
    CodecError::PlanNotFound(format!("next {what}"))
}

/// Encodes a [`Decimal128`] through the plan for [`Decimal`].
#[derive(Default)]
pub struct WrapDecimalEncodePlan {
    next: Option<Box<dyn EncodePlan>>,
}

impl EncodePlan for WrapDecimalEncodePlan {
    fn encode(&self, value: EncodeValue<'_>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let next = self.next.as_deref().ok_or_else(|| missing_next("encode"))?;
        match value {
            EncodeValue::Decimal128(d) => next.encode(EncodeValue::Decimal(Decimal::from_ref(d)), buf),
            other => next.encode(other, buf),
        }
    }
}

impl WrappedEncodePlan for WrapDecimalEncodePlan {
    fn set_next(&mut self, next: Box<dyn EncodePlan>) {
        self.next = Some(next);
    }

    fn into_plan(self: Box<Self>) -> Box<dyn EncodePlan> {
        self
    }
}

/// Encodes a [`NullDecimal`] through the next plan unchanged.
#[derive(Default)]
pub struct WrapNullDecimalEncodePlan {
    next: Option<Box<dyn EncodePlan>>,
}

impl EncodePlan for WrapNullDecimalEncodePlan {
    fn encode(&self, value: EncodeValue<'_>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let next = self.next.as_deref().ok_or_else(|| missing_next("encode"))?;
        next.encode(value, buf)
    }
}

impl WrappedEncodePlan for WrapNullDecimalEncodePlan {
    fn set_next(&mut self, next: Box<dyn EncodePlan>) {
        self.next = Some(next);
    }

    fn into_plan(self: Box<Self>) -> Box<dyn EncodePlan> {
        self
    }
}

/// Scans into a [`Decimal128`] through the plan for [`Decimal`].
#[derive(Default)]
pub struct WrapDecimalScanPlan {
    next: Option<Box<dyn ScanPlan>>,
}

impl ScanPlan for WrapDecimalScanPlan {
    fn scan(&self, src: Option<&[u8]>, target: ScanTarget<'_>) -> Result<()> {
        let next = self.next.as_deref().ok_or_else(|| missing_next("scan"))?;
        match target {
            ScanTarget::Decimal128(d) => next.scan(src, ScanTarget::Decimal(Decimal::from_mut(d))),
            other => next.scan(src, other),
        }
    }
}

impl WrappedScanPlan for WrapDecimalScanPlan {
    fn set_next(&mut self, next: Box<dyn ScanPlan>) {
        self.next = Some(next);
    }

    fn into_plan(self: Box<Self>) -> Box<dyn ScanPlan> {
        self
    }
}

/// Scans into a [`NullDecimal`] through the next plan unchanged.
#[derive(Default)]
pub struct WrapNullDecimalScanPlan {
    next: Option<Box<dyn ScanPlan>>,
}

impl ScanPlan for WrapNullDecimalScanPlan {
    fn scan(&self, src: Option<&[u8]>, target: ScanTarget<'_>) -> Result<()> {
        let next = self.next.as_deref().ok_or_else(|| missing_next("scan"))?;
        next.scan(src, target)
    }
}

impl WrappedScanPlan for WrapNullDecimalScanPlan {
    fn set_next(&mut self, next: Box<dyn ScanPlan>) {
        self.next = Some(next);
    }

    fn into_plan(self: Box<Self>) -> Box<dyn ScanPlan> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{NumericScanner, NumericValuer};
    use crate::Numeric;

    /// Writes the text of a `Decimal` and scans the integer 7 into one.
    struct DecimalOnly;

    impl EncodePlan for DecimalOnly {
        fn encode(&self, value: EncodeValue<'_>, buf: &mut Vec<u8>) -> Result<IsNull> {
            match value {
                EncodeValue::Decimal(d) => {
                    buf.extend_from_slice(d.to_string().as_bytes());
                    Ok(IsNull::No)
                }
                _ => Err(CodecError::PlanNotFound("test encode".into())),
            }
        }
    }

    impl ScanPlan for DecimalOnly {
        fn scan(&self, _src: Option<&[u8]>, target: ScanTarget<'_>) -> Result<()> {
            match target {
                ScanTarget::Decimal(d) => d.scan_numeric(&Numeric::new(7, 0)),
                _ => Err(CodecError::PlanNotFound("test scan".into())),
            }
        }
    }

    /// Reports NULL for NULL nullable decimals.
    struct NullableOnly;

    impl EncodePlan for NullableOnly {
        fn encode(&self, value: EncodeValue<'_>, _buf: &mut Vec<u8>) -> Result<IsNull> {
            match value {
                EncodeValue::NullDecimal(n) if n.numeric_value()?.valid => Ok(IsNull::No),
                EncodeValue::NullDecimal(_) => Ok(IsNull::Yes),
                _ => Err(CodecError::PlanNotFound("test encode".into())),
            }
        }
    }

    #[test]
    fn test_value_kinds() {
        let d = Decimal128::ZERO;
        assert_eq!(EncodeValue::from(&d).kind(), ValueKind::Decimal128);
        let n = NullDecimal::null();
        assert_eq!(EncodeValue::from(&n).kind(), ValueKind::NullDecimal);

        let mut a = Decimal::default();
        assert_eq!(ScanTarget::from(&mut a).kind(), ValueKind::Decimal);
    }

    #[test]
    fn test_hooks_match_kinds() {
        let (_, kind) = try_wrap_numeric_encode_plan(ValueKind::Decimal128).unwrap();
        assert_eq!(kind, ValueKind::Decimal);
        let (_, kind) = try_wrap_numeric_encode_plan(ValueKind::NullDecimal).unwrap();
        assert_eq!(kind, ValueKind::NullDecimal);
        assert!(try_wrap_numeric_encode_plan(ValueKind::Decimal).is_none());

        let (_, kind) = try_wrap_numeric_scan_plan(ValueKind::Decimal128).unwrap();
        assert_eq!(kind, ValueKind::Decimal);
        let (_, kind) = try_wrap_numeric_scan_plan(ValueKind::NullDecimal).unwrap();
        assert_eq!(kind, ValueKind::NullDecimal);
        assert!(try_wrap_numeric_scan_plan(ValueKind::Decimal).is_none());
    }

    #[test]
    fn test_wrapped_decimal_encode() {
        let (mut plan, _) = try_wrap_numeric_encode_plan(ValueKind::Decimal128).unwrap();
        plan.set_next(Box::new(DecimalOnly));
        let plan = plan.into_plan();

        let d: Decimal128 = "-12.50".parse().unwrap();
        let mut buf = Vec::new();
        assert_eq!(plan.encode((&d).into(), &mut buf).unwrap(), IsNull::No);
        assert_eq!(buf, b"-12.50");
    }

    #[test]
    fn test_wrapped_decimal_scan() {
        let (mut plan, _) = try_wrap_numeric_scan_plan(ValueKind::Decimal128).unwrap();
        plan.set_next(Box::new(DecimalOnly));

        let mut d = Decimal128::ZERO;
        plan.scan(Some(b"ignored"), (&mut d).into()).unwrap();
        assert_eq!(d, Decimal128::from(7));
    }

    #[test]
    fn test_wrapped_null_decimal_encode() {
        let (mut plan, _) = try_wrap_numeric_encode_plan(ValueKind::NullDecimal).unwrap();
        plan.set_next(Box::new(NullableOnly));

        let mut buf = Vec::new();
        let null = NullDecimal::null();
        assert_eq!(plan.encode((&null).into(), &mut buf).unwrap(), IsNull::Yes);
        let one = NullDecimal::new(Decimal128::from(1));
        assert_eq!(plan.encode((&one).into(), &mut buf).unwrap(), IsNull::No);
    }

    #[test]
    fn test_unlinked_wrapper_fails() {
        let (plan, _) = try_wrap_numeric_scan_plan(ValueKind::NullDecimal).unwrap();
        let mut n = NullDecimal::null();
        let err = plan.scan(None, (&mut n).into()).unwrap_err();
        assert_eq!(err.to_string(), "no next scan plan found");
    }
}
