//! The caller-owned type map, the `numeric` codec and registration.
//!
//! A [`TypeMap`] knows PostgreSQL types by name and OID, the default
//! PostgreSQL type name of Rust types, and an ordered list of plan-wrapping
//! hooks. [`register`] installs everything this crate provides into a map:
//!
//! ```
//! use pg_decimal128::registry::{register, NUMERIC_OID};
//! use pg_decimal128::{Decimal128, Format, NumericCodec, TypeMap};
//!
//! let mut map = TypeMap::new();
//! register(&mut map);
//!
//! let d = NumericCodec
//!     .decode_value(&map, NUMERIC_OID, Format::Text, Some(b"-1.50"))
//!     .unwrap();
//! assert_eq!(d, Some("-1.5".parse::<Decimal128>().unwrap()));
//! assert_eq!(map.default_type_name::<Vec<Option<Decimal128>>>(), Some("_numeric"));
//! ```
//!
//! Nothing here is global: two maps never share state.

use crate::decimal::Decimal;
use crate::decimal128::Decimal128;
use crate::error::CodecError;
use crate::format::{self, Format};
use crate::nullable::NullDecimal;
use crate::plan::{
    try_wrap_numeric_encode_plan, try_wrap_numeric_scan_plan, EncodePlan, EncodeValue, IsNull,
    ScanPlan, ScanTarget, TryWrapEncodePlanFn, TryWrapScanPlanFn, ValueKind,
};
use crate::wire::{Numeric, NumericScanner, NumericValuer};
use crate::Result;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// OID of the PostgreSQL `numeric` type.
pub const NUMERIC_OID: u32 = 1700;

/// OID of the PostgreSQL `_numeric` (numeric array) type.
pub const NUMERIC_ARRAY_OID: u32 = 1231;

/// Name of the PostgreSQL `numeric` type.
pub const NUMERIC_TYPE_NAME: &str = "numeric";

/// Name of the PostgreSQL `_numeric` type.
pub const NUMERIC_ARRAY_TYPE_NAME: &str = "_numeric";

/// Builds encode and scan plans for one PostgreSQL type.
pub trait Codec: Send + Sync {
    /// Whether the codec reads and writes `format`.
    fn format_supported(&self, format: Format) -> bool;

    /// The format to use when the caller has no preference.
    fn preferred_format(&self) -> Format;

    /// A plan encoding values of `kind`, if the codec handles them directly.
    fn plan_encode(&self, format: Format, kind: ValueKind) -> Option<Box<dyn EncodePlan>>;

    /// A plan scanning into destinations of `kind`, if the codec handles
    /// them directly.
    fn plan_scan(&self, format: Format, kind: ValueKind) -> Option<Box<dyn ScanPlan>>;
}

/// A registered PostgreSQL type.
#[derive(Clone)]
pub struct PgType {
    /// Type name, e.g. `numeric`.
    pub name: String,
    /// Type OID.
    pub oid: u32,
    /// Codec for values of this type.
    pub codec: Arc<dyn Codec>,
}

impl PgType {
    /// Create a type entry.
    pub fn new(name: impl Into<String>, oid: u32, codec: Arc<dyn Codec>) -> Self {
        PgType {
            name: name.into(),
            oid,
            codec,
        }
    }
}

impl std::fmt::Debug for PgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgType")
            .field("name", &self.name)
            .field("oid", &self.oid)
            .finish_non_exhaustive()
    }
}

/// Registered types, default type names and plan-wrapping hooks.
#[derive(Default)]
pub struct TypeMap {
    types_by_name: HashMap<String, PgType>,
    types_by_oid: HashMap<u32, PgType>,
    default_type_names: HashMap<TypeId, String>,
    encode_wrappers: Vec<TryWrapEncodePlanFn>,
    scan_wrappers: Vec<TryWrapScanPlanFn>,
}

impl TypeMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any type with the same name or OID.
    pub fn register_type(&mut self, pg_type: PgType) {
        self.types_by_oid.insert(pg_type.oid, pg_type.clone());
        self.types_by_name.insert(pg_type.name.clone(), pg_type);
    }

    /// Look up a type by name.
    pub fn type_for_name(&self, name: &str) -> Option<&PgType> {
        self.types_by_name.get(name)
    }

    /// Look up a type by OID.
    pub fn type_for_oid(&self, oid: u32) -> Option<&PgType> {
        self.types_by_oid.get(&oid)
    }

    /// Record `name` as the PostgreSQL type used for values of `T`.
    pub fn register_default_pg_type<T: 'static>(&mut self, name: &str) {
        self.default_type_names
            .insert(TypeId::of::<T>(), name.to_string());
    }

    /// The PostgreSQL type name registered for `T`.
    pub fn default_type_name<T: 'static>(&self) -> Option<&str> {
        self.default_type_names
            .get(&TypeId::of::<T>())
            .map(String::as_str)
    }

    /// Install an encode hook ahead of the existing ones.
    pub fn prepend_encode_wrapper(&mut self, hook: TryWrapEncodePlanFn) {
        self.encode_wrappers.insert(0, hook);
    }

    /// Install a scan hook ahead of the existing ones.
    pub fn prepend_scan_wrapper(&mut self, hook: TryWrapScanPlanFn) {
        self.scan_wrappers.insert(0, hook);
    }

    /// Resolve a plan encoding values of `kind` as type `oid`.
    pub fn plan_encode(
        &self,
        oid: u32,
        format: Format,
        kind: ValueKind,
    ) -> Result<Box<dyn EncodePlan>> {
        let not_found = || CodecError::PlanNotFound(format!("encode ({kind:?} as oid {oid})"));
        let pg_type = self.type_for_oid(oid).ok_or_else(not_found)?;
        if !pg_type.codec.format_supported(format) {
            return Err(not_found());
        }
        self.build_encode_plan(pg_type.codec.as_ref(), format, kind, 0)
            .ok_or_else(not_found)
    }

    /// Resolve a plan scanning type `oid` into destinations of `kind`.
    pub fn plan_scan(&self, oid: u32, format: Format, kind: ValueKind) -> Result<Box<dyn ScanPlan>> {
        let not_found = || CodecError::PlanNotFound(format!("scan (oid {oid} into {kind:?})"));
        let pg_type = self.type_for_oid(oid).ok_or_else(not_found)?;
        if !pg_type.codec.format_supported(format) {
            return Err(not_found());
        }
        self.build_scan_plan(pg_type.codec.as_ref(), format, kind, 0)
            .ok_or_else(not_found)
    }

    // Hooks before `start` are already part of the chain being built.
    fn build_encode_plan(
        &self,
        codec: &dyn Codec,
        format: Format,
        kind: ValueKind,
        start: usize,
    ) -> Option<Box<dyn EncodePlan>> {
        if let Some(plan) = codec.plan_encode(format, kind) {
            return Some(plan);
        }

        for (i, hook) in self.encode_wrappers.iter().enumerate().skip(start) {
            if let Some((mut wrapper, next_kind)) = hook(kind) {
                if let Some(next) = self.build_encode_plan(codec, format, next_kind, i + 1) {
                    wrapper.set_next(next);
                    return Some(wrapper.into_plan());
                }
            }
        }
        None
    }

    fn build_scan_plan(
        &self,
        codec: &dyn Codec,
        format: Format,
        kind: ValueKind,
        start: usize,
    ) -> Option<Box<dyn ScanPlan>> {
        if let Some(plan) = codec.plan_scan(format, kind) {
            return Some(plan);
        }

        for (i, hook) in self.scan_wrappers.iter().enumerate().skip(start) {
            if let Some((mut wrapper, next_kind)) = hook(kind) {
                if let Some(next) = self.build_scan_plan(codec, format, next_kind, i + 1) {
                    wrapper.set_next(next);
                    return Some(wrapper.into_plan());
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMap")
            .field("types", &self.types_by_name.keys().collect::<Vec<_>>())
            .field("default_type_names", &self.default_type_names.len())
            .field("encode_wrappers", &self.encode_wrappers.len())
            .field("scan_wrappers", &self.scan_wrappers.len())
            .finish()
    }
}

/// Codec for the PostgreSQL `numeric` type.
///
/// Serves [`Decimal`] and [`NullDecimal`] directly in both formats. Bare
/// [`Decimal128`] values are served through the hooks [`register`]
/// installs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericCodec;

impl NumericCodec {
    /// Decode raw `numeric` bytes into a decimal.
    ///
    /// A NULL source (`None`) decodes to `Ok(None)`. Otherwise a scan plan
    /// for [`Decimal`] is resolved through `map` and the bytes are scanned
    /// with it.
    pub fn decode_value(
        &self,
        map: &TypeMap,
        oid: u32,
        format: Format,
        src: Option<&[u8]>,
    ) -> Result<Option<Decimal128>> {
        let Some(src) = src else {
            return Ok(None);
        };

        let plan = map.plan_scan(oid, format, ValueKind::Decimal)?;
        let mut target = Decimal::default();
        plan.scan(Some(src), ScanTarget::Decimal(&mut target))?;
        Ok(Some(target.into_inner()))
    }
}

impl Codec for NumericCodec {
    fn format_supported(&self, format: Format) -> bool {
        matches!(format, Format::Text | Format::Binary)
    }

    fn preferred_format(&self) -> Format {
        Format::Binary
    }

    fn plan_encode(&self, format: Format, kind: ValueKind) -> Option<Box<dyn EncodePlan>> {
        match kind {
            ValueKind::Decimal | ValueKind::NullDecimal => Some(Box::new(NumericEncodePlan { format })),
            ValueKind::Decimal128 => None,
        }
    }

    fn plan_scan(&self, format: Format, kind: ValueKind) -> Option<Box<dyn ScanPlan>> {
        match kind {
            ValueKind::Decimal | ValueKind::NullDecimal => Some(Box::new(NumericScanPlan { format })),
            ValueKind::Decimal128 => None,
        }
    }
}

/// Writes a numeric valuer in one format.
struct NumericEncodePlan {
    format: Format,
}

impl EncodePlan for NumericEncodePlan {
    fn encode(&self, value: EncodeValue<'_>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let numeric = match value {
            EncodeValue::Decimal(d) => d.numeric_value()?,
            EncodeValue::NullDecimal(n) => n.numeric_value()?,
            EncodeValue::Decimal128(_) => {
                return Err(CodecError::PlanNotFound(format!(
                    "numeric encode for {}",
                    type_name::<Decimal128>()
                )))
            }
        };

        if !numeric.valid {
            return Ok(IsNull::Yes);
        }
        format::encode(&numeric, self.format, buf)?;
        Ok(IsNull::No)
    }
}

/// Reads a numeric in one format into a numeric scanner.
struct NumericScanPlan {
    format: Format,
}

impl ScanPlan for NumericScanPlan {
    fn scan(&self, src: Option<&[u8]>, target: ScanTarget<'_>) -> Result<()> {
        let numeric = match src {
            Some(src) => format::decode(src, self.format)?,
            None => Numeric::null(),
        };

        match target {
            ScanTarget::Decimal(d) => d.scan_numeric(&numeric),
            ScanTarget::NullDecimal(n) => n.scan_numeric(&numeric),
            ScanTarget::Decimal128(_) => Err(CodecError::PlanNotFound(format!(
                "numeric scan into {}",
                type_name::<Decimal128>()
            ))),
        }
    }
}

/// Map the six supported forms of `T` to the numeric type names.
fn register_default_variants<T: 'static>(map: &mut TypeMap) {
    map.register_default_pg_type::<T>(NUMERIC_TYPE_NAME);
    map.register_default_pg_type::<Option<T>>(NUMERIC_TYPE_NAME);
    map.register_default_pg_type::<Vec<T>>(NUMERIC_ARRAY_TYPE_NAME);
    map.register_default_pg_type::<Option<Vec<T>>>(NUMERIC_ARRAY_TYPE_NAME);
    map.register_default_pg_type::<Vec<Option<T>>>(NUMERIC_ARRAY_TYPE_NAME);
    map.register_default_pg_type::<Option<Vec<Option<T>>>>(NUMERIC_ARRAY_TYPE_NAME);
}

/// Install decimal support into `map`.
///
/// Prepends the numeric plan-wrapping hooks, registers the `numeric` type
/// with [`NumericCodec`], and maps every supported form of [`Decimal128`],
/// [`Decimal`] and [`NullDecimal`] to `numeric` or `_numeric`.
pub fn register(map: &mut TypeMap) {
    map.prepend_encode_wrapper(try_wrap_numeric_encode_plan);
    map.prepend_scan_wrapper(try_wrap_numeric_scan_plan);

    map.register_type(PgType::new(
        NUMERIC_TYPE_NAME,
        NUMERIC_OID,
        Arc::new(NumericCodec),
    ));

    register_default_variants::<Decimal128>(map);
    register_default_variants::<Decimal>(map);
    register_default_variants::<NullDecimal>(map);

    log::debug!(
        "registered {} (oid {}) for Decimal128, Decimal and NullDecimal",
        NUMERIC_TYPE_NAME,
        NUMERIC_OID
    );
}
