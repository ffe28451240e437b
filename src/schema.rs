//! Declarative schemas.
//!
//! A [`RecordSpec`] describes how one domain type maps onto the wire: which
//! logical fields exist, under which wire key and nested path each one lives,
//! how missing and null values resolve, and how loosely typed wire values are
//! coerced. Specs are plain values built once, validated with
//! [`RecordSpec::validate`], and then shared read-only across any number of
//! sessions and threads.
//!
//! ```rust
//! use recmap::{EnumSpec, FieldSpec, FieldType, RecordSpec, Value};
//!
//! let person = RecordSpec::new()
//!     .with_field(FieldSpec::required("id_no", FieldType::String).with_wire_key("id"))
//!     .with_field(FieldSpec::required("age", FieldType::Int).with_lenient_int(0))
//!     .with_field(
//!         FieldSpec::required("sex", FieldType::Int)
//!             .with_enum(
//!                 EnumSpec::new("Undefined")
//!                     .with_variant("Man", 0)
//!                     .with_variant("Woman", 1)
//!                     .with_variant("Undefined", 2),
//!             )
//!             .with_null_default("Undefined"),
//!     )
//!     .with_field(FieldSpec::optional("address", FieldType::String))
//!     .with_field(FieldSpec::required("height", FieldType::String).with_nested(["feature"]));
//!
//! assert!(person.validate().is_ok());
//! assert_eq!(person.field("id_no").map(|f| f.wire_key.as_str()), Some("id"));
//! ```

use crate::{Error, Result, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Shape of a field's value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    /// Any value, passed through untouched.
    Any,
    Bool,
    Int,
    Float,
    String,
    /// A date string, parsed and rendered by the session's date strategy.
    Date,
    /// A sub-record, possibly polymorphic.
    Record(Arc<RecordSpec>),
    List(Box<FieldType>),
    /// An object whose keys are data, decoded to a list of named items.
    DynamicMap(Arc<DynamicMapSpec>),
}

impl FieldType {
    #[must_use]
    pub fn record(spec: RecordSpec) -> Self {
        FieldType::Record(Arc::new(spec))
    }

    #[must_use]
    pub fn list(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    #[must_use]
    pub fn dynamic_map(spec: DynamicMapSpec) -> Self {
        FieldType::DynamicMap(Arc::new(spec))
    }

    /// Names the expected wire kind, as used in type mismatch messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            FieldType::Any => "any",
            FieldType::Bool => "bool",
            FieldType::Int => "integer",
            FieldType::Float => "number",
            FieldType::String => "string",
            FieldType::Date => "date string",
            FieldType::Record(_) | FieldType::DynamicMap(_) => "object",
            FieldType::List(_) => "array",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            FieldType::Record(spec) => spec.validate(),
            FieldType::List(item) => item.validate(),
            FieldType::DynamicMap(spec) => spec.validate(),
            _ => Ok(()),
        }
    }
}

/// Resolution of a wire key that is present with a null value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum NullPolicy {
    /// Keep null as the logical value. Fails for required fields.
    #[default]
    KeepNull,
    UseDefault(Value),
}

/// Resolution of a wire key that is missing entirely.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AbsentPolicy {
    #[default]
    Error,
    UseDefault(Value),
}

/// How a present, non-null wire value becomes a logical value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Coercion {
    /// The wire kind must match the field type exactly.
    #[default]
    Exact,
    /// Integers or numeric strings; anything else resolves to `fallback`.
    StringToInt { fallback: i64 },
    /// Raw values matched against an enum table; unknown ones resolve to its fallback.
    EnumWithFallback(EnumSpec),
}

/// Raw-value table for an enum field.
///
/// Decode turns a raw wire value into the matching variant name; encode does
/// the reverse. The fallback must be one of the declared variants.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumSpec {
    pub variants: Vec<(String, Value)>,
    pub fallback: String,
}

impl EnumSpec {
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        EnumSpec {
            variants: Vec::new(),
            fallback: fallback.into(),
        }
    }

    #[must_use]
    pub fn with_variant(mut self, name: impl Into<String>, raw: impl Into<Value>) -> Self {
        self.variants.push((name.into(), raw.into()));
        self
    }

    /// Returns the variant name whose raw value equals `raw`.
    #[must_use]
    pub fn name_of(&self, raw: &Value) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, candidate)| raw_eq(candidate, raw))
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn raw_of(&self, name: &str) -> Option<&Value> {
        self.variants
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, raw)| raw)
    }

    fn validate(&self, field: &str, ty: &FieldType) -> Result<()> {
        let mut names = HashSet::new();
        for (name, raw) in &self.variants {
            if !names.insert(name.as_str()) {
                return Err(Error::invalid_spec(format!(
                    "field {:?} declares enum variant {:?} twice",
                    field, name
                )));
            }
            if !raw_matches(ty, raw) {
                return Err(Error::invalid_spec(format!(
                    "field {:?} enum variant {:?} has raw value {} but the field is {}",
                    field,
                    name,
                    raw,
                    ty.describe()
                )));
            }
        }
        if !names.contains(self.fallback.as_str()) {
            return Err(Error::invalid_spec(format!(
                "field {:?} enum fallback {:?} is not a declared variant",
                field, self.fallback
            )));
        }
        Ok(())
    }
}

// Integer raw values compare numerically so `0` and `0.0` select the same variant.
fn raw_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn raw_matches(ty: &FieldType, raw: &Value) -> bool {
    match ty {
        FieldType::Any => true,
        FieldType::Bool => raw.is_bool(),
        FieldType::Int => raw.as_i64().is_some(),
        FieldType::Float => raw.is_number(),
        FieldType::String => raw.is_string(),
        _ => false,
    }
}

/// One logical field of a record.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// Logical name, the key in the typed record.
    pub name: String,
    pub wire_key: String,
    /// Intermediate object keys between the record and `wire_key`.
    pub nested: Vec<String>,
    /// Whether a kept null is an error.
    pub required: bool,
    pub null: NullPolicy,
    pub absent: AbsentPolicy,
    pub coercion: Coercion,
    pub ty: FieldType,
    /// Skip the key on encode when the logical value is null.
    pub omit_if_absent: bool,
}

impl FieldSpec {
    /// A field that must be present and non-null.
    #[must_use]
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        FieldSpec {
            wire_key: name.clone(),
            name,
            nested: Vec::new(),
            required: true,
            null: NullPolicy::KeepNull,
            absent: AbsentPolicy::Error,
            coercion: Coercion::Exact,
            ty,
            omit_if_absent: false,
        }
    }

    /// A field that decodes to null when missing or null.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        FieldSpec {
            required: false,
            absent: AbsentPolicy::UseDefault(Value::Null),
            ..Self::required(name, ty)
        }
    }

    #[must_use]
    pub fn with_wire_key(mut self, key: impl Into<String>) -> Self {
        self.wire_key = key.into();
        self
    }

    /// Places the field under the given chain of nested objects.
    #[must_use]
    pub fn with_nested<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nested = path.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_absent_default(mut self, value: impl Into<Value>) -> Self {
        self.absent = AbsentPolicy::UseDefault(value.into());
        self
    }

    #[must_use]
    pub fn with_null_default(mut self, value: impl Into<Value>) -> Self {
        self.null = NullPolicy::UseDefault(value.into());
        self
    }

    /// Accepts numeric strings, substituting `fallback` for anything unparsable.
    #[must_use]
    pub fn with_lenient_int(mut self, fallback: i64) -> Self {
        self.ty = FieldType::Int;
        self.coercion = Coercion::StringToInt { fallback };
        self
    }

    #[must_use]
    pub fn with_enum(mut self, spec: EnumSpec) -> Self {
        self.coercion = Coercion::EnumWithFallback(spec);
        self
    }

    #[must_use]
    pub fn with_omit_if_absent(mut self) -> Self {
        self.omit_if_absent = true;
        self
    }

    fn location(&self) -> Vec<&str> {
        self.nested
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.wire_key.as_str()))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        match &self.coercion {
            Coercion::Exact => {}
            Coercion::StringToInt { .. } => {
                if self.ty != FieldType::Int {
                    return Err(Error::invalid_spec(format!(
                        "field {:?} uses string-to-int coercion but is {}",
                        self.name,
                        self.ty.describe()
                    )));
                }
            }
            Coercion::EnumWithFallback(spec) => spec.validate(&self.name, &self.ty)?,
        }
        self.ty.validate()
    }
}

/// Discriminator table of a polymorphic record.
#[derive(Clone, Debug, PartialEq)]
pub struct Polymorphism {
    /// Logical name of the base field holding the discriminator.
    pub discriminator: String,
    /// Variant name of records decoded with the base shape only.
    pub base_variant: String,
    /// Discriminator values known to mean the base shape.
    pub base_tags: Vec<String>,
    pub subtypes: Vec<Subtype>,
}

/// A concrete subtype extending the base record.
#[derive(Clone, Debug, PartialEq)]
pub struct Subtype {
    /// Discriminator value selecting this subtype.
    pub tag: String,
    pub variant: String,
    /// Fields the subtype adds to the base.
    pub extra: RecordSpec,
}

impl Polymorphism {
    #[must_use]
    pub fn new(discriminator: impl Into<String>, base_variant: impl Into<String>) -> Self {
        Polymorphism {
            discriminator: discriminator.into(),
            base_variant: base_variant.into(),
            base_tags: Vec::new(),
            subtypes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_base_tag(mut self, tag: impl Into<String>) -> Self {
        self.base_tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_subtype(
        mut self,
        tag: impl Into<String>,
        variant: impl Into<String>,
        extra: RecordSpec,
    ) -> Self {
        self.subtypes.push(Subtype {
            tag: tag.into(),
            variant: variant.into(),
            extra,
        });
        self
    }

    #[must_use]
    pub fn subtype_for_tag(&self, tag: &str) -> Option<&Subtype> {
        self.subtypes.iter().find(|s| s.tag == tag)
    }

    #[must_use]
    pub fn subtype_for_variant(&self, variant: &str) -> Option<&Subtype> {
        self.subtypes.iter().find(|s| s.variant == variant)
    }

    #[must_use]
    pub fn is_base_tag(&self, tag: &str) -> bool {
        self.base_tags.iter().any(|t| t == tag)
    }

    fn validate(&self, base: &RecordSpec) -> Result<()> {
        if base.field(&self.discriminator).is_none() {
            return Err(Error::invalid_spec(format!(
                "discriminator {:?} is not a base field",
                self.discriminator
            )));
        }

        let mut tags: HashSet<&str> = HashSet::new();
        for tag in &self.base_tags {
            if !tags.insert(tag.as_str()) {
                return Err(Error::invalid_spec(format!(
                    "discriminator value {:?} declared twice",
                    tag
                )));
            }
        }

        let mut variants: HashSet<&str> = HashSet::new();
        variants.insert(self.base_variant.as_str());
        for subtype in &self.subtypes {
            if !tags.insert(subtype.tag.as_str()) {
                return Err(Error::invalid_spec(format!(
                    "discriminator value {:?} maps to more than one record",
                    subtype.tag
                )));
            }
            if !variants.insert(subtype.variant.as_str()) {
                return Err(Error::invalid_spec(format!(
                    "variant name {:?} declared twice",
                    subtype.variant
                )));
            }
            if subtype.extra.polymorphism.is_some() {
                return Err(Error::invalid_spec(format!(
                    "subtype {:?} cannot itself be polymorphic",
                    subtype.variant
                )));
            }
            subtype.extra.validate()?;
            check_fields(base.fields.iter().chain(subtype.extra.fields.iter()))?;
        }
        Ok(())
    }
}

/// Schema of one record type.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RecordSpec {
    pub fields: Vec<FieldSpec>,
    pub polymorphism: Option<Polymorphism>,
}

impl RecordSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_polymorphism(mut self, polymorphism: Polymorphism) -> Self {
        self.polymorphism = Some(polymorphism);
        self
    }

    /// Looks up a field by logical name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether every field under `path` may be missing, so the container may be too.
    #[must_use]
    pub fn is_optional_group(&self, path: &[String]) -> bool {
        self.fields
            .iter()
            .filter(|f| f.nested.starts_with(path))
            .all(|f| matches!(f.absent, AbsentPolicy::UseDefault(_)))
    }

    /// Checks the invariants of this spec and every spec nested in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for duplicate logical names, colliding
    /// wire locations, inconsistent coercions or a malformed discriminator table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recmap::{FieldSpec, FieldType, RecordSpec};
    ///
    /// let spec = RecordSpec::new()
    ///     .with_field(FieldSpec::required("id", FieldType::String))
    ///     .with_field(FieldSpec::required("id_no", FieldType::String).with_wire_key("id"));
    /// assert!(spec.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        check_fields(self.fields.iter())?;
        for field in &self.fields {
            field.validate()?;
        }
        if let Some(polymorphism) = &self.polymorphism {
            polymorphism.validate(self)?;
        }
        Ok(())
    }
}

// Logical names must be unique, wire locations must be unique, and no leaf may
// sit where another field expects a nested container.
fn check_fields<'a>(fields: impl Iterator<Item = &'a FieldSpec>) -> Result<()> {
    let mut names = HashSet::new();
    let mut leaves: HashSet<Vec<&str>> = HashSet::new();
    let mut containers: HashSet<Vec<&str>> = HashSet::new();

    for field in fields {
        if !names.insert(field.name.as_str()) {
            return Err(Error::invalid_spec(format!(
                "logical field {:?} declared twice",
                field.name
            )));
        }
        let location = field.location();
        for depth in 1..location.len() {
            containers.insert(location[..depth].to_vec());
        }
        if !leaves.insert(location.clone()) {
            return Err(Error::invalid_spec(format!(
                "wire key {:?} declared twice",
                location.join(".")
            )));
        }
    }

    if let Some(clash) = leaves.iter().find(|leaf| containers.contains(*leaf)) {
        return Err(Error::invalid_spec(format!(
            "wire key {:?} is both a field and a nested container",
            clash.join(".")
        )));
    }
    Ok(())
}

/// Schema of an object whose keys are data.
///
/// Each entry decodes to one item: the key becomes the item's `name_field` and
/// the entry's value decodes against `item`.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicMapSpec {
    pub name_field: String,
    pub item: RecordSpec,
}

impl DynamicMapSpec {
    #[must_use]
    pub fn new(item: RecordSpec) -> Self {
        DynamicMapSpec {
            name_field: "name".to_string(),
            item,
        }
    }

    #[must_use]
    pub fn with_name_field(mut self, name_field: impl Into<String>) -> Self {
        self.name_field = name_field.into();
        self
    }

    /// Checks the item spec and its relation to the name field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] if the item spec is invalid, polymorphic,
    /// or declares a field with the same logical name as `name_field`.
    pub fn validate(&self) -> Result<()> {
        if self.item.polymorphism.is_some() {
            return Err(Error::invalid_spec(
                "dynamic map items cannot be polymorphic",
            ));
        }
        if self.item.field(&self.name_field).is_some() {
            return Err(Error::invalid_spec(format!(
                "dynamic map item declares the name field {:?}",
                self.name_field
            )));
        }
        self.item.validate()
    }
}
