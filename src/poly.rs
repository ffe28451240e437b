//! Polymorphic record resolution.
//!
//! A polymorphic record decodes its base fields first, then reads the
//! discriminator from the decoded base to pick a subtype. The logical tree is
//! externally tagged, `{"<variant>": {base fields, subtype fields}}`, which is
//! the shape serde gives a Rust enum with one variant per concrete record.
//!
//! Discriminator values with no mapping fall back to the base shape. That is
//! reported as a leniency recovery and never fails the decode.

use crate::fields;
use crate::session::Context;
use crate::{Error, FieldType, Map, Polymorphism, RecordSpec, Result, Value};

/// Decodes an array whose elements are records of the polymorphic `spec`.
pub(crate) fn decode_array(
    ctx: &mut Context<'_>,
    spec: &RecordSpec,
    value: &Value,
) -> Result<Value> {
    if spec.polymorphism.is_none() {
        return Err(Error::invalid_spec(
            "polymorphic array decode needs a record with a discriminator",
        ));
    }
    let elements = match value {
        Value::Array(elements) => elements,
        other => return Err(Error::type_mismatch(ctx.path(), "array", other.kind())),
    };
    ctx.descend(|ctx| {
        let mut out = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            out.push(ctx.at_index(index, |ctx| fields::decode_record(ctx, spec, element))?);
        }
        tracing::trace!(elements = out.len(), "decoded polymorphic array");
        Ok(Value::Array(out))
    })
}

/// Decodes one wire object into its concrete, variant-tagged logical tree.
pub(crate) fn decode_concrete(
    ctx: &mut Context<'_>,
    spec: &RecordSpec,
    polymorphism: &Polymorphism,
    obj: &Map,
) -> Result<Value> {
    let mut out = Map::with_capacity(spec.fields.len());
    fields::decode_fields(ctx, spec, obj, &mut out)?;

    let discriminator = out.get(&polymorphism.discriminator).unwrap_or(&Value::Null);
    let tag = tag_of(discriminator);
    if let Some(subtype) = tag.as_deref().and_then(|t| polymorphism.subtype_for_tag(t)) {
        fields::decode_fields(ctx, &subtype.extra, obj, &mut out)?;
        return Ok(tagged(&subtype.variant, out));
    }

    if !tag.as_deref().map_or(false, |t| polymorphism.is_base_tag(t)) {
        let cause = Error::UnknownDiscriminator {
            path: discriminator_path(ctx, spec, polymorphism),
            value: discriminator.to_string(),
        };
        ctx.recover(cause, &Value::from(polymorphism.base_variant.as_str()));
    }
    Ok(tagged(&polymorphism.base_variant, out))
}

/// Encodes a variant-tagged logical tree into one wire object.
///
/// The discriminator is written first, then the remaining base fields, then
/// the subtype fields. Subtypes emit their own tag as the discriminator,
/// whatever the logical record holds there. The base variant keeps its logical
/// discriminator, which must not be a subtype tag.
pub(crate) fn encode_concrete(
    ctx: &mut Context<'_>,
    spec: &RecordSpec,
    polymorphism: &Polymorphism,
    value: &Value,
) -> Result<Value> {
    let mut entries = fields::expect_object(ctx, value)?.iter();
    let (variant, inner) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(Error::type_mismatch(
                ctx.path(),
                "object with one variant key",
                "object",
            ))
        }
    };
    let discriminator = spec.field(&polymorphism.discriminator).ok_or_else(|| {
        Error::invalid_spec(format!(
            "discriminator {:?} is not a base field",
            polymorphism.discriminator
        ))
    })?;
    let mut obj = ctx.at_key(variant, |ctx| fields::expect_object(ctx, inner).map(Map::clone))?;

    let extra = if *variant == polymorphism.base_variant {
        let tag = obj.get(&discriminator.name).and_then(tag_of);
        if let Some(tag) = tag.filter(|t| polymorphism.subtype_for_tag(t).is_some()) {
            return Err(Error::type_mismatch(
                discriminator_path(ctx, spec, polymorphism),
                "tag of the base variant",
                &format!("subtype tag {:?}", tag),
            ));
        }
        None
    } else {
        let subtype = polymorphism
            .subtype_for_variant(variant)
            .ok_or_else(|| Error::unknown_variant(ctx.path(), variant))?;
        obj.insert(
            discriminator.name.clone(),
            tag_value(&discriminator.ty, &subtype.tag),
        );
        Some(&subtype.extra)
    };

    let rest = spec.fields.iter().filter(|f| f.name != discriminator.name);
    let extra_fields = extra.into_iter().flat_map(|extra| extra.fields.iter());
    let mut out = Map::with_capacity(spec.fields.len());
    fields::encode_fields(
        ctx,
        std::iter::once(discriminator).chain(rest).chain(extra_fields),
        &obj,
        &mut out,
    )?;
    Ok(Value::Object(out))
}

fn tag_of(discriminator: &Value) -> Option<String> {
    match discriminator {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Logical discriminator value for a tag, matching what decode reads back.
fn tag_value(ty: &FieldType, tag: &str) -> Value {
    match ty {
        FieldType::Int => tag.parse::<i64>().map_or_else(|_| Value::from(tag), Value::from),
        _ => Value::from(tag),
    }
}

fn tagged(variant: &str, fields: Map) -> Value {
    let mut wrapper = Map::with_capacity(1);
    wrapper.insert(variant.to_string(), Value::Object(fields));
    Value::Object(wrapper)
}

fn discriminator_path(ctx: &Context<'_>, spec: &RecordSpec, polymorphism: &Polymorphism) -> String {
    match spec.field(&polymorphism.discriminator) {
        Some(field) => {
            let mut keys: Vec<&str> = field.nested.iter().map(String::as_str).collect();
            keys.push(field.wire_key.as_str());
            ctx.path_with(&keys)
        }
        None => ctx.path(),
    }
}
