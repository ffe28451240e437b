//! Coercion and optionality resolution.
//!
//! Decode resolves one field's wire lookup into its logical value in three
//! steps: a missing key applies the field's [`AbsentPolicy`], a null applies
//! its [`NullPolicy`], and anything else goes through its [`Coercion`] and type
//! check. Encode runs the inverse of the coercion on the logical value.
//!
//! Lenient integers and enum fallbacks never fail. They substitute the declared
//! fallback and report the recovery through the session context.

use crate::fields::{self, Lookup};
use crate::session::Context;
use crate::{
    dynamic, from_value, to_value, AbsentPolicy, Coercion, EnumSpec, Error, FieldSpec,
    FieldType, NullPolicy, Number, Result, Value,
};
use chrono::NaiveDateTime;

/// Resolves the wire lookup of `field` into its logical value.
pub(crate) fn resolve(ctx: &mut Context<'_>, field: &FieldSpec, raw: Lookup<'_>) -> Result<Value> {
    match raw {
        Lookup::Absent => match &field.absent {
            AbsentPolicy::Error => Err(Error::missing_field(ctx.path())),
            AbsentPolicy::UseDefault(default) => Ok(default.clone()),
        },
        Lookup::Present(Value::Null) => match &field.null {
            NullPolicy::UseDefault(default) => Ok(default.clone()),
            NullPolicy::KeepNull if rejects_null(field) => Err(
                Error::type_mismatch(ctx.path(), field.ty.describe(), "null"),
            ),
            NullPolicy::KeepNull => Ok(Value::Null),
        },
        Lookup::Present(value) => match &field.coercion {
            Coercion::Exact => decode_typed(ctx, &field.ty, value),
            Coercion::StringToInt { fallback } => Ok(lenient_int(ctx, value, *fallback)),
            Coercion::EnumWithFallback(spec) => Ok(enum_name(ctx, spec, value)),
        },
    }
}

/// Produces the wire value of `field` from its logical value.
///
/// Returns `None` when the key should be left out of the wire object.
pub(crate) fn emit(
    ctx: &mut Context<'_>,
    field: &FieldSpec,
    logical: &Value,
) -> Result<Option<Value>> {
    if logical.is_null() {
        if rejects_null(field) {
            return Err(Error::type_mismatch(ctx.path(), field.ty.describe(), "null"));
        }
        return Ok(if field.omit_if_absent {
            None
        } else {
            Some(Value::Null)
        });
    }
    let wire = match &field.coercion {
        Coercion::Exact => encode_typed(ctx, &field.ty, logical)?,
        Coercion::StringToInt { .. } => match logical.as_i64() {
            Some(n) => Value::String(n.to_string()),
            None => return Err(Error::type_mismatch(ctx.path(), "integer", logical.kind())),
        },
        Coercion::EnumWithFallback(spec) => enum_raw(ctx, spec, logical)?,
    };
    Ok(Some(wire))
}

// A required field with no null substitute cannot hold null on either side.
fn rejects_null(field: &FieldSpec) -> bool {
    field.required && field.null == NullPolicy::KeepNull && field.ty != FieldType::Any
}

/// Checks a present, non-null wire value against `ty`.
pub(crate) fn decode_typed(ctx: &mut Context<'_>, ty: &FieldType, value: &Value) -> Result<Value> {
    match (ty, value) {
        (FieldType::Any, _) => Ok(value.clone()),
        (FieldType::Bool, Value::Bool(_))
        | (FieldType::Float, Value::Number(_))
        | (FieldType::String, Value::String(_)) => Ok(value.clone()),
        (FieldType::Int, Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => Err(Error::type_mismatch(ctx.path(), "integer", non_integer(n))),
        },
        (FieldType::Date, Value::String(raw)) => {
            let parsed = ctx
                .options()
                .date_strategy
                .parse(raw)
                .map_err(|e| Error::date_format(ctx.path(), raw, e))?;
            to_value(&parsed)
        }
        (FieldType::Record(spec), _) => fields::decode_record(ctx, spec, value),
        (FieldType::List(item), Value::Array(items)) => ctx.descend(|ctx| {
            let mut out = Vec::with_capacity(items.len());
            for (index, element) in items.iter().enumerate() {
                out.push(ctx.at_index(index, |ctx| decode_element(ctx, item, element))?);
            }
            Ok(Value::Array(out))
        }),
        (FieldType::DynamicMap(spec), _) => dynamic::decode(ctx, spec, value),
        _ => Err(Error::type_mismatch(ctx.path(), ty.describe(), value.kind())),
    }
}

fn decode_element(ctx: &mut Context<'_>, item: &FieldType, element: &Value) -> Result<Value> {
    if element.is_null() && *item != FieldType::Any {
        return Err(Error::type_mismatch(ctx.path(), item.describe(), "null"));
    }
    decode_typed(ctx, item, element)
}

/// Converts a non-null logical value of type `ty` to its wire form.
pub(crate) fn encode_typed(
    ctx: &mut Context<'_>,
    ty: &FieldType,
    logical: &Value,
) -> Result<Value> {
    match (ty, logical) {
        (FieldType::Any, _) => Ok(logical.clone()),
        (FieldType::Bool, Value::Bool(_))
        | (FieldType::Float, Value::Number(_))
        | (FieldType::String, Value::String(_)) => Ok(logical.clone()),
        (FieldType::Int, Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => Err(Error::type_mismatch(ctx.path(), "integer", non_integer(n))),
        },
        (FieldType::Date, _) => {
            let date: NaiveDateTime = from_value(logical.clone())
                .map_err(|e| Error::date_format(ctx.path(), &logical.to_string(), e))?;
            Ok(Value::String(ctx.options().date_strategy.format(&date)))
        }
        (FieldType::Record(spec), _) => fields::encode_record(ctx, spec, logical),
        (FieldType::List(item), Value::Array(items)) => ctx.descend(|ctx| {
            let mut out = Vec::with_capacity(items.len());
            for (index, element) in items.iter().enumerate() {
                out.push(ctx.at_index(index, |ctx| encode_element(ctx, item, element))?);
            }
            Ok(Value::Array(out))
        }),
        (FieldType::DynamicMap(spec), _) => dynamic::encode(ctx, spec, logical),
        _ => Err(Error::type_mismatch(ctx.path(), ty.describe(), logical.kind())),
    }
}

fn encode_element(ctx: &mut Context<'_>, item: &FieldType, element: &Value) -> Result<Value> {
    match (item, element) {
        (FieldType::Any, Value::Null) => Ok(Value::Null),
        (_, Value::Null) => Err(Error::type_mismatch(ctx.path(), item.describe(), "null")),
        _ => encode_typed(ctx, item, element),
    }
}

fn non_integer(n: &Number) -> &'static str {
    if n.as_f64().fract() == 0.0 {
        "out-of-range number"
    } else {
        "fractional number"
    }
}

fn lenient_int(ctx: &Context<'_>, value: &Value, fallback: i64) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) => Value::from(n),
        None => {
            let substitute = Value::from(fallback);
            ctx.recover(
                Error::InvalidInteger {
                    path: ctx.path(),
                    raw: value.to_string(),
                },
                &substitute,
            );
            substitute
        }
    }
}

fn enum_name(ctx: &Context<'_>, spec: &EnumSpec, value: &Value) -> Value {
    if let Some(name) = spec.name_of(value) {
        return Value::from(name);
    }
    let substitute = Value::from(spec.fallback.as_str());
    ctx.recover(
        Error::UnknownEnumValue {
            path: ctx.path(),
            raw: value.to_string(),
        },
        &substitute,
    );
    substitute
}

fn enum_raw(ctx: &Context<'_>, spec: &EnumSpec, logical: &Value) -> Result<Value> {
    let name = logical
        .as_str()
        .ok_or_else(|| Error::type_mismatch(ctx.path(), "variant name", logical.kind()))?;
    spec.raw_of(name)
        .cloned()
        .ok_or_else(|| Error::unknown_variant(ctx.path(), name))
}
