//! Field mapping layer.
//!
//! Moves values between wire locations and logical field names. A field's wire
//! location is its nested path followed by its wire key; decode walks that path
//! into successive objects, encode creates the intermediate objects on demand so
//! fields sharing a path land in one shared container, in declaration order.

use crate::session::Context;
use crate::{coerce, poly, Error, FieldSpec, Map, RecordSpec, Result, Value};

/// Where a field's wire value was found.
pub(crate) enum Lookup<'v> {
    Present(&'v Value),
    Absent,
}

/// Decodes one wire object against `spec` into its logical tree.
pub(crate) fn decode_record(
    ctx: &mut Context<'_>,
    spec: &RecordSpec,
    value: &Value,
) -> Result<Value> {
    ctx.descend(|ctx| {
        let obj = expect_object(ctx, value)?;
        if let Some(polymorphism) = &spec.polymorphism {
            return poly::decode_concrete(ctx, spec, polymorphism, obj);
        }
        let mut out = Map::with_capacity(spec.fields.len());
        decode_fields(ctx, spec, obj, &mut out)?;
        Ok(Value::Object(out))
    })
}

/// Encodes one logical tree against `spec` into its wire object.
pub(crate) fn encode_record(
    ctx: &mut Context<'_>,
    spec: &RecordSpec,
    value: &Value,
) -> Result<Value> {
    ctx.descend(|ctx| {
        if let Some(polymorphism) = &spec.polymorphism {
            return poly::encode_concrete(ctx, spec, polymorphism, value);
        }
        let obj = expect_object(ctx, value)?;
        let mut out = Map::with_capacity(spec.fields.len());
        encode_fields(ctx, spec.fields.iter(), obj, &mut out)?;
        Ok(Value::Object(out))
    })
}

/// Resolves every field of `spec` from `obj`, appending to `out` by logical name.
pub(crate) fn decode_fields(
    ctx: &mut Context<'_>,
    spec: &RecordSpec,
    obj: &Map,
    out: &mut Map,
) -> Result<()> {
    for field in &spec.fields {
        let raw = locate(ctx, spec, field, obj)?;
        let value = at_field(ctx, field, |ctx| coerce::resolve(ctx, field, raw))?;
        out.insert(field.name.clone(), value);
    }
    Ok(())
}

/// Emits each field's logical value from `obj` into its wire location in `out`.
///
/// A field missing from `obj` is encoded as null.
pub(crate) fn encode_fields<'s>(
    ctx: &mut Context<'_>,
    fields: impl Iterator<Item = &'s FieldSpec>,
    obj: &Map,
    out: &mut Map,
) -> Result<()> {
    for field in fields {
        let logical = obj.get(&field.name).unwrap_or(&Value::Null);
        let wire = at_field(ctx, field, |ctx| coerce::emit(ctx, field, logical))?;
        if let Some(wire) = wire {
            place(ctx, field, out, wire)?;
        }
    }
    Ok(())
}

/// Finds the wire value of `field`, walking its nested path.
///
/// A missing or null container is an error unless every field of `spec` under
/// that container may itself be absent.
pub(crate) fn locate<'v>(
    ctx: &Context<'_>,
    spec: &RecordSpec,
    field: &FieldSpec,
    obj: &'v Map,
) -> Result<Lookup<'v>> {
    let mut current = obj;
    for (depth, key) in field.nested.iter().enumerate() {
        let container_path = &field.nested[..=depth];
        match current.get(key) {
            Some(Value::Object(inner)) => current = inner,
            None | Some(Value::Null) => {
                if spec.is_optional_group(container_path) {
                    return Ok(Lookup::Absent);
                }
                return Err(Error::nested_container_missing(
                    ctx.path_with(&as_strs(container_path)),
                ));
            }
            Some(other) => {
                return Err(Error::type_mismatch(
                    ctx.path_with(&as_strs(container_path)),
                    "object",
                    other.kind(),
                ));
            }
        }
    }
    Ok(match current.get(&field.wire_key) {
        Some(value) => Lookup::Present(value),
        None => Lookup::Absent,
    })
}

/// Inserts `wire` at the location of `field`, creating shared containers.
fn place(ctx: &Context<'_>, field: &FieldSpec, out: &mut Map, wire: Value) -> Result<()> {
    let mut current = out;
    for (depth, key) in field.nested.iter().enumerate() {
        current = match current.object_entry(key) {
            Some(inner) => inner,
            None => {
                return Err(Error::type_mismatch(
                    ctx.path_with(&as_strs(&field.nested[..=depth])),
                    "object",
                    "non-object",
                ));
            }
        };
    }
    current.insert(field.wire_key.clone(), wire);
    Ok(())
}

/// Runs `f` with the field's full wire location on the path.
fn at_field<R>(
    ctx: &mut Context<'_>,
    field: &FieldSpec,
    f: impl FnOnce(&mut Context<'_>) -> Result<R>,
) -> Result<R> {
    let mut keys = as_strs(&field.nested);
    keys.push(field.wire_key.as_str());
    ctx.at_keys(&keys, f)
}

pub(crate) fn expect_object<'v>(ctx: &Context<'_>, value: &'v Value) -> Result<&'v Map> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(Error::type_mismatch(ctx.path(), "object", other.kind())),
    }
}

fn as_strs(keys: &[String]) -> Vec<&str> {
    keys.iter().map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value, FieldType, Options};

    fn feature_spec() -> RecordSpec {
        RecordSpec::new()
            .with_field(FieldSpec::required("name", FieldType::String))
            .with_field(FieldSpec::required("height", FieldType::String).with_nested(["feature"]))
            .with_field(FieldSpec::required("weight", FieldType::String).with_nested(["feature"]))
    }

    #[test]
    fn test_nested_fields_decode_flat() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let wire = value!({
            "name": "cishing",
            "feature": { "height": "180cm", "weight": "70kg" }
        });
        let logical = decode_record(&mut ctx, &feature_spec(), &wire).unwrap();
        assert_eq!(
            logical,
            value!({ "name": "cishing", "height": "180cm", "weight": "70kg" })
        );
    }

    #[test]
    fn test_nested_fields_share_one_container() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let logical = value!({ "name": "cishing", "height": "180cm", "weight": "70kg" });
        let wire = encode_record(&mut ctx, &feature_spec(), &logical).unwrap();
        assert_eq!(
            wire,
            value!({
                "name": "cishing",
                "feature": { "height": "180cm", "weight": "70kg" }
            })
        );
    }

    #[test]
    fn test_missing_container_is_structural() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let err = decode_record(&mut ctx, &feature_spec(), &value!({ "name": "x" })).unwrap_err();
        assert!(matches!(err, Error::NestedContainerMissing { ref path } if path == "$.feature"));
    }

    #[test]
    fn test_missing_leaf_inside_container() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let wire = value!({ "name": "x", "feature": { "height": "180cm" } });
        let err = decode_record(&mut ctx, &feature_spec(), &wire).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref path } if path == "$.feature.weight"));
    }

    #[test]
    fn test_optional_group_may_be_missing() {
        let spec = RecordSpec::new()
            .with_field(FieldSpec::optional("height", FieldType::String).with_nested(["feature"]));
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let logical = decode_record(&mut ctx, &spec, &value!({})).unwrap();
        assert_eq!(logical, value!({ "height": null }));
    }

    #[test]
    fn test_container_of_wrong_kind() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let wire = value!({ "name": "x", "feature": "tall" });
        let err = decode_record(&mut ctx, &feature_spec(), &wire).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "$.feature"));
    }

    #[test]
    fn test_deep_nesting_path() {
        let spec = RecordSpec::new().with_field(
            FieldSpec::required("depth", FieldType::Int).with_nested(["a", "b"]),
        );
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let wire = value!({ "a": { "b": { "depth": "deep" } } });
        let err = decode_record(&mut ctx, &spec, &wire).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "$.a.b.depth"));

        let logical = value!({ "depth": 3 });
        let wire = encode_record(&mut ctx, &spec, &logical).unwrap();
        assert_eq!(wire, value!({ "a": { "b": { "depth": 3 } } }));
    }

    #[test]
    fn test_non_object_record() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let err = decode_record(&mut ctx, &feature_spec(), &value!([1])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref found, .. } if found == "array"));
    }
}
