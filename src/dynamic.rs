//! Dynamic-key map codec.
//!
//! A wire object whose keys are data rather than schema, such as
//! `{"banana": {...}, "orange": {...}}`, decodes into an ordered array of
//! items. Each item carries its key under the spec's name field followed by
//! the fields of the item record. Encode reverses this, keyed by item name in
//! item order.

use crate::fields;
use crate::session::Context;
use crate::{DynamicMapSpec, Error, Map, Result, Value};

/// Decodes a dynamic-key object into an array of named item objects.
pub(crate) fn decode(ctx: &mut Context<'_>, spec: &DynamicMapSpec, value: &Value) -> Result<Value> {
    ctx.descend(|ctx| {
        let obj = fields::expect_object(ctx, value)?;
        let mut items = Vec::with_capacity(obj.len());
        for (key, raw) in obj {
            let item = ctx.at_key(key, |ctx| {
                ctx.descend(|ctx| {
                    let inner = fields::expect_object(ctx, raw)?;
                    let mut out = Map::with_capacity(spec.item.fields.len() + 1);
                    out.insert(spec.name_field.clone(), Value::String(key.clone()));
                    fields::decode_fields(ctx, &spec.item, inner, &mut out)?;
                    Ok(Value::Object(out))
                })
            })?;
            items.push(item);
        }
        tracing::trace!(items = items.len(), "decoded dynamic map");
        Ok(Value::Array(items))
    })
}

/// Encodes an array of named item objects into a dynamic-key object.
pub(crate) fn encode(
    ctx: &mut Context<'_>,
    spec: &DynamicMapSpec,
    logical: &Value,
) -> Result<Value> {
    ctx.descend(|ctx| {
        let items = match logical {
            Value::Array(items) => items,
            other => return Err(Error::type_mismatch(ctx.path(), "array", other.kind())),
        };
        let mut out = Map::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            ctx.at_index(index, |ctx| {
                let obj = fields::expect_object(ctx, item)?;
                let name = match obj.get(&spec.name_field) {
                    Some(Value::String(name)) => name,
                    Some(other) => {
                        return Err(Error::type_mismatch(
                            ctx.path_with(&[spec.name_field.as_str()]),
                            "string",
                            other.kind(),
                        ));
                    }
                    None => {
                        return Err(Error::missing_field(
                            ctx.path_with(&[spec.name_field.as_str()]),
                        ));
                    }
                };
                if out.contains_key(name) {
                    return Err(Error::duplicate_key(ctx.path(), name));
                }
                let wire = fields::encode_record(ctx, &spec.item, item)?;
                out.insert(name.clone(), wire);
                Ok(())
            })?;
        }
        Ok(Value::Object(out))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value, FieldSpec, FieldType, Options, RecordSpec};

    fn fruit_spec() -> DynamicMapSpec {
        DynamicMapSpec::new(
            RecordSpec::new()
                .with_field(FieldSpec::required("price", FieldType::Float))
                .with_field(FieldSpec::required("color", FieldType::String)),
        )
    }

    #[test]
    fn test_decode_keeps_key_order() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let wire = value!({
            "orange": { "price": 1.5, "color": "orange" },
            "banana": { "price": 0.5, "color": "yellow" }
        });
        let logical = decode(&mut ctx, &fruit_spec(), &wire).unwrap();
        assert_eq!(
            logical,
            value!([
                { "name": "orange", "price": 1.5, "color": "orange" },
                { "name": "banana", "price": 0.5, "color": "yellow" }
            ])
        );
    }

    #[test]
    fn test_encode_inverts_decode() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let logical = value!([
            { "name": "banana", "price": 0.5, "color": "yellow" }
        ]);
        let wire = encode(&mut ctx, &fruit_spec(), &logical).unwrap();
        assert_eq!(wire, value!({ "banana": { "price": 0.5, "color": "yellow" } }));
    }

    #[test]
    fn test_empty_map() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        assert_eq!(decode(&mut ctx, &fruit_spec(), &value!({})).unwrap(), value!([]));
        assert_eq!(encode(&mut ctx, &fruit_spec(), &value!([])).unwrap(), value!({}));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let logical = value!([
            { "name": "banana", "price": 0.5, "color": "yellow" },
            { "name": "banana", "price": 0.7, "color": "green" }
        ]);
        let err = encode(&mut ctx, &fruit_spec(), &logical).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateKey { ref key, ref path } if key == "banana" && path == "$[1]"
        ));
    }

    #[test]
    fn test_item_error_carries_key() {
        let options = Options::new();
        let mut ctx = Context::new(&options);
        let wire = value!({ "banana": { "price": "cheap", "color": "yellow" } });
        let err = decode(&mut ctx, &fruit_spec(), &wire).unwrap_err();
        assert_eq!(err.path(), Some("$.banana.price"));
    }
}
