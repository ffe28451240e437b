//! [`Value`] to typed record conversion.
//!
//! This module provides [`Deserializer`], a serde `Deserializer` over an owned
//! [`Value`]. It is the last step of every decode: once the engine has built the
//! *logical* tree (renamed, un-nested, coerced and defaulted), the domain type is
//! read out of it with its ordinary `Deserialize` impl.
//!
//! Externally tagged enums, `Option`, newtype structs and `#[serde(flatten)]`
//! are supported, so a polymorphic subtype can embed its base record:
//!
//! ```rust
//! use recmap::{from_value, value};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Drink { description: String }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Beer {
//!     #[serde(flatten)]
//!     base: Drink,
//!     alcohol_content: String,
//! }
//!
//! let beer: Beer = from_value(value!({
//!     "description": "best on fridays",
//!     "alcohol_content": "5%"
//! }))
//! .unwrap();
//! assert_eq!(beer.alcohol_content, "5%");
//! ```

use crate::{Error, Map, Number, Result, Value};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// Deserializer reading a Rust value out of an owned [`Value`].
///
/// The deserializer tracks its position in the tree. A failure raised by a
/// `Deserialize` impl becomes [`Error::Conversion`] at the position it was met.
pub struct Deserializer {
    value: Value,
    path: String,
}

impl Deserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Deserializer::at(value, String::from("$"))
    }

    fn at(value: Value, path: String) -> Self {
        Deserializer { value, path }
    }
}

// Pins a pathless serde failure to `path`. Located errors pass through, so the
// innermost position wins.
fn locate(path: &str, err: Error) -> Error {
    match err {
        Error::Custom(message) => Error::conversion(path, message),
        other => other,
    }
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let path = self.path;
        let result = match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr, &path)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj, &path)),
        };
        result.map_err(|e| locate(&path, e))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none().map_err(|e| locate(&self.path, e)),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let path = self.path;
        let result = match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) if obj.len() == 1 => {
                let mut entries = obj.into_iter();
                match entries.next() {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value, &path))
                    }
                    None => Err(Error::custom("expected enum variant")),
                }
            }
            other => Err(Error::custom(format!(
                "expected enum variant, found {}",
                other.kind()
            ))),
        };
        result.map_err(|e| locate(&path, e))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::iter::Enumerate<std::vec::IntoIter<Value>>,
    path: String,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>, path: &str) -> Self {
        SeqDeserializer {
            iter: vec.into_iter().enumerate(),
            path: path.to_string(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((index, value)) => {
                let path = format!("{}[{}]", self.path, index);
                seed.deserialize(Deserializer::at(value, path)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<(String, Value)>,
    path: String,
}

impl MapDeserializer {
    fn new(map: Map, path: &str) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
            path: path.to_string(),
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                let path = format!("{}.{}", self.path, key);
                self.value = Some((path.clone(), value));
                seed.deserialize(Deserializer::at(Value::String(key), path))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some((path, value)) => seed.deserialize(Deserializer::at(value, path)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

// Variant payloads keep the path of the enum itself; the variant key has no
// wire counterpart.
struct EnumDeserializer {
    variant: String,
    value: Value,
    path: String,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value, path: &str) -> Self {
        EnumDeserializer {
            variant,
            value,
            path: path.to_string(),
        }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Deserializer::at(
            Value::String(self.variant),
            self.path.clone(),
        ))?;
        let access = VariantDeserializer {
            value: self.value,
            path: self.path,
        };
        Ok((variant, access))
    }
}

struct VariantDeserializer {
    value: Value,
    path: String,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            other => Err(Error::conversion(
                &self.path,
                format!("expected unit variant, found {}", other.kind()),
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(Deserializer::at(self.value, self.path))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(arr) => visitor
                .visit_seq(SeqDeserializer::new(arr, &self.path))
                .map_err(|e| locate(&self.path, e)),
            other => Err(Error::conversion(
                &self.path,
                format!("expected tuple variant, found {}", other.kind()),
            )),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Object(obj) => visitor
                .visit_map(MapDeserializer::new(obj, &self.path))
                .map_err(|e| locate(&self.path, e)),
            other => Err(Error::conversion(
                &self.path,
                format!("expected struct variant, found {}", other.kind()),
            )),
        }
    }
}

/// Reads a `T` out of a [`Value`] tree.
///
/// # Errors
///
/// Returns [`Error::Conversion`], located by logical field names, when the
/// tree does not have the shape `T` expects.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::new(value))
}
