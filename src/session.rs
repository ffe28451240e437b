//! Marshalling sessions.
//!
//! A [`Session`] binds a set of [`Options`] to the public operations. Each call
//! validates the specs it is given, runs the engine over a fresh traversal
//! context, and bridges the resulting logical tree to or from the caller's
//! Rust type. Sessions hold no per-call state and can be shared across threads.
//!
//! ```rust
//! use recmap::{value, FieldSpec, FieldType, Options, RecordSpec, Session};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Person { id_no: String, height: String }
//!
//! let spec = RecordSpec::new()
//!     .with_field(FieldSpec::required("id_no", FieldType::String).with_wire_key("id"))
//!     .with_field(FieldSpec::required("height", FieldType::String).with_nested(["feature"]));
//!
//! let session = Session::new(Options::new());
//! let wire = value!({ "id": "2102", "feature": { "height": "180cm" } });
//!
//! let person: Person = session.decode(&spec, &wire).unwrap();
//! assert_eq!(person.height, "180cm");
//! assert_eq!(session.encode(&spec, &person).unwrap(), wire);
//! ```

use crate::{
    dynamic, fields, from_value, poly, to_value, DynamicMapSpec, Error, Options, RecordSpec,
    Result, Value,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Write;

/// A configured entry point to the marshalling engine.
#[derive(Clone, Debug, Default)]
pub struct Session {
    options: Options,
}

impl Session {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Session { options }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Decodes a wire object into `T`.
    ///
    /// # Errors
    ///
    /// Returns the first structural error met, with the path of the failing
    /// field, or [`Error::InvalidSpec`] if `spec` is malformed.
    pub fn decode<T>(&self, spec: &RecordSpec, value: &Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        spec.validate()?;
        tracing::debug!(fields = spec.fields.len(), "decoding record");
        let mut ctx = Context::new(&self.options);
        let logical = fields::decode_record(&mut ctx, spec, value)?;
        from_value(logical)
    }

    /// Encodes `value` into a wire object.
    ///
    /// # Errors
    ///
    /// Returns an error if the logical tree of `value` does not fit `spec`, a
    /// date cannot be formatted, or a dynamic map holds duplicate names.
    pub fn encode<T>(&self, spec: &RecordSpec, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        spec.validate()?;
        tracing::debug!(fields = spec.fields.len(), "encoding record");
        let logical = to_value(value)?;
        let mut ctx = Context::new(&self.options);
        fields::encode_record(&mut ctx, spec, &logical)
    }

    /// Decodes an array of polymorphic records, preserving element order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] if `spec` has no discriminator table, and
    /// the first element failure otherwise.
    pub fn decode_array_polymorphic<T>(&self, spec: &RecordSpec, value: &Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        spec.validate()?;
        tracing::debug!("decoding polymorphic array");
        let mut ctx = Context::new(&self.options);
        let logical = poly::decode_array(&mut ctx, spec, value)?;
        from_value(logical)
    }

    /// Decodes a dynamic-key object into named items, in key order.
    ///
    /// # Errors
    ///
    /// Returns the first item failure; no partial result is produced.
    pub fn decode_dynamic_map<T>(&self, spec: &DynamicMapSpec, value: &Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        spec.validate()?;
        tracing::debug!(name_field = %spec.name_field, "decoding dynamic map");
        let mut ctx = Context::new(&self.options);
        let logical = dynamic::decode(&mut ctx, spec, value)?;
        from_value(logical)
    }

    /// Encodes named items into a dynamic-key object, in item order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if two items share a name.
    pub fn encode_dynamic_map<T>(&self, spec: &DynamicMapSpec, items: &[T]) -> Result<Value>
    where
        T: Serialize,
    {
        spec.validate()?;
        tracing::debug!(items = items.len(), "encoding dynamic map");
        let logical = to_value(items)?;
        let mut ctx = Context::new(&self.options);
        dynamic::encode(&mut ctx, spec, &logical)
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Per-call traversal state: the current path and nesting depth.
pub(crate) struct Context<'a> {
    options: &'a Options,
    path: Vec<Segment>,
    depth: usize,
}

impl<'a> Context<'a> {
    pub(crate) fn new(options: &'a Options) -> Self {
        Context {
            options,
            path: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn options(&self) -> &Options {
        self.options
    }

    /// Runs `f` with `key` appended to the current path.
    pub(crate) fn at_key<R>(
        &mut self,
        key: &str,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.path.push(Segment::Key(key.to_string()));
        let result = f(self);
        self.path.pop();
        result
    }

    /// Runs `f` with every key of `keys` appended to the current path.
    pub(crate) fn at_keys<R>(
        &mut self,
        keys: &[&str],
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let len = self.path.len();
        self.path
            .extend(keys.iter().map(|key| Segment::Key((*key).to_string())));
        let result = f(self);
        self.path.truncate(len);
        result
    }

    /// Runs `f` with `index` appended to the current path.
    pub(crate) fn at_index<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.path.push(Segment::Index(index));
        let result = f(self);
        self.path.pop();
        result
    }

    /// Runs `f` one nesting level deeper, failing once the limit is passed.
    pub(crate) fn descend<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if self.depth >= self.options.max_depth {
            return Err(Error::depth_exceeded(self.path(), self.options.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Renders the current path.
    pub(crate) fn path(&self) -> String {
        self.path_with(&[])
    }

    /// Renders the current path extended by `keys`.
    pub(crate) fn path_with(&self, keys: &[&str]) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            match segment {
                Segment::Key(key) => {
                    let _ = write!(out, ".{}", key);
                }
                Segment::Index(index) => {
                    let _ = write!(out, "[{}]", index);
                }
            }
        }
        for key in keys {
            let _ = write!(out, ".{}", key);
        }
        out
    }

    /// Reports a leniency error that was recovered with `substitute`.
    pub(crate) fn recover(&self, cause: Error, substitute: &Value) {
        tracing::warn!(
            path = cause.path().unwrap_or("$"),
            substitute = %substitute,
            "recovered: {}",
            cause
        );
        if let Some(observer) = &self.options.observer {
            observer.recovered(&cause, substitute);
        }
    }
}
