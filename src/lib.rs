//! # recmap
//!
//! Schema-driven marshalling between typed Rust records and a JSON-model
//! [`Value`] tree.
//!
//! ## What does it do?
//!
//! Serde derives fix one wire shape per type. Upstream data rarely cooperates:
//! keys are renamed, scalar fields hide inside nested objects, integers arrive
//! as strings, maps are keyed by data instead of schema, and arrays mix record
//! types told apart by a discriminator field. A [`RecordSpec`] describes that
//! wire shape next to the type, and the engine maps between the two.
//!
//! ## Key Features
//!
//! - **Renaming and nesting**: a field can live under any wire key, below any
//!   chain of nested objects
//! - **Absent vs. null**: a missing key and an explicit null resolve through
//!   independent policies
//! - **Lenient coercion**: numeric strings decode as integers, and unparsable
//!   ones fall back to a declared default instead of failing the decode
//! - **Enum fallback**: unknown raw enum values resolve to a fallback variant
//! - **Dynamic-key maps**: `{"banana": {...}}` decodes to an ordered list of
//!   named items, and back
//! - **Polymorphic records**: a discriminator picks the concrete record, which
//!   decodes into an externally tagged Rust enum
//!
//! Every recovered leniency event is logged through `tracing` and handed to an
//! optional [`LeniencyObserver`].
//!
//! ## Quick Start
//!
//! ```rust
//! use recmap::{decode, encode, value, FieldSpec, FieldType, RecordSpec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Person {
//!     id_no: String,
//!     age: i64,
//!     height: String,
//!     address: Option<String>,
//! }
//!
//! let spec = RecordSpec::new()
//!     .with_field(FieldSpec::required("id_no", FieldType::String).with_wire_key("id"))
//!     .with_field(FieldSpec::required("age", FieldType::Int).with_lenient_int(0))
//!     .with_field(FieldSpec::required("height", FieldType::String).with_nested(["feature"]))
//!     .with_field(FieldSpec::optional("address", FieldType::String));
//!
//! let wire = value!({
//!     "id": "2102",
//!     "age": "not_a_number",
//!     "feature": { "height": "180cm" }
//! });
//!
//! let person: Person = decode(&spec, &wire).unwrap();
//! assert_eq!(person.age, 0);
//! assert_eq!(person.address, None);
//!
//! let back = encode(&spec, &person).unwrap();
//! assert_eq!(
//!     back,
//!     value!({
//!         "id": "2102",
//!         "age": "0",
//!         "feature": { "height": "180cm" },
//!         "address": null
//!     })
//! );
//! ```
//!
//! ## Text formats
//!
//! The crate works on [`Value`] trees only. `Value` implements `Serialize` and
//! `Deserialize`, so any serde text codec (`serde_json`, for one) can produce
//! and consume it.

mod coerce;
pub mod date;
pub mod de;
mod dynamic;
pub mod error;
mod fields;
pub mod leniency;
pub mod macros;
pub mod map;
pub mod options;
mod poly;
pub mod schema;
pub mod ser;
pub mod session;
pub mod value;

pub use date::{DateError, DateStrategy, FormattedDate, Iso8601};
pub use de::{from_value, Deserializer};
pub use error::{Error, Result};
pub use leniency::{LeniencyLog, LeniencyObserver, Recovery};
pub use map::Map;
pub use options::{Options, DEFAULT_MAX_DEPTH};
pub use schema::{
    AbsentPolicy, Coercion, DynamicMapSpec, EnumSpec, FieldSpec, FieldType, NullPolicy,
    Polymorphism, RecordSpec, Subtype,
};
pub use ser::{to_value, ValueSerializer};
pub use session::Session;
pub use value::{Number, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decode a wire object into `T` with default options.
///
/// # Examples
///
/// ```rust
/// use recmap::{decode, value, FieldSpec, FieldType, RecordSpec};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Fruit { price: f64 }
///
/// let spec = RecordSpec::new()
///     .with_field(FieldSpec::required("price", FieldType::Float).with_wire_key("cost"));
/// let fruit: Fruit = decode(&spec, &value!({ "cost": 1.25 })).unwrap();
/// assert_eq!(fruit.price, 1.25);
/// ```
///
/// # Errors
///
/// Returns an error if a required field is missing or null, a value has the
/// wrong kind, a nested container is missing, or `spec` is invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode<T>(spec: &RecordSpec, value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    Session::default().decode(spec, value)
}

/// Decode a wire object into `T` with custom options.
///
/// # Errors
///
/// Same as [`decode`], plus [`Error::DepthExceeded`] past `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options<T>(spec: &RecordSpec, value: &Value, options: &Options) -> Result<T>
where
    T: DeserializeOwned,
{
    Session::new(options.clone()).decode(spec, value)
}

/// Encode `value` into a wire object with default options.
///
/// Optional fields holding no value are written as explicit nulls unless the
/// field is marked omit-if-absent.
/// A required field holding no value is a type mismatch unless it has a null
/// default, so every encoded object decodes again.
///
/// # Errors
///
/// Returns an error if the value does not fit `spec` or `spec` is invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode<T>(spec: &RecordSpec, value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    Session::default().encode(spec, value)
}

/// Encode `value` into a wire object with custom options.
///
/// # Errors
///
/// Returns an error if the value does not fit `spec` or `spec` is invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options<T>(spec: &RecordSpec, value: &T, options: &Options) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    Session::new(options.clone()).encode(spec, value)
}

/// Decode an array of polymorphic records with default options.
///
/// # Examples
///
/// ```rust
/// use recmap::{decode_array_polymorphic, value, FieldSpec, FieldType, Polymorphism, RecordSpec};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct DrinkBase { #[serde(rename = "type")] kind: String }
///
/// #[derive(Deserialize)]
/// struct Beer {
///     #[serde(flatten)]
///     base: DrinkBase,
///     alcohol_content: String,
/// }
///
/// #[derive(Deserialize)]
/// enum Drink { Base(DrinkBase), Beer(Beer) }
///
/// let spec = RecordSpec::new()
///     .with_field(FieldSpec::required("type", FieldType::String))
///     .with_polymorphism(Polymorphism::new("type", "Base").with_subtype(
///         "beer",
///         "Beer",
///         RecordSpec::new().with_field(FieldSpec::required("alcohol_content", FieldType::String)),
///     ));
///
/// let drinks: Vec<Drink> = decode_array_polymorphic(
///     &spec,
///     &value!([{ "type": "beer", "alcohol_content": "5%" }, { "type": "water" }]),
/// )
/// .unwrap();
/// assert!(matches!(&drinks[0], Drink::Beer(beer) if beer.alcohol_content == "5%"));
/// assert!(matches!(&drinks[1], Drink::Base(base) if base.kind == "water"));
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidSpec`] if `spec` has no discriminator table, and
/// the first element failure otherwise.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_array_polymorphic<T>(spec: &RecordSpec, value: &Value) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    Session::default().decode_array_polymorphic(spec, value)
}

/// Decode a dynamic-key object into named items with default options.
///
/// # Errors
///
/// Returns the first item failure.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_dynamic_map<T>(spec: &DynamicMapSpec, value: &Value) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    Session::default().decode_dynamic_map(spec, value)
}

/// Encode named items into a dynamic-key object with default options.
///
/// # Examples
///
/// ```rust
/// use recmap::{encode_dynamic_map, value, DynamicMapSpec, FieldSpec, FieldType, RecordSpec};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Fruit { name: String, price: f64 }
///
/// let spec = DynamicMapSpec::new(
///     RecordSpec::new().with_field(FieldSpec::required("price", FieldType::Float)),
/// );
/// let fruits = vec![Fruit { name: "banana".to_string(), price: 0.5 }];
/// let wire = encode_dynamic_map(&spec, &fruits).unwrap();
/// assert_eq!(wire, value!({ "banana": { "price": 0.5 } }));
/// ```
///
/// # Errors
///
/// Returns [`Error::DuplicateKey`] if two items share a name.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_dynamic_map<T>(spec: &DynamicMapSpec, items: &[T]) -> Result<Value>
where
    T: Serialize,
{
    Session::default().encode_dynamic_map(spec, items)
}
