//! Error types for schema-driven marshalling.
//!
//! Every structural failure carries the path of the offending location in the
//! value tree, rendered as `$`, `.key` and `[index]` segments, so a failure deep
//! inside a nested record can be located without re-walking the input.
//!
//! ## Error Categories
//!
//! - **Structural errors** ([`Error::MissingField`], [`Error::TypeMismatch`],
//!   [`Error::NestedContainerMissing`], [`Error::DepthExceeded`],
//!   [`Error::DateFormat`]) abort the whole decode or encode call.
//! - **Contract errors** ([`Error::DuplicateKey`], [`Error::UnknownVariant`],
//!   [`Error::InvalidSpec`]) reject data or schemas the engine cannot map.
//! - **Leniency errors** ([`Error::InvalidInteger`], [`Error::UnknownEnumValue`],
//!   [`Error::UnknownDiscriminator`]) are never returned. They are recovered
//!   locally with a substitute value and reported to the
//!   [`LeniencyObserver`](crate::LeniencyObserver) instead.
//!
//! ## Examples
//!
//! ```rust
//! use recmap::{decode, value, FieldSpec, FieldType, RecordSpec, Value};
//!
//! let spec = RecordSpec::new().with_field(FieldSpec::required("name", FieldType::String));
//! let result: recmap::Result<Value> = decode(&spec, &value!({}));
//!
//! let err = result.unwrap_err();
//! assert_eq!(err.to_string(), "missing field at $.name");
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while marshalling.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A required wire key is absent and its field declares no default.
    #[error("missing field at {path}")]
    MissingField { path: String },

    /// The wire value has a different kind than the field declares.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// An intermediate object named by a field's nested path is absent.
    #[error("nested container missing at {path}")]
    NestedContainerMissing { path: String },

    /// Two dynamic-map items share the same name.
    #[error("duplicate key {key:?} at {path}")]
    DuplicateKey { path: String, key: String },

    /// The tree nests deeper than the session allows.
    #[error("maximum depth of {limit} exceeded at {path}")]
    DepthExceeded { path: String, limit: usize },

    /// A date field could not be parsed or formatted by the date strategy.
    #[error("invalid date {raw:?} at {path}: {reason}")]
    DateFormat {
        path: String,
        raw: String,
        reason: String,
    },

    /// A logical enum or polymorphic variant name has no wire mapping.
    #[error("unknown variant {variant:?} at {path}")]
    UnknownVariant { path: String, variant: String },

    /// A lenient integer field held a value that does not parse as an integer.
    #[error("invalid integer {raw} at {path}")]
    InvalidInteger { path: String, raw: String },

    /// An enum field held a raw value outside its declared variants.
    #[error("unknown enum value {raw} at {path}")]
    UnknownEnumValue { path: String, raw: String },

    /// A polymorphic record named a discriminator value with no mapping.
    #[error("unknown discriminator {value} at {path}")]
    UnknownDiscriminator { path: String, value: String },

    /// A schema violates one of its own invariants.
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// A logical tree did not fit the Rust type it was read into. The path
    /// names logical fields rather than wire keys.
    #[error("conversion failed at {path}: {message}")]
    Conversion { path: String, message: String },

    /// Failure raised while bridging between a value tree and a Rust type.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a missing-field error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recmap::Error;
    ///
    /// let err = Error::missing_field("$.id");
    /// assert!(err.to_string().contains("$.id"));
    /// ```
    pub fn missing_field(path: impl Into<String>) -> Self {
        Error::MissingField { path: path.into() }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recmap::Error;
    ///
    /// let err = Error::type_mismatch("$.age", "integer", "bool");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(path: impl Into<String>, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn nested_container_missing(path: impl Into<String>) -> Self {
        Error::NestedContainerMissing { path: path.into() }
    }

    pub fn duplicate_key(path: impl Into<String>, key: &str) -> Self {
        Error::DuplicateKey {
            path: path.into(),
            key: key.to_string(),
        }
    }

    pub fn depth_exceeded(path: impl Into<String>, limit: usize) -> Self {
        Error::DepthExceeded {
            path: path.into(),
            limit,
        }
    }

    pub fn date_format(path: impl Into<String>, raw: &str, reason: impl fmt::Display) -> Self {
        Error::DateFormat {
            path: path.into(),
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_variant(path: impl Into<String>, variant: &str) -> Self {
        Error::UnknownVariant {
            path: path.into(),
            variant: variant.to_string(),
        }
    }

    pub fn conversion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Conversion {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a schema error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recmap::Error;
    ///
    /// let err = Error::invalid_spec("duplicate wire key \"id\"");
    /// assert_eq!(err.to_string(), "invalid spec: duplicate wire key \"id\"");
    /// ```
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Error::InvalidSpec(msg.into())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the value-tree path the error refers to, if it has one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::MissingField { path }
            | Error::TypeMismatch { path, .. }
            | Error::NestedContainerMissing { path }
            | Error::DuplicateKey { path, .. }
            | Error::DepthExceeded { path, .. }
            | Error::DateFormat { path, .. }
            | Error::UnknownVariant { path, .. }
            | Error::InvalidInteger { path, .. }
            | Error::UnknownEnumValue { path, .. }
            | Error::UnknownDiscriminator { path, .. }
            | Error::Conversion { path, .. } => Some(path),
            Error::InvalidSpec(_) | Error::Custom(_) => None,
        }
    }

    /// Returns `true` for the error kinds the engine recovers from locally.
    #[must_use]
    pub const fn is_leniency(&self) -> bool {
        matches!(
            self,
            Error::InvalidInteger { .. }
                | Error::UnknownEnumValue { .. }
                | Error::UnknownDiscriminator { .. }
        )
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
