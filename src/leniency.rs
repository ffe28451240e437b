//! Observation of locally recovered decode failures.
//!
//! Lenient integers, enum fallbacks and unmapped discriminators never fail a
//! decode. Each recovery is logged through `tracing` at `warn` level and handed
//! to the session's [`LeniencyObserver`], so silently substituted defaults can
//! still be counted or audited.
//!
//! ```rust
//! use recmap::{decode_with_options, value, FieldSpec, FieldType, LeniencyLog, Options, RecordSpec, Value};
//! use std::sync::Arc;
//!
//! let spec = RecordSpec::new()
//!     .with_field(FieldSpec::required("age", FieldType::Int).with_lenient_int(0));
//! let log = Arc::new(LeniencyLog::new());
//! let options = Options::new().with_observer(log.clone());
//!
//! let decoded: Value = decode_with_options(&spec, &value!({ "age": "twenty" }), &options).unwrap();
//! assert_eq!(decoded.get("age"), Some(&Value::from(0)));
//! assert_eq!(log.len(), 1);
//! ```

use crate::{Error, Value};
use std::sync::{Mutex, PoisonError};

/// Receives every leniency error the engine recovers from.
pub trait LeniencyObserver: Send + Sync {
    /// Called with the recovered error and the value substituted in its place.
    fn recovered(&self, cause: &Error, substitute: &Value);
}

/// One recovered leniency error.
#[derive(Debug, Clone)]
pub struct Recovery {
    pub cause: Error,
    pub substitute: Value,
}

/// Observer collecting every recovery in arrival order.
#[derive(Debug, Default)]
pub struct LeniencyLog {
    entries: Mutex<Vec<Recovery>>,
}

impl LeniencyLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the recoveries seen so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Recovery> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains the recoveries seen so far.
    pub fn take(&self) -> Vec<Recovery> {
        std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl LeniencyObserver for LeniencyLog {
    fn recovered(&self, cause: &Error, substitute: &Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Recovery {
                cause: cause.clone(),
                substitute: substitute.clone(),
            });
    }
}
