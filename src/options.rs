//! Session configuration.
//!
//! [`Options`] carries everything a decode or encode call may vary on without
//! touching the schema: the date dialect, the recursion limit and the leniency
//! observer.
//!
//! ## Examples
//!
//! ```rust
//! use recmap::Options;
//!
//! let options = Options::new()
//!     .with_date_format("%Y-%m-%d %H:%M:%S")
//!     .with_max_depth(32);
//! assert_eq!(options.max_depth, 32);
//! ```

use crate::date::{DateStrategy, FormattedDate, Iso8601};
use crate::leniency::LeniencyObserver;
use std::fmt;
use std::sync::Arc;

/// Default limit on record, list and map nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration for a marshalling session.
#[derive(Clone)]
pub struct Options {
    pub max_depth: usize,
    pub date_strategy: Arc<dyn DateStrategy>,
    pub observer: Option<Arc<dyn LeniencyObserver>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: DEFAULT_MAX_DEPTH,
            date_strategy: Arc::new(Iso8601),
            observer: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("max_depth", &self.max_depth)
            .field("date_strategy", &self.date_strategy)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Options {
    /// Creates default options (ISO-8601 dates, depth limit 128, no observer).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recmap::Options;
    ///
    /// let options = Options::new();
    /// assert_eq!(options.max_depth, 128);
    /// assert!(options.observer.is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting of records, lists and dynamic maps.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_date_strategy(mut self, strategy: Arc<dyn DateStrategy>) -> Self {
        self.date_strategy = strategy;
        self
    }

    /// Uses a chrono `strftime` pattern for date fields.
    #[must_use]
    pub fn with_date_format(self, pattern: &str) -> Self {
        self.with_date_strategy(Arc::new(FormattedDate::new(pattern)))
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LeniencyObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}
