//! Pluggable date formatting.
//!
//! Date fields are never interpreted by the engine itself. Decode hands the
//! wire string to a [`DateStrategy`] and encode asks the same strategy to render
//! the domain date, so two sessions can speak different date dialects over the
//! same schema.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use recmap::{DateStrategy, FormattedDate};
//!
//! let strategy = FormattedDate::new("%Y-%m-%d %H:%M:%S");
//! let born = strategy.parse("1993-10-10 12:24:24").unwrap();
//!
//! assert_eq!(born.date(), NaiveDate::from_ymd_opt(1993, 10, 10).unwrap());
//! assert_eq!(strategy.format(&born), "1993-10-10 12:24:24");
//! ```

use chrono::NaiveDateTime;
use std::error::Error as StdError;
use std::fmt;

/// Boxed failure reported by a [`DateStrategy`].
pub type DateError = Box<dyn StdError + Send + Sync>;

/// Converts between domain dates and their wire strings.
pub trait DateStrategy: fmt::Debug + Send + Sync {
    /// Renders a domain date for the wire.
    fn format(&self, date: &NaiveDateTime) -> String;

    /// Parses a wire string into a domain date.
    ///
    /// # Errors
    ///
    /// Returns the reason the string is not a date in this strategy's format.
    fn parse(&self, raw: &str) -> Result<NaiveDateTime, DateError>;
}

/// Dates rendered with a chrono `strftime` pattern, e.g. `"%Y-%m-%d %H:%M:%S"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedDate {
    pattern: String,
}

impl FormattedDate {
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        FormattedDate {
            pattern: pattern.into(),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl DateStrategy for FormattedDate {
    fn format(&self, date: &NaiveDateTime) -> String {
        date.format(&self.pattern).to_string()
    }

    fn parse(&self, raw: &str) -> Result<NaiveDateTime, DateError> {
        Ok(NaiveDateTime::parse_from_str(raw, &self.pattern)?)
    }
}

/// ISO-8601 local date-times such as `2018-08-08T08:08:08`.
///
/// Fractional seconds are accepted on parse and emitted only when non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Iso8601;

impl DateStrategy for Iso8601 {
    fn format(&self, date: &NaiveDateTime) -> String {
        date.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }

    fn parse(&self, raw: &str) -> Result<NaiveDateTime, DateError> {
        Ok(NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")?)
    }
}
