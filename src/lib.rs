//! ISO 8601 dates, times, durations and time intervals.
//!
//! ```
//! use iso8601_calc::{DateTime, Duration, TimeInterval};
//!
//! let interval: TimeInterval = "PT1H/2010-05-09T11:30:00Z".parse()?;
//! assert_eq!(interval.first(), DateTime::parse("2010-05-09T10:30:00Z")?);
//!
//! let base = DateTime::parse("2000-01-01")?;
//! let year = Duration::parse_with_base("P1Y", base)?;
//! assert_eq!(year.to_seconds()?, 31_622_400.0);
//! # Ok::<(), iso8601_calc::Iso8601Error>(())
//! ```

mod atom;
mod calendar;
mod consts;
mod date;
mod date_time;
mod duration;
mod error;
mod pattern;
mod prelude;
mod time;
mod time_interval;

#[cfg(test)]
mod test_utils;

pub use atom::{Atom, AtomKind, AtomValue};
pub use consts::*;
pub use date::Date;
pub use date_time::DateTime;
pub use duration::Duration;
pub use error::Iso8601Error;
pub use pattern::Separator;
pub use time::{Time, TimeAtoms};
pub use time_interval::{IntervalEndpoint, TimeInterval};
