use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::consts::{DURATION_DESIGNATOR, INTERVAL_SEPARATOR};
use crate::{DateTime, Duration, Iso8601Error, pattern, prelude::*};

/// One side of an interval as it was given.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum IntervalEndpoint {
    Moment(DateTime),
    Duration(Duration),
}

impl IntervalEndpoint {
    /// A part starting with `P` is a duration, anything else a moment.
    fn parse(part: &str) -> Result<Self, Iso8601Error> {
        if part.starts_with(DURATION_DESIGNATOR) {
            Duration::parse(part).map(Self::Duration)
        } else {
            DateTime::parse(part).map(Self::Moment)
        }
    }
}

/// A time interval: `start/end`, `start/duration` or `duration/end`.
///
/// The boundaries are resolved on construction. Two intervals are equal
/// when their resolved boundaries are, however they were written.
#[derive(Debug, Clone)]
pub struct TimeInterval {
    first:          DateTime,
    last:           DateTime,
    size:           f64,
    original_first: IntervalEndpoint,
    original_last:  IntervalEndpoint,
    pattern:        Option<String>,
}

impl TimeInterval {
    /// Builds an interval from two endpoints, at most one of them a duration.
    ///
    /// Two moments are kept in the order given, so the size may be negative.
    /// A leading duration ends at the moment, a trailing one starts at it;
    /// either way the duration is measured from that moment.
    ///
    /// # Errors
    /// Returns `Iso8601Error::Type` when both endpoints are durations and
    /// `Iso8601Error::OutOfRange` when a boundary leaves the calendar.
    pub fn new(
        first: impl Into<IntervalEndpoint>,
        last: impl Into<IntervalEndpoint>,
    ) -> Result<Self, Iso8601Error> {
        let (original_first, original_last) = (first.into(), last.into());

        let (first, last, size) = match (&original_first, &original_last) {
            (IntervalEndpoint::Moment(first), IntervalEndpoint::Moment(last)) => {
                (*first, *last, last.epoch_seconds() - first.epoch_seconds())
            }
            (IntervalEndpoint::Duration(duration), IntervalEndpoint::Moment(last)) => {
                let seconds = duration.with_base(Some(*last)).to_seconds()?;
                (last.sub_seconds(seconds)?, *last, seconds.abs())
            }
            (IntervalEndpoint::Moment(first), IntervalEndpoint::Duration(duration)) => {
                let seconds = duration.with_base(Some(*first)).to_seconds()?;
                (*first, first.add_seconds(seconds)?, seconds.abs())
            }
            (IntervalEndpoint::Duration(_), IntervalEndpoint::Duration(_)) => {
                log::debug!("rejecting interval {original_first}/{original_last}");
                return Err(Iso8601Error::Type(format!(
                    "an interval needs at least one date-time, got {original_first}/{original_last}"
                )));
            }
        };
        trace!("resolved interval {original_first}/{original_last} to {first}/{last} ({size}s)");

        Ok(Self {
            first,
            last,
            size,
            original_first,
            original_last,
            pattern: None,
        })
    }

    /// Parses `A/B`, where each side is a date-time or a `P...` duration.
    ///
    /// # Errors
    /// Returns `Iso8601Error::UnknownPattern` for malformed input and
    /// `Iso8601Error::Type` when both sides are durations.
    pub fn parse(input: &str) -> Result<Self, Iso8601Error> {
        let (first, last) = pattern::split_interval(input)?;
        let first = IntervalEndpoint::parse(first)?;
        let last = IntervalEndpoint::parse(last)?;
        Ok(Self {
            pattern: Some(input.to_owned()),
            ..Self::new(first, last)?
        })
    }

    /// The interval spanned by a duration from its own base.
    ///
    /// # Errors
    /// Returns `Iso8601Error::MissingArgument` when the duration has no base.
    pub fn from_duration(duration: &Duration) -> Result<Self, Iso8601Error> {
        let base = duration.base().ok_or_else(|| {
            Iso8601Error::MissingArgument(format!("a base date-time for {duration}"))
        })?;
        Self::new(base, duration.clone())
    }

    /// Resolved start
    pub const fn first(&self) -> DateTime {
        self.first
    }

    /// Resolved end
    pub const fn last(&self) -> DateTime {
        self.last
    }

    /// Length in seconds
    pub const fn size(&self) -> f64 {
        self.size
    }

    /// Start as written
    pub const fn original_first(&self) -> &IntervalEndpoint {
        &self.original_first
    }

    /// End as written
    pub const fn original_last(&self) -> &IntervalEndpoint {
        &self.original_last
    }

    /// Whether `moment` lies between the boundaries, both included.
    pub fn includes(&self, moment: &DateTime) -> bool {
        self.first <= *moment && *moment <= self.last
    }

    /// Whether both boundaries of `self` lie within `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        other.includes(&self.first) && other.includes(&self.last)
    }

    /// Whether both boundaries of `other` lie within `self`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Whether a boundary of `other` lies within `self`.
    pub fn intersects(&self, other: &Self) -> bool {
        self.includes(&other.first) || self.includes(&other.last)
    }

    /// Whether the intervals share no moment
    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.intersects(other)
    }

    /// The overlap of two intervals.
    ///
    /// # Errors
    /// Returns `Iso8601Error::Interval` when the intervals do not overlap.
    pub fn intersection(&self, other: &Self) -> Result<Self, Iso8601Error> {
        if self.is_disjoint(other) && other.is_disjoint(self) {
            return Err(Iso8601Error::Interval(format!("{self} and {other} are disjoint")));
        }
        if self.is_subset(other) {
            return Ok(self.clone());
        }
        if other.is_subset(self) {
            return Ok(other.clone());
        }

        let (earlier, later) = if self.first <= other.first { (self, other) } else { (other, self) };
        Self::new(later.first, earlier.last)
    }

    /// Orders intervals by size. `None` only when a size is NaN.
    pub fn compare_size(&self, other: &Self) -> Option<Ordering> {
        self.size.partial_cmp(&other.size)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            Some(pattern) => f.write_str(pattern),
            None => write!(f, "{}{INTERVAL_SEPARATOR}{}", self.original_first, self.original_last),
        }
    }
}

impl PartialEq for TimeInterval {
    fn eq(&self, other: &Self) -> bool {
        (self.first, self.last) == (other.first, other.last)
    }
}

impl Eq for TimeInterval {}

impl Hash for TimeInterval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.first, self.last).hash(state);
    }
}

impl FromStr for TimeInterval {
    type Err = Iso8601Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
