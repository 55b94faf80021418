use std::fmt;
use std::hash::{Hash, Hasher};

use crate::calendar::{out_of_range, seconds_between_months, seconds_between_years};
use crate::consts::{
    AVERAGE_MONTH_SECONDS, AVERAGE_YEAR_SECONDS, MONTHS_PER_YEAR, SECONDS_PER_DAY, SECONDS_PER_HOUR,
    SECONDS_PER_MINUTE, SECONDS_PER_WEEK,
};
use crate::{DateTime, Iso8601Error, prelude::*};

/// The seven duration components, largest unit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum AtomKind {
    #[display(fmt = "Y")]
    Years,
    #[display(fmt = "M")]
    Months,
    #[display(fmt = "W")]
    Weeks,
    #[display(fmt = "D")]
    Days,
    #[display(fmt = "H")]
    Hours,
    #[display(fmt = "M")]
    Minutes,
    #[display(fmt = "S")]
    Seconds,
}

impl AtomKind {
    /// Every kind, in pattern order
    pub const ALL: [Self; 7] = [
        Self::Years,
        Self::Months,
        Self::Weeks,
        Self::Days,
        Self::Hours,
        Self::Minutes,
        Self::Seconds,
    ];

    /// The designator letter. Months and Minutes share `M`.
    pub const fn symbol(self) -> char {
        match self {
            Self::Years => 'Y',
            Self::Months | Self::Minutes => 'M',
            Self::Weeks => 'W',
            Self::Days => 'D',
            Self::Hours => 'H',
            Self::Seconds => 'S',
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub(crate) const fn capture_name(self) -> &'static str {
        match self {
            Self::Years => "years",
            Self::Months => "months",
            Self::Weeks => "weeks",
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
        }
    }

    /// Seconds per unit for kinds whose length never depends on the calendar.
    const fn fixed_seconds(self) -> Option<i64> {
        match self {
            Self::Years | Self::Months => None,
            Self::Weeks => Some(SECONDS_PER_WEEK),
            Self::Days => Some(SECONDS_PER_DAY),
            Self::Hours => Some(SECONDS_PER_HOUR),
            Self::Minutes => Some(SECONDS_PER_MINUTE),
            Self::Seconds => Some(1),
        }
    }
}

/// A magnitude rendered the way ISO 8601 patterns write it: integers
/// without a decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum AtomValue {
    Integer(i64),
    Real(f64),
}

/// One duration component, e.g. the `3Y` in `P3Y2M`.
///
/// Years and Months have no fixed length. Without a base they use the
/// 400-year Gregorian average; with a base they span the real calendar
/// starting at the base's year (or month).
#[derive(Debug, Clone, Copy)]
pub struct Atom {
    kind:      AtomKind,
    magnitude: f64,
    base:      Option<DateTime>,
}

impl Atom {
    /// Creates an atom; `-0.0` is stored as `0.0`
    pub fn new(kind: AtomKind, magnitude: f64, base: Option<DateTime>) -> Self {
        // -0.0 + 0.0 == +0.0, so equal atoms hash equally
        Self {
            kind,
            magnitude: magnitude + 0.0,
            base,
        }
    }

    /// Which component this is
    pub const fn kind(&self) -> AtomKind {
        self.kind
    }

    /// Signed count of units
    pub const fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Moment calendar spans are measured from
    pub const fn base(&self) -> Option<DateTime> {
        self.base
    }

    /// Designator letter, `M` for both months and minutes
    pub const fn symbol(&self) -> char {
        self.kind.symbol()
    }

    /// Seconds per unit.
    ///
    /// For a based Years/Months atom this is the calendar span covered by the
    /// atom divided by its magnitude, or the length of the base's own
    /// year/month when the magnitude is zero.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` if the span leaves the supported
    /// calendar range.
    pub fn factor(&self) -> Result<f64, Iso8601Error> {
        if let Some(seconds) = self.kind.fixed_seconds() {
            return Ok(seconds as f64);
        }
        match (self.kind, self.base) {
            (AtomKind::Years, None) => Ok(AVERAGE_YEAR_SECONDS as f64),
            (_, None) => Ok(AVERAGE_MONTH_SECONDS as f64),
            (_, Some(_)) if self.magnitude == 0.0 => Self::new(self.kind, 1.0, self.base).factor(),
            (_, Some(base)) => Ok(self.calendar_span(&base)? / self.magnitude),
        }
    }

    /// `magnitude × factor`.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` if the span leaves the supported
    /// calendar range.
    pub fn to_seconds(&self) -> Result<f64, Iso8601Error> {
        if self.magnitude == 0.0 {
            return Ok(0.0);
        }
        match (self.kind.fixed_seconds(), self.base) {
            (None, Some(base)) => self.calendar_span(&base),
            _ => Ok(self.magnitude * self.factor()?),
        }
    }

    /// The magnitude as an integer when it has no fraction
    pub fn value(&self) -> AtomValue {
        let magnitude = self.magnitude;
        if magnitude.fract() == 0.0 && magnitude.abs() < i64::MAX as f64 {
            AtomValue::Integer(magnitude as i64)
        } else {
            AtomValue::Real(magnitude)
        }
    }

    /// Signed seconds between the base and the base moved by `magnitude`
    /// years or months. The whole part is exact; a fraction is taken of the
    /// next unit in the direction of travel.
    fn calendar_span(&self, base: &DateTime) -> Result<f64, Iso8601Error> {
        let overflow = || out_of_range(&format!("{self} from {base}"));
        let whole = self.magnitude.trunc() as i64;
        let fraction = self.magnitude.fract().abs();
        let step: i64 = if self.magnitude < 0.0 { -1 } else { 1 };

        let start = match self.kind {
            AtomKind::Years => i64::from(base.year()),
            _ => i64::from(base.year()) * MONTHS_PER_YEAR + i64::from(base.month()) - 1,
        };
        let end = start.checked_add(whole).ok_or_else(overflow)?;
        let span = |from: i64, to: i64| match self.kind {
            AtomKind::Years => seconds_between_years(from, to),
            _ => seconds_between_months(month_at(from), month_at(to)),
        };

        let mut total = span(start, end)?;
        if fraction != 0.0 {
            let next = end.checked_add(step).ok_or_else(overflow)?;
            total += fraction * span(end, next)?;
        }
        Ok(total)
    }
}

/// Year and month of a month index counted from January of year 0.
const fn month_at(index: i64) -> (i64, u32) {
    (index.div_euclid(MONTHS_PER_YEAR), index.rem_euclid(MONTHS_PER_YEAR) as u32 + 1)
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.magnitude == 0.0 {
            return Ok(());
        }
        write!(f, "{}{}", self.value(), self.kind)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.magnitude.to_bits() == other.magnitude.to_bits()
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.magnitude.to_bits().hash(state);
    }
}
