use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::calendar;
use crate::consts::{DATE_FORMAT, JANUARY, MIN_DAY};
use crate::pattern::{self, DateFields, DateShape, Separator};
use crate::Iso8601Error;

/// A calendar date: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYYMMDD`, ordinal
/// `YYYY-DDD` or week `YYYY-Www-D`.
///
/// Reduced-precision dates stand for their first day. Two dates are equal
/// when they were written with the same components.
#[derive(Debug, Clone)]
pub struct Date {
    date:      NaiveDate,
    atoms:     Vec<i32>,
    separator: Option<Separator>,
}

/// Resolves parsed date fields into a concrete day.
pub(crate) fn resolve(fields: &DateFields, input: &str) -> Result<NaiveDate, Iso8601Error> {
    let year = fields.year;
    match fields.shape {
        DateShape::Year => calendar::date(year, JANUARY, MIN_DAY, input),
        DateShape::YearMonth => calendar::date(year, fields.month.unwrap_or(JANUARY), MIN_DAY, input),
        DateShape::Calendar => calendar::date(
            year,
            fields.month.unwrap_or(JANUARY),
            fields.day.unwrap_or(MIN_DAY),
            input,
        ),
        DateShape::Ordinal => calendar::ordinal_date(year, fields.ordinal.unwrap_or(MIN_DAY), input),
        DateShape::Week => calendar::week_date(year, fields.week.unwrap_or(1), fields.weekday, input),
    }
}

impl Date {
    /// Parses a date pattern.
    ///
    /// # Errors
    /// Returns `Iso8601Error::UnknownPattern` for malformed input and
    /// `Iso8601Error::OutOfRange` for days that do not exist.
    pub fn parse(input: &str) -> Result<Self, Iso8601Error> {
        let fields = pattern::parse_date(input)?;
        let date = resolve(&fields, input)?;

        let atoms = match fields.shape {
            DateShape::Year => vec![date.year()],
            DateShape::YearMonth => vec![date.year(), date.month() as i32],
            _ => vec![date.year(), date.month() as i32, date.day() as i32],
        };

        Ok(Self {
            date,
            atoms,
            separator: fields.separator,
        })
    }

    /// Signed year
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Month of the resolved date, 1 to 12
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Day of the month of the resolved date
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// ISO week number
    pub fn week(&self) -> u32 {
        self.date.iso_week().week()
    }

    /// The components as written: `[y]`, `[y, m]` or `[y, m, d]`.
    /// Ordinal and week dates report their resolved `[y, m, d]`.
    pub fn atoms(&self) -> &[i32] {
        &self.atoms
    }

    /// `None` for a bare year
    pub const fn separator(&self) -> Option<Separator> {
        self.separator
    }

    /// `(year, month, day)`
    pub fn to_a(&self) -> (i32, u32, u32) {
        (self.year(), self.month(), self.day())
    }

    pub(crate) const fn naive(&self) -> NaiveDate {
        self.date
    }

    /// Moves the date forward by whole days.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` past the supported calendar.
    pub fn add_days(&self, days: i64) -> Result<Self, Iso8601Error> {
        let shifted = calendar::shift_days(self.date, days)?;
        Self::parse(&shifted.format(DATE_FORMAT).to_string())
    }

    /// Moves the date back by whole days.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` past the supported calendar.
    pub fn sub_days(&self, days: i64) -> Result<Self, Iso8601Error> {
        let days = days.checked_neg().ok_or_else(|| calendar::out_of_range(&days.to_string()))?;
        self.add_days(days)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format(DATE_FORMAT))
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        self.atoms == other.atoms
    }
}

impl Eq for Date {}

impl Hash for Date {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.atoms.hash(state);
    }
}

impl FromStr for Date {
    type Err = Iso8601Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
