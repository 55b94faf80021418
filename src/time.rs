use std::fmt;

use chrono::{NaiveDate, Timelike};

use crate::calendar::{self, Moment};
use crate::consts::{NANOS_PER_SECOND, OFFSET_FORMAT, TIME_FORMAT};
use crate::pattern::{self, Separator};
use crate::{Date, Iso8601Error};

/// Time components exactly as written. The zone keeps its written form
/// (`Z`, `+04`, `-04:30`).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAtoms {
    pub hour:   u32,
    pub minute: Option<u32>,
    pub second: Option<f64>,
    pub zone:   Option<String>,
}

/// A time of day anchored on a base date (today unless given).
#[derive(Debug, Clone)]
pub struct Time {
    moment:    Moment,
    atoms:     TimeAtoms,
    separator: Option<Separator>,
}

impl Time {
    /// Parses a time pattern anchored on today's date.
    ///
    /// # Errors
    /// Returns `Iso8601Error::UnknownPattern` for malformed input and
    /// `Iso8601Error::OutOfRange` for invalid clock values.
    pub fn parse(input: &str) -> Result<Self, Iso8601Error> {
        Self::on_date(input, calendar::today())
    }

    /// Parses a time pattern anchored on `base`.
    ///
    /// # Errors
    /// Returns `Iso8601Error::UnknownPattern` for malformed input and
    /// `Iso8601Error::OutOfRange` for invalid clock values.
    pub fn parse_on(input: &str, base: &Date) -> Result<Self, Iso8601Error> {
        Self::on_date(input, base.naive())
    }

    fn on_date(input: &str, date: NaiveDate) -> Result<Self, Iso8601Error> {
        let fields = pattern::parse_time(input)?;
        let time = calendar::clock(
            fields.hour,
            fields.minute.unwrap_or(0),
            fields.second.unwrap_or(0),
            fields.nanos,
            input,
        )?;
        let offset = calendar::offset(fields.zone.as_ref().map_or(0, |z| z.offset_seconds), input)?;
        let moment = calendar::moment(date, time, offset, input)?;

        let atoms = TimeAtoms {
            hour:   fields.hour,
            minute: fields.minute,
            second: fields
                .second
                .map(|s| f64::from(s) + f64::from(fields.nanos) / NANOS_PER_SECOND as f64),
            zone:   fields.zone.map(|z| z.written),
        };

        Ok(Self {
            moment,
            atoms,
            separator: fields.separator,
        })
    }

    /// Hour of the day, 0 to 23
    pub fn hour(&self) -> u32 {
        self.moment.hour()
    }

    /// Minute of the hour
    pub fn minute(&self) -> u32 {
        self.moment.minute()
    }

    /// Seconds including the fraction
    pub fn second(&self) -> f64 {
        f64::from(self.moment.second()) + f64::from(self.moment.nanosecond()) / NANOS_PER_SECOND as f64
    }

    /// UTC offset as `±hh:mm`
    pub fn zone(&self) -> String {
        self.moment.format(OFFSET_FORMAT).to_string()
    }

    /// `(hour, minute, second, zone)`
    pub fn to_a(&self) -> (u32, u32, f64, String) {
        (self.hour(), self.minute(), self.second(), self.zone())
    }

    /// Components as written in the input
    pub const fn atoms(&self) -> &TimeAtoms {
        &self.atoms
    }

    /// `None` for a bare hour
    pub const fn separator(&self) -> Option<Separator> {
        self.separator
    }

    /// Moves the time forward, carrying the base date along.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` past the supported calendar.
    pub fn add_seconds(&self, seconds: f64) -> Result<Self, Iso8601Error> {
        let shifted = calendar::shift(&self.moment, seconds)?;
        Self::on_date(&calendar::format_moment(&shifted, TIME_FORMAT), shifted.date_naive())
    }

    /// Moves the time back, carrying the base date along.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` past the supported calendar.
    pub fn sub_seconds(&self, seconds: f64) -> Result<Self, Iso8601Error> {
        self.add_seconds(-seconds)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&calendar::format_moment(&self.moment, TIME_FORMAT))
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.atoms == other.atoms
    }
}

impl serde::Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Date {
        Date::parse("2010-05-09").unwrap()
    }

    #[test]
    fn test_parse_forms() {
        let cases = [
            ("T10", "T10:00:00+00:00"),
            ("10:30", "T10:30:00+00:00"),
            ("1030", "T10:30:00+00:00"),
            ("T10:30:12", "T10:30:12+00:00"),
            ("T103012.5Z", "T10:30:12.50+00:00"),
            ("10:30:12,25+04:00", "T10:30:12.25+04:00"),
            ("T10:30:12-04", "T10:30:12-04:00"),
        ];
        for (input, display) in cases {
            let time = Time::parse_on(input, &base()).unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(time.to_string(), display, "display of {input}");
        }
    }

    #[test]
    fn test_atoms_keep_written_form() {
        let time = Time::parse_on("T10:30:12.5Z", &base()).unwrap();
        assert_eq!(
            time.atoms(),
            &TimeAtoms {
                hour:   10,
                minute: Some(30),
                second: Some(12.5),
                zone:   Some("Z".to_owned()),
            }
        );
        assert_eq!(time.zone(), "+00:00");
        assert_eq!(time.second(), 12.5);
        assert_eq!(time.separator(), Some(Separator::Extended));

        let time = Time::parse_on("T10", &base()).unwrap();
        assert_eq!(time.atoms().minute, None);
        assert_eq!(time.separator(), None);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(Time::parse("25:00"), Err(Iso8601Error::OutOfRange(_))));
        assert!(matches!(Time::parse("10:61"), Err(Iso8601Error::OutOfRange(_))));
        assert!(matches!(Time::parse("10:3012"), Err(Iso8601Error::UnknownPattern(_))));
        assert!(matches!(Time::parse("T10:30:12+0400"), Err(Iso8601Error::UnknownPattern(_))));
        assert!(matches!(Time::parse("T1"), Err(Iso8601Error::UnknownPattern(_))));
    }

    #[test]
    fn test_seconds_arithmetic_moves_the_date() {
        let time = Time::parse_on("T23:59:50+02:00", &base()).unwrap();
        let later = time.add_seconds(20.0).unwrap();
        assert_eq!(later.to_string(), "T00:00:10+02:00");
        assert_eq!(later.moment.date_naive(), NaiveDate::from_ymd_opt(2010, 5, 10).unwrap());

        let earlier = time.sub_seconds(3600.0).unwrap();
        assert_eq!(earlier.to_string(), "T22:59:50+02:00");
    }

    #[test]
    fn test_to_a() {
        let time = Time::parse_on("T10:30:12,5+04:00", &base()).unwrap();
        assert_eq!(time.to_a(), (10, 30, 12.5, "+04:00".to_owned()));
        let bare = Time::parse_on("T10", &base()).unwrap();
        assert_eq!(bare.to_a(), (10, 0, 0.0, "+00:00".to_owned()));
    }

    #[test]
    fn test_equality_by_atoms() {
        let day = Date::parse("2010-05-09").unwrap();
        let other_day = Date::parse("2011-01-01").unwrap();
        assert_eq!(Time::parse_on("T10:30", &day).unwrap(), Time::parse_on("T10:30", &other_day).unwrap());
        assert_ne!(Time::parse_on("T10:30", &day).unwrap(), Time::parse_on("T10:30:00", &day).unwrap());
    }
}
