use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, FixedOffset, NaiveTime, Timelike};

use crate::calendar::{self, Moment};
use crate::consts::{DATE_TIME_FORMAT, NANOS_PER_SECOND, OFFSET_FORMAT};
use crate::pattern::{self, separators_agree};
use crate::{Iso8601Error, date, prelude::*};

/// A concrete moment with a UTC offset, e.g. `2010-05-09T10:30:12Z`.
///
/// Equality, hashing and ordering follow the represented instant, so
/// `10:30Z` and `12:30+02:00` on the same day are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
pub struct DateTime {
    moment: Moment,
}

impl DateTime {
    /// Parses `<date>[T<time>]`. An empty date part (`T10:30`) means today.
    ///
    /// # Errors
    /// Returns `Iso8601Error::UnknownPattern` for malformed input, a time
    /// following a reduced-precision date, or mixed basic and extended
    /// punctuation. Returns `Iso8601Error::OutOfRange` for calendar values
    /// that do not exist.
    pub fn parse(input: &str) -> Result<Self, Iso8601Error> {
        let (date_part, time_part) = pattern::split_date_time(input)?;

        let (date, date_separator) = if date_part.is_empty() {
            (calendar::today(), None)
        } else {
            let fields = pattern::parse_date(date_part)?;
            if time_part.is_some() && !fields.is_complete() {
                return Err(pattern::unknown(input));
            }
            (date::resolve(&fields, input)?, fields.separator)
        };

        let Some(time_part) = time_part else {
            let moment = calendar::moment(date, NaiveTime::MIN, utc(input)?, input)?;
            return Ok(Self { moment });
        };

        let fields = pattern::parse_time(time_part)?;
        if !separators_agree(date_separator, fields.separator) {
            return Err(pattern::unknown(input));
        }

        let time = calendar::clock(
            fields.hour,
            fields.minute.unwrap_or(0),
            fields.second.unwrap_or(0),
            fields.nanos,
            input,
        )?;
        let offset = calendar::offset(fields.zone.map_or(0, |z| z.offset_seconds), input)?;
        let moment = calendar::moment(date, time, offset, input)?;
        Ok(Self { moment })
    }

    /// Signed year in the local offset
    pub fn year(&self) -> i32 {
        self.moment.year()
    }

    /// Month, 1 to 12
    pub fn month(&self) -> u32 {
        self.moment.month()
    }

    /// Day of the month
    pub fn day(&self) -> u32 {
        self.moment.day()
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

    /// `(year, month, day, hour, minute, second, zone)`
    pub fn to_a(&self) -> (i32, u32, u32, u32, u32, f64, String) {
        (
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.zone(),
        )
    }

    /// Seconds since the Unix epoch
    pub fn epoch_seconds(&self) -> f64 {
        calendar::epoch_seconds(&self.moment)
    }

    /// The underlying `chrono` value
    pub const fn as_chrono(&self) -> &chrono::DateTime<FixedOffset> {
        &self.moment
    }

    /// Moves the moment forward by a real number of seconds.
    ///
    /// The result is rendered canonically and parsed again, so fractions
    /// below a hundredth of a second are dropped.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` past the supported calendar.
    pub fn add_seconds(&self, seconds: f64) -> Result<Self, Iso8601Error> {
        let shifted = calendar::shift(&self.moment, seconds)?;
        Self::parse(&calendar::format_moment(&shifted, DATE_TIME_FORMAT))
    }

    /// Moves the moment back by a real number of seconds.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` past the supported calendar.
    pub fn sub_seconds(&self, seconds: f64) -> Result<Self, Iso8601Error> {
        self.add_seconds(-seconds)
    }
}

fn utc(input: &str) -> Result<FixedOffset, Iso8601Error> {
    calendar::offset(0, input)
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&calendar::format_moment(&self.moment, DATE_TIME_FORMAT))
    }
}

impl FromStr for DateTime {
    type Err = Iso8601Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date_time;

    #[test]
    fn test_parse_forms() {
        struct TestCase {
            input:   &'static str,
            display: &'static str,
        }

        let cases = [
            TestCase {
                input:   "2010",
                display: "2010-01-01T00:00:00+00:00",
            },
            TestCase {
                input:   "2010-05",
                display: "2010-05-01T00:00:00+00:00",
            },
            TestCase {
                input:   "2010-05-09T10:30:12Z",
                display: "2010-05-09T10:30:12+00:00",
            },
            TestCase {
                input:   "20100509T103012+0400",
                display: "2010-05-09T10:30:12+04:00",
            },
            TestCase {
                input:   "2010-05-09T10:30:12,5-04:30",
                display: "2010-05-09T10:30:12.50-04:30",
            },
            TestCase {
                input:   "2014-121T10:11:12Z",
                display: "2014-05-01T10:11:12+00:00",
            },
            TestCase {
                input:   "2014-W15-2T10",
                display: "2014-04-08T10:00:00+00:00",
            },
            TestCase {
                input:   "2010-05-09T10+04",
                display: "2010-05-09T10:00:00+04:00",
            },
            TestCase {
                input:   "-2010-05-09T10:30",
                display: "-2010-05-09T10:30:00+00:00",
            },
        ];

        for case in &cases {
            let parsed = DateTime::parse(case.input).unwrap_or_else(|e| panic!("{}: {e}", case.input));
            assert_eq!(parsed.to_string(), case.display, "display of {}", case.input);
        }
    }

    #[test]
    fn test_unknown_patterns() {
        for input in [
            "",
            "2010-05T10:30:12Z",
            "2010T10",
            "2010-05-09T",
            "2010-05-09T10T11",
            "20100509T10:30:12",
            "2010-05-09T103012",
            "2010-05-09T10:30:12+0400",
            "2010-05-09 10:30",
        ] {
            assert!(
                matches!(DateTime::parse(input), Err(Iso8601Error::UnknownPattern(_))),
                "{input:?} should be an unknown pattern"
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        for input in ["2010-13-30", "2010-02-29", "2010-05-09T25:00", "2010-05-09T10:60", "2014-366"] {
            assert!(
                matches!(DateTime::parse(input), Err(Iso8601Error::OutOfRange(_))),
                "{input:?} should be out of range"
            );
        }
    }

    #[test]
    fn test_empty_date_means_today() {
        let parsed = DateTime::parse("T10:30:12Z").unwrap();
        assert_eq!(parsed.as_chrono().date_naive(), calendar::today());
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (10, 30, 12.0));

        // the today sentinel skips the punctuation check
        assert!(DateTime::parse("T103012Z").is_ok());
        assert!(DateTime::parse("T103012+0400").is_ok());
    }

    #[test]
    fn test_accessors() {
        let parsed = date_time("2010-05-09T10:30:12.25+04:00");
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2010, 5, 9));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (10, 30, 12.25));
        assert_eq!(parsed.zone(), "+04:00");
        assert_eq!(date_time("1970-01-01T00:00:01Z").epoch_seconds(), 1.0);
        assert_eq!(date_time("+2014-05-31T16:26:00Z").year(), 2014);
        assert_eq!(
            date_time("2014-05-31T19:29:39Z").to_a(),
            (2014, 5, 31, 19, 29, 39.0, "+00:00".to_owned())
        );
    }

    #[test]
    fn test_seconds_arithmetic() {
        assert_eq!(
            date_time("2012-07-07T20:20:20.5Z").add_seconds(10.0).unwrap().to_string(),
            "2012-07-07T20:20:30.50+00:00"
        );
        assert_eq!(
            date_time("2012-07-07T20:20:20Z").sub_seconds(10.0).unwrap().to_string(),
            "2012-07-07T20:20:10+00:00"
        );

        let start = date_time("2012-12-31T23:59:50+02:00");
        assert_eq!(start.add_seconds(20.5).unwrap().to_string(), "2013-01-01T00:00:10.50+02:00");
        assert_eq!(start.sub_seconds(86_400.0).unwrap().to_string(), "2012-12-30T23:59:50+02:00");
        assert_eq!(start.add_seconds(0.0).unwrap(), start);
    }

    #[test]
    fn test_equality_follows_instant() {
        assert_eq!(date_time("2010-05-09T10:30Z"), date_time("2010-05-09T12:30+02:00"));
        assert!(date_time("2010-05-09T10:30Z") < date_time("2010-05-09T10:31Z"));
    }

    #[test]
    fn test_serde_round_trip() {
        let parsed = date_time("2010-05-09T10:30:12Z");
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, "\"2010-05-09T10:30:12+00:00\"");
        let back: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parsed);
        assert!(serde_json::from_str::<DateTime>("\"2010-13-30\"").is_err());
    }
}
