//! ISO 8601 grammars.
//!
//! Each grammar is a table of anchored regular expressions with named
//! captures. Parsing here is purely syntactic: the results are typed fields
//! that the value types validate against the calendar.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::atom::AtomKind;
use crate::consts::{INTERVAL_SEPARATOR, NANOS_PER_SECOND, TIME_DESIGNATOR};
use crate::{Iso8601Error, prelude::*};

/// Punctuation style of a date, time or zone component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Separator {
    /// Components separated by `-` or `:` (`2010-05-09`, `10:30`)
    #[display(fmt = "extended")]
    Extended,
    /// Components written back to back (`20100509`, `1030`)
    #[display(fmt = "basic")]
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateShape {
    Year,
    YearMonth,
    Calendar,
    Ordinal,
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateFields {
    pub shape: DateShape,
    pub separator: Option<Separator>,
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub ordinal: Option<u32>,
    pub week: Option<u32>,
    pub weekday: Option<u32>,
}

impl DateFields {
    /// Whether the date names a single day, as required before a time part.
    pub(crate) const fn is_complete(&self) -> bool {
        matches!(self.shape, DateShape::Calendar | DateShape::Ordinal | DateShape::Week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ZoneFields {
    /// The zone exactly as written (`Z`, `+04`, `-0400`, `+04:00`)
    pub written: String,
    pub offset_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TimeFields {
    pub separator: Option<Separator>,
    pub hour: u32,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub nanos: u32,
    pub zone: Option<ZoneFields>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DurationFields {
    pub negative: bool,
    /// Unsigned magnitudes indexed by [`AtomKind::index`]
    pub magnitudes: [f64; 7],
}

struct Grammar {
    shape: DateShape,
    separator: Option<Separator>,
    regex: Regex,
}

fn grammar(shape: DateShape, separator: Option<Separator>, pattern: &str) -> Grammar {
    Grammar {
        shape,
        separator,
        regex: Regex::new(pattern).expect("valid date grammar"),
    }
}

static DATE_GRAMMARS: LazyLock<Vec<Grammar>> = LazyLock::new(|| {
    use DateShape::{Calendar, Ordinal, Week, Year, YearMonth};
    use Separator::{Basic, Extended};

    vec![
        grammar(
            Calendar,
            Some(Extended),
            r"^(?P<year>[+-]?[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})$",
        ),
        grammar(
            Calendar,
            Some(Basic),
            r"^(?P<year>[+-]?[0-9]{4})(?P<month>[0-9]{2})(?P<day>[0-9]{2})$",
        ),
        grammar(Ordinal, Some(Extended), r"^(?P<year>[+-]?[0-9]{4})-(?P<ordinal>[0-9]{3})$"),
        grammar(Ordinal, Some(Basic), r"^(?P<year>[+-]?[0-9]{4})(?P<ordinal>[0-9]{3})$"),
        // YYYYMM is ambiguous with YYMMDD and is not accepted
        grammar(YearMonth, Some(Extended), r"^(?P<year>[+-]?[0-9]{4})-(?P<month>[0-9]{2})$"),
        grammar(Year, None, r"^(?P<year>[+-]?[0-9]{4})$"),
        grammar(
            Week,
            Some(Extended),
            r"^(?P<year>[+-]?[0-9]{4})-W(?P<week>[0-9]{2})(?:-(?P<weekday>[0-9]))?$",
        ),
        grammar(
            Week,
            Some(Basic),
            r"^(?P<year>[+-]?[0-9]{4})W(?P<week>[0-9]{2})(?P<weekday>[0-9])?$",
        ),
    ]
});

static TIME_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^T?(?P<clock>[^Z+-]+)(?P<zone>[Z+-].*)?$").expect("valid time split regex")
});

static CLOCK_GRAMMARS: LazyLock<Vec<(Option<Separator>, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Some(Separator::Extended),
            Regex::new(
                r"^(?P<hour>[0-9]{2}):(?P<minute>[0-9]{2})(?::(?P<second>[0-9]{2})(?:[.,](?P<fraction>[0-9]+))?)?$",
            )
            .expect("valid extended clock regex"),
        ),
        (
            Some(Separator::Basic),
            Regex::new(
                r"^(?P<hour>[0-9]{2})(?P<minute>[0-9]{2})(?:(?P<second>[0-9]{2})(?:[.,](?P<fraction>[0-9]+))?)?$",
            )
            .expect("valid basic clock regex"),
        ),
        (None, Regex::new(r"^(?P<hour>[0-9]{2})$").expect("valid hour regex")),
    ]
});

static ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Z|(?P<sign>[+-])(?P<hours>[0-9]{2})(?:(?P<colon>:?)(?P<minutes>[0-9]{2}))?)$")
        .expect("valid zone regex")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<sign>[+-])?P(?:",
        r"(?:(?P<years>[0-9]+(?:[.,][0-9]+)?)Y)?",
        r"(?:(?P<months>[0-9]+(?:[.,][0-9]+)?)M)?",
        r"(?:(?P<days>[0-9]+(?:[.,][0-9]+)?)D)?",
        r"(?P<time>T",
        r"(?:(?P<hours>[0-9]+(?:[.,][0-9]+)?)H)?",
        r"(?:(?P<minutes>[0-9]+(?:[.,][0-9]+)?)M)?",
        r"(?:(?P<seconds>[0-9]+(?:[.,][0-9]+)?)S)?",
        r")?",
        r"|(?P<weeks>[0-9]+(?:[.,][0-9]+)?)W",
        r")$",
    ))
    .expect("valid duration regex")
});

pub(crate) fn unknown(input: &str) -> Iso8601Error {
    log::debug!("rejecting unknown ISO 8601 pattern {input:?}");
    Iso8601Error::UnknownPattern(input.to_owned())
}

/// Parses a named capture, if present.
fn field<T: FromStr>(caps: &Captures<'_>, name: &str, input: &str) -> Result<Option<T>, Iso8601Error> {
    caps.name(name)
        .map(|m| m.as_str().parse::<T>().map_err(|_| unknown(input)))
        .transpose()
}

/// Parses a date component: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYYMMDD`,
/// `YYYY-DDD`, `YYYYDDD`, `YYYY-Www[-D]` or `YYYYWww[D]`.
pub(crate) fn parse_date(input: &str) -> Result<DateFields, Iso8601Error> {
    let (grammar, caps) = DATE_GRAMMARS
        .iter()
        .find_map(|g| g.regex.captures(input).map(|caps| (g, caps)))
        .ok_or_else(|| unknown(input))?;

    Ok(DateFields {
        shape: grammar.shape,
        separator: grammar.separator,
        year: field(&caps, "year", input)?.ok_or_else(|| unknown(input))?,
        month: field(&caps, "month", input)?,
        day: field(&caps, "day", input)?,
        ordinal: field(&caps, "ordinal", input)?,
        week: field(&caps, "week", input)?,
        weekday: field(&caps, "weekday", input)?,
    })
}

/// Converts fraction digits into nanoseconds, truncating past nine digits.
fn fraction_nanos(digits: &str, input: &str) -> Result<u32, Iso8601Error> {
    let mut nanos: u32 = 0;
    let mut scale = NANOS_PER_SECOND as u32;
    for digit in digits.chars().take(9) {
        let value = digit.to_digit(10).ok_or_else(|| unknown(input))?;
        scale /= 10;
        nanos += value * scale;
    }
    Ok(nanos)
}

fn parse_zone(written: &str, clock_separator: Option<Separator>, input: &str) -> Result<ZoneFields, Iso8601Error> {
    let caps = ZONE.captures(written).ok_or_else(|| unknown(input))?;
    let Some(sign) = caps.name("sign") else {
        return Ok(ZoneFields {
            written: written.to_owned(),
            offset_seconds: 0,
        });
    };

    let hours: i32 = field(&caps, "hours", input)?.ok_or_else(|| unknown(input))?;
    let minutes: Option<i32> = field(&caps, "minutes", input)?;
    if minutes.is_some() {
        // ±hh:mm must follow the clock's punctuation, ±hh may go with either
        let zone_separator = match caps.name("colon").map(|m| m.as_str()) {
            Some(":") => Separator::Extended,
            _ => Separator::Basic,
        };
        if clock_separator != Some(zone_separator) {
            return Err(unknown(input));
        }
    }

    let magnitude = hours * 3600 + minutes.unwrap_or(0) * 60;
    Ok(ZoneFields {
        written: written.to_owned(),
        offset_seconds: if sign.as_str() == "-" { -magnitude } else { magnitude },
    })
}

/// Parses a time component: `hh`, `hh:mm`, `hhmm`, `hh:mm:ss[.f]` or
/// `hhmmss[.f]`, optionally prefixed with `T` and suffixed with `Z` or
/// `±hh[[:]mm]`.
pub(crate) fn parse_time(input: &str) -> Result<TimeFields, Iso8601Error> {
    let split = TIME_SPLIT.captures(input).ok_or_else(|| unknown(input))?;
    let clock = split.name("clock").map_or("", |m| m.as_str());

    let (separator, caps) = CLOCK_GRAMMARS
        .iter()
        .find_map(|(separator, regex)| regex.captures(clock).map(|caps| (*separator, caps)))
        .ok_or_else(|| unknown(input))?;

    let zone = split
        .name("zone")
        .map(|m| parse_zone(m.as_str(), separator, input))
        .transpose()?;

    let nanos = match caps.name("fraction") {
        Some(digits) => fraction_nanos(digits.as_str(), input)?,
        None => 0,
    };

    Ok(TimeFields {
        separator,
        hour: field(&caps, "hour", input)?.ok_or_else(|| unknown(input))?,
        minute: field(&caps, "minute", input)?,
        second: field(&caps, "second", input)?,
        nanos,
        zone,
    })
}

/// Splits a date-time on the `T` designator. The date part may be empty,
/// the time part is absent when there is no designator.
pub(crate) fn split_date_time(input: &str) -> Result<(&str, Option<&str>), Iso8601Error> {
    if input.is_empty() {
        return Err(unknown(input));
    }
    let mut parts = input.split(TIME_DESIGNATOR);
    let date = parts.next().unwrap_or_default();
    let time = parts.next();
    if parts.next().is_some() || time.is_some_and(str::is_empty) {
        return Err(unknown(input));
    }
    Ok((date, time))
}

/// Date and time punctuation must agree wherever both are present.
pub(crate) fn separators_agree(date: Option<Separator>, time: Option<Separator>) -> bool {
    match (date, time) {
        (Some(date), Some(time)) => date == time,
        _ => true,
    }
}

fn magnitude(caps: &Captures<'_>, name: &str, input: &str) -> Result<Option<f64>, Iso8601Error> {
    caps.name(name)
        .map(|m| m.as_str().replace(',', ".").parse::<f64>().map_err(|_| unknown(input)))
        .transpose()
}

/// Parses `[±]PnYnMnDTnHnMnS` or `[±]PnW`. Any component may use `.` or `,`
/// as decimal mark.
pub(crate) fn parse_duration(input: &str) -> Result<DurationFields, Iso8601Error> {
    let caps = DURATION.captures(input).ok_or_else(|| unknown(input))?;

    let mut present = [None; 7];
    for (slot, kind) in present.iter_mut().zip(AtomKind::ALL) {
        *slot = magnitude(&caps, kind.capture_name(), input)?;
    }

    if present.iter().all(Option::is_none) {
        return Err(unknown(input));
    }
    let has_clock = [AtomKind::Hours, AtomKind::Minutes, AtomKind::Seconds]
        .iter()
        .any(|kind| present[kind.index()].is_some());
    if caps.name("time").is_some() && !has_clock {
        return Err(unknown(input));
    }

    let magnitudes = present.map(|value| value.unwrap_or(0.0));
    validate_fractions(&magnitudes, input)?;

    Ok(DurationFields {
        negative: caps.name("sign").is_some_and(|m| m.as_str() == "-"),
        magnitudes,
    })
}

/// At most one nonzero component may be fractional, and it must be the
/// smallest nonzero one.
fn validate_fractions(magnitudes: &[f64; 7], input: &str) -> Result<(), Iso8601Error> {
    let nonzero: Vec<f64> = magnitudes.iter().copied().filter(|m| *m != 0.0).collect();
    let fractional: Vec<usize> = nonzero
        .iter()
        .enumerate()
        .filter(|(_, m)| m.fract() != 0.0)
        .map(|(i, _)| i)
        .collect();

    match fractional.as_slice() {
        [] => Ok(()),
        [index] if *index + 1 == nonzero.len() => Ok(()),
        _ => {
            log::debug!("rejecting misplaced duration fractions in {input:?}");
            Err(Iso8601Error::InvalidFractions(input.to_owned()))
        }
    }
}

/// Splits `A/B` into its two non-empty halves.
pub(crate) fn split_interval(input: &str) -> Result<(&str, &str), Iso8601Error> {
    let mut parts = input.split(INTERVAL_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(last), None) if !first.is_empty() && !last.is_empty() => Ok((first, last)),
        _ => Err(unknown(input)),
    }
}
