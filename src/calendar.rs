//! Host calendar primitives.
//!
//! Everything that needs real Gregorian knowledge (validating a y/m/d,
//! epoch differences, ordinal and week dates, "today", shifting a moment by
//! seconds) goes through this module, which delegates to `chrono`.

use std::fmt::Write;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike,
    Weekday,
};

use crate::Iso8601Error;
use crate::consts::{
    JANUARY, MAX_WRITTEN_YEAR, MIN_DAY, NANOS_PER_CENTISECOND, NANOS_PER_SECOND, OFFSET_FORMAT,
};

/// A concrete moment with a fixed UTC offset.
pub(crate) type Moment = DateTime<FixedOffset>;

pub(crate) fn out_of_range(input: &str) -> Iso8601Error {
    log::debug!("rejecting out-of-range value {input:?}");
    Iso8601Error::OutOfRange(input.to_owned())
}

/// Validates a calendar date.
pub(crate) fn date(year: i32, month: u32, day: u32, input: &str) -> Result<NaiveDate, Iso8601Error> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| out_of_range(input))
}

/// Resolves an ordinal date (year + day of year).
pub(crate) fn ordinal_date(year: i32, ordinal: u32, input: &str) -> Result<NaiveDate, Iso8601Error> {
    NaiveDate::from_yo_opt(year, ordinal).ok_or_else(|| out_of_range(input))
}

/// Resolves an ISO week date. A missing weekday means Monday.
pub(crate) fn week_date(
    year: i32,
    week: u32,
    weekday: Option<u32>,
    input: &str,
) -> Result<NaiveDate, Iso8601Error> {
    let weekday = match weekday.unwrap_or(1) {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        _ => return Err(out_of_range(input)),
    };
    NaiveDate::from_isoywd_opt(year, week, weekday).ok_or_else(|| out_of_range(input))
}

/// Validates a wall clock time.
pub(crate) fn clock(
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
    input: &str,
) -> Result<NaiveTime, Iso8601Error> {
    // chrono encodes leap seconds as nanos >= 1e9; ISO 8601 input never does
    if nanos >= NANOS_PER_SECOND as u32 {
        return Err(out_of_range(input));
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or_else(|| out_of_range(input))
}

/// Validates a UTC offset given in seconds east of Greenwich.
pub(crate) fn offset(seconds: i32, input: &str) -> Result<FixedOffset, Iso8601Error> {
    FixedOffset::east_opt(seconds).ok_or_else(|| out_of_range(input))
}

/// Combines date, clock time and offset into a moment.
pub(crate) fn moment(
    date: NaiveDate,
    time: NaiveTime,
    offset: FixedOffset,
    input: &str,
) -> Result<Moment, Iso8601Error> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| out_of_range(input))
}

/// Today's date in the local time zone.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Moves a date by whole days. The result must stay writable as a
/// four-digit year.
pub(crate) fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, Iso8601Error> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .filter(|shifted| writable(shifted.year()))
        .ok_or_else(|| out_of_range(&format!("{date} + {days} days")))
}

/// Moves a moment by a real number of seconds, keeping its offset. The
/// result must stay writable as a four-digit year.
pub(crate) fn shift(moment: &Moment, seconds: f64) -> Result<Moment, Iso8601Error> {
    let overflow = || out_of_range(&format!("{moment} + {seconds}s"));
    if !seconds.is_finite() {
        return Err(overflow());
    }
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * NANOS_PER_SECOND as f64).round() as i64;
    TimeDelta::try_seconds(whole as i64)
        .and_then(|delta| delta.checked_add(&TimeDelta::nanoseconds(nanos)))
        .and_then(|delta| moment.checked_add_signed(delta))
        .filter(|shifted| writable(shifted.year()))
        .ok_or_else(overflow)
}

const fn writable(year: i32) -> bool {
    -MAX_WRITTEN_YEAR <= year && year <= MAX_WRITTEN_YEAR
}

/// Seconds since the Unix epoch, including the fraction.
pub(crate) fn epoch_seconds(moment: &Moment) -> f64 {
    moment.timestamp() as f64 + f64::from(moment.timestamp_subsec_nanos()) / NANOS_PER_SECOND as f64
}

/// Renders `moment` with `format`, then two truncated fraction digits when
/// the moment has a sub-second part, then the `±hh:mm` offset.
pub(crate) fn format_moment(moment: &Moment, format: &str) -> String {
    let mut out = moment.format(format).to_string();
    let nanos = moment.nanosecond();
    if nanos != 0 {
        let _ = write!(out, ".{:02}", nanos / NANOS_PER_CENTISECOND);
    }
    let _ = write!(out, "{}", moment.format(OFFSET_FORMAT));
    out
}

fn month_start(year: i64, month: u32) -> Result<NaiveDate, Iso8601Error> {
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, MIN_DAY))
        .ok_or_else(|| out_of_range(&format!("{year}-{month:02}")))
}

/// UTC epoch-seconds difference between the first day of two months.
pub(crate) fn seconds_between_months(from: (i64, u32), to: (i64, u32)) -> Result<f64, Iso8601Error> {
    let start = month_start(from.0, from.1)?;
    let end = month_start(to.0, to.1)?;
    Ok(end.signed_duration_since(start).num_seconds() as f64)
}

/// UTC epoch-seconds difference between January 1st of two years.
pub(crate) fn seconds_between_years(from: i64, to: i64) -> Result<f64, Iso8601Error> {
    seconds_between_months((from, JANUARY), (to, JANUARY))
}
