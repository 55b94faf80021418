/// Seconds in one minute
pub const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds in one hour
pub const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
/// Seconds in one calendar day
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
/// Seconds in one week
pub const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Common years in a 400-year Gregorian cycle
pub(crate) const COMMON_YEARS_PER_CYCLE: i64 = 303;
/// Leap years in a 400-year Gregorian cycle
pub(crate) const LEAP_YEARS_PER_CYCLE: i64 = 97;
/// Length of the Gregorian cycle in years
pub(crate) const GREGORIAN_CYCLE: i64 = 400;

/// Average year length in whole days over a Gregorian cycle.
/// The integer division truncates (146097 / 400 = 365) before any
/// multiplication by the day length.
pub const AVERAGE_YEAR_DAYS: i64 =
    (365 * COMMON_YEARS_PER_CYCLE + 366 * LEAP_YEARS_PER_CYCLE) / GREGORIAN_CYCLE;
/// Seconds in a year when no base moment is known
pub const AVERAGE_YEAR_SECONDS: i64 = AVERAGE_YEAR_DAYS * SECONDS_PER_DAY;
/// Seconds in a month when no base moment is known
pub const AVERAGE_MONTH_SECONDS: i64 = AVERAGE_YEAR_SECONDS / MONTHS_PER_YEAR;

/// Months in a calendar year
pub const MONTHS_PER_YEAR: i64 = 12;
/// Month number for January
pub const JANUARY: u32 = 1;
/// First day of month, used for reduced-precision dates
pub const MIN_DAY: u32 = 1;
/// Largest year magnitude the four-digit date grammar can write
pub const MAX_WRITTEN_YEAR: i32 = 9999;

/// Nanoseconds in one second
pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
/// Nanoseconds per rendered fraction digit pair (`.ff`)
pub(crate) const NANOS_PER_CENTISECOND: u32 = 10_000_000;

/// Date component separator (extended format)
pub const DATE_SEPARATOR: char = '-';
/// Time component separator (extended format)
pub const TIME_SEPARATOR: char = ':';
/// Date/time designator
pub const TIME_DESIGNATOR: char = 'T';
/// Duration designator
pub const DURATION_DESIGNATOR: char = 'P';
/// Interval separator
pub const INTERVAL_SEPARATOR: char = '/';

/// Canonical date rendering
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical date-time rendering, seconds and offset only
pub(crate) const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Canonical time rendering, seconds only
pub(crate) const TIME_FORMAT: &str = "T%H:%M:%S";
/// Canonical offset rendering
pub(crate) const OFFSET_FORMAT: &str = "%:z";
