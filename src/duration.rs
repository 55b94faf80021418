//! ISO 8601 durations (`PnYnMnDTnHnMnS`, `PnW`).
//!
//! Years and months have no fixed length. A duration without a base uses the
//! Gregorian average for them; a duration with a base (a concrete
//! [`DateTime`]) measures them on the real calendar, with the months counted
//! from the base already moved by the years.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use log::trace;

use crate::atom::{Atom, AtomKind};
use crate::calendar::out_of_range;
use crate::consts::{DURATION_DESIGNATOR, SECONDS_PER_DAY, TIME_DESIGNATOR};
use crate::{DateTime, Iso8601Error, pattern};

/// How far the first estimate of a calendar count may be corrected.
const MAX_COUNT_ADJUSTMENTS: usize = 16;
/// Decimal places tried when rendering a normalized fraction of a second
const MAX_FRACTION_DIGITS: i32 = 17;

/// A signed duration with an optional base moment.
#[derive(Debug, Clone)]
pub struct Duration {
    pattern:    String,
    magnitudes: [f64; 7],
    negative:   bool,
    base:       Option<DateTime>,
}

impl Duration {
    /// Parses a duration without a base.
    ///
    /// # Errors
    /// Returns `Iso8601Error::UnknownPattern` for malformed input and
    /// `Iso8601Error::InvalidFractions` when a fraction is misplaced.
    pub fn parse(input: &str) -> Result<Self, Iso8601Error> {
        Self::new(input, None)
    }

    /// Parses a duration anchored at `base`.
    ///
    /// # Errors
    /// Same as [`Duration::parse`].
    pub fn parse_with_base(input: &str, base: DateTime) -> Result<Self, Iso8601Error> {
        Self::new(input, Some(base))
    }

    /// Parses a duration with an optional base.
    ///
    /// # Errors
    /// Same as [`Duration::parse`].
    pub fn new(input: &str, base: Option<DateTime>) -> Result<Self, Iso8601Error> {
        let fields = pattern::parse_duration(input)?;
        let sign = if fields.negative { -1.0 } else { 1.0 };
        Ok(Self {
            pattern: input.to_owned(),
            magnitudes: fields.magnitudes.map(|m| m * sign + 0.0),
            negative: fields.negative,
            base,
        })
    }

    /// Wraps a plain number of seconds as `PT{n}S` (`-PT{n}S` when negative).
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` for non-finite input.
    pub fn from_seconds(seconds: f64, base: Option<DateTime>) -> Result<Self, Iso8601Error> {
        if !seconds.is_finite() {
            return Err(out_of_range(&seconds.to_string()));
        }
        let sign = if seconds < 0.0 { "-" } else { "" };
        let value = Atom::new(AtomKind::Seconds, seconds.abs(), None).value();
        Self::new(&format!("{sign}{DURATION_DESIGNATOR}{TIME_DESIGNATOR}{value}S"), base)
    }

    /// Builds the canonical duration for a number of seconds: largest unit
    /// first, zero components omitted, `PT0S` for zero.
    ///
    /// With a base, years and months are counted on the real calendar so
    /// that the result measures exactly `seconds` from that base.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` for non-finite input or when the
    /// calendar decomposition leaves the supported range.
    pub fn normalize(seconds: f64, base: Option<DateTime>) -> Result<Self, Iso8601Error> {
        if !seconds.is_finite() {
            return Err(out_of_range(&seconds.to_string()));
        }
        if seconds == 0.0 {
            return Self::new("PT0S", base);
        }

        let negative = seconds < 0.0;
        let direction = if negative { -1.0 } else { 1.0 };
        let magnitude = seconds.abs();
        let fraction = magnitude.fract();
        let whole = magnitude.trunc();
        let mut remainder = whole;

        let (years, years_seconds) = decompose(remainder, AtomKind::Years, base, direction)?;
        remainder -= years_seconds;

        let (months, months_seconds) = if remainder == 0.0 {
            (0.0, 0.0)
        } else {
            let month_base = advance(base, direction * years_seconds)?;
            decompose(remainder, AtomKind::Months, month_base, direction)?
        };
        remainder -= months_seconds;

        let mut counts = [years, months, 0.0, 0.0, 0.0, 0.0, 0.0];
        for kind in [AtomKind::Days, AtomKind::Hours, AtomKind::Minutes] {
            let factor = Atom::new(kind, 1.0, None).factor()?;
            let count = (remainder / factor).floor();
            counts[kind.index()] = count;
            remainder -= count * factor;
        }
        counts[AtomKind::Seconds.index()] =
            remainder + shortest_fraction(whole - remainder, remainder, fraction, magnitude);
        trace!("normalized {seconds}s into {counts:?}");

        let render = |kinds: &[AtomKind]| -> String {
            kinds
                .iter()
                .map(|kind| Atom::new(*kind, counts[kind.index()], None).to_string())
                .collect()
        };
        let date = render(&[AtomKind::Years, AtomKind::Months, AtomKind::Days]);
        let time = render(&[AtomKind::Hours, AtomKind::Minutes, AtomKind::Seconds]);

        let mut pattern = String::new();
        if negative {
            pattern.push('-');
        }
        pattern.push(DURATION_DESIGNATOR);
        pattern.push_str(&date);
        if !time.is_empty() {
            pattern.push(TIME_DESIGNATOR);
            pattern.push_str(&time);
        }
        Self::new(&pattern, base)
    }

    /// The pattern this duration was parsed from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Moment calendar components are measured from
    pub const fn base(&self) -> Option<DateTime> {
        self.base
    }

    /// The same duration anchored at another base (or none).
    #[must_use]
    pub fn with_base(&self, base: Option<DateTime>) -> Self {
        Self {
            base,
            ..self.clone()
        }
    }

    /// The same duration measured on average years and months
    #[must_use]
    pub fn without_base(&self) -> Self {
        self.with_base(None)
    }

    /// `-1` for negative durations, `1` otherwise
    pub const fn sign(&self) -> i8 {
        if self.negative { -1 } else { 1 }
    }

    fn atom(&self, kind: AtomKind, base: Option<DateTime>) -> Atom {
        Atom::new(kind, self.magnitudes[kind.index()], base)
    }

    /// The years component, measured from the base
    pub fn years(&self) -> Atom {
        self.atom(AtomKind::Years, self.base)
    }

    /// The months component, measured from the base moved by the years.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` if moving the base overflows.
    pub fn months(&self) -> Result<Atom, Iso8601Error> {
        if self.magnitudes[AtomKind::Months.index()] == 0.0 {
            return Ok(self.atom(AtomKind::Months, self.base));
        }
        let base = advance(self.base, self.years().to_seconds()?)?;
        Ok(self.atom(AtomKind::Months, base))
    }

    /// The weeks component
    pub fn weeks(&self) -> Atom {
        self.atom(AtomKind::Weeks, self.base)
    }

    /// The days component
    pub fn days(&self) -> Atom {
        self.atom(AtomKind::Days, self.base)
    }

    /// The hours component
    pub fn hours(&self) -> Atom {
        self.atom(AtomKind::Hours, self.base)
    }

    /// The minutes component
    pub fn minutes(&self) -> Atom {
        self.atom(AtomKind::Minutes, self.base)
    }

    /// The seconds component, possibly fractional
    pub fn seconds(&self) -> Atom {
        self.atom(AtomKind::Seconds, self.base)
    }

    /// Total signed length in seconds.
    ///
    /// # Errors
    /// Returns `Iso8601Error::OutOfRange` if a calendar span overflows.
    pub fn to_seconds(&self) -> Result<f64, Iso8601Error> {
        let mut total = self.years().to_seconds()? + self.months()?.to_seconds()?;
        for atom in [self.weeks(), self.days(), self.hours(), self.minutes(), self.seconds()] {
            total += atom.to_seconds()?;
        }
        Ok(total)
    }

    /// Total signed length in days.
    ///
    /// # Errors
    /// Same as [`Duration::to_seconds`].
    pub fn to_days(&self) -> Result<f64, Iso8601Error> {
        Ok(self.to_seconds()? / SECONDS_PER_DAY as f64)
    }

    /// The duration with its sign dropped.
    ///
    /// # Errors
    /// Never fails for a parsed duration; the pattern is parsed again.
    pub fn abs(&self) -> Result<Self, Iso8601Error> {
        Self::new(self.pattern.trim_start_matches(['+', '-']), self.base)
    }

    /// The canonical form of this duration, keeping its base.
    ///
    /// # Errors
    /// Same as [`Duration::normalize`].
    pub fn canonical(&self) -> Result<Self, Iso8601Error> {
        Self::normalize(self.to_seconds()?, self.base)
    }

    fn check_base(&self, other: &Self) -> Result<(), Iso8601Error> {
        if self.base == other.base {
            return Ok(());
        }
        log::debug!("base mismatch between {} and {}", self.pattern, other.pattern);
        Err(Iso8601Error::DurationBase(other.pattern.clone()))
    }

    /// Sum of two durations sharing a base, in canonical form.
    ///
    /// # Errors
    /// Returns `Iso8601Error::DurationBase` when the bases differ.
    pub fn try_add(&self, other: &Self) -> Result<Self, Iso8601Error> {
        self.check_base(other)?;
        Self::normalize(self.to_seconds()? + other.to_seconds()?, self.base)
    }

    /// Difference of two durations sharing a base, in canonical form.
    ///
    /// # Errors
    /// Returns `Iso8601Error::DurationBase` when the bases differ.
    pub fn try_sub(&self, other: &Self) -> Result<Self, Iso8601Error> {
        self.check_base(other)?;
        Self::normalize(self.to_seconds()? - other.to_seconds()?, self.base)
    }

    /// Whether two durations sharing a base have the same length.
    /// `P1D` and `PT24H` are equal here but not under `==`.
    ///
    /// # Errors
    /// Returns `Iso8601Error::DurationBase` when the bases differ.
    pub fn try_eq(&self, other: &Self) -> Result<bool, Iso8601Error> {
        self.check_base(other)?;
        Ok(self.to_seconds()? == other.to_seconds()?)
    }
}

/// Moves an optional base by `seconds`.
fn advance(base: Option<DateTime>, seconds: f64) -> Result<Option<DateTime>, Iso8601Error> {
    match base {
        Some(base) if seconds != 0.0 => base.add_seconds(seconds).map(Some),
        _ => Ok(base),
    }
}

/// The shortest decimal rounding of `fraction` that still sums back to
/// `total` once added to the whole seconds and the larger components.
fn shortest_fraction(larger: f64, whole_seconds: f64, fraction: f64, total: f64) -> f64 {
    if fraction == 0.0 {
        return 0.0;
    }
    (1..=MAX_FRACTION_DIGITS)
        .map(|digits| {
            let scale = 10_f64.powi(digits);
            (fraction * scale).round() / scale
        })
        .find(|rounded| larger + (whole_seconds + rounded) == total)
        .unwrap_or(fraction)
}

/// Largest count of `kind` units (walking in `direction`) whose span fits in
/// `value`, and the absolute span it covers.
fn decompose(
    value: f64,
    kind: AtomKind,
    base: Option<DateTime>,
    direction: f64,
) -> Result<(f64, f64), Iso8601Error> {
    let span = |count: f64| Atom::new(kind, direction * count, base).to_seconds().map(f64::abs);

    let mut count = (value / Atom::new(kind, 1.0, None).factor()?).floor();
    for _ in 0..MAX_COUNT_ADJUSTMENTS {
        if count <= 0.0 || span(count)? <= value {
            break;
        }
        count -= 1.0;
    }
    for _ in 0..MAX_COUNT_ADJUSTMENTS {
        if span(count + 1.0)? > value {
            break;
        }
        count += 1.0;
    }

    let count = count.max(0.0);
    Ok((count, span(count)?))
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Component-wise identity: `P1D != PT24H`, and bases are ignored.
impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.magnitudes
            .iter()
            .zip(other.magnitudes.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Duration {}

impl Hash for Duration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for magnitude in self.magnitudes {
            magnitude.to_bits().hash(state);
        }
    }
}

impl FromStr for Duration {
    type Err = Iso8601Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.pattern)
    }
}

impl<'de> serde::Deserialize<'de> for Duration {
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
    use crate::test_utils::{date_time, duration};

    #[test]
    fn test_parse_keeps_pattern() {
        for input in ["P1Y1M1DT1H1M1S", "-P1Y", "+PT0.5S", "P2W", "P0,5Y", "PT36H"] {
            assert_eq!(duration(input).to_string(), input);
        }
    }

    #[test]
    fn test_sign_and_atoms() {
        let parsed = duration("-P1Y2M3DT4H5M6S");
        assert_eq!(parsed.sign(), -1);
        assert_eq!(parsed.years().magnitude(), -1.0);
        assert_eq!(parsed.months().unwrap().magnitude(), -2.0);
        assert_eq!(parsed.days().magnitude(), -3.0);
        assert_eq!(parsed.hours().magnitude(), -4.0);
        assert_eq!(parsed.minutes().magnitude(), -5.0);
        assert_eq!(parsed.seconds().magnitude(), -6.0);
        assert_eq!(parsed.weeks().magnitude(), 0.0);
        assert_eq!(duration("+P1Y").sign(), 1);
    }

    #[test]
    fn test_to_seconds_without_base() {
        let cases = [
            ("PT0S", 0.0),
            ("PT1H1M1S", 3661.0),
            ("P1W", 604_800.0),
            ("P1D", 86_400.0),
            ("-P1DT1S", -86_401.0),
            ("P1Y", 31_536_000.0),
            ("P1M", 2_628_000.0),
            ("P1Y1M1DT1H1M1S", 31_536_000.0 + 2_628_000.0 + 86_400.0 + 3661.0),
            ("PT0,5S", 0.5),
        ];
        for (input, seconds) in cases {
            assert_eq!(duration(input).to_seconds().unwrap(), seconds, "{input}");
        }
    }

    #[test]
    fn test_to_seconds_with_base() {
        let cases = [
            ("P1Y", "2000-01-01", 366.0 * 86_400.0),
            ("P1Y", "2010-01-01", 365.0 * 86_400.0),
            ("P1M", "2000-02-01", 29.0 * 86_400.0),
            ("P1Y1M", "2000-02-01", (366.0 + 28.0) * 86_400.0),
            ("-P1M", "2000-03-01", -29.0 * 86_400.0),
            ("P1M1D", "2010-01-01", 32.0 * 86_400.0),
            ("P2Y3M", "2000-01-01", (366.0 + 365.0 + 31.0 + 28.0 + 31.0) * 86_400.0),
            ("P19M", "2012-05-01", (730.0 + 214.0) * 86_400.0),
            ("P1Y1M1D", "2010-05-01", (365.0 + 31.0 + 1.0) * 86_400.0),
            ("P1YT5H", "2012-01-01", 366.0 * 86_400.0 + 5.0 * 3600.0),
        ];
        for (input, base, seconds) in cases {
            let parsed = Duration::parse_with_base(input, date_time(base)).unwrap();
            assert_eq!(parsed.to_seconds().unwrap(), seconds, "{input} from {base}");
        }
    }

    #[test]
    fn test_to_days() {
        assert_eq!(duration("PT36H").to_days().unwrap(), 1.5);
    }

    #[test]
    fn test_from_seconds() {
        assert_eq!(Duration::from_seconds(12.0, None).unwrap().pattern(), "PT12S");
        assert_eq!(Duration::from_seconds(-12.0, None).unwrap().pattern(), "-PT12S");
        assert_eq!(Duration::from_seconds(1.5, None).unwrap().pattern(), "PT1.5S");
        assert!(Duration::from_seconds(f64::NAN, None).is_err());
    }

    #[test]
    fn test_normalize_without_base() {
        let cases = [
            (0.0, "PT0S"),
            (1.0, "PT1S"),
            (-11.0, "-PT11S"),
            (3661.0, "PT1H1M1S"),
            (86_400.0, "P1D"),
            (90_000.0, "P1DT1H"),
            (31_536_000.0, "P1Y"),
            (31_536_000.0 + 2_628_000.0 + 90_061.5, "P1Y1M1DT1H1M1.5S"),
        ];
        for (seconds, pattern) in cases {
            assert_eq!(Duration::normalize(seconds, None).unwrap().pattern(), pattern, "{seconds}");
        }
        assert!(Duration::normalize(f64::INFINITY, None).is_err());
    }

    #[test]
    fn test_normalize_renders_short_fractions() {
        for input in ["PT3661.7S", "P1Y1M1DT1H1M1.1S", "-P2DT0.3S", "PT0.1S"] {
            let seconds = duration(input).to_seconds().unwrap();
            let normalized = Duration::normalize(seconds, None).unwrap();
            assert_eq!(normalized.to_seconds().unwrap(), seconds, "{input}");
            assert!(!normalized.pattern().contains("0000"), "{input} -> {normalized}");
        }
        assert_eq!(Duration::normalize(3661.7, None).unwrap().pattern(), "PT1H1M1.7S");
        let long = duration("P1Y1M1DT1H1M1.1S").to_seconds().unwrap();
        assert_eq!(Duration::normalize(long, None).unwrap().pattern(), "P1Y1M1DT1H1M1.1S");
    }

    #[test]
    fn test_last_writable_year() {
        let base = date_time("9999-01-01");
        let year = Duration::parse_with_base("P1Y", base).unwrap();
        assert_eq!(year.to_seconds().unwrap(), 365.0 * 86_400.0);
        assert_eq!(year.canonical().unwrap().pattern(), "P1Y");

        let past_the_end = Duration::parse_with_base("P1Y1M", base).unwrap();
        assert!(matches!(past_the_end.to_seconds(), Err(Iso8601Error::OutOfRange(_))));
        assert!(matches!(base.add_seconds(366.0 * 86_400.0), Err(Iso8601Error::OutOfRange(_))));
    }

    #[test]
    fn test_huge_based_durations_are_out_of_range() {
        let base = date_time("2000-01-01");
        for input in ["P100000000000000000000Y", "P100000000000000000000M", "-P100000000000000000000Y"] {
            let parsed = Duration::parse_with_base(input, base).unwrap();
            assert!(
                matches!(parsed.to_seconds(), Err(Iso8601Error::OutOfRange(_))),
                "{input} should be out of range"
            );
        }
    }

    #[test]
    fn test_normalize_with_base() {
        let base = Some(date_time("2000-01-01"));
        let leap_year = 366.0 * 86_400.0;
        assert_eq!(Duration::normalize(leap_year, base).unwrap().pattern(), "P1Y");
        assert_eq!(Duration::normalize(leap_year, None).unwrap().pattern(), "P1Y1D");

        let based = Duration::parse_with_base("P1Y1M", date_time("2000-02-01")).unwrap();
        let canonical = based.canonical().unwrap();
        assert_eq!(canonical.pattern(), "P1Y1M");
        assert_eq!(canonical.base(), based.base());

        let back = Duration::parse_with_base("-P1Y", date_time("2001-01-01")).unwrap();
        assert_eq!(back.canonical().unwrap().pattern(), "-P1Y");
    }

    #[test]
    fn test_arithmetic() {
        let zero = duration("PT12S").try_sub(&duration("PT12S")).unwrap();
        assert_eq!(zero, duration("PT0S"));
        assert_eq!(zero.pattern(), "PT0S");

        let negative = duration("PT1S").try_sub(&duration("PT12S")).unwrap();
        assert_eq!(negative, duration("-PT11S"));

        let sum = duration("PT50M").try_add(&duration("PT20M")).unwrap();
        assert_eq!(sum.pattern(), "PT1H10M");

        let sum = duration("P11Y1M1DT1H1M1S").try_add(&duration("P1Y1M1DT1H1M1S")).unwrap();
        assert_eq!(sum.pattern(), "P12Y2M2DT2H2M2S");
        let difference = duration("PT1S").try_sub(&duration("-PT12S")).unwrap();
        assert_eq!(difference.pattern(), "PT13S");
    }

    #[test]
    fn test_base_mismatch() {
        let based = Duration::parse_with_base("P1Y", date_time("2000-01-01")).unwrap();
        let other = Duration::parse_with_base("P1Y", date_time("2010-01-01")).unwrap();
        let plain = duration("P1Y");

        assert!(matches!(based.try_add(&plain), Err(Iso8601Error::DurationBase(_))));
        assert!(matches!(based.try_sub(&other), Err(Iso8601Error::DurationBase(_))));
        assert!(matches!(based.try_eq(&other), Err(Iso8601Error::DurationBase(_))));

        let same = Duration::parse_with_base("P1Y", date_time("2000-01-01T02:00+02:00")).unwrap();
        assert!(based.try_eq(&same).unwrap());
    }

    #[test]
    fn test_equality_kinds() {
        assert!(duration("P1D").try_eq(&duration("PT24H")).unwrap());
        assert_ne!(duration("P1D"), duration("PT24H"));
        assert_eq!(duration("P1D"), duration("+P1D"));
        assert_eq!(duration("P1Y"), Duration::parse_with_base("P1Y", date_time("2000-01-01")).unwrap());
    }

    #[test]
    fn test_abs_and_with_base() {
        let negative = duration("-P1Y2M");
        let positive = negative.abs().unwrap();
        assert_eq!(positive.pattern(), "P1Y2M");
        assert_eq!(positive.sign(), 1);

        let base = date_time("2000-01-01");
        let based = negative.with_base(Some(base));
        assert_eq!(based.base(), Some(base));
        assert_eq!(negative.base(), None);
        assert_eq!(based.without_base().base(), None);
        assert_eq!(based.abs().unwrap().base(), Some(base));
    }

    #[test]
    fn test_serde_round_trip() {
        let parsed = duration("P1Y2M");
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, "\"P1Y2M\"");
        let back: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parsed);
        assert!(serde_json::from_str::<Duration>("\"P1.5Y0.5M\"").is_err());
    }
}
