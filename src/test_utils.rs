use crate::{DateTime, Duration, TimeInterval};

pub fn date_time(input: &str) -> DateTime {
    DateTime::parse(input).unwrap_or_else(|e| panic!("invalid test date-time {input:?}: {e}"))
}

pub fn duration(input: &str) -> Duration {
    Duration::parse(input).unwrap_or_else(|e| panic!("invalid test duration {input:?}: {e}"))
}

pub fn interval(input: &str) -> TimeInterval {
    TimeInterval::parse(input).unwrap_or_else(|e| panic!("invalid test interval {input:?}: {e}"))
}
