/// Error type for every parsing and arithmetic operation in this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Iso8601Error {
    /// The input does not match any supported ISO 8601 grammar.
    #[error("The pattern \"{0}\" is not allowed in this implementation of ISO 8601")]
    UnknownPattern(String),

    /// The input is well formed but names a calendar value that does not exist.
    #[error("\"{0}\" is out of range")]
    OutOfRange(String),

    /// An operand has the wrong kind for the operation.
    #[error("Unexpected type: {0}")]
    Type(String),

    /// More than one fractional component, or a fraction on a component
    /// other than the smallest nonzero one.
    #[error("Invalid fractions in \"{0}\": only the smallest nonzero component may carry a fraction")]
    InvalidFractions(String),

    /// Two durations anchored to different base moments were combined.
    #[error("Wrong base for {0} duration")]
    DurationBase(String),

    /// Interval algebra failure, e.g. intersecting disjoint intervals.
    #[error("Interval error: {0}")]
    Interval(String),

    /// A required operand was not supplied.
    #[error("Missing argument: {0}")]
    MissingArgument(String),
}
