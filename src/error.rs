use thiserror::Error;

/// Errors raised by [`Geoid`](crate::Geoid) computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeodesicError {
    /// The iterative inverse solution did not settle, which happens for a point and its
    /// (near) antipode.
    #[error(
        "calculating distance between ({}°, {}°) and ({}°, {}°) didn't converge after {iterations} iterations",
        .start.0, .start.1, .end.0, .end.1
    )]
    ConvergenceFailure {
        /// Latitude and longitude of the start point, in degrees.
        start: (f64, f64),
        /// Latitude and longitude of the end point, in degrees.
        end: (f64, f64),
        iterations: usize,
    },

    /// Partial length reductions cannot be merged; lengths must be folded sequentially.
    #[error("length reductions can only be folded sequentially and cannot be combined")]
    UnsupportedCombination,
}

/// Invalid [`Ellipsoid`](crate::Ellipsoid) parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EllipsoidError {
    #[error("ellipsoid name must not be empty")]
    MissingName,

    #[error("ellipsoid parameter {parameter} must be finite and positive, got {value}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
    },
}

/// A location pattern that violates the pattern grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid location pattern '{pattern}': {kind}")]
pub struct PatternError {
    pub pattern: String,
    pub kind: PatternErrorKind,
}

/// The rule a rejected location pattern violates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternErrorKind {
    #[error("field '{0}' appears more than once")]
    RepeatedField(char),

    #[error("'+' on field '{0}' cannot be combined with hemisphere letter '{1}'")]
    SignWithHemisphere(char, char),

    #[error("'+' is only allowed before degree or elevation fields, found it before '{0}'")]
    MisplacedSign(char),

    #[error("fractional degrees '{0}' cannot be followed by minutes or seconds")]
    FractionalDegrees(char),

    #[error("field '{field}' requires field '{requires}'")]
    MissingField { field: char, requires: char },

    #[error("fractional minutes '{0}' cannot be followed by seconds")]
    FractionalMinutes(char),

    #[error("field '{field}' has more than {max} fraction digits")]
    TooManyFractionDigits { field: char, max: usize },

    #[error("optional sections cannot be nested")]
    NestedOptional,

    #[error("found ']' without an opening '['")]
    UnopenedOptional,

    #[error("missing closing ']'")]
    UnclosedOptional,

    #[error("missing closing quote")]
    UnclosedQuote,
}

/// Errors raised when formatting a [`Location`](crate::format::Location).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("pattern '{pattern}' requires a {field} value, but the location has none")]
    MissingValue {
        field: &'static str,
        pattern: String,
    },

    #[error("{field} value {value} cannot be represented by the pattern")]
    NotRepresentable { field: &'static str, value: f64 },
}

/// Errors raised when parsing text into a [`Location`](crate::format::Location).
///
/// Positions are byte offsets into the parsed text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {field} at position {position}")]
    Field {
        field: &'static str,
        position: usize,
    },

    #[error("expected '{expected}' at position {position}")]
    Literal { expected: String, position: usize },

    #[error("expected one of {expected} at position {position}")]
    Hemisphere {
        expected: &'static str,
        position: usize,
    },

    #[error("not all input used, unparsed text starts at position {position}")]
    TrailingInput { position: usize },

    #[error("parsed {field} {value}° is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

impl ParseError {
    /// Returns the position at which parsing failed, if the error is tied to one.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Field { position, .. }
            | Self::Literal { position, .. }
            | Self::Hemisphere { position, .. }
            | Self::TrailingInput { position } => Some(*position),
            Self::OutOfRange { .. } => None,
        }
    }
}

/// Any error produced by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Geodesic(#[from] GeodesicError),

    #[error(transparent)]
    Ellipsoid(#[from] EllipsoidError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
