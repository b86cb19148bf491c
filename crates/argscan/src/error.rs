//! Errors raised while scanning an argument sequence.

use thiserror::Error;

/// A fatal parse failure.
///
/// Every variant carries the token as the user typed it, so callers can
/// point at the exact argument. Parsing never resumes after an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A lone `-` with nothing after it.
    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    /// A short or long option with no registered destination.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// A value-taking option at the very end of the arguments.
    #[error("missing value for {0}")]
    MissingValue(String),

    /// The value was present but could not be converted to the destination type.
    #[error("invalid value '{value}' for {option}: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    /// The argument token that triggered the error.
    pub fn token(&self) -> &str {
        match self {
            Self::MalformedArgument(token)
            | Self::UnknownOption(token)
            | Self::MissingValue(token) => token.as_str(),
            Self::InvalidValue { option, .. } => option.as_str(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
