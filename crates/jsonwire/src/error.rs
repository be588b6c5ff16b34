use std::{collections::TryReserveError, fmt};

use bstr::BString;
use thiserror::Error;

/// Every failure a (de)serialize call can surface.
///
/// A call either fully succeeds or returns exactly one of these. Nothing is
/// retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input does not follow the JSON grammar at `position`.
    #[error("{kind} at byte {position}")]
    Structural {
        kind: StructuralError,
        position: usize,
    },
    /// A token is present at `position` but cannot be decoded into the target.
    #[error("{kind} at byte {position}")]
    Format { kind: FormatError, position: usize },
    /// The resolver or a formatter is misconfigured for the requested type.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// A scratch buffer could not be allocated.
    #[error("failed to allocate scratch buffer: {0}")]
    Resource(#[from] TryReserveError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Structural,
    Format,
    Configuration,
    Resource,
}

impl Error {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Structural { .. } => ErrorCategory::Structural,
            Self::Format { .. } => ErrorCategory::Format,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Resource(_) => ErrorCategory::Resource,
        }
    }

    /// Byte offset into the input where decoding stopped, for reader errors.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Structural { position, .. } | Self::Format { position, .. } => Some(*position),
            Self::Configuration(_) | Self::Resource(_) => None,
        }
    }

    /// Configuration error for a type the resolver has no formatter for.
    #[must_use]
    pub fn not_registered<T: ?Sized>() -> Self {
        ConfigurationError::FormatterNotRegistered(core::any::type_name::<T>()).into()
    }

    /// Configuration error for a formatter asked to do something it cannot.
    #[must_use]
    pub fn unsupported(formatter: &'static str, operation: &'static str) -> Self {
        ConfigurationError::UnsupportedOperation {
            formatter,
            operation,
        }
        .into()
    }
}

/// The byte found where something else was expected.
///
/// `None` stands for the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found(pub Option<u8>);

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("end of input"),
            Some(b) if b.is_ascii_graphic() => write!(f, "'{}'", b as char),
            Some(b) => write!(f, "byte 0x{b:02X}"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    #[error("expected '{expected}', found {found}")]
    Expected { expected: char, found: Found },
    #[error("expected ',' or '{close}', found {found}")]
    ExpectedSeparatorOrEnd { close: char, found: Found },
    #[error("trailing ',' before '{close}'")]
    TrailingSeparator { close: char },
    #[error("expected a value, found {found}")]
    UnexpectedValueStart { found: Found },
    #[error("trailing characters after value")]
    TrailingCharacters,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: Found,
    },
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("invalid unicode escape sequence at character: '{0}'")]
    InvalidUnicodeEscapeChar(char),
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unescaped control character 0x{0:02X} in string")]
    ControlCharacterInString(u8),
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid literal")]
    InvalidLiteral,
    #[error("invalid number")]
    InvalidNumber,
    #[error("number out of range for {0}")]
    NumberOutOfRange(&'static str),
    #[error("null is not allowed for {0}")]
    UnexpectedNull(&'static str),
    #[error("expected exactly one character, found {0}")]
    InvalidCharLength(usize),
    #[error("invalid GUID")]
    InvalidGuid,
    #[error("invalid URI: {0}")]
    InvalidUri(String),
    #[error("no member of {type_name} is named \"{name}\"")]
    UnknownEnumName {
        type_name: &'static str,
        name: BString,
    },
    #[error("{value} is not a valid value of {type_name}")]
    UnknownEnumValue { type_name: &'static str, value: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no formatter registered for {0}")]
    FormatterNotRegistered(&'static str),
    #[error("{formatter} does not support {operation}")]
    UnsupportedOperation {
        formatter: &'static str,
        operation: &'static str,
    },
}
