//! Error type for the database model and codec.
//!
//! Mirrors the taxonomy in the design's error-handling section: lookup
//! failures read like `KeyError`, malformed values like `ValueError`,
//! unrecognized input formats get their own variant, and structural parse
//! problems carry a line/column when the parser knows one.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// No message with this frame id exists in the database.
    UnknownFrameId(u32),
    /// No message with this name exists in the database.
    UnknownMessageName(String),
    /// `data` was missing a signal the message requires (strict mode).
    MissingSignal(String),
    /// A string value did not match any of the signal's choices.
    UnknownChoice { signal: String, value: String },
    /// A raw integer did not fit in the signal's declared bit length.
    RawOverflow { signal: String },
    /// The payload was shorter than the signal (or message) needs.
    PayloadTooShort { needed: usize, got: usize },
    /// A signal or message definition violates a schema invariant.
    InvalidSchema(String),
    /// `load()` could not identify the input as DBC, KCD, or SYM.
    UnsupportedFormat,
    /// The input sniffed as a known format, but this build does not carry a
    /// parser for it (KCD and SYM grammars are external collaborators).
    FormatNotBundled(&'static str),
    /// A structural problem in the source text, with position info when
    /// the parser tracked one.
    Parse {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    /// Failed to read a database file from disk.
    Io(String),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Error::Parse {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    pub(crate) fn parse_bare(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownFrameId(id) => write!(f, "no message with frame id 0x{id:x}"),
            Error::UnknownMessageName(name) => write!(f, "no message named '{name}'"),
            Error::MissingSignal(name) => write!(f, "missing required signal '{name}'"),
            Error::UnknownChoice { signal, value } => {
                write!(f, "signal '{signal}' has no choice named '{value}'")
            }
            Error::RawOverflow { signal } => {
                write!(f, "value for signal '{signal}' does not fit its bit length")
            }
            Error::PayloadTooShort { needed, got } => {
                write!(f, "payload too short: needed {needed} bytes, got {got}")
            }
            Error::InvalidSchema(detail) => write!(f, "invalid schema: {detail}"),
            Error::UnsupportedFormat => {
                write!(f, "could not identify database format (expected DBC, KCD, or SYM)")
            }
            Error::FormatNotBundled(format) => {
                write!(f, "{format} format recognized but no parser is bundled in this crate")
            }
            Error::Parse { message, line, column } => match (line, column) {
                (Some(l), Some(c)) => write!(f, "parse error at {l}:{c}: {message}"),
                _ => write!(f, "parse error: {message}"),
            },
            Error::Io(detail) => write!(f, "io error: {detail}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
