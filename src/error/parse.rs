//! Parsing error types.

use std::error::Error;
use std::fmt;
use std::num::ParseIntError;
use std::str::Utf8Error;

/// Implement `From` for the wrapped source errors of a parsing error
macro_rules! impl_from_source {
    ($target:ty { $($source:ty => $variant:ident),* $(,)? }) => {
        $(
            impl From<$source> for $target {
                fn from(error: $source) -> Self {
                    Self::$variant(error)
                }
            }
        )*
    };
}

/// Low-level error while reading a byte buffer
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParseDataError {
    /// Unexpected end of data
    UnexpectedEof,
    /// Data did not match the expected tag
    InvalidData,
}

impl fmt::Display for ParseDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of data"),
            Self::InvalidData => f.write_str("invalid data"),
        }
    }
}

impl Error for ParseDataError {}

/// Error while parsing a POSIX TZ string
#[non_exhaustive]
#[derive(Debug)]
pub enum TzStringError {
    /// UTF-8 error
    Utf8(Utf8Error),
    /// Integer parsing error
    ParseInt(ParseIntError),
    /// Parse data error
    ParseData(ParseDataError),
    /// UTC offset hours, minutes or seconds out of range
    InvalidOffset,
    /// Rule time hours, minutes or seconds out of range
    InvalidRuleTime,
    /// DST designation given without start and end rules
    MissingDstStartEndRules,
    /// Trailing bytes after the rule
    RemainingData,
    /// Empty TZ string
    Empty,
}

impl fmt::Display for TzStringError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Utf8(error) => error.fmt(f),
            Self::ParseInt(error) => error.fmt(f),
            Self::ParseData(error) => error.fmt(f),
            Self::InvalidOffset => f.write_str("UTC offset out of range"),
            Self::InvalidRuleTime => f.write_str("rule time out of range"),
            Self::MissingDstStartEndRules => f.write_str("daylight saving designation without start and end rules"),
            Self::RemainingData => f.write_str("trailing data after TZ string"),
            Self::Empty => f.write_str("empty TZ string"),
        }
    }
}

impl Error for TzStringError {}

/// Error while parsing a TZif file
#[non_exhaustive]
#[derive(Debug)]
pub enum TzFileError {
    /// UTF-8 error
    Utf8(Utf8Error),
    /// Parse data error
    ParseData(ParseDataError),
    /// File does not start with `TZif`
    InvalidMagicNumber,
    /// Version byte is not `\0`, `2` or `3`
    UnsupportedVersion,
    /// Header counts are inconsistent
    InvalidHeader,
    /// Footer is not a newline-enclosed TZ string
    InvalidFooter,
    /// Local time type record has a bad DST flag or designation index
    InvalidLocalTimeType,
    /// Standard/wall and UT/local indicators are not a valid pair
    InvalidIndicators,
    /// Trailing bytes after a version 1 data block
    RemainingDataV1,
}

impl fmt::Display for TzFileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Utf8(error) => error.fmt(f),
            Self::ParseData(error) => error.fmt(f),
            Self::InvalidMagicNumber => f.write_str("missing TZif magic number"),
            Self::UnsupportedVersion => f.write_str("unsupported TZif version"),
            Self::InvalidHeader => f.write_str("inconsistent TZif header counts"),
            Self::InvalidFooter => f.write_str("TZif footer is not a newline-enclosed TZ string"),
            Self::InvalidLocalTimeType => f.write_str("malformed local time type record"),
            Self::InvalidIndicators => f.write_str("invalid standard/wall and UT/local indicator pair"),
            Self::RemainingDataV1 => f.write_str("trailing data after TZif version 1 data block"),
        }
    }
}

impl Error for TzFileError {}

impl_from_source!(TzStringError {
    Utf8Error => Utf8,
    ParseIntError => ParseInt,
    ParseDataError => ParseData,
});

impl_from_source!(TzFileError {
    Utf8Error => Utf8,
    ParseDataError => ParseData,
});
