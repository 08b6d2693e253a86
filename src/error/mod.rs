//! Error types.

pub mod datetime;
pub mod parse;
pub mod timezone;
pub mod zone;

use datetime::DateTimeError;
use parse::{TzFileError, TzStringError};
use timezone::{LocalTimeTypeError, TimeZoneError, TransitionRuleError};
use zone::{AdjustmentRuleError, ValidationError, ZoneDatabaseError};

use std::error;
use std::fmt;
use std::io;

/// Unified error type for everything in the crate
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),
    /// A required lookup input was missing or empty
    Validation(ValidationError),
    /// The zone database could not be enumerated
    ZoneDatabase(ZoneDatabaseError),
    /// Unified error type for every time zone data error in the crate
    Tz(TzError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(error) => error.fmt(f),
            Self::Validation(error) => write!(f, "invalid input: {error}"),
            Self::ZoneDatabase(error) => write!(f, "zone database unavailable: {error}"),
            Self::Tz(error) => error.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

impl From<ZoneDatabaseError> for Error {
    fn from(error: ZoneDatabaseError) -> Self {
        Self::ZoneDatabase(error)
    }
}

impl From<TzError> for Error {
    fn from(error: TzError) -> Self {
        Self::Tz(error)
    }
}

/// Unified error type for every time zone data error in the crate
#[non_exhaustive]
#[derive(Debug)]
pub enum TzError {
    /// Unified error for parsing a TZif file
    TzFile(TzFileError),
    /// Unified error for parsing a TZ string
    TzString(TzStringError),
    /// Local time type error
    LocalTimeType(LocalTimeTypeError),
    /// Transition rule error
    TransitionRule(TransitionRuleError),
    /// Time zone error
    TimeZone(TimeZoneError),
    /// Adjustment rule error
    AdjustmentRule(AdjustmentRuleError),
    /// Date time error
    DateTime(DateTimeError),
    /// Out of range operation
    OutOfRange,
    /// No available local time type
    NoAvailableLocalTimeType,
}

impl fmt::Display for TzError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TzFile(error) => write!(f, "invalid TZ file: {error}"),
            Self::TzString(error) => write!(f, "invalid TZ string: {error}"),
            Self::LocalTimeType(error) => write!(f, "invalid local time type: {error}"),
            Self::TransitionRule(error) => write!(f, "invalid transition rule: {error}"),
            Self::TimeZone(error) => write!(f, "invalid time zone: {error}"),
            Self::AdjustmentRule(error) => write!(f, "invalid adjustment rule: {error}"),
            Self::DateTime(error) => write!(f, "invalid date time: {error}"),
            Self::OutOfRange => f.write_str("out of range operation"),
            Self::NoAvailableLocalTimeType => f.write_str("no local time type is available for the specified timestamp"),
        }
    }
}

impl error::Error for TzError {}

/// Implement `From` for a time zone data error, both into [`TzError`] and into [`Error`]
macro_rules! impl_from_tz_error {
    ($($error:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$error> for TzError {
                fn from(error: $error) -> Self {
                    Self::$variant(error)
                }
            }

            impl From<$error> for Error {
                fn from(error: $error) -> Self {
                    Self::Tz(TzError::$variant(error))
                }
            }
        )*
    };
}

impl_from_tz_error! {
    TzFileError => TzFile,
    TzStringError => TzString,
    LocalTimeTypeError => LocalTimeType,
    TransitionRuleError => TransitionRule,
    TimeZoneError => TimeZone,
    AdjustmentRuleError => AdjustmentRule,
    DateTimeError => DateTime,
}
