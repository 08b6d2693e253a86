//! Date time error types.

use std::error::Error;
use std::fmt;

/// Date time input error
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DateTimeError {
    /// Year out of the representable range
    InvalidYear,
    /// Month out of `[0, 11]`
    InvalidMonth,
    /// Month day out of range for the month
    InvalidMonthDay,
    /// Hour out of `[0, 23]`
    InvalidHour,
    /// Minute out of `[0, 59]`
    InvalidMinute,
    /// Second out of `[0, 60]`
    InvalidSecond,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidYear => f.write_str("invalid year"),
            Self::InvalidMonth => f.write_str("invalid month"),
            Self::InvalidMonthDay => f.write_str("invalid month day"),
            Self::InvalidHour => f.write_str("invalid hour"),
            Self::InvalidMinute => f.write_str("invalid minute"),
            Self::InvalidSecond => f.write_str("invalid second"),
        }
    }
}

impl Error for DateTimeError {}
