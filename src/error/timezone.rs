//! Errors raised while building time zone data.

use std::error::Error;
use std::fmt;

/// Local time type error
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LocalTimeTypeError {
    /// Designation is not 3 to 7 characters of `[A-Za-z0-9+-]`
    InvalidDesignation,
    /// UTC offset is `i32::MIN`
    InvalidUtcOffset,
}

impl fmt::Display for LocalTimeTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidDesignation => f.write_str("zone designation must be 3 to 7 characters of [A-Za-z0-9+-]"),
            Self::InvalidUtcOffset => f.write_str("UTC offset out of range"),
        }
    }
}

impl Error for LocalTimeTypeError {}

/// Transition rule error
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransitionRuleError {
    /// Julian day, month, week or week day out of range
    InvalidRuleDay,
    /// DST start or end time is not within one week
    InvalidDstStartEndTime,
}

impl fmt::Display for TransitionRuleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidRuleDay => f.write_str("rule day out of range"),
            Self::InvalidDstStartEndTime => f.write_str("daylight saving start or end time must be within one week"),
        }
    }
}

impl Error for TransitionRuleError {}

/// Time zone error
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimeZoneError {
    /// No local time type
    NoLocalTimeType,
    /// Transition refers to a missing local time type
    InvalidLocalTimeTypeIndex,
    /// Transitions are not strictly increasing
    UnsortedTransitions,
    /// Extra rule disagrees with the local time type of the last transition
    InconsistentExtraRule,
}

impl fmt::Display for TimeZoneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoLocalTimeType => f.write_str("time zone has no local time type"),
            Self::InvalidLocalTimeTypeIndex => f.write_str("transition refers to a missing local time type"),
            Self::UnsortedTransitions => f.write_str("transitions must be strictly increasing"),
            Self::InconsistentExtraRule => f.write_str("extra rule disagrees with the last transition"),
        }
    }
}

impl Error for TimeZoneError {}
