//! Zone definition, zone database and lookup error types.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Invalid caller input, reported before any lookup takes place
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ValidationError {
    /// Lookup by name was given an empty name
    EmptyZoneName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyZoneName => f.write_str("time zone name is required"),
        }
    }
}

impl Error for ValidationError {}

/// Adjustment rule error
#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AdjustmentRuleError {
    /// Rule end is not strictly after its start
    EmptyRange,
    /// Rules are not sorted by start date, or overlap
    OverlappingRules,
    /// Daylight delta is not within one day
    InvalidDaylightDelta,
}

impl fmt::Display for AdjustmentRuleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyRange => f.write_str("adjustment rule must end after it starts"),
            Self::OverlappingRules => f.write_str("adjustment rules must be sorted and must not overlap"),
            Self::InvalidDaylightDelta => f.write_str("daylight delta must be within one day"),
        }
    }
}

impl Error for AdjustmentRuleError {}

/// The platform zone database cannot be enumerated
#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ZoneDatabaseError {
    /// None of the searched zoneinfo directories could be opened
    NotFound(Vec<PathBuf>),
    /// The zoneinfo directory holds no readable TZif file
    Empty(PathBuf),
}

impl fmt::Display for ZoneDatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound(directories) => {
                f.write_str("could not find a zoneinfo database at any of the following paths: ")?;
                for (index, directory) in directories.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", directory.display())?;
                }
                Ok(())
            }
            Self::Empty(directory) => write!(f, "{}: no TZif files", directory.display()),
        }
    }
}

impl Error for ZoneDatabaseError {}
