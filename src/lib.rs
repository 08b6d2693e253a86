#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! This crate reads the system time zone database and computes snapshots of its zones at a given instant.
//!
//! A snapshot holds the names of a zone, whether daylight saving time is in effect, its UTC offset in minutes,
//! its offset relative to a reference zone, and the computed local date time.
//!
//! Zones are read from the [TZif files](https://datatracker.ietf.org/doc/html/rfc8536) of a zoneinfo directory,
//! whose footer holds a [POSIX `TZ` string](https://pubs.opengroup.org/onlinepubs/9699919799/basedefs/V1_chap08.html) describing the yearly daylight saving time rule.
//!
//! # Usage
//!
//! ## Zone snapshots
//!
//! ```rust
//! # fn main() -> tz_resolver::Result<()> {
//!     use tz_resolver::{ResolverConfig, TimeZone, TimezoneResolver, UtcDateTime, ZoneDefinition};
//!
//!     // Zone definitions are usually read from the system zoneinfo directory with `TimezoneResolver::system()`
//!     let time_zone = TimeZone::from_posix_tz("PST8PDT,M3.2.0,M11.1.0")?;
//!     let zone = ZoneDefinition::from_time_zone("America/Los_Angeles", &time_zone)?;
//!     assert_eq!(zone.display_name(), "(UTC-08:00) America/Los_Angeles");
//!     assert!(zone.supports_dst());
//!
//!     // Measure system time offsets against UTC
//!     let resolver = TimezoneResolver::new(vec![zone], TimeZone::utc());
//!
//!     // 2024-07-01T12:00:00Z
//!     let base_time = UtcDateTime::new(2024, 6, 1, 12, 0, 0)?;
//!
//!     // Names are matched ignoring ASCII case
//!     if let Some(snapshot) = resolver.find_by_name("pst", Some(base_time), ResolverConfig::default())? {
//!         assert_eq!(snapshot.name(), "PDT");
//!         assert!(snapshot.is_dst());
//!         assert_eq!(snapshot.utc_offset_minutes(), -420);
//!         assert_eq!(snapshot.system_time_offset_minutes(), -420);
//!         assert_eq!(snapshot.local_time().to_string(), "2024-07-01T05:00:00-07:00");
//!     }
//!
//!     // Ignore daylight saving time
//!     let snapshots = resolver.list_all(Some(base_time), ResolverConfig { consider_dst: false })?;
//!     assert_eq!(snapshots[0].name(), "PST");
//!     assert_eq!(snapshots[0].utc_offset_minutes(), -480);
//!
//!     // No match is not an error
//!     assert!(resolver.find_by_name("NoSuchZone", Some(base_time), ResolverConfig::default())?.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Time zone data
//!
//! ```rust
//! # fn main() -> tz_resolver::Result<()> {
//!     use tz_resolver::{DateTime, TimeZone, UtcDateTime};
//!
//!     // 2000-01-01T00:00:00Z
//!     let utc_date_time = UtcDateTime::from_unix_time(946684800)?;
//!     assert_eq!(utc_date_time, UtcDateTime::new(2000, 0, 1, 0, 0, 0)?);
//!     assert_eq!(utc_date_time.to_string(), "2000-01-01T00:00:00Z");
//!
//!     // Fixed time zone at GMT-1
//!     let local_time_type = TimeZone::fixed(-3600)?.find_local_time_type(946684800)?.clone();
//!     let date_time = DateTime::new(946684800, local_time_type)?;
//!     assert_eq!(date_time.full_year(), 1999);
//!     assert_eq!(date_time.to_string(), "1999-12-31T23:00:00-01:00");
//!
//!     // Time zone from a POSIX TZ string
//!     let time_zone = TimeZone::from_posix_tz("NZST-12:00:00NZDT-13:00:00,M10.1.0,M3.3.0")?;
//!     let local_time_type = time_zone.find_local_time_type(946684800)?;
//!     assert_eq!(local_time_type.ut_offset(), 46800);
//!     assert!(local_time_type.is_dst());
//!     assert_eq!(local_time_type.time_zone_designation(), "NZDT");
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod logging;

mod constants;
mod parse;

pub mod datetime;
pub mod error;
pub mod resolver;
pub mod timezone;
pub mod zone;

pub use datetime::{DateTime, UtcDateTime};
pub use error::{Error, TzError};
pub use resolver::{compute_zone_snapshot, ResolverConfig, TimezoneResolver, ZoneSnapshot};
pub use timezone::{LocalTimeType, TimeZone};
pub use zone::{AdjustmentRule, SystemZoneDatabase, ZoneDatabase, ZoneDefinition};

/// Alias for [`std::result::Result`] with the crate unified error
pub type Result<T> = std::result::Result<T, Error>;
