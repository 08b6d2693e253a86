//! Zone snapshots: the names, UTC offset, DST status and local time of a zone at a given instant.

use crate::constants::SECONDS_PER_MINUTE;
use crate::datetime::{DateTime, UtcDateTime};
use crate::error::zone::ValidationError;
use crate::error::TzError;
use crate::timezone::{LocalTimeType, TimeZone};
use crate::zone::{SystemZoneDatabase, ZoneDatabase, ZoneDefinition};

/// Per-call resolver options
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResolverConfig {
    /// Apply daylight saving time adjustments.
    ///
    /// When `false`, every snapshot reports standard time at the base UTC offset of its zone.
    ///
    pub consider_dst: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { consider_dst: true }
    }
}

/// State of a zone at a given instant, built fresh for each query
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ZoneSnapshot {
    /// UTC instant the snapshot was computed for
    base_time: UtcDateTime,
    /// Daylight name when in daylight saving time, standard name otherwise
    name: String,
    /// Long descriptive name of the zone
    full_name: String,
    /// Name while in standard time
    standard_name: String,
    /// Name while in daylight saving time
    daylight_name: String,
    /// Whether the zone has adjustment rules
    supports_dst: bool,
    /// Whether daylight saving time is in effect at the base time
    is_dst: bool,
    /// Base UTC offset plus any applied daylight delta, in minutes
    utc_offset_minutes: i32,
    /// Difference between the computed offset and the reference zone offset, in minutes
    system_time_offset_minutes: i32,
    /// Computed local date time
    local_time: DateTime,
}

impl ZoneSnapshot {
    /// Returns UTC instant the snapshot was computed for
    pub fn base_time(&self) -> &UtcDateTime {
        &self.base_time
    }

    /// Returns current name of the zone
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns long descriptive name of the zone
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns name while in standard time
    pub fn standard_name(&self) -> &str {
        &self.standard_name
    }

    /// Returns name while in daylight saving time
    pub fn daylight_name(&self) -> &str {
        &self.daylight_name
    }

    /// Returns whether the zone has adjustment rules
    pub fn supports_dst(&self) -> bool {
        self.supports_dst
    }

    /// Returns whether daylight saving time is in effect at the base time
    pub fn is_dst(&self) -> bool {
        self.is_dst
    }

    /// Returns UTC offset in minutes
    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    /// Returns offset relative to the reference zone in minutes
    pub fn system_time_offset_minutes(&self) -> i32 {
        self.system_time_offset_minutes
    }

    /// Returns computed local date time
    pub fn local_time(&self) -> &DateTime {
        &self.local_time
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ZoneSnapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ZoneSnapshot", 10)?;
        state.serialize_field("baseTime", &self.base_time)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("fullName", &self.full_name)?;
        state.serialize_field("standardName", &self.standard_name)?;
        state.serialize_field("daylightName", &self.daylight_name)?;
        state.serialize_field("supportsDst", &self.supports_dst)?;
        state.serialize_field("isDst", &self.is_dst)?;
        state.serialize_field("utcOffsetMinutes", &self.utc_offset_minutes)?;
        state.serialize_field("systemTimeOffsetMinutes", &self.system_time_offset_minutes)?;
        state.serialize_field("localTime", &self.local_time)?;
        state.end()
    }
}

/// Compute the snapshot of a zone at a UTC instant.
///
/// DST status and the displayed name are evaluated at `base_time`, while the daylight delta applied to the
/// offset is taken from the rule active at `base_time` shifted by the base offset of the zone and read as UTC.
/// Near transitions the two can disagree.
///
/// The system time offset is measured against the offset of `reference` at `base_time`.
///
pub fn compute_zone_snapshot(zone: &ZoneDefinition, base_time: &UtcDateTime, consider_dst: bool, reference: &TimeZone) -> crate::Result<ZoneSnapshot> {
    let utc_now = base_time.unix_time();

    let is_dst = consider_dst && zone.is_daylight_saving_time(utc_now)?;
    let name = if is_dst { zone.daylight_name() } else { zone.standard_name() };

    let base_utc_offset = i64::from(zone.base_utc_offset());
    let local = utc_now.checked_add(base_utc_offset).ok_or(TzError::OutOfRange)?;

    let mut offset = base_utc_offset;
    if consider_dst && zone.supports_dst() && zone.is_daylight_saving_time(local)? {
        if let Some(rule) = zone.find_adjustment_rule(local) {
            offset += i64::from(rule.daylight_delta());
        }
    }

    let reference_offset = i64::from(reference.find_local_time_type(utc_now)?.ut_offset());

    let utc_offset_minutes = seconds_to_minutes(offset)?;
    let system_time_offset_minutes = seconds_to_minutes(offset - reference_offset)?;

    let ut_offset = i32::try_from(offset).map_err(|_| TzError::OutOfRange)?;
    let local_time = DateTime::new(utc_now, LocalTimeType::new(ut_offset, is_dst, None)?)?;

    Ok(ZoneSnapshot {
        base_time: *base_time,
        name: name.to_owned(),
        full_name: zone.display_name().to_owned(),
        standard_name: zone.standard_name().to_owned(),
        daylight_name: zone.daylight_name().to_owned(),
        supports_dst: zone.supports_dst(),
        is_dst,
        utc_offset_minutes,
        system_time_offset_minutes,
        local_time,
    })
}

/// Convert seconds to minutes, rounding half to even
fn seconds_to_minutes(seconds: i64) -> Result<i32, TzError> {
    let quotient = seconds.div_euclid(SECONDS_PER_MINUTE);
    let remainder = seconds.rem_euclid(SECONDS_PER_MINUTE);

    let half = SECONDS_PER_MINUTE / 2;
    let minutes = if remainder > half || (remainder == half && quotient % 2 != 0) { quotient + 1 } else { quotient };

    i32::try_from(minutes).map_err(|_| TzError::OutOfRange)
}

/// Resolver answering zone queries from a zone database.
///
/// No state is kept between calls: the database is read on every query.
///
#[derive(Debug, Clone)]
pub struct TimezoneResolver<D: ZoneDatabase = SystemZoneDatabase> {
    /// Source of zone definitions
    database: D,
    /// Zone against which system time offsets are measured
    reference: TimeZone,
}

impl TimezoneResolver {
    /// Construct a resolver over the system zone database, measuring system time offsets against the local time zone.
    ///
    /// The UTC time zone is used as reference if the local time zone cannot be read.
    ///
    pub fn system() -> Self {
        let reference = match TimeZone::local() {
            Ok(reference) => reference,
            Err(_err) => {
                warn!("failed to read local time zone, falling back to UTC: {_err}");
                TimeZone::utc()
            }
        };

        Self::new(SystemZoneDatabase::from_env(), reference)
    }
}

impl<D: ZoneDatabase> TimezoneResolver<D> {
    /// Construct a resolver
    pub fn new(database: D, reference: TimeZone) -> Self {
        Self { database, reference }
    }

    /// Returns zone database
    pub fn database(&self) -> &D {
        &self.database
    }

    /// Returns zone against which system time offsets are measured
    pub fn reference(&self) -> &TimeZone {
        &self.reference
    }

    /// Compute the snapshot of every zone in the database, in enumeration order.
    ///
    /// The current time is used when `base_time` is `None`.
    ///
    pub fn list_all(&self, base_time: Option<UtcDateTime>, config: ResolverConfig) -> crate::Result<Vec<ZoneSnapshot>> {
        let base_time = resolve_base_time(base_time)?;

        self.database.zones()?.iter().map(|zone| compute_zone_snapshot(zone, &base_time, config.consider_dst, &self.reference)).collect()
    }

    /// Compute the snapshot of the first zone whose standard or daylight name matches `name`, ignoring ASCII case.
    ///
    /// An empty name is rejected before the database is read. Returns `Ok(None)` when no zone matches.
    /// The current time is used when `base_time` is `None`.
    ///
    pub fn find_by_name(&self, name: &str, base_time: Option<UtcDateTime>, config: ResolverConfig) -> crate::Result<Option<ZoneSnapshot>> {
        if name.is_empty() {
            return Err(ValidationError::EmptyZoneName.into());
        }

        let base_time = resolve_base_time(base_time)?;

        let zones = self.database.zones()?;
        let Some(zone) = zones.iter().find(|zone| zone.standard_name().eq_ignore_ascii_case(name) || zone.daylight_name().eq_ignore_ascii_case(name)) else {
            debug!("no zone named {name:?} among {} zones", zones.len());
            return Ok(None);
        };

        compute_zone_snapshot(zone, &base_time, config.consider_dst, &self.reference).map(Some)
    }
}

/// Returns the provided base time, or the current time
fn resolve_base_time(base_time: Option<UtcDateTime>) -> Result<UtcDateTime, TzError> {
    match base_time {
        Some(base_time) => Ok(base_time),
        None => UtcDateTime::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::zone::ZoneDatabaseError;
    use crate::error::Error;
    use crate::zone::tests::{apia, JANUARY, JULY, PST8PDT};
    use crate::zone::AdjustmentRule;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Zone at UTC-8 without adjustment rules
    fn minus_eight() -> crate::Result<ZoneDefinition> {
        Ok(ZoneDefinition::new("Test/Minus8", "TST", "TDT", -28800, Vec::new())?)
    }

    /// Zone at UTC-8 with a one hour daylight delta from May to September 2024
    fn minus_eight_summer() -> crate::Result<ZoneDefinition> {
        let date_start = UtcDateTime::new(2024, 4, 1, 0, 0, 0)?.unix_time();
        let date_end = UtcDateTime::new(2024, 9, 1, 0, 0, 0)?.unix_time();
        let rule = AdjustmentRule::new(date_start, date_end, 3600, None)?;

        Ok(ZoneDefinition::new("Test/Summer", "SST", "SDT", -28800, vec![rule])?)
    }

    #[test]
    fn test_zone_without_dst() -> crate::Result<()> {
        let base_time = UtcDateTime::new(2024, 0, 15, 12, 0, 0)?;
        let snapshot = compute_zone_snapshot(&minus_eight()?, &base_time, true, &TimeZone::utc())?;

        assert_eq!(snapshot.base_time(), &base_time);
        assert_eq!(snapshot.name(), "TST");
        assert_eq!(snapshot.full_name(), "(UTC-08:00) Test/Minus8");
        assert_eq!(snapshot.standard_name(), "TST");
        assert_eq!(snapshot.daylight_name(), "TDT");
        assert!(!snapshot.supports_dst());
        assert!(!snapshot.is_dst());
        assert_eq!(snapshot.utc_offset_minutes(), -480);
        assert_eq!(snapshot.system_time_offset_minutes(), -480);
        assert_eq!(snapshot.local_time().to_string(), "2024-01-15T04:00:00-08:00");

        let snapshot = compute_zone_snapshot(&minus_eight()?, &UtcDateTime::from_unix_time(JULY)?, true, &TimeZone::utc())?;
        assert!(!snapshot.is_dst());
        assert_eq!(snapshot.utc_offset_minutes(), -480);

        Ok(())
    }

    #[test]
    fn test_zone_with_dst() -> crate::Result<()> {
        let zone = minus_eight_summer()?;

        let base_time = UtcDateTime::new(2024, 6, 1, 12, 0, 0)?;
        let snapshot = compute_zone_snapshot(&zone, &base_time, true, &TimeZone::utc())?;

        assert_eq!(snapshot.name(), "SDT");
        assert!(snapshot.supports_dst());
        assert!(snapshot.is_dst());
        assert_eq!(snapshot.utc_offset_minutes(), -420);
        assert_eq!(snapshot.local_time().to_string(), "2024-07-01T05:00:00-07:00");
        assert!(snapshot.local_time().local_time_type().is_dst());

        let outside = compute_zone_snapshot(&zone, &UtcDateTime::new(2024, 0, 15, 12, 0, 0)?, true, &TimeZone::utc())?;
        assert_eq!(outside.name(), "SST");
        assert!(outside.supports_dst());
        assert!(!outside.is_dst());
        assert_eq!(outside.utc_offset_minutes(), -480);

        Ok(())
    }

    #[test]
    fn test_ignore_dst() -> crate::Result<()> {
        let base_time = UtcDateTime::new(2024, 6, 1, 12, 0, 0)?;
        let snapshot = compute_zone_snapshot(&minus_eight_summer()?, &base_time, false, &TimeZone::utc())?;

        assert_eq!(snapshot.name(), "SST");
        assert!(snapshot.supports_dst());
        assert!(!snapshot.is_dst());
        assert_eq!(snapshot.utc_offset_minutes(), -480);
        assert_eq!(snapshot.local_time().to_string(), "2024-07-01T04:00:00-08:00");

        Ok(())
    }

    #[test]
    fn test_offset_evaluated_at_shifted_instant() -> crate::Result<()> {
        // In the rule at 04:00 UTC, but not yet at 20:00 the previous day once shifted
        let base_time = UtcDateTime::new(2024, 4, 1, 4, 0, 0)?;
        let snapshot = compute_zone_snapshot(&minus_eight_summer()?, &base_time, true, &TimeZone::utc())?;

        assert!(snapshot.is_dst());
        assert_eq!(snapshot.name(), "SDT");
        assert_eq!(snapshot.utc_offset_minutes(), -480);
        assert_eq!(snapshot.local_time().to_string(), "2024-04-30T20:00:00-08:00");

        Ok(())
    }

    #[test]
    fn test_recurring_rule() -> crate::Result<()> {
        let zone = ZoneDefinition::from_time_zone("PST8PDT", &TimeZone::from_tz_data(PST8PDT)?)?;

        let winter = compute_zone_snapshot(&zone, &UtcDateTime::from_unix_time(JANUARY)?, true, &TimeZone::utc())?;
        assert_eq!(winter.name(), "PST");
        assert!(!winter.is_dst());
        assert_eq!(winter.utc_offset_minutes(), -480);

        let summer = compute_zone_snapshot(&zone, &UtcDateTime::from_unix_time(JULY)?, true, &TimeZone::utc())?;
        assert_eq!(summer.name(), "PDT");
        assert!(summer.is_dst());
        assert_eq!(summer.utc_offset_minutes(), -420);
        assert_eq!(summer.local_time().to_string(), "2024-07-01T05:00:00-07:00");

        Ok(())
    }

    #[test]
    fn test_base_offset_change_across_dst() -> crate::Result<()> {
        let zone = ZoneDefinition::from_time_zone("Pacific/Apia", &apia()?)?;

        // 2012-01-15T00:00:00Z
        let snapshot = compute_zone_snapshot(&zone, &UtcDateTime::from_unix_time(1326585600)?, true, &TimeZone::utc())?;
        assert_eq!(snapshot.name(), "+14");
        assert!(snapshot.is_dst());
        assert_eq!(snapshot.utc_offset_minutes(), 840);
        assert_eq!(snapshot.local_time().to_string(), "2012-01-15T14:00:00+14:00");

        let resolver = TimezoneResolver::new(vec![zone], TimeZone::utc());
        assert_eq!(resolver.list_all(None, ResolverConfig::default())?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_system_time_offset() -> crate::Result<()> {
        let reference = TimeZone::from_posix_tz("PST8PDT,M3.2.0,M11.1.0")?;

        let summer = compute_zone_snapshot(&minus_eight()?, &UtcDateTime::from_unix_time(JULY)?, true, &reference)?;
        assert_eq!(summer.system_time_offset_minutes(), -60);

        let winter = compute_zone_snapshot(&minus_eight()?, &UtcDateTime::from_unix_time(JANUARY)?, true, &reference)?;
        assert_eq!(winter.system_time_offset_minutes(), 0);

        let kolkata = ZoneDefinition::new("Asia/Kolkata", "IST", "IST", 19800, Vec::new())?;
        let snapshot = compute_zone_snapshot(&kolkata, &UtcDateTime::from_unix_time(JULY)?, true, &TimeZone::fixed(3600)?)?;
        assert_eq!(snapshot.utc_offset_minutes(), 330);
        assert_eq!(snapshot.system_time_offset_minutes(), 270);
        assert_eq!(snapshot.local_time().to_string(), "2024-07-01T17:30:00+05:30");

        Ok(())
    }

    #[test]
    fn test_seconds_to_minutes() -> Result<(), TzError> {
        assert_eq!(seconds_to_minutes(0)?, 0);
        assert_eq!(seconds_to_minutes(30)?, 0);
        assert_eq!(seconds_to_minutes(31)?, 1);
        assert_eq!(seconds_to_minutes(90)?, 2);
        assert_eq!(seconds_to_minutes(150)?, 2);
        assert_eq!(seconds_to_minutes(-90)?, -2);
        assert_eq!(seconds_to_minutes(-150)?, -2);
        assert_eq!(seconds_to_minutes(-37886)?, -631);
        assert!(matches!(seconds_to_minutes(i64::MAX), Err(TzError::OutOfRange)));

        Ok(())
    }

    #[test]
    fn test_list_all() -> crate::Result<()> {
        let zones = vec![minus_eight()?, minus_eight_summer()?, ZoneDefinition::from_time_zone("PST8PDT", &TimeZone::from_tz_data(PST8PDT)?)?];
        let resolver = TimezoneResolver::new(zones.clone(), TimeZone::utc());

        let base_time = UtcDateTime::from_unix_time(JULY)?;
        for config in [ResolverConfig::default(), ResolverConfig { consider_dst: false }] {
            let snapshots = resolver.list_all(Some(base_time), config)?;

            let expected = zones.iter().map(|zone| compute_zone_snapshot(zone, &base_time, config.consider_dst, &TimeZone::utc())).collect::<crate::Result<Vec<_>>>()?;
            assert_eq!(snapshots, expected);
        }

        let snapshots = resolver.list_all(None, ResolverConfig::default())?;
        assert_eq!(snapshots.len(), zones.len());

        Ok(())
    }

    #[test]
    fn test_find_by_name() -> crate::Result<()> {
        init_logger();

        let duplicate = ZoneDefinition::new("Test/Duplicate", "TST", "TST", 3600, Vec::new())?;
        let zones = vec![minus_eight_summer()?, minus_eight()?, duplicate];
        let resolver = TimezoneResolver::new(zones, TimeZone::utc());

        let base_time = UtcDateTime::from_unix_time(JULY)?;
        let config = ResolverConfig::default();

        let snapshot = resolver.find_by_name("tst", Some(base_time), config)?;
        assert_eq!(snapshot.as_ref().map(ZoneSnapshot::full_name), Some("(UTC-08:00) Test/Minus8"));

        let snapshot = resolver.find_by_name("sDt", Some(base_time), config)?;
        assert_eq!(snapshot.as_ref().map(ZoneSnapshot::utc_offset_minutes), Some(-420));

        assert_eq!(resolver.find_by_name("Test/Minus8", Some(base_time), config)?, None);
        assert_eq!(resolver.find_by_name("NoSuchZone", Some(base_time), config)?, None);

        Ok(())
    }

    #[test]
    fn test_empty_name() {
        let resolver = TimezoneResolver::new(SystemZoneDatabase::from_dir("/nonexistent/zoneinfo"), TimeZone::utc());

        let result = resolver.find_by_name("", None, ResolverConfig::default());
        assert!(matches!(result, Err(Error::Validation(ValidationError::EmptyZoneName))));

        let result = resolver.find_by_name("UTC", None, ResolverConfig::default());
        assert!(matches!(result, Err(Error::ZoneDatabase(ZoneDatabaseError::NotFound(_)))));
    }

    #[test]
    fn test_system_resolver() {
        init_logger();

        let resolver = TimezoneResolver::system();
        assert_eq!(resolver.database(), &SystemZoneDatabase::from_env());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<ZoneSnapshot>();
        assert_send_sync::<ZoneDefinition>();
        assert_send_sync::<TimezoneResolver>();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = compute_zone_snapshot(&minus_eight_summer()?, &UtcDateTime::from_unix_time(JULY)?, true, &TimeZone::utc())?;

        let value = serde_json::to_value(&snapshot)?;
        let expected = serde_json::json!({
            "baseTime": "2024-07-01T12:00:00Z",
            "name": "SDT",
            "fullName": "(UTC-08:00) Test/Summer",
            "standardName": "SST",
            "daylightName": "SDT",
            "supportsDst": true,
            "isDst": true,
            "utcOffsetMinutes": -420,
            "systemTimeOffsetMinutes": -420,
            "localTime": "2024-07-01T05:00:00-07:00",
        });

        assert_eq!(value, expected);

        Ok(())
    }
}
