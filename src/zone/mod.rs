//! Zone definitions: a named time zone's base offset plus its daylight saving adjustment rules.

mod database;

pub use database::{SystemZoneDatabase, ZoneDatabase};

use crate::constants::{MINUTES_PER_HOUR, SECONDS_PER_DAY, SECONDS_PER_MINUTE};
use crate::error::zone::AdjustmentRuleError;
use crate::error::TzError;
use crate::timezone::{AlternateTime, LocalTimeType, TimeZone, TransitionRule};

use std::fmt;

/// Date range over which a fixed daylight delta applies to the base offset of a zone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AdjustmentRule {
    /// Start of the effective range, as a UTC Unix time in seconds (inclusive)
    date_start: i64,
    /// End of the effective range, as a UTC Unix time in seconds (exclusive)
    date_end: i64,
    /// Offset added to the base offset while the rule is active, in seconds
    daylight_delta: i32,
    /// Yearly start and end of daylight saving time inside the range, if the rule recurs
    recurrence: Option<AlternateTime>,
}

impl AdjustmentRule {
    /// Construct an adjustment rule over `[date_start, date_end)`.
    ///
    /// Without a recurrence, daylight saving time is in effect over the whole range.
    ///
    pub fn new(date_start: i64, date_end: i64, daylight_delta: i32, recurrence: Option<AlternateTime>) -> Result<Self, AdjustmentRuleError> {
        if date_start >= date_end {
            return Err(AdjustmentRuleError::EmptyRange);
        }

        if (daylight_delta as i64).abs() >= SECONDS_PER_DAY {
            return Err(AdjustmentRuleError::InvalidDaylightDelta);
        }

        Ok(Self { date_start, date_end, daylight_delta, recurrence })
    }

    /// Returns start of the effective range, as a UTC Unix time in seconds (inclusive)
    pub fn date_start(&self) -> i64 {
        self.date_start
    }

    /// Returns end of the effective range, as a UTC Unix time in seconds (exclusive)
    pub fn date_end(&self) -> i64 {
        self.date_end
    }

    /// Returns daylight delta in seconds
    pub fn daylight_delta(&self) -> i32 {
        self.daylight_delta
    }

    /// Returns yearly recurrence
    pub fn recurrence(&self) -> Option<&AlternateTime> {
        self.recurrence.as_ref()
    }

    /// Check if the effective range contains the specified Unix time in seconds
    pub fn contains(&self, unix_time: i64) -> bool {
        self.date_start <= unix_time && unix_time < self.date_end
    }

    /// Check if daylight saving time is in effect under this rule at the specified Unix time in seconds
    pub fn is_active(&self, unix_time: i64) -> Result<bool, TzError> {
        if !self.contains(unix_time) {
            return Ok(false);
        }

        match &self.recurrence {
            None => Ok(true),
            Some(recurrence) => recurrence.is_dst_active(unix_time),
        }
    }
}

/// Named time zone with its base UTC offset and adjustment rules
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ZoneDefinition {
    /// Zone identifier
    id: String,
    /// Name while in standard time
    standard_name: String,
    /// Name while in daylight saving time
    daylight_name: String,
    /// Long descriptive name
    display_name: String,
    /// Offset from UTC in standard time, in seconds
    base_utc_offset: i32,
    /// Adjustment rules, sorted by start date and non-overlapping
    adjustment_rules: Vec<AdjustmentRule>,
}

impl ZoneDefinition {
    /// Construct a zone definition.
    ///
    /// The display name defaults to `"(UTC±hh:mm) id"`. Rules must be sorted by start date and must not overlap.
    ///
    pub fn new(
        id: impl Into<String>,
        standard_name: impl Into<String>,
        daylight_name: impl Into<String>,
        base_utc_offset: i32,
        adjustment_rules: Vec<AdjustmentRule>,
    ) -> Result<Self, AdjustmentRuleError> {
        if !adjustment_rules.windows(2).all(|x| x[0].date_end <= x[1].date_start) {
            return Err(AdjustmentRuleError::OverlappingRules);
        }

        let id = id.into();
        let display_name = format!("({}) {}", UtcOffset(base_utc_offset), id);

        Ok(Self { id, standard_name: standard_name.into(), daylight_name: daylight_name.into(), display_name, base_utc_offset, adjustment_rules })
    }

    /// Replace the display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Derive a zone definition from time zone data.
    ///
    /// Each historical daylight saving period between two transitions becomes one adjustment rule.
    /// Its delta is taken against the closest of the neighboring standard times.
    /// A recurring extra rule becomes one open-ended adjustment rule starting at the last transition.
    ///
    /// Periods whose delta cannot be expressed as an adjustment rule are skipped.
    ///
    pub fn from_time_zone(id: impl Into<String>, time_zone: &TimeZone) -> Result<Self, TzError> {
        let id = id.into();

        let first_local_time_type = time_zone.local_time_types().first().ok_or(TzError::NoAvailableLocalTimeType)?;
        let extra_standard = match time_zone.extra_rule() {
            Some(TransitionRule::Fixed(local_time_type)) if !local_time_type.is_dst() => Some(local_time_type),
            Some(TransitionRule::Alternate(alternate_time)) => Some(alternate_time.std()),
            Some(TransitionRule::Fixed(_)) | None => None,
        };

        let mut standard = first_local_time_type;
        let mut daylight = None;
        let mut adjustment_rules = Vec::new();

        let transitions: Vec<_> = time_zone.transitions().collect();
        for (index, &(unix_time, local_time_type)) in transitions.iter().enumerate() {
            if !local_time_type.is_dst() {
                standard = local_time_type;
                continue;
            }

            daylight = Some(local_time_type);

            let date_end = match transitions.get(index + 1) {
                Some(&(next_unix_time, _)) => next_unix_time,
                None if matches!(time_zone.extra_rule(), Some(TransitionRule::Alternate(_))) => continue,
                None => i64::MAX,
            };

            let next_standard = transitions[index + 1..].iter().map(|&(_, x)| x).find(|x| !x.is_dst()).or(extra_standard);
            let daylight_delta = [Some(standard), next_standard]
                .into_iter()
                .flatten()
                .map(|standard| local_time_type.ut_offset() as i64 - standard.ut_offset() as i64)
                .min_by_key(|delta| delta.abs())
                .unwrap_or_default();

            let rule = i32::try_from(daylight_delta)
                .map_err(|_| AdjustmentRuleError::InvalidDaylightDelta)
                .and_then(|daylight_delta| AdjustmentRule::new(unix_time, date_end, daylight_delta, None));

            match rule {
                Ok(rule) => adjustment_rules.push(rule),
                Err(_err) => {
                    debug!("skipping daylight saving period of {id} starting at {unix_time}: {_err}");
                }
            }
        }

        if let Some(local_time_type) = extra_standard {
            standard = local_time_type;
        }

        if let Some(TransitionRule::Alternate(alternate_time)) = time_zone.extra_rule() {
            daylight = Some(alternate_time.dst());

            let date_start = time_zone.last_transition_time().unwrap_or(i64::MIN);
            let daylight_delta = alternate_time.dst().ut_offset() as i64 - alternate_time.std().ut_offset() as i64;

            let rule = i32::try_from(daylight_delta)
                .map_err(|_| AdjustmentRuleError::InvalidDaylightDelta)
                .and_then(|daylight_delta| AdjustmentRule::new(date_start, i64::MAX, daylight_delta, Some(alternate_time.clone())));

            match rule {
                Ok(rule) => adjustment_rules.push(rule),
                Err(_err) => {
                    debug!("skipping recurring rule of {id}: {_err}");
                }
            }
        }

        let standard_name = designation_or(standard, &id);
        let daylight_name = daylight.map_or_else(|| standard_name.clone(), |daylight| designation_or(daylight, &standard_name));

        Ok(Self::new(id, standard_name, daylight_name, standard.ut_offset(), adjustment_rules)?)
    }

    /// Returns zone identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns name while in standard time
    pub fn standard_name(&self) -> &str {
        &self.standard_name
    }

    /// Returns name while in daylight saving time
    pub fn daylight_name(&self) -> &str {
        &self.daylight_name
    }

    /// Returns long descriptive name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns offset from UTC in standard time, in seconds
    pub fn base_utc_offset(&self) -> i32 {
        self.base_utc_offset
    }

    /// Returns adjustment rules
    pub fn adjustment_rules(&self) -> &[AdjustmentRule] {
        &self.adjustment_rules
    }

    /// Check if the zone observes daylight saving time in at least one adjustment rule
    pub fn supports_dst(&self) -> bool {
        !self.adjustment_rules.is_empty()
    }

    /// Find the first adjustment rule whose effective range contains the specified Unix time in seconds
    pub fn find_adjustment_rule(&self, unix_time: i64) -> Option<&AdjustmentRule> {
        let index = self.adjustment_rules.partition_point(|x| x.date_start <= unix_time);
        let rule = self.adjustment_rules[..index].last()?;
        rule.contains(unix_time).then_some(rule)
    }

    /// Check if daylight saving time is in effect at the specified Unix time in seconds
    pub fn is_daylight_saving_time(&self, unix_time: i64) -> Result<bool, TzError> {
        match self.find_adjustment_rule(unix_time) {
            Some(rule) => rule.is_active(unix_time),
            None => Ok(false),
        }
    }
}

/// Designation of a local time type, or a fallback name when it has none
fn designation_or(local_time_type: &LocalTimeType, fallback: &str) -> String {
    match local_time_type.time_zone_designation() {
        "" => fallback.to_owned(),
        designation => designation.to_owned(),
    }
}

/// UTC offset in seconds, formatted as `UTC±hh:mm`
struct UtcOffset(i32);

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let minutes = self.0.unsigned_abs() as i64 / SECONDS_PER_MINUTE;
        write!(f, "UTC{}{:02}:{:02}", sign, minutes / MINUTES_PER_HOUR, minutes % MINUTES_PER_HOUR)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::datetime::UtcDateTime;
    use crate::timezone::{MonthWeekDay, RuleDay, Transition};

    /// TZif v2 file for Pacific/Honolulu
    pub(crate) const HONOLULU: &[u8] = b"TZif2\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\x06\0\0\0\x06\0\0\0\0\0\0\0\x07\0\0\0\x06\0\0\0\x14\x80\0\0\0\xbb\x05\x43\x48\xbb\x21\x71\x58\xcb\x89\x3d\xc8\xd2\x23\xf4\x70\xd2\x61\x49\x38\xd5\x8d\x73\x48\x01\x02\x01\x03\x04\x01\x05\xff\xff\x6c\x02\0\0\xff\xff\x6c\x58\0\x04\xff\xff\x7a\x68\x01\x08\xff\xff\x7a\x68\x01\x0c\xff\xff\x7a\x68\x01\x10\xff\xff\x73\x60\0\x04LMT\0HST\0HDT\0HWT\0HPT\0\0\0\0\0\x01\0\0\0\0\0\x01\0TZif2\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\x06\0\0\0\x06\0\0\0\0\0\0\0\x07\0\0\0\x06\0\0\0\x14\xff\xff\xff\xff\x74\xe0\x70\xbe\xff\xff\xff\xff\xbb\x05\x43\x48\xff\xff\xff\xff\xbb\x21\x71\x58\xff\xff\xff\xff\xcb\x89\x3d\xc8\xff\xff\xff\xff\xd2\x23\xf4\x70\xff\xff\xff\xff\xd2\x61\x49\x38\xff\xff\xff\xff\xd5\x8d\x73\x48\x01\x02\x01\x03\x04\x01\x05\xff\xff\x6c\x02\0\0\xff\xff\x6c\x58\0\x04\xff\xff\x7a\x68\x01\x08\xff\xff\x7a\x68\x01\x0c\xff\xff\x7a\x68\x01\x10\xff\xff\x73\x60\0\x04LMT\0HST\0HDT\0HWT\0HPT\0\0\0\0\0\x01\0\0\0\0\0\x01\0\x0aHST10\x0a";

    /// TZif v2 file with no transition and a `PST8PDT,M3.2.0,M11.1.0` footer
    pub(crate) const PST8PDT: &[u8] = b"TZif2\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\x01\0\0\0\x04\xff\xff\x8f\x80\0\0PST\0TZif2\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\x01\0\0\0\x04\xff\xff\x8f\x80\0\0PST\0\x0aPST8PDT,M3.2.0,M11.1.0\x0a";

    /// Samoa around 2011: UTC-11 with daylight saving time, then a jump over the date line to UTC+13 while in daylight saving time
    pub(crate) fn apia() -> Result<TimeZone, TzError> {
        TimeZone::new(
            vec![Transition::new(1316872800, 1), Transition::new(1325239200, 2), Transition::new(1333202400, 3)],
            vec![
                LocalTimeType::new(-39600, false, Some("-11"))?,
                LocalTimeType::new(-36000, true, Some("-10"))?,
                LocalTimeType::new(50400, true, Some("+14"))?,
                LocalTimeType::new(46800, false, Some("+13"))?,
            ],
            None,
        )
    }

    /// 2024-01-15T12:00:00Z
    pub(crate) const JANUARY: i64 = 1705320000;

    /// 2024-07-01T12:00:00Z
    pub(crate) const JULY: i64 = 1719835200;

    #[test]
    fn test_adjustment_rule() -> Result<(), TzError> {
        let rule = AdjustmentRule::new(100, 200, 3600, None)?;

        assert!(!rule.contains(99));
        assert!(rule.contains(100));
        assert!(rule.contains(199));
        assert!(!rule.contains(200));
        assert!(rule.is_active(150)?);
        assert!(!rule.is_active(200)?);

        assert_eq!(AdjustmentRule::new(200, 200, 3600, None), Err(AdjustmentRuleError::EmptyRange));
        assert_eq!(AdjustmentRule::new(100, 200, 86400, None), Err(AdjustmentRuleError::InvalidDaylightDelta));
        assert_eq!(AdjustmentRule::new(100, 200, -86400, None), Err(AdjustmentRuleError::InvalidDaylightDelta));

        Ok(())
    }

    #[test]
    fn test_recurring_adjustment_rule() -> Result<(), TzError> {
        let recurrence = AlternateTime::new(
            LocalTimeType::new(-28800, false, Some("PST"))?,
            LocalTimeType::new(-25200, true, Some("PDT"))?,
            RuleDay::MonthWeekDay(MonthWeekDay::new(3, 2, 0)?),
            7200,
            RuleDay::MonthWeekDay(MonthWeekDay::new(11, 1, 0)?),
            7200,
        )?;
        let rule = AdjustmentRule::new(i64::MIN, i64::MAX, 3600, Some(recurrence))?;

        assert!(!rule.is_active(JANUARY)?);
        assert!(rule.is_active(JULY)?);

        Ok(())
    }

    #[test]
    fn test_zone_definition() -> Result<(), TzError> {
        let may = UtcDateTime::new(2024, 4, 1, 0, 0, 0)?.unix_time();
        let october = UtcDateTime::new(2024, 9, 1, 0, 0, 0)?.unix_time();

        let zone = ZoneDefinition::new("Test/Pacific", "Pacific Standard Time", "Pacific Daylight Time", -28800, vec![
            AdjustmentRule::new(may, october, 3600, None)?,
        ])?;

        assert_eq!(zone.display_name(), "(UTC-08:00) Test/Pacific");
        assert!(zone.supports_dst());
        assert!(zone.is_daylight_saving_time(JULY)?);
        assert!(!zone.is_daylight_saving_time(JANUARY)?);
        assert!(!zone.is_daylight_saving_time(october)?);
        assert_eq!(zone.find_adjustment_rule(JULY).map(AdjustmentRule::daylight_delta), Some(3600));
        assert_eq!(zone.find_adjustment_rule(JANUARY), None);

        let zone = zone.with_display_name("(UTC-08:00) Pacific Time (US & Canada)");
        assert_eq!(zone.display_name(), "(UTC-08:00) Pacific Time (US & Canada)");

        let utc = ZoneDefinition::new("Etc/UTC", "UTC", "UTC", 0, Vec::new())?;
        assert_eq!(utc.display_name(), "(UTC+00:00) Etc/UTC");
        assert!(!utc.supports_dst());

        let india = ZoneDefinition::new("Asia/Kolkata", "IST", "IST", 19800, Vec::new())?;
        assert_eq!(india.display_name(), "(UTC+05:30) Asia/Kolkata");

        let overlapping = ZoneDefinition::new("Test/Overlap", "TST", "TDT", 0, vec![
            AdjustmentRule::new(0, 200, 3600, None)?,
            AdjustmentRule::new(100, 300, 3600, None)?,
        ]);
        assert_eq!(overlapping, Err(AdjustmentRuleError::OverlappingRules));

        let unsorted = ZoneDefinition::new("Test/Unsorted", "TST", "TDT", 0, vec![
            AdjustmentRule::new(300, 400, 3600, None)?,
            AdjustmentRule::new(0, 100, 3600, None)?,
        ]);
        assert_eq!(unsorted, Err(AdjustmentRuleError::OverlappingRules));

        Ok(())
    }

    #[test]
    fn test_from_time_zone_historical() -> Result<(), TzError> {
        let zone = ZoneDefinition::from_time_zone("Pacific/Honolulu", &TimeZone::from_tz_data(HONOLULU)?)?;

        assert_eq!(zone.id(), "Pacific/Honolulu");
        assert_eq!(zone.standard_name(), "HST");
        assert_eq!(zone.daylight_name(), "HPT");
        assert_eq!(zone.base_utc_offset(), -36000);
        assert_eq!(zone.display_name(), "(UTC-10:00) Pacific/Honolulu");
        assert!(zone.supports_dst());

        let rules: Vec<_> = zone.adjustment_rules().iter().map(|rule| (rule.date_start(), rule.date_end(), rule.daylight_delta())).collect();
        assert_eq!(rules, [(-1157283000, -1155436200, 3600), (-880198200, -769395600, 3600), (-769395600, -765376200, 3600)]);

        assert!(zone.is_daylight_saving_time(-1156939200)?);
        assert!(!zone.is_daylight_saving_time(JULY)?);

        Ok(())
    }

    #[test]
    fn test_from_time_zone_recurring() -> Result<(), TzError> {
        let zone = ZoneDefinition::from_time_zone("PST8PDT", &TimeZone::from_tz_data(PST8PDT)?)?;

        assert_eq!(zone.standard_name(), "PST");
        assert_eq!(zone.daylight_name(), "PDT");
        assert_eq!(zone.base_utc_offset(), -28800);
        assert_eq!(zone.adjustment_rules().len(), 1);
        assert_eq!(zone.adjustment_rules()[0].daylight_delta(), 3600);
        assert!(zone.adjustment_rules()[0].recurrence().is_some());

        assert!(!zone.is_daylight_saving_time(JANUARY)?);
        assert!(zone.is_daylight_saving_time(JULY)?);

        Ok(())
    }

    #[test]
    fn test_from_time_zone_fixed() -> Result<(), TzError> {
        let zone = ZoneDefinition::from_time_zone("Etc/GMT-14", &TimeZone::fixed(50400)?)?;

        assert_eq!(zone.standard_name(), "Etc/GMT-14");
        assert_eq!(zone.daylight_name(), "Etc/GMT-14");
        assert_eq!(zone.display_name(), "(UTC+14:00) Etc/GMT-14");
        assert!(!zone.supports_dst());

        let zone = ZoneDefinition::from_time_zone("EST", &TimeZone::from_posix_tz("EST5")?)?;
        assert_eq!((zone.standard_name(), zone.daylight_name(), zone.base_utc_offset()), ("EST", "EST", -18000));

        Ok(())
    }

    #[test]
    fn test_from_time_zone_base_offset_change() -> Result<(), TzError> {
        let zone = ZoneDefinition::from_time_zone("Pacific/Apia", &apia()?)?;

        assert_eq!(zone.base_utc_offset(), 46800);
        assert_eq!(zone.standard_name(), "+13");
        assert_eq!(zone.daylight_name(), "+14");

        let rules: Vec<_> = zone.adjustment_rules().iter().map(|rule| (rule.date_start(), rule.date_end(), rule.daylight_delta())).collect();
        assert_eq!(rules, [(1316872800, 1325239200, 3600), (1325239200, 1333202400, 3600)]);

        // 2012-01-15T00:00:00Z and 2012-06-01T00:00:00Z
        assert!(zone.is_daylight_saving_time(1326585600)?);
        assert!(!zone.is_daylight_saving_time(1338508800)?);

        Ok(())
    }

    #[test]
    fn test_from_time_zone_skips_unrepresentable_period() -> Result<(), TzError> {
        let time_zone = TimeZone::new(
            vec![Transition::new(0, 1), Transition::new(3600, 0)],
            vec![LocalTimeType::new(-50400, false, Some("AAA"))?, LocalTimeType::new(50400, true, Some("BBB"))?],
            None,
        )?;

        let zone = ZoneDefinition::from_time_zone("Test/Jump", &time_zone)?;
        assert_eq!(zone.base_utc_offset(), -50400);
        assert_eq!(zone.daylight_name(), "BBB");
        assert!(!zone.supports_dst());

        Ok(())
    }
}
