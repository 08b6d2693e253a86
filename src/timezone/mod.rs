//! Types related to a time zone.

use crate::constants::*;
use crate::datetime::{days_since_unix_epoch, is_leap_year, UtcDateTime};
use crate::error::timezone::{LocalTimeTypeError, TimeZoneError, TransitionRuleError};
use crate::error::TzError;
use crate::parse::{parse_posix_tz, parse_tz_file};

use std::sync::Arc;

/// Change of local time type at a Unix time in seconds
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Transition {
    unix_time: i64,
    /// Index of the local time type in effect from `unix_time`
    local_time_type_index: usize,
}

impl Transition {
    pub(crate) fn new(unix_time: i64, local_time_type_index: usize) -> Self {
        Self { unix_time, local_time_type_index }
    }
}

/// Local time type associated to a time zone
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LocalTimeType {
    /// Offset from UTC in seconds
    ut_offset: i32,
    /// Daylight Saving Time indicator
    is_dst: bool,
    /// Time zone designation
    time_zone_designation: Option<Arc<str>>,
}

impl LocalTimeType {
    /// Construct a local time type
    ///
    /// A designation must have between 3 and 7 characters in `[A-Za-z0-9+-]`.
    ///
    pub fn new(ut_offset: i32, is_dst: bool, time_zone_designation: Option<&str>) -> Result<Self, LocalTimeTypeError> {
        if ut_offset == i32::MIN {
            return Err(LocalTimeTypeError::InvalidUtcOffset);
        }

        if let Some(time_zone_designation) = time_zone_designation {
            let is_valid_char = |x: u8| x.is_ascii_alphanumeric() || x == b'+' || x == b'-';
            if !(3..=7).contains(&time_zone_designation.len()) || !time_zone_designation.bytes().all(is_valid_char) {
                return Err(LocalTimeTypeError::InvalidDesignation);
            }
        }

        Ok(Self { ut_offset, is_dst, time_zone_designation: time_zone_designation.map(Arc::from) })
    }

    /// Construct the local time type associated to UTC
    pub fn utc() -> Self {
        Self { ut_offset: 0, is_dst: false, time_zone_designation: None }
    }

    /// Returns offset from UTC in seconds
    pub fn ut_offset(&self) -> i32 {
        self.ut_offset
    }

    /// Returns daylight saving time indicator
    pub fn is_dst(&self) -> bool {
        self.is_dst
    }

    /// Returns time zone designation, or an empty string when the type has none
    pub fn time_zone_designation(&self) -> &str {
        self.time_zone_designation.as_deref().unwrap_or_default()
    }
}

/// Julian day in `[1, 365]`, without taking occasional Feb 29 into account, which is not referenceable
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Julian1WithoutLeap(u16);

impl Julian1WithoutLeap {
    /// Construct a transition rule day represented by a Julian day in `[1, 365]`
    pub fn new(julian_day_1: u16) -> Result<Self, TransitionRuleError> {
        if !(1..=365).contains(&julian_day_1) {
            return Err(TransitionRuleError::InvalidRuleDay);
        }

        Ok(Self(julian_day_1))
    }

    /// Returns inner value
    pub fn get(&self) -> u16 {
        self.0
    }

    /// Compute transition date
    ///
    /// ## Outputs
    ///
    /// * `month`: Month in `[0, 11]`
    /// * `month_day`: Day of the month in `[1, 31]`
    ///
    fn transition_date(&self) -> (usize, i64) {
        let year_day = self.0 as i64;

        let month = CUM_DAY_IN_MONTHS_NORMAL_YEAR[1..].partition_point(|&x| x < year_day);
        let month_day = year_day - CUM_DAY_IN_MONTHS_NORMAL_YEAR[month];

        (month, month_day)
    }
}

/// Zero-based Julian day in `[0, 365]`, taking occasional Feb 29 into account
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Julian0WithLeap(u16);

impl Julian0WithLeap {
    /// Construct a transition rule day represented by a zero-based Julian day in `[0, 365]`
    pub fn new(julian_day_0: u16) -> Result<Self, TransitionRuleError> {
        if julian_day_0 > 365 {
            return Err(TransitionRuleError::InvalidRuleDay);
        }

        Ok(Self(julian_day_0))
    }

    /// Returns inner value
    pub fn get(&self) -> u16 {
        self.0
    }

    /// Compute transition date.
    ///
    /// On a non-leap year, a value of `365` corresponds to December 32 (equivalent to January 1 of next year).
    ///
    /// ## Inputs
    ///
    /// * `year`: Years since 1900
    ///
    /// ## Outputs
    ///
    /// * `month`: Month in `[0, 11]`
    /// * `month_day`: Day of the month in `[1, 32]`
    ///
    fn transition_date(&self, year: i32) -> (usize, i64) {
        let leap = is_leap_year(year) as i64;

        let cum_day_in_months = [
            0,
            31,
            59 + leap,
            90 + leap,
            120 + leap,
            151 + leap,
            181 + leap,
            212 + leap,
            243 + leap,
            273 + leap,
            304 + leap,
            334 + leap,
        ];

        let year_day = self.0 as i64;

        let month = cum_day_in_months[1..].partition_point(|&x| x <= year_day);
        let month_day = 1 + year_day - cum_day_in_months[month];

        (month, month_day)
    }
}

/// Day represented by a month, a month week and a week day
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MonthWeekDay {
    /// Month in `[1, 12]`
    month: u8,
    /// Week of the month in `[1, 5]`, with `5` representing the last week of the month
    week: u8,
    /// Day of the week in `[0, 6]` from Sunday
    week_day: u8,
}

impl MonthWeekDay {
    /// Construct a transition rule day represented by a month, a month week and a week day
    pub fn new(month: u8, week: u8, week_day: u8) -> Result<Self, TransitionRuleError> {
        if !(1..=12).contains(&month) {
            return Err(TransitionRuleError::InvalidRuleDay);
        }

        if !(1..=5).contains(&week) {
            return Err(TransitionRuleError::InvalidRuleDay);
        }

        if week_day > 6 {
            return Err(TransitionRuleError::InvalidRuleDay);
        }

        Ok(Self { month, week, week_day })
    }

    /// Returns month in `[1, 12]`
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Returns week of the month in `[1, 5]`, with `5` representing the last week of the month
    pub fn week(&self) -> u8 {
        self.week
    }

    /// Returns day of the week in `[0, 6]` from Sunday
    pub fn week_day(&self) -> u8 {
        self.week_day
    }

    /// Compute transition date
    ///
    /// ## Inputs
    ///
    /// * `year`: Years since 1900
    ///
    /// ## Outputs
    ///
    /// * `month`: Month in `[0, 11]`
    /// * `month_day`: Day of the month in `[1, 31]`
    ///
    fn transition_date(&self, year: i32) -> (usize, i64) {
        let month = self.month as usize - 1;

        let mut day_in_month = DAY_IN_MONTHS_NORMAL_YEAR[month];
        if month == 1 && is_leap_year(year) {
            day_in_month += 1;
        }

        let week_day_of_first_month_day = (4 + days_since_unix_epoch(year, month, 1)).rem_euclid(DAYS_PER_WEEK);
        let first_week_day_occurence_in_month = 1 + (self.week_day as i64 - week_day_of_first_month_day).rem_euclid(DAYS_PER_WEEK);

        let mut month_day = first_week_day_occurence_in_month + (self.week as i64 - 1) * DAYS_PER_WEEK;
        if month_day > day_in_month {
            month_day -= DAYS_PER_WEEK
        }

        (month, month_day)
    }
}

/// Transition rule day
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RuleDay {
    /// Julian day in `[1, 365]`, without taking occasional Feb 29 into account, which is not referenceable
    Julian1WithoutLeap(Julian1WithoutLeap),
    /// Zero-based Julian day in `[0, 365]`, taking occasional Feb 29 into account
    Julian0WithLeap(Julian0WithLeap),
    /// Day represented by a month, a month week and a week day
    MonthWeekDay(MonthWeekDay),
}

impl RuleDay {
    /// Get the transition date for the provided year
    ///
    /// ## Inputs
    ///
    /// * `year`: Years since 1900
    ///
    /// ## Outputs
    ///
    /// * `month`: Month in `[0, 11]`
    /// * `month_day`: Day of the month in `[1, 32]`
    ///
    fn transition_date(&self, year: i32) -> (usize, i64) {
        match self {
            Self::Julian1WithoutLeap(rule_day) => rule_day.transition_date(),
            Self::Julian0WithLeap(rule_day) => rule_day.transition_date(year),
            Self::MonthWeekDay(rule_day) => rule_day.transition_date(year),
        }
    }

    /// Returns the UTC Unix time in seconds associated to the transition date for the provided year
    ///
    /// ## Inputs
    ///
    /// * `year`: Years since 1900
    /// * `day_time_in_utc`: UTC day time in seconds
    ///
    fn unix_time(&self, year: i32, day_time_in_utc: i64) -> i64 {
        let (month, month_day) = self.transition_date(year);
        days_since_unix_epoch(year, month, month_day) * SECONDS_PER_DAY + day_time_in_utc
    }
}

/// Transition rule representing alternate local time types
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AlternateTime {
    /// Local time type for standard time
    std: LocalTimeType,
    /// Local time type for Daylight Saving Time
    dst: LocalTimeType,
    /// Start day of Daylight Saving Time
    dst_start: RuleDay,
    /// Local start day time of Daylight Saving Time, in seconds
    dst_start_time: i32,
    /// End day of Daylight Saving Time
    dst_end: RuleDay,
    /// Local end day time of Daylight Saving Time, in seconds
    dst_end_time: i32,
}

impl AlternateTime {
    /// Construct a transition rule representing alternate local time types
    ///
    /// Start and end day times are local times, in seconds, and must be strictly within one week.
    ///
    pub fn new(
        std: LocalTimeType,
        dst: LocalTimeType,
        dst_start: RuleDay,
        dst_start_time: i32,
        dst_end: RuleDay,
        dst_end_time: i32,
    ) -> Result<Self, TransitionRuleError> {
        if !((dst_start_time as i64).abs() < SECONDS_PER_WEEK && (dst_end_time as i64).abs() < SECONDS_PER_WEEK) {
            return Err(TransitionRuleError::InvalidDstStartEndTime);
        }

        Ok(Self { std, dst, dst_start, dst_start_time, dst_end, dst_end_time })
    }

    /// Returns local time type for standard time
    pub fn std(&self) -> &LocalTimeType {
        &self.std
    }

    /// Returns local time type for Daylight Saving Time
    pub fn dst(&self) -> &LocalTimeType {
        &self.dst
    }

    /// Returns start day of Daylight Saving Time
    pub fn dst_start(&self) -> &RuleDay {
        &self.dst_start
    }

    /// Returns local start day time of Daylight Saving Time, in seconds
    pub fn dst_start_time(&self) -> i32 {
        self.dst_start_time
    }

    /// Returns end day of Daylight Saving Time
    pub fn dst_end(&self) -> &RuleDay {
        &self.dst_end
    }

    /// Returns local end day time of Daylight Saving Time, in seconds
    pub fn dst_end_time(&self) -> i32 {
        self.dst_end_time
    }

    /// Check if Daylight Saving Time is in effect at the specified Unix time in seconds
    pub fn is_dst_active(&self, unix_time: i64) -> Result<bool, TzError> {
        let dst_start_time_in_utc = self.dst_start_time as i64 - self.std.ut_offset as i64;
        let dst_end_time_in_utc = self.dst_end_time as i64 - self.dst.ut_offset as i64;

        let year = UtcDateTime::from_unix_time(unix_time)?.full_year() - 1900;

        // Rule times may fall outside of [0h, 24h], so a period may begin in the previous year or end in the next one
        let is_dst = (year - 1..=year + 1).any(|year| {
            let dst_start = self.dst_start.unix_time(year, dst_start_time_in_utc);
            let mut dst_end = self.dst_end.unix_time(year, dst_end_time_in_utc);

            // Southern hemisphere
            if dst_end < dst_start {
                dst_end = self.dst_end.unix_time(year + 1, dst_end_time_in_utc);
            }

            dst_start <= unix_time && unix_time < dst_end
        });

        Ok(is_dst)
    }

    /// Find the local time type associated to the alternate transition rule at the specified Unix time in seconds
    pub fn find_local_time_type(&self, unix_time: i64) -> Result<&LocalTimeType, TzError> {
        if self.is_dst_active(unix_time)? {
            Ok(&self.dst)
        } else {
            Ok(&self.std)
        }
    }
}

/// Transition rule
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TransitionRule {
    /// Fixed local time type
    Fixed(LocalTimeType),
    /// Alternate local time types
    Alternate(AlternateTime),
}

impl TransitionRule {
    /// Find the local time type associated to the transition rule at the specified Unix time in seconds
    pub fn find_local_time_type(&self, unix_time: i64) -> Result<&LocalTimeType, TzError> {
        match self {
            Self::Fixed(local_time_type) => Ok(local_time_type),
            Self::Alternate(alternate_time) => alternate_time.find_local_time_type(unix_time),
        }
    }
}

/// Time zone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TimeZone {
    /// Transitions, strictly increasing
    transitions: Vec<Transition>,
    /// Local time types, starting with the one in effect before the first transition
    local_time_types: Vec<LocalTimeType>,
    /// Extra transition rule applicable after the last transition
    extra_rule: Option<TransitionRule>,
}

impl TimeZone {
    /// Construct a time zone
    pub(crate) fn new(
        transitions: Vec<Transition>,
        local_time_types: Vec<LocalTimeType>,
        extra_rule: Option<TransitionRule>,
    ) -> Result<Self, TzError> {
        if local_time_types.is_empty() {
            return Err(TimeZoneError::NoLocalTimeType.into());
        }

        let local_time_types_size = local_time_types.len();
        if !transitions.iter().all(|x| x.local_time_type_index < local_time_types_size) {
            return Err(TimeZoneError::InvalidLocalTimeTypeIndex.into());
        }

        if !transitions.windows(2).all(|x| x[0].unix_time < x[1].unix_time) {
            return Err(TimeZoneError::UnsortedTransitions.into());
        }

        if let (Some(extra_rule), Some(last_transition)) = (&extra_rule, transitions.last()) {
            let last_local_time_type = &local_time_types[last_transition.local_time_type_index];
            if last_local_time_type != extra_rule.find_local_time_type(last_transition.unix_time)? {
                return Err(TimeZoneError::InconsistentExtraRule.into());
            }
        }

        Ok(Self { transitions, local_time_types, extra_rule })
    }

    /// Returns UTC time zone
    pub fn utc() -> Self {
        Self { transitions: Vec::new(), local_time_types: vec![LocalTimeType::utc()], extra_rule: None }
    }

    /// Returns time zone with fixed UTC offset in seconds
    pub fn fixed(ut_offset: i32) -> Result<Self, LocalTimeTypeError> {
        Ok(Self { transitions: Vec::new(), local_time_types: vec![LocalTimeType::new(ut_offset, false, None)?], extra_rule: None })
    }

    /// Returns local time zone, read from `/etc/localtime`.
    ///
    /// This method in not supported on non-UNIX platforms, and returns the UTC time zone instead.
    ///
    pub fn local() -> crate::Result<Self> {
        #[cfg(not(unix))]
        let local_time_zone = Self::utc();

        #[cfg(unix)]
        let local_time_zone = Self::from_tz_data(&std::fs::read("/etc/localtime")?)?;

        Ok(local_time_zone)
    }

    /// Construct a time zone from the contents of a TZif file, as described in [RFC 8536](https://datatracker.ietf.org/doc/html/rfc8536)
    pub fn from_tz_data(bytes: &[u8]) -> Result<Self, TzError> {
        parse_tz_file(bytes)
    }

    /// Construct a time zone from a POSIX TZ string describing a rule, as described in [the POSIX documentation of the `TZ` environment variable](https://pubs.opengroup.org/onlinepubs/9699919799/basedefs/V1_chap08.html).
    ///
    /// Surrounding ASCII whitespace is ignored. TZ string extensions are not allowed.
    ///
    pub fn from_posix_tz(tz_string: &str) -> Result<Self, TzError> {
        let tz_string = tz_string.trim_matches(|c: char| c.is_ascii_whitespace());

        let rule = parse_posix_tz(tz_string.as_bytes(), false)?;

        let local_time_types = match &rule {
            TransitionRule::Fixed(local_time_type) => vec![local_time_type.clone()],
            TransitionRule::Alternate(AlternateTime { std, dst, .. }) => vec![std.clone(), dst.clone()],
        };

        Self::new(Vec::new(), local_time_types, Some(rule))
    }

    /// Returns list of local time types, starting with the one in effect before the first transition
    pub fn local_time_types(&self) -> &[LocalTimeType] {
        &self.local_time_types
    }

    /// Returns extra transition rule applicable after the last transition
    pub fn extra_rule(&self) -> Option<&TransitionRule> {
        self.extra_rule.as_ref()
    }

    /// Iterate over transitions as Unix times in seconds, with the local time type in effect from each of them
    pub(crate) fn transitions(&self) -> impl Iterator<Item = (i64, &LocalTimeType)> + '_ {
        self.transitions.iter().map(|transition| (transition.unix_time, &self.local_time_types[transition.local_time_type_index]))
    }

    /// Returns Unix time in seconds of the last transition, if any
    pub(crate) fn last_transition_time(&self) -> Option<i64> {
        self.transitions.last().map(|transition| transition.unix_time)
    }

    /// Find the local time type in effect at the specified Unix time in seconds.
    ///
    /// After the last transition the extra rule applies, and without one no local time type is available.
    ///
    pub fn find_local_time_type(&self, unix_time: i64) -> Result<&LocalTimeType, TzError> {
        let index = self.transitions.partition_point(|x| x.unix_time <= unix_time);

        if index < self.transitions.len() {
            let local_time_type_index = match index.checked_sub(1) {
                Some(previous) => self.transitions[previous].local_time_type_index,
                None => 0,
            };
            return Ok(&self.local_time_types[local_time_type_index]);
        }

        match &self.extra_rule {
            Some(extra_rule) => extra_rule.find_local_time_type(unix_time),
            None if self.transitions.is_empty() => Ok(&self.local_time_types[0]),
            None => Err(TzError::NoAvailableLocalTimeType),
        }
    }
}
