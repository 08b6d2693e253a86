//! Types related to a date time.

use crate::constants::*;
use crate::error::datetime::DateTimeError;
use crate::error::TzError;
use crate::timezone::LocalTimeType;

use std::fmt;
use std::time::SystemTime;

/// UTC date time exprimed in the [proleptic gregorian calendar](https://en.wikipedia.org/wiki/Proleptic_Gregorian_calendar)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UtcDateTime {
    /// Years since 1900
    year: i32,
    /// Month in `[0, 11]`
    month: u8,
    /// Day of the month in `[1, 31]`
    month_day: u8,
    /// Hours since midnight in `[0, 23]`
    hour: u8,
    /// Minutes in `[0, 59]`
    minute: u8,
    /// Seconds in `[0, 60]`, with a possible leap second
    second: u8,
}

impl UtcDateTime {
    /// Construct a UTC date time
    ///
    /// ## Inputs
    ///
    /// * `full_year`: Year
    /// * `month`: Month in `[0, 11]`
    /// * `month_day`: Day of the month in `[1, 31]`
    /// * `hour`: Hours since midnight in `[0, 23]`
    /// * `minute`: Minutes in `[0, 59]`
    /// * `second`: Seconds in `[0, 60]`, with a possible leap second
    ///
    pub fn new(full_year: i32, month: u8, month_day: u8, hour: u8, minute: u8, second: u8) -> Result<Self, DateTimeError> {
        let year = full_year.checked_sub(1900).ok_or(DateTimeError::InvalidYear)?;

        if month > 11 {
            return Err(DateTimeError::InvalidMonth);
        }
        if !(1..=31).contains(&month_day) {
            return Err(DateTimeError::InvalidMonthDay);
        }
        if hour > 23 {
            return Err(DateTimeError::InvalidHour);
        }
        if minute > 59 {
            return Err(DateTimeError::InvalidMinute);
        }
        if second > 60 {
            return Err(DateTimeError::InvalidSecond);
        }

        let mut day_in_month = DAY_IN_MONTHS_NORMAL_YEAR[month as usize];
        if month == 1 && is_leap_year(year) {
            day_in_month += 1;
        }

        if month_day as i64 > day_in_month {
            return Err(DateTimeError::InvalidMonthDay);
        }

        Ok(Self { year, month, month_day, hour, minute, second })
    }

    /// Construct a UTC date time from a Unix time in seconds
    pub fn from_unix_time(unix_time: i64) -> Result<Self, TzError> {
        let seconds = unix_time.checked_sub(UNIX_OFFSET_SECS).ok_or(TzError::OutOfRange)?;

        let mut remaining_days = seconds.div_euclid(SECONDS_PER_DAY);
        let remaining_seconds = seconds.rem_euclid(SECONDS_PER_DAY);

        let cycles_400_years = remaining_days.div_euclid(DAYS_PER_400_YEARS);
        remaining_days = remaining_days.rem_euclid(DAYS_PER_400_YEARS);

        let cycles_100_years = (remaining_days / DAYS_PER_100_YEARS).min(3);
        remaining_days -= cycles_100_years * DAYS_PER_100_YEARS;

        let cycles_4_years = (remaining_days / DAYS_PER_4_YEARS).min(24);
        remaining_days -= cycles_4_years * DAYS_PER_4_YEARS;

        let remaining_years = (remaining_days / DAYS_PER_NORMAL_YEAR).min(3);
        remaining_days -= remaining_years * DAYS_PER_NORMAL_YEAR;

        let mut year = OFFSET_YEARS + remaining_years + cycles_4_years * 4 + cycles_100_years * 100 + cycles_400_years * 400;

        let mut month = 2;
        for days in DAY_IN_MONTHS_LEAP_YEAR_FROM_MARCH {
            if remaining_days < days {
                break;
            }
            remaining_days -= days;
            month += 1;
        }

        if month >= MONTHS_PER_YEAR {
            month -= MONTHS_PER_YEAR;
            year += 1;
        }

        // Leave room for the full year and for the neighbouring years evaluated by transition rules
        let year = i32::try_from(year).ok().filter(|year| year.checked_sub(1).is_some() && year.checked_add(1901).is_some()).ok_or(TzError::OutOfRange)?;

        Ok(Self {
            year,
            month: month as u8,
            month_day: (1 + remaining_days) as u8,
            hour: (remaining_seconds / SECONDS_PER_HOUR) as u8,
            minute: ((remaining_seconds / SECONDS_PER_MINUTE) % MINUTES_PER_HOUR) as u8,
            second: (remaining_seconds % SECONDS_PER_MINUTE) as u8,
        })
    }

    /// Returns the current UTC date time
    pub fn now() -> Result<Self, TzError> {
        Self::from_unix_time(current_unix_time())
    }

    /// Returns the Unix time in seconds associated to the UTC date time
    pub fn unix_time(&self) -> i64 {
        let mut result = days_since_unix_epoch(self.year, self.month.into(), self.month_day.into());
        result *= HOURS_PER_DAY;
        result += self.hour as i64;
        result *= MINUTES_PER_HOUR;
        result += self.minute as i64;
        result *= SECONDS_PER_MINUTE;
        result += self.second as i64;

        result
    }

    /// Returns year
    pub fn full_year(&self) -> i32 {
        self.year + 1900
    }

    /// Returns month in `[0, 11]`
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Returns day of the month in `[1, 31]`
    pub fn month_day(&self) -> u8 {
        self.month_day
    }

    /// Returns hours since midnight in `[0, 23]`
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Returns minutes in `[0, 59]`
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns seconds in `[0, 60]`, with a possible leap second
    pub fn second(&self) -> u8 {
        self.second
    }
}

impl fmt::Display for UtcDateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z", self.full_year(), self.month + 1, self.month_day, self.hour, self.minute, self.second)
    }
}

/// Wall clock date time at the UTC offset of a local time type
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DateTime {
    /// Wall clock fields, computed by shifting the UTC instant by the offset
    wall_clock: UtcDateTime,
    /// Local time type
    local_time_type: LocalTimeType,
    /// UTC Unix time in seconds
    unix_time: i64,
}

impl DateTime {
    /// Construct the wall clock date time of an UTC Unix time at the offset of a local time type
    pub fn new(unix_time: i64, local_time_type: LocalTimeType) -> Result<Self, TzError> {
        let shifted = unix_time.checked_add(local_time_type.ut_offset().into()).ok_or(TzError::OutOfRange)?;
        let wall_clock = UtcDateTime::from_unix_time(shifted)?;

        Ok(Self { wall_clock, local_time_type, unix_time })
    }

    /// Returns year
    pub fn full_year(&self) -> i32 {
        self.wall_clock.full_year()
    }

    /// Returns month in `[0, 11]`
    pub fn month(&self) -> u8 {
        self.wall_clock.month
    }

    /// Returns day of the month in `[1, 31]`
    pub fn month_day(&self) -> u8 {
        self.wall_clock.month_day
    }

    /// Returns hours since midnight in `[0, 23]`
    pub fn hour(&self) -> u8 {
        self.wall_clock.hour
    }

    /// Returns minutes in `[0, 59]`
    pub fn minute(&self) -> u8 {
        self.wall_clock.minute
    }

    /// Returns seconds in `[0, 60]`
    pub fn second(&self) -> u8 {
        self.wall_clock.second
    }

    /// Returns local time type
    pub fn local_time_type(&self) -> &LocalTimeType {
        &self.local_time_type
    }

    /// Returns UTC Unix time in seconds
    pub fn unix_time(&self) -> i64 {
        self.unix_time
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let wall_clock = &self.wall_clock;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            wall_clock.full_year(),
            wall_clock.month + 1,
            wall_clock.month_day,
            wall_clock.hour,
            wall_clock.minute,
            wall_clock.second
        )?;

        let ut_offset = self.local_time_type.ut_offset();
        let sign = if ut_offset < 0 { '-' } else { '+' };
        let ut_offset = ut_offset.unsigned_abs();
        write!(f, "{}{:02}:{:02}", sign, ut_offset / 3600, (ut_offset / 60) % 60)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UtcDateTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DateTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Returns the current Unix time in seconds, saturating before the epoch
fn current_unix_time() -> i64 {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => 0i64.saturating_add_unsigned(duration.as_secs()),
        Err(error) => 0i64.saturating_sub_unsigned(error.duration().as_secs()),
    }
}

/// Check if a year is a leap year.
///
/// ## Inputs
///
/// * `year`: Years since 1900
///
pub(crate) fn is_leap_year(year: i32) -> bool {
    let full_year = 1900 + year as i64;
    full_year % 400 == 0 || (full_year % 4 == 0 && full_year % 100 != 0)
}

/// Compute the number of days since Unix epoch (`1970-01-01T00:00:00Z`).
///
/// ## Inputs
///
/// * `year`: Years since 1900
/// * `month`: Month in `[0, 11]`
/// * `month_day`: Day of the month in `[1, 31]`
///
pub(crate) fn days_since_unix_epoch(year: i32, month: usize, month_day: i64) -> i64 {
    let is_leap_year = is_leap_year(year);

    let full_year = 1900 + year as i64;

    let mut result = (full_year - 1970) * DAYS_PER_NORMAL_YEAR;

    if full_year >= 1970 {
        result += (full_year - 1968) / 4;
        result -= (full_year - 1900) / 100;
        result += (full_year - 1600) / 400;

        if is_leap_year && month < 2 {
            result -= 1;
        }
    } else {
        result += (full_year - 1972) / 4;
        result -= (full_year - 2000) / 100;
        result += (full_year - 2000) / 400;

        if is_leap_year && month >= 2 {
            result += 1;
        }
    }

    result += CUM_DAY_IN_MONTHS_NORMAL_YEAR[month] + month_day - 1;

    result
}
