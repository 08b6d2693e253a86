//! Functions used for parsing a TZ string.

use crate::error::parse::TzStringError;
use crate::error::TzError;
use crate::parse::utils::{read_optional_tag, read_tag, read_until, read_while, Cursor};
use crate::timezone::{AlternateTime, Julian0WithLeap, Julian1WithoutLeap, LocalTimeType, MonthWeekDay, RuleDay, TransitionRule};

use std::num::ParseIntError;
use std::ops::RangeInclusive;
use std::str::{self, FromStr};

/// Default local time of a DST transition, in seconds
const DEFAULT_RULE_TIME: i32 = 2 * 3600;

/// Hour range of a transition time without TZ string extensions
const RULE_HOURS: RangeInclusive<i32> = 0..=24;

/// Hour range of a transition time with TZ string extensions
const RULE_HOURS_EXTENDED: RangeInclusive<i32> = -167..=167;

/// Hour range of a UTC offset
const OFFSET_HOURS: RangeInclusive<i32> = 0..=24;

/// Parse integer from a slice of bytes
fn parse_int<T: FromStr<Err = ParseIntError>>(bytes: &[u8]) -> Result<T, TzStringError> {
    Ok(str::from_utf8(bytes)?.parse()?)
}

/// Signed duration written as `[+|-]hh[:mm[:ss]]`
struct HhMmSs {
    /// Sign, `1` or `-1`
    sign: i32,
    /// Hours
    hour: i32,
    /// Minutes
    minute: i32,
    /// Seconds
    second: i32,
}

impl HhMmSs {
    /// Convert to seconds, failing with `error` if a field is out of range
    fn to_seconds(&self, hours: RangeInclusive<i32>, error: TzStringError) -> Result<i32, TzStringError> {
        if hours.contains(&self.hour) && (0..60).contains(&self.minute) && (0..60).contains(&self.second) {
            Ok(self.sign * (self.hour * 3600 + self.minute * 60 + self.second))
        } else {
            Err(error)
        }
    }
}

/// Parser over the bytes of a TZ string
struct TzStringParser<'a> {
    /// Remaining input
    cursor: Cursor<'a>,
    /// Allow RFC 8536 extensions for transition times
    use_string_extensions: bool,
}

impl<'a> TzStringParser<'a> {
    /// Parse time zone designation, quoted between `<` and `>` or made of ASCII letters
    fn time_zone_designation(&mut self) -> Result<&'a str, TzStringError> {
        let designation = if read_optional_tag(&mut self.cursor, b"<")? {
            let quoted = read_until(&mut self.cursor, |&x| x == b'>')?;
            read_tag(&mut self.cursor, b">")?;
            quoted
        } else {
            read_while(&mut self.cursor, u8::is_ascii_alphabetic)?
        };

        Ok(str::from_utf8(designation)?)
    }

    /// Read a decimal number
    fn number<T: FromStr<Err = ParseIntError>>(&mut self) -> Result<T, TzStringError> {
        parse_int(read_while(&mut self.cursor, u8::is_ascii_digit)?)
    }

    /// Parse `[+|-]hh[:mm[:ss]]`, the sign being accepted only if `signed` is true
    fn hhmmss(&mut self, signed: bool) -> Result<HhMmSs, TzStringError> {
        let mut sign = 1;
        if signed {
            if read_optional_tag(&mut self.cursor, b"-")? {
                sign = -1;
            } else {
                read_optional_tag(&mut self.cursor, b"+")?;
            }
        }

        let hour = self.number()?;

        let mut minute = 0;
        let mut second = 0;

        if read_optional_tag(&mut self.cursor, b":")? {
            minute = self.number()?;

            if read_optional_tag(&mut self.cursor, b":")? {
                second = self.number()?;
            }
        }

        Ok(HhMmSs { sign, hour, minute, second })
    }

    /// Parse time zone offset, positive west of Greenwich
    fn offset(&mut self) -> Result<i32, TzStringError> {
        self.hhmmss(true)?.to_seconds(OFFSET_HOURS, TzStringError::InvalidOffset)
    }

    /// Parse transition rule day
    fn rule_day(&mut self) -> Result<RuleDay, TzError> {
        if read_optional_tag(&mut self.cursor, b"J").map_err(TzStringError::from)? {
            return Ok(RuleDay::Julian1WithoutLeap(Julian1WithoutLeap::new(self.number()?)?));
        }

        if read_optional_tag(&mut self.cursor, b"M").map_err(TzStringError::from)? {
            let month = self.number()?;
            read_tag(&mut self.cursor, b".").map_err(TzStringError::from)?;
            let week = self.number()?;
            read_tag(&mut self.cursor, b".").map_err(TzStringError::from)?;
            let week_day = self.number()?;

            return Ok(RuleDay::MonthWeekDay(MonthWeekDay::new(month, week, week_day)?));
        }

        Ok(RuleDay::Julian0WithLeap(Julian0WithLeap::new(self.number()?)?))
    }

    /// Parse transition rule local time, defaulting to 02:00:00
    fn rule_time(&mut self) -> Result<i32, TzStringError> {
        if !read_optional_tag(&mut self.cursor, b"/")? {
            return Ok(DEFAULT_RULE_TIME);
        }

        if self.use_string_extensions {
            self.hhmmss(true)?.to_seconds(RULE_HOURS_EXTENDED, TzStringError::InvalidRuleTime)
        } else {
            self.hhmmss(false)?.to_seconds(RULE_HOURS, TzStringError::InvalidRuleTime)
        }
    }

    /// Parse `,date[/time]`
    fn rule_block(&mut self) -> Result<(RuleDay, i32), TzError> {
        read_tag(&mut self.cursor, b",").map_err(TzStringError::from)?;

        let date = self.rule_day()?;
        let time = self.rule_time()?;

        Ok((date, time))
    }
}

/// Parse a POSIX TZ string containing a time zone description, as described in [the POSIX documentation of the `TZ` environment variable](https://pubs.opengroup.org/onlinepubs/9699919799/basedefs/V1_chap08.html).
///
/// TZ string extensions from [RFC 8536](https://datatracker.ietf.org/doc/html/rfc8536#section-3.3.1) may be used.
///
pub(crate) fn parse_posix_tz(tz_string: &[u8], use_string_extensions: bool) -> Result<TransitionRule, TzError> {
    if tz_string.is_empty() {
        return Err(TzStringError::Empty.into());
    }

    let mut parser = TzStringParser { cursor: tz_string, use_string_extensions };

    let std_time_zone = parser.time_zone_designation()?;
    let std_offset = parser.offset()?;

    if parser.cursor.is_empty() {
        return Ok(TransitionRule::Fixed(LocalTimeType::new(-std_offset, false, Some(std_time_zone))?));
    }

    let dst_time_zone = parser.time_zone_designation()?;

    let dst_offset = match parser.cursor.first() {
        None => return Err(TzStringError::MissingDstStartEndRules.into()),
        Some(&b',') => std_offset - 3600,
        Some(_) => parser.offset()?,
    };

    if parser.cursor.is_empty() {
        return Err(TzStringError::MissingDstStartEndRules.into());
    }

    let (dst_start, dst_start_time) = parser.rule_block()?;
    let (dst_end, dst_end_time) = parser.rule_block()?;

    if !parser.cursor.is_empty() {
        return Err(TzStringError::RemainingData.into());
    }

    Ok(TransitionRule::Alternate(AlternateTime::new(
        LocalTimeType::new(-std_offset, false, Some(std_time_zone))?,
        LocalTimeType::new(-dst_offset, true, Some(dst_time_zone))?,
        dst_start,
        dst_start_time,
        dst_end,
        dst_end_time,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::timezone::{LocalTimeTypeError, TransitionRuleError};

    /// Alternate rule with the default 02:00 local transition times
    fn alternate(std: (i32, &str), dst: (i32, &str), dst_start: RuleDay, dst_end: RuleDay) -> Result<TransitionRule, TzError> {
        alternate_at(std, dst, (dst_start, 7200), (dst_end, 7200))
    }

    fn alternate_at(std: (i32, &str), dst: (i32, &str), dst_start: (RuleDay, i32), dst_end: (RuleDay, i32)) -> Result<TransitionRule, TzError> {
        Ok(TransitionRule::Alternate(AlternateTime::new(
            LocalTimeType::new(std.0, false, Some(std.1))?,
            LocalTimeType::new(dst.0, true, Some(dst.1))?,
            dst_start.0,
            dst_start.1,
            dst_end.0,
            dst_end.1,
        )?))
    }

    fn mwd(month: u8, week: u8, week_day: u8) -> Result<RuleDay, TzError> {
        Ok(RuleDay::MonthWeekDay(MonthWeekDay::new(month, week, week_day)?))
    }

    fn j1(day: u16) -> Result<RuleDay, TzError> {
        Ok(RuleDay::Julian1WithoutLeap(Julian1WithoutLeap::new(day)?))
    }

    #[test]
    fn test_fixed() -> Result<(), TzError> {
        assert_eq!(parse_posix_tz(b"HST10", false)?, TransitionRule::Fixed(LocalTimeType::new(-36000, false, Some("HST"))?));
        assert_eq!(parse_posix_tz(b"<+0330>-3:30", false)?, TransitionRule::Fixed(LocalTimeType::new(12600, false, Some("+0330"))?));

        Ok(())
    }

    #[test]
    fn test_alternate() -> Result<(), TzError> {
        assert_eq!(parse_posix_tz(b"PST8PDT,M3.2.0,M11.1.0", false)?, alternate((-28800, "PST"), (-25200, "PDT"), mwd(3, 2, 0)?, mwd(11, 1, 0)?)?);

        assert_eq!(
            parse_posix_tz(b"NZST-12:00:00NZDT-13:00:00,M10.1.0/02:00:00,M3.3.0/02:00:00", false)?,
            alternate((43200, "NZST"), (46800, "NZDT"), mwd(10, 1, 0)?, mwd(3, 3, 0)?)?
        );

        assert_eq!(parse_posix_tz(b"<-03>+3<+03>-3,J1,J365", false)?, alternate((-10800, "-03"), (10800, "+03"), j1(1)?, j1(365)?)?);

        // Daylight saving time one hour behind standard time
        assert_eq!(
            parse_posix_tz(b"IST-1GMT0,M10.5.0,M3.5.0/1", false)?,
            alternate_at((3600, "IST"), (0, "GMT"), (mwd(10, 5, 0)?, 7200), (mwd(3, 5, 0)?, 3600))?
        );

        // Offsets at the edge of the allowed range
        assert_eq!(parse_posix_tz(b"STD24:59:59DST,J1,J365", false)?, alternate((-89999, "STD"), (-86399, "DST"), j1(1)?, j1(365)?)?);
        assert_eq!(parse_posix_tz(b"STD-24:59:59DST,J1,J365", false)?, alternate((89999, "STD"), (93599, "DST"), j1(1)?, j1(365)?)?);

        Ok(())
    }

    #[test]
    fn test_string_extensions() -> Result<(), TzError> {
        let negative_time = b"<-03>3<-02>,M3.5.0/-2,M10.5.0/-1";
        assert!(parse_posix_tz(negative_time, false).is_err());
        assert_eq!(
            parse_posix_tz(negative_time, true)?,
            alternate_at((-10800, "-03"), (-7200, "-02"), (mwd(3, 5, 0)?, -7200), (mwd(10, 5, 0)?, -3600))?
        );

        let all_year = b"EST5EDT,0/0,J365/25";
        assert!(parse_posix_tz(all_year, false).is_err());
        assert_eq!(
            parse_posix_tz(all_year, true)?,
            alternate_at((-18000, "EST"), (-14400, "EDT"), (RuleDay::Julian0WithLeap(Julian0WithLeap::new(0)?), 0), (j1(365)?, 90000))?
        );

        Ok(())
    }

    #[test]
    fn test_error() {
        assert!(matches!(parse_posix_tz(b"", false), Err(TzError::TzString(TzStringError::Empty))));
        assert!(matches!(parse_posix_tz(b"IST-1GMT0", false), Err(TzError::TzString(TzStringError::MissingDstStartEndRules))));
        assert!(matches!(parse_posix_tz(b"EET-2EEST", false), Err(TzError::TzString(TzStringError::MissingDstStartEndRules))));
        assert!(matches!(parse_posix_tz(b"UTC25", false), Err(TzError::TzString(TzStringError::InvalidOffset))));
        assert!(matches!(parse_posix_tz(b"UTC0:60", false), Err(TzError::TzString(TzStringError::InvalidOffset))));
        assert!(matches!(parse_posix_tz(b"EST5EDT,M3.2.0/25,M11.1.0", false), Err(TzError::TzString(TzStringError::InvalidRuleTime))));
        assert!(matches!(parse_posix_tz(b"EST5EDT,M3.2.0/2:00:60,M11.1.0", false), Err(TzError::TzString(TzStringError::InvalidRuleTime))));
        assert!(matches!(parse_posix_tz(b"EST5EDT,M3.2.0,M11.1.0x", false), Err(TzError::TzString(TzStringError::RemainingData))));
        assert!(matches!(parse_posix_tz(b"EST5EDT,M13.2.0,M11.1.0", false), Err(TzError::TransitionRule(TransitionRuleError::InvalidRuleDay))));
        assert!(matches!(parse_posix_tz(b"EST5EDT,J0,J365", false), Err(TzError::TransitionRule(TransitionRuleError::InvalidRuleDay))));
        assert!(matches!(parse_posix_tz(b"AB1", false), Err(TzError::LocalTimeType(LocalTimeTypeError::InvalidDesignation))));
    }
}
