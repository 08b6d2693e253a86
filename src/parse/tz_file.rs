//! TZif file decoding, following [RFC 8536](https://datatracker.ietf.org/doc/html/rfc8536).
//!
//! Leap second records are read past and dropped, so transition times are plain Unix times.

use crate::error::parse::TzFileError;
use crate::error::TzError;
use crate::parse::tz_string::parse_posix_tz;
use crate::parse::utils::{read_chunk_exact, read_count, read_exact, Cursor};
use crate::timezone::{LocalTimeType, TimeZone, Transition, TransitionRule};

use std::str;

const MAGIC: &[u8] = b"TZif";

/// Unused header bytes following the version
const RESERVED_SIZE: usize = 15;

const LOCAL_TIME_TYPE_SIZE: usize = 6;

/// Size of the correction following the occurrence time of a leap second record
const LEAP_CORRECTION_SIZE: usize = 4;

/// Size of a time in the version 1 data block
const V1_TIME_SIZE: usize = 4;

/// Size of a time in the data block of version 2 and later
const V2_TIME_SIZE: usize = 8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Version {
    V1,
    V2,
    V3,
}

/// Record counts announced by a TZif header
#[derive(Debug)]
struct Header {
    version: Version,
    ut_local_count: usize,
    std_wall_count: usize,
    leap_count: usize,
    transition_count: usize,
    type_count: usize,
    char_count: usize,
}

impl Header {
    fn read(cursor: &mut Cursor<'_>) -> Result<Self, TzFileError> {
        if read_exact(cursor, MAGIC.len())? != MAGIC {
            return Err(TzFileError::InvalidMagicNumber);
        }

        let version = match read_chunk_exact::<1>(cursor)? {
            b"\0" => Version::V1,
            b"2" => Version::V2,
            b"3" => Version::V3,
            _ => return Err(TzFileError::UnsupportedVersion),
        };

        read_exact(cursor, RESERVED_SIZE)?;

        let mut counts = [0; 6];
        for count in &mut counts {
            *count = read_count(cursor)?;
        }
        let [ut_local_count, std_wall_count, leap_count, transition_count, type_count, char_count] = counts;

        // Indicators are either absent or given for every local time type
        let is_indicator_count_valid = |count: usize| count == 0 || count == type_count;
        if type_count == 0 || char_count == 0 || !is_indicator_count_valid(ut_local_count) || !is_indicator_count_valid(std_wall_count) {
            return Err(TzFileError::InvalidHeader);
        }

        Ok(Self { version, ut_local_count, std_wall_count, leap_count, transition_count, type_count, char_count })
    }

    /// Split the data block following the header, whose times are `time_size` bytes long
    fn read_block<'a>(&self, cursor: &mut Cursor<'a>, time_size: usize) -> Result<DataBlock<'a>, TzFileError> {
        let size = |count: usize, record_size: usize| count.checked_mul(record_size).ok_or(TzFileError::InvalidHeader);

        let transition_times = read_exact(cursor, size(self.transition_count, time_size)?)?;
        let transition_types = read_exact(cursor, self.transition_count)?;
        let local_time_types = read_exact(cursor, size(self.type_count, LOCAL_TIME_TYPE_SIZE)?)?;
        let designations = read_exact(cursor, self.char_count)?;
        read_exact(cursor, size(self.leap_count, time_size + LEAP_CORRECTION_SIZE)?)?;
        let std_wall_indicators = read_exact(cursor, self.std_wall_count)?;
        let ut_local_indicators = read_exact(cursor, self.ut_local_count)?;

        Ok(DataBlock { time_size, transition_times, transition_types, local_time_types, designations, std_wall_indicators, ut_local_indicators })
    }
}

/// Raw sections of a TZif data block
struct DataBlock<'a> {
    time_size: usize,
    transition_times: &'a [u8],
    transition_types: &'a [u8],
    local_time_types: &'a [u8],
    /// NUL-terminated designations, indexed by local time type records
    designations: &'a [u8],
    std_wall_indicators: &'a [u8],
    ut_local_indicators: &'a [u8],
}

impl<'a> DataBlock<'a> {
    fn transitions(&self) -> Vec<Transition> {
        let times = self.transition_times.chunks_exact(self.time_size);
        times.zip(self.transition_types).map(|(time, &index)| Transition::new(decode_time(time), index.into())).collect()
    }

    fn local_time_types(&self) -> Result<Vec<LocalTimeType>, TzError> {
        let mut local_time_types = Vec::with_capacity(self.local_time_types.len() / LOCAL_TIME_TYPE_SIZE);

        let mut records = self.local_time_types;
        while !records.is_empty() {
            let &[o0, o1, o2, o3, is_dst, designation_index] = read_chunk_exact::<LOCAL_TIME_TYPE_SIZE>(&mut records).map_err(TzFileError::from)?;

            let is_dst = match is_dst {
                0 => false,
                1 => true,
                _ => return Err(TzFileError::InvalidLocalTimeType.into()),
            };

            let designation = self.designation(designation_index.into())?;
            local_time_types.push(LocalTimeType::new(i32::from_be_bytes([o0, o1, o2, o3]), is_dst, designation)?);
        }

        Ok(local_time_types)
    }

    /// Designation starting at `index`, or `None` if it is empty
    fn designation(&self, index: usize) -> Result<Option<&'a str>, TzFileError> {
        let tail = self.designations.get(index..).ok_or(TzFileError::InvalidLocalTimeType)?;
        let length = tail.iter().position(|&x| x == b'\0').ok_or(TzFileError::InvalidLocalTimeType)?;

        match &tail[..length] {
            [] => Ok(None),
            designation => Ok(Some(str::from_utf8(designation)?)),
        }
    }

    /// A UT/local indicator may only be set along with its standard/wall indicator
    fn check_indicators(&self) -> Result<(), TzFileError> {
        let indicator = |indicators: &[u8], index: usize| indicators.get(index).copied().unwrap_or(0);
        let count = self.std_wall_indicators.len().max(self.ut_local_indicators.len());

        let is_valid = (0..count)
            .map(|index| (indicator(self.std_wall_indicators, index), indicator(self.ut_local_indicators, index)))
            .all(|pair| matches!(pair, (0, 0) | (1, 0) | (1, 1)));

        if is_valid {
            Ok(())
        } else {
            Err(TzFileError::InvalidIndicators)
        }
    }

    fn to_time_zone(&self, extra_rule: Option<TransitionRule>) -> Result<TimeZone, TzError> {
        self.check_indicators()?;
        TimeZone::new(self.transitions(), self.local_time_types()?, extra_rule)
    }
}

/// Decode a big-endian signed time of at most 8 bytes
fn decode_time(bytes: &[u8]) -> i64 {
    let sign_fill = if bytes.first().is_some_and(|&x| x & 0x80 != 0) { 0xff } else { 0 };

    let mut buffer = [sign_fill; 8];
    buffer[8 - bytes.len()..].copy_from_slice(bytes);
    i64::from_be_bytes(buffer)
}

/// Parse the newline-enclosed TZ string following the last data block
fn parse_footer(footer: &[u8], version: Version) -> Result<Option<TransitionRule>, TzError> {
    let tz_string = footer.strip_prefix(b"\n").and_then(|x| x.strip_suffix(b"\n")).ok_or(TzFileError::InvalidFooter)?;

    if tz_string.is_empty() {
        return Ok(None);
    }

    if tz_string.first() == Some(&b':') || tz_string.iter().any(|&x| x == b'\0' || x == b'\n') {
        return Err(TzFileError::InvalidFooter.into());
    }

    Ok(Some(parse_posix_tz(tz_string, version == Version::V3)?))
}

/// Parse a TZif file.
///
/// Files of version 2 and later repeat their data with 64-bit times after the version 1 block, which is skipped.
///
pub(crate) fn parse_tz_file(bytes: &[u8]) -> Result<TimeZone, TzError> {
    let mut cursor = bytes;

    let header = Header::read(&mut cursor)?;
    let v1_block = header.read_block(&mut cursor, V1_TIME_SIZE)?;

    if header.version == Version::V1 {
        if !cursor.is_empty() {
            return Err(TzFileError::RemainingDataV1.into());
        }
        return v1_block.to_time_zone(None);
    }

    let header = Header::read(&mut cursor)?;
    let block = header.read_block(&mut cursor, V2_TIME_SIZE)?;
    block.to_time_zone(parse_footer(cursor, header.version)?)
}
