//! DOS date/time codec.
//!
//! ZIP headers carry timestamps as two packed 16-bit words: a time word
//! (2-second granularity) and a date word counting years from 1980. This
//! module converts between that packing and UNIX seconds, treating the
//! packed value as `date << 16 | time` so a single little-endian `u32`
//! write lays the time word down first, as the format requires.

use chrono::{Datelike, TimeZone, Timelike, Utc};

/// UNIX seconds for 1980-01-01T00:00:00Z, the earliest representable
/// DOS timestamp.
pub const DOS_EPOCH: i64 = 315_532_800;

/// Pack a UNIX timestamp into a DOS date/time value.
///
/// Dates before 1980 clamp to exactly 1980-01-01T00:00:00, the zero point
/// of the DOS calendar.
pub fn encode(unix: i64) -> u32 {
    if unix < DOS_EPOCH {
        // year=1980, month=1, day=1, all-zero time
        return ((1u32 << 5) | 1) << 16;
    }

    let dt = match Utc.timestamp_opt(unix, 0).single() {
        Some(dt) => dt,
        None => return ((1u32 << 5) | 1) << 16,
    };

    let year = (dt.year() as u32).saturating_sub(1980).min(127);
    let date = (year << 9) | (dt.month() << 5) | dt.day();
    let time = (dt.hour() << 11) | (dt.minute() << 5) | (dt.second() / 2);
    (date << 16) | time
}

/// Unpack a DOS date/time value into UNIX seconds.
///
/// An all-zero date+time pair means the producer recorded no timestamp;
/// the current time is substituted rather than 1980-01-01.
pub fn decode(packed: u32) -> i64 {
    if packed == 0 {
        return Utc::now().timestamp();
    }

    let date = (packed >> 16) as u16;
    let time = (packed & 0xFFFF) as u16;

    let year = ((date >> 9) & 0x7F) as i32 + 1980;
    let month = ((date >> 5) & 0x0F) as u32;
    let day = (date & 0x1F) as u32;
    let hour = ((time >> 11) & 0x1F) as u32;
    let minute = ((time >> 5) & 0x3F) as u32;
    let second = ((time & 0x1F) * 2) as u32;

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or(DOS_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_1980_clamps_to_dos_epoch() {
        assert_eq!(decode(encode(0)), DOS_EPOCH);
        assert_eq!(decode(encode(-1)), DOS_EPOCH);
        assert_eq!(decode(encode(DOS_EPOCH - 1)), DOS_EPOCH);
    }

    #[test]
    fn dos_epoch_round_trips() {
        assert_eq!(decode(encode(DOS_EPOCH)), DOS_EPOCH);
    }

    #[test]
    fn even_seconds_round_trip() {
        // 2024-05-06T07:08:10Z; DOS time has 2-second granularity so only
        // even seconds survive a round trip.
        let unix = Utc
            .with_ymd_and_hms(2024, 5, 6, 7, 8, 10)
            .unwrap()
            .timestamp();
        assert_eq!(decode(encode(unix)), unix);
    }

    #[test]
    fn odd_seconds_truncate() {
        let unix = Utc
            .with_ymd_and_hms(2024, 5, 6, 7, 8, 11)
            .unwrap()
            .timestamp();
        assert_eq!(decode(encode(unix)), unix - 1);
    }

    #[test]
    fn zero_means_unknown_not_epoch() {
        let now = Utc::now().timestamp();
        assert!(decode(0) >= now);
    }

    #[test]
    fn invalid_date_falls_back_to_epoch() {
        // month 0 / day 0 cannot be built into a calendar date
        assert_eq!(decode(1 << 16), DOS_EPOCH);
    }
}
