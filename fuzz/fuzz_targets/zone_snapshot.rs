#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (i64, bool, &str)| {
    use tz_resolver::{compute_zone_snapshot, TimeZone, UtcDateTime, ZoneDefinition};

    let (unix_time, consider_dst, tz_string) = input;

    let Ok(time_zone) = TimeZone::from_posix_tz(tz_string) else { return };
    let Ok(zone) = ZoneDefinition::from_time_zone("Fuzz/Zone", &time_zone) else { return };
    let Ok(base_time) = UtcDateTime::from_unix_time(unix_time) else { return };

    let _ = compute_zone_snapshot(&zone, &base_time, consider_dst, &time_zone);
});
