use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::Tz;

/// Offset from UTC in seconds of the zone `raw` at instant `now`.
///
/// `raw` is either an IANA name (`Europe/Moscow`) or a fixed offset
/// (`+03:00`). Anything else gives an empty string.
pub fn convert_tz_to_offset(now: DateTime<Utc>, raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(tz) = raw.parse::<Tz>() {
        return now
            .with_timezone(&tz)
            .offset()
            .fix()
            .local_minus_utc()
            .to_string();
    }
    match raw.parse::<FixedOffset>() {
        Ok(offset) => offset.local_minus_utc().to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn winter() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn summer() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_named_zones() {
        assert_eq!(convert_tz_to_offset(winter(), "Asia/Tokyo"), "32400");
        assert_eq!(convert_tz_to_offset(winter(), "UTC"), "0");
        assert_eq!(convert_tz_to_offset(winter(), "America/Sao_Paulo"), "-10800");
    }

    #[test]
    fn test_daylight_saving_follows_now() {
        assert_eq!(convert_tz_to_offset(winter(), "Europe/Paris"), "3600");
        assert_eq!(convert_tz_to_offset(summer(), "Europe/Paris"), "7200");
    }

    #[test]
    fn test_fixed_offsets() {
        assert_eq!(convert_tz_to_offset(winter(), "+05:30"), "19800");
        assert_eq!(convert_tz_to_offset(winter(), "-03:00"), "-10800");
    }

    #[test]
    fn test_unknown_zone() {
        assert_eq!(convert_tz_to_offset(winter(), ""), "");
        assert_eq!(convert_tz_to_offset(winter(), "Mars/Olympus_Mons"), "");
    }
}
