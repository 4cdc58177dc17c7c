//! Rule tables for the consistency checks.
//!
//! Deliberately small: anything not listed here is treated as unknown and
//! produces no finding.

use super::OsFamily;

/// User-agent OS token pattern
pub struct UaPattern {
    pub name: &'static str,
    pub family: OsFamily,
    pub pattern: &'static str,
}

/// Ordered: the first matching pattern wins. iOS UAs carry "like Mac OS X"
/// and Android UAs carry "Linux", so the specific families come first.
pub fn get_ua_patterns() -> Vec<UaPattern> {
    vec![
        UaPattern {
            name: "iOS",
            family: OsFamily::Ios,
            pattern: r"(?i)\b(?:iPhone|iPad|iPod)\b",
        },
        UaPattern {
            name: "Android",
            family: OsFamily::Android,
            pattern: r"(?i)\bAndroid\b",
        },
        UaPattern {
            name: "Windows",
            family: OsFamily::Windows,
            pattern: r"(?i)\bWindows NT\b|\bWin(?:32|64)\b",
        },
        UaPattern {
            name: "macOS",
            family: OsFamily::MacOs,
            pattern: r"(?i)\bMacintosh\b|\bMac OS X\b",
        },
        UaPattern {
            name: "Linux",
            family: OsFamily::Linux,
            pattern: r"(?i)\bLinux\b|\bCrOS\b|\bX11\b",
        },
    ]
}

/// Explicit offset form: `UTC+08:00`, `GMT-5`, `+0530`
pub const OFFSET_PATTERN: &str = r"^(?i:UTC|GMT)?\s*([+-])(\d{1,2})(?::?(\d{2}))?$";

/// Primary language subtag -> countries where it is a common browser locale
pub const LANGUAGE_COUNTRIES: &[(&str, &[&str])] = &[
    ("en", &["US", "GB", "CA", "AU", "NZ", "IE", "IN", "SG", "PH", "ZA", "NG"]),
    ("zh", &["CN", "TW", "HK", "SG", "MO"]),
    ("ja", &["JP"]),
    ("ko", &["KR"]),
    ("es", &["ES", "MX", "AR", "CL", "CO", "PE", "US"]),
    ("fr", &["FR", "CA", "BE", "CH", "LU"]),
    ("de", &["DE", "AT", "CH", "LU"]),
    ("ru", &["RU", "BY", "KZ", "UA"]),
    ("pt", &["BR", "PT"]),
    ("it", &["IT", "CH"]),
    ("ar", &["SA", "AE", "EG"]),
    ("nl", &["NL", "BE"]),
    ("pl", &["PL"]),
    ("tr", &["TR"]),
    ("vi", &["VN"]),
    ("th", &["TH"]),
    ("id", &["ID"]),
];

/// IANA zone -> standard UTC offset in minutes
pub const TIMEZONE_OFFSETS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("Etc/UTC", 0),
    ("America/New_York", -300),
    ("America/Chicago", -360),
    ("America/Denver", -420),
    ("America/Phoenix", -420),
    ("America/Los_Angeles", -480),
    ("America/Anchorage", -540),
    ("Pacific/Honolulu", -600),
    ("America/Toronto", -300),
    ("America/Vancouver", -480),
    ("America/Mexico_City", -360),
    ("America/Sao_Paulo", -180),
    ("America/Argentina/Buenos_Aires", -180),
    ("America/Bogota", -300),
    ("America/Santiago", -240),
    ("Europe/London", 0),
    ("Europe/Dublin", 0),
    ("Europe/Lisbon", 0),
    ("Europe/Paris", 60),
    ("Europe/Berlin", 60),
    ("Europe/Madrid", 60),
    ("Europe/Rome", 60),
    ("Europe/Amsterdam", 60),
    ("Europe/Brussels", 60),
    ("Europe/Zurich", 60),
    ("Europe/Vienna", 60),
    ("Europe/Warsaw", 60),
    ("Europe/Stockholm", 60),
    ("Europe/Oslo", 60),
    ("Europe/Helsinki", 120),
    ("Europe/Kiev", 120),
    ("Europe/Kyiv", 120),
    ("Europe/Istanbul", 180),
    ("Europe/Moscow", 180),
    ("Europe/Minsk", 180),
    ("Asia/Shanghai", 480),
    ("Asia/Hong_Kong", 480),
    ("Asia/Taipei", 480),
    ("Asia/Singapore", 480),
    ("Asia/Tokyo", 540),
    ("Asia/Seoul", 540),
    ("Asia/Kolkata", 330),
    ("Asia/Calcutta", 330),
    ("Asia/Jakarta", 420),
    ("Asia/Bangkok", 420),
    ("Asia/Ho_Chi_Minh", 420),
    ("Asia/Manila", 480),
    ("Asia/Kuala_Lumpur", 480),
    ("Asia/Dubai", 240),
    ("Asia/Riyadh", 180),
    ("Asia/Jerusalem", 120),
    ("Asia/Almaty", 300),
    ("Australia/Sydney", 600),
    ("Australia/Melbourne", 600),
    ("Australia/Brisbane", 600),
    ("Australia/Adelaide", 570),
    ("Australia/Perth", 480),
    ("Pacific/Auckland", 720),
    ("Africa/Johannesburg", 120),
    ("Africa/Cairo", 120),
    ("Africa/Lagos", 60),
];

/// Country -> plausible standard offset range in minutes (inclusive)
pub const COUNTRY_OFFSET_RANGES: &[(&str, i32, i32)] = &[
    ("US", -600, -300),
    ("CA", -480, -210),
    ("MX", -480, -300),
    ("BR", -300, -120),
    ("AR", -180, -180),
    ("CL", -360, -240),
    ("CO", -300, -300),
    ("PE", -300, -300),
    ("GB", 0, 0),
    ("IE", 0, 0),
    ("PT", -60, 0),
    ("ES", 0, 60),
    ("FR", 60, 60),
    ("DE", 60, 60),
    ("IT", 60, 60),
    ("NL", 60, 60),
    ("BE", 60, 60),
    ("LU", 60, 60),
    ("CH", 60, 60),
    ("AT", 60, 60),
    ("PL", 60, 60),
    ("SE", 60, 60),
    ("NO", 60, 60),
    ("FI", 120, 120),
    ("UA", 120, 120),
    ("TR", 180, 180),
    ("BY", 180, 180),
    ("RU", 120, 720),
    ("KZ", 300, 360),
    ("CN", 480, 480),
    ("HK", 480, 480),
    ("MO", 480, 480),
    ("TW", 480, 480),
    ("SG", 480, 480),
    ("MY", 480, 480),
    ("PH", 480, 480),
    ("JP", 540, 540),
    ("KR", 540, 540),
    ("IN", 330, 330),
    ("ID", 420, 540),
    ("TH", 420, 420),
    ("VN", 420, 420),
    ("AE", 240, 240),
    ("SA", 180, 180),
    ("IL", 120, 120),
    ("EG", 120, 120),
    ("ZA", 120, 120),
    ("NG", 60, 60),
    ("AU", 480, 630),
    ("NZ", 720, 720),
];

/// Daylight saving can push an explicit offset one hour past standard time
pub const DST_TOLERANCE_MINUTES: i32 = 60;

pub fn countries_for_language(lang: &str) -> Option<&'static [&'static str]> {
    LANGUAGE_COUNTRIES
        .iter()
        .find(|(code, _)| *code == lang)
        .map(|(_, countries)| *countries)
}

pub fn zone_offset(zone: &str) -> Option<i32> {
    TIMEZONE_OFFSETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone))
        .map(|(_, offset)| *offset)
}

pub fn country_offset_range(country: &str) -> Option<(i32, i32)> {
    COUNTRY_OFFSET_RANGES
        .iter()
        .find(|(code, _, _)| code.eq_ignore_ascii_case(country))
        .map(|(_, min, max)| (*min, *max))
}
