//! Consistency Analyzer
//!
//! Cross-checks fingerprint fields against each other and against the
//! IP-derived geography. Each check yields exactly one finding when its
//! inputs are present and classifiable. Anything the rule tables cannot
//! classify yields nothing, so rare-but-valid setups are not penalized.

mod tables;

use crate::models::{parse_resolution, DeviceType, FingerprintSignals, SignalBundle};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Operating system family as seen by the consistency rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsFamily {
    Windows,
    MacOs,
    Ios,
    Android,
    Linux,
}

impl OsFamily {
    /// Whether a UA reporting `ua` is plausible for a declared platform `self`
    fn accepts(self, ua: OsFamily) -> bool {
        match self {
            // Android browsers report `navigator.platform` as "Linux armv8l"
            OsFamily::Linux => matches!(ua, OsFamily::Linux | OsFamily::Android),
            other => other == ua,
        }
    }
}

/// The cross-field plausibility checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyCheck {
    OsUserAgent,
    ResolutionDeviceType,
    LanguageGeo,
    TimezoneGeo,
    PixelRatioDeviceType,
}

impl ConsistencyCheck {
    /// How strong a risk indicator a mismatch on this check is, in (0, 1]
    pub fn severity(self) -> f64 {
        match self {
            ConsistencyCheck::OsUserAgent => 0.9,
            ConsistencyCheck::ResolutionDeviceType => 0.5,
            ConsistencyCheck::LanguageGeo => 0.4,
            ConsistencyCheck::TimezoneGeo => 0.6,
            ConsistencyCheck::PixelRatioDeviceType => 0.3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConsistencyCheck::OsUserAgent => "operating system vs user agent",
            ConsistencyCheck::ResolutionDeviceType => "screen resolution vs device type",
            ConsistencyCheck::LanguageGeo => "browser language vs IP location",
            ConsistencyCheck::TimezoneGeo => "timezone vs IP location",
            ConsistencyCheck::PixelRatioDeviceType => "pixel ratio vs device type",
        }
    }
}

impl std::fmt::Display for ConsistencyCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyFinding {
    pub check: ConsistencyCheck,
    pub mismatched: bool,
    pub severity: f64,
    pub detail: String,
}

impl ConsistencyFinding {
    fn new(check: ConsistencyCheck, mismatched: bool, detail: String) -> Self {
        Self {
            check,
            mismatched,
            severity: check.severity(),
            detail,
        }
    }
}

/// What the user agent string says about the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UaProfile {
    pub family: OsFamily,
    pub device: DeviceType,
}

/// Runs the five consistency checks over a signal bundle
pub struct ConsistencyAnalyzer {
    ua_patterns: Vec<(Regex, OsFamily)>,
    offset_pattern: Option<Regex>,
}

impl ConsistencyAnalyzer {
    /// Create an analyzer with all UA patterns compiled
    pub fn new() -> Self {
        let defs = tables::get_ua_patterns();
        let mut ua_patterns = Vec::with_capacity(defs.len());

        for def in defs {
            match Regex::new(def.pattern) {
                Ok(re) => ua_patterns.push((re, def.family)),
                Err(e) => {
                    log::warn!("Failed to compile UA pattern '{}': {}", def.name, e);
                }
            }
        }

        let offset_pattern = match Regex::new(tables::OFFSET_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Failed to compile timezone offset pattern: {}", e);
                None
            }
        };

        Self {
            ua_patterns,
            offset_pattern,
        }
    }

    /// Run every check whose inputs are present, in a fixed check order
    pub fn analyze(&self, bundle: &SignalBundle) -> Vec<ConsistencyFinding> {
        let mut findings = Vec::new();
        let Some(fp) = &bundle.fingerprint else {
            return findings;
        };

        let country = bundle
            .ip
            .as_ref()
            .map(|ip| ip.country.trim())
            .filter(|c| !c.is_empty());
        let device_class = self.device_class(fp);

        findings.extend(self.check_os_user_agent(fp));
        if let Some(class) = device_class {
            findings.extend(check_resolution(fp, class));
        }
        if let Some(country) = country {
            findings.extend(check_language(fp, country));
            findings.extend(self.check_timezone(fp, country));
        }
        if let Some(class) = device_class {
            findings.extend(check_pixel_ratio(fp, class));
        }

        for finding in &findings {
            log::trace!(
                "consistency {:?}: mismatched={} ({})",
                finding.check,
                finding.mismatched,
                finding.detail
            );
        }
        findings
    }

    /// OS family and form factor implied by a user agent string
    pub fn classify_user_agent(&self, user_agent: &str) -> Option<UaProfile> {
        let family = self
            .ua_patterns
            .iter()
            .find(|(re, _)| re.is_match(user_agent))
            .map(|(_, family)| *family)?;

        let device = match family {
            OsFamily::Ios if user_agent.contains("iPad") => DeviceType::Tablet,
            OsFamily::Ios => DeviceType::Mobile,
            OsFamily::Android if user_agent.contains("Mobile") => DeviceType::Mobile,
            OsFamily::Android => DeviceType::Tablet,
            OsFamily::Windows | OsFamily::MacOs | OsFamily::Linux => DeviceType::Desktop,
        };

        Some(UaProfile { family, device })
    }

    /// UA-implied form factor, falling back to the collector's hint
    fn device_class(&self, fp: &FingerprintSignals) -> Option<DeviceType> {
        let from_ua = non_empty(&fp.user_agent)
            .and_then(|ua| self.classify_user_agent(ua))
            .map(|profile| profile.device);

        match from_ua {
            Some(device) => Some(device),
            None => match fp.device_type_hint {
                DeviceType::Unknown | DeviceType::Unrecognized => None,
                hint => Some(hint),
            },
        }
    }

    fn check_os_user_agent(&self, fp: &FingerprintSignals) -> Option<ConsistencyFinding> {
        let platform = non_empty(&fp.platform)?;
        let ua = non_empty(&fp.user_agent)?;
        let declared = classify_platform(platform)?;
        let reported = self.classify_user_agent(ua)?.family;

        let mismatched = !declared.accepts(reported);
        Some(ConsistencyFinding::new(
            ConsistencyCheck::OsUserAgent,
            mismatched,
            format!(
                "platform '{}' ({:?}) vs user agent OS ({:?})",
                platform, declared, reported
            ),
        ))
    }

    fn check_timezone(&self, fp: &FingerprintSignals, country: &str) -> Option<ConsistencyFinding> {
        let zone = non_empty(&fp.timezone)?;
        let offset = self.timezone_offset(zone)?;
        let (min, max) = tables::country_offset_range(country)?;

        let mismatched = offset < min || offset > max + tables::DST_TOLERANCE_MINUTES;
        Some(ConsistencyFinding::new(
            ConsistencyCheck::TimezoneGeo,
            mismatched,
            format!(
                "timezone '{}' (UTC{}) vs country {} (UTC{}..UTC{})",
                zone,
                format_offset(offset),
                country.to_ascii_uppercase(),
                format_offset(min),
                format_offset(max)
            ),
        ))
    }

    /// UTC offset in minutes for an IANA name or an explicit `UTC±HH:MM`
    fn timezone_offset(&self, zone: &str) -> Option<i32> {
        if let Some(offset) = tables::zone_offset(zone) {
            return Some(offset);
        }
        if zone.eq_ignore_ascii_case("GMT") {
            return Some(0);
        }

        let caps = self.offset_pattern.as_ref()?.captures(zone)?;
        let sign = if caps.get(1)?.as_str() == "-" { -1 } else { 1 };
        let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
        let minutes: i32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if hours > 14 || minutes >= 60 {
            return None;
        }
        Some(sign * (hours * 60 + minutes))
    }
}

impl Default for ConsistencyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// OS family from `navigator.platform`
fn classify_platform(platform: &str) -> Option<OsFamily> {
    let lower = platform.to_lowercase();
    if lower.contains("iphone") || lower.contains("ipad") || lower.contains("ipod") {
        Some(OsFamily::Ios)
    } else if lower.contains("android") {
        Some(OsFamily::Android)
    } else if lower.starts_with("win") {
        Some(OsFamily::Windows)
    } else if lower.starts_with("mac") {
        Some(OsFamily::MacOs)
    } else if lower.contains("linux") {
        Some(OsFamily::Linux)
    } else {
        None
    }
}

fn check_resolution(fp: &FingerprintSignals, class: DeviceType) -> Option<ConsistencyFinding> {
    let (width, height) = parse_resolution(non_empty(&fp.screen_resolution)?)?;
    let (short, long) = (width.min(height), width.max(height));

    let plausible = match class {
        DeviceType::Mobile => short <= 450,
        DeviceType::Tablet => (450..=1400).contains(&long),
        DeviceType::Desktop | DeviceType::Convertible => long > 900,
        DeviceType::Unknown | DeviceType::Unrecognized => return None,
    };

    Some(ConsistencyFinding::new(
        ConsistencyCheck::ResolutionDeviceType,
        !plausible,
        format!("{}x{} on a {} device", width, height, class),
    ))
}

fn check_language(fp: &FingerprintSignals, country: &str) -> Option<ConsistencyFinding> {
    let language = non_empty(&fp.language)?;
    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_lowercase();
    let countries = tables::countries_for_language(&primary)?;

    let mismatched = !countries.iter().any(|c| c.eq_ignore_ascii_case(country));
    Some(ConsistencyFinding::new(
        ConsistencyCheck::LanguageGeo,
        mismatched,
        format!("language '{}' vs country {}", language, country.to_ascii_uppercase()),
    ))
}

fn check_pixel_ratio(fp: &FingerprintSignals, class: DeviceType) -> Option<ConsistencyFinding> {
    let ratio = fp.pixel_ratio?;

    let plausible = match class {
        DeviceType::Mobile => ratio >= 1.5,
        DeviceType::Tablet => ratio >= 1.0,
        DeviceType::Desktop | DeviceType::Convertible => ratio < 4.0,
        DeviceType::Unknown | DeviceType::Unrecognized => return None,
    };

    Some(ConsistencyFinding::new(
        ConsistencyCheck::PixelRatioDeviceType,
        !plausible,
        format!("pixel ratio {} on a {} device", ratio, class),
    ))
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}
