//! Signal bundle data model.
//!
//! A [`SignalBundle`] is the merged raw output of the external collectors for
//! one client. Every sub-record is optional: `None` means the collector did
//! not run, which is never the same thing as "nothing suspicious".

use crate::errors::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Detection modules, declared in aggregation / report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Ip,
    Privacy,
    Fingerprint,
    Device,
    Network,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::Ip,
        Module::Privacy,
        Module::Fingerprint,
        Module::Device,
        Module::Network,
    ];

    /// Position in module order, also the index into weight arrays
    pub fn index(self) -> usize {
        match self {
            Module::Ip => 0,
            Module::Privacy => 1,
            Module::Fingerprint => 2,
            Module::Device => 3,
            Module::Network => 4,
        }
    }

    /// Config / serialization key
    pub fn key(self) -> &'static str {
        match self {
            Module::Ip => "ip",
            Module::Privacy => "privacy",
            Module::Fingerprint => "fingerprint",
            Module::Device => "device",
            Module::Network => "network",
        }
    }

    /// Human-readable tag used to prefix issue strings
    pub fn label(self) -> &'static str {
        match self {
            Module::Ip => "IP",
            Module::Privacy => "Privacy",
            Module::Fingerprint => "Fingerprint",
            Module::Device => "Device",
            Module::Network => "Network",
        }
    }

    pub fn from_key(key: &str) -> Option<Module> {
        Module::ALL.into_iter().find(|m| m.key() == key)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Connection type reported by the IP reputation lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpType {
    Residential,
    Mobile,
    Datacenter,
    Hosting,
    Vpn,
    Proxy,
    Tor,
    /// The lookup ran but could not classify the address
    Unknown,
    /// Tag outside the known set; rejected by [`SignalBundle::validate`]
    #[serde(other)]
    Unrecognized,
}

impl IpType {
    /// Types that a remote service treats as non-consumer traffic
    pub fn is_non_residential(self) -> bool {
        matches!(
            self,
            IpType::Datacenter | IpType::Hosting | IpType::Vpn | IpType::Proxy | IpType::Tor
        )
    }
}

impl std::fmt::Display for IpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IpType::Residential => "residential",
            IpType::Mobile => "mobile",
            IpType::Datacenter => "datacenter",
            IpType::Hosting => "hosting",
            IpType::Vpn => "VPN",
            IpType::Proxy => "proxy",
            IpType::Tor => "Tor",
            IpType::Unknown => "unknown",
            IpType::Unrecognized => "unrecognized",
        };
        write!(f, "{}", name)
    }
}

/// Device form factor, either declared by the client or implied by its UA
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
    /// Touch-capable laptop / 2-in-1
    Convertible,
    #[default]
    Unknown,
    /// Tag outside the known set; rejected by [`SignalBundle::validate`]
    #[serde(other)]
    Unrecognized,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Convertible => "convertible",
            DeviceType::Unknown => "unknown",
            DeviceType::Unrecognized => "unrecognized",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpSignals {
    pub ip: String,
    /// ISO 3166-1 alpha-2 country of the IP
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub isp: String,
    pub ip_type: IpType,
    /// 0 = worst reputation seen, 100 = cleanest
    pub reputation_percentile: f64,
    #[serde(default)]
    pub blacklisted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacySignals {
    pub dns_leak: bool,
    pub webrtc_leak: bool,
    #[serde(default)]
    pub declared_ip: Option<String>,
    #[serde(default)]
    pub webrtc_revealed_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintSignals {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub timezone: String,
    /// `WIDTHxHEIGHT` in CSS pixels
    #[serde(default)]
    pub screen_resolution: String,
    #[serde(default)]
    pub pixel_ratio: Option<f64>,
    /// `None` when font enumeration did not run
    #[serde(default)]
    pub fonts: Option<BTreeSet<String>>,
    #[serde(default)]
    pub automation_detected: bool,
    #[serde(default)]
    pub max_touch_points: u32,
    #[serde(default)]
    pub device_type_hint: DeviceType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSignals {
    pub webdriver_flag: bool,
    #[serde(default)]
    pub touch_points: u32,
    #[serde(default)]
    pub declared_device_type: DeviceType,
    #[serde(default)]
    pub virtual_machine: bool,
    #[serde(default)]
    pub hardware_concurrency: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSignals {
    pub latency_ms: f64,
    pub packet_loss_pct: f64,
    #[serde(default)]
    pub jitter_ms: Option<f64>,
    /// Whether the target service answered at all
    #[serde(default)]
    pub target_reachable: Option<bool>,
}

/// Merged raw detection data for one client, before scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    #[serde(default)]
    pub ip: Option<IpSignals>,
    #[serde(default)]
    pub privacy: Option<PrivacySignals>,
    #[serde(default)]
    pub fingerprint: Option<FingerprintSignals>,
    #[serde(default)]
    pub device: Option<DeviceSignals>,
    #[serde(default)]
    pub network: Option<NetworkSignals>,
}

impl SignalBundle {
    /// Modules whose sub-record was collected, in module order
    pub fn present_modules(&self) -> Vec<Module> {
        Module::ALL
            .into_iter()
            .filter(|m| match m {
                Module::Ip => self.ip.is_some(),
                Module::Privacy => self.privacy.is_some(),
                Module::Fingerprint => self.fingerprint.is_some(),
                Module::Device => self.device.is_some(),
                Module::Network => self.network.is_some(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_modules().is_empty()
    }

    /// Reject malformed or out-of-range fields. Input is never clamped.
    pub fn validate(&self) -> RiskResult<()> {
        if let Some(ip) = &self.ip {
            check_ip_addr("ip.ip", &ip.ip)?;
            if ip.ip_type == IpType::Unrecognized {
                return Err(RiskError::invalid_signal(
                    "ip.ip_type",
                    "unrecognized connection type tag",
                ));
            }
            check_country("ip.country", &ip.country)?;
            check_range("ip.reputation_percentile", ip.reputation_percentile, 0.0, 100.0)?;
        }

        if let Some(privacy) = &self.privacy {
            if let Some(declared) = &privacy.declared_ip {
                check_ip_addr("privacy.declared_ip", declared)?;
            }
            if let Some(revealed) = &privacy.webrtc_revealed_ip {
                check_ip_addr("privacy.webrtc_revealed_ip", revealed)?;
            }
        }

        if let Some(fp) = &self.fingerprint {
            check_device_type("fingerprint.device_type_hint", fp.device_type_hint)?;
            if let Some(ratio) = fp.pixel_ratio {
                if !ratio.is_finite() || ratio <= 0.0 {
                    return Err(RiskError::invalid_signal(
                        "fingerprint.pixel_ratio",
                        format!("must be a positive number, got {}", ratio),
                    ));
                }
            }
            if !fp.screen_resolution.trim().is_empty()
                && parse_resolution(&fp.screen_resolution).is_none()
            {
                return Err(RiskError::invalid_signal(
                    "fingerprint.screen_resolution",
                    format!("expected WIDTHxHEIGHT, got '{}'", fp.screen_resolution),
                ));
            }
        }

        if let Some(device) = &self.device {
            check_device_type("device.declared_device_type", device.declared_device_type)?;
        }

        if let Some(net) = &self.network {
            check_range("network.latency_ms", net.latency_ms, 0.0, f64::MAX)?;
            check_range("network.packet_loss_pct", net.packet_loss_pct, 0.0, 100.0)?;
            if let Some(jitter) = net.jitter_ms {
                check_range("network.jitter_ms", jitter, 0.0, f64::MAX)?;
            }
        }

        Ok(())
    }

    /// SHA-256 over the IP address and fingerprint record.
    ///
    /// External caches key prior reports by this digest; the engine itself
    /// never looks results up.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        if let Some(ip) = &self.ip {
            hasher.update(ip.ip.as_bytes());
        }
        hasher.update([0u8]);
        if let Some(fp) = &self.fingerprint {
            for field in [
                &fp.user_agent,
                &fp.platform,
                &fp.language,
                &fp.timezone,
                &fp.screen_resolution,
            ] {
                hasher.update(field.as_bytes());
                hasher.update([0u8]);
            }
            if let Some(ratio) = fp.pixel_ratio {
                hasher.update(ratio.to_bits().to_le_bytes());
            }
            if let Some(fonts) = &fp.fonts {
                // BTreeSet iteration is sorted, so the digest is order independent
                for font in fonts {
                    hasher.update(font.as_bytes());
                    hasher.update([0u8]);
                }
            }
            hasher.update([fp.automation_detected as u8]);
            hasher.update(fp.max_touch_points.to_le_bytes());
            hasher.update(fp.device_type_hint.to_string().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Parse `1920x1080` (also accepts `X` and `×`) into `(width, height)`
pub fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let normalized = value.trim().replace(['X', '×'], "x");
    let (w, h) = normalized.split_once('x')?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> RiskResult<()> {
    if !value.is_finite() || value < min || value > max {
        let reason = if max == f64::MAX {
            format!("must be a finite number >= {}, got {}", min, value)
        } else {
            format!("must be within [{}, {}], got {}", min, max, value)
        };
        return Err(RiskError::invalid_signal(field, reason));
    }
    Ok(())
}

fn check_device_type(field: &str, value: DeviceType) -> RiskResult<()> {
    if value == DeviceType::Unrecognized {
        return Err(RiskError::invalid_signal(field, "unrecognized device type tag"));
    }
    Ok(())
}

fn check_ip_addr(field: &str, value: &str) -> RiskResult<()> {
    if value.trim().is_empty() {
        return Ok(());
    }
    value
        .trim()
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| RiskError::invalid_signal(field, format!("'{}' is not an IP address", value)))
}

fn check_country(field: &str, value: &str) -> RiskResult<()> {
    if value.is_empty() || (value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic())) {
        return Ok(());
    }
    Err(RiskError::invalid_signal(
        field,
        format!("expected a two-letter country code, got '{}'", value),
    ))
}
