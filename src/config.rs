//! Engine configuration.
//!
//! Weights and every penalty constant are plain values loaded once and
//! validated before any bundle is scored. The defaults are the documented
//! scoring policy; deployments override them from a TOML or JSON file.

use crate::aggregate::WeightTable;
use crate::errors::{RiskError, RiskResult};
use crate::models::IpType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: WeightTable,
    pub policy: ScoringPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub ip: IpPolicy,
    pub privacy: PrivacyPolicy,
    pub fingerprint: FingerprintPolicy,
    pub device: DevicePolicy,
    pub network: NetworkPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpPolicy {
    pub residential_base: f64,
    pub mobile_base: f64,
    pub datacenter_base: f64,
    pub hosting_base: f64,
    pub vpn_base: f64,
    pub proxy_base: f64,
    pub tor_base: f64,
    pub unknown_base: f64,
    /// Points lost per percentile below 100
    pub reputation_scale: f64,
    /// Reputation issue is reported below this percentile
    pub reputation_issue_below: f64,
    pub blacklist_penalty: f64,
}

impl IpPolicy {
    pub fn base_score(&self, ip_type: IpType) -> f64 {
        match ip_type {
            IpType::Residential => self.residential_base,
            IpType::Mobile => self.mobile_base,
            IpType::Datacenter => self.datacenter_base,
            IpType::Hosting => self.hosting_base,
            IpType::Vpn => self.vpn_base,
            IpType::Proxy => self.proxy_base,
            IpType::Tor => self.tor_base,
            IpType::Unknown | IpType::Unrecognized => self.unknown_base,
        }
    }
}

impl Default for IpPolicy {
    fn default() -> Self {
        Self {
            residential_base: 90.0,
            mobile_base: 90.0,
            datacenter_base: 55.0,
            hosting_base: 55.0,
            vpn_base: 35.0,
            proxy_base: 20.0,
            tor_base: 10.0,
            unknown_base: 60.0,
            reputation_scale: 0.3,
            reputation_issue_below: 50.0,
            blacklist_penalty: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyPolicy {
    pub dns_leak_penalty: f64,
    pub webrtc_leak_penalty: f64,
    pub ip_mismatch_penalty: f64,
}

impl Default for PrivacyPolicy {
    fn default() -> Self {
        Self {
            dns_leak_penalty: 40.0,
            webrtc_leak_penalty: 35.0,
            ip_mismatch_penalty: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintPolicy {
    /// Multiplied by a mismatched finding's severity
    pub mismatch_scale: f64,
    pub no_fonts_penalty: f64,
    pub automation_penalty: f64,
}

impl Default for FingerprintPolicy {
    fn default() -> Self {
        Self {
            mismatch_scale: 40.0,
            no_fonts_penalty: 15.0,
            automation_penalty: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicePolicy {
    pub webdriver_penalty: f64,
    pub touch_mismatch_penalty: f64,
    pub virtual_machine_penalty: f64,
    pub low_concurrency_penalty: f64,
    /// Fewer logical cores than this is typical of emulators
    pub min_hardware_concurrency: u32,
}

impl Default for DevicePolicy {
    fn default() -> Self {
        Self {
            webdriver_penalty: 50.0,
            touch_mismatch_penalty: 20.0,
            virtual_machine_penalty: 25.0,
            low_concurrency_penalty: 10.0,
            min_hardware_concurrency: 2,
        }
    }
}

/// Penalties ramp linearly from 0 at the `good` threshold to the full
/// penalty at the `bad` threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicy {
    pub latency_good_ms: f64,
    pub latency_bad_ms: f64,
    pub latency_max_penalty: f64,
    pub loss_good_pct: f64,
    pub loss_bad_pct: f64,
    pub loss_max_penalty: f64,
    pub jitter_threshold_ms: f64,
    pub jitter_penalty: f64,
    pub unreachable_penalty: f64,
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        Self {
            latency_good_ms: 300.0,
            latency_bad_ms: 1000.0,
            latency_max_penalty: 40.0,
            loss_good_pct: 1.0,
            loss_bad_pct: 10.0,
            loss_max_penalty: 40.0,
            jitter_threshold_ms: 50.0,
            jitter_penalty: 10.0,
            unreachable_penalty: 60.0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a `.toml` or `.json` file and validate it.
    pub fn from_file(path: &Path) -> RiskResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| RiskError::io(e, Some(path.to_path_buf())))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config: EngineConfig = match ext.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| RiskError::Toml {
                path: path.to_path_buf(),
                source: e,
            })?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(RiskError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension: ext,
                })
            }
        };

        config.validate()?;
        log::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> RiskResult<()> {
        self.weights.validate()?;
        self.policy.validate()
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> RiskResult<()> {
        let ip = &self.ip;
        for (field, value) in [
            ("ip.residential_base", ip.residential_base),
            ("ip.mobile_base", ip.mobile_base),
            ("ip.datacenter_base", ip.datacenter_base),
            ("ip.hosting_base", ip.hosting_base),
            ("ip.vpn_base", ip.vpn_base),
            ("ip.proxy_base", ip.proxy_base),
            ("ip.tor_base", ip.tor_base),
            ("ip.unknown_base", ip.unknown_base),
            ("ip.reputation_issue_below", ip.reputation_issue_below),
            ("ip.blacklist_penalty", ip.blacklist_penalty),
            ("privacy.dns_leak_penalty", self.privacy.dns_leak_penalty),
            ("privacy.webrtc_leak_penalty", self.privacy.webrtc_leak_penalty),
            ("privacy.ip_mismatch_penalty", self.privacy.ip_mismatch_penalty),
            ("fingerprint.mismatch_scale", self.fingerprint.mismatch_scale),
            ("fingerprint.no_fonts_penalty", self.fingerprint.no_fonts_penalty),
            ("fingerprint.automation_penalty", self.fingerprint.automation_penalty),
            ("device.webdriver_penalty", self.device.webdriver_penalty),
            ("device.touch_mismatch_penalty", self.device.touch_mismatch_penalty),
            ("device.virtual_machine_penalty", self.device.virtual_machine_penalty),
            ("device.low_concurrency_penalty", self.device.low_concurrency_penalty),
            ("network.latency_max_penalty", self.network.latency_max_penalty),
            ("network.loss_max_penalty", self.network.loss_max_penalty),
            ("network.jitter_penalty", self.network.jitter_penalty),
            ("network.unreachable_penalty", self.network.unreachable_penalty),
        ] {
            check_points(field, value)?;
        }

        if !ip.reputation_scale.is_finite() || ip.reputation_scale < 0.0 {
            return Err(RiskError::invalid_config(
                "ip.reputation_scale",
                format!("must be a non-negative number, got {}", ip.reputation_scale),
            ));
        }

        let net = &self.network;
        check_ramp("network.latency", net.latency_good_ms, net.latency_bad_ms)?;
        check_ramp("network.loss", net.loss_good_pct, net.loss_bad_pct)?;
        if !net.jitter_threshold_ms.is_finite() || net.jitter_threshold_ms < 0.0 {
            return Err(RiskError::invalid_config(
                "network.jitter_threshold_ms",
                format!("must be a non-negative number, got {}", net.jitter_threshold_ms),
            ));
        }
        Ok(())
    }
}

/// Scores and penalties live on the 0-100 scale
fn check_points(field: &str, value: f64) -> RiskResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(RiskError::invalid_config(
            field,
            format!("must be within [0, 100], got {}", value),
        ));
    }
    Ok(())
}

fn check_ramp(field: &str, good: f64, bad: f64) -> RiskResult<()> {
    if !good.is_finite() || !bad.is_finite() || good < 0.0 || good >= bad {
        return Err(RiskError::invalid_config(
            field,
            format!("good threshold {} must be non-negative and below bad threshold {}", good, bad),
        ));
    }
    Ok(())
}
