//! Issue codes emitted by the scorers.
//!
//! Closed set: the recommendation table matches on these exhaustively, so a
//! new code cannot be added without deciding how it is remediated.

use crate::consistency::ConsistencyCheck;
use crate::models::{DeviceType, IpType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    // IP
    NonResidentialIp { ip_type: IpType },
    LowReputation { percentile: f64 },
    Blacklisted { ip: String },

    // Privacy
    DnsLeak,
    WebRtcLeak,
    PublicIpMismatch { declared: String, revealed: String },

    // Fingerprint
    Inconsistent { check: ConsistencyCheck, detail: String },
    NoFonts,
    AutomationDetected,

    // Device
    WebDriver,
    TouchMismatch { touch_points: u32, device_type: DeviceType },
    VirtualMachine,
    LowHardwareConcurrency { cores: u32 },

    // Network
    HighLatency { latency_ms: f64 },
    PacketLoss { loss_pct: f64 },
    HighJitter { jitter_ms: f64 },
    TargetUnreachable,
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueCode::NonResidentialIp { ip_type } => {
                write!(f, "{} IP detected, not a residential connection", ip_type)
            }
            IssueCode::LowReputation { percentile } => {
                write!(f, "IP reputation is low ({:.0}/100)", percentile)
            }
            IssueCode::Blacklisted { ip } => write!(f, "IP {} is on a blacklist", ip),
            IssueCode::DnsLeak => write!(f, "DNS requests leak outside the tunnel"),
            IssueCode::WebRtcLeak => write!(f, "WebRTC exposes the real IP address"),
            IssueCode::PublicIpMismatch { declared, revealed } => write!(
                f,
                "Public IP {} differs from WebRTC-revealed IP {}",
                declared, revealed
            ),
            IssueCode::Inconsistent { check, detail } => {
                write!(f, "Inconsistent {}: {}", check, detail)
            }
            IssueCode::NoFonts => write!(
                f,
                "No system fonts detected, typical of stripped or headless browsers"
            ),
            IssueCode::AutomationDetected => write!(f, "Browser automation detected"),
            IssueCode::WebDriver => write!(f, "WebDriver flag is set"),
            IssueCode::TouchMismatch {
                touch_points,
                device_type,
            } => write!(
                f,
                "{} touch point(s) reported on a {} device",
                touch_points, device_type
            ),
            IssueCode::VirtualMachine => write!(f, "Virtual machine environment detected"),
            IssueCode::LowHardwareConcurrency { cores } => {
                write!(f, "Only {} logical CPU core(s) reported", cores)
            }
            IssueCode::HighLatency { latency_ms } => {
                write!(f, "High latency to the target service ({:.0}ms)", latency_ms)
            }
            IssueCode::PacketLoss { loss_pct } => write!(f, "Packet loss of {:.1}%", loss_pct),
            IssueCode::HighJitter { jitter_ms } => {
                write!(f, "Unstable connection, jitter {:.0}ms", jitter_ms)
            }
            IssueCode::TargetUnreachable => write!(f, "Target service is unreachable"),
        }
    }
}
