//! Remediation templates.

use crate::scoring::IssueCode;
use serde::{Deserialize, Serialize};

/// Dedup key for recommendations: one entry per template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    UseResidentialIp,
    ImproveIpReputation,
    ReplaceBlacklistedIp,
    FixDnsLeak,
    FixWebRtcLeak,
    AlignUserAgent,
    AlignDisplayProfile,
    AlignLanguage,
    AlignTimezone,
    RestoreFonts,
    RemoveAutomation,
    AlignDeviceProfile,
    AvoidVirtualMachine,
    ReduceLatency,
    StabilizeConnection,
    RestoreConnectivity,
    MaintainConfiguration,
}

pub struct Template {
    pub title: &'static str,
    pub solution: &'static str,
}

/// Which template remediates an issue
pub fn template_for(issue: &IssueCode) -> TemplateId {
    use crate::consistency::ConsistencyCheck;

    match issue {
        IssueCode::NonResidentialIp { .. } => TemplateId::UseResidentialIp,
        IssueCode::LowReputation { .. } => TemplateId::ImproveIpReputation,
        IssueCode::Blacklisted { .. } => TemplateId::ReplaceBlacklistedIp,
        IssueCode::DnsLeak => TemplateId::FixDnsLeak,
        IssueCode::WebRtcLeak | IssueCode::PublicIpMismatch { .. } => TemplateId::FixWebRtcLeak,
        IssueCode::Inconsistent { check, .. } => match check {
            ConsistencyCheck::OsUserAgent => TemplateId::AlignUserAgent,
            ConsistencyCheck::ResolutionDeviceType | ConsistencyCheck::PixelRatioDeviceType => {
                TemplateId::AlignDisplayProfile
            }
            ConsistencyCheck::LanguageGeo => TemplateId::AlignLanguage,
            ConsistencyCheck::TimezoneGeo => TemplateId::AlignTimezone,
        },
        IssueCode::NoFonts => TemplateId::RestoreFonts,
        IssueCode::AutomationDetected | IssueCode::WebDriver => TemplateId::RemoveAutomation,
        IssueCode::TouchMismatch { .. } | IssueCode::LowHardwareConcurrency { .. } => {
            TemplateId::AlignDeviceProfile
        }
        IssueCode::VirtualMachine => TemplateId::AvoidVirtualMachine,
        IssueCode::HighLatency { .. } => TemplateId::ReduceLatency,
        IssueCode::PacketLoss { .. } | IssueCode::HighJitter { .. } => {
            TemplateId::StabilizeConnection
        }
        IssueCode::TargetUnreachable => TemplateId::RestoreConnectivity,
    }
}

pub fn template(id: TemplateId) -> Template {
    match id {
        TemplateId::UseResidentialIp => Template {
            title: "Switch to a residential IP",
            solution: "Use a residential or mobile (4G/5G) connection instead of VPN, proxy or datacenter exits",
        },
        TemplateId::ImproveIpReputation => Template {
            title: "IP reputation is too low",
            solution: "Change the IP address or VPN node and avoid shared exit IPs",
        },
        TemplateId::ReplaceBlacklistedIp => Template {
            title: "Replace the blacklisted IP",
            solution: "Stop using this IP immediately and request a clean address from the provider",
        },
        TemplateId::FixDnsLeak => Template {
            title: "Fix the DNS leak",
            solution: "Enable DNS leak protection in the VPN client or point the resolver at the VPN's DNS servers",
        },
        TemplateId::FixWebRtcLeak => Template {
            title: "Fix the WebRTC leak",
            solution: "Disable WebRTC in the browser or install a WebRTC leak protection extension",
        },
        TemplateId::AlignUserAgent => Template {
            title: "Match the User-Agent to the operating system",
            solution: "Use a User-Agent that matches the real platform, or spoof both consistently",
        },
        TemplateId::AlignDisplayProfile => Template {
            title: "Match the display to the device type",
            solution: "Use a screen resolution and pixel ratio typical for the declared device",
        },
        TemplateId::AlignLanguage => Template {
            title: "Match the browser language to the IP location",
            solution: "Set the browser language to one commonly used in the IP's country",
        },
        TemplateId::AlignTimezone => Template {
            title: "Match the timezone to the IP location",
            solution: "Set the system timezone to the one of the IP's location",
        },
        TemplateId::RestoreFonts => Template {
            title: "Restore a normal font set",
            solution: "Run a regular desktop browser profile with the operating system's default fonts installed",
        },
        TemplateId::RemoveAutomation => Template {
            title: "Stop using browser automation",
            solution: "Use a normal, manually driven browser; automation frameworks expose navigator.webdriver",
        },
        TemplateId::AlignDeviceProfile => Template {
            title: "Make the device profile consistent",
            solution: "Ensure touch support and hardware characteristics match the declared device type",
        },
        TemplateId::AvoidVirtualMachine => Template {
            title: "Avoid virtual machines",
            solution: "Use a physical machine or a virtualization setup that does not expose VM artifacts",
        },
        TemplateId::ReduceLatency => Template {
            title: "Latency is too high",
            solution: "Choose a VPN node or route geographically closer to the target service",
        },
        TemplateId::StabilizeConnection => Template {
            title: "Connection is unstable",
            solution: "Switch to a more stable network or VPN protocol to reduce loss and jitter",
        },
        TemplateId::RestoreConnectivity => Template {
            title: "Target service is unreachable",
            solution: "Check the VPN connection and try another node or protocol",
        },
        TemplateId::MaintainConfiguration => Template {
            title: "Keep the current configuration",
            solution: "Re-run the check periodically and avoid frequent fingerprint changes",
        },
    }
}
