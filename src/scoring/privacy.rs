//! Privacy leak scoring (DNS and WebRTC)

use super::{IssueCode, ModuleScore};
use crate::config::PrivacyPolicy;
use crate::models::{Module, PrivacySignals};
use std::net::IpAddr;

/// Start at 100, independent additive penalties per leak
pub fn score(privacy: Option<&PrivacySignals>, policy: &PrivacyPolicy) -> Option<ModuleScore> {
    let privacy = privacy?;
    let mut issues = Vec::new();
    let mut score = 100.0;

    if privacy.dns_leak {
        score -= policy.dns_leak_penalty;
        issues.push(IssueCode::DnsLeak);
    }

    if privacy.webrtc_leak {
        score -= policy.webrtc_leak_penalty;
        issues.push(IssueCode::WebRtcLeak);
    }

    if let (Some(declared), Some(revealed)) = (
        present(privacy.declared_ip.as_deref()),
        present(privacy.webrtc_revealed_ip.as_deref()),
    ) {
        if !same_address(declared, revealed) {
            score -= policy.ip_mismatch_penalty;
            issues.push(IssueCode::PublicIpMismatch {
                declared: declared.to_string(),
                revealed: revealed.to_string(),
            });
        }
    }

    Some(ModuleScore::new(Module::Privacy, score, issues))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Compare parsed addresses so `::ffff:1.2.3.4`-style spellings don't differ
fn same_address(a: &str, b: &str) -> bool {
    match (a.parse::<IpAddr>(), b.parse::<IpAddr>()) {
        (Ok(a), Ok(b)) => canonical(a) == canonical(b),
        _ => a == b,
    }
}

fn canonical(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}
