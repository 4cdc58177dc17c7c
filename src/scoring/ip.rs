//! IP reputation scoring

use super::{IssueCode, ModuleScore};
use crate::config::IpPolicy;
use crate::models::{IpSignals, Module};

/// Base score by connection type, minus reputation and blacklist penalties
pub fn score(ip: Option<&IpSignals>, policy: &IpPolicy) -> Option<ModuleScore> {
    let ip = ip?;
    let mut issues = Vec::new();
    let mut score = policy.base_score(ip.ip_type);

    if ip.ip_type.is_non_residential() {
        issues.push(IssueCode::NonResidentialIp {
            ip_type: ip.ip_type,
        });
    }

    score -= (100.0 - ip.reputation_percentile) * policy.reputation_scale;
    if ip.reputation_percentile < policy.reputation_issue_below {
        issues.push(IssueCode::LowReputation {
            percentile: ip.reputation_percentile,
        });
    }

    if ip.blacklisted {
        score -= policy.blacklist_penalty;
        issues.push(IssueCode::Blacklisted { ip: ip.ip.clone() });
    }

    Some(ModuleScore::new(Module::Ip, score, issues))
}
