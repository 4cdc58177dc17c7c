//! Network quality scoring.
//!
//! Latency and loss come from probes outside the engine; this only maps the
//! measured numbers onto penalties.

use super::{IssueCode, ModuleScore};
use crate::config::NetworkPolicy;
use crate::models::{Module, NetworkSignals};

pub fn score(network: Option<&NetworkSignals>, policy: &NetworkPolicy) -> Option<ModuleScore> {
    let network = network?;
    let mut issues = Vec::new();
    let mut score = 100.0;

    let latency_penalty = ramp(
        network.latency_ms,
        policy.latency_good_ms,
        policy.latency_bad_ms,
        policy.latency_max_penalty,
    );
    if latency_penalty > 0.0 {
        score -= latency_penalty;
        issues.push(IssueCode::HighLatency {
            latency_ms: network.latency_ms,
        });
    }

    let loss_penalty = ramp(
        network.packet_loss_pct,
        policy.loss_good_pct,
        policy.loss_bad_pct,
        policy.loss_max_penalty,
    );
    if loss_penalty > 0.0 {
        score -= loss_penalty;
        issues.push(IssueCode::PacketLoss {
            loss_pct: network.packet_loss_pct,
        });
    }

    if let Some(jitter) = network.jitter_ms {
        if jitter > policy.jitter_threshold_ms {
            score -= policy.jitter_penalty;
            issues.push(IssueCode::HighJitter { jitter_ms: jitter });
        }
    }

    if network.target_reachable == Some(false) {
        score -= policy.unreachable_penalty;
        issues.push(IssueCode::TargetUnreachable);
    }

    Some(ModuleScore::new(Module::Network, score, issues))
}

/// 0 up to `good`, rising linearly to `max_penalty` at `bad` and beyond
fn ramp(value: f64, good: f64, bad: f64, max_penalty: f64) -> f64 {
    if value <= good {
        return 0.0;
    }
    max_penalty * ((value - good) / (bad - good)).min(1.0)
}
