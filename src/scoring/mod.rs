//! Module Scorers
//!
//! One scorer per detection module. Each maps its slice of the bundle to a
//! 0-100 score (higher = safer) plus the issues that cost it points. A
//! scorer whose slice is absent returns `None`: the module is left out of
//! aggregation entirely rather than scored as neutral.

pub mod device;
pub mod fingerprint;
pub mod ip;
mod issues;
pub mod network;
pub mod privacy;

pub use issues::IssueCode;

use crate::config::ScoringPolicy;
use crate::consistency::ConsistencyFinding;
use crate::models::{Module, SignalBundle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleScore {
    pub module: Module,
    pub score: f64,
    pub issues: Vec<IssueCode>,
}

impl ModuleScore {
    /// Clamps the computed score into [0, 100]
    pub fn new(module: Module, raw_score: f64, issues: Vec<IssueCode>) -> Self {
        Self {
            module,
            score: raw_score.clamp(0.0, 100.0),
            issues,
        }
    }
}

/// Run every scorer, keeping module order and skipping absent slices
pub fn score_all(
    bundle: &SignalBundle,
    findings: &[ConsistencyFinding],
    policy: &ScoringPolicy,
) -> Vec<ModuleScore> {
    [
        ip::score(bundle.ip.as_ref(), &policy.ip),
        privacy::score(bundle.privacy.as_ref(), &policy.privacy),
        fingerprint::score(bundle.fingerprint.as_ref(), findings, &policy.fingerprint),
        device::score(bundle.device.as_ref(), &policy.device),
        network::score(bundle.network.as_ref(), &policy.network),
    ]
    .into_iter()
    .flatten()
    .collect()
}
