//! Report Builder
//!
//! Pure assembly of the final [`RiskReport`]. Field names are the contract
//! with the presentation layer and must not change.

use crate::aggregate::RiskLevel;
use crate::consistency::ConsistencyFinding;
use crate::errors::{RiskError, RiskResult};
use crate::models::{FingerprintSignals, IpSignals, Module, SignalBundle};
use crate::recommend::{Priority, Recommendation};
use crate::scoring::ModuleScore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-module scores; only modules that were scored are present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_score: Option<f64>,
}

impl ScoreBreakdown {
    pub fn get(&self, module: Module) -> Option<f64> {
        match module {
            Module::Ip => self.ip_score,
            Module::Privacy => self.privacy_score,
            Module::Fingerprint => self.fingerprint_score,
            Module::Device => self.device_score,
            Module::Network => self.network_score,
        }
    }

    fn set(&mut self, module: Module, score: f64) {
        let slot = match module {
            Module::Ip => &mut self.ip_score,
            Module::Privacy => &mut self.privacy_score,
            Module::Fingerprint => &mut self.fingerprint_score,
            Module::Device => &mut self.device_score,
            Module::Network => &mut self.network_score,
        };
        *slot = Some(score);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub overall_score: f64,
    pub overall_risk_level: RiskLevel,
    pub score_breakdown: ScoreBreakdown,
    pub all_issues: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_result: Option<IpSignals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_result: Option<FingerprintSignals>,
    #[serde(default)]
    pub consistency_findings: Vec<ConsistencyFinding>,
}

/// Condensed view of a report for dashboards and CLI output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub critical_issues: usize,
    pub high_issues: usize,
    pub total_issues: usize,
    pub top_recommendation: Option<Recommendation>,
}

impl RiskReport {
    pub fn summary(&self) -> RiskSummary {
        let count = |priority: Priority| {
            self.recommendations
                .iter()
                .filter(|r| r.priority == priority)
                .count()
        };
        RiskSummary {
            overall_score: self.overall_score,
            risk_level: self.overall_risk_level,
            critical_issues: count(Priority::Critical),
            high_issues: count(Priority::High),
            total_issues: self.all_issues.len(),
            top_recommendation: self.recommendations.first().cloned(),
        }
    }
}

/// Assemble the report from the pipeline's stage outputs
pub fn build_report(
    bundle: &SignalBundle,
    overall_score: f64,
    overall_risk_level: RiskLevel,
    scores: &[ModuleScore],
    findings: Vec<ConsistencyFinding>,
    recommendations: Vec<Recommendation>,
) -> RiskResult<RiskReport> {
    if !(0.0..=100.0).contains(&overall_score) {
        return Err(RiskError::ScoreOutOfRange(overall_score));
    }

    let mut ordered: Vec<&ModuleScore> = scores.iter().collect();
    ordered.sort_by_key(|s| s.module);

    let mut score_breakdown = ScoreBreakdown::default();
    let mut all_issues = Vec::new();
    let mut seen = HashSet::new();

    for module_score in ordered {
        score_breakdown.set(module_score.module, module_score.score);
        for issue in &module_score.issues {
            let line = format!("[{}] {}", module_score.module.label(), issue);
            if seen.insert(line.clone()) {
                all_issues.push(line);
            }
        }
    }

    Ok(RiskReport {
        overall_score,
        overall_risk_level,
        score_breakdown,
        all_issues,
        recommendations,
        ip_result: bundle.ip.clone(),
        fingerprint_result: bundle.fingerprint.clone(),
        consistency_findings: findings,
    })
}
