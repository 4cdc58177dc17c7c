//! Risk Scoring Engine
//!
//! Wires the pipeline stages together. The engine holds only validated,
//! immutable configuration and compiled patterns, so one instance can be
//! shared freely across threads.

use crate::aggregate::aggregate;
use crate::config::EngineConfig;
use crate::consistency::ConsistencyAnalyzer;
use crate::errors::{RiskError, RiskResult};
use crate::models::SignalBundle;
use crate::recommend::recommend;
use crate::report::{build_report, RiskReport};
use crate::scoring;
use rayon::prelude::*;
use serde::Serialize;

pub struct RiskEngine {
    config: EngineConfig,
    analyzer: ConsistencyAnalyzer,
}

/// Result of one bundle in a batch run
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub index: usize,
    pub cache_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RiskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskEngine {
    /// Create an engine, rejecting invalid weights or penalties up front
    pub fn new(config: EngineConfig) -> RiskResult<Self> {
        config.validate()?;
        log::debug!("Risk engine configured with weights {:?}", config.weights);
        Ok(Self {
            config,
            analyzer: ConsistencyAnalyzer::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one bundle into a report.
    ///
    /// Fails with `InsufficientSignal` when no module was collected and with
    /// `InvalidSignal` when a field is out of range.
    pub fn assess(&self, bundle: &SignalBundle) -> RiskResult<RiskReport> {
        if bundle.is_empty() {
            return Err(RiskError::InsufficientSignal);
        }
        bundle.validate()?;

        let findings = self.analyzer.analyze(bundle);
        log::debug!(
            "{} consistency finding(s), {} mismatched",
            findings.len(),
            findings.iter().filter(|f| f.mismatched).count()
        );

        let scores = scoring::score_all(bundle, &findings, &self.config.policy);
        for s in &scores {
            log::debug!("{} score {:.2} with {} issue(s)", s.module, s.score, s.issues.len());
        }

        let (overall, level) = aggregate(&scores, &self.config.weights)?;
        let recommendations = recommend(&scores);

        build_report(bundle, overall, level, &scores, findings, recommendations)
    }

    /// Assess independent bundles in parallel, preserving input order
    pub fn assess_batch(&self, bundles: &[SignalBundle]) -> Vec<BatchOutcome> {
        bundles
            .par_iter()
            .enumerate()
            .map(|(index, bundle)| {
                let cache_key = bundle.cache_key();
                match self.assess(bundle) {
                    Ok(report) => BatchOutcome {
                        index,
                        cache_key,
                        report: Some(report),
                        error: None,
                    },
                    Err(e) => {
                        log::warn!("Bundle {} could not be assessed: {}", index, e);
                        BatchOutcome {
                            index,
                            cache_key,
                            report: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            analyzer: ConsistencyAnalyzer::new(),
        }
    }
}
