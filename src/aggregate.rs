//! Aggregator
//!
//! Combines the module scores that exist into one composite score. Weights
//! of absent modules are dropped and the rest renormalized, so a missing
//! collector never drags the composite toward an invented neutral value.

use crate::errors::{RiskError, RiskResult};
use crate::models::Module;
use crate::scoring::ModuleScore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SUM_TOLERANCE: f64 = 1e-6;

/// Composite scores are snapped to this many units per point before they
/// are classified, absorbing the float drift of the weighted sum.
const SNAP_SCALE: f64 = 1e9;

/// Discretized bucket derived from a 0-100 score (higher score = safer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// `>= 80` low, `>= 60` medium, `>= 40` high, otherwise critical
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Low
        } else if score >= 60.0 {
            RiskLevel::Medium
        } else if score >= 40.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-module weights, validated to sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightTable {
    weights: [f64; 5],
}

impl WeightTable {
    /// Build from `(module, weight)` pairs; modules not listed weigh 0
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Module, f64)>) -> RiskResult<Self> {
        let mut weights = [0.0; 5];
        for (module, weight) in pairs {
            weights[module.index()] = weight;
        }
        let table = Self { weights };
        table.validate()?;
        Ok(table)
    }

    pub fn weight(&self, module: Module) -> f64 {
        self.weights[module.index()]
    }

    pub fn validate(&self) -> RiskResult<()> {
        for module in Module::ALL {
            let w = self.weight(module);
            if !w.is_finite() || w < 0.0 {
                return Err(RiskError::invalid_config(
                    format!("weights.{}", module.key()),
                    format!("weight must be a non-negative number, got {}", w),
                ));
            }
        }

        let sum: f64 = self.weights.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(RiskError::invalid_config(
                "weights",
                format!("weights must sum to 1.0, got {}", sum),
            ));
        }
        Ok(())
    }

    /// Weights of `present` rescaled to sum to 1.
    ///
    /// Empty when nothing is present or every present weight is zero.
    pub fn renormalized(&self, present: &[Module]) -> Vec<(Module, f64)> {
        let partial: f64 = present.iter().map(|m| self.weight(*m)).sum();
        if partial <= 0.0 {
            return Vec::new();
        }
        present
            .iter()
            .map(|m| (*m, self.weight(*m) / partial))
            .collect()
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: [0.30, 0.25, 0.20, 0.15, 0.10],
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightTable {
    type Error = RiskError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut pairs = Vec::with_capacity(map.len());
        for (key, weight) in map {
            let module = Module::from_key(&key).ok_or_else(|| {
                RiskError::invalid_config(format!("weights.{}", key), "unknown module")
            })?;
            pairs.push((module, weight));
        }
        Self::from_pairs(pairs)
    }
}

impl From<WeightTable> for BTreeMap<String, f64> {
    fn from(table: WeightTable) -> Self {
        Module::ALL
            .into_iter()
            .map(|m| (m.key().to_string(), table.weight(m)))
            .collect()
    }
}

/// Weighted average of the present module scores and its risk level
pub fn aggregate(scores: &[ModuleScore], weights: &WeightTable) -> RiskResult<(f64, RiskLevel)> {
    let present: Vec<Module> = scores.iter().map(|s| s.module).collect();
    let normalized = weights.renormalized(&present);
    if normalized.is_empty() {
        return Err(RiskError::InsufficientSignal);
    }

    let weighted: f64 = scores
        .iter()
        .zip(normalized.iter())
        .map(|(score, (_, weight))| score.score * weight)
        .sum();
    let overall = snap(weighted).clamp(0.0, 100.0);

    log::debug!(
        "aggregated {} module(s) into {:.3}",
        scores.len(),
        overall
    );
    Ok((overall, RiskLevel::from_score(overall)))
}

/// Round away sub-nanopoint error so exact bucket edges classify as written
fn snap(value: f64) -> f64 {
    (value * SNAP_SCALE).round() / SNAP_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(module: Module, value: f64) -> ModuleScore {
        ModuleScore {
            module,
            score: value,
            issues: Vec::new(),
        }
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(79.999), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(59.999), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(39.999), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Critical);
    }

    #[test]
    fn test_renormalized_subsets_sum_to_one() {
        let table = WeightTable::default();
        // every non-empty subset of the five modules
        for mask in 1u32..32 {
            let subset: Vec<Module> = Module::ALL
                .into_iter()
                .filter(|m| mask & (1 << m.index()) != 0)
                .collect();
            let sum: f64 = table.renormalized(&subset).iter().map(|(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-9, "subset {:?} sums to {}", subset, sum);
        }
    }

    #[test]
    fn test_aggregate_renormalizes_over_present() {
        let table = WeightTable::default();
        let scores = vec![score(Module::Ip, 90.0), score(Module::Device, 50.0)];
        let (overall, level) = aggregate(&scores, &table).unwrap();
        // 0.30 / 0.45 * 90 + 0.15 / 0.45 * 50
        assert!((overall - (60.0 + 50.0 / 3.0)).abs() < 1e-9);
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_perfect_scores_stay_at_100_for_every_subset() {
        let table = WeightTable::default();
        for mask in 1u32..32 {
            let scores: Vec<ModuleScore> = Module::ALL
                .into_iter()
                .filter(|m| mask & (1 << m.index()) != 0)
                .map(|m| score(m, 100.0))
                .collect();
            let (overall, level) = aggregate(&scores, &table).unwrap();
            assert_eq!(overall, 100.0, "mask {:05b}", mask);
            assert_eq!(level, RiskLevel::Low);
        }
    }

    #[test]
    fn test_exact_bucket_edges_across_modules() {
        let table = WeightTable::default();
        for (edge, expected) in [
            (80.0, RiskLevel::Low),
            (60.0, RiskLevel::Medium),
            (40.0, RiskLevel::High),
        ] {
            for mask in 1u32..32 {
                let scores: Vec<ModuleScore> = Module::ALL
                    .into_iter()
                    .filter(|m| mask & (1 << m.index()) != 0)
                    .map(|m| score(m, edge))
                    .collect();
                let (overall, level) = aggregate(&scores, &table).unwrap();
                assert_eq!(overall, edge, "edge {} mask {:05b}", edge, mask);
                assert_eq!(level, expected, "edge {} mask {:05b}", edge, mask);
            }
        }

        let (overall, level) = aggregate(
            &[score(Module::Ip, 79.999), score(Module::Network, 79.999)],
            &table,
        )
        .unwrap();
        assert!(overall < 80.0);
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_aggregate_empty_is_insufficient() {
        let table = WeightTable::default();
        assert!(matches!(
            aggregate(&[], &table),
            Err(RiskError::InsufficientSignal)
        ));
    }

    #[test]
    fn test_aggregate_zero_partial_weight_is_insufficient() {
        let table = WeightTable::from_pairs([
            (Module::Ip, 0.5),
            (Module::Privacy, 0.5),
        ])
        .unwrap();
        let scores = vec![score(Module::Network, 100.0)];
        assert!(matches!(
            aggregate(&scores, &table),
            Err(RiskError::InsufficientSignal)
        ));
    }

    #[test]
    fn test_weight_table_validation() {
        assert!(WeightTable::default().validate().is_ok());
        assert!(WeightTable::from_pairs([(Module::Ip, 0.5), (Module::Network, 0.4)]).is_err());
        assert!(WeightTable::from_pairs([(Module::Ip, 1.2), (Module::Network, -0.2)]).is_err());

        let mut map = BTreeMap::new();
        map.insert("ip".to_string(), 0.5);
        map.insert("geo".to_string(), 0.5);
        match WeightTable::try_from(map) {
            Err(RiskError::InvalidConfig { field, .. }) => assert_eq!(field, "weights.geo"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_weight_table_round_trips_through_map() {
        let json = r#"{"ip":0.4,"privacy":0.2,"fingerprint":0.2,"device":0.1,"network":0.1}"#;
        let table: WeightTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.weight(Module::Ip), 0.4);
        assert!(serde_json::from_str::<WeightTable>(r#"{"ip":0.9}"#).is_err());
    }
}
