//! Environment Risk Scoring
//!
//! Fuses IP reputation, privacy leaks, fingerprint consistency, device
//! authenticity and network quality signals into one composite score, a
//! risk level and a prioritized remediation list.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod consistency;
pub mod engine;
pub mod errors;
pub mod models;
pub mod recommend;
pub mod report;
pub mod reporter;
pub mod scoring;

pub use aggregate::{RiskLevel, WeightTable};
pub use config::{EngineConfig, ScoringPolicy};
pub use engine::RiskEngine;
pub use errors::{RiskError, RiskResult};
pub use models::SignalBundle;
pub use report::RiskReport;
