//! Browser fingerprint scoring

use super::{IssueCode, ModuleScore};
use crate::config::FingerprintPolicy;
use crate::consistency::ConsistencyFinding;
use crate::models::{FingerprintSignals, Module};

/// Start at 100; each mismatched finding costs `severity * mismatch_scale`
pub fn score(
    fp: Option<&FingerprintSignals>,
    findings: &[ConsistencyFinding],
    policy: &FingerprintPolicy,
) -> Option<ModuleScore> {
    let fp = fp?;
    let mut issues = Vec::new();
    let mut score = 100.0;

    for finding in findings.iter().filter(|f| f.mismatched) {
        score -= finding.severity * policy.mismatch_scale;
        issues.push(IssueCode::Inconsistent {
            check: finding.check,
            detail: finding.detail.clone(),
        });
    }

    if fp.fonts.as_ref().is_some_and(|fonts| fonts.is_empty()) {
        score -= policy.no_fonts_penalty;
        issues.push(IssueCode::NoFonts);
    }

    if fp.automation_detected {
        score -= policy.automation_penalty;
        issues.push(IssueCode::AutomationDetected);
    }

    Some(ModuleScore::new(Module::Fingerprint, score, issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::ConsistencyCheck;
    use crate::models::DeviceType;
    use std::collections::BTreeSet;

    fn signals() -> FingerprintSignals {
        FingerprintSignals {
            user_agent: String::new(),
            platform: String::new(),
            language: String::new(),
            timezone: String::new(),
            screen_resolution: String::new(),
            pixel_ratio: None,
            fonts: Some(BTreeSet::from(["Arial".to_string()])),
            automation_detected: false,
            max_touch_points: 0,
            device_type_hint: DeviceType::Unknown,
        }
    }

    fn finding(check: ConsistencyCheck, mismatched: bool) -> ConsistencyFinding {
        ConsistencyFinding {
            check,
            mismatched,
            severity: check.severity(),
            detail: String::new(),
        }
    }

    #[test]
    fn test_only_mismatched_findings_cost_points() {
        let findings = vec![
            finding(ConsistencyCheck::OsUserAgent, false),
            finding(ConsistencyCheck::ResolutionDeviceType, true),
            finding(ConsistencyCheck::TimezoneGeo, true),
        ];
        let result = score(Some(&signals()), &findings, &FingerprintPolicy::default()).unwrap();
        // 100 - 0.5*40 - 0.6*40
        assert!((result.score - 56.0).abs() < 1e-9);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_empty_fonts_and_automation() {
        let mut fp = signals();
        fp.fonts = Some(BTreeSet::new());
        fp.automation_detected = true;
        let result = score(Some(&fp), &[], &FingerprintPolicy::default()).unwrap();
        assert_eq!(result.score, 65.0);
        assert_eq!(result.issues, vec![IssueCode::NoFonts, IssueCode::AutomationDetected]);
    }

    #[test]
    fn test_uncollected_fonts_are_not_penalized() {
        let mut fp = signals();
        fp.fonts = None;
        let result = score(Some(&fp), &[], &FingerprintPolicy::default()).unwrap();
        assert_eq!(result.score, 100.0);
    }
}
