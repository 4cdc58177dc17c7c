use envrisk::aggregate::{aggregate, RiskLevel, WeightTable};
use envrisk::models::{
    DeviceSignals, DeviceType, FingerprintSignals, IpSignals, IpType, Module, NetworkSignals,
    PrivacySignals, SignalBundle,
};
use envrisk::recommend::{Priority, TemplateId};
use envrisk::scoring::ModuleScore;
use envrisk::{EngineConfig, RiskEngine, RiskError};
use std::collections::{BTreeSet, HashSet};
use std::io::Write;

fn ip(ip_type: IpType, percentile: f64) -> IpSignals {
    IpSignals {
        ip: "203.0.113.50".to_string(),
        country: "US".to_string(),
        city: "Denver".to_string(),
        isp: "Example Cable".to_string(),
        ip_type,
        reputation_percentile: percentile,
        blacklisted: false,
    }
}

fn clean_fingerprint() -> FingerprintSignals {
    FingerprintSignals {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0"
            .to_string(),
        platform: "Win32".to_string(),
        language: "en-US".to_string(),
        timezone: "America/Denver".to_string(),
        screen_resolution: "1920x1080".to_string(),
        pixel_ratio: Some(1.0),
        fonts: Some(BTreeSet::from(["Arial".to_string(), "Segoe UI".to_string()])),
        automation_detected: false,
        max_touch_points: 0,
        device_type_hint: DeviceType::Desktop,
    }
}

fn clean_device() -> DeviceSignals {
    DeviceSignals {
        webdriver_flag: false,
        touch_points: 0,
        declared_device_type: DeviceType::Desktop,
        virtual_machine: false,
        hardware_concurrency: Some(8),
    }
}

fn clean_bundle() -> SignalBundle {
    SignalBundle {
        ip: Some(ip(IpType::Residential, 95.0)),
        privacy: Some(PrivacySignals {
            dns_leak: false,
            webrtc_leak: false,
            declared_ip: None,
            webrtc_revealed_ip: None,
        }),
        fingerprint: Some(clean_fingerprint()),
        device: Some(clean_device()),
        network: Some(NetworkSignals {
            latency_ms: 40.0,
            packet_loss_pct: 0.0,
            jitter_ms: Some(5.0),
            target_reachable: Some(true),
        }),
    }
}

#[test]
fn empty_bundle_is_insufficient_signal() {
    let result = RiskEngine::default().assess(&SignalBundle::default());
    assert!(matches!(result, Err(RiskError::InsufficientSignal)));
}

#[test]
fn out_of_range_percentile_is_rejected() {
    let bundle = SignalBundle {
        ip: Some(ip(IpType::Residential, 140.0)),
        ..Default::default()
    };
    match RiskEngine::default().assess(&bundle) {
        Err(RiskError::InvalidSignal { field, .. }) => assert_eq!(field, "ip.reputation_percentile"),
        other => panic!("expected InvalidSignal, got {:?}", other),
    }
}

#[test]
fn clean_residential_ip_alone() {
    let bundle = SignalBundle {
        ip: Some(ip(IpType::Residential, 95.0)),
        ..Default::default()
    };
    let report = RiskEngine::default().assess(&bundle).unwrap();

    assert!((report.overall_score - 88.5).abs() < 1e-9);
    assert_eq!(report.overall_risk_level, RiskLevel::Low);
    assert!((report.score_breakdown.ip_score.unwrap() - 88.5).abs() < 1e-9);
    assert_eq!(report.score_breakdown.privacy_score, None);
    assert!(report.all_issues.is_empty());
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].id, TemplateId::MaintainConfiguration);
}

#[test]
fn clean_full_bundle_scores_low_risk() {
    let report = RiskEngine::default().assess(&clean_bundle()).unwrap();
    assert_eq!(report.overall_risk_level, RiskLevel::Low);
    assert!(report.consistency_findings.iter().all(|f| !f.mismatched));
    assert!(report.all_issues.is_empty());
    for module in Module::ALL {
        assert!(report.score_breakdown.get(module).is_some(), "{} missing", module);
    }
}

#[test]
fn webdriver_and_automation_yield_critical_automation_fix() {
    let mut fingerprint = clean_fingerprint();
    fingerprint.automation_detected = true;
    let mut device = clean_device();
    device.webdriver_flag = true;

    let bundle = SignalBundle {
        fingerprint: Some(fingerprint),
        device: Some(device),
        ..Default::default()
    };
    let report = RiskEngine::default().assess(&bundle).unwrap();

    let automation: Vec<_> = report
        .recommendations
        .iter()
        .filter(|r| r.id == TemplateId::RemoveAutomation)
        .collect();
    assert_eq!(automation.len(), 1);
    assert_eq!(automation[0].priority, Priority::Critical);
    assert_eq!(report.recommendations[0].id, TemplateId::RemoveAutomation);
}

#[test]
fn iphone_user_agent_on_desktop_resolution() {
    let fingerprint = FingerprintSignals {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148"
            .to_string(),
        platform: "iPhone".to_string(),
        language: String::new(),
        timezone: String::new(),
        screen_resolution: "1920x1080".to_string(),
        pixel_ratio: None,
        fonts: None,
        automation_detected: false,
        max_touch_points: 5,
        device_type_hint: DeviceType::Desktop,
    };
    let bundle = SignalBundle {
        fingerprint: Some(fingerprint),
        ..Default::default()
    };
    let report = RiskEngine::default().assess(&bundle).unwrap();

    assert_eq!(report.score_breakdown.fingerprint_score, Some(80.0));
    let mismatched: Vec<_> = report
        .consistency_findings
        .iter()
        .filter(|f| f.mismatched)
        .collect();
    assert_eq!(mismatched.len(), 1);
    assert!(report.all_issues[0].starts_with("[Fingerprint]"));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.id == TemplateId::AlignDisplayProfile));
}

#[test]
fn worse_signals_never_raise_the_score() {
    let engine = RiskEngine::default();
    let baseline = engine.assess(&clean_bundle()).unwrap().overall_score;

    let mut worse = clean_bundle();
    if let Some(privacy) = worse.privacy.as_mut() {
        privacy.dns_leak = true;
    }
    let after_leak = engine.assess(&worse).unwrap().overall_score;
    assert!(after_leak <= baseline);

    if let Some(net) = worse.network.as_mut() {
        net.latency_ms = 800.0;
        net.packet_loss_pct = 6.0;
    }
    let after_network = engine.assess(&worse).unwrap().overall_score;
    assert!(after_network <= after_leak);

    if let Some(ip) = worse.ip.as_mut() {
        ip.ip_type = IpType::Datacenter;
        ip.blacklisted = true;
    }
    let after_ip = engine.assess(&worse).unwrap().overall_score;
    assert!(after_ip <= after_network);
}

#[test]
fn renormalized_weights_sum_to_one_for_every_subset() {
    let weights = WeightTable::default();
    for mask in 1u32..32 {
        let present: Vec<Module> = Module::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, m)| m)
            .collect();
        let total: f64 = weights.renormalized(&present).iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9, "mask {:05b} sums to {}", mask, total);
    }
}

#[test]
fn level_boundaries() {
    let weights = WeightTable::default();
    let cases = [
        (80.0, RiskLevel::Low),
        (79.999, RiskLevel::Medium),
        (60.0, RiskLevel::Medium),
        (59.999, RiskLevel::High),
        (40.0, RiskLevel::High),
        (39.999, RiskLevel::Critical),
        (0.0, RiskLevel::Critical),
    ];
    for (score, expected) in cases {
        let scores = [ModuleScore::new(Module::Network, score, Vec::new())];
        let (overall, level) = aggregate(&scores, &weights).unwrap();
        assert!((overall - score).abs() < 1e-9);
        assert_eq!(level, expected, "score {}", score);
    }
}

#[test]
fn multi_module_composite_on_bucket_edge() {
    let engine = RiskEngine::default();

    // unknown IP at full reputation and a fully ramped latency both score 60
    let medium = SignalBundle {
        ip: Some(ip(IpType::Unknown, 100.0)),
        network: Some(NetworkSignals {
            latency_ms: 1000.0,
            packet_loss_pct: 0.0,
            jitter_ms: None,
            target_reachable: None,
        }),
        ..Default::default()
    };
    let report = engine.assess(&medium).unwrap();
    assert_eq!(report.overall_score, 60.0);
    assert_eq!(report.overall_risk_level, RiskLevel::Medium);

    // three modules each landing on 40
    let high = SignalBundle {
        ip: Some(ip(IpType::Datacenter, 50.0)),
        privacy: Some(PrivacySignals {
            dns_leak: false,
            webrtc_leak: true,
            declared_ip: Some("203.0.113.50".to_string()),
            webrtc_revealed_ip: Some("192.0.2.9".to_string()),
        }),
        device: Some(DeviceSignals {
            webdriver_flag: true,
            hardware_concurrency: Some(1),
            ..clean_device()
        }),
        ..Default::default()
    };
    let report = engine.assess(&high).unwrap();
    assert_eq!(report.overall_score, 40.0);
    assert_eq!(report.overall_risk_level, RiskLevel::High);
}

#[test]
fn perfect_modules_report_100_for_every_subset() {
    let mut config = EngineConfig::default();
    config.policy.ip.residential_base = 100.0;
    let engine = RiskEngine::new(config).unwrap();

    let mut full = clean_bundle();
    full.ip = Some(ip(IpType::Residential, 100.0));

    for mask in 1u32..32 {
        let keep = |m: Module| mask & (1 << m.index()) != 0;
        let bundle = SignalBundle {
            ip: full.ip.clone().filter(|_| keep(Module::Ip)),
            privacy: full.privacy.clone().filter(|_| keep(Module::Privacy)),
            fingerprint: full.fingerprint.clone().filter(|_| keep(Module::Fingerprint)),
            device: full.device.clone().filter(|_| keep(Module::Device)),
            network: full.network.clone().filter(|_| keep(Module::Network)),
        };
        let report = engine
            .assess(&bundle)
            .unwrap_or_else(|e| panic!("mask {:05b}: {}", mask, e));
        assert_eq!(report.overall_score, 100.0, "mask {:05b}", mask);
        assert_eq!(report.overall_risk_level, RiskLevel::Low);
    }
}

#[test]
fn assessment_is_idempotent() {
    let engine = RiskEngine::default();
    let mut bundle = clean_bundle();
    if let Some(privacy) = bundle.privacy.as_mut() {
        privacy.webrtc_leak = true;
    }
    let first = engine.assess(&bundle).unwrap();
    let second = engine.assess(&bundle).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn recommendations_have_unique_templates() {
    let bundle = SignalBundle {
        ip: Some(IpSignals {
            blacklisted: true,
            ..ip(IpType::Proxy, 10.0)
        }),
        privacy: Some(PrivacySignals {
            dns_leak: true,
            webrtc_leak: true,
            declared_ip: Some("203.0.113.50".to_string()),
            webrtc_revealed_ip: Some("192.0.2.9".to_string()),
        }),
        fingerprint: Some(FingerprintSignals {
            automation_detected: true,
            fonts: Some(BTreeSet::new()),
            language: "ja-JP".to_string(),
            timezone: "Asia/Tokyo".to_string(),
            ..clean_fingerprint()
        }),
        device: Some(DeviceSignals {
            webdriver_flag: true,
            virtual_machine: true,
            hardware_concurrency: Some(1),
            touch_points: 10,
            ..clean_device()
        }),
        network: Some(NetworkSignals {
            latency_ms: 1500.0,
            packet_loss_pct: 20.0,
            jitter_ms: Some(120.0),
            target_reachable: Some(false),
        }),
    };
    let report = RiskEngine::default().assess(&bundle).unwrap();

    let ids: HashSet<TemplateId> = report.recommendations.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), report.recommendations.len());
    assert_eq!(report.overall_risk_level, RiskLevel::Critical);
    assert!(!ids.contains(&TemplateId::MaintainConfiguration));

    let ranks: Vec<u8> = report.recommendations.iter().map(|r| r.priority.rank()).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn engine_from_toml_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[weights]
ip = 0.5
privacy = 0.5
fingerprint = 0.0
device = 0.0
network = 0.0

[policy.ip]
blacklist_penalty = 40.0
"#
    )
    .unwrap();

    let config = EngineConfig::from_file(file.path()).unwrap();
    let engine = RiskEngine::new(config).unwrap();

    let bundle = SignalBundle {
        ip: Some(IpSignals {
            blacklisted: true,
            ..ip(IpType::Residential, 100.0)
        }),
        network: Some(NetworkSignals {
            latency_ms: 2000.0,
            packet_loss_pct: 50.0,
            jitter_ms: None,
            target_reachable: Some(false),
        }),
        ..Default::default()
    };
    let report = engine.assess(&bundle).unwrap();

    // network carries zero weight, so only IP contributes
    assert!((report.overall_score - 50.0).abs() < 1e-9);
    assert_eq!(report.score_breakdown.network_score, Some(0.0));
}

#[test]
fn batch_outcomes_serialize_with_cache_keys() {
    let engine = RiskEngine::default();
    let outcomes = engine.assess_batch(&[clean_bundle(), SignalBundle::default()]);
    let json = serde_json::to_value(&outcomes).unwrap();

    assert_eq!(json[0]["index"], 0);
    assert_eq!(json[0]["cache_key"].as_str().unwrap().len(), 64);
    assert!(json[0]["report"]["overall_score"].is_number());
    assert!(json[0].get("error").is_none());
    assert!(json[1]["error"].is_string());
    assert!(json[1].get("report").is_none());
}
