//! Device authenticity scoring

use super::{IssueCode, ModuleScore};
use crate::config::DevicePolicy;
use crate::models::{DeviceSignals, DeviceType, Module};

pub fn score(device: Option<&DeviceSignals>, policy: &DevicePolicy) -> Option<ModuleScore> {
    let device = device?;
    let mut issues = Vec::new();
    let mut score = 100.0;

    if device.webdriver_flag {
        score -= policy.webdriver_penalty;
        issues.push(IssueCode::WebDriver);
    }

    if touch_inconsistent(device.declared_device_type, device.touch_points) {
        score -= policy.touch_mismatch_penalty;
        issues.push(IssueCode::TouchMismatch {
            touch_points: device.touch_points,
            device_type: device.declared_device_type,
        });
    }

    if device.virtual_machine {
        score -= policy.virtual_machine_penalty;
        issues.push(IssueCode::VirtualMachine);
    }

    if let Some(cores) = device.hardware_concurrency {
        if cores < policy.min_hardware_concurrency {
            score -= policy.low_concurrency_penalty;
            issues.push(IssueCode::LowHardwareConcurrency { cores });
        }
    }

    Some(ModuleScore::new(Module::Device, score, issues))
}

/// Desktops have no touch screen; phones and tablets always do.
/// Convertibles legitimately go either way.
fn touch_inconsistent(device_type: DeviceType, touch_points: u32) -> bool {
    match device_type {
        DeviceType::Desktop => touch_points > 0,
        DeviceType::Mobile | DeviceType::Tablet => touch_points == 0,
        DeviceType::Convertible | DeviceType::Unknown | DeviceType::Unrecognized => false,
    }
}
