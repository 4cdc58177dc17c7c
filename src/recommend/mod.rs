//! Recommendation Engine
//!
//! Turns scorer issues into a de-duplicated, prioritized remediation list.
//! Priority follows the score bucket of the module that raised the issue.
//!
//! One exception: a template raised by two modules moves one bucket up.
//! Only automation removal can be raised that way (the fingerprint
//! automation flag plus the device WebDriver flag). Neither penalty alone
//! drops its module below 40, yet together they must rank critical.

mod templates;

pub use templates::{template_for, TemplateId};

use crate::models::Module;
use crate::scoring::ModuleScore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// `< 40` critical, `< 60` high, `< 80` medium, otherwise low
    pub fn from_module_score(score: f64) -> Self {
        if score < 40.0 {
            Priority::Critical
        } else if score < 60.0 {
            Priority::High
        } else if score < 80.0 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// 0 for critical, increasing toward low
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// One bucket more severe; applied only to the two-module automation case
    fn escalate(self) -> Self {
        match self {
            Priority::Critical | Priority::High => Priority::Critical,
            Priority::Medium => Priority::High,
            Priority::Low => Priority::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: TemplateId,
    /// Originating module key, or `general`
    pub category: String,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub solution: String,
}

impl Recommendation {
    fn from_template(id: TemplateId, category: &str, priority: Priority, description: String) -> Self {
        let template = templates::template(id);
        Self {
            id,
            category: category.to_string(),
            priority,
            title: template.title.to_string(),
            description,
            solution: template.solution.to_string(),
        }
    }
}

struct Pending {
    id: TemplateId,
    origin: Module,
    modules: Vec<Module>,
    priority: Priority,
    description: String,
}

/// Map every issue to its template, one recommendation per template
pub fn recommend(scores: &[ModuleScore]) -> Vec<Recommendation> {
    let mut ordered: Vec<&ModuleScore> = scores.iter().collect();
    ordered.sort_by_key(|s| s.module);

    let mut pending: Vec<Pending> = Vec::new();
    for module_score in ordered {
        let priority = Priority::from_module_score(module_score.score);
        for issue in &module_score.issues {
            let id = template_for(issue);
            match pending.iter_mut().find(|p| p.id == id) {
                Some(existing) => {
                    if !existing.modules.contains(&module_score.module) {
                        existing.modules.push(module_score.module);
                    }
                    existing.priority = existing.priority.min(priority);
                }
                None => pending.push(Pending {
                    id,
                    origin: module_score.module,
                    modules: vec![module_score.module],
                    priority,
                    description: issue.to_string(),
                }),
            }
        }
    }

    if pending.is_empty() {
        return vec![Recommendation::from_template(
            TemplateId::MaintainConfiguration,
            "general",
            Priority::Low,
            "No risk indicators were detected in the collected signals".to_string(),
        )];
    }

    for entry in &mut pending {
        if entry.modules.len() > 1 {
            log::debug!(
                "{:?} corroborated by {:?}, escalating from {}",
                entry.id,
                entry.modules,
                entry.priority
            );
            entry.priority = entry.priority.escalate();
        }
    }

    // stable: equal keys keep first-seen issue order
    pending.sort_by_key(|p| (p.priority.rank(), p.origin));

    pending
        .into_iter()
        .map(|p| Recommendation::from_template(p.id, p.origin.key(), p.priority, p.description))
        .collect()
}
