use crate::aggregate::RiskLevel;
use crate::models::Module;
use crate::recommend::Priority;
use crate::report::RiskReport;
use console::style;
use std::fmt::Write;

/// Human-readable rendering of a report for terminals
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &RiskReport, cache_key: Option<&str>) -> String {
        let mut out = String::new();
        let summary = report.summary();

        let level = Self::styled_level(report.overall_risk_level);
        let _ = writeln!(
            out,
            "    {} Overall score {} {}",
            style("▶").cyan(),
            style(format!("{:.1}/100", report.overall_score)).bold(),
            level
        );
        if let Some(key) = cache_key {
            let _ = writeln!(out, "    {} Bundle key: {}", style("├─").dim(), style(key).dim());
        }

        let _ = writeln!(out, "    {} Module scores", style("├─").dim());
        for module in Module::ALL {
            match report.score_breakdown.get(module) {
                Some(score) => {
                    let _ = writeln!(
                        out,
                        "    {}    {:<12} {}",
                        style("│").dim(),
                        module.label(),
                        Self::styled_score(score)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "    {}    {:<12} {}",
                        style("│").dim(),
                        module.label(),
                        style("not collected").dim()
                    );
                }
            }
        }

        if !report.all_issues.is_empty() {
            let _ = writeln!(out, "    {} Issues ({})", style("├─").dim(), summary.total_issues);
            for issue in &report.all_issues {
                let _ = writeln!(out, "    {}    {} {}", style("│").dim(), style("⚠").yellow(), issue);
            }
        }

        let _ = writeln!(
            out,
            "    {} Recommendations ({} critical, {} high)",
            style("└─").dim(),
            summary.critical_issues,
            summary.high_issues
        );
        for rec in &report.recommendations {
            let _ = writeln!(
                out,
                "         {} {}",
                Self::styled_priority(rec.priority),
                style(&rec.title).bold()
            );
            let _ = writeln!(out, "            {}", rec.description);
            let _ = writeln!(out, "            {} {}", style("→").green(), rec.solution);
        }

        out
    }

    fn styled_level(level: RiskLevel) -> String {
        let label = level.as_str().to_uppercase();
        match level {
            RiskLevel::Low => style(label).green().bold().to_string(),
            RiskLevel::Medium => style(label).yellow().bold().to_string(),
            RiskLevel::High => style(label).color256(208).bold().to_string(),
            RiskLevel::Critical => style(label).red().bold().to_string(),
        }
    }

    fn styled_score(score: f64) -> String {
        let text = format!("{:.1}", score);
        match RiskLevel::from_score(score) {
            RiskLevel::Low => style(text).green().to_string(),
            RiskLevel::Medium => style(text).yellow().to_string(),
            RiskLevel::High => style(text).color256(208).to_string(),
            RiskLevel::Critical => style(text).red().to_string(),
        }
    }

    fn styled_priority(priority: Priority) -> String {
        let tag = format!("[{}]", priority.as_str().to_uppercase());
        match priority {
            Priority::Critical => style(tag).red().bold().to_string(),
            Priority::High => style(tag).color256(208).to_string(),
            Priority::Medium => style(tag).yellow().to_string(),
            Priority::Low => style(tag).cyan().to_string(),
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
