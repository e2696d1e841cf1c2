//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::dataset::TrackerKind;
use crate::progress::{Adjustment, Progress, Severity};
use serde::{Deserialize, Serialize};

/// Width of the text progress bar, in cells
pub const BAR_WIDTH: usize = 20;

/// One tracker row: a quantity pair and its derived progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub kind: TrackerKind,
    pub name: String,
    pub current: f64,
    pub capacity: f64,
    pub remaining: f64,
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub adjustments: Vec<Adjustment>,
}

impl ProgressReport {
    pub fn new(
        kind: TrackerKind,
        name: String,
        current: f64,
        capacity: f64,
        remaining: f64,
        progress: Progress,
    ) -> Self {
        ProgressReport {
            kind,
            name,
            current,
            capacity,
            remaining,
            percent: progress.percent,
            severity: progress.severity,
            adjustments: progress.adjustments,
        }
    }
}

/// Segment filter over stock severity (the All / Critical / Low / Healthy tabs)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityFilter {
    #[default]
    All,
    Critical,
    Low,
    Healthy,
}

impl SeverityFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityFilter::All => "all",
            SeverityFilter::Critical => "critical",
            SeverityFilter::Low => "low",
            SeverityFilter::Healthy => "healthy",
        }
    }

    /// Rows without a severity (leave, campaigns) only pass `All`
    pub fn matches(&self, report: &ProgressReport) -> bool {
        let wanted = match self {
            SeverityFilter::All => return true,
            SeverityFilter::Critical => Severity::Critical,
            SeverityFilter::Low => Severity::Low,
            SeverityFilter::Healthy => Severity::Healthy,
        };
        report.severity == Some(wanted)
    }
}

/// Keep only the rows matching a filter
pub fn filter_reports(reports: Vec<ProgressReport>, filter: SeverityFilter) -> Vec<ProgressReport> {
    reports.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Sort reports deterministically
pub fn sort_reports(mut reports: Vec<ProgressReport>) -> Vec<ProgressReport> {
    reports.sort_by(|a, b| {
        // 1. Tracker kind (stock, leave, campaign)
        a.kind
            .cmp(&b.kind)
            // 2. Most severe first
            .then_with(|| a.severity.cmp(&b.severity))
            // 3. Least complete first
            .then_with(|| a.percent.cmp(&b.percent))
            // 4. Name ascending
            .then_with(|| a.name.cmp(&b.name))
    });
    reports
}

/// Render a fixed-width bar whose filled share equals `percent`
pub fn render_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = (percent * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Render reports as text output
pub fn render_text(reports: &[ProgressReport]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<9} {:<24} {:<22} {:>4} {:<9} {}\n",
        "KIND", "NAME", "PROGRESS", "PCT", "SEVERITY", "QUANTITY"
    ));

    for report in reports {
        let severity = report.severity.map(|s| s.as_str()).unwrap_or("-");
        let flag = if report.adjustments.is_empty() { "" } else { " !" };
        output.push_str(&format!(
            "{:<9} {:<24} {:<22} {:>3}% {:<9} {}/{}{}\n",
            report.kind.as_str(),
            truncate_or_pad(&report.name, 24),
            render_bar(report.percent, BAR_WIDTH),
            report.percent,
            severity,
            report.current,
            report.capacity,
            flag,
        ));
    }

    output
}

/// Render reports as JSON output
pub fn render_json(reports: &[ProgressReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
