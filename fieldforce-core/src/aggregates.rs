//! Aggregation views for the dashboard cards
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never stored, always computed)
//! - No modification of report rows

use crate::dataset::TrackerKind;
use crate::progress::{compute_unbanded_progress, Severity};
use crate::report::ProgressReport;
use serde::{Deserialize, Serialize};

/// Number of stock rows in each severity band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub low: usize,
    pub healthy: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.low + self.healthy
    }
}

/// Leave days summed across all leave types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTotals {
    pub used: f64,
    pub total: f64,
    pub remaining: f64,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTotals {
    pub count: usize,
    pub mean_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub stock: SeverityCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave: Option<LeaveTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaigns: Option<CampaignTotals>,
}

/// Compute a summary from evaluated reports
pub fn summarize(reports: &[ProgressReport]) -> Summary {
    let mut stock = SeverityCounts::default();
    let mut leave_rows = 0usize;
    let (mut used, mut total, mut remaining) = (0.0, 0.0, 0.0);
    let mut campaign_percents: Vec<u8> = Vec::new();

    for report in reports {
        match report.kind {
            TrackerKind::Stock => match report.severity {
                Some(Severity::Critical) => stock.critical += 1,
                Some(Severity::Low) => stock.low += 1,
                Some(Severity::Healthy) => stock.healthy += 1,
                None => {}
            },
            TrackerKind::Leave => {
                leave_rows += 1;
                used += report.current;
                total += report.capacity;
                remaining += report.remaining;
            }
            TrackerKind::Campaign => campaign_percents.push(report.percent),
        }
    }

    let leave = (leave_rows > 0).then(|| LeaveTotals {
        used,
        total,
        remaining,
        percent: compute_unbanded_progress(used, total).percent,
    });

    let campaigns = (!campaign_percents.is_empty()).then(|| {
        let sum: usize = campaign_percents.iter().map(|p| usize::from(*p)).sum();
        let count = campaign_percents.len();
        CampaignTotals {
            count,
            mean_percent: ((sum as f64) / (count as f64)).round() as u8,
        }
    });

    Summary {
        stock,
        leave,
        campaigns,
    }
}

/// Render a summary as text output
pub fn render_summary_text(summary: &Summary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Stock:     {} products ({} critical, {} low, {} healthy)\n",
        summary.stock.total(),
        summary.stock.critical,
        summary.stock.low,
        summary.stock.healthy
    ));

    if let Some(ref leave) = summary.leave {
        output.push_str(&format!(
            "Leave:     {}/{} days used, {} remaining ({}%)\n",
            leave.used, leave.total, leave.remaining, leave.percent
        ));
    }

    if let Some(ref campaigns) = summary.campaigns {
        output.push_str(&format!(
            "Campaigns: {} active, {}% average reach\n",
            campaigns.count, campaigns.mean_percent
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::dataset::parse_dataset;
    use crate::evaluation::evaluate;

    fn reports(json: &str) -> Vec<ProgressReport> {
        evaluate(&parse_dataset(json).unwrap(), &ResolvedConfig::defaults().unwrap()).unwrap()
    }

    #[test]
    fn test_summarize_all_sections() {
        let reports = reports(
            r#"{
            "samples": [
                {"product": "A", "current": 45, "capacity": 50},
                {"product": "B", "current": 12, "capacity": 30},
                {"product": "C", "current": 8, "capacity": 25},
                {"product": "D", "current": 1, "capacity": 25}
            ],
            "leave": [
                {"leave_type": "casual", "used": 4, "total": 12},
                {"leave_type": "sick", "used": 2, "total": 8}
            ],
            "campaigns": [
                {"name": "X", "reached": 120, "target": 200},
                {"name": "Y", "reached": 45, "target": 50}
            ]
        }"#,
        );
        let summary = summarize(&reports);

        assert_eq!(
            summary.stock,
            SeverityCounts {
                critical: 2,
                low: 1,
                healthy: 1
            }
        );
        assert_eq!(summary.stock.total(), 4);

        let leave = summary.leave.unwrap();
        assert_eq!(leave.used, 6.0);
        assert_eq!(leave.total, 20.0);
        assert_eq!(leave.remaining, 14.0);
        assert_eq!(leave.percent, 30);

        let campaigns = summary.campaigns.unwrap();
        assert_eq!(campaigns.count, 2);
        assert_eq!(campaigns.mean_percent, 75);
    }

    #[test]
    fn test_summarize_stock_only() {
        let summary = summarize(&reports(
            r#"{"samples": [{"product": "A", "current": 45, "capacity": 50}]}"#,
        ));
        assert_eq!(summary.stock.healthy, 1);
        assert!(summary.leave.is_none());
        assert!(summary.campaigns.is_none());

        let text = render_summary_text(&summary);
        assert_eq!(
            text,
            "Stock:     1 products (0 critical, 0 low, 1 healthy)\n"
        );
    }

    #[test]
    fn test_summary_json_field_names() {
        let summary = summarize(&reports(
            r#"{"leave": [{"leave_type": "sick", "used": 1, "total": 4}]}"#,
        ));
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["stock"]["critical"], 0);
        assert_eq!(value["leave"]["percent"], 25);
        assert!(value.get("campaigns").is_none());
    }

    #[test]
    fn test_render_summary_text() {
        let summary = summarize(&reports(
            r#"{
            "leave": [{"leave_type": "earned", "used": 3, "total": 15}],
            "campaigns": [{"name": "X", "reached": 120, "target": 200}]
        }"#,
        ));
        let text = render_summary_text(&summary);
        assert!(text.contains("Leave:     3/15 days used, 12 remaining (20%)"));
        assert!(text.contains("Campaigns: 1 active, 60% average reach"));
    }
}
