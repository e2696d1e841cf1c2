//! Per-dataset evaluation
//!
//! Turns every tracker entry into a `ProgressReport`. Stock rows are banded
//! with the thresholds resolved for their product; leave and campaign rows
//! carry a percent only.

use crate::config::ResolvedConfig;
use crate::dataset::{Dataset, TrackerKind};
use crate::error::QuantityPair;
use crate::progress::{compute_progress_with_thresholds, compute_unbanded_progress};
use crate::report::ProgressReport;
use anyhow::{Context, Result};

fn check_strict(strict: bool, kind: TrackerKind, name: &str, pair: QuantityPair) -> Result<()> {
    if strict {
        pair.check()
            .with_context(|| format!("malformed {} entry: {}", kind.as_str(), name))?;
    }
    Ok(())
}

/// Evaluate every entry of a dataset, in input order
pub fn evaluate(dataset: &Dataset, config: &ResolvedConfig) -> Result<Vec<ProgressReport>> {
    let mut reports = Vec::with_capacity(dataset.len());

    for sample in &dataset.samples {
        let pair = sample.quantity();
        check_strict(config.strict, TrackerKind::Stock, &sample.product, pair)?;
        let thresholds = config.thresholds_for(&sample.product);
        let progress = compute_progress_with_thresholds(pair.current, pair.capacity, thresholds);
        reports.push(ProgressReport::new(
            TrackerKind::Stock,
            sample.product.clone(),
            pair.current,
            pair.capacity,
            sample.remaining_capacity(),
            progress,
        ));
    }

    for balance in &dataset.leave {
        let pair = balance.quantity();
        let name = balance.leave_type.label();
        check_strict(config.strict, TrackerKind::Leave, name, pair)?;
        reports.push(ProgressReport::new(
            TrackerKind::Leave,
            name.to_string(),
            pair.current,
            pair.capacity,
            balance.remaining(),
            compute_unbanded_progress(pair.current, pair.capacity),
        ));
    }

    for campaign in &dataset.campaigns {
        let pair = campaign.quantity();
        check_strict(config.strict, TrackerKind::Campaign, &campaign.name, pair)?;
        reports.push(ProgressReport::new(
            TrackerKind::Campaign,
            campaign.name.clone(),
            pair.current,
            pair.capacity,
            campaign.remaining(),
            compute_unbanded_progress(pair.current, pair.capacity),
        ));
    }

    Ok(reports)
}
