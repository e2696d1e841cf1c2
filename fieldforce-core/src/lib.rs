//! Fieldforce core library - progress and severity bands for field-force trackers

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Progress is a pure projection of a quantity pair
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Malformed quantities are clamped unless strict mode is requested
// - Identical input yields byte-for-byte identical output

pub mod aggregates;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod progress;
pub mod report;

pub use config::ResolvedConfig;
pub use error::{QuantityError, QuantityPair};
pub use progress::{compute_progress, compute_unbanded_progress, Progress, Severity};
pub use report::{render_json, render_text, sort_reports, ProgressReport, SeverityFilter};

use anyhow::{Context, Result};

pub struct EvaluationOptions {
    pub severity: Option<SeverityFilter>,
    pub top_n: Option<usize>,
}

/// Evaluate a dataset file with default configuration
pub fn evaluate_file(
    path: &std::path::Path,
    options: EvaluationOptions,
) -> Result<Vec<ProgressReport>> {
    evaluate_file_with_config(path, options, None)
}

/// Evaluate a dataset file with optional resolved configuration
///
/// Options override the config's severity filter and row limit.
pub fn evaluate_file_with_config(
    path: &std::path::Path,
    options: EvaluationOptions,
    resolved_config: Option<&ResolvedConfig>,
) -> Result<Vec<ProgressReport>> {
    let defaults;
    let config = match resolved_config {
        Some(config) => config,
        None => {
            defaults = ResolvedConfig::defaults()?;
            &defaults
        }
    };

    let dataset = dataset::load_dataset(path)?;
    tracing::debug!(
        path = %path.display(),
        entries = dataset.len(),
        "loaded tracker dataset"
    );
    if dataset.is_empty() {
        tracing::warn!(path = %path.display(), "dataset has no tracker entries");
    }

    let reports = evaluation::evaluate(&dataset, config)
        .with_context(|| format!("failed to evaluate dataset: {}", path.display()))?;

    // Sort deterministically
    let sorted_reports = sort_reports(reports);

    let filter = options.severity.unwrap_or(config.severity);
    let filtered = report::filter_reports(sorted_reports, filter);

    // Apply top_n filter if specified
    let final_reports = match options.top_n.or(config.top_n) {
        Some(top_n) => filtered.into_iter().take(top_n).collect(),
        None => filtered,
    };

    Ok(final_reports)
}
