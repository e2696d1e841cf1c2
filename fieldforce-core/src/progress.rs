//! Banded progress calculation
//!
//! Global invariants enforced:
//! - Percent is always an integer in [0, 100]
//! - Severity thresholds are monotonic (critical <= low)
//! - Malformed quantities are clamped, never propagated as NaN or infinity

use serde::{Deserialize, Serialize};

/// Default stock ratio at or below which a product is critical
pub const DEFAULT_CRITICAL_RATIO: f64 = 0.35;

/// Default stock ratio at or below which a product is low
pub const DEFAULT_LOW_RATIO: f64 = 0.5;

/// Stock severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Low,
    Healthy,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Low => "low",
            Severity::Healthy => "healthy",
        }
    }
}

/// Clamp applied while computing progress for a malformed quantity pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Capacity was zero, negative, or not finite
    InvalidCapacity,
    /// Current was below zero
    NegativeQuantity,
    /// Current was above capacity
    QuantityExceedsCapacity,
    /// Current was NaN
    NonFiniteQuantity,
}

impl Adjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adjustment::InvalidCapacity => "invalid_capacity",
            Adjustment::NegativeQuantity => "negative_quantity",
            Adjustment::QuantityExceedsCapacity => "quantity_exceeds_capacity",
            Adjustment::NonFiniteQuantity => "non_finite_quantity",
        }
    }
}

/// Severity thresholds expressed as ratios of capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub low: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        SeverityThresholds {
            critical: DEFAULT_CRITICAL_RATIO,
            low: DEFAULT_LOW_RATIO,
        }
    }
}

impl SeverityThresholds {
    /// Quantity at or below which stock is critical: ceil(capacity * critical)
    pub fn critical_threshold(&self, capacity: f64) -> f64 {
        (capacity * self.critical).ceil()
    }

    /// Quantity at or below which stock is low: ceil(capacity * low)
    pub fn low_threshold(&self, capacity: f64) -> f64 {
        (capacity * self.low).ceil()
    }
}

/// Result of a progress computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub adjustments: Vec<Adjustment>,
}

fn is_valid_capacity(capacity: f64) -> bool {
    capacity.is_finite() && capacity > 0.0
}

/// Inspect a quantity pair and return the current value to compute with,
/// along with every clamp that had to be applied.
fn sanitize(current: f64, capacity: f64) -> (f64, Vec<Adjustment>) {
    let mut adjustments = Vec::new();

    let current = if current.is_nan() {
        adjustments.push(Adjustment::NonFiniteQuantity);
        0.0
    } else {
        if current < 0.0 {
            adjustments.push(Adjustment::NegativeQuantity);
        }
        current
    };

    if !is_valid_capacity(capacity) {
        adjustments.push(Adjustment::InvalidCapacity);
    } else if current > capacity {
        adjustments.push(Adjustment::QuantityExceedsCapacity);
    }

    (current, adjustments)
}

fn log_adjustments(current: f64, capacity: f64, adjustments: &[Adjustment]) {
    if adjustments.is_empty() {
        return;
    }
    let kinds = adjustments
        .iter()
        .map(Adjustment::as_str)
        .collect::<Vec<_>>()
        .join(",");
    tracing::warn!(
        current,
        capacity,
        adjustments = %kinds,
        "clamped malformed quantity pair"
    );
}

/// Calculate completion percent from a quantity pair
///
/// Formula:
/// percent = round(clamp(current / capacity, 0, 1) * 100)
///
/// A capacity that is not strictly positive yields 0.
fn compute_percent(current: f64, capacity: f64) -> (u8, Vec<Adjustment>) {
    let (current, adjustments) = sanitize(current, capacity);
    if !is_valid_capacity(capacity) {
        return (0, adjustments);
    }
    let ratio = (current / capacity).clamp(0.0, 1.0);
    ((ratio * 100.0).round() as u8, adjustments)
}

/// Assign severity with default thresholds
pub fn assign_severity(current: f64, capacity: f64) -> Severity {
    assign_severity_with_thresholds(current, capacity, &SeverityThresholds::default())
}

/// Assign severity with custom thresholds
///
/// Equality at a threshold resolves to the more severe band.
/// Invalid capacity is always critical.
pub fn assign_severity_with_thresholds(
    current: f64,
    capacity: f64,
    thresholds: &SeverityThresholds,
) -> Severity {
    if !is_valid_capacity(capacity) {
        return Severity::Critical;
    }
    let current = if current.is_nan() { 0.0 } else { current };

    if current <= thresholds.critical_threshold(capacity) {
        Severity::Critical
    } else if current <= thresholds.low_threshold(capacity) {
        Severity::Low
    } else {
        Severity::Healthy
    }
}

/// Calculate percent and severity with default thresholds
pub fn compute_progress(current: f64, capacity: f64) -> Progress {
    compute_progress_with_thresholds(current, capacity, &SeverityThresholds::default())
}

/// Calculate percent and severity with custom thresholds
pub fn compute_progress_with_thresholds(
    current: f64,
    capacity: f64,
    thresholds: &SeverityThresholds,
) -> Progress {
    let (percent, adjustments) = compute_percent(current, capacity);
    log_adjustments(current, capacity, &adjustments);
    Progress {
        percent,
        severity: Some(assign_severity_with_thresholds(
            current, capacity, thresholds,
        )),
        adjustments,
    }
}

/// Calculate percent only, for trackers without severity bands (leave, campaigns)
pub fn compute_unbanded_progress(current: f64, capacity: f64) -> Progress {
    let (percent, adjustments) = compute_percent(current, capacity);
    log_adjustments(current, capacity, &adjustments);
    Progress {
        percent,
        severity: None,
        adjustments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a fmt subscriber and return everything it logged
    fn capture_log<T>(f: impl FnOnce() -> T) -> (T, String) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        let bytes = log.0.lock().unwrap().clone();
        (value, String::from_utf8(bytes).unwrap())
    }

    fn warn_lines(log: &str) -> Vec<&str> {
        log.lines().filter(|l| l.contains("WARN")).collect()
    }

    #[test]
    fn test_clamp_emits_one_warning() {
        let (progress, log) = capture_log(|| compute_progress(10.0, 0.0));
        assert_eq!(progress.adjustments, vec![Adjustment::InvalidCapacity]);

        let warnings = warn_lines(&log);
        assert_eq!(warnings.len(), 1, "log was: {}", log);
        assert!(warnings[0].contains("invalid_capacity"));
        assert!(warnings[0].contains("fieldforce_core::progress"));
    }

    #[test]
    fn test_well_formed_pair_logs_nothing() {
        let (progress, log) = capture_log(|| compute_progress(45.0, 50.0));
        assert_eq!(progress.percent, 90);
        assert!(log.is_empty(), "unexpected log output: {}", log);
    }

    #[test]
    fn test_every_public_entry_point_logs_clamps() {
        let (_, log) = capture_log(|| compute_unbanded_progress(3.0, 2.0));
        let warnings = warn_lines(&log);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("quantity_exceeds_capacity"));

        let thresholds = SeverityThresholds::default();
        let (_, log) = capture_log(|| compute_progress_with_thresholds(-1.0, -4.0, &thresholds));
        let warnings = warn_lines(&log);
        assert_eq!(warnings.len(), 1, "one event per call, listing every clamp");
        assert!(warnings[0].contains("negative_quantity,invalid_capacity"));
    }

    #[test]
    fn test_percent_matches_ratio_within_range() {
        for capacity in 1..=60 {
            for current in 0..=capacity {
                let expected = (current as f64 / capacity as f64 * 100.0).round() as u8;
                let progress = compute_progress(current as f64, capacity as f64);
                assert_eq!(progress.percent, expected, "{}/{}", current, capacity);
                assert!(progress.adjustments.is_empty());
            }
        }
    }

    #[test]
    fn test_percent_caps_at_full_bar() {
        for capacity in 1..=20 {
            let progress = compute_progress((capacity * 3) as f64, capacity as f64);
            assert_eq!(progress.percent, 100);
            assert_eq!(
                progress.adjustments,
                vec![Adjustment::QuantityExceedsCapacity]
            );
        }
    }

    #[test]
    fn test_negative_current_floors_at_zero() {
        let progress = compute_progress(-5.0, 30.0);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.severity, Some(Severity::Critical));
        assert_eq!(progress.adjustments, vec![Adjustment::NegativeQuantity]);
    }

    #[test]
    fn test_zero_capacity_is_empty_and_critical() {
        let progress = compute_progress(10.0, 0.0);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.severity, Some(Severity::Critical));
        assert_eq!(progress.adjustments, vec![Adjustment::InvalidCapacity]);
    }

    #[test]
    fn test_negative_capacity_records_every_adjustment() {
        let progress = compute_progress(-1.0, -4.0);
        assert_eq!(progress.percent, 0);
        assert_eq!(
            progress.adjustments,
            vec![Adjustment::NegativeQuantity, Adjustment::InvalidCapacity]
        );
    }

    #[test]
    fn test_non_finite_inputs_never_leak() {
        let nan_current = compute_progress(f64::NAN, 10.0);
        assert_eq!(nan_current.percent, 0);
        assert_eq!(nan_current.severity, Some(Severity::Critical));
        assert_eq!(nan_current.adjustments, vec![Adjustment::NonFiniteQuantity]);

        let inf_current = compute_progress(f64::INFINITY, 10.0);
        assert_eq!(inf_current.percent, 100);
        assert_eq!(inf_current.severity, Some(Severity::Healthy));

        let nan_capacity = compute_progress(5.0, f64::NAN);
        assert_eq!(nan_capacity.percent, 0);
        assert_eq!(nan_capacity.adjustments, vec![Adjustment::InvalidCapacity]);

        let inf_capacity = compute_unbanded_progress(5.0, f64::INFINITY);
        assert_eq!(inf_capacity.percent, 0);
        assert_eq!(inf_capacity.adjustments, vec![Adjustment::InvalidCapacity]);
    }

    #[test]
    fn test_thresholds_for_capacity_fifty() {
        let t = SeverityThresholds::default();
        assert_eq!(t.critical_threshold(50.0), 18.0);
        assert_eq!(t.low_threshold(50.0), 25.0);

        assert_eq!(assign_severity(18.0, 50.0), Severity::Critical);
        assert_eq!(assign_severity(19.0, 50.0), Severity::Low);
        assert_eq!(assign_severity(25.0, 50.0), Severity::Low);
        assert_eq!(assign_severity(26.0, 50.0), Severity::Healthy);
    }

    #[test]
    fn test_healthy_stock_scenario() {
        let progress = compute_progress(45.0, 50.0);
        assert_eq!(progress.percent, 90);
        assert_eq!(progress.severity, Some(Severity::Healthy));
    }

    #[test]
    fn test_low_stock_scenario() {
        let t = SeverityThresholds::default();
        assert_eq!(t.critical_threshold(30.0), 11.0);
        assert_eq!(t.low_threshold(30.0), 15.0);

        let progress = compute_progress(12.0, 30.0);
        assert_eq!(progress.percent, 40);
        assert_eq!(progress.severity, Some(Severity::Low));
    }

    #[test]
    fn test_critical_stock_scenario() {
        assert_eq!(SeverityThresholds::default().critical_threshold(25.0), 9.0);

        let progress = compute_progress(8.0, 25.0);
        assert_eq!(progress.percent, 32);
        assert_eq!(progress.severity, Some(Severity::Critical));
    }

    #[test]
    fn test_severity_is_monotonic_in_current() {
        for capacity in 1..=100 {
            let mut previous = Severity::Critical;
            let mut transitions = 0;
            for current in 0..=capacity {
                let severity = assign_severity(current as f64, capacity as f64);
                assert!(
                    severity >= previous,
                    "severity reversed at {}/{}",
                    current,
                    capacity
                );
                if severity != previous {
                    transitions += 1;
                }
                previous = severity;
            }
            assert!(transitions <= 2);
        }
    }

    #[test]
    fn test_default_thresholds_are_ordered() {
        let t = SeverityThresholds::default();
        for capacity in 1..=500 {
            let capacity = capacity as f64;
            assert!(t.critical_threshold(capacity) <= t.low_threshold(capacity));
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let t = SeverityThresholds {
            critical: 0.2,
            low: 0.4,
        };
        assert_eq!(assign_severity_with_thresholds(10.0, 50.0, &t), Severity::Critical);
        assert_eq!(assign_severity_with_thresholds(15.0, 50.0, &t), Severity::Low);
        assert_eq!(assign_severity_with_thresholds(21.0, 50.0, &t), Severity::Healthy);
    }

    #[test]
    fn test_unbanded_progress_has_no_severity() {
        let progress = compute_unbanded_progress(4.0, 12.0);
        assert_eq!(progress.percent, 33);
        assert_eq!(progress.severity, None);
    }

    #[test]
    fn test_fractional_leave_days() {
        let progress = compute_unbanded_progress(1.5, 6.0);
        assert_eq!(progress.percent, 25);
    }

    #[test]
    fn test_idempotent() {
        let first = compute_progress(12.0, 30.0);
        let second = compute_progress(12.0, 30.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_string(&compute_progress(45.0, 50.0)).unwrap();
        assert_eq!(json, r#"{"percent":90,"severity":"healthy"}"#);
    }
}
