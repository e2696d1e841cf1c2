//! Configuration file support for Fieldforce
//!
//! Loads severity policy from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.fieldforcerc.json` next to the dataset
//! 3. `fieldforce.config.json` next to the dataset
//! 4. `"fieldforce"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::progress::SeverityThresholds;
use crate::report::SeverityFilter;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fieldforce configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldforceConfig {
    /// Stock severity thresholds applied to every product
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Per-product overrides, merged over the global thresholds
    #[serde(default)]
    pub product_thresholds: BTreeMap<String, ThresholdConfig>,

    /// Reject malformed entries instead of clamping them (default: false)
    #[serde(default)]
    pub strict: Option<bool>,

    /// Default severity filter for stock rows (default: all)
    #[serde(default)]
    pub severity: Option<SeverityFilter>,

    /// Maximum number of rows to show
    #[serde(default)]
    pub top: Option<usize>,
}

/// Severity thresholds as ratios of capacity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Ratio at or below which stock is critical (default: 0.35)
    pub critical: Option<f64>,
    /// Ratio at or below which stock is low (default: 0.5)
    pub low: Option<f64>,
}

impl ThresholdConfig {
    fn merge_over(&self, base: &SeverityThresholds) -> SeverityThresholds {
        SeverityThresholds {
            critical: self.critical.unwrap_or(base.critical),
            low: self.low.unwrap_or(base.low),
        }
    }
}

/// Resolved configuration with concrete thresholds
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub thresholds: SeverityThresholds,
    pub product_thresholds: BTreeMap<String, SeverityThresholds>,
    pub strict: bool,
    pub severity: SeverityFilter,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn validate_thresholds(scope: &str, t: &SeverityThresholds) -> Result<()> {
    for (name, value) in [("critical", t.critical), ("low", t.low)] {
        if !(value > 0.0 && value <= 1.0) {
            anyhow::bail!("{}.{} must be in (0, 1] (got {})", scope, name, value);
        }
    }
    if t.critical > t.low {
        anyhow::bail!(
            "{}.critical ({}) must not exceed {}.low ({})",
            scope,
            t.critical,
            scope,
            t.low
        );
    }
    Ok(())
}

impl FieldforceConfig {
    fn global_thresholds(&self) -> SeverityThresholds {
        match &self.thresholds {
            Some(t) => t.merge_over(&SeverityThresholds::default()),
            None => SeverityThresholds::default(),
        }
    }

    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        let global = self.global_thresholds();
        validate_thresholds("thresholds", &global)?;

        for (product, overrides) in &self.product_thresholds {
            if product.trim().is_empty() {
                anyhow::bail!("product_thresholds keys must not be empty");
            }
            let merged = overrides.merge_over(&global);
            validate_thresholds(&format!("product_thresholds[{}]", product), &merged)?;
        }

        if self.top == Some(0) {
            anyhow::bail!("top must be at least 1");
        }

        Ok(())
    }

    /// Resolve config into concrete form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let thresholds = self.global_thresholds();
        let product_thresholds = self
            .product_thresholds
            .iter()
            .map(|(product, t)| (product.clone(), t.merge_over(&thresholds)))
            .collect();

        Ok(ResolvedConfig {
            thresholds,
            product_thresholds,
            strict: self.strict.unwrap_or(false),
            severity: self.severity.unwrap_or_default(),
            top_n: self.top,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Thresholds for a product, falling back to the global ones
    pub fn thresholds_for(&self, product: &str) -> &SeverityThresholds {
        self.product_thresholds
            .get(product)
            .unwrap_or(&self.thresholds)
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        FieldforceConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(FieldforceConfig, PathBuf)>> {
    // 1. .fieldforcerc.json
    let rc_path = project_root.join(".fieldforcerc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    // 2. fieldforce.config.json
    let config_path = project_root.join("fieldforce.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    // 3. package.json "fieldforce" key
    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<FieldforceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: FieldforceConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

fn load_from_package_json(path: &Path) -> Result<Option<FieldforceConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("fieldforce") {
        Some(value) => {
            let config: FieldforceConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid fieldforce config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid fieldforce config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (FieldforceConfig::default(), None),
        }
    };

    match &source_path {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!(root = %project_root.display(), "no config found, using defaults"),
    }

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
