//! Fieldforce CLI - progress and severity bands for field-force tracker snapshots

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use fieldforce_core::aggregates::{render_summary_text, summarize};
use fieldforce_core::config::{self, ResolvedConfig};
use fieldforce_core::progress::{compute_progress_with_thresholds, compute_unbanded_progress};
use fieldforce_core::report::{render_bar, BAR_WIDTH};
use fieldforce_core::{
    evaluate_file_with_config, render_json, render_text, EvaluationOptions, SeverityFilter,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fieldforce")]
#[command(about = "Progress and severity bands for sample stock, leave balance and campaigns")]
#[command(version = env!("FIELDFORCE_VERSION"))]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every tracker entry in a dataset file
    Evaluate {
        /// Path to the dataset JSON file
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only stock rows in this severity band (overrides config file)
        #[arg(long)]
        severity: Option<SeverityTab>,

        /// Show only top N rows (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Reject malformed entries instead of clamping them
        #[arg(long)]
        strict: bool,

        /// Path to config file (default: auto-discover next to the dataset)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Summarize a dataset into dashboard totals
    Summary {
        /// Path to the dataset JSON file
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover next to the dataset)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compute progress for a single quantity pair
    Progress {
        /// Units on hand, days used, or doctors reached
        #[arg(long, allow_negative_numbers = true)]
        current: f64,

        /// Shelf capacity, days entitled, or campaign target
        #[arg(long, allow_negative_numbers = true)]
        capacity: f64,

        /// Product whose threshold overrides apply
        #[arg(long)]
        product: Option<String>,

        /// Percent only, without a severity band (leave, campaigns)
        #[arg(long)]
        unbanded: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or inspect configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without evaluating anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SeverityTab {
    All,
    Critical,
    Low,
    Healthy,
}

impl From<SeverityTab> for SeverityFilter {
    fn from(tab: SeverityTab) -> Self {
        match tab {
            SeverityTab::All => SeverityFilter::All,
            SeverityTab::Critical => SeverityFilter::Critical,
            SeverityTab::Low => SeverityFilter::Low,
            SeverityTab::Healthy => SeverityFilter::Healthy,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Evaluate {
            path,
            format,
            severity,
            top,
            strict,
            config: config_path,
        } => {
            let path = normalize_path(path)?;
            let mut resolved_config = load_config_for_dataset(&path, config_path.as_deref())?;
            resolved_config.strict |= strict;

            let options = EvaluationOptions {
                severity: severity.map(SeverityFilter::from),
                top_n: top,
            };
            let reports = evaluate_file_with_config(&path, options, Some(&resolved_config))?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&reports)),
                OutputFormat::Json => println!("{}", render_json(&reports)),
            }
        }
        Commands::Summary {
            path,
            format,
            config: config_path,
        } => {
            let path = normalize_path(path)?;
            let resolved_config = load_config_for_dataset(&path, config_path.as_deref())?;

            // Totals always cover every row, regardless of tab or top settings
            let options = EvaluationOptions {
                severity: Some(SeverityFilter::All),
                top_n: Some(usize::MAX),
            };
            let reports = evaluate_file_with_config(&path, options, Some(&resolved_config))?;
            let summary = summarize(&reports);

            match format {
                OutputFormat::Text => print!("{}", render_summary_text(&summary)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("failed to render summary")?
                ),
            }
        }
        Commands::Progress {
            current,
            capacity,
            product,
            unbanded,
            format,
            config: config_path,
        } => {
            let cwd = std::env::current_dir()?;
            let resolved_config = config::load_and_resolve(&cwd, config_path.as_deref())
                .context("failed to load configuration")?;

            let progress = if unbanded {
                compute_unbanded_progress(current, capacity)
            } else {
                let thresholds = match product.as_deref() {
                    Some(product) => resolved_config.thresholds_for(product),
                    None => &resolved_config.thresholds,
                };
                compute_progress_with_thresholds(current, capacity, thresholds)
            };

            match format {
                OutputFormat::Text => {
                    let severity = progress.severity.map(|s| s.as_str()).unwrap_or("-");
                    println!(
                        "{} {:>3}% {}",
                        render_bar(progress.percent, BAR_WIDTH),
                        progress.percent,
                        severity
                    );
                    for adjustment in &progress.adjustments {
                        println!("  clamped: {}", adjustment.as_str());
                    }
                }
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&progress).context("failed to render progress")?
                ),
            }
        }
        Commands::Config { action } => {
            let cwd = std::env::current_dir()?;
            match action {
                ConfigAction::Validate { path } => {
                    match config::load_and_resolve(&cwd, path.as_deref()) {
                        Ok(resolved) => match &resolved.config_path {
                            Some(p) => println!("Config valid: {}", p.display()),
                            None => println!("No config file found, defaults are in effect"),
                        },
                        Err(e) => {
                            eprintln!("Config validation failed: {:#}", e);
                            std::process::exit(1);
                        }
                    }
                }
                ConfigAction::Show { path } => {
                    let resolved = config::load_and_resolve(&cwd, path.as_deref())?;
                    print!("{}", render_resolved_config(&resolved));
                }
            }
        }
    }

    Ok(())
}

/// Install a stderr fmt subscriber filtered by RUST_LOG or the verbosity flag
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("fieldforce={0},fieldforce_core={0}", level)))
        .context("failed to create log filter")?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

fn normalize_path(path: PathBuf) -> anyhow::Result<PathBuf> {
    let normalized = if path.is_relative() {
        std::env::current_dir()?.join(&path)
    } else {
        path
    };
    if !normalized.exists() {
        anyhow::bail!("Path does not exist: {}", normalized.display());
    }
    Ok(normalized)
}

/// Config is discovered in the directory holding the dataset
fn load_config_for_dataset(
    dataset: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<ResolvedConfig> {
    let project_root = dataset.parent().unwrap_or_else(|| Path::new("."));
    let resolved = config::load_and_resolve(project_root, config_path)
        .context("failed to load configuration")?;
    if let Some(path) = &resolved.config_path {
        tracing::info!(path = %path.display(), "using config");
    }
    Ok(resolved)
}

fn render_resolved_config(resolved: &ResolvedConfig) -> String {
    let mut output = String::new();
    match &resolved.config_path {
        Some(p) => output.push_str(&format!("Config: {}\n", p.display())),
        None => output.push_str("Config: defaults\n"),
    }
    output.push_str(&format!(
        "Thresholds: critical <= {} x capacity, low <= {} x capacity\n",
        resolved.thresholds.critical, resolved.thresholds.low
    ));
    for (product, t) in &resolved.product_thresholds {
        output.push_str(&format!(
            "  {}: critical <= {}, low <= {}\n",
            product, t.critical, t.low
        ));
    }
    output.push_str(&format!("Strict: {}\n", resolved.strict));
    output.push_str(&format!("Severity tab: {}\n", resolved.severity.as_str()));
    match resolved.top_n {
        Some(n) => output.push_str(&format!("Top: {}\n", n)),
        None => output.push_str("Top: unlimited\n"),
    }
    output
}
