//! airdrop-report: human-readable summary of a written distribution.
//!
//! Reads the analytics JSON and distribution CSV produced by
//! `airdrop-process`, computes the Gini coefficient of the distribution, and
//! writes `distribution_report.txt` into the output directory.

use std::fmt::Write as _;
use std::path::PathBuf;

use airdrop_core::analytics::{gini_coefficient, AnalyticsSummary};
use airdrop_core::output::{read_analytics, read_distribution_csv};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

/// File name of the rendered report inside the output directory.
const REPORT_FILE: &str = "distribution_report.txt";

/// Holders listed in the report's top section.
const REPORT_TOP_HOLDERS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "airdrop-report", version, about = "Analyze a token distribution")]
struct Cli {
    /// Path to the analytics JSON file
    analytics_file: PathBuf,

    /// Path to the distribution CSV file
    csv_file: PathBuf,

    /// Directory for output files
    #[arg(long, default_value = "./analytics_output")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create directory: {}", cli.output_dir.display()))?;

    let analytics = read_analytics(&cli.analytics_file).context("Failed to load analytics")?;
    let rows = read_distribution_csv(&cli.csv_file).context("Failed to load distribution CSV")?;
    info!("loaded data for {} addresses", rows.len());
    if rows.len() != analytics.total_holders {
        warn!(
            "CSV has {} rows but analytics reports {} holders",
            rows.len(),
            analytics.total_holders
        );
    }

    let amounts: Vec<u64> = rows.iter().map(|r| r.amount).collect();
    let gini = gini_coefficient(&amounts);
    let report = render_report(&analytics, gini).context("Failed to render report")?;

    let report_path = cli.output_dir.join(REPORT_FILE);
    std::fs::write(&report_path, &report)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    println!("{report}");
    info!("report saved to {}", report_path.display());
    Ok(())
}

/// Group digits in threes: `1234567` → `"1,234,567"`.
fn with_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn share(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

/// Render the plain-text report.
fn render_report(a: &AnalyticsSummary, gini: f64) -> Result<String, std::fmt::Error> {
    let mut r = String::new();
    writeln!(r, "Token Distribution Analysis Report")?;
    writeln!(r, "==================================")?;
    writeln!(r)?;
    writeln!(r, "Overall Statistics:")?;
    writeln!(r, "-------------------")?;
    writeln!(r, "Total Holders: {}", with_thousands(a.total_holders as u128))?;
    writeln!(
        r,
        "Total Tokens Distributed: {}",
        with_thousands(a.total_tokens_distributed)
    )?;
    writeln!(r, "Average Tokens per Holder: {:.2}", a.average_tokens_per_holder)?;
    writeln!(r, "Median Tokens per Holder: {}", a.median_tokens_per_holder)?;
    writeln!(r, "Standard Deviation: {:.2}", a.standard_deviation)?;
    writeln!(r, "Min/Max: {} / {}", a.min, a.max)?;
    writeln!(r, "Gini Coefficient: {gini:.3}")?;
    writeln!(r)?;

    let p = &a.percentiles;
    writeln!(r, "Percentiles:")?;
    writeln!(r, "------------")?;
    writeln!(r, "10th percentile: {}", p.p10)?;
    writeln!(r, "25th percentile: {}", p.p25)?;
    writeln!(r, "50th percentile (median): {}", p.p50)?;
    writeln!(r, "75th percentile: {}", p.p75)?;
    writeln!(r, "90th percentile: {}", p.p90)?;
    writeln!(r, "95th percentile: {}", p.p95)?;
    writeln!(r, "99th percentile: {}", p.p99)?;
    writeln!(r)?;

    writeln!(r, "Distribution by Range:")?;
    writeln!(r, "----------------------")?;
    for b in &a.distribution_buckets {
        writeln!(
            r,
            "{:>10}: {:>6} holders ({:>5.1}%) - {:>8} tokens ({:>5.1}%)",
            b.range,
            b.count,
            share(b.count as f64, a.total_holders as f64),
            b.total_tokens,
            share(b.total_tokens as f64, a.total_tokens_distributed as f64),
        )?;
    }
    writeln!(r)?;

    writeln!(r, "Top {REPORT_TOP_HOLDERS} Token Holders:")?;
    writeln!(r, "---------------------")?;
    for (i, holder) in a.top_holders.iter().take(REPORT_TOP_HOLDERS).enumerate() {
        writeln!(r, "{:>2}. {} - {} tokens", i + 1, holder.address, holder.amount)?;
    }
    Ok(r)
}
