//! Malens CLI: moving-average analysis of a daily price file.
//!
//! Commands:
//! - `analyze`: MA cards and trend signals for a price file (or synthetic data)
//! - `sma`: SMA table for explicit windows, as CSV
//! - `update`: append yesterday's closing price from CoinGecko
//! - `profiles`: list the built-in signal profiles

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::prelude::*;

use malens_core::profile::{ProfileId, SignalProfile};
use malens_runner::{
    export, generate_synthetic, load_prices, run_analysis, run_sma, update_price_file,
    write_report_json, write_sma_csv, yesterday, AnalysisConfig, AnalysisReport,
    CoinGeckoProvider, LoadedPrices, UpdateOutcome,
};

#[derive(Parser)]
#[command(
    name = "malens",
    about = "Malens CLI: simple moving averages and trend signals for daily prices"
)]
struct Cli {
    /// Debug logging for the engine and runner.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute MA cards and trend signals.
    Analyze {
        /// Price file (.csv or .json).
        #[arg(long)]
        data: Option<PathBuf>,

        /// TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Profile: balanced, conservative, aggressive, long_horizon. Overrides the config.
        #[arg(long)]
        profile: Option<String>,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the JSON report to this file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use this many days of synthetic prices when no file is given or it fails to load.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Seed for synthetic prices.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Print (or write) the SMA table for explicit windows as CSV.
    Sma {
        /// Price file (.csv or .json).
        #[arg(long)]
        data: PathBuf,

        /// Window lengths in days (e.g. --window 50 --window 200).
        #[arg(long, required = true)]
        window: Vec<usize>,

        /// TOML analysis config (for line labels).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output CSV path. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch one day's closing price and add it to a CSV price file.
    Update {
        /// Price file (.csv). Created when missing.
        #[arg(long)]
        data: PathBuf,

        /// Date to fetch (YYYY-MM-DD). Defaults to yesterday in the configured timezone.
        #[arg(long)]
        date: Option<String>,

        /// CoinGecko coin id. Overrides the config.
        #[arg(long)]
        coin: Option<String>,

        /// TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the built-in signal profiles.
    Profiles,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            data,
            config,
            profile,
            json,
            output,
            synthetic,
            seed,
        } => run_analyze_cmd(data, config, profile, json, output, synthetic, seed),
        Commands::Sma {
            data,
            window,
            config,
            output,
        } => run_sma_cmd(&data, &window, config, output),
        Commands::Update {
            data,
            date,
            coin,
            config,
        } => run_update_cmd(&data, date, coin, config),
        Commands::Profiles => {
            print_profiles();
            Ok(())
        }
    }
}

/// Logs go to stderr so JSON on stdout stays clean.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("malens_core", level)
                .with_target("malens_runner", level)
                .with_target("malens_cli", level)
                .with_default(Level::WARN),
        );
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn run_analyze_cmd(
    data: Option<PathBuf>,
    config_path: Option<PathBuf>,
    profile: Option<String>,
    json: bool,
    output: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: u64,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(name) = profile {
        config.profile = name.parse::<ProfileId>()?;
    }

    let loaded = resolve_prices(data.as_deref(), synthetic, seed)?;
    let run = run_analysis(&loaded, &config)?;

    if json {
        println!("{}", export::report_json(&run.report)?);
    } else {
        print_report(&run.report);
    }

    if let Some(path) = output {
        write_report_json(&path, &run.report)?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn resolve_prices(data: Option<&Path>, synthetic: Option<usize>, seed: u64) -> Result<LoadedPrices> {
    let end = chrono::Local::now().date_naive();
    match (data, synthetic) {
        (Some(path), None) => Ok(load_prices(path)?),
        (Some(path), Some(days)) => match load_prices(path) {
            Ok(loaded) => Ok(loaded),
            Err(e) => {
                warn!(error = %e, "price file unavailable, falling back to synthetic prices");
                Ok(generate_synthetic(days, end, seed))
            }
        },
        (None, Some(days)) => Ok(generate_synthetic(days, end, seed)),
        (None, None) => bail!("one of --data or --synthetic is required"),
    }
}

fn run_sma_cmd(
    data: &Path,
    windows: &[usize],
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let loaded = load_prices(data)?;
    let (averages, table) = run_sma(&loaded, windows, &config)?;

    match output {
        Some(path) => {
            write_sma_csv(&path, &loaded.series, &averages, &table)?;
            println!("SMA table written to: {}", path.display());
        }
        None => print!("{}", export::sma_csv(&loaded.series, &averages, &table)?),
    }
    Ok(())
}

fn run_update_cmd(
    data: &Path,
    date: Option<String>,
    coin: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let date = match date {
        Some(s) => parse_date(&s)?,
        None => yesterday(config.timezone()?),
    };
    let coin = coin.unwrap_or_else(|| config.coin.clone());
    let provider = CoinGeckoProvider::new(coin)?;

    match update_price_file(data, &provider, date)? {
        UpdateOutcome::Added { date, price } => {
            println!("Added {date}: {price:.2}");
        }
        UpdateOutcome::AlreadyPresent { date } => {
            println!("{date} already present, nothing to do.");
        }
    }
    Ok(())
}

fn fmt_opt(v: Option<f64>, suffix: &str) -> String {
    v.map(|v| format!("{v:.2}{suffix}"))
        .unwrap_or_else(|| "-".to_string())
}

fn print_report(report: &AnalysisReport) {
    println!();
    println!("=== Moving Average Analysis ===");
    println!("Source:         {}", report.source);
    println!("Points:         {}", report.points);
    if report.points < report.warmup_days + 1 {
        println!(
            "Warmup:         {} days needed for every line",
            report.warmup_days + 1
        );
    }
    match (report.latest_date, report.latest_price) {
        (Some(date), Some(price)) => println!("Latest:         {date}  {price:.2}"),
        _ => println!("Latest:         (no data)"),
    }
    println!("Profile:        {}", report.profile);
    println!();

    println!(
        "{:<8} {:>12} {:>10} {:>10} {:>7}",
        "Line", "Value", "Change", "Deviation", "Price"
    );
    println!("{}", "-".repeat(51));
    for card in &report.cards {
        let (value, side) = if card.is_loading() {
            ("loading".to_string(), "")
        } else {
            let side = match card.price_above {
                Some(true) => "above",
                Some(false) => "below",
                None => "",
            };
            (fmt_opt(card.value, ""), side)
        };
        println!(
            "{:<8} {:>12} {:>10} {:>10} {:>7}",
            card.label,
            value,
            fmt_opt(card.change_pct, "%"),
            fmt_opt(card.deviation_pct, "%"),
            side
        );
    }

    println!();
    println!("--- Signals ---");
    for row in &report.labelled {
        match row.magnitude {
            Some(m) => println!("{:<12} {}  ({m:.2})", row.signal, row.text),
            None => println!("{:<12} {}", row.signal, row.text),
        }
    }

    if report.synthetic {
        println!();
        println!("WARNING: Analysis based on SYNTHETIC data");
    }
    println!();
}

fn print_profiles() {
    println!(
        "{:<14} {:>7} {:>7} {:>7} {:>18} {:>10} {:>6}",
        "Profile", "Short", "Long", "Key", "Congestion bands", "Slope", "Far"
    );
    println!("{}", "-".repeat(75));
    for id in ProfileId::ALL {
        let SignalProfile { thresholds: t, .. } = id.profile();
        let window = |w: Option<usize>| w.map_or_else(|| "auto".to_string(), |w| w.to_string());
        let [a, b, c] = t.congestion_bands;
        println!(
            "{:<14} {:>7} {:>7} {:>7} {:>18} {:>10} {:>6}",
            id.as_str(),
            window(t.short_window),
            window(t.long_window),
            window(t.key_window),
            format!("{a}/{b}/{c}%"),
            format!("{}/{}%", t.slope_flat_pct, t.slope_strong_pct),
            format!("{}%", t.far_deviation_pct),
        );
    }
}
