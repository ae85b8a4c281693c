//! Divergence CLI — chart an equity against a macro series.
//!
//! Commands:
//! - `run` — fetch both series, align, correlate, and write the HTML chart
//! - `config` — print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use divergence_core::config::parse_date;
use divergence_core::data::{FillHorizon, FredProvider, YahooProvider};
use divergence_core::{pipeline, DivergenceConfig, RunSummary};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "divergence",
    about = "Divergence Index — equity price vs. macro indicator, aligned and correlated"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, align, correlate, and render the dual-axis chart.
    Run {
        /// Path to a TOML config file. Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Equity ticker (e.g., AFRM).
        #[arg(long)]
        symbol: Option<String>,

        /// FRED series code (e.g., PSAVERT).
        #[arg(long)]
        series: Option<String>,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<String>,

        /// Output HTML path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// How far to forward-fill the macro series.
        #[arg(long, value_enum)]
        fill_horizon: Option<FillHorizon>,

        /// Open the chart in the default viewer after writing it.
        #[arg(long, default_value_t = false)]
        open: bool,

        /// Also export the aligned table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Also write the run summary as JSON.
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbol,
            series,
            start,
            end,
            output,
            fill_horizon,
            open,
            csv,
            summary_json,
        } => {
            let overrides = Overrides {
                symbol,
                series,
                start,
                end,
                output,
                fill_horizon,
                open,
            };
            let config = resolve_config(config, overrides)?;
            run_chart(&config, csv, summary_json)
        }
        Commands::Config => {
            print!("{}", DivergenceConfig::default().to_toml()?);
            Ok(())
        }
    }
}

/// Initialise an INFO `Subscriber` on stderr; `RUST_LOG` overrides the level.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init()
}

struct Overrides {
    symbol: Option<String>,
    series: Option<String>,
    start: Option<String>,
    end: Option<String>,
    output: Option<PathBuf>,
    fill_horizon: Option<FillHorizon>,
    open: bool,
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(path: Option<PathBuf>, overrides: Overrides) -> Result<DivergenceConfig> {
    let mut config = match path {
        Some(path) => DivergenceConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DivergenceConfig::default(),
    };

    if let Some(symbol) = overrides.symbol {
        config.symbol = symbol;
    }
    if let Some(series) = overrides.series {
        config.series_code = series;
    }
    if let Some(start) = overrides.start.as_deref() {
        config.start_date = parse_date(start)?;
    }
    if let Some(end) = overrides.end.as_deref() {
        config.end_date = parse_date(end)?;
    }
    if let Some(output) = overrides.output {
        config.output_path = output;
    }
    if let Some(horizon) = overrides.fill_horizon {
        config.fill_horizon = horizon;
    }
    config.open_viewer |= overrides.open;

    config.validate()?;
    Ok(config)
}

fn run_chart(
    config: &DivergenceConfig,
    csv_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
) -> Result<()> {
    let equity_provider = YahooProvider::new()?;
    let macro_provider = FredProvider::new()?;

    println!("Fetching real-time data...");
    let (summary, table) = pipeline::run(config, &equity_provider, &macro_provider)?;

    if let Some(path) = csv_path {
        pipeline::write_csv(&path, &table)?;
        println!("Aligned table saved to: {}", path.display());
    }

    if let Some(path) = summary_path {
        let json = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing run summary {}", path.display()))?;
        println!("Run summary saved to: {}", path.display());
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Divergence Index ===");
    println!("Equity:         {}", summary.symbol);
    println!("Macro series:   {}", summary.series_code);
    println!(
        "Requested:      {} to {}",
        summary.start_date, summary.end_date
    );
    if let (Some(first), Some(last)) = (&summary.first_date, &summary.last_date) {
        println!("Aligned:        {first} to {last}");
    }
    println!(
        "Rows:           {} ({} equity points, {} macro points)",
        summary.rows, summary.equity_points, summary.macro_points
    );
    println!("Relationship:   {}", summary.relationship);
    println!("Dataset hash:   {}", &summary.dataset_hash[..16]);
    println!("Chart:          {}", summary.output_path.display());
    println!();
    println!(
        "Generated Divergence Index with Correlation: {:.2}",
        summary.correlation
    );
}
