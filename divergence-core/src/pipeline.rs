//! The run pipeline: fetch → align → correlate → render.
//!
//! Each stage is a public function so it can be exercised on its own; `run`
//! chains them. Every failure is fatal: nothing is retried.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::chart;
use crate::config::DivergenceConfig;
use crate::data::{align, AlignedTable, DataError, SchemaError, SeriesProvider, TableSchema, TimeSeries};
use crate::stats::{pearson, Relationship, StatsError};

/// Errors from the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetching '{id}' from {provider} failed: {source}")]
    DataFetch {
        provider: String,
        id: String,
        #[source]
        source: DataError,
    },

    #[error(
        "no overlapping dates: {symbol} covers {equity_span}, {series_code} covers {macro_span}"
    )]
    EmptyRange {
        symbol: String,
        series_code: String,
        equity_span: String,
        macro_span: String,
    },

    #[error("cannot write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("correlation failed: {0}")]
    Stats(#[from] StatsError),

    #[error("aligned table failed validation: {0}")]
    Schema(#[from] SchemaError),

    #[error("serializing chart failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Both raw series for one run.
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub equity: TimeSeries,
    pub macro_series: TimeSeries,
}

/// What a run produced, for printing or persisting.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub symbol: String,
    pub series_code: String,
    pub start_date: String,
    pub end_date: String,
    pub equity_points: usize,
    pub macro_points: usize,
    pub rows: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub correlation: f64,
    pub relationship: Relationship,
    pub dataset_hash: String,
    pub output_path: PathBuf,
}

/// Stage 1: fetch the equity and macro series over the configured range.
pub fn fetch(
    config: &DivergenceConfig,
    equity_provider: &dyn SeriesProvider,
    macro_provider: &dyn SeriesProvider,
) -> Result<FetchedSeries, PipelineError> {
    let (start, end) = (config.start_date, config.end_date);

    let equity = fetch_one(equity_provider, &config.symbol, start, end)?;
    info!(
        symbol = %config.symbol,
        points = equity.len(),
        span = %equity.span(),
        "equity series fetched"
    );

    let macro_series = fetch_one(macro_provider, &config.series_code, start, end)?;
    info!(
        series_code = %config.series_code,
        points = macro_series.len(),
        span = %macro_series.span(),
        "macro series fetched"
    );

    Ok(FetchedSeries {
        equity,
        macro_series,
    })
}

fn fetch_one(
    provider: &dyn SeriesProvider,
    id: &str,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> Result<TimeSeries, PipelineError> {
    let series = provider
        .fetch(id, start, end)
        .map_err(|source| PipelineError::DataFetch {
            provider: provider.name().to_string(),
            id: id.to_string(),
            source,
        })?;

    if series.is_empty() {
        return Err(PipelineError::DataFetch {
            provider: provider.name().to_string(),
            id: id.to_string(),
            source: DataError::NoData {
                id: id.to_string(),
                start,
                end,
            },
        });
    }
    Ok(series)
}

/// Stage 2: forward-fill the macro series and inner-join it with the equity series.
///
/// An empty join is an error; a non-empty table is checked against the
/// aligned-table schema before it is handed on.
pub fn align_series(
    config: &DivergenceConfig,
    fetched: &FetchedSeries,
) -> Result<AlignedTable, PipelineError> {
    let table = align(
        &fetched.equity,
        &fetched.macro_series,
        &config.price_column(),
        config.macro_column(),
        config.fill_horizon.fill_until(config.end_date),
    );

    if table.is_empty() {
        return Err(PipelineError::EmptyRange {
            symbol: config.symbol.clone(),
            series_code: config.series_code.clone(),
            equity_span: fetched.equity.span(),
            macro_span: fetched.macro_series.span(),
        });
    }

    let dropped = fetched.equity.len() - table.len();
    if dropped > 0 {
        warn!(
            dropped,
            "equity dates without a filled {} value were dropped", config.series_code
        );
    }

    TableSchema::validate(&table.to_frame()?, &table.price_column, &table.macro_column)?;

    info!(rows = table.len(), "series aligned");
    Ok(table)
}

/// Stage 3: Pearson correlation of the two value columns.
pub fn correlate(table: &AlignedTable) -> Result<f64, PipelineError> {
    let correlation = pearson(&table.prices(), &table.macro_values())?;
    if correlation.is_nan() {
        warn!(rows = table.len(), "correlation is undefined (too few rows or a constant column)");
    }
    Ok(correlation)
}

/// Stage 4: build the chart, write it to the configured path and optionally open it.
pub fn render(
    config: &DivergenceConfig,
    table: &AlignedTable,
    correlation: f64,
) -> Result<PathBuf, PipelineError> {
    let figure = chart::build_figure(table, correlation, config);
    let html = chart::render_html(&figure, &config.labels.title)?;

    let path = config.output_path.clone();
    chart::write_html(&path, &html).map_err(|source| PipelineError::OutputWrite {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "chart written");

    if config.open_viewer {
        if let Err(e) = chart::open_in_viewer(&path) {
            warn!(error = %e, path = %path.display(), "could not open viewer");
        }
    }

    Ok(path)
}

/// Write the aligned table as CSV: `Date,<price column>,<macro column>`.
pub fn write_csv(path: &Path, table: &AlignedTable) -> Result<(), PipelineError> {
    let to_write_error = |source: std::io::Error| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|e| to_write_error(e.into()))?;
    writer
        .write_record(["Date", table.price_column.as_str(), table.macro_column.as_str()])
        .map_err(|e| to_write_error(e.into()))?;
    for row in table.rows() {
        writer
            .write_record([
                row.date.to_string(),
                row.price.to_string(),
                row.macro_value.to_string(),
            ])
            .map_err(|e| to_write_error(e.into()))?;
    }
    writer.flush().map_err(to_write_error)?;

    info!(path = %path.display(), rows = table.len(), "aligned table exported");
    Ok(())
}

/// Run the whole pipeline against the given providers.
pub fn run(
    config: &DivergenceConfig,
    equity_provider: &dyn SeriesProvider,
    macro_provider: &dyn SeriesProvider,
) -> Result<(RunSummary, AlignedTable), PipelineError> {
    let fetched = fetch(config, equity_provider, macro_provider)?;
    let table = align_series(config, &fetched)?;
    let correlation = correlate(&table)?;
    let output_path = render(config, &table, correlation)?;

    let summary = RunSummary {
        symbol: config.symbol.clone(),
        series_code: config.series_code.clone(),
        start_date: config.start_date.to_string(),
        end_date: config.end_date.to_string(),
        equity_points: fetched.equity.len(),
        macro_points: fetched.macro_series.len(),
        rows: table.len(),
        first_date: table.rows().first().map(|r| r.date.to_string()),
        last_date: table.rows().last().map(|r| r.date.to_string()),
        correlation,
        relationship: Relationship::from_correlation(correlation),
        dataset_hash: table.fingerprint(),
        output_path,
    };

    info!(
        rows = summary.rows,
        correlation = %format!("{correlation:.2}"),
        relationship = %summary.relationship,
        "run complete"
    );

    Ok((summary, table))
}
