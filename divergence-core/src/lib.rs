//! Divergence Core — align an equity price series with a macro indicator,
//! correlate them, and chart both on a shared timeline.
//!
//! - Yahoo Finance (equity closes) and FRED (macro series) providers
//! - Daily forward-fill of the macro series and inner join on trading dates
//! - Pearson correlation with a sign-derived relationship label
//! - Dual-axis plotly chart written as standalone HTML
//! - `pipeline`: fetch → align → correlate → render

pub mod chart;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use config::{ConfigError, DivergenceConfig};
pub use pipeline::{run, PipelineError, RunSummary};
