//! Run configuration: date range, series identifiers, colours, labels, output.
//!
//! `DivergenceConfig::default()` reproduces the stock Affirm vs. personal
//! saving rate chart. A TOML file can override any subset of fields.

use crate::data::FillHorizon;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid colour '{value}' for {field} (expected #RRGGBB)")]
    InvalidColor { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Line, axis and hover colours for the two traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub equity: String,
    pub macro_series: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            equity: "#FF412C".into(),
            macro_series: "#959595".into(),
        }
    }
}

/// Chart text and the macro column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub equity_name: String,
    pub equity_axis: String,
    pub macro_name: String,
    pub macro_axis: String,
    pub macro_column: String,
    pub title: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            equity_name: "Affirm Stock Price ($)".into(),
            equity_axis: "Affirm Share Price ($)".into(),
            macro_name: "Personal Savings Rate (%)".into(),
            macro_axis: "Savings Rate (%)".into(),
            macro_column: "Savings_Rate".into(),
            title: "<b>The Divergence Index</b>: Stagnant Savings vs. Exploding Credit Usage"
                .into(),
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceConfig {
    /// Equity ticker (Yahoo Finance).
    pub symbol: String,
    /// Macro series code (FRED).
    pub series_code: String,
    /// First calendar day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last calendar day of the range (inclusive).
    pub end_date: NaiveDate,
    pub output_path: PathBuf,
    pub fill_horizon: FillHorizon,
    pub open_viewer: bool,
    pub colors: Colors,
    pub labels: Labels,
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            symbol: "AFRM".into(),
            series_code: "PSAVERT".into(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap_or_default(),
            output_path: PathBuf::from("divergence_index_final.html"),
            fill_horizon: FillHorizon::RangeEnd,
            open_viewer: false,
            colors: Colors::default(),
            labels: Labels::default(),
        }
    }
}

impl DivergenceConfig {
    /// Load a config from a TOML file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the config as TOML, e.g. to seed a config file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Empty("symbol"));
        }
        if self.series_code.trim().is_empty() {
            return Err(ConfigError::Empty("series_code"));
        }
        if self.labels.macro_column.trim().is_empty() {
            return Err(ConfigError::Empty("labels.macro_column"));
        }
        if self.start_date > self.end_date {
            return Err(ConfigError::InvalidRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        check_color("colors.equity", &self.colors.equity)?;
        check_color("colors.macro_series", &self.colors.macro_series)?;
        Ok(())
    }

    /// Column name for the equity prices, e.g. `AFRM_Price`.
    pub fn price_column(&self) -> String {
        format!("{}_Price", self.symbol)
    }

    pub fn macro_column(&self) -> &str {
        &self.labels.macro_column
    }
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        value: value.to_string(),
    })
}

fn check_color(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let hex = value.strip_prefix('#').unwrap_or_default();
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidColor {
            field,
            value: value.to_string(),
        })
    }
}
