//! Series providers, daily alignment, and the aligned-table schema

pub mod align;
pub mod fred;
pub mod provider;
pub mod schema;
pub mod series;
pub mod yahoo;

pub use align::{align, forward_fill_daily, inner_join, AlignedRow, AlignedTable, FillHorizon};
pub use fred::FredProvider;
pub use provider::{DataError, SeriesProvider};
pub use schema::{SchemaError, TableSchema, DATE_COLUMN};
pub use series::{Observation, TimeSeries};
pub use yahoo::YahooProvider;
