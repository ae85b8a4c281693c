//! FRED (Federal Reserve Economic Data) macro series provider.
//!
//! Uses the unauthenticated `fredgraph.csv` download. Observations are keyed by
//! the series' native reporting date (first of month for monthly series).

use super::provider::{transport_error, DataError, SeriesProvider};
use super::series::{Observation, TimeSeries};
use chrono::NaiveDate;
use tracing::debug;

const BASE_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";

/// Placeholder FRED writes for a missing observation.
const MISSING: &str = ".";

/// FRED series provider.
pub struct FredProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl FredProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn csv_url(&self, series_code: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}?id={series_code}&cosd={}&coed={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }

    /// Parse a `fredgraph.csv` body.
    ///
    /// The first column is the observation date (`DATE` or `observation_date`
    /// depending on the export version); the value column is the one named
    /// after the series code, falling back to the second column.
    pub(crate) fn parse_csv(series_code: &str, body: &str) -> Result<Vec<Observation>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| DataError::ResponseFormatChanged(format!("unreadable CSV header: {e}")))?
            .clone();

        if headers.len() < 2 {
            return Err(DataError::ResponseFormatChanged(format!(
                "expected date and value columns, got header {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let value_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(series_code))
            .unwrap_or(1);

        let mut points = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                DataError::ResponseFormatChanged(format!("bad CSV record {}: {e}", line + 2))
            })?;

            let raw_date = record.get(0).unwrap_or_default();
            let raw_value = record.get(value_idx).unwrap_or_default();
            if raw_value.is_empty() || raw_value == MISSING {
                continue;
            }

            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                DataError::ResponseFormatChanged(format!("invalid date '{raw_date}': {e}"))
            })?;
            let value: f64 = raw_value.parse().map_err(|e| {
                DataError::ResponseFormatChanged(format!("invalid value '{raw_value}': {e}"))
            })?;

            points.push(Observation::new(date, value));
        }

        Ok(points)
    }
}

impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(
        &self,
        series_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, DataError> {
        let url = self.csv_url(series_code, start, end);
        debug!(%url, "requesting macro series");

        let resp = self.client.get(&url).send().map_err(transport_error)?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: series_code.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                provider: "fred",
                id: series_code.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(transport_error)?;
        let series =
            TimeSeries::new(series_code, Self::parse_csv(series_code, &body)?).clip(start, end);
        if series.is_empty() {
            return Err(DataError::NoData {
                id: series_code.to_string(),
                start,
                end,
            });
        }

        debug!(series_code, points = series.len(), span = %series.span(), "macro series parsed");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_current_export_header() {
        let body = "observation_date,PSAVERT\n2023-01-01,4.4\n2023-02-01,4.7\n2023-03-01,.\n";
        let points = FredProvider::parse_csv("PSAVERT", body).unwrap();

        assert_eq!(
            points,
            vec![
                Observation::new(d("2023-01-01"), 4.4),
                Observation::new(d("2023-02-01"), 4.7),
            ]
        );
    }

    #[test]
    fn parses_legacy_header() {
        let body = "DATE,PSAVERT\r\n2024-06-01,3.4\r\n";
        let points = FredProvider::parse_csv("PSAVERT", body).unwrap();
        assert_eq!(points, vec![Observation::new(d("2024-06-01"), 3.4)]);
    }

    #[test]
    fn rejects_html_error_page() {
        let body = "<!DOCTYPE html>\n<html><body>Series does not exist.</body></html>\n";
        assert!(matches!(
            FredProvider::parse_csv("NOPE", body),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }

    #[test]
    fn rejects_unparseable_value() {
        let body = "DATE,PSAVERT\n2024-06-01,abc\n";
        assert!(FredProvider::parse_csv("PSAVERT", body).is_err());
    }

    #[test]
    fn csv_url_carries_range() {
        let provider = FredProvider::with_base_url("http://localhost/fredgraph.csv").unwrap();
        assert_eq!(
            provider.csv_url("PSAVERT", d("2023-01-01"), d("2025-12-01")),
            "http://localhost/fredgraph.csv?id=PSAVERT&cosd=2023-01-01&coed=2025-12-01"
        );
    }
}
