//! Daily calendar alignment of an equity series against a macro series.
//!
//! The macro series is forward-filled onto a daily calendar and then
//! inner-joined with the equity series on exact date equality. Equity prices
//! are never filled: a row exists only where the equity actually traded.

use super::series::{Observation, TimeSeries};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How far the forward-filled daily calendar extends.
///
/// The serde and command-line spellings are both snake_case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum FillHorizon {
    /// Carry the last observation through the requested end date.
    #[default]
    RangeEnd,
    /// Stop at the macro series' own last observation.
    SeriesEnd,
}

impl FillHorizon {
    /// Last day the fill should cover, given the requested range end.
    pub fn fill_until(self, range_end: NaiveDate) -> Option<NaiveDate> {
        match self {
            FillHorizon::SeriesEnd => None,
            FillHorizon::RangeEnd => Some(range_end),
        }
    }
}

/// One joined row: both values are always present and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub price: f64,
    pub macro_value: f64,
}

/// Equity and macro values on a shared, ascending, de-duplicated date index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    pub price_column: String,
    pub macro_column: String,
    rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn new(
        price_column: impl Into<String>,
        macro_column: impl Into<String>,
        rows: Vec<AlignedRow>,
    ) -> Self {
        Self {
            price_column: price_column.into(),
            macro_column: macro_column.into(),
            rows,
        }
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.price).collect()
    }

    pub fn macro_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.macro_value).collect()
    }

    /// Minimum and maximum of the macro column, `None` when empty.
    pub fn macro_bounds(&self) -> Option<(f64, f64)> {
        self.rows.iter().fold(None, |acc, r| match acc {
            None => Some((r.macro_value, r.macro_value)),
            Some((lo, hi)) => Some((lo.min(r.macro_value), hi.max(r.macro_value))),
        })
    }

    /// BLAKE3 digest over the column names and every row.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.price_column.as_bytes());
        hasher.update(self.macro_column.as_bytes());
        for row in &self.rows {
            hasher.update(row.date.to_string().as_bytes());
            hasher.update(&row.price.to_le_bytes());
            hasher.update(&row.macro_value.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Re-index `series` onto a daily calendar, carrying each value forward.
///
/// The calendar runs from the first observation to the later of the last
/// observation and `until`. Days before the first observation are not
/// produced. Filling an already-daily series returns it unchanged.
pub fn forward_fill_daily(series: &TimeSeries, until: Option<NaiveDate>) -> TimeSeries {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return series.clone();
    };
    let end = until.map_or(last, |u| u.max(last));

    let mut filled = Vec::new();
    let mut source = series.points().iter().peekable();
    let mut current_value = f64::NAN;

    for day in first.iter_days().take_while(|d| *d <= end) {
        while let Some(obs) = source.next_if(|o| o.date <= day) {
            current_value = obs.value;
        }
        filled.push(Observation::new(day, current_value));
    }

    TimeSeries::new(series.name.clone(), filled)
}

/// Join two series on exact date equality, keeping dates present in both.
pub fn inner_join(
    equity: &TimeSeries,
    macro_daily: &TimeSeries,
    price_column: &str,
    macro_column: &str,
) -> AlignedTable {
    let left = equity.points();
    let right = macro_daily.points();
    let mut rows = Vec::with_capacity(left.len().min(right.len()));

    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].date.cmp(&right[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                rows.push(AlignedRow {
                    date: left[i].date,
                    price: left[i].value,
                    macro_value: right[j].value,
                });
                i += 1;
                j += 1;
            }
        }
    }

    AlignedTable::new(price_column, macro_column, rows)
}

/// Forward-fill the macro series to daily and inner-join it with the equity series.
pub fn align(
    equity: &TimeSeries,
    macro_series: &TimeSeries,
    price_column: &str,
    macro_column: &str,
    fill_until: Option<NaiveDate>,
) -> AlignedTable {
    let macro_daily = forward_fill_daily(macro_series, fill_until);
    inner_join(equity, &macro_daily, price_column, macro_column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(name: &str, points: &[(&str, f64)]) -> TimeSeries {
        TimeSeries::new(
            name,
            points
                .iter()
                .map(|(date, v)| Observation::new(d(date), *v))
                .collect(),
        )
    }

    #[test]
    fn fill_spans_series_min_to_max() {
        let monthly = series("M", &[("2023-01-01", 4.0), ("2023-02-01", 5.0)]);
        let daily = forward_fill_daily(&monthly, None);

        assert_eq!(daily.len(), 32);
        assert_eq!(daily.value_on(d("2023-01-31")), Some(4.0));
        assert_eq!(daily.value_on(d("2023-02-01")), Some(5.0));
        assert_eq!(daily.last_date(), Some(d("2023-02-01")));
    }

    #[test]
    fn fill_extends_to_horizon() {
        let monthly = series("M", &[("2023-01-01", 4.0)]);
        let daily = forward_fill_daily(&monthly, Some(d("2023-01-10")));

        assert_eq!(daily.len(), 10);
        assert!(daily.points().iter().all(|p| p.value == 4.0));
    }

    #[test]
    fn fill_ignores_horizon_before_last_observation() {
        let monthly = series("M", &[("2023-01-01", 4.0), ("2023-01-05", 5.0)]);
        let daily = forward_fill_daily(&monthly, Some(d("2023-01-02")));
        assert_eq!(daily.last_date(), Some(d("2023-01-05")));
    }

    #[test]
    fn join_drops_weekends_and_pre_macro_dates() {
        let equity = series(
            "AFRM",
            &[
                ("2022-12-30", 9.0),
                ("2023-01-03", 10.0),
                ("2023-01-04", 11.0),
                ("2023-01-09", 12.0),
            ],
        );
        let macro_series = series("PSAVERT", &[("2023-01-01", 4.0), ("2023-01-08", 4.5)]);

        let table = align(&equity, &macro_series, "AFRM_Price", "Savings_Rate", None);

        // 2022-12-30 precedes the first macro value; 2023-01-09 is past its last.
        assert_eq!(table.dates(), vec![d("2023-01-03"), d("2023-01-04")]);
        assert_eq!(table.macro_values(), vec![4.0, 4.0]);
    }

    #[test]
    fn scenario_single_macro_point_with_range_horizon() {
        let equity = series("AFRM", &[("2023-01-02", 100.0), ("2023-01-03", 102.0)]);
        let macro_series = series("PSAVERT", &[("2023-01-01", 5.0)]);

        let table = align(
            &equity,
            &macro_series,
            "AFRM_Price",
            "Savings_Rate",
            FillHorizon::RangeEnd.fill_until(d("2023-01-03")),
        );

        assert_eq!(
            table.rows(),
            &[
                AlignedRow { date: d("2023-01-02"), price: 100.0, macro_value: 5.0 },
                AlignedRow { date: d("2023-01-03"), price: 102.0, macro_value: 5.0 },
            ]
        );
    }

    #[test]
    fn scenario_single_macro_point_with_series_horizon_is_empty() {
        let equity = series("AFRM", &[("2023-01-02", 100.0), ("2023-01-03", 102.0)]);
        let macro_series = series("PSAVERT", &[("2023-01-01", 5.0)]);

        let table = align(&equity, &macro_series, "AFRM_Price", "Savings_Rate", None);
        assert!(table.is_empty());
    }

    #[test]
    fn disjoint_ranges_produce_empty_table() {
        let equity = series("AFRM", &[("2022-01-03", 100.0), ("2022-01-04", 101.0)]);
        let macro_series = series("PSAVERT", &[("2023-01-01", 5.0), ("2023-02-01", 5.5)]);

        let table = align(&equity, &macro_series, "AFRM_Price", "Savings_Rate", None);
        assert!(table.is_empty());
        assert_eq!(table.macro_bounds(), None);
    }

    #[test]
    fn fingerprint_is_deterministic_and_content_sensitive() {
        let equity = series("AFRM", &[("2023-01-02", 100.0)]);
        let macro_series = series("PSAVERT", &[("2023-01-01", 5.0)]);
        let a = align(&equity, &macro_series, "P", "M", Some(d("2023-01-02")));
        let b = align(&equity, &macro_series, "P", "M", Some(d("2023-01-02")));
        let c = align(&equity, &macro_series, "P", "Other", Some(d("2023-01-02")));

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn fill_horizon_defaults_to_range_end() {
        assert_eq!(FillHorizon::default(), FillHorizon::RangeEnd);
        assert_eq!(FillHorizon::default().fill_until(d("2023-01-03")), Some(d("2023-01-03")));
    }

    #[test]
    fn fill_horizon_flag_names_match_serde_names() {
        for horizon in FillHorizon::value_variants() {
            let flag = horizon.to_possible_value().unwrap();
            let serde_name = serde_json::to_value(horizon).unwrap();
            assert_eq!(Some(flag.get_name()), serde_name.as_str());
        }
        assert_eq!(FillHorizon::from_str("range_end", false), Ok(FillHorizon::RangeEnd));
        assert_eq!(FillHorizon::from_str("series_end", false), Ok(FillHorizon::SeriesEnd));
        assert!(FillHorizon::from_str("weekly", false).is_err());
    }

    #[test]
    fn default_horizon_keeps_equity_dates_after_last_macro_value() {
        let equity = series("AFRM", &[("2023-01-02", 100.0), ("2023-01-03", 102.0)]);
        let macro_series = series("PSAVERT", &[("2023-01-01", 5.0)]);

        let table = align(
            &equity,
            &macro_series,
            "AFRM_Price",
            "Savings_Rate",
            FillHorizon::default().fill_until(d("2023-01-03")),
        );
        assert_eq!(table.prices(), vec![100.0, 102.0]);
        assert_eq!(table.macro_values(), vec![5.0, 5.0]);
    }
}
