//! Dated observation series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single `(date, value)` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A named series of observations, sorted ascending by date with unique dates.
///
/// Only `TimeSeries::new` builds one, so the ordering invariant always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub name: String,
    points: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from unordered points.
    ///
    /// Points are sorted by date. Non-finite values are dropped, and when a
    /// date repeats the first occurrence wins.
    pub fn new(name: impl Into<String>, mut points: Vec<Observation>) -> Self {
        points.retain(|p| p.value.is_finite());
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Value observed on exactly `date`, if any.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Keep only points inside the inclusive `[start, end]` range.
    pub fn clip(self, start: NaiveDate, end: NaiveDate) -> Self {
        let points = self
            .points
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect();
        Self {
            name: self.name,
            points,
        }
    }

    /// Human-readable date span, e.g. `2023-01-02..2023-06-30` or `(empty)`.
    pub fn span(&self) -> String {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => format!("{first}..{last}"),
            _ => "(empty)".into(),
        }
    }
}
