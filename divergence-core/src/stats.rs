//! Pearson correlation and its sign-derived label.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("correlation needs at least one row, got none")]
    EmptyInput,

    #[error("column lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Sample Pearson correlation of two equal-length columns.
///
/// Returns `NaN` for a single row or when either column has zero variance,
/// matching pandas' `Series.corr`. Empty input is an error.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, StatsError> {
    if xs.len() != ys.len() {
        return Err(StatsError::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }
    if xs.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    if xs.len() < 2 {
        return Ok(f64::NAN);
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(f64::NAN);
    }

    Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Direction of a linear relationship, derived from the correlation's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Inverse,
    Positive,
    None,
    Undefined,
}

impl Relationship {
    pub fn from_correlation(r: f64) -> Self {
        if r.is_nan() {
            Relationship::Undefined
        } else if r < 0.0 {
            Relationship::Inverse
        } else if r > 0.0 {
            Relationship::Positive
        } else {
            Relationship::None
        }
    }

    /// Annotation text, e.g. "Inverse relationship".
    pub fn label(self) -> &'static str {
        match self {
            Relationship::Inverse => "Inverse relationship",
            Relationship::Positive => "Positive relationship",
            Relationship::None => "No linear relationship",
            Relationship::Undefined => "Undefined relationship",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_positive_and_negative() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];

        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_value() {
        // cov = 8, var_x = 10, var_y = 10 → r = 0.8
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 5.0];
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 0.8).abs() < 1e-12, "got {r}");
    }

    #[test]
    fn zero_variance_is_nan() {
        let r = pearson(&[100.0, 102.0], &[5.0, 5.0]).unwrap();
        assert!(r.is_nan());
    }

    #[test]
    fn single_row_is_nan() {
        assert!(pearson(&[1.0], &[2.0]).unwrap().is_nan());
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(pearson(&[], &[]), Err(StatsError::EmptyInput));
    }

    #[test]
    fn length_mismatch_fails() {
        assert_eq!(
            pearson(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn relationship_follows_sign() {
        assert_eq!(Relationship::from_correlation(-0.42), Relationship::Inverse);
        assert_eq!(Relationship::from_correlation(0.42), Relationship::Positive);
        assert_eq!(Relationship::from_correlation(0.0), Relationship::None);
        assert_eq!(Relationship::from_correlation(f64::NAN), Relationship::Undefined);
        assert_eq!(Relationship::Inverse.to_string(), "Inverse relationship");
    }
}
