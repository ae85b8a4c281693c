use super::align::AlignedTable;
use chrono::Datelike;
use polars::prelude::*;

/// Name of the date column in the aligned frame.
pub const DATE_COLUMN: &str = "Date";

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Expected schema for the aligned table
pub struct TableSchema;

impl TableSchema {
    /// Get the aligned-table schema for the given value column names
    pub fn schema(price_column: &str, macro_column: &str) -> Schema {
        Schema::from_iter(vec![
            Field::new(DATE_COLUMN.into(), DataType::Date),
            Field::new(price_column.into(), DataType::Float64),
            Field::new(macro_column.into(), DataType::Float64),
        ])
    }

    /// Validate a DataFrame against the schema: columns, dtypes, and no nulls in value columns
    pub fn validate(df: &DataFrame, price_column: &str, macro_column: &str) -> Result<(), SchemaError> {
        let expected = Self::schema(price_column, macro_column);
        let actual = df.schema();

        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        for column in [price_column, macro_column] {
            let nulls = df.column(column)?.null_count();
            if nulls > 0 {
                return Err(SchemaError::NullValues {
                    column: column.to_string(),
                    count: nulls,
                });
            }
        }

        Ok(())
    }
}

impl AlignedTable {
    /// Columnar view: `Date` (dtype `Date`) plus the two `Float64` value columns.
    pub fn to_frame(&self) -> Result<DataFrame, SchemaError> {
        let days: Vec<i32> = self
            .rows()
            .iter()
            .map(|r| r.date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
            .collect();

        let date = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;
        let price = Series::new(self.price_column.as_str().into(), self.prices());
        let macro_values = Series::new(self.macro_column.as_str().into(), self.macro_values());

        Ok(DataFrame::new(vec![
            date.into(),
            price.into(),
            macro_values.into(),
        ])?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("Column {column} has {count} missing values")]
    NullValues { column: String, count: usize },

    #[error("polars: {0}")]
    Polars(#[from] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::align::AlignedRow;
    use chrono::NaiveDate;

    fn table() -> AlignedTable {
        AlignedTable::new(
            "AFRM_Price",
            "Savings_Rate",
            vec![
                AlignedRow {
                    date: NaiveDate::from_ymd_opt(1970, 1, 2).unwrap(),
                    price: 100.0,
                    macro_value: 5.0,
                },
                AlignedRow {
                    date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
                    price: 102.0,
                    macro_value: 5.0,
                },
            ],
        )
    }

    #[test]
    fn frame_matches_schema() {
        let df = table().to_frame().unwrap();
        assert_eq!(df.height(), 2);
        assert!(TableSchema::validate(&df, "AFRM_Price", "Savings_Rate").is_ok());
    }

    #[test]
    fn frame_dates_are_days_since_epoch() {
        let df = table().to_frame().unwrap();
        let physical = df
            .column(DATE_COLUMN)
            .unwrap()
            .cast(&DataType::Int32)
            .unwrap();
        let days = physical.i32().unwrap();
        assert_eq!(days.get(0), Some(1));
        assert_eq!(days.get(1), Some(19_360));
    }

    #[test]
    fn validate_rejects_missing_column() {
        let df = DataFrame::new(vec![
            Series::new("Date".into(), &[1i32]).cast(&DataType::Date).unwrap().into(),
            Series::new("AFRM_Price".into(), &[100.0]).into(),
        ])
        .unwrap();

        let result = TableSchema::validate(&df, "AFRM_Price", "Savings_Rate");
        assert!(matches!(result.unwrap_err(), SchemaError::MissingColumn(_)));
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let df = DataFrame::new(vec![
            Series::new("Date".into(), &[1i32]).cast(&DataType::Date).unwrap().into(),
            Series::new("AFRM_Price".into(), &["not_a_number"]).into(),
            Series::new("Savings_Rate".into(), &[5.0]).into(),
        ])
        .unwrap();

        let result = TableSchema::validate(&df, "AFRM_Price", "Savings_Rate");
        assert!(matches!(result.unwrap_err(), SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn validate_rejects_nulls() {
        let df = DataFrame::new(vec![
            Series::new("Date".into(), &[1i32, 2]).cast(&DataType::Date).unwrap().into(),
            Series::new("AFRM_Price".into(), &[Some(100.0), None]).into(),
            Series::new("Savings_Rate".into(), &[5.0, 5.0]).into(),
        ])
        .unwrap();

        let result = TableSchema::validate(&df, "AFRM_Price", "Savings_Rate");
        assert!(matches!(
            result.unwrap_err(),
            SchemaError::NullValues { count: 1, .. }
        ));
    }
}
