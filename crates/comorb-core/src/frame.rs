//! Conversions between model tables and polars data frames.
//!
//! Frames are the exchange format with the external scorer and the CSV
//! writers; the pipeline itself works on the typed model tables.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};

use comorb_common::{any_to_count, any_to_f64, any_to_string};
use comorb_model::{ComorbidityMatrix, PATIENT_ID_COLUMN, RiskScoreSeries};

use crate::error::ScorerError;

/// Matrix as a frame: `patient_id` followed by one `i64` column per category.
pub fn matrix_to_frame(matrix: &ComorbidityMatrix) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(matrix.categories().len() + 1);
    columns.push(
        Series::new(PATIENT_ID_COLUMN.into(), matrix.patient_ids().to_vec()).into_column(),
    );
    for (col, name) in matrix.categories().iter().enumerate() {
        let values: Vec<i64> = matrix.rows().map(|(_, row)| row[col]).collect();
        columns.push(Series::new(name.as_str().into(), values).into_column());
    }
    DataFrame::new(columns)
}

/// Reads a matrix frame produced by the scorer.
///
/// Every column except `id_column` is a category. When `expected` is given the
/// frame must carry exactly those categories; columns are then reordered to
/// match `expected` so matrices from both ICD revisions share one layout.
pub fn matrix_from_frame(
    df: &DataFrame,
    id_column: &str,
    expected: Option<&[&str]>,
) -> Result<ComorbidityMatrix, ScorerError> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    if !names.iter().any(|name| name == id_column) {
        return Err(ScorerError::Output(format!(
            "missing patient id column '{id_column}'"
        )));
    }
    let found: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| *name != id_column)
        .collect();

    let categories: Vec<&str> = match expected {
        Some(expected) => {
            let missing: Vec<&str> = expected
                .iter()
                .copied()
                .filter(|name| !found.contains(name))
                .collect();
            let extra: Vec<&str> = found
                .iter()
                .copied()
                .filter(|name| !expected.contains(name))
                .collect();
            if !missing.is_empty() || !extra.is_empty() {
                return Err(ScorerError::Output(format!(
                    "category columns differ from the catalog (missing: [{}], unexpected: [{}])",
                    missing.join(", "),
                    extra.join(", ")
                )));
            }
            expected.to_vec()
        }
        None => found,
    };

    let ids = df.column(id_column)?;
    let cells: Vec<&Column> = categories
        .iter()
        .map(|name| df.column(name))
        .collect::<PolarsResult<_>>()?;

    let mut matrix = ComorbidityMatrix::new(categories.iter().copied());
    for idx in 0..df.height() {
        let patient_id = any_to_string(ids.get(idx)?);
        let mut values = Vec::with_capacity(cells.len());
        for (column, name) in cells.iter().zip(&categories) {
            let value = column.get(idx)?;
            let count = any_to_count(value.clone()).ok_or_else(|| {
                ScorerError::Output(format!(
                    "category '{name}' has non-count value '{value}' for row {idx}"
                ))
            })?;
            values.push(count);
        }
        matrix.push_row(patient_id, values)?;
    }
    Ok(matrix)
}

/// Reads a single numeric score column, one value per row.
pub fn scores_from_frame(df: &DataFrame, column: &str) -> Result<Vec<f64>, ScorerError> {
    let scores = df.column(column)?;
    (0..df.height())
        .map(|idx| {
            let value = scores.get(idx)?;
            any_to_f64(value.clone()).ok_or_else(|| {
                ScorerError::Output(format!("score '{value}' in row {idx} is not numeric"))
            })
        })
        .collect()
}

/// Risk series as a frame: `patient_id` then one `f64` column per month.
pub fn risk_series_to_frame(series: &RiskScoreSeries) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(series.months().len() + 1);
    columns.push(
        Series::new(PATIENT_ID_COLUMN.into(), series.patient_ids().to_vec()).into_column(),
    );
    for (col, label) in series.column_labels().into_iter().enumerate() {
        let values: Vec<f64> = series.rows().map(|(_, scores)| scores[col]).collect();
        columns.push(Series::new(label.into(), values).into_column());
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use comorb_model::PatientScore;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).expect("valid frame")
    }

    #[test]
    fn matrix_frame_round_trip_keeps_layout() {
        let matrix = ComorbidityMatrix::from_rows(
            ["chf", "diab"],
            vec![("P1".to_string(), vec![1, 0]), ("P2".to_string(), vec![0, 1])],
        )
        .expect("matrix");
        let df = matrix_to_frame(&matrix).expect("to frame");
        assert_eq!(df.shape(), (2, 3));

        let back = matrix_from_frame(&df, PATIENT_ID_COLUMN, None).expect("from frame");
        assert_eq!(back, matrix);
    }

    #[test]
    fn scorer_frame_is_reordered_to_catalog() {
        let df = frame(vec![
            Series::new("patient_id".into(), vec![1001_i64, 1002]).into_column(),
            Series::new("diab".into(), vec![true, false]).into_column(),
            Series::new("chf".into(), vec![0_i64, 1]).into_column(),
        ]);
        let matrix =
            matrix_from_frame(&df, "patient_id", Some(&["chf", "diab"][..])).expect("from frame");
        assert_eq!(matrix.categories(), ["chf", "diab"]);
        assert_eq!(matrix.row("1001"), Some(&[0, 1][..]));
        assert_eq!(matrix.row("1002"), Some(&[1, 0][..]));
    }

    #[test]
    fn unexpected_categories_are_reported() {
        let df = frame(vec![
            Series::new("patient_id".into(), vec!["P1"]).into_column(),
            Series::new("chf".into(), vec![1_i64]).into_column(),
            Series::new("mystery".into(), vec![1_i64]).into_column(),
        ]);
        let err = matrix_from_frame(&df, "patient_id", Some(&["chf", "diab"][..])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing: [diab]"), "{message}");
        assert!(message.contains("unexpected: [mystery]"), "{message}");
    }

    #[test]
    fn fractional_category_cells_are_reported() {
        let df = frame(vec![
            Series::new("patient_id".into(), vec!["P1", "P2"]).into_column(),
            Series::new("chf".into(), vec![1.0_f64, 1.7]).into_column(),
        ]);
        let message = matrix_from_frame(&df, "patient_id", None)
            .unwrap_err()
            .to_string();
        assert!(message.contains("category 'chf'"), "{message}");
        assert!(message.contains("row 1"), "{message}");
    }

    #[test]
    fn scores_reject_missing_values() {
        let df = frame(vec![
            Series::new("score".into(), vec![Some(1.5), None]).into_column(),
        ]);
        assert!(scores_from_frame(&df, "score").is_err());

        let ok = frame(vec![Series::new("score".into(), vec![1.5, 0.0]).into_column()]);
        assert_eq!(scores_from_frame(&ok, "score").expect("scores"), vec![1.5, 0.0]);
    }

    #[test]
    fn risk_frame_has_month_columns() {
        let mut series = RiskScoreSeries::new();
        let feb = NaiveDate::from_ymd_opt(2021, 2, 1).expect("valid date");
        series
            .merge_month(feb, &[PatientScore::new("P1", 2.0)])
            .expect("merge");
        let df = risk_series_to_frame(&series).expect("frame");
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["patient_id", "Risk_2021-02-01"]);
    }
}
