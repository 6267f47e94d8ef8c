//! Patient × comorbidity-category matrix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Table keyed by patient id with one integer column per comorbidity category.
///
/// Row order is insertion order. Patient ids are unique; every row has one
/// value per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct ComorbidityMatrix {
    categories: Vec<String>,
    patient_ids: Vec<String>,
    values: Vec<Vec<i64>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Serialized form; the patient lookup is rebuilt on the way in.
#[derive(Deserialize)]
struct RawMatrix {
    categories: Vec<String>,
    patient_ids: Vec<String>,
    values: Vec<Vec<i64>>,
}

impl TryFrom<RawMatrix> for ComorbidityMatrix {
    type Error = ModelError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        if raw.patient_ids.len() != raw.values.len() {
            return Err(ModelError::RowCount {
                patient_ids: raw.patient_ids.len(),
                rows: raw.values.len(),
            });
        }
        Self::from_rows(raw.categories, raw.patient_ids.into_iter().zip(raw.values).collect())
    }
}

impl ComorbidityMatrix {
    /// Creates an empty matrix with the given category columns.
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builds a matrix from parallel patient ids and rows.
    pub fn from_rows<I, S>(categories: I, rows: Vec<(String, Vec<i64>)>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut matrix = Self::new(categories);
        for (patient_id, values) in rows {
            matrix.push_row(patient_id, values)?;
        }
        Ok(matrix)
    }

    /// Appends a patient row.
    pub fn push_row(&mut self, patient_id: impl Into<String>, values: Vec<i64>) -> Result<()> {
        let patient_id = patient_id.into();
        if values.len() != self.categories.len() {
            return Err(ModelError::RowWidth {
                patient_id,
                expected: self.categories.len(),
                found: values.len(),
            });
        }
        if self.index.contains_key(&patient_id) {
            return Err(ModelError::DuplicatePatient { patient_id });
        }
        self.index.insert(patient_id.clone(), self.patient_ids.len());
        self.patient_ids.push(patient_id);
        self.values.push(values);
        Ok(())
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn patient_ids(&self) -> &[String] {
        &self.patient_ids
    }

    pub fn height(&self) -> usize {
        self.patient_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patient_ids.is_empty()
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.index.contains_key(patient_id)
    }

    /// Category values for a patient, `None` if the patient is absent.
    pub fn row(&self, patient_id: &str) -> Option<&[i64]> {
        self.index
            .get(patient_id)
            .map(|&idx| self.values[idx].as_slice())
    }

    /// Single cell lookup by patient and category name.
    pub fn get(&self, patient_id: &str, category: &str) -> Option<i64> {
        let col = self.category_index(category)?;
        self.row(patient_id).map(|row| row[col])
    }

    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|name| name == category)
    }

    /// Iterates `(patient_id, values)` in row order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.patient_ids
            .iter()
            .zip(&self.values)
            .map(|(id, values)| (id.as_str(), values.as_slice()))
    }

    /// First cell whose value exceeds `limit`, as `(patient_id, category, value)`.
    pub fn first_value_above(&self, limit: i64) -> Option<(&str, &str, i64)> {
        self.rows().find_map(|(patient_id, values)| {
            values
                .iter()
                .position(|&value| value > limit)
                .map(|col| (patient_id, self.categories[col].as_str(), values[col]))
        })
    }

    /// Sum of all category cells per patient, in row order.
    pub fn row_totals(&self) -> Vec<i64> {
        self.values.iter().map(|row| row.iter().sum()).collect()
    }

    /// Number of patients flagged (value > 0) per category, in column order.
    pub fn prevalence(&self) -> Vec<usize> {
        (0..self.categories.len())
            .map(|col| self.values.iter().filter(|row| row[col] > 0).count())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ComorbidityMatrix {
        ComorbidityMatrix::from_rows(
            ["chf", "diab"],
            vec![
                ("P1".to_string(), vec![1, 0]),
                ("P2".to_string(), vec![0, 2]),
            ],
        )
        .expect("valid matrix")
    }

    #[test]
    fn rejects_duplicate_patients() {
        let mut matrix = sample();
        let err = matrix.push_row("P1", vec![0, 0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicatePatient {
                patient_id: "P1".to_string()
            }
        );
    }

    #[test]
    fn rejects_wrong_row_width() {
        let mut matrix = sample();
        let err = matrix.push_row("P3", vec![1]).unwrap_err();
        assert!(matches!(err, ModelError::RowWidth { expected: 2, found: 1, .. }));
    }

    #[test]
    fn cell_lookup_and_overflow_scan() {
        let matrix = sample();
        assert_eq!(matrix.get("P2", "diab"), Some(2));
        assert_eq!(matrix.get("P3", "diab"), None);
        assert_eq!(matrix.first_value_above(1), Some(("P2", "diab", 2)));
        assert_eq!(matrix.first_value_above(2), None);
    }

    #[test]
    fn totals_and_prevalence() {
        let matrix = sample();
        assert_eq!(matrix.row_totals(), vec![1, 2]);
        assert_eq!(matrix.prevalence(), vec![1, 1]);
    }
}
