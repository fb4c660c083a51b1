//! Canonical feature schema and scaling derived once from historical data.
//!
//! Every vector the engine produces (scaled training rows, centroids, scored applicants)
//! is indexed against [`FeatureSchema::encoded_columns`]; that order is fixed here and
//! never changes afterwards.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::dataset::{FieldValue, HistoricalDataset};
use super::error::SchemaError;

/// Fill value for categorical fields that were never observed.
pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

/// How one raw field is imputed and laid out in the encoded vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldEncoding {
    Numeric {
        fill: f64,
        column: usize,
    },
    /// Expansion columns for `levels` occupy `first_column..first_column + levels.len()`.
    Categorical {
        fill: String,
        reference: String,
        levels: Vec<String>,
        first_column: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub encoding: FieldEncoding,
}

impl FieldSpec {
    pub fn is_numeric(&self) -> bool {
        matches!(self.encoding, FieldEncoding::Numeric { .. })
    }

    /// Imputation value used for historical gaps.
    pub fn imputation_rule(&self) -> FieldValue {
        match &self.encoding {
            FieldEncoding::Numeric { fill, .. } => FieldValue::Number(*fill),
            FieldEncoding::Categorical { fill, .. } => FieldValue::Text(fill.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    fields: Vec<FieldSpec>,
    encoded_columns: Vec<String>,
}

impl FeatureSchema {
    pub fn derive(dataset: &HistoricalDataset) -> Result<Self, SchemaError> {
        if dataset.is_empty() {
            return Err(SchemaError::EmptyDataset);
        }
        if dataset.feature_names().is_empty() {
            return Err(SchemaError::NoFeatures);
        }

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for (index, name) in dataset.feature_names().iter().enumerate() {
            let observed: Vec<&FieldValue> = dataset.column(index).flatten().collect();
            if !observed.is_empty() && observed.iter().all(|value| value.is_number()) {
                let values: Vec<f64> = observed.iter().filter_map(|v| v.to_number()).collect();
                numeric.push((index, name, median(values)));
            } else {
                let fill = most_frequent(&observed);
                let seen = first_seen_levels(dataset, index, &fill);
                categorical.push((index, name, fill, seen));
            }
        }

        let mut specs: Vec<Option<FieldSpec>> = vec![None; dataset.feature_names().len()];
        let mut encoded_columns = Vec::new();

        for (index, name, fill) in numeric {
            specs[index] = Some(FieldSpec {
                name: name.clone(),
                encoding: FieldEncoding::Numeric {
                    fill,
                    column: encoded_columns.len(),
                },
            });
            encoded_columns.push(name.clone());
        }

        for (index, name, fill, mut levels) in categorical {
            let reference = levels.remove(0);
            let first_column = encoded_columns.len();
            encoded_columns.extend(levels.iter().map(|level| format!("{name}_{level}")));
            specs[index] = Some(FieldSpec {
                name: name.clone(),
                encoding: FieldEncoding::Categorical {
                    fill,
                    reference,
                    levels,
                    first_column,
                },
            });
        }

        if encoded_columns.is_empty() {
            return Err(SchemaError::NoFeatures);
        }

        let mut unique = HashSet::new();
        if let Some(duplicate) = encoded_columns
            .iter()
            .find(|column| !unique.insert(column.as_str()))
        {
            return Err(SchemaError::DuplicateColumn(duplicate.clone()));
        }

        Ok(Self {
            fields: specs.into_iter().flatten().collect(),
            encoded_columns,
        })
    }

    /// Raw fields in dataset order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn raw_feature_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.is_numeric())
            .map(|field| field.name.as_str())
    }

    pub fn categorical_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| !field.is_numeric())
            .map(|field| field.name.as_str())
    }

    pub fn imputation_rules(&self) -> BTreeMap<&str, FieldValue> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.imputation_rule()))
            .collect()
    }

    /// Non-reference levels of a categorical field, in first-seen order.
    pub fn categorical_levels(&self, field: &str) -> Option<&[String]> {
        match &self.field(field)?.encoding {
            FieldEncoding::Categorical { levels, .. } => Some(levels),
            FieldEncoding::Numeric { .. } => None,
        }
    }

    pub fn reference_level(&self, field: &str) -> Option<&str> {
        match &self.field(field)?.encoding {
            FieldEncoding::Categorical { reference, .. } => Some(reference),
            FieldEncoding::Numeric { .. } => None,
        }
    }

    pub fn encoded_columns(&self) -> &[String] {
        &self.encoded_columns
    }

    pub fn width(&self) -> usize {
        self.encoded_columns.len()
    }

    /// Imputes and one-hot encodes every historical record (unscaled).
    pub fn encode_dataset(&self, dataset: &HistoricalDataset) -> Vec<Vec<f64>> {
        dataset
            .records()
            .iter()
            .map(|record| {
                let mut row = vec![0.0; self.width()];
                for (field, value) in self.fields.iter().zip(&record.features) {
                    match &field.encoding {
                        FieldEncoding::Numeric { fill, column } => {
                            row[*column] = value.as_ref().and_then(FieldValue::to_number).unwrap_or(*fill);
                        }
                        FieldEncoding::Categorical {
                            fill,
                            levels,
                            first_column,
                            ..
                        } => {
                            let level = value.as_ref().map_or_else(|| fill.clone(), FieldValue::level);
                            set_level(&mut row, levels, *first_column, &level);
                        }
                    }
                }
                row
            })
            .collect()
    }
}

/// Sets the expansion column for `level`; returns false when it maps to the reference level.
pub(crate) fn set_level(row: &mut [f64], levels: &[String], first_column: usize, level: &str) -> bool {
    match levels.iter().position(|candidate| candidate == level) {
        Some(offset) => {
            if let Some(slot) = row.get_mut(first_column + offset) {
                *slot = 1.0;
            }
            true
        }
        None => false,
    }
}

/// Per encoded column standardization fitted on the imputed historical data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingParameters {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl ScalingParameters {
    /// Population mean and standard deviation per column. Constant columns get std 1.
    pub fn fit(rows: &[Vec<f64>], width: usize) -> Self {
        let count = rows.len().max(1) as f64;
        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= count;
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for ((spread, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                *spread += (value - mean).powi(2);
            }
        }
        for (spread, mean) in stds.iter_mut().zip(&means) {
            let std = (*spread / count).sqrt();
            *spread = if std < 10.0 * f64::EPSILON * mean.abs().max(1.0) {
                1.0
            } else {
                std
            };
        }

        Self { means, stds }
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn dimension(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, values: &mut [f64]) {
        for ((value, mean), std) in values.iter_mut().zip(&self.means).zip(&self.stds) {
            *value = (*value - mean) / std;
        }
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let middle = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[middle - 1] + values[middle]) / 2.0
    } else {
        values[middle]
    }
}

/// Most frequent level; ties resolve to the lexicographically smallest.
fn most_frequent(observed: &[&FieldValue]) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in observed {
        *counts.entry(value.level()).or_default() += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (level, count) in counts {
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((level, count));
        }
    }
    best.map_or_else(|| UNKNOWN_LEVEL.to_string(), |(level, _)| level)
}

fn first_seen_levels(dataset: &HistoricalDataset, index: usize, fill: &str) -> Vec<String> {
    let mut levels: Vec<String> = Vec::new();
    for value in dataset.column(index) {
        let level = value.map_or_else(|| fill.to_string(), FieldValue::level);
        if !levels.contains(&level) {
            levels.push(level);
        }
    }
    levels
}
