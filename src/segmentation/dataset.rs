use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{DatasetError, SchemaError};

const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A",
];

/// A single raw feature value: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Parses a raw CSV cell, returning `None` for missing-value markers.
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return None;
        }

        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(Self::Number(number)),
            _ => Some(Self::Text(trimmed.to_string())),
        }
    }

    /// Numeric reading of the value; numeric strings are accepted.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite()),
        }
    }

    /// Categorical level this value maps to.
    pub fn level(&self) -> String {
        match self {
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Text(text) => text.clone(),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, FieldValue::Number(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Column names identifying the label and pre-assigned cluster in a CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub label_column: String,
    pub cluster_column: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            label_column: "loan_status".to_string(),
            cluster_column: "Cluster".to_string(),
        }
    }
}

/// One historical applicant. `features` is aligned with the dataset's feature names.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub features: Vec<Option<FieldValue>>,
    pub defaulted: bool,
    pub cluster: Option<usize>,
}

/// Labeled applicant history; the source of truth for schema, model and statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoricalDataset {
    feature_names: Vec<String>,
    records: Vec<HistoricalRecord>,
}

impl HistoricalDataset {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            feature_names,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: HistoricalRecord) -> Result<(), SchemaError> {
        if record.features.len() != self.feature_names.len() {
            return Err(SchemaError::RowWidth {
                row: self.records.len(),
                expected: self.feature_names.len(),
                actual: record.features.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn from_path<P: AsRef<Path>>(
        path: P,
        layout: &DatasetLayout,
    ) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, layout)
    }

    /// Reads a CSV export with a header row. Every column other than the label and
    /// cluster column becomes a feature, in header order.
    pub fn from_reader<R: Read>(reader: R, layout: &DatasetLayout) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let label_index = headers
            .iter()
            .position(|name| name == layout.label_column)
            .ok_or_else(|| SchemaError::MissingLabelColumn(layout.label_column.clone()))?;
        let cluster_index = headers
            .iter()
            .position(|name| name == layout.cluster_column);

        let feature_indices: Vec<usize> = (0..headers.len())
            .filter(|index| *index != label_index && Some(*index) != cluster_index)
            .collect();
        let feature_names = feature_indices
            .iter()
            .map(|index| headers[*index].to_string())
            .collect();

        let mut dataset = Self::new(feature_names);
        for (row, result) in csv_reader.records().enumerate() {
            let record = result?;
            let cell = |index: usize| record.get(index).unwrap_or("");

            let defaulted = parse_label(row, cell(label_index))?;
            let cluster = match cluster_index {
                Some(index) => parse_cluster(row, cell(index))?,
                None => None,
            };
            let features = feature_indices
                .iter()
                .map(|index| FieldValue::parse_cell(cell(*index)))
                .collect();

            dataset.push(HistoricalRecord {
                features,
                defaulted,
                cluster,
            })?;
        }

        Ok(dataset)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one feature column, `None` where missing.
    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&FieldValue>> + '_ {
        self.records
            .iter()
            .map(move |record| record.features.get(index).and_then(Option::as_ref))
    }

    /// Highest pre-assigned cluster id, if any record carries one.
    pub fn max_cluster_label(&self) -> Option<usize> {
        self.records.iter().filter_map(|record| record.cluster).max()
    }

    pub fn defaulted_count(&self) -> usize {
        self.records.iter().filter(|record| record.defaulted).count()
    }
}

fn parse_label(row: usize, raw: &str) -> Result<bool, SchemaError> {
    let invalid = || SchemaError::InvalidLabel {
        row,
        value: raw.to_string(),
    };

    match FieldValue::parse_cell(raw).and_then(|value| value.to_number()) {
        Some(number) if number == 0.0 => Ok(false),
        Some(number) if number == 1.0 => Ok(true),
        _ => Err(invalid()),
    }
}

fn parse_cluster(row: usize, raw: &str) -> Result<Option<usize>, SchemaError> {
    let Some(value) = FieldValue::parse_cell(raw) else {
        return Ok(None);
    };

    match value.to_number() {
        Some(number) if number >= 0.0 && number.fract() == 0.0 => Ok(Some(number as usize)),
        _ => Err(SchemaError::InvalidClusterLabel {
            row,
            value: raw.to_string(),
        }),
    }
}
