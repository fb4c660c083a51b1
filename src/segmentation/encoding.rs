use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::dataset::FieldValue;
use super::error::ValidationError;
use super::schema::{set_level, FeatureSchema, FieldEncoding, ScalingParameters};

/// Untrusted applicant input: a flat mapping from field name to number or category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantRecord(BTreeMap<String, FieldValue>);

impl ApplicantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Field-aware conversion from a decoded JSON object; `null`, booleans and nested
/// values are rejected with the offending field name.
impl TryFrom<serde_json::Map<String, Value>> for ApplicantRecord {
    type Error = ValidationError;

    fn try_from(object: serde_json::Map<String, Value>) -> Result<Self, Self::Error> {
        object
            .into_iter()
            .map(|(field, value)| {
                let value = match value {
                    Value::Number(number) => match number.as_f64() {
                        Some(number) => FieldValue::Number(number),
                        None => {
                            return Err(ValidationError::OutOfRange {
                                field,
                                value: number.to_string(),
                            })
                        }
                    },
                    Value::String(text) => FieldValue::Text(text),
                    Value::Null => return Err(unsupported(field, "null")),
                    Value::Bool(_) => return Err(unsupported(field, "a boolean")),
                    Value::Array(_) => return Err(unsupported(field, "an array")),
                    Value::Object(_) => return Err(unsupported(field, "an object")),
                };
                Ok((field, value))
            })
            .collect()
    }
}

fn unsupported(field: String, kind: &'static str) -> ValidationError {
    ValidationError::UnsupportedValue { field, kind }
}

impl FromIterator<(String, FieldValue)> for ApplicantRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Scaled applicant vector aligned with the schema's encoded columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedVector(Vec<f64>);

impl EncodedVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for EncodedVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// One-hot encodes an applicant against the schema without scaling.
///
/// Every raw field is required; live input is never imputed. Categorical levels the
/// schema has not seen fold into the reference level, leaving all expansion columns 0.
pub fn encode_raw(
    record: &ApplicantRecord,
    schema: &FeatureSchema,
) -> Result<Vec<f64>, ValidationError> {
    let mut row = vec![0.0; schema.width()];

    for field in schema.fields() {
        let value = record
            .get(&field.name)
            .ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;

        match &field.encoding {
            FieldEncoding::Numeric { column, .. } => {
                let number = value.to_number().ok_or_else(|| ValidationError::NotNumeric {
                    field: field.name.clone(),
                    value: value.to_string(),
                })?;
                if let Some(slot) = row.get_mut(*column) {
                    *slot = number;
                }
            }
            FieldEncoding::Categorical {
                reference,
                levels,
                first_column,
                ..
            } => {
                let level = value.level();
                if !set_level(&mut row, levels, *first_column, &level) && level != *reference {
                    debug!(
                        field = %field.name,
                        level = %level,
                        "unseen categorical level folded into reference level"
                    );
                }
            }
        }
    }

    Ok(row)
}

/// Largest standardized magnitude accepted; squared distances over it stay finite.
const MAX_SCALED_MAGNITUDE: f64 = 1e150;

/// Encodes and standardizes an applicant with the stored training-time scaling.
///
/// Numeric fields whose standardized value exceeds [`MAX_SCALED_MAGNITUDE`] are rejected.
pub fn encode_applicant(
    record: &ApplicantRecord,
    schema: &FeatureSchema,
    scaling: &ScalingParameters,
) -> Result<EncodedVector, ValidationError> {
    let mut values = encode_raw(record, schema)?;
    scaling.transform(&mut values);

    for field in schema.fields() {
        if let FieldEncoding::Numeric { column, .. } = field.encoding {
            let scaled = values.get(column).copied().unwrap_or_default();
            if !scaled.is_finite() || scaled.abs() > MAX_SCALED_MAGNITUDE {
                let raw = record.get(&field.name).map(FieldValue::to_string).unwrap_or_default();
                return Err(ValidationError::OutOfRange {
                    field: field.name.clone(),
                    value: raw,
                });
            }
        }
    }

    Ok(EncodedVector(values))
}
