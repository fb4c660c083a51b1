/// Raised while deriving the feature schema from historical data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("historical dataset is empty")]
    EmptyDataset,
    #[error("historical dataset yields no usable feature columns")]
    NoFeatures,
    #[error("label column '{0}' not found in historical dataset")]
    MissingLabelColumn(String),
    #[error("record {row} has invalid loan status '{value}' (expected 0 or 1)")]
    InvalidLabel { row: usize, value: String },
    #[error("record {row} has invalid cluster id '{value}'")]
    InvalidClusterLabel { row: usize, value: String },
    #[error("record {row} has {actual} feature values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("encoded column '{0}' is produced by more than one field")]
    DuplicateColumn(String),
}

/// Raised while fitting or assembling the cluster model and its statistics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("cluster count must be at least 1 (got {0})")]
    InvalidClusterCount(usize),
    #[error("cannot fit clusters over an empty encoded dataset")]
    EmptyDataset,
    #[error("cluster count {k} exceeds the {records} available records")]
    TooFewRecords { k: usize, records: usize },
    #[error("cluster count unavailable: dataset carries no cluster labels and none was configured")]
    ClusterCountUnavailable,
    #[error("centroid {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("model and scaling span {actual} columns but the schema encodes {expected}")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error("record {row} has no cluster label")]
    MissingClusterLabel { row: usize },
    #[error("record {row} is assigned to cluster {cluster}, outside 0..{k}")]
    ClusterOutOfRange { row: usize, cluster: usize, k: usize },
    #[error("{assignments} cluster assignments supplied for {records} records")]
    AssignmentCount { assignments: usize, records: usize },
    #[error("statistics reference cluster {cluster} but the model has {k} clusters")]
    StatisticsMismatch { cluster: usize, k: usize },
}

/// Per-call rejection of an applicant record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field \"{0}\" is required")]
    MissingField(String),
    #[error("field \"{field}\" must be numeric (got \"{value}\")")]
    NotNumeric { field: String, value: String },
    #[error("field \"{field}\" is out of range (got {value})")]
    OutOfRange { field: String, value: String },
    #[error("field \"{field}\" must be a number or a string (got {kind})")]
    UnsupportedValue { field: String, kind: &'static str },
}

impl ValidationError {
    /// Name of the offending applicant field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::NotNumeric { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::UnsupportedValue { field, .. } => field,
        }
    }
}

/// Fatal startup failure; no scoring may be served until initialization succeeds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitializationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure reading the historical dataset from disk or CSV text.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read historical dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid historical dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
