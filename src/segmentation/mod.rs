//! Credit risk segmentation: schema derivation, clustering, encoding and scoring.
//!
//! [`initialize`] runs once at startup and yields an immutable [`SegmentationContext`];
//! [`score`] is then safe to call concurrently from any number of requests.

pub mod context;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod model;
pub mod router;
pub mod samples;
pub mod schema;
pub mod scoring;
pub mod statistics;
pub mod views;

#[cfg(test)]
pub(crate) mod tests;

pub use context::{initialize, initialize_with, score, SegmentationContext};
pub use dataset::{DatasetLayout, FieldValue, HistoricalDataset, HistoricalRecord};
pub use encoding::{encode_applicant, encode_raw, ApplicantRecord, EncodedVector};
pub use error::{DatasetError, InitializationError, ModelError, SchemaError, ValidationError};
pub use model::{Assignment, ClusterModel, ModelOptions};
pub use router::segmentation_router;
pub use samples::{HistoricalSamples, SampleRecord, SAMPLES_PER_OUTCOME};
pub use schema::{FeatureSchema, FieldEncoding, FieldSpec, ScalingParameters, UNKNOWN_LEVEL};
pub use scoring::{score_vector, Recommendation, RiskLevel, ScoreResult};
pub use statistics::{ClusterProfile, ClusterStatistics, StatisticsSource};
pub use views::{ClusterOverview, ClusterSummaryView, PredictionResponse, PredictionView};
