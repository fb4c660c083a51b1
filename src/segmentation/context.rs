use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::dataset::HistoricalDataset;
use super::encoding::{encode_applicant, ApplicantRecord, EncodedVector};
use super::error::{InitializationError, ModelError, ValidationError};
use super::model::{ClusterModel, ModelOptions};
use super::samples::{HistoricalSamples, SAMPLES_PER_OUTCOME};
use super::schema::{FeatureSchema, ScalingParameters};
use super::scoring::{score_vector, ScoreResult};
use super::statistics::{dataset_cluster_labels, ClusterStatistics, StatisticsSource};

/// Immutable scoring state built once at startup and shared by every request.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationContext {
    schema: FeatureSchema,
    scaling: ScalingParameters,
    model: ClusterModel,
    statistics: ClusterStatistics,
    samples: HistoricalSamples,
    initialized_at: DateTime<Utc>,
}

impl SegmentationContext {
    /// Assembles a context from independently built parts, checking they agree on the
    /// encoded dimension and cluster ids.
    pub fn from_parts(
        schema: FeatureSchema,
        scaling: ScalingParameters,
        model: ClusterModel,
        statistics: ClusterStatistics,
    ) -> Result<Self, ModelError> {
        let width = schema.width();
        for actual in [scaling.dimension(), model.dimension()] {
            if actual != width {
                return Err(ModelError::SchemaMismatch {
                    expected: width,
                    actual,
                });
            }
        }

        let k = model.cluster_count();
        if let Some(profile) = statistics.iter().find(|profile| profile.cluster_id >= k) {
            return Err(ModelError::StatisticsMismatch {
                cluster: profile.cluster_id,
                k,
            });
        }

        Ok(Self {
            schema,
            scaling,
            model,
            statistics,
            samples: HistoricalSamples::default(),
            initialized_at: Utc::now(),
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaling(&self) -> &ScalingParameters {
        &self.scaling
    }

    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    pub fn statistics(&self) -> &ClusterStatistics {
        &self.statistics
    }

    /// Example historical records; empty unless attached with [`Self::with_samples`].
    pub fn samples(&self) -> &HistoricalSamples {
        &self.samples
    }

    pub fn with_samples(mut self, samples: HistoricalSamples) -> Self {
        self.samples = samples;
        self
    }

    pub fn initialized_at(&self) -> DateTime<Utc> {
        self.initialized_at
    }

    pub fn encode(&self, record: &ApplicantRecord) -> Result<EncodedVector, ValidationError> {
        encode_applicant(record, &self.schema, &self.scaling)
    }

    pub fn score(&self, record: &ApplicantRecord) -> Result<ScoreResult, ValidationError> {
        let vector = self.encode(record)?;
        Ok(score_vector(&vector, &self.model, &self.statistics))
    }
}

/// Builds the scoring context with default model options.
pub fn initialize(dataset: &HistoricalDataset) -> Result<SegmentationContext, InitializationError> {
    initialize_with(dataset, &ModelOptions::default())
}

pub fn initialize_with(
    dataset: &HistoricalDataset,
    options: &ModelOptions,
) -> Result<SegmentationContext, InitializationError> {
    let schema = FeatureSchema::derive(dataset)?;
    let encoded = schema.encode_dataset(dataset);
    let scaling = ScalingParameters::fit(&encoded, schema.width());
    let scaled: Vec<Vec<f64>> = encoded
        .into_iter()
        .map(|mut row| {
            scaling.transform(&mut row);
            row
        })
        .collect();

    let k = resolve_cluster_count(dataset, options)?;
    let model = ClusterModel::fit(&scaled, k, options)?;

    let assignments: Vec<usize> = match options.statistics_source {
        StatisticsSource::ModelAssignments => scaled
            .iter()
            .map(|row| model.assign(row).cluster_id)
            .collect(),
        StatisticsSource::DatasetLabels => dataset_cluster_labels(dataset, k)?,
    };
    let statistics = ClusterStatistics::aggregate(&assignments, dataset, k)?;

    info!(
        records = dataset.len(),
        raw_features = schema.fields().len(),
        encoded_columns = schema.width(),
        clusters = k,
        inertia = model.inertia().unwrap_or_default(),
        statistics_source = ?options.statistics_source,
        "segmentation context initialized"
    );

    let samples = HistoricalSamples::draw(dataset, SAMPLES_PER_OUTCOME, options.seed);
    Ok(SegmentationContext::from_parts(schema, scaling, model, statistics)?.with_samples(samples))
}

/// Scores one applicant against an initialized context.
pub fn score(
    record: &ApplicantRecord,
    context: &SegmentationContext,
) -> Result<ScoreResult, ValidationError> {
    context.score(record)
}

fn resolve_cluster_count(
    dataset: &HistoricalDataset,
    options: &ModelOptions,
) -> Result<usize, ModelError> {
    match options.cluster_count {
        Some(k) => Ok(k),
        None => dataset
            .max_cluster_label()
            .map(|label| label + 1)
            .ok_or(ModelError::ClusterCountUnavailable),
    }
}
