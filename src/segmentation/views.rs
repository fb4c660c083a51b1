use chrono::{DateTime, Utc};
use serde::Serialize;

use super::context::SegmentationContext;
use super::encoding::ApplicantRecord;
use super::scoring::{Recommendation, RiskLevel, ScoreResult};

/// Prediction payload returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub cluster_id: usize,
    pub distance_to_centroid: f64,
    pub default_rate: f64,
    pub approval_rate: f64,
    pub cluster_size: usize,
    pub recommendation: Recommendation,
    pub risk_level: RiskLevel,
    pub color: &'static str,
    pub confidence: f64,
}

impl From<&ScoreResult> for PredictionView {
    fn from(result: &ScoreResult) -> Self {
        Self {
            cluster_id: result.cluster_id,
            distance_to_centroid: result.distance,
            default_rate: result.default_rate,
            approval_rate: result.approval_rate,
            cluster_size: result.cluster_size,
            recommendation: result.recommendation,
            risk_level: result.risk_level,
            color: result.risk_level.color(),
            confidence: result.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub prediction: PredictionView,
    pub input: ApplicantRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummaryView {
    pub id: usize,
    pub default_rate: f64,
    pub approval_rate: f64,
    pub size: usize,
    pub percentage: f64,
}

/// Overview of every segment plus model metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterOverview {
    pub clusters: Vec<ClusterSummaryView>,
    pub total_records: usize,
    pub encoded_columns: usize,
    pub initialized_at: DateTime<Utc>,
}

impl ClusterOverview {
    pub fn from_context(context: &SegmentationContext) -> Self {
        let statistics = context.statistics();
        let clusters = statistics
            .iter()
            .map(|profile| ClusterSummaryView {
                id: profile.cluster_id,
                default_rate: profile.default_rate,
                approval_rate: profile.approval_rate,
                size: profile.size,
                percentage: statistics.percentage(profile),
            })
            .collect();

        Self {
            clusters,
            total_records: statistics.total_records(),
            encoded_columns: context.schema().width(),
            initialized_at: context.initialized_at(),
        }
    }
}
