mod policy;

pub use policy::{
    recommend, Recommendation, RiskLevel, CONDITIONAL_APPROVAL_RATE, ELIGIBLE_APPROVAL_RATE,
};

use serde::{Deserialize, Serialize};

use super::encoding::EncodedVector;
use super::model::{Assignment, ClusterModel};
use super::statistics::{ClusterProfile, ClusterStatistics};

/// Segment assignment and recommendation for one applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub cluster_id: usize,
    pub distance: f64,
    pub default_rate: f64,
    pub approval_rate: f64,
    pub cluster_size: usize,
    pub recommendation: Recommendation,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

/// Scores an encoded vector against the centroids. Pure; reads shared state only.
pub fn score_vector(
    vector: &EncodedVector,
    model: &ClusterModel,
    statistics: &ClusterStatistics,
) -> ScoreResult {
    debug_assert_eq!(vector.len(), model.dimension());

    let Assignment {
        cluster_id,
        distance,
    } = model.assign(vector.as_slice());
    let farthest = model
        .distances(vector.as_slice())
        .into_iter()
        .fold(0.0, f64::max);

    let confidence = if farthest > 0.0 && farthest.is_finite() && distance.is_finite() {
        ((1.0 - distance / farthest) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let profile = statistics
        .profile(cluster_id)
        .cloned()
        .unwrap_or_else(|| ClusterProfile::unobserved(cluster_id));
    let (recommendation, risk_level) = recommend(profile.approval_rate);

    ScoreResult {
        cluster_id,
        distance,
        default_rate: profile.default_rate,
        approval_rate: profile.approval_rate,
        cluster_size: profile.size,
        recommendation,
        risk_level,
        confidence,
    }
}
