use super::common::*;

use crate::segmentation::encoding::EncodedVector;
use crate::segmentation::model::ClusterModel;
use crate::segmentation::scoring::{recommend, score_vector, Recommendation, RiskLevel};
use crate::segmentation::statistics::{ClusterProfile, ClusterStatistics};

fn three_segments() -> (ClusterModel, ClusterStatistics) {
    let model = ClusterModel::from_centroids(vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![0.0, 10.0]])
        .expect("valid centroids");
    let statistics = ClusterStatistics::from_profiles([
        ClusterProfile::new(0, 100, 10),
        ClusterProfile::new(1, 50, 20),
        ClusterProfile::new(2, 40, 30),
    ]);
    (model, statistics)
}

#[test]
fn recommend_applies_approval_thresholds() {
    assert_eq!(recommend(0.9), (Recommendation::Eligible, RiskLevel::Low));
    assert_eq!(recommend(0.7), (Recommendation::Eligible, RiskLevel::Low));
    assert_eq!(
        recommend(0.69),
        (Recommendation::EligibleWithConditions, RiskLevel::Medium)
    );
    assert_eq!(
        recommend(0.5),
        (Recommendation::EligibleWithConditions, RiskLevel::Medium)
    );
    assert_eq!(recommend(0.49), (Recommendation::NotEligible, RiskLevel::High));
}

#[test]
fn risk_levels_map_to_colours() {
    assert_eq!(RiskLevel::Low.color(), "green");
    assert_eq!(RiskLevel::Medium.color(), "yellow");
    assert_eq!(RiskLevel::High.color(), "red");
    assert_eq!(Recommendation::EligibleWithConditions.label(), "ELIGIBLE_WITH_CONDITIONS");
}

#[test]
fn score_vector_reports_nearest_segment_history() {
    let (model, statistics) = three_segments();
    let result = score_vector(&EncodedVector::from(vec![9.0, 0.0]), &model, &statistics);

    assert_eq!(result.cluster_id, 1);
    assert_close(result.distance, 1.0);
    assert_eq!(result.cluster_size, 50);
    assert_close(result.default_rate, 0.4);
    assert_close(result.approval_rate, 0.6);
    assert_eq!(result.recommendation, Recommendation::EligibleWithConditions);
    assert_eq!(result.risk_level, RiskLevel::Medium);
}

#[test]
fn confidence_compares_nearest_and_farthest_centroids() {
    let (model, statistics) = three_segments();

    // distances 1, 9 and sqrt(101)
    let result = score_vector(&EncodedVector::from(vec![1.0, 0.0]), &model, &statistics);
    assert_eq!(result.cluster_id, 0);
    assert_close(result.confidence, (1.0 - 1.0 / 101f64.sqrt()) * 100.0);
    assert_eq!(result.recommendation, Recommendation::Eligible);

    let on_centroid = score_vector(&EncodedVector::from(vec![0.0, 10.0]), &model, &statistics);
    assert_eq!(on_centroid.cluster_id, 2);
    assert_close(on_centroid.confidence, 100.0);
    assert_eq!(on_centroid.risk_level, RiskLevel::High);
}

#[test]
fn confidence_is_zero_when_all_centroids_coincide() {
    let model = ClusterModel::from_centroids(vec![vec![2.0], vec![2.0]]).expect("valid");
    let statistics = ClusterStatistics::from_profiles([
        ClusterProfile::new(0, 4, 1),
        ClusterProfile::new(1, 4, 3),
    ]);

    let result = score_vector(&EncodedVector::from(vec![2.0]), &model, &statistics);
    assert_eq!(result.cluster_id, 0);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn missing_profiles_score_as_unobserved() {
    let model = ClusterModel::from_centroids(vec![vec![0.0], vec![5.0]]).expect("valid");
    let statistics = ClusterStatistics::from_profiles([ClusterProfile::new(0, 10, 9)]);

    let result = score_vector(&EncodedVector::from(vec![5.0]), &model, &statistics);
    assert_eq!(result.cluster_id, 1);
    assert_eq!(result.cluster_size, 0);
    assert_eq!(result.default_rate, 0.0);
    assert_eq!(result.approval_rate, 1.0);
    assert_eq!(result.recommendation, Recommendation::Eligible);
}

#[test]
fn equidistant_centroids_give_zero_confidence_and_lowest_id() {
    let model = ClusterModel::from_centroids(vec![vec![-1.0], vec![1.0]]).expect("valid");
    let statistics = ClusterStatistics::from_profiles([
        ClusterProfile::new(0, 10, 8),
        ClusterProfile::new(1, 10, 1),
    ]);

    let result = score_vector(&EncodedVector::from(vec![0.0]), &model, &statistics);
    assert_eq!(result.cluster_id, 0);
    assert_close(result.distance, 1.0);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.recommendation, Recommendation::NotEligible);
}

#[test]
fn overflowing_distances_keep_confidence_in_bounds() {
    let (model, statistics) = three_segments();

    let result = score_vector(&EncodedVector::from(vec![1e200, 0.0]), &model, &statistics);
    assert!(result.distance.is_infinite());
    assert_eq!(result.confidence, 0.0);
}
