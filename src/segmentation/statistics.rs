use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dataset::HistoricalDataset;
use super::error::ModelError;

/// Where each historical record's cluster id comes from when aggregating statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsSource {
    /// Assign every record with the fitted model so statistics match the centroids.
    #[default]
    ModelAssignments,
    /// Reuse the cluster column shipped with the dataset.
    DatasetLabels,
}

impl StatisticsSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "model" | "model_assignments" => Some(Self::ModelAssignments),
            "dataset" | "dataset_labels" => Some(Self::DatasetLabels),
            _ => None,
        }
    }
}

/// Historical outcome summary for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub cluster_id: usize,
    pub size: usize,
    pub default_rate: f64,
    pub approval_rate: f64,
}

impl ClusterProfile {
    pub fn new(cluster_id: usize, size: usize, defaulted: usize) -> Self {
        let default_rate = if size == 0 {
            0.0
        } else {
            defaulted as f64 / size as f64
        };
        Self {
            cluster_id,
            size,
            default_rate,
            approval_rate: 1.0 - default_rate,
        }
    }

    /// Profile reported for a cluster with no recorded history.
    pub fn unobserved(cluster_id: usize) -> Self {
        Self::new(cluster_id, 0, 0)
    }
}

/// Cluster id -> historical profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClusterStatistics {
    profiles: BTreeMap<usize, ClusterProfile>,
    total_records: usize,
}

impl ClusterStatistics {
    /// Groups records by their assigned cluster. Every id in `0..k` gets a profile.
    pub fn aggregate(
        assignments: &[usize],
        dataset: &HistoricalDataset,
        k: usize,
    ) -> Result<Self, ModelError> {
        if assignments.len() != dataset.len() {
            return Err(ModelError::AssignmentCount {
                assignments: assignments.len(),
                records: dataset.len(),
            });
        }

        let mut sizes = vec![0usize; k];
        let mut defaults = vec![0usize; k];
        for (row, (cluster, record)) in assignments.iter().zip(dataset.records()).enumerate() {
            if *cluster >= k {
                return Err(ModelError::ClusterOutOfRange {
                    row,
                    cluster: *cluster,
                    k,
                });
            }
            sizes[*cluster] += 1;
            if record.defaulted {
                defaults[*cluster] += 1;
            }
        }

        let profiles = sizes
            .into_iter()
            .zip(defaults)
            .enumerate()
            .map(|(cluster_id, (size, defaulted))| {
                (cluster_id, ClusterProfile::new(cluster_id, size, defaulted))
            })
            .collect();

        Ok(Self {
            profiles,
            total_records: dataset.len(),
        })
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = ClusterProfile>) -> Self {
        let profiles: BTreeMap<usize, ClusterProfile> = profiles
            .into_iter()
            .map(|profile| (profile.cluster_id, profile))
            .collect();
        let total_records = profiles.values().map(|profile| profile.size).sum();
        Self {
            profiles,
            total_records,
        }
    }

    pub fn profile(&self, cluster_id: usize) -> Option<&ClusterProfile> {
        self.profiles.get(&cluster_id)
    }

    /// Profiles ordered by cluster id.
    pub fn iter(&self) -> impl Iterator<Item = &ClusterProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Share of all historical records that fall in the cluster, as a percentage.
    pub fn percentage(&self, profile: &ClusterProfile) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            profile.size as f64 / self.total_records as f64 * 100.0
        }
    }
}

/// Pre-assigned cluster ids from the dataset, validated against `0..k`.
pub fn dataset_cluster_labels(dataset: &HistoricalDataset, k: usize) -> Result<Vec<usize>, ModelError> {
    dataset
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| match record.cluster {
            Some(cluster) if cluster < k => Ok(cluster),
            Some(cluster) => Err(ModelError::ClusterOutOfRange { row, cluster, k }),
            None => Err(ModelError::MissingClusterLabel { row }),
        })
        .collect()
}
