use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use super::error::ModelError;
use super::statistics::StatisticsSource;

/// Knobs for fitting the cluster model and sourcing its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// Explicit cluster count; falls back to the dataset's highest cluster label + 1.
    pub cluster_count: Option<usize>,
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
    /// Relative to the mean per-column variance of the training data.
    pub tolerance: f64,
    pub statistics_source: StatisticsSource,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            cluster_count: None,
            seed: 42,
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            statistics_source: StatisticsSource::default(),
        }
    }
}

/// Nearest centroid for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub cluster_id: usize,
    pub distance: f64,
}

/// Immutable centroids in encoded+scaled space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterModel {
    centroids: Vec<Vec<f64>>,
    dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    inertia: Option<f64>,
}

impl ClusterModel {
    /// Loads a model from precomputed centroids.
    pub fn from_centroids(centroids: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        let dimension = centroids
            .first()
            .map(Vec::len)
            .ok_or(ModelError::InvalidClusterCount(0))?;

        if let Some((index, centroid)) = centroids
            .iter()
            .enumerate()
            .find(|(_, centroid)| centroid.len() != dimension)
        {
            return Err(ModelError::DimensionMismatch {
                index,
                expected: dimension,
                actual: centroid.len(),
            });
        }

        Ok(Self {
            centroids,
            dimension,
            inertia: None,
        })
    }

    /// Fits k-means (k-means++ seeding, Lloyd iterations) with a seeded RNG, keeping the
    /// restart with the lowest inertia. Earlier restarts win ties.
    pub fn fit(points: &[Vec<f64>], k: usize, options: &ModelOptions) -> Result<Self, ModelError> {
        if k < 1 {
            return Err(ModelError::InvalidClusterCount(k));
        }
        if points.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if k > points.len() {
            return Err(ModelError::TooFewRecords {
                k,
                records: points.len(),
            });
        }

        let dimension = points[0].len();
        let tolerance = options.tolerance * mean_variance(points, dimension);
        let mut rng = StdRng::seed_from_u64(options.seed);

        let mut best: Option<LloydRun> = None;
        for restart in 0..options.restarts.max(1) {
            let seeds = seed_centroids(points, k, &mut rng);
            let run = lloyd(points, seeds, options.max_iterations, tolerance);
            debug!(
                restart,
                inertia = run.inertia,
                iterations = run.iterations,
                "k-means restart finished"
            );
            if best.as_ref().map_or(true, |top| run.inertia < top.inertia) {
                best = Some(run);
            }
        }

        let best = best.ok_or(ModelError::EmptyDataset)?;
        Ok(Self {
            centroids: best.centroids,
            dimension,
            inertia: Some(best.inertia),
        })
    }

    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Within-cluster sum of squares of the fitted restart; `None` for loaded models.
    pub fn inertia(&self) -> Option<f64> {
        self.inertia
    }

    /// Euclidean distance from `point` to every centroid, in cluster order.
    pub fn distances(&self, point: &[f64]) -> Vec<f64> {
        self.centroids
            .iter()
            .map(|centroid| squared_distance(point, centroid).sqrt())
            .collect()
    }

    /// Nearest centroid; ties resolve to the lowest cluster id.
    pub fn assign(&self, point: &[f64]) -> Assignment {
        let (cluster_id, squared) = nearest(point, &self.centroids);
        Assignment {
            cluster_id,
            distance: squared.sqrt(),
        }
    }
}

struct LloydRun {
    centroids: Vec<Vec<f64>>,
    inertia: f64,
    iterations: usize,
}

fn lloyd(
    points: &[Vec<f64>],
    mut centroids: Vec<Vec<f64>>,
    max_iterations: usize,
    tolerance: f64,
) -> LloydRun {
    let mut labels = vec![0; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iterations.max(1) {
        iterations += 1;
        assign_all(points, &centroids, &mut labels);
        let updated = recompute_centroids(points, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum();
        centroids = updated;
        if shift <= tolerance {
            break;
        }
    }

    let inertia = assign_all(points, &centroids, &mut labels);
    LloydRun {
        centroids,
        inertia,
        iterations,
    }
}

/// k-means++ seeding: each next seed is drawn proportionally to its squared distance
/// from the closest seed chosen so far.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());
    let mut closest: Vec<f64> = points
        .iter()
        .map(|point| squared_distance(point, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = None;
            let mut last_positive = 0;
            for (index, weight) in closest.iter().enumerate() {
                if *weight <= 0.0 {
                    continue;
                }
                last_positive = index;
                if target < *weight {
                    chosen = Some(index);
                    break;
                }
                target -= weight;
            }
            chosen.unwrap_or(last_positive)
        } else {
            rng.gen_range(0..points.len())
        };

        let seed = points[chosen].clone();
        for (distance, point) in closest.iter_mut().zip(points) {
            *distance = distance.min(squared_distance(point, &seed));
        }
        centroids.push(seed);
    }

    centroids
}

/// Writes nearest-centroid labels and returns the total squared distance.
fn assign_all(points: &[Vec<f64>], centroids: &[Vec<f64>], labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(points) {
        let (cluster, squared) = nearest(point, centroids);
        *label = cluster;
        inertia += squared;
    }
    inertia
}

/// Cluster means; a cluster left empty is re-seeded from the point farthest from its
/// current centroid.
fn recompute_centroids(
    points: &[Vec<f64>],
    labels: &[usize],
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dimension = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dimension]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, label) in points.iter().zip(labels) {
        counts[*label] += 1;
        for (sum, value) in sums[*label].iter_mut().zip(point) {
            *sum += value;
        }
    }

    let mut farthest: Vec<usize> = (0..points.len()).collect();
    if counts.contains(&0) {
        let spread: Vec<f64> = points
            .iter()
            .zip(labels)
            .map(|(point, label)| squared_distance(point, &previous[*label]))
            .collect();
        farthest.sort_by(|a, b| spread[*b].total_cmp(&spread[*a]).then(a.cmp(b)));
    }
    let mut donors = farthest.into_iter();

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), old)| {
            if count > 0 {
                sum.into_iter().map(|value| value / count as f64).collect()
            } else {
                donors
                    .next()
                    .map_or_else(|| old.clone(), |index| points[index].clone())
            }
        })
        .collect()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (index, centroid) in centroids.iter().enumerate() {
        let squared = squared_distance(point, centroid);
        if squared < best.1 {
            best = (index, squared);
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn mean_variance(points: &[Vec<f64>], dimension: usize) -> f64 {
    if dimension == 0 {
        return 0.0;
    }
    let count = points.len() as f64;
    let total: f64 = (0..dimension)
        .map(|column| {
            let mean = points.iter().map(|point| point[column]).sum::<f64>() / count;
            points
                .iter()
                .map(|point| (point[column] - mean).powi(2))
                .sum::<f64>()
                / count
        })
        .sum();
    total / dimension as f64
}
