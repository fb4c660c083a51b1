use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use super::dataset::{FieldValue, HistoricalDataset, HistoricalRecord};

/// Records drawn per outcome class.
pub const SAMPLES_PER_OUTCOME: usize = 3;

/// One historical applicant as shown to API callers; gaps serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    #[serde(flatten)]
    pub features: BTreeMap<String, Option<FieldValue>>,
    pub loan_status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
}

impl SampleRecord {
    fn from_record(names: &[String], record: &HistoricalRecord) -> Self {
        Self {
            features: names
                .iter()
                .cloned()
                .zip(record.features.iter().cloned())
                .collect(),
            loan_status: u8::from(record.defaulted),
            cluster: record.cluster,
        }
    }
}

/// Seeded example records of repaid and defaulted applicants, with class counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoricalSamples {
    pub approved: Vec<SampleRecord>,
    pub defaulted: Vec<SampleRecord>,
    pub approved_count: usize,
    pub defaulted_count: usize,
    pub total_count: usize,
}

impl HistoricalSamples {
    /// Draws up to `per_outcome` records from each class. The same seed always yields
    /// the same records.
    pub fn draw(dataset: &HistoricalDataset, per_outcome: usize, seed: u64) -> Self {
        let (defaulted, approved): (Vec<&HistoricalRecord>, Vec<&HistoricalRecord>) =
            dataset.records().iter().partition(|record| record.defaulted);

        let mut rng = StdRng::seed_from_u64(seed);
        let names = dataset.feature_names();
        let mut pick = |pool: &[&HistoricalRecord]| -> Vec<SampleRecord> {
            pool.choose_multiple(&mut rng, per_outcome)
                .map(|record| SampleRecord::from_record(names, record))
                .collect()
        };

        Self {
            approved: pick(&approved),
            defaulted: pick(&defaulted),
            approved_count: approved.len(),
            defaulted_count: defaulted.len(),
            total_count: dataset.len(),
        }
    }
}
