use axum::response::Response;
use serde_json::Value;

use crate::segmentation::dataset::{FieldValue, HistoricalDataset, HistoricalRecord};
use crate::segmentation::encoding::ApplicantRecord;

fn number(value: f64) -> Option<FieldValue> {
    Some(FieldValue::Number(value))
}

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(value.to_string()))
}

/// Five applicants with gaps in every column.
pub(crate) fn small_dataset() -> HistoricalDataset {
    let mut dataset = HistoricalDataset::new(vec![
        "income".to_string(),
        "age".to_string(),
        "employment".to_string(),
        "home".to_string(),
    ]);

    let rows = [
        (number(40000.0), number(30.0), text("employed"), text("rent"), false, 0),
        (number(25000.0), None, text("unemployed"), text("own"), true, 1),
        (None, number(45.0), text("self_employed"), text("rent"), false, 0),
        (number(60000.0), number(52.0), text("employed"), None, false, 1),
        (number(18000.0), number(23.0), None, text("mortgage"), true, 1),
    ];

    for (income, age, employment, home, defaulted, cluster) in rows {
        dataset
            .push(HistoricalRecord {
                features: vec![income, age, employment, home],
                defaulted,
                cluster: Some(cluster),
            })
            .expect("row width matches");
    }

    dataset
}

/// One hundred applicants split evenly between a stable, mostly repaying group
/// (even rows) and a precarious, mostly defaulting group (odd rows).
pub(crate) fn segmented_dataset() -> HistoricalDataset {
    let mut dataset = HistoricalDataset::new(vec![
        "income".to_string(),
        "age".to_string(),
        "employment".to_string(),
        "home".to_string(),
    ]);

    for index in 0..100usize {
        let stable = index % 2 == 0;
        let jitter = ((index * 37) % 1000) as f64;
        let income = if index % 17 == 0 {
            None
        } else if stable {
            number(85000.0 + jitter)
        } else {
            number(16000.0 + jitter)
        };
        let age = if stable {
            number(44.0 + (index % 7) as f64)
        } else {
            number(22.0 + (index % 5) as f64)
        };
        let employment = if stable {
            text("employed")
        } else {
            text("unemployed")
        };
        let home = match (stable, index % 4) {
            (true, 0) => text("own"),
            (true, _) => text("mortgage"),
            (false, _) if index % 23 == 0 => None,
            (false, _) => text("rent"),
        };
        let defaulted = if stable {
            index % 10 == 0
        } else {
            index % 10 != 1
        };

        dataset
            .push(HistoricalRecord {
                features: vec![income, age, employment, home],
                defaulted,
                cluster: Some(if stable { 0 } else { 1 }),
            })
            .expect("row width matches");
    }

    dataset
}

pub(crate) fn stable_applicant() -> ApplicantRecord {
    ApplicantRecord::new()
        .with("income", 86000.0)
        .with("age", 47.0)
        .with("employment", "employed")
        .with("home", "mortgage")
}

pub(crate) fn precarious_applicant() -> ApplicantRecord {
    ApplicantRecord::new()
        .with("income", 16500.0)
        .with("age", 23.0)
        .with("employment", "unemployed")
        .with("home", "rent")
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("valid json")
}
