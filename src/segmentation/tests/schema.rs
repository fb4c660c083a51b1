use super::common::*;

use crate::segmentation::dataset::{FieldValue, HistoricalDataset, HistoricalRecord};
use crate::segmentation::error::SchemaError;
use crate::segmentation::schema::{FeatureSchema, ScalingParameters, UNKNOWN_LEVEL};

#[test]
fn derive_classifies_fields_and_orders_columns() {
    let schema = FeatureSchema::derive(&small_dataset()).expect("schema derives");

    assert_eq!(schema.numeric_fields().collect::<Vec<_>>(), ["income", "age"]);
    assert_eq!(
        schema.categorical_fields().collect::<Vec<_>>(),
        ["employment", "home"]
    );
    assert_eq!(
        schema.encoded_columns(),
        [
            "income",
            "age",
            "employment_unemployed",
            "employment_self_employed",
            "home_own",
            "home_mortgage",
        ]
    );
    assert_eq!(schema.width(), 6);
}

#[test]
fn imputation_uses_median_and_mode() {
    let schema = FeatureSchema::derive(&small_dataset()).expect("schema derives");
    let rules = schema.imputation_rules();

    assert_eq!(rules["income"], FieldValue::Number(32500.0));
    assert_eq!(rules["age"], FieldValue::Number(37.5));
    assert_eq!(rules["employment"], FieldValue::Text("employed".to_string()));
    assert_eq!(rules["home"], FieldValue::Text("rent".to_string()));
}

#[test]
fn first_seen_level_becomes_reference() {
    let schema = FeatureSchema::derive(&small_dataset()).expect("schema derives");

    assert_eq!(schema.reference_level("employment"), Some("employed"));
    assert_eq!(
        schema.categorical_levels("employment"),
        Some(["unemployed".to_string(), "self_employed".to_string()].as_slice())
    );
    assert_eq!(schema.reference_level("home"), Some("rent"));
    assert_eq!(schema.reference_level("income"), None);
}

#[test]
fn encode_dataset_imputes_gaps() {
    let dataset = small_dataset();
    let schema = FeatureSchema::derive(&dataset).expect("schema derives");
    let rows = schema.encode_dataset(&dataset);

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], vec![25000.0, 37.5, 1.0, 0.0, 1.0, 0.0]);
    assert_eq!(rows[2], vec![32500.0, 45.0, 0.0, 1.0, 0.0, 0.0]);
    // employment falls back to the reference level, home to the mode
    assert_eq!(rows[3], vec![60000.0, 52.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(rows[4], vec![18000.0, 23.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn mode_ties_resolve_to_smallest_level() {
    let mut dataset = HistoricalDataset::new(vec!["purpose".to_string()]);
    for purpose in ["medical", "education", "medical", "education", "venture"] {
        dataset
            .push(HistoricalRecord {
                features: vec![Some(FieldValue::from(purpose))],
                defaulted: false,
                cluster: None,
            })
            .expect("row width matches");
    }

    let schema = FeatureSchema::derive(&dataset).expect("schema derives");
    assert_eq!(
        schema.imputation_rules()["purpose"],
        FieldValue::Text("education".to_string())
    );
    assert_eq!(schema.reference_level("purpose"), Some("medical"));
}

#[test]
fn mixed_columns_are_categorical() {
    let mut dataset = HistoricalDataset::new(vec!["grade".to_string(), "amount".to_string()]);
    let rows = [
        (FieldValue::from("A"), 1000.0),
        (FieldValue::from(2.0), 2000.0),
    ];
    for (grade, amount) in rows {
        dataset
            .push(HistoricalRecord {
                features: vec![Some(grade), Some(FieldValue::from(amount))],
                defaulted: false,
                cluster: None,
            })
            .expect("row width matches");
    }

    let schema = FeatureSchema::derive(&dataset).expect("schema derives");
    assert_eq!(schema.categorical_fields().collect::<Vec<_>>(), ["grade"]);
    assert_eq!(schema.encoded_columns(), ["amount", "grade_2"]);
}

#[test]
fn unobserved_field_is_unknown_categorical() {
    let mut dataset = HistoricalDataset::new(vec!["amount".to_string(), "notes".to_string()]);
    dataset
        .push(HistoricalRecord {
            features: vec![Some(FieldValue::from(500.0)), None],
            defaulted: false,
            cluster: None,
        })
        .expect("row width matches");

    let schema = FeatureSchema::derive(&dataset).expect("schema derives");
    assert_eq!(schema.reference_level("notes"), Some(UNKNOWN_LEVEL));
    assert_eq!(schema.encoded_columns(), ["amount"]);
}

#[test]
fn derive_rejects_empty_and_featureless_datasets() {
    let empty = HistoricalDataset::new(vec!["income".to_string()]);
    assert_eq!(
        FeatureSchema::derive(&empty).expect_err("no rows"),
        SchemaError::EmptyDataset
    );

    let mut featureless = HistoricalDataset::new(Vec::new());
    featureless
        .push(HistoricalRecord {
            features: Vec::new(),
            defaulted: true,
            cluster: None,
        })
        .expect("row width matches");
    assert_eq!(
        FeatureSchema::derive(&featureless).expect_err("no features"),
        SchemaError::NoFeatures
    );
}

#[test]
fn derive_rejects_colliding_column_names() {
    let mut dataset =
        HistoricalDataset::new(vec!["home_own".to_string(), "home".to_string()]);
    for (flag, home) in [(1.0, "rent"), (0.0, "own")] {
        dataset
            .push(HistoricalRecord {
                features: vec![Some(FieldValue::from(flag)), Some(FieldValue::from(home))],
                defaulted: false,
                cluster: None,
            })
            .expect("row width matches");
    }

    assert_eq!(
        FeatureSchema::derive(&dataset).expect_err("collision"),
        SchemaError::DuplicateColumn("home_own".to_string())
    );
}

#[test]
fn scaling_standardizes_and_guards_constant_columns() {
    let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
    let scaling = ScalingParameters::fit(&rows, 2);

    assert_eq!(scaling.means(), [2.0, 5.0]);
    assert_eq!(scaling.stds(), [1.0, 1.0]);

    let mut values = vec![3.0, 5.0];
    scaling.transform(&mut values);
    assert_eq!(values, vec![1.0, 0.0]);
}

#[test]
fn scaling_uses_population_deviation() {
    let dataset = small_dataset();
    let schema = FeatureSchema::derive(&dataset).expect("schema derives");
    let scaling = ScalingParameters::fit(&schema.encode_dataset(&dataset), schema.width());

    assert_eq!(scaling.dimension(), 6);
    assert_close(scaling.means()[0], 35100.0);
    // employment_unemployed: one of five rows set
    assert_close(scaling.means()[2], 0.2);
    assert_close(scaling.stds()[2], 0.4);
}
