use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::segmentation::context::{initialize, SegmentationContext};
use crate::segmentation::router::{clusters_handler, segmentation_router};

fn context() -> Arc<SegmentationContext> {
    Arc::new(initialize(&segmented_dataset()).expect("context initializes"))
}

fn predict_request(payload: serde_json::Value) -> Request<Body> {
    Request::post("/api/v1/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn predict_route_scores_applicant() {
    let router = segmentation_router(context());
    let applicant = serde_json::to_value(stable_applicant()).expect("serializable");

    let response = router
        .oneshot(predict_request(applicant.clone()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let prediction = &payload["prediction"];
    assert_eq!(prediction["recommendation"], "ELIGIBLE");
    assert_eq!(prediction["risk_level"], "LOW");
    assert_eq!(prediction["color"], "green");
    assert!(prediction["distance_to_centroid"].as_f64().is_some());
    assert!(prediction["confidence"].as_f64().is_some());
    assert_eq!(payload["input"], applicant);
}

#[tokio::test]
async fn predict_route_rejects_incomplete_records() {
    let router = segmentation_router(context());

    let response = router
        .oneshot(predict_request(json!({
            "income": 42000,
            "employment": "employed",
            "home": "rent"
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "age");
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("age")));
}

#[tokio::test]
async fn predict_route_rejects_non_numeric_values() {
    let router = segmentation_router(context());
    let mut applicant = serde_json::to_value(precarious_applicant()).expect("serializable");
    applicant["income"] = json!("unknown");

    let response = router
        .oneshot(predict_request(applicant))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "income");
}

#[tokio::test]
async fn clusters_route_lists_every_segment() {
    let router = segmentation_router(context());

    let response = router
        .oneshot(
            Request::get("/api/v1/clusters")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let clusters = payload["clusters"].as_array().expect("cluster list");
    assert_eq!(clusters.len(), 2);
    assert_eq!(payload["total_records"], 100);
    assert_eq!(payload["encoded_columns"], 5);

    let total: f64 = clusters
        .iter()
        .filter_map(|cluster| cluster["percentage"].as_f64())
        .sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn clusters_handler_mirrors_statistics() {
    let context = context();
    let Json(overview) = clusters_handler(State(context.clone())).await;

    assert_eq!(overview.clusters.len(), context.statistics().len());
    for (summary, profile) in overview.clusters.iter().zip(context.statistics().iter()) {
        assert_eq!(summary.id, profile.cluster_id);
        assert_eq!(summary.size, profile.size);
        assert_eq!(summary.approval_rate, profile.approval_rate);
    }
}

#[tokio::test]
async fn predict_route_reports_null_values_as_bad_request() {
    let router = segmentation_router(context());
    let mut applicant = serde_json::to_value(stable_applicant()).expect("serializable");
    applicant["age"] = serde_json::Value::Null;

    let response = router
        .oneshot(predict_request(applicant))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "age");
}

#[tokio::test]
async fn predict_route_reports_malformed_bodies_as_json_errors() {
    let malformed = Request::post("/api/v1/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"income\": 42000,"))
        .expect("request");
    let response = segmentation_router(context())
        .oneshot(malformed)
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().is_some());

    let response = segmentation_router(context())
        .oneshot(predict_request(json!([1, 2, 3])))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_route_rejects_out_of_range_numbers() {
    let router = segmentation_router(context());
    let mut applicant = serde_json::to_value(stable_applicant()).expect("serializable");
    applicant["income"] = json!(1e200);

    let response = router
        .oneshot(predict_request(applicant))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "income");
}

#[tokio::test]
async fn sample_data_route_returns_seeded_examples() {
    let router = segmentation_router(context());
    let request = || {
        Request::get("/api/v1/sample-data")
            .body(Body::empty())
            .expect("request")
    };

    let response = router
        .clone()
        .oneshot(request())
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;

    assert_eq!(payload["total_count"], 100);
    assert_eq!(payload["approved_count"], 50);
    assert_eq!(payload["defaulted_count"], 50);
    let approved = payload["approved"].as_array().expect("approved samples");
    let defaulted = payload["defaulted"].as_array().expect("defaulted samples");
    assert_eq!(approved.len(), 3);
    assert_eq!(defaulted.len(), 3);
    assert!(approved.iter().all(|sample| sample["loan_status"] == 0));
    assert!(defaulted.iter().all(|sample| sample["loan_status"] == 1));
    assert!(approved.iter().all(|sample| sample.get("employment").is_some()));

    let again = read_json_body(router.oneshot(request()).await.expect("route executes")).await;
    assert_eq!(again, payload);
}
