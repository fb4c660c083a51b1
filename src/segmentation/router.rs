use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::de::Unexpected;
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

use super::context::SegmentationContext;
use super::encoding::ApplicantRecord;
use super::samples::HistoricalSamples;
use super::views::{ClusterOverview, PredictionResponse, PredictionView};

/// Router builder exposing prediction, cluster overview and sample data endpoints.
pub fn segmentation_router(context: Arc<SegmentationContext>) -> Router {
    Router::new()
        .route("/api/v1/predict", post(predict_handler))
        .route("/api/v1/clusters", get(clusters_handler))
        .route("/api/v1/sample-data", get(sample_data_handler))
        .with_state(context)
}

pub(crate) async fn predict_handler(
    State(context): State<Arc<SegmentationContext>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(body) = payload?;
    let record = match body {
        Value::Object(fields) => ApplicantRecord::try_from(fields)?,
        other => {
            return Err(AppError::Json(serde::de::Error::invalid_type(
                json_kind(&other),
                &"a JSON object of applicant fields",
            )))
        }
    };

    let result = context.score(&record)?;
    debug!(
        cluster_id = result.cluster_id,
        recommendation = result.recommendation.label(),
        "applicant scored"
    );

    Ok(Json(PredictionResponse {
        prediction: PredictionView::from(&result),
        input: record,
    }))
}

fn json_kind(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(flag) => Unexpected::Bool(*flag),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(text) => Unexpected::Str(text),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

pub(crate) async fn clusters_handler(
    State(context): State<Arc<SegmentationContext>>,
) -> Json<ClusterOverview> {
    Json(ClusterOverview::from_context(&context))
}

pub(crate) async fn sample_data_handler(
    State(context): State<Arc<SegmentationContext>>,
) -> Json<HistoricalSamples> {
    Json(context.samples().clone())
}
