//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::data::PrepareSummary;
use crate::model::{PredictResponse, TrainReport};

use super::error::{Result, ServerError};
use super::AppState;

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "mensaje": "student performance API up and running",
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Deserialize)]
pub struct FilenameQuery {
    filename: String,
}

/// `GET /data/prepare?filename=` — encode a raw dataset.
pub async fn prepare_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilenameQuery>,
) -> Result<Json<PrepareSummary>> {
    info!(filename = %query.filename, "preparing dataset");
    let (_, summary) = state.encoder.prepare(&query.filename)?;
    Ok(Json(summary))
}

/// `POST /model/train?filename=` — train both candidates on an encoded
/// dataset and persist the better one.
pub async fn train_model(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilenameQuery>,
) -> Result<Json<TrainReport>> {
    info!(filename = %query.filename, "training models");
    let report = state.trainer.train_and_persist(&query.filename)?;
    Ok(Json(report))
}

/// `POST /model/predict` — predict from a list of feature maps.
///
/// The body is validated by hand so a missing or non-list `instances`
/// field is a 400, not a framework rejection.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<PredictResponse>> {
    let instances = body
        .get("instances")
        .ok_or_else(|| ServerError::BadRequest("missing 'instances' field".to_string()))?
        .as_array()
        .ok_or_else(|| ServerError::BadRequest("'instances' must be a list of objects".to_string()))?;

    let response = state.predictor.predict(instances)?;
    Ok(Json(response))
}
