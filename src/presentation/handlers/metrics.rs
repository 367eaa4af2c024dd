// Metric endpoints
use crate::domain::metric::{Metric, MetricDraft, MetricPatch, MetricValue};
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_metrics(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Metric>>, ApiError> {
    Ok(Json(state.metric_service.list().await?))
}

pub async fn get_metric(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Metric>, ApiError> {
    Ok(Json(state.metric_service.get(id).await?))
}

pub async fn create_metric(
    State(state): State<Arc<AppState>>,
    draft: Result<Json<MetricDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Metric>), ApiError> {
    let Json(draft) = draft?;
    let metric = state.metric_service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

pub async fn update_metric(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    patch: Result<Json<MetricPatch>, JsonRejection>,
) -> Result<Json<Metric>, ApiError> {
    let Json(patch) = patch?;
    Ok(Json(state.metric_service.update(id, patch).await?))
}

pub async fn append_metric_values(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    values: Result<Json<Vec<MetricValue>>, JsonRejection>,
) -> Result<Json<Metric>, ApiError> {
    let Json(values) = values?;
    Ok(Json(state.metric_service.append_values(id, values).await?))
}
