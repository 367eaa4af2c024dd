// KPI endpoints
use super::{page_request, parse_date_param};
use crate::application::kpi_service::{KpiEvaluation, KpiListItem, KpisByMetric};
use crate::application::pagination::Page;
use crate::domain::kpi::{Kpi, KpiDraft, KpiPatch, KpiStatus};
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct KpiListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<KpiStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationQuery {
    pub as_of: Option<String>,
}

pub async fn list_kpis(
    query: Result<Query<KpiListQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Page<KpiListItem>>, ApiError> {
    let Query(query) = query?;
    let request = page_request(query.page.as_deref(), query.limit.as_deref());
    let page = state.kpi_service.list(request, query.status).await?;
    Ok(Json(page))
}

pub async fn kpis_by_metric(
    Path(metric_uuid): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<KpisByMetric>, ApiError> {
    Ok(Json(state.kpi_service.by_metric(metric_uuid).await?))
}

pub async fn get_kpi(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Kpi>, ApiError> {
    Ok(Json(state.kpi_service.get(id).await?))
}

pub async fn create_kpi(
    State(state): State<Arc<AppState>>,
    draft: Result<Json<KpiDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Kpi>), ApiError> {
    let Json(draft) = draft?;
    let kpi = state.kpi_service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(kpi)))
}

pub async fn update_kpi(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    patch: Result<Json<KpiPatch>, JsonRejection>,
) -> Result<Json<Kpi>, ApiError> {
    let Json(patch) = patch?;
    Ok(Json(state.kpi_service.update(id, patch).await?))
}

/// Soft delete: the KPI stays readable with status `archived`.
pub async fn archive_kpi(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.kpi_service.archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn evaluate_kpi(
    Path(id): Path<Uuid>,
    query: Result<Query<EvaluationQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<KpiEvaluation>, ApiError> {
    let Query(query) = query?;
    let as_of = parse_date_param("asOf", query.as_of.as_deref())?;
    Ok(Json(state.kpi_service.evaluate(id, as_of).await?))
}
