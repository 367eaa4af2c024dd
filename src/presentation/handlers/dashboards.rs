// Dashboard endpoints
use super::{PageQuery, parse_date_param};
use crate::application::dashboard_service::{
    DUPLICATE_NAME_PREFIX, DashboardDataBundle, DashboardListItem,
};
use crate::application::pagination::Page;
use crate::domain::dashboard::{Dashboard, DashboardDraft, DashboardPatch};
use crate::domain::metric::TimeWindow;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use crate::presentation::identity::CurrentUser;
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
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn list_dashboards(
    query: Result<Query<PageQuery>, QueryRejection>,
    CurrentUser(identity): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Page<DashboardListItem>>, ApiError> {
    let Query(query) = query?;
    let page = state
        .dashboard_service
        .list(query.to_request(), &identity)
        .await?;
    Ok(Json(page))
}

pub async fn get_dashboard(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>, ApiError> {
    Ok(Json(state.dashboard_service.get(id).await?))
}

/// Dashboard plus every metric and KPI its tiles reference
pub async fn get_dashboard_data(
    Path(id): Path<Uuid>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardDataBundle>, ApiError> {
    let Query(query) = query?;
    let window = TimeWindow::new(
        parse_date_param("startDate", query.start_date.as_deref())?,
        parse_date_param("endDate", query.end_date.as_deref())?,
    );
    Ok(Json(state.dashboard_service.get_dashboard_data(id, window).await?))
}

pub async fn create_dashboard(
    CurrentUser(identity): CurrentUser,
    State(state): State<Arc<AppState>>,
    draft: Result<Json<DashboardDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Dashboard>), ApiError> {
    let Json(draft) = draft?;
    let dashboard = state
        .dashboard_service
        .create(draft, identity.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(dashboard)))
}

pub async fn duplicate_dashboard(
    Path(id): Path<Uuid>,
    CurrentUser(identity): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Dashboard>), ApiError> {
    let copy = state
        .dashboard_service
        .duplicate(id, identity.user_id, DUPLICATE_NAME_PREFIX)
        .await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn update_dashboard(
    Path(id): Path<Uuid>,
    CurrentUser(identity): CurrentUser,
    State(state): State<Arc<AppState>>,
    patch: Result<Json<DashboardPatch>, JsonRejection>,
) -> Result<Json<Dashboard>, ApiError> {
    let Json(patch) = patch?;
    state
        .dashboard_service
        .authorize_modification(id, &identity)
        .await?;
    Ok(Json(state.dashboard_service.update(id, patch).await?))
}

pub async fn delete_dashboard(
    Path(id): Path<Uuid>,
    CurrentUser(identity): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state
        .dashboard_service
        .authorize_modification(id, &identity)
        .await?;
    state.dashboard_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
