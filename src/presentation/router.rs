// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{dashboards, health_check, kpis, metrics};
use crate::presentation::identity::CurrentUser;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Every resource route requires a caller identity
    let api = Router::new()
        .route("/metrics", get(metrics::list_metrics).post(metrics::create_metric))
        .route("/metrics/:id", get(metrics::get_metric).put(metrics::update_metric))
        .route("/metrics/:id/values", post(metrics::append_metric_values))
        .route("/kpis", get(kpis::list_kpis).post(kpis::create_kpi))
        .route("/kpis/by-metric/:metric_uuid", get(kpis::kpis_by_metric))
        .route(
            "/kpis/:id",
            get(kpis::get_kpi).put(kpis::update_kpi).delete(kpis::archive_kpi),
        )
        .route("/kpis/:id/evaluation", get(kpis::evaluate_kpi))
        .route(
            "/dashboards",
            get(dashboards::list_dashboards).post(dashboards::create_dashboard),
        )
        .route(
            "/dashboards/:id",
            get(dashboards::get_dashboard)
                .put(dashboards::update_dashboard)
                .delete(dashboards::delete_dashboard),
        )
        .route("/dashboards/:id/data", get(dashboards::get_dashboard_data))
        .route("/dashboards/:id/duplicate", post(dashboards::duplicate_dashboard))
        .route_layer(middleware::from_extractor::<CurrentUser>());

    Router::new()
        .route("/healthz", get(health_check))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
