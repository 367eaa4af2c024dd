// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::kpi_service::KpiService;
use crate::application::metric_service::MetricService;
use crate::application::repositories::{DashboardRepository, KpiRepository, MetricRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub metric_service: MetricService,
    pub kpi_service: KpiService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(
        metrics: Arc<dyn MetricRepository>,
        kpis: Arc<dyn KpiRepository>,
        dashboards: Arc<dyn DashboardRepository>,
    ) -> Self {
        Self {
            metric_service: MetricService::new(metrics.clone()),
            kpi_service: KpiService::new(kpis.clone(), metrics.clone()),
            dashboard_service: DashboardService::new(dashboards, metrics, kpis),
        }
    }
}
