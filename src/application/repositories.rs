// Repository traits for entity storage
use crate::domain::dashboard::{Dashboard, DashboardPatch};
use crate::domain::kpi::{Kpi, KpiPatch};
use crate::domain::metric::{Metric, MetricPatch};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait MetricRepository: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<Metric>>;

    async fn find_by_id(&self, uuid: Uuid) -> anyhow::Result<Option<Metric>>;

    async fn save(&self, metric: Metric) -> anyhow::Result<()>;

    /// Apply a partial update. Returns false when no metric has this uuid.
    async fn update(&self, uuid: Uuid, patch: MetricPatch) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait KpiRepository: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<Kpi>>;

    async fn find_by_id(&self, uuid: Uuid) -> anyhow::Result<Option<Kpi>>;

    async fn find_by_metric_uuid(&self, metric_uuid: Uuid) -> anyhow::Result<Vec<Kpi>>;

    async fn save(&self, kpi: Kpi) -> anyhow::Result<()>;

    async fn update(&self, uuid: Uuid, patch: KpiPatch) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<Dashboard>>;

    async fn find_by_id(&self, uuid: Uuid) -> anyhow::Result<Option<Dashboard>>;

    async fn save(&self, dashboard: Dashboard) -> anyhow::Result<()>;

    async fn update(&self, uuid: Uuid, patch: DashboardPatch) -> anyhow::Result<bool>;

    /// Hard delete. Returns false when nothing was removed.
    async fn delete(&self, uuid: Uuid) -> anyhow::Result<bool>;
}
