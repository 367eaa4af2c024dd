// File-backed repository implementations
use crate::application::repositories::{DashboardRepository, KpiRepository, MetricRepository};
use crate::domain::dashboard::{Dashboard, DashboardPatch};
use crate::domain::kpi::{Kpi, KpiPatch};
use crate::domain::metric::{Metric, MetricPatch};
use crate::infrastructure::json_file_store::{JsonFileStore, Keyed};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

impl Keyed for Metric {
    fn key(&self) -> Uuid {
        self.uuid
    }
}

impl Keyed for Kpi {
    fn key(&self) -> Uuid {
        self.uuid
    }
}

impl Keyed for Dashboard {
    fn key(&self) -> Uuid {
        self.uuid
    }
}

pub struct FileMetricRepository {
    store: JsonFileStore<Metric>,
}

impl FileMetricRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            store: JsonFileStore::new(data_dir.join("metrics.json")),
        }
    }
}

#[async_trait]
impl MetricRepository for FileMetricRepository {
    async fn find_all(&self) -> Result<Vec<Metric>> {
        self.store.all().await
    }

    async fn find_by_id(&self, uuid: Uuid) -> Result<Option<Metric>> {
        self.store.find(uuid).await
    }

    async fn save(&self, metric: Metric) -> Result<()> {
        self.store.insert(metric).await
    }

    async fn update(&self, uuid: Uuid, patch: MetricPatch) -> Result<bool> {
        self.store.modify(uuid, |metric| patch.apply(metric)).await
    }
}

pub struct FileKpiRepository {
    store: JsonFileStore<Kpi>,
}

impl FileKpiRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            store: JsonFileStore::new(data_dir.join("kpis.json")),
        }
    }
}

#[async_trait]
impl KpiRepository for FileKpiRepository {
    async fn find_all(&self) -> Result<Vec<Kpi>> {
        self.store.all().await
    }

    async fn find_by_id(&self, uuid: Uuid) -> Result<Option<Kpi>> {
        self.store.find(uuid).await
    }

    async fn find_by_metric_uuid(&self, metric_uuid: Uuid) -> Result<Vec<Kpi>> {
        self.store.find_where(|kpi| kpi.metric_uuid == metric_uuid).await
    }

    async fn save(&self, kpi: Kpi) -> Result<()> {
        self.store.insert(kpi).await
    }

    async fn update(&self, uuid: Uuid, patch: KpiPatch) -> Result<bool> {
        self.store.modify(uuid, |kpi| patch.apply(kpi)).await
    }
}

pub struct FileDashboardRepository {
    store: JsonFileStore<Dashboard>,
}

impl FileDashboardRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            store: JsonFileStore::new(data_dir.join("dashboards.json")),
        }
    }
}

#[async_trait]
impl DashboardRepository for FileDashboardRepository {
    async fn find_all(&self) -> Result<Vec<Dashboard>> {
        self.store.all().await
    }

    async fn find_by_id(&self, uuid: Uuid) -> Result<Option<Dashboard>> {
        self.store.find(uuid).await
    }

    async fn save(&self, dashboard: Dashboard) -> Result<()> {
        self.store.insert(dashboard).await
    }

    async fn update(&self, uuid: Uuid, patch: DashboardPatch) -> Result<bool> {
        self.store.modify(uuid, |dashboard| patch.apply(dashboard)).await
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool> {
        self.store.remove(uuid).await
    }
}
