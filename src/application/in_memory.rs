// In-memory repositories for service and router tests
use crate::application::repositories::{DashboardRepository, KpiRepository, MetricRepository};
use crate::domain::dashboard::{Dashboard, DashboardPatch};
use crate::domain::kpi::{Kpi, KpiPatch};
use crate::domain::metric::{Metric, MetricPatch};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryMetrics {
    items: Mutex<Vec<Metric>>,
    lookups: AtomicUsize,
}

impl InMemoryMetrics {
    pub fn with(items: Vec<Metric>) -> Self {
        Self {
            items: Mutex::new(items),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of `find_by_id` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricRepository for InMemoryMetrics {
    async fn find_all(&self) -> anyhow::Result<Vec<Metric>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn find_by_id(&self, uuid: Uuid) -> anyhow::Result<Option<Metric>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().iter().find(|m| m.uuid == uuid).cloned())
    }

    async fn save(&self, metric: Metric) -> anyhow::Result<()> {
        self.items.lock().unwrap().push(metric);
        Ok(())
    }

    async fn update(&self, uuid: Uuid, patch: MetricPatch) -> anyhow::Result<bool> {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|m| m.uuid == uuid) {
            Some(metric) => {
                patch.apply(metric);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryKpis {
    items: Mutex<Vec<Kpi>>,
    lookups: AtomicUsize,
}

impl InMemoryKpis {
    pub fn with(items: Vec<Kpi>) -> Self {
        Self {
            items: Mutex::new(items),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KpiRepository for InMemoryKpis {
    async fn find_all(&self) -> anyhow::Result<Vec<Kpi>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn find_by_id(&self, uuid: Uuid) -> anyhow::Result<Option<Kpi>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().iter().find(|k| k.uuid == uuid).cloned())
    }

    async fn find_by_metric_uuid(&self, metric_uuid: Uuid) -> anyhow::Result<Vec<Kpi>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.metric_uuid == metric_uuid)
            .cloned()
            .collect())
    }

    async fn save(&self, kpi: Kpi) -> anyhow::Result<()> {
        self.items.lock().unwrap().push(kpi);
        Ok(())
    }

    async fn update(&self, uuid: Uuid, patch: KpiPatch) -> anyhow::Result<bool> {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|k| k.uuid == uuid) {
            Some(kpi) => {
                patch.apply(kpi);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryDashboards {
    items: Mutex<Vec<Dashboard>>,
}

impl InMemoryDashboards {
    pub fn with(items: Vec<Dashboard>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

#[async_trait]
impl DashboardRepository for InMemoryDashboards {
    async fn find_all(&self) -> anyhow::Result<Vec<Dashboard>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn find_by_id(&self, uuid: Uuid) -> anyhow::Result<Option<Dashboard>> {
        Ok(self.items.lock().unwrap().iter().find(|d| d.uuid == uuid).cloned())
    }

    async fn save(&self, dashboard: Dashboard) -> anyhow::Result<()> {
        self.items.lock().unwrap().push(dashboard);
        Ok(())
    }

    async fn update(&self, uuid: Uuid, patch: DashboardPatch) -> anyhow::Result<bool> {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|d| d.uuid == uuid) {
            Some(dashboard) => {
                patch.apply(dashboard);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, uuid: Uuid) -> anyhow::Result<bool> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|d| d.uuid != uuid);
        Ok(items.len() != before)
    }
}
