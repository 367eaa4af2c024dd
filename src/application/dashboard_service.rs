// Dashboard service - Composes dashboards with the metrics and KPIs their tiles reference
use crate::application::error::ServiceError;
use crate::application::pagination::{Link, Page, PageRequest, paginate};
use crate::application::repositories::{DashboardRepository, KpiRepository, MetricRepository};
use crate::domain::dashboard::{
    Dashboard, DashboardDraft, DashboardPatch, TileConfig, can_modify, extract_kpi_uuids,
    extract_metric_uuids, validate_tiles,
};
use crate::domain::identity::Identity;
use crate::domain::kpi::{KpiStatus, KpiTarget, KpiThresholds};
use crate::domain::metric::{MetricValue, TimeWindow, ValueType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

const ENTITY: &str = "dashboard";
pub const DUPLICATE_NAME_PREFIX: &str = "Copy of";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub data: Link,
    pub duplicate: Link,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardListItem {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub owner_uuid: Uuid,
    pub tile_count: usize,
    pub updated_at: DateTime<Utc>,
    pub is_owner: bool,
    #[serde(rename = "_links")]
    pub links: DashboardLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub tiles: Vec<TileConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricData {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub value_type: ValueType,
    pub values: Vec<MetricValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub metric_uuid: Uuid,
    pub targets: Vec<KpiTarget>,
    pub thresholds: Option<KpiThresholds>,
    pub status: KpiStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferencedData {
    pub metrics: BTreeMap<Uuid, MetricData>,
    pub kpis: BTreeMap<Uuid, KpiData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilters {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardDataBundle {
    pub dashboard: DashboardSummary,
    pub data: ReferencedData,
    pub filters: DataFilters,
}

#[derive(Clone)]
pub struct DashboardService {
    dashboards: Arc<dyn DashboardRepository>,
    metrics: Arc<dyn MetricRepository>,
    kpis: Arc<dyn KpiRepository>,
}

impl DashboardService {
    pub fn new(
        dashboards: Arc<dyn DashboardRepository>,
        metrics: Arc<dyn MetricRepository>,
        kpis: Arc<dyn KpiRepository>,
    ) -> Self {
        Self {
            dashboards,
            metrics,
            kpis,
        }
    }

    pub async fn list(
        &self,
        request: PageRequest,
        identity: &Identity,
    ) -> Result<Page<DashboardListItem>, ServiceError> {
        let items: Vec<DashboardListItem> = self
            .dashboards
            .find_all()
            .await?
            .into_iter()
            .map(|dashboard| DashboardListItem {
                is_owner: can_modify(&dashboard, identity.user_id, identity.is_admin()),
                links: DashboardLinks {
                    self_link: Link::new(format!("/dashboards/{}", dashboard.uuid)),
                    data: Link::new(format!("/dashboards/{}/data", dashboard.uuid)),
                    duplicate: Link::new(format!("/dashboards/{}/duplicate", dashboard.uuid)),
                },
                uuid: dashboard.uuid,
                name: dashboard.name,
                description: dashboard.description,
                owner_uuid: dashboard.owner_uuid,
                tile_count: dashboard.tiles.len(),
                updated_at: dashboard.updated_at,
            })
            .collect();

        Ok(paginate(items, request, "/dashboards", &[]))
    }

    pub async fn get(&self, uuid: Uuid) -> Result<Dashboard, ServiceError> {
        self.dashboards
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, uuid))
    }

    pub async fn create(
        &self,
        draft: DashboardDraft,
        owner_uuid: Uuid,
    ) -> Result<Dashboard, ServiceError> {
        if let Err(e) = validate_tiles(&draft.tiles) {
            tracing::warn!("Rejected dashboard {:?}: {}", draft.name, e);
            return Err(e.into());
        }

        let dashboard = draft.into_dashboard(Uuid::new_v4(), owner_uuid, Utc::now());
        self.dashboards.save(dashboard.clone()).await?;
        tracing::info!("Created dashboard {} for owner {}", dashboard.uuid, owner_uuid);
        Ok(dashboard)
    }

    /// Load the dashboard and check the caller may change it.
    /// A missing dashboard is reported before any ownership failure.
    pub async fn authorize_modification(
        &self,
        uuid: Uuid,
        identity: &Identity,
    ) -> Result<Dashboard, ServiceError> {
        let dashboard = self.get(uuid).await?;
        if !can_modify(&dashboard, identity.user_id, identity.is_admin()) {
            tracing::warn!("User {} may not modify dashboard {}", identity.user_id, uuid);
            return Err(ServiceError::Forbidden);
        }
        Ok(dashboard)
    }

    pub async fn update(&self, uuid: Uuid, mut patch: DashboardPatch) -> Result<Dashboard, ServiceError> {
        if let Some(tiles) = &patch.tiles {
            validate_tiles(tiles)?;
        }
        if !patch.is_empty() {
            patch.updated_at = Some(Utc::now());
        }

        if !self.dashboards.update(uuid, patch).await? {
            return Err(ServiceError::not_found(ENTITY, uuid));
        }
        tracing::info!("Updated dashboard {}", uuid);
        self.get(uuid).await
    }

    pub async fn delete(&self, uuid: Uuid) -> Result<(), ServiceError> {
        if !self.dashboards.delete(uuid).await? {
            return Err(ServiceError::not_found(ENTITY, uuid));
        }
        tracing::info!("Deleted dashboard {}", uuid);
        Ok(())
    }

    /// Bundle a dashboard with every metric and KPI its tiles reference.
    ///
    /// Metric values are narrowed to `window`. References that no longer
    /// resolve are left out of the bundle rather than failing it, and each
    /// distinct uuid is looked up once.
    pub async fn get_dashboard_data(
        &self,
        uuid: Uuid,
        window: TimeWindow,
    ) -> Result<DashboardDataBundle, ServiceError> {
        let dashboard = self.get(uuid).await?;
        let mut data = ReferencedData::default();

        for metric_uuid in extract_metric_uuids(&dashboard) {
            match self.metrics.find_by_id(metric_uuid).await? {
                Some(metric) => {
                    let values = metric.values_within(&window);
                    data.metrics.insert(
                        metric_uuid,
                        MetricData {
                            uuid: metric.uuid,
                            name: metric.name,
                            description: metric.description,
                            unit: metric.unit,
                            value_type: metric.value_type,
                            values,
                        },
                    );
                }
                None => tracing::debug!("Dashboard {} references missing metric {}", uuid, metric_uuid),
            }
        }

        for kpi_uuid in extract_kpi_uuids(&dashboard) {
            match self.kpis.find_by_id(kpi_uuid).await? {
                Some(kpi) => {
                    data.kpis.insert(
                        kpi_uuid,
                        KpiData {
                            uuid: kpi.uuid,
                            name: kpi.name,
                            description: kpi.description,
                            metric_uuid: kpi.metric_uuid,
                            targets: kpi.targets,
                            thresholds: kpi.thresholds,
                            status: kpi.status,
                        },
                    );
                }
                None => tracing::debug!("Dashboard {} references missing KPI {}", uuid, kpi_uuid),
            }
        }

        Ok(DashboardDataBundle {
            dashboard: DashboardSummary {
                uuid: dashboard.uuid,
                name: dashboard.name,
                description: dashboard.description,
                tiles: dashboard.tiles,
            },
            data,
            filters: DataFilters {
                start_date: window.start,
                end_date: window.end,
            },
        })
    }

    /// Copy a dashboard for `new_owner`. The layout already passed validation,
    /// so it is not re-checked.
    pub async fn duplicate(
        &self,
        uuid: Uuid,
        new_owner: Uuid,
        name_prefix: &str,
    ) -> Result<Dashboard, ServiceError> {
        let original = self.get(uuid).await?;
        let copy = original.duplicate_for(new_owner, name_prefix, Utc::now());

        self.dashboards.save(copy.clone()).await?;
        tracing::info!("Duplicated dashboard {} as {}", uuid, copy.uuid);
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::in_memory::{InMemoryDashboards, InMemoryKpis, InMemoryMetrics};
    use crate::domain::dashboard::TileType;
    use crate::domain::error::ValidationError;
    use crate::domain::identity::Role;
    use crate::domain::kpi::Kpi;
    use crate::domain::metric::{Aggregation, Metric};
    use crate::domain::timestamp::parse_instant;

    struct Fixture {
        service: DashboardService,
        metrics: Arc<InMemoryMetrics>,
        kpis: Arc<InMemoryKpis>,
    }

    fn fixture(dashboards: Vec<Dashboard>, metrics: Vec<Metric>, kpis: Vec<Kpi>) -> Fixture {
        let metrics = Arc::new(InMemoryMetrics::with(metrics));
        let kpis = Arc::new(InMemoryKpis::with(kpis));
        let service = DashboardService::new(
            Arc::new(InMemoryDashboards::with(dashboards)),
            metrics.clone(),
            kpis.clone(),
        );
        Fixture {
            service,
            metrics,
            kpis,
        }
    }

    fn metric(values: &[(f64, &str)]) -> Metric {
        Metric {
            uuid: Uuid::new_v4(),
            name: "Orders".to_string(),
            description: "Orders per day".to_string(),
            value_type: ValueType::Integer,
            unit: "orders".to_string(),
            values: values
                .iter()
                .map(|(v, ts)| MetricValue::new(*v, parse_instant(ts).unwrap()))
                .collect(),
            aggregation: Aggregation::Sum,
            tags: vec![],
            validation_rules: None,
        }
    }

    fn kpi(metric_uuid: Uuid) -> Kpi {
        let now = Utc::now();
        Kpi {
            uuid: Uuid::new_v4(),
            name: "Order goal".to_string(),
            description: "Daily orders".to_string(),
            metric_uuid,
            targets: vec![KpiTarget {
                value: 100.0,
                date: None,
                label: None,
            }],
            status: KpiStatus::Warning,
            thresholds: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn tile(id: &str, x: i64, metric_uuids: Vec<Uuid>, kpi_uuids: Option<Vec<Uuid>>) -> TileConfig {
        TileConfig {
            id: id.to_string(),
            x,
            y: 0,
            w: 2,
            h: 2,
            tile_type: TileType::MetricWithKpi,
            metric_uuids,
            kpi_uuids,
            config: None,
        }
    }

    fn dashboard(owner: Uuid, tiles: Vec<TileConfig>) -> Dashboard {
        DashboardDraft {
            name: "Operations".to_string(),
            description: "Daily ops".to_string(),
            tiles,
        }
        .into_dashboard(Uuid::new_v4(), owner, Utc::now())
    }

    fn viewer(user_id: Uuid) -> Identity {
        Identity::new(user_id, Role::Viewer)
    }

    #[tokio::test]
    async fn test_dashboard_data_bundles_references_once() {
        let orders = metric(&[(5.0, "2024-01-01"), (7.0, "2024-02-01"), (9.0, "2024-03-01")]);
        let goal = kpi(orders.uuid);
        let missing_metric = Uuid::new_v4();
        let missing_kpi = Uuid::new_v4();
        let board = dashboard(
            Uuid::new_v4(),
            vec![
                tile("a", 0, vec![orders.uuid], Some(vec![goal.uuid])),
                tile("b", 2, vec![orders.uuid, missing_metric], Some(vec![goal.uuid, missing_kpi])),
            ],
        );
        let fx = fixture(vec![board.clone()], vec![orders.clone()], vec![goal.clone()]);

        let bundle = fx
            .service
            .get_dashboard_data(board.uuid, TimeWindow::default())
            .await
            .unwrap();

        assert_eq!(bundle.dashboard.tiles, board.tiles);
        assert_eq!(bundle.data.metrics.len(), 1);
        assert_eq!(bundle.data.metrics[&orders.uuid].values.len(), 3);
        assert_eq!(bundle.data.kpis.len(), 1);
        assert_eq!(bundle.data.kpis[&goal.uuid].status, KpiStatus::Warning);
        assert_eq!(fx.metrics.lookups(), 2);
        assert_eq!(fx.kpis.lookups(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_data_filters_values_inclusively() {
        let orders = metric(&[(5.0, "2024-01-01"), (7.0, "2024-02-01"), (9.0, "2024-03-01")]);
        let board = dashboard(Uuid::new_v4(), vec![tile("a", 0, vec![orders.uuid], None)]);
        let fx = fixture(vec![board.clone()], vec![orders.clone()], vec![]);

        let window = TimeWindow::new(parse_instant("2024-02-01"), parse_instant("2024-03-01"));
        let bundle = fx.service.get_dashboard_data(board.uuid, window).await.unwrap();
        let values: Vec<f64> = bundle.data.metrics[&orders.uuid].values.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![7.0, 9.0]);
        assert_eq!(bundle.filters.start_date, window.start);
        assert_eq!(bundle.filters.end_date, window.end);

        let open_start = TimeWindow::new(None, parse_instant("2024-01-15"));
        let bundle = fx.service.get_dashboard_data(board.uuid, open_start).await.unwrap();
        assert_eq!(bundle.data.metrics[&orders.uuid].values.len(), 1);
        assert!(bundle.filters.start_date.is_none());
    }

    #[tokio::test]
    async fn test_dashboard_data_for_missing_dashboard() {
        let fx = fixture(vec![], vec![], vec![]);
        let err = fx
            .service
            .get_dashboard_data(Uuid::new_v4(), TimeWindow::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "dashboard", .. }));
    }

    #[tokio::test]
    async fn test_duplicate_is_independent_of_original() {
        let owner = Uuid::new_v4();
        let new_owner = Uuid::new_v4();
        let board = dashboard(owner, vec![tile("a", 0, vec![Uuid::new_v4()], None)]);
        let fx = fixture(vec![board.clone()], vec![], vec![]);

        let copy = fx
            .service
            .duplicate(board.uuid, new_owner, DUPLICATE_NAME_PREFIX)
            .await
            .unwrap();
        assert_eq!(copy.name, "Copy of Operations");
        assert_eq!(copy.owner_uuid, new_owner);
        assert_eq!(copy.created_at, copy.updated_at);

        let mut tiles = copy.tiles.clone();
        tiles[0].x = 10;
        fx.service
            .update(
                copy.uuid,
                DashboardPatch {
                    tiles: Some(tiles),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let original = fx.service.get(board.uuid).await.unwrap();
        assert_eq!(original.tiles[0].x, 0);
        assert_eq!(original.owner_uuid, owner);
        assert_eq!(fx.service.get(copy.uuid).await.unwrap().tiles[0].x, 10);
    }

    #[tokio::test]
    async fn test_create_validates_layout() {
        let fx = fixture(vec![], vec![], vec![]);
        let metric_uuid = Uuid::new_v4();
        let draft = DashboardDraft {
            name: "Overlapping".to_string(),
            description: String::new(),
            tiles: vec![tile("a", 0, vec![metric_uuid], None), tile("b", 1, vec![metric_uuid], None)],
        };
        let err = fx.service.create(draft, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::TileOverlap(ref a, ref b)) if a == "a" && b == "b"
        ));

        let owner = Uuid::new_v4();
        let created = fx
            .service
            .create(
                DashboardDraft {
                    name: "Fine".to_string(),
                    description: String::new(),
                    tiles: vec![tile("a", 0, vec![metric_uuid], None)],
                },
                owner,
            )
            .await
            .unwrap();
        assert_eq!(created.owner_uuid, owner);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_tiles_and_bumps_timestamp() {
        let board = dashboard(Uuid::new_v4(), vec![tile("a", 0, vec![Uuid::new_v4()], None)]);
        let fx = fixture(vec![board.clone()], vec![], vec![]);

        let err = fx
            .service
            .update(
                board.uuid,
                DashboardPatch {
                    tiles: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyDashboard)));

        let renamed = fx
            .service
            .update(
                board.uuid,
                DashboardPatch {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.tiles, board.tiles);
        assert!(renamed.updated_at >= board.updated_at);
        assert_eq!(renamed.created_at, board.created_at);
    }

    #[tokio::test]
    async fn test_authorize_modification() {
        let owner = Uuid::new_v4();
        let board = dashboard(owner, vec![tile("a", 0, vec![Uuid::new_v4()], None)]);
        let fx = fixture(vec![board.clone()], vec![], vec![]);

        assert!(fx.service.authorize_modification(board.uuid, &viewer(owner)).await.is_ok());

        let admin = Identity::new(Uuid::new_v4(), Role::Admin);
        assert!(fx.service.authorize_modification(board.uuid, &admin).await.is_ok());

        let err = fx
            .service
            .authorize_modification(board.uuid, &viewer(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let err = fx
            .service
            .authorize_modification(Uuid::new_v4(), &viewer(owner))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_marks_ownership() {
        let me = Uuid::new_v4();
        let mine = dashboard(me, vec![tile("a", 0, vec![Uuid::new_v4()], None)]);
        let theirs = dashboard(Uuid::new_v4(), vec![tile("a", 0, vec![Uuid::new_v4()], None)]);
        let fx = fixture(vec![mine.clone(), theirs.clone()], vec![], vec![]);

        let page = fx.service.list(PageRequest::default(), &viewer(me)).await.unwrap();
        assert_eq!(page.total, 2);
        let flags: Vec<(Uuid, bool)> = page.items.iter().map(|i| (i.uuid, i.is_owner)).collect();
        assert_eq!(flags, vec![(mine.uuid, true), (theirs.uuid, false)]);
        assert_eq!(page.items[0].tile_count, 1);
        assert_eq!(page.items[0].links.data.href, format!("/dashboards/{}/data", mine.uuid));
    }

    #[tokio::test]
    async fn test_delete_removes_dashboard() {
        let board = dashboard(Uuid::new_v4(), vec![tile("a", 0, vec![Uuid::new_v4()], None)]);
        let fx = fixture(vec![board.clone()], vec![], vec![]);

        fx.service.delete(board.uuid).await.unwrap();
        assert!(matches!(
            fx.service.get(board.uuid).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
        assert!(fx.service.delete(board.uuid).await.is_err());
    }
}
