// KPI service - Target resolution, status evaluation and KPI lifecycle
use crate::application::error::ServiceError;
use crate::application::pagination::{Link, Page, PageRequest, paginate};
use crate::application::repositories::{KpiRepository, MetricRepository};
use crate::domain::error::ValidationError;
use crate::domain::kpi::{
    EvaluatedStatus, Kpi, KpiDraft, KpiPatch, KpiStatus, evaluate_status, resolve_current_target,
    validate_targets,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

const ENTITY: &str = "kpi";

#[derive(Debug, Clone, Serialize)]
pub struct KpiLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub metric: Link,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiListItem {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub metric_uuid: Uuid,
    pub status: KpiStatus,
    pub current_target: Option<f64>,
    #[serde(rename = "_links")]
    pub links: KpiLinks,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricLinks {
    pub metric: Link,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpisByMetric {
    pub metric_uuid: Uuid,
    pub kpis: Vec<Kpi>,
    #[serde(rename = "_links")]
    pub links: MetricLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiEvaluation {
    pub kpi_uuid: Uuid,
    pub as_of: DateTime<Utc>,
    pub current_target: Option<f64>,
    pub current_value: Option<f64>,
    pub evaluated_status: Option<EvaluatedStatus>,
}

#[derive(Clone)]
pub struct KpiService {
    kpis: Arc<dyn KpiRepository>,
    metrics: Arc<dyn MetricRepository>,
}

impl KpiService {
    pub fn new(kpis: Arc<dyn KpiRepository>, metrics: Arc<dyn MetricRepository>) -> Self {
        Self { kpis, metrics }
    }

    pub async fn list(
        &self,
        request: PageRequest,
        status: Option<KpiStatus>,
    ) -> Result<Page<KpiListItem>, ServiceError> {
        let now = Utc::now();
        let items: Vec<KpiListItem> = self
            .kpis
            .find_all()
            .await?
            .into_iter()
            .filter(|kpi| status.is_none_or(|s| kpi.status == s))
            .map(|kpi| Self::list_item(kpi, now))
            .collect();

        let extra: Vec<(&str, &str)> = status.iter().map(|s| ("status", s.as_str())).collect();
        Ok(paginate(items, request, "/kpis", &extra))
    }

    fn list_item(kpi: Kpi, now: DateTime<Utc>) -> KpiListItem {
        let current_target = resolve_current_target(&kpi, now);
        KpiListItem {
            links: KpiLinks {
                self_link: Link::new(format!("/kpis/{}", kpi.uuid)),
                metric: Link::titled(format!("/metrics/{}", kpi.metric_uuid), "Related Metric"),
            },
            uuid: kpi.uuid,
            name: kpi.name,
            description: kpi.description,
            metric_uuid: kpi.metric_uuid,
            status: kpi.status,
            current_target,
        }
    }

    pub async fn get(&self, uuid: Uuid) -> Result<Kpi, ServiceError> {
        self.kpis
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, uuid))
    }

    pub async fn by_metric(&self, metric_uuid: Uuid) -> Result<KpisByMetric, ServiceError> {
        let kpis = self.kpis.find_by_metric_uuid(metric_uuid).await?;
        Ok(KpisByMetric {
            metric_uuid,
            kpis,
            links: MetricLinks {
                metric: Link::new(format!("/metrics/{}", metric_uuid)),
            },
        })
    }

    pub async fn create(&self, draft: KpiDraft) -> Result<Kpi, ServiceError> {
        validate_targets(&draft.targets)?;
        self.ensure_metric_exists(draft.metric_uuid).await?;

        let kpi = draft.into_kpi(Uuid::new_v4(), Utc::now());
        self.kpis.save(kpi.clone()).await?;
        tracing::info!("Created KPI {} for metric {}", kpi.uuid, kpi.metric_uuid);
        Ok(kpi)
    }

    pub async fn update(&self, uuid: Uuid, mut patch: KpiPatch) -> Result<Kpi, ServiceError> {
        if let Some(targets) = &patch.targets {
            validate_targets(targets)?;
        }
        if let Some(metric_uuid) = patch.metric_uuid {
            self.ensure_metric_exists(metric_uuid).await?;
        }
        if patch.touches_content() {
            patch.updated_at = Some(Utc::now());
        }

        self.persist(uuid, patch).await?;
        tracing::info!("Updated KPI {}", uuid);
        self.get(uuid).await
    }

    /// KPIs are never removed; deletion moves them to `archived`.
    pub async fn archive(&self, uuid: Uuid) -> Result<(), ServiceError> {
        self.persist(uuid, KpiPatch::archive()).await?;
        tracing::info!("Archived KPI {}", uuid);
        Ok(())
    }

    /// Resolve the target at `as_of` and classify the metric's latest value.
    pub async fn evaluate(
        &self,
        uuid: Uuid,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<KpiEvaluation, ServiceError> {
        let kpi = self.get(uuid).await?;
        let as_of = as_of.unwrap_or_else(Utc::now);

        let current_value = match self.metrics.find_by_id(kpi.metric_uuid).await? {
            Some(metric) => metric.latest_value().map(|v| v.value),
            None => {
                tracing::debug!("Metric {} for KPI {} is missing", kpi.metric_uuid, uuid);
                None
            }
        };

        Ok(KpiEvaluation {
            kpi_uuid: kpi.uuid,
            as_of,
            current_target: resolve_current_target(&kpi, as_of),
            current_value,
            evaluated_status: current_value.map(|value| evaluate_status(&kpi, value)),
        })
    }

    async fn ensure_metric_exists(&self, metric_uuid: Uuid) -> Result<(), ServiceError> {
        match self.metrics.find_by_id(metric_uuid).await? {
            Some(_) => Ok(()),
            None => Err(ValidationError::UnknownMetric(metric_uuid).into()),
        }
    }

    async fn persist(&self, uuid: Uuid, patch: KpiPatch) -> Result<(), ServiceError> {
        if self.kpis.update(uuid, patch).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(ENTITY, uuid))
        }
    }
}
