// Metric service - Use cases for reading and writing metric series
use crate::application::error::ServiceError;
use crate::application::repositories::MetricRepository;
use crate::domain::metric::{Metric, MetricDraft, MetricPatch, MetricValue, validate_values};
use std::sync::Arc;
use uuid::Uuid;

const ENTITY: &str = "metric";

#[derive(Clone)]
pub struct MetricService {
    repository: Arc<dyn MetricRepository>,
}

impl MetricService {
    pub fn new(repository: Arc<dyn MetricRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Metric>, ServiceError> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn get(&self, uuid: Uuid) -> Result<Metric, ServiceError> {
        self.repository
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, uuid))
    }

    pub async fn create(&self, draft: MetricDraft) -> Result<Metric, ServiceError> {
        let metric = draft.into_metric(Uuid::new_v4());
        metric.validate()?;

        self.repository.save(metric.clone()).await?;
        tracing::info!("Created metric {} ({})", metric.uuid, metric.name);
        Ok(metric)
    }

    /// Values are re-checked against the rules the metric will have after the patch.
    pub async fn update(&self, uuid: Uuid, patch: MetricPatch) -> Result<Metric, ServiceError> {
        let mut metric = self.get(uuid).await?;
        patch.clone().apply(&mut metric);
        metric.validate()?;

        self.persist(uuid, patch).await?;
        tracing::info!("Updated metric {}", uuid);
        Ok(metric)
    }

    pub async fn append_values(
        &self,
        uuid: Uuid,
        values: Vec<MetricValue>,
    ) -> Result<Metric, ServiceError> {
        let mut metric = self.get(uuid).await?;
        validate_values(metric.value_type, metric.validation_rules.as_ref(), &values)?;

        let appended = values.len();
        metric.values.extend(values);
        let patch = MetricPatch {
            values: Some(metric.values.clone()),
            ..Default::default()
        };
        self.persist(uuid, patch).await?;

        tracing::info!("Appended {} values to metric {}", appended, uuid);
        Ok(metric)
    }

    async fn persist(&self, uuid: Uuid, patch: MetricPatch) -> Result<(), ServiceError> {
        if self.repository.update(uuid, patch).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(ENTITY, uuid))
        }
    }
}
