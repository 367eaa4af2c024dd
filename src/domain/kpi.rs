// KPI domain model - targets, thresholds and their evaluation
use super::error::ValidationError;
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTarget {
    pub value: f64,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Lower bounds: a value below `critical` is worse than one below `warning`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KpiStatus {
    #[default]
    OnTrack,
    Warning,
    Critical,
    Archived,
}

impl KpiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiStatus::OnTrack => "on-track",
            KpiStatus::Warning => "warning",
            KpiStatus::Critical => "critical",
            KpiStatus::Archived => "archived",
        }
    }
}

/// Outcome of comparing a metric value against a KPI's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluatedStatus {
    OnTrack,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub metric_uuid: Uuid,
    pub targets: Vec<KpiTarget>,
    pub status: KpiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<KpiThresholds>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pick the target that applies at `as_of`.
///
/// Dated targets win over undated ones: the earliest target due on or after
/// `as_of` is chosen, falling back to the most recent past target. Without
/// any dated target the first target in the list is the static target.
pub fn resolve_current_target(kpi: &Kpi, as_of: DateTime<Utc>) -> Option<f64> {
    let mut dated: Vec<(DateTime<Utc>, f64)> = kpi
        .targets
        .iter()
        .filter_map(|t| t.date.map(|date| (date, t.value)))
        .collect();

    if dated.is_empty() {
        return kpi.targets.first().map(|t| t.value);
    }

    dated.sort_by_key(|(date, _)| *date);

    dated
        .iter()
        .find(|(date, _)| *date >= as_of)
        .or_else(|| dated.last())
        .map(|(_, value)| *value)
}

/// Classify a metric value. Critical is checked first so it takes precedence.
pub fn evaluate_status(kpi: &Kpi, current_metric_value: f64) -> EvaluatedStatus {
    let Some(thresholds) = kpi.thresholds else {
        return EvaluatedStatus::OnTrack;
    };

    if thresholds.critical.is_some_and(|critical| current_metric_value < critical) {
        return EvaluatedStatus::Critical;
    }
    if thresholds.warning.is_some_and(|warning| current_metric_value < warning) {
        return EvaluatedStatus::Warning;
    }

    EvaluatedStatus::OnTrack
}

/// Targets must be non-empty, and dated targets (in list order, undated ones
/// skipped) must have strictly increasing dates.
pub fn validate_targets(targets: &[KpiTarget]) -> Result<(), ValidationError> {
    if targets.is_empty() {
        return Err(ValidationError::EmptyTargets);
    }

    let mut previous: Option<DateTime<Utc>> = None;
    for (index, target) in targets.iter().enumerate() {
        let Some(date) = target.date else { continue };
        if previous.is_some_and(|prev| date <= prev) {
            return Err(ValidationError::TargetsOutOfOrder { index });
        }
        previous = Some(date);
    }

    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiDraft {
    pub name: String,
    pub description: String,
    pub metric_uuid: Uuid,
    pub targets: Vec<KpiTarget>,
    #[serde(default)]
    pub status: KpiStatus,
    #[serde(default)]
    pub thresholds: Option<KpiThresholds>,
}

impl KpiDraft {
    pub fn into_kpi(self, uuid: Uuid, now: DateTime<Utc>) -> Kpi {
        Kpi {
            uuid,
            name: self.name,
            description: self.description,
            metric_uuid: self.metric_uuid,
            targets: self.targets,
            status: self.status,
            thresholds: self.thresholds,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub metric_uuid: Option<Uuid>,
    pub targets: Option<Vec<KpiTarget>>,
    pub status: Option<KpiStatus>,
    pub thresholds: Option<KpiThresholds>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl KpiPatch {
    /// Only content changes move `updatedAt`; a bare status flip does not.
    pub fn touches_content(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.targets.is_some()
            || self.thresholds.is_some()
    }

    pub fn archive() -> Self {
        Self {
            status: Some(KpiStatus::Archived),
            ..Default::default()
        }
    }

    pub fn apply(self, kpi: &mut Kpi) {
        if let Some(name) = self.name {
            kpi.name = name;
        }
        if let Some(description) = self.description {
            kpi.description = description;
        }
        if let Some(metric_uuid) = self.metric_uuid {
            kpi.metric_uuid = metric_uuid;
        }
        if let Some(targets) = self.targets {
            kpi.targets = targets;
        }
        if let Some(status) = self.status {
            kpi.status = status;
        }
        if let Some(thresholds) = self.thresholds {
            kpi.thresholds = Some(thresholds);
        }
        if let Some(updated_at) = self.updated_at {
            kpi.updated_at = updated_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::parse_instant;

    fn target(value: f64, date: Option<&str>) -> KpiTarget {
        KpiTarget {
            value,
            date: date.and_then(parse_instant),
            label: None,
        }
    }

    fn kpi_with(targets: Vec<KpiTarget>, thresholds: Option<KpiThresholds>) -> Kpi {
        let now = Utc::now();
        Kpi {
            uuid: Uuid::new_v4(),
            name: "Signups".to_string(),
            description: "Weekly signups".to_string(),
            metric_uuid: Uuid::new_v4(),
            targets,
            status: KpiStatus::OnTrack,
            thresholds,
            created_at: now,
            updated_at: now,
        }
    }

    fn day(raw: &str) -> DateTime<Utc> {
        parse_instant(raw).unwrap()
    }

    #[test]
    fn test_resolve_picks_next_upcoming_target() {
        let kpi = kpi_with(
            vec![target(10.0, Some("2024-01-01")), target(20.0, Some("2025-01-01"))],
            None,
        );
        assert_eq!(resolve_current_target(&kpi, day("2024-06-01")), Some(20.0));
        assert_eq!(resolve_current_target(&kpi, day("2023-06-01")), Some(10.0));
    }

    #[test]
    fn test_resolve_target_due_today_counts_as_upcoming() {
        let kpi = kpi_with(
            vec![target(10.0, Some("2024-01-01")), target(20.0, Some("2025-01-01"))],
            None,
        );
        assert_eq!(resolve_current_target(&kpi, day("2024-01-01")), Some(10.0));
    }

    #[test]
    fn test_resolve_falls_back_to_latest_past_target() {
        let kpi = kpi_with(
            vec![target(10.0, Some("2024-01-01")), target(20.0, Some("2025-01-01"))],
            None,
        );
        assert_eq!(resolve_current_target(&kpi, day("2026-01-01")), Some(20.0));
    }

    #[test]
    fn test_resolve_sorts_dated_targets_and_ignores_undated() {
        let kpi = kpi_with(
            vec![
                target(99.0, None),
                target(30.0, Some("2025-03-01")),
                target(15.0, Some("2024-03-01")),
            ],
            None,
        );
        assert_eq!(resolve_current_target(&kpi, day("2024-01-01")), Some(15.0));
    }

    #[test]
    fn test_resolve_static_target() {
        let kpi = kpi_with(vec![target(5.0, None), target(7.0, None)], None);
        assert_eq!(resolve_current_target(&kpi, day("1999-01-01")), Some(5.0));
        assert_eq!(resolve_current_target(&kpi, day("2099-01-01")), Some(5.0));
    }

    #[test]
    fn test_resolve_without_targets() {
        let kpi = kpi_with(vec![], None);
        assert_eq!(resolve_current_target(&kpi, Utc::now()), None);
    }

    #[test]
    fn test_critical_takes_precedence_over_warning() {
        let thresholds = KpiThresholds {
            warning: Some(50.0),
            critical: Some(20.0),
        };
        let kpi = kpi_with(vec![target(100.0, None)], Some(thresholds));

        assert_eq!(evaluate_status(&kpi, 10.0), EvaluatedStatus::Critical);
        assert_eq!(evaluate_status(&kpi, 20.0), EvaluatedStatus::Warning);
        assert_eq!(evaluate_status(&kpi, 49.9), EvaluatedStatus::Warning);
        assert_eq!(evaluate_status(&kpi, 50.0), EvaluatedStatus::OnTrack);
    }

    #[test]
    fn test_status_without_thresholds_is_on_track() {
        let kpi = kpi_with(vec![target(100.0, None)], None);
        assert_eq!(evaluate_status(&kpi, -1_000.0), EvaluatedStatus::OnTrack);

        let empty = kpi_with(vec![target(100.0, None)], Some(KpiThresholds::default()));
        assert_eq!(evaluate_status(&empty, -1_000.0), EvaluatedStatus::OnTrack);
    }

    #[test]
    fn test_validate_targets() {
        assert_eq!(validate_targets(&[]), Err(ValidationError::EmptyTargets));

        let out_of_order = vec![target(1.0, Some("2025-02-01")), target(2.0, Some("2025-01-01"))];
        assert_eq!(
            validate_targets(&out_of_order),
            Err(ValidationError::TargetsOutOfOrder { index: 1 })
        );

        let same_day = vec![
            target(1.0, Some("2025-01-01")),
            target(2.0, None),
            target(3.0, Some("2025-01-01")),
        ];
        assert_eq!(
            validate_targets(&same_day),
            Err(ValidationError::TargetsOutOfOrder { index: 2 })
        );

        let ordered = vec![
            target(1.0, Some("2025-01-01")),
            target(2.0, None),
            target(3.0, Some("2025-04-01")),
        ];
        assert!(validate_targets(&ordered).is_ok());
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&KpiStatus::OnTrack).unwrap();
        assert_eq!(json, "\"on-track\"");
        assert_eq!(KpiStatus::Archived.as_str(), "archived");
    }

    #[test]
    fn test_patch_touches_content() {
        assert!(!KpiPatch::archive().touches_content());
        let patch = KpiPatch {
            thresholds: Some(KpiThresholds::default()),
            ..Default::default()
        };
        assert!(patch.touches_content());
    }
}
