// Metric domain model - time-stamped numeric values and their write rules
use super::error::ValidationError;
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Integer,
    Decimal,
    Percentage,
    Currency,
}

/// Declarative only; nothing in the service computes the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Latest,
    Average,
    Median,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredFrequency {
    Daily,
    Weekly,
    Monthly,
}

fn allow_negative_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default = "allow_negative_default")]
    pub allow_negative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_frequency: Option<RequiredFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl MetricValue {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    pub unit: String,
    pub values: Vec<MetricValue>,
    pub aggregation: Aggregation,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
}

impl Metric {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_values(self.value_type, self.validation_rules.as_ref(), &self.values)
    }

    /// The value with the greatest timestamp, regardless of insertion order.
    pub fn latest_value(&self) -> Option<&MetricValue> {
        self.values.iter().max_by_key(|v| v.timestamp)
    }

    pub fn values_within(&self, window: &TimeWindow) -> Vec<MetricValue> {
        self.values
            .iter()
            .filter(|v| window.contains(v.timestamp))
            .cloned()
            .collect()
    }
}

/// Inclusive date filter; an omitted bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }
}

/// Check every value against the metric's rules.
/// Percentages must lie in [0, 100] whether or not rules are present.
pub fn validate_values(
    value_type: ValueType,
    rules: Option<&ValidationRules>,
    values: &[MetricValue],
) -> Result<(), ValidationError> {
    for (index, point) in values.iter().enumerate() {
        let value = point.value;

        if value_type == ValueType::Percentage && !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::PercentageOutOfRange { index, value });
        }

        let Some(rules) = rules else { continue };

        if !rules.allow_negative && value < 0.0 {
            return Err(ValidationError::NegativeValueNotAllowed { index, value });
        }
        if let Some(min) = rules.min {
            if value < min {
                return Err(ValidationError::ValueBelowMinimum { index, value, min });
            }
        }
        if let Some(max) = rules.max {
            if value > max {
                return Err(ValidationError::ValueAboveMaximum { index, value, max });
            }
        }
    }

    Ok(())
}

/// Fields accepted when creating a metric; the uuid is assigned by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDraft {
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    pub unit: String,
    #[serde(default)]
    pub values: Vec<MetricValue>,
    pub aggregation: Aggregation,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub validation_rules: Option<ValidationRules>,
}

impl MetricDraft {
    pub fn into_metric(self, uuid: Uuid) -> Metric {
        Metric {
            uuid,
            name: self.name,
            description: self.description,
            value_type: self.value_type,
            unit: self.unit,
            values: self.values,
            aggregation: self.aggregation,
            tags: self.tags,
            validation_rules: self.validation_rules,
        }
    }
}

/// Partial update; `values` replaces the whole series when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub tags: Option<Vec<String>>,
    pub values: Option<Vec<MetricValue>>,
    pub aggregation: Option<Aggregation>,
    pub validation_rules: Option<ValidationRules>,
}

impl MetricPatch {
    pub fn apply(self, metric: &mut Metric) {
        if let Some(name) = self.name {
            metric.name = name;
        }
        if let Some(description) = self.description {
            metric.description = description;
        }
        if let Some(unit) = self.unit {
            metric.unit = unit;
        }
        if let Some(tags) = self.tags {
            metric.tags = tags;
        }
        if let Some(values) = self.values {
            metric.values = values;
        }
        if let Some(aggregation) = self.aggregation {
            metric.aggregation = aggregation;
        }
        if let Some(rules) = self.validation_rules {
            metric.validation_rules = Some(rules);
        }
    }
}
