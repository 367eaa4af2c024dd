// HTTP request handlers
use crate::application::pagination::PageRequest;
use crate::domain::timestamp::parse_instant;
use crate::presentation::api_error::ApiError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub mod dashboards;
pub mod kpis;
pub mod metrics;

/// Paging parameters arrive as raw strings so that junk or non-positive
/// values fall back to the defaults instead of failing the request.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        page_request(self.page.as_deref(), self.limit.as_deref())
    }
}

fn page_request(page: Option<&str>, limit: Option<&str>) -> PageRequest {
    PageRequest::new(positive_number(page), positive_number(limit))
}

fn positive_number(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Parse an optional date query parameter, rejecting anything unreadable.
fn parse_date_param(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_instant(value)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid {}: {}", name, value))),
        None => Ok(None),
    }
}
