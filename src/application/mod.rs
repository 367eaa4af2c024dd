// Application layer - Use cases and repository ports
pub mod dashboard_service;
pub mod error;
pub mod kpi_service;
pub mod metric_service;
pub mod pagination;
pub mod repositories;

#[cfg(test)]
pub mod in_memory;
