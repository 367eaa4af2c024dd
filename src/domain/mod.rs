// Domain layer - entities and pure business rules
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod kpi;
pub mod metric;
pub mod timestamp;
