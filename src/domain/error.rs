// Validation failures raised by the domain rules
use thiserror::Error;
use uuid::Uuid;

/// Caller input defects. None of these are transient, so none are retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("dashboard must have at least one tile")]
    EmptyDashboard,

    #[error("duplicate tile id: {0}")]
    DuplicateTileId(String),

    #[error("invalid tile dimensions for tile {0}")]
    InvalidTileGeometry(String),

    #[error("tile {0} must reference at least one metric")]
    TileMissingMetric(String),

    #[error("tiles {0} and {1} overlap")]
    TileOverlap(String, String),

    #[error("at least one target is required")]
    EmptyTargets,

    #[error("dated targets must be in chronological order (target at index {index})")]
    TargetsOutOfOrder { index: usize },

    #[error("value {value} at index {index} is below the minimum of {min}")]
    ValueBelowMinimum { index: usize, value: f64, min: f64 },

    #[error("value {value} at index {index} is above the maximum of {max}")]
    ValueAboveMaximum { index: usize, value: f64, max: f64 },

    #[error("value {value} at index {index} is negative")]
    NegativeValueNotAllowed { index: usize, value: f64 },

    #[error("percentage {value} at index {index} must lie within 0..=100")]
    PercentageOutOfRange { index: usize, value: f64 },

    #[error("metric {0} does not exist")]
    UnknownMetric(Uuid),
}
