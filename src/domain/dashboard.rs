// Dashboard domain model - tile layout, validation and reference extraction
use super::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileType {
    SingleMetric,
    MultiMetric,
    KpiTracker,
    MetricWithKpi,
    Chart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileConfig {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    #[serde(rename = "type")]
    pub tile_type: TileType,
    pub metric_uuids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_uuids: Option<Vec<Uuid>>,
    /// Visualization settings for the front-end. Passed through, never inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

impl TileConfig {
    /// Non-negative origin, positive size, and far edges that fit in an `i64`.
    fn has_valid_geometry(&self) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.w > 0
            && self.h > 0
            && self.x.checked_add(self.w).is_some()
            && self.y.checked_add(self.h).is_some()
    }

    /// Half-open rectangles `[x, x+w) x [y, y+h)`; shared edges do not overlap.
    /// Edges are compared in `i128` so oversized tiles never wrap.
    pub fn overlaps(&self, other: &TileConfig) -> bool {
        let (ax, ay, aw, ah) = (self.x as i128, self.y as i128, self.w as i128, self.h as i128);
        let (bx, by, bw, bh) = (other.x as i128, other.y as i128, other.w as i128, other.h as i128);
        ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub owner_uuid: Uuid,
    pub tiles: Vec<TileConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dashboard {
    /// Independent copy owned by `new_owner`. Tiles are cloned, so edits to
    /// the copy never reach the source.
    pub fn duplicate_for(&self, new_owner: Uuid, name_prefix: &str, now: DateTime<Utc>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: format!("{} {}", name_prefix, self.name),
            description: self.description.clone(),
            owner_uuid: new_owner,
            tiles: self.tiles.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validate a tile layout. The first failure wins. Tiles are checked one at a
/// time in array order (id uniqueness, geometry, metric references), and only a
/// layout whose tiles all pass is scanned for pairwise overlap.
pub fn validate_tiles(tiles: &[TileConfig]) -> Result<(), ValidationError> {
    if tiles.is_empty() {
        return Err(ValidationError::EmptyDashboard);
    }

    let mut ids = HashSet::with_capacity(tiles.len());
    for tile in tiles {
        if !ids.insert(tile.id.as_str()) {
            return Err(ValidationError::DuplicateTileId(tile.id.clone()));
        }
        if !tile.has_valid_geometry() {
            return Err(ValidationError::InvalidTileGeometry(tile.id.clone()));
        }
        if tile.metric_uuids.is_empty() {
            return Err(ValidationError::TileMissingMetric(tile.id.clone()));
        }
    }

    // Exhaustive pairwise scan; dashboards hold few tiles.
    for (i, a) in tiles.iter().enumerate() {
        for b in &tiles[i + 1..] {
            if a.overlaps(b) {
                return Err(ValidationError::TileOverlap(a.id.clone(), b.id.clone()));
            }
        }
    }

    Ok(())
}

/// Distinct metric uuids across all tiles, in first-seen order.
pub fn extract_metric_uuids(dashboard: &Dashboard) -> Vec<Uuid> {
    dedup_in_order(dashboard.tiles.iter().flat_map(|t| t.metric_uuids.iter()))
}

/// Distinct KPI uuids across all tiles, in first-seen order.
pub fn extract_kpi_uuids(dashboard: &Dashboard) -> Vec<Uuid> {
    dedup_in_order(
        dashboard
            .tiles
            .iter()
            .filter_map(|t| t.kpi_uuids.as_ref())
            .flatten(),
    )
}

fn dedup_in_order<'a>(uuids: impl Iterator<Item = &'a Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    uuids.filter(|uuid| seen.insert(**uuid)).copied().collect()
}

pub fn can_modify(dashboard: &Dashboard, user_uuid: Uuid, is_admin: bool) -> bool {
    is_admin || dashboard.owner_uuid == user_uuid
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tiles: Vec<TileConfig>,
}

impl DashboardDraft {
    pub fn into_dashboard(self, uuid: Uuid, owner_uuid: Uuid, now: DateTime<Utc>) -> Dashboard {
        Dashboard {
            uuid,
            name: self.name,
            description: self.description,
            owner_uuid,
            tiles: self.tiles,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tiles: Option<Vec<TileConfig>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tiles.is_none()
    }

    pub fn apply(self, dashboard: &mut Dashboard) {
        if let Some(name) = self.name {
            dashboard.name = name;
        }
        if let Some(description) = self.description {
            dashboard.description = description;
        }
        if let Some(tiles) = self.tiles {
            dashboard.tiles = tiles;
        }
        if let Some(updated_at) = self.updated_at {
            dashboard.updated_at = updated_at;
        }
    }
}
