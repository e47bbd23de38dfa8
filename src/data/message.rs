//! Messages exchanged between the caller and the loader worker.

use serde::{Deserialize, Serialize};

use super::grid::{BoundingBox, Grid};
use super::osm::{OsmId, RawElement};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub data_url: String,
    #[serde(default)]
    pub initial_grid_data: InitialGridData,
}

impl LoadRequest {
    pub fn new(data_url: impl Into<String>) -> Self {
        LoadRequest {
            data_url: data_url.into(),
            initial_grid_data: InitialGridData::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitialGridData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_area: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundsData {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub cx: f64,
    pub cy: f64,
    pub original_min_lon: f64,
    pub original_min_lat: f64,
    pub original_max_lon: f64,
    pub original_max_lat: f64,
}

impl From<&BoundingBox> for BoundsData {
    /// An empty box (no node had coordinates) serializes as all zeros.
    fn from(value: &BoundingBox) -> Self {
        if value.is_empty() {
            return BoundsData {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 0.0,
                cx: 0.0,
                cy: 0.0,
                original_min_lon: 0.0,
                original_min_lat: 0.0,
                original_max_lon: 0.0,
                original_max_lat: 0.0,
            };
        }
        BoundsData {
            min_x: value.min_x,
            min_y: value.min_y,
            max_x: value.max_x,
            max_y: value.max_y,
            cx: value.cx,
            cy: value.cy,
            original_min_lon: value.min_lon,
            original_min_lat: value.min_lat,
            original_max_lon: value.max_lon,
            original_max_lat: value.max_lat,
        }
    }
}

/// Owned, serializable snapshot of a [`Grid`]. `nodes` is a list of
/// `[id, node]` pairs rather than a map, each node keeping its `type` tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    pub name: String,
    pub id: u64,
    pub is_area: bool,
    pub bounds: BoundsData,
    pub raw_elements: Vec<RawElement>,
    pub nodes: Vec<(OsmId, RawElement)>,
    pub way_point_count: u64,
}

impl From<Grid> for GridData {
    fn from(grid: Grid) -> Self {
        GridData {
            bounds: BoundsData::from(&grid.bounds),
            name: grid.name,
            id: grid.id,
            is_area: grid.is_area,
            raw_elements: grid.elements,
            nodes: grid
                .nodes
                .into_pairs()
                .into_iter()
                .map(|(id, node)| (id, RawElement::Node(node)))
                .collect(),
            way_point_count: grid.way_point_count,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    #[serde(rename = "SUCCESS")]
    Success {
        #[serde(rename = "gridData")]
        grid_data: Box<GridData>,
    },
    #[serde(rename = "ERROR")]
    Error { error: String },
}

impl WorkerMessage {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerMessage::Success { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
