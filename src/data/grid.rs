use std::collections::HashMap;

use log::debug;

use crate::config::{DEFAULT_GRID_ID, DEFAULT_GRID_NAME};
use crate::errors::{Error, Result};
use crate::projection::Projector;

use super::osm::{Node, OsmId, RawElement};

/// Node lookup keyed by id. Remembers insertion order so it can be flattened
/// back into `(id, node)` pairs.
#[derive(Debug, Default, Clone)]
pub struct NodeTable {
    entries: Vec<(OsmId, Node)>,
    index: HashMap<OsmId, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated id replaces the earlier node in place.
    pub fn insert(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&slot) => self.entries[slot].1 = node,
            None => {
                self.index.insert(node.id, self.entries.len());
                self.entries.push((node.id, node));
            }
        }
    }

    pub fn get(&self, id: OsmId) -> Option<&Node> {
        self.index.get(&id).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(OsmId, Node)> {
        self.entries.iter()
    }

    pub fn into_pairs(self) -> Vec<(OsmId, Node)> {
        self.entries
    }
}

/// Geographic extent of the grid plus its planar counterpart. The planar
/// fields stay at zero until [`BoundingBox::calibrate`] runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            cx: 0.0,
            cy: 0.0,
        }
    }
}

impl BoundingBox {
    pub fn add_point(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    pub fn geo_center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Projects the geographic corners. North maps to smaller `y`, so the
    /// planar `min_y` comes from `max_lat`.
    pub fn calibrate(&mut self, projector: &Projector) {
        let north_west = projector.project(self.min_lon, self.max_lat);
        let south_east = projector.project(self.max_lon, self.min_lat);
        self.min_x = north_west.x;
        self.min_y = north_west.y;
        self.max_x = south_east.x;
        self.max_y = south_east.y;
        self.cx = (self.min_x + self.max_x) / 2.0;
        self.cy = (self.min_y + self.max_y) / 2.0;
    }
}

/// A loaded map extract: metadata, every raw element, the node table and
/// the bounds computed from it.
#[derive(Debug, Clone)]
pub struct Grid {
    pub name: String,
    pub id: u64,
    pub is_area: bool,
    pub bounds: BoundingBox,
    pub nodes: NodeTable,
    pub elements: Vec<RawElement>,
    pub way_point_count: u64,
    projector: Option<Projector>,
}

impl Grid {
    pub fn from_osm_response(elements: Vec<RawElement>) -> Grid {
        let mut nodes = NodeTable::new();
        let mut bounds = BoundingBox::default();

        for element in &elements {
            if let RawElement::Node(node) = element {
                if let Some((lon, lat)) = node.coords() {
                    bounds.add_point(lon, lat);
                }
                nodes.insert(node.clone());
            }
        }
        debug!(elements = elements.len(), nodes = nodes.len(); "Built grid from OSM response");

        Grid {
            name: DEFAULT_GRID_NAME.to_string(),
            id: DEFAULT_GRID_ID,
            is_area: true,
            bounds,
            nodes,
            elements,
            way_point_count: 0,
            projector: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    pub fn set_is_area(&mut self, is_area: bool) {
        self.is_area = is_area;
    }

    /// Returns the projector centered on the grid, creating it on first use.
    /// Creating it also fills in the planar half of `bounds`.
    pub fn projector(&mut self, scale: f64) -> Result<Projector> {
        if let Some(projector) = self.projector {
            if projector.scale() == scale {
                return Ok(projector);
            }
        }
        if self.bounds.is_empty() {
            return Err(Error::Construction(
                "cannot calibrate projector: extract has no nodes with coordinates".to_string(),
            ));
        }
        let (center_lon, center_lat) = self.bounds.geo_center();
        let projector = Projector::new(center_lon, center_lat, scale)?;
        self.bounds.calibrate(&projector);
        self.projector = Some(projector);
        Ok(projector)
    }
}
