pub mod grid;
pub mod message;
pub mod osm;

pub use grid::{BoundingBox, Grid, NodeTable};
pub use message::{BoundsData, GridData, InitialGridData, LoadRequest, WorkerMessage};
pub use osm::{Member, Node, OsmDocument, OsmId, RawElement, Relation, Tags, Way};
