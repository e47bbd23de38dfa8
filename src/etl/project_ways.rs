use log::warn;

use crate::config::MissingNodePolicy;
use crate::data::osm::{OsmId, RawElement, Tags};
use crate::data::Grid;
use crate::errors::{Error, Result};
use crate::projection::{PlanarPoint, Projector};

/// Tag that marks a way as part of the road network.
pub const HIGHWAY_TAG: &str = "highway";

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedWay {
    pub id: OsmId,
    pub tags: Tags,
    pub points: Vec<PlanarPoint>,
}

#[derive(Debug, Default, Clone)]
pub struct WayProjection {
    pub ways: Vec<ProjectedWay>,
    pub way_point_count: u64,
    pub skipped_refs: u64,
}

/// Projects every way with a non-empty `highway` tag. Ways left with fewer
/// than two usable points are dropped and add nothing to the point count.
pub fn project_highways(
    grid: &Grid,
    projector: &Projector,
    policy: MissingNodePolicy,
) -> Result<WayProjection> {
    let mut projection = WayProjection::default();

    for element in &grid.elements {
        let way = match element {
            RawElement::Way(way) => way,
            _ => continue,
        };
        let tags = match &way.tags {
            Some(tags) if tags.get(HIGHWAY_TAG).is_some_and(|value| !value.is_empty()) => tags,
            _ => continue,
        };

        let mut points = Vec::with_capacity(way.nodes.len());
        let mut skipped = 0u64;
        for &node_id in &way.nodes {
            match grid.nodes.get(node_id).and_then(|node| node.coords()) {
                Some((lon, lat)) => points.push(projector.project(lon, lat)),
                None => {
                    if policy == MissingNodePolicy::Fail {
                        return Err(Error::Construction(format!(
                            "way {} references node {} which is missing or has no coordinates",
                            way.id, node_id
                        )));
                    }
                    skipped += 1;
                }
            }
        }

        if skipped > 0 && policy == MissingNodePolicy::Warn {
            warn!(way_id = way.id, skipped = skipped; "Skipped unresolved node references");
        }
        projection.skipped_refs += skipped;

        if points.len() >= 2 {
            projection.way_point_count += points.len() as u64;
            projection.ways.push(ProjectedWay {
                id: way.id,
                tags: tags.clone(),
                points,
            });
        }
    }

    Ok(projection)
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, Once};

    use log::kv::{Key, Source};
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use serde_json::json;

    use super::*;
    use crate::config::DEFAULT_PROJECTION_SCALE;

    /// Keeps `(level, way_id)` for every skipped-reference record.
    struct SkipRecorder;

    static SKIP_RECORDS: Mutex<Vec<(Level, i64)>> = Mutex::new(Vec::new());
    static RECORDER: SkipRecorder = SkipRecorder;
    static INSTALL: Once = Once::new();

    impl Log for SkipRecorder {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if record.args().to_string() != "Skipped unresolved node references" {
                return;
            }
            let way_id = record
                .key_values()
                .get(Key::from("way_id"))
                .and_then(|value| value.to_i64());
            if let Some(way_id) = way_id {
                SKIP_RECORDS.lock().unwrap().push((record.level(), way_id));
            }
        }

        fn flush(&self) {}
    }

    fn skip_records_for(ids: &[i64]) -> Vec<(Level, i64)> {
        SKIP_RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, way_id)| ids.contains(way_id))
            .copied()
            .collect()
    }

    fn install_recorder() {
        INSTALL.call_once(|| {
            log::set_logger(&RECORDER).unwrap();
            log::set_max_level(LevelFilter::Trace);
        });
    }

    fn grid(value: serde_json::Value) -> (Grid, Projector) {
        let mut grid = Grid::from_osm_response(serde_json::from_value(value).unwrap());
        let projector = grid.projector(DEFAULT_PROJECTION_SCALE).unwrap();
        (grid, projector)
    }

    fn sample() -> (Grid, Projector) {
        grid(json!([
            {"type": "node", "id": 1, "lon": 0, "lat": 0},
            {"type": "node", "id": 2, "lon": 1, "lat": 1},
            {"type": "node", "id": 3, "lon": 1, "lat": 0},
            {"type": "node", "id": 4},
            {"type": "way", "id": 10, "nodes": [1, 2, 3], "tags": {"highway": "primary"}},
            {"type": "way", "id": 11, "nodes": [1, 99, 4], "tags": {"highway": "service"}},
            {"type": "way", "id": 12, "nodes": [1, 2], "tags": {"building": "yes"}},
            {"type": "way", "id": 13, "nodes": [2, 404, 3], "tags": {"highway": "residential"}},
            {"type": "way", "id": 14, "nodes": [1, 2]}
        ]))
    }

    #[test]
    fn counts_only_usable_highways() {
        let (grid, projector) = sample();
        let projection = project_highways(&grid, &projector, MissingNodePolicy::Skip).unwrap();

        let ids: Vec<OsmId> = projection.ways.iter().map(|way| way.id).collect();
        assert_eq!(ids, vec![10, 13]);
        assert_eq!(projection.way_point_count, 3 + 2);
        assert_eq!(projection.skipped_refs, 3);
        assert_eq!(projection.ways[1].points.len(), 2);
    }

    #[test]
    fn projected_points_match_projector() {
        let (grid, projector) = sample();
        let projection = project_highways(&grid, &projector, MissingNodePolicy::Skip).unwrap();
        assert_eq!(projection.ways[0].points[1], projector.project(1.0, 1.0));
    }

    #[test]
    fn warn_policy_still_skips() {
        let (grid, projector) = sample();
        let projection = project_highways(&grid, &projector, MissingNodePolicy::Warn).unwrap();
        assert_eq!(projection.way_point_count, 5);
    }

    #[test]
    fn warn_policy_logs_once_per_way() {
        install_recorder();
        let (grid, projector) = grid(json!([
            {"type": "node", "id": 1, "lon": 0, "lat": 0},
            {"type": "node", "id": 2, "lon": 1, "lat": 1},
            {"type": "way", "id": 9001, "nodes": [1, 77, 78, 2], "tags": {"highway": "primary"}},
            {"type": "way", "id": 9002, "nodes": [1, 2], "tags": {"highway": "primary"}},
            {"type": "way", "id": 9003, "nodes": [79, 2], "tags": {"highway": "service"}}
        ]));

        project_highways(&grid, &projector, MissingNodePolicy::Warn).unwrap();

        assert_eq!(
            skip_records_for(&[9001, 9002, 9003]),
            vec![(Level::Warn, 9001), (Level::Warn, 9003)]
        );
    }

    #[test]
    fn skip_policy_logs_nothing() {
        install_recorder();
        let (grid, projector) = grid(json!([
            {"type": "node", "id": 1, "lon": 0, "lat": 0},
            {"type": "node", "id": 2, "lon": 1, "lat": 1},
            {"type": "way", "id": 9101, "nodes": [1, 77, 2], "tags": {"highway": "primary"}}
        ]));

        let projection = project_highways(&grid, &projector, MissingNodePolicy::Skip).unwrap();

        assert_eq!(projection.skipped_refs, 1);
        assert!(skip_records_for(&[9101]).is_empty());
    }

    #[test]
    fn empty_highway_value_is_not_a_highway() {
        let (grid, projector) = grid(json!([
            {"type": "node", "id": 1, "lon": 0, "lat": 0},
            {"type": "node", "id": 2, "lon": 1, "lat": 1},
            {"type": "way", "id": 20, "nodes": [1, 2], "tags": {"highway": ""}},
            {"type": "way", "id": 21, "nodes": [2, 1], "tags": {"highway": "footway"}}
        ]));

        let projection = project_highways(&grid, &projector, MissingNodePolicy::Skip).unwrap();

        let ids: Vec<OsmId> = projection.ways.iter().map(|way| way.id).collect();
        assert_eq!(ids, vec![21]);
        assert_eq!(projection.way_point_count, 2);
    }

    #[test]
    fn fail_policy_names_the_missing_node() {
        let (grid, projector) = sample();
        let err = project_highways(&grid, &projector, MissingNodePolicy::Fail).unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
        assert!(err.to_string().contains("node 99"));
    }

    #[test]
    fn raw_elements_are_untouched() {
        let (grid, projector) = sample();
        let before = grid.elements.clone();
        project_highways(&grid, &projector, MissingNodePolicy::Skip).unwrap();
        assert_eq!(grid.elements, before);
    }
}
