use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type OsmId = i64;
pub type Tags = BTreeMap<String, String>;

/// Top level of an Overpass `[out:json]` response. Fields other than
/// `elements` (`version`, `generator`, `osm3s`, ...) are ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct OsmDocument {
    pub elements: Vec<RawElement>,
}

/// A single element as it appears in the export. Keys that aren't modelled
/// are kept in `extra` so the element serializes back unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawElement {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// `(lon, lat)` when both are present and finite.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Some((lon, lat)),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmId,
    #[serde(default)]
    pub nodes: Vec<OsmId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Member {
    #[serde(rename = "type")]
    pub member_type: String,
    #[serde(rename = "ref")]
    pub member_ref: OsmId,
    #[serde(default)]
    pub role: String,
}

impl RawElement {
    pub fn id(&self) -> OsmId {
        match self {
            RawElement::Node(node) => node.id,
            RawElement::Way(way) => way.id,
            RawElement::Relation(relation) => relation.id,
        }
    }

    pub fn tags(&self) -> Option<&Tags> {
        match self {
            RawElement::Node(node) => node.tags.as_ref(),
            RawElement::Way(way) => way.tags.as_ref(),
            RawElement::Relation(relation) => relation.tags.as_ref(),
        }
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags().is_some_and(|tags| tags.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overpass_elements() {
        let doc: OsmDocument = serde_json::from_str(
            r#"{
                "version": 0.6,
                "elements": [
                    {"type": "node", "id": 1, "lat": 1.5, "lon": 103.8},
                    {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "primary"}},
                    {"type": "relation", "id": 20, "members": [{"type": "way", "ref": 10, "role": "outer"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.elements.len(), 3);
        match &doc.elements[0] {
            RawElement::Node(node) => assert_eq!(node.coords(), Some((103.8, 1.5))),
            other => panic!("expected node, got {:?}", other),
        }
        assert!(doc.elements[1].has_tag("highway"));
        match &doc.elements[2] {
            RawElement::Relation(relation) => {
                assert_eq!(relation.members[0].member_ref, 10);
                assert_eq!(relation.members[0].role, "outer");
            }
            other => panic!("expected relation, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_survive_reserialization() {
        let input = r#"{"type":"node","id":7,"lat":1.0,"lon":2.0,"version":3}"#;
        let element: RawElement = serde_json::from_str(input).unwrap();
        let output = serde_json::to_value(&element).unwrap();
        assert_eq!(output["type"], "node");
        assert_eq!(output["version"], 3);
        assert_eq!(output["lon"], 2.0);
    }

    #[test]
    fn node_without_coordinates_has_no_coords() {
        let element: RawElement = serde_json::from_str(r#"{"type":"node","id":3,"lat":1.0}"#).unwrap();
        match element {
            RawElement::Node(node) => assert_eq!(node.coords(), None),
            other => panic!("expected node, got {:?}", other),
        }
    }

    #[test]
    fn unknown_element_type_is_rejected() {
        let result = serde_json::from_str::<RawElement>(r#"{"type":"area","id":1}"#);
        assert!(result.is_err());
    }
}
