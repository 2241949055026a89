//! Persisted map-document shapes and the offline draft cache.
//!
//! This crate owns the wire format only. The shapes match what the REST
//! collaborator stores: `{name, data: {roads, landmarks, simRoute,
//! scale, pan}}`. Every key inside `data` is optional so partial
//! documents load additively, and a missing key must never overwrite
//! in-memory state.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod store;

pub use store::*;

/// A geodetic vertex of a saved road.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A canvas-space vertex (legacy simulated routes are stored
/// pre-projected).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

/// One saved road polyline.
pub type Road = Vec<LatLng>;

/// A saved landmark. `kind` is the wire name of the icon type; ids are
/// session-local and reassigned on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

/// The `data` blob of a saved document. All keys optional: absent keys
/// leave existing state alone on load.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roads: Option<Vec<Road>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Landmark>>,
    #[serde(rename = "simRoute", default, skip_serializing_if = "Option::is_none")]
    pub sim_route: Option<Vec<CanvasPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Pan>,
}

/// A saved (or about-to-be-saved) map document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub name: String,
    #[serde(default)]
    pub data: MapData,
}

impl MapDocument {
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(self).map_err(|e| DocumentError::Corrupt(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(raw).map_err(|e| DocumentError::Corrupt(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The server knows nothing under this id. Reported distinctly from
    /// transport failure.
    NotFound,
    Network(String),
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::NotFound => write!(f, "map not found"),
            DocumentError::Network(msg) => write!(f, "network error: {msg}"),
            DocumentError::StorageUnavailable => write!(f, "browser storage unavailable"),
            DocumentError::Corrupt(msg) => write!(f, "stored map is corrupt: {msg}"),
            DocumentError::Io(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for DocumentError {}

#[cfg(test)]
mod tests {
    use super::{LatLng, MapData, MapDocument};
    use pretty_assertions::assert_eq;

    #[test]
    fn full_document_round_trips() {
        let doc = MapDocument {
            name: "campus".to_string(),
            data: MapData {
                roads: Some(vec![vec![
                    LatLng {
                        lat: 28.6139,
                        lng: 77.2090,
                    },
                    LatLng {
                        lat: 28.6140,
                        lng: 77.2091,
                    },
                ]]),
                landmarks: None,
                sim_route: None,
                scale: Some(1.5),
                pan: None,
            },
        };
        let json = doc.to_json().unwrap();
        assert_eq!(MapDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn missing_keys_deserialize_as_none() {
        let doc = MapDocument::from_json(r#"{"name":"partial","data":{"scale":2.0}}"#).unwrap();
        assert_eq!(doc.data.scale, Some(2.0));
        assert_eq!(doc.data.roads, None);
        assert_eq!(doc.data.landmarks, None);
        assert_eq!(doc.data.sim_route, None);
        assert_eq!(doc.data.pan, None);
    }

    #[test]
    fn absent_data_defaults_to_empty() {
        let doc = MapDocument::from_json(r#"{"name":"empty"}"#).unwrap();
        assert_eq!(doc.data, MapData::default());
    }

    #[test]
    fn sim_route_uses_camel_case_key() {
        let json = r#"{"name":"m","data":{"simRoute":[{"x":1.0,"y":2.0}]}}"#;
        let doc = MapDocument::from_json(json).unwrap();
        let route = doc.data.sim_route.as_ref().unwrap();
        assert_eq!(route[0].x, 1.0);
        let out = doc.to_json();
        assert!(out.unwrap().contains("simRoute"));
    }

    #[test]
    fn landmark_kind_serializes_as_type() {
        let json = r#"{"type":"house","x":1.0,"y":2.0,"width":48.0,"height":48.0}"#;
        let lm: super::Landmark = serde_json::from_str(json).unwrap();
        assert_eq!(lm.kind, "house");
        assert_eq!(lm.label, "");
        assert!(serde_json::to_string(&lm).unwrap().contains("\"type\""));
    }

    #[test]
    fn garbage_reports_corrupt() {
        let err = MapDocument::from_json("{not json").unwrap_err();
        assert!(matches!(err, super::DocumentError::Corrupt(_)));
    }
}
