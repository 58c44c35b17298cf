//! Persisted configuration document — the JSON shape exchanged with the backend.
//!
//! ```json
//! {
//!   "name": "Component Flow Configuration",
//!   "configuration": {
//!     "nodes": [{ "id": "page1", "label": "Page 1", "position": { "x": 0, "y": 0 },
//!                 "data": { "label": "Page 1", "components": ["email"] } }],
//!     "edges": [{ "source": "page1", "target": "page2" }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::graph::Position;

/// Named configuration document: the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    pub name: String,
    pub configuration: GraphDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeDocument>,
    pub edges: Vec<EdgeDocument>,
}

/// A page as stored. `id` and `label` may be absent here so the codec can
/// report which node is incomplete; `position` and `data` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub position: Position,
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub components: Vec<String>,
}

/// Edges keep only their endpoints; visual attributes are not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub source: String,
    pub target: String,
}

impl NodeDocument {
    /// Top-level label, falling back to `data.label`. Blank labels count as missing.
    pub fn resolved_label(&self) -> Option<&str> {
        [self.label.as_deref(), self.data.label.as_deref()]
            .into_iter()
            .flatten()
            .find(|l| !l.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_response_extra_fields_are_ignored() {
        let raw = serde_json::json!({
            "id": 7,
            "name": "Flow",
            "is_acyclic": true,
            "created_at": "2024-05-01T10:00:00Z",
            "configuration": { "nodes": [], "edges": [] }
        });
        let doc: ConfigurationDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.name, "Flow");
        assert!(doc.configuration.nodes.is_empty());
    }

    #[test]
    fn label_falls_back_to_data_label() {
        let node: NodeDocument = serde_json::from_value(serde_json::json!({
            "id": "page1",
            "position": { "x": 10, "y": 20 },
            "data": { "label": "Page 1", "components": [] }
        }))
        .unwrap();
        assert_eq!(node.resolved_label(), Some("Page 1"));
        assert_eq!(node.position, Position::new(10.0, 20.0));
    }

    #[test]
    fn blank_labels_are_missing() {
        let node: NodeDocument = serde_json::from_value(serde_json::json!({
            "id": "page1",
            "label": " ",
            "position": { "x": 0, "y": 0 },
            "data": { "components": [] }
        }))
        .unwrap();
        assert_eq!(node.resolved_label(), None);
    }

    #[test]
    fn position_and_components_are_required() {
        let missing_position = serde_json::json!({
            "id": "page1",
            "label": "Page 1",
            "data": { "components": ["email"] }
        });
        let missing_data = serde_json::json!({
            "id": "page1",
            "label": "Page 1",
            "position": { "x": 0, "y": 0 }
        });
        let missing_components = serde_json::json!({
            "id": "page1",
            "label": "Page 1",
            "position": { "x": 0, "y": 0 },
            "data": { "label": "Page 1" }
        });
        for raw in [missing_position, missing_data, missing_components] {
            assert!(serde_json::from_value::<NodeDocument>(raw).is_err());
        }
    }
}
