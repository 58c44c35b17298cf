//! Configuration codec — translates between the editable [`GraphModel`] and
//! the persisted [`ConfigurationDocument`].
//!
//! Encoding is pure and total. Decoding validates the document and yields both
//! an equivalent graph and the [`PageComponentMap`] a wizard session runs on.
//! For every field encoding keeps, `decode(encode(g))` reproduces `g`.

pub mod document;
pub mod page_map;

pub use document::{ConfigurationDocument, EdgeDocument, GraphDocument, NodeData, NodeDocument};
pub use page_map::PageComponentMap;

use crate::error::{CodecError, GraphError};
use crate::graph::{GraphModel, PageNode};

/// Name given to configurations saved without an explicit one.
pub const DEFAULT_CONFIGURATION_NAME: &str = "Component Flow Configuration";

/// Result of decoding a configuration document.
#[derive(Debug, Clone)]
pub struct DecodedConfiguration {
    pub name: String,
    pub graph: GraphModel,
    pub pages: PageComponentMap,
}

/// Project a graph into its persisted shape.
pub fn encode(name: &str, graph: &GraphModel) -> ConfigurationDocument {
    let nodes = graph
        .pages()
        .iter()
        .map(|page| NodeDocument {
            id: page.id.clone(),
            label: Some(page.label.clone()),
            position: page.position,
            data: NodeData {
                label: Some(page.label.clone()),
                components: page.components.clone(),
            },
        })
        .collect();

    let edges = graph
        .transitions()
        .iter()
        .map(|t| EdgeDocument {
            source: t.source.clone(),
            target: t.target.clone(),
        })
        .collect();

    ConfigurationDocument {
        name: name.to_string(),
        configuration: GraphDocument { nodes, edges },
    }
}

/// Rebuild the graph and page map from a document.
pub fn decode(doc: &ConfigurationDocument) -> Result<DecodedConfiguration, CodecError> {
    let mut graph = GraphModel::new();

    for (index, node) in doc.configuration.nodes.iter().enumerate() {
        if node.id.trim().is_empty() {
            return Err(CodecError::malformed(format!("node #{index} has no id")));
        }
        let label = node
            .resolved_label()
            .ok_or_else(|| CodecError::malformed(format!("node {} has no label", node.id)))?;

        let page = PageNode {
            id: node.id.clone(),
            label: label.to_string(),
            position: node.position,
            components: node.data.components.clone(),
        };
        graph.add_page(page).map_err(malformed_graph)?;
    }

    for edge in &doc.configuration.edges {
        graph
            .add_transition(&edge.source, &edge.target, false)
            .map_err(malformed_graph)?;
    }

    let pages = graph
        .pages()
        .iter()
        .map(|p| (p.id.clone(), p.components.clone()))
        .collect();

    tracing::debug!(
        name = %doc.name,
        pages = graph.pages().len(),
        transitions = graph.transitions().len(),
        "Configuration decoded"
    );

    Ok(DecodedConfiguration {
        name: doc.name.clone(),
        graph,
        pages,
    })
}

/// Validate a raw JSON value against the wire schema, then decode it.
pub fn decode_json(value: serde_json::Value) -> Result<DecodedConfiguration, CodecError> {
    let doc: ConfigurationDocument = serde_json::from_value(value)
        .map_err(|e| CodecError::malformed(format!("invalid document: {e}")))?;
    decode(&doc)
}

pub fn decode_str(raw: &str) -> Result<DecodedConfiguration, CodecError> {
    let doc: ConfigurationDocument = serde_json::from_str(raw)
        .map_err(|e| CodecError::malformed(format!("invalid document: {e}")))?;
    decode(&doc)
}

fn malformed_graph(err: GraphError) -> CodecError {
    CodecError::malformed(err.to_string())
}
