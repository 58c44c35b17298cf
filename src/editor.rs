//! Flow editor — the authoring surface over a [`GraphModel`].
//!
//! Edits are forwarded to the model one at a time; a failed edit leaves the
//! graph untouched. Saving encodes a snapshot and sends it to the backend.
//! Only one save runs at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::codec::{self, DEFAULT_CONFIGURATION_NAME};
use crate::error::{GatewayError, GraphError, Result};
use crate::gateway::{InFlightFlag, Operation, SubmissionGateway};
use crate::graph::{ComponentDefinition, GraphModel, PageNode, Position, Transition};

pub struct FlowEditor {
    name: Mutex<String>,
    graph: Mutex<GraphModel>,
    gateway: Arc<dyn SubmissionGateway>,
    saving: InFlightFlag,
}

impl FlowEditor {
    /// Editor over the starter flow.
    pub fn new(gateway: Arc<dyn SubmissionGateway>) -> Self {
        Self::with_graph(DEFAULT_CONFIGURATION_NAME, GraphModel::starter(), gateway)
    }

    pub fn with_graph(name: &str, graph: GraphModel, gateway: Arc<dyn SubmissionGateway>) -> Self {
        Self {
            name: Mutex::new(name.to_string()),
            graph: Mutex::new(graph),
            gateway,
            saving: InFlightFlag::new(),
        }
    }

    fn graph_mut(&self) -> MutexGuard<'_, GraphModel> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> String {
        self.name
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_name(&self, name: &str) {
        *self.name.lock().unwrap_or_else(PoisonError::into_inner) = name.to_string();
    }

    /// Snapshot of the graph being edited.
    pub fn graph(&self) -> GraphModel {
        self.graph_mut().clone()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_busy()
    }

    // ── Edits ───────────────────────────────────────────────────────

    pub fn add_page(&self, page: PageNode) -> std::result::Result<(), GraphError> {
        self.graph_mut().add_page(page)
    }

    /// Remove a page and every transition touching it.
    pub fn remove_page(&self, id: &str) -> std::result::Result<PageNode, GraphError> {
        self.graph_mut().remove_page(id)
    }

    pub fn rename_page(&self, id: &str, label: &str) -> std::result::Result<(), GraphError> {
        self.graph_mut().rename_page(id, label)
    }

    pub fn move_page(&self, id: &str, position: Position) -> std::result::Result<(), GraphError> {
        self.graph_mut().move_page(id, position)
    }

    pub fn connect(&self, source: &str, target: &str) -> std::result::Result<String, GraphError> {
        self.graph_mut().connect(source, target)
    }

    pub fn disconnect(&self, transition_id: &str) -> std::result::Result<Transition, GraphError> {
        self.graph_mut().disconnect(transition_id)
    }

    pub fn assign(&self, page_id: &str, component: &str) -> std::result::Result<(), GraphError> {
        self.graph_mut().assign(page_id, component)
    }

    pub fn unassign(&self, page_id: &str, component: &str) -> std::result::Result<(), GraphError> {
        self.graph_mut().unassign(page_id, component)
    }

    /// Catalog entries the page does not carry yet.
    pub fn available_components(
        &self,
        page_id: &str,
    ) -> std::result::Result<Vec<ComponentDefinition>, GraphError> {
        Ok(self
            .graph_mut()
            .available_components(page_id)?
            .into_iter()
            .cloned()
            .collect())
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Encode the current graph and save it. Fails with `Busy` while a
    /// previous save is still in flight.
    pub async fn save(&self) -> std::result::Result<serde_json::Value, GatewayError> {
        let _saving = self.saving.try_acquire().ok_or_else(|| GatewayError::Busy {
            operation: Operation::SaveConfig.to_string(),
        })?;

        let (document, acyclic) = {
            let graph = self.graph_mut();
            (codec::encode(&self.name(), &graph), graph.is_acyclic())
        };
        if !acyclic {
            warn!(name = %document.name, "Saving a flow that contains a cycle");
        }

        let response = self.gateway.save_config(&document).await?;
        info!(
            name = %document.name,
            pages = document.configuration.nodes.len(),
            transitions = document.configuration.edges.len(),
            acyclic,
            "Flow configuration saved"
        );
        Ok(response)
    }

    /// Replace the graph with the configuration currently stored on the backend.
    pub async fn reload(&self) -> Result<()> {
        let raw = self.gateway.fetch_config().await?;
        let decoded = codec::decode_json(raw)?;
        info!(name = %decoded.name, pages = decoded.graph.pages().len(), "Flow configuration reloaded");
        self.set_name(&decoded.name);
        *self.graph_mut() = decoded.graph;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::codec::ConfigurationDocument;
    use crate::error::Error;
    use crate::gateway::{ProfileUpdate, RegisterRequest, RegisterResponse, UserRecord};

    /// Keeps the last saved document and serves it back on fetch.
    #[derive(Default)]
    struct MemoryBackend {
        saved: Mutex<Option<Value>>,
        delay: Duration,
    }

    #[async_trait]
    impl SubmissionGateway for MemoryBackend {
        async fn save_config(&self, document: &ConfigurationDocument) -> std::result::Result<Value, GatewayError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            *self.saved.lock().unwrap() = Some(serde_json::to_value(document).unwrap());
            Ok(json!({ "status": "ok" }))
        }

        async fn fetch_config(&self) -> std::result::Result<Value, GatewayError> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or(Value::Null))
        }

        async fn register(&self, _: &RegisterRequest) -> std::result::Result<RegisterResponse, GatewayError> {
            unimplemented!()
        }

        async fn update_profile(&self, _: &ProfileUpdate) -> std::result::Result<Value, GatewayError> {
            unimplemented!()
        }

        async fn list_users(&self) -> std::result::Result<Vec<UserRecord>, GatewayError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn save_sends_encoded_graph() {
        let backend = Arc::new(MemoryBackend::default());
        let editor = FlowEditor::new(backend.clone());
        editor.assign("page3", "aboutMe").unwrap();

        editor.save().await.unwrap();

        let saved = backend.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved["name"], DEFAULT_CONFIGURATION_NAME);
        assert_eq!(
            saved["configuration"]["nodes"][2]["data"]["components"],
            json!(["address", "aboutMe"])
        );
        assert_eq!(saved["configuration"]["edges"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn second_save_while_first_in_flight_is_busy() {
        let backend = Arc::new(MemoryBackend {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let editor = FlowEditor::new(backend);

        let (a, b) = tokio::join!(editor.save(), editor.save());
        assert!(a.is_ok());
        assert!(matches!(b, Err(GatewayError::Busy { .. })));
        assert!(!editor.is_saving());
    }

    #[tokio::test]
    async fn reload_restores_saved_flow() {
        let backend = Arc::new(MemoryBackend::default());
        let editor = FlowEditor::new(backend.clone());
        editor.set_name("Custom");
        editor.remove_page("page3").unwrap();
        editor.save().await.unwrap();

        let other = FlowEditor::new(backend);
        other.reload().await.unwrap();
        assert_eq!(other.name(), "Custom");
        assert_eq!(other.graph().pages(), editor.graph().pages());
        assert_eq!(other.graph().transitions().len(), 1);
    }

    #[tokio::test]
    async fn reload_of_missing_configuration_fails_without_changes() {
        let editor = FlowEditor::new(Arc::new(MemoryBackend::default()));
        let err = editor.reload().await.unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
        assert_eq!(editor.graph(), GraphModel::starter());
    }

    #[test]
    fn failed_edit_leaves_graph_unchanged() {
        let editor = FlowEditor::new(Arc::new(MemoryBackend::default()));
        let before = editor.graph();
        assert!(editor.unassign("page1", "email").is_err());
        assert!(editor.connect("page1", "nowhere").is_err());
        assert_eq!(editor.graph(), before);

        let ids: Vec<String> = editor
            .available_components("page1")
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["birthdate", "aboutMe", "address"]);
    }
}
