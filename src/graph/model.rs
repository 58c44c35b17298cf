//! Graph model — pages (nodes), transitions (edges), and per-page component assignments.
//!
//! Every edit is applied atomically: an operation either succeeds or returns a
//! [`GraphError`] and leaves the model untouched.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;

use super::catalog::{ComponentCatalog, ComponentDefinition};

/// Authoring-time canvas position. Not meaningful to the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers. JSON cannot carry anything else.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One page of the onboarding flow.
#[derive(Debug, Clone, PartialEq)]
pub struct PageNode {
    pub id: String,
    pub label: String,
    pub position: Position,
    /// Assigned component ids, in render order.
    pub components: Vec<String>,
}

impl PageNode {
    pub fn new(id: &str, label: &str, position: Position) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            position,
            components: Vec::new(),
        }
    }

    pub fn has_component(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

/// An authored edge between two pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Visual-only.
    pub animated: bool,
}

impl Transition {
    pub fn id_for(source: &str, target: &str) -> String {
        format!("{source}->{target}")
    }

    pub fn touches(&self, page: &str) -> bool {
        self.source == page || self.target == page
    }
}

/// The editable onboarding graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    pages: Vec<PageNode>,
    transitions: Vec<Transition>,
    catalog: Arc<ComponentCatalog>,
}

impl GraphModel {
    /// Empty graph backed by the standard catalog.
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(ComponentCatalog::standard()))
    }

    pub fn with_catalog(catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            pages: Vec::new(),
            transitions: Vec::new(),
            catalog,
        }
    }

    /// The three-page flow an operator starts from: email, birthdate, address.
    pub fn starter() -> Self {
        let mut graph = Self::new();
        let pages = [
            ("page1", "Page 1", 0.0, "email"),
            ("page2", "Page 2", 300.0, "birthdate"),
            ("page3", "Page 3", 600.0, "address"),
        ];
        for (id, label, x, component) in pages {
            let mut page = PageNode::new(id, label, Position::new(x, 0.0));
            page.components.push(component.to_string());
            graph.pages.push(page);
        }
        for (source, target) in [("page1", "page2"), ("page2", "page3")] {
            graph.transitions.push(Transition {
                id: Transition::id_for(source, target),
                source: source.to_string(),
                target: target.to_string(),
                animated: true,
            });
        }
        graph
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    pub fn pages(&self) -> &[PageNode] {
        &self.pages
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn page(&self, id: &str) -> Option<&PageNode> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn contains_page(&self, id: &str) -> bool {
        self.page(id).is_some()
    }

    fn page_mut(&mut self, id: &str) -> Result<&mut PageNode, GraphError> {
        self.pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GraphError::UnknownPage { id: id.to_string() })
    }

    // ── Pages ───────────────────────────────────────────────────────

    /// Add a page. Its component list is kept as given.
    pub fn add_page(&mut self, page: PageNode) -> Result<(), GraphError> {
        if page.id.trim().is_empty() {
            return Err(GraphError::InvalidPage {
                reason: "page id must not be empty".into(),
            });
        }
        if self.contains_page(&page.id) {
            return Err(GraphError::DuplicatePage { id: page.id });
        }
        check_position(&page.id, page.position)?;
        if let Some(dup) = first_duplicate(&page.components) {
            return Err(GraphError::DuplicateAssignment {
                page: page.id,
                component: dup.to_string(),
            });
        }
        debug!(page = %page.id, "Page added");
        self.pages.push(page);
        Ok(())
    }

    /// Remove a page and every transition that references it.
    pub fn remove_page(&mut self, id: &str) -> Result<PageNode, GraphError> {
        let index = self
            .pages
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| GraphError::UnknownPage { id: id.to_string() })?;
        let page = self.pages.remove(index);
        let before = self.transitions.len();
        self.transitions.retain(|t| !t.touches(id));
        debug!(
            page = %id,
            transitions_removed = before - self.transitions.len(),
            "Page removed"
        );
        Ok(page)
    }

    pub fn rename_page(&mut self, id: &str, label: &str) -> Result<(), GraphError> {
        self.page_mut(id)?.label = label.to_string();
        Ok(())
    }

    pub fn move_page(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        let page = self.page_mut(id)?;
        check_position(id, position)?;
        page.position = position;
        Ok(())
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Connect two existing pages. Returns the new transition id.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, GraphError> {
        self.add_transition(source, target, false)
    }

    pub fn add_transition(
        &mut self,
        source: &str,
        target: &str,
        animated: bool,
    ) -> Result<String, GraphError> {
        if !self.contains_page(source) || !self.contains_page(target) {
            return Err(GraphError::UnknownEndpoint {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        if self
            .transitions
            .iter()
            .any(|t| t.source == source && t.target == target)
        {
            return Err(GraphError::DuplicateTransition {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        let id = Transition::id_for(source, target);
        self.transitions.push(Transition {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            animated,
        });
        debug!(transition = %id, "Transition added");
        Ok(id)
    }

    pub fn disconnect(&mut self, transition_id: &str) -> Result<Transition, GraphError> {
        let index = self
            .transitions
            .iter()
            .position(|t| t.id == transition_id)
            .ok_or_else(|| GraphError::UnknownTransition {
                id: transition_id.to_string(),
            })?;
        Ok(self.transitions.remove(index))
    }

    // ── Component assignment ────────────────────────────────────────

    /// Append a component to the end of a page's list.
    pub fn assign(&mut self, page_id: &str, component: &str) -> Result<(), GraphError> {
        let page = self.page_mut(page_id)?;
        if page.has_component(component) {
            return Err(GraphError::DuplicateAssignment {
                page: page_id.to_string(),
                component: component.to_string(),
            });
        }
        page.components.push(component.to_string());
        debug!(page = %page_id, component, "Component assigned");
        Ok(())
    }

    /// Remove a component from a page. Components the catalog marks required
    /// are always refused, whether or not this page carries them.
    pub fn unassign(&mut self, page_id: &str, component: &str) -> Result<(), GraphError> {
        let protected = self.catalog.is_required(component);
        let page = self.page_mut(page_id)?;
        if protected {
            return Err(GraphError::ProtectedComponent {
                page: page_id.to_string(),
                component: component.to_string(),
            });
        }
        let index = page
            .components
            .iter()
            .position(|c| c == component)
            .ok_or_else(|| GraphError::NotAssigned {
                page: page_id.to_string(),
                component: component.to_string(),
            })?;
        page.components.remove(index);
        debug!(page = %page_id, component, "Component unassigned");
        Ok(())
    }

    /// Catalog entries not yet assigned to the page, in catalog order.
    pub fn available_components(
        &self,
        page_id: &str,
    ) -> Result<Vec<&ComponentDefinition>, GraphError> {
        let page = self
            .page(page_id)
            .ok_or_else(|| GraphError::UnknownPage {
                id: page_id.to_string(),
            })?;
        Ok(self
            .catalog
            .iter()
            .filter(|d| !page.has_component(&d.id))
            .collect())
    }

    // ── Analysis ────────────────────────────────────────────────────

    /// Whether the transition graph has no directed cycle (self-loops count as cycles).
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree: HashMap<&str, usize> =
            self.pages.iter().map(|p| (p.id.as_str(), 0)).collect();
        for t in &self.transitions {
            *in_degree.entry(t.target.as_str()).or_default() += 1;
        }

        let mut ready: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut visited = 0;
        while let Some(id) = ready.pop_front() {
            visited += 1;
            for t in self.transitions.iter().filter(|t| t.source == id) {
                if let Some(d) = in_degree.get_mut(t.target.as_str()) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push_back(t.target.as_str());
                    }
                }
            }
        }
        visited == in_degree.len()
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

fn check_position(id: &str, position: Position) -> Result<(), GraphError> {
    if position.is_finite() {
        return Ok(());
    }
    Err(GraphError::InvalidPage {
        reason: format!(
            "page {id} has a non-finite position ({}, {})",
            position.x, position.y
        ),
    })
}

fn first_duplicate(items: &[String]) -> Option<&str> {
    items
        .iter()
        .enumerate()
        .find(|(i, item)| items[..*i].contains(item))
        .map(|(_, item)| item.as_str())
}
