//! Component catalog — the assignable form components an operator can place on a page.

use serde::{Deserialize, Serialize};

/// One assignable form component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    pub label: String,
    /// Required components cannot be removed from a page once assigned.
    pub required: bool,
}

impl ComponentDefinition {
    pub fn new(id: &str, label: &str, required: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            required,
        }
    }
}

/// Immutable catalog of component definitions, looked up by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCatalog {
    definitions: Vec<ComponentDefinition>,
}

impl ComponentCatalog {
    pub fn new(definitions: Vec<ComponentDefinition>) -> Self {
        Self { definitions }
    }

    /// The catalog shipped with the onboarding flow.
    pub fn standard() -> Self {
        Self::new(vec![
            ComponentDefinition::new("email", "Email Input", true),
            ComponentDefinition::new("birthdate", "Birthdate", false),
            ComponentDefinition::new("aboutMe", "About Me", false),
            ComponentDefinition::new("address", "Address Form", false),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Unknown ids are never protected.
    pub fn is_required(&self, id: &str) -> bool {
        self.get(id).is_some_and(|d| d.required)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ComponentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
