//! Onboarding graph — pages, transitions, and the component catalog.
//!
//! The graph is what an operator edits. It is persisted through the
//! [`codec`](crate::codec) and never consulted directly by a wizard session.

pub mod catalog;
pub mod model;

pub use catalog::{ComponentCatalog, ComponentDefinition};
pub use model::{GraphModel, PageNode, Position, Transition};
