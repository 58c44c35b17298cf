//! Page sequences — the fixed order in which a session visits pages.

use std::collections::HashSet;

use crate::codec::{DecodedConfiguration, PageComponentMap};
use crate::config::PageOrder;
use crate::error::WizardError;
use crate::graph::GraphModel;

/// Ordered page ids for one session. Fixed at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSequence {
    pages: Vec<String>,
}

impl PageSequence {
    /// Each page may appear once: the first and last steps submit.
    pub fn new(pages: Vec<String>) -> Result<Self, WizardError> {
        if pages.is_empty() {
            return Err(invalid("the configuration has no pages"));
        }
        let mut seen = HashSet::new();
        if let Some(repeated) = pages.iter().find(|p| !seen.insert(p.as_str())) {
            return Err(invalid(format!("page {repeated} appears more than once")));
        }
        Ok(Self { pages })
    }

    /// `page1 … pageN` where N is the number of configured pages. Transitions
    /// are not consulted.
    pub fn ordinal(map: &PageComponentMap) -> Result<Self, WizardError> {
        let pages: Vec<String> = (1..=map.len()).map(|i| format!("page{i}")).collect();
        if let Some(missing) = pages.iter().find(|p| !map.contains(p)) {
            return Err(WizardError::UnknownPage {
                page: missing.clone(),
            });
        }
        Self::new(pages)
    }

    /// Walk transitions from the single page without incoming edges.
    ///
    /// Transitions carry no branch conditions, so a page with more than one
    /// outgoing transition is rejected, as are cycles and unreachable pages.
    pub fn from_transitions(graph: &GraphModel) -> Result<Self, WizardError> {
        let targets: HashSet<&str> = graph
            .transitions()
            .iter()
            .map(|t| t.target.as_str())
            .collect();
        let roots: Vec<&str> = graph
            .pages()
            .iter()
            .map(|p| p.id.as_str())
            .filter(|id| !targets.contains(id))
            .collect();
        let [root] = roots.as_slice() else {
            return Err(invalid(format!(
                "expected exactly one start page, found {}",
                roots.len()
            )));
        };

        let mut visited: HashSet<&str> = HashSet::new();
        let mut pages = Vec::new();
        let mut current = *root;
        loop {
            visited.insert(current);
            pages.push(current.to_string());

            let outgoing: Vec<&str> = graph
                .transitions()
                .iter()
                .filter(|t| t.source == current)
                .map(|t| t.target.as_str())
                .collect();
            match outgoing.as_slice() {
                [] => break,
                [next] if visited.contains(next) => {
                    return Err(invalid(format!("cycle through page {next}")));
                }
                [next] => current = *next,
                _ => {
                    return Err(invalid(format!(
                        "page {current} branches to {}",
                        outgoing.join(", ")
                    )));
                }
            }
        }

        let unreachable: Vec<&str> = graph
            .pages()
            .iter()
            .map(|p| p.id.as_str())
            .filter(|id| !visited.contains(id))
            .collect();
        if !unreachable.is_empty() {
            return Err(invalid(format!(
                "unreachable pages: {}",
                unreachable.join(", ")
            )));
        }

        Self::new(pages)
    }

    /// Sequence for a decoded configuration under the chosen ordering.
    pub fn for_order(
        order: PageOrder,
        decoded: &DecodedConfiguration,
    ) -> Result<Self, WizardError> {
        match order {
            PageOrder::Ordinal => Self::ordinal(&decoded.pages),
            PageOrder::Edges => Self::from_transitions(&decoded.graph),
        }
    }

    /// Page id at a 1-based step.
    pub fn page(&self, step: usize) -> Option<&str> {
        step.checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn invalid(reason: impl Into<String>) -> WizardError {
    WizardError::InvalidSequence {
        reason: reason.into(),
    }
}
