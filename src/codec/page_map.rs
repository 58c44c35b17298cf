//! Page → component lookup derived from a decoded configuration.

use std::collections::BTreeMap;

/// Read-only mapping from page id to its ordered component ids.
///
/// Built once per wizard session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageComponentMap {
    pages: BTreeMap<String, Vec<String>>,
}

impl PageComponentMap {
    pub fn components(&self, page: &str) -> Option<&[String]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    pub fn contains(&self, page: &str) -> bool {
        self.pages.contains_key(page)
    }

    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for PageComponentMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
