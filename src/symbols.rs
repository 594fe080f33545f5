use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AsmError;

/// Label name to address. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    labels: BTreeMap<String, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `label`. A second definition is rejected and the first one stays.
    pub fn insert(&mut self, label: &str, addr: u16) -> Result<(), AsmError> {
        if let Some(&first) = self.labels.get(label) {
            return Err(AsmError::DuplicateLabel {
                label: label.to_string(),
                first,
                second: addr,
            });
        }
        self.labels.insert(label.to_string(), addr);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<u16> {
        self.labels.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// First label (by name) defined at `addr`.
    pub fn label_at(&self, addr: u16) -> Option<&str> {
        self.labels
            .iter()
            .find(|(_, &a)| a == addr)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.labels.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Later entries replace earlier ones; use [`SymbolTable::insert`] to catch duplicates.
impl<S: Into<String>> FromIterator<(S, u16)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (S, u16)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
