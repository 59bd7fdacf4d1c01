// crates/icd-rs/src/registry.rs

//! Maps the `@index` of every indexed element to its arena handle.

use crate::error::IcdError;
use crate::model::NodeId;
use alloc::collections::BTreeMap;
use log::trace;

/// Per-document index registry.
///
/// Populated while the first parsing pass creates nodes; owned by the resulting
/// `Document` and dropped with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRegistry {
    entries: BTreeMap<u64, NodeId>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` under `index`.
    ///
    /// # Errors
    /// Returns `IcdError::DuplicateIndex` if the index is already taken; the
    /// existing entry is left untouched.
    pub fn register(&mut self, index: u64, node: NodeId) -> Result<(), IcdError> {
        if self.entries.contains_key(&index) {
            return Err(IcdError::DuplicateIndex { index });
        }
        trace!("Registering index {} -> {:?}", index, node);
        self.entries.insert(index, node);
        Ok(())
    }

    /// Returns the node registered under `index`.
    pub fn lookup(&self, index: u64) -> Result<NodeId, IcdError> {
        self.entries
            .get(&index)
            .copied()
            .ok_or(IcdError::UnknownIndex { index })
    }

    pub fn contains(&self, index: u64) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(index, node)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, NodeId)> + '_ {
        self.entries.iter().map(|(index, id)| (*index, *id))
    }
}
