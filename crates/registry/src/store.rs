//! Node store
//!
//! Authoritative mapping from node id to [`NodeRecord`]. The store enforces
//! existence and the immutability of `parent`; every policy decision belongs
//! to the caller.

use crate::errors::*;
use arbor_types::{Identity, NodeId, NodeRecord};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: HashMap<NodeId, NodeRecord>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn get(&self, node_id: &NodeId) -> Result<&NodeRecord> {
        self.nodes
            .get(node_id)
            .ok_or(RegistryError::NodeNotFound { node_id: *node_id })
    }

    /// Insert a new record. The root id is never stored.
    pub fn create(
        &mut self,
        node_id: NodeId,
        parent: NodeId,
        owner: Identity,
        expiry: u64,
    ) -> Result<()> {
        if node_id.is_root() || self.nodes.contains_key(&node_id) {
            return Err(RegistryError::NodeAlreadyExists { node_id });
        }
        self.nodes
            .insert(node_id, NodeRecord::new(parent, owner, expiry));
        Ok(())
    }

    pub fn set_owner(&mut self, node_id: &NodeId, owner: Identity) -> Result<()> {
        self.get_mut(node_id)?.owner = owner;
        Ok(())
    }

    pub fn set_expiry(&mut self, node_id: &NodeId, expiry: u64) -> Result<()> {
        self.get_mut(node_id)?.expiry = expiry;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get_mut(&mut self, node_id: &NodeId) -> Result<&mut NodeRecord> {
        self.nodes
            .get_mut(node_id)
            .ok_or(RegistryError::NodeNotFound { node_id: *node_id })
    }
}
