//! Attribute store
//!
//! Side-channel fields keyed by node id. A node that exists but has never had
//! an attribute written reads back the defaults from [`AttributeRecord`].
//! Control over the node is checked by the caller before any setter runs.

use crate::errors::*;
use crate::store::NodeStore;
use arbor_types::{AttributeRecord, Identity, NodeId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct AttributeStore {
    attributes: HashMap<NodeId, AttributeRecord>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every attribute of an existing node.
    pub fn get(&self, nodes: &NodeStore, node_id: &NodeId) -> Result<AttributeRecord> {
        ensure_exists(nodes, node_id)?;
        Ok(self.attributes.get(node_id).cloned().unwrap_or_default())
    }

    pub fn see_also(&self, nodes: &NodeStore, node_id: &NodeId) -> Result<NodeId> {
        self.read(nodes, node_id, |attrs| attrs.see_also)
    }

    pub fn see_address(&self, nodes: &NodeStore, node_id: &NodeId) -> Result<Identity> {
        self.read(nodes, node_id, |attrs| attrs.see_address)
    }

    pub fn node_body(&self, nodes: &NodeStore, node_id: &NodeId) -> Result<Vec<u8>> {
        self.read(nodes, node_id, |attrs| attrs.node_body.clone())
    }

    pub fn display_uri(&self, nodes: &NodeStore, node_id: &NodeId) -> Result<String> {
        self.read(nodes, node_id, |attrs| attrs.display_uri.clone())
    }

    pub fn set_see_also(&mut self, nodes: &NodeStore, node_id: &NodeId, value: NodeId) -> Result<()> {
        self.write(nodes, node_id, |attrs| attrs.see_also = value)
    }

    pub fn set_see_address(
        &mut self,
        nodes: &NodeStore,
        node_id: &NodeId,
        value: Identity,
    ) -> Result<()> {
        self.write(nodes, node_id, |attrs| attrs.see_address = value)
    }

    pub fn set_node_body(
        &mut self,
        nodes: &NodeStore,
        node_id: &NodeId,
        value: Vec<u8>,
    ) -> Result<()> {
        self.write(nodes, node_id, |attrs| attrs.node_body = value)
    }

    pub fn set_display_uri(
        &mut self,
        nodes: &NodeStore,
        node_id: &NodeId,
        value: String,
    ) -> Result<()> {
        self.write(nodes, node_id, |attrs| attrs.display_uri = value)
    }

    fn read<T>(
        &self,
        nodes: &NodeStore,
        node_id: &NodeId,
        field: impl FnOnce(&AttributeRecord) -> T,
    ) -> Result<T> {
        ensure_exists(nodes, node_id)?;
        Ok(match self.attributes.get(node_id) {
            Some(attrs) => field(attrs),
            None => field(&AttributeRecord::default()),
        })
    }

    fn write(
        &mut self,
        nodes: &NodeStore,
        node_id: &NodeId,
        update: impl FnOnce(&mut AttributeRecord),
    ) -> Result<()> {
        ensure_exists(nodes, node_id)?;
        update(self.attributes.entry(*node_id).or_default());
        Ok(())
    }
}

fn ensure_exists(nodes: &NodeStore, node_id: &NodeId) -> Result<()> {
    if nodes.exists(node_id) {
        Ok(())
    } else {
        Err(RegistryError::NodeNotFound { node_id: *node_id })
    }
}
