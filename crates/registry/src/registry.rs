//! Node registry implementation
//!
//! [`NodeRegistry`] owns the node store, attribute store and event log behind
//! a single lock. Every mutating operation holds the write lock from its first
//! read to its last write, so each claim, forced expiry or attribute change
//! either applies completely or not at all.

use crate::attributes::AttributeStore;
use crate::authorization::{ApprovalSource, AuthorizationOracle};
use crate::claim::{ClaimMachine, ClaimOutcome};
use crate::config::{RegistryConfig, RenewalPolicy};
use crate::errors::*;
use crate::events::EventLog;
use crate::hasher::hash_of;
use crate::store::NodeStore;
use arbor_time::{Clock, SharedClock};
use arbor_types::{
    AttributeRecord, EventRecord, Identity, NodeAttribute, NodeId, NodeRecord, RegistryEvent,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything a registry operation may read or write.
#[derive(Debug)]
pub(crate) struct RegistryState {
    pub(crate) nodes: NodeStore,
    pub(crate) attributes: AttributeStore,
    pub(crate) events: EventLog,
}

impl RegistryState {
    pub(crate) fn new(event_channel_capacity: usize) -> Self {
        Self {
            nodes: NodeStore::new(),
            attributes: AttributeStore::new(),
            events: EventLog::new(event_channel_capacity),
        }
    }
}

pub struct NodeRegistry {
    state: RwLock<RegistryState>,
    machine: ClaimMachine,
    clock: SharedClock,
}

impl NodeRegistry {
    /// Build a registry from a validated configuration.
    pub fn new(
        config: &RegistryConfig,
        approvals: Arc<dyn ApprovalSource>,
        clock: SharedClock,
    ) -> Result<Self> {
        config.validate()?;
        let oracle = AuthorizationOracle::new(config.root_owner, approvals);
        Ok(Self {
            state: RwLock::new(RegistryState::new(config.event_channel_capacity)),
            machine: ClaimMachine::new(oracle, config.renewal_policy()),
            clock,
        })
    }

    /// Node id of `label` beneath `parent`; pure, consults no state.
    pub fn hash_of(parent: &NodeId, label: &[u8]) -> NodeId {
        hash_of(parent, label)
    }

    pub fn root_owner(&self) -> Identity {
        self.machine.oracle().root_owner()
    }

    pub fn renewal_policy(&self) -> RenewalPolicy {
        self.machine.renewal()
    }

    /// Create, renew or take over the node `label` beneath `parent`.
    ///
    /// Fails only for an invalid label. Authorization failures come back as
    /// [`ClaimOutcome::NoEffect`] with nothing changed and nothing emitted.
    pub fn claim(&self, parent: NodeId, label: &[u8], caller: Identity) -> Result<ClaimOutcome> {
        let mut state = self.state.write();
        let now = self.clock.now();
        self.machine.claim(&mut *state, now, parent, label, caller)
    }

    /// Force a node into the expired state so that the parent's controller
    /// can take it over through an ordinary claim.
    pub fn expire(&self, node_id: &NodeId, caller: Identity) -> Result<()> {
        let mut state = self.state.write();
        let now = self.clock.now();
        self.ensure_controls(&state, node_id, &caller)?;
        state.nodes.set_expiry(node_id, now.saturating_sub(1))?;
        state.events.emit(
            now,
            RegistryEvent::AttributeChanged {
                sender: caller,
                node_id: *node_id,
                attribute: NodeAttribute::Expiry,
            },
        );
        Ok(())
    }

    pub fn set_see_also(&self, node_id: &NodeId, value: NodeId, caller: Identity) -> Result<()> {
        self.change_attribute(node_id, caller, NodeAttribute::SeeAlso, |state| {
            state.attributes.set_see_also(&state.nodes, node_id, value)
        })
    }

    pub fn set_see_address(
        &self,
        node_id: &NodeId,
        value: Identity,
        caller: Identity,
    ) -> Result<()> {
        self.change_attribute(node_id, caller, NodeAttribute::SeeAddress, |state| {
            state.attributes.set_see_address(&state.nodes, node_id, value)
        })
    }

    pub fn set_node_body(
        &self,
        node_id: &NodeId,
        value: impl Into<Vec<u8>>,
        caller: Identity,
    ) -> Result<()> {
        let value = value.into();
        self.change_attribute(node_id, caller, NodeAttribute::NodeBody, |state| {
            state.attributes.set_node_body(&state.nodes, node_id, value)
        })
    }

    pub fn set_display_uri(
        &self,
        node_id: &NodeId,
        value: impl Into<String>,
        caller: Identity,
    ) -> Result<()> {
        let value = value.into();
        self.change_attribute(node_id, caller, NodeAttribute::DisplayUri, |state| {
            state.attributes.set_display_uri(&state.nodes, node_id, value)
        })
    }

    pub fn exists(&self, node_id: &NodeId) -> bool {
        self.state.read().nodes.exists(node_id)
    }

    pub fn node(&self, node_id: &NodeId) -> Result<NodeRecord> {
        self.state.read().nodes.get(node_id).cloned()
    }

    pub fn owner_of(&self, node_id: &NodeId) -> Result<Identity> {
        Ok(self.state.read().nodes.get(node_id)?.owner)
    }

    pub fn parent_of(&self, node_id: &NodeId) -> Result<NodeId> {
        Ok(self.state.read().nodes.get(node_id)?.parent)
    }

    pub fn expiry_of(&self, node_id: &NodeId) -> Result<u64> {
        Ok(self.state.read().nodes.get(node_id)?.expiry)
    }

    pub fn is_expired(&self, node_id: &NodeId) -> Result<bool> {
        let state = self.state.read();
        let record = state.nodes.get(node_id)?;
        Ok(record.is_expired(self.clock.now()))
    }

    /// Owner-or-delegated-operator check; the root id answers for the root
    /// authority.
    pub fn controls(&self, identity: &Identity, node_id: &NodeId) -> bool {
        let state = self.state.read();
        self.machine.oracle().controls(&state.nodes, identity, node_id)
    }

    pub fn attributes(&self, node_id: &NodeId) -> Result<AttributeRecord> {
        let state = self.state.read();
        state.attributes.get(&state.nodes, node_id)
    }

    pub fn see_also(&self, node_id: &NodeId) -> Result<NodeId> {
        let state = self.state.read();
        state.attributes.see_also(&state.nodes, node_id)
    }

    pub fn see_address(&self, node_id: &NodeId) -> Result<Identity> {
        let state = self.state.read();
        state.attributes.see_address(&state.nodes, node_id)
    }

    pub fn node_body(&self, node_id: &NodeId) -> Result<Vec<u8>> {
        let state = self.state.read();
        state.attributes.node_body(&state.nodes, node_id)
    }

    pub fn display_uri(&self, node_id: &NodeId) -> Result<String> {
        let state = self.state.read();
        state.attributes.display_uri(&state.nodes, node_id)
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().events.records().to_vec()
    }

    pub fn events_since(&self, seq: u64) -> Vec<EventRecord> {
        self.state.read().events.since(seq).to_vec()
    }

    /// Live feed of events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.state.read().events.subscribe()
    }

    fn ensure_controls(
        &self,
        state: &RegistryState,
        node_id: &NodeId,
        caller: &Identity,
    ) -> Result<()> {
        state.nodes.get(node_id)?;
        if !self.machine.oracle().controls(&state.nodes, caller, node_id) {
            return Err(RegistryError::Unauthorized {
                node_id: *node_id,
                identity: *caller,
            });
        }
        Ok(())
    }

    fn change_attribute(
        &self,
        node_id: &NodeId,
        caller: Identity,
        attribute: NodeAttribute,
        apply: impl FnOnce(&mut RegistryState) -> Result<()>,
    ) -> Result<()> {
        let mut state = self.state.write();
        self.ensure_controls(&state, node_id, &caller)?;
        apply(&mut *state)?;
        let now = self.clock.now();
        state.events.emit(
            now,
            RegistryEvent::AttributeChanged {
                sender: caller,
                node_id: *node_id,
                attribute,
            },
        );
        Ok(())
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("machine", &self.machine)
            .field("nodes", &self.node_count())
            .finish_non_exhaustive()
    }
}
