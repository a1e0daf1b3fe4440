//! Audit events emitted by the registry.

use crate::{Identity, Label, NodeId};
use serde::{Deserialize, Serialize};

/// How a successful claim was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ClaimCase {
    /// Renewal of a live node by its controller.
    Reclaim = 0,
    /// First creation of the node.
    New = 1,
    /// Takeover of an expired node by a party trusted on the parent.
    Transfer = 2,
}

impl ClaimCase {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Field identifier carried by attribute-changed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum NodeAttribute {
    Expiry = 0,
    SeeAlso = 1,
    SeeAddress = 2,
    NodeBody = 3,
    DisplayUri = 4,
}

impl NodeAttribute {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A single entry of the registry audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    Claim {
        sender: Identity,
        node_id: NodeId,
        parent_id: NodeId,
        label: Label,
        case: ClaimCase,
    },
    AttributeChanged {
        sender: Identity,
        node_id: NodeId,
        attribute: NodeAttribute,
    },
}

impl RegistryEvent {
    pub fn node_id(&self) -> NodeId {
        match self {
            RegistryEvent::Claim { node_id, .. } => *node_id,
            RegistryEvent::AttributeChanged { node_id, .. } => *node_id,
        }
    }

    pub fn sender(&self) -> Identity {
        match self {
            RegistryEvent::Claim { sender, .. } => *sender,
            RegistryEvent::AttributeChanged { sender, .. } => *sender,
        }
    }
}

/// An event together with its position in the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub timestamp: u64,
    pub event: RegistryEvent,
}
