//! Authorization oracle and delegated-operator sources.
//!
//! An identity controls a node when it is the node's owner, or when the
//! injected [`ApprovalSource`] recognizes it as a delegated operator of that
//! owner. The root id has no record; its owner is the configured root
//! authority and the same rule applies.

use crate::store::NodeStore;
use arbor_types::{Identity, NodeId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Delegated-operator bookkeeping supplied by the ownership adapter.
///
/// [`NodeRegistry`](crate::NodeRegistry) consults the source while it holds
/// its state lock, and that lock is not reentrant. Implementations must answer
/// from their own state and must not call back into the registry: a lookup
/// such as `owner_of` from inside `is_approved` deadlocks.
pub trait ApprovalSource: Send + Sync {
    /// Whether `operator` may act on behalf of `owner` for `node_id`.
    fn is_approved(&self, owner: &Identity, operator: &Identity, node_id: &NodeId) -> bool;
}

/// Approval source that recognizes no delegation at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelegation;

impl ApprovalSource for NoDelegation {
    fn is_approved(&self, _owner: &Identity, _operator: &Identity, _node_id: &NodeId) -> bool {
        false
    }
}

/// In-memory blanket operator approvals, keyed by owner.
#[derive(Debug, Default)]
pub struct OperatorBook {
    operators: RwLock<HashMap<Identity, HashSet<Identity>>>,
}

impl OperatorBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Grant or revoke `operator` for every node `owner` holds.
    pub fn set_approval_for_all(&self, owner: Identity, operator: Identity, approved: bool) {
        if owner == operator {
            debug!(owner = %owner, "ignoring self-approval");
            return;
        }

        let mut operators = self.operators.write();
        if approved {
            operators.entry(owner).or_default().insert(operator);
        } else if let Some(set) = operators.get_mut(&owner) {
            set.remove(&operator);
            if set.is_empty() {
                operators.remove(&owner);
            }
        }
        debug!(owner = %owner, operator = %operator, approved, "operator approval updated");
    }

    pub fn is_approved_for_all(&self, owner: &Identity, operator: &Identity) -> bool {
        self.operators
            .read()
            .get(owner)
            .is_some_and(|set| set.contains(operator))
    }
}

impl ApprovalSource for OperatorBook {
    fn is_approved(&self, owner: &Identity, operator: &Identity, _node_id: &NodeId) -> bool {
        self.is_approved_for_all(owner, operator)
    }
}

/// Answers `controls(identity, node)` for ordinary nodes and the root.
#[derive(Clone)]
pub struct AuthorizationOracle {
    root_owner: Identity,
    approvals: Arc<dyn ApprovalSource>,
}

impl AuthorizationOracle {
    pub fn new(root_owner: Identity, approvals: Arc<dyn ApprovalSource>) -> Self {
        Self {
            root_owner,
            approvals,
        }
    }

    pub fn root_owner(&self) -> Identity {
        self.root_owner
    }

    /// Whether `identity` controls `node_id`. A missing non-root node has no
    /// controller.
    pub fn controls(&self, nodes: &NodeStore, identity: &Identity, node_id: &NodeId) -> bool {
        let owner = if node_id.is_root() {
            self.root_owner
        } else {
            match nodes.get(node_id) {
                Ok(record) => record.owner,
                Err(_) => return false,
            }
        };
        self.acts_for(&owner, identity, node_id)
    }

    fn acts_for(&self, owner: &Identity, identity: &Identity, node_id: &NodeId) -> bool {
        owner == identity || self.approvals.is_approved(owner, identity, node_id)
    }
}

impl std::fmt::Debug for AuthorizationOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationOracle")
            .field("root_owner", &self.root_owner)
            .finish_non_exhaustive()
    }
}
