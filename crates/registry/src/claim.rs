//! Claim state machine
//!
//! A claim resolves `(parent, label)` to a node id and then takes exactly one
//! of three paths:
//!
//! | node state          | authorized by                   | result     |
//! |---------------------|---------------------------------|------------|
//! | missing             | parent controller / root owner  | `NEW`      |
//! | live                | node controller                 | `RECLAIM`  |
//! | expired             | parent controller / root owner  | `TRANSFER` |
//!
//! Anything else leaves state untouched, emits nothing, and is reported as
//! [`ClaimOutcome::NoEffect`]. Only a structurally invalid label is an error.

use crate::authorization::AuthorizationOracle;
use crate::config::RenewalPolicy;
use crate::errors::*;
use crate::hasher::hash_of;
use crate::registry::RegistryState;
use arbor_types::{ClaimCase, Identity, Label, NodeId, RegistryEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Details of a claim that changed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub case: ClaimCase,
    pub node_id: NodeId,
    pub parent_id: NodeId,
    pub label: Label,
    pub owner: Identity,
    pub expiry: u64,
}

/// Why a claim was accepted but did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoEffectReason {
    /// The parent node does not exist.
    MissingParent,
    /// Caller is not trusted by the parent (or root) to create the node.
    NotAuthorizedToCreate,
    /// Node is live and the caller does not control it.
    NotController,
    /// Node is expired and the caller is not trusted by the parent (or root).
    NotAuthorizedToTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Applied(ClaimReceipt),
    NoEffect {
        node_id: NodeId,
        parent_id: NodeId,
        label: Label,
        reason: NoEffectReason,
    },
}

impl ClaimOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ClaimOutcome::Applied(_))
    }

    pub fn case(&self) -> Option<ClaimCase> {
        match self {
            ClaimOutcome::Applied(receipt) => Some(receipt.case),
            ClaimOutcome::NoEffect { .. } => None,
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            ClaimOutcome::Applied(receipt) => receipt.node_id,
            ClaimOutcome::NoEffect { node_id, .. } => *node_id,
        }
    }

    pub fn receipt(&self) -> Option<&ClaimReceipt> {
        match self {
            ClaimOutcome::Applied(receipt) => Some(receipt),
            ClaimOutcome::NoEffect { .. } => None,
        }
    }

    pub fn no_effect_reason(&self) -> Option<NoEffectReason> {
        match self {
            ClaimOutcome::Applied(_) => None,
            ClaimOutcome::NoEffect { reason, .. } => Some(*reason),
        }
    }
}

/// Classification of a claim before any mutation happens.
enum Decision {
    Create,
    Renew,
    Transfer,
    Skip(NoEffectReason),
}

#[derive(Debug, Clone)]
pub struct ClaimMachine {
    oracle: AuthorizationOracle,
    renewal: RenewalPolicy,
}

impl ClaimMachine {
    pub fn new(oracle: AuthorizationOracle, renewal: RenewalPolicy) -> Self {
        Self { oracle, renewal }
    }

    pub fn oracle(&self) -> &AuthorizationOracle {
        &self.oracle
    }

    pub fn renewal(&self) -> RenewalPolicy {
        self.renewal
    }

    /// Run one claim against `state`. The caller holds `state` exclusively for
    /// the whole call, which makes classify-then-write atomic.
    pub(crate) fn claim(
        &self,
        state: &mut RegistryState,
        now: u64,
        parent: NodeId,
        label: &[u8],
        caller: Identity,
    ) -> Result<ClaimOutcome> {
        let label = Label::new(label.to_vec())?;
        let node_id = hash_of(&parent, label.as_bytes());

        let decision = self.classify(state, now, &parent, &node_id, &caller);
        let case = match decision {
            Decision::Skip(reason) => {
                debug!(
                    caller = %caller,
                    node = %node_id,
                    parent = %parent,
                    ?reason,
                    "claim had no effect"
                );
                return Ok(ClaimOutcome::NoEffect {
                    node_id,
                    parent_id: parent,
                    label,
                    reason,
                });
            }
            Decision::Create => {
                let expiry = self.renewal.renewed_expiry(now);
                state.nodes.create(node_id, parent, caller, expiry)?;
                ClaimCase::New
            }
            Decision::Renew => {
                state
                    .nodes
                    .set_expiry(&node_id, self.renewal.renewed_expiry(now))?;
                ClaimCase::Reclaim
            }
            Decision::Transfer => {
                state.nodes.set_owner(&node_id, caller)?;
                state
                    .nodes
                    .set_expiry(&node_id, self.renewal.renewed_expiry(now))?;
                ClaimCase::Transfer
            }
        };

        let record = state.nodes.get(&node_id)?;
        let receipt = ClaimReceipt {
            case,
            node_id,
            parent_id: record.parent,
            label: label.clone(),
            owner: record.owner,
            expiry: record.expiry,
        };

        state.events.emit(
            now,
            RegistryEvent::Claim {
                sender: caller,
                node_id,
                parent_id: receipt.parent_id,
                label,
                case,
            },
        );

        Ok(ClaimOutcome::Applied(receipt))
    }

    fn classify(
        &self,
        state: &RegistryState,
        now: u64,
        parent: &NodeId,
        node_id: &NodeId,
        caller: &Identity,
    ) -> Decision {
        match state.nodes.get(node_id) {
            Err(_) => match self.authorized_on_parent(state, parent, caller) {
                Ok(()) => Decision::Create,
                Err(NoEffectReason::MissingParent) => {
                    Decision::Skip(NoEffectReason::MissingParent)
                }
                Err(_) => Decision::Skip(NoEffectReason::NotAuthorizedToCreate),
            },
            Ok(record) if !record.is_expired(now) => {
                if self.oracle.controls(&state.nodes, caller, node_id) {
                    Decision::Renew
                } else {
                    Decision::Skip(NoEffectReason::NotController)
                }
            }
            Ok(_) => match self.authorized_on_parent(state, parent, caller) {
                Ok(()) => Decision::Transfer,
                Err(_) => Decision::Skip(NoEffectReason::NotAuthorizedToTransfer),
            },
        }
    }

    /// Authority over the parent's namespace: the root owner for top-level
    /// nodes, otherwise the parent's controller.
    fn authorized_on_parent(
        &self,
        state: &RegistryState,
        parent: &NodeId,
        caller: &Identity,
    ) -> std::result::Result<(), NoEffectReason> {
        if !parent.is_root() && !state.nodes.exists(parent) {
            return Err(NoEffectReason::MissingParent);
        }
        if self.oracle.controls(&state.nodes, caller, parent) {
            Ok(())
        } else {
            Err(NoEffectReason::NotAuthorizedToCreate)
        }
    }
}
