//! Arbor hierarchical node registry
//!
//! Callers claim tree-structured nodes identified by `(parent, label)`. Each
//! node has a single owner, an expiry, and a handful of attributes. A claim is
//! classified as a fresh creation, a renewal, or an expiry-driven takeover,
//! and each outcome is authorized against a different party: the parent's
//! controller (or the configured root authority) for creation and takeover,
//! the node's own controller for renewal.
//!
//! Unauthorized claims are silent no-ops reported through [`ClaimOutcome`];
//! only structural problems such as an out-of-range label fail hard.

pub mod attributes;
pub mod authorization;
pub mod claim;
pub mod config;
pub mod errors;
pub mod events;
pub mod hasher;
pub mod registry;
pub mod store;

pub use arbor_types::*;
pub use authorization::{ApprovalSource, AuthorizationOracle, NoDelegation, OperatorBook};
pub use claim::{ClaimOutcome, ClaimReceipt, NoEffectReason};
pub use config::{LogFormat, RegistryConfig, RenewalConfig, RenewalMode, RenewalPolicy};
pub use errors::*;
pub use hasher::hash_of;
pub use registry::NodeRegistry;
