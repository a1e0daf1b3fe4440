//! Error types for the node registry

use arbor_types::{Identity, LabelError, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid label: {0}")]
    InvalidLabel(#[from] LabelError),

    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: NodeId },

    #[error("Node already exists: {node_id}")]
    NodeAlreadyExists { node_id: NodeId },

    #[error("Unauthorized: {identity} does not control node {node_id}")]
    Unauthorized { node_id: NodeId, identity: Identity },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating [`crate::RegistryConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
