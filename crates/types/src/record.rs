//! Stored node and attribute records.

use crate::{Identity, NodeId};
use serde::{Deserialize, Serialize};

/// Authoritative record for a claimed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Parent node id, or [`NodeId::ROOT`] for top-level nodes. Never rewritten.
    pub parent: NodeId,
    /// Current controller.
    pub owner: Identity,
    /// Expiry in seconds since UNIX_EPOCH.
    pub expiry: u64,
}

impl NodeRecord {
    pub fn new(parent: NodeId, owner: Identity, expiry: u64) -> Self {
        Self {
            parent,
            owner,
            expiry,
        }
    }

    /// A node is expired once `now` reaches its expiry.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry
    }
}

/// Side-channel fields kept next to a node.
///
/// Every field reads as its default until explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub see_also: NodeId,
    pub see_address: Identity,
    #[serde(default, with = "hex_bytes")]
    pub node_body: Vec<u8>,
    #[serde(default)]
    pub display_uri: String,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        hex::decode(value.strip_prefix("0x").unwrap_or(&value)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let record = NodeRecord::new(NodeId::ROOT, Identity::new([1u8; 32]), 100);
        assert!(!record.is_expired(99));
        assert!(record.is_expired(100));
        assert!(record.is_expired(101));
    }

    #[test]
    fn attribute_defaults_are_zero_and_empty() {
        let attrs = AttributeRecord::default();
        assert!(attrs.see_also.is_zero());
        assert!(attrs.see_address.is_zero());
        assert!(attrs.node_body.is_empty());
        assert!(attrs.display_uri.is_empty());
    }
}
