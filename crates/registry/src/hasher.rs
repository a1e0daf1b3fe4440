//! Node identity derivation.
//!
//! `hash_of(parent, label)` is Keccak-256 over the 32 parent bytes followed by
//! the raw label bytes. It consults no registry state, so anyone can predict a
//! node id off-line. Label length is enforced by the caller.

use arbor_types::{NodeId, ID_BYTES};
use sha3::{Digest, Keccak256};

/// Derive the id of the node named `label` beneath `parent`.
pub fn hash_of(parent: &NodeId, label: &[u8]) -> NodeId {
    let mut hasher = Keccak256::new();
    hasher.update(parent.as_bytes());
    hasher.update(label);
    let digest: [u8; ID_BYTES] = hasher.finalize().into();
    NodeId::new(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn matches_reference_digest() {
        // keccak256 of 32 zero bytes followed by 0x01
        let mut input = vec![0u8; ID_BYTES];
        input.push(0x01);
        let expected: [u8; ID_BYTES] = Keccak256::digest(&input).into();
        assert_eq!(hash_of(&NodeId::ROOT, &[0x01]), NodeId::new(expected));
    }

    #[test]
    fn parent_and_label_both_matter() {
        let a = hash_of(&NodeId::ROOT, &[0x01]);
        let b = hash_of(&NodeId::ROOT, &[0x02]);
        let c = hash_of(&a, &[0x01]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert!(!a.is_root());
    }

    proptest! {
        #[test]
        fn deterministic(parent in any::<[u8; 32]>(), label in proptest::collection::vec(any::<u8>(), 1..=32)) {
            let parent = NodeId::new(parent);
            prop_assert_eq!(hash_of(&parent, &label), hash_of(&parent, &label));
        }

        #[test]
        fn distinct_labels_do_not_collide(
            parent in any::<[u8; 32]>(),
            a in proptest::collection::vec(any::<u8>(), 1..=32),
            b in proptest::collection::vec(any::<u8>(), 1..=32),
        ) {
            prop_assume!(a != b);
            let parent = NodeId::new(parent);
            prop_assert_ne!(hash_of(&parent, &a), hash_of(&parent, &b));
        }
    }
}
