use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of raw bytes in a node id or identity.
pub const ID_BYTES: usize = 32;
/// Expected string length of a hex encoded id.
pub const ID_HEX_LENGTH: usize = ID_BYTES * 2;

/// Errors that can occur when parsing a hex encoded id.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IdError {
    #[error("id must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("id is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

fn decode_id(value: &str) -> Result<[u8; ID_BYTES], IdError> {
    let value = value.strip_prefix("0x").unwrap_or(value);
    if value.len() != ID_HEX_LENGTH {
        return Err(IdError::InvalidLength {
            expected: ID_HEX_LENGTH,
            actual: value.len(),
        });
    }
    let mut bytes = [0u8; ID_BYTES];
    hex::decode_to_slice(value, &mut bytes)?;
    Ok(bytes)
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; ID_BYTES]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; ID_BYTES]);

            pub const fn new(bytes: [u8; ID_BYTES]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; ID_BYTES]
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn from_hex(value: &str) -> Result<Self, IdError> {
                decode_id(value).map(Self)
            }
        }

        impl From<[u8; ID_BYTES]> for $name {
            fn from(bytes: [u8; ID_BYTES]) -> Self {
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                Self::from_hex(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id! {
    /// Deterministic identifier of a registry node.
    ///
    /// Node ids are always derived from `(parent, label)` and never chosen by a
    /// caller. [`NodeId::ROOT`] denotes the implicit top of the hierarchy and is
    /// never itself stored.
    NodeId
}

hex_id! {
    /// Identity of a caller, owner or delegated operator.
    Identity
}

impl NodeId {
    /// The implicit root of the hierarchy.
    pub const ROOT: Self = Self::ZERO;

    pub fn is_root(&self) -> bool {
        self.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_accepts_optional_prefix() {
        let id = NodeId::new([0xab; ID_BYTES]);
        let encoded = id.to_hex();
        assert_eq!(encoded.len(), ID_HEX_LENGTH);
        assert_eq!(NodeId::from_hex(&encoded).unwrap(), id);
        assert_eq!(NodeId::from_hex(&format!("0x{encoded}")).unwrap(), id);
    }

    #[test]
    fn rejects_short_and_non_hex_input() {
        assert_eq!(
            Identity::from_hex("abcd").unwrap_err(),
            IdError::InvalidLength {
                expected: ID_HEX_LENGTH,
                actual: 4
            }
        );
        let bad = "zz".repeat(ID_BYTES);
        assert!(matches!(
            Identity::from_hex(&bad),
            Err(IdError::InvalidHex(_))
        ));
    }

    #[test]
    fn root_is_zero() {
        assert!(NodeId::ROOT.is_root());
        assert!(!NodeId::new([1u8; ID_BYTES]).is_root());
        assert_eq!(NodeId::default(), NodeId::ROOT);
    }

    #[test]
    fn serializes_as_hex_string() {
        let identity = Identity::new([7u8; ID_BYTES]);
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(ID_BYTES)));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }
}
