use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest accepted label, in bytes.
pub const MIN_LABEL_LEN: usize = 1;
/// Longest accepted label, in bytes.
pub const MAX_LABEL_LEN: usize = 32;

/// Raised when a label falls outside `[MIN_LABEL_LEN, MAX_LABEL_LEN]`.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("label must be between {MIN_LABEL_LEN} and {MAX_LABEL_LEN} bytes, got {len}")]
pub struct LabelError {
    pub len: usize,
}

/// Raw label bytes naming a node beneath its parent.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LabelRepr", into = "LabelRepr")]
pub struct Label(Vec<u8>);

impl Label {
    /// Validate and wrap raw label bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, LabelError> {
        let bytes = bytes.into();
        if !is_valid_label(&bytes) {
            return Err(LabelError { len: bytes.len() });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Structural label check, independent of any caller.
pub fn is_valid_label(bytes: &[u8]) -> bool {
    (MIN_LABEL_LEN..=MAX_LABEL_LEN).contains(&bytes.len())
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label(0x{})", self.to_hex())
    }
}

/// Labels travel as hex strings in JSON.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct LabelRepr(String);

impl TryFrom<LabelRepr> for Label {
    type Error = String;

    fn try_from(value: LabelRepr) -> Result<Self, Self::Error> {
        let raw = value.0.strip_prefix("0x").unwrap_or(&value.0);
        let bytes = hex::decode(raw).map_err(|e| e.to_string())?;
        Label::new(bytes).map_err(|e| e.to_string())
    }
}

impl From<Label> for LabelRepr {
    fn from(value: Label) -> Self {
        LabelRepr(value.to_hex())
    }
}
