//! Replay scripts: a JSON list of registry operations applied in order to an
//! in-memory registry running on a manual clock.

use anyhow::{anyhow, bail, Context, Result};
use arbor_registry::{
    hash_of, EventRecord, Identity, NodeId, NodeRegistry, OperatorBook, RegistryConfig,
};
use arbor_time::ManualClock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct Script {
    /// Clock value before the first step, seconds since UNIX_EPOCH.
    #[serde(default)]
    pub start: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Claim {
        caller: Identity,
        parent: String,
        label: String,
    },
    Expire {
        caller: Identity,
        node: String,
    },
    SetSeeAlso {
        caller: Identity,
        node: String,
        value: String,
    },
    SetSeeAddress {
        caller: Identity,
        node: String,
        value: Identity,
    },
    SetNodeBody {
        caller: Identity,
        node: String,
        value: String,
    },
    SetDisplayUri {
        caller: Identity,
        node: String,
        value: String,
    },
    ApproveAll {
        owner: Identity,
        operator: Identity,
        #[serde(default = "approved_default")]
        approved: bool,
    },
    Advance {
        secs: u64,
    },
}

fn approved_default() -> bool {
    true
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Claim { .. } => "claim",
            Step::Expire { .. } => "expire",
            Step::SetSeeAlso { .. } => "set_see_also",
            Step::SetSeeAddress { .. } => "set_see_address",
            Step::SetNodeBody { .. } => "set_node_body",
            Step::SetDisplayUri { .. } => "set_display_uri",
            Step::ApproveAll { .. } => "approve_all",
            Step::Advance { .. } => "advance",
        }
    }
}

/// Decode a hex label, tolerating a `0x` prefix. Length is not checked here.
pub fn decode_label(value: &str) -> Result<Vec<u8>> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
        .with_context(|| format!("label '{value}' is not valid hex"))
}

/// Resolve a node reference: `root`, a 64 hex character id, or a
/// `/`-separated path of hex labels starting below the root (an optional
/// leading `root/` is accepted).
pub fn resolve_node(reference: &str) -> Result<NodeId> {
    let reference = reference.trim();
    if reference.is_empty() || reference.eq_ignore_ascii_case("root") {
        return Ok(NodeId::ROOT);
    }
    if !reference.contains('/') {
        if let Ok(id) = NodeId::from_hex(reference) {
            return Ok(id);
        }
    }

    let path = reference.strip_prefix("root/").unwrap_or(reference);
    let mut node = NodeId::ROOT;
    for segment in path.trim_matches('/').split('/') {
        let label = decode_label(segment)?;
        if !arbor_registry::is_valid_label(&label) {
            bail!("path segment '{segment}' is not a valid label");
        }
        node = hash_of(&node, &label);
    }
    Ok(node)
}

/// Result of one step, ready for JSON output.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub now: u64,
    pub result: Value,
}

pub struct Replay {
    registry: NodeRegistry,
    clock: Arc<ManualClock>,
    book: Arc<OperatorBook>,
}

impl Replay {
    pub fn new(config: &RegistryConfig, start: u64) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(start));
        let book = OperatorBook::shared();
        let registry = NodeRegistry::new(config, book.clone(), clock.clone())
            .context("failed to build registry")?;
        Ok(Self {
            registry,
            clock,
            book,
        })
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn run(&self, steps: &[Step]) -> Vec<StepReport> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let result = match self.apply(step) {
                    Ok(value) => value,
                    Err(error) => {
                        warn!(index, op = step.name(), error = %error, "step failed");
                        json!({ "error": format!("{error:#}") })
                    }
                };
                StepReport {
                    index,
                    op: step.name(),
                    now: arbor_time::Clock::now(self.clock.as_ref()),
                    result,
                }
            })
            .collect()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.registry.events()
    }

    fn apply(&self, step: &Step) -> Result<Value> {
        debug!(?step, "applying step");
        match step {
            Step::Claim {
                caller,
                parent,
                label,
            } => {
                let parent = resolve_node(parent)?;
                let label = decode_label(label)?;
                let outcome = self.registry.claim(parent, &label, *caller)?;
                Ok(serde_json::to_value(outcome)?)
            }
            Step::Expire { caller, node } => {
                let node = resolve_node(node)?;
                self.registry.expire(&node, *caller)?;
                let record = self.registry.node(&node)?;
                Ok(json!({
                    "status": "ok",
                    "node_id": node,
                    "owner": record.owner,
                    "expiry": record.expiry,
                }))
            }
            Step::SetSeeAlso {
                caller,
                node,
                value,
            } => {
                let node = resolve_node(node)?;
                let value = resolve_node(value)?;
                self.registry.set_see_also(&node, value, *caller)?;
                Ok(json!({ "status": "ok", "node_id": node }))
            }
            Step::SetSeeAddress {
                caller,
                node,
                value,
            } => {
                let node = resolve_node(node)?;
                self.registry.set_see_address(&node, *value, *caller)?;
                Ok(json!({ "status": "ok", "node_id": node }))
            }
            Step::SetNodeBody {
                caller,
                node,
                value,
            } => {
                let node = resolve_node(node)?;
                let body = hex::decode(value.strip_prefix("0x").unwrap_or(value))
                    .map_err(|e| anyhow!("node body is not valid hex: {e}"))?;
                self.registry.set_node_body(&node, body, *caller)?;
                Ok(json!({ "status": "ok", "node_id": node }))
            }
            Step::SetDisplayUri {
                caller,
                node,
                value,
            } => {
                let node = resolve_node(node)?;
                self.registry.set_display_uri(&node, value.clone(), *caller)?;
                Ok(json!({ "status": "ok", "node_id": node }))
            }
            Step::ApproveAll {
                owner,
                operator,
                approved,
            } => {
                self.book.set_approval_for_all(*owner, *operator, *approved);
                Ok(json!({ "status": "ok" }))
            }
            Step::Advance { secs } => {
                let now = self.clock.advance(*secs);
                Ok(json!({ "status": "ok", "now": now }))
            }
        }
    }
}
