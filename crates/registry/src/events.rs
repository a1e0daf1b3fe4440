//! Append-only audit trail of claims and attribute changes.

use arbor_types::{EventRecord, RegistryEvent};
use tokio::sync::broadcast;
use tracing::info;

#[derive(Debug)]
pub struct EventLog {
    records: Vec<EventRecord>,
    sender: broadcast::Sender<EventRecord>,
}

impl EventLog {
    /// `capacity` bounds how far a live subscriber may lag before it starts
    /// missing events; it must be non-zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            records: Vec::new(),
            sender,
        }
    }

    /// Append an event and fan it out to live subscribers.
    pub fn emit(&mut self, timestamp: u64, event: RegistryEvent) -> u64 {
        let seq = self.records.len() as u64;
        let sender = event.sender();
        let node = event.node_id();
        match &event {
            RegistryEvent::Claim {
                parent_id,
                label,
                case,
                ..
            } => info!(
                seq,
                sender = %sender,
                node = %node,
                parent = %parent_id,
                label = %label,
                case = ?case,
                "node claimed"
            ),
            RegistryEvent::AttributeChanged { attribute, .. } => info!(
                seq,
                sender = %sender,
                node = %node,
                attribute = ?attribute,
                "node attribute changed"
            ),
        }

        let record = EventRecord {
            seq,
            timestamp,
            event,
        };
        // No receivers is not an error for an audit trail.
        let _ = self.sender.send(record.clone());
        self.records.push(record);
        seq
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number of at least `seq`.
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = usize::try_from(seq)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }
}
