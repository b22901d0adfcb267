use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use arx_types::{AssetId, Timestamp};

use crate::record::{EventKind, EventPayload, EventRecord};

/// Filter for subscribing to a subset of registry events.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only events for these assets are delivered.
    pub assets: Option<Vec<AssetId>>,
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<EventKind>>,
    /// If set, only events stamped after this instant are delivered.
    pub since: Option<Timestamp>,
}

impl EventFilter {
    /// Returns `true` if the given record matches this filter.
    pub fn matches(&self, record: &EventRecord) -> bool {
        if let Some(ref assets) = self.assets {
            match record.asset {
                Some(asset) if assets.contains(&asset) => {}
                _ => return false,
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&record.kind) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.timestamp <= since {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for registry events.
pub type EventStream = broadcast::Receiver<EventRecord>;

/// Internal subscriber: a filter paired with a broadcast sender.
struct Subscriber {
    filter: EventFilter,
    sender: broadcast::Sender<EventRecord>,
}

#[derive(Default)]
struct LogState {
    records: Vec<EventRecord>,
    subscribers: Vec<Subscriber>,
}

/// Append-only event log with broadcast fan-out.
///
/// Records receive a dense, zero-based sequence number at append time. The
/// in-memory log is the registry's authoritative operation history; the host
/// is expected to persist it alongside the operations themselves.
pub struct EventLog {
    inner: RwLock<LogState>,
    channel_capacity: usize,
}

impl EventLog {
    /// Create an empty log with the default subscriber channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create an empty log with an explicit subscriber channel capacity.
    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            inner: RwLock::new(LogState::default()),
            channel_capacity,
        }
    }

    /// Append a record, assigning the next sequence number, and fan it out
    /// to matching subscribers.
    pub fn append(
        &self,
        timestamp: Timestamp,
        asset: Option<AssetId>,
        kind: EventKind,
        payload: EventPayload,
    ) -> EventRecord {
        let mut state = self.inner.write().expect("event log lock poisoned");
        let record = EventRecord {
            seq: state.records.len() as u64,
            timestamp,
            asset,
            kind,
            payload,
        };
        state.records.push(record.clone());

        // Fan out; subscribers whose channels are closed are pruned.
        state.subscribers.retain(|sub| {
            if sub.filter.matches(&record) {
                sub.sender.send(record.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });

        debug!(seq = record.seq, kind = %record.kind, "event appended");
        record
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        let (tx, rx) = broadcast::channel(self.channel_capacity);
        self.inner
            .write()
            .expect("event log lock poisoned")
            .subscribers
            .push(Subscriber { filter, sender: tx });
        rx
    }

    /// Number of records in the log.
    pub fn len(&self) -> u64 {
        self.inner.read().expect("event log lock poisoned").records.len() as u64
    }

    /// `true` if no record has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, in append order.
    pub fn all(&self) -> Vec<EventRecord> {
        self.inner
            .read()
            .expect("event log lock poisoned")
            .records
            .clone()
    }

    /// Records affecting the given asset, in append order.
    pub fn for_asset(&self, asset: AssetId) -> Vec<EventRecord> {
        self.inner
            .read()
            .expect("event log lock poisoned")
            .records
            .iter()
            .filter(|r| r.asset == Some(asset))
            .cloned()
            .collect()
    }

    /// Records of the given kind, in append order.
    pub fn of_kind(&self, kind: EventKind) -> Vec<EventRecord> {
        self.inner
            .read()
            .expect("event log lock poisoned")
            .records
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    /// Records with sequence number `>= from_seq`.
    pub fn since_seq(&self, from_seq: u64) -> Vec<EventRecord> {
        let state = self.inner.read().expect("event log lock poisoned");
        let start = (from_seq as usize).min(state.records.len());
        state.records[start..].to_vec()
    }

    /// Current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .read()
            .expect("event log lock poisoned")
            .subscribers
            .len()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
