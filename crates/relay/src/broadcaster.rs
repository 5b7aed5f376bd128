//! Connection registry and fan-out
//!
//! Each live viewer connection owns a bounded outbound queue. `broadcast`
//! offers the serialized record to every queue without blocking: a full or
//! closed queue loses that one delivery and the loop moves on. Dispatch runs
//! under the registry lock, so every connection sees records in the order they
//! were accepted; the lock is never held across a socket write.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque handle to one viewer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered connection's receiving end
pub struct Subscription {
    pub id: ConnectionId,
    pub rx: mpsc::Receiver<String>,
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Position of this record in the relay's accept order (1-based)
    pub sequence: u64,
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, mpsc::Sender<String>>,
    sequence: u64,
}

/// Fans accepted records out to every registered connection
pub struct Broadcaster {
    registry: Mutex<Registry>,
    queue_capacity: usize,
}

impl Broadcaster {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Add a connection. It receives only records broadcast after this call.
    pub fn register(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = ConnectionId::new();
        self.registry.lock().connections.insert(id, tx);
        debug!("Registered connection {}", id);
        Subscription { id, rx }
    }

    /// Remove a connection. Returns false if it was already gone.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.registry.lock().connections.remove(&id).is_some();
        if removed {
            debug!("Unregistered connection {}", id);
        }
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.registry.lock().connections.len()
    }

    /// Drop every queue; writers see end-of-stream and close their sockets
    pub fn close_all(&self) -> usize {
        let mut registry = self.registry.lock();
        let n = registry.connections.len();
        registry.connections.clear();
        n
    }

    /// Deliver `record` to every registered connection, best effort.
    pub fn broadcast<T: Serialize + ?Sized>(&self, record: &T) -> BroadcastReport {
        let text = match serde_json::to_string(record) {
            Ok(text) => text,
            Err(e) => {
                warn!("Dropping unserializable record: {}", e);
                return BroadcastReport::default();
            }
        };

        let mut registry = self.registry.lock();
        registry.sequence += 1;
        let mut report = BroadcastReport {
            sequence: registry.sequence,
            ..Default::default()
        };

        let mut closed = Vec::new();
        for (id, tx) in registry.connections.iter() {
            match tx.try_send(text.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Connection {} is not keeping up; dropping record #{}",
                        id, report.sequence
                    );
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    report.dropped += 1;
                    closed.push(*id);
                }
            }
        }
        for id in closed {
            registry.connections.remove(&id);
            debug!("Pruned closed connection {}", id);
        }

        report
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain(sub: &mut Subscription) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = sub.rx.try_recv() {
            out.push(text);
        }
        out
    }

    #[test]
    fn test_fan_out_to_all() {
        let b = Broadcaster::new(8);
        let mut a = b.register();
        let mut c = b.register();
        assert_ne!(a.id, c.id);

        let report = b.broadcast(&json!({"actionType": "click"}));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.dropped, 0);
        assert_eq!(drain(&mut a), vec![r#"{"actionType":"click"}"#]);
        assert_eq!(drain(&mut c), vec![r#"{"actionType":"click"}"#]);
    }

    #[test]
    fn test_late_joiner_gets_nothing_earlier() {
        let b = Broadcaster::new(8);
        b.broadcast(&json!({"n": 1}));
        let mut late = b.register();
        assert!(drain(&mut late).is_empty());
        b.broadcast(&json!({"n": 2}));
        assert_eq!(drain(&mut late), vec![r#"{"n":2}"#]);
    }

    #[test]
    fn test_order_preserved_per_connection() {
        let b = Broadcaster::new(64);
        let mut subs: Vec<_> = (0..3).map(|_| b.register()).collect();
        for n in 0..20 {
            b.broadcast(&json!({ "n": n }));
        }
        let expected: Vec<String> = (0..20).map(|n| format!(r#"{{"n":{}}}"#, n)).collect();
        for sub in subs.iter_mut() {
            assert_eq!(drain(sub), expected);
        }
    }

    #[test]
    fn test_sequence_increments() {
        let b = Broadcaster::new(4);
        assert_eq!(b.broadcast(&json!({})).sequence, 1);
        assert_eq!(b.broadcast(&json!({})).sequence, 2);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let b = Broadcaster::new(4);
        let sub = b.register();
        assert!(b.unregister(sub.id));
        assert!(!b.unregister(sub.id));
        assert_eq!(b.broadcast(&json!({})).delivered, 0);
    }

    #[test]
    fn test_concurrent_broadcasts_share_one_order() {
        let b = std::sync::Arc::new(Broadcaster::new(512));
        let mut subs: Vec<_> = (0..3).map(|_| b.register()).collect();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let b = b.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|n| b.broadcast(&json!({ "t": t, "n": n })).sequence)
                        .collect::<Vec<u64>>()
                })
            })
            .collect();

        let mut sequences = Vec::new();
        for h in handles {
            let seqs = h.join().unwrap();
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
            sequences.extend(seqs);
        }
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=200).collect::<Vec<u64>>());

        let first = drain(&mut subs[0]);
        assert_eq!(first.len(), 200);
        for sub in subs.iter_mut().skip(1) {
            assert_eq!(drain(sub), first);
        }

        // Within one producer thread, records stay in the order it sent them.
        for t in 0..4 {
            let ns: Vec<i64> = first
                .iter()
                .map(|s| serde_json::from_str::<serde_json::Value>(s).unwrap())
                .filter(|v| v["t"] == t)
                .map(|v| v["n"].as_i64().unwrap())
                .collect();
            assert_eq!(ns, (0..50).collect::<Vec<i64>>());
        }
    }

    #[test]
    fn test_closed_connection_does_not_block_others() {
        let b = Broadcaster::new(4);
        let gone = b.register();
        let mut live = b.register();
        drop(gone.rx);

        let report = b.broadcast(&json!({"n": 1}));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(b.connection_count(), 1);
        assert_eq!(drain(&mut live).len(), 1);
    }

    #[test]
    fn test_stalled_connection_drops_without_blocking() {
        let b = Broadcaster::new(2);
        let mut stalled = b.register();
        for n in 0..5 {
            b.broadcast(&json!({ "n": n }));
        }
        // Only the first two fit; the rest were dropped for this connection.
        assert_eq!(drain(&mut stalled), vec![r#"{"n":0}"#, r#"{"n":1}"#]);
        assert_eq!(b.connection_count(), 1);
    }

    #[test]
    fn test_close_all() {
        let b = Broadcaster::new(4);
        let mut sub = b.register();
        assert_eq!(b.close_all(), 1);
        assert_eq!(b.connection_count(), 0);
        assert!(matches!(
            sub.rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
