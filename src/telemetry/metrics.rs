//! Client exchange counters.
//!
//! Every datagram the receive loop reads ends up in exactly one of
//! `delivered`, `discarded_malformed`, `discarded_filtered` or
//! `discarded_unmatched`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for one client instance.
#[derive(Debug, Default)]
pub struct ClientMetrics {
    /// Datagrams written, retransmissions included.
    pub sent: Counter,
    /// Datagrams read by the receive loop.
    pub received: Counter,
    /// Datagrams handed to a waiting transaction.
    pub delivered: Counter,
    /// Datagrams that failed to decode.
    pub discarded_malformed: Counter,
    /// Decoded, but not addressed to this client.
    pub discarded_filtered: Counter,
    /// No transaction waiting for the ID.
    pub discarded_unmatched: Counter,
    /// Attempts that ended without a matching response.
    pub timeouts: Counter,
    pub retransmissions: Counter,
    /// Delivered datagrams by message type name.
    by_type: RwLock<BTreeMap<String, u64>>,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_message_type(&self, name: &str) {
        let mut by_type = self.by_type.write().unwrap_or_else(|e| e.into_inner());
        *by_type.entry(name.to_string()).or_default() += 1;
    }

    pub fn message_type_count(&self, name: &str) -> u64 {
        let by_type = self.by_type.read().unwrap_or_else(|e| e.into_inner());
        by_type.get(name).copied().unwrap_or(0)
    }

    /// Exports all metrics as key-value pairs.
    pub fn export(&self) -> Vec<(String, u64)> {
        let mut result = vec![
            ("sent".into(), self.sent.get()),
            ("received".into(), self.received.get()),
            ("delivered".into(), self.delivered.get()),
            ("discarded_malformed".into(), self.discarded_malformed.get()),
            ("discarded_filtered".into(), self.discarded_filtered.get()),
            ("discarded_unmatched".into(), self.discarded_unmatched.get()),
            ("timeouts".into(), self.timeouts.get()),
            ("retransmissions".into(), self.retransmissions.get()),
        ];

        let by_type = self.by_type.read().unwrap_or_else(|e| e.into_inner());
        for (name, count) in by_type.iter() {
            result.push((format!("delivered_{}", name.to_lowercase()), *count));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_basic() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.add(10);
        assert_eq!(counter.get(), 11);
    }

    #[test]
    fn test_client_metrics_export() {
        let metrics = ClientMetrics::new();
        metrics.sent.add(3);
        metrics.discarded_malformed.inc();
        metrics.record_message_type("OFFER");
        metrics.record_message_type("OFFER");
        metrics.record_message_type("ACK");

        assert_eq!(metrics.message_type_count("OFFER"), 2);
        assert_eq!(metrics.message_type_count("NAK"), 0);

        let exported = metrics.export();
        assert!(exported.contains(&("sent".into(), 3)));
        assert!(exported.contains(&("discarded_malformed".into(), 1)));
        assert!(exported.contains(&("timeouts".into(), 0)));
        assert!(exported.contains(&("delivered_offer".into(), 2)));
        assert!(exported.contains(&("delivered_ack".into(), 1)));
    }
}
