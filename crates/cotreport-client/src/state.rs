use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Connection state of the forwarding session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No open connection; the next tick attempts one
    Disconnected,
    /// Connected; the next tick drains the outbound queue
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

/// Counters for the outbound connection.
///
/// Cloning shares the counters, so a handle can be given to a status
/// reporter while the session keeps updating them.
#[derive(Debug, Clone)]
pub struct ConnectionMetrics {
    /// Total bytes written
    bytes_sent: Arc<AtomicU64>,
    /// Total messages fully written
    messages_sent: Arc<AtomicU64>,
    /// Connect attempts, successful or not
    connect_attempts: Arc<AtomicU64>,
    /// Connect attempts that failed
    connect_failures: Arc<AtomicU64>,
    /// Writes that failed and dropped the connection
    write_failures: Arc<AtomicU64>,
    /// Connection established timestamp
    connected_at: Arc<parking_lot::RwLock<Option<SystemTime>>>,
}

impl Default for ConnectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMetrics {
    /// Create a new ConnectionMetrics instance
    pub fn new() -> Self {
        Self {
            bytes_sent: Arc::new(AtomicU64::new(0)),
            messages_sent: Arc::new(AtomicU64::new(0)),
            connect_attempts: Arc::new(AtomicU64::new(0)),
            connect_failures: Arc::new(AtomicU64::new(0)),
            write_failures: Arc::new(AtomicU64::new(0)),
            connected_at: Arc::new(parking_lot::RwLock::new(None)),
        }
    }

    /// Record a message written in full
    pub fn record_message_sent(&self, bytes: u64) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark connection as established
    pub fn mark_connected(&self) {
        *self.connected_at.write() = Some(SystemTime::now());
    }

    /// Mark connection as disconnected
    pub fn mark_disconnected(&self) {
        *self.connected_at.write() = None;
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn connect_failures(&self) -> u64 {
        self.connect_failures.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Get connection established timestamp
    pub fn connected_at(&self) -> Option<SystemTime> {
        *self.connected_at.read()
    }

    /// Get connection duration (if connected)
    pub fn connection_duration(&self) -> Option<Duration> {
        self.connected_at().and_then(|t| t.elapsed().ok())
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_sent: self.bytes_sent(),
            messages_sent: self.messages_sent(),
            connect_attempts: self.connect_attempts(),
            connect_failures: self.connect_failures(),
            write_failures: self.write_failures(),
            connected_at: self.connected_at(),
        }
    }
}

/// Snapshot of connection metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub bytes_sent: u64,
    pub messages_sent: u64,
    pub connect_attempts: u64,
    pub connect_failures: u64,
    pub write_failures: u64,
    pub connected_at: Option<SystemTime>,
}
