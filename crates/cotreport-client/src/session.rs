//! Connection lifecycle for the outbound TAK link.
//!
//! Each call to [`ForwardingSession::tick`] does exactly one of two things:
//!
//! - **Disconnected**: one connect attempt. Success moves to Connected; the
//!   queue is left alone until the next tick.
//! - **Connected**: one pass over the queue, head first. A message leaves
//!   the queue only after it has been written in full. The first write
//!   error closes the socket and returns to Disconnected with the failed
//!   message still at the head.
//!
//! There is no backoff: a failed connect is retried on the next tick.

use crate::client::{Connector, Link};
use crate::queue::OutboundQueue;
use crate::state::{ConnectionMetrics, ConnectionState};
use cotreport_core::ConnectionError;
use tracing::{debug, info, warn};

/// What a tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Was disconnected, connect succeeded
    Connected,
    /// Was disconnected, connect failed; still disconnected
    ConnectFailed(ConnectionError),
    /// Was connected, every queued message was written
    Drained { sent: usize },
    /// Was connected, a write failed; now disconnected
    WriteFailed {
        sent: usize,
        remaining: usize,
        error: ConnectionError,
    },
}

impl TickOutcome {
    /// Messages fully written during this tick.
    pub fn sent(&self) -> usize {
        match self {
            TickOutcome::Drained { sent } | TickOutcome::WriteFailed { sent, .. } => *sent,
            TickOutcome::Connected | TickOutcome::ConnectFailed(_) => 0,
        }
    }
}

/// Owns the connection to the TAK server and drains the outbound queue into it.
pub struct ForwardingSession<C: Connector> {
    connector: C,
    link: Option<C::Link>,
    metrics: ConnectionMetrics,
}

impl<C: Connector> ForwardingSession<C> {
    /// Create a disconnected session.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            link: None,
            metrics: ConnectionMetrics::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.link.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Shared handle to the connection counters.
    pub fn metrics(&self) -> &ConnectionMetrics {
        &self.metrics
    }

    /// Run one connect attempt or one drain pass, depending on state.
    pub async fn tick(&mut self, queue: &mut OutboundQueue) -> TickOutcome {
        match self.link.take() {
            None => self.connect().await,
            Some(link) => self.drain(link, queue).await,
        }
    }

    /// Close the connection if open. Queued messages stay queued.
    pub async fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            info!(addr = %self.connector.peer(), "Disconnecting from TAK server");
            link.close().await;
            self.metrics.mark_disconnected();
        }
    }

    async fn connect(&mut self) -> TickOutcome {
        self.metrics.record_connect_attempt();

        match self.connector.connect().await {
            Ok(link) => {
                info!(addr = %self.connector.peer(), "Connected to TAK server");
                self.link = Some(link);
                self.metrics.mark_connected();
                TickOutcome::Connected
            }
            Err(e) => {
                warn!(
                    addr = %self.connector.peer(),
                    error = %e,
                    "Connection to TAK server failed, retrying next tick"
                );
                self.metrics.record_connect_failure();
                TickOutcome::ConnectFailed(e)
            }
        }
    }

    async fn drain(&mut self, mut link: C::Link, queue: &mut OutboundQueue) -> TickOutcome {
        let mut sent = 0;

        loop {
            let Some(head) = queue.front() else {
                break;
            };
            let data = head.data.clone();

            match link.write_all(&data).await {
                Ok(()) => {
                    if let Some(message) = queue.pop_front() {
                        debug!(uid = %message.uid, bytes = message.len(), "Sent CoT message");
                        self.metrics.record_message_sent(message.len() as u64);
                    }
                    sent += 1;
                }
                Err(error) => {
                    let oldest_ms = queue.oldest_age().unwrap_or_default().as_millis() as u64;
                    warn!(
                        addr = %self.connector.peer(),
                        error = %error,
                        sent,
                        remaining = queue.len(),
                        oldest_ms,
                        "Write to TAK server failed, closing connection"
                    );
                    link.close().await;
                    self.metrics.record_write_failure();
                    self.metrics.mark_disconnected();
                    return TickOutcome::WriteFailed {
                        sent,
                        remaining: queue.len(),
                        error,
                    };
                }
            }
        }

        self.link = Some(link);
        TickOutcome::Drained { sent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ConnectResult, WriteResult};
    use crate::queue::OutboundMessage;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Records what reached the "wire" and fails on request.
    #[derive(Clone, Default)]
    struct Script {
        connects: Arc<Mutex<VecDeque<bool>>>,
        /// Fail the write with this zero-based index (counted across links).
        fail_write_at: Arc<Mutex<Option<usize>>>,
        writes: Arc<Mutex<usize>>,
        wire: Arc<Mutex<Vec<Vec<u8>>>>,
        closed: Arc<Mutex<usize>>,
    }

    struct ScriptedConnector(Script);

    struct ScriptedLink(Script);

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Link = ScriptedLink;

        async fn connect(&mut self) -> ConnectResult<ScriptedLink> {
            if self.0.connects.lock().pop_front().unwrap_or(true) {
                Ok(ScriptedLink(self.0.clone()))
            } else {
                Err(ConnectionError::connect_failed("scripted:0", "refused"))
            }
        }

        fn peer(&self) -> &str {
            "scripted:0"
        }
    }

    #[async_trait]
    impl Link for ScriptedLink {
        async fn write_all(&mut self, data: &[u8]) -> WriteResult {
            let index = {
                let mut writes = self.0.writes.lock();
                *writes += 1;
                *writes - 1
            };
            if *self.0.fail_write_at.lock() == Some(index) {
                return Err(ConnectionError::write_failed("broken pipe"));
            }
            self.0.wire.lock().push(data.to_vec());
            Ok(())
        }

        async fn close(&mut self) {
            *self.0.closed.lock() += 1;
        }
    }

    fn queue_of(uids: &[&str]) -> OutboundQueue {
        let mut queue = OutboundQueue::new();
        for uid in uids {
            queue.push(OutboundMessage::new(*uid, uid.as_bytes().to_vec()));
        }
        queue
    }

    fn remaining(queue: &OutboundQueue) -> Vec<String> {
        queue.iter().map(|m| m.uid.clone()).collect()
    }

    #[tokio::test]
    async fn test_connect_tick_does_not_drain() {
        let script = Script::default();
        let mut session = ForwardingSession::new(ScriptedConnector(script.clone()));
        let mut queue = queue_of(&["m1"]);

        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(matches!(session.tick(&mut queue).await, TickOutcome::Connected));
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(queue.len(), 1);
        assert!(script.wire.lock().is_empty());

        let outcome = session.tick(&mut queue).await;
        assert!(matches!(outcome, TickOutcome::Drained { sent: 1 }));
        assert!(queue.is_empty());
        assert_eq!(*script.wire.lock(), vec![b"m1".to_vec()]);
    }

    #[tokio::test]
    async fn test_connect_failure_retries_next_tick() {
        let script = Script::default();
        script.connects.lock().extend([false, false, true]);
        let mut session = ForwardingSession::new(ScriptedConnector(script.clone()));
        let mut queue = queue_of(&["m1", "m2"]);

        for _ in 0..2 {
            let outcome = session.tick(&mut queue).await;
            assert!(matches!(outcome, TickOutcome::ConnectFailed(_)));
            assert_eq!(session.state(), ConnectionState::Disconnected);
            assert_eq!(queue.len(), 2);
        }
        assert!(script.wire.lock().is_empty());

        assert!(matches!(session.tick(&mut queue).await, TickOutcome::Connected));
        assert_eq!(session.metrics().connect_attempts(), 3);
        assert_eq!(session.metrics().connect_failures(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_failed_and_later_messages() {
        let script = Script::default();
        *script.fail_write_at.lock() = Some(1);
        let mut session = ForwardingSession::new(ScriptedConnector(script.clone()));
        let mut queue = queue_of(&["m1", "m2", "m3"]);

        session.tick(&mut queue).await;
        let outcome = session.tick(&mut queue).await;

        match outcome {
            TickOutcome::WriteFailed { sent, remaining: left, .. } => {
                assert_eq!(sent, 1);
                assert_eq!(left, 2);
            }
            other => panic!("expected write failure, got {:?}", other),
        }
        assert_eq!(remaining(&queue), ["m2", "m3"]);
        assert_eq!(*script.wire.lock(), vec![b"m1".to_vec()]);
        assert_eq!(*script.closed.lock(), 1);
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.metrics().write_failures(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_resends_from_failed_message() {
        let script = Script::default();
        *script.fail_write_at.lock() = Some(1);
        let mut session = ForwardingSession::new(ScriptedConnector(script.clone()));
        let mut queue = queue_of(&["m1", "m2", "m3"]);

        session.tick(&mut queue).await; // connect
        session.tick(&mut queue).await; // m1 sent, m2 fails
        assert!(matches!(session.tick(&mut queue).await, TickOutcome::Connected));
        let outcome = session.tick(&mut queue).await;

        assert_eq!(outcome.sent(), 2);
        assert!(queue.is_empty());
        assert_eq!(
            *script.wire.lock(),
            vec![b"m1".to_vec(), b"m2".to_vec(), b"m3".to_vec()]
        );
        assert_eq!(session.metrics().messages_sent(), 3);
    }

    #[tokio::test]
    async fn test_drain_empty_queue() {
        let script = Script::default();
        let mut session = ForwardingSession::new(ScriptedConnector(script));
        let mut queue = OutboundQueue::new();

        session.tick(&mut queue).await;
        let outcome = session.tick(&mut queue).await;
        assert!(matches!(outcome, TickOutcome::Drained { sent: 0 }));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_keeps_queue() {
        let script = Script::default();
        let mut session = ForwardingSession::new(ScriptedConnector(script.clone()));
        let mut queue = queue_of(&["m1"]);

        session.tick(&mut queue).await;
        session.disconnect().await;

        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(queue.len(), 1);
        assert_eq!(*script.closed.lock(), 1);
    }
}
