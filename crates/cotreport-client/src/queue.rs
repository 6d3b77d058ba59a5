//! Ordered buffer of serialized events awaiting transmission.
//!
//! The queue is unbounded: while the TAK server is unreachable every tick
//! adds to it and nothing removes from it. Messages live only in memory.

use bytes::Bytes;
use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

/// A serialized CoT event ready to be written to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Raw CoT XML data
    pub data: Bytes,
    /// UID of the event, for logging
    pub uid: String,
    /// When the message was queued
    pub queued_at: SystemTime,
}

impl OutboundMessage {
    pub fn new(uid: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            uid: uid.into(),
            queued_at: SystemTime::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Time spent in the queue so far. Zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        self.queued_at.elapsed().unwrap_or_default()
    }
}

/// Strict FIFO of outbound messages.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    messages: VecDeque<OutboundMessage>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail.
    pub fn push(&mut self, message: OutboundMessage) {
        self.messages.push_back(message);
    }

    /// The message that will be written next.
    pub fn front(&self) -> Option<&OutboundMessage> {
        self.messages.front()
    }

    /// Remove and return the head; `None` on an empty queue.
    pub fn pop_front(&mut self) -> Option<OutboundMessage> {
        self.messages.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Total payload bytes waiting.
    pub fn pending_bytes(&self) -> usize {
        self.messages.iter().map(OutboundMessage::len).sum()
    }

    /// How long the head message has been waiting.
    pub fn oldest_age(&self) -> Option<Duration> {
        self.front().map(OutboundMessage::age)
    }

    /// Iterate from head to tail without removing.
    pub fn iter(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.messages.iter()
    }
}
