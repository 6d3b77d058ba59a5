//! Reports received from the bus and not yet translated.
//!
//! Mail delivery and the tick handler may run on different tasks, so both
//! streams sit behind one lock:
//!
//! - the local slot holds this vehicle's latest report; a new one replaces
//!   any report not yet consumed
//! - the remote queue keeps every report from other vehicles, in arrival order

use crate::bus::BusMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct Pending {
    local: Option<String>,
    remote: VecDeque<String>,
}

/// Where the pipeline reads pending reports from.
pub trait PendingReports: Sync {
    /// Takes the pending local report, if any.
    fn take_local(&self) -> Option<String>;

    /// Removes the oldest remote report, if any.
    fn pop_remote(&self) -> Option<String>;
}

/// Shared handle to the pending reports. Clones refer to the same inbox.
#[derive(Debug, Clone, Default)]
pub struct ReportInbox {
    pending: Arc<Mutex<Pending>>,
}

impl ReportInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a batch of bus mail by channel. Mail on any other channel is
    /// ignored. Returns how many messages were accepted.
    pub fn deliver(&self, mail: &[BusMessage], local_channel: &str, remote_channel: &str) -> usize {
        let mut pending = self.pending.lock();
        let mut accepted = 0;

        for message in mail {
            if message.key == local_channel {
                pending.local = Some(message.value.clone());
                accepted += 1;
            } else if message.key == remote_channel {
                pending.remote.push_back(message.value.clone());
                accepted += 1;
            } else {
                trace!(channel = %message.key, "Ignoring mail on unrelated channel");
            }
        }

        accepted
    }

    /// Replaces the pending local report.
    pub fn set_local(&self, raw: impl Into<String>) {
        self.pending.lock().local = Some(raw.into());
    }

    /// Appends a remote report.
    pub fn push_remote(&self, raw: impl Into<String>) {
        self.pending.lock().remote.push_back(raw.into());
    }

    /// Takes the pending local report, leaving the slot empty.
    pub fn take_local(&self) -> Option<String> {
        self.pending.lock().local.take()
    }

    /// Removes the oldest remote report.
    ///
    /// The lock is released between calls, so a caller looping until `None`
    /// also picks up reports that arrive while it is looping.
    pub fn pop_remote(&self) -> Option<String> {
        self.pending.lock().remote.pop_front()
    }

    /// Whether a local report is pending, and how many remote reports are.
    pub fn pending(&self) -> (bool, usize) {
        let pending = self.pending.lock();
        (pending.local.is_some(), pending.remote.len())
    }
}

impl PendingReports for ReportInbox {
    fn take_local(&self) -> Option<String> {
        ReportInbox::take_local(self)
    }

    fn pop_remote(&self) -> Option<String> {
        ReportInbox::pop_remote(self)
    }
}
