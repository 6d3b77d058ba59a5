//! Per-tick translation of pending reports into queued CoT events.
//!
//! A tick runs in a fixed order:
//!
//! 1. one `(nowZ, staleZ)` pair is generated and shared by every event
//! 2. the pending local report, if any, is translated
//! 3. remote reports are translated until the inbox has none left
//! 4. the forwarding session connects or drains, never both
//!
//! Everything reported before the tick is therefore queued before that
//! tick's transmission attempt.

use crate::inbox::PendingReports;
use chrono::{DateTime, Utc};
use cotreport_client::{
    Connector, ForwardingSession, OutboundMessage, OutboundQueue, TickOutcome,
};
use cotreport_cot::{serialize_event, CotEvent, NodeReport, TimestampGenerator, ZuluTimes};
use tracing::{debug, error, trace};

/// What one tick did.
#[derive(Debug)]
pub struct TickSummary {
    /// A local report was translated
    pub local: bool,
    /// Remote reports translated
    pub remote: usize,
    /// Result of the session step
    pub outcome: TickOutcome,
}

/// Turns reports into events and hands them to the forwarding session.
///
/// Owns the outbound queue and the session; nothing else touches either.
pub struct ReportIngestPipeline<C: Connector> {
    uid_base: String,
    timestamps: TimestampGenerator,
    queue: OutboundQueue,
    session: ForwardingSession<C>,
}

impl<C: Connector> ReportIngestPipeline<C> {
    pub fn new(
        session: ForwardingSession<C>,
        uid_base: impl Into<String>,
        timestamps: TimestampGenerator,
    ) -> Self {
        Self {
            uid_base: uid_base.into(),
            timestamps,
            queue: OutboundQueue::new(),
            session,
        }
    }

    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    pub fn session(&self) -> &ForwardingSession<C> {
        &self.session
    }

    /// Runs one tick against the wall clock.
    pub async fn tick<R: PendingReports>(&mut self, inbox: &R) -> TickSummary {
        self.tick_at(Utc::now(), inbox).await
    }

    /// Runs one tick as if the clock read `now`.
    pub async fn tick_at<R: PendingReports>(
        &mut self,
        now: DateTime<Utc>,
        inbox: &R,
    ) -> TickSummary {
        let times = self.timestamps.at(now);
        debug!("Time: {}", times.now_z);

        let local = match inbox.take_local() {
            Some(raw) => {
                self.enqueue(&raw, &times);
                true
            }
            None => false,
        };

        let mut remote = 0;
        while let Some(raw) = inbox.pop_remote() {
            self.enqueue(&raw, &times);
            remote += 1;
        }

        let outcome = self.session.tick(&mut self.queue).await;

        TickSummary {
            local,
            remote,
            outcome,
        }
    }

    /// Closes the connection. Anything still queued is lost with the process.
    pub async fn shutdown(&mut self) {
        if !self.queue.is_empty() {
            debug!(queued = self.queue.len(), "Unsent messages at shutdown");
        }
        self.session.disconnect().await;
    }

    fn enqueue(&mut self, raw: &str, times: &ZuluTimes) {
        let report = NodeReport::parse(raw);
        trace!(name = %report.name, vehicle_type = %report.vehicle_type, "Parsed node report");

        let event = CotEvent::from_report(&report, &self.uid_base, times);
        match serialize_event(&event) {
            Ok(xml) => self.queue.push(OutboundMessage::new(event.uid, xml)),
            Err(e) => error!(uid = %event.uid, error = %e, "Failed to serialize CoT event"),
        }
    }
}
