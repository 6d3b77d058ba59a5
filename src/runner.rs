//! Host loop: delivers bus mail and fires ticks until told to stop.

use crate::bus::{BusClient, BusMessage, MailSource, Subscriptions};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Counters from a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub mail_delivered: u64,
}

/// Runs `client` until `shutdown` resolves.
///
/// Mail and ticks are handled on one task, so a tick always finishes before
/// the next one starts. Ticks that fall behind are delayed, not bunched up.
/// The run keeps ticking after the mail source is exhausted.
pub async fn run<B, M, F>(
    client: &mut B,
    source: M,
    tick_period: Duration,
    shutdown: F,
) -> RunSummary
where
    B: BusClient,
    M: MailSource,
    F: Future<Output = ()>,
{
    let mut subscriptions = Subscriptions::default();
    client.on_connect(&mut subscriptions);

    let mut ticker = interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut source = Some(source);
    let mut summary = RunSummary::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                client.on_tick().await;
                summary.ticks += 1;
            }
            mail = next_mail(&mut source), if source.is_some() => match mail {
                Some(batch) => {
                    let batch = subscriptions.filter(batch);
                    if !batch.is_empty() {
                        summary.mail_delivered += batch.len() as u64;
                        client.on_mail(&batch);
                    }
                }
                None => {
                    debug!("Mail source closed");
                    source = None;
                }
            },
        }
    }

    client.on_shutdown().await;
    summary
}

async fn next_mail<M: MailSource>(source: &mut Option<M>) -> Option<Vec<BusMessage>> {
    match source {
        Some(source) => source.recv().await,
        None => std::future::pending().await,
    }
}
