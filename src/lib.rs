//! # cotreport
//!
//! Forwards vehicle node reports from a publish/subscribe bus to a TAK
//! server as Cursor on Target events.
//!
//! Reports arrive on two channels: the vehicle's own report (latest value
//! wins) and reports relayed from other vehicles (every value kept). Each
//! tick translates whatever arrived since the last one and pushes the
//! resulting events, in order, over a TCP connection that is re-established
//! on the next tick whenever it drops.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cotreport::{run, CotReporter, LineMailSource};
//! use cotreport_core::ReporterConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ReporterConfig::default();
//!     let mut reporter = CotReporter::from_config(&config);
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     run(&mut reporter, LineMailSource::stdin(), config.tick_period(), shutdown).await;
//! }
//! ```

pub mod bus;
pub mod inbox;
pub mod logging;
pub mod pipeline;
pub mod reporter;
pub mod runner;

pub use bus::{
    parse_mail_line, BusClient, BusMessage, LineMailSource, MailSource, Registrar,
    Subscriptions, UdpMailSource,
};
pub use inbox::{PendingReports, ReportInbox};
pub use pipeline::{ReportIngestPipeline, TickSummary};
pub use reporter::CotReporter;
pub use runner::{run, RunSummary};
