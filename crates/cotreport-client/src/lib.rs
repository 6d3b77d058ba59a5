//! # cotreport-client
//!
//! Outbound side of the reporter: an ordered queue of serialized CoT events
//! and the session that drains it into a TCP connection to a TAK server.
//!
//! - **Transport**: plain TCP, one XML document per message, no framing
//! - **Reconnect**: one connect attempt per tick, no backoff, no limit
//! - **Delivery**: a message leaves the queue only after a complete write
//!
//! ## Example
//!
//! ```rust,no_run
//! use cotreport_client::{ClientConfig, ForwardingSession, OutboundMessage, OutboundQueue, TcpConnector};
//!
//! #[tokio::main]
//! async fn main() {
//!     let connector = TcpConnector::new(ClientConfig {
//!         server_addr: "127.0.0.1:8087".to_string(),
//!         ..Default::default()
//!     });
//!     let mut session = ForwardingSession::new(connector);
//!     let mut queue = OutboundQueue::new();
//!     queue.push(OutboundMessage::new("base_uuv_alpha", "<event/>"));
//!
//!     session.tick(&mut queue).await; // connect
//!     session.tick(&mut queue).await; // drain
//! }
//! ```

pub mod client;
pub mod queue;
pub mod session;
pub mod state;
pub mod tcp;

// Re-export commonly used types
pub use client::{ClientConfig, ConnectResult, Connector, Link, WriteResult};
pub use queue::{OutboundMessage, OutboundQueue};
pub use session::{ForwardingSession, TickOutcome};
pub use state::{ConnectionMetrics, ConnectionState, MetricsSnapshot};
pub use tcp::{TcpConnector, TcpLink};

// Re-export bytes for convenience
pub use bytes::Bytes;
