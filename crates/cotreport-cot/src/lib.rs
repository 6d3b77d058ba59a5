//! Node report to Cursor on Target (CoT) translation
//!
//! This crate turns the compact `KEY=VALUE,...` node reports published by
//! vehicles into CoT position events ready to be written to a TAK server.
//!
//! # Features
//!
//! - Best-effort report parsing (malformed tokens are skipped, never an error)
//! - Zulu timestamp generation with a fixed 120 s stale window
//! - XML serialization through quick-xml
//!
//! # Example
//!
//! ```rust
//! use cotreport_cot::{build_event_message, parse_report, TimestampGenerator};
//!
//! let report = parse_report("NAME=alpha,TYPE=uuv,LAT=10.5,LON=-20.25");
//! let times = TimestampGenerator::default().now_and_stale();
//! let xml = build_event_message(
//!     &times.now_z,
//!     &times.stale_z,
//!     "base_uuv_alpha",
//!     report.get("LAT"),
//!     report.get("LON"),
//! )
//! .unwrap();
//! assert!(xml.contains(r#"uid="base_uuv_alpha""#));
//! ```

pub mod event;
pub mod report;
pub mod serializer;
pub mod timestamp;

pub use event::{identifier, CotEvent, Point};
pub use report::{parse as parse_report, NodeReport, ParsedReport};
pub use serializer::{build_event_message, serialize_event, BuildError};
pub use timestamp::{format_zulu, MillisFormat, TimestampGenerator, ZuluTimes, STALE_AFTER_SECS};
