//! Common helpers for the reporter integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use cotreport_core::ReporterConfig;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 2024-01-15T10:30:00.045Z
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap() + chrono::Duration::milliseconds(45)
}

/// A TAK server stand-in that accepts one connection and returns
/// everything written to it once the client hangs up.
pub struct CaptureServer {
    pub port: u16,
    handle: JoinHandle<String>,
}

impl CaptureServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind capture server");
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept failed");
            let mut received = String::new();
            socket
                .read_to_string(&mut received)
                .await
                .expect("read failed");
            received
        });

        Self { port, handle }
    }

    /// Waits for the client to disconnect and returns what it sent.
    pub async fn received(self) -> String {
        self.handle.await.expect("capture server panicked")
    }
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Reporter configuration pointing at a local port.
pub fn config_for(port: u16, uid_base: &str) -> ReporterConfig {
    ReporterConfig {
        tak_server: "127.0.0.1".to_string(),
        tak_port: port,
        tak_uid_base: uid_base.to_string(),
        ..Default::default()
    }
}

/// Splits a captured stream into documents on the closing tag.
pub fn split_events(stream: &str) -> Vec<String> {
    stream
        .split_inclusive("</event>")
        .map(str::trim)
        .filter(|doc| !doc.is_empty())
        .map(str::to_string)
        .collect()
}

/// Value of `name="..."` in the first element that carries it. The XML
/// declaration is skipped.
pub fn attribute<'a>(doc: &'a str, name: &str) -> Option<&'a str> {
    let body = doc.find("<event").unwrap_or(0);
    let needle = format!(" {}=\"", name);
    let start = doc[body..].find(&needle)? + body + needle.len();
    let end = doc[start..].find('"')? + start;
    Some(&doc[start..end])
}
