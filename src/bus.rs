//! Adapter to the publish/subscribe bus that carries node reports.
//!
//! The bus itself is external. This module defines what the reporter needs
//! from it ([`BusClient`] callbacks, channel registration) and two mail
//! sources so the binary can run standalone:
//!
//! - [`LineMailSource`]: text lines from any async reader, stdin by default
//! - [`UdpMailSource`]: datagrams, each holding one or more lines
//!
//! Both use the same line format: `CHANNEL VALUE`, split at the first
//! whitespace. The value is the rest of the line, untouched.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Largest datagram accepted by [`UdpMailSource`].
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// One posting on a named channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Channel name
    pub key: String,
    /// Raw posted value
    pub value: String,
}

impl BusMessage {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Accepts channel subscriptions from a client.
pub trait Registrar {
    fn register(&mut self, channel: &str);
}

/// Channels a client registered for.
#[derive(Debug, Default, Clone)]
pub struct Subscriptions {
    channels: HashSet<String>,
}

impl Subscriptions {
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Keeps only the mail on registered channels.
    pub fn filter(&self, mail: Vec<BusMessage>) -> Vec<BusMessage> {
        mail.into_iter().filter(|m| self.contains(&m.key)).collect()
    }
}

impl Registrar for Subscriptions {
    fn register(&mut self, channel: &str) {
        self.channels.insert(channel.to_string());
    }
}

/// Callbacks a bus application implements.
#[async_trait]
pub trait BusClient: Send {
    /// Called once before any mail or tick; register channels here.
    fn on_connect(&mut self, registrar: &mut dyn Registrar);

    /// New mail on registered channels, in arrival order.
    fn on_mail(&self, mail: &[BusMessage]);

    /// Periodic work. The next tick does not start until this returns.
    async fn on_tick(&mut self);

    /// Called once when the host loop stops.
    async fn on_shutdown(&mut self) {}
}

/// Produces batches of bus mail.
#[async_trait]
pub trait MailSource: Send {
    /// Waits for the next batch. `None` means the source is exhausted.
    async fn recv(&mut self) -> Option<Vec<BusMessage>>;
}

/// Parses one `CHANNEL VALUE` line.
///
/// Returns `None` for blank lines. A line holding only a channel name
/// posts an empty value.
pub fn parse_mail_line(line: &str) -> Option<BusMessage> {
    let line = line.trim_end_matches(['\r', '\n']);
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }

    match line.split_once(char::is_whitespace) {
        Some((channel, value)) => Some(BusMessage::new(channel, value)),
        None => Some(BusMessage::new(line, "")),
    }
}

/// Mail from a line-oriented reader.
pub struct LineMailSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineMailSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl LineMailSource<BufReader<Stdin>> {
    /// Reads mail from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MailSource for LineMailSource<R> {
    async fn recv(&mut self) -> Option<Vec<BusMessage>> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(message) = parse_mail_line(&line) {
                        return Some(vec![message]);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    warn!(error = %e, "Failed to read bus mail");
                    return None;
                }
            }
        }
    }
}

/// Mail received as UDP datagrams.
pub struct UdpMailSource {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl UdpMailSource {
    /// Binds the listening socket.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        debug!(addr = %addr, "Listening for bus mail over UDP");
        Ok(Self {
            socket,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl MailSource for UdpMailSource {
    async fn recv(&mut self) -> Option<Vec<BusMessage>> {
        loop {
            match self.socket.recv_from(&mut self.buffer).await {
                Ok((len, from)) => {
                    let text = String::from_utf8_lossy(&self.buffer[..len]);
                    let batch: Vec<BusMessage> = text.lines().filter_map(parse_mail_line).collect();
                    if batch.is_empty() {
                        debug!(from = %from, "Ignoring empty datagram");
                        continue;
                    }
                    return Some(batch);
                }
                // Transient on UDP (e.g. ICMP unreachable); keep listening.
                Err(e) => warn!(error = %e, "UDP receive error"),
            }
        }
    }
}
