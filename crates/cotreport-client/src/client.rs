use async_trait::async_trait;
use cotreport_core::config::TransportConfig;
use cotreport_core::ConnectionError;
use std::time::Duration;

/// Outcome of a connect attempt: an open link, or why there is none.
pub type ConnectResult<L> = Result<L, ConnectionError>;

/// Outcome of writing one message: fully written, or why not.
pub type WriteResult = Result<(), ConnectionError>;

/// Configuration for the outbound TAK connection
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote server address (`host:port`)
    pub server_addr: String,
    /// Connection timeout (None = wait for the OS)
    pub connect_timeout: Option<Duration>,
    /// Per-message write timeout (None = wait for the OS)
    pub write_timeout: Option<Duration>,
    /// Disable Nagle's algorithm
    pub nodelay: bool,
    /// TCP keepalive idle time (None = keepalive off)
    pub keepalive: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: String::new(),
            connect_timeout: Some(Duration::from_secs(10)),
            write_timeout: Some(Duration::from_secs(10)),
            nodelay: true,
            keepalive: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    /// Builds a client configuration from the transport section of the reporter config.
    pub fn from_transport(server_addr: impl Into<String>, transport: &TransportConfig) -> Self {
        Self {
            server_addr: server_addr.into(),
            connect_timeout: transport.connect_timeout(),
            write_timeout: transport.write_timeout(),
            nodelay: transport.nodelay,
            keepalive: transport.keepalive(),
        }
    }
}

/// Opens connections to the TAK server.
///
/// The forwarding session owns one connector and asks it for a fresh link
/// whenever it is disconnected.
#[async_trait]
pub trait Connector: Send {
    type Link: Link;

    /// Attempt a single connection. No retries happen here.
    async fn connect(&mut self) -> ConnectResult<Self::Link>;

    /// Address used in log lines.
    fn peer(&self) -> &str;
}

/// An open connection to the TAK server.
#[async_trait]
pub trait Link: Send {
    /// Write the whole of `data` or fail.
    async fn write_all(&mut self, data: &[u8]) -> WriteResult;

    /// Close the connection. Errors are ignored; the link is discarded anyway.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
        assert!(config.nodelay);
    }

    #[test]
    fn test_from_transport() {
        let transport = TransportConfig {
            connect_timeout_secs: 0,
            write_timeout_secs: 3,
            nodelay: false,
            keepalive_secs: 0,
        };

        let config = ClientConfig::from_transport("tak:8087", &transport);
        assert_eq!(config.server_addr, "tak:8087");
        assert_eq!(config.connect_timeout, None);
        assert_eq!(config.write_timeout, Some(Duration::from_secs(3)));
        assert!(!config.nodelay);
        assert_eq!(config.keepalive, None);
    }
}
