use crate::client::{ClientConfig, ConnectResult, Connector, Link, WriteResult};
use async_trait::async_trait;
use cotreport_core::ConnectionError;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Plain TCP connector for TAK server CoT input ports.
///
/// Messages go out as raw XML documents with no framing; the server splits
/// the stream on `</event>`.
pub struct TcpConnector {
    config: ClientConfig,
}

impl TcpConnector {
    /// Create a new TCP connector
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Configure TCP socket options
    fn configure_socket(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nodelay(self.config.nodelay)?;

        if let Some(idle) = self.config.keepalive {
            let keepalive = socket2::TcpKeepalive::new().with_time(idle);
            let socket = socket2::SockRef::from(stream);
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Link = TcpLink;

    #[instrument(skip(self), fields(addr = %self.config.server_addr))]
    async fn connect(&mut self) -> ConnectResult<TcpLink> {
        let addr = self.config.server_addr.as_str();
        let attempt = TcpStream::connect(addr);

        let stream = match self.config.connect_timeout {
            Some(limit) => timeout(limit, attempt).await.map_err(|_| {
                ConnectionError::ConnectTimeout {
                    addr: addr.to_string(),
                    timeout_secs: limit.as_secs(),
                }
            })?,
            None => attempt.await,
        }
        .map_err(|e| ConnectionError::connect_failed(addr, e))?;

        // Socket options are tuning only; a failure here does not fail the connect.
        if let Err(e) = self.configure_socket(&stream) {
            warn!(error = %e, "Failed to configure TCP socket options");
        }

        debug!("TCP connection established");

        Ok(TcpLink {
            stream,
            write_timeout: self.config.write_timeout,
        })
    }

    fn peer(&self) -> &str {
        &self.config.server_addr
    }
}

/// An established TCP connection.
pub struct TcpLink {
    stream: TcpStream,
    write_timeout: Option<std::time::Duration>,
}

#[async_trait]
impl Link for TcpLink {
    async fn write_all(&mut self, data: &[u8]) -> WriteResult {
        let limit = self.write_timeout;
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(data).await?;
            stream.flush().await
        };

        match limit {
            Some(limit) => timeout(limit, write)
                .await
                .map_err(|_| ConnectionError::WriteTimeout {
                    timeout_secs: limit.as_secs(),
                })?,
            None => write.await,
        }
        .map_err(classify_write_error)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Error shutting down TCP stream");
        }
    }
}

fn classify_write_error(error: io::Error) -> ConnectionError {
    match error.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::WriteZero => ConnectionError::ConnectionClosed {
            reason: error.to_string(),
        },
        _ => ConnectionError::write_failed(error),
    }
}
