//! DAP client for talking to a CDF debug backend over TCP
//!
//! Requests are written without waiting: the handshake reacts to whatever
//! the backend sends next, so responses are read back through
//! [`DapClient::read_message`] by the session loop. One-shot queries use
//! [`DapClient::custom_request`] instead.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::common::{parse_endpoint, Error, Result};

use super::codec;
use super::types::*;

/// DAP client connected to a debug backend
pub struct DapClient {
    /// Endpoint the client is connected to
    endpoint: String,
    /// Buffered reader for the backend's messages
    reader: BufReader<OwnedReadHalf>,
    /// Buffered writer for our requests
    writer: BufWriter<OwnedWriteHalf>,
    /// Sequence number for requests
    seq: AtomicI64,
}

impl DapClient {
    /// Connect to a backend listening on `endpoint` (`host:port`)
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self> {
        parse_endpoint(endpoint)?;

        let stream = tokio::time::timeout(timeout, TcpStream::connect(endpoint))
            .await
            .map_err(|_| {
                Error::BackendUnreachable(format!(
                    "timed out after {}s connecting to {}",
                    timeout.as_secs(),
                    endpoint
                ))
            })?
            .map_err(|e| Error::BackendUnreachable(format!("{}: {}", endpoint, e)))?;

        tracing::debug!(endpoint, "Connected to debug backend");
        Ok(Self::from_stream(endpoint, stream))
    }

    /// Wrap an already connected stream
    pub fn from_stream(endpoint: &str, stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self {
            endpoint: endpoint.to_string(),
            reader: BufReader::new(read),
            writer: BufWriter::new(write),
            seq: AtomicI64::new(1),
        }
    }

    /// Endpoint this client is connected to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Send a request and return its sequence number
    pub async fn send_request(&mut self, command: &str, arguments: Option<Value>) -> Result<i64> {
        let seq = self.next_seq();
        let request = ProtocolMessage::Request(RequestMessage {
            seq,
            command: command.to_string(),
            arguments,
        });

        let json = serde_json::to_string(&request)?;
        tracing::trace!(target: "cdf_debug::dap", ">>> {}", json);
        codec::write_message(&mut self.writer, &json).await?;

        Ok(seq)
    }

    /// Read the next message from the backend
    pub async fn read_message(&mut self) -> Result<ProtocolMessage> {
        let json = codec::read_message(&mut self.reader).await?;
        tracing::trace!(target: "cdf_debug::dap", "<<< {}", json);
        serde_json::from_str(&json).map_err(|e| Error::DapProtocol(format!("Invalid message: {}", e)))
    }

    /// Send the `initialize` request
    pub async fn initialize(&mut self) -> Result<i64> {
        let args = serde_json::to_value(InitializeArguments::default())?;
        self.send_request("initialize", Some(args)).await
    }

    /// Send a custom CDF request
    pub async fn custom(&mut self, request: &CustomRequest) -> Result<i64> {
        tracing::debug!(command = request.name(), "Sending custom request");
        self.send_request(CUSTOM_COMMAND, Some(request.to_arguments()))
            .await
    }

    /// Send a `restart` request; it takes no arguments
    pub async fn restart(&mut self) -> Result<i64> {
        self.send_request("restart", None).await
    }

    /// Send a `disconnect` request without waiting for an answer
    pub async fn disconnect(&mut self) -> Result<()> {
        let _ = self.send_request("disconnect", None).await;
        Ok(())
    }

    /// Send a custom request and wait for its response
    ///
    /// Events and unrelated responses read in the meantime are dropped.
    pub async fn custom_request(&mut self, request: &CustomRequest) -> Result<CustomResponse> {
        let seq = self.custom(request).await?;

        loop {
            match self.read_message().await? {
                ProtocolMessage::Response(response) if response.request_seq == seq => {
                    if !response.success {
                        return Err(Error::dap_request_failed(
                            request.name(),
                            response.message.as_deref().unwrap_or("Unknown error"),
                        ));
                    }
                    return CustomResponse::try_from(response.body.as_ref());
                }
                other => {
                    tracing::trace!(command = ?other.command(), "Skipping message while awaiting response");
                }
            }
        }
    }
}
