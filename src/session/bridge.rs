//! Session loop connecting a backend, the sequencer and a front-end

use std::time::Duration;

use crate::common::{config::Config, Error, Result};
use crate::dap::{DapClient, ProtocolMessage};
use crate::vfs::{ContentProvider, SourceRepository, SCHEME};

use super::host::Frontend;
use super::sequencer::{HandshakeState, Sequencer};

/// One debugging session against a CDF backend
///
/// Owns its repository, so concurrent bridges never share sources.
pub struct Bridge {
    client: DapClient,
    sequencer: Sequencer,
    provider: ContentProvider,
}

impl Bridge {
    /// Connect to the backend at `endpoint`
    #[tracing::instrument(skip(config))]
    pub async fn connect(config: &Config, endpoint: &str) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeouts.connect_secs);
        let client = DapClient::connect(endpoint, timeout).await?;
        Ok(Self::new(client))
    }

    /// Wrap a connected client with a fresh repository
    pub fn new(client: DapClient) -> Self {
        let repository = SourceRepository::new();
        let provider = ContentProvider::register(SCHEME, repository.clone());
        Self {
            client,
            sequencer: Sequencer::new(repository),
            provider,
        }
    }

    /// Provider serving this session's virtual documents
    pub fn provider(&self) -> &ContentProvider {
        &self.provider
    }

    pub fn repository(&self) -> &SourceRepository {
        self.sequencer.repository()
    }

    pub fn state(&self) -> HandshakeState {
        self.sequencer.state()
    }

    /// Start the session and dispatch backend messages until `rounds`
    /// handshakes have completed
    ///
    /// Handshake effects that fail are logged and the loop keeps going; only
    /// losing the connection ends it early.
    pub async fn run<F>(&mut self, frontend: &mut F, rounds: u64) -> Result<()>
    where
        F: Frontend + ?Sized,
    {
        self.client.initialize().await?;

        while self.sequencer.completed_rounds() < rounds {
            let message = self.client.read_message().await?;
            self.dispatch(&message, frontend).await;
        }

        tracing::debug!(
            rounds = self.sequencer.completed_rounds(),
            documents = self.repository().len(),
            "Handshake complete"
        );
        Ok(())
    }

    /// Feed one backend message to the sequencer
    pub async fn dispatch<F>(&mut self, message: &ProtocolMessage, frontend: &mut F)
    where
        F: Frontend + ?Sized,
    {
        if let ProtocolMessage::Response(response) = message {
            if !response.success {
                tracing::warn!(
                    command = %response.command,
                    reason = response.message.as_deref().unwrap_or("unknown error"),
                    "Backend rejected request"
                );
            }
        }

        if let Err(e) = self
            .sequencer
            .on_did_send_message(message, &mut self.client, frontend)
            .await
        {
            match e {
                Error::BackendCrashed | Error::Io(_) => {
                    tracing::error!(error = %e, "Lost connection while handling handshake");
                }
                _ => tracing::warn!(error = %e, "Handshake step failed"),
            }
        }
    }

    /// Disconnect from the backend
    pub async fn close(mut self) -> Result<()> {
        self.client.disconnect().await
    }
}
