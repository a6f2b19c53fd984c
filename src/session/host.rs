//! Seams between the sequencer and its surroundings
//!
//! The sequencer never touches a socket or a UI directly. It issues requests
//! through [`DebugSession`] and drives the editor through [`Frontend`].

use async_trait::async_trait;

use crate::common::Result;
use crate::dap::{CustomRequest, DapClient};
use crate::vfs::DocumentUri;

/// How a document is shown in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowOptions {
    /// Preview editors are replaced by the next open; persistent ones stay
    pub preview: bool,
}

impl ShowOptions {
    pub const PERSISTENT: Self = Self { preview: false };
}

/// Outbound side of a debugging session
#[async_trait]
pub trait DebugSession: Send {
    /// Issue a custom request; its answer arrives as a later message
    async fn custom_request(&mut self, request: CustomRequest) -> Result<()>;

    /// Ask the backend to restart the session
    async fn restart(&mut self) -> Result<()>;
}

/// The editing surface hosting the debugging session
#[async_trait]
pub trait Frontend: Send {
    /// Path of the document currently focused, if any
    fn active_document(&self) -> Option<String>;

    /// Open a virtual document, resolving once the editor shows it
    async fn open_document(&mut self, uri: &DocumentUri, options: ShowOptions) -> Result<()>;
}

#[async_trait]
impl DebugSession for DapClient {
    async fn custom_request(&mut self, request: CustomRequest) -> Result<()> {
        self.custom(&request).await.map(|_| ())
    }

    async fn restart(&mut self) -> Result<()> {
        DapClient::restart(self).await.map(|_| ())
    }
}
