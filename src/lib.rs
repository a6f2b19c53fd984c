//! CDF debug bridge
//!
//! Client side of the circuit debug file (CDF) backend: launches the backend,
//! drives the Debug Adapter Protocol handshake that loads a CDF file, and
//! serves the sources it embeds as read-only virtual documents.

pub mod cli;
pub mod commands;
pub mod common;
pub mod dap;
pub mod session;
pub mod vfs;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use session::{Bridge, HandshakeState};
pub use vfs::{ContentProvider, DocumentUri, SourceRepository};
