//! Debug Adapter Protocol (DAP) implementation
//!
//! Client side of DAP as spoken by the CDF debug backend: framing, message
//! types including the custom command set, and a TCP client.

pub mod client;
pub mod codec;
pub mod types;

pub use client::DapClient;
pub use types::*;
