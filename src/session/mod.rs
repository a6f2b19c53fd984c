//! Debugging sessions against a CDF backend
//!
//! A session loads the CDF file the user has focused, pulls the sources it
//! embeds into an in-memory repository, and opens them as virtual documents.

mod bridge;
mod host;
pub mod sequencer;

pub use bridge::Bridge;
pub use host::{DebugSession, Frontend, ShowOptions};
pub use sequencer::{HandshakeState, Sequencer};
