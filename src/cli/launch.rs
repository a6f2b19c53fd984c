//! Backend launching
//!
//! Makes sure exactly one backend listens on the configured endpoint: probe
//! first, spawn only when nothing answers.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tokio::net::TcpStream;

use crate::common::{config::Config, parse_endpoint, Error, Result};

/// Check that nothing is listening on `endpoint`
///
/// A successful connection means a backend is already running and yields
/// [`Error::PortUnavailable`]. Any connection failure counts as free.
pub async fn probe(endpoint: &str, timeout: Duration) -> Result<()> {
    parse_endpoint(endpoint)?;

    match tokio::time::timeout(timeout, TcpStream::connect(endpoint)).await {
        Ok(Ok(_)) => Err(Error::PortUnavailable(endpoint.to_string())),
        Ok(Err(e)) => {
            tracing::debug!(endpoint, error = %e, "Endpoint is free");
            Ok(())
        }
        Err(_) => {
            tracing::debug!(endpoint, "Probe timed out, treating endpoint as free");
            Ok(())
        }
    }
}

/// Probe `endpoint` and start the backend there if it is free
pub async fn launch(config: &Config, endpoint: &str) -> Result<()> {
    probe(endpoint, Duration::from_secs(config.timeouts.connect_secs)).await?;

    let exe = config.backend_executable()?;
    let mut cmd = backend_command(config, &exe, endpoint);

    tracing::info!(
        backend = %exe.display(),
        endpoint,
        terminal = ?config.backend.terminal,
        "Starting debug backend"
    );

    if config.backend.terminal.is_empty() {
        detach(&mut cmd);
    }

    cmd.spawn()
        .map_err(|e| Error::SpawnFailed(format!("{}: {}", exe.display(), e)))?;

    Ok(())
}

/// Build the command line starting the backend on `endpoint`
///
/// With a terminal configured the backend runs inside it; otherwise it is
/// started directly.
pub fn backend_command(config: &Config, exe: &Path, endpoint: &str) -> Command {
    let mut cmd = match config.backend.terminal.split_first() {
        Some((terminal, terminal_args)) => {
            let mut cmd = Command::new(terminal);
            cmd.args(terminal_args).arg(exe);
            cmd
        }
        None => Command::new(exe),
    };

    cmd.args(&config.backend.args).arg("--bind").arg(endpoint);
    cmd
}

/// Run the backend in its own process group so it outlives this CLI
fn detach(cmd: &mut Command) {
    cmd.stdin(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_CONSOLE: u32 = 0x00000010;
        cmd.creation_flags(CREATE_NEW_CONSOLE);
    }
}
