//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

pub mod frontend;
pub mod launch;

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use crate::commands::{BreakpointCommands, Commands};
use crate::common::{config::Config, Error, Result};
use crate::dap::{
    BreakpointSource, CustomBreakpoint, CustomRequest, CustomResponse, DapClient, Witness,
};
use crate::session::Bridge;

use frontend::ConsoleFrontend;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    let config = Config::load()?;

    match command {
        Commands::Launch { bind } => {
            let endpoint = bind.unwrap_or_else(|| config.bind.clone());

            match launch::launch(&config, &endpoint).await {
                Err(e) if e.is_notice() => {
                    println!("{} {}", "unavailable:".yellow().bold(), e);
                    Ok(())
                }
                Err(e) => Err(e),
                Ok(()) => {
                    println!("Debug backend starting on {}", endpoint);
                    Ok(())
                }
            }
        }

        Commands::Open { cdf, bind, print } => {
            let endpoint = bind.unwrap_or_else(|| config.bind.clone());
            let active = cdf.map(absolute).map(|p| p.display().to_string());

            let mut bridge = Bridge::connect(&config, &endpoint).await?;
            let mut frontend = ConsoleFrontend::new(active, bridge.provider().clone(), print);

            bridge.run(&mut frontend, 1).await?;

            if frontend.opened().is_empty() {
                println!("The CDF file embeds no sources");
            }

            bridge.close().await
        }

        Commands::Witness { cdf, id, bind } => {
            let endpoint = bind.unwrap_or_else(|| config.bind.clone());
            let mut client = load_cdf(&config, &endpoint, cdf).await?;

            let response = client.custom_request(&CustomRequest::Witness { id }).await?;
            client.disconnect().await?;

            match response {
                CustomResponse::Witness { witness } => {
                    print_witness(&witness);
                    Ok(())
                }
                other => Err(unexpected("witness", other)),
            }
        }

        Commands::Breakpoint(BreakpointCommands::Add {
            cdf,
            source,
            line,
            bind,
        }) => {
            let endpoint = bind.unwrap_or_else(|| config.bind.clone());
            let mut client = load_cdf(&config, &endpoint, cdf).await?;

            let breakpoint = CustomBreakpoint {
                source: Some(BreakpointSource { name: source }),
                line,
            };
            let response = client
                .custom_request(&CustomRequest::AddBreakpoint { breakpoint })
                .await?;
            client.disconnect().await?;

            match response {
                CustomResponse::AddBreakpoint { id } => {
                    println!("{} #{}", "breakpoint added:".green(), id);
                    Ok(())
                }
                other => Err(unexpected("addBreakpoint", other)),
            }
        }

        Commands::Breakpoint(BreakpointCommands::Remove { cdf, id, bind }) => {
            let endpoint = bind.unwrap_or_else(|| config.bind.clone());
            let mut client = load_cdf(&config, &endpoint, cdf).await?;

            let response = client
                .custom_request(&CustomRequest::RemoveBreakpoint { id })
                .await?;
            client.disconnect().await?;

            match response {
                CustomResponse::RemoveBreakpoint { id, removed: true } => {
                    println!("breakpoint #{} removed", id);
                    Ok(())
                }
                CustomResponse::RemoveBreakpoint { id, removed: false } => {
                    println!("{} breakpoint #{} wasn't removed", "warning:".yellow().bold(), id);
                    Ok(())
                }
                other => Err(unexpected("removeBreakpoint", other)),
            }
        }
    }
}

/// Connect, initialize and load `cdf` for a one-shot query
async fn load_cdf(config: &Config, endpoint: &str, cdf: PathBuf) -> Result<DapClient> {
    let timeout = Duration::from_secs(config.timeouts.connect_secs);
    let path = absolute(cdf).display().to_string();

    let mut client = DapClient::connect(endpoint, timeout).await?;
    client.initialize().await?;
    client
        .custom_request(&CustomRequest::LoadCdf { path: Some(path) })
        .await?;
    Ok(client)
}

fn unexpected(command: &str, response: CustomResponse) -> Error {
    Error::DapProtocol(format!("unexpected response to {}: {:?}", command, response))
}

/// The backend resolves paths relative to its own working directory
fn absolute(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

fn print_witness(witness: &Witness) {
    println!("Witness {}", witness.id);
    println!("  value:      {}", witness.value);
    match witness.constraint {
        Some(c) => println!("  constraint: {}", c),
        None => println!("  constraint: (none)"),
    }
    println!("  declared:   {}:{}", witness.source, witness.line);
}
