//! CLI command definitions

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the debug backend unless one is already listening
    Launch {
        /// Endpoint to bind the backend to (host:port); overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Load a CDF file and open the sources it embeds
    Open {
        /// CDF file to load; omitted means the backend decides
        cdf: Option<PathBuf>,

        /// Backend endpoint (host:port); overrides the config file
        #[arg(long)]
        bind: Option<String>,

        /// Print document contents instead of listing them
        #[arg(long, short)]
        print: bool,
    },

    /// Show the internal data of a witness
    Witness {
        /// CDF file to load
        cdf: PathBuf,

        /// Witness id
        id: usize,

        /// Backend endpoint (host:port); overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Breakpoint management
    #[command(subcommand)]
    Breakpoint(BreakpointCommands),
}

#[derive(Subcommand)]
pub enum BreakpointCommands {
    /// Add a breakpoint
    Add {
        /// CDF file to load
        cdf: PathBuf,

        /// Source name; it doesn't have to be an exact match
        source: String,

        /// Line within the source
        line: Option<u64>,

        /// Backend endpoint (host:port); overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Remove a breakpoint
    Remove {
        /// CDF file to load
        cdf: PathBuf,

        /// Breakpoint ID to remove
        id: u64,

        /// Backend endpoint (host:port); overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },
}
