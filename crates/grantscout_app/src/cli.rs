use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::LogDestination;

/// Command-line client for the grantscout discovery/harvest backend.
#[derive(Debug, Parser)]
#[command(name = "grantscout", version, about)]
pub struct CliArgs {
    /// Base URL of the harvest API.
    #[arg(long, default_value = "http://localhost:3000/harvest")]
    pub base_url: String,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDest::File)]
    pub log: LogDest,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover candidate grant sources for a funder.
    Discover {
        funder_id: String,
        /// Seed link to include alongside the funder's website (repeatable).
        #[arg(long = "link")]
        links: Vec<String>,
        /// Traversal depth for the crawl.
        #[arg(long, default_value_t = 1)]
        depth: u32,
        /// Adopt the top N suggestions as configured sources on completion.
        #[arg(long)]
        adopt: Option<usize>,
    },
    /// Run a harvest for one configured source.
    Harvest {
        source_id: String,
        /// Funder the source belongs to.
        #[arg(long = "funder")]
        funder_id: String,
    },
    /// List the configured sources for a funder.
    Sources { funder_id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogDest {
    File,
    Terminal,
    Both,
}

impl From<LogDest> for LogDestination {
    fn from(dest: LogDest) -> Self {
        match dest {
            LogDest::File => LogDestination::File,
            LogDest::Terminal => LogDestination::Terminal,
            LogDest::Both => LogDestination::Both,
        }
    }
}
