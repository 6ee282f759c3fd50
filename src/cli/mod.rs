use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(version, about = "Launches Spark jobs on Kubernetes and lists people in space")]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub(crate) subcommand: SubCommands,

    /// YAML config file. Built-in defaults are used when omitted.
    #[clap(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum SubCommands {
    /// Run the HTTP job submitter service
    Serve {},

    /// Print everyone currently in space
    Astronauts {},
}
