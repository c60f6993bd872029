//! CLI argument parsing and subcommand dispatch.

use clap::{Parser, Subcommand};

/// sentrywatch — supervises scheduled browser-automation checks and
/// alerts on state changes.
#[derive(Parser, Debug)]
#[command(name = "sentrywatch", about = "Watch supervisor and control plane")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Start the HTTP control plane and the supervisor for all registered watches.
    Serve,
    /// Internal worker entry point. The supervisor re-execs this binary with this
    /// subcommand to start one watch's process; not meant to be invoked directly.
    #[command(name = "worker-main", hide = true)]
    WorkerMain {
        #[arg(long)]
        id: i64,
    },
}
