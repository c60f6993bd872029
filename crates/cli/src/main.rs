mod cli;

use clap::Parser;

use sentrywatch_core::config::{load_dotenv, Config};
use sentrywatch_core::watch::Watch;
use sentrywatch_server::AppState;
use sentrywatch_store::Store;
use sentrywatch_supervisor::Supervisor;
use sentrywatch_worker::runner::ShellScriptRunner;

use cli::{Cli, CliCommand};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).with_level(true).init();
    load_dotenv();
    let config = Config::from_env();

    match Cli::parse().command {
        CliCommand::Serve => serve(config),
        CliCommand::WorkerMain { id } => worker_main(id, config),
    }
}

/// Loads every watch, re-registers its worker, then hands control to the
/// HTTP control plane. Workers already running from a previous process
/// are not assumed to exist — this process owns spawning them all.
fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    let worker_exe = std::env::current_exe()?.to_string_lossy().into_owned();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let store = Store::connect(&config.storage.sqlite_file).await?;
        let watches: Vec<Watch> = store.load_all().await?;

        let supervisor = Supervisor::new(config.clone(), worker_exe);
        for watch in &watches {
            supervisor.add(watch.id)?;
        }

        let state = AppState::new(store, supervisor);
        sentrywatch_server::serve(&config.server, state).await?;
        Ok::<(), anyhow::Error>(())
    })
}

/// Entry point for a re-exec'd worker process (§4.2 process main).
fn worker_main(id: i64, config: Config) -> anyhow::Result<()> {
    sentrywatch_worker::run(id, &config, &ShellScriptRunner)?;
    Ok(())
}
