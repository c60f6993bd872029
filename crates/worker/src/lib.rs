//! The per-watch worker process (§4.2). A worker owns exactly one watch:
//! it opens its own store handle, runs a single-threaded command loop
//! with a timeout equal to the watch's interval, and performs a check on
//! every timeout or queued `Execute` command. It exits cleanly on `Quit`.
//!
//! The worker never talks to its `Supervisor` directly — there is no
//! shared memory across the process boundary. Commands arrive as JSON
//! lines on stdin; `Start`/`End` events are emitted as JSON lines on
//! stdout for the owning `WorkerProxy` to translate onto the manager
//! queue (see [`ipc`] and the Design Note on cross-process callbacks).

pub mod ipc;
pub mod runner;

use std::io::{stdin, stdout, BufReader};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::Utc;

use sentrywatch_core::config::Config;
use sentrywatch_core::error::{Result, SentryError};
use sentrywatch_core::script::ScriptRunner;
use sentrywatch_core::status::Status;
use sentrywatch_core::watch::Watch;
use sentrywatch_notify::{create_mailer, Mailer};
use sentrywatch_store::Store;

use ipc::{Command, WorkerEvent};

/// Process main for one watch. Blocks until `Quit` is received or the
/// command pipe closes. `runner` is injected so callers can swap in a
/// richer script interpreter; the CLI's default binds [`runner::ShellScriptRunner`].
pub fn run(id: i64, config: &Config, runner: &dyn ScriptRunner) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SentryError::Internal(format!("failed to start worker runtime: {e}")))?;

    // Step 1 of the process main: no handle is ever inherited in this
    // design (the supervisor re-execs a fresh binary rather than forking),
    // so simply opening our own handle here already satisfies it.
    let store = rt.block_on(Store::connect(&config.storage.sqlite_file))?;

    // Step 2: load the watch, exit cleanly if it is gone.
    let mut watch = match rt.block_on(store.load(id))? {
        Some(w) => w,
        None => {
            tracing::warn!(id, "watch not found at worker startup, exiting");
            return Ok(());
        }
    };

    let mailer = create_mailer(&config.mail)?;

    let (tx, rx) = mpsc::channel::<Command>();
    thread::spawn(move || {
        let mut reader = BufReader::new(stdin());
        loop {
            match ipc::read_line::<_, Command>(&mut reader) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
                None => return,
            }
        }
    });

    let mut stdout_handle = stdout();

    loop {
        let interval = Duration::from_secs(watch.interval.max(1) as u64);
        match rx.recv_timeout(interval) {
            Ok(Command::Quit) => {
                tracing::info!(id, "worker received quit");
                break;
            }
            Ok(Command::Execute) | Err(RecvTimeoutError::Timeout) => {
                if let Err(e) = execute(
                    &rt,
                    &store,
                    &mut watch,
                    runner,
                    mailer.as_ref(),
                    &config.mail.from,
                    &mut stdout_handle,
                ) {
                    tracing::error!(id, error = %e, "check failed, continuing to next tick");
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!(id, "command pipe closed, exiting");
                break;
            }
        }
    }

    Ok(())
}

/// The check procedure (§4.2 steps 1-8).
#[allow(clippy::too_many_arguments)]
fn execute(
    rt: &tokio::runtime::Runtime,
    store: &Store,
    watch: &mut Watch,
    runner: &dyn ScriptRunner,
    mailer: &dyn Mailer,
    mail_from: &str,
    stdout_handle: &mut impl std::io::Write,
) -> Result<()> {
    let _ = ipc::write_event(stdout_handle, WorkerEvent::Start { id: watch.id });

    // `on_twill_end` must fire in all paths (§4.2 step 8), including a
    // store error partway through the check — mirrors the original's
    // `finally: on_end()` around this same sequence. Run the fallible
    // body to completion (or first error) before emitting `End`, rather
    // than letting `?` return early and skip it.
    let result = (|| -> Result<()> {
        let outcome = runner.run(&watch.script);
        let new_status = Status::from_script_ok(outcome.ok);
        let now = Utc::now().timestamp();
        let old_status = watch.status;

        watch.status = new_status;
        watch.time = Some(now);
        rt.block_on(store.update_status(watch.id, new_status, watch.time, watch.last_alert))?;

        let changed = old_status != new_status;
        let reminder_due = watch.reminder_due(now);

        if changed || (reminder_due && new_status == Status::Failed) {
            let recipients = watch.recipients();
            if !recipients.is_empty() {
                let subject = if changed {
                    format!(
                        "Watch {} status change {} -> {}",
                        watch.name, old_status, new_status
                    )
                } else {
                    format!("Watch {} status is still {}", watch.name, new_status)
                };
                let body = format!("Script:\n{}\n\nResult:\n{}", watch.script, outcome.output);

                if let Err(e) = mailer.send(mail_from, &recipients, &subject, &body) {
                    tracing::error!(id = watch.id, error = %e, "notification failed");
                }
            }

            // Fidelity with the original behavior: the status row is
            // written a second time to persist last_alert, even though it
            // could be coalesced into the first write above.
            watch.last_alert = Some(now);
            rt.block_on(store.update_status(watch.id, new_status, watch.time, watch.last_alert))?;
        }

        Ok(())
    })();

    let _ = ipc::write_event(stdout_handle, WorkerEvent::End { id: watch.id });
    result
}
