//! `WorkerProxy` — the supervisor-side handle for one worker OS process
//! (§4.3). Holds the command channel (the child's stdin) and the process
//! handle; a background thread drains the child's stdout and turns its
//! `Start`/`End` events into `ManagerMsg`s on the supervisor's queue.

use std::io::BufReader;
use std::process::{Child, Command as OsCommand, Stdio};
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::thread;

use sentrywatch_core::error::{Result, SentryError};
use sentrywatch_worker::ipc::{self, Command, WorkerEvent};

use crate::ManagerMsg;

/// Supervisor-side handle for one worker process. Never started twice;
/// `start` consumes it into a live state and returns the same value.
pub struct WorkerProxy {
    id: i64,
    child: Mutex<Child>,
}

impl WorkerProxy {
    /// Spawns `worker_exe worker-main --id <id>` with piped stdio and
    /// wires a reader thread that forwards the child's events onto
    /// `manager_tx`. Per the cross-process-callbacks design note, the
    /// `on_twill_start`/`on_twill_end` callbacks are not closures handed
    /// to the child — they are this translation from stdout events to
    /// queue messages, bound once at construction time.
    pub fn start(id: i64, worker_exe: &str, manager_tx: Sender<ManagerMsg>) -> Result<Self> {
        let mut child = OsCommand::new(worker_exe)
            .args(["worker-main", "--id", &id.to_string()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SentryError::Internal(format!("failed to spawn worker {id}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SentryError::Internal("worker child has no stdout pipe".into()))?;

        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            loop {
                match ipc::read_line::<_, WorkerEvent>(&mut reader) {
                    Some(WorkerEvent::Start { id }) => {
                        if manager_tx.send(ManagerMsg::Start(id)).is_err() {
                            return;
                        }
                    }
                    Some(WorkerEvent::End { id }) => {
                        if manager_tx.send(ManagerMsg::End(id)).is_err() {
                            return;
                        }
                    }
                    None => return,
                }
            }
        });

        Ok(Self {
            id,
            child: Mutex::new(child),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    fn queue_command(&self, command: Command) -> Result<()> {
        let mut child = self.child.lock().unwrap();
        let stdin = child
            .stdin
            .as_mut()
            .ok_or_else(|| SentryError::Internal(format!("worker {} has no stdin pipe", self.id)))?;
        ipc::write_command(stdin, command)
            .map_err(|e| SentryError::Internal(format!("failed to signal worker {}: {e}", self.id)))
    }

    pub fn execute(&self) -> Result<()> {
        self.queue_command(Command::Execute)
    }

    pub fn quit(&self) -> Result<()> {
        self.queue_command(Command::Quit)
    }

    /// True iff the process handle exists and has not exited. Reaps the
    /// child if it has, so a dead worker is reported at most once.
    pub fn is_alive(&self) -> bool {
        let mut child = self.child.lock().unwrap();
        matches!(child.try_wait(), Ok(None))
    }

    /// Waits for the process to exit after `quit` has been sent.
    pub fn join(&self) {
        let _ = self.child.lock().unwrap().wait();
    }
}
