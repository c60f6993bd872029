//! `Supervisor` (`WorkerSet`): the registry, its mutex, and the manager
//! thread (§4.4). The two logical maps the contract describes — `id →
//! WorkerProxy` and `id → building` — are folded into a single
//! `HashMap<i64, WorkerEntry>` so registry consistency (§8 property 1)
//! holds by construction rather than by convention.

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sentrywatch_core::config::Config;
use sentrywatch_core::error::Result;

use crate::proxy::WorkerProxy;
use crate::ManagerMsg;

const MANAGER_TIMEOUT: Duration = Duration::from_secs(60);

struct WorkerEntry {
    proxy: WorkerProxy,
    building: bool,
}

struct Inner {
    registry: Mutex<HashMap<i64, WorkerEntry>>,
    config: Config,
    worker_exe: String,
    manager_tx: Sender<ManagerMsg>,
    manager_thread: Mutex<Option<JoinHandle<()>>>,
}

/// A read-only snapshot used by the control plane's status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStatus {
    pub alive: bool,
    pub building: bool,
}

/// Cheaply cloneable handle — every clone shares the same registry and
/// manager thread.
#[derive(Clone)]
pub struct Supervisor(Arc<Inner>);

impl Supervisor {
    /// Starts the manager thread immediately; there is no separate
    /// "start" step once a `Supervisor` exists.
    pub fn new(config: Config, worker_exe: String) -> Self {
        let (tx, rx) = channel();
        let inner = Arc::new(Inner {
            registry: Mutex::new(HashMap::new()),
            config,
            worker_exe,
            manager_tx: tx,
            manager_thread: Mutex::new(None),
        });
        let supervisor = Self(inner);
        let handle = supervisor.clone().spawn_manager_thread(rx);
        *supervisor.0.manager_thread.lock().unwrap() = Some(handle);
        supervisor
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    /// Idempotent: a second `add` for an id already present is a no-op.
    pub fn add(&self, id: i64) -> Result<()> {
        let mut registry = self.0.registry.lock().unwrap();
        if registry.contains_key(&id) {
            return Ok(());
        }
        let proxy = WorkerProxy::start(id, &self.0.worker_exe, self.0.manager_tx.clone())?;
        registry.insert(id, WorkerEntry { proxy, building: false });
        Ok(())
    }

    /// Idempotent: removing an absent id is a no-op. Holds the registry
    /// mutex across `quit` + `join` so a concurrent `add` never observes
    /// a half-removed entry (§5 concurrency model).
    pub fn remove(&self, id: i64) -> Result<()> {
        let mut registry = self.0.registry.lock().unwrap();
        if let Some(entry) = registry.remove(&id) {
            entry.proxy.quit()?;
            entry.proxy.join();
        }
        Ok(())
    }

    pub fn restart(&self, id: i64) -> Result<()> {
        self.remove(id)?;
        self.add(id)
    }

    /// Restarts to recover a possibly-dead worker, then marks it
    /// building ahead of the worker actually starting its check — the
    /// flag covers the window between the channel post and the worker
    /// acting on it.
    pub fn check_now(&self, id: i64) -> Result<()> {
        self.restart(id)?;
        let mut registry = self.0.registry.lock().unwrap();
        if let Some(entry) = registry.get_mut(&id) {
            entry.building = true;
            entry.proxy.execute()?;
        }
        Ok(())
    }

    pub fn is_alive(&self, id: i64) -> bool {
        self.0
            .registry
            .lock()
            .unwrap()
            .get(&id)
            .map(|e| e.proxy.is_alive())
            .unwrap_or(false)
    }

    pub fn is_building(&self, id: i64) -> bool {
        self.0.registry.lock().unwrap().get(&id).map(|e| e.building).unwrap_or(false)
    }

    pub fn status(&self, id: i64) -> Option<WorkerStatus> {
        self.0.registry.lock().unwrap().get(&id).map(|e| WorkerStatus {
            alive: e.proxy.is_alive(),
            building: e.building,
        })
    }

    /// Stops the manager thread. Existing proxies are left running —
    /// callers must `remove` them for a clean shutdown.
    pub fn finish(&self) {
        let _ = self.0.manager_tx.send(ManagerMsg::Quit);
        if let Some(handle) = self.0.manager_thread.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn set_building(&self, id: i64, value: bool) {
        let mut registry = self.0.registry.lock().unwrap();
        if let Some(entry) = registry.get_mut(&id) {
            entry.building = value;
        }
    }

    /// Collects ids whose proxy is no longer alive, then restarts each
    /// outside the registry lock (restart re-acquires it itself).
    fn reap_and_restart_dead(&self) {
        let dead: Vec<i64> = {
            let registry = self.0.registry.lock().unwrap();
            registry
                .iter()
                .filter(|(_, entry)| !entry.proxy.is_alive())
                .map(|(id, _)| *id)
                .collect()
        };
        for id in dead {
            tracing::warn!(id, "worker process is dead, restarting");
            if let Err(e) = self.restart(id) {
                tracing::error!(id, error = %e, "failed to restart dead worker");
            }
        }
    }

    fn spawn_manager_thread(self, rx: Receiver<ManagerMsg>) -> JoinHandle<()> {
        thread::spawn(move || loop {
            match rx.recv_timeout(MANAGER_TIMEOUT) {
                Ok(ManagerMsg::Quit) => break,
                Ok(ManagerMsg::Start(id)) => self.set_building(id, true),
                Ok(ManagerMsg::End(id)) => self.set_building(id, false),
                Err(RecvTimeoutError::Timeout) => self.reap_and_restart_dead(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentrywatch_core::config::{MailConfig, MailMode, ServerConfig, SmtpConfig, StorageConfig};
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                cors_origin: "*".into(),
            },
            storage: StorageConfig {
                sqlite_file: PathBuf::from(":memory:"),
            },
            mail: MailConfig {
                from: "watchdog@localhost".into(),
                mode: MailMode::Sendmail,
                smtp: SmtpConfig {
                    server: "localhost".into(),
                    port: 25,
                    login: None,
                    password: None,
                    usetls: false,
                },
                sendmail_command: "/bin/true".into(),
            },
        }
    }

    /// A worker exe that is guaranteed to fail to spawn, so these tests
    /// exercise registry bookkeeping without needing a real process tree.
    fn unspawnable_supervisor() -> Supervisor {
        Supervisor::new(test_config(), "/nonexistent/sentrywatch-cli".into())
    }

    #[test]
    fn add_on_an_unspawnable_binary_leaves_the_registry_untouched() {
        let sup = unspawnable_supervisor();
        assert!(sup.add(1).is_err());
        assert!(!sup.is_alive(1));
        assert!(!sup.is_building(1));
        assert!(sup.status(1).is_none());
    }

    #[test]
    fn remove_of_absent_id_is_a_harmless_noop() {
        let sup = unspawnable_supervisor();
        assert!(sup.remove(42).is_ok());
        assert!(sup.remove(42).is_ok());
    }

    #[test]
    fn finish_stops_the_manager_thread() {
        let sup = unspawnable_supervisor();
        sup.finish();
    }
}
