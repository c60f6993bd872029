//! The Supervisor (`WorkerSet`, §4.4): the registry and control surface
//! over all worker proxies. Spawns proxies, enforces at-most-one proxy
//! per watch id, serves `add/remove/restart/check_now/status`, and runs
//! a manager thread that multiplexes the building-flag channel with a
//! zombie-reaping watchdog.

mod proxy;
mod supervisor;

pub use proxy::WorkerProxy;
pub use supervisor::{Supervisor, WorkerStatus};

/// Messages a worker or the manager thread itself posts onto the
/// supervisor's manager queue. Replaces the source's dynamic
/// `("name", args)` tuples with a tagged variant (§9 design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerMsg {
    Start(i64),
    End(i64),
    Quit,
}
