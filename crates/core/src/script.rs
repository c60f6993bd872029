//! The `ScriptRunner` contract a worker calls on every check. The actual
//! browser-automation interpreter is an external collaborator (out of
//! scope for this crate); this only fixes the boundary it must honor.

/// Result of executing one watch's script.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub ok: bool,
    pub output: String,
}

/// Executes a textual script and reports success/failure plus captured
/// output. Implementations must never let a panic escape `run` — any
/// failure, including a caught exception-equivalent, should surface as
/// `ScriptOutcome { ok: false, .. }` rather than propagate.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: &str) -> ScriptOutcome;
}
