//! Default `ScriptRunner`: hands the watch's script to the platform
//! shell and captures its output. The browser-automation interpreter
//! itself is an external collaborator (§1); this is the fallback used
//! whenever no richer runner is wired in.

use std::process::Command;

use sentrywatch_core::script::{ScriptOutcome, ScriptRunner};

pub struct ShellScriptRunner;

impl ScriptRunner for ShellScriptRunner {
    fn run(&self, script: &str) -> ScriptOutcome {
        let result = Command::new("/bin/sh").arg("-c").arg(script).output();

        match result {
            Ok(output) => {
                let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
                if !output.stderr.is_empty() {
                    captured.push_str(&String::from_utf8_lossy(&output.stderr));
                }
                ScriptOutcome {
                    ok: output.status.success(),
                    output: captured,
                }
            }
            Err(e) => ScriptOutcome {
                ok: false,
                output: format!("failed to spawn script: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_success_and_captures_stdout() {
        let outcome = ShellScriptRunner.run("echo hello");
        assert!(outcome.ok);
        assert!(outcome.output.contains("hello"));
    }

    #[test]
    fn reports_failure_on_nonzero_exit() {
        let outcome = ShellScriptRunner.run("exit 1");
        assert!(!outcome.ok);
    }
}
