//! Sendmail mailer: hands the message to an external MTA binary via its
//! stdin, selected by `mail.mode = sendmail` and `mail.sendmail.command`.

use std::io::Write;
use std::process::{Command, Stdio};

use sentrywatch_core::error::SentryError;

use crate::Mailer;

pub struct SendmailMailer {
    command: String,
}

impl SendmailMailer {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

impl Mailer for SendmailMailer {
    fn send(&self, from: &str, to: &[String], subject: &str, body: &str) -> Result<(), SentryError> {
        if to.is_empty() {
            return Ok(());
        }

        let recipients = to.join(", ");
        let message = format!("From: {from}\nTo: {recipients}\nSubject: {subject}\n\n{body}\n");

        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| SentryError::Transport("mail.sendmail.command is empty".into()))?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SentryError::Transport(format!("failed to spawn `{program}`: {e}")))?;

        child
            .stdin
            .take()
            .expect("piped stdin")
            .write_all(message.as_bytes())
            .map_err(|e| SentryError::Transport(format!("failed to write to `{program}` stdin: {e}")))?;

        let output = child
            .wait_with_output()
            .map_err(|e| SentryError::Transport(format!("failed waiting on `{program}`: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SentryError::Transport(format!(
                "`{program}` exited with {}: {stderr}",
                output.status
            )));
        }

        tracing::info!(channel = "sendmail", %subject, recipients = to.len(), "notification delivered");
        Ok(())
    }
}
