//! Notification transport used by a worker on state transitions and
//! reminders (§4.2, §6 `mail.*` config keys).
//!
//! Out of scope: the mailer is a synchronous collaborator — the worker
//! calls `Mailer::send` and blocks on the result, exactly as it blocks on
//! the script runner.

pub mod sendmail;
pub mod smtp;

use sentrywatch_core::error::SentryError;

/// Sends a single e-mail. Implementations must return an error rather
/// than panic so the worker can log-and-continue per the error policy.
pub trait Mailer: Send + Sync {
    fn send(&self, from: &str, to: &[String], subject: &str, body: &str) -> Result<(), SentryError>;
}

/// Builds the mailer selected by `mail.mode`.
pub fn create_mailer(config: &sentrywatch_core::config::MailConfig) -> Result<Box<dyn Mailer>, SentryError> {
    match config.mode {
        sentrywatch_core::config::MailMode::Smtp => Ok(Box::new(smtp::SmtpMailer::from_config(&config.smtp)?)),
        sentrywatch_core::config::MailMode::Sendmail => {
            Ok(Box::new(sendmail::SendmailMailer::new(config.sendmail_command.clone())))
        }
    }
}
