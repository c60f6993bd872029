//! SMTP mailer via `lettre`'s blocking transport, selected by
//! `mail.mode = smtp` and configured by the `mail.smtp.*` keys.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use sentrywatch_core::config::SmtpConfig;
use sentrywatch_core::error::SentryError;

use crate::Mailer;

pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, SentryError> {
        let mut builder = if config.usetls {
            SmtpTransport::starttls_relay(&config.server)
                .map_err(|e| SentryError::Transport(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(&config.server)
        };
        builder = builder.port(config.port);

        if let (Some(login), Some(password)) = (&config.login, &config.password) {
            builder = builder.credentials(Credentials::new(login.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, from: &str, to: &[String], subject: &str, body: &str) -> Result<(), SentryError> {
        let from_mailbox: Mailbox = from
            .parse()
            .map_err(|e| SentryError::Transport(format!("invalid sender address: {e}")))?;

        let mut message_builder = Message::builder().from(from_mailbox);
        for recipient in to {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| SentryError::Transport(format!("invalid recipient address `{recipient}`: {e}")))?;
            message_builder = message_builder.to(mailbox);
        }

        let email = message_builder
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| SentryError::Transport(e.to_string()))?;

        self.transport
            .send(&email)
            .map_err(|e| SentryError::Transport(e.to_string()))?;

        tracing::info!(channel = "smtp", %subject, recipients = to.len(), "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            server: "smtp.example.com".into(),
            port: 587,
            login: None,
            password: None,
            usetls: true,
        }
    }

    #[test]
    fn builds_from_valid_config() {
        assert!(SmtpMailer::from_config(&config()).is_ok());
    }

    #[test]
    fn builds_without_tls() {
        let mut cfg = config();
        cfg.usetls = false;
        assert!(SmtpMailer::from_config(&cfg).is_ok());
    }
}
