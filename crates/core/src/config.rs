//! Configuration sourced from the environment (and an optional `.env`).
//!
//! Keys mirror the ones the core contract consumes directly: `sqlite.file`,
//! `mail.from`, `mail.mode`, and friends become `SQLITE_FILE`, `MAIL_FROM`,
//! `MAIL_MODE` once uppercased and dotted segments become underscores.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load `.env` file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

impl Config {
    /// Build config from environment variables. Call [`load_dotenv`] first
    /// if a `.env` file should be consulted.
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            storage: StorageConfig::from_env(),
            mail: MailConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  server:  host={} port={}",
            self.server.host,
            self.server.port
        );
        tracing::info!(
            "  storage: sqlite.file={}",
            self.storage.sqlite_file.display()
        );
        tracing::info!("  mail:    mode={:?} from={}", self.mail.mode, self.mail.from);
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 8080),
            cors_origin: env_or("CORS_ORIGIN", "*"),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `sqlite.file` — path to the persistent store.
    pub sqlite_file: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            sqlite_file: PathBuf::from(env_or("SQLITE_FILE", "data/sentrywatch.sqlite3")),
        }
    }
}

// ── Mail ──────────────────────────────────────────────────────

/// Selects and configures the notification transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// `mail.from` — sender address.
    pub from: String,
    /// `mail.mode` — `smtp` or `sendmail`.
    pub mode: MailMode,
    pub smtp: SmtpConfig,
    pub sendmail_command: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailMode {
    Smtp,
    Sendmail,
}

impl std::str::FromStr for MailMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smtp" => Ok(MailMode::Smtp),
            "sendmail" => Ok(MailMode::Sendmail),
            other => Err(format!("invalid mail.mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub login: Option<String>,
    pub password: Option<String>,
    pub usetls: bool,
}

impl MailConfig {
    fn from_env() -> Self {
        let mode = env_opt("MAIL_MODE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(MailMode::Sendmail);

        Self {
            from: env_or("MAIL_FROM", "watchdog@localhost"),
            mode,
            smtp: SmtpConfig {
                server: env_or("MAIL_SMTP_SERVER", "localhost"),
                port: env_u16("MAIL_SMTP_PORT", 587),
                login: env_opt("MAIL_SMTP_LOGIN"),
                password: env_opt("MAIL_SMTP_PASSWORD"),
                usetls: env_or("MAIL_SMTP_USETLS", "true") == "true",
            },
            sendmail_command: env_or("MAIL_SENDMAIL_COMMAND", "/usr/sbin/sendmail"),
        }
    }
}
