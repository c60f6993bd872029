//! The watch data model (§3 of the contract this crate implements).

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentryError};
use crate::status::Status;

/// A named, scheduled script plus its notification policy and latest
/// status. Mirrors the `twills` table column-for-column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    pub id: i64,
    pub name: String,
    pub interval: i64,
    pub script: String,
    pub emails: String,
    pub status: Status,
    /// Last-check epoch seconds. `None` iff `status == Unknown`.
    pub time: Option<i64>,
    /// `None` disables reminders entirely.
    pub reminder_interval: Option<i64>,
    /// Epoch seconds of the last notification sent.
    pub last_alert: Option<i64>,
}

impl Watch {
    /// `"YYYY-MM-DD HH:MM:SS UTC"`, or `None` if never checked.
    pub fn formatted_time(&self) -> Option<String> {
        self.time.map(|t| {
            Utc.timestamp_opt(t, 0)
                .single()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default()
        })
    }

    /// Recipients parsed out of the comma-joined `emails` column: split on
    /// `,`, trim whitespace, drop empties.
    pub fn recipients(&self) -> Vec<String> {
        self.emails
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether a reminder should fire given the current tick time, per the
    /// state-machine table: null `reminder_interval` disables reminders;
    /// otherwise due when never alerted, or the gap since the last alert
    /// exceeds the interval.
    pub fn reminder_due(&self, now: i64) -> bool {
        match self.reminder_interval {
            None => false,
            Some(interval) => match self.last_alert {
                None => true,
                Some(last) => now - last > interval,
            },
        }
    }
}

/// Fields accepted when the control plane creates a watch. `status` starts
/// at `Unknown`, `time`/`last_alert` start unset — the worker fills those
/// in on the first check.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWatch {
    pub name: String,
    pub interval: i64,
    pub script: String,
    pub emails: String,
    pub reminder_interval: Option<i64>,
}

/// Fields the control plane may rewrite via `update` (disjoint from the
/// columns a worker's `update_status` touches).
#[derive(Debug, Clone, Deserialize)]
pub struct WatchUpdate {
    pub name: String,
    pub interval: i64,
    pub script: String,
    pub emails: String,
    pub reminder_interval: Option<i64>,
}

/// Validates the fields a control plane submits for a new or edited watch.
/// Uniqueness of `name` is enforced by the store (it owns the single
/// source of truth for what names already exist).
pub fn validate_fields(name: &str, interval: i64, script: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SentryError::Validation("name must not be empty".into()));
    }
    if interval <= 0 {
        return Err(SentryError::Validation(
            "interval must be a positive integer".into(),
        ));
    }
    if script.trim().is_empty() {
        return Err(SentryError::Validation("script must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch(status: Status, time: Option<i64>, reminder_interval: Option<i64>, last_alert: Option<i64>) -> Watch {
        Watch {
            id: 1,
            name: "cs".into(),
            interval: 60,
            script: "noop".into(),
            emails: "a@x, , b@y ,".into(),
            status,
            time,
            reminder_interval,
            last_alert,
        }
    }

    #[test]
    fn recipients_trims_and_drops_empties() {
        let w = watch(Status::Unknown, None, None, None);
        assert_eq!(w.recipients(), vec!["a@x".to_string(), "b@y".to_string()]);
    }

    #[test]
    fn recipients_empty_string_yields_no_recipients() {
        let mut w = watch(Status::Unknown, None, None, None);
        w.emails = String::new();
        assert!(w.recipients().is_empty());
    }

    #[test]
    fn reminder_never_due_when_interval_unset() {
        let w = watch(Status::Failed, Some(1000), None, None);
        assert!(!w.reminder_due(100_000));
    }

    #[test]
    fn reminder_due_on_first_alert() {
        let w = watch(Status::Failed, Some(1000), Some(300), None);
        assert!(w.reminder_due(1000));
    }

    #[test]
    fn reminder_due_after_interval_elapses() {
        let w = watch(Status::Failed, Some(1000), Some(300), Some(500));
        assert!(!w.reminder_due(700));
        assert!(w.reminder_due(801));
    }

    #[test]
    fn formatted_time_is_none_when_unchecked() {
        let w = watch(Status::Unknown, None, None, None);
        assert_eq!(w.formatted_time(), None);
    }

    #[test]
    fn formatted_time_renders_utc() {
        let w = watch(Status::Ok, Some(0), None, None);
        assert_eq!(
            w.formatted_time(),
            Some("1970-01-01 00:00:00 UTC".to_string())
        );
    }

    #[test]
    fn validate_rejects_empty_name() {
        assert!(validate_fields("", 60, "script").is_err());
    }

    #[test]
    fn validate_rejects_non_positive_interval() {
        assert!(validate_fields("name", 0, "script").is_err());
        assert!(validate_fields("name", -1, "script").is_err());
    }

    #[test]
    fn validate_rejects_empty_script() {
        assert!(validate_fields("name", 60, "").is_err());
    }

    #[test]
    fn validate_accepts_sane_input() {
        assert!(validate_fields("name", 60, "script").is_ok());
    }
}
