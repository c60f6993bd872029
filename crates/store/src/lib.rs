//! Durable table of watches keyed by integer id (§4.1).
//!
//! Each operation commits on success and leaves the store unchanged on
//! failure. `Store` wraps a `SqlitePool`, so a single handle is already
//! safe to share across threads in the control-plane process; the worker
//! process opens its own handle from configuration instead of inheriting
//! one (see `Store::connect`).

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use sentrywatch_core::error::SentryError;
use sentrywatch_core::status::Status;
use sentrywatch_core::watch::{NewWatch, Watch, WatchUpdate};

const COLUMNS: &str = "id, name, interval, script, emails, status, time, reminder_interval, last_alert";

fn store_err(e: sqlx::Error) -> SentryError {
    SentryError::Store(e.to_string())
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens a fresh connection pool against `sqlite.file`, creating the
    /// database file if it doesn't exist yet.
    pub async fn connect(sqlite_file: &Path) -> Result<Self, SentryError> {
        let options = SqliteConnectOptions::new()
            .filename(sqlite_file)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(store_err)?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    /// Idempotent: creates the schema only if absent.
    pub async fn create_tables(&self) -> Result<(), SentryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SentryError::Store(e.to_string()))
    }

    fn row_to_watch(row: &sqlx::sqlite::SqliteRow) -> Result<Watch, SentryError> {
        let status_str: String = row.try_get("status").map_err(store_err)?;
        let status =
            Status::from_str(&status_str).map_err(|e| SentryError::Internal(format!("corrupt status column: {e}")))?;

        Ok(Watch {
            id: row.try_get("id").map_err(store_err)?,
            name: row.try_get("name").map_err(store_err)?,
            interval: row.try_get("interval").map_err(store_err)?,
            script: row.try_get("script").map_err(store_err)?,
            emails: row.try_get("emails").map_err(store_err)?,
            status,
            time: row.try_get("time").map_err(store_err)?,
            reminder_interval: row.try_get("reminder_interval").map_err(store_err)?,
            last_alert: row.try_get("last_alert").map_err(store_err)?,
        })
    }

    /// Inserts a new watch (status starts `UNKNOWN`, no check time yet)
    /// and returns its assigned id.
    pub async fn insert(&self, watch: &NewWatch) -> Result<i64, SentryError> {
        let result = sqlx::query(
            "INSERT INTO watches (name, interval, script, emails, status, time, reminder_interval, last_alert)
             VALUES (?, ?, ?, ?, ?, NULL, ?, NULL)",
        )
        .bind(&watch.name)
        .bind(watch.interval)
        .bind(&watch.script)
        .bind(&watch.emails)
        .bind(Status::Unknown.as_str())
        .bind(watch.reminder_interval)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.last_insert_rowid())
    }

    /// Rewrites every definition column. Never touches `status`/`time`/
    /// `last_alert` — those are the worker's exclusive domain.
    pub async fn update(&self, id: i64, fields: &WatchUpdate) -> Result<(), SentryError> {
        let result = sqlx::query(
            "UPDATE watches SET name = ?, interval = ?, script = ?, emails = ?, reminder_interval = ?
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(fields.interval)
        .bind(&fields.script)
        .bind(&fields.emails)
        .bind(fields.reminder_interval)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(SentryError::Registry(id));
        }
        Ok(())
    }

    /// Rewrites only `status`, `time`, `last_alert` — the columns a
    /// worker's check may mutate. Never touches the watch's definition.
    pub async fn update_status(
        &self,
        id: i64,
        status: Status,
        time: Option<i64>,
        last_alert: Option<i64>,
    ) -> Result<(), SentryError> {
        sqlx::query("UPDATE watches SET status = ?, time = ?, last_alert = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(time)
            .bind(last_alert)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), SentryError> {
        sqlx::query("DELETE FROM watches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    pub async fn load(&self, id: i64) -> Result<Option<Watch>, SentryError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM watches WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(Self::row_to_watch).transpose()
    }

    pub async fn load_by_name(&self, name: &str) -> Result<Option<Watch>, SentryError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM watches WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(Self::row_to_watch).transpose()
    }

    /// Ordered by `name` ascending.
    pub async fn load_all(&self) -> Result<Vec<Watch>, SentryError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM watches ORDER BY name"))
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        rows.iter().map(Self::row_to_watch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentrywatch_core::watch::NewWatch;

    async fn test_store() -> Store {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite3");
        // keep the tempdir alive for the duration of the test process by leaking it;
        // tests run in short-lived processes so this is harmless.
        std::mem::forget(dir);
        Store::connect(&path).await.unwrap()
    }

    fn watch(name: &str) -> NewWatch {
        NewWatch {
            name: name.to_string(),
            interval: 60,
            script: "check".to_string(),
            emails: "a@x.com".to_string(),
            reminder_interval: Some(600),
        }
    }

    #[tokio::test]
    async fn insert_then_load_round_trips() {
        let store = test_store().await;
        let id = store.insert(&watch("cs")).await.unwrap();
        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "cs");
        assert_eq!(loaded.interval, 60);
        assert_eq!(loaded.status, Status::Unknown);
        assert_eq!(loaded.time, None);
        assert_eq!(loaded.last_alert, None);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_by_the_database() {
        let store = test_store().await;
        store.insert(&watch("cs")).await.unwrap();
        let err = store.insert(&watch("cs")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn load_all_is_ordered_by_name() {
        let store = test_store().await;
        store.insert(&watch("charlie")).await.unwrap();
        store.insert(&watch("alice")).await.unwrap();
        store.insert(&watch("bob")).await.unwrap();

        let names: Vec<String> = store.load_all().await.unwrap().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["alice", "bob", "charlie"]);
    }

    #[tokio::test]
    async fn update_status_does_not_touch_definition_columns() {
        let store = test_store().await;
        let id = store.insert(&watch("cs")).await.unwrap();

        store.update_status(id, Status::Failed, Some(100), Some(100)).await.unwrap();

        let reloaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, Status::Failed);
        assert_eq!(reloaded.time, Some(100));
        assert_eq!(reloaded.last_alert, Some(100));
        assert_eq!(reloaded.name, "cs");
        assert_eq!(reloaded.script, "check");
        assert_eq!(reloaded.emails, "a@x.com");
        assert_eq!(reloaded.reminder_interval, Some(600));
    }

    #[tokio::test]
    async fn update_rewrites_definition_but_not_status() {
        let store = test_store().await;
        let id = store.insert(&watch("cs")).await.unwrap();
        store.update_status(id, Status::Failed, Some(100), Some(100)).await.unwrap();

        store
            .update(
                id,
                &WatchUpdate {
                    name: "cs".into(),
                    interval: 120,
                    script: "new-script".into(),
                    emails: "b@y.com".into(),
                    reminder_interval: None,
                },
            )
            .await
            .unwrap();

        let reloaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(reloaded.script, "new-script");
        assert_eq!(reloaded.interval, 120);
        assert_eq!(reloaded.reminder_interval, None);
        // status/time untouched by a definition edit
        assert_eq!(reloaded.status, Status::Failed);
        assert_eq!(reloaded.time, Some(100));
    }

    #[tokio::test]
    async fn delete_removes_the_watch() {
        let store = test_store().await;
        let id = store.insert(&watch("cs")).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_by_name_finds_existing_watch() {
        let store = test_store().await;
        store.insert(&watch("cs")).await.unwrap();
        let found = store.load_by_name("cs").await.unwrap();
        assert!(found.is_some());
        assert!(store.load_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_tables_is_idempotent() {
        let store = test_store().await;
        store.create_tables().await.unwrap();
        store.create_tables().await.unwrap();
    }
}
