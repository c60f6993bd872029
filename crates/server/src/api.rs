//! HTTP handlers (§6). Translates requests into `Store`/`Supervisor`
//! operations; no HTML rendering or form handling lives here — JSON in,
//! JSON out.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use sentrywatch_core::error::SentryError;
use sentrywatch_core::watch::{validate_fields, NewWatch, Watch, WatchUpdate};
use sentrywatch_core::Status;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_watches(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Watch>>, ApiError> {
    Ok(Json(state.store.load_all().await?))
}

pub async fn create_watch(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<NewWatch>,
) -> Result<Json<Watch>, ApiError> {
    validate_fields(&fields.name, fields.interval, &fields.script)?;
    if state.store.load_by_name(&fields.name).await?.is_some() {
        return Err(SentryError::Validation(format!("a watch named `{}` already exists", fields.name)).into());
    }
    let id = state.store.insert(&fields).await?;
    state.supervisor.add(id)?;
    let watch = state.store.load(id).await?.ok_or(SentryError::Registry(id))?;
    Ok(Json(watch))
}

pub async fn update_watch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(fields): Json<WatchUpdate>,
) -> Result<Json<Watch>, ApiError> {
    validate_fields(&fields.name, fields.interval, &fields.script)?;
    state.store.update(id, &fields).await?;
    state.supervisor.restart(id)?;
    let watch = state.store.load(id).await?.ok_or(SentryError::Registry(id))?;
    Ok(Json(watch))
}

pub async fn delete_watch(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    state.supervisor.remove(id)?;
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restart_watch(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    state.supervisor.restart(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stop_watch(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    state.supervisor.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_now(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    state.supervisor.check_now(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Per-watch status report (§6): `{id, name, status, time, alive, building}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReport {
    pub id: i64,
    pub name: String,
    pub status: Status,
    pub time: Option<String>,
    pub alive: bool,
    pub building: bool,
}

pub async fn watch_status(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<Json<StatusReport>, ApiError> {
    let watch = state.store.load(id).await?.ok_or(SentryError::Registry(id))?;
    let worker_status = state.supervisor.status(id);

    Ok(Json(StatusReport {
        id: watch.id,
        name: watch.name,
        status: watch.status,
        time: watch.formatted_time(),
        alive: worker_status.map(|s| s.alive).unwrap_or(false),
        building: worker_status.map(|s| s.building).unwrap_or(false),
    }))
}
