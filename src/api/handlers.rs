use super::error::ApiError;
use super::protocol::ValueEnvelope;
use crate::storage::{Record, RecordStore};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

/// The store as injected into every handler.
pub type SharedStore = Arc<dyn RecordStore>;

pub async fn handle_get_all(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Vec<Record>>, ApiError> {
    tracing::info!(op = "GET", "GET all");
    let records = store.get_all().await?;
    tracing::debug!("GET all returned {} records", records.len());
    Ok(Json(records))
}

/// A missing id answers `200` with a JSON `null`, not `404`.
pub async fn handle_get_by_id(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Option<Record>>, ApiError> {
    tracing::info!(op = "GET", id = %id, "GET {}", id);
    let record = store.get_by_id(&id).await?;
    if record.is_none() {
        tracing::debug!("GET {}: no such record", id);
    }
    Ok(Json(record))
}

/// The record id is generated here; callers never choose it.
pub async fn handle_create(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<ValueEnvelope>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(envelope) = payload?;
    let id = Uuid::new_v4().to_string();
    tracing::info!(op = "POST", id = %id, "POST {} {}", id, envelope.value);

    store.create(&id, &envelope.value).await?;
    Ok(StatusCode::OK)
}

pub async fn handle_update(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
    payload: Result<Json<ValueEnvelope>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(envelope) = payload?;
    tracing::info!(op = "PUT", id = %id, "PUT {} {}", id, envelope.value);

    if !store.update(&id, &envelope.value).await? {
        tracing::debug!("PUT {}: no such record, nothing updated", id);
    }
    Ok(StatusCode::OK)
}

pub async fn handle_delete(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    tracing::info!(op = "DELETE", id = %id, "DELETE {}", id);

    if !store.delete(&id).await? {
        tracing::debug!("DELETE {}: no such record", id);
    }
    Ok(StatusCode::OK)
}
