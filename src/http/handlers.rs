//! REST handlers for fitness records.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;
use crate::records::date;
use crate::records::{FitnessRecord, RecordStore, Upserted};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
}

#[derive(Debug, Deserialize)]
pub struct RawQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub records: usize,
    pub backend: String,
}

/// GET /api/fitness and /api/fitness/all
pub async fn list_records(State(state): State<AppState>) -> Json<Vec<FitnessRecord>> {
    state.store.ensure_loaded().await;
    Json(state.store.all())
}

/// GET /api/fitness/{date}
pub async fn get_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<FitnessRecord>, ApiError> {
    state.store.ensure_loaded().await;
    find(&state, &date)
}

/// GET /get?date=YYYY-MM-DD, defaulting to today
pub async fn get_raw(
    State(state): State<AppState>,
    Query(query): Query<RawQuery>,
) -> Result<Json<FitnessRecord>, ApiError> {
    state.store.ensure_loaded().await;
    let date = query
        .date
        .filter(|d| !d.is_empty())
        .unwrap_or_else(date::today);
    find(&state, &date)
}

/// GET /api/fitness/year/{year}
pub async fn get_by_year(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> Result<Json<Vec<FitnessRecord>>, ApiError> {
    let year = parse_year(&year)?;
    state.store.ensure_loaded().await;
    Ok(Json(state.store.by_year(year)))
}

/// GET /api/fitness/year/{year}/month/{month}
pub async fn get_by_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> Result<Json<Vec<FitnessRecord>>, ApiError> {
    let year = parse_year(&year)?;
    let month = date::parse_month(&month)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid month {:?}", month)))?;
    state.store.ensure_loaded().await;
    Ok(Json(state.store.by_month(year, month)))
}

/// POST /api/fitness
///
/// The body is parsed as JSON regardless of `Content-Type`, so plain
/// `curl -d @day.json` works.
pub async fn upsert_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<FitnessRecord>), ApiError> {
    let record: FitnessRecord = serde_json::from_slice(&body)?;
    if date::parse_date(&record.date).is_none() {
        return Err(ApiError::BadRequest(format!(
            "date {:?} is not a YYYY-MM-DD date",
            record.date
        )));
    }

    let status = match state.store.upsert(record.clone()).await {
        Upserted::Created => StatusCode::CREATED,
        Upserted::Replaced => StatusCode::OK,
    };
    Ok((status, Json(record)))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        records: state.store.len(),
        backend: state.store.backend_name().to_string(),
    })
}

fn find(state: &AppState, date: &str) -> Result<Json<FitnessRecord>, ApiError> {
    state
        .store
        .by_date(date)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no record for {}", date)))
}

fn parse_year(year: &str) -> Result<i32, ApiError> {
    date::parse_year(year).ok_or_else(|| ApiError::BadRequest(format!("invalid year {:?}", year)))
}
