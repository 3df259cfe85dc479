use crate::adapter::{entries_to_batch, CalendarEntry};
use crate::date::{parse_date_list, CanonicalDate};
use crate::engine::ProgressiveEngine;
use crate::errors::AppError;
use crate::models::{
    ActiveDatesQuery, BatchLoadResponse, CalculationConfig, CalculationConfigPatch, CellView,
    DateRecord, DayWriteRequest, HistoryQuery, ObservationInput, PerformanceMetrics,
    ProgressiveStoreSnapshot, RecalcOutcome, SellInResponse,
};
use crate::state::AppState;
use crate::storage::persist_snapshot;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DateRecord>, AppError> {
    let date: CanonicalDate = date.parse()?;
    let engine = state.engine.lock().await;
    engine
        .get_record(date)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no data for {date}")))
}

pub async fn put_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<DayWriteRequest>,
) -> Result<Json<RecalcOutcome>, AppError> {
    let date = CanonicalDate::parse_lenient(&date)?;
    let observations = payload
        .observations
        .into_iter()
        .map(ObservationInput::into_observation)
        .collect();

    let mut engine = state.engine.lock().await;
    let outcome = engine.update_and_recalculate(date, observations)?;
    persist(&state, &engine).await?;

    Ok(Json(outcome))
}

pub async fn delete_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DateRecord>, AppError> {
    let date: CanonicalDate = date.parse()?;
    let mut engine = state.engine.lock().await;
    let removed = engine
        .remove(date)
        .ok_or_else(|| AppError::not_found(format!("no data for {date}")))?;
    persist(&state, &engine).await?;

    Ok(Json(removed))
}

pub async fn get_display(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<CellView>, AppError> {
    let date: CanonicalDate = date.parse()?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.get_cell_display(date)))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DateRecord>>, AppError> {
    let start: CanonicalDate = query.start.parse()?;
    let end: CanonicalDate = query.end.parse()?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.get_history(start, end)))
}

pub async fn get_total_sell_in(
    State(state): State<AppState>,
    Query(query): Query<ActiveDatesQuery>,
) -> Result<Json<SellInResponse>, AppError> {
    let active = active_dates(&query)?;
    let engine = state.engine.lock().await;
    Ok(Json(SellInResponse {
        sell_in: engine.get_total_sell_in(active.as_deref()),
    }))
}

pub async fn get_monthly_sell_in(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<ActiveDatesQuery>,
) -> Result<Json<SellInResponse>, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("month must be between 1 and 12"));
    }
    let active = active_dates(&query)?;
    let engine = state.engine.lock().await;
    Ok(Json(SellInResponse {
        sell_in: engine.get_monthly_sell_in(year, month, active.as_deref()),
    }))
}

pub async fn get_config(State(state): State<AppState>) -> Json<CalculationConfig> {
    let engine = state.engine.lock().await;
    Json(engine.config())
}

pub async fn patch_config(
    State(state): State<AppState>,
    Json(patch): Json<CalculationConfigPatch>,
) -> Result<Json<CalculationConfig>, AppError> {
    let mut engine = state.engine.lock().await;
    let config = engine.update_config(patch);
    persist(&state, &engine).await?;
    Ok(Json(config))
}

pub async fn get_metrics(State(state): State<AppState>) -> Json<PerformanceMetrics> {
    let engine = state.engine.lock().await;
    Json(engine.get_performance_metrics())
}

pub async fn reset_metrics(State(state): State<AppState>) -> StatusCode {
    let mut engine = state.engine.lock().await;
    engine.reset_performance_metrics();
    StatusCode::NO_CONTENT
}

pub async fn export_state(State(state): State<AppState>) -> Json<ProgressiveStoreSnapshot> {
    let engine = state.engine.lock().await;
    Json(engine.export_state())
}

pub async fn import_state(
    State(state): State<AppState>,
    Json(snapshot): Json<ProgressiveStoreSnapshot>,
) -> Result<Json<ProgressiveStoreSnapshot>, AppError> {
    let mut engine = state.engine.lock().await;
    engine.import_state(snapshot)?;
    persist(&state, &engine).await?;
    Ok(Json(engine.export_state()))
}

pub async fn load_calendar_entries(
    State(state): State<AppState>,
    Json(entries): Json<Vec<CalendarEntry>>,
) -> Result<Json<BatchLoadResponse>, AppError> {
    let (batch, skipped_entries) = entries_to_batch(&entries);
    let loaded_days = batch.len();

    let mut engine = state.engine.lock().await;
    let report = engine.load_batch(batch)?;
    persist(&state, &engine).await?;
    info!(loaded_days, skipped_entries, "calendar entries loaded");

    Ok(Json(BatchLoadResponse {
        loaded_days,
        skipped_entries,
        first_date: engine.first_date(),
        warnings: report.warnings,
    }))
}

fn active_dates(query: &ActiveDatesQuery) -> Result<Option<Vec<CanonicalDate>>, AppError> {
    match query.active.as_deref() {
        Some(raw) => Ok(Some(parse_date_list(raw)?)),
        None => Ok(None),
    }
}

async fn persist(state: &AppState, engine: &ProgressiveEngine) -> Result<(), AppError> {
    persist_snapshot(&state.data_path, &engine.export_state()).await
}
