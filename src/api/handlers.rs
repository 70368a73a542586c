use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::types::{
    AddEventRequest, ClockResponse, ConfirmQuery, DeleteEventResponse, EditMinutesRequest,
    PlayheadReport, PossessionResponse, ReleaseResponse, SeekResponse, SetHalfRequest,
    SetPossessionRequest,
};
use crate::console::{MatchConsole, MatchSnapshot};
use crate::shared::{AppError, AppState};
use crate::stats::MatchStats;
use crate::timeline::MatchEvent;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "role": state.consoles.role(),
        "consoles": state.consoles.loaded_count().await,
    }))
}

async fn console(state: &AppState, match_id: &str) -> Result<Arc<MatchConsole>, AppError> {
    Ok(state.consoles.get_or_load(match_id).await?.console)
}

pub async fn get_state(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchSnapshot>, AppError> {
    let console = console(&state, &match_id).await?;
    Ok(Json(console.snapshot().await))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchStats>, AppError> {
    let console = console(&state, &match_id).await?;
    Ok(Json(console.stats()))
}

pub async fn add_event(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(request): Json<AddEventRequest>,
) -> Result<(StatusCode, Json<MatchEvent>), AppError> {
    let console = console(&state, &match_id).await?;
    let event = console
        .add_event(request.event_type, request.team, request.player_id)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path((match_id, event_id)): Path<(String, Uuid)>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<DeleteEventResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    let deleted = console
        .delete_event(event_id, query.confirm.into())
        .await?
        .is_some();
    Ok(Json(DeleteEventResponse { deleted }))
}

pub async fn toggle_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<ClockResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    console.toggle_clock().await?;
    clock_response(&console, true).await
}

pub async fn reset_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<ClockResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    let applied = console.reset_clock(query.confirm.into()).await?;
    clock_response(&console, applied).await
}

pub async fn edit_minutes(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(request): Json<EditMinutesRequest>,
) -> Result<Json<ClockResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    let applied = console
        .edit_minutes(&request.minutes.as_input())
        .await?
        .is_some();
    clock_response(&console, applied).await
}

pub async fn set_half(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(request): Json<SetHalfRequest>,
) -> Result<Json<ClockResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    console.set_half(request.half).await?;
    clock_response(&console, true).await
}

async fn clock_response(
    console: &MatchConsole,
    applied: bool,
) -> Result<Json<ClockResponse>, AppError> {
    Ok(Json(ClockResponse {
        applied,
        clock: console.snapshot().await.clock,
    }))
}

pub async fn set_possession(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(request): Json<SetPossessionRequest>,
) -> Result<Json<PossessionResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    let changed = console.set_possession(request.team).await?;
    Ok(Json(PossessionResponse {
        changed,
        possession: console.snapshot().await.possession,
    }))
}

pub async fn report_playhead(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(report): Json<PlayheadReport>,
) -> Result<StatusCode, AppError> {
    let managed = state.consoles.get_or_load(&match_id).await?;
    managed.playhead.report(report.seconds);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn seek_to_event(
    State(state): State<AppState>,
    Path((match_id, event_id)): Path<(String, Uuid)>,
) -> Result<Json<SeekResponse>, AppError> {
    let console = console(&state, &match_id).await?;
    let video_timestamp = console.seek_to_event(event_id).await?;
    Ok(Json(SeekResponse { video_timestamp }))
}

pub async fn leave(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Json<ReleaseResponse> {
    let released = state.consoles.release(&match_id).await;
    info!(match_id = %match_id, released = released, "Console leave requested");
    Json(ReleaseResponse { released })
}
