//! Huddle management handlers.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::http::error::ApiError;
use crate::http::request::{require, CreateHuddleRequest, EndHuddleRequest, MembershipRequest};
use crate::http::response::{CreatedHuddle, HuddleList, HuddleSummary, MessageResponse};
use crate::http::server::AppState;
use crate::huddle::HuddleId;
use crate::observability::metrics::{self, HuddleEvent};

/// A string that is not a UUID can never name an active huddle.
fn parse_huddle_id(raw: &str) -> Result<HuddleId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("huddle not found".to_string()))
}

pub async fn create_huddle(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<CreatedHuddle>), ApiError> {
    let request: CreateHuddleRequest = require(body)?;
    let huddle = state.registry.create(&request.created_by);

    tracing::info!(
        huddle_id = %huddle.id,
        channel_name = %huddle.channel_name,
        created_by = %huddle.created_by,
        "Huddle created"
    );
    metrics::record_huddle_event(HuddleEvent::Created);
    metrics::record_active_huddles(state.registry.len());

    Ok((
        StatusCode::CREATED,
        Json(CreatedHuddle::new(&huddle, state.issuer.app_id())),
    ))
}

pub async fn join_huddle(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: MembershipRequest = require(body)?;
    let id = parse_huddle_id(&request.huddle_id)?;
    if state.registry.join(&id, &request.user_id)? {
        tracing::info!(huddle_id = %id, user_id = %request.user_id, "Joined huddle");
        metrics::record_huddle_event(HuddleEvent::Joined);
    }

    Ok(Json(MessageResponse::new("Successfully joined huddle")))
}

pub async fn leave_huddle(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: MembershipRequest = require(body)?;
    let id = parse_huddle_id(&request.huddle_id)?;
    state.registry.leave(&id, &request.user_id)?;

    tracing::info!(huddle_id = %id, user_id = %request.user_id, "Left huddle");
    metrics::record_huddle_event(HuddleEvent::Left);

    Ok(Json(MessageResponse::new("Successfully left huddle")))
}

pub async fn end_huddle(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: EndHuddleRequest = require(body)?;
    let id = parse_huddle_id(&request.huddle_id)?;
    let ended = state.registry.end(&id)?;

    tracing::info!(
        huddle_id = %ended.id,
        channel_name = %ended.channel_name,
        participants = ended.participant_count(),
        "Huddle ended"
    );
    metrics::record_huddle_event(HuddleEvent::Ended);
    metrics::record_active_huddles(state.registry.len());

    Ok(Json(MessageResponse::new("Huddle ended successfully")))
}

pub async fn end_huddle_by_channel(
    State(state): State<AppState>,
    Path(channel_name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let ended = state.registry.end_by_channel(&channel_name)?;

    tracing::info!(
        huddle_id = %ended.id,
        channel_name = %ended.channel_name,
        participants = ended.participant_count(),
        "Huddle ended"
    );
    metrics::record_huddle_event(HuddleEvent::Ended);
    metrics::record_active_huddles(state.registry.len());

    Ok(Json(MessageResponse::new("Huddle ended successfully")))
}

pub async fn list_huddles(State(state): State<AppState>) -> Json<HuddleList> {
    let huddles = state
        .registry
        .list()
        .into_iter()
        .map(HuddleSummary::from)
        .collect();
    Json(HuddleList { huddles })
}
