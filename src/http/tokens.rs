//! Token handlers with automatic huddle tracking.
//!
//! RTC and combined requests resolve the channel's huddle (creating it on
//! first use) and record the caller as a participant before signing. Every
//! path and query parameter is checked first, so a malformed request leaves
//! the registry untouched.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::credentials::{expires_in, CredentialRequest, Role, Subject};
use crate::http::error::ApiError;
use crate::http::request::{ExpiryQuery, TokenPath};
use crate::http::response::{RtcTokenResponse, RteTokenResponse, RtmTokenResponse};
use crate::http::server::AppState;
use crate::huddle::Huddle;
use crate::observability::metrics::{self, HuddleEvent};

/// Parsed RTC token parameters.
struct RtcParams {
    subject: Subject,
    role: Role,
    expires_at: u32,
}

impl RtcParams {
    fn parse(path: &TokenPath, query: &ExpiryQuery, default_ttl: u32) -> Result<Self, ApiError> {
        let ttl = query.ttl_secs(default_ttl)?;
        Ok(Self {
            subject: Subject::parse(&path.token_type, &path.uid)?,
            role: Role::from_path(&path.role),
            expires_at: expires_in(ttl),
        })
    }
}

/// Ensure the channel has a huddle and that `uid` is recorded in it.
fn track_participant(state: &AppState, channel_name: &str, uid: &str) -> Huddle {
    let (huddle, created) = state.registry.get_or_create(channel_name, uid);
    if created {
        tracing::info!(
            huddle_id = %huddle.id,
            channel_name = %channel_name,
            created_by = %uid,
            "Huddle created on first token request"
        );
        metrics::record_huddle_event(HuddleEvent::Created);
        metrics::record_active_huddles(state.registry.len());
    }

    if state.registry.join_by_channel(channel_name, uid) {
        tracing::debug!(
            huddle_id = %huddle.id,
            channel_name = %channel_name,
            user_id = %uid,
            "Participant tracked for token request"
        );
        metrics::record_huddle_event(HuddleEvent::Joined);
    }

    huddle
}

pub async fn rtc_token(
    State(state): State<AppState>,
    Path(path): Path<TokenPath>,
    Query(query): Query<ExpiryQuery>,
) -> Result<Json<RtcTokenResponse>, ApiError> {
    let params = RtcParams::parse(&path, &query, state.default_expiry_secs)?;
    let huddle = track_participant(&state, &path.channel_name, &path.uid);

    let rtc_token = state.issue(&CredentialRequest::rtc(
        &path.channel_name,
        params.subject,
        params.role,
        params.expires_at,
    ))?;

    Ok(Json(RtcTokenResponse {
        rtc_token,
        channel_name: path.channel_name,
        huddle_id: huddle.id.to_string(),
        app_id: state.issuer.app_id().to_string(),
    }))
}

pub async fn rtm_token(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Query(query): Query<ExpiryQuery>,
) -> Result<Json<RtmTokenResponse>, ApiError> {
    let ttl = query.ttl_secs(state.default_expiry_secs)?;
    let rtm_token = state.issue(&CredentialRequest::rtm(&uid, expires_in(ttl)))?;
    Ok(Json(RtmTokenResponse { rtm_token }))
}

pub async fn rte_token(
    State(state): State<AppState>,
    Path(path): Path<TokenPath>,
    Query(query): Query<ExpiryQuery>,
) -> Result<Json<RteTokenResponse>, ApiError> {
    let params = RtcParams::parse(&path, &query, state.default_expiry_secs)?;
    let huddle = track_participant(&state, &path.channel_name, &path.uid);

    let rtc_token = state.issue(&CredentialRequest::rtc(
        &path.channel_name,
        params.subject,
        params.role,
        params.expires_at,
    ))?;
    let rtm_token = state.issue(&CredentialRequest::rtm(&path.uid, params.expires_at))?;

    Ok(Json(RteTokenResponse {
        rtc_token,
        rtm_token,
        channel_name: path.channel_name,
        huddle_id: huddle.id.to_string(),
        app_id: state.issuer.app_id().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::HmacCredentialIssuer;
    use crate::huddle::HuddleRegistry;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            Arc::new(HuddleRegistry::new()),
            Arc::new(HmacCredentialIssuer::new("app", "cert")),
            3600,
        )
    }

    fn event_count(rendered: &str, event: &str) -> u64 {
        let prefix = format!("huddle_events_total{{event=\"{}\"}} ", event);
        rendered
            .lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .map(|value| value.trim().parse().unwrap())
            .unwrap_or(0)
    }

    #[test]
    fn test_tracking_records_only_real_changes() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let state = state();

        ::metrics::with_local_recorder(&recorder, || {
            track_participant(&state, "standup", "alice");
            track_participant(&state, "standup", "alice");
            track_participant(&state, "standup", "bob");
        });

        let rendered = handle.render();
        assert_eq!(event_count(&rendered, "created"), 1);
        assert_eq!(event_count(&rendered, "joined"), 2);
        assert!(rendered.contains("huddle_active 1"));

        let huddle = state.registry.get_by_channel("standup").unwrap();
        assert_eq!(huddle.created_by, "alice");
        assert_eq!(huddle.participants, vec!["alice", "bob"]);
    }

    #[test]
    fn test_tracking_returns_existing_huddle() {
        let state = state();
        let first = track_participant(&state, "standup", "alice");
        let second = track_participant(&state, "standup", "bob");
        assert_eq!(first.id, second.id);
        assert_eq!(state.registry.len(), 1);
    }
}
