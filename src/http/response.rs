//! Response bodies.
//!
//! Field names here are the wire contract: huddle endpoints use snake_case,
//! token endpoints use camelCase.

use serde::Serialize;

use crate::huddle::Huddle;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Body of `POST /huddle/create`.
#[derive(Debug, Serialize)]
pub struct CreatedHuddle {
    pub huddle_id: String,
    pub channel_name: String,
    pub created_by: String,
    pub created_at: String,
    pub app_id: String,
}

impl CreatedHuddle {
    pub fn new(huddle: &Huddle, app_id: &str) -> Self {
        Self {
            huddle_id: huddle.id.to_string(),
            channel_name: huddle.channel_name.clone(),
            created_by: huddle.created_by.clone(),
            created_at: huddle.created_at_rfc3339(),
            app_id: app_id.to_string(),
        }
    }
}

/// One entry of a huddle listing.
#[derive(Debug, Serialize)]
pub struct HuddleSummary {
    pub huddle_id: String,
    pub channel_name: String,
    pub created_by: String,
    pub created_at: String,
    pub participant_count: usize,
    pub participants: Vec<String>,
}

impl From<Huddle> for HuddleSummary {
    fn from(huddle: Huddle) -> Self {
        Self {
            huddle_id: huddle.id.to_string(),
            created_at: huddle.created_at_rfc3339(),
            participant_count: huddle.participant_count(),
            channel_name: huddle.channel_name,
            created_by: huddle.created_by,
            participants: huddle.participants,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HuddleList {
    pub huddles: Vec<HuddleSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcTokenResponse {
    pub rtc_token: String,
    pub channel_name: String,
    pub huddle_id: String,
    pub app_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtmTokenResponse {
    pub rtm_token: String,
}

/// Body of the combined RTC + RTM token route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RteTokenResponse {
    pub rtc_token: String,
    pub rtm_token: String,
    pub channel_name: String,
    pub huddle_id: String,
    pub app_id: String,
}
