//! Huddle record types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix for channel names the registry derives itself.
pub const CHANNEL_PREFIX: &str = "huddle_";

/// Number of id characters that go into a derived channel name.
const CHANNEL_ID_CHARS: usize = 8;

/// Unique, never-reused identifier of a huddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HuddleId(Uuid);

impl HuddleId {
    /// Draw a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Channel name derived from the first hex characters of the id.
    pub fn derived_channel_name(&self) -> String {
        let mut buf = Uuid::encode_buffer();
        let hex = self.0.simple().encode_lower(&mut buf);
        format!("{}{}", CHANNEL_PREFIX, &hex[..CHANNEL_ID_CHARS])
    }
}

impl Default for HuddleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for HuddleId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for HuddleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for HuddleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An active group session.
///
/// Values handed out by the registry are snapshots; mutating one has no
/// effect on the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Huddle {
    pub id: HuddleId,
    pub channel_name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<String>,
}

impl Huddle {
    pub(crate) fn new(id: HuddleId, channel_name: String, created_by: String) -> Self {
        Self {
            id,
            channel_name,
            created_by,
            created_at: Utc::now(),
            participants: Vec::new(),
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Creation time as RFC 3339 with second precision, e.g. `2024-05-01T12:00:00Z`.
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Append a participant unless already present. Returns whether it was added.
    pub(crate) fn add_participant(&mut self, user_id: &str) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.participants.push(user_id.to_string());
        true
    }

    /// Remove a participant keeping the order of the others. Returns whether it was present.
    pub(crate) fn remove_participant(&mut self, user_id: &str) -> bool {
        match self.participants.iter().position(|p| p == user_id) {
            Some(idx) => {
                self.participants.remove(idx);
                true
            }
            None => false,
        }
    }
}
