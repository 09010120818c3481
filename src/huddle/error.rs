//! Registry error type.

use std::fmt;
use thiserror::Error;

use crate::huddle::types::HuddleId;

/// What an operation was looking for when it came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(HuddleId),
    Channel(String),
    Participant { huddle_id: HuddleId, user_id: String },
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "huddle {}", id),
            Lookup::Channel(channel) => write!(f, "huddle on channel {}", channel),
            Lookup::Participant { huddle_id, user_id } => {
                write!(f, "user {} in huddle {}", user_id, huddle_id)
            }
        }
    }
}

/// Registry error. Absence is the only failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HuddleError {
    #[error("not found: {0}")]
    NotFound(Lookup),
}

impl HuddleError {
    pub fn id(id: HuddleId) -> Self {
        HuddleError::NotFound(Lookup::Id(id))
    }

    pub fn channel(channel: &str) -> Self {
        HuddleError::NotFound(Lookup::Channel(channel.to_string()))
    }

    pub fn participant(huddle_id: HuddleId, user_id: &str) -> Self {
        HuddleError::NotFound(Lookup::Participant {
            huddle_id,
            user_id: user_id.to_string(),
        })
    }

    pub fn lookup(&self) -> &Lookup {
        match self {
            HuddleError::NotFound(lookup) => lookup,
        }
    }
}

pub type HuddleResult<T> = Result<T, HuddleError>;
