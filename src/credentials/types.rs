//! Credential request types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Privilege attached to an RTC credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Publisher,
    Subscriber,
}

impl Role {
    /// `publisher` selects the publisher role; anything else subscribes.
    pub fn from_path(segment: &str) -> Self {
        if segment == "publisher" {
            Role::Publisher
        } else {
            Role::Subscriber
        }
    }
}

/// Identity a credential is issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Subject {
    /// Numeric platform uid.
    Uid(u32),
    /// String user account.
    Account(String),
}

impl Subject {
    /// Interpret `uid` according to a `token_type` path segment.
    pub fn parse(token_type: &str, uid: &str) -> Result<Self, SubjectError> {
        match token_type {
            "userAccount" => Ok(Subject::Account(uid.to_string())),
            "uid" => uid
                .parse::<u32>()
                .map(Subject::Uid)
                .map_err(|_| SubjectError::InvalidUid(uid.to_string())),
            other => Err(SubjectError::UnknownTokenType(other.to_string())),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Uid(uid) => write!(f, "{}", uid),
            Subject::Account(account) => f.write_str(account),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubjectError {
    #[error("uid {0:?} is not an unsigned 32-bit integer")]
    InvalidUid(String),

    #[error("unknown token type {0:?}")]
    UnknownTokenType(String),
}

/// What the credential grants access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scope {
    /// Join a media channel.
    Rtc {
        channel: String,
        subject: Subject,
        role: Role,
    },
    /// Log in to the signalling service.
    Rtm { user_id: String },
}

/// Label used in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Rtc,
    Rtm,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Rtc => "rtc",
            CredentialKind::Rtm => "rtm",
        }
    }
}

/// Input to [`CredentialIssuer::issue`](super::CredentialIssuer::issue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequest {
    pub scope: Scope,
    /// Expiry as unix seconds.
    pub expires_at: u32,
}

impl CredentialRequest {
    pub fn rtc(channel: &str, subject: Subject, role: Role, expires_at: u32) -> Self {
        Self {
            scope: Scope::Rtc {
                channel: channel.to_string(),
                subject,
                role,
            },
            expires_at,
        }
    }

    pub fn rtm(user_id: &str, expires_at: u32) -> Self {
        Self {
            scope: Scope::Rtm {
                user_id: user_id.to_string(),
            },
            expires_at,
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self.scope {
            Scope::Rtc { .. } => CredentialKind::Rtc,
            Scope::Rtm { .. } => CredentialKind::Rtm,
        }
    }
}

/// Current unix time in seconds, clamped to `u32`.
pub fn unix_now() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Expiry timestamp `ttl_secs` from now.
pub fn expires_in(ttl_secs: u32) -> u32 {
    unix_now().saturating_add(ttl_secs)
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to encode credential payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("malformed credential")]
    Malformed,

    #[error("credential signature mismatch")]
    BadSignature,
}
