use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL {0}")]
    InvalidUrl(String),

    /// The backend answered with a non-success status.
    #[error("huddle API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl SdkError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Http(err) => err.status(),
            SdkError::InvalidUrl(_) => None,
            SdkError::Api { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedHuddle {
    pub huddle_id: String,
    pub channel_name: String,
    pub created_by: String,
    pub created_at: String,
    pub app_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuddleSummary {
    pub huddle_id: String,
    pub channel_name: String,
    pub created_by: String,
    pub created_at: String,
    pub participant_count: usize,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct HuddleList {
    huddles: Vec<HuddleSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcToken {
    pub rtc_token: String,
    pub channel_name: String,
    pub huddle_id: String,
    pub app_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RtmToken {
    rtm_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RteToken {
    pub rtc_token: String,
    pub rtm_token: String,
    pub channel_name: String,
    pub huddle_id: String,
    pub app_id: String,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    created_by: &'a str,
}

#[derive(Debug, Serialize)]
struct MembershipRequest<'a> {
    huddle_id: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct EndRequest<'a> {
    huddle_id: &'a str,
}

/// Parameters of an RTC (or combined RTE) token request.
#[derive(Debug, Clone)]
pub struct TokenParams {
    pub channel_name: String,
    pub role: String,
    pub token_type: String,
    pub uid: String,
    pub expiry: Option<u32>,
}

impl TokenParams {
    /// Publisher token for a user account.
    pub fn publisher(channel_name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            role: "publisher".to_string(),
            token_type: "userAccount".to_string(),
            uid: uid.into(),
            expiry: None,
        }
    }

    pub fn with_expiry(mut self, expiry: u32) -> Self {
        self.expiry = Some(expiry);
        self
    }

    fn segments<'a>(&'a self, prefix: &'a str) -> [&'a str; 5] {
        [
            prefix,
            self.channel_name.as_str(),
            self.role.as_str(),
            self.token_type.as_str(),
            self.uid.as_str(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct HuddleClient {
    client: Client,
    base_url: String,
}

impl HuddleClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL extended by `segments`, each percent-encoded on its own so
    /// a `/`, `?` or `#` inside a channel name stays part of that segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SdkError> {
        let invalid = || SdkError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn ping(&self) -> Result<MessageResponse, SdkError> {
        let resp = self.client.get(self.endpoint(&["ping"])?).send().await?;
        decode(resp).await
    }

    /// Start a huddle on a freshly derived channel.
    pub async fn create_huddle(&self, created_by: &str) -> Result<CreatedHuddle, SdkError> {
        let resp = self
            .client
            .post(self.endpoint(&["huddle", "create"])?)
            .json(&CreateRequest { created_by })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn join_huddle(&self, huddle_id: &str, user_id: &str) -> Result<MessageResponse, SdkError> {
        let resp = self
            .client
            .post(self.endpoint(&["huddle", "join"])?)
            .json(&MembershipRequest { huddle_id, user_id })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn leave_huddle(&self, huddle_id: &str, user_id: &str) -> Result<MessageResponse, SdkError> {
        let resp = self
            .client
            .post(self.endpoint(&["huddle", "leave"])?)
            .json(&MembershipRequest { huddle_id, user_id })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn end_huddle(&self, huddle_id: &str) -> Result<MessageResponse, SdkError> {
        let resp = self
            .client
            .post(self.endpoint(&["huddle", "end"])?)
            .json(&EndRequest { huddle_id })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn end_channel(&self, channel_name: &str) -> Result<MessageResponse, SdkError> {
        let resp = self
            .client
            .delete(self.endpoint(&["huddles", channel_name])?)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_huddles(&self) -> Result<Vec<HuddleSummary>, SdkError> {
        let resp = self.client.get(self.endpoint(&["huddles"])?).send().await?;
        let list: HuddleList = decode(resp).await?;
        Ok(list.huddles)
    }

    /// Request an RTC token. The backend records `uid` as a participant of
    /// the channel's huddle, creating the huddle on first use.
    pub async fn rtc_token(&self, params: &TokenParams) -> Result<RtcToken, SdkError> {
        let mut req = self.client.get(self.endpoint(&params.segments("rtc"))?);
        if let Some(expiry) = params.expiry {
            req = req.query(&[("expiry", expiry)]);
        }
        decode(req.send().await?).await
    }

    pub async fn rtm_token(&self, uid: &str, expiry: Option<u32>) -> Result<String, SdkError> {
        let mut req = self.client.get(self.endpoint(&["rtm", uid])?);
        if let Some(expiry) = expiry {
            req = req.query(&[("expiry", expiry)]);
        }
        let token: RtmToken = decode(req.send().await?).await?;
        Ok(token.rtm_token)
    }

    pub async fn rte_token(&self, params: &TokenParams) -> Result<RteToken, SdkError> {
        let mut req = self.client.get(self.endpoint(&params.segments("rte"))?);
        if let Some(expiry) = params.expiry {
            req = req.query(&[("expiry", expiry)]);
        }
        decode(req.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await?;
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) => text,
        };
        return Err(SdkError::Api { status, message });
    }
    Ok(resp.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let client = HuddleClient::new("http://localhost:8080/");
        let url = client.endpoint(&["huddles", "team/a?b#c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/huddles/team%2Fa%3Fb%23c");

        let params = TokenParams::publisher("standup", "alice smith");
        let url = client.endpoint(&params.segments("rtc")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/rtc/standup/publisher/userAccount/alice%20smith"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = HuddleClient::new("http://localhost:8080/api");
        let url = client.endpoint(&["ping"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/ping");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = HuddleClient::new("not a url");
        assert!(matches!(
            client.endpoint(&["ping"]),
            Err(SdkError::InvalidUrl(_))
        ));
    }
}
