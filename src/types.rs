use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Response of the token endpoint for both grant types.
///
/// The refresh-token grant does not issue a new refresh token, so
/// `refresh_token` is only present after an authorization-code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

/// What the browser redirect delivered for a pending login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Code(String),
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<Channel>,
}

impl ChannelListResponse {
    /// Title of the first listed channel, the account's own for `mine=true`.
    pub fn into_first_title(self) -> Result<String, AuthError> {
        self.items
            .into_iter()
            .next()
            .map(|channel| channel.snippet.title)
            .ok_or_else(|| AuthError::InvalidResponse("account has no channel".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub id: Option<String>,
    pub snippet: ChannelSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
}
