use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    error::AuthError, management::Session, types::ChannelListResponse, youtube::GoogleClient,
};

impl GoogleClient {
    /// GET against the data API with the API key and, when non-empty, the
    /// bearer token attached.
    pub(crate) async fn api_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        access_token: &str,
    ) -> Result<T, AuthError> {
        let url = Url::parse(&self.config.api_url)
            .and_then(|base| base.join(endpoint))
            .map_err(|e| AuthError::Config(format!("invalid data API URL: {e}")))?;

        let mut request = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())]);
        if !access_token.is_empty() {
            request = request.bearer_auth(access_token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::from_status("data API", status, &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| AuthError::InvalidResponse(format!("{endpoint} response: {e}")))
    }

    /// Title of the channel owned by the account behind `access_token`.
    pub(crate) async fn channel_title(&self, access_token: &str) -> Result<String, AuthError> {
        let channels: ChannelListResponse = self
            .api_get(
                "channels",
                &[("part", "snippet"), ("mine", "true")],
                access_token,
            )
            .await?;

        channels.into_first_title()
    }
}

/// Data API access on behalf of the current session.
///
/// A `401` on any call means the session lost its authorization, so it is
/// logged out before the error is handed back.
#[derive(Clone)]
pub struct YoutubeApi {
    client: GoogleClient,
    session: Arc<Session>,
}

impl YoutubeApi {
    pub fn new(client: GoogleClient, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AuthError> {
        let token = self.session.access_token();
        match self.client.api_get(endpoint, params, &token).await {
            Err(AuthError::Unauthorized) => {
                warn!(endpoint, "access token rejected, logging out");
                self.session.logout().await;
                Err(AuthError::Unauthorized)
            }
            other => other,
        }
    }

    /// Re-confirms the session identity against the data API.
    pub async fn my_channel_title(&self) -> Result<String, AuthError> {
        if !self.session.is_logged_in() {
            return Err(AuthError::NotLoggedIn);
        }

        let channels: ChannelListResponse = self
            .get("channels", &[("part", "snippet"), ("mine", "true")])
            .await?;
        channels.into_first_title()
    }
}
