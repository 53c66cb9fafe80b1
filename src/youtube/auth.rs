use reqwest::Url;
use tracing::debug;

use crate::{error::AuthError, types::TokenResponse, youtube::GoogleClient};

impl GoogleClient {
    /// Builds the authorization request for the given redirect target.
    ///
    /// `access_type=offline` makes Google issue a refresh token alongside the
    /// first access token.
    pub fn authorization_request(
        &self,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("access_type", "offline"),
                ("response_type", "code"),
                ("scope", scope),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::Config(format!("invalid authorization URL: {e}")))
    }

    /// Issues the authorization request and returns the consent page URL it
    /// ends up on after redirects.
    pub(crate) async fn resolve_authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<String, AuthError> {
        let request = self.authorization_request(redirect_uri, scope, state)?;
        let response = self.client.get(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::from_status("authorization", status, &body));
        }

        debug!(url = %response.url().origin().ascii_serialization(), "resolved consent page");
        Ok(response.url().to_string())
    }

    pub(crate) async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.token_request(&[
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    pub(crate) async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::from_status("token", status, &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| AuthError::InvalidResponse(format!("token response: {e}")))
    }
}
