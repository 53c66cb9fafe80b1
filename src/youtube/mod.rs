//! # YouTube / Google OAuth Module
//!
//! Everything that talks to Google lives here: the OAuth endpoints used by the
//! login flow and the YouTube Data API used to confirm who a token belongs to.
//!
//! ## Layout
//!
//! ```text
//! Provider (trait)            seam used by the session and the login flow
//!     └── GoogleClient        reqwest implementation
//!           ├── auth          authorization URL, code exchange, refresh
//!           └── channels      identity lookup, YoutubeApi wrapper
//! ```
//!
//! The login flow and the refresh scheduler only ever see [`Provider`], which
//! keeps them testable without network access.

pub mod auth;
pub mod channels;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{config::Config, error::AuthError, types::TokenResponse};

pub use channels::YoutubeApi;

/// The OAuth provider as seen by the login flow and the refresh scheduler.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Resolves the consent page URL the user's browser should open.
    async fn authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<String, AuthError>;

    /// Trades an authorization code for access and refresh tokens.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError>;

    /// Trades a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError>;

    /// Display identity of the account an access token belongs to.
    async fn identity(&self, access_token: &str) -> Result<String, AuthError>;
}

/// Google implementation of [`Provider`].
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct GoogleClient {
    client: Client,
    config: Config,
}

impl GoogleClient {
    pub fn new(config: Config) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait]
impl Provider for GoogleClient {
    async fn authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<String, AuthError> {
        self.resolve_authorization_url(redirect_uri, scope, state)
            .await
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.exchange_authorization_code(code, redirect_uri).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn identity(&self, access_token: &str) -> Result<String, AuthError> {
        self.channel_title(access_token).await
    }
}
