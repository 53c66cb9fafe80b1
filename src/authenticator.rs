//! Composition root of the login subsystem.
//!
//! [`Authenticator::start`] binds the redirect listener and resumes a
//! remembered session; [`Authenticator::shutdown`] releases both again. In
//! between, collaborators only use `login`, `logout` and the two reads.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::AuthError,
    management::{CredentialStore, PendingRequests, Session},
    server::CallbackServer,
    types::CallbackResult,
    utils,
    youtube::Provider,
};

/// Opens the consent page for the user.
pub trait Browser: Send + Sync {
    /// Returns `false` if the page could not be opened.
    fn open(&self, url: &str) -> bool;
}

/// The platform's default browser, with a printed fallback URL.
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> bool {
        match webbrowser::open(url) {
            Ok(()) => {
                crate::info!("Switch to your browser in order to authenticate");
                true
            }
            Err(e) => {
                debug!(error = %e, "cannot launch browser");
                crate::warning!("Failed to open browser window. Go to {} to authenticate", url);
                false
            }
        }
    }
}

pub struct Authenticator {
    config: Config,
    session: Arc<Session>,
    pending: Arc<PendingRequests>,
    provider: Arc<dyn Provider>,
    browser: Arc<dyn Browser>,
    server: Mutex<CallbackServer>,
    redirect_uri: String,
}

impl Authenticator {
    /// Binds the redirect listener and eagerly restores a remembered session.
    pub async fn start(
        config: Config,
        store: Arc<dyn CredentialStore>,
        provider: Arc<dyn Provider>,
        browser: Arc<dyn Browser>,
    ) -> Result<Self, AuthError> {
        let pending = PendingRequests::new();
        let server = CallbackServer::bind(Arc::clone(&pending), config.read_timeout).await?;
        let redirect_uri = server.redirect_uri();

        let session = Session::new(store, Arc::clone(&provider));
        session.restore().await;

        Ok(Self {
            config,
            session,
            pending,
            provider,
            browser,
            server: Mutex::new(server),
            redirect_uri,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn username(&self) -> Option<String> {
        self.session.username()
    }

    pub fn access_token(&self) -> String {
        self.session.access_token()
    }

    /// Runs the browser authorization flow and commits the resulting session.
    ///
    /// Returns the authenticated username. A failure before the new tokens are
    /// committed leaves a previously active session untouched.
    pub async fn login(&self, scopes: &[String]) -> Result<String, AuthError> {
        let pending = self.pending.register()?;
        let scope = utils::expand_scopes(
            scopes,
            &self.config.scope_prefix,
            &self.config.default_scopes,
        );

        let url = self
            .provider
            .authorization_url(&self.redirect_uri, &scope, pending.nonce())
            .await?;
        self.browser.open(&url);

        let code = match pending.wait(self.config.login_timeout).await? {
            CallbackResult::Code(code) if !code.is_empty() => code,
            CallbackResult::Code(_) => {
                return Err(AuthError::InvalidResponse(
                    "empty authorization code".to_string(),
                ));
            }
            CallbackResult::Error(error) => return Err(AuthError::Denied(error)),
        };

        let tokens = self
            .provider
            .exchange_code(&code, &self.redirect_uri)
            .await?;
        let username = self.provider.identity(&tokens.access_token).await?;
        self.session.establish(username.clone(), tokens).await?;

        info!(user = %username, "login complete");
        Ok(username)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }

    /// Cancels pending logins and the refresh task, then closes the listener.
    ///
    /// The stored refresh token is kept so the next start can resume.
    pub async fn shutdown(&self) {
        self.pending.close();
        self.session.shutdown().await;
        self.server.lock().await.shutdown().await;
    }
}
