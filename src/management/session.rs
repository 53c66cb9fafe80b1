//! Shared session state and the background access-token refresh.
//!
//! All mutation goes through one async mutex. The username and access token
//! are mirrored into plain read locks so collaborators can read them without
//! waiting for an in-flight refresh.

use std::sync::{Arc, RwLock, Weak};

use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

use crate::{
    error::AuthError,
    management::credentials::{CURRENT_USER_ACCOUNT, CredentialStore},
    types::TokenResponse,
    utils,
    youtube::Provider,
};

struct RefreshTask {
    handle: JoinHandle<()>,
    due: Instant,
}

#[derive(Default)]
struct SessionState {
    username: Option<String>,
    access_token: Option<String>,
    refresh: Option<RefreshTask>,
}

pub struct Session {
    state: Mutex<SessionState>,
    username: RwLock<Option<String>>,
    access_token: RwLock<String>,
    store: Arc<dyn CredentialStore>,
    provider: Arc<dyn Provider>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>, provider: Arc<dyn Provider>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SessionState::default()),
            username: RwLock::new(None),
            access_token: RwLock::new(String::new()),
            store,
            provider,
        })
    }

    /// Currently authenticated username, `None` when logged out.
    pub fn username(&self) -> Option<String> {
        match self.username.read() {
            Ok(name) => name.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current bearer token, empty when logged out or while it is renewed.
    pub fn access_token(&self) -> String {
        match self.access_token.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.username().is_some()
    }

    /// When the next scheduled renewal fires, if one is armed.
    pub async fn refresh_due(&self) -> Option<Instant> {
        self.state.lock().await.refresh.as_ref().map(|task| task.due)
    }

    fn publish(&self, state: &SessionState) {
        match self.username.write() {
            Ok(mut name) => *name = state.username.clone(),
            Err(poisoned) => *poisoned.into_inner() = state.username.clone(),
        }
        let token = state.access_token.clone().unwrap_or_default();
        match self.access_token.write() {
            Ok(mut current) => *current = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    /// Commits a freshly authorized identity.
    ///
    /// The previous identity, if any, is logged out in the same critical
    /// section, so readers never observe a mix of both.
    pub async fn establish(
        self: &Arc<Self>,
        username: String,
        tokens: TokenResponse,
    ) -> Result<(), AuthError> {
        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            AuthError::InvalidResponse("token response carries no refresh_token".to_string())
        })?;

        let mut state = self.state.lock().await;
        self.clear_locked(&mut state).await;

        let persisted = self
            .store
            .set(&username, refresh_token)
            .and_then(|()| self.store.set(CURRENT_USER_ACCOUNT, &username));
        if let Err(e) = persisted {
            let _ = self.store.delete(&username);
            let _ = self.store.delete(CURRENT_USER_ACCOUNT);
            return Err(e);
        }

        state.username = Some(username.clone());
        state.access_token = Some(tokens.access_token);
        self.publish(&state);
        self.start_refresh(&mut state, tokens.expires_in);

        info!(user = %username, expires_in = tokens.expires_in, "session established");
        Ok(())
    }

    /// Resumes the remembered session from the credential store, if any.
    ///
    /// Returns whether a session is active afterwards. A remembered user whose
    /// refresh token is rejected is logged out, which also forgets the pointer
    /// slot. When the provider cannot be reached the stored credentials are
    /// kept for the next start.
    pub async fn restore(self: &Arc<Self>) -> bool {
        let remembered = match self.store.get(CURRENT_USER_ACCOUNT) {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => return false,
            Err(e) => {
                warn!(error = %e, "cannot read remembered user");
                return false;
            }
        };

        let mut state = self.state.lock().await;
        state.username = Some(remembered.clone());
        self.publish(&state);

        match self.renew_locked(&mut state).await {
            Ok(expires_in) => {
                self.start_refresh(&mut state, expires_in);
                info!(user = %remembered, "session restored");
                true
            }
            Err(e) if e.is_transient() => {
                warn!(user = %remembered, error = %e, "cannot restore session, keeping credentials");
                state.username = None;
                state.access_token = None;
                self.publish(&state);
                false
            }
            Err(e) => {
                warn!(user = %remembered, error = %e, "cannot restore session");
                self.clear_locked(&mut state).await;
                false
            }
        }
    }

    /// Logs out and forgets the stored refresh token. A no-op when logged out.
    ///
    /// Returns only after a pending refresh has been cancelled.
    pub async fn logout(&self) {
        let mut state = self.state.lock().await;
        self.clear_locked(&mut state).await;
    }

    /// Stops the refresh task without touching credentials.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Some(task) = state.refresh.take() {
            task.handle.abort();
            let _ = task.handle.await;
        }
    }

    async fn clear_locked(&self, state: &mut SessionState) {
        if let Some(task) = state.refresh.take() {
            task.handle.abort();
            let _ = task.handle.await;
        }

        if let Some(username) = state.username.take() {
            if let Err(e) = self.store.delete(&username) {
                warn!(user = %username, error = %e, "cannot delete refresh token");
            }
            info!(user = %username, "logged out");
        }
        if let Err(e) = self.store.delete(CURRENT_USER_ACCOUNT) {
            warn!(error = %e, "cannot clear remembered user");
        }

        state.access_token = None;
        self.publish(state);
    }

    /// Trades the stored refresh token for a new access token.
    async fn renew_locked(&self, state: &mut SessionState) -> Result<u64, AuthError> {
        let username = state.username.clone().ok_or(AuthError::NotLoggedIn)?;

        state.access_token = None;
        self.publish(state);

        let refresh_token = self
            .store
            .get(&username)?
            .ok_or_else(|| AuthError::MissingRefreshToken(username.clone()))?;
        let tokens = self.provider.refresh_token(&refresh_token).await?;

        state.access_token = Some(tokens.access_token);
        self.publish(state);
        debug!(user = %username, expires_in = tokens.expires_in, "access token renewed");
        Ok(tokens.expires_in)
    }

    fn start_refresh(self: &Arc<Self>, state: &mut SessionState, expires_in: u64) {
        if let Some(previous) = state.refresh.take() {
            previous.handle.abort();
        }

        let due = Instant::now() + utils::refresh_delay(expires_in);
        let session = Arc::downgrade(self);
        let handle = tokio::spawn(refresh_loop(session, due));
        state.refresh = Some(RefreshTask { handle, due });
    }

    /// Runs one scheduled renewal. Returns the next due time, or `None` when
    /// the session ended and the loop must stop.
    async fn scheduled_refresh(&self) -> Option<Instant> {
        let mut state = self.state.lock().await;
        state.username.as_ref()?;

        match self.renew_locked(&mut state).await {
            Ok(expires_in) => {
                let due = Instant::now() + utils::refresh_delay(expires_in);
                if let Some(task) = state.refresh.as_mut() {
                    task.due = due;
                }
                info!(expires_in, "access token refreshed");
                Some(due)
            }
            Err(e) if e.is_transient() => {
                let due = Instant::now() + utils::REFRESH_RETRY_DELAY;
                if let Some(task) = state.refresh.as_mut() {
                    task.due = due;
                }
                warn!(error = %e, "access token refresh failed, retrying");
                Some(due)
            }
            Err(e) => {
                warn!(error = %e, "access token refresh failed, logging out");
                // Detach our own handle so clearing does not wait on this task.
                state.refresh.take();
                self.clear_locked(&mut state).await;
                None
            }
        }
    }
}

async fn refresh_loop(session: Weak<Session>, mut due: Instant) {
    loop {
        tokio::time::sleep_until(due).await;
        let Some(session) = session.upgrade() else {
            return;
        };
        match session.scheduled_refresh().await {
            Some(next) => due = next,
            None => return,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}
