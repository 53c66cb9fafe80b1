#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use url::Url;
use ytauth::{
    authenticator::Browser,
    config::Config,
    error::AuthError,
    management::{CredentialStore, MemoryStore},
    types::TokenResponse,
    youtube::Provider,
};

pub const GOOD_CODE: &str = "ABC123";

pub fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "YTAUTH_CLIENT_ID" => "client-id",
            "YTAUTH_CLIENT_SECRET" => "client-secret",
            "YTAUTH_API_KEY" => "api-key",
            "YTAUTH_LOGIN_TIMEOUT_SECS" => "5",
            "YTAUTH_READ_TIMEOUT_SECS" => "1",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

pub fn tokens(access: &str, refresh: Option<&str>, expires_in: u64) -> TokenResponse {
    TokenResponse {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_in,
        token_type: Some("Bearer".to_string()),
    }
}

/// Provider double: accepts [`GOOD_CODE`] and hands out numbered tokens.
pub struct FakeProvider {
    pub username: String,
    pub expires_in: u64,
    pub refresh_calls: AtomicUsize,
    pub fail_refresh: AtomicBool,
    /// Refresh grants fail as if the token endpoint were unreachable.
    pub offline: AtomicBool,
    pub fail_identity: AtomicBool,
    /// Simulated latency of the refresh grant.
    pub refresh_latency: Duration,
    pub exchanged_codes: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            expires_in: 1000,
            refresh_calls: AtomicUsize::new(0),
            fail_refresh: AtomicBool::new(false),
            offline: AtomicBool::new(false),
            fail_identity: AtomicBool::new(false),
            refresh_latency: Duration::ZERO,
            exchanged_codes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_refresh(self) -> Self {
        self.fail_refresh.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_identity(self) -> Self {
        self.fail_identity.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            "https://consent.example/auth",
            &[
                ("redirect_uri", redirect_uri),
                ("scope", scope),
                ("state", state),
            ],
        )
        .unwrap();
        Ok(url.to_string())
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        if let Some(state) = code.strip_prefix("code-") {
            return Ok(tokens(&format!("A-{state}"), Some("R1"), self.expires_in));
        }
        if code != GOOD_CODE {
            return Err(AuthError::Provider {
                endpoint: "token",
                status: 400,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(tokens("A1", Some("R1"), self.expires_in))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.refresh_latency.is_zero() {
            tokio::time::sleep(self.refresh_latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuthError::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            )));
        }
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(AuthError::Provider {
                endpoint: "token",
                status: 400,
                body: format!("invalid_grant for {refresh_token}"),
            });
        }
        Ok(tokens(&format!("A{}", call + 1), None, self.expires_in))
    }

    async fn identity(&self, access_token: &str) -> Result<String, AuthError> {
        if self.fail_identity.load(Ordering::SeqCst) {
            return Err(AuthError::Unauthorized);
        }
        match access_token.strip_prefix("A-") {
            Some(state) => Ok(format!("user-{state}")),
            None => Ok(self.username.clone()),
        }
    }
}

/// Credential store whose deletes always fail.
#[derive(Default)]
pub struct StickyStore {
    pub inner: MemoryStore,
}

impl CredentialStore for StickyStore {
    fn get(&self, account: &str) -> Result<Option<String>, AuthError> {
        self.inner.get(account)
    }

    fn set(&self, account: &str, secret: &str) -> Result<(), AuthError> {
        self.inner.set(account, secret)
    }

    fn delete(&self, _account: &str) -> Result<(), AuthError> {
        Err(AuthError::Store("keychain is locked".to_string()))
    }
}

/// What the simulated user does once the consent page is opened.
#[derive(Debug, Clone)]
pub enum Consent {
    Approve(&'static str),
    /// Approves with a code derived from the login's own state.
    ApproveOwnCode,
    Deny(&'static str),
    /// Sends a redirect for a state the process never issued.
    Forge(&'static str),
    Ignore,
}

/// Browser double that answers the consent page by calling the redirect URI.
pub struct SimulatedBrowser {
    consent: Mutex<Consent>,
    pub opened: Mutex<Vec<String>>,
    pub responses: Arc<Mutex<Vec<String>>>,
}

impl SimulatedBrowser {
    pub fn new(consent: Consent) -> Self {
        Self {
            consent: Mutex::new(consent),
            opened: Mutex::new(Vec::new()),
            responses: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_consent(&self, consent: Consent) {
        *self.consent.lock().unwrap() = consent;
    }

    pub fn responses(&self) -> Vec<String> {
        self.responses.lock().unwrap().clone()
    }
}

impl Browser for SimulatedBrowser {
    fn open(&self, url: &str) -> bool {
        self.opened.lock().unwrap().push(url.to_string());

        let url = Url::parse(url).unwrap();
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .unwrap()
        };
        let state = param("state");
        let port = Url::parse(&param("redirect_uri")).unwrap().port().unwrap();

        let consent = self.consent.lock().unwrap().clone();
        let query = match consent {
            Consent::Approve(code) => format!("state={state}&code={code}"),
            Consent::ApproveOwnCode => format!("state={state}&code=code-{state}"),
            Consent::Deny(error) => format!("state={state}&error={error}"),
            Consent::Forge(code) => format!("state=forged{state}&code={code}"),
            Consent::Ignore => return true,
        };

        let responses = Arc::clone(&self.responses);
        tokio::spawn(async move {
            let response = send_raw(port, &format!("GET /?{query} HTTP/1.1\r\nHost: localhost\r\n\r\n")).await;
            responses.lock().unwrap().push(response);
        });
        true
    }
}

/// Writes `request` to the redirect listener and reads until it closes.
pub async fn send_raw(port: u16, request: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    String::from_utf8_lossy(&response).into_owned()
}
