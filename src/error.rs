use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{endpoint} request rejected with status {status}: {body}")]
    Provider {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unauthorized - access token rejected")]
    Unauthorized,

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Timed out waiting for the authorization callback")]
    Timeout,

    #[error("Login cancelled")]
    Cancelled,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No refresh token stored for {0}")]
    MissingRefreshToken(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl AuthError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Failures that say nothing about the credential itself: the provider
    /// was unreachable or the keychain could not be read.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthError::Network(_) | AuthError::Io(_) | AuthError::Store(_)
        )
    }

    pub fn from_status(endpoint: &'static str, status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AuthError::Unauthorized;
        }
        AuthError::Provider {
            endpoint,
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }
}

impl From<keyring::Error> for AuthError {
    fn from(err: keyring::Error) -> Self {
        AuthError::Store(err.to_string())
    }
}
