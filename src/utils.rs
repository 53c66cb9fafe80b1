use std::time::Duration;

use rand::{Rng, distr::Alphanumeric};

/// Length of the `state` nonce correlating a login with its redirect.
pub const NONCE_LENGTH: usize = 12;

/// Fraction of the token lifetime after which the access token is renewed.
pub const REFRESH_MARGIN: f64 = 0.95;

pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Delay before retrying a renewal that failed because the provider was
/// unreachable.
pub const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Upper bound for the renewal delay, whatever lifetime the provider claims.
pub const MAX_REFRESH_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Delay before renewing an access token that expires in `expires_in` seconds.
pub fn refresh_delay(expires_in: u64) -> Duration {
    let secs = (expires_in as f64 * REFRESH_MARGIN).min(MAX_REFRESH_DELAY.as_secs_f64());
    Duration::from_secs_f64(secs)
}

/// Expands short privilege names into the space-delimited `scope` parameter.
///
/// `youtube.readonly` becomes `<prefix>youtube.readonly`; values that already
/// are URLs are kept as they are. Falls back to `defaults` when `scopes`
/// contains no privilege at all.
pub fn expand_scopes(scopes: &[String], prefix: &str, defaults: &str) -> String {
    let mut privileges: Vec<&str> = scopes
        .iter()
        .flat_map(|s| s.split_whitespace())
        .collect();
    if privileges.is_empty() {
        privileges = defaults.split_whitespace().collect();
    }

    privileges
        .into_iter()
        .map(|p| {
            if p.starts_with("https://") || p.starts_with("http://") {
                p.to_string()
            } else {
                format!("{prefix}{p}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
