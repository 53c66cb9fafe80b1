use std::{collections::HashMap, time::Duration};

use ytauth::{AuthError, config::*};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

const REQUIRED: [(&str, &str); 3] = [
    ("YTAUTH_CLIENT_ID", "id"),
    ("YTAUTH_CLIENT_SECRET", "secret"),
    ("YTAUTH_API_KEY", "key"),
];

#[test]
fn test_defaults() {
    let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

    assert_eq!(config.client_id, "id");
    assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
    assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.scope_prefix, DEFAULT_SCOPE_PREFIX);
    assert_eq!(config.default_scopes, DEFAULT_SCOPES);
    assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
    assert_eq!(config.login_timeout, Some(Duration::from_secs(300)));
    assert_eq!(config.read_timeout, Duration::from_secs(10));
    assert_eq!(config.http_timeout, Duration::from_secs(30));
}

#[test]
fn test_missing_credentials() {
    let result = Config::from_lookup(lookup(&REQUIRED[..2]));
    assert!(matches!(result, Err(AuthError::Config(msg)) if msg.contains("YTAUTH_API_KEY")));

    // Blank values count as missing
    let mut pairs = REQUIRED.to_vec();
    pairs[0] = ("YTAUTH_CLIENT_ID", "  ");
    assert!(Config::from_lookup(lookup(&pairs)).is_err());
}

#[test]
fn test_overrides() {
    let mut pairs = REQUIRED.to_vec();
    pairs.extend([
        ("YTAUTH_SERVICE_NAME", "my-app"),
        ("YTAUTH_DEFAULT_SCOPES", "youtube youtube.upload"),
        ("YTAUTH_LOGIN_TIMEOUT_SECS", "0"),
        ("YTAUTH_READ_TIMEOUT_SECS", " 3 "),
    ]);
    let config = Config::from_lookup(lookup(&pairs)).unwrap();

    assert_eq!(config.service_name, "my-app");
    assert_eq!(config.default_scopes, "youtube youtube.upload");
    assert_eq!(config.login_timeout, None);
    assert_eq!(config.read_timeout, Duration::from_secs(3));
}

#[test]
fn test_invalid_number() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("YTAUTH_HTTP_TIMEOUT_SECS", "soon"));

    assert!(matches!(
        Config::from_lookup(lookup(&pairs)),
        Err(AuthError::Config(msg)) if msg.contains("YTAUTH_HTTP_TIMEOUT_SECS")
    ));
}

#[test]
fn test_env_path_is_under_app_directory() {
    let path = env_path();
    assert!(path.ends_with("ytauth/.env"));
}
