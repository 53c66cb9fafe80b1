use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Authenticator, AuthError, failure, info, success, warning, youtube::YoutubeApi};

pub async fn login(auth: &Authenticator, scopes: &[String]) -> Result<(), AuthError> {
    if let Some(current) = auth.username() {
        info!("Currently logged in as {}, starting a new login", current);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Waiting for authorization in the browser...");

    let result = auth.login(scopes).await;
    spinner.finish_and_clear();

    match result {
        Ok(username) => {
            success!("Successfully authenticated as {}", username);
            Ok(())
        }
        Err(e) => {
            match &e {
                AuthError::Denied(reason) => failure!("Authorization was denied: {}", reason),
                AuthError::Timeout => failure!("No authorization received in time"),
                other => failure!("Login failed. Err: {}", other),
            }
            Err(e)
        }
    }
}

pub async fn logout(auth: &Authenticator) -> Result<(), AuthError> {
    match auth.username() {
        Some(username) => {
            auth.logout().await;
            success!("Logged out {}", username);
        }
        None => warning!("Not logged in"),
    }
    Ok(())
}

/// Shows the session user, optionally confirmed by a data API call.
pub async fn whoami(auth: &Authenticator, api: &YoutubeApi, verify: bool) -> Result<(), AuthError> {
    let Some(username) = auth.username() else {
        warning!("Not logged in");
        return Ok(());
    };

    if !verify {
        info!("Logged in as {}", username);
        return Ok(());
    }

    match api.my_channel_title().await {
        Ok(title) if title == username => success!("Logged in as {} (verified)", title),
        Ok(title) => warning!("Logged in as {}, but the channel is now named {}", username, title),
        Err(AuthError::Unauthorized) => {
            failure!("Access was revoked, you have been logged out");
            return Err(AuthError::Unauthorized);
        }
        Err(e) => {
            failure!("Cannot verify session. Err: {}", e);
            return Err(e);
        }
    }
    Ok(())
}

/// Prints the bare access token so it can be piped into other tools.
pub async fn token(auth: &Authenticator) -> Result<(), AuthError> {
    let token = auth.access_token();
    if token.is_empty() {
        failure!("Not logged in");
        return Err(AuthError::NotLoggedIn);
    }
    println!("{}", token);
    Ok(())
}
