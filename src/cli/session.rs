use chrono::{Local, TimeDelta};
use tokio::time::Instant;

use crate::{Authenticator, AuthError, failure, info, success, warning};

/// Keeps the process, and with it the background refresh, alive until Ctrl-C.
pub async fn session(auth: &Authenticator) -> Result<(), AuthError> {
    match auth.username() {
        Some(username) => success!("Session active for {}", username),
        None => warning!("Not logged in, nothing to keep fresh"),
    }

    if let Some(due) = auth.session().refresh_due().await {
        let remaining = due.saturating_duration_since(Instant::now());
        if let Ok(delta) = TimeDelta::from_std(remaining) {
            let at = Local::now() + delta;
            info!("Next token refresh at {}", at.format("%H:%M:%S"));
        }
    }

    info!("Press Ctrl-C to exit");
    if let Err(e) = tokio::signal::ctrl_c().await {
        failure!("Cannot listen for Ctrl-C. Err: {}", e);
        return Err(e.into());
    }

    if auth.username().is_none() {
        warning!("Session ended while running");
    }
    Ok(())
}
