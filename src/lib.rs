//! ytauth Library
//!
//! Local OAuth2 authorization-code login for the YouTube Data API. The user's
//! browser is sent to Google's consent page and the redirect comes back to a
//! loopback listener inside this process. The resulting session keeps its
//! access token fresh in the background and remembers the refresh token in
//! the OS keychain.
//!
//! # Modules
//!
//! - `api` - Request parsing and handling for the local redirect listener
//! - `authenticator` - Composition root: `login`, `logout` and session reads
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Error taxonomy
//! - `management` - Credential store, login correlation and session state
//! - `server` - Loopback listener receiving the OAuth redirect
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `youtube` - Google OAuth and YouTube Data API client
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ytauth::{authenticator::{Authenticator, SystemBrowser}, config::Config};
//! use ytauth::{management::KeyringStore, youtube::GoogleClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ytauth::AuthError> {
//!     let config = Config::from_env()?;
//!     let google = Arc::new(GoogleClient::new(config.clone())?);
//!     let store = Arc::new(KeyringStore::new(&config.service_name));
//!     let auth = Authenticator::start(config, store, google, Arc::new(SystemBrowser)).await?;
//!     let user = auth.login(&[]).await?;
//!     println!("logged in as {user}");
//!     auth.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod authenticator;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod types;
pub mod utils;
pub mod youtube;

pub use authenticator::Authenticator;
pub use error::AuthError;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Switch to your browser in order to authenticate");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Successfully authenticated as {}", username);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors before anything has been started; library code
/// returns [`AuthError`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints an error message with a red exclamation mark and returns.
///
/// For command failures that still need the caller to release resources
/// before the process exits.
#[macro_export]
macro_rules! failure {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
