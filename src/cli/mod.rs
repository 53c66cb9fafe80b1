//! # CLI Module
//!
//! User-facing commands of the `ytauth` binary. Each command receives a
//! started [`crate::Authenticator`] and reports through the colored status
//! macros. A failed command prints why and returns the error, so the caller
//! can still shut the authenticator down before choosing the exit status.
//!
//! ```bash
//! ytauth login                     # consent with the default scopes
//! ytauth login youtube.force-ssl   # consent with an explicit scope
//! ytauth whoami --verify           # re-check the identity with the API
//! ytauth session                   # keep the session fresh until Ctrl-C
//! ytauth logout                    # forget the stored refresh token
//! ```

mod auth;
mod session;

pub use auth::login;
pub use auth::logout;
pub use auth::token;
pub use auth::whoami;
pub use session::session;
