//! Session management: credential persistence, login correlation and the
//! shared session with its refresh schedule.

pub mod credentials;
pub mod pending;
pub mod session;

pub use credentials::{CredentialStore, KeyringStore, MemoryStore};
pub use pending::{PendingLogin, PendingRequests};
pub use session::Session;
