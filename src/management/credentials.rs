//! Refresh-token persistence.
//!
//! One secret per username holds its refresh token. The slot under the empty
//! account name remembers which user is currently logged in, so a restarted
//! process can find the session without scanning the store.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use keyring::Entry;

use crate::error::AuthError;

/// Account name of the slot holding the currently remembered username.
pub const CURRENT_USER_ACCOUNT: &str = "";

/// Secret storage addressed by account name within one service.
///
/// `delete` succeeds when the secret does not exist.
pub trait CredentialStore: Send + Sync {
    fn get(&self, account: &str) -> Result<Option<String>, AuthError>;
    fn set(&self, account: &str, secret: &str) -> Result<(), AuthError>;
    fn delete(&self, account: &str) -> Result<(), AuthError>;
}

/// OS keychain backed store (`keyring` crate).
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service_name: String,
}

/// Some keychain backends reject empty account names.
const KEYRING_CURRENT_USER_ACCOUNT: &str = "@current-user";

impl KeyringStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, account: &str) -> Result<Entry, AuthError> {
        let account = if account == CURRENT_USER_ACCOUNT {
            KEYRING_CURRENT_USER_ACCOUNT
        } else {
            account
        };
        Ok(Entry::new(&self.service_name, account)?)
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, account: &str) -> Result<Option<String>, AuthError> {
        match self.entry(account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, account: &str, secret: &str) -> Result<(), AuthError> {
        Ok(self.entry(account)?.set_password(secret)?)
    }

    fn delete(&self, account: &str) -> Result<(), AuthError> {
        match self.entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, for tests and for running without a keychain.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn secrets(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.secrets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, account: &str) -> Result<Option<String>, AuthError> {
        Ok(self.secrets().get(account).cloned())
    }

    fn set(&self, account: &str, secret: &str) -> Result<(), AuthError> {
        self.secrets()
            .insert(account.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, account: &str) -> Result<(), AuthError> {
        self.secrets().remove(account);
        Ok(())
    }
}
