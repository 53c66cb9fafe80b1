//! Correlation of in-flight logins with their browser redirects.
//!
//! Every `login()` registers a fresh nonce that travels to the provider as the
//! `state` parameter. The callback handler delivers whatever the redirect
//! carried under that nonce, and only the login that registered it is woken.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::sync::oneshot;
use tracing::debug;

use crate::{error::AuthError, types::CallbackResult, utils};

#[derive(Default)]
struct Table {
    /// `None` once a result was delivered and the entry waits to be consumed.
    entries: HashMap<String, Option<oneshot::Sender<CallbackResult>>>,
    closed: bool,
}

#[derive(Default)]
pub struct PendingRequests {
    table: Mutex<Table>,
}

impl PendingRequests {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        match self.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers a new pending login under a nonce unique among pending ones.
    pub fn register(self: &Arc<Self>) -> Result<PendingLogin, AuthError> {
        let mut table = self.table();
        if table.closed {
            return Err(AuthError::Cancelled);
        }

        let mut nonce = utils::generate_nonce();
        while table.entries.contains_key(&nonce) {
            nonce = utils::generate_nonce();
        }

        let (sender, receiver) = oneshot::channel();
        table.entries.insert(nonce.clone(), Some(sender));
        debug!(pending = table.entries.len(), "registered login request");

        Ok(PendingLogin {
            nonce,
            receiver: Some(receiver),
            table: Arc::clone(self),
        })
    }

    /// Stores `result` for `nonce` and wakes its waiter.
    ///
    /// Returns `false` without side effects if the nonce is unknown or already
    /// received a result; the first delivery wins.
    pub fn deliver(&self, nonce: &str, result: CallbackResult) -> bool {
        let mut table = self.table();
        let Some(slot) = table.entries.get_mut(nonce) else {
            return false;
        };
        let Some(sender) = slot.take() else {
            return false;
        };
        // A dropped receiver means the login gave up; the entry is removed by its guard.
        let _ = sender.send(result);
        true
    }

    /// Whether `nonce` is registered and still waiting for its result.
    pub fn is_pending(&self, nonce: &str) -> bool {
        matches!(self.table().entries.get(nonce), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.table().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails every pending login with `Cancelled` and refuses new ones.
    pub fn close(&self) {
        let mut table = self.table();
        table.closed = true;
        table.entries.clear();
    }

    fn remove(&self, nonce: &str) {
        self.table().entries.remove(nonce);
    }
}

/// Handle of one registered login. Dropping it removes the table entry.
pub struct PendingLogin {
    nonce: String,
    receiver: Option<oneshot::Receiver<CallbackResult>>,
    table: Arc<PendingRequests>,
}

impl PendingLogin {
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Waits for the redirect carrying this login's nonce.
    ///
    /// With `timeout` set, an abandoned browser flow turns into
    /// [`AuthError::Timeout`]; closing the table yields [`AuthError::Cancelled`].
    pub async fn wait(mut self, timeout: Option<Duration>) -> Result<CallbackResult, AuthError> {
        let Some(receiver) = self.receiver.take() else {
            return Err(AuthError::Cancelled);
        };

        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, receiver)
                .await
                .map_err(|_| AuthError::Timeout)?,
            None => receiver.await,
        };
        received.map_err(|_| AuthError::Cancelled)
    }
}

impl Drop for PendingLogin {
    fn drop(&mut self) {
        self.table.remove(&self.nonce);
    }
}
