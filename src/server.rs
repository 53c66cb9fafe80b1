use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{api, error::AuthError, management::PendingRequests};

/// Local listener receiving the provider's redirect.
///
/// Bound to loopback on an OS-assigned port for the lifetime of the owner.
/// Dropping it stops the accept loop and releases the port.
pub struct CallbackServer {
    addr: SocketAddr,
    accept_loop: Option<JoinHandle<()>>,
}

impl CallbackServer {
    pub async fn bind(
        pending: Arc<PendingRequests>,
        read_timeout: Duration,
    ) -> Result<Self, AuthError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        info!(port = addr.port(), "redirect listener bound");

        let accept_loop = tokio::spawn(accept_loop(listener, pending, read_timeout));
        Ok(Self {
            addr,
            accept_loop: Some(accept_loop),
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The `redirect_uri` registered with the provider for this process.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.addr.port())
    }

    /// Stops accepting and waits until the listening socket is closed.
    pub async fn shutdown(&mut self) {
        if let Some(accept_loop) = self.accept_loop.take() {
            accept_loop.abort();
            let _ = accept_loop.await;
            info!(port = self.addr.port(), "redirect listener closed");
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(accept_loop) = self.accept_loop.take() {
            accept_loop.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, pending: Arc<PendingRequests>, read_timeout: Duration) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted callback connection");
                tokio::spawn(api::handle_connection(
                    stream,
                    Arc::clone(&pending),
                    read_timeout,
                ));
            }
            Err(e) => {
                // Typically fd exhaustion; back off instead of spinning.
                warn!(error = %e, "failed to accept callback connection");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
