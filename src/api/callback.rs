use std::{sync::Arc, time::Duration};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::{
    api::request::{ParsedRequest, RequestLine, read_request_line},
    management::PendingRequests,
    types::CallbackResult,
};

const SUCCESS_PAGE: &str = "<html><head><title>Success</title></head><body>\
<h1>Successfully authenticated.</h1><p>You may now close this page.</p></body></html>";

const DENIED_PAGE: &str = "<html><head><title>Access denied</title></head><body>\
<h1>You denied the access request.</h1>\
<p>The related functionality will not be enabled.</p></body></html>";

/// What a recognized callback request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/?state=..&code=..` or `/?state=..&error=..` from the provider.
    Deliver {
        state: String,
        result: CallbackResult,
    },
    /// `/` after a successful delivery redirect.
    Success,
    /// `/denied` after a refused authorization.
    Denied,
}

/// Classifies a request line. `None` means the connection is abandoned.
pub fn route(request: &RequestLine) -> Option<Route> {
    if request.method != "GET" {
        return None;
    }

    match request.path.as_str() {
        "/" if !request.query.is_empty() => parse_delivery(&request.query),
        "/" => Some(Route::Success),
        "/denied" => Some(Route::Denied),
        _ => None,
    }
}

/// Needs a single `state` and exactly one of `code` or `error`; a repeated
/// parameter is treated like a missing one.
fn parse_delivery(query: &str) -> Option<Route> {
    let mut state = None;
    let mut code = None;
    let mut error = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            "state" => &mut state,
            "code" => &mut code,
            "error" => &mut error,
            _ => continue,
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(value.into_owned());
    }

    let result = match (code, error) {
        (Some(code), None) => CallbackResult::Code(code),
        (None, Some(error)) => CallbackResult::Error(error),
        _ => return None,
    };
    Some(Route::Deliver {
        state: state?,
        result,
    })
}

fn redirect(location: &str) -> Vec<u8> {
    format!(
        "HTTP/1.0 302 Found\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )
    .into_bytes()
}

fn page(html: &str) -> Vec<u8> {
    format!(
        "HTTP/1.0 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        html.len(),
        html
    )
    .into_bytes()
}

/// Serves one accepted connection of the redirect listener.
///
/// Unrecognized, malformed or unsolicited requests get no response at all.
/// The stream is dropped, and thereby closed, on every return path.
pub async fn handle_connection<S>(
    mut stream: S,
    pending: Arc<PendingRequests>,
    read_timeout: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let parsed = match tokio::time::timeout(read_timeout, read_request_line(&mut stream)).await {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!("request line not received in time");
            return;
        }
    };
    let request = match parsed {
        ParsedRequest::Parsed(request) => request,
        other => {
            debug!(?other, "abandoning connection");
            return;
        }
    };
    let Some(target) = route(&request) else {
        debug!(method = %request.method, path = %request.path, "ignoring request");
        return;
    };

    let response = match target {
        Route::Deliver { state, result } => {
            let location = match result {
                CallbackResult::Code(_) => "/",
                CallbackResult::Error(_) => "/denied",
            };
            if !pending.deliver(&state, result) {
                warn!("callback does not match any pending login");
                return;
            }
            redirect(location)
        }
        Route::Success => page(SUCCESS_PAGE),
        Route::Denied => page(DENIED_PAGE),
    };

    if let Err(e) = stream.write_all(&response).await {
        debug!(error = %e, "failed writing callback response");
        return;
    }
    let _ = stream.shutdown().await;
}
