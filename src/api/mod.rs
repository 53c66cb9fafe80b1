//! # API Module
//!
//! The browser-facing side of the login flow: the handler that serves each
//! connection accepted by the local redirect listener.
//!
//! ## Recognized requests
//!
//! | Request | Response |
//! |---|---|
//! | `GET /?state=<nonce>&code=<code>` | `302` to `/`, resolves the pending login |
//! | `GET /?state=<nonce>&error=<error>` | `302` to `/denied`, resolves the pending login |
//! | `GET /` | `200` success landing page |
//! | `GET /denied` | `200` access denied landing page |
//!
//! Everything else, including callbacks whose `state` does not belong to a
//! pending login, is dropped without a response.

mod callback;
pub mod request;

pub use callback::{Route, handle_connection, route};
pub use request::{MAX_REQUEST_LINE, ParsedRequest, RequestLine, parse_request_line};
