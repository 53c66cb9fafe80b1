//! Bounded parser for the request line of the redirect callback.
//!
//! Only the first line of a request matters here. Headers and bodies are
//! never read; anything that does not fit a CRLF-terminated request line in
//! [`MAX_REQUEST_LINE`] bytes is given up on.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Read budget for the request line, CRLF included.
pub const MAX_REQUEST_LINE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`, empty if there was none.
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRequest {
    /// No CRLF within the budget, or the peer closed early.
    Incomplete,
    /// A request line that is not `METHOD TARGET VERSION` in UTF-8.
    Malformed,
    Parsed(RequestLine),
}

/// Parses the request line at the start of `buf`.
pub fn parse_request_line(buf: &[u8]) -> ParsedRequest {
    let Some(end) = buf.windows(2).position(|w| w == b"\r\n") else {
        return ParsedRequest::Incomplete;
    };
    let Ok(line) = std::str::from_utf8(&buf[..end]) else {
        return ParsedRequest::Malformed;
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let &[method, target, _version] = tokens.as_slice() else {
        return ParsedRequest::Malformed;
    };
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    ParsedRequest::Parsed(RequestLine {
        method: method.to_string(),
        path: path.to_string(),
        query: query.to_string(),
    })
}

/// Reads from `reader` until a request line is complete or the budget is spent.
pub async fn read_request_line<R>(reader: &mut R) -> ParsedRequest
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; MAX_REQUEST_LINE];
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) | Err(_) => return ParsedRequest::Incomplete,
            Ok(read) => filled += read,
        }
        match parse_request_line(&buf[..filled]) {
            ParsedRequest::Incomplete => continue,
            parsed => return parsed,
        }
    }

    ParsedRequest::Incomplete
}
