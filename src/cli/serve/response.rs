//! HTTP replies and how they are written to the wire.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::utils::mime::types;

/// A complete response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    fn plain(status: u16, text: &str) -> Self {
        Self {
            status,
            content_type: types::PLAIN,
            body: text.as_bytes().to_vec(),
        }
    }

    pub fn not_found() -> Self {
        Self::plain(404, "404 Not Found")
    }

    /// Render failures stay in the terminal; the client only sees the status.
    pub fn internal_error() -> Self {
        Self::plain(500, "500 Internal Server Error")
    }

    pub fn method_not_allowed() -> Self {
        Self::plain(405, "405 Method Not Allowed")
    }

    pub fn unavailable() -> Self {
        Self::plain(503, "503 Service Unavailable")
    }
}

/// Write `reply`.
///
/// HEAD requests get the same status and headers, including the GET body's
/// `Content-Length`; tiny_http withholds the body itself.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(make_header("Content-Type", reply.content_type)?)
        .with_header(make_header("Cache-Control", "no-store")?);
    if reply.status == 405 {
        response.add_header(make_header("Allow", "GET, HEAD")?);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}
