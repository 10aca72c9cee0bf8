mod tls;

use crate::error::Result;
use crate::target::{HTTPS_PORT, Target};
use std::borrow::Cow;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

pub use tls::TlsExecutor;

/// Status recorded when the status line is missing or not numeric
pub const UNKNOWN_STATUS: u16 = 0;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Bound on establishing the TCP connection, shared by all resolved
    /// addresses. Reads are not bounded.
    pub connect_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// One request/response cycle against a target
pub trait Execute {
    fn execute(&self, target: &Target) -> Result<Response>;
}

/// Raw response bytes and the status parsed from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    raw: Vec<u8>,
    status: u16,
}

impl Response {
    pub fn new(raw: Vec<u8>) -> Self {
        let status = parse_status(&raw);
        Response { raw, status }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Size in bytes, headers included
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Build the HTTP/1.0 request sent for a target
pub fn build_request(target: &Target) -> String {
    let host = if target.port() == HTTPS_PORT {
        Cow::Borrowed(target.host())
    } else {
        Cow::Owned(format!("{}:{}", target.host(), target.port()))
    };
    format!("GET {} HTTP/1.0\r\nHost: {}\r\n\r\n", target.path(), host)
}

/// Write the request and read until the peer closes the stream
pub fn exchange<S: Read + Write>(stream: &mut S, target: &Target) -> Result<Response> {
    stream.write_all(build_request(target).as_bytes())?;
    stream.flush()?;

    let raw = read_to_close(stream)?;
    Ok(Response::new(raw))
}

fn read_to_close<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            // Peers that drop the TCP connection without close_notify
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(raw)
}

/// Parse the status code from the second token of the status line.
///
/// Returns `UNKNOWN_STATUS` for an empty response, a missing token or a
/// token that is not a number.
pub fn parse_status(raw: &[u8]) -> u16 {
    let line_end = raw
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(raw.len());
    let line = String::from_utf8_lossy(&raw[..line_end]);

    line.split_whitespace()
        .nth(1)
        .and_then(|token| token.parse().ok())
        .unwrap_or(UNKNOWN_STATUS)
}
