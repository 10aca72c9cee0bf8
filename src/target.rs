use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Port used when the URL does not name one.
pub const HTTPS_PORT: u16 = 443;

/// Host and path a request is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    port: u16,
    path: String,
}

impl Target {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::InvalidArgument("Target host is empty".to_string()));
        }

        let mut path = path.into();
        if path.is_empty() {
            path.push('/');
        }

        Ok(Target {
            host,
            port: HTTPS_PORT,
            path,
        })
    }

    /// Parse a user-supplied URL, defaulting the scheme to https when the
    /// input has none.
    ///
    /// The transport is always TLS, so `http://` URLs still go to port 443
    /// unless a port is given explicitly.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let normalized = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&normalized)?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidArgument(format!("URL has no host: {}", input)))?;

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        let target = Target::new(host, path)?;
        Ok(target.with_port(url.port().unwrap_or(HTTPS_PORT)))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Host without IPv6 brackets, as used for DNS and SNI
    pub fn server_name(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == HTTPS_PORT {
            write!(f, "{}{}", self.host, self.path)
        } else {
            write!(f, "{}:{}{}", self.host, self.port, self.path)
        }
    }
}
