use super::{Execute, ExecutorConfig, Response, exchange};
use crate::error::{Error, Result};
use crate::target::Target;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use std::io::{self, ErrorKind, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request executor over a fresh TLS connection per call
pub struct TlsExecutor {
    tls: Arc<ClientConfig>,
    connect_timeout: Duration,
}

impl TlsExecutor {
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(TlsExecutor {
            tls: Arc::new(tls),
            connect_timeout: config.connect_timeout,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    fn connect(&self, target: &Target) -> Result<TcpStream> {
        let host = target.server_name();
        let addrs = (host, target.port())
            .to_socket_addrs()
            .map_err(|e| Error::Resolve {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        connect_within(host, addrs, self.connect_timeout)
    }
}

/// Try each address in turn until one connects or the timeout is used up
fn connect_within(
    host: &str,
    addrs: impl IntoIterator<Item = SocketAddr>,
    timeout: Duration,
) -> Result<TcpStream> {
    let deadline = Instant::now() + timeout;
    let mut last_error = None;

    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            last_error = Some(Error::Connect {
                addr,
                source: io::Error::new(ErrorKind::TimedOut, "connect timeout elapsed"),
            });
            break;
        }

        match TcpStream::connect_timeout(&addr, remaining) {
            Ok(stream) => return Ok(stream),
            Err(source) => last_error = Some(Error::Connect { addr, source }),
        }
    }

    Err(last_error.unwrap_or_else(|| Error::Resolve {
        host: host.to_string(),
        reason: "no addresses found".to_string(),
    }))
}

impl Execute for TlsExecutor {
    fn execute(&self, target: &Target) -> Result<Response> {
        let server_name = ServerName::try_from(target.server_name().to_string())
            .map_err(|_| Error::InvalidServerName(target.server_name().to_string()))?;

        let tcp = self.connect(target)?;
        let conn = ClientConnection::new(Arc::clone(&self.tls), server_name)?;
        let mut stream = StreamOwned::new(conn, tcp);

        while stream.conn.is_handshaking() {
            stream
                .conn
                .complete_io(&mut stream.sock)
                .map_err(|e| handshake_error(target.server_name(), e))?;
        }

        let response = exchange(&mut stream, target)?;

        stream.conn.send_close_notify();
        let _ = stream.flush();

        Ok(response)
    }
}

/// Classify a handshake failure as a connection error
fn handshake_error(host: &str, err: io::Error) -> Error {
    if let Some(tls) = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
    {
        return Error::Tls(tls.clone());
    }

    Error::Handshake {
        host: host.to_string(),
        source: err,
    }
}
