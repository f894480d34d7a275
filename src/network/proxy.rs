//! Proxied transport
//!
//! A [`Connector`] hands out byte-level [`Connection`]s to a provider host.
//! [`fetch_via_proxy`] writes a raw HTTP/1.1 request over one, reads until
//! the peer closes, then splits the status line and headers off the body.

use super::accumulator::ResponseBuffer;
use super::error::TransportError;
use crate::engines::EngineRequest;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Size of each read from a proxied connection
const READ_CHUNK: usize = 4096;

/// Upper bound on a proxy's CONNECT reply head
const MAX_CONNECT_REPLY: usize = 4096;

/// An open byte stream to a provider
#[async_trait]
pub trait Connection: Send {
    /// Write all of `bytes`, returning how many were written
    async fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read into `buf`; `Ok(0)` means the peer closed cleanly
    async fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Shut the stream down
    async fn close(self: Box<Self>);
}

/// Source of proxied connections
#[async_trait]
pub trait Connector: Send + Sync {
    /// Whether requests should be routed through this connector
    fn is_enabled(&self) -> bool;

    /// Open a connection to `host:port` through the proxy
    async fn open(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, TransportError>;
}

/// Connector used when no proxy is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProxy;

#[async_trait]
impl Connector for DisabledProxy {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn open(
        &self,
        host: &str,
        port: u16,
        _timeout: Duration,
    ) -> Result<Box<dyn Connection>, TransportError> {
        Err(TransportError::Connect {
            host: host.to_string(),
            port,
            reason: "no proxy configured".to_string(),
        })
    }
}

/// HTTP CONNECT tunnel with TLS to the target host
#[derive(Debug, Clone)]
pub struct TunnelConnector {
    proxy_host: String,
    proxy_port: u16,
}

impl TunnelConnector {
    pub fn new(proxy_host: impl Into<String>, proxy_port: u16) -> Self {
        Self {
            proxy_host: proxy_host.into(),
            proxy_port,
        }
    }

    fn connect_error(&self, reason: impl Into<String>) -> TransportError {
        TransportError::Connect {
            host: self.proxy_host.clone(),
            port: self.proxy_port,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Connector for TunnelConnector {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn open(
        &self,
        host: &str,
        port: u16,
        limit: Duration,
    ) -> Result<Box<dyn Connection>, TransportError> {
        let mut stream = timeout(
            limit,
            TcpStream::connect((self.proxy_host.as_str(), self.proxy_port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(limit))?
        .map_err(|e| self.connect_error(e.to_string()))?;

        let connect = format!(
            "CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n\r\n"
        );
        stream
            .write_all(connect.as_bytes())
            .await
            .map_err(TransportError::Write)?;

        let mut reply = Vec::with_capacity(256);
        let mut piece = [0u8; 512];
        while !reply.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = timeout(limit, stream.read(&mut piece))
                .await
                .map_err(|_| TransportError::Timeout(limit))?
                .map_err(TransportError::Read)?;
            if n == 0 {
                return Err(self.connect_error("proxy closed the tunnel during CONNECT"));
            }
            reply.extend_from_slice(&piece[..n]);
            if reply.len() > MAX_CONNECT_REPLY {
                return Err(self.connect_error("oversized CONNECT reply"));
            }
        }

        match parse_status(&reply) {
            Some(200) => {}
            Some(status) => {
                return Err(self.connect_error(format!("CONNECT refused with {status}")));
            }
            None => return Err(self.connect_error("malformed CONNECT reply")),
        }

        let tls = native_tls::TlsConnector::new().map_err(|e| self.connect_error(e.to_string()))?;
        let tls = tokio_native_tls::TlsConnector::from(tls);
        let stream = timeout(limit, tls.connect(host, stream))
            .await
            .map_err(|_| TransportError::Timeout(limit))?
            .map_err(|e| self.connect_error(format!("TLS handshake with {host}: {e}")))?;

        debug!("Tunnel to {}:{} open via {}:{}", host, port, self.proxy_host, self.proxy_port);
        Ok(Box::new(TlsConnection { stream }))
    }
}

struct TlsConnection {
    stream: tokio_native_tls::TlsStream<TcpStream>,
}

#[async_trait]
impl Connection for TlsConnection {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.stream.write_all(bytes).await?;
        Ok(bytes.len())
    }

    async fn read(&mut self, buf: &mut [u8], limit: Duration) -> io::Result<usize> {
        timeout(limit, self.stream.read(buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "read timed out"))?
    }

    async fn close(mut self: Box<Self>) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("TLS shutdown failed: {}", e);
        }
    }
}

/// Status code from an `HTTP/x.y NNN ...` head, if there is one
pub(crate) fn parse_status(head: &[u8]) -> Option<u16> {
    if !head.starts_with(b"HTTP/") {
        return None;
    }
    let space = head.iter().position(|&b| b == b' ')?;
    let digits: Vec<u8> = head[space + 1..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .copied()
        .collect();
    std::str::from_utf8(&digits).ok()?.parse().ok()
}

/// Whether the response head announces a chunked body
pub(crate) fn is_chunked(head: &[u8]) -> bool {
    String::from_utf8_lossy(head)
        .split("\r\n")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .any(|(name, value)| {
            name.trim().eq_ignore_ascii_case("transfer-encoding")
                && value.to_ascii_lowercase().contains("chunked")
        })
}

/// Run `request` over a proxied connection, leaving the body in `buffer`.
///
/// Returns the parsed status, or 0 when the reply carried no status line.
pub async fn fetch_via_proxy(
    connector: &dyn Connector,
    request: &EngineRequest,
    buffer: &mut ResponseBuffer,
    limit: Duration,
) -> Result<u16, TransportError> {
    let url = Url::parse(&request.url)?;
    let host = url
        .host_str()
        .ok_or(url::ParseError::EmptyHost)?
        .to_string();
    let port = url.port_or_known_default().unwrap_or(443);
    let target = &url[url::Position::BeforePath..url::Position::AfterQuery];

    let mut conn = connector.open(&host, port, limit).await?;

    let head = request.to_http1(&host, target);
    if let Err(e) = conn.write(head.as_bytes()).await {
        conn.close().await;
        return Err(TransportError::Write(e));
    }

    let mut piece = vec![0u8; READ_CHUNK];
    loop {
        match conn.read(&mut piece, limit).await {
            Ok(0) => break,
            Ok(n) => buffer.feed(&piece[..n]),
            Err(e) => {
                conn.close().await;
                return Err(if e.kind() == io::ErrorKind::TimedOut {
                    TransportError::Timeout(limit)
                } else {
                    TransportError::Read(e)
                });
            }
        }
    }
    conn.close().await;

    let status = parse_status(buffer.as_bytes()).unwrap_or(0);
    let chunked = is_chunked(buffer.as_bytes());
    if buffer.discard_through(b"\r\n\r\n") && chunked {
        buffer.decode_chunked();
    }
    debug!("Proxied {} returned {}, {} body bytes", host, status, buffer.len());
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::FillMode;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        replies: VecDeque<io::Result<Vec<u8>>>,
        written: Arc<Mutex<Vec<u8>>>,
    }

    #[async_trait]
    impl Connection for Scripted {
        async fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.written.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        async fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
            match self.replies.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
            }
        }

        async fn close(self: Box<Self>) {}
    }

    struct ScriptedConnector {
        replies: Mutex<Option<Vec<io::Result<Vec<u8>>>>>,
        written: Arc<Mutex<Vec<u8>>>,
        opened: Mutex<Vec<(String, u16)>>,
    }

    impl ScriptedConnector {
        fn new(replies: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                replies: Mutex::new(Some(replies)),
                written: Arc::new(Mutex::new(Vec::new())),
                opened: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        fn is_enabled(&self) -> bool {
            true
        }

        async fn open(
            &self,
            host: &str,
            port: u16,
            _timeout: Duration,
        ) -> Result<Box<dyn Connection>, TransportError> {
            self.opened.lock().unwrap().push((host.to_string(), port));
            let replies = self.replies.lock().unwrap().take().unwrap_or_default();
            Ok(Box::new(Scripted {
                replies: replies.into(),
                written: self.written.clone(),
            }))
        }
    }

    fn request() -> EngineRequest {
        EngineRequest::get("https://api.search.brave.com/res/v1/web/search?q=rust&count=5")
            .header("Accept", "application/json")
            .header("X-Subscription-Token", "secret")
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(b"HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status(b"HTTP/1.0 429 Too Many"), Some(429));
        assert_eq!(parse_status(b"garbage"), None);
        assert_eq!(parse_status(b"HTTP/1.1 abc"), None);
    }

    #[tokio::test]
    async fn test_fetch_strips_head_and_reports_status() {
        let connector = ScriptedConnector::new(vec![
            Ok(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n".to_vec()),
            Ok(b"\r\n{\"web\":".to_vec()),
            Ok(b"{\"results\":[]}}".to_vec()),
        ]);
        let mut buffer = ResponseBuffer::with_capacity(1024, FillMode::Record).unwrap();

        let status = fetch_via_proxy(&connector, &request(), &mut buffer, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(status, 200);
        assert_eq!(buffer.as_text(), "{\"web\":{\"results\":[]}}");
        assert_eq!(
            connector.opened.lock().unwrap().as_slice(),
            &[("api.search.brave.com".to_string(), 443)]
        );

        let written = String::from_utf8(connector.written.lock().unwrap().clone()).unwrap();
        assert!(written.starts_with("GET /res/v1/web/search?q=rust&count=5 HTTP/1.1\r\n"));
        assert!(written.contains("Host: api.search.brave.com\r\n"));
        assert!(written.contains("X-Subscription-Token: secret\r\n"));
        assert!(written.contains("Connection: close\r\n"));
        assert!(written.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_is_chunked() {
        assert!(is_chunked(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n"));
        assert!(is_chunked(b"HTTP/1.1 200 OK\r\ntransfer-encoding: gzip, Chunked\r\n\r\n"));
        assert!(!is_chunked(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n"));
        assert!(!is_chunked(b"HTTP/1.1 200 OK\r\n\r\nTransfer-Encoding: chunked\r\n"));
    }

    #[tokio::test]
    async fn test_fetch_decodes_chunked_body() {
        let connector = ScriptedConnector::new(vec![
            Ok(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n8\r\n{\"web\":{".to_vec()),
            Ok(b"\r\ne\r\n\"results\":[]}}\r\n0\r\n\r\n".to_vec()),
        ]);
        let mut buffer = ResponseBuffer::with_capacity(1024, FillMode::Record).unwrap();

        let status = fetch_via_proxy(&connector, &request(), &mut buffer, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(status, 200);
        assert_eq!(buffer.as_text(), "{\"web\":{\"results\":[]}}");
    }

    #[tokio::test]
    async fn test_fetch_surfaces_upstream_status() {
        let connector = ScriptedConnector::new(vec![Ok(
            b"HTTP/1.1 401 Unauthorized\r\n\r\n{}".to_vec()
        )]);
        let mut buffer = ResponseBuffer::with_capacity(256, FillMode::Record).unwrap();

        let status = fetch_via_proxy(&connector, &request(), &mut buffer, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_fetch_read_timeout_is_transport_error() {
        let connector = ScriptedConnector::new(vec![
            Ok(b"HTTP/1.1 200 OK\r\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
        ]);
        let mut buffer = ResponseBuffer::with_capacity(256, FillMode::Record).unwrap();

        let err = fetch_via_proxy(&connector, &request(), &mut buffer, Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_disabled_proxy_refuses() {
        let proxy = DisabledProxy;
        assert!(!proxy.is_enabled());
        let result = proxy.open("example.com", 443, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }
}
