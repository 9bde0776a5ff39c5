//! Builtin stream transport: minimal HTTP over a TCP stream.
//!
//! Speaks HTTP/1.0 so the response body is delimited by EOF rather than
//! chunked framing. A configured proxy is dialed as a plain TCP target and
//! receives absolute-URI requests; HTTPS targets are reached through a
//! CONNECT tunnel and a TLS wrap.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use url::Url;

use super::Transport;
use crate::core::response;
use crate::data::options::{CONNECT_TIMEOUT, USER_AGENT};
use crate::data::proxy::ProxyDescriptor;
use crate::error::FetchError;

/// Prebuilt option bag for the stream strategy.
#[derive(Debug, Clone)]
struct StreamConfig {
    proxy: Option<StreamProxy>,
}

#[derive(Debug, Clone)]
struct StreamProxy {
    /// `host[:port]` of the proxy, dialed as a plain TCP target.
    target: String,
    /// base64(`login:password`), sent as both `Proxy-Authorization` and
    /// a mirrored `Authorization` Basic header.
    auth: Option<String>,
}

pub(crate) struct StreamTransport {
    config: StreamConfig,
}

impl StreamTransport {
    pub(crate) fn new(proxy: Option<&ProxyDescriptor>) -> Self {
        let proxy = proxy.map(|p| StreamProxy {
            target: p.address().to_string(),
            auth: p
                .login()
                .zip(p.password())
                .map(|(login, password)| STANDARD.encode(format!("{login}:{password}"))),
        });
        Self {
            config: StreamConfig { proxy },
        }
    }

    fn exchange(&self, url: &str, post_body: Option<&str>) -> io::Result<Vec<u8>> {
        let target = Url::parse(url).map_err(io::Error::other)?;
        let host = target
            .host_str()
            .ok_or_else(|| io::Error::other(format!("URL '{url}' has no host")))?
            .to_string();
        let secure = target.scheme().eq_ignore_ascii_case("https");
        let port = target
            .port_or_known_default()
            .unwrap_or(if secure { 443 } else { 80 });
        let host_header = match target.port() {
            Some(explicit) => format!("{host}:{explicit}"),
            None => host.clone(),
        };

        let mut stream = match &self.config.proxy {
            Some(proxy) => connect(&proxy.target)?,
            None => connect(&format!("{host}:{port}"))?,
        };
        stream.set_read_timeout(Some(CONNECT_TIMEOUT))?;
        stream.set_write_timeout(Some(CONNECT_TIMEOUT))?;

        // Origin-form target by default; absolute-form when the request
        // goes through the proxy un-tunneled.
        let mut request_target = path_and_query(&target);
        let mut proxy_auth = None;
        if let Some(proxy) = &self.config.proxy {
            proxy_auth = proxy.auth.as_deref();
            if secure {
                open_tunnel(&mut stream, &host, port, proxy_auth)?;
            } else {
                request_target = url.to_string();
            }
        }

        let mut wire = if secure {
            secure_wrap(&host, stream)?
        } else {
            Wire::Plain(stream)
        };

        let method = if post_body.is_some() { "POST" } else { "GET" };
        let mut request = format!(
            "{method} {request_target} HTTP/1.0\r\nHost: {host_header}\r\nUser-Agent: {USER_AGENT}\r\n"
        );
        if let Some(auth) = proxy_auth {
            request.push_str(&format!(
                "Proxy-Authorization: Basic {auth}\r\nAuthorization: Basic {auth}\r\n"
            ));
        }
        if let Some(body) = post_body {
            request.push_str(&format!(
                "Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n",
                body.len()
            ));
        }
        request.push_str("Connection: close\r\n\r\n");

        tracing::debug!(%url, method, via_proxy = self.config.proxy.is_some(), "sending stream request");

        wire.write_all(request.as_bytes())?;
        if let Some(body) = post_body {
            wire.write_all(body.as_bytes())?;
        }
        wire.flush()?;

        let mut raw = Vec::new();
        wire.read_to_end(&mut raw)?;
        Ok(raw)
    }
}

impl Transport for StreamTransport {
    // The prebuilt option bag is sufficient; there is no handle to acquire.
    fn open(&mut self) -> Result<(), FetchError> {
        Ok(())
    }

    fn close(&mut self) {}

    fn fetch(&mut self, url: &str, post_body: Option<&str>) -> Result<Bytes, FetchError> {
        let raw = self
            .exchange(url, post_body)
            .map_err(|e| FetchError::retrieval(url, 500, e.to_string()))?;

        let (header, body) = response::split_response(&raw)
            .ok_or_else(|| FetchError::retrieval(url, 500, "malformed response"))?;
        let status = response::status_code(response::first_line(header));
        tracing::debug!(%url, status = ?status, bytes = body.len(), "stream response received");

        if body.is_empty() {
            return Err(FetchError::retrieval(
                url,
                status.unwrap_or(500),
                "empty response body",
            ));
        }
        match status {
            Some(200) => Ok(Bytes::copy_from_slice(body)),
            other => Err(FetchError::retrieval(
                url,
                other.unwrap_or(500),
                String::from_utf8_lossy(body).into_owned(),
            )),
        }
    }
}

/// Plain or TLS-wrapped connection, unified for request/response I/O.
enum Wire {
    Plain(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<native_tls::TlsStream<TcpStream>>),
}

impl Read for Wire {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Wire::Plain(stream) => stream.read(buf),
            #[cfg(feature = "tls")]
            Wire::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Wire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Wire::Plain(stream) => stream.write(buf),
            #[cfg(feature = "tls")]
            Wire::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Wire::Plain(stream) => stream.flush(),
            #[cfg(feature = "tls")]
            Wire::Tls(stream) => stream.flush(),
        }
    }
}

fn connect(target: &str) -> io::Result<TcpStream> {
    let addr = target
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::other(format!("no addresses resolved for '{target}'")))?;
    TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
}

#[cfg(feature = "tls")]
fn secure_wrap(host: &str, stream: TcpStream) -> io::Result<Wire> {
    let connector = native_tls::TlsConnector::new().map_err(io::Error::other)?;
    let tls = connector.connect(host, stream).map_err(io::Error::other)?;
    Ok(Wire::Tls(Box::new(tls)))
}

#[cfg(not(feature = "tls"))]
fn secure_wrap(_host: &str, _stream: TcpStream) -> io::Result<Wire> {
    Err(io::Error::other("secure transport support is not available"))
}

/// Establish a CONNECT tunnel to `host:port` through an already-connected
/// proxy stream. Consumes the proxy's entire response header so the bytes
/// that follow belong to the tunneled protocol.
fn open_tunnel(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    auth: Option<&str>,
) -> io::Result<()> {
    let mut connect = format!("CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n");
    if let Some(auth) = auth {
        connect.push_str(&format!("Proxy-Authorization: Basic {auth}\r\n"));
    }
    connect.push_str("\r\n");
    stream.write_all(connect.as_bytes())?;
    stream.flush()?;

    let mut header = Vec::new();
    let mut byte = [0u8; 1];
    while !header.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte)? {
            0 => return Err(io::Error::other("proxy closed the connection during CONNECT")),
            _ => header.push(byte[0]),
        }
    }

    let status_line = response::first_line(&header);
    match response::status_code(status_line) {
        Some(200) => {
            tracing::debug!(%host, port, "CONNECT tunnel established");
            Ok(())
        }
        _ => Err(io::Error::other(format!(
            "proxy CONNECT failed: {}",
            String::from_utf8_lossy(status_line)
        ))),
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}
