//! Connection wrapper: strategy selection, lifecycle, fetch orchestration.

use bytes::Bytes;

use super::Transport;
use super::stream::StreamTransport;
use crate::core::url::resolve_request_url;
use crate::data::capability::{Capabilities, ProxyKind, TypeSupport};
use crate::data::options::FetchRequest;
use crate::data::proxy::ProxyDescriptor;
use crate::error::FetchError;

/// Which transport strategy a wrapper selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Minimal builtin stream transport.
    Stream,
    /// Feature-rich native client.
    Client,
}

/// A single-session connection to remote content.
///
/// Construction probes the passed-in capability facts once, selects a
/// transport strategy, and freezes its configuration (including proxy and
/// authentication options). The wrapper is then opened, used for one or
/// more blocking fetches, and closed; closing also happens on drop.
///
/// Not meant for concurrent use: state, the transport handle, and the
/// last-URL diagnostic are single-owner resources. Callers needing
/// parallel fetches create one wrapper per thread.
pub struct ConnectionWrapper {
    transport: Box<dyn Transport>,
    kind: TransportKind,
    https_allowed: bool,
    open: bool,
    last_url: Option<String>,
}

impl std::fmt::Debug for ConnectionWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionWrapper")
            .field("kind", &self.kind)
            .field("https_allowed", &self.https_allowed)
            .field("open", &self.open)
            .field("last_url", &self.last_url)
            .finish_non_exhaustive()
    }
}

impl ConnectionWrapper {
    /// Select and configure a transport strategy.
    ///
    /// The builtin stream mechanism is preferred when policy permits it
    /// and the proxy (if any) is marked as stream-supported; otherwise
    /// the native client is used when available. With neither mechanism
    /// usable this fails with a fatal configuration error.
    pub fn new(
        proxy: Option<ProxyDescriptor>,
        caps: &Capabilities,
    ) -> Result<Self, FetchError> {
        let supported = caps.supported_proxy_types();
        let stream_covers_proxy = proxy
            .as_ref()
            .is_none_or(|p| supported.get(&p.kind()) == Some(&TypeSupport::Stream));

        let (transport, kind): (Box<dyn Transport>, TransportKind) =
            if caps.stream_allowed() && stream_covers_proxy {
                (
                    Box::new(StreamTransport::new(proxy.as_ref())),
                    TransportKind::Stream,
                )
            } else {
                client_transport(proxy.as_ref(), caps, &supported)?
            };

        let https_allowed = match proxy.as_ref().map(ProxyDescriptor::kind) {
            // An http proxy cannot tunnel TLS.
            Some(ProxyKind::Http) => false,
            _ => caps.tls_available(),
        };

        tracing::debug!(?kind, https_allowed, "transport strategy selected");

        Ok(Self {
            transport,
            kind,
            https_allowed,
            open: false,
            last_url: None,
        })
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.kind
    }

    pub fn https_allowed(&self) -> bool {
        self.https_allowed
    }

    /// URL of the last sent request, for diagnostics.
    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Acquire the transport's resources. Opening an already-open
    /// connection re-acquires them.
    pub fn open_connection(&mut self) -> Result<(), FetchError> {
        self.transport.open()?;
        self.open = true;
        Ok(())
    }

    /// Release the transport's resources. Safe to call repeatedly.
    pub fn close_connection(&mut self) {
        if self.open {
            self.transport.close();
            self.open = false;
        }
    }

    /// Retrieve the content behind a request.
    ///
    /// Resolves the effective URL first (enforcing the HTTPS policy before
    /// any network I/O), records it as [`last_url`](Self::last_url), then
    /// performs one blocking fetch on the selected transport. Returns the
    /// raw body, or a typed error; nothing is retried internally.
    pub fn get_content(&mut self, request: &FetchRequest) -> Result<Bytes, FetchError> {
        let url = resolve_request_url(
            &request.url,
            request.https_url.as_deref(),
            request.http_to_https,
            self.https_allowed,
        )?;
        self.last_url = Some(url.clone());

        let post_body = if request.use_post {
            let encoded = serde_urlencoded::to_string(&request.post_params)
                .map_err(|e| FetchError::retrieval(&url, 500, e.to_string()))?;
            Some(encoded)
        } else {
            None
        };

        self.transport.fetch(&url, post_body.as_deref())
    }
}

impl Drop for ConnectionWrapper {
    fn drop(&mut self) {
        self.close_connection();
    }
}

#[cfg(feature = "client")]
fn client_transport(
    proxy: Option<&ProxyDescriptor>,
    caps: &Capabilities,
    supported: &std::collections::BTreeMap<ProxyKind, TypeSupport>,
) -> Result<(Box<dyn Transport>, TransportKind), FetchError> {
    if caps.client_available() {
        Ok((
            Box::new(super::client::ClientTransport::new(proxy, supported)),
            TransportKind::Client,
        ))
    } else {
        Err(no_transport())
    }
}

#[cfg(not(feature = "client"))]
fn client_transport(
    _proxy: Option<&ProxyDescriptor>,
    _caps: &Capabilities,
    _supported: &std::collections::BTreeMap<ProxyKind, TypeSupport>,
) -> Result<(Box<dyn Transport>, TransportKind), FetchError> {
    Err(no_transport())
}

fn no_transport() -> FetchError {
    FetchError::Configuration(
        "neither the builtin stream transport nor the native client is available to download \
         remote data, or the chosen proxy type requires the missing native client"
            .into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(spec: &str, caps: &Capabilities) -> ProxyDescriptor {
        ProxyDescriptor::parse(spec, None, None, None, caps).unwrap()
    }

    #[test]
    fn stream_is_preferred_without_a_proxy() {
        let caps = Capabilities::detect();

        let wrapper = ConnectionWrapper::new(None, &caps).unwrap();

        assert_eq!(wrapper.transport_kind(), TransportKind::Stream);
    }

    #[test]
    fn http_proxy_stays_on_the_stream_transport() {
        let caps = Capabilities::detect();

        let wrapper = ConnectionWrapper::new(Some(proxy("http://p:3128", &caps)), &caps).unwrap();

        assert_eq!(wrapper.transport_kind(), TransportKind::Stream);
    }

    #[cfg(feature = "socks")]
    #[test]
    fn socks_proxy_requires_the_native_client() {
        let caps = Capabilities::detect();

        let wrapper = ConnectionWrapper::new(Some(proxy("socks5://p:1080", &caps)), &caps).unwrap();

        assert_eq!(wrapper.transport_kind(), TransportKind::Client);
    }

    #[cfg(feature = "client")]
    #[test]
    fn forbidden_stream_falls_back_to_the_client() {
        let caps = Capabilities::detect().without_stream();

        let wrapper = ConnectionWrapper::new(None, &caps).unwrap();

        assert_eq!(wrapper.transport_kind(), TransportKind::Client);
    }

    #[test]
    fn no_mechanism_at_all_is_a_configuration_error() {
        let caps = Capabilities::detect().without_stream().without_client();

        let err = ConnectionWrapper::new(None, &caps).unwrap_err();

        assert!(matches!(err, FetchError::Configuration(_)));
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn http_proxy_disables_https() {
        let caps = Capabilities::detect();

        let wrapper = ConnectionWrapper::new(Some(proxy("http://p:3128", &caps)), &caps).unwrap();

        assert!(!wrapper.https_allowed());
    }

    #[cfg(feature = "tls")]
    #[test]
    fn https_follows_tls_availability_without_an_http_proxy() {
        let caps = Capabilities::detect();

        assert!(ConnectionWrapper::new(None, &caps).unwrap().https_allowed());
        assert!(
            !ConnectionWrapper::new(None, &caps.without_tls())
                .unwrap()
                .https_allowed()
        );
    }

    #[test]
    fn https_policy_violation_precedes_io_and_leaves_last_url_unset() {
        let caps = Capabilities::detect().without_tls();
        let mut wrapper = ConnectionWrapper::new(None, &caps).unwrap();
        wrapper.open_connection().unwrap();

        let err = wrapper
            .get_content(&FetchRequest::new("https://example.com/a"))
            .unwrap_err();

        assert!(matches!(err, FetchError::HttpsNotAllowed { .. }));
        assert_eq!(wrapper.last_url(), None);
    }

    #[test]
    fn close_is_idempotent() {
        let caps = Capabilities::detect();
        let mut wrapper = ConnectionWrapper::new(None, &caps).unwrap();

        wrapper.open_connection().unwrap();
        wrapper.close_connection();
        wrapper.close_connection();

        assert!(!wrapper.is_open());
    }
}
