//! Runtime capability facts consumed by transport selection.
//!
//! The supported-proxy-type set and the transport availability flags are
//! facts about the build and the process environment. They are carried in
//! an explicitly constructed [`Capabilities`] value that is passed to
//! whatever needs them, so parsing and transport selection stay pure
//! functions of their inputs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Proxy protocol spoken between this host and the proxy server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProxyKind {
    Http,
    Https,
    Socks4,
    Socks4a,
    Socks5,
}

impl ProxyKind {
    /// Lower-case protocol name, as accepted in proxy specifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Http => "http",
            ProxyKind::Https => "https",
            ProxyKind::Socks4 => "socks4",
            ProxyKind::Socks4a => "socks4a",
            ProxyKind::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known proxy protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProxyKind(pub String);

impl FromStr for ProxyKind {
    type Err = UnknownProxyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(ProxyKind::Http),
            "https" => Ok(ProxyKind::Https),
            "socks4" => Ok(ProxyKind::Socks4),
            "socks4a" => Ok(ProxyKind::Socks4a),
            "socks5" => Ok(ProxyKind::Socks5),
            other => Err(UnknownProxyKind(other.to_string())),
        }
    }
}

/// How a proxy kind is supported.
///
/// `Stream` marks kinds the builtin stream transport handles natively and
/// takes precedence over `Client` when both mechanisms cover the same kind.
/// `Client` carries the URL scheme the native client uses to address a
/// proxy of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSupport {
    Stream,
    Client(&'static str),
}

/// Process-wide transport capability facts.
///
/// [`Capabilities::detect`] computes the truth for the current build;
/// the `without_*` methods produce restricted copies for exercising
/// alternative runtime scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    stream_allowed: bool,
    client_available: bool,
    tls_available: bool,
    socks_available: bool,
}

impl Capabilities {
    /// Capability facts of the current build.
    ///
    /// The builtin stream mechanism is permitted unless policy says
    /// otherwise; the native client, secure transport, and SOCKS support
    /// reflect the compiled feature set.
    pub fn detect() -> Self {
        Self {
            stream_allowed: true,
            client_available: cfg!(feature = "client"),
            tls_available: cfg!(feature = "tls"),
            socks_available: cfg!(feature = "socks"),
        }
    }

    /// Copy with the builtin stream mechanism forbidden by policy.
    pub fn without_stream(mut self) -> Self {
        self.stream_allowed = false;
        self
    }

    /// Copy without the native-client mechanism.
    pub fn without_client(mut self) -> Self {
        self.client_available = false;
        self
    }

    /// Copy without secure-transport support.
    pub fn without_tls(mut self) -> Self {
        self.tls_available = false;
        self
    }

    /// Copy without SOCKS proxy-protocol support.
    pub fn without_socks(mut self) -> Self {
        self.socks_available = false;
        self
    }

    pub fn stream_allowed(&self) -> bool {
        self.stream_allowed
    }

    pub fn client_available(&self) -> bool {
        self.client_available
    }

    pub fn tls_available(&self) -> bool {
        self.tls_available
    }

    pub fn socks_available(&self) -> bool {
        self.socks_available
    }

    /// The merged supported-proxy-type set.
    ///
    /// The native client contributes `http`, plus `https` with secure
    /// transport and the SOCKS family with SOCKS support. The builtin
    /// stream mechanism contributes `http` (and `https` with secure
    /// transport) when permitted, and its marker overrides the client
    /// entry for the same kind.
    pub fn supported_proxy_types(&self) -> BTreeMap<ProxyKind, TypeSupport> {
        let mut types = BTreeMap::new();
        if self.client_available {
            types.insert(ProxyKind::Http, TypeSupport::Client("http"));
            if self.tls_available {
                types.insert(ProxyKind::Https, TypeSupport::Client("https"));
            }
            if self.socks_available {
                types.insert(ProxyKind::Socks4, TypeSupport::Client("socks4"));
                types.insert(ProxyKind::Socks4a, TypeSupport::Client("socks4a"));
                types.insert(ProxyKind::Socks5, TypeSupport::Client("socks5"));
            }
        }
        if self.stream_allowed {
            types.insert(ProxyKind::Http, TypeSupport::Stream);
            if self.tls_available {
                types.insert(ProxyKind::Https, TypeSupport::Stream);
            }
        }
        types
    }

    /// Comma-separated listing of the supported kinds, for error messages.
    pub(crate) fn supported_kinds_listing(&self) -> String {
        self.supported_proxy_types()
            .keys()
            .map(ProxyKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Capabilities {
        Capabilities {
            stream_allowed: true,
            client_available: true,
            tls_available: true,
            socks_available: true,
        }
    }

    #[test]
    fn stream_marker_overrides_client_code() {
        let types = full().supported_proxy_types();

        assert_eq!(types.get(&ProxyKind::Http), Some(&TypeSupport::Stream));
        assert_eq!(types.get(&ProxyKind::Https), Some(&TypeSupport::Stream));
        assert_eq!(
            types.get(&ProxyKind::Socks5),
            Some(&TypeSupport::Client("socks5"))
        );
    }

    #[test]
    fn no_tls_removes_https_everywhere() {
        let types = full().without_tls().supported_proxy_types();

        assert!(!types.contains_key(&ProxyKind::Https));
        assert_eq!(types.get(&ProxyKind::Http), Some(&TypeSupport::Stream));
    }

    #[test]
    fn no_socks_removes_the_socks_family() {
        let types = full().without_socks().supported_proxy_types();

        assert!(!types.contains_key(&ProxyKind::Socks4));
        assert!(!types.contains_key(&ProxyKind::Socks4a));
        assert!(!types.contains_key(&ProxyKind::Socks5));
    }

    #[test]
    fn stream_only_supports_http_family() {
        let types = full().without_client().supported_proxy_types();

        assert_eq!(types.get(&ProxyKind::Http), Some(&TypeSupport::Stream));
        assert_eq!(types.get(&ProxyKind::Https), Some(&TypeSupport::Stream));
        assert!(!types.contains_key(&ProxyKind::Socks5));
    }

    #[test]
    fn client_only_keeps_client_codes() {
        let types = full().without_stream().supported_proxy_types();

        assert_eq!(types.get(&ProxyKind::Http), Some(&TypeSupport::Client("http")));
        assert_eq!(
            types.get(&ProxyKind::Https),
            Some(&TypeSupport::Client("https"))
        );
    }

    #[test]
    fn nothing_available_yields_empty_set() {
        let types = full()
            .without_stream()
            .without_client()
            .supported_proxy_types();

        assert!(types.is_empty());
    }

    #[test]
    fn listing_is_stable_and_alphabetical() {
        assert_eq!(
            full().supported_kinds_listing(),
            "http, https, socks4, socks4a, socks5"
        );
    }

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            ProxyKind::Http,
            ProxyKind::Https,
            ProxyKind::Socks4,
            ProxyKind::Socks4a,
            ProxyKind::Socks5,
        ] {
            assert_eq!(kind.as_str().parse::<ProxyKind>().unwrap(), kind);
        }
        assert!("ftp".parse::<ProxyKind>().is_err());
    }
}
