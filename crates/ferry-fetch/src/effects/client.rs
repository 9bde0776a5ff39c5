//! Native-client transport backed by `reqwest::blocking`.
//!
//! The configuration is assembled once at construction; `open` applies it
//! onto a freshly acquired client handle, and `close` releases the handle.

use std::collections::BTreeMap;

use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use super::Transport;
use crate::data::capability::{ProxyKind, TypeSupport};
use crate::data::options::{CONNECT_TIMEOUT, USER_AGENT};
use crate::data::proxy::ProxyDescriptor;
use crate::error::FetchError;

/// Prebuilt configuration for the native-client strategy.
#[derive(Debug, Clone)]
struct ClientConfig {
    /// `scheme://host[:port]` understood by the client's proxy layer.
    proxy_url: Option<String>,
    /// Basic credentials applied both to the proxy and to the endpoint.
    credentials: Option<(String, String)>,
}

pub(crate) struct ClientTransport {
    config: ClientConfig,
    handle: Option<Client>,
}

impl ClientTransport {
    pub(crate) fn new(
        proxy: Option<&ProxyDescriptor>,
        supported: &BTreeMap<ProxyKind, TypeSupport>,
    ) -> Self {
        let config = ClientConfig {
            // The capability code for the proxy kind is the URL scheme the
            // client's proxy layer understands.
            proxy_url: proxy.map(|p| {
                let scheme = match supported.get(&p.kind()) {
                    Some(TypeSupport::Client(scheme)) => scheme,
                    _ => p.kind().as_str(),
                };
                format!("{scheme}://{}", p.address())
            }),
            credentials: proxy.and_then(|p| {
                p.login()
                    .zip(p.password())
                    .map(|(login, password)| (login.to_string(), password.to_string()))
            }),
        };
        Self {
            config,
            handle: None,
        }
    }

    fn build_handle(&self) -> Result<Client, FetchError> {
        let mut builder = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(Policy::limited(10))
            .user_agent(USER_AGENT);
        if let Some(proxy_url) = &self.config.proxy_url {
            let mut proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| FetchError::Configuration(format!("invalid proxy target: {e}")))?;
            if let Some((login, password)) = &self.config.credentials {
                proxy = proxy.basic_auth(login, password);
            }
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| FetchError::Configuration(format!("cannot build native client: {e}")))
    }
}

impl Transport for ClientTransport {
    fn open(&mut self) -> Result<(), FetchError> {
        self.handle = Some(self.build_handle()?);
        Ok(())
    }

    fn close(&mut self) {
        self.handle = None;
    }

    fn fetch(&mut self, url: &str, post_body: Option<&str>) -> Result<Bytes, FetchError> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| FetchError::Configuration("connection is not opened".into()))?;

        let mut request = match post_body {
            Some(body) => handle
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body.to_string()),
            None => handle.get(url),
        };
        if let Some((login, password)) = &self.config.credentials {
            request = request.basic_auth(login, Some(password));
        }

        let response = request
            .send()
            .map_err(|e| FetchError::retrieval(url, 500, e.to_string()))?;
        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "native client response received");

        let body = response
            .bytes()
            .map_err(|e| FetchError::retrieval(url, 500, e.to_string()))?;
        if status.as_u16() != 200 && status.as_u16() != 302 {
            return Err(FetchError::retrieval(
                url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }
        Ok(body)
    }
}
