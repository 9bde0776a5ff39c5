//! Effects layer: transport strategies and the connection wrapper.

#[cfg(feature = "client")]
mod client;
mod stream;
mod wrapper;

pub use wrapper::{ConnectionWrapper, TransportKind};

use bytes::Bytes;

use crate::error::FetchError;

/// A transport strategy: open/close lifecycle plus one blocking fetch.
///
/// Selected once at construction of a [`ConnectionWrapper`], so call sites
/// never branch on a strategy tag.
pub(crate) trait Transport {
    fn open(&mut self) -> Result<(), FetchError>;
    fn close(&mut self);
    fn fetch(&mut self, url: &str, post_body: Option<&str>) -> Result<Bytes, FetchError>;
}
