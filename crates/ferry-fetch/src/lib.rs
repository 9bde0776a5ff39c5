//! HTTP content fetching over interchangeable transport strategies.
//!
//! A [`ConnectionWrapper`] retrieves remote resources through one of two
//! transports (a minimal builtin stream transport, or a feature-rich
//! native client), optionally routed through an authenticated proxy
//! described by a [`ProxyDescriptor`]. The strategy is chosen once, from
//! explicitly passed-in [`Capabilities`], and every failure surfaces as a
//! typed [`FetchError`] for the caller to act on.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable capability facts, configuration, and value types
//! - [`core`] - Pure transformations (URL policy, raw response parsing)
//! - [`effects`] - I/O: the transport strategies and the connection wrapper
//!
//! # Example
//!
//! ```no_run
//! use ferry_fetch::{Capabilities, ConnectionWrapper, FetchRequest, ProxyDescriptor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let caps = Capabilities::detect();
//! let proxy = ProxyDescriptor::parse("http://user:pw@proxy:3128", None, None, None, &caps)?;
//!
//! let mut conn = ConnectionWrapper::new(Some(proxy), &caps)?;
//! conn.open_connection()?;
//! let body = conn.get_content(&FetchRequest::new("http://example.com/feed"))?;
//! conn.close_connection();
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use data::capability::{Capabilities, ProxyKind, TypeSupport};
pub use data::options::{CONNECT_TIMEOUT, FetchRequest, USER_AGENT};
pub use data::proxy::{ProxyDescriptor, ProxyParseError};
pub use effects::{ConnectionWrapper, TransportKind};
pub use error::FetchError;
