//! Data layer: immutable capability facts, configuration, and value types.

pub mod capability;
pub mod options;
pub mod proxy;

pub use capability::{Capabilities, ProxyKind, TypeSupport};
pub use options::{CONNECT_TIMEOUT, FetchRequest, USER_AGENT};
pub use proxy::{ProxyDescriptor, ProxyParseError};
