//! Core layer: pure transformations, no I/O.

pub mod response;
pub mod url;

pub use response::{first_line, split_response, status_code, status_message};
pub use url::resolve_request_url;
