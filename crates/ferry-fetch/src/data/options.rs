//! Per-fetch request parameters and fixed protocol constants.

use std::time::Duration;

/// Seconds to wait while trying to connect.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent presented by both transport strategies.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:49.0) Gecko/20100101 Firefox/49.0";

/// Parameters for a single content fetch.
///
/// # Examples
///
/// ```
/// use ferry_fetch::FetchRequest;
///
/// let request = FetchRequest::new("http://example.com/feed")
///     .http_to_https(true)
///     .post(vec![("access_token".into(), "t".into())]);
///
/// assert!(request.use_post);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// URL to request.
    pub url: String,

    /// Explicit HTTPS variant of the URL. When absent and an HTTPS fetch
    /// is requested, `url` is used with its `http:` scheme rewritten.
    pub https_url: Option<String>,

    /// Whether to upgrade `url` from HTTP to HTTPS.
    pub http_to_https: bool,

    /// Whether to send a POST instead of a GET.
    pub use_post: bool,

    /// Ordered POST parameters, url-encoded into the request body.
    pub post_params: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn https_url(mut self, url: impl Into<String>) -> Self {
        self.https_url = Some(url.into());
        self
    }

    pub fn http_to_https(mut self, upgrade: bool) -> Self {
        self.http_to_https = upgrade;
        self
    }

    /// Switch the request to POST with the given parameters.
    pub fn post(mut self, params: Vec<(String, String)>) -> Self {
        self.use_post = true;
        self.post_params = params;
        self
    }
}
