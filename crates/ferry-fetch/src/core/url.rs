//! Request-URL resolution and HTTPS policy enforcement.

use crate::error::FetchError;

/// Decide which URL a fetch will actually request.
///
/// When HTTPS is allowed and the caller asked for it (an explicit HTTPS
/// URL, or the upgrade flag), the explicit HTTPS URL wins; otherwise the
/// `http:` scheme of `url` is rewritten. When HTTPS is not in play, an
/// `https` URL is refused before any I/O happens.
///
/// # Examples
///
/// ```
/// use ferry_fetch::core::resolve_request_url;
///
/// let url = resolve_request_url("http://example.com/a", None, true, true).unwrap();
/// assert_eq!(url, "https://example.com/a");
///
/// assert!(resolve_request_url("https://example.com/a", None, false, false).is_err());
/// ```
pub fn resolve_request_url(
    url: &str,
    https_url: Option<&str>,
    http_to_https: bool,
    https_allowed: bool,
) -> Result<String, FetchError> {
    let https_url = https_url.filter(|u| !u.is_empty());
    if https_allowed && (https_url.is_some() || http_to_https) {
        return Ok(match https_url {
            Some(explicit) => explicit.to_string(),
            None => upgrade_scheme(url),
        });
    }
    if has_prefix_ignore_case(url, "https") {
        return Err(FetchError::HttpsNotAllowed {
            url: url.to_string(),
        });
    }
    Ok(url.to_string())
}

/// Rewrite a leading `http:` scheme to `https:`, case-insensitively.
fn upgrade_scheme(url: &str) -> String {
    if has_prefix_ignore_case(url, "http:") {
        format!("https:{}", &url["http:".len()..])
    } else {
        url.to_string()
    }
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_passes_through() {
        let url = resolve_request_url("http://example.com/a", None, false, true).unwrap();

        assert_eq!(url, "http://example.com/a");
    }

    #[test]
    fn upgrade_rewrites_the_scheme() {
        let url = resolve_request_url("http://example.com/a", None, true, true).unwrap();

        assert_eq!(url, "https://example.com/a");
    }

    #[test]
    fn upgrade_is_case_insensitive() {
        let url = resolve_request_url("HTTP://example.com/a", None, true, true).unwrap();

        assert_eq!(url, "https://example.com/a");
    }

    #[test]
    fn explicit_https_url_wins_over_rewrite() {
        let url = resolve_request_url(
            "http://example.com/a",
            Some("https://secure.example.com/a"),
            true,
            true,
        )
        .unwrap();

        assert_eq!(url, "https://secure.example.com/a");
    }

    #[test]
    fn empty_https_url_counts_as_absent() {
        let url = resolve_request_url("http://example.com/a", Some(""), true, true).unwrap();

        assert_eq!(url, "https://example.com/a");
    }

    #[test]
    fn https_request_without_permission_is_refused() {
        let err = resolve_request_url("https://example.com/a", None, false, false).unwrap_err();

        assert!(matches!(err, FetchError::HttpsNotAllowed { .. }));
    }

    #[test]
    fn https_upgrade_without_permission_keeps_plain_http() {
        let url = resolve_request_url("http://example.com/a", None, true, false).unwrap();

        assert_eq!(url, "http://example.com/a");
    }

    #[test]
    fn explicit_https_url_is_ignored_without_permission() {
        let url = resolve_request_url(
            "http://example.com/a",
            Some("https://secure.example.com/a"),
            false,
            false,
        )
        .unwrap();

        assert_eq!(url, "http://example.com/a");
    }
}
