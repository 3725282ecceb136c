//! URL resolution for request identity and pass-through checks.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for kiteshell_core::Error {
    fn from(err: UrlError) -> Self {
        kiteshell_core::Error::InvalidUrl(err.to_string())
    }
}

/// Parse the site origin. Only http and https origins are accepted.
pub fn parse_origin(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let origin = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    if !is_http(&origin) {
        return Err(UrlError::UnsupportedScheme(origin.scheme().to_string()));
    }
    Ok(origin)
}

/// Resolve a request URL against the origin.
///
/// Relative paths (`/img/Bakar.jpeg`) are joined to the origin; absolute
/// URLs of any scheme are kept so the interceptor can decide to pass them
/// through. The fragment is dropped since it never reaches the network.
/// Scheme and host are lowercased by the parser; the query is kept intact.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    resolved.set_fragment(None);
    Ok(resolved)
}

/// Whether the URL uses a scheme the interceptor handles.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        parse_origin("https://bakardykite.com").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(&origin(), "/img/Bakar.jpeg").unwrap();
        assert_eq!(url.as_str(), "https://bakardykite.com/img/Bakar.jpeg");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve(&origin(), "https://cdn.example.com/fonts/a.ttf").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://EXAMPLE.COM/Content/").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/Content/");
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "/#reviews").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api/reviews?b=2&a=1").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_keeps_foreign_scheme() {
        let url = resolve(&origin(), "chrome-extension://abcdef/script.js").unwrap();
        assert_eq!(url.scheme(), "chrome-extension");
        assert!(!is_http(&url));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_parse_origin_rejects_non_http() {
        assert!(matches!(parse_origin("file:///var/www"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(parse_origin(""), Err(UrlError::Empty)));
        assert!(matches!(parse_origin("not a url"), Err(UrlError::InvalidUrl(_))));
    }
}
