use url::Url;

/// Returns the URL's path followed by `?query` when a query is present
///
/// # Examples
///
/// ```
/// use site_archiver::url::path_and_query;
/// use url::Url;
///
/// let url = Url::parse("https://example.org/p/1.php?Lang=zh-tw#top").unwrap();
/// assert_eq!(path_and_query(&url), "/p/1.php?Lang=zh-tw");
/// ```
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Resolves an anchor href against `base`
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only anchors on the same page
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Returns true if the URL path ends in `.<ext>` for one of `extensions`
///
/// Matching is ASCII case-insensitive; the query string is ignored.
pub fn has_document_extension(url: &Url, extensions: &[String]) -> bool {
    let path = url.path().to_ascii_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.to_ascii_lowercase();
        path.len() > ext.len() + 1
            && path.ends_with(&ext)
            && path.as_bytes()[path.len() - ext.len() - 1] == b'.'
    })
}

/// Returns the last path segment of the URL, if it is non-empty
pub fn file_basename(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}
