use crate::{UrlError, UrlResult};
use url::Url;

/// The single site this archiver is allowed to traverse
///
/// A URL belongs to the origin when it parses and its host is exactly the
/// origin's host. Scheme and port are not compared.
#[derive(Debug, Clone)]
pub struct Origin {
    root: Url,
    host: String,
}

impl Origin {
    /// Parses an origin from its root URL
    ///
    /// # Examples
    ///
    /// ```
    /// use site_archiver::url::Origin;
    ///
    /// let origin = Origin::parse("https://am.ndhu.edu.tw/").unwrap();
    /// assert!(origin.is_valid_url("https://am.ndhu.edu.tw/about"));
    /// assert!(!origin.is_valid_url("https://www.ndhu.edu.tw/"));
    /// ```
    pub fn parse(root: &str) -> UrlResult<Self> {
        let root = Url::parse(root).map_err(|e| UrlError::Parse(e.to_string()))?;

        if root.scheme() != "http" && root.scheme() != "https" {
            return Err(UrlError::InvalidScheme(root.scheme().to_string()));
        }

        let host = root.host_str().ok_or(UrlError::MissingHost)?.to_string();

        Ok(Self { root, host })
    }

    /// The root URL the crawl is seeded with
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The origin host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if `url` has the origin's host
    pub fn contains(&self, url: &Url) -> bool {
        url.host_str() == Some(self.host.as_str())
    }

    /// Returns true if `url` parses and has the origin's host
    pub fn is_valid_url(&self, url: &str) -> bool {
        Url::parse(url).map(|u| self.contains(&u)).unwrap_or(false)
    }
}
