//! HTML queries over rendered page markup
//!
//! This module extracts from a rendered page:
//! - The breadcrumb trail (raw item texts)
//! - The page title
//! - Every anchor link, resolved against the origin root

use crate::config::SelectorConfig;
use crate::url::resolve_link;
use crate::{ArchiveError, Result};
use scraper::{Html, Selector};
use url::Url;

/// Compiled selectors used on every page
#[derive(Debug, Clone)]
pub struct PageSelectors {
    breadcrumb: Selector,
    title: Selector,
    anchor: Selector,
}

impl PageSelectors {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            breadcrumb: compile(&config.breadcrumb)?,
            title: compile(&config.title)?,
            anchor: compile("a[href]")?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ArchiveError::Selector(format!("{}: {}", selector, e)))
}

/// Extracted information from a rendered page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Text of the first title element, trimmed; None if missing or blank
    pub title: Option<String>,

    /// Text of every breadcrumb item in document order, untrimmed
    pub breadcrumb: Vec<String>,

    /// Every anchor target, resolved to an absolute http(s) URL
    pub links: Vec<Url>,
}

/// Parses rendered markup
///
/// Relative links resolve against `base`, which is the origin root rather
/// than the page URL. Anchors carrying a `download` attribute are kept since
/// attachments are often marked that way.
///
/// # Example
///
/// ```
/// use site_archiver::config::SelectorConfig;
/// use site_archiver::crawler::{parse_page, PageSelectors};
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let selectors = PageSelectors::new(&SelectorConfig::default()).unwrap();
/// let base = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &selectors, &base);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_page(html: &str, selectors: &PageSelectors, base: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&selectors.title)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    let breadcrumb = document
        .select(&selectors.breadcrumb)
        .map(|element| element.text().collect::<String>())
        .collect();

    let links = document
        .select(&selectors.anchor)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base))
        .collect();

    ParsedPage {
        title,
        breadcrumb,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://am.ndhu.edu.tw/").unwrap()
    }

    fn selectors() -> PageSelectors {
        PageSelectors::new(&SelectorConfig::default()).unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        parse_page(html, &selectors(), &base_url())
    }

    #[test]
    fn test_invalid_selector() {
        let config = SelectorConfig {
            breadcrumb: "li[".to_string(),
            ..SelectorConfig::default()
        };
        assert!(matches!(
            PageSelectors::new(&config),
            Err(ArchiveError::Selector(_))
        ));
    }

    #[test]
    fn test_extract_title() {
        let parsed = parse(r#"<html><head><title>  應用數學系  </title></head><body></body></html>"#);
        assert_eq!(parsed.title, Some("應用數學系".to_string()));
    }

    #[test]
    fn test_no_title() {
        let parsed = parse(r#"<html><head></head><body></body></html>"#);
        assert_eq!(parsed.title, None);

        let parsed = parse(r#"<html><head><title>   </title></head><body></body></html>"#);
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_extract_breadcrumb_in_order() {
        let html = r#"
            <html><body>
                <ol class="breadcrumb">
                    <li><a href="/">首頁</a></li>
                    <li><a href="/p/1.php">系所簡介</a></li>
                    <li> 師資 </li>
                </ol>
            </body></html>
        "#;
        let parsed = parse(html);
        assert_eq!(parsed.breadcrumb, vec!["首頁", "系所簡介", " 師資 "]);
    }

    #[test]
    fn test_links_resolve_against_origin_root() {
        let html = r#"
            <html><body>
                <a href="/p/16-1038-1.php?Lang=zh-tw">One</a>
                <a href="https://other.org/x">Two</a>
                <a href="files/a.PDF" download>Three</a>
            </body></html>
        "#;
        let links: Vec<String> = parse(html).links.iter().map(|u| u.to_string()).collect();
        assert_eq!(
            links,
            vec![
                "https://am.ndhu.edu.tw/p/16-1038-1.php?Lang=zh-tw",
                "https://other.org/x",
                "https://am.ndhu.edu.tw/files/a.PDF",
            ]
        );
    }

    #[test]
    fn test_skip_unfollowable_links() {
        let html = r##"
            <html><body>
                <a href="javascript:void(0)">js</a>
                <a href="mailto:office@ndhu.edu.tw">mail</a>
                <a href="#top">top</a>
                <a>no href</a>
                <a href="/valid">valid</a>
            </body></html>
        "##;
        let parsed = parse(html);
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].path(), "/valid");
    }
}
