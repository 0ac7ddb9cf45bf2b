//! Filesystem-safe names for titles, breadcrumb segments and attachments

use crate::url::path_and_query;
use url::Url;

/// Characters that may not appear in a single path component on common filesystems
const RESERVED: [char; 9] = ['/', '\\', '?', '*', '|', '"', ':', '<', '>'];

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

/// `.` and `..` name the current and parent directory, never a new one
fn is_dot_segment(text: &str) -> bool {
    text == "." || text == ".."
}

/// Replaces every reserved character with `_`, leaving everything else intact
///
/// # Examples
///
/// ```
/// use site_archiver::archive::replace_reserved;
///
/// assert_eq!(replace_reserved("a/b:c?.pdf"), "a_b_c_.pdf");
/// ```
pub fn replace_reserved(text: &str) -> String {
    text.chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect()
}

/// Sanitizes free text (a page title or breadcrumb segment) for use as a
/// directory or file name component
///
/// C0 and C1 control characters are removed, reserved characters become `_`,
/// and surrounding whitespace is trimmed. Text that ends up empty, `.` or `..`
/// is replaced by `fallback`. Non-ASCII text is preserved.
///
/// # Examples
///
/// ```
/// use site_archiver::archive::sanitize_title;
///
/// assert_eq!(sanitize_title("Report\u{0000}/2024", "untitled"), "Report_2024");
/// assert_eq!(sanitize_title(" \t\u{0007} ", "untitled"), "untitled");
/// ```
pub fn sanitize_title(text: &str, fallback: &str) -> String {
    let visible: String = text.chars().filter(|c| !is_stripped_control(*c)).collect();
    let replaced = replace_reserved(&visible);
    let trimmed = replaced.trim();

    if trimmed.is_empty() || is_dot_segment(trimmed) {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitizes an attachment's file name, keeping it inside its directory
///
/// Reserved characters become `_`; a name that would resolve to the
/// directory itself or its parent becomes `_`.
///
/// # Examples
///
/// ```
/// use site_archiver::archive::safe_file_name;
///
/// assert_eq!(safe_file_name("招生/簡章.pdf"), "招生_簡章.pdf");
/// assert_eq!(safe_file_name(".."), "_");
/// ```
pub fn safe_file_name(name: &str) -> String {
    if is_dot_segment(name) {
        return "_".to_string();
    }
    replace_reserved(name)
}

/// Filesystem-safe form of the URL's path and query
///
/// # Examples
///
/// ```
/// use site_archiver::archive::safe_url_component;
/// use url::Url;
///
/// let url = Url::parse("https://example.org/p/16-1038-1.php?Lang=zh-tw").unwrap();
/// assert_eq!(safe_url_component(&url), "_p_16-1038-1.php_Lang=zh-tw");
/// ```
pub fn safe_url_component(url: &Url) -> String {
    replace_reserved(&path_and_query(url))
}
