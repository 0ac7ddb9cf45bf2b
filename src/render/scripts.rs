//! In-page scripts run through [`RenderContext::evaluate`](super::RenderContext::evaluate)
//!
//! Each script is a function expression taking a single JSON argument.

use serde_json::Value;

/// Appends a fixed footer with the source URL and capture time, and pads the
/// body so the footer covers no content.
///
/// Arguments: `{ url, capturedAt, paddingPx }`.
pub const INJECT_FOOTER: &str = r#"(args) => {
    const footer = document.createElement('div');
    footer.id = 'pdf-footer';
    footer.style.position = 'fixed';
    footer.style.bottom = '0';
    footer.style.left = '0';
    footer.style.right = '0';
    footer.style.padding = '10px';
    footer.style.borderTop = '1px solid #ccc';
    footer.style.backgroundColor = '#f9f9f9';
    footer.style.fontSize = '10px';
    footer.style.color = '#666';
    footer.appendChild(document.createTextNode('網址: ' + args.url));
    footer.appendChild(document.createElement('br'));
    footer.appendChild(document.createTextNode('列印時間: ' + args.capturedAt));
    document.body.appendChild(footer);
    document.body.style.paddingBottom = args.paddingPx + 'px';
    return true;
}"#;

/// Forces exact color reproduction on every element with a visible
/// background so print mode keeps it. Returns the number of elements touched.
pub const FORCE_BACKGROUNDS: &str = r#"() => {
    let touched = 0;
    document.querySelectorAll('*').forEach(el => {
        const color = window.getComputedStyle(el).backgroundColor;
        if (color !== 'rgba(0, 0, 0, 0)' && color !== 'transparent') {
            el.style.webkitPrintColorAdjust = 'exact';
            el.style.printColorAdjust = 'exact';
            touched += 1;
        }
    });
    return touched;
}"#;

/// Scrolls down by `step` pixels every `interval` milliseconds until the
/// scrolled distance reaches the document height. Resolves to that distance.
///
/// Arguments: `{ step, interval }`.
pub const AUTO_SCROLL: &str = r#"(args) => new Promise((resolve) => {
    let total = 0;
    const timer = setInterval(() => {
        const height = document.documentElement.scrollHeight;
        window.scrollBy(0, args.step);
        total += args.step;
        if (total >= height) {
            clearInterval(timer);
            resolve(total);
        }
    }, args.interval);
})"#;

/// Builds the expression that calls `script` with `args`
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use site_archiver::render::scripts::invocation;
///
/// assert_eq!(invocation("(a) => a.x", &json!({"x": 1})), r#"((a) => a.x)({"x":1})"#);
/// ```
pub fn invocation(script: &str, args: &Value) -> String {
    format!("({})({})", script, args)
}
