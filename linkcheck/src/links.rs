use once_cell::sync::Lazy;
use regex::Regex;

static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("href pattern is valid"));

/// Prefixes of references that never point into the site tree.
const SKIP_PREFIXES: &[&str] = &[
    "mailto:",
    "tel:",
    "sms:",
    "http://",
    "https://",
    "#",
    "javascript:",
];

/// Every `href` attribute value in `html`, trimmed, in document order.
pub fn extract_hrefs(html: &str) -> impl Iterator<Item = &str> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

pub fn is_external(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return true;
    }
    let lower = href.to_ascii_lowercase();
    SKIP_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// The path part of a local reference, without fragment, query or trailing
/// slash. `None` for references to the site root.
pub fn local_target(href: &str) -> Option<&str> {
    let end = href.find(|c: char| c == '#' || c == '?').unwrap_or(href.len());
    let clean = href[..end].trim();
    if clean.is_empty() || clean == "/" {
        return None;
    }
    Some(clean.strip_suffix('/').unwrap_or(clean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_hrefs() {
        let html = concat!(
            r#"<a href="/about/">About</a> <link HREF = 'css/site.css'> "#,
            r#"<a class="x" href=" products/pet.html ">"#,
        );
        let hrefs: Vec<&str> = extract_hrefs(html).collect();
        assert_eq!(hrefs, vec!["/about/", "css/site.css", "products/pet.html"]);
    }

    #[test]
    fn unquoted_and_empty_hrefs_are_ignored() {
        let hrefs: Vec<&str> = extract_hrefs(r#"<a href=/x>x</a><a href="">y</a>"#).collect();
        assert!(hrefs.is_empty());
    }

    #[test]
    fn external_references() {
        for href in [
            "https://example.com",
            "HTTP://example.com",
            "mailto:sales@example.com",
            "tel:+8618913609266",
            "sms:123",
            "#top",
            "javascript:void(0)",
            "   ",
        ] {
            assert!(is_external(href), "{href} should be external");
        }
        assert!(!is_external("/contact/"));
        assert!(!is_external("../index.html"));
    }

    #[test]
    fn local_target_strips_decorations() {
        assert_eq!(local_target("/products/#pet"), Some("/products"));
        assert_eq!(local_target("about.html?ref=nav"), Some("about.html"));
        assert_eq!(local_target("/"), None);
        assert_eq!(local_target("/#hero"), None);
        assert_eq!(local_target("?page=2"), None);
    }
}
