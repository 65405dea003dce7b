//! Best-effort content sanitizer and auto-fixer.
//!
//! Pure string rewriting: strips the constructs the validator flags as
//! dangerous and normalizes structural omissions (missing doctype). These
//! functions are invoked explicitly through the API; the save path never
//! applies them implicitly.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static regex"));

static IFRAME_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe[^>]*>.*?</iframe>").expect("static regex"));

static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on\w+\s*=\s*("[^"]*"|'[^']*')"#).expect("static regex")
});

static JS_URL_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+(?:href|src)\s*=\s*("javascript:[^"]*"|'javascript:[^']*')"#)
        .expect("static regex")
});

static JS_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("static regex"));

static EXPRESSION_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)expression\s*\([^)]*\)").expect("static regex"));

static BEHAVIOR_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)behavior\s*:[^;}]*;?").expect("static regex"));

/// What [`auto_fix`] changed, as human-readable notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoFixOutcome {
    pub html: String,
    pub css: String,
    pub changes: Vec<String>,
}

/// Strip known-dangerous constructs from HTML.
///
/// Removes `<script>`/`<iframe>` blocks, inline event-handler attributes,
/// and `href`/`src` attributes carrying a `javascript:` URL.
pub fn sanitize_html(html: &str) -> String {
    let html = SCRIPT_BLOCK_RE.replace_all(html, "");
    let html = IFRAME_BLOCK_RE.replace_all(&html, "");
    let html = EVENT_ATTR_RE.replace_all(&html, "");
    let html = JS_URL_ATTR_RE.replace_all(&html, "");
    html.into_owned()
}

/// Strip known-dangerous constructs from CSS.
pub fn sanitize_css(css: &str) -> String {
    let css = EXPRESSION_CALL_RE.replace_all(css, "");
    let css = BEHAVIOR_DECL_RE.replace_all(&css, "");
    let css = JS_SCHEME_RE.replace_all(&css, "");
    css.into_owned()
}

/// Sanitize both documents, then normalize structural omissions: add a
/// doctype when missing, wrapping in `<html>` tags first if those are also
/// absent. Returns the fixed content plus notes describing each change.
pub fn auto_fix(html: &str, css: &str) -> AutoFixOutcome {
    let mut changes = Vec::new();

    let mut fixed_html = sanitize_html(html);
    if fixed_html != html {
        changes.push("Removed dangerous HTML constructs".to_string());
    }

    let fixed_css = sanitize_css(css);
    if fixed_css != css {
        changes.push("Removed dangerous CSS constructs".to_string());
    }

    let lowered = fixed_html.to_ascii_lowercase();
    if !lowered.contains("<!doctype") {
        if !lowered.contains("<html") {
            fixed_html = format!("<html>\n{fixed_html}\n</html>");
            changes.push("Wrapped content in <html> tags".to_string());
        }
        fixed_html = format!("<!DOCTYPE html>\n{fixed_html}");
        changes.push("Added missing doctype".to_string());
    }

    AutoFixOutcome {
        html: fixed_html,
        css: fixed_css,
        changes,
    }
}

/// Collapse `None`/blank CSS to the canonical empty string.
///
/// CSS is optional everywhere and is never stored as NULL; every write path
/// funnels through this so "no CSS" has exactly one representation.
pub fn normalize_css(css: Option<&str>) -> Cow<'_, str> {
    match css {
        Some(s) if !s.trim().is_empty() => Cow::Borrowed(s),
        _ => Cow::Borrowed(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_blocks_are_removed_across_newlines() {
        let html = "<p>a</p><script type=\"text/javascript\">\nalert(1);\n</script><p>b</p>";
        assert_eq!(sanitize_html(html), "<p>a</p><p>b</p>");
    }

    #[test]
    fn script_removal_is_case_insensitive() {
        let html = "<SCRIPT>alert(1)</SCRIPT>ok";
        assert_eq!(sanitize_html(html), "ok");
    }

    #[test]
    fn event_attributes_are_removed() {
        let html = "<div onclick=\"steal()\" class=\"box\">x</div>";
        assert_eq!(sanitize_html(html), "<div class=\"box\">x</div>");
    }

    #[test]
    fn single_quoted_event_attributes_are_removed() {
        let html = "<img src='a.png' onerror='evil()'>";
        assert_eq!(sanitize_html(html), "<img src='a.png'>");
    }

    #[test]
    fn iframe_blocks_are_removed() {
        let html = "before<iframe src=\"https://evil.example\">fallback</iframe>after";
        assert_eq!(sanitize_html(html), "beforeafter");
    }

    #[test]
    fn javascript_href_is_removed() {
        let html = "<a href=\"javascript:alert(1)\">click</a>";
        assert_eq!(sanitize_html(html), "<a>click</a>");
    }

    #[test]
    fn plain_links_survive() {
        let html = "<a href=\"https://example.com\">click</a>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn css_expression_calls_are_stripped() {
        let css = "div { width: expression(document.body.clientWidth); color: red; }";
        let out = sanitize_css(css);
        assert!(!out.to_ascii_lowercase().contains("expression"));
        assert!(out.contains("color: red"));
    }

    #[test]
    fn css_behavior_declarations_are_stripped() {
        let css = "div { behavior: url(evil.htc); color: red; }";
        let out = sanitize_css(css);
        assert!(!out.to_ascii_lowercase().contains("behavior"));
        assert!(out.contains("color: red"));
    }

    #[test]
    fn css_javascript_scheme_is_stripped() {
        let out = sanitize_css("a { background: url(javascript:x); }");
        assert!(!out.to_ascii_lowercase().contains("javascript:"));
    }

    #[test]
    fn auto_fix_adds_doctype_and_html_wrapper() {
        let outcome = auto_fix("<p>hello</p>", "");
        assert!(outcome.html.starts_with("<!DOCTYPE html>"));
        assert!(outcome.html.contains("<html>"));
        assert_eq!(
            outcome.changes,
            vec![
                "Wrapped content in <html> tags".to_string(),
                "Added missing doctype".to_string(),
            ]
        );
    }

    #[test]
    fn auto_fix_leaves_complete_documents_alone() {
        let html = "<!DOCTYPE html><html><body>hi</body></html>";
        let outcome = auto_fix(html, "body { margin: 0; }");
        assert_eq!(outcome.html, html);
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn auto_fix_does_not_double_wrap_existing_html_tag() {
        let outcome = auto_fix("<html><body>hi</body></html>", "");
        assert!(outcome.html.starts_with("<!DOCTYPE html>"));
        assert_eq!(outcome.changes, vec!["Added missing doctype".to_string()]);
    }

    #[test]
    fn auto_fix_records_sanitizer_changes() {
        let outcome = auto_fix(
            "<!DOCTYPE html><html><script>x</script>ok</html>",
            "a { behavior: url(x); }",
        );
        assert!(outcome
            .changes
            .contains(&"Removed dangerous HTML constructs".to_string()));
        assert!(outcome
            .changes
            .contains(&"Removed dangerous CSS constructs".to_string()));
    }

    #[test]
    fn normalize_css_collapses_blank_variants() {
        assert_eq!(normalize_css(None), "");
        assert_eq!(normalize_css(Some("")), "");
        assert_eq!(normalize_css(Some("   \n ")), "");
        assert_eq!(normalize_css(Some("a{}")), "a{}");
    }
}
