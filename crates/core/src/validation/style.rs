//! Style pattern scanner.
//!
//! Heuristic checks over raw CSS text. Email clients ignore most of a
//! stylesheet anyway, so this is not a CSS parser: it looks for actively
//! dangerous constructs and a handful of structural anomalies.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::policy::Construct;
use super::Detection;

/// `expression( ... )` with optional whitespace before the paren.
static EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)expression\s*\(").expect("static regex"));

/// External URL references: `url(http://...)` / `url(https://...)`.
static EXTERNAL_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\s*\(\s*["']?(https?://[^"')\s]+)"#).expect("static regex")
});

/// Dangerous patterns matched as case-insensitive substrings. One finding
/// per pattern matched, not per occurrence.
const DANGEROUS_PATTERNS: &[&str] = &["javascript:", "behavior:", "<script", "</script>"];

/// Scan raw CSS and report every construct found.
///
/// Empty or whitespace-only input is fine (CSS is optional). Oversized
/// input short-circuits: nothing past the size check runs.
pub fn scan_style(css: &str, max_size_bytes: usize) -> Vec<Detection> {
    let mut findings = Vec::new();

    if css.trim().is_empty() {
        return findings;
    }

    if css.len() > max_size_bytes {
        findings.push(Detection {
            construct: Construct::OversizedContent,
            message: format!(
                "CSS content too large (max {} MB)",
                max_size_bytes / 1024 / 1024
            ),
        });
        return findings;
    }

    let lowered = css.to_ascii_lowercase();
    for pattern in DANGEROUS_PATTERNS {
        if lowered.contains(pattern) {
            findings.push(Detection {
                construct: Construct::DangerousCssPattern,
                message: format!("Dangerous CSS pattern detected: {pattern}"),
            });
        }
    }
    if EXPRESSION_RE.is_match(css) {
        findings.push(Detection {
            construct: Construct::DangerousCssPattern,
            message: "Dangerous CSS pattern detected: expression(".into(),
        });
    }

    let open = css.matches('{').count();
    let close = css.matches('}').count();
    if open != close {
        findings.push(Detection {
            construct: Construct::UnbalancedBraces,
            message: format!("Unbalanced braces: {open} opening, {close} closing"),
        });
    }

    if lowered.contains("@import") {
        findings.push(Detection {
            construct: Construct::CssImport,
            message: "@import rules may be stripped by email clients".into(),
        });
    }

    let urls: Vec<&str> = EXTERNAL_URL_RE
        .captures_iter(css)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if !urls.is_empty() {
        let domains: BTreeSet<&str> = urls.iter().map(|u| domain_of(u)).collect();
        findings.push(Detection {
            construct: Construct::ExternalUrl,
            message: format!(
                "External URLs detected: {} across {} domain(s) - may not load in email clients",
                urls.len(),
                domains.len()
            ),
        });
    }

    findings
}

/// Extract the host part of an `http(s)://` URL.
fn domain_of(url: &str) -> &str {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    rest.split(['/', ':']).next().unwrap_or(rest)
}
