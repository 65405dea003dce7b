//! Structural markup scanner.
//!
//! A single forward pass over raw HTML with an open-tag stack. No DOM is
//! built and no full parsing is attempted: the scanner only needs
//! enough structure to spot dangerous constructs and obvious nesting
//! problems. It never fails; anything it cannot make sense of is reported
//! as a finding or skipped.

use super::policy::Construct;
use super::Detection;

/// Tags that never take a closing tag and are never pushed on the stack.
const VOID_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "area", "base", "col", "source", "track", "wbr",
];

/// Tags that have no place in an email body.
const FORBIDDEN_TAGS: &[&str] = &["script", "iframe", "object", "embed", "applet", "form"];

/// Event-handler attributes flagged as suspicious (advisory, not blocking).
const SUSPICIOUS_ATTRIBUTES: &[&str] = &["onclick", "onerror", "onload", "onmouseover"];

/// Scan raw markup and report every construct found, in document order.
///
/// Empty input produces no findings; whether emptiness is acceptable is
/// decided by the validator, not here.
pub fn scan_markup(html: &str) -> Vec<Detection> {
    let mut findings = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    let bytes = html.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match find_byte(bytes, pos, b'<') {
            None => {
                scan_text(&html[pos..], &mut findings);
                break;
            }
            Some(lt) => {
                if lt > pos {
                    scan_text(&html[pos..lt], &mut findings);
                }
                pos = match bytes.get(lt + 1) {
                    // Declaration or comment: skip without reporting.
                    Some(b'!') => skip_declaration(bytes, lt),
                    Some(b'/') => {
                        let (name, next) = read_tag_name(bytes, lt + 2);
                        handle_closing_tag(&name, &mut stack, &mut findings);
                        skip_past(bytes, next, b'>')
                    }
                    Some(c) if c.is_ascii_alphabetic() => {
                        let (name, next) = read_tag_name(bytes, lt + 1);
                        let (attrs, self_closing, after) = read_attributes(html, bytes, next);
                        handle_opening_tag(&name, &attrs, self_closing, &mut stack, &mut findings);
                        after
                    }
                    // A bare '<' that opens nothing is text content.
                    _ => {
                        scan_text(&html[lt..lt + 1], &mut findings);
                        lt + 1
                    }
                };
            }
        }
    }

    if !stack.is_empty() {
        findings.push(Detection {
            construct: Construct::UnclosedTags,
            message: format!("Possibly unclosed tags: {}", stack.join(", ")),
        });
    }

    if !html.is_empty() && !html.to_ascii_lowercase().contains("<body") {
        findings.push(Detection {
            construct: Construct::MissingBody,
            message: "Missing <body> tag - recommended for a complete document".into(),
        });
    }

    findings
}

fn handle_opening_tag(
    name: &str,
    attrs: &[String],
    self_closing: bool,
    stack: &mut Vec<String>,
    findings: &mut Vec<Detection>,
) {
    if FORBIDDEN_TAGS.contains(&name) {
        findings.push(Detection {
            construct: Construct::ForbiddenTag,
            message: format!("Forbidden tag: <{name}>"),
        });
        return; // never pushed
    }

    for attr in attrs {
        if SUSPICIOUS_ATTRIBUTES.contains(&attr.as_str()) {
            findings.push(Detection {
                construct: Construct::SuspiciousAttribute,
                message: format!("Suspicious attribute: {attr} on <{name}>"),
            });
        }
    }

    if !self_closing && !VOID_TAGS.contains(&name) {
        stack.push(name.to_string());
    }
}

fn handle_closing_tag(name: &str, stack: &mut Vec<String>, findings: &mut Vec<Detection>) {
    if stack.last().is_some_and(|top| top == name) {
        stack.pop();
    } else if !VOID_TAGS.contains(&name) && !name.is_empty() {
        findings.push(Detection {
            construct: Construct::MismatchedClosingTag,
            message: format!("Closing tag without matching opener: </{name}>"),
        });
    }
}

/// Check a text run for the one content-level hard stop.
fn scan_text(text: &str, findings: &mut Vec<Detection>) {
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("<script") || lowered.contains("javascript:") {
        findings.push(Detection {
            construct: Construct::InlineScript,
            message: "Inline script detected in text content".into(),
        });
    }
}

/// Read a tag name starting at `pos` (lowercased). Returns the name and the
/// index of the first byte after it.
fn read_tag_name(bytes: &[u8], pos: usize) -> (String, usize) {
    let mut end = pos;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-') {
        end += 1;
    }
    let name = String::from_utf8_lossy(&bytes[pos..end]).to_ascii_lowercase();
    (name, end)
}

/// Read attribute names from `pos` to the closing `>`, honouring quoted
/// values. Returns `(attribute_names, self_closing, index_after_gt)`.
fn read_attributes(html: &str, bytes: &[u8], mut pos: usize) -> (Vec<String>, bool, usize) {
    let mut attrs = Vec::new();
    let mut self_closing = false;

    while pos < bytes.len() {
        match bytes[pos] {
            b'>' => return (attrs, self_closing, pos + 1),
            b'/' => {
                self_closing = true;
                pos += 1;
            }
            b'"' | b'\'' => {
                let quote = bytes[pos];
                pos += 1;
                while pos < bytes.len() && bytes[pos] != quote {
                    pos += 1;
                }
                pos = (pos + 1).min(bytes.len());
            }
            c if c.is_ascii_whitespace() || c == b'=' => pos += 1,
            _ => {
                // Attribute name: up to '=', whitespace, '/' or '>'.
                let start = pos;
                while pos < bytes.len()
                    && !bytes[pos].is_ascii_whitespace()
                    && !matches!(bytes[pos], b'=' | b'>' | b'/' | b'"' | b'\'')
                {
                    pos += 1;
                }
                attrs.push(html[start..pos].to_ascii_lowercase());
                self_closing = false;
            }
        }
    }

    (attrs, self_closing, pos)
}

/// Skip a `<!...>` declaration or `<!--...-->` comment starting at `lt`.
fn skip_declaration(bytes: &[u8], lt: usize) -> usize {
    if bytes[lt..].starts_with(b"<!--") {
        match find_subslice(bytes, lt + 4, b"-->") {
            Some(end) => end + 3,
            None => bytes.len(),
        }
    } else {
        skip_past(bytes, lt, b'>')
    }
}

fn skip_past(bytes: &[u8], pos: usize, target: u8) -> usize {
    match find_byte(bytes, pos, target) {
        Some(i) => i + 1,
        None => bytes.len(),
    }
}

fn find_byte(bytes: &[u8], from: usize, target: u8) -> Option<usize> {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == target)
        .map(|i| from + i)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let hay = &bytes[from.min(bytes.len())..];
    hay.windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constructs(html: &str) -> Vec<Construct> {
        scan_markup(html).into_iter().map(|d| d.construct).collect()
    }

    #[test]
    fn clean_markup_with_body_has_no_findings() {
        let findings = scan_markup("<body><p>hello</p></body>");
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn empty_input_has_no_findings() {
        assert!(scan_markup("").is_empty());
    }

    #[test]
    fn forbidden_tag_is_reported() {
        let found = constructs("<body><script>alert(1)</script></body>");
        assert!(found.contains(&Construct::ForbiddenTag));
    }

    #[test]
    fn forbidden_tag_is_not_pushed() {
        // The <script> open is dropped, so </script> reports a mismatch
        // but no unclosed-tag finding appears.
        let found = constructs("<body><iframe src='x'></iframe></body>");
        assert!(found.contains(&Construct::ForbiddenTag));
        assert!(found.contains(&Construct::MismatchedClosingTag));
        assert!(!found.contains(&Construct::UnclosedTags));
    }

    #[test]
    fn suspicious_attribute_is_advisory_detection() {
        let findings = scan_markup("<body><div onclick=\"do()\">x</div></body>");
        let hits: Vec<_> = findings
            .iter()
            .filter(|d| d.construct == Construct::SuspiciousAttribute)
            .collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].message.contains("onclick"));
    }

    #[test]
    fn quoted_attribute_values_do_not_confuse_the_scanner() {
        // The '>' inside the quoted value must not terminate the tag.
        let findings = scan_markup("<body><img alt=\"a > b\" src=\"x.png\"></body>");
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn mismatched_closing_tag_is_detected() {
        let found = constructs("<body><div><span>x</div></body>");
        assert!(found.contains(&Construct::MismatchedClosingTag));
    }

    #[test]
    fn unclosed_tags_reported_once_with_names() {
        let findings = scan_markup("<body><div><span>x");
        let unclosed: Vec<_> = findings
            .iter()
            .filter(|d| d.construct == Construct::UnclosedTags)
            .collect();
        assert_eq!(unclosed.len(), 1);
        assert!(unclosed[0].message.contains("div"));
        assert!(unclosed[0].message.contains("span"));
    }

    #[test]
    fn void_tags_are_never_unclosed() {
        let findings = scan_markup("<body><br><hr><img src=\"x.png\"></body>");
        assert!(!findings
            .iter()
            .any(|d| d.construct == Construct::UnclosedTags));
    }

    #[test]
    fn self_closing_syntax_is_not_pushed() {
        let findings = scan_markup("<body><div/></body>");
        assert!(!findings
            .iter()
            .any(|d| d.construct == Construct::UnclosedTags));
    }

    #[test]
    fn javascript_url_in_text_is_inline_script() {
        let found = constructs("<body>click javascript:alert(1)</body>");
        assert!(found.contains(&Construct::InlineScript));
    }

    #[test]
    fn missing_body_is_reported() {
        let found = constructs("<p>hello</p>");
        assert!(found.contains(&Construct::MissingBody));
    }

    #[test]
    fn body_check_is_case_insensitive() {
        let found = constructs("<BODY><p>hello</p></BODY>");
        assert!(!found.contains(&Construct::MissingBody));
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let findings = scan_markup("<!DOCTYPE html><!-- <script> inside a comment --><body>x</body>");
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn uppercase_tags_match_case_insensitively() {
        let found = constructs("<body><SCRIPT>x</SCRIPT></body>");
        assert!(found.contains(&Construct::ForbiddenTag));
    }
}
