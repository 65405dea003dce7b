//! Severity policy for validation findings.
//!
//! Which constructs block a save (errors) and which are advisory (warnings)
//! is a product decision that has shifted over time, so the assignment is a
//! versioned data table rather than branches scattered through the scanners.
//! The scanners report *what* they found; this table decides *how bad* it is.

use serde::{Deserialize, Serialize};

/// Everything the scanners know how to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Construct {
    /// `<script>`, `<iframe>`, `<object>`, `<embed>`, `<applet>`, `<form>`.
    ForbiddenTag,
    /// Event-handler attributes (`onclick`, `onerror`, ...).
    SuspiciousAttribute,
    /// A closing tag that does not match the innermost open tag.
    MismatchedClosingTag,
    /// `<script` or `javascript:` appearing inside text content.
    InlineScript,
    /// Tags still open at end of input.
    UnclosedTags,
    /// No `<body` tag anywhere in the document.
    MissingBody,
    /// Empty or whitespace-only HTML.
    EmptyHtml,
    /// Content exceeding the configured size cap.
    OversizedContent,
    /// A dangerous CSS pattern (`javascript:`, `expression(`, ...).
    DangerousCssPattern,
    /// Unequal counts of `{` and `}` in the stylesheet.
    UnbalancedBraces,
    /// An `@import` rule.
    CssImport,
    /// `url(http://...)` / `url(https://...)` references.
    ExternalUrl,
}

/// Whether a finding marks the content invalid or is merely advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned construct-to-severity table.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    /// Monotonic policy revision, recorded for traceability.
    pub version: u32,
    rules: &'static [(Construct, Severity)],
}

impl Policy {
    /// Look up the severity of a construct.
    ///
    /// Constructs absent from the table default to `Warning`, so a policy
    /// revision that forgets an entry loosens rather than tightens.
    pub fn severity(&self, construct: Construct) -> Severity {
        self.rules
            .iter()
            .find(|(c, _)| *c == construct)
            .map(|(_, s)| *s)
            .unwrap_or(Severity::Warning)
    }
}

/// Revision 2: mismatched nesting and unbalanced braces were downgraded to
/// warnings so that structurally sloppy but harmless markup never blocks a
/// save. Only actively dangerous constructs and unusable content remain
/// errors.
pub const CURRENT_POLICY: Policy = Policy {
    version: 2,
    rules: &[
        (Construct::ForbiddenTag, Severity::Error),
        (Construct::InlineScript, Severity::Error),
        (Construct::EmptyHtml, Severity::Error),
        (Construct::OversizedContent, Severity::Error),
        (Construct::DangerousCssPattern, Severity::Error),
        (Construct::SuspiciousAttribute, Severity::Warning),
        (Construct::MismatchedClosingTag, Severity::Warning),
        (Construct::UnclosedTags, Severity::Warning),
        (Construct::MissingBody, Severity::Warning),
        (Construct::UnbalancedBraces, Severity::Warning),
        (Construct::CssImport, Severity::Warning),
        (Construct::ExternalUrl, Severity::Warning),
    ],
};
