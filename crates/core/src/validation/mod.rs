//! Template validation.
//!
//! Orchestrates the markup and style scanners over an `(html, css)` pair
//! and applies the severity policy to produce a [`ValidationReport`].
//!
//! Validation is advisory by design: a template is recorded as invalid when
//! it has blocking errors, but the save itself always proceeds. Callers
//! persist the report; they never gate on it.

pub mod markup;
pub mod policy;
pub mod style;

use serde::{Deserialize, Serialize};

use self::policy::{Construct, Policy, Severity, CURRENT_POLICY};

/// Default content size cap for either document: 5 MiB.
pub const MAX_CONTENT_BYTES: usize = 5 * 1024 * 1024;

/// A raw scanner finding, before the policy assigns a severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub construct: Construct,
    pub message: String,
}

/// Which document a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Html,
    Css,
}

/// A policy-classified finding, ready for storage and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub domain: Domain,
    pub message: String,
    pub severity: Severity,
}

/// The full verdict for one `(html, css)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub html_valid: bool,
    pub css_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub html_size: usize,
    pub css_size: usize,
    pub total_size: usize,
}

/// Validator configured with a severity policy and a content size cap.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValidator {
    policy: Policy,
    max_content_bytes: usize,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self {
            policy: CURRENT_POLICY,
            max_content_bytes: MAX_CONTENT_BYTES,
        }
    }
}

impl TemplateValidator {
    pub fn new(policy: Policy, max_content_bytes: usize) -> Self {
        Self {
            policy,
            max_content_bytes,
        }
    }

    /// Validate an `(html, css)` pair. Pure and deterministic.
    ///
    /// `is_valid` is `html_valid && css_valid`; each sub-verdict means
    /// "zero errors from that scanner". Warnings never affect validity.
    pub fn validate(&self, html: &str, css: &str) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let html_error_free = self.classify(Domain::Html, self.scan_html(html), &mut errors, &mut warnings);
        let css_error_free = self.classify(
            Domain::Css,
            style::scan_style(css, self.max_content_bytes),
            &mut errors,
            &mut warnings,
        );

        ValidationReport {
            is_valid: html_error_free && css_error_free,
            html_valid: html_error_free,
            css_valid: css_error_free,
            error_count: errors.len(),
            warning_count: warnings.len(),
            html_size: html.len(),
            css_size: css.len(),
            total_size: html.len() + css.len(),
            errors,
            warnings,
        }
    }

    /// Run the markup scanner plus the validator-level checks the scanner
    /// does not own: emptiness and the size cap.
    fn scan_html(&self, html: &str) -> Vec<Detection> {
        if html.len() > self.max_content_bytes {
            return vec![Detection {
                construct: Construct::OversizedContent,
                message: format!(
                    "HTML content too large (max {} MB)",
                    self.max_content_bytes / 1024 / 1024
                ),
            }];
        }
        if html.trim().is_empty() {
            return vec![Detection {
                construct: Construct::EmptyHtml,
                message: "HTML content is empty".into(),
            }];
        }
        markup::scan_markup(html)
    }

    /// Split detections into errors and warnings per the policy.
    /// Returns `true` when the domain produced no errors.
    fn classify(
        &self,
        domain: Domain,
        detections: Vec<Detection>,
        errors: &mut Vec<ValidationIssue>,
        warnings: &mut Vec<ValidationIssue>,
    ) -> bool {
        let before = errors.len();
        for detection in detections {
            let severity = self.policy.severity(detection.construct);
            let issue = ValidationIssue {
                domain,
                message: detection.message,
                severity,
            };
            match severity {
                Severity::Error => errors.push(issue),
                Severity::Warning => warnings.push(issue),
            }
        }
        errors.len() == before
    }
}

/// Validate with the current policy and default size cap.
pub fn validate_template(html: &str, css: &str) -> ValidationReport {
    TemplateValidator::default().validate(html, css)
}
