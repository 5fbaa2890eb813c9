//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! ✓ Generated: apex-ds-5000.html (apex-ds5000.toml)
//!     Checks: 2 passed, 1 awaiting input
//! ✗ Error processing broken.toml: TOML parse error: ...
//! ✓ Generated: lds-v830.html (lds-v830.toml)
//!     Checks: 1 passed, 1 error
//!     ✗ Check force_margin: unknown variable 'mas'
//!     ⚠ lds-v830.toml: image not found: lds-v830.jpg (expected at input/images/lds-v830.jpg)
//!
//! ⚠ Slug collision: a.toml and b.toml both map to apex-ds-5000.html (b.toml overwrites)
//! Copied 3 static files
//! Generated index.html with 2 entries (1 failed)
//! ```
//!
//! ## Check
//!
//! Same per-document lines with `Checked` in place of `Generated`, and a
//! `Checked N documents (M failed)` summary.
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::page::CheckSummary;
use crate::pipeline::{BuildReport, DocumentOutcome, DocumentReport, SlugCollision};

/// Whether the run wrote output or only checked documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Build,
    Check,
}

// ============================================================================
// Helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

/// `2 passed, 1 awaiting input`. Zero counts are omitted.
fn summary_line(summary: &CheckSummary) -> Option<String> {
    if summary.total() == 0 {
        return None;
    }
    let noun = |n: usize, one, many| if n == 1 { one } else { many };
    let parts: Vec<String> = [
        (summary.passed, "passed"),
        (summary.failed, "failed"),
        (summary.values, noun(summary.values, "value", "values")),
        (summary.awaiting_input, "awaiting input"),
        (summary.errors, noun(summary.errors, "error", "errors")),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect();
    Some(format!("Checks: {}", parts.join(", ")))
}

// ============================================================================
// Per-document output
// ============================================================================

/// Format the result of processing one document.
pub fn format_document_report(report: &DocumentReport, kind: RunKind) -> Vec<String> {
    let mut lines = Vec::new();
    match &report.outcome {
        DocumentOutcome::Failed(error) => {
            lines.push(format!("✗ Error processing {}: {}", report.source, error));
        }
        DocumentOutcome::Generated(page) => {
            let verb = match kind {
                RunKind::Build => "Generated",
                RunKind::Check => "Checked",
            };
            lines.push(format!("✓ {}: {} ({})", verb, page.file_name, report.source));
            if let Some(summary) = summary_line(&page.summary) {
                lines.push(format!("{}{}", indent(1), summary));
            }
            for (check, message) in &page.check_errors {
                lines.push(format!("{}✗ Check {}: {}", indent(1), check, message));
            }
            for warning in &page.warnings {
                lines.push(format!("{}⚠ {}", indent(1), warning));
            }
        }
    }
    lines
}

pub fn print_document_report(report: &DocumentReport, kind: RunKind) {
    for line in format_document_report(report, kind) {
        println!("{}", line);
    }
}

// ============================================================================
// Build summary
// ============================================================================

pub fn format_collision(collision: &SlugCollision) -> String {
    format!(
        "⚠ Slug collision: {} and {} both map to {}.html ({} overwrites)",
        collision.earlier, collision.later, collision.slug, collision.later
    )
}

/// Format everything reported after the last document.
pub fn format_build_summary(report: &BuildReport, kind: RunKind) -> Vec<String> {
    let mut lines = vec![String::new()];

    for collision in &report.collisions {
        lines.push(format_collision(collision));
    }
    for name in &report.unused_inputs {
        lines.push(format!(
            "⚠ Input {name} is not declared by any document and was ignored"
        ));
    }

    match kind {
        RunKind::Build => {
            match report.static_files {
                Some(n) => lines.push(format!("Copied {}", plural(n, "static file", "static files"))),
                None => lines.push("No static directory found, skipped".to_string()),
            }
            lines.push(format!(
                "Generated index.html with {} entries ({} failed)",
                report.generated_count(),
                report.failed_count()
            ));
        }
        RunKind::Check => {
            lines.push(format!(
                "Checked {} ({} failed)",
                plural(report.documents.len(), "document", "documents"),
                report.failed_count()
            ));
        }
    }
    lines
}

pub fn print_build_summary(report: &BuildReport, kind: RunKind) {
    for line in format_build_summary(report, kind) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
