//! Shared test utilities for the shaker-docs test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = build_site(&fixture_options(&tmp), |_| {}).unwrap();
//!
//! let page = find_generated(&report, "apex-ds5000.toml");
//! assert_eq!(page.slug, "apex-ds-5000");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::page::SuppliedInputs;
use crate::pipeline::{BuildOptions, BuildReport, DocumentOutcome, GeneratedPage};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` (`input/` and `templates/`) to a temp directory.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Build options pointing at a fixture copy, writing to `<tmp>/docs`.
pub fn fixture_options(tmp: &TempDir) -> BuildOptions {
    BuildOptions {
        input_dir: tmp.path().join("input"),
        templates_dir: tmp.path().join("templates"),
        output_dir: tmp.path().join("docs"),
        inputs: SuppliedInputs::new(),
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Report lookups (panic with a clear message on miss)
// =========================================================================

/// Find the generated page for a source file. Panics if missing or failed.
pub fn find_generated<'a>(report: &'a BuildReport, source: &str) -> &'a GeneratedPage {
    let doc = report
        .documents
        .iter()
        .find(|d| d.source == source)
        .unwrap_or_else(|| {
            let sources: Vec<&str> = report.documents.iter().map(|d| d.source.as_str()).collect();
            panic!("document '{source}' not found. Available: {sources:?}")
        });
    match &doc.outcome {
        DocumentOutcome::Generated(page) => page,
        DocumentOutcome::Failed(e) => panic!("document '{source}' failed: {e}"),
    }
}

/// Source files of every failed document, in discovery order.
pub fn failed_sources(report: &BuildReport) -> Vec<&str> {
    report
        .documents
        .iter()
        .filter(|d| matches!(d.outcome, DocumentOutcome::Failed(_)))
        .map(|d| d.source.as_str())
        .collect()
}
