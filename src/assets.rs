//! Asset copying.
//!
//! Each document may reference one image and one manual by filename, plus
//! one image per generic section. They are looked up under the configured asset directories of the input tree
//! and copied next to the generated pages:
//!
//! ```text
//! input/images/apex-ds5000.jpg    →  docs/images/apex-ds5000.jpg
//! input/manuals/apex-ds5000.pdf   →  docs/manuals/apex-ds5000.pdf
//! templates/static/**             →  docs/static/**
//! ```
//!
//! A missing or uncopyable document asset is never fatal: it becomes an
//! [`AssetWarning`] on that document and the page renders with the asset
//! marked unavailable. Failing to copy the static directory aborts the build.

use crate::config::SiteConfig;
use crate::document::EquipmentDocument;
use crate::generate::{IMAGES_DIR, MANUALS_DIR};
use crate::page::AssetStatus;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot walk static directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Source and destination directories for document assets.
#[derive(Debug, Clone)]
pub struct AssetDirs {
    pub images_src: PathBuf,
    pub manuals_src: PathBuf,
    pub images_dst: PathBuf,
    pub manuals_dst: PathBuf,
}

impl AssetDirs {
    pub fn new(input_dir: &Path, output_dir: &Path, config: &SiteConfig) -> Self {
        Self {
            images_src: input_dir.join(&config.images_dir),
            manuals_src: input_dir.join(&config.manuals_dir),
            images_dst: output_dir.join(IMAGES_DIR),
            manuals_dst: output_dir.join(MANUALS_DIR),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Manual,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => f.write_str("image"),
            AssetKind::Manual => f.write_str("manual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetProblem {
    Missing,
    /// Absolute path or `..` component in the declared filename.
    OutsideAssetDir,
    CopyFailed(String),
}

/// A document asset that could not be provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWarning {
    pub document: String,
    pub kind: AssetKind,
    pub file: String,
    pub expected: PathBuf,
    pub problem: AssetProblem,
}

impl fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            AssetProblem::Missing => write!(
                f,
                "{}: {} not found: {} (expected at {})",
                self.document,
                self.kind,
                self.file,
                self.expected.display()
            ),
            AssetProblem::OutsideAssetDir => write!(
                f,
                "{}: {} '{}' points outside the {} directory",
                self.document, self.kind, self.file, self.kind
            ),
            AssetProblem::CopyFailed(reason) => write!(
                f,
                "{}: cannot copy {} {}: {}",
                self.document, self.kind, self.file, reason
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetReport {
    /// Destination paths written.
    pub copied: Vec<PathBuf>,
    pub warnings: Vec<AssetWarning>,
    pub status: AssetStatus,
}

/// Copy the images and manual a document declares into the output tree.
pub fn copy_document_assets(doc: &EquipmentDocument, dirs: &AssetDirs) -> AssetReport {
    process_document_assets(doc, dirs, true)
}

/// Like [`copy_document_assets`] but only checks that the sources exist.
pub fn check_document_assets(doc: &EquipmentDocument, dirs: &AssetDirs) -> AssetReport {
    process_document_assets(doc, dirs, false)
}

fn process_document_assets(doc: &EquipmentDocument, dirs: &AssetDirs, copy: bool) -> AssetReport {
    let mut report = AssetReport::default();

    if let Some(image) = &doc.image {
        report.status.image = provide(
            &doc.source,
            AssetKind::Image,
            image,
            (dirs.images_src.as_path(), dirs.images_dst.as_path()),
            copy,
            &mut report,
        );
    }
    if let Some(manual) = &doc.manual {
        report.status.manual = provide(
            &doc.source,
            AssetKind::Manual,
            manual,
            (dirs.manuals_src.as_path(), dirs.manuals_dst.as_path()),
            copy,
            &mut report,
        );
    }

    let mut seen = BTreeSet::new();
    for image in doc.section_images() {
        if !seen.insert(image.clone()) {
            continue;
        }
        let available = if doc.image.as_deref() == Some(image.as_str()) {
            report.status.image
        } else {
            provide(
                &doc.source,
                AssetKind::Image,
                &image,
                (dirs.images_src.as_path(), dirs.images_dst.as_path()),
                copy,
                &mut report,
            )
        };
        if available {
            report.status.section_images.insert(image);
        }
    }

    report
}

/// Returns whether the asset is available in the output.
fn provide(
    document: &str,
    kind: AssetKind,
    file: &str,
    (src_dir, dst_dir): (&Path, &Path),
    copy: bool,
    report: &mut AssetReport,
) -> bool {
    let src = src_dir.join(file);
    let problem = if !is_contained(file) {
        AssetProblem::OutsideAssetDir
    } else if !src.is_file() {
        AssetProblem::Missing
    } else if !copy {
        return true;
    } else {
        let dst = dst_dir.join(file);
        match copy_file(&src, &dst) {
            Ok(()) => {
                tracing::debug!(src = %src.display(), dst = %dst.display(), "copied {kind}");
                report.copied.push(dst);
                return true;
            }
            Err(e) => AssetProblem::CopyFailed(e.to_string()),
        }
    };

    let warning = AssetWarning {
        document: document.to_string(),
        kind,
        file: file.to_string(),
        expected: src,
        problem,
    };
    tracing::debug!("{warning}");
    report.warnings.push(warning);
    false
}

/// Relative path made only of normal components.
fn is_contained(file: &str) -> bool {
    let path = Path::new(file);
    !file.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn copy_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    Ok(())
}

/// Replace `dst` with a recursive copy of `src`.
///
/// Returns the number of files copied, or `None` when `src` does not exist.
pub fn copy_static_assets(src: &Path, dst: &Path) -> Result<Option<usize>, AssetError> {
    if !src.is_dir() {
        return Ok(None);
    }

    if dst.exists() {
        fs::remove_dir_all(dst).map_err(|source| AssetError::Io {
            path: dst.to_path_buf(),
            source,
        })?;
    }

    let mut count = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        let io_err = |source| AssetError::Io {
            path: target.clone(),
            source,
        };

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err)?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err)?;
            tracing::debug!(file = %relative.display(), "copied static asset");
            count += 1;
        }
    }

    Ok(Some(count))
}
