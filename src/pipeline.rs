//! Build orchestration.
//!
//! One build is a single sequential pass:
//!
//! ```text
//! 1. config     input/config.toml        →  SiteConfig
//! 2. static     templates/static/        →  docs/static/
//! 3. documents  input/*.toml (sorted)    →  docs/<slug>.html + images/ + manuals/
//! 4. index      accumulated entries      →  docs/index.html + docs/equipment.json
//! ```
//!
//! Per-document problems (unreadable or invalid TOML, failing checks,
//! missing assets) are recorded in the [`BuildReport`] and the build moves
//! on. Anything that prevents writing the output tree aborts the build with
//! a [`BuildError`].
//!
//! [`check_site`] runs stages 1 and 3 without writing anything.

use crate::assets::{self, AssetDirs, AssetError, AssetWarning};
use crate::config::{self, CONFIG_FILE, ConfigError, SiteConfig};
use crate::document::{self, DocumentError};
use crate::generate::{self, GenerateError};
use crate::page::{self, CheckOutcome, CheckSummary, SuppliedInputs};
use crate::types::IndexEntry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATIC_DIR: &str = "static";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Directories and run-time values for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Input-parameter values supplied with `--set`.
    pub inputs: SuppliedInputs,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("docs"),
            inputs: SuppliedInputs::new(),
        }
    }
}

#[derive(Debug)]
pub struct DocumentReport {
    /// Source file name, e.g. `apex-ds5000.toml`.
    pub source: String,
    pub outcome: DocumentOutcome,
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Generated(GeneratedPage),
    Failed(DocumentError),
}

#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub slug: String,
    pub file_name: String,
    pub summary: CheckSummary,
    /// `(check name, message)` for every check that could not be evaluated.
    pub check_errors: Vec<(String, String)>,
    pub warnings: Vec<AssetWarning>,
}

/// Two documents that map to the same output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    pub earlier: String,
    pub later: String,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub documents: Vec<DocumentReport>,
    pub collisions: Vec<SlugCollision>,
    /// Files copied from the static directory; `None` when it is absent.
    pub static_files: Option<usize>,
    pub index_entries: Vec<IndexEntry>,
    /// `None` for check-only runs.
    pub index_path: Option<PathBuf>,
    /// `--set` names no document declares as an input parameter.
    pub unused_inputs: Vec<String>,
}

impl BuildReport {
    pub fn generated_count(&self) -> usize {
        self.index_entries.len()
    }

    pub fn failed_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Failed(_)))
            .count()
    }
}

/// `*.toml` files directly inside `input_dir`, sorted by file name.
///
/// `config.toml` is excluded. A missing input directory yields no documents.
pub fn discover_documents(input_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let read_err = |source| BuildError::InputDir {
        path: input_dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(input_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(dir = %input_dir.display(), "input directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(read_err(e)),
    };

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_err)?.path();
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let is_config = path.file_name().is_some_and(|name| name == CONFIG_FILE);
        if path.is_file() && is_toml && !is_config {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// Build the whole site into `options.output_dir`.
///
/// `on_document` is called after each document is processed, in discovery
/// order, so progress can be shown while the build runs.
pub fn build_site(
    options: &BuildOptions,
    on_document: impl FnMut(&DocumentReport),
) -> Result<BuildReport, BuildError> {
    run(options, Mode::Build, on_document)
}

/// Parse every document and evaluate its checks without writing output.
pub fn check_site(
    options: &BuildOptions,
    on_document: impl FnMut(&DocumentReport),
) -> Result<BuildReport, BuildError> {
    run(options, Mode::Check, on_document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Build,
    Check,
}

struct Context<'a> {
    options: &'a BuildOptions,
    config: SiteConfig,
    css: String,
    dirs: AssetDirs,
    mode: Mode,
}

fn run(
    options: &BuildOptions,
    mode: Mode,
    mut on_document: impl FnMut(&DocumentReport),
) -> Result<BuildReport, BuildError> {
    let config = config::load_config(&options.input_dir)?;
    tracing::info!(title = %config.site_title, "loaded config");

    let mut report = BuildReport::default();
    let output_dir = &options.output_dir;

    if mode == Mode::Build {
        create_dir(output_dir)?;
        create_dir(&output_dir.join(generate::IMAGES_DIR))?;
        create_dir(&output_dir.join(generate::MANUALS_DIR))?;

        let static_src = options.templates_dir.join(STATIC_DIR);
        report.static_files =
            assets::copy_static_assets(&static_src, &output_dir.join(STATIC_DIR))?;
        tracing::info!(files = ?report.static_files, "copied static assets");
    }

    let ctx = Context {
        options,
        css: generate::stylesheet(&config),
        dirs: AssetDirs::new(&options.input_dir, output_dir, &config),
        config,
        mode,
    };

    let paths = discover_documents(&options.input_dir)?;
    tracing::info!(count = paths.len(), "discovered documents");

    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut slug_owner: HashMap<String, String> = HashMap::new();
    let mut declared_inputs: Vec<String> = Vec::new();

    for path in &paths {
        let (doc_report, entry) = process_document(path, &ctx, &mut declared_inputs)?;
        on_document(&doc_report);

        if let Some(entry) = entry {
            if let Some(earlier) = slug_owner.insert(entry.slug.clone(), entry.source.clone()) {
                tracing::debug!(slug = %entry.slug, %earlier, later = %entry.source, "slug collision");
                report.collisions.push(SlugCollision {
                    slug: entry.slug.clone(),
                    earlier,
                    later: entry.source.clone(),
                });
            }
            entries.push(entry);
        }
        report.documents.push(doc_report);
    }

    report.unused_inputs = options
        .inputs
        .keys()
        .filter(|name| !declared_inputs.contains(name))
        .cloned()
        .collect();

    if mode == Mode::Build {
        let generated_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let index_path =
            generate::write_index(&entries, &ctx.config, &ctx.css, &generated_at, output_dir)?;
        generate::write_manifest(&entries, output_dir)?;
        tracing::info!(entries = entries.len(), "wrote index");
        report.index_path = Some(index_path);
    }

    report.index_entries = entries;
    Ok(report)
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Process one document. Only an output write failure is an `Err`.
fn process_document(
    path: &Path,
    ctx: &Context<'_>,
    declared_inputs: &mut Vec<String>,
) -> Result<(DocumentReport, Option<IndexEntry>), BuildError> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let doc = match document::read_document(path) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(%source, error = %e, "skipping document");
            let report = DocumentReport {
                source,
                outcome: DocumentOutcome::Failed(e),
            };
            return Ok((report, None));
        }
    };
    tracing::debug!(%source, sections = doc.sections.len(), "parsed document");

    for param in doc.input_parameters() {
        if !declared_inputs.contains(&param.name) {
            declared_inputs.push(param.name.clone());
        }
    }

    let assets = match ctx.mode {
        Mode::Build => assets::copy_document_assets(&doc, &ctx.dirs),
        Mode::Check => assets::check_document_assets(&doc, &ctx.dirs),
    };

    let page = page::build_page(doc, &ctx.options.inputs, assets.status);
    if ctx.mode == Mode::Build {
        generate::write_equipment_page(&page, &ctx.config, &ctx.css, &ctx.options.output_dir)?;
    }

    let check_errors = page
        .checks
        .iter()
        .filter_map(|check| match &check.outcome {
            CheckOutcome::Error(message) => Some((check.name.clone(), message.clone())),
            _ => None,
        })
        .collect();

    let generated = GeneratedPage {
        slug: page.slug.clone(),
        file_name: page.file_name(),
        summary: CheckSummary::of(&page.checks),
        check_errors,
        warnings: assets.warnings,
    };
    let report = DocumentReport {
        source,
        outcome: DocumentOutcome::Generated(generated),
    };
    Ok((report, Some(page.index_entry())))
}
