//! # Shaker Docs
//!
//! A static site generator for vibration-test equipment. Each shaker is
//! described by one TOML file; the generator turns every file into an HTML
//! page and links them all from an index page.
//!
//! # Architecture: One Sequential Pass
//!
//! ```text
//! input/*.toml  →  EquipmentDocument  →  PageModel  →  docs/<slug>.html
//!                   (document)            (page)        (generate)
//!                                                        ↓
//!                                      Vec<IndexEntry> → docs/index.html
//! ```
//!
//! Documents are processed one at a time in file-name order. A document that
//! fails to parse is reported and skipped; the rest of the build carries on.
//! The only state shared across documents is the list of index entries,
//! owned by [`pipeline::build_site`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Parses one equipment TOML file into sections of annotated entries |
//! | [`annotation`] | Recovers `# [unit] description` trailing comments from the raw text |
//! | [`formula`] | Tokenizer, parser, and evaluator for check formulas |
//! | [`page`] | Evaluates checks and assembles the page model |
//! | [`naming`] | Slug derivation for output file names |
//! | [`assets`] | Copies images, manuals, and the static directory |
//! | [`generate`] | Renders equipment pages and the index with Maud |
//! | [`pipeline`] | Orchestrates a build or check run |
//! | [`config`] | Optional `config.toml` loading, validation, and CSS generation |
//! | [`types`] | Values shared across modules (`SpecValue`, `IndexEntry`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Comments Carry Units
//!
//! TOML has no notion of units, and a value like `5000` is meaningless on a
//! datasheet without `N`. The input format keeps units and descriptions in
//! trailing comments (`nominal_force = 5000  # [N] Sine force, peak`), which
//! a TOML parser discards. [`annotation`] scans the raw text a second time to
//! recover them and keys them by section and parameter name.
//!
//! ## Closed Formula Grammar
//!
//! Check formulas come from input files, so they are evaluated by a small
//! purpose-built interpreter rather than anything general. Numbers, variable
//! names, `+ - * /`, parentheses, unary sign, and a single comparison are all
//! it understands. Anything else is a syntax error for that check only.
//!
//! ## Templates In The Binary
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Templates are
//! checked at compile time and interpolation is escaped, so values read from
//! input files cannot inject markup. There is no template directory that can
//! go missing at runtime; the `templates/` directory only supplies static
//! files such as logos.

pub mod annotation;
pub mod assets;
pub mod config;
pub mod document;
pub mod formula;
pub mod generate;
pub mod naming;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
