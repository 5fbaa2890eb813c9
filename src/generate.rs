//! HTML site generation.
//!
//! Renders equipment pages and the index page with
//! [maud](https://maud.lambda.xyz/). Templates are Rust functions compiled
//! into the binary, so there is no template directory that can go missing at
//! runtime. Interpolated values are escaped automatically.
//!
//! ## Generated Pages
//!
//! - **Equipment pages** (`/<slug>.html`): key facts, image, manual link, and
//!   one table per document section, each with its own image when it
//!   declares one. The checks table is placed right after
//!   the input parameters table.
//! - **Index page** (`/index.html`): one row per processed document, in
//!   discovery order, with a generation timestamp.
//! - **Manifest** (`/equipment.json`): the index entries as JSON.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and inlined into every
//! page, after the color custom properties generated from config.

use crate::config::{self, SiteConfig};
use crate::document::{InputParameter, Section};
use crate::page::{CheckOutcome, EvaluatedCheck, PageModel, SuppliedInputs};
use crate::types::IndexEntry;
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const INDEX_FILE: &str = "index.html";
pub const MANIFEST_FILE: &str = "equipment.json";
pub const IMAGES_DIR: &str = "images";
pub const MANUALS_DIR: &str = "manuals";

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Full stylesheet: config colors followed by the embedded base styles.
pub fn stylesheet(config: &SiteConfig) -> String {
    format!("{}\n\n{}", config::generate_color_css(&config.colors), CSS_STATIC)
}

/// Render and write `<slug>.html` for one equipment page.
pub fn write_equipment_page(
    page: &PageModel,
    config: &SiteConfig,
    css: &str,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    let path = output_dir.join(page.file_name());
    let html = render_equipment_page(page, config, css);
    write_file(&path, html.into_string())?;
    Ok(path)
}

/// Render and write `index.html`.
pub fn write_index(
    entries: &[IndexEntry],
    config: &SiteConfig,
    css: &str,
    generated_at: &str,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    let path = output_dir.join(INDEX_FILE);
    let html = render_index(entries, config, css, generated_at);
    write_file(&path, html.into_string())?;
    Ok(path)
}

/// Write the index entries as pretty-printed JSON.
pub fn write_manifest(entries: &[IndexEntry], output_dir: &Path) -> Result<PathBuf, GenerateError> {
    let path = output_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(entries)?;
    write_file(&path, json)?;
    Ok(path)
}

fn write_file(path: &Path, contents: String) -> Result<(), GenerateError> {
    fs::write(path, contents).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header with optional logo and breadcrumb
fn site_header(config: &SiteConfig, breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            @if let Some(logo) = &config.logo {
                a href=(INDEX_FILE) {
                    img.site-logo src=(logo) alt=(config.site_title);
                }
            }
            nav.breadcrumb {
                (breadcrumb)
            }
        }
    }
}

/// Trim float noise: `6.000000001` → `6`, `0.30000000000000004` → `0.3`.
/// Magnitudes below `1e-4` switch to exponent form: `0.00001` → `1e-5`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{n:.0}");
    }
    if n.abs() < 1e-4 {
        let sci = format!("{n:.4e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                format!("{mantissa}e{exp}")
            }
            None => sci,
        };
    }
    let fixed = format!("{n:.4}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Sections in display order: checks move to right after input parameters,
/// or to the end when the document declares none.
fn display_order(sections: &[Section]) -> Vec<&Section> {
    let checks = sections.iter().find(|s| matches!(s, Section::Checks(_)));
    let mut ordered = Vec::with_capacity(sections.len());
    let mut placed = false;
    for section in sections {
        match section {
            Section::Checks(_) => {}
            Section::InputParameters(_) => {
                ordered.push(section);
                if let Some(checks) = checks {
                    ordered.push(checks);
                    placed = true;
                }
            }
            _ => ordered.push(section),
        }
    }
    if let (Some(checks), false) = (checks, placed) {
        ordered.push(checks);
    }
    ordered
}

fn render_section(section: &Section, page: &PageModel) -> Markup {
    html! {
        section.spec-section id=(section.name()) {
            h2 { (section.title()) }
            @if let Some(image) = section.image() {
                @if page.assets.section_images.contains(&image) {
                    figure.section-image {
                        img src={ (IMAGES_DIR) "/" (image) } alt=(section.title());
                    }
                } @else {
                    p.asset-missing { "Image not available: " (image) }
                }
            }
            @match section {
                Section::InputParameters(params) => { (input_table(params, &page.supplied)) }
                Section::Checks(_) => { (checks_table(&page.checks)) }
                Section::Shaker(entries) | Section::Generic { entries, .. } => {
                    table.spec-table {
                        thead {
                            tr { th { "Parameter" } th { "Value" } th { "Unit" } th { "Description" } }
                        }
                        tbody {
                            @for entry in entries {
                                tr {
                                    td.name { code { (entry.name) } }
                                    td.value { (entry.value) }
                                    td.unit { (entry.annotation.unit) }
                                    td.description { (entry.annotation.description) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn input_table(params: &[InputParameter], supplied: &SuppliedInputs) -> Markup {
    html! {
        table.input-table {
            thead {
                tr { th { "Parameter" } th { "Type" } th { "Value" } th { "Unit" } th { "Description" } }
            }
            tbody {
                @for param in params {
                    tr {
                        td.name { code { (param.name) } }
                        td.kind { (param.declared_type) }
                        td.value {
                            @if let Some(value) = supplied.get(&param.name) {
                                (format_number(*value))
                            } @else {
                                "\u{2014}"
                            }
                        }
                        td.unit { (param.annotation.unit) }
                        td.description { (param.annotation.description) }
                    }
                }
            }
        }
    }
}

fn checks_table(checks: &[EvaluatedCheck]) -> Markup {
    html! {
        table.checks-table {
            thead {
                tr { th { "Check" } th { "Formula" } th { "Result" } th { "Unit" } th { "Description" } }
            }
            tbody {
                @for check in checks {
                    tr {
                        td.name { code { (check.name) } }
                        td.formula {
                            code { (check.parts.left) }
                            @if let (Some(op), Some(right)) = (check.parts.operator, &check.parts.right) {
                                span.operator { (op) }
                                code { (right) }
                            }
                        }
                        td.result { (check_badge(&check.outcome)) }
                        td.unit { (check.annotation.unit) }
                        td.description { (check.annotation.description) }
                    }
                }
            }
        }
    }
}

fn check_badge(outcome: &CheckOutcome) -> Markup {
    let class = format!("badge badge-{}", outcome.label());
    html! {
        @match outcome {
            CheckOutcome::Passed => { span class=(class) { "pass" } }
            CheckOutcome::Failed => { span class=(class) { "fail" } }
            CheckOutcome::Value(n) => { span class=(class) { (format_number(*n)) } }
            CheckOutcome::AwaitingInput(names) => {
                span class=(class) { "input" }
                span.check-detail { "needs " (names.join(", ")) }
            }
            CheckOutcome::Error(message) => {
                span class=(class) { "error" }
                span.check-detail { (message) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one equipment page
pub fn render_equipment_page(page: &PageModel, config: &SiteConfig, css: &str) -> Markup {
    let doc = &page.document;
    let title = doc.title();

    let breadcrumb = html! {
        a href=(INDEX_FILE) { (config.site_title) }
        " \u{203a} "
        (title)
    };

    let content = html! {
        (site_header(config, breadcrumb))
        main.equipment-page {
            header.equipment-header {
                div {
                    h1 { (title) }
                    dl.key-facts {
                        dt { "Manufacturer" }
                        dd { (doc.manufacturer) }
                        dt { "Model" }
                        dd { (doc.model) }
                        @if let Some(force) = doc.nominal_force_display() {
                            dt { "Nominal force" }
                            dd { (force) }
                        }
                    }
                    @if let Some(manual) = &doc.manual {
                        @if page.assets.manual {
                            a.manual-link href={ (MANUALS_DIR) "/" (manual) } { "Manual (" (manual) ")" }
                        } @else {
                            p.asset-missing { "Manual not available: " (manual) }
                        }
                    }
                }
                @if let Some(image) = &doc.image {
                    @if page.assets.image {
                        figure.equipment-image {
                            img src={ (IMAGES_DIR) "/" (image) } alt=(title);
                        }
                    } @else {
                        p.asset-missing { "Image not available: " (image) }
                    }
                }
            }
            @for section in display_order(&doc.sections) {
                (render_section(section, page))
            }
        }
    };

    let page_title = format!("{} | {}", title, config.site_title);
    base_document(&page_title, css, content)
}

/// Renders the index page listing every processed document
pub fn render_index(
    entries: &[IndexEntry],
    config: &SiteConfig,
    css: &str,
    generated_at: &str,
) -> Markup {
    let breadcrumb = html! {
        a href=(INDEX_FILE) { (config.site_title) }
    };

    let content = html! {
        (site_header(config, breadcrumb))
        main.index-page {
            h1 { (config.site_title) }
            @if entries.is_empty() {
                p.empty-notice { "No equipment documented." }
            } @else {
                table.index-table {
                    thead {
                        tr { th { "Model" } th { "Manufacturer" } th { "Nominal force" } }
                    }
                    tbody {
                        @for entry in entries {
                            tr {
                                td { a href=(entry.link) { (entry.model) } }
                                td { (entry.manufacturer) }
                                td.value { (entry.nominal_force.as_deref().unwrap_or("\u{2014}")) }
                            }
                        }
                    }
                }
            }
        }
        footer.site-footer {
            (entries.len()) " items \u{b7} Generated "
            time.generated { (generated_at) }
        }
    };

    base_document(&config.site_title, css, content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::page::{AssetStatus, build_page};
    use tempfile::TempDir;

    const DOC: &str = r#"
[shaker]
manufacturer = "Apex"
model = "DS-5000"
nominal_force = 5000            # [N] Sine force, peak
frequency_range = [5, 3000]     # [Hz] Usable range
image = "apex.jpg"
manual = "apex.pdf"

[armature]
mass = 4.5                      # [kg] Moving mass

[input_parameters]
payload_mass = "float"          # [kg] Test article mass

[additional_checks]
mass_limit = "payload_mass <= 50" # [kg] Payload limit
light = "mass < 10"
broken = "mass >> 1"

[cooling]
medium = "air"
image = "cooling.jpg"
"#;

    fn page(assets: AssetStatus) -> PageModel {
        let doc = parse_document("apex.toml", DOC).unwrap();
        build_page(doc, &SuppliedInputs::new(), assets)
    }

    fn all_assets() -> AssetStatus {
        AssetStatus {
            image: true,
            manual: true,
            section_images: ["cooling.jpg".to_string()].into(),
        }
    }

    fn entry(model: &str) -> IndexEntry {
        IndexEntry {
            source: format!("{model}.toml"),
            slug: model.to_lowercase(),
            link: format!("{}.html", model.to_lowercase()),
            title: format!("Apex {model}"),
            manufacturer: "Apex".to_string(),
            model: model.to_string(),
            nominal_force: Some("5000 N".to_string()),
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[test]
    fn base_document_includes_doctype() {
        let doc = base_document("Test", "body {}", html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test</title>"));
    }

    #[test]
    fn header_shows_logo_when_configured() {
        let config = SiteConfig {
            logo: Some("static/logo.svg".to_string()),
            ..SiteConfig::default()
        };
        let header = site_header(&config, html! { "x" }).into_string();
        assert!(header.contains(r#"src="static/logo.svg""#));

        let plain = site_header(&SiteConfig::default(), html! { "x" }).into_string();
        assert!(!plain.contains("site-logo"));
    }

    #[test]
    fn format_number_trims_noise() {
        assert_eq!(format_number(6.0), "6");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(9.8100001), "9.81");
    }

    #[test]
    fn format_number_keeps_small_magnitudes() {
        assert_eq!(format_number(0.00002 / 2.0), "1e-5");
        assert_eq!(format_number(-0.000012345), "-1.2345e-5");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn tiny_check_value_not_rendered_as_zero() {
        let doc = parse_document(
            "x.toml",
            "[shaker]\nstroke = 0.00002\n\n[additional_checks]\nhalf = \"stroke / 2\"\n",
        )
        .unwrap();
        let p = build_page(doc, &SuppliedInputs::new(), AssetStatus::default());
        let html = render_equipment_page(&p, &SiteConfig::default(), "").into_string();
        assert!(html.contains(r#"<span class="badge badge-value">1e-5</span>"#));
    }

    #[test]
    fn stylesheet_prepends_colors() {
        let css = stylesheet(&SiteConfig::default());
        assert!(css.starts_with(":root {"));
        assert!(css.contains(".badge-pass"));
    }

    // =========================================================================
    // Section ordering
    // =========================================================================

    #[test]
    fn checks_follow_input_parameters() {
        let p = page(all_assets());
        let names: Vec<&str> = display_order(&p.document.sections)
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(
            names,
            vec!["shaker", "armature", "input_parameters", "additional_checks", "cooling"]
        );
    }

    #[test]
    fn checks_last_without_input_parameters() {
        let doc = parse_document(
            "x.toml",
            "[additional_checks]\nc = \"1 > 0\"\n\n[shaker]\nmodel = \"X\"\n",
        )
        .unwrap();
        let names: Vec<&str> = display_order(&doc.sections).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["shaker", "additional_checks"]);
    }

    // =========================================================================
    // Equipment page
    // =========================================================================

    #[test]
    fn equipment_page_lists_every_section_and_value() {
        let html = render_equipment_page(&page(all_assets()), &SiteConfig::default(), "").into_string();

        assert!(html.contains("<title>Apex DS-5000 | Shaker Equipment Documentation</title>"));
        assert!(html.contains("<h1>Apex DS-5000</h1>"));
        assert!(html.contains("<code>frequency_range</code>"));
        assert!(html.contains("5 \u{2013} 3000"));
        assert!(html.contains("Sine force, peak"));
        assert!(html.contains("Moving mass"));
        assert!(html.contains("<h2>Cooling</h2>"));
        assert!(html.contains("<h2>Additional Checks</h2>"));
    }

    #[test]
    fn equipment_page_shows_assets() {
        let html = render_equipment_page(&page(all_assets()), &SiteConfig::default(), "").into_string();
        assert!(html.contains(r#"src="images/apex.jpg""#));
        assert!(html.contains(r#"href="manuals/apex.pdf""#));
        assert!(html.contains(r#"<img src="images/cooling.jpg" alt="Cooling">"#));
        assert!(!html.contains("asset-missing"));
    }

    #[test]
    fn equipment_page_marks_missing_assets() {
        let html = render_equipment_page(&page(AssetStatus::default()), &SiteConfig::default(), "")
            .into_string();
        assert!(html.contains("Image not available: apex.jpg"));
        assert!(html.contains("Manual not available: apex.pdf"));
        assert!(html.contains("Image not available: cooling.jpg"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn equipment_page_check_badges() {
        let html = render_equipment_page(&page(all_assets()), &SiteConfig::default(), "").into_string();
        assert!(html.contains(r#"class="badge badge-input""#));
        assert!(html.contains("needs payload_mass"));
        assert!(html.contains(r#"class="badge badge-pass""#));
        assert!(html.contains(r#"class="badge badge-error""#));
        assert!(html.contains(r#"<span class="operator">&lt;=</span>"#));
    }

    #[test]
    fn equipment_page_shows_supplied_inputs() {
        let doc = parse_document("apex.toml", DOC).unwrap();
        let mut supplied = SuppliedInputs::new();
        supplied.insert("payload_mass".to_string(), 60.0);
        let p = build_page(doc, &supplied, all_assets());

        let html = render_equipment_page(&p, &SiteConfig::default(), "").into_string();
        assert!(html.contains(r#"<td class="value">60</td>"#));
        assert!(html.contains(r#"class="badge badge-fail""#));
    }

    #[test]
    fn equipment_page_escapes_values() {
        let doc = parse_document(
            "x.toml",
            "[shaker]\nmanufacturer = \"<script>alert('x')</script>\"\nmodel = \"M\"\n",
        )
        .unwrap();
        let p = build_page(doc, &SuppliedInputs::new(), AssetStatus::default());
        let html = render_equipment_page(&p, &SiteConfig::default(), "").into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Index page
    // =========================================================================

    #[test]
    fn index_lists_entries_in_given_order() {
        let entries = vec![entry("Zeta"), entry("Alpha")];
        let html = render_index(&entries, &SiteConfig::default(), "", "2026-01-01 00:00:00")
            .into_string();

        let zeta = html.find("zeta.html").unwrap();
        let alpha = html.find("alpha.html").unwrap();
        assert!(zeta < alpha);
        assert!(html.contains("5000 N"));
        assert!(html.contains("2 items"));
        assert!(html.contains(r#"<time class="generated">2026-01-01 00:00:00</time>"#));
    }

    #[test]
    fn index_empty_notice() {
        let html = render_index(&[], &SiteConfig::default(), "", "now").into_string();
        assert!(html.contains("No equipment documented."));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn index_missing_force_shows_dash() {
        let mut e = entry("Bare");
        e.nominal_force = None;
        let html = render_index(&[e], &SiteConfig::default(), "", "now").into_string();
        assert!(html.contains("\u{2014}"));
    }

    // =========================================================================
    // Writers
    // =========================================================================

    #[test]
    fn writers_create_files() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let p = page(all_assets());

        let page_path = write_equipment_page(&p, &config, "", tmp.path()).unwrap();
        assert_eq!(page_path, tmp.path().join("apex-ds-5000.html"));
        assert!(page_path.exists());

        let entries = vec![p.index_entry()];
        write_index(&entries, &config, "", "now", tmp.path()).unwrap();
        assert!(tmp.path().join(INDEX_FILE).exists());

        let manifest = write_manifest(&entries, tmp.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(manifest).unwrap()).unwrap();
        assert_eq!(json[0]["slug"], "apex-ds-5000");
        assert_eq!(json[0]["nominal_force"], "5000 N");
    }

    #[test]
    fn write_into_missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");
        let result = write_manifest(&[], &missing);
        assert!(matches!(result, Err(GenerateError::Io { .. })));
    }
}
