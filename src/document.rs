//! Equipment document parsing.
//!
//! Stage 1 of the generator. Each `*.toml` file in the input directory
//! describes one shaker:
//!
//! ```toml
//! [shaker]
//! manufacturer = "Apex"
//! model = "DS-5000"
//! nominal_force = 5000          # [N] Sine force, peak
//! frequency_range = [5, 3000]   # [Hz] Usable frequency range
//! image = "apex-ds5000.jpg"
//! manual = "apex-ds5000.pdf"
//!
//! [armature]                    # any other table: generic spec group
//! mass = 4.5                    # [kg] Moving mass
//!
//! [input_parameters]            # supplied by the reader of the page
//! payload_mass = "float"        # [kg] Test article mass
//!
//! [additional_checks]           # formulas over all of the above
//! force_margin = "nominal_force * 0.9 > payload_mass * 9.81" # [-] Force margin
//! ```
//!
//! Three table names are reserved (`shaker`, `input_parameters`,
//! `additional_checks`). Every other table becomes a [`Section::Generic`]
//! with its name preserved verbatim. Top-level keys outside any table are
//! grouped into a generic `general` section. Nested tables are flattened to
//! dotted parameter names.
//!
//! Any generic section may declare its own `image` (an amplifier photo, a
//! slip table drawing). It is copied alongside the shaker image and shown
//! with that section.

use crate::annotation::{Annotation, Annotations};
use crate::types::SpecValue;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const SHAKER_SECTION: &str = "shaker";
pub const INPUT_SECTION: &str = "input_parameters";
pub const CHECKS_SECTION: &str = "additional_checks";
pub const GENERAL_SECTION: &str = "general";
pub const IMAGE_KEY: &str = "image";

const UNKNOWN: &str = "Unknown";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("[{0}] must be a table")]
    NotATable(String),
}

/// A specification parameter: name, value, and its comment annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub value: SpecValue,
    pub annotation: Annotation,
}

/// A value the reader of the generated page is expected to supply.
#[derive(Debug, Clone, PartialEq)]
pub struct InputParameter {
    pub name: String,
    /// The placeholder declared in the document, e.g. `"float"`.
    pub declared_type: String,
    pub annotation: Annotation,
}

/// A named formula from `[additional_checks]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDecl {
    pub name: String,
    pub formula: String,
    pub annotation: Annotation,
}

/// One table of the document, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Shaker(Vec<Entry>),
    InputParameters(Vec<InputParameter>),
    Checks(Vec<CheckDecl>),
    Generic { name: String, entries: Vec<Entry> },
}

impl Section {
    /// The table name as written in the document.
    pub fn name(&self) -> &str {
        match self {
            Section::Shaker(_) => SHAKER_SECTION,
            Section::InputParameters(_) => INPUT_SECTION,
            Section::Checks(_) => CHECKS_SECTION,
            Section::Generic { name, .. } => name,
        }
    }

    /// Heading shown on the equipment page: `frequency_response` → `Frequency Response`.
    pub fn title(&self) -> String {
        match self {
            Section::Shaker(_) => "Shaker".to_string(),
            Section::InputParameters(_) => "Input Parameters".to_string(),
            Section::Checks(_) => "Additional Checks".to_string(),
            Section::Generic { name, .. } => humanize(name),
        }
    }

    /// Image file declared by a generic section, if any.
    pub fn image(&self) -> Option<String> {
        match self {
            Section::Generic { entries, .. } => entries
                .iter()
                .find(|e| e.name == IMAGE_KEY)
                .map(|e| e.value.to_string())
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Specification entries, for sections that carry them.
    pub fn entries(&self) -> &[Entry] {
        match self {
            Section::Shaker(entries) | Section::Generic { entries, .. } => entries,
            Section::InputParameters(_) | Section::Checks(_) => &[],
        }
    }
}

/// One parsed input file.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentDocument {
    /// Source file name, e.g. `apex-ds5000.toml`.
    pub source: String,
    pub manufacturer: String,
    pub model: String,
    pub nominal_force: Option<Entry>,
    pub manual: Option<String>,
    pub image: Option<String>,
    pub sections: Vec<Section>,
}

impl EquipmentDocument {
    /// `"{manufacturer} {model}"`.
    pub fn title(&self) -> String {
        format!("{} {}", self.manufacturer, self.model)
    }

    /// Nominal force with its unit, e.g. `5000 N`.
    pub fn nominal_force_display(&self) -> Option<String> {
        self.nominal_force.as_ref().map(|entry| {
            if entry.annotation.unit.is_empty() {
                entry.value.to_string()
            } else {
                format!("{} {}", entry.value, entry.annotation.unit)
            }
        })
    }

    /// Every specification entry from the shaker and generic sections.
    pub fn spec_entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|s| s.entries().iter())
    }

    /// Images declared by generic sections, in document order.
    pub fn section_images(&self) -> Vec<String> {
        self.sections.iter().filter_map(Section::image).collect()
    }

    pub fn input_parameters(&self) -> &[InputParameter] {
        self.sections
            .iter()
            .find_map(|s| match s {
                Section::InputParameters(params) => Some(params.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn checks(&self) -> &[CheckDecl] {
        self.sections
            .iter()
            .find_map(|s| match s {
                Section::Checks(checks) => Some(checks.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

/// Read and parse a document from disk.
pub fn read_document(path: &Path) -> Result<EquipmentDocument, DocumentError> {
    let text = fs::read_to_string(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_document(&source, &text)
}

/// Parse document text. `source` is only used for identification.
pub fn parse_document(source: &str, text: &str) -> Result<EquipmentDocument, DocumentError> {
    let root: toml::Table = toml::from_str(text)?;
    let annotations = Annotations::scan(text);

    let mut sections = Vec::new();
    let mut general = Vec::new();

    for (name, value) in &root {
        let toml::Value::Table(table) = value else {
            if is_reserved(name) {
                return Err(DocumentError::NotATable(name.clone()));
            }
            general.push(Entry {
                name: name.clone(),
                value: SpecValue::from_toml(value),
                annotation: annotations.get("", name),
            });
            continue;
        };

        let section = match name.as_str() {
            SHAKER_SECTION => Section::Shaker(collect_entries(table, name, &annotations)),
            INPUT_SECTION => Section::InputParameters(
                table
                    .iter()
                    .map(|(key, placeholder)| InputParameter {
                        name: key.clone(),
                        declared_type: SpecValue::from_toml(placeholder).to_string(),
                        annotation: annotations.get(name, key),
                    })
                    .collect(),
            ),
            CHECKS_SECTION => Section::Checks(
                table
                    .iter()
                    .map(|(key, formula)| CheckDecl {
                        name: key.clone(),
                        formula: match formula {
                            toml::Value::String(s) => s.trim().to_string(),
                            other => other.to_string(),
                        },
                        annotation: annotations.get(name, key),
                    })
                    .collect(),
            ),
            _ => Section::Generic {
                name: name.clone(),
                entries: collect_entries(table, name, &annotations),
            },
        };
        sections.push(section);
    }

    if !general.is_empty() {
        sections.insert(
            0,
            Section::Generic {
                name: GENERAL_SECTION.to_string(),
                entries: general,
            },
        );
    }

    let shaker: &[Entry] = sections
        .iter()
        .find_map(|s| match s {
            Section::Shaker(entries) => Some(entries.as_slice()),
            _ => None,
        })
        .unwrap_or(&[]);
    let find = |key: &str| shaker.iter().find(|e| e.name == key);
    let text_of = |key: &str| find(key).map(|e| e.value.to_string());

    Ok(EquipmentDocument {
        source: source.to_string(),
        manufacturer: text_of("manufacturer").unwrap_or_else(|| UNKNOWN.to_string()),
        model: text_of("model").unwrap_or_else(|| UNKNOWN.to_string()),
        nominal_force: find("nominal_force").cloned(),
        manual: text_of("manual").filter(|s| !s.is_empty()),
        image: text_of(IMAGE_KEY).filter(|s| !s.is_empty()),
        sections,
    })
}

fn is_reserved(name: &str) -> bool {
    matches!(name, SHAKER_SECTION | INPUT_SECTION | CHECKS_SECTION)
}

/// Flatten a table into entries; nested tables become dotted names.
fn collect_entries(table: &toml::Table, section: &str, annotations: &Annotations) -> Vec<Entry> {
    let mut entries = Vec::new();
    flatten_into(table, section, "", annotations, &mut entries);
    entries
}

fn flatten_into(
    table: &toml::Table,
    section_path: &str,
    prefix: &str,
    annotations: &Annotations,
    out: &mut Vec<Entry>,
) {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => {
                let nested_path = format!("{section_path}.{key}");
                flatten_into(nested, &nested_path, &name, annotations, out);
            }
            _ => out.push(Entry {
                annotation: annotations.get(section_path, key),
                value: SpecValue::from_toml(value),
                name,
            }),
        }
    }
}

/// `frequency_response` → `Frequency Response`.
fn humanize(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
