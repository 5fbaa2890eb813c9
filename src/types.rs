//! Shared types used across pipeline stages.
//!
//! [`SpecValue`] is produced by the document parser and consumed by the page
//! builder and renderer. [`IndexEntry`] is accumulated by the orchestrator and
//! serialized both into the index page and `equipment.json`.

use serde::Serialize;
use std::fmt;

/// A parameter value from an equipment document.
///
/// Two-element lists are treated as ranges (`frequency_range = [5, 3000]`
/// renders as `5 – 3000`); longer lists render comma separated.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    List(Vec<SpecValue>),
}

impl SpecValue {
    /// Convert a parsed TOML value. Datetimes and tables become text.
    pub fn from_toml(value: &toml::Value) -> Self {
        match value {
            toml::Value::Integer(i) => SpecValue::Integer(*i),
            toml::Value::Float(f) => SpecValue::Float(*f),
            toml::Value::Boolean(b) => SpecValue::Boolean(*b),
            toml::Value::String(s) => SpecValue::Text(s.clone()),
            toml::Value::Array(items) => {
                SpecValue::List(items.iter().map(SpecValue::from_toml).collect())
            }
            toml::Value::Datetime(dt) => SpecValue::Text(dt.to_string()),
            toml::Value::Table(table) => SpecValue::Text(table.to_string().trim().to_string()),
        }
    }

    /// Numeric view used by the formula evaluator. Booleans count as 0/1.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SpecValue::Integer(i) => Some(*i as f64),
            SpecValue::Float(f) => Some(*f),
            SpecValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            SpecValue::Text(_) | SpecValue::List(_) => None,
        }
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::Integer(i) => write!(f, "{i}"),
            SpecValue::Float(v) => write!(f, "{v}"),
            SpecValue::Boolean(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            SpecValue::Text(s) => f.write_str(s),
            SpecValue::List(items) if items.len() == 2 => {
                write!(f, "{} \u{2013} {}", items[0], items[1])
            }
            SpecValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

/// One row of the index page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    /// Source document filename (e.g. `apex-ds5000.toml`).
    pub source: String,
    /// Output slug derived from manufacturer + model.
    pub slug: String,
    /// Relative link to the equipment page.
    pub link: String,
    pub title: String,
    pub manufacturer: String,
    pub model: String,
    /// Nominal force with its unit, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_force: Option<String>,
}
