//! Page model construction.
//!
//! Combines an [`EquipmentDocument`] with the results of its check formulas
//! into a [`PageModel`] ready for the renderer.
//!
//! ## Variable Set
//!
//! Check formulas can reference every specification key of the document,
//! whichever section it came from. Numeric values (booleans as 0/1) become
//! numbers, everything else becomes text. Input parameters are
//! [`Variable::Unresolved`] unless a value was supplied for the run, in
//! which case checks depending on them show as awaiting input instead of
//! failing.

use crate::annotation::Annotation;
use crate::document::EquipmentDocument;
use crate::formula::{self, EvalError, EvalValue, FormulaParts, Variable, Variables};
use crate::naming;
use crate::types::IndexEntry;
use std::collections::{BTreeMap, BTreeSet};

/// Input-parameter values supplied for a run (`--set name=value`).
pub type SuppliedInputs = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Passed,
    Failed,
    /// Formula without a comparison.
    Value(f64),
    /// Input parameters the formula needs but that have no value.
    AwaitingInput(Vec<String>),
    Error(String),
}

impl CheckOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Passed => "pass",
            CheckOutcome::Failed => "fail",
            CheckOutcome::Value(_) => "value",
            CheckOutcome::AwaitingInput(_) => "input",
            CheckOutcome::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCheck {
    pub name: String,
    pub formula: String,
    pub parts: FormulaParts,
    pub outcome: CheckOutcome,
    pub annotation: Annotation,
}

/// Counts per outcome, for console reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub passed: usize,
    pub failed: usize,
    pub values: usize,
    pub awaiting_input: usize,
    pub errors: usize,
}

impl CheckSummary {
    pub fn of(checks: &[EvaluatedCheck]) -> Self {
        let mut summary = CheckSummary::default();
        for check in checks {
            match check.outcome {
                CheckOutcome::Passed => summary.passed += 1,
                CheckOutcome::Failed => summary.failed += 1,
                CheckOutcome::Value(_) => summary.values += 1,
                CheckOutcome::AwaitingInput(_) => summary.awaiting_input += 1,
                CheckOutcome::Error(_) => summary.errors += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.values + self.awaiting_input + self.errors
    }
}

/// Availability of the assets a document declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetStatus {
    pub image: bool,
    pub manual: bool,
    /// Section image files found in the input directory.
    pub section_images: BTreeSet<String>,
}

/// Everything the renderer needs for one equipment page.
#[derive(Debug, Clone)]
pub struct PageModel {
    pub document: EquipmentDocument,
    pub checks: Vec<EvaluatedCheck>,
    pub slug: String,
    /// Which declared assets were found in the input directory.
    pub assets: AssetStatus,
    /// Values supplied for input parameters on this run.
    pub supplied: SuppliedInputs,
}

impl PageModel {
    pub fn file_name(&self) -> String {
        naming::page_file_name(&self.slug)
    }

    pub fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            source: self.document.source.clone(),
            slug: self.slug.clone(),
            link: self.file_name(),
            title: self.document.title(),
            manufacturer: self.document.manufacturer.clone(),
            model: self.document.model.clone(),
            nominal_force: self.document.nominal_force_display(),
        }
    }
}

/// Merge every specification key and input parameter into one variable set.
pub fn variables_for(doc: &EquipmentDocument, supplied: &SuppliedInputs) -> Variables {
    let mut vars = Variables::new();

    for entry in doc.spec_entries() {
        let variable = match entry.value.as_number() {
            Some(n) => Variable::Number(n),
            None => Variable::Text(entry.value.to_string()),
        };
        vars.insert(entry.name.clone(), variable);
    }

    for param in doc.input_parameters() {
        let variable = match supplied.get(&param.name) {
            Some(value) => Variable::Number(*value),
            None => Variable::Unresolved {
                declared_type: param.declared_type.clone(),
            },
        };
        vars.insert(param.name.clone(), variable);
    }

    vars
}

/// Evaluate every check of `doc`. Failures stay local to their check.
pub fn evaluate_checks(doc: &EquipmentDocument, vars: &Variables) -> Vec<EvaluatedCheck> {
    doc.checks()
        .iter()
        .map(|check| {
            let outcome = match formula::evaluate(&check.formula, vars) {
                Ok(EvalValue::Bool(true)) => CheckOutcome::Passed,
                Ok(EvalValue::Bool(false)) => CheckOutcome::Failed,
                Ok(EvalValue::Number(n)) => CheckOutcome::Value(n),
                Err(EvalError::UnresolvedInput(names)) => CheckOutcome::AwaitingInput(names),
                Err(e) => CheckOutcome::Error(e.to_string()),
            };
            tracing::debug!(check = %check.name, outcome = outcome.label(), "evaluated check");
            EvaluatedCheck {
                name: check.name.clone(),
                formula: check.formula.clone(),
                parts: formula::split_formula(&check.formula),
                outcome,
                annotation: check.annotation.clone(),
            }
        })
        .collect()
}

/// Build the page model for one document.
pub fn build_page(
    document: EquipmentDocument,
    supplied: &SuppliedInputs,
    assets: AssetStatus,
) -> PageModel {
    let vars = variables_for(&document, supplied);
    let checks = evaluate_checks(&document, &vars);
    let slug = naming::slugify(&document.manufacturer, &document.model);
    let supplied = document
        .input_parameters()
        .iter()
        .filter_map(|p| supplied.get(&p.name).map(|v| (p.name.clone(), *v)))
        .collect();
    PageModel {
        document,
        checks,
        slug,
        assets,
        supplied,
    }
}
