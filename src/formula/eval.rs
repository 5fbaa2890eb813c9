//! Formula evaluation against a variable set.

use super::EvalError;
use super::parser::{ArithOp, CmpOp, Expr, Formula, parse};
use std::collections::BTreeMap;
use std::fmt;

/// A value a formula may reference by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Number(f64),
    Text(String),
    /// An input parameter with no supplied value. Referencing it yields
    /// [`EvalError::UnresolvedInput`] rather than a number.
    Unresolved { declared_type: String },
}

pub type Variables = BTreeMap<String, Variable>;

/// Result of a successful evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvalValue {
    Bool(bool),
    Number(f64),
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalValue::Bool(b) => write!(f, "{b}"),
            EvalValue::Number(n) => write!(f, "{n}"),
        }
    }
}

enum Operand<'a> {
    Number(f64),
    Text(&'a str),
}

/// Parse and evaluate `source`.
///
/// Name resolution happens before any arithmetic: the first name missing
/// from `vars` is reported as [`EvalError::UnknownVariable`]; otherwise all
/// unresolved input parameters are reported together.
pub fn evaluate(source: &str, vars: &Variables) -> Result<EvalValue, EvalError> {
    let formula = parse(source)?;
    resolve_names(&formula, vars)?;

    let lhs = eval_expr(&formula.lhs, vars)?;
    match &formula.comparison {
        None => match lhs {
            Operand::Number(n) => Ok(EvalValue::Number(n)),
            Operand::Text(_) => Err(EvalError::TypeMismatch(
                "a formula without comparison must be numeric".to_string(),
            )),
        },
        Some((op, rhs)) => {
            let rhs = eval_expr(rhs, vars)?;
            compare(*op, lhs, rhs).map(EvalValue::Bool)
        }
    }
}

fn resolve_names(formula: &Formula, vars: &Variables) -> Result<(), EvalError> {
    let mut unresolved: Vec<String> = Vec::new();
    for name in formula.names() {
        match vars.get(name) {
            None => return Err(EvalError::UnknownVariable(name.to_string())),
            Some(Variable::Unresolved { .. }) => {
                if !unresolved.iter().any(|u| u == name) {
                    unresolved.push(name.to_string());
                }
            }
            Some(_) => {}
        }
    }
    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(EvalError::UnresolvedInput(unresolved))
    }
}

fn eval_expr<'a>(expr: &Expr, vars: &'a Variables) -> Result<Operand<'a>, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Operand::Number(*n)),
        Expr::Variable(name) => match vars.get(name) {
            Some(Variable::Number(n)) => Ok(Operand::Number(*n)),
            Some(Variable::Text(s)) => Ok(Operand::Text(s)),
            Some(Variable::Unresolved { .. }) => {
                Err(EvalError::UnresolvedInput(vec![name.clone()]))
            }
            None => Err(EvalError::UnknownVariable(name.clone())),
        },
        Expr::Neg(inner) => {
            let value = numeric(eval_expr(inner, vars)?, "negation")?;
            Ok(Operand::Number(-value))
        }
        Expr::Binary { op, lhs, rhs } => {
            let context = match op {
                ArithOp::Add => "addition",
                ArithOp::Sub => "subtraction",
                ArithOp::Mul => "multiplication",
                ArithOp::Div => "division",
            };
            let a = numeric(eval_expr(lhs, vars)?, context)?;
            let b = numeric(eval_expr(rhs, vars)?, context)?;
            let result = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => {
                    if b == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a / b
                }
            };
            if !result.is_finite() {
                return Err(EvalError::NonFinite);
            }
            Ok(Operand::Number(result))
        }
    }
}

fn numeric(operand: Operand<'_>, context: &str) -> Result<f64, EvalError> {
    match operand {
        Operand::Number(n) => Ok(n),
        Operand::Text(s) => Err(EvalError::TypeMismatch(format!(
            "text value '{s}' used in {context}"
        ))),
    }
}

fn compare(op: CmpOp, lhs: Operand<'_>, rhs: Operand<'_>) -> Result<bool, EvalError> {
    match (lhs, rhs) {
        (Operand::Number(a), Operand::Number(b)) => Ok(match op {
            CmpOp::Gt => a > b,
            CmpOp::Lt => a < b,
            CmpOp::Ge => a >= b,
            CmpOp::Le => a <= b,
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
        }),
        (Operand::Text(a), Operand::Text(b)) => match op {
            CmpOp::Eq => Ok(a == b),
            CmpOp::Ne => Ok(a != b),
            _ => Err(EvalError::TypeMismatch(format!(
                "text values can only be compared with == or !=, not {op}"
            ))),
        },
        _ => Err(EvalError::TypeMismatch(
            "cannot compare a number with text".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, f64)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Variable::Number(*v)))
            .collect()
    }

    // =========================================================================
    // Comparisons
    // =========================================================================

    #[test]
    fn payload_within_limit() {
        let result = evaluate("payload_mass <= 50", &vars(&[("payload_mass", 40.0)]));
        assert_eq!(result, Ok(EvalValue::Bool(true)));
    }

    #[test]
    fn payload_over_limit() {
        let result = evaluate("payload_mass <= 50", &vars(&[("payload_mass", 60.0)]));
        assert_eq!(result, Ok(EvalValue::Bool(false)));
    }

    #[test]
    fn payload_absent_is_error_not_panic() {
        let result = evaluate("payload_mass <= 50", &Variables::new());
        assert_eq!(
            result,
            Err(EvalError::UnknownVariable("payload_mass".to_string()))
        );
    }

    #[test]
    fn force_margin_arithmetic() {
        let v = vars(&[
            ("nominal_force", 5000.0),
            ("payload_mass", 50.0),
            ("required_acceleration", 10.0),
        ]);
        // 4500 > 4905
        let result = evaluate(
            "nominal_force * 0.9 > payload_mass * required_acceleration * 9.81",
            &v,
        );
        assert_eq!(result, Ok(EvalValue::Bool(false)));

        let lighter = vars(&[
            ("nominal_force", 5000.0),
            ("payload_mass", 40.0),
            ("required_acceleration", 10.0),
        ]);
        // 4500 > 3924
        let result = evaluate(
            "nominal_force * 0.9 > payload_mass * required_acceleration * 9.81",
            &lighter,
        );
        assert_eq!(result, Ok(EvalValue::Bool(true)));
    }

    #[test]
    fn all_operators() {
        let v = vars(&[("a", 2.0), ("b", 3.0)]);
        let cases = [
            ("a > b", false),
            ("a < b", true),
            ("a >= 2", true),
            ("a <= 1", false),
            ("a == 2", true),
            ("a != b", true),
        ];
        for (formula, expected) in cases {
            assert_eq!(
                evaluate(formula, &v),
                Ok(EvalValue::Bool(expected)),
                "{formula}"
            );
        }
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    #[test]
    fn arithmetic_only_returns_number() {
        let v = vars(&[("k", 1000.0), ("d", 25.0), ("t", 5.0)]);
        let result = evaluate("k / 2 * (d - t) / 10", &v);
        assert_eq!(result, Ok(EvalValue::Number(1000.0)));
    }

    #[test]
    fn unary_minus_and_plus() {
        let v = vars(&[("a", 4.0)]);
        assert_eq!(evaluate("-a + +2", &v), Ok(EvalValue::Number(-2.0)));
        assert_eq!(evaluate("--a", &v), Ok(EvalValue::Number(4.0)));
    }

    #[test]
    fn division_by_zero_is_error() {
        let v = vars(&[("a", 1.0), ("z", 0.0)]);
        assert_eq!(evaluate("a / z > 1", &v), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn overflow_is_non_finite() {
        let v = vars(&[("big", f64::MAX)]);
        assert_eq!(evaluate("big * 10", &v), Err(EvalError::NonFinite));
    }

    // =========================================================================
    // Unresolved inputs and text values
    // =========================================================================

    #[test]
    fn unresolved_inputs_reported_together() {
        let mut v = vars(&[("nominal_force", 5000.0)]);
        for name in ["payload_mass", "required_acceleration"] {
            v.insert(
                name.to_string(),
                Variable::Unresolved {
                    declared_type: "float".to_string(),
                },
            );
        }
        let result = evaluate(
            "nominal_force > payload_mass * required_acceleration * payload_mass",
            &v,
        );
        assert_eq!(
            result,
            Err(EvalError::UnresolvedInput(vec![
                "payload_mass".to_string(),
                "required_acceleration".to_string()
            ]))
        );
    }

    #[test]
    fn unknown_takes_precedence_over_unresolved() {
        let mut v = Variables::new();
        v.insert(
            "payload_mass".to_string(),
            Variable::Unresolved {
                declared_type: "float".to_string(),
            },
        );
        let result = evaluate("payload_mass < typo_name", &v);
        assert_eq!(result, Err(EvalError::UnknownVariable("typo_name".to_string())));
    }

    #[test]
    fn text_equality() {
        let mut v = Variables::new();
        v.insert("cooling".to_string(), Variable::Text("air".to_string()));
        v.insert("expected".to_string(), Variable::Text("air".to_string()));
        assert_eq!(evaluate("cooling == expected", &v), Ok(EvalValue::Bool(true)));
        assert_eq!(evaluate("cooling != expected", &v), Ok(EvalValue::Bool(false)));
        assert!(matches!(
            evaluate("cooling > expected", &v),
            Err(EvalError::TypeMismatch(_))
        ));
    }

    #[test]
    fn text_in_arithmetic_is_type_mismatch() {
        let mut v = Variables::new();
        v.insert("cooling".to_string(), Variable::Text("air".to_string()));
        assert!(matches!(
            evaluate("cooling * 2 > 1", &v),
            Err(EvalError::TypeMismatch(_))
        ));
        assert!(matches!(
            evaluate("cooling", &v),
            Err(EvalError::TypeMismatch(_))
        ));
    }

    #[test]
    fn syntax_outside_grammar_is_error() {
        let v = vars(&[("a", 1.0)]);
        for formula in ["a; a", "a ** 2", "exec(a)", "a > 1 > 0", "a and a"] {
            assert!(
                matches!(evaluate(formula, &v), Err(EvalError::Syntax { .. })),
                "{formula}"
            );
        }
    }

    #[test]
    fn deeply_nested_formula_is_error_not_crash() {
        let v = vars(&[("a", 1.0)]);
        let deep = format!("{}a{} > 0", "(".repeat(50_000), ")".repeat(50_000));
        assert!(matches!(evaluate(&deep, &v), Err(EvalError::Syntax { .. })));
    }
}
