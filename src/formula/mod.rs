//! Check formula evaluation.
//!
//! Formulas in `[additional_checks]` are evaluated with a small, whitelisted
//! recursive-descent evaluator. Nothing here can reach a general-purpose code
//! evaluator: the token set is fixed and anything outside it is a syntax error.
//!
//! ```text
//! formula := arith ( cmp_op arith )? EOF
//! arith   := term ( ('+' | '-') term )*
//! term    := unary ( ('*' | '/') unary )*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | NAME | '(' arith ')'
//! cmp_op  := '>' | '<' | '>=' | '<=' | '==' | '!='
//! ```
//!
//! A formula with a comparison yields a boolean; one without yields a number.
//! Only a single top-level comparison is accepted.
//!
//! | Module | Role |
//! |--------|------|
//! | [`lexer`] | Source text → tokens with byte positions |
//! | [`parser`] | Tokens → [`parser::Formula`] AST |
//! | [`eval`] | AST + [`Variables`] → [`EvalValue`] |

pub mod eval;
pub mod lexer;
pub mod parser;

pub use eval::{EvalValue, Variable, Variables, evaluate};
pub use parser::{CmpOp, FormulaParts, split_formula};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("needs input: {}", .0.join(", "))]
    UnresolvedInput(Vec<String>),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
}

impl EvalError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        EvalError::Syntax {
            position,
            message: message.into(),
        }
    }
}
