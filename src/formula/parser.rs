//! Recursive-descent parser for check formulas.

use super::EvalError;
use super::lexer::{Token, TokenKind, tokenize};
use std::fmt;

/// Deepest expression tree a formula may build. Parentheses, unary signs
/// and each operator in a `+`/`*` chain all count toward it, so parsing,
/// evaluating and dropping an [`Expr`] stay within a bounded recursion.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Binary {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Variable names in left-to-right order, duplicates included.
    pub fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => out.push(name),
            Expr::Neg(inner) => inner.collect_names(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_names(out);
                rhs.collect_names(out);
            }
        }
    }
}

/// A parsed formula: an arithmetic expression with an optional comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub lhs: Expr,
    pub comparison: Option<(CmpOp, Expr)>,
    /// Byte offset of the comparison operator in the source text.
    cmp_pos: Option<usize>,
}

impl Formula {
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.lhs.collect_names(&mut names);
        if let Some((_, rhs)) = &self.comparison {
            rhs.collect_names(&mut names);
        }
        names
    }
}

/// Display split of a formula around its comparison operator.
///
/// `"a * 2 > b"` → left `a * 2`, operator `>`, right `b`. Formulas that do
/// not parse keep the whole text on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaParts {
    pub left: String,
    pub operator: Option<CmpOp>,
    pub right: Option<String>,
}

pub fn split_formula(source: &str) -> FormulaParts {
    match parse(source) {
        Ok(Formula {
            comparison: Some((op, _)),
            cmp_pos: Some(pos),
            ..
        }) => FormulaParts {
            left: source[..pos].trim().to_string(),
            operator: Some(op),
            right: Some(source[pos + op.symbol().len()..].trim().to_string()),
        },
        _ => FormulaParts {
            left: source.trim().to_string(),
            operator: None,
            right: None,
        },
    }
}

pub fn parse(source: &str) -> Result<Formula, EvalError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };

    let lhs = parser.arith()?;
    let mut comparison = None;
    let mut cmp_pos = None;
    if let TokenKind::Cmp(op) = parser.peek().kind {
        cmp_pos = Some(parser.peek().pos);
        parser.advance();
        comparison = Some((op, parser.arith()?));
    }

    let next = parser.peek();
    match &next.kind {
        TokenKind::Eof => Ok(Formula {
            lhs,
            comparison,
            cmp_pos,
        }),
        TokenKind::Cmp(_) => Err(EvalError::syntax(
            next.pos,
            "only one comparison is allowed",
        )),
        other => Err(EvalError::syntax(
            next.pos,
            format!("unexpected '{other}'"),
        )),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always terminates with Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    /// One level deeper into the tree. Callers restore `depth` on success;
    /// an error abandons the whole parse.
    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::syntax(
                self.peek().pos,
                format!("formula nests deeper than {MAX_DEPTH} levels"),
            ));
        }
        Ok(())
    }

    fn arith(&mut self) -> Result<Expr, EvalError> {
        let start = self.depth;
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => {
                    self.depth = start;
                    return Ok(expr);
                }
            };
            self.descend()?;
            self.advance();
            let rhs = self.term()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let start = self.depth;
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => {
                    self.depth = start;
                    return Ok(expr);
                }
            };
            self.descend()?;
            self.advance();
            let rhs = self.unary()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        match self.peek().kind {
            TokenKind::Minus => {
                self.descend()?;
                self.advance();
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            TokenKind::Plus => {
                self.descend()?;
                self.advance();
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::Name(name) => {
                self.advance();
                if self.peek().kind == TokenKind::LParen {
                    return Err(EvalError::syntax(
                        token.pos,
                        format!("function calls are not allowed ('{name}')"),
                    ));
                }
                Ok(Expr::Variable(name))
            }
            TokenKind::LParen => {
                self.descend()?;
                self.advance();
                let inner = self.arith()?;
                self.depth -= 1;
                let close = self.peek();
                if close.kind != TokenKind::RParen {
                    return Err(EvalError::syntax(
                        close.pos,
                        format!("expected ')' but found '{}'", close.kind),
                    ));
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Eof => Err(EvalError::syntax(token.pos, "unexpected end of formula")),
            other => Err(EvalError::syntax(
                token.pos,
                format!("unexpected '{other}'"),
            )),
        }
    }
}
