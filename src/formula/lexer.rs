//! Formula tokenizer.
//!
//! Produces a flat token list terminated by [`TokenKind::Eof`]. Each token
//! carries the byte offset it started at, for error messages.

use super::EvalError;
use super::parser::CmpOp;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Cmp(CmpOp),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Name(name) => f.write_str(name),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Cmp(op) => write!(f, "{op}"),
            TokenKind::Eof => f.write_str("end of formula"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub pos: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Token, EvalError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(pos, c)) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: self.input.len(),
            });
        };

        let kind = match c {
            '0'..='9' | '.' => return self.read_number(pos),
            c if c.is_ascii_alphabetic() || c == '_' => return Ok(self.read_name(pos)),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '>' | '<' | '=' | '!' => return self.read_comparison(pos, c),
            other => {
                return Err(EvalError::syntax(
                    pos,
                    format!("unexpected character '{other}'"),
                ));
            }
        };
        self.chars.next();
        Ok(Token { kind, pos })
    }

    fn read_number(&mut self, start: usize) -> Result<Token, EvalError> {
        let mut end = start;
        let mut seen_dot = false;
        let mut seen_digit = false;

        while let Some(&(i, c)) = self.chars.peek() {
            match c {
                '0'..='9' => seen_digit = true,
                '.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            end = i + c.len_utf8();
            self.chars.next();
        }

        // Exponent: e, E followed by optional sign and at least one digit.
        if seen_digit {
            if let Some(&(i, 'e' | 'E')) = self.chars.peek() {
                let rest = &self.input[i + 1..];
                let sign_len = usize::from(rest.starts_with(['+', '-']));
                let digits = rest[sign_len..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .count();
                if digits > 0 {
                    let exp_len = 1 + sign_len + digits;
                    for _ in 0..exp_len {
                        self.chars.next();
                    }
                    end = i + exp_len;
                }
            }
        }

        let text = &self.input[start..end];
        if !seen_digit {
            return Err(EvalError::syntax(start, format!("invalid number '{text}'")));
        }
        let value = text
            .parse::<f64>()
            .map_err(|_| EvalError::syntax(start, format!("invalid number '{text}'")))?;
        Ok(Token {
            kind: TokenKind::Number(value),
            pos: start,
        })
    }

    fn read_name(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Name(self.input[start..end].to_string()),
            pos: start,
        }
    }

    fn read_comparison(&mut self, start: usize, first: char) -> Result<Token, EvalError> {
        self.chars.next();
        let followed_by_eq = self.chars.next_if(|(_, c)| *c == '=').is_some();
        let op = match (first, followed_by_eq) {
            ('>', false) => CmpOp::Gt,
            ('>', true) => CmpOp::Ge,
            ('<', false) => CmpOp::Lt,
            ('<', true) => CmpOp::Le,
            ('=', true) => CmpOp::Eq,
            ('!', true) => CmpOp::Ne,
            ('=', false) => {
                return Err(EvalError::syntax(start, "assignment is not allowed, use '=='"));
            }
            _ => return Err(EvalError::syntax(start, "unexpected character '!'")),
        };
        Ok(Token {
            kind: TokenKind::Cmp(op),
            pos: start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn arithmetic_and_comparison() {
        assert_eq!(
            kinds("a * 0.9 >= (b - 2)"),
            vec![
                TokenKind::Name("a".into()),
                TokenKind::Star,
                TokenKind::Number(0.9),
                TokenKind::Cmp(CmpOp::Ge),
                TokenKind::LParen,
                TokenKind::Name("b".into()),
                TokenKind::Minus,
                TokenKind::Number(2.0),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn all_comparison_operators() {
        let ops: Vec<TokenKind> = kinds("> < >= <= == !=")
            .into_iter()
            .filter(|k| *k != TokenKind::Eof)
            .collect();
        assert_eq!(
            ops,
            vec![
                TokenKind::Cmp(CmpOp::Gt),
                TokenKind::Cmp(CmpOp::Lt),
                TokenKind::Cmp(CmpOp::Ge),
                TokenKind::Cmp(CmpOp::Le),
                TokenKind::Cmp(CmpOp::Eq),
                TokenKind::Cmp(CmpOp::Ne),
            ]
        );
    }

    #[test]
    fn numbers_with_exponent_and_leading_dot() {
        assert_eq!(kinds("1e3")[0], TokenKind::Number(1000.0));
        assert_eq!(kinds("2.5E-2")[0], TokenKind::Number(0.025));
        assert_eq!(kinds(".5")[0], TokenKind::Number(0.5));
    }

    #[test]
    fn name_followed_by_e_is_not_exponent() {
        assert_eq!(
            kinds("2 * e"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Name("e".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn dotted_names() {
        assert_eq!(kinds("coil.resistance")[0], TokenKind::Name("coil.resistance".into()));
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = tokenize("ab + 1").unwrap();
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].pos, 3);
        assert_eq!(tokens[2].pos, 5);
        assert_eq!(tokens[3].pos, 6);
    }

    #[test]
    fn rejects_foreign_characters() {
        for input in ["a; b", "\"x\"", "a && b", "a % 2", "__import__('os')"] {
            assert!(
                matches!(tokenize(input), Err(EvalError::Syntax { .. })),
                "expected syntax error for {input:?}"
            );
        }
    }

    #[test]
    fn single_equals_rejected() {
        let err = tokenize("a = 1").unwrap_err();
        assert!(matches!(err, EvalError::Syntax { position: 2, .. }));
    }

    #[test]
    fn lone_dot_rejected() {
        assert!(matches!(tokenize("."), Err(EvalError::Syntax { .. })));
    }
}
