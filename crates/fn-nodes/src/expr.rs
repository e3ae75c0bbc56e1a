//! Sandboxed arithmetic expressions for sensor nodes.
//!
//! The language is deliberately tiny:
//! - numeric literals (`3`, `0.5`, `1e-3`)
//! - the two bindings `temp` and `flowSpeed`
//! - `+ - * /`, unary `-`/`+`, parentheses
//! - comparisons `< <= > >= == !=`, which yield `1` or `0`
//!
//! There are no function calls, attribute lookups or other names, so an
//! expression can only ever compute a number from the two bindings.

use std::fmt;

use thiserror::Error;

/// Maximum nesting depth accepted by the parser.
pub const MAX_DEPTH: usize = 64;

/// Maximum source length accepted by the parser.
pub const MAX_LEN: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("expression longer than {} characters", MAX_LEN)]
    TooLong,

    #[error("expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error("unexpected character {ch:?} at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number {text:?} at {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("unbound name {name:?} at {pos} (only temp and flowSpeed are available)")]
    UnboundName { name: String, pos: usize },

    #[error("expression evaluated to non-finite value {value}")]
    NonFinite { value: f64 },
}

/// Named inputs an expression may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Temp,
    FlowSpeed,
}

impl Binding {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "temp" => Some(Binding::Temp),
            "flowSpeed" => Some(Binding::FlowSpeed),
            _ => None,
        }
    }
}

/// Values for the two bindings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bindings {
    pub temp: f64,
    pub flow_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        let truth = |c: bool| if c { 1.0 } else { 0.0 };
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Lt => truth(a < b),
            BinaryOp::Le => truth(a <= b),
            BinaryOp::Gt => truth(a > b),
            BinaryOp::Ge => truth(a >= b),
            BinaryOp::Eq => truth(a == b),
            BinaryOp::Ne => truth(a != b),
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(Binding),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn eval(&self, env: &Bindings) -> f64 {
        match self {
            Expr::Number(v) => *v,
            Expr::Var(Binding::Temp) => env.temp,
            Expr::Var(Binding::FlowSpeed) => env.flow_speed,
            Expr::Neg(inner) => -inner.eval(env),
            Expr::Binary { op, lhs, rhs } => op.apply(lhs.eval(env), rhs.eval(env)),
        }
    }
}

/// A compiled expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        if source.len() > MAX_LEN {
            return Err(ExprError::TooLong);
        }
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.comparison()?;
        if let Some(tok) = parser.peek() {
            return Err(ExprError::UnexpectedToken {
                found: tok.kind.to_string(),
                pos: tok.pos,
            });
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluate against the bindings; a non-finite result is an error.
    pub fn eval(&self, env: &Bindings) -> Result<f64, ExprError> {
        let value = self.root.eval(env);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExprError::NonFinite { value })
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(v) => write!(f, "number {v}"),
            TokenKind::Ident(name) => write!(f, "name {name:?}"),
            TokenKind::Op(op) => write!(f, "operator {op:?}"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, ch) = chars[i];
        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let start = i;
            while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                i += 1;
            }
            // Exponent: e / E, optional sign, digits
            if i < chars.len() && matches!(chars[i].1, 'e' | 'E') {
                let mut j = i + 1;
                if j < chars.len() && matches!(chars[j].1, '+' | '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].1.is_ascii_digit() {
                    while j < chars.len() && chars[j].1.is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let end = chars.get(i).map_or(src.len(), |(p, _)| *p);
            let text = &src[chars[start].0..end];
            let value: f64 = text.parse().map_err(|_| ExprError::InvalidNumber {
                text: text.to_string(),
                pos,
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                pos,
            });
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = i;
            while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || chars[i].1 == '_') {
                i += 1;
            }
            let end = chars.get(i).map_or(src.len(), |(p, _)| *p);
            tokens.push(Token {
                kind: TokenKind::Ident(src[chars[start].0..end].to_string()),
                pos,
            });
            continue;
        }

        let next = chars.get(i + 1).map(|(_, c)| *c);
        let (kind, width) = match (ch, next) {
            ('<', Some('=')) => (TokenKind::Op(BinaryOp::Le), 2),
            ('>', Some('=')) => (TokenKind::Op(BinaryOp::Ge), 2),
            ('=', Some('=')) => (TokenKind::Op(BinaryOp::Eq), 2),
            ('!', Some('=')) => (TokenKind::Op(BinaryOp::Ne), 2),
            ('<', _) => (TokenKind::Op(BinaryOp::Lt), 1),
            ('>', _) => (TokenKind::Op(BinaryOp::Gt), 1),
            ('+', _) => (TokenKind::Op(BinaryOp::Add), 1),
            ('-', _) => (TokenKind::Op(BinaryOp::Sub), 1),
            ('*', _) => (TokenKind::Op(BinaryOp::Mul), 1),
            ('/', _) => (TokenKind::Op(BinaryOp::Div), 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            _ => return Err(ExprError::UnexpectedChar { ch, pos }),
        };
        tokens.push(Token { kind, pos });
        i += width;
    }

    Ok(tokens)
}

/// Recursive-descent parser, lowest precedence first:
/// comparison -> additive -> term -> unary -> primary.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.additive()?;
        while let Some(
            op @ (BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne),
        ) = self.peek_op()
        {
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        while let Some(op @ (BinaryOp::Add | BinaryOp::Sub)) = self.peek_op() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        while let Some(op @ (BinaryOp::Mul | BinaryOp::Div)) = self.peek_op() {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek_op() {
            Some(BinaryOp::Sub) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(BinaryOp::Add) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let tok = self.next().cloned().ok_or(ExprError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Number(v) => Ok(Expr::Number(v)),
            TokenKind::Ident(name) => Binding::from_name(&name)
                .map(Expr::Var)
                .ok_or(ExprError::UnboundName { name, pos: tok.pos }),
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.comparison()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ExprError::UnexpectedToken {
                        found: other.kind.to_string(),
                        pos: other.pos,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            other => Err(ExprError::UnexpectedToken {
                found: other.to_string(),
                pos: tok.pos,
            }),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, temp: f64, flow_speed: f64) -> Result<f64, ExprError> {
        Expression::parse(src)?.eval(&Bindings { temp, flow_speed })
    }

    #[test]
    fn precedence_and_parens() {
        assert_eq!(eval("1 + 2 * 3", 0.0, 0.0).unwrap(), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0, 0.0).unwrap(), 9.0);
        assert_eq!(eval("-2 * -3", 0.0, 0.0).unwrap(), 6.0);
        assert_eq!(eval("10 / 4 - 1", 0.0, 0.0).unwrap(), 1.5);
    }

    #[test]
    fn bindings_resolve() {
        assert_eq!(eval("temp / 100", 50.0, 2.0).unwrap(), 0.5);
        assert_eq!(eval("temp * flowSpeed", 3.0, 2.0).unwrap(), 6.0);
    }

    #[test]
    fn comparisons_yield_truth_values() {
        assert_eq!(eval("temp > 60", 70.0, 0.0).unwrap(), 1.0);
        assert_eq!(eval("temp > 60", 50.0, 0.0).unwrap(), 0.0);
        assert_eq!(eval("temp <= 60 == 1", 60.0, 0.0).unwrap(), 1.0);
        assert_eq!(eval("flowSpeed != 0", 0.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn scientific_literals() {
        assert_eq!(eval("1e2 + 2.5E-1", 0.0, 0.0).unwrap(), 100.25);
    }

    #[test]
    fn unbound_names_rejected() {
        assert!(matches!(
            Expression::parse("__import__"),
            Err(ExprError::UnboundName { .. })
        ));
        assert!(matches!(
            Expression::parse("temp + pressure"),
            Err(ExprError::UnboundName { pos: 7, .. })
        ));
    }

    #[test]
    fn calls_and_attributes_rejected() {
        assert!(matches!(
            Expression::parse("temp.real"),
            Err(ExprError::InvalidNumber { .. }) | Err(ExprError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Expression::parse("temp(1)"),
            Err(ExprError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Expression::parse("open[0]"),
            Err(ExprError::UnexpectedChar { ch: '[', .. })
        ));
    }

    #[test]
    fn malformed_rejected() {
        assert_eq!(Expression::parse("   "), Err(ExprError::Empty));
        assert_eq!(Expression::parse("1 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(Expression::parse("(1 + 2"), Err(ExprError::UnexpectedEnd));
        assert!(matches!(
            Expression::parse("1 2"),
            Err(ExprError::UnexpectedToken { pos: 2, .. })
        ));
        assert!(matches!(
            Expression::parse("1..2"),
            Err(ExprError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(Expression::parse(&deep), Err(ExprError::TooDeep));
        let negs = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(Expression::parse(&negs), Err(ExprError::TooDeep));
    }

    #[test]
    fn division_by_zero_is_non_finite() {
        assert!(matches!(
            eval("temp / flowSpeed", 1.0, 0.0),
            Err(ExprError::NonFinite { .. })
        ));
    }

    #[test]
    fn source_is_preserved() {
        let expr = Expression::parse("temp / 100").unwrap();
        assert_eq!(expr.source(), "temp / 100");
        assert_eq!(expr.to_string(), "temp / 100");
    }
}
