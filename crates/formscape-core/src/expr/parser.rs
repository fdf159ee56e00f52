//! Recursive-descent parser and tree-walk evaluator
//!
//! Precedence, loosest first:
//!
//! | level  | operators        | associativity |
//! |--------|------------------|---------------|
//! | sum    | `+` `-`          | left          |
//! | term   | `*` `/`          | left          |
//! | unary  | prefix `+` `-`   | right         |
//! | power  | `^`              | right         |
//!
//! so `-2^2` is `-(2^2)` and `2^3^2` is `2^(3^2)`.
//!
//! Left-associative runs such as `a + b - c` are stored flat in a
//! [`Node::Chain`], so tree depth grows only with nesting, which
//! [`MAX_DEPTH`] bounds. Long flat formulas therefore evaluate without deep
//! recursion.

use super::Scope;
use super::lexer::{Function, Token};
use crate::{Error, Result};

/// Maximum nesting of sub-expressions
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Pow => lhs.powf(rhs),
        }
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Variable(String),
    Negate(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    /// `first op1 n1 op2 n2 ...`, folded left to right
    Chain(Box<Node>, Vec<(BinaryOp, Node)>),
    Call(Function, Vec<Node>),
}

impl Node {
    /// Walk the tree against `scope`
    ///
    /// Fails on undefined variables and arity mismatches; non-finite
    /// intermediate values propagate as IEEE results.
    pub fn eval<S: Scope + ?Sized>(&self, scope: &S) -> Result<f64> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Variable(name) => scope
                .lookup(name)
                .ok_or_else(|| Error::evaluation(format!("{name} is not defined"))),
            Self::Negate(inner) => Ok(-inner.eval(scope)?),
            Self::Binary(op, lhs, rhs) => Ok(op.apply(lhs.eval(scope)?, rhs.eval(scope)?)),
            Self::Chain(first, rest) => {
                let mut acc = first.eval(scope)?;
                for (op, node) in rest {
                    acc = op.apply(acc, node.eval(scope)?);
                }
                Ok(acc)
            }
            Self::Call(func, args) => {
                let values = args
                    .iter()
                    .map(|a| a.eval(scope))
                    .collect::<Result<Vec<_>>>()?;
                func.apply(&values).ok_or_else(|| {
                    Error::evaluation(format!(
                        "{func} expects {}, got {}",
                        func.arity(),
                        values.len()
                    ))
                })
            }
        }
    }
}

fn chain(first: Node, rest: Vec<(BinaryOp, Node)>) -> Node {
    if rest.is_empty() {
        first
    } else {
        Node::Chain(Box::new(first), rest)
    }
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    depth: usize,
}

/// Parse a token stream into a single expression tree
pub fn parse(tokens: &[Token<'_>]) -> Result<Node> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.sum()?;
    match parser.peek() {
        None => Ok(node),
        Some(t) => Err(Error::syntax(format!("unexpected {t:?}"))),
    }
}

impl<'a> Parser<'_, 'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat_operator(&mut self, ops: &[char]) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token::Operator(c)) if ops.contains(&c) => {
                self.pos += 1;
                BinaryOp::from_char(c)
            }
            _ => None,
        }
    }

    fn expect(&mut self, want: Token<'a>) -> Result<()> {
        match self.next() {
            Some(t) if t == want => Ok(()),
            Some(t) => Err(Error::syntax(format!("expected {want:?}, found {t:?}"))),
            None => Err(Error::syntax(format!("expected {want:?}, found end of input"))),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::syntax("expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn sum(&mut self) -> Result<Node> {
        self.enter()?;
        let first = self.term()?;
        let mut rest = Vec::new();
        while let Some(op) = self.eat_operator(&['+', '-']) {
            rest.push((op, self.term()?));
        }
        self.leave();
        Ok(chain(first, rest))
    }

    fn term(&mut self) -> Result<Node> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        while let Some(op) = self.eat_operator(&['*', '/']) {
            rest.push((op, self.unary()?));
        }
        Ok(chain(first, rest))
    }

    fn unary(&mut self) -> Result<Node> {
        match self.eat_operator(&['+', '-']) {
            Some(op) => {
                self.enter()?;
                let inner = self.unary()?;
                self.leave();
                Ok(match op {
                    BinaryOp::Sub => Node::Negate(Box::new(inner)),
                    _ => inner,
                })
            }
            None => self.power(),
        }
    }

    fn power(&mut self) -> Result<Node> {
        let base = self.primary()?;
        if self.eat_operator(&['^']).is_some() {
            self.enter()?;
            let exponent = self.unary()?;
            self.leave();
            return Ok(Node::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Node::Number(v)),
            Some(Token::Variable(name)) => {
                let identifier = name.starts_with(|c: char| c.is_alphabetic() || c == '_')
                    && name.chars().all(|c| c.is_alphanumeric() || c == '_');
                if identifier {
                    Ok(Node::Variable(name.to_string()))
                } else {
                    Err(Error::syntax(format!("invalid identifier '{name}'")))
                }
            }
            Some(Token::Function(func)) => {
                self.expect(Token::LParen)?;
                let mut args = Vec::new();
                if self.peek() == Some(Token::RParen) {
                    self.pos += 1;
                    return Ok(Node::Call(func, args));
                }
                loop {
                    args.push(self.sum()?);
                    match self.next() {
                        Some(Token::Comma) => {}
                        Some(Token::RParen) => break,
                        Some(t) => return Err(Error::syntax(format!("unexpected {t:?} in call"))),
                        None => return Err(Error::syntax("unclosed call")),
                    }
                }
                Ok(Node::Call(func, args))
            }
            Some(Token::LParen) => {
                let inner = self.sum()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::UnknownFunction(name)) => {
                Err(Error::syntax(format!("unknown function '{name}'")))
            }
            Some(t) => Err(Error::syntax(format!("unexpected {t:?}"))),
            None => Err(Error::syntax("unexpected end of input")),
        }
    }
}
