//! User formula language
//!
//! Formulas are spreadsheet-style strings: a leading `=` followed by
//! arithmetic over numbers, variables and a fixed set of math functions.
//!
//! ```
//! use formscape_core::expr;
//! use formscape_core::params::Params;
//!
//! assert!(expr::validate("=sin(phi) * a"));
//! assert_eq!(expr::extract_variables("=x+y*x"), vec!["x", "y"]);
//!
//! let vars = Params::from([("x", 0.0), ("y", 0.0)]);
//! assert_eq!(expr::evaluate("=sin(x)+cos(y)", &vars).ok(), Some(1.0));
//! ```

pub mod lexer;
pub mod parser;

pub use lexer::Function;
pub use parser::{MAX_DEPTH, Node};

use crate::params::{Bindings, Params};
use crate::{Error, Result};
use lexer::Token;
use std::collections::{BTreeMap, HashMap};

/// Something variables can be looked up in
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl Scope for Params {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name)
    }
}

impl Scope for Bindings<'_> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name)
    }
}

impl Scope for HashMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Scope for BTreeMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Text after the `=` prefix, if present
fn body(formula: &str) -> Option<&str> {
    formula.trim().strip_prefix('=')
}

/// Check the formula grammar
///
/// True when the text starts with `=`, every called function is whitelisted
/// and parentheses balance. Operand placement and arity are not checked here.
pub fn validate(formula: &str) -> bool {
    let Some(body) = body(formula) else {
        return false;
    };

    let mut balance: i64 = 0;
    for token in lexer::tokenize(body) {
        match token {
            Token::UnknownFunction(_) => return false,
            Token::LParen => balance += 1,
            Token::RParen => {
                balance -= 1;
                if balance < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    balance == 0
}

/// Variable names in first-occurrence order, without duplicates
///
/// Returns an empty list when the `=` prefix is missing.
pub fn extract_variables(formula: &str) -> Vec<String> {
    let Some(body) = body(formula) else {
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::new();
    for token in lexer::tokenize(body) {
        if let Token::Variable(name) = token {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Parse and evaluate `formula` once against `variables`
pub fn evaluate<S: Scope + ?Sized>(formula: &str, variables: &S) -> Result<f64> {
    Expression::parse(formula)?.evaluate(variables)
}

/// A formula compiled to an expression tree
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
    variables: Vec<String>,
}

impl Expression {
    pub fn parse(formula: &str) -> Result<Self> {
        let body =
            body(formula).ok_or_else(|| Error::InvalidFormula("Formula must start with =".into()))?;
        let tokens = lexer::tokenize(body);
        let root = parser::parse(&tokens)?;

        Ok(Self {
            source: formula.to_string(),
            root,
            variables: extract_variables(formula),
        })
    }

    /// Evaluate, rejecting non-finite results
    pub fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> Result<f64> {
        let value = self.root.eval(scope)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::evaluation(format!("result is not finite ({value})")))
        }
    }

    /// Evaluate, letting NaN and infinities through
    ///
    /// Used by the mesh samplers, which count and replace bad samples instead
    /// of aborting the whole lattice.
    pub fn evaluate_raw<S: Scope + ?Sized>(&self, scope: &S) -> Result<f64> {
        self.root.eval(scope)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Variables referenced by the formula, first-occurrence order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}
