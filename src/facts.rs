//! Typed fact and query builder for the rule language.
//!
//! Request values reach the symbolic language only through [`Term`]; the
//! `Display` impls here are the single place where language text is
//! produced. String arguments are escaped on render, so a fact built from
//! arbitrary user input always parses back to the same value under the
//! engine's grammar.

use std::fmt;

/// One argument position in a fact or query pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Bare symbol, e.g. a property id used as an atom.
    Sym(String),
    /// Quoted string; escaped when rendered.
    Str(String),
    Int(i64),
    Float(f64),
    /// Unbound query variable, rendered `$name`.
    Var(&'static str),
}

impl Term {
    pub fn sym(value: impl Into<String>) -> Self {
        Term::Sym(value.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Term::Str(value.into())
    }

    /// Whether `value` is safe to embed as a bare symbol. Symbols are not
    /// quoted, so anything that could terminate or extend an expression
    /// (whitespace, parens, quotes, `$`, `;`) is rejected at input
    /// validation instead of escaped here.
    pub fn is_safe_symbol(value: &str) -> bool {
        !value.is_empty()
            && value.chars().all(|c| {
                !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | '\\' | '$' | ';')
            })
    }
}

/// Escape a string for inclusion inside a quoted fact argument.
///
/// Backslashes are escaped before quotes; doing it in one pass per
/// character is equivalent and avoids double-escaping the inserted
/// backslashes.
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Sym(s) => write!(f, "{s}"),
            Term::Str(s) => write!(f, "\"{}\"", sanitize(s)),
            Term::Int(n) => write!(f, "{n}"),
            Term::Float(n) => write!(f, "{n}"),
            Term::Var(name) => write!(f, "${name}"),
        }
    }
}

/// One immutable statement `(predicate arg1 ... argN)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub predicate: &'static str,
    pub args: Vec<Term>,
}

impl Fact {
    pub fn new(predicate: &'static str, args: Vec<Term>) -> Self {
        Self { predicate, args }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

/// A single parametrized pattern, submitted once after all facts are
/// asserted. Rendered `!(predicate args...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub pattern: Fact,
}

impl Query {
    pub fn new(predicate: &'static str, args: Vec<Term>) -> Self {
        Self {
            pattern: Fact::new(predicate, args),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.pattern)
    }
}
