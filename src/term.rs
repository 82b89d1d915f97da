use crate::error::{ArchError, Result};
use crate::filter::{BetweenExpr, Comparison, LogicalExpr, UnaryExpr};
use crate::func::FuncExpr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Value category of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermType {
    Number,
    String,
    Bool,
    Time,
    Wildcard,
}

impl TermType {
    /// Whether a slot declared as `self` accepts a term of type `actual`.
    /// `Wildcard` on either side unifies with anything.
    pub fn accepts(self, actual: TermType) -> bool {
        self == TermType::Wildcard || actual == TermType::Wildcard || self == actual
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermType::Number => write!(f, "NUMBER"),
            TermType::String => write!(f, "STRING"),
            TermType::Bool => write!(f, "BOOL"),
            TermType::Time => write!(f, "TIME"),
            TermType::Wildcard => write!(f, "WILDCARD"),
        }
    }
}

/// Ordered bind values, aligned with the `?` placeholders of a rendered statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn of(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Concatenates the args of several parts in rendering order.
    pub fn flatten<'a>(parts: impl IntoIterator<Item = &'a Args>) -> Self {
        Self(parts.into_iter().flat_map(|args| args.0.iter().cloned()).collect())
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn extend(&mut self, other: Args) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// A named column, optionally qualified by its table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    term_type: TermType,
    table: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, term_type: TermType) -> Self {
        Self {
            name: name.into(),
            term_type,
            table: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    /// Qualifying table, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The same column rendered as `table.name`
    pub fn full(&self, table: impl Into<String>) -> Column {
        Column {
            table: Some(table.into()),
            ..self.clone()
        }
    }

    pub fn distinct(&self) -> Term {
        Term::Distinct(self.clone())
    }

    pub fn repr(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.clone(),
        }
    }
}

/// Constant embedded into the SQL text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(serde_json::Number),
    String(String),
    Bool(bool),
    Null,
}

pub const NULL: Literal = Literal::Null;

impl Literal {
    pub fn of(value: Value) -> Result<Literal> {
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(b)),
            Value::Number(n) => Ok(Literal::Number(n)),
            Value::String(s) => Ok(Literal::String(s)),
            other => Err(ArchError::InvalidQuery(format!(
                "Literal must be a scalar value: {}",
                other
            ))),
        }
    }

    pub fn term_type(&self) -> TermType {
        match self {
            Literal::Number(_) => TermType::Number,
            Literal::String(_) => TermType::String,
            Literal::Bool(_) => TermType::Bool,
            Literal::Null => TermType::Wildcard,
        }
    }

    pub fn repr(&self) -> String {
        match self {
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
            Literal::Bool(b) => b.to_string().to_uppercase(),
            Literal::Null => "NULL".to_string(),
        }
    }
}

/// Placeholder `?` whose value travels separately in the statement args
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    value: Value,
    term_type: TermType,
}

impl Variable {
    pub fn of(value: impl Into<Value>, term_type: TermType) -> Self {
        Self {
            value: value.into(),
            term_type,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }
}

/// Any typed, renderable SQL expression node.
///
/// Variants that carry invariants (`Func`, `Compare`, `Logical`, `Unary`, `Between`) hold
/// structs with private fields, so they can only be obtained through their
/// checked constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Column(Column),
    Distinct(Column),
    Literal(Literal),
    Variable(Variable),
    Func(FuncExpr),
    Compare(Comparison),
    Logical(LogicalExpr),
    Unary(UnaryExpr),
    Between(BetweenExpr),
    /// Trusted SQL fragment, e.g. a type name inside `CAST`
    Raw { sql: String, term_type: TermType },
    Star,
}

impl Term {
    pub fn raw(sql: impl Into<String>, term_type: TermType) -> Term {
        Term::Raw {
            sql: sql.into(),
            term_type,
        }
    }

    pub fn term_type(&self) -> TermType {
        match self {
            Term::Column(column) | Term::Distinct(column) => column.term_type(),
            Term::Literal(literal) => literal.term_type(),
            Term::Variable(variable) => variable.term_type(),
            Term::Func(func) => func.term_type(),
            Term::Compare(_) | Term::Logical(_) | Term::Unary(_) | Term::Between(_) => TermType::Bool,
            Term::Raw { term_type, .. } => *term_type,
            Term::Star => TermType::Wildcard,
        }
    }

    pub fn repr(&self) -> String {
        match self {
            Term::Column(column) => column.repr(),
            Term::Distinct(column) => format!("DISTINCT {}", column.repr()),
            Term::Literal(literal) => literal.repr(),
            Term::Variable(_) => "?".to_string(),
            Term::Func(func) => func.repr(),
            Term::Compare(comparison) => comparison.repr(),
            Term::Logical(logical) => logical.repr(),
            Term::Unary(unary) => unary.repr(),
            Term::Between(between) => between.repr(),
            Term::Raw { sql, .. } => sql.clone(),
            Term::Star => "*".to_string(),
        }
    }

    /// Bind values of every variable inside this term, left to right
    pub fn args(&self) -> Args {
        let mut args = Args::new();
        self.collect_args(&mut args);
        args
    }

    pub(crate) fn collect_args(&self, args: &mut Args) {
        match self {
            Term::Variable(variable) => args.push(variable.value.clone()),
            Term::Func(func) => func.terms().iter().for_each(|t| t.collect_args(args)),
            Term::Compare(comparison) => {
                comparison.left().collect_args(args);
                comparison.right().collect_args(args);
            }
            Term::Logical(logical) => logical.terms().iter().for_each(|t| t.collect_args(args)),
            Term::Unary(unary) => unary.term().collect_args(args),
            Term::Between(between) => {
                between.term().collect_args(args);
                between.low().collect_args(args);
                between.high().collect_args(args);
            }
            Term::Column(_) | Term::Distinct(_) | Term::Literal(_) | Term::Raw { .. } | Term::Star => {}
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Term::Star)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl From<Column> for Term {
    fn from(column: Column) -> Self {
        Term::Column(column)
    }
}

impl From<&Column> for Term {
    fn from(column: &Column) -> Self {
        Term::Column(column.clone())
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

/// Numeric literal
pub fn num(value: i64) -> Term {
    Term::Literal(Literal::Number(value.into()))
}

/// Floating point literal; NaN and infinities have no SQL literal form
pub fn num_f(value: f64) -> Result<Term> {
    serde_json::Number::from_f64(value)
        .map(|n| Term::Literal(Literal::Number(n)))
        .ok_or_else(|| ArchError::InvalidQuery(format!("Not a finite number: {}", value)))
}

/// String literal
pub fn literal(value: &str) -> Term {
    Term::Literal(Literal::String(value.to_string()))
}

pub fn null() -> Term {
    Term::Literal(NULL)
}

pub fn star() -> Term {
    Term::Star
}

/// Variable with an explicit type
pub fn var_of(value: impl Into<Value>, term_type: TermType) -> Term {
    Term::Variable(Variable::of(value, term_type))
}

/// Variable whose type is inferred from the value kind
pub fn var(value: impl Into<Value>) -> Result<Term> {
    let value = value.into();
    let term_type = Literal::of(value.clone())?.term_type();
    Ok(var_of(value, term_type))
}
