use crate::error::{assure_query, Result};
use crate::term::{Args, Column, Term, TermType};
use std::fmt;

/// Comparison operators for WHERE clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareType {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareType::Eq => write!(f, "="),
            CompareType::Ne => write!(f, "<>"),
            CompareType::Gt => write!(f, ">"),
            CompareType::Ge => write!(f, ">="),
            CompareType::Lt => write!(f, "<"),
            CompareType::Le => write!(f, "<="),
            CompareType::Like => write!(f, "LIKE"),
            CompareType::NotLike => write!(f, "NOT LIKE"),
        }
    }
}

impl CompareType {
    /// Builds `left <op> right`. `LIKE` needs both sides string-compatible,
    /// every other operator needs the two sides compatible with each other.
    pub fn compare(self, left: impl Into<Term>, right: impl Into<Term>) -> Result<Comparison> {
        let left = left.into();
        let right = right.into();
        assure_query(!left.is_star() && !right.is_star(), || {
            format!("`*` can't be compared with `{}`", self)
        })?;

        let compatible = match self {
            CompareType::Like | CompareType::NotLike => {
                TermType::String.accepts(left.term_type()) && TermType::String.accepts(right.term_type())
            }
            _ => left.term_type().accepts(right.term_type()),
        };
        assure_query(compatible, || {
            format!(
                "Incompatible operands for `{}`: `{}` ({}) and `{}` ({})",
                self,
                left.repr(),
                left.term_type(),
                right.repr(),
                right.term_type()
            )
        })?;

        Ok(Comparison {
            op: self,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

/// Boolean `left <op> right`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    op: CompareType,
    left: Box<Term>,
    right: Box<Term>,
}

impl Comparison {
    pub fn op(&self) -> CompareType {
        self.op
    }

    pub fn left(&self) -> &Term {
        &self.left
    }

    pub fn right(&self) -> &Term {
        &self.right
    }

    pub fn repr(&self) -> String {
        format!("{} {} {}", self.left.repr(), self.op, self.right.repr())
    }
}

impl From<Comparison> for Term {
    fn from(comparison: Comparison) -> Self {
        Term::Compare(comparison)
    }
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

/// Parenthesized `(a AND b ..)` / `(a OR b ..)`
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpr {
    op: LogicalOp,
    terms: Vec<Term>,
}

impl LogicalExpr {
    pub fn op(&self) -> LogicalOp {
        self.op
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn repr(&self) -> String {
        let parts = self
            .terms
            .iter()
            .map(Term::repr)
            .collect::<Vec<_>>()
            .join(&format!(" {} ", self.op));
        format!("({})", parts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
}

/// `NOT a`, `a IS NULL`, `a IS NOT NULL`
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    op: UnaryOp,
    term: Box<Term>,
}

impl UnaryExpr {
    pub fn op(&self) -> UnaryOp {
        self.op
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn repr(&self) -> String {
        match self.op {
            UnaryOp::Not => format!("NOT {}", self.term.repr()),
            UnaryOp::IsNull => format!("{} IS NULL", self.term.repr()),
            UnaryOp::IsNotNull => format!("{} IS NOT NULL", self.term.repr()),
        }
    }
}

fn assure_bool(term: &Term, context: &str) -> Result<()> {
    assure_query(!term.is_star() && TermType::Bool.accepts(term.term_type()), || {
        format!(
            "{} expects a boolean term, got `{}` of type {}",
            context,
            term.repr(),
            term.term_type()
        )
    })
}

fn logical(op: LogicalOp, terms: Vec<Term>) -> Result<Term> {
    assure_query(!terms.is_empty(), || format!("Empty `{}` expression", op))?;
    for term in &terms {
        assure_bool(term, &op.to_string())?;
    }
    Ok(Term::Logical(LogicalExpr { op, terms }))
}

pub fn and<I, T>(terms: I) -> Result<Term>
where
    I: IntoIterator<Item = T>,
    T: Into<Term>,
{
    logical(LogicalOp::And, terms.into_iter().map(Into::into).collect())
}

pub fn or<I, T>(terms: I) -> Result<Term>
where
    I: IntoIterator<Item = T>,
    T: Into<Term>,
{
    logical(LogicalOp::Or, terms.into_iter().map(Into::into).collect())
}

pub fn not(term: impl Into<Term>) -> Result<Term> {
    let term = term.into();
    assure_bool(&term, "NOT")?;
    Ok(Term::Unary(UnaryExpr {
        op: UnaryOp::Not,
        term: Box::new(term),
    }))
}

pub fn is_null(term: impl Into<Term>) -> Result<Term> {
    null_check(UnaryOp::IsNull, term.into())
}

pub fn is_not_null(term: impl Into<Term>) -> Result<Term> {
    null_check(UnaryOp::IsNotNull, term.into())
}

fn null_check(op: UnaryOp, term: Term) -> Result<Term> {
    assure_query(!term.is_star(), || "`*` can't be checked for NULL".to_string())?;
    Ok(Term::Unary(UnaryExpr {
        op,
        term: Box::new(term),
    }))
}

pub fn like(left: impl Into<Term>, right: impl Into<Term>) -> Result<Term> {
    CompareType::Like.compare(left, right).map(Term::from)
}

/// `a BETWEEN low AND high`
#[derive(Debug, Clone, PartialEq)]
pub struct BetweenExpr {
    term: Box<Term>,
    low: Box<Term>,
    high: Box<Term>,
}

impl BetweenExpr {
    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn low(&self) -> &Term {
        &self.low
    }

    pub fn high(&self) -> &Term {
        &self.high
    }

    pub fn repr(&self) -> String {
        format!("{} BETWEEN {} AND {}", self.term.repr(), self.low.repr(), self.high.repr())
    }
}

pub fn between(term: impl Into<Term>, low: impl Into<Term>, high: impl Into<Term>) -> Result<Term> {
    let term = term.into();
    let low = low.into();
    let high = high.into();
    for bound in [&low, &high] {
        assure_query(
            !term.is_star() && !bound.is_star() && term.term_type().accepts(bound.term_type()),
            || {
                format!(
                    "Incompatible BETWEEN bound: `{}` ({}) for `{}` ({})",
                    bound.repr(),
                    bound.term_type(),
                    term.repr(),
                    term.term_type()
                )
            },
        )?;
    }
    Ok(Term::Between(BetweenExpr {
        term: Box::new(term),
        low: Box::new(low),
        high: Box::new(high),
    }))
}

/// Boolean terms rendered under a leading keyword and joined with `AND`
#[derive(Debug, Clone, PartialEq, Default)]
struct Clause {
    terms: Vec<Term>,
}

impl Clause {
    fn of(terms: Vec<Term>, context: &str) -> Result<Self> {
        for term in &terms {
            assure_bool(term, context)?;
        }
        Ok(Self { terms })
    }

    fn repr(&self, keyword: &str) -> String {
        if self.terms.is_empty() {
            return String::new();
        }
        let parts = self.terms.iter().map(Term::repr).collect::<Vec<_>>();
        format!("{} {}", keyword, parts.join(" AND "))
    }

    fn args(&self) -> Args {
        let mut args = Args::new();
        self.terms.iter().for_each(|term| term.collect_args(&mut args));
        args
    }
}

/// `WHERE e1 AND e2 ..`, clauses kept in call order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Where {
    clause: Clause,
}

impl Where {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(term: impl Into<Term>) -> Result<Self> {
        Self::and([term.into()])
    }

    pub fn and<I, T>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let clause = Clause::of(terms.into_iter().map(Into::into).collect(), "WHERE")?;
        Ok(Self { clause })
    }

    pub fn terms(&self) -> &[Term] {
        &self.clause.terms
    }

    pub fn is_empty(&self) -> bool {
        self.clause.terms.is_empty()
    }

    /// The clause text, empty when there are no terms
    pub fn repr(&self) -> String {
        self.clause.repr("WHERE")
    }

    pub fn args(&self) -> Args {
        self.clause.args()
    }
}

/// `HAVING e1 AND e2 ..` for grouped selects
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    clause: Clause,
}

impl Having {
    pub fn of(term: impl Into<Term>) -> Result<Self> {
        Self::and([term.into()])
    }

    pub fn and<I, T>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let clause = Clause::of(terms.into_iter().map(Into::into).collect(), "HAVING")?;
        Ok(Self { clause })
    }

    pub fn is_empty(&self) -> bool {
        self.clause.terms.is_empty()
    }

    pub fn repr(&self) -> String {
        self.clause.repr("HAVING")
    }

    pub fn args(&self) -> Args {
        self.clause.args()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub term: Term,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn new(term: impl Into<Term>, direction: SortDirection) -> Self {
        Self {
            term: term.into(),
            direction,
        }
    }

    pub fn repr(&self) -> String {
        format!("{} {}", self.term.repr(), self.direction)
    }
}

impl From<Column> for OrderTerm {
    fn from(column: Column) -> Self {
        OrderTerm::new(column, SortDirection::Asc)
    }
}

/// ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    terms: Vec<OrderTerm>,
}

impl OrderBy {
    pub fn of<I, T>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderTerm>,
    {
        let terms: Vec<OrderTerm> = terms.into_iter().map(Into::into).collect();
        assure_query(!terms.is_empty(), || "ORDER BY without terms".to_string())?;
        assure_query(terms.iter().all(|t| !t.term.is_star()), || {
            "`*` can't be used in ORDER BY".to_string()
        })?;
        Ok(Self { terms })
    }

    pub fn repr(&self) -> String {
        let parts = self.terms.iter().map(OrderTerm::repr).collect::<Vec<_>>();
        format!("ORDER BY {}", parts.join(", "))
    }

    pub fn args(&self) -> Args {
        let mut args = Args::new();
        self.terms.iter().for_each(|t| t.term.collect_args(&mut args));
        args
    }
}
