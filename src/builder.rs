use crate::arch::TableArch;
use crate::engine::Engine;
use crate::error::{assure_query, ArchError, Result};
use crate::filter::{CompareType, Having, OrderBy, Where};
use crate::func::FuncExpr;
use crate::term::{Args, Column, Term, TermType};
use serde_json::Value;
use std::fmt;

/// Anything that names a table
pub trait TableName {
    fn table_name(&self) -> String;
}

impl TableName for &str {
    fn table_name(&self) -> String {
        self.to_string()
    }
}

impl TableName for String {
    fn table_name(&self) -> String {
        self.clone()
    }
}

impl TableName for TableArch {
    fn table_name(&self) -> String {
        self.sql_name().to_string()
    }
}

impl TableName for &TableArch {
    fn table_name(&self) -> String {
        self.sql_name().to_string()
    }
}

/// Rendered SELECT statement and the bind values of its `?` placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    repr: String,
    args: Args,
    columns_number: usize,
}

impl SelectQuery {
    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// Bind values, one per `?` placeholder outside string literals.
    /// A `?` inside a quoted literal such as `'what?'` is plain text and has no arg.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Number of projected columns
    pub fn columns_number(&self) -> usize {
        self.columns_number
    }

    /// `self\nUNION\nother`, both sides must project the same number of columns
    pub fn union(self, other: SelectQuery) -> Result<SelectQuery> {
        assure_query(self.columns_number == other.columns_number, || {
            format!(
                "UNION of queries with different column counts: {} and {}",
                self.columns_number, other.columns_number
            )
        })?;
        Ok(SelectQuery {
            repr: format!("{}\nUNION\n{}", self.repr, other.repr),
            args: Args::flatten([&self.args, &other.args]),
            columns_number: self.columns_number,
        })
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr)
    }
}

/// One rendered clause line plus its args
struct Part {
    line: String,
    args: Args,
}

impl Part {
    fn plain(line: String) -> Self {
        Self { line, args: Args::new() }
    }
}

fn assemble(parts: Vec<Part>, columns_number: usize) -> SelectQuery {
    let repr = parts.iter().map(|part| part.line.as_str()).collect::<Vec<_>>().join("\n");
    let args = Args::flatten(parts.iter().map(|part| &part.args));
    SelectQuery {
        repr,
        args,
        columns_number,
    }
}

fn select_part(terms: &[Term]) -> Part {
    let mut args = Args::new();
    terms.iter().for_each(|term| term.collect_args(&mut args));
    let columns = terms.iter().map(Term::repr).collect::<Vec<_>>().join(", ");
    Part {
        line: format!("SELECT {}", columns),
        args,
    }
}

fn where_part(where_clause: &Where) -> Option<Part> {
    (!where_clause.is_empty()).then(|| Part {
        line: where_clause.repr(),
        args: where_clause.args(),
    })
}

fn order_by_part(order_by: &Option<OrderBy>) -> Option<Part> {
    order_by.as_ref().map(|order_by| Part {
        line: order_by.repr(),
        args: order_by.args(),
    })
}

/// `LIMIT`/`OFFSET` values, rendered as bind arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn of_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn of_offset(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    fn parts(&self, engine: Engine) -> Vec<Part> {
        let mut parts = Vec::new();
        if let Some(limit) = self.limit {
            let line = if engine.supports_limit() {
                "LIMIT ?"
            } else {
                "FETCH NEXT ? ROWS ONLY"
            };
            parts.push(Part {
                line: line.to_string(),
                args: Args::of(vec![Value::from(limit)]),
            });
        }
        if let Some(offset) = self.offset {
            parts.push(Part {
                line: "OFFSET ?".to_string(),
                args: Args::of(vec![Value::from(offset)]),
            });
        }
        parts
    }
}

/// WHERE, ORDER BY and pagination shared by the plain and join selects
#[derive(Debug, Clone, Default)]
struct CompositeFilter {
    where_clause: Where,
    order_by: Option<OrderBy>,
    pagination: Pagination,
    engine: Option<Engine>,
    error: Option<String>,
}

impl CompositeFilter {
    fn limit(&mut self, limit: u64) {
        if self.pagination.limit.replace(limit).is_some() {
            self.fail("LIMIT already set");
        }
    }

    fn offset(&mut self, offset: u64) {
        if self.pagination.offset.replace(offset).is_some() {
            self.fail("OFFSET already set");
        }
    }

    fn paginate(&mut self, pagination: Pagination, engine: Engine) {
        self.engine = Some(engine);
        if let Some(limit) = pagination.limit {
            self.limit(limit);
        }
        if let Some(offset) = pagination.offset {
            self.offset(offset);
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.error.get_or_insert_with(|| message.into());
    }

    fn check(&self, table: &str) -> Result<()> {
        match &self.error {
            Some(error) => Err(ArchError::InvalidQuery(format!("{}: table={}", error, table))),
            None => Ok(()),
        }
    }

    fn parts(&self) -> Vec<Part> {
        let mut parts = Vec::new();
        parts.extend(where_part(&self.where_clause));
        parts.extend(order_by_part(&self.order_by));
        parts.extend(self.pagination.parts(self.engine.unwrap_or(Engine::SQLite)));
        parts
    }
}

/// `SELECT ... FROM ... [WHERE] [ORDER BY] [LIMIT] [OFFSET]`
#[derive(Debug, Clone)]
pub struct SelectWhere {
    table: String,
    terms: Vec<Term>,
    filter: CompositeFilter,
}

impl SelectWhere {
    pub fn from(table: impl TableName) -> Self {
        Self {
            table: table.table_name(),
            terms: Vec::new(),
            filter: CompositeFilter::default(),
        }
    }

    /// Appends projection terms: columns, functions or computed expressions
    pub fn select<I, T>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn where_clause(mut self, where_clause: Where) -> Self {
        self.filter.where_clause = where_clause;
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.filter.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.filter.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.filter.offset(offset);
        self
    }

    /// Sets both values and picks the pagination syntax of `engine`
    pub fn paginate(mut self, pagination: Pagination, engine: Engine) -> Self {
        self.filter.paginate(pagination, engine);
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.filter.engine = Some(engine);
        self
    }

    pub fn build(self) -> Result<SelectQuery> {
        self.filter.check(&self.table)?;
        assure_query(!self.terms.is_empty(), || {
            format!("Nothing to select: table={}", self.table)
        })?;

        let mut parts = vec![select_part(&self.terms), Part::plain(format!("FROM {}", self.table))];
        parts.extend(self.filter.parts());
        Ok(assemble(parts, self.terms.len()))
    }
}

/// Join flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// `<join type> <table> ON <condition>`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOn {
    join_type: JoinType,
    table: String,
    condition: Term,
}

impl JoinOn {
    /// Joins `table` on an arbitrary boolean condition
    pub fn on(join_type: JoinType, table: impl TableName, condition: impl Into<Term>) -> Result<Self> {
        let condition = condition.into();
        assure_query(!condition.is_star() && TermType::Bool.accepts(condition.term_type()), || {
            format!("JOIN condition must be boolean: `{}`", condition.repr())
        })?;
        Ok(Self {
            join_type,
            table: table.table_name(),
            condition,
        })
    }

    /// `left = right`, joining the table `right` is qualified with
    pub fn columns(join_type: JoinType, left: Column, right: Column) -> Result<Self> {
        let table = right
            .table()
            .map(str::to_string)
            .ok_or_else(|| {
                ArchError::InvalidQuery(format!("Joined column must be table-qualified: `{}`", right.repr()))
            })?;
        Self::on(join_type, table, CompareType::Eq.compare(left, right)?)
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn repr(&self) -> String {
        format!("{} {} ON {}", self.join_type, self.table, self.condition.repr())
    }

    fn part(&self) -> Part {
        Part {
            line: self.repr(),
            args: self.condition.args(),
        }
    }
}

/// `SELECT ... FROM ... JOIN ... ON ... [WHERE] [ORDER BY] [LIMIT] [OFFSET]`
#[derive(Debug, Clone)]
pub struct SelectJoin {
    table: String,
    terms: Vec<Term>,
    joins: Vec<JoinOn>,
    filter: CompositeFilter,
}

impl SelectJoin {
    pub fn from(table: impl TableName) -> Self {
        Self {
            table: table.table_name(),
            terms: Vec::new(),
            joins: Vec::new(),
            filter: CompositeFilter::default(),
        }
    }

    pub fn select<I, T>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Joins are rendered in call order, one line each
    pub fn join_on(mut self, join: JoinOn) -> Self {
        self.joins.push(join);
        self
    }

    pub fn left_join_on(self, left: Column, right: Column) -> Self {
        self.join_columns(JoinType::Left, left, right)
    }

    pub fn inner_join_on(self, left: Column, right: Column) -> Self {
        self.join_columns(JoinType::Inner, left, right)
    }

    fn join_columns(mut self, join_type: JoinType, left: Column, right: Column) -> Self {
        match JoinOn::columns(join_type, left, right) {
            Ok(join) => self.joins.push(join),
            Err(err) => self.filter.fail(err.to_string()),
        }
        self
    }

    pub fn where_clause(mut self, where_clause: Where) -> Self {
        self.filter.where_clause = where_clause;
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.filter.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.filter.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.filter.offset(offset);
        self
    }

    pub fn paginate(mut self, pagination: Pagination, engine: Engine) -> Self {
        self.filter.paginate(pagination, engine);
        self
    }

    pub fn build(self) -> Result<SelectQuery> {
        self.filter.check(&self.table)?;
        assure_query(!self.terms.is_empty(), || {
            format!("Nothing to select: table={}", self.table)
        })?;
        assure_query(!self.joins.is_empty(), || {
            format!("SelectJoin without JOIN: table={}", self.table)
        })?;

        let mut parts = vec![select_part(&self.terms), Part::plain(format!("FROM {}", self.table))];
        parts.extend(self.joins.iter().map(JoinOn::part));
        parts.extend(self.filter.parts());
        Ok(assemble(parts, self.terms.len()))
    }
}

/// `SELECT <group columns>, <aggregate> FROM ... [WHERE] GROUP BY ... [HAVING] [ORDER BY]`
#[derive(Debug, Clone)]
pub struct SelectGroupBy {
    table: String,
    group_by: Vec<Column>,
    aggregate: Option<FuncExpr>,
    where_clause: Where,
    having: Option<Having>,
    order_by: Option<OrderBy>,
}

impl SelectGroupBy {
    pub fn from(table: impl TableName) -> Self {
        Self {
            table: table.table_name(),
            group_by: Vec::new(),
            aggregate: None,
            where_clause: Where::empty(),
            having: None,
            order_by: None,
        }
    }

    pub fn group_by<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        self.group_by.extend(columns);
        self
    }

    pub fn aggregate(mut self, aggregate: FuncExpr) -> Result<Self> {
        if let Some(existing) = &self.aggregate {
            return Err(ArchError::InvalidQuery(format!(
                "Aggregate function already set: {}",
                existing.repr()
            )));
        }
        assure_query(aggregate.is_aggregate(), || {
            format!("Non-aggregate function supplied: {}", aggregate.repr())
        })?;
        self.aggregate = Some(aggregate);
        Ok(self)
    }

    pub fn where_clause(mut self, where_clause: Where) -> Self {
        self.where_clause = where_clause;
        self
    }

    pub fn having(mut self, having: Having) -> Self {
        self.having = Some(having);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn build(self) -> Result<SelectQuery> {
        let aggregate = self.aggregate.ok_or_else(|| {
            ArchError::InvalidQuery(format!(
                "Aggregate function not provided for SelectGroupBy: table={}",
                self.table
            ))
        })?;

        let mut terms: Vec<Term> = self.group_by.iter().map(Term::from).collect();
        terms.push(aggregate.into());

        let mut parts = vec![select_part(&terms), Part::plain(format!("FROM {}", self.table))];
        parts.extend(where_part(&self.where_clause));
        if !self.group_by.is_empty() {
            let columns = self.group_by.iter().map(Column::repr).collect::<Vec<_>>();
            parts.push(Part::plain(format!("GROUP BY {}", columns.join(", "))));
        }
        parts.extend(self.having.as_ref().filter(|having| !having.is_empty()).map(|having| Part {
            line: having.repr(),
            args: having.args(),
        }));
        parts.extend(order_by_part(&self.order_by));
        Ok(assemble(parts, terms.len()))
    }
}
