//! The query builder.
//!
//! A [`Query`] accumulates the state of one statement through `&mut self`
//! methods and compiles it with [`Query::build`] into a [`BuiltQuery`]: one SQL
//! string with positional `?` placeholders and the args bound to them, in
//! order.
//!
//! Methods that only record state return `&mut Self`. Methods that validate
//! their input return `QbResult<&mut Self>`, so problems surface at the call
//! that caused them and chains continue with `?`.
//!
//! ```ignore
//! use sqlqb::Query;
//!
//! let mut q = Query::new();
//! q.select(["id", "name"])?
//!     .from("users")
//!     .and_where("active", "=", 1)?
//!     .order_by("name")?
//!     .limit(10);
//!
//! let built = q.build()?;
//! assert_eq!(built.sql, "SELECT id, name FROM users WHERE active = ? ORDER BY name ASC LIMIT 10");
//! ```

mod delete;
mod insert;
mod select;
mod update;

use crate::error::{QbError, QbResult};
use crate::executor::StatementKind;
use crate::expr::Column;
use crate::fragment::Fragment;
use crate::value::Value;
use crate::where_tree::{Condition, Prefix, WhereTree, WhereValue};

pub use select::{Direction, Join, JoinKind};

/// The value side of an UPDATE SET or ON DUPLICATE KEY UPDATE pair.
#[derive(Debug, Clone)]
pub enum SetValue {
    /// Bound value (`col = ?`, or `col = NULL` for NULL)
    Value(Value),
    /// Raw SQL expression (`col = col + 1`)
    Raw(String),
}

impl SetValue {
    fn compile(&self) -> Fragment {
        let mut f = Fragment::new();
        match self {
            SetValue::Value(value) => {
                f.push_bind(value);
            }
            SetValue::Raw(expr) => {
                f.push(expr);
            }
        }
        f
    }
}

/// Compile `col = value, ...` pairs in declaration order.
fn compile_assignments(pairs: &[(String, SetValue)]) -> Fragment {
    Fragment::join(
        pairs.iter().map(|(column, value)| {
            let mut f = Fragment::raw(format!("{column} = "));
            f.append(value.compile());
            f
        }),
        ", ",
    )
}

/// Statement kind and the state only that kind uses.
#[derive(Debug, Clone)]
pub enum Statement {
    Select {
        columns: Vec<Column>,
        distinct: bool,
    },
    Insert {
        columns: Vec<String>,
        /// Row-major values; each `columns.len()` slice is one row.
        values: Vec<Value>,
        ignore: bool,
        duplicate_key_update: Vec<(String, SetValue)>,
    },
    Update {
        set: Vec<(String, SetValue)>,
    },
    Delete,
}

impl Statement {
    /// The leading SQL keyword.
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Select { .. } => "SELECT",
            Statement::Insert { .. } => "INSERT",
            Statement::Update { .. } => "UPDATE",
            Statement::Delete => "DELETE",
        }
    }
}

/// A single SQL statement under construction.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) statement: Option<Statement>,
    pub(crate) table: Option<String>,
    pub(crate) table_alias: Option<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_tree: WhereTree,
    pub(crate) group_by: Vec<Column>,
    pub(crate) order_by: Vec<(Column, Direction)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    /// Name used when this query is embedded as a projected sub-query.
    pub(crate) query_alias: Option<String>,
}

/// A compiled statement: SQL text and its positional args.
///
/// The n-th `?` in `sql` is bound to `args[n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

impl BuiltQuery {
    /// Create a built query from text and args.
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// The statement kind, detected from the leading keyword.
    pub fn kind(&self) -> StatementKind {
        StatementKind::from_sql(&self.sql)
    }

    /// Count `?` placeholders outside quoted string literals.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut in_quote = false;
        for c in self.sql.chars() {
            match c {
                '\'' => in_quote = !in_quote,
                '?' if !in_quote => count += 1,
                _ => {}
            }
        }
        count
    }
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// The chosen statement, if any.
    pub fn statement(&self) -> Option<&Statement> {
        self.statement.as_ref()
    }

    /// Fix the statement kind. Fails if one was already chosen.
    fn set_statement(&mut self, statement: Statement) -> QbResult<()> {
        if let Some(current) = &self.statement {
            return Err(QbError::StatementAlreadySet {
                current: current.name(),
                requested: statement.name(),
            });
        }
        self.statement = Some(statement);
        Ok(())
    }

    fn unsupported(&self, clause: &'static str) -> QbError {
        match &self.statement {
            Some(statement) => QbError::UnsupportedClause {
                clause,
                statement: statement.name(),
            },
            None => QbError::MissingStatement,
        }
    }

    /// Choose a DELETE statement.
    pub fn delete(&mut self) -> QbResult<&mut Self> {
        self.set_statement(Statement::Delete)?;
        Ok(self)
    }

    // ==================== Table ====================

    /// Set the target table.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    /// Set the target table (INSERT spelling).
    pub fn into_table(&mut self, table: &str) -> &mut Self {
        self.from(table)
    }

    /// Set the table alias (`FROM users AS u`).
    pub fn table_alias(&mut self, alias: &str) -> &mut Self {
        self.table_alias = Some(alias.to_string());
        self
    }

    /// Name this query for use as a projected sub-query (`(SELECT ...) AS alias`).
    pub fn alias(&mut self, alias: &str) -> &mut Self {
        self.query_alias = Some(alias.to_string());
        self
    }

    fn table_name(&self, statement: &'static str) -> QbResult<&str> {
        match self.table.as_deref() {
            Some(table) if !table.trim().is_empty() => Ok(table),
            _ => Err(QbError::MissingTable(statement)),
        }
    }

    fn push_table(&self, f: &mut Fragment, statement: &'static str) -> QbResult<()> {
        f.push(self.table_name(statement)?);
        if let Some(alias) = &self.table_alias {
            f.push(" AS ").push(alias);
        }
        Ok(())
    }

    // ==================== WHERE ====================

    fn push_condition(
        &mut self,
        prefix: Prefix,
        column: &str,
        operand: &str,
        value: WhereValue,
    ) -> QbResult<&mut Self> {
        let condition = Condition::new(prefix, column, operand, value)?;
        self.where_tree.push(condition);
        Ok(self)
    }

    /// Add an AND condition: `column operand value`.
    ///
    /// `value` may be a scalar, an `Option`, a `Vec` (for `IN`/`BETWEEN`) or a
    /// [`Query`] (for `IN` and set comparisons like `= ALL`). NULL renders as
    /// the bare `NULL` token.
    pub fn and_where(
        &mut self,
        column: &str,
        operand: &str,
        value: impl Into<WhereValue>,
    ) -> QbResult<&mut Self> {
        self.push_condition(Prefix::And, column, operand, value.into())
    }

    /// Add an OR condition: `column operand value`.
    pub fn or_where(
        &mut self,
        column: &str,
        operand: &str,
        value: impl Into<WhereValue>,
    ) -> QbResult<&mut Self> {
        self.push_condition(Prefix::Or, column, operand, value.into())
    }

    /// Add an AND condition whose right side is emitted verbatim (no placeholder).
    pub fn and_where_literal(
        &mut self,
        column: &str,
        operand: &str,
        sql: &str,
    ) -> QbResult<&mut Self> {
        self.push_condition(Prefix::And, column, operand, WhereValue::Literal(sql.to_string()))
    }

    /// Add an OR condition whose right side is emitted verbatim (no placeholder).
    pub fn or_where_literal(
        &mut self,
        column: &str,
        operand: &str,
        sql: &str,
    ) -> QbResult<&mut Self> {
        self.push_condition(Prefix::Or, column, operand, WhereValue::Literal(sql.to_string()))
    }

    fn push_group<F>(&mut self, prefix: Prefix, build: F) -> QbResult<&mut Self>
    where
        F: FnOnce(&mut Query) -> QbResult<()>,
    {
        self.where_tree.open_group(prefix);
        let result = build(self);
        self.where_tree.close_group();
        result?;
        Ok(self)
    }

    /// Add a parenthesized AND group. Conditions added inside `build` land in the group.
    ///
    /// ```ignore
    /// q.and_where("c", "=", 3)?
    ///     .where_group(|q| {
    ///         q.and_where("a", "=", 1)?.or_where("b", "=", 2)?;
    ///         Ok(())
    ///     })?;
    /// // WHERE c = ? AND (a = ? OR b = ?)
    /// ```
    pub fn where_group<F>(&mut self, build: F) -> QbResult<&mut Self>
    where
        F: FnOnce(&mut Query) -> QbResult<()>,
    {
        self.push_group(Prefix::And, build)
    }

    /// Add a parenthesized OR group.
    pub fn or_where_group<F>(&mut self, build: F) -> QbResult<&mut Self>
    where
        F: FnOnce(&mut Query) -> QbResult<()>,
    {
        self.push_group(Prefix::Or, build)
    }

    /// Add WHERE: column = value
    pub fn eq(&mut self, column: &str, value: impl Into<WhereValue>) -> QbResult<&mut Self> {
        self.and_where(column, "=", value)
    }

    /// Add WHERE: column IN (values...)
    pub fn in_list(&mut self, column: &str, values: impl Into<WhereValue>) -> QbResult<&mut Self> {
        self.and_where(column, "IN", values)
    }

    /// Add WHERE: column IS NULL
    pub fn is_null(&mut self, column: &str) -> QbResult<&mut Self> {
        self.and_where(column, "IS", Value::Null)
    }

    /// Add WHERE: column IS NOT NULL
    pub fn is_not_null(&mut self, column: &str) -> QbResult<&mut Self> {
        self.and_where(column, "IS NOT", Value::Null)
    }

    fn push_where(&self, f: &mut Fragment) -> QbResult<()> {
        if !self.where_tree.is_empty() {
            f.push(" WHERE ").append(self.where_tree.compile()?);
        }
        Ok(())
    }

    // ==================== Build ====================

    /// Compile the query into SQL text and ordered args.
    ///
    /// Building does not modify the query, so building twice without changes
    /// in between yields identical results.
    pub fn build(&self) -> QbResult<BuiltQuery> {
        let (sql, args) = self.compile()?.into_parts();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "sqlqb.build",
            statement = self.statement.as_ref().map(Statement::name).unwrap_or("unset"),
            args = args.len(),
            "query built"
        );

        Ok(BuiltQuery { sql, args })
    }

    /// Get the built SQL string (for debugging). Empty if the query does not build.
    pub fn to_sql(&self) -> String {
        self.build().map(|built| built.sql).unwrap_or_default()
    }

    pub(crate) fn compile(&self) -> QbResult<Fragment> {
        match &self.statement {
            None => Err(QbError::MissingStatement),
            Some(Statement::Select { columns, distinct }) => self.compile_select(columns, *distinct),
            Some(Statement::Insert {
                columns,
                values,
                ignore,
                duplicate_key_update,
            }) => self.compile_insert(columns, values, *ignore, duplicate_key_update),
            Some(Statement::Update { set }) => self.compile_update(set),
            Some(Statement::Delete) => self.compile_delete(),
        }
    }

    /// Compile as a parenthesized sub-query. Only SELECT can be embedded.
    pub(crate) fn compile_subquery(&self) -> QbResult<Fragment> {
        match &self.statement {
            Some(Statement::Select { .. }) => {
                let mut f = Fragment::new();
                f.append_parenthesized(self.compile()?);
                Ok(f)
            }
            _ => Err(self.unsupported("sub-query")),
        }
    }

    /// Compile as an embedded column item: `(...)` plus ` AS alias` when named.
    pub(crate) fn compile_embedded(&self) -> QbResult<Fragment> {
        let mut f = self.compile_subquery()?;
        if let Some(alias) = &self.query_alias {
            f.push(" AS ").push(alias);
        }
        Ok(f)
    }
}

/// Create a SELECT query for the given columns.
///
/// # Example
/// ```ignore
/// let mut q = sqlqb::select(["id", "name"])?;
/// q.from("users");
/// ```
pub fn select<I, C>(columns: I) -> QbResult<Query>
where
    I: IntoIterator<Item = C>,
    C: Into<Column>,
{
    let mut query = Query::new();
    query.select(columns)?;
    Ok(query)
}

/// Create a SELECT DISTINCT query for the given columns.
pub fn select_distinct<I, C>(columns: I) -> QbResult<Query>
where
    I: IntoIterator<Item = C>,
    C: Into<Column>,
{
    let mut query = Query::new();
    query.select_distinct(columns)?;
    Ok(query)
}

/// Create an INSERT query for one row of `(column, value)` pairs.
pub fn insert<I, K, V>(row: I) -> QbResult<Query>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut query = Query::new();
    query.insert(row)?;
    Ok(query)
}

/// Create an INSERT query for several rows.
pub fn insert_rows<R, I, K, V>(rows: R) -> QbResult<Query>
where
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut query = Query::new();
    query.insert_rows(rows)?;
    Ok(query)
}

/// Create an UPDATE query for the given table.
pub fn update(table: &str) -> Query {
    let mut query = Query::new();
    query.table = Some(table.to_string());
    query.statement = Some(Statement::Update { set: Vec::new() });
    query
}

/// Create a DELETE query for the given table.
pub fn delete(table: &str) -> Query {
    let mut query = Query::new();
    query.table = Some(table.to_string());
    query.statement = Some(Statement::Delete);
    query
}

#[cfg(test)]
mod tests;
