//! Execution bridge.
//!
//! sqlqb never talks to a database itself. An [`Executor`] receives a
//! [`BuiltQuery`] and returns an [`Outcome`]; the `Query` convenience methods
//! below build, execute and check the outcome shape in one call.

use crate::error::{QbError, QbResult};
use crate::query::{BuiltQuery, Query};
use crate::value::Value;
use std::future::Future;

/// The kind of statement, detected from the leading keyword of the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Anything else (DDL, SHOW, custom)
    Other,
}

impl StatementKind {
    /// Detect the statement kind from SQL text.
    ///
    /// Leading whitespace, comments and opening parentheses are skipped.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") {
            StatementKind::Select
        } else if starts_with_keyword(trimmed, "INSERT") || starts_with_keyword(trimmed, "REPLACE")
        {
            StatementKind::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            StatementKind::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            StatementKind::Delete
        } else {
            StatementKind::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Other => "OTHER",
        }
    }
}

fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") || s.starts_with('#') {
            match s.find('\n') {
                Some(pos) => {
                    s = &s[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if s.starts_with("/*") {
            match s.find("*/") {
                Some(pos) => {
                    s = &s[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            return s;
        }
    }
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let Some(head) = s.get(..keyword.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return false;
    }
    s[keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// One result row: column names and the values in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. Extra names or values beyond the shorter list are dropped.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        let mut columns = columns;
        let mut values = values;
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Value of the named column (first match).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    /// Value at a column position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the named column, or an execution error naming the column.
    pub fn try_get(&self, name: &str) -> QbResult<&Value> {
        self.get(name)
            .ok_or_else(|| QbError::execution(format!("column '{name}' not present in row")))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// What the bridge returned for one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Result rows (SELECT)
    Rows(Vec<Row>),
    /// Affected row count (UPDATE, DELETE)
    Affected(u64),
    /// Generated id of the last inserted row (INSERT)
    LastInsertId(u64),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Rows(_) => "rows",
            Outcome::Affected(_) => "affected count",
            Outcome::LastInsertId(_) => "last insert id",
        }
    }
}

/// A database connection, pool or transaction that can run built queries.
///
/// `fetch_single` tells the bridge that at most one row is wanted, so it may
/// stop reading after the first.
///
/// ```ignore
/// struct MyBridge { /* driver handle */ }
///
/// impl Executor for MyBridge {
///     async fn execute(&self, query: &BuiltQuery, fetch_single: bool) -> QbResult<Outcome> {
///         // bind query.args to the `?` placeholders in query.sql, in order
///     }
/// }
/// ```
pub trait Executor: Send + Sync {
    fn execute(
        &self,
        query: &BuiltQuery,
        fetch_single: bool,
    ) -> impl Future<Output = QbResult<Outcome>> + Send;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(
        &self,
        query: &BuiltQuery,
        fetch_single: bool,
    ) -> impl Future<Output = QbResult<Outcome>> + Send {
        (**self).execute(query, fetch_single)
    }
}

fn expect_rows(outcome: Outcome) -> QbResult<Vec<Row>> {
    match outcome {
        Outcome::Rows(rows) => Ok(rows),
        other => Err(QbError::UnexpectedOutcome {
            expected: "rows",
            got: other.kind(),
        }),
    }
}

impl Query {
    /// Build and run the query; return all rows.
    pub async fn fetch_all<E: Executor>(&self, executor: &E) -> QbResult<Vec<Row>> {
        let built = self.build()?;
        expect_rows(executor.execute(&built, false).await?)
    }

    /// Build and run the query; return the first row.
    ///
    /// Returns [`QbError::NotFound`] when no row comes back.
    pub async fn fetch_one<E: Executor>(&self, executor: &E) -> QbResult<Row> {
        self.fetch_opt(executor)
            .await?
            .ok_or_else(|| QbError::not_found("query returned no rows"))
    }

    /// Build and run the query; return the first row if there is one.
    pub async fn fetch_opt<E: Executor>(&self, executor: &E) -> QbResult<Option<Row>> {
        let built = self.build()?;
        let rows = expect_rows(executor.execute(&built, true).await?)?;
        Ok(rows.into_iter().next())
    }

    /// Build and run the statement; return the affected row count.
    pub async fn execute<E: Executor>(&self, executor: &E) -> QbResult<u64> {
        let built = self.build()?;
        match executor.execute(&built, false).await? {
            Outcome::Affected(n) => Ok(n),
            other => Err(QbError::UnexpectedOutcome {
                expected: "affected count",
                got: other.kind(),
            }),
        }
    }

    /// Build and run an INSERT; return the generated id of the last inserted row.
    pub async fn insert_id<E: Executor>(&self, executor: &E) -> QbResult<u64> {
        let built = self.build()?;
        match executor.execute(&built, false).await? {
            Outcome::LastInsertId(id) => Ok(id),
            other => Err(QbError::UnexpectedOutcome {
                expected: "last insert id",
                got: other.kind(),
            }),
        }
    }
}
