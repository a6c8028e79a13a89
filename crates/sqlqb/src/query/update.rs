//! UPDATE construction and compilation.

use super::{Query, SetValue, Statement, compile_assignments};
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::ident::validate_column;
use crate::value::Value;

impl Query {
    /// Choose an UPDATE statement on `table`.
    pub fn update(&mut self, table: &str) -> QbResult<&mut Self> {
        self.set_statement(Statement::Update { set: Vec::new() })?;
        self.table = Some(table.to_string());
        Ok(self)
    }

    fn push_set(&mut self, column: &str, value: SetValue) -> QbResult<&mut Self> {
        validate_column(column)?;
        match &mut self.statement {
            Some(Statement::Update { set }) => {
                set.push((column.to_string(), value));
                Ok(self)
            }
            _ => Err(self.unsupported("SET")),
        }
    }

    /// Set a column value (`column = ?`, or `column = NULL` for NULL).
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> QbResult<&mut Self> {
        self.push_set(column, SetValue::Value(value.into()))
    }

    /// Set an optional column value (None => skip).
    pub fn set_opt<T: Into<Value>>(&mut self, column: &str, value: Option<T>) -> QbResult<&mut Self> {
        match value {
            Some(v) => self.set(column, v),
            None => Ok(self),
        }
    }

    /// Set several column values in iteration order.
    pub fn set_many<I, K, V>(&mut self, pairs: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self.set(column.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Set a column to a raw SQL expression (`count = count + 1`).
    pub fn set_raw(&mut self, column: &str, expr: &str) -> QbResult<&mut Self> {
        self.push_set(column, SetValue::Raw(expr.to_string()))
    }

    /// Render `ORDER BY` and `LIMIT n` for single-table UPDATE/DELETE. OFFSET is not rendered.
    pub(super) fn push_mutation_tail(&self, f: &mut Fragment) -> QbResult<()> {
        self.push_order_by(f)?;
        if let Some(limit) = self.limit {
            f.push(&format!(" LIMIT {limit}"));
        }
        Ok(())
    }

    pub(super) fn check_single_table(&self) -> QbResult<()> {
        if !self.joins.is_empty() {
            return Err(self.unsupported("JOIN"));
        }
        if !self.group_by.is_empty() {
            return Err(self.unsupported("GROUP BY"));
        }
        Ok(())
    }

    pub(super) fn compile_update(&self, set: &[(String, SetValue)]) -> QbResult<Fragment> {
        let mut f = Fragment::raw("UPDATE ");
        self.push_table(&mut f, "UPDATE")?;

        if set.is_empty() {
            return Err(QbError::EmptyUpdateColumns);
        }
        self.check_single_table()?;

        f.push(" SET ").append(compile_assignments(set));
        self.push_where(&mut f)?;
        self.push_mutation_tail(&mut f)?;
        Ok(f)
    }
}
