//! SELECT construction and compilation, plus the clauses only SELECT (or
//! SELECT/UPDATE/DELETE) renders: joins, grouping, ordering and limits.

use super::{Query, Statement};
use crate::error::{QbError, QbResult};
use crate::expr::Column;
use crate::fragment::Fragment;
use crate::ident::validate_expr;
use crate::where_tree::Operand;

/// MySQL's documented "no limit" value, used when only OFFSET is set.
const NO_LIMIT: u64 = u64::MAX;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// A join with its ON predicate (`left operand right`, all identifiers).
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: String,
    left: String,
    operand: Operand,
    right: String,
}

impl Join {
    fn compile(&self) -> String {
        format!(
            "{} {} ON {} {} {}",
            self.kind.as_sql(),
            self.table,
            self.left,
            self.operand.as_sql(),
            self.right
        )
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

fn collect_columns<I, C>(columns: I) -> QbResult<Vec<Column>>
where
    I: IntoIterator<Item = C>,
    C: Into<Column>,
{
    let columns: Vec<Column> = columns.into_iter().map(Into::into).collect();
    for column in &columns {
        column.validate()?;
    }
    Ok(columns)
}

impl Query {
    // ==================== SELECT columns ====================

    /// Choose a SELECT statement projecting `columns`.
    ///
    /// Each column is an expression string or an embedded [`Query`]. An empty
    /// list selects `*`.
    pub fn select<I, C>(&mut self, columns: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        let columns = collect_columns(columns)?;
        self.set_statement(Statement::Select {
            columns,
            distinct: false,
        })?;
        Ok(self)
    }

    /// Choose a SELECT DISTINCT statement projecting `columns`.
    pub fn select_distinct<I, C>(&mut self, columns: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        let columns = collect_columns(columns)?;
        self.set_statement(Statement::Select {
            columns,
            distinct: true,
        })?;
        Ok(self)
    }

    /// Append one projected column to a SELECT.
    pub fn add_select(&mut self, column: impl Into<Column>) -> QbResult<&mut Self> {
        let column = column.into();
        column.validate()?;
        match &mut self.statement {
            Some(Statement::Select { columns, .. }) => {
                columns.push(column);
                Ok(self)
            }
            _ => Err(self.unsupported("SELECT column")),
        }
    }

    /// Make a SELECT distinct.
    pub fn distinct(&mut self) -> QbResult<&mut Self> {
        match &mut self.statement {
            Some(Statement::Select { distinct, .. }) => {
                *distinct = true;
                Ok(self)
            }
            _ => Err(self.unsupported("DISTINCT")),
        }
    }

    // ==================== JOIN ====================

    /// Add a join: `<kind> JOIN table ON left operand right`.
    ///
    /// The predicate compares identifiers, so nothing is bound.
    pub fn join(
        &mut self,
        kind: JoinKind,
        table: &str,
        left: &str,
        operand: &str,
        right: &str,
    ) -> QbResult<&mut Self> {
        validate_expr(table)?;
        validate_expr(left)?;
        validate_expr(right)?;
        let parsed = Operand::parse(operand)?;
        if !parsed.is_symbol_compare() {
            return Err(QbError::InvalidOperand(operand.to_string()));
        }
        self.joins.push(Join {
            kind,
            table: table.to_string(),
            left: left.to_string(),
            operand: parsed,
            right: right.to_string(),
        });
        Ok(self)
    }

    /// Add INNER JOIN.
    pub fn inner_join(
        &mut self,
        table: &str,
        left: &str,
        operand: &str,
        right: &str,
    ) -> QbResult<&mut Self> {
        self.join(JoinKind::Inner, table, left, operand, right)
    }

    /// Add LEFT JOIN.
    pub fn left_join(
        &mut self,
        table: &str,
        left: &str,
        operand: &str,
        right: &str,
    ) -> QbResult<&mut Self> {
        self.join(JoinKind::Left, table, left, operand, right)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(
        &mut self,
        table: &str,
        left: &str,
        operand: &str,
        right: &str,
    ) -> QbResult<&mut Self> {
        self.join(JoinKind::Right, table, left, operand, right)
    }

    // ==================== Ordering & Grouping ====================

    /// Add a GROUP BY item (expression or sub-query).
    pub fn group_by(&mut self, column: impl Into<Column>) -> QbResult<&mut Self> {
        let column = column.into();
        column.validate()?;
        self.group_by.push(column);
        Ok(self)
    }

    /// Add ORDER BY item ASC.
    pub fn order_by(&mut self, column: impl Into<Column>) -> QbResult<&mut Self> {
        self.order_by_dir(column, Direction::Asc)
    }

    /// Add ORDER BY item DESC.
    pub fn order_by_desc(&mut self, column: impl Into<Column>) -> QbResult<&mut Self> {
        self.order_by_dir(column, Direction::Desc)
    }

    /// Add ORDER BY item with an explicit direction.
    pub fn order_by_dir(
        &mut self,
        column: impl Into<Column>,
        direction: Direction,
    ) -> QbResult<&mut Self> {
        let column = column.into();
        column.validate()?;
        self.order_by.push((column, direction));
        Ok(self)
    }

    // ==================== Pagination ====================

    /// Set LIMIT.
    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET (SELECT only).
    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Set LIMIT and, optionally, OFFSET.
    pub fn limit_offset(&mut self, n: u64, offset: Option<u64>) -> &mut Self {
        self.limit = Some(n);
        self.offset = offset;
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(&mut self, page: u64, per_page: u64) -> &mut Self {
        let page = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((page - 1).saturating_mul(size));
        self
    }

    // ==================== Build helpers ====================

    pub(super) fn push_group_by(&self, f: &mut Fragment) -> QbResult<()> {
        if self.group_by.is_empty() {
            return Ok(());
        }
        let parts = self
            .group_by
            .iter()
            .map(Column::compile)
            .collect::<QbResult<Vec<_>>>()?;
        f.push(" GROUP BY ").append(Fragment::join(parts, ", "));
        Ok(())
    }

    pub(super) fn push_order_by(&self, f: &mut Fragment) -> QbResult<()> {
        if self.order_by.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(self.order_by.len());
        for (column, direction) in &self.order_by {
            let mut part = column.compile()?;
            part.push(" ").push(direction.as_sql());
            parts.push(part);
        }
        f.push(" ORDER BY ").append(Fragment::join(parts, ", "));
        Ok(())
    }

    pub(super) fn compile_select(&self, columns: &[Column], distinct: bool) -> QbResult<Fragment> {
        let mut f = Fragment::raw("SELECT ");
        if distinct {
            f.push("DISTINCT ");
        }

        if columns.is_empty() {
            f.push("*");
        } else {
            let parts = columns
                .iter()
                .map(Column::compile)
                .collect::<QbResult<Vec<_>>>()?;
            f.append(Fragment::join(parts, ", "));
        }

        f.push(" FROM ");
        self.push_table(&mut f, "SELECT")?;

        for join in &self.joins {
            f.push(" ").push(&join.compile());
        }

        self.push_where(&mut f)?;
        self.push_group_by(&mut f)?;
        self.push_order_by(&mut f)?;

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                f.push(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => {
                f.push(&format!(" LIMIT {limit}"));
            }
            (None, Some(offset)) => {
                f.push(&format!(" LIMIT {NO_LIMIT} OFFSET {offset}"));
            }
            (None, None) => {}
        }

        Ok(f)
    }
}
