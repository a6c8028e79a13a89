//! INSERT construction and compilation.

use super::{Query, SetValue, Statement, compile_assignments};
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::ident::validate_column;
use crate::value::Value;

type RowPairs = Vec<(String, Value)>;

fn collect_row<I, K, V>(row: I) -> RowPairs
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    row.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Lay rows out against the first row's columns.
///
/// Every later row must name exactly the first row's columns, in any order;
/// its values are reordered to the column order.
fn flatten_rows(rows: Vec<RowPairs>) -> QbResult<(Vec<String>, Vec<Value>)> {
    let mut rows = rows.into_iter();
    let first = match rows.next() {
        Some(first) if !first.is_empty() => first,
        _ => return Err(QbError::EmptyInsertData),
    };

    let mut columns = Vec::with_capacity(first.len());
    let mut values = Vec::with_capacity(first.len());
    for (column, value) in first {
        validate_column(&column)?;
        if columns.contains(&column) {
            return Err(QbError::invalid_column(format!(
                "duplicate insert column '{column}'"
            )));
        }
        columns.push(column);
        values.push(value);
    }

    for (i, row) in rows.enumerate() {
        let row_no = i + 1;
        for (column, _) in &row {
            validate_column(column)?;
            if !columns.contains(column) {
                return Err(QbError::invalid_column(format!(
                    "row {row_no} has unknown column '{column}'"
                )));
            }
        }

        if row.len() != columns.len() {
            return Err(QbError::RowArityMismatch {
                args: row.len(),
                columns: columns.len(),
            });
        }

        let mut row = row;
        for column in &columns {
            let pos = row.iter().position(|(c, _)| c == column).ok_or_else(|| {
                QbError::invalid_column(format!("row {row_no} has no value for column '{column}'"))
            })?;
            values.push(row.swap_remove(pos).1);
        }
    }

    Ok((columns, values))
}

fn json_row(index: usize, json: serde_json::Value) -> QbResult<RowPairs> {
    match json {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(column, value)| {
                let value = Value::from_json(&column, value)?;
                Ok((column, value))
            })
            .collect(),
        other => Err(QbError::invalid_column(format!(
            "insert row {index} must be an object keyed by column name, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Query {
    fn start_insert(&mut self, columns: Vec<String>, values: Vec<Value>) -> QbResult<&mut Self> {
        self.set_statement(Statement::Insert {
            columns,
            values,
            ignore: false,
            duplicate_key_update: Vec::new(),
        })?;
        Ok(self)
    }

    /// Choose an INSERT statement with one row of `(column, value)` pairs.
    pub fn insert<I, K, V>(&mut self, row: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = flatten_rows(vec![collect_row(row)])?;
        self.start_insert(columns, values)
    }

    /// Choose an INSERT statement with several rows.
    ///
    /// The first row fixes the column list; later rows are matched to it by name.
    pub fn insert_rows<R, I, K, V>(&mut self, rows: R) -> QbResult<&mut Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let rows = rows.into_iter().map(collect_row).collect();
        let (columns, values) = flatten_rows(rows)?;
        self.start_insert(columns, values)
    }

    /// Choose an INSERT statement from JSON: an object (one row) or an array of objects.
    ///
    /// Arrays or objects nested as column values are rejected.
    pub fn insert_json(&mut self, data: serde_json::Value) -> QbResult<&mut Self> {
        let rows = match data {
            serde_json::Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| json_row(i, item))
                .collect::<QbResult<Vec<_>>>()?,
            other => vec![json_row(0, other)?],
        };
        let (columns, values) = flatten_rows(rows)?;
        self.start_insert(columns, values)
    }

    /// Choose an INSERT statement with an explicit column list; add rows with [`Query::values`].
    pub fn insert_columns<I, S>(&mut self, columns: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for column in &columns {
            validate_column(column)?;
        }
        self.start_insert(columns, Vec::new())
    }

    /// Append one positional row to an INSERT.
    ///
    /// The row must carry one value per column.
    pub fn values<I, V>(&mut self, row: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        match &mut self.statement {
            Some(Statement::Insert {
                columns, values, ..
            }) => {
                let row: Vec<Value> = row.into_iter().map(Into::into).collect();
                if row.len() != columns.len() {
                    return Err(QbError::RowArityMismatch {
                        args: row.len(),
                        columns: columns.len(),
                    });
                }
                values.extend(row);
                Ok(self)
            }
            _ => Err(self.unsupported("VALUES")),
        }
    }

    /// Use `INSERT IGNORE`.
    pub fn ignore(&mut self) -> QbResult<&mut Self> {
        match &mut self.statement {
            Some(Statement::Insert { ignore, .. }) => {
                *ignore = true;
                Ok(self)
            }
            _ => Err(self.unsupported("IGNORE")),
        }
    }

    fn push_duplicate_key_update(&mut self, column: &str, value: SetValue) -> QbResult<&mut Self> {
        validate_column(column)?;
        match &mut self.statement {
            Some(Statement::Insert {
                duplicate_key_update,
                ..
            }) => {
                duplicate_key_update.push((column.to_string(), value));
                Ok(self)
            }
            _ => Err(self.unsupported("ON DUPLICATE KEY UPDATE")),
        }
    }

    /// Add `column = ?` to the ON DUPLICATE KEY UPDATE tail.
    pub fn on_duplicate_key_update(
        &mut self,
        column: &str,
        value: impl Into<Value>,
    ) -> QbResult<&mut Self> {
        self.push_duplicate_key_update(column, SetValue::Value(value.into()))
    }

    /// Add `column = <expr>` (raw SQL) to the ON DUPLICATE KEY UPDATE tail.
    pub fn on_duplicate_key_update_raw(&mut self, column: &str, expr: &str) -> QbResult<&mut Self> {
        self.push_duplicate_key_update(column, SetValue::Raw(expr.to_string()))
    }

    /// Add `column = VALUES(column)`: take the value the row tried to insert.
    pub fn on_duplicate_key_update_inserted(&mut self, column: &str) -> QbResult<&mut Self> {
        self.push_duplicate_key_update(column, SetValue::Raw(format!("VALUES({column})")))
    }

    pub(super) fn compile_insert(
        &self,
        columns: &[String],
        values: &[Value],
        ignore: bool,
        duplicate_key_update: &[(String, SetValue)],
    ) -> QbResult<Fragment> {
        let table = self.table_name("INSERT")?;

        if columns.is_empty() || values.is_empty() {
            return Err(QbError::EmptyInsertData);
        }
        if values.len() % columns.len() != 0 {
            return Err(QbError::RowArityMismatch {
                args: values.len(),
                columns: columns.len(),
            });
        }
        if !self.joins.is_empty() {
            return Err(self.unsupported("JOIN"));
        }
        if !self.where_tree.is_empty() {
            return Err(self.unsupported("WHERE"));
        }
        if !self.group_by.is_empty() {
            return Err(self.unsupported("GROUP BY"));
        }
        if !self.order_by.is_empty() {
            return Err(self.unsupported("ORDER BY"));
        }

        let mut f = Fragment::raw("INSERT ");
        if ignore {
            f.push("IGNORE ");
        }
        f.push("INTO ")
            .push(table)
            .push(" (")
            .push(&columns.join(", "))
            .push(") VALUES ");

        for (i, row) in values.chunks(columns.len()).enumerate() {
            if i > 0 {
                f.push(", ");
            }
            f.push("(").push_bind_list(row.iter()).push(")");
        }

        if !duplicate_key_update.is_empty() {
            f.push(" ON DUPLICATE KEY UPDATE ")
                .append(compile_assignments(duplicate_key_update));
        }

        Ok(f)
    }
}
