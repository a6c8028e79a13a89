//! SQL text paired with the args bound by its placeholders.
//!
//! Compilation returns a [`Fragment`] from every recursive step and callers
//! concatenate them. Text and args always travel together, so the n-th `?`
//! in the text is the n-th arg no matter how deeply a piece was nested.

use crate::value::Value;

/// A piece of compiled SQL and the args for its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub(crate) sql: String,
    pub(crate) args: Vec<Value>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment of raw SQL without args.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Whether no SQL has been emitted.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// The SQL text so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The args so far.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Append raw SQL (no args).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder bound to `value`.
    ///
    /// NULL is emitted as the bare `NULL` token and binds nothing.
    pub fn push_bind(&mut self, value: &Value) -> &mut Self {
        if value.is_null() {
            self.sql.push_str("NULL");
        } else {
            self.sql.push('?');
            self.args.push(value.clone());
        }
        self
    }

    /// Append a comma-separated placeholder list, one entry per value.
    pub fn push_bind_list<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(value);
        }
        self
    }

    /// Append another fragment, moving its args behind ours.
    pub fn append(&mut self, other: Fragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.args.extend(other.args);
        self
    }

    /// Append another fragment wrapped in parentheses.
    pub fn append_parenthesized(&mut self, other: Fragment) -> &mut Self {
        self.sql.push('(');
        self.append(other);
        self.sql.push(')');
        self
    }

    /// Join fragments with `sep`, keeping their args in the same order.
    pub fn join(parts: impl IntoIterator<Item = Fragment>, sep: &str) -> Fragment {
        let mut out = Fragment::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.sql.push_str(sep);
            }
            out.append(part);
        }
        out
    }

    /// Split into text and args.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}
