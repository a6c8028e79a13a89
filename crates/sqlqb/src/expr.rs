//! Projection expressions and string helpers.
//!
//! A [`Column`] is either a SQL expression string or an embedded [`Query`].
//! The helper functions build projection text only; they never bind args.
//!
//! ```ignore
//! use sqlqb::expr;
//!
//! let full_name = expr::aliased(&expr::concat_ws(" ", &["first_name", "last_name"]), "full_name");
//! // CONCAT_WS(' ', first_name, last_name) AS full_name
//! ```

use crate::error::QbResult;
use crate::fragment::Fragment;
use crate::ident::validate_expr;
use crate::query::Query;

/// A projected, grouped or ordered item.
#[derive(Debug, Clone)]
pub enum Column {
    /// SQL expression emitted as-is (`name`, `COUNT(*) AS n`, ...).
    Expr(String),
    /// Embedded sub-query, rendered as `(SELECT ...)[ AS alias]`.
    SubQuery(Box<Query>),
}

impl Column {
    pub(crate) fn validate(&self) -> QbResult<()> {
        match self {
            Column::Expr(expr) => validate_expr(expr),
            Column::SubQuery(_) => Ok(()),
        }
    }

    /// Compile the item, folding a sub-query's args in at its position.
    pub(crate) fn compile(&self) -> QbResult<Fragment> {
        match self {
            Column::Expr(expr) => Ok(Fragment::raw(expr.as_str())),
            Column::SubQuery(query) => query.compile_embedded(),
        }
    }
}

impl From<&str> for Column {
    fn from(expr: &str) -> Self {
        Column::Expr(expr.to_string())
    }
}

impl From<String> for Column {
    fn from(expr: String) -> Self {
        Column::Expr(expr)
    }
}

impl From<&String> for Column {
    fn from(expr: &String) -> Self {
        Column::Expr(expr.clone())
    }
}

impl From<Query> for Column {
    fn from(query: Query) -> Self {
        Column::SubQuery(Box::new(query))
    }
}

/// Quote a developer-supplied string literal (`'` and `\` are doubled).
fn quote(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 2);
    out.push('\'');
    for c in literal.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// `TRIM(expr)`
pub fn trim(expr: &str) -> String {
    format!("TRIM({expr})")
}

/// `DATE_FORMAT(expr, 'format')`
pub fn date_format(expr: &str, format: &str) -> String {
    format!("DATE_FORMAT({expr}, {})", quote(format))
}

/// `CONCAT(a, b, ...)`
pub fn concat(parts: &[&str]) -> String {
    format!("CONCAT({})", parts.join(", "))
}

/// `CONCAT_WS('sep', a, b, ...)`
pub fn concat_ws(separator: &str, parts: &[&str]) -> String {
    if parts.is_empty() {
        return format!("CONCAT_WS({})", quote(separator));
    }
    format!("CONCAT_WS({}, {})", quote(separator), parts.join(", "))
}

/// `COALESCE(a, b, ...)`
pub fn coalesce(parts: &[&str]) -> String {
    format!("COALESCE({})", parts.join(", "))
}

/// `COUNT(expr)`
pub fn count(expr: &str) -> String {
    format!("COUNT({expr})")
}

/// `expr AS alias`
pub fn aliased(expr: &str, alias: &str) -> String {
    format!("{expr} AS {alias}")
}

/// A quoted string literal for use inside projection text.
pub fn literal(value: &str) -> String {
    quote(value)
}
