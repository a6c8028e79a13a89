//! WHERE clause tree.
//!
//! Conditions are stored as an explicit tree of [`WhereNode`]s. New nodes are
//! appended to the group addressed by a cursor (a stack of child indices from
//! the root). Nodes are never removed or reordered, so a cursor index stays
//! valid for the lifetime of the tree.
//!
//! Compilation walks the tree depth-first, pre-order, and returns a
//! [`Fragment`] per node. Parents concatenate their children's fragments, so
//! args come back in exactly the order their placeholders appear.

use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::ident::validate_expr;
use crate::query::Query;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Boolean connective placed before a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    And,
    Or,
}

impl Prefix {
    pub fn as_sql(self) -> &'static str {
        match self {
            Prefix::And => "AND",
            Prefix::Or => "OR",
        }
    }
}

/// A parsed comparison operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Scalar comparison: `=`, `<>`, `LIKE`, `IS NOT`, ...
    Compare(&'static str),
    /// `IN` / `NOT IN`
    In { negated: bool },
    /// `BETWEEN` / `NOT BETWEEN`
    Between { negated: bool },
    /// Set comparison against a sub-query: `= ALL`, `> ANY`, `<> SOME`, ...
    Set {
        op: &'static str,
        quantifier: &'static str,
    },
}

const SYMBOL_OPS: [&str; 8] = ["=", "!=", "<>", "<", "<=", ">", ">=", "<=>"];

const WORD_OPS: [&str; 6] = ["LIKE", "NOT LIKE", "REGEXP", "NOT REGEXP", "IS", "IS NOT"];

fn symbol_op(s: &str) -> Option<&'static str> {
    SYMBOL_OPS.iter().copied().find(|op| *op == s)
}

impl Operand {
    /// Parse an operand string (case-insensitive, whitespace-normalized).
    pub fn parse(raw: &str) -> QbResult<Self> {
        let normalized = raw
            .split_whitespace()
            .map(|w| w.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(op) = symbol_op(&normalized) {
            return Ok(Operand::Compare(op));
        }
        if let Some(op) = WORD_OPS.iter().copied().find(|op| *op == normalized) {
            return Ok(Operand::Compare(op));
        }

        match normalized.as_str() {
            "IN" => return Ok(Operand::In { negated: false }),
            "NOT IN" => return Ok(Operand::In { negated: true }),
            "BETWEEN" => return Ok(Operand::Between { negated: false }),
            "NOT BETWEEN" => return Ok(Operand::Between { negated: true }),
            _ => {}
        }

        for quantifier in ["ALL", "ANY", "SOME"] {
            if let Some(head) = normalized.strip_suffix(quantifier) {
                if let Some(op) = symbol_op(head.trim_end()) {
                    return Ok(Operand::Set { op, quantifier });
                }
            }
        }

        Err(QbError::InvalidOperand(raw.to_string()))
    }

    /// The operand as emitted in SQL.
    pub fn as_sql(&self) -> String {
        match self {
            Operand::Compare(op) => (*op).to_string(),
            Operand::In { negated: false } => "IN".to_string(),
            Operand::In { negated: true } => "NOT IN".to_string(),
            Operand::Between { negated: false } => "BETWEEN".to_string(),
            Operand::Between { negated: true } => "NOT BETWEEN".to_string(),
            Operand::Set { op, quantifier } => format!("{op} {quantifier}"),
        }
    }

    /// Whether this is a plain symbol comparison usable in a JOIN predicate.
    pub(crate) fn is_symbol_compare(&self) -> bool {
        matches!(self, Operand::Compare(op) if SYMBOL_OPS.contains(op))
    }
}

/// The right-hand side of a condition.
#[derive(Debug, Clone)]
pub enum WhereValue {
    /// A single bound value. `Null` renders as the bare `NULL` token.
    Scalar(Value),
    /// A list for `IN` / `BETWEEN`.
    List(Vec<Value>),
    /// An embedded sub-query.
    SubQuery(Box<Query>),
    /// SQL emitted verbatim (another column, `NOW()`, ...). Never bound.
    Literal(String),
}

impl WhereValue {
    fn kind(&self) -> &'static str {
        match self {
            WhereValue::Scalar(_) => "a scalar",
            WhereValue::List(_) => "a list",
            WhereValue::SubQuery(_) => "a sub-query",
            WhereValue::Literal(_) => "a literal",
        }
    }
}

macro_rules! impl_where_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for WhereValue {
                fn from(value: $ty) -> Self {
                    WhereValue::Scalar(Value::from(value))
                }
            }

            impl From<Option<$ty>> for WhereValue {
                fn from(value: Option<$ty>) -> Self {
                    WhereValue::Scalar(Value::from(value))
                }
            }

            impl From<Vec<$ty>> for WhereValue {
                fn from(values: Vec<$ty>) -> Self {
                    WhereValue::List(values.into_iter().map(Value::from).collect())
                }
            }
        )*
    };
}

impl_where_value_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
);

#[cfg(feature = "uuid")]
impl_where_value_from!(uuid::Uuid);

#[cfg(feature = "rust_decimal")]
impl_where_value_from!(rust_decimal::Decimal);

// Scalar only: a `Vec<u8>` is a byte string, not an `IN` list.
impl From<u8> for WhereValue {
    fn from(value: u8) -> Self {
        WhereValue::Scalar(Value::from(value))
    }
}

impl From<Option<u8>> for WhereValue {
    fn from(value: Option<u8>) -> Self {
        WhereValue::Scalar(Value::from(value))
    }
}

impl From<&str> for WhereValue {
    fn from(value: &str) -> Self {
        WhereValue::Scalar(Value::from(value))
    }
}

impl From<Option<&str>> for WhereValue {
    fn from(value: Option<&str>) -> Self {
        WhereValue::Scalar(Value::from(value))
    }
}

impl From<Vec<&str>> for WhereValue {
    fn from(values: Vec<&str>) -> Self {
        WhereValue::List(values.into_iter().map(Value::from).collect())
    }
}

impl From<Value> for WhereValue {
    fn from(value: Value) -> Self {
        WhereValue::Scalar(value)
    }
}

impl From<Vec<Value>> for WhereValue {
    fn from(values: Vec<Value>) -> Self {
        WhereValue::List(values)
    }
}

impl From<Query> for WhereValue {
    fn from(query: Query) -> Self {
        WhereValue::SubQuery(Box::new(query))
    }
}

/// A single `column operand value` condition.
#[derive(Debug, Clone)]
pub struct Condition {
    prefix: Prefix,
    column: String,
    operand: Operand,
    value: WhereValue,
}

impl Condition {
    /// Validate and create a condition.
    pub fn new(
        prefix: Prefix,
        column: &str,
        operand: &str,
        value: WhereValue,
    ) -> QbResult<Self> {
        validate_expr(column)?;
        let operand = Operand::parse(operand)?;
        let invalid = |message: String| {
            QbError::invalid_where_value(column, operand.as_sql(), message)
        };

        match (&operand, &value) {
            (Operand::In { .. }, WhereValue::List(_) | WhereValue::SubQuery(_)) => {}
            (Operand::In { .. }, other) => {
                return Err(invalid(format!(
                    "requires a list or sub-query, got {}",
                    other.kind()
                )));
            }
            (Operand::Between { .. }, WhereValue::List(values)) if values.len() == 2 => {}
            (Operand::Between { .. }, WhereValue::List(values)) => {
                return Err(invalid(format!(
                    "requires exactly two values, got {}",
                    values.len()
                )));
            }
            (Operand::Between { .. }, other) => {
                return Err(invalid(format!(
                    "requires a two-value list, got {}",
                    other.kind()
                )));
            }
            (Operand::Set { .. }, WhereValue::SubQuery(_)) => {}
            (Operand::Set { .. }, other) => {
                return Err(invalid(format!("requires a sub-query, got {}", other.kind())));
            }
            (Operand::Compare(_), WhereValue::Scalar(_) | WhereValue::Literal(_)) => {}
            (Operand::Compare(_), other) => {
                return Err(invalid(format!(
                    "requires a scalar or NULL, got {}",
                    other.kind()
                )));
            }
        }

        if let WhereValue::Literal(sql) = &value {
            if sql.trim().is_empty() {
                return Err(invalid("literal cannot be empty".to_string()));
            }
        }

        Ok(Self {
            prefix,
            column: column.to_string(),
            operand,
            value,
        })
    }

    fn compile(&self, first: bool) -> QbResult<Fragment> {
        let mut f = Fragment::new();
        if !first {
            f.push(self.prefix.as_sql()).push(" ");
        }

        if let (Operand::In { negated }, WhereValue::List(values)) = (&self.operand, &self.value) {
            if values.is_empty() {
                f.push(if *negated { "1=1" } else { "1=0" });
                return Ok(f);
            }
        }

        f.push(&self.column)
            .push(" ")
            .push(&self.operand.as_sql())
            .push(" ");

        match (&self.operand, &self.value) {
            (Operand::Between { .. }, WhereValue::List(values)) => {
                f.push_bind(&values[0]).push(" AND ").push_bind(&values[1]);
            }
            (_, WhereValue::List(values)) => {
                f.push("(").push_bind_list(values.iter()).push(")");
            }
            (_, WhereValue::SubQuery(query)) => {
                f.append(query.compile_subquery()?);
            }
            (_, WhereValue::Scalar(value)) => {
                f.push_bind(value);
            }
            (_, WhereValue::Literal(sql)) => {
                f.push(sql);
            }
        }
        Ok(f)
    }
}

/// A WHERE tree node: a leaf condition or a parenthesized group.
#[derive(Debug, Clone)]
pub enum WhereNode {
    Leaf(Condition),
    Group {
        prefix: Prefix,
        children: Vec<WhereNode>,
    },
}

impl WhereNode {
    fn is_empty(&self) -> bool {
        match self {
            WhereNode::Leaf(_) => false,
            WhereNode::Group { children, .. } => children.iter().all(WhereNode::is_empty),
        }
    }

    fn compile(&self, first: bool) -> QbResult<Fragment> {
        match self {
            WhereNode::Leaf(condition) => condition.compile(first),
            WhereNode::Group { prefix, children } => {
                let inner = compile_nodes(children)?;
                let mut f = Fragment::new();
                if inner.is_empty() {
                    return Ok(f);
                }
                if !first {
                    f.push(prefix.as_sql()).push(" ");
                }
                f.append_parenthesized(inner);
                Ok(f)
            }
        }
    }
}

/// Compile sibling nodes; the first node that emits anything drops its prefix.
fn compile_nodes(nodes: &[WhereNode]) -> QbResult<Fragment> {
    let mut parts = Vec::with_capacity(nodes.len());
    for node in nodes.iter().filter(|n| !n.is_empty()) {
        parts.push(node.compile(parts.is_empty())?);
    }
    Ok(Fragment::join(parts, " "))
}

/// The WHERE clause of a query.
#[derive(Debug, Clone, Default)]
pub struct WhereTree {
    root: Vec<WhereNode>,
    /// Child indices from the root to the group receiving new nodes.
    cursor: Vec<usize>,
}

impl WhereTree {
    /// Whether the tree would compile to nothing.
    pub(crate) fn is_empty(&self) -> bool {
        self.root.iter().all(WhereNode::is_empty)
    }

    /// Current nesting depth (0 at the root).
    #[cfg(test)]
    fn depth(&self) -> usize {
        self.cursor.len()
    }

    fn current_mut(&mut self) -> &mut Vec<WhereNode> {
        let mut nodes = &mut self.root;
        for &idx in &self.cursor {
            nodes = match &mut nodes[idx] {
                WhereNode::Group { children, .. } => children,
                WhereNode::Leaf(_) => unreachable!("where cursor always addresses a group"),
            };
        }
        nodes
    }

    /// Append a condition at the cursor.
    pub(crate) fn push(&mut self, condition: Condition) {
        self.current_mut().push(WhereNode::Leaf(condition));
    }

    /// Append an empty group at the cursor and move the cursor into it.
    pub(crate) fn open_group(&mut self, prefix: Prefix) {
        let nodes = self.current_mut();
        nodes.push(WhereNode::Group {
            prefix,
            children: Vec::new(),
        });
        let idx = nodes.len() - 1;
        self.cursor.push(idx);
    }

    /// Move the cursor back to the enclosing group.
    pub(crate) fn close_group(&mut self) {
        debug_assert!(!self.cursor.is_empty(), "close_group without open_group");
        self.cursor.pop();
    }

    /// Compile the tree without the `WHERE` keyword.
    pub(crate) fn compile(&self) -> QbResult<Fragment> {
        compile_nodes(&self.root)
    }
}
