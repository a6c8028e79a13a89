//! Error types for sqlqb

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sqlqb operations
pub type QbResult<T> = Result<T, QbError>;

/// Errors raised while building, compiling or executing a query.
///
/// Build-time variants are reported at the offending builder call (column,
/// value and operand checks) or by [`Query::build`](crate::Query::build)
/// (whole-query checks). The remaining variants come from the execution bridge.
#[derive(Debug, Error)]
pub enum QbError {
    /// `build()` called before a table was set
    #[error("Missing table: {0} query has no table")]
    MissingTable(&'static str),

    /// `build()` called before a statement kind was chosen
    #[error("Missing statement: choose select/insert/update/delete before building")]
    MissingStatement,

    /// A second statement kind was chosen on the same query
    #[error("Statement already set: query is already {current}, cannot switch to {requested}")]
    StatementAlreadySet {
        current: &'static str,
        requested: &'static str,
    },

    /// A column name is empty or not a valid identifier
    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    /// A bound value is neither a scalar nor NULL
    #[error("Non-scalar value for '{column}': {found}")]
    NonScalarValue { column: String, found: String },

    /// A WHERE value does not fit its operand
    #[error("Invalid WHERE value for '{column} {operand}': {message}")]
    InvalidWhereValue {
        column: String,
        operand: String,
        message: String,
    },

    /// An operand string is not a recognised comparison
    #[error("Invalid operand: '{0}'")]
    InvalidOperand(String),

    /// INSERT value count is not a multiple of the column count
    #[error("Row arity mismatch: {args} values for {columns} columns")]
    RowArityMismatch { args: usize, columns: usize },

    /// INSERT without any columns or rows
    #[error("Empty insert data")]
    EmptyInsertData,

    /// UPDATE without any SET pairs
    #[error("Empty update columns")]
    EmptyUpdateColumns,

    /// A clause that the statement kind cannot render
    #[error("{clause} is not supported in {statement} queries")]
    UnsupportedClause {
        clause: &'static str,
        statement: &'static str,
    },

    /// Execution bridge failure
    #[error("Execution error: {0}")]
    Execution(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bridge returned a result shape that does not match the statement kind
    #[error("Unexpected outcome: expected {expected}, got {got}")]
    UnexpectedOutcome {
        expected: &'static str,
        got: &'static str,
    },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl QbError {
    /// Create an invalid column error
    pub fn invalid_column(message: impl Into<String>) -> Self {
        Self::InvalidColumn(message.into())
    }

    /// Create an invalid WHERE value error
    pub fn invalid_where_value(
        column: impl Into<String>,
        operand: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidWhereValue {
            column: column.into(),
            operand: operand.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error was raised by the builder rather than the execution bridge
    pub fn is_build_error(&self) -> bool {
        !matches!(
            self,
            Self::Execution(_)
                | Self::NotFound(_)
                | Self::UnexpectedOutcome { .. }
                | Self::Timeout(_)
                | Self::Config(_)
        )
    }
}

impl From<toml::de::Error> for QbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
