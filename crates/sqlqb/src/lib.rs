//! # sqlqb
//!
//! A fluent SQL query builder for MySQL-dialect statements.
//!
//! ## Features
//!
//! - **Positional binding**: every user value becomes a `?` placeholder; args come back in placeholder order
//! - **Nested WHERE groups**: AND/OR groups to any depth, with `IN`, `BETWEEN` and set comparisons
//! - **Sub-queries**: embed a [`Query`] as a column, a GROUP BY/ORDER BY item or a WHERE value
//! - **Multi-row INSERT**: with `INSERT IGNORE` and `ON DUPLICATE KEY UPDATE`
//! - **Bring your own driver**: implement [`Executor`] to run built queries
//! - **Query monitoring**: SQL logging, slow-query warnings and timeouts via [`InstrumentedExecutor`]
//!
//! ```ignore
//! use sqlqb::{Query, Value};
//!
//! // SELECT
//! let mut q = Query::new();
//! q.select(["id", "name"])?
//!     .from("users")
//!     .and_where("active", "=", 1)?
//!     .order_by("name")?
//!     .limit(10);
//! let users = q.fetch_all(&executor).await?;
//!
//! // INSERT
//! let id = sqlqb::insert([("name", Value::from("a")), ("age", Value::from(1))])?
//!     .into_table("t")
//!     .insert_id(&executor)
//!     .await?;
//!
//! // UPDATE
//! sqlqb::update("users")
//!     .set("status", "inactive")?
//!     .eq("id", user_id)?
//!     .execute(&executor)
//!     .await?;
//! ```

pub mod error;
pub mod executor;
pub mod expr;
pub mod fragment;
pub mod ident;
pub mod monitor;
pub mod query;
pub mod value;
pub mod where_tree;

pub use error::{QbError, QbResult};
pub use executor::{Executor, Outcome, Row, StatementKind};
pub use expr::Column;
pub use monitor::{InstrumentedExecutor, LogLevel, MonitorConfig, QueryStats};
pub use query::{
    BuiltQuery, Direction, Join, JoinKind, Query, SetValue, Statement, delete, insert, insert_rows,
    select, select_distinct, update,
};
pub use value::Value;
pub use where_tree::{Operand, Prefix, WhereValue};
