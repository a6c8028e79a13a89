//! Query monitoring: SQL logging, slow-query warnings, timeouts and counters.
//!
//! [`InstrumentedExecutor`] wraps any [`Executor`] and applies a
//! [`MonitorConfig`] to every statement it runs.
//!
//! ```ignore
//! use sqlqb::{InstrumentedExecutor, MonitorConfig};
//! use std::time::Duration;
//!
//! let exec = InstrumentedExecutor::new(bridge).with_config(
//!     MonitorConfig::new()
//!         .with_query_timeout(Duration::from_secs(5))
//!         .with_slow_query_threshold(Duration::from_millis(200)),
//! );
//! let rows = query.fetch_all(&exec).await?;
//! ```

use crate::error::{QbError, QbResult};
use crate::executor::{Executor, Outcome, StatementKind};
use crate::query::BuiltQuery;
use serde::{Deserialize, Deserializer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Level for the per-statement SQL event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}

fn default_max_sql_length() -> Option<usize> {
    Some(200)
}

/// Configuration for query monitoring and timeouts.
///
/// Durations are written in milliseconds when loaded from TOML:
///
/// ```toml
/// query_timeout_ms = 5000
/// slow_query_threshold_ms = 200
/// max_sql_length = 500
/// log_args = false
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Query timeout. `None` means no timeout (default).
    #[serde(rename = "query_timeout_ms", deserialize_with = "millis")]
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are logged at WARN.
    #[serde(rename = "slow_query_threshold_ms", deserialize_with = "millis")]
    pub slow_query_threshold: Option<Duration>,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: Option<usize>,
    /// Include bound args in the SQL event.
    pub log_args: bool,
    /// Level for the SQL event.
    pub level: LogLevel,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            slow_query_threshold: None,
            max_sql_length: default_max_sql_length(),
            log_args: false,
            level: LogLevel::Debug,
        }
    }
}

impl MonitorConfig {
    /// Create a configuration with defaults (no timeout, no slow-query threshold).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> QbResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Set the query timeout.
    ///
    /// Statements exceeding this duration are abandoned and return [`QbError::Timeout`].
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Set the slow query threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Set the maximum logged SQL length.
    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log bound args alongside the SQL.
    pub fn with_log_args(mut self, log_args: bool) -> Self {
        self.log_args = log_args;
        self
    }

    /// Set the level of the SQL event.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

#[cfg(any(feature = "tracing", test))]
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Collected query statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStats {
    /// Total number of statements executed.
    pub total_queries: u64,
    /// Statements that returned an error (timeouts included).
    pub failed_queries: u64,
    /// Statements abandoned after the query timeout.
    pub timed_out_queries: u64,
    /// Statements slower than the slow query threshold.
    pub slow_queries: u64,
    /// Total execution time.
    pub total_duration: Duration,
}

#[derive(Debug, Default)]
struct StatsCounters {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    timed_out_queries: AtomicU64,
    slow_queries: AtomicU64,
    total_duration_nanos: AtomicU64,
}

/// An executor wrapper that logs, times out and counts every statement.
#[derive(Debug)]
pub struct InstrumentedExecutor<E> {
    inner: E,
    config: MonitorConfig,
    stats: StatsCounters,
}

impl<E: Executor> InstrumentedExecutor<E> {
    /// Wrap an executor with the default configuration.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            config: MonitorConfig::default(),
            stats: StatsCounters::default(),
        }
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get a reference to the inner executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Get the inner executor, consuming this wrapper.
    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.stats.total_queries.load(Ordering::Relaxed),
            failed_queries: self.stats.failed_queries.load(Ordering::Relaxed),
            timed_out_queries: self.stats.timed_out_queries.load(Ordering::Relaxed),
            slow_queries: self.stats.slow_queries.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(
                self.stats.total_duration_nanos.load(Ordering::Relaxed),
            ),
        }
    }

    /// Reset all statistics.
    pub fn reset_stats(&self) {
        self.stats.total_queries.store(0, Ordering::Relaxed);
        self.stats.failed_queries.store(0, Ordering::Relaxed);
        self.stats.timed_out_queries.store(0, Ordering::Relaxed);
        self.stats.slow_queries.store(0, Ordering::Relaxed);
        self.stats.total_duration_nanos.store(0, Ordering::Relaxed);
    }

    fn is_slow(&self, duration: Duration) -> bool {
        self.config
            .slow_query_threshold
            .is_some_and(|threshold| duration > threshold)
    }

    fn record(&self, duration: Duration, result: &QbResult<Outcome>) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.stats.total_queries.fetch_add(1, Ordering::Relaxed);
        self.stats
            .total_duration_nanos
            .fetch_add(nanos, Ordering::Relaxed);
        if self.is_slow(duration) {
            self.stats.slow_queries.fetch_add(1, Ordering::Relaxed);
        }
        match result {
            Ok(_) => {}
            Err(QbError::Timeout(_)) => {
                self.stats.failed_queries.fetch_add(1, Ordering::Relaxed);
                self.stats.timed_out_queries.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.stats.failed_queries.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[cfg(feature = "tracing")]
    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    #[cfg(feature = "tracing")]
    fn emit(&self, query: &BuiltQuery, kind: StatementKind, duration: Duration, result: &QbResult<Outcome>) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    LogLevel::Error => tracing::error!($($field)*),
                    LogLevel::Warn => tracing::warn!($($field)*),
                    LogLevel::Info => tracing::info!($($field)*),
                    LogLevel::Debug => tracing::debug!($($field)*),
                    LogLevel::Trace => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(&query.sql);
        let sql = sql.as_ref();
        let kind = kind.as_str();
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let outcome = match result {
            Ok(outcome) => outcome.kind(),
            Err(QbError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };

        if self.config.log_args {
            let args = tracing::field::debug(&query.args);
            emit_at_level!(self.config.level, target: "sqlqb.sql", kind, sql, args, duration_ms, outcome, "sql");
        } else {
            let args = query.args.len();
            emit_at_level!(self.config.level, target: "sqlqb.sql", kind, sql, args, duration_ms, outcome, "sql");
        }

        if self.is_slow(duration) {
            tracing::warn!(target: "sqlqb.sql", kind, sql, duration_ms, "slow query");
        }
        if let Err(err) = result {
            tracing::debug!(target: "sqlqb.sql", kind, error = %err, "query failed");
        }
    }

    #[cfg(not(feature = "tracing"))]
    fn emit(&self, _: &BuiltQuery, _: StatementKind, _: Duration, _: &QbResult<Outcome>) {}
}

impl<E: Executor> Executor for InstrumentedExecutor<E> {
    async fn execute(&self, query: &BuiltQuery, fetch_single: bool) -> QbResult<Outcome> {
        let kind = query.kind();
        let start = Instant::now();
        let future = self.inner.execute(query, fetch_single);
        let result = match self.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .unwrap_or(Err(QbError::Timeout(timeout))),
            None => future.await,
        };
        let duration = start.elapsed();

        self.record(duration, &result);
        self.emit(query, kind, duration, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::select;
    use crate::value::Value;

    struct DelayedExecutor {
        delay: Duration,
        outcome: QbResult<Outcome>,
    }

    impl DelayedExecutor {
        fn new(delay: Duration, outcome: QbResult<Outcome>) -> Self {
            Self { delay, outcome }
        }
    }

    impl Executor for DelayedExecutor {
        async fn execute(&self, _: &BuiltQuery, _: bool) -> QbResult<Outcome> {
            tokio::time::sleep(self.delay).await;
            match &self.outcome {
                Ok(outcome) => Ok(outcome.clone()),
                Err(err) => Err(QbError::execution(err.to_string())),
            }
        }
    }

    fn built() -> BuiltQuery {
        BuiltQuery::new("SELECT id FROM users WHERE id = ?", vec![Value::Int(1)])
    }

    #[test]
    fn test_config_defaults_and_builders() {
        let config = MonitorConfig::new();
        assert_eq!(config.query_timeout, None);
        assert_eq!(config.max_sql_length, Some(200));
        assert_eq!(config.level, LogLevel::Debug);

        let config = config
            .with_query_timeout(Duration::from_secs(2))
            .with_slow_query_threshold(Duration::from_millis(50))
            .no_truncate()
            .with_log_args(true);
        assert_eq!(config.query_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.slow_query_threshold, Some(Duration::from_millis(50)));
        assert_eq!(config.max_sql_length, None);
        assert!(config.log_args);
    }

    #[test]
    fn test_config_from_toml() {
        let config = MonitorConfig::from_toml_str(
            r#"
query_timeout_ms = 1500
slow_query_threshold_ms = 100
log_args = true
level = "info"
"#,
        )
        .unwrap();
        assert_eq!(config.query_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.slow_query_threshold, Some(Duration::from_millis(100)));
        assert_eq!(config.max_sql_length, Some(200));
        assert!(config.log_args);
        assert_eq!(config.level, LogLevel::Info);

        assert_eq!(MonitorConfig::from_toml_str("").unwrap(), MonitorConfig::default());

        let err = MonitorConfig::from_toml_str("query_timeout = 5").unwrap_err();
        assert!(matches!(err, QbError::Config(_)));
    }

    #[test]
    fn test_truncate_sql_bytes_char_boundary() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; never split it
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_error() {
        let exec = InstrumentedExecutor::new(DelayedExecutor::new(
            Duration::from_millis(200),
            Ok(Outcome::Affected(1)),
        ))
        .with_config(MonitorConfig::new().with_query_timeout(Duration::from_millis(10)));

        let err = exec.execute(&built(), false).await.unwrap_err();
        assert!(err.is_timeout());

        let stats = exec.stats();
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.failed_queries, 1);
        assert_eq!(stats.timed_out_queries, 1);
    }

    #[tokio::test]
    async fn test_slow_query_counted() {
        let exec = InstrumentedExecutor::new(DelayedExecutor::new(
            Duration::from_millis(20),
            Ok(Outcome::Rows(vec![])),
        ))
        .with_config(MonitorConfig::new().with_slow_query_threshold(Duration::from_millis(1)));

        let mut q = select(["id"]).unwrap();
        q.from("users");
        assert!(q.fetch_all(&exec).await.unwrap().is_empty());

        let stats = exec.stats();
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.slow_queries, 1);
        assert_eq!(stats.failed_queries, 0);

        exec.reset_stats();
        assert_eq!(exec.stats(), QueryStats::default());
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let exec = InstrumentedExecutor::new(DelayedExecutor::new(
            Duration::ZERO,
            Err(QbError::execution("connection reset")),
        ));

        let err = exec.execute(&built(), false).await.unwrap_err();
        assert!(matches!(err, QbError::Execution(ref m) if m.contains("connection reset")));
        assert_eq!(exec.stats().failed_queries, 1);
        assert_eq!(exec.stats().timed_out_queries, 0);
    }
}
