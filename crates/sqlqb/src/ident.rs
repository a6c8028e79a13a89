//! Column name validation.
//!
//! Identifiers are emitted unescaped, so names used as INSERT/UPDATE keys are
//! checked before they are stored:
//!
//! - Unquoted parts must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Backtick-quoted parts allow anything except NUL and a bare backtick
//! - Parts are joined with `.` (`schema.table.column`)

use crate::error::{QbError, QbResult};

/// Validate a column (or qualified column) name used as an INSERT/UPDATE key.
pub fn validate_column(name: &str) -> QbResult<()> {
    if name.is_empty() {
        return Err(QbError::invalid_column("column name cannot be empty"));
    }
    if name.contains('\0') {
        return Err(QbError::invalid_column(format!(
            "column name cannot contain NUL: {name:?}"
        )));
    }

    let mut chars = name.chars().peekable();
    let mut parts = 0usize;

    while chars.peek().is_some() {
        if parts > 0 {
            match chars.next() {
                Some('.') if chars.peek().is_some() => {}
                Some('.') => {
                    return Err(QbError::invalid_column(format!(
                        "trailing '.' in column name: {name}"
                    )));
                }
                Some(c) => {
                    return Err(QbError::invalid_column(format!(
                        "unexpected '{c}' in column name: {name}"
                    )));
                }
                None => break,
            }
        }

        if chars.peek() == Some(&'`') {
            chars.next();
            let mut len = 0usize;
            loop {
                match chars.next() {
                    Some('`') => break,
                    Some(_) => len += 1,
                    None => {
                        return Err(QbError::invalid_column(format!(
                            "unclosed quoted identifier: {name}"
                        )));
                    }
                }
            }
            if len == 0 {
                return Err(QbError::invalid_column(format!(
                    "empty quoted identifier: {name}"
                )));
            }
            parts += 1;
            continue;
        }

        let mut len = 0usize;
        while let Some(&c) = chars.peek() {
            if c == '.' {
                break;
            }
            let ok = if len == 0 {
                c == '_' || c.is_ascii_alphabetic()
            } else {
                c == '_' || c == '$' || c.is_ascii_alphanumeric()
            };
            if !ok {
                return Err(QbError::invalid_column(format!(
                    "invalid character '{c}' in column name: {name}"
                )));
            }
            len += 1;
            chars.next();
        }
        if len == 0 {
            return Err(QbError::invalid_column(format!(
                "empty segment in column name: {name}"
            )));
        }
        parts += 1;
    }

    Ok(())
}

/// Validate a free-form expression (projection, GROUP BY, ORDER BY).
///
/// Expressions are developer-supplied SQL, so only emptiness is rejected.
pub(crate) fn validate_expr(expr: &str) -> QbResult<()> {
    if expr.trim().is_empty() {
        return Err(QbError::invalid_column("expression cannot be empty"));
    }
    Ok(())
}
