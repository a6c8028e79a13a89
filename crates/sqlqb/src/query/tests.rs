//! Builder and compiler tests for the query module.

use super::*;
use crate::expr;
use serde_json::json;

fn users_select(columns: &[&str]) -> Query {
    let mut q = select(columns.iter().copied()).unwrap();
    q.from("users");
    q
}

// ==================== SELECT ====================

#[test]
fn test_select_scenario() {
    let mut q = Query::new();
    q.select(["id", "name"])
        .unwrap()
        .from("users")
        .and_where("active", "=", 1)
        .unwrap()
        .order_by("name")
        .unwrap()
        .limit(10);

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id, name FROM users WHERE active = ? ORDER BY name ASC LIMIT 10"
    );
    assert_eq!(built.args, vec![Value::Int(1)]);
}

#[test]
fn test_select_star_when_no_columns() {
    let mut q = Query::new();
    q.select(Vec::<&str>::new()).unwrap().from("users");
    assert_eq!(q.to_sql(), "SELECT * FROM users");
}

#[test]
fn test_select_distinct_and_alias() {
    let mut q = select_distinct(["u.country"]).unwrap();
    q.from("users").table_alias("u");
    assert_eq!(q.to_sql(), "SELECT DISTINCT u.country FROM users AS u");

    let mut q = users_select(&["id"]);
    q.distinct().unwrap();
    assert_eq!(q.to_sql(), "SELECT DISTINCT id FROM users");
}

#[test]
fn test_add_select_with_helpers() {
    let mut q = users_select(&["id"]);
    q.add_select(expr::aliased(&expr::trim("name"), "name"))
        .unwrap()
        .add_select(expr::aliased(
            &expr::date_format("created_at", "%Y-%m"),
            "month",
        ))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        "SELECT id, TRIM(name) AS name, DATE_FORMAT(created_at, '%Y-%m') AS month FROM users"
    );
}

#[test]
fn test_joins() {
    let mut q = select(["u.id", "o.total"]).unwrap();
    q.from("users")
        .table_alias("u")
        .inner_join("orders o", "o.user_id", "=", "u.id")
        .unwrap()
        .left_join("refunds r", "r.order_id", "=", "o.id")
        .unwrap()
        .and_where("o.total", ">", 100)
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT u.id, o.total FROM users AS u \
         INNER JOIN orders o ON o.user_id = u.id \
         LEFT JOIN refunds r ON r.order_id = o.id \
         WHERE o.total > ?"
    );
    assert_eq!(built.args, vec![Value::Int(100)]);
}

#[test]
fn test_join_rejects_word_operand() {
    let mut q = users_select(&["id"]);
    let err = q.right_join("orders", "orders.user_id", "LIKE", "users.id").unwrap_err();
    assert!(matches!(err, QbError::InvalidOperand(_)));

    let err = q.inner_join("orders", "orders.user_id", "~~", "users.id").unwrap_err();
    assert!(matches!(err, QbError::InvalidOperand(_)));
}

#[test]
fn test_limit_offset_and_paginate() {
    let mut q = users_select(&["id"]);
    q.limit_offset(20, Some(40));
    assert_eq!(q.to_sql(), "SELECT id FROM users LIMIT 20 OFFSET 40");

    let mut q = users_select(&["id"]);
    q.paginate(3, 25);
    assert_eq!(q.to_sql(), "SELECT id FROM users LIMIT 25 OFFSET 50");

    let mut q = users_select(&["id"]);
    q.paginate(0, 0);
    assert_eq!(q.to_sql(), "SELECT id FROM users LIMIT 1 OFFSET 0");

    let mut q = users_select(&["id"]);
    q.offset(5);
    assert_eq!(
        q.to_sql(),
        "SELECT id FROM users LIMIT 18446744073709551615 OFFSET 5"
    );
}

#[test]
fn test_group_by_and_order_by() {
    let mut q = select(["country", "COUNT(*) AS n"]).unwrap();
    q.from("users")
        .group_by("country")
        .unwrap()
        .order_by_desc("n")
        .unwrap()
        .order_by_dir("country", Direction::Asc)
        .unwrap();
    assert_eq!(
        q.to_sql(),
        "SELECT country, COUNT(*) AS n FROM users GROUP BY country ORDER BY n DESC, country ASC"
    );
}

// ==================== WHERE ====================

#[test]
fn test_nested_group() {
    let mut q = users_select(&["id"]);
    q.and_where("c", "=", 3)
        .unwrap()
        .where_group(|q| {
            q.and_where("a", "=", 1)?.or_where("b", "=", 2)?;
            Ok(())
        })
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM users WHERE c = ? AND (a = ? OR b = ?)"
    );
    assert_eq!(built.args, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_group_first_drops_prefix() {
    let mut q = users_select(&["id"]);
    q.or_where_group(|q| {
        q.or_where("a", "=", 1)?.and_where("b", "=", 2)?;
        Ok(())
    })
    .unwrap()
    .or_where("c", "=", 3)
    .unwrap();

    assert_eq!(
        q.to_sql(),
        "SELECT id FROM users WHERE (a = ? AND b = ?) OR c = ?"
    );
}

#[test]
fn test_empty_group_is_skipped() {
    let mut q = users_select(&["id"]);
    q.where_group(|_| Ok(())).unwrap().and_where("a", "=", 1).unwrap();
    assert_eq!(q.to_sql(), "SELECT id FROM users WHERE a = ?");

    let mut q = users_select(&["id"]);
    q.where_group(|_| Ok(())).unwrap();
    assert_eq!(q.to_sql(), "SELECT id FROM users");
}

#[test]
fn test_deeply_nested_groups_with_null() {
    let mut q = users_select(&["id"]);
    q.and_where("a", "=", 1)
        .unwrap()
        .where_group(|q| {
            q.and_where("b", "=", 2)?.or_where_group(|q| {
                q.and_where("c", "=", Option::<i32>::None)?
                    .and_where("d", "IS", Value::Null)?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM users WHERE a = ? AND (b = ? OR (c = NULL AND d IS NULL))"
    );
    assert_eq!(built.args, vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(built.placeholder_count(), built.args.len());
}

#[test]
fn test_group_error_closes_group() {
    let mut q = users_select(&["id"]);
    let err = q
        .where_group(|q| {
            q.and_where("a", "=", 1)?;
            q.and_where("b", "IN", 2)?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, QbError::InvalidWhereValue { .. }));

    // the failed group is closed, so this lands at the top level
    q.and_where("c", "=", 3).unwrap();
    assert_eq!(q.to_sql(), "SELECT id FROM users WHERE (a = ?) AND c = ?");
}

#[test]
fn test_is_null_helpers() {
    let mut q = users_select(&["id"]);
    q.is_null("deleted_at").unwrap().is_not_null("email").unwrap();
    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM users WHERE deleted_at IS NULL AND email IS NOT NULL"
    );
    assert!(built.args.is_empty());
}

#[test]
fn test_in_list_and_between() {
    let mut q = users_select(&["id"]);
    q.in_list("status", vec!["a", "b"])
        .unwrap()
        .and_where("age", "between", vec![18, 30])
        .unwrap()
        .and_where("id", "not in", vec![Value::Int(9), Value::Null])
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM users WHERE status IN (?, ?) AND age BETWEEN ? AND ? AND id NOT IN (?, NULL)"
    );
    assert_eq!(
        built.args,
        vec![
            Value::from("a"),
            Value::from("b"),
            Value::Int(18),
            Value::Int(30),
            Value::Int(9),
        ]
    );
}

#[test]
fn test_empty_in_list() {
    let mut q = users_select(&["id"]);
    q.in_list("id", Vec::<i64>::new())
        .unwrap()
        .and_where("x", "NOT IN", Vec::<i64>::new())
        .unwrap();
    let built = q.build().unwrap();
    assert_eq!(built.sql, "SELECT id FROM users WHERE 1=0 AND 1=1");
    assert!(built.args.is_empty());
}

#[test]
fn test_where_value_shape_errors() {
    let mut q = users_select(&["id"]);
    assert!(matches!(
        q.and_where("a", "BETWEEN", vec![1]).unwrap_err(),
        QbError::InvalidWhereValue { .. }
    ));
    assert!(matches!(
        q.and_where("a", "=", vec![1, 2]).unwrap_err(),
        QbError::InvalidWhereValue { .. }
    ));
    assert!(matches!(
        q.and_where("a", "= ALL", 1).unwrap_err(),
        QbError::InvalidWhereValue { .. }
    ));
    assert!(matches!(
        q.and_where("a", "=~", 1).unwrap_err(),
        QbError::InvalidOperand(_)
    ));
    assert!(matches!(
        q.and_where("", "=", 1).unwrap_err(),
        QbError::InvalidColumn(_)
    ));
    // nothing was recorded
    assert_eq!(q.to_sql(), "SELECT id FROM users");
}

#[test]
fn test_where_literal() {
    let mut q = users_select(&["id"]);
    q.and_where_literal("updated_at", ">", "created_at")
        .unwrap()
        .or_where_literal("expires_at", "<", "NOW()")
        .unwrap();
    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM users WHERE updated_at > created_at OR expires_at < NOW()"
    );
    assert!(built.args.is_empty());
}

// ==================== Sub-queries ====================

#[test]
fn test_subquery_projection_args_come_first() {
    let mut sub = select(["COUNT(*)"]).unwrap();
    sub.from("orders")
        .and_where("orders.user_id", "=", 7)
        .unwrap()
        .alias("order_count");

    let mut q = select([Column::from("id"), Column::from(sub)]).unwrap();
    q.from("users").and_where("active", "=", true).unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id, (SELECT COUNT(*) FROM orders WHERE orders.user_id = ?) AS order_count \
         FROM users WHERE active = ?"
    );
    assert_eq!(built.args, vec![Value::Int(7), Value::Bool(true)]);
}

#[test]
fn test_subquery_in_where() {
    let mut banned = select(["user_id"]).unwrap();
    banned.from("bans").and_where("reason", "=", "spam").unwrap();

    let mut q = users_select(&["id"]);
    q.and_where("age", ">", 18)
        .unwrap()
        .and_where("id", "NOT IN", banned)
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM users WHERE age > ? AND id NOT IN (SELECT user_id FROM bans WHERE reason = ?)"
    );
    assert_eq!(built.args, vec![Value::Int(18), Value::from("spam")]);
}

#[test]
fn test_set_comparison_with_subquery() {
    let mut prices = select(["price"]).unwrap();
    prices.from("products").and_where("category", "=", 2).unwrap();

    let mut q = select(["id"]).unwrap();
    q.from("products").and_where("price", ">= all", prices).unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT id FROM products WHERE price >= ALL (SELECT price FROM products WHERE category = ?)"
    );
    assert_eq!(built.args, vec![Value::Int(2)]);
}

#[test]
fn test_subquery_group_and_order_items() {
    let mut rank = select(["MAX(score)"]).unwrap();
    rank.from("scores")
        .and_where("scores.kind", "=", "daily")
        .unwrap();

    let mut bucket = select(["region"]).unwrap();
    bucket.from("regions").and_where("regions.code", "=", "eu").unwrap();

    let mut q = select(["team"]).unwrap();
    q.from("teams")
        .and_where("active", "=", 1)
        .unwrap()
        .group_by(bucket)
        .unwrap()
        .order_by_desc(rank)
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "SELECT team FROM teams WHERE active = ? \
         GROUP BY (SELECT region FROM regions WHERE regions.code = ?) \
         ORDER BY (SELECT MAX(score) FROM scores WHERE scores.kind = ?) DESC"
    );
    assert_eq!(
        built.args,
        vec![Value::Int(1), Value::from("eu"), Value::from("daily")]
    );
}

#[test]
fn test_subquery_errors_propagate() {
    let sub = Query::new();
    let mut q = users_select(&["id"]);
    q.and_where("id", "IN", sub).unwrap();
    assert!(matches!(q.build().unwrap_err(), QbError::MissingStatement));
    assert_eq!(q.to_sql(), "");
}

#[test]
fn test_only_select_can_be_embedded() {
    let mut sub = delete("bans");
    sub.eq("x", 1).unwrap();
    let mut q = users_select(&["id"]);
    q.and_where("id", "IN", sub).unwrap();
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::UnsupportedClause {
            clause: "sub-query",
            statement: "DELETE"
        }
    ));

    let mut sub = update("users");
    sub.set("a", 1).unwrap();
    let mut q = select([Column::from("id"), Column::from(sub)]).unwrap();
    q.from("users");
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::UnsupportedClause {
            clause: "sub-query",
            statement: "UPDATE"
        }
    ));

    let mut q = users_select(&["id"]);
    q.order_by(insert([("a", Value::Int(1))]).unwrap()).unwrap();
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::UnsupportedClause {
            clause: "sub-query",
            statement: "INSERT"
        }
    ));
}

// ==================== INSERT ====================

#[test]
fn test_insert_scenario() {
    let mut q = insert([("name", Value::from("a")), ("age", Value::from(1))]).unwrap();
    q.into_table("t");

    let built = q.build().unwrap();
    assert_eq!(built.sql, "INSERT INTO t (name, age) VALUES (?, ?)");
    assert_eq!(built.args, vec![Value::from("a"), Value::Int(1)]);
}

#[test]
fn test_insert_rows_aligns_by_name() {
    let rows = vec![
        vec![("a", Value::Int(1)), ("b", Value::Int(2))],
        vec![("b", Value::Int(4)), ("a", Value::Int(3))],
    ];
    let mut q = insert_rows(rows).unwrap();
    q.into_table("t");

    let built = q.build().unwrap();
    assert_eq!(built.sql, "INSERT INTO t (a, b) VALUES (?, ?), (?, ?)");
    assert_eq!(
        built.args,
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn test_insert_arity() {
    let mut ok = Query::new();
    ok.insert_columns(["a", "b", "c"])
        .unwrap()
        .into_table("t")
        .values([1, 2, 3])
        .unwrap()
        .values([4, 5, 6])
        .unwrap();
    let built = ok.build().unwrap();
    assert_eq!(built.sql, "INSERT INTO t (a, b, c) VALUES (?, ?, ?), (?, ?, ?)");
    assert_eq!(built.args.len(), 6);

    let mut bad = Query::new();
    bad.insert_columns(["a", "b", "c"])
        .unwrap()
        .into_table("t")
        .values([1, 2, 3])
        .unwrap();
    assert!(matches!(
        bad.values([4, 5]).unwrap_err(),
        QbError::RowArityMismatch { args: 2, columns: 3 }
    ));
    // the short row was not recorded
    assert_eq!(bad.build().unwrap().args.len(), 3);
}

#[test]
fn test_insert_arity_checked_at_build() {
    let mut q = Query::new();
    q.into_table("t").statement = Some(Statement::Insert {
        columns: vec!["a".into(), "b".into(), "c".into()],
        values: (1..=5).map(Value::Int).collect(),
        ignore: false,
        duplicate_key_update: Vec::new(),
    });
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::RowArityMismatch { args: 5, columns: 3 }
    ));
}

#[test]
fn test_insert_rows_short_row_is_arity_error() {
    let rows = vec![
        vec![("a", Value::Int(1)), ("b", Value::Int(2))],
        vec![("a", Value::Int(3))],
    ];
    assert!(matches!(
        insert_rows(rows).unwrap_err(),
        QbError::RowArityMismatch { args: 1, columns: 2 }
    ));
}

#[test]
fn test_insert_rows_half_rows_do_not_merge() {
    let rows = vec![
        vec![("a", Value::Int(1)), ("b", Value::Int(2))],
        vec![("b", Value::Int(20))],
        vec![("a", Value::Int(30))],
    ];
    assert!(matches!(
        insert_rows(rows).unwrap_err(),
        QbError::RowArityMismatch { args: 1, columns: 2 }
    ));
}

#[test]
fn test_insert_rows_empty_later_row() {
    let rows = vec![vec![("a", Value::Int(1))], vec![]];
    assert!(matches!(
        insert_rows(rows).unwrap_err(),
        QbError::RowArityMismatch { args: 0, columns: 1 }
    ));

    let mut q = Query::new();
    q.insert_columns(["a"]).unwrap().into_table("t");
    assert!(matches!(
        q.values(Vec::<Value>::new()).unwrap_err(),
        QbError::RowArityMismatch { args: 0, columns: 1 }
    ));
}

#[test]
fn test_insert_rows_unknown_column() {
    let rows = vec![
        vec![("a", Value::Int(1))],
        vec![("z", Value::Int(2))],
    ];
    assert!(matches!(
        insert_rows(rows).unwrap_err(),
        QbError::InvalidColumn(_)
    ));
}

#[test]
fn test_insert_null_renders_literal() {
    let mut q = insert([("name", Value::from("a")), ("bio", Value::Null)]).unwrap();
    q.into_table("t");
    let built = q.build().unwrap();
    assert_eq!(built.sql, "INSERT INTO t (name, bio) VALUES (?, NULL)");
    assert_eq!(built.args, vec![Value::from("a")]);
}

#[test]
fn test_insert_json() {
    let mut q = Query::new();
    q.insert_json(json!([
        {"name": "a", "age": 1},
        {"age": 2, "name": "b"}
    ]))
    .unwrap()
    .into_table("people");

    let built = q.build().unwrap();
    assert_eq!(built.sql, "INSERT INTO people (name, age) VALUES (?, ?), (?, ?)");
    assert_eq!(
        built.args,
        vec![
            Value::from("a"),
            Value::Int(1),
            Value::from("b"),
            Value::Int(2)
        ]
    );
}

#[test]
fn test_insert_json_rejects_non_scalars() {
    let mut q = Query::new();
    let err = q.insert_json(json!({"name": "a", "tags": ["x"]})).unwrap_err();
    assert!(matches!(err, QbError::NonScalarValue { ref column, .. } if column == "tags"));

    let mut q = Query::new();
    let err = q.insert_json(json!({"meta": {"k": 1}})).unwrap_err();
    assert!(matches!(err, QbError::NonScalarValue { .. }));

    let mut q = Query::new();
    assert!(matches!(
        q.insert_json(json!([1, 2])).unwrap_err(),
        QbError::InvalidColumn(_)
    ));

    let mut q = Query::new();
    assert!(matches!(
        q.insert_json(json!([])).unwrap_err(),
        QbError::EmptyInsertData
    ));
}

#[test]
fn test_insert_ignore_and_duplicate_key_update() {
    let mut q = insert([("id", Value::Int(1)), ("hits", Value::Int(1))]).unwrap();
    q.into_table("counters")
        .ignore()
        .unwrap()
        .on_duplicate_key_update("updated_by", "job")
        .unwrap()
        .on_duplicate_key_update_raw("hits", "hits + 1")
        .unwrap()
        .on_duplicate_key_update_inserted("id")
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "INSERT IGNORE INTO counters (id, hits) VALUES (?, ?) \
         ON DUPLICATE KEY UPDATE updated_by = ?, hits = hits + 1, id = VALUES(id)"
    );
    assert_eq!(
        built.args,
        vec![Value::Int(1), Value::Int(1), Value::from("job")]
    );
}

#[test]
fn test_insert_rejects_where() {
    let mut q = insert([("a", Value::Int(1))]).unwrap();
    q.into_table("t").and_where("a", "=", 1).unwrap();
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::UnsupportedClause {
            clause: "WHERE",
            statement: "INSERT"
        }
    ));
}

#[test]
fn test_insert_duplicate_column() {
    let err = insert([("a", Value::Int(1)), ("a", Value::Int(2))]).unwrap_err();
    assert!(matches!(err, QbError::InvalidColumn(_)));
}

// ==================== UPDATE ====================

#[test]
fn test_update_set_args_before_where_args() {
    let mut q = update("users");
    q.set("name", "bob")
        .unwrap()
        .set("age", 30)
        .unwrap()
        .set_raw("version", "version + 1")
        .unwrap()
        .and_where("id", "=", 5)
        .unwrap();

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "UPDATE users SET name = ?, age = ?, version = version + 1 WHERE id = ?"
    );
    assert_eq!(
        built.args,
        vec![Value::from("bob"), Value::Int(30), Value::Int(5)]
    );
}

#[test]
fn test_update_null_and_tail() {
    let mut q = Query::new();
    q.update("sessions")
        .unwrap()
        .set("token", Value::Null)
        .unwrap()
        .set_opt("note", Option::<&str>::None)
        .unwrap()
        .and_where("expires_at", "<", "2024-01-01")
        .unwrap()
        .order_by("expires_at")
        .unwrap()
        .limit_offset(100, Some(10));

    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "UPDATE sessions SET token = NULL WHERE expires_at < ? ORDER BY expires_at ASC LIMIT 100"
    );
    assert_eq!(built.args, vec![Value::from("2024-01-01")]);
}

#[test]
fn test_update_set_many() {
    let mut q = update("t");
    q.set_many([("a", 1), ("b", 2)]).unwrap().eq("id", 3).unwrap();
    let built = q.build().unwrap();
    assert_eq!(built.sql, "UPDATE t SET a = ?, b = ? WHERE id = ?");
    assert_eq!(built.args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_update_without_set() {
    let mut q = update("users");
    q.eq("id", 1).unwrap();
    assert!(matches!(q.build().unwrap_err(), QbError::EmptyUpdateColumns));
}

#[test]
fn test_set_on_select_is_unsupported() {
    let mut q = users_select(&["id"]);
    assert!(matches!(
        q.set("a", 1).unwrap_err(),
        QbError::UnsupportedClause {
            clause: "SET",
            statement: "SELECT"
        }
    ));
}

// ==================== DELETE ====================

#[test]
fn test_delete() {
    let mut q = delete("logs");
    q.and_where("created_at", "<", "2020-01-01")
        .unwrap()
        .order_by("id")
        .unwrap()
        .limit(1000);
    let built = q.build().unwrap();
    assert_eq!(
        built.sql,
        "DELETE FROM logs WHERE created_at < ? ORDER BY id ASC LIMIT 1000"
    );
    assert_eq!(built.args, vec![Value::from("2020-01-01")]);

    let mut q = Query::new();
    q.delete().unwrap().from("logs");
    assert_eq!(q.to_sql(), "DELETE FROM logs");
}

#[test]
fn test_delete_rejects_join() {
    let mut q = delete("users");
    q.inner_join("orders", "orders.user_id", "=", "users.id")
        .unwrap();
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::UnsupportedClause {
            clause: "JOIN",
            statement: "DELETE"
        }
    ));
}

// ==================== Build errors & stability ====================

#[test]
fn test_missing_table_and_statement() {
    let mut q = Query::new();
    assert!(matches!(q.build().unwrap_err(), QbError::MissingStatement));

    q.select(["id"]).unwrap();
    assert!(matches!(
        q.build().unwrap_err(),
        QbError::MissingTable("SELECT")
    ));

    let mut q = insert([("a", Value::Int(1))]).unwrap();
    assert!(matches!(q.build().unwrap_err(), QbError::MissingTable("INSERT")));
    q.into_table("  ");
    assert!(matches!(q.build().unwrap_err(), QbError::MissingTable("INSERT")));
}

#[test]
fn test_statement_already_set() {
    let mut q = users_select(&["id"]);
    let err = q.delete().unwrap_err();
    assert!(matches!(
        err,
        QbError::StatementAlreadySet {
            current: "SELECT",
            requested: "DELETE"
        }
    ));
    assert!(err.is_build_error());
}

#[test]
fn test_clause_before_statement() {
    let mut q = Query::new();
    assert!(matches!(q.distinct().unwrap_err(), QbError::MissingStatement));
    assert!(matches!(q.set("a", 1).unwrap_err(), QbError::MissingStatement));
}

#[test]
fn test_build_is_stable() {
    let mut sub = select(["id"]).unwrap();
    sub.from("teams").and_where("name", "LIKE", "a%").unwrap();

    let mut q = users_select(&["id", "name"]);
    q.and_where("team_id", "IN", sub)
        .unwrap()
        .where_group(|q| {
            q.and_where("age", ">", 1)?.or_where("age", "<", 90)?;
            Ok(())
        })
        .unwrap()
        .limit(5);

    let first = q.build().unwrap();
    let second = q.build().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.placeholder_count(), first.args.len());
}

#[test]
fn test_clone_is_independent() {
    let mut base = users_select(&["id"]);
    base.eq("active", 1).unwrap();

    let mut narrowed = base.clone();
    narrowed.eq("age", 30).unwrap();

    assert_eq!(base.to_sql(), "SELECT id FROM users WHERE active = ?");
    assert_eq!(
        narrowed.to_sql(),
        "SELECT id FROM users WHERE active = ? AND age = ?"
    );
}

#[test]
fn test_built_query_helpers() {
    let built = BuiltQuery::new("SELECT '?' FROM t WHERE a = ? AND b = ?", vec![]);
    assert_eq!(built.placeholder_count(), 2);
    assert_eq!(built.kind(), crate::executor::StatementKind::Select);
}
