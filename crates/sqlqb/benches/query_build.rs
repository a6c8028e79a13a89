use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlqb::{Query, Value};

/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 = ? ...
fn select_with_conditions(n: usize) -> Query {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let mut q = sqlqb::select(columns.iter()).unwrap();
    q.from("t");
    for (i, column) in columns.iter().enumerate() {
        q.and_where(column, "=", i as i64).unwrap();
    }
    q
}

/// `depth` nested OR groups, each holding two conditions.
fn nested_groups(q: &mut Query, depth: usize) -> sqlqb::QbResult<()> {
    if depth == 0 {
        return Ok(());
    }
    q.or_where_group(|q| {
        q.and_where("a", "=", depth as i64)?
            .and_where("b", "IN", vec![1i64, 2, 3])?;
        nested_groups(q, depth - 1)
    })?;
    Ok(())
}

fn bench_build_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_build/select");

    for n in [1, 5, 10, 50, 100] {
        let q = select_with_conditions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.build().unwrap()));
        });
    }

    group.finish();
}

fn bench_nested_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_build/nested_where");

    for depth in [1, 4, 16, 64] {
        let mut q = sqlqb::select(["id"]).unwrap();
        q.from("t");
        nested_groups(&mut q, depth).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &q, |b, q| {
            b.iter(|| black_box(q.build().unwrap()));
        });
    }

    group.finish();
}

fn bench_multi_row_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_build/multi_row_insert");

    for rows in [1, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut q = Query::new();
                q.insert_columns(["id", "name", "score"]).unwrap().into_table("t");
                for i in 0..rows {
                    q.values([
                        Value::Int(i as i64),
                        Value::Text(format!("user{i}")),
                        Value::Float(i as f64 * 0.5),
                    ])
                    .unwrap();
                }
                black_box(q.build().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build_select,
    bench_nested_where,
    bench_multi_row_insert
);
criterion_main!(benches);
