//! Whole-pipeline compilation: rewrites, CTEs, parameters and limits.

use pretty_assertions::assert_eq;
use relq::prelude::*;

fn t() -> Node {
    table("t", [("a", DataType::int64()), ("b", DataType::string())]).unwrap()
}

fn compile_for(node: &Node, dialect: Dialect) -> RelqResult<String> {
    Ok(Compiler::new(dialect).compile(node, &CompileOptions::default())?.sql)
}

/// `Filter(Project(t, [a, b]), contains(b, 'x'))`
fn filtered_contains() -> Node {
    let projected = t().select_columns(&["a", "b"]).unwrap();
    let pred = projected.col("b").unwrap().contains(lit("x")).unwrap();
    projected.filter([pred]).unwrap()
}

#[test]
fn test_string_contains_per_dialect() {
    let expr = filtered_contains();
    let prefix = "SELECT t1.a, t1.b FROM (SELECT t0.a, t0.b FROM t AS t0) AS t1 WHERE ";
    let cases = [
        (Dialect::Impala, "LOCATE('x', t1.b) > 0"),
        (Dialect::MySql, "LOCATE('x', t1.b) > 0"),
        (Dialect::Postgres, "t1.b LIKE '%x%'"),
        (Dialect::DuckDb, "CONTAINS(t1.b, 'x')"),
        (Dialect::Sqlite, "INSTR(t1.b, 'x') > 0"),
    ];
    for (dialect, predicate) in cases {
        assert_eq!(
            compile_for(&expr, dialect).unwrap(),
            format!("{}{}", prefix, predicate),
            "{}",
            dialect
        );
    }
}

/// `Distinct(Project(Sort(t, b), [a]))`
fn distinct_sorted() -> Node {
    let t = t();
    let sorted = t.order_by([t.col("b").unwrap()]).unwrap();
    sorted
        .project([("a", sorted.col("a").unwrap())])
        .unwrap()
        .distinct()
        .unwrap()
}

#[test]
fn test_distinct_with_order_by_is_split_for_impala() {
    let expr = distinct_sorted();
    assert_eq!(
        compile_for(&expr, Dialect::Impala).unwrap(),
        "SELECT * FROM (SELECT DISTINCT t0.a FROM t AS t0) AS t2 ORDER BY b ASC"
    );
    for dialect in [Dialect::DuckDb, Dialect::Postgres] {
        assert_eq!(
            compile_for(&expr, dialect).unwrap(),
            "SELECT DISTINCT t0.a FROM t AS t0 ORDER BY t0.b ASC"
        );
    }
}

#[test]
fn test_split_distinct_with_expression_key() {
    let t = t();
    let key = call(Func::Lowercase, [t.col("b").unwrap()]).unwrap();
    let sorted = t.order_by([key]).unwrap();
    let expr = sorted
        .project([("a", sorted.col("a").unwrap())])
        .unwrap()
        .distinct()
        .unwrap();
    assert_eq!(
        compile_for(&expr, Dialect::Impala).unwrap(),
        "SELECT * FROM (SELECT DISTINCT t0.a FROM t AS t0) AS t2 ORDER BY LOWER(b) ASC"
    );
}

#[test]
fn test_empty_window_order_only_rewritten_where_configured() {
    let t = table("t", [("a", DataType::int64()), ("g", DataType::string())]).unwrap();
    let rn = analytic(AnalyticFunc::RowNumber, [])
        .unwrap()
        .over([t.col("g").unwrap()], [], None)
        .unwrap();
    let expr = t.project([("g", t.col("g").unwrap()), ("rn", rn)]).unwrap();

    let impala = compile_for(&expr, Dialect::Impala).unwrap();
    assert!(impala.contains("OVER (PARTITION BY t0.g ORDER BY NULL ASC)"), "{}", impala);

    let duckdb = compile_for(&expr, Dialect::DuckDb).unwrap();
    assert!(duckdb.contains("OVER (PARTITION BY t0.g)"), "{}", duckdb);
}

#[test]
fn test_shared_relation_becomes_cte() {
    let t = t();
    let positive = t.filter([t.col("a").unwrap().gt(lit(0)).unwrap()]).unwrap();
    let both = positive.union(&positive, false).unwrap();

    let out = Compiler::new(Dialect::DuckDb)
        .compile(&both, &CompileOptions::default())
        .unwrap();
    assert_eq!(
        out.sql,
        "WITH t1 AS (SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > 0) \
         SELECT * FROM t1 UNION ALL SELECT * FROM t1"
    );
    assert_eq!(out.stats.visits(OpKind::Filter), 1);
}

#[test]
fn test_native_sample_and_random_fallback() {
    let sampled = t().sample(0.1, SampleMethod::Row, Some(7)).unwrap();
    let pg = compile_for(&sampled, Dialect::Postgres).unwrap();
    assert!(pg.contains("TABLESAMPLE BERNOULLI (10) REPEATABLE (7)"), "{}", pg);

    let unseeded = t().sample(0.1, SampleMethod::Row, None).unwrap();
    let mysql = compile_for(&unseeded, Dialect::MySql).unwrap();
    assert!(mysql.ends_with("WHERE RAND() <= 0.1"), "{}", mysql);

    let err = compile_for(&sampled, Dialect::MySql).unwrap_err();
    assert_eq!(err.as_unsupported().unwrap().kind, OpKind::Sample);
}

#[test]
fn test_placeholders_follow_dialect() {
    let t = t();
    let a = t.col("a").unwrap();
    let expr = t
        .filter([
            a.gt(param("lo", DataType::int64())).unwrap(),
            a.lt(param("hi", DataType::int64())).unwrap(),
        ])
        .unwrap();
    assert_eq!(
        compile_for(&expr, Dialect::MySql).unwrap(),
        "SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > ? AND t0.a < ?"
    );
    assert_eq!(
        compile_for(&expr, Dialect::Postgres).unwrap(),
        "SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > $1 AND t0.a < $2"
    );

    let options = CompileOptions::new().param("lo", 1i64).param("hi", 9i64);
    let bound = Compiler::new(Dialect::MySql).compile(&expr, &options).unwrap();
    assert_eq!(
        bound.sql,
        "SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > 1 AND t0.a < 9"
    );
}

#[test]
fn test_deep_graph_is_rejected_before_any_output() {
    let t = t();
    let mut expr = t.col("a").unwrap();
    for _ in 0..40 {
        expr = expr.add(lit(1)).unwrap();
    }
    let options = CompileOptions::new().max_depth(16);
    let err = Compiler::new(Dialect::Postgres)
        .compile(&expr, &options)
        .unwrap_err();
    assert!(matches!(err, RelqError::ExpressionTooDeep { limit: 16, .. }));
}

#[test]
fn test_plan_document_round_trip_through_cli_format() {
    let plan = r#"{
        "relations": [
            {"name": "t", "plan": {"op": "table", "name": "t", "columns": [
                {"name": "a", "type": "BIGINT"},
                {"name": "b", "type": "VARCHAR"}
            ]}}
        ],
        "root": {"op": "aggregate", "parent": {"op": "ref", "name": "t"},
                 "groups": [{"name": "b", "value": {"expr": "column", "name": "b"}}],
                 "metrics": [{"name": "total", "value": {"expr": "reduction", "func": "Sum",
                              "args": [{"expr": "column", "name": "a"}]}}]}
    }"#;
    let node = relq::plan::load(plan).unwrap();
    assert_eq!(
        compile_for(&node, Dialect::Postgres).unwrap(),
        "SELECT t0.b, SUM(t0.a) AS total FROM t AS t0 GROUP BY t0.b"
    );
}

#[test]
fn test_equi_join_on_shared_column_name() {
    let l = table("l", [("id", DataType::int64()), ("x", DataType::string())]).unwrap();
    let r = table("r", [("id", DataType::int64()), ("y", DataType::string())]).unwrap();
    let on = l.col("id").unwrap().eq(r.col("id").unwrap()).unwrap();
    let joined = l.join(&r, JoinKind::Inner, [on]).unwrap();

    let out = Compiler::new(Dialect::Postgres)
        .compile(&joined, &CompileOptions::default())
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT t0.id, t0.x, t1.id AS id_right, t1.y \
         FROM l AS t0 INNER JOIN r AS t1 ON t0.id = t1.id"
    );
    let names: Vec<&str> = out.schema.names().collect();
    assert_eq!(names, vec!["id", "x", "id_right", "y"]);
}
