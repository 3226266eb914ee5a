//! Properties every dialect must hold.

use pretty_assertions::assert_eq;
use relq::prelude::*;
use relq::types::schema_from_columns;

fn t() -> Node {
    table(
        "t",
        [
            ("a", DataType::int64()),
            ("b", DataType::string()),
            ("g", DataType::string()),
        ],
    )
    .unwrap()
}

/// A query every dialect can compile.
fn portable_query() -> Node {
    let t = t();
    let a = t.col("a").unwrap();
    let filtered = t.filter([a.gt(lit(0)).unwrap()]).unwrap();
    let grouped = filtered
        .aggregate(
            [("g", filtered.col("g").unwrap())],
            [
                ("total", filtered.col("a").unwrap().sum().unwrap()),
                ("n", filtered.count_star().unwrap()),
            ],
        )
        .unwrap();
    grouped
        .order_by([grouped.col("total").unwrap().desc().unwrap()])
        .unwrap()
        .limit(Some(10), 0)
        .unwrap()
}

#[test]
fn test_compilation_is_deterministic() {
    let expr = portable_query();
    for dialect in Dialect::all() {
        let compiler = Compiler::new(dialect);
        let first = compiler.compile(&expr, &CompileOptions::default()).unwrap();
        let second = compiler.compile(&expr, &CompileOptions::default()).unwrap();
        assert_eq!(first.sql, second.sql, "{}", dialect);
        assert_eq!(first.schema, second.schema);
    }
}

#[test]
fn test_rebuilt_graph_compiles_identically() {
    let first = relq::compile(&portable_query(), Dialect::Postgres).unwrap();
    let second = relq::compile(&portable_query(), Dialect::Postgres).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_shared_subexpression_visited_once() {
    let t = t();
    let a = t.col("a").unwrap();
    let shared = a.mul(lit(2)).unwrap();
    let mut expr = shared.clone();
    for _ in 0..4 {
        expr = expr.add(shared.clone()).unwrap();
    }
    let expr = expr.alias("x").unwrap();
    for dialect in Dialect::all() {
        let out = Compiler::new(dialect)
            .compile(&expr, &CompileOptions::default())
            .unwrap();
        assert_eq!(out.stats.visits(OpKind::Field), 1, "{}", dialect);
        assert_eq!(out.stats.visits(OpKind::Binary(BinaryOp::Multiply)), 1, "{}", dialect);
        assert_eq!(out.stats.visits(OpKind::Binary(BinaryOp::Add)), 4, "{}", dialect);
    }
}

#[test]
fn test_result_schema_matches_root() {
    let expr = portable_query();
    let out = Compiler::new(Dialect::DuckDb)
        .compile(&expr, &CompileOptions::default())
        .unwrap();
    let names: Vec<&str> = out.schema.names().collect();
    assert_eq!(names, vec!["g", "total", "n"]);
}

#[test]
fn test_type_strings_round_trip() {
    for dialect in Dialect::all() {
        let mapper = dialect.types();
        for ty in DataType::primitives() {
            for nullable in [true, false] {
                let ty = ty.clone().with_nullable(nullable);
                let Ok(text) = mapper.to_string(&ty) else {
                    continue;
                };
                let back = mapper.from_string(&text, nullable).unwrap();
                assert_eq!(back, ty, "{} spelled {} as {}", dialect, ty, text);
            }
        }
    }
}

#[test]
fn test_schema_from_backend_columns() {
    let schema = schema_from_columns(
        Dialect::Postgres.types(),
        [("id", "integer", false), ("name", "character varying(20)", true)],
    )
    .unwrap();
    assert_eq!(schema.get("id"), Some(&DataType::int32().not_null()));
    assert_eq!(schema.get("name"), Some(&DataType::string()));
}

#[test]
fn test_denied_operations_fail_for_their_dialect_only() {
    let t = t();
    let median = reduction(AggFunc::Median, [t.col("a").unwrap()])
        .unwrap()
        .alias("m")
        .unwrap();
    for dialect in Dialect::all() {
        let denied = dialect.config().is_unsupported(OpKind::Reduction(AggFunc::Median));
        let result = Compiler::new(dialect).compile(&median, &CompileOptions::default());
        match result {
            Err(RelqError::UnsupportedOperation(u)) => {
                assert!(denied, "{} failed without denying", dialect);
                assert_eq!(u.kind, OpKind::Reduction(AggFunc::Median));
                assert_eq!(u.dialect, dialect);
            }
            Err(other) => panic!("{}: unexpected error {}", dialect, other),
            Ok(_) => assert!(!denied, "{} compiled a denied operation", dialect),
        }
    }
}
