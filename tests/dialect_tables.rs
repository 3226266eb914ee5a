//! Every rename and every denial a dialect declares, exercised one by one.

use pretty_assertions::assert_eq;
use relq::ast::ops::{ArgClass, Signature};
use relq::prelude::*;

/// Column pools per argument class. Successive arguments of one class take
/// successive columns so argument order shows in the output.
const POOLS: &[(ArgClass, &[&str])] = &[
    (ArgClass::Any, &["i", "i2", "i3"]),
    (ArgClass::Numeric, &["f", "f2", "i"]),
    (ArgClass::NumericOrBoolean, &["f", "f2"]),
    (ArgClass::Integer, &["i", "i2", "i3"]),
    (ArgClass::String, &["s", "s2", "s3"]),
    (ArgClass::Boolean, &["b", "b2"]),
    (ArgClass::Temporal, &["ts", "ts2"]),
    (ArgClass::Timestamp, &["ts", "ts2"]),
    (ArgClass::Date, &["d", "d2"]),
    (ArgClass::Interval, &["iv"]),
    (ArgClass::Array, &["arr", "arr2"]),
];

fn t() -> Node {
    table(
        "t",
        [
            ("i", DataType::int64()),
            ("i2", DataType::int64()),
            ("i3", DataType::int64()),
            ("f", DataType::float64()),
            ("f2", DataType::float64()),
            ("s", DataType::string()),
            ("s2", DataType::string()),
            ("s3", DataType::string()),
            ("b", DataType::boolean()),
            ("b2", DataType::boolean()),
            ("ts", DataType::timestamp()),
            ("ts2", DataType::timestamp()),
            ("d", DataType::date()),
            ("d2", DataType::date()),
            ("iv", DataType::interval(IntervalUnit::Day)),
            ("arr", DataType::array(DataType::int64())),
            ("arr2", DataType::array(DataType::int64())),
        ],
    )
    .unwrap()
}

/// Column names for the required arguments of `sig`, plus one variadic
/// argument when the signature has a variadic tail.
fn arg_columns(sig: &Signature) -> Vec<&'static str> {
    let mut used: Vec<(ArgClass, usize)> = Vec::new();
    let mut pick = |class: ArgClass| -> &'static str {
        let pool = POOLS
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, names)| *names)
            .unwrap_or_else(|| panic!("no column pool for {:?}", class));
        let n = match used.iter_mut().find(|(c, _)| *c == class) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                used.push((class, 0));
                0
            }
        };
        pool[n % pool.len()]
    };
    let mut names: Vec<&'static str> =
        sig.params.iter().filter(|p| !p.optional).map(|p| pick(p.class)).collect();
    if let Some((_, class)) = sig.variadic {
        names.push(pick(class));
    }
    names
}

/// A minimal query containing one node of `kind`, and the column names
/// passed to it in order.
fn minimal_query(kind: OpKind) -> (Node, Vec<&'static str>) {
    let t = t();
    let cols = |names: &[&str]| -> Vec<Node> { names.iter().map(|n| t.col(n).unwrap()).collect() };
    match kind {
        OpKind::Call(func) => {
            let names = arg_columns(&func.signature());
            let node = call(func, cols(&names)).unwrap();
            (t.project([("x", node)]).unwrap(), names)
        }
        OpKind::Reduction(AggFunc::CountStar) => {
            let node = t.count_star().unwrap();
            (t.aggregate::<&str, _>([], [("x", node)]).unwrap(), Vec::new())
        }
        OpKind::Reduction(func) => {
            let names = arg_columns(&func.signature());
            let node = reduction(func, cols(&names)).unwrap();
            (t.aggregate::<&str, _>([], [("x", node)]).unwrap(), names)
        }
        OpKind::Analytic(func) => {
            let names = arg_columns(&func.signature());
            let node = analytic(func, cols(&names))
                .unwrap()
                .over([], [t.col("i").unwrap().asc().unwrap()], None)
                .unwrap();
            (t.project([("x", node)]).unwrap(), names)
        }
        OpKind::StructColumn => {
            let node = struct_column([("k", t.col("i").unwrap())]).unwrap();
            (t.project([("x", node)]).unwrap(), vec!["i"])
        }
        OpKind::HashBytes => {
            let node = t.col("s").unwrap().hash_bytes(HashAlgorithm::Md5).unwrap();
            (t.project([("x", node)]).unwrap(), vec!["s"])
        }
        other => panic!("no minimal query for {}", other),
    }
}

#[test]
fn test_every_rename_calls_the_new_name_with_args_in_order() {
    let mut checked = 0;
    for dialect in Dialect::all() {
        let config = dialect.config();
        for (kind, name) in &config.renames {
            let (query, names) = minimal_query(*kind);
            let sql = Compiler::new(dialect)
                .compile(&query, &CompileOptions::default())
                .unwrap_or_else(|e| panic!("{} {}: {}", dialect, kind, e))
                .sql;
            let args: Vec<String> = names.iter().map(|n| format!("t0.{}", n)).collect();
            let expected = format!("{}({})", name.to_uppercase(), args.join(", "));
            assert!(
                sql.contains(&expected),
                "{} {}: expected {} in {}",
                dialect,
                kind,
                expected,
                sql
            );
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_every_denial_fails_without_sql() {
    let mut checked = 0;
    for dialect in Dialect::all() {
        let config = dialect.config();
        for kind in &config.unsupported {
            let (query, _) = minimal_query(*kind);
            let result = Compiler::new(dialect).compile(&query, &CompileOptions::default());
            match result {
                Err(RelqError::UnsupportedOperation(u)) => {
                    assert_eq!(u.kind, *kind, "{}", dialect);
                    assert_eq!(u.dialect, dialect);
                }
                Err(other) => panic!("{} {}: unexpected error {}", dialect, kind, other),
                Ok(out) => panic!("{} {}: compiled to {}", dialect, kind, out.sql),
            }
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_denials_and_renames_do_not_overlap() {
    for dialect in Dialect::all() {
        let config = dialect.config();
        for kind in config.renames.keys() {
            assert!(!config.is_unsupported(*kind), "{} {}", dialect, kind);
            assert!(config.visitor(*kind).is_none(), "{} {}", dialect, kind);
        }
    }
}
