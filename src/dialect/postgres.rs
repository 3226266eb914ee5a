//! PostgreSQL.

use super::{Dialect, DialectConfig, SamplePolicy};
use crate::ast::{AggFunc, Func, HashAlgorithm, Node, Op, OpKind, SampleMethod, Value};
use crate::error::{RelqError, RelqResult};
use crate::sql::{SqlBinaryOp, SqlExpr};
use crate::transpiler::CompileContext;
use crate::transpiler::scalar::{self, call_arg, literal_str, nth};
use crate::transpiler::util::translate_format;

/// strftime directives as `to_char` template patterns.
const TO_CHAR_FORMAT: &[(char, &str)] = &[
    ('Y', "YYYY"),
    ('y', "YY"),
    ('m', "MM"),
    ('d', "DD"),
    ('H', "HH24"),
    ('I', "HH12"),
    ('M', "MI"),
    ('S', "SS"),
    ('f', "US"),
    ('p', "AM"),
    ('b', "Mon"),
    ('B', "Month"),
    ('a', "Dy"),
    ('A', "Day"),
    ('j', "DDD"),
];

pub(super) fn config() -> DialectConfig {
    DialectConfig::builder(Dialect::Postgres)
        .unsupported([
            OpKind::Reduction(AggFunc::Median),
            OpKind::Reduction(AggFunc::ApproxMedian),
            OpKind::Reduction(AggFunc::ArgMin),
            OpKind::Reduction(AggFunc::ArgMax),
            OpKind::Reduction(AggFunc::First),
            OpKind::Reduction(AggFunc::Last),
            OpKind::Reduction(AggFunc::Kurtosis),
            OpKind::Call(Func::RegexExtract),
            OpKind::Call(Func::Hash),
            OpKind::Call(Func::Map),
            OpKind::Call(Func::StringToTime),
            OpKind::Call(Func::FindInSet),
            OpKind::Call(Func::BaseConvert),
            OpKind::Call(Func::DateDelta),
            OpKind::Call(Func::ExtractProtocol),
            OpKind::Call(Func::ExtractAuthority),
            OpKind::Call(Func::ExtractUserInfo),
            OpKind::Call(Func::ExtractHost),
            OpKind::Call(Func::ExtractFile),
            OpKind::Call(Func::ExtractPath),
            OpKind::Call(Func::ExtractQuery),
            OpKind::Call(Func::ExtractFragment),
        ])
        .rename(OpKind::Call(Func::TypeOf), "pg_typeof")
        .rename(OpKind::Call(Func::StringSplit), "string_to_array")
        .visitor(OpKind::Literal, literal)
        .visitor(OpKind::Call(Func::Log2), log2)
        .visitor(OpKind::Call(Func::BitwiseXor), bitwise_xor)
        .visitor(OpKind::Call(Func::Strftime), strftime)
        .visitor(
            OpKind::Reduction(AggFunc::ApproxCountDistinct),
            scalar::count_distinct,
        )
        .visitor(OpKind::HashBytes, hash_bytes)
        .sample(SamplePolicy {
            methods: &[SampleMethod::Row, SampleMethod::Block],
            supports_seed: true,
            physical_tables_only: true,
            random_fallback: true,
        })
        .build()
}

fn literal(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Literal { value, dtype } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a literal", node)));
    };
    match value {
        Value::Binary(bytes) => Ok(SqlExpr::func(
            "decode",
            vec![SqlExpr::string(scalar::hex(bytes)), SqlExpr::string("hex")],
        )),
        _ => scalar::literal(cx, value, dtype),
    }
}

fn log2(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let x = nth(&cx.args(node)?, 0)?;
    Ok(SqlExpr::func("log", vec![SqlExpr::int(2), x]))
}

fn bitwise_xor(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    Ok(SqlExpr::binary(
        nth(&args, 0)?,
        SqlBinaryOp::Custom("#"),
        nth(&args, 1)?,
    ))
}

fn strftime(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let format = literal_str(call_arg(node, 1)?)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), "non-literal format string"))?;
    let template = translate_format(format, TO_CHAR_FORMAT)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), format!("format '{}'", format)))?;
    let x = cx.expr(call_arg(node, 0)?)?;
    Ok(SqlExpr::func("to_char", vec![x, SqlExpr::string(template)]))
}

fn hash_bytes(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::HashBytes { how, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a hash", node)));
    };
    if *how == HashAlgorithm::Sha1 {
        return Err(cx.unsupported_arg(node.kind(), "sha1 hashing"));
    }
    Ok(SqlExpr::func(how.name(), vec![nth(&cx.args(node)?, 0)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DataType;
    use crate::ast::builders::{call, lit, reduction, table};
    use crate::transpiler::{CompileOptions, Compiler};
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table(
            "t",
            [
                ("a", DataType::int64()),
                ("s", DataType::string()),
                ("ts", DataType::timestamp()),
            ],
        )
        .unwrap()
    }

    fn compile(expr: &Node) -> RelqResult<String> {
        Ok(Compiler::new(Dialect::Postgres)
            .compile(expr, &CompileOptions::default())?
            .sql)
    }

    #[test]
    fn test_strftime_becomes_to_char() {
        let t = t();
        let expr = call(Func::Strftime, [t.col("ts").unwrap(), lit("%Y-%m-%d %H:%M")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT TO_CHAR(t0.ts, 'YYYY-MM-DD HH24:MI') AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_strftime_needs_literal_format() {
        let t = t();
        let expr = call(Func::Strftime, [t.col("ts").unwrap(), t.col("s").unwrap()]).unwrap();
        let err = compile(&expr).unwrap_err();
        assert!(matches!(err, RelqError::UnsupportedArgument(_)));
    }

    #[test]
    fn test_math_spellings() {
        let t = t();
        let log = call(Func::Log2, [t.col("a").unwrap()]).unwrap().alias("x").unwrap();
        assert_eq!(compile(&log).unwrap(), "SELECT LOG(2, t0.a) AS x FROM t AS t0");

        let xor = call(Func::BitwiseXor, [t.col("a").unwrap(), lit(3)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(compile(&xor).unwrap(), "SELECT t0.a # 3 AS x FROM t AS t0");
    }

    #[test]
    fn test_binary_literal_is_decoded() {
        let expr = lit(Value::Binary(vec![1, 255])).alias("x").unwrap();
        assert_eq!(compile(&expr).unwrap(), "SELECT DECODE('01ff', 'hex') AS x");
    }

    #[test]
    fn test_denied_reduction() {
        let t = t();
        let median = reduction(AggFunc::Median, [t.col("a").unwrap()]).unwrap();
        let err = compile(&median).unwrap_err();
        assert!(matches!(err, RelqError::UnsupportedOperation(_)));
        let unsupported = err.as_unsupported().unwrap();
        assert_eq!(unsupported.kind, OpKind::Reduction(AggFunc::Median));
        assert_eq!(unsupported.dialect, Dialect::Postgres);
    }

    #[test]
    fn test_approximate_distinct_count_is_exact() {
        let t = t();
        let n = reduction(AggFunc::ApproxCountDistinct, [t.col("a").unwrap()])
            .unwrap()
            .alias("n")
            .unwrap();
        assert_eq!(
            compile(&n).unwrap(),
            "SELECT COUNT(DISTINCT t0.a) AS n FROM t AS t0"
        );
    }
}
