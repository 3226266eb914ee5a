//! DuckDB: the base configuration plus a handful of native spellings.

use super::{Dialect, DialectConfig};
use crate::ast::{BinaryOp, Func, HashAlgorithm, Node, Op, OpKind};
use crate::error::{RelqError, RelqResult};
use crate::sql::{SqlBinaryOp, SqlExpr};
use crate::transpiler::CompileContext;
use crate::transpiler::scalar::{self, nth};

pub(super) fn config() -> DialectConfig {
    DialectConfig::builder(Dialect::DuckDb)
        .unsupported([
            OpKind::Call(Func::FindInSet),
            OpKind::Call(Func::BaseConvert),
            OpKind::Call(Func::ExtractProtocol),
            OpKind::Call(Func::ExtractAuthority),
            OpKind::Call(Func::ExtractUserInfo),
            OpKind::Call(Func::ExtractHost),
            OpKind::Call(Func::ExtractFile),
            OpKind::Call(Func::ExtractPath),
            OpKind::Call(Func::ExtractQuery),
            OpKind::Call(Func::ExtractFragment),
        ])
        .rename(OpKind::Call(Func::StringContains), "contains")
        .rename(OpKind::Call(Func::StartsWith), "starts_with")
        .rename(OpKind::Call(Func::EndsWith), "ends_with")
        .rename(OpKind::Call(Func::RegexSearch), "regexp_matches")
        .rename(OpKind::Call(Func::BitwiseXor), "xor")
        .rename(OpKind::Call(Func::DayOfWeekName), "dayname")
        .rename(OpKind::Call(Func::ArrayLength), "array_length")
        .visitor(OpKind::Call(Func::Capitalize), capitalize)
        .visitor(OpKind::Binary(BinaryOp::FloorDivide), floor_divide)
        .visitor(OpKind::StructColumn, struct_column)
        .visitor(OpKind::HashBytes, hash_bytes)
        .visitor(OpKind::Cast, cast)
        .build()
}

fn capitalize(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    scalar::capitalize_by_parts(cx, node, "substring")
}

fn floor_divide(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Binary { left, right, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a binary operation", node)));
    };
    Ok(SqlExpr::binary(cx.expr(left)?, SqlBinaryOp::Custom("//"), cx.expr(right)?))
}

fn struct_column(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::StructColumn { names, values } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a struct", node)));
    };
    let fields = names
        .iter()
        .zip(values)
        .map(|(name, value)| {
            Ok(SqlExpr::NamedArg {
                name: name.clone(),
                value: Box::new(cx.expr(value)?),
            })
        })
        .collect::<RelqResult<Vec<_>>>()?;
    Ok(SqlExpr::func("struct_pack", fields))
}

fn hash_bytes(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::HashBytes { how, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a hash", node)));
    };
    match how {
        HashAlgorithm::Md5 | HashAlgorithm::Sha1 | HashAlgorithm::Sha256 => {
            Ok(SqlExpr::func(how.name(), vec![nth(&cx.args(node)?, 0)?]))
        }
        other => Err(cx.unsupported_arg(node.kind(), format!("{} hashing", other.name()))),
    }
}

fn epoch(x: SqlExpr) -> SqlExpr {
    SqlExpr::func("epoch", vec![x])
}

fn cast(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    scalar::cast_with(cx, node, epoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DataType;
    use crate::ast::builders::{call, lit, struct_column, table};
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
        Ok(Compiler::new(Dialect::DuckDb)
            .compile(expr, &CompileOptions::default())?
            .sql)
    }

    #[test]
    fn test_native_string_predicates() {
        let t = t();
        let expr = t.col("s").unwrap().contains(lit("x")).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT CONTAINS(t0.s, 'x') AS x FROM t AS t0"
        );
        let expr = t.col("s").unwrap().starts_with(lit("p")).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT STARTS_WITH(t0.s, 'p') AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_floor_divide_operator() {
        let t = t();
        let expr = t
            .col("a")
            .unwrap()
            .binary(BinaryOp::FloorDivide, lit(2))
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(compile(&expr).unwrap(), "SELECT t0.a // 2 AS x FROM t AS t0");
    }

    #[test]
    fn test_struct_pack() {
        let t = t();
        let expr = struct_column([("a", t.col("a").unwrap()), ("s", t.col("s").unwrap())])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT STRUCT_PACK(a := t0.a, s := t0.s) AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_timestamp_to_integer_uses_epoch() {
        let t = t();
        let expr = t.col("ts").unwrap().cast(DataType::int64()).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT CAST(EPOCH(t0.ts) * 1000000 AS BIGINT) AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_hash_algorithms() {
        let t = t();
        let md5 = t.col("s").unwrap().hash_bytes(HashAlgorithm::Md5).unwrap().alias("x").unwrap();
        assert_eq!(compile(&md5).unwrap(), "SELECT MD5(t0.s) AS x FROM t AS t0");

        let sha512 = t.col("s").unwrap().hash_bytes(HashAlgorithm::Sha512).unwrap();
        let err = compile(&sha512).unwrap_err();
        assert!(matches!(err, RelqError::UnsupportedArgument(_)));
    }

    #[test]
    fn test_bitwise_xor_is_a_function() {
        let t = t();
        let expr = call(Func::BitwiseXor, [t.col("a").unwrap(), lit(3)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(compile(&expr).unwrap(), "SELECT XOR(t0.a, 3) AS x FROM t AS t0");
    }
}
