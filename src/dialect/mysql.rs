//! MySQL 8.

use super::{Dialect, DialectConfig, SamplePolicy};
use crate::ast::{
    AggFunc, DataType, Func, HashAlgorithm, IntervalUnit, Node, Op, OpKind, TimeUnit, Value,
};
use crate::error::{RelqError, RelqResult};
use crate::rewrites;
use crate::sql::{SqlBinaryOp, SqlExpr};
use crate::transpiler::CompileContext;
use crate::transpiler::scalar::{self, call_arg, epoch_unit, literal_str, nth, zero_based};
use crate::transpiler::util::{convert_unit, translate_format};

/// strftime directives as `DATE_FORMAT` specifiers.
const DATE_FORMAT: &[(char, &str)] = &[
    ('Y', "%Y"),
    ('y', "%y"),
    ('m', "%m"),
    ('d', "%d"),
    ('H', "%H"),
    ('I', "%h"),
    ('M', "%i"),
    ('S', "%s"),
    ('f', "%f"),
    ('p', "%p"),
    ('b', "%b"),
    ('B', "%M"),
    ('a', "%a"),
    ('A', "%W"),
    ('j', "%j"),
    ('%', "%%"),
];

pub(super) fn config() -> DialectConfig {
    DialectConfig::builder(Dialect::MySql)
        .unsupported([
            OpKind::Call(Func::ArrayLength),
            OpKind::Call(Func::ArrayPosition),
            OpKind::Call(Func::Array),
            OpKind::Call(Func::Map),
            OpKind::Call(Func::Unnest),
            OpKind::Call(Func::StringSplit),
            OpKind::Call(Func::Levenshtein),
            OpKind::Call(Func::RegexExtract),
            OpKind::Call(Func::TypeOf),
            OpKind::Call(Func::Hash),
            OpKind::Call(Func::ExtractProtocol),
            OpKind::Call(Func::ExtractAuthority),
            OpKind::Call(Func::ExtractUserInfo),
            OpKind::Call(Func::ExtractHost),
            OpKind::Call(Func::ExtractFile),
            OpKind::Call(Func::ExtractPath),
            OpKind::Call(Func::ExtractQuery),
            OpKind::Call(Func::ExtractFragment),
            OpKind::StructColumn,
            OpKind::Reduction(AggFunc::Median),
            OpKind::Reduction(AggFunc::ApproxMedian),
            OpKind::Reduction(AggFunc::ArgMin),
            OpKind::Reduction(AggFunc::ArgMax),
            OpKind::Reduction(AggFunc::First),
            OpKind::Reduction(AggFunc::Last),
            OpKind::Reduction(AggFunc::Kurtosis),
            OpKind::Reduction(AggFunc::Covariance),
        ])
        .rename(OpKind::Call(Func::StringLength), "char_length")
        .rename(OpKind::Call(Func::RandomScalar), "rand")
        .rename(OpKind::Call(Func::DayOfWeekName), "dayname")
        .rename(OpKind::Call(Func::DayOfWeekIndex), "weekday")
        .rename(OpKind::Call(Func::ExtractDayOfYear), "dayofyear")
        .rename(OpKind::Call(Func::ExtractEpochSeconds), "unix_timestamp")
        .rename(OpKind::Call(Func::Date), "date")
        .rename(OpKind::Call(Func::DateDiff), "datediff")
        .rename(OpKind::Call(Func::BaseConvert), "conv")
        .rename(OpKind::Call(Func::ExtractWeekOfYear), "weekofyear")
        .rename(OpKind::Reduction(AggFunc::Any), "max")
        .rename(OpKind::Reduction(AggFunc::All), "min")
        .visitor(OpKind::Literal, literal)
        .visitor(OpKind::Cast, cast)
        .visitor(OpKind::Call(Func::StringContains), string_contains)
        .visitor(OpKind::Call(Func::StringFind), string_find)
        .visitor(OpKind::Call(Func::FindInSet), scalar::find_in_set)
        .visitor(OpKind::Call(Func::DateFromYmd), date_from_ymd)
        .visitor(OpKind::Call(Func::TimestampDiff), timestamp_diff)
        .visitor(OpKind::Call(Func::DateDelta), date_delta)
        .visitor(OpKind::Call(Func::Capitalize), capitalize)
        .visitor(OpKind::Call(Func::ExtractMillisecond), extract_millisecond)
        .visitor(OpKind::Call(Func::RegexSearch), regex_search)
        .visitor(OpKind::Call(Func::Strftime), strftime)
        .visitor(OpKind::Call(Func::StringToTime), string_to_time)
        .visitor(
            OpKind::Reduction(AggFunc::ApproxCountDistinct),
            scalar::count_distinct,
        )
        .visitor(OpKind::TimestampTruncate, timestamp_truncate)
        .visitor(OpKind::TimestampFromUnix, timestamp_from_unix)
        .visitor(OpKind::HashBytes, hash_bytes)
        .pre_rewrite(
            "rewrite_empty_order_by_window",
            rewrites::rewrite_empty_order_by_window,
        )
        .aggregate_filter(false)
        .full_outer_join(false)
        .sample(SamplePolicy {
            methods: &[],
            supports_seed: false,
            physical_tables_only: false,
            random_fallback: true,
        })
        .build()
}

/// Target of `CAST(x AS ...)`, which takes a narrower set of names than DDL.
fn cast_type(cx: &CompileContext<'_>, ty: &DataType) -> RelqResult<String> {
    if ty.is_signed_integer() || ty.is_boolean() {
        Ok("SIGNED".to_string())
    } else if ty.is_unsigned_integer() {
        Ok("UNSIGNED".to_string())
    } else if ty.is_string() {
        Ok("CHAR".to_string())
    } else if ty.is_binary() {
        Ok("BINARY".to_string())
    } else {
        cx.type_name(ty)
    }
}

fn literal(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Literal { value, dtype } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a literal", node)));
    };
    match value {
        Value::Null if dtype.is_null() => Ok(SqlExpr::null()),
        Value::Null => Ok(match cast_type(cx, dtype) {
            Ok(ty) => SqlExpr::cast(SqlExpr::null(), ty),
            Err(_) => SqlExpr::null(),
        }),
        Value::Float(f) if !f.is_finite() => {
            Err(cx.unsupported_arg(node.kind(), "non-finite floating point value"))
        }
        Value::Array(_) => Err(cx.unsupported_arg(node.kind(), "array literal")),
        _ => scalar::literal(cx, value, dtype),
    }
}

fn cast(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Cast { arg, to } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a cast", node)));
    };
    if matches!(arg.op(), Op::Literal { value: Value::Null, .. }) {
        return Ok(SqlExpr::cast(SqlExpr::null(), cast_type(cx, to)?));
    }
    let x = cx.expr(arg)?;
    if to.is_integer()
        && let Some(unit) = epoch_unit(arg)
    {
        let seconds = SqlExpr::func("unix_timestamp", vec![x]);
        let count = convert_unit(seconds, TimeUnit::Second, unit, false);
        return Ok(SqlExpr::cast(count, cast_type(cx, to)?));
    }
    Ok(SqlExpr::cast(x, cast_type(cx, to)?))
}

/// `LOCATE(needle, haystack)`, 1-based and 0 when absent.
fn string_contains(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    Ok(SqlExpr::binary(scalar::locate(cx, node)?, SqlBinaryOp::Gt, SqlExpr::int(0)))
}

fn string_find(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    Ok(zero_based(scalar::locate(cx, node)?))
}

fn date_from_ymd(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let mut parts = vec![SqlExpr::string("-")];
    parts.extend(cx.args(node)?);
    Ok(SqlExpr::func(
        "str_to_date",
        vec![SqlExpr::func("concat_ws", parts), SqlExpr::string("%Y-%c-%e")],
    ))
}

/// `TIMESTAMPDIFF(unit, start, end)` counts from `right` to `left`.
fn timestamp_diff_in(unit: &str, left: SqlExpr, right: SqlExpr) -> SqlExpr {
    SqlExpr::func(
        "timestampdiff",
        vec![SqlExpr::Keyword(unit.to_string()), right, left],
    )
}

fn timestamp_diff(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    Ok(timestamp_diff_in("SECOND", nth(&args, 0)?, nth(&args, 1)?))
}

fn date_delta(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let unit = scalar::date_delta_part(cx, node)?.to_ascii_uppercase();
    let args = cx.args(node)?;
    Ok(timestamp_diff_in(&unit, nth(&args, 0)?, nth(&args, 1)?))
}

fn capitalize(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    scalar::capitalize_by_parts(cx, node, "substring")
}

fn extract_millisecond(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let micros = SqlExpr::Extract {
        field: "MICROSECOND".to_string(),
        expr: Box::new(nth(&cx.args(node)?, 0)?),
    };
    Ok(SqlExpr::func(
        "floor",
        vec![SqlExpr::binary(micros, SqlBinaryOp::Divide, SqlExpr::int(1000))],
    ))
}

fn regex_search(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    Ok(SqlExpr::binary(nth(&args, 0)?, SqlBinaryOp::RLike, nth(&args, 1)?))
}

/// A literal strftime format as a `DATE_FORMAT` format.
fn format_arg(cx: &CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let format = literal_str(call_arg(node, 1)?)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), "non-literal format string"))?;
    translate_format(format, DATE_FORMAT)
        .map(SqlExpr::string)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), format!("format '{}'", format)))
}

fn strftime(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let x = cx.expr(call_arg(node, 0)?)?;
    Ok(SqlExpr::func("date_format", vec![x, format_arg(cx, node)?]))
}

fn string_to_time(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let x = cx.expr(call_arg(node, 0)?)?;
    let parsed = SqlExpr::func("str_to_date", vec![x, format_arg(cx, node)?]);
    Ok(SqlExpr::cast(parsed, cx.type_name(&DataType::time())?))
}

fn timestamp_truncate(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::TimestampTruncate { arg, unit } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a truncation", node)));
    };
    let ty = arg.dtype().cloned().unwrap_or_else(DataType::timestamp);
    if ty.is_time() {
        return Err(cx.unsupported_arg(node.kind(), "truncating a time"));
    }
    let format = match unit {
        IntervalUnit::Year => "%Y-01-01",
        IntervalUnit::Month => "%Y-%m-01",
        IntervalUnit::Day => "%Y-%m-%d",
        IntervalUnit::Hour => "%Y-%m-%d %H:00:00",
        IntervalUnit::Minute => "%Y-%m-%d %H:%i:00",
        IntervalUnit::Second => "%Y-%m-%d %H:%i:%s",
        other => {
            return Err(cx.unsupported_arg(
                node.kind(),
                format!("truncating to {}", other.sql_name().to_lowercase()),
            ));
        }
    };
    let (format, target) = if ty.is_date() {
        (format.to_string(), "DATE")
    } else if unit.is_date_unit() {
        (format!("{} 00:00:00", format), "DATETIME")
    } else {
        (format.to_string(), "DATETIME")
    };
    let formatted = SqlExpr::func("date_format", vec![cx.expr(arg)?, SqlExpr::string(format)]);
    Ok(SqlExpr::cast(formatted, target))
}

fn timestamp_from_unix(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::TimestampFromUnix { arg, unit } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a unix timestamp", node)));
    };
    let seconds = convert_unit(cx.expr(arg)?, *unit, TimeUnit::Second, false);
    Ok(SqlExpr::func("from_unixtime", vec![seconds]))
}

fn hash_bytes(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::HashBytes { how, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a hash", node)));
    };
    let x = nth(&cx.args(node)?, 0)?;
    let bits = match how {
        HashAlgorithm::Md5 | HashAlgorithm::Sha1 => return Ok(SqlExpr::func(how.name(), vec![x])),
        HashAlgorithm::Sha224 => 224,
        HashAlgorithm::Sha256 => 256,
        HashAlgorithm::Sha512 => 512,
    };
    Ok(SqlExpr::func("sha2", vec![x, SqlExpr::int(bits)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{call, lit, null, reduction, table};
    use crate::transpiler::{CompileOptions, Compiler};
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table(
            "t",
            [
                ("a", DataType::int64()),
                ("s", DataType::string()),
                ("ts", DataType::timestamp()),
                ("flag", DataType::boolean()),
            ],
        )
        .unwrap()
    }

    fn compile(expr: &Node) -> RelqResult<String> {
        Ok(Compiler::new(Dialect::MySql)
            .compile(expr, &CompileOptions::default())?
            .sql)
    }

    #[test]
    fn test_contains_uses_locate() {
        let t = t();
        let expr = t.col("s").unwrap().contains(lit("x")).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT LOCATE('x', t0.s) > 0 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_find_is_zero_based() {
        let t = t();
        let expr = call(Func::StringFind, [t.col("s").unwrap(), lit("x")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT LOCATE('x', t0.s) - 1 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_find_from_start_and_in_set() {
        let t = t();
        let from = call(Func::StringFind, [t.col("s").unwrap(), lit("x"), lit(2)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&from).unwrap(),
            "SELECT LOCATE('x', t0.s, 2 + 1) - 1 AS x FROM t AS t0"
        );
        let in_set = call(Func::FindInSet, [t.col("s").unwrap(), lit("a"), lit("b")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&in_set).unwrap(),
            "SELECT FIND_IN_SET(t0.s, CONCAT_WS(',', 'a', 'b')) - 1 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_date_parts_and_differences() {
        let t = t();
        let ymd = call(Func::DateFromYmd, [lit(2024), lit(1), lit(2)]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&ymd).unwrap(),
            "SELECT STR_TO_DATE(CONCAT_WS('-', 2024, 1, 2), '%Y-%c-%e') AS x"
        );
        let ts = || t.col("ts").unwrap();
        let months = call(Func::DateDelta, [ts(), ts(), lit("Month")]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&months).unwrap(),
            "SELECT TIMESTAMPDIFF(MONTH, t0.ts, t0.ts) AS x FROM t AS t0"
        );
        let fortnights = call(Func::DateDelta, [ts(), ts(), lit("fortnight")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert!(matches!(
            compile(&fortnights).unwrap_err(),
            RelqError::UnsupportedArgument(_)
        ));
    }

    #[test]
    fn test_casts_use_mysql_targets() {
        let t = t();
        let to_text = t.col("a").unwrap().cast(DataType::string()).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&to_text).unwrap(),
            "SELECT CAST(t0.a AS CHAR) AS x FROM t AS t0"
        );
        let epoch = t.col("ts").unwrap().cast(DataType::int64()).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&epoch).unwrap(),
            "SELECT CAST(UNIX_TIMESTAMP(t0.ts) * 1000000 AS SIGNED) AS x FROM t AS t0"
        );
        let typed_null = null(DataType::int64()).alias("x").unwrap();
        assert_eq!(compile(&typed_null).unwrap(), "SELECT CAST(NULL AS SIGNED) AS x");
    }

    #[test]
    fn test_strftime_specifiers() {
        let t = t();
        let expr = call(Func::Strftime, [t.col("ts").unwrap(), lit("%H:%M:%S 100%%")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT DATE_FORMAT(t0.ts, '%H:%i:%s 100%%') AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_truncate_through_date_format() {
        let t = t();
        let month = t.col("ts").unwrap().truncate(IntervalUnit::Month).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&month).unwrap(),
            "SELECT CAST(DATE_FORMAT(t0.ts, '%Y-%m-01 00:00:00') AS DATETIME) AS x FROM t AS t0"
        );
        let week = t.col("ts").unwrap().truncate(IntervalUnit::Week).unwrap();
        assert!(matches!(
            compile(&week).unwrap_err(),
            RelqError::UnsupportedArgument(_)
        ));
    }

    #[test]
    fn test_aggregate_filter_folds_into_case() {
        let t = t();
        let a = t.col("a").unwrap();
        let filtered = a.sum().unwrap().where_(a.gt(lit(0)).unwrap()).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&filtered).unwrap(),
            "SELECT SUM(CASE WHEN t0.a > 0 THEN t0.a END) AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_boolean_reductions_renamed() {
        let t = t();
        let any = reduction(AggFunc::Any, [t.col("flag").unwrap()]).unwrap().alias("x").unwrap();
        assert_eq!(compile(&any).unwrap(), "SELECT MAX(t0.flag) AS x FROM t AS t0");
    }

    #[test]
    fn test_full_outer_join_unsupported() {
        let left = t();
        let right = table("u", [("b", DataType::int64())]).unwrap();
        let pred = left.col("a").unwrap().eq(right.col("b").unwrap()).unwrap();
        let joined = left.join(&right, crate::ast::JoinKind::Outer, [pred]).unwrap();
        let err = compile(&joined).unwrap_err();
        assert!(matches!(err, RelqError::UnsupportedArgument(_)));
    }
}
