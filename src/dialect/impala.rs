//! Apache Impala.
//!
//! Impala has the narrowest surface of the supported engines: no `FILTER`
//! clause on aggregates, no typed temporal literals, frames only on
//! value-returning analytic functions, and `SELECT DISTINCT ... ORDER BY`
//! only over selected columns.

use super::{Dialect, DialectConfig, SamplePolicy};
use crate::ast::{
    AggFunc, AnalyticFunc, DataType, Func, HashAlgorithm, IntervalUnit, Node, Op, OpKind,
    SampleMethod, TimeUnit, TypeKind, Value,
};
use crate::error::{RelqError, RelqResult};
use crate::rewrites::{self, WindowSpec};
use crate::sql::{SqlBinaryOp, SqlExpr};
use crate::transpiler::CompileContext;
use crate::transpiler::scalar::{
    self, call_arg, literal_interval, literal_str, nth, number, zero_based,
};
use crate::transpiler::util::{convert_unit, translate_format};

/// strftime directives as Java `SimpleDateFormat` patterns.
const DATE_FORMAT: &[(char, &str)] = &[
    ('Y', "yyyy"),
    ('y', "yy"),
    ('m', "MM"),
    ('d', "dd"),
    ('H', "HH"),
    ('I', "hh"),
    ('M', "mm"),
    ('S', "ss"),
    ('f', "SSSSSS"),
    ('p', "a"),
    ('b', "MMM"),
    ('B', "MMMM"),
    ('a', "EEE"),
    ('A', "EEEE"),
    ('j', "DDD"),
];

pub(super) fn config() -> DialectConfig {
    DialectConfig::builder(Dialect::Impala)
        .unsupported([
            OpKind::Call(Func::ArrayPosition),
            OpKind::Call(Func::Array),
            OpKind::Call(Func::ExtractDayOfYear),
            OpKind::Call(Func::Levenshtein),
            OpKind::Call(Func::Map),
            OpKind::Call(Func::StringSplit),
            OpKind::Call(Func::StringToTime),
            OpKind::Call(Func::Unnest),
            OpKind::StructColumn,
            OpKind::Reduction(AggFunc::ArgMax),
            OpKind::Reduction(AggFunc::ArgMin),
            OpKind::Reduction(AggFunc::Covariance),
            OpKind::Reduction(AggFunc::Median),
            OpKind::Reduction(AggFunc::Kurtosis),
            OpKind::Analytic(AnalyticFunc::NthValue),
        ])
        .rename(OpKind::Reduction(AggFunc::All), "min")
        .rename(OpKind::Reduction(AggFunc::Any), "max")
        .rename(OpKind::Reduction(AggFunc::ApproxMedian), "appx_median")
        .rename(OpKind::Call(Func::BitwiseAnd), "bitand")
        .rename(OpKind::Call(Func::BitwiseOr), "bitor")
        .rename(OpKind::Call(Func::BitwiseXor), "bitxor")
        .rename(OpKind::Call(Func::BitwiseNot), "bitnot")
        .rename(OpKind::Call(Func::BitwiseLeftShift), "shiftleft")
        .rename(OpKind::Call(Func::BitwiseRightShift), "shiftright")
        .rename(OpKind::Call(Func::DayOfWeekName), "dayname")
        .rename(OpKind::Call(Func::ExtractEpochSeconds), "unix_timestamp")
        .rename(OpKind::Call(Func::Hash), "fnv_hash")
        .rename(OpKind::Call(Func::RegexExtract), "regexp_extract")
        .rename(OpKind::Call(Func::DateDiff), "datediff")
        .rename(OpKind::Call(Func::BaseConvert), "conv")
        .rename(OpKind::Call(Func::ExtractWeekOfYear), "weekofyear")
        .visitor(OpKind::Literal, literal)
        .visitor(OpKind::Cast, cast)
        .visitor(OpKind::Call(Func::RandomScalar), random)
        .visitor(OpKind::Call(Func::DayOfWeekIndex), day_of_week_index)
        .visitor(OpKind::Call(Func::ExtractMillisecond), extract_millisecond)
        .visitor(OpKind::Call(Func::ExtractMicrosecond), extract_microsecond)
        .visitor(OpKind::Call(Func::Degrees), degrees)
        .visitor(OpKind::Call(Func::Radians), radians)
        .visitor(OpKind::Call(Func::StringContains), string_contains)
        .visitor(OpKind::Call(Func::StringFind), string_find)
        .visitor(OpKind::Call(Func::FindInSet), scalar::find_in_set)
        .visitor(OpKind::Call(Func::ExtractProtocol), parse_url)
        .visitor(OpKind::Call(Func::ExtractAuthority), parse_url)
        .visitor(OpKind::Call(Func::ExtractUserInfo), parse_url)
        .visitor(OpKind::Call(Func::ExtractHost), parse_url)
        .visitor(OpKind::Call(Func::ExtractFile), parse_url)
        .visitor(OpKind::Call(Func::ExtractPath), parse_url)
        .visitor(OpKind::Call(Func::ExtractQuery), parse_url)
        .visitor(OpKind::Call(Func::ExtractFragment), parse_url)
        .visitor(OpKind::Call(Func::Log), log)
        .visitor(OpKind::Call(Func::DateFromYmd), date_from_ymd)
        .visitor(OpKind::Call(Func::TimestampDiff), timestamp_diff)
        .visitor(OpKind::Call(Func::DateDelta), date_delta)
        .visitor(OpKind::Call(Func::Strftime), strftime)
        .visitor(OpKind::Call(Func::TimestampAdd), timestamp_add)
        .visitor(OpKind::Call(Func::DateAdd), date_add)
        .visitor(OpKind::Call(Func::Date), date)
        .visitor(OpKind::Call(Func::Round), round)
        .visitor(OpKind::Call(Func::Sign), sign)
        .visitor(OpKind::Call(Func::Strip), strip)
        .visitor(OpKind::TimestampTruncate, timestamp_truncate)
        .visitor(OpKind::TimestampFromUnix, timestamp_from_unix)
        .visitor(OpKind::HashBytes, hash_bytes)
        .pre_rewrite(
            "rewrite_empty_order_by_window",
            rewrites::rewrite_empty_order_by_window,
        )
        .post_rewrite(
            "split_select_distinct_with_order_by",
            rewrites::split_select_distinct_with_order_by,
        )
        .sample(SamplePolicy {
            methods: &[SampleMethod::Block],
            supports_seed: true,
            physical_tables_only: true,
            random_fallback: false,
        })
        .minimize_spec(minimize_spec)
        .aggregate_filter(false)
        .build()
}

/// Only value functions take a frame.
fn minimize_spec(func: &Node, spec: WindowSpec) -> WindowSpec {
    let mut spec = rewrites::minimize_spec(func, spec);
    match func.kind() {
        OpKind::Analytic(f)
            if !matches!(
                f,
                AnalyticFunc::FirstValue | AnalyticFunc::LastValue | AnalyticFunc::NthValue
            ) =>
        {
            spec.frame = None;
        }
        OpKind::Reduction(_) if spec.order_by.is_empty() => spec.frame = None,
        _ => {}
    }
    spec
}

fn literal(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Literal { value, dtype } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a literal", node)));
    };
    // temporal values go in as strings, typed date literals only cover a narrow range
    match value {
        Value::Null if dtype.is_binary() => Ok(SqlExpr::null()),
        Value::Date(d) => Ok(SqlExpr::string(d.format("%Y-%m-%d").to_string())),
        Value::Timestamp(ts) => Ok(SqlExpr::string(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string())),
        Value::Uuid(u) => Ok(SqlExpr::string(u.to_string())),
        _ if dtype.is_nested() => Err(RelqError::backend_type(dtype, cx.dialect())),
        _ => scalar::literal(cx, value, dtype),
    }
}

fn unix_timestamp(x: SqlExpr) -> SqlExpr {
    SqlExpr::func("unix_timestamp", vec![x])
}

fn cast(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    scalar::cast_with(cx, node, unix_timestamp)
}

fn random(_cx: &mut CompileContext<'_>, _node: &Node) -> RelqResult<SqlExpr> {
    let seed = SqlExpr::func(
        "utc_to_unix_micros",
        vec![SqlExpr::func("utc_timestamp", Vec::new())],
    );
    Ok(SqlExpr::func("rand", vec![seed]))
}

/// `dayofweek` counts from Sunday = 1.
fn day_of_week_index(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let dow = SqlExpr::func("dayofweek", vec![nth(&cx.args(node)?, 0)?]);
    Ok(SqlExpr::func(
        "pmod",
        vec![
            SqlExpr::binary(dow, SqlBinaryOp::Minus, SqlExpr::int(2)),
            SqlExpr::int(7),
        ],
    ))
}

fn extract_modulo(
    cx: &CompileContext<'_>,
    node: &Node,
    field: &str,
    modulus: i64,
) -> RelqResult<SqlExpr> {
    let extracted = SqlExpr::Extract {
        field: field.to_string(),
        expr: Box::new(nth(&cx.args(node)?, 0)?),
    };
    Ok(SqlExpr::binary(extracted, SqlBinaryOp::Modulo, SqlExpr::int(modulus)))
}

fn extract_millisecond(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    extract_modulo(cx, node, "MILLISECOND", 1_000)
}

fn extract_microsecond(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    extract_modulo(cx, node, "MICROSECOND", 1_000_000)
}

fn pi() -> SqlExpr {
    SqlExpr::func("pi", Vec::new())
}

fn degrees(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let x = nth(&cx.args(node)?, 0)?;
    let scaled = SqlExpr::binary(number("180.0"), SqlBinaryOp::Multiply, x);
    Ok(SqlExpr::binary(scaled, SqlBinaryOp::Divide, pi()))
}

fn radians(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let x = nth(&cx.args(node)?, 0)?;
    let scaled = SqlExpr::binary(pi(), SqlBinaryOp::Multiply, x);
    Ok(SqlExpr::binary(scaled, SqlBinaryOp::Divide, number("180.0")))
}

fn string_contains(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    Ok(SqlExpr::binary(scalar::locate(cx, node)?, SqlBinaryOp::Gt, SqlExpr::int(0)))
}

fn string_find(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    Ok(zero_based(scalar::locate(cx, node)?))
}

fn parse_url(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let part = match node.kind() {
        OpKind::Call(Func::ExtractProtocol) => "PROTOCOL",
        OpKind::Call(Func::ExtractAuthority) => "AUTHORITY",
        OpKind::Call(Func::ExtractUserInfo) => "USERINFO",
        OpKind::Call(Func::ExtractHost) => "HOST",
        OpKind::Call(Func::ExtractFile) => "FILE",
        OpKind::Call(Func::ExtractPath) => "PATH",
        OpKind::Call(Func::ExtractQuery) => "QUERY",
        OpKind::Call(Func::ExtractFragment) => "REF",
        other => return Err(RelqError::plan(format!("{} is not a URL part", other))),
    };
    let mut args = cx.args(node)?;
    args.insert(1, SqlExpr::string(part));
    Ok(SqlExpr::func("parse_url", args))
}

/// `log(base, x)`, natural without a base.
fn log(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    let x = nth(&args, 0)?;
    match args.get(1) {
        Some(base) => Ok(SqlExpr::func("log", vec![base.clone(), x])),
        None => Ok(SqlExpr::func("ln", vec![x])),
    }
}

/// `CAST('YYYY-MM-DD' AS DATE)` assembled from zero-padded parts.
fn date_from_ymd(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let string = cx.type_name(&DataType::string())?;
    let args = cx.args(node)?;
    let padded = |i: usize, width: i64| -> RelqResult<SqlExpr> {
        Ok(SqlExpr::func(
            "lpad",
            vec![
                SqlExpr::cast(nth(&args, i)?, string.clone()),
                SqlExpr::int(width),
                SqlExpr::string("0"),
            ],
        ))
    };
    let text = SqlExpr::func(
        "concat",
        vec![
            padded(0, 4)?,
            SqlExpr::string("-"),
            padded(1, 2)?,
            SqlExpr::string("-"),
            padded(2, 2)?,
        ],
    );
    Ok(SqlExpr::cast(text, cx.type_name(&DataType::date())?))
}

fn timestamp_diff(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    Ok(SqlExpr::binary(
        unix_timestamp(nth(&args, 0)?),
        SqlBinaryOp::Minus,
        unix_timestamp(nth(&args, 1)?),
    ))
}

/// Only whole days, through `datediff`.
fn date_delta(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let part = scalar::date_delta_part(cx, node)?;
    if part != "day" {
        return Err(cx.unsupported_arg(node.kind(), format!("part '{}'", part)));
    }
    let args = cx.args(node)?;
    Ok(SqlExpr::func("datediff", vec![nth(&args, 0)?, nth(&args, 1)?]))
}

fn strftime(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let format = literal_str(call_arg(node, 1)?)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), "non-literal format string"))?;
    let pattern = translate_format(format, DATE_FORMAT)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), format!("format '{}'", format)))?;
    let text = SqlExpr::cast(cx.expr(call_arg(node, 0)?)?, cx.type_name(&DataType::string())?);
    Ok(SqlExpr::func(
        "from_unixtime",
        vec![unix_timestamp(text), SqlExpr::string(pattern)],
    ))
}

/// `left + INTERVAL n UNITS` with both sides cast to `target`.
fn add_interval(cx: &CompileContext<'_>, node: &Node, target: DataType) -> RelqResult<SqlExpr> {
    let (n, unit) = literal_interval(call_arg(node, 1)?)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), "non-literal interval"))?;
    let target = cx.type_name(&target)?;
    let left = SqlExpr::cast(cx.expr(call_arg(node, 0)?)?, target.clone());
    let interval = SqlExpr::Interval {
        value: Box::new(SqlExpr::int(n)),
        unit,
    };
    Ok(SqlExpr::cast(
        SqlExpr::binary(left, SqlBinaryOp::Plus, interval),
        target,
    ))
}

fn timestamp_add(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    add_interval(cx, node, DataType::timestamp())
}

fn date_add(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    add_interval(cx, node, DataType::date())
}

fn date(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let day = SqlExpr::func("to_date", vec![nth(&cx.args(node)?, 0)?]);
    Ok(SqlExpr::cast(day, cx.type_name(&DataType::date())?))
}

/// Cast a numeric result back to the declared integer output type.
fn cast_to_output(
    cx: &CompileContext<'_>,
    node: &Node,
    expr: SqlExpr,
    keep: fn(&DataType) -> bool,
) -> RelqResult<SqlExpr> {
    match node.dtype() {
        Some(ty) if !keep(ty) => Ok(SqlExpr::cast(expr, cx.type_name(ty)?)),
        _ => Ok(expr),
    }
}

fn round(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let rounded = SqlExpr::func("round", cx.args(node)?);
    cast_to_output(cx, node, rounded, |ty| !ty.is_integer())
}

fn sign(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let sign = SqlExpr::func("sign", cx.args(node)?);
    cast_to_output(cx, node, sign, |ty| matches!(ty.kind, TypeKind::Float32))
}

/// `TRIM` takes no character set in Impala.
fn strip(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let x = nth(&cx.args(node)?, 0)?;
    Ok(SqlExpr::func("rtrim", vec![SqlExpr::func("ltrim", vec![x])]))
}

fn timestamp_truncate(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::TimestampTruncate { arg, unit } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a truncation", node)));
    };
    let x = cx.expr(arg)?;
    let name = match unit {
        IntervalUnit::Quarter => return Ok(SqlExpr::func("trunc", vec![x, SqlExpr::string("Q")])),
        IntervalUnit::Millisecond => "MILLISECONDS",
        IntervalUnit::Microsecond => "MICROSECONDS",
        IntervalUnit::Nanosecond => {
            return Err(cx.unsupported_arg(node.kind(), "truncating to nanosecond"));
        }
        other => other.sql_name(),
    };
    Ok(SqlExpr::func("date_trunc", vec![SqlExpr::string(name), x]))
}

fn timestamp_from_unix(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::TimestampFromUnix { arg, unit } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a unix timestamp", node)));
    };
    let seconds = convert_unit(cx.expr(arg)?, *unit, TimeUnit::Second, true);
    let seconds = SqlExpr::cast(seconds, cx.type_name(&DataType::int32())?);
    let text = SqlExpr::func(
        "from_unixtime",
        vec![seconds, SqlExpr::string("yyyy-MM-dd HH:mm:ss")],
    );
    Ok(SqlExpr::cast(text, cx.type_name(&DataType::timestamp())?))
}

fn hash_bytes(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::HashBytes { how, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a hash", node)));
    };
    if *how == HashAlgorithm::Sha224 {
        return Err(cx.unsupported_arg(node.kind(), "sha224 hashing"));
    }
    Ok(SqlExpr::func(how.name(), vec![nth(&cx.args(node)?, 0)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{analytic, call, lit, lit_typed, table};
    use crate::ast::WindowFrame;
    use crate::transpiler::{CompileOptions, Compiler};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table(
            "t",
            [
                ("a", DataType::int64()),
                ("s", DataType::string()),
                ("ts", DataType::timestamp()),
                ("g", DataType::string()),
            ],
        )
        .unwrap()
    }

    fn compile(expr: &Node) -> RelqResult<String> {
        Ok(Compiler::new(Dialect::Impala)
            .compile(expr, &CompileOptions::default())?
            .sql)
    }

    #[test]
    fn test_renamed_bitwise_functions() {
        let t = t();
        let expr = call(Func::BitwiseAnd, [t.col("a").unwrap(), lit(6)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(compile(&expr).unwrap(), "SELECT BITAND(t0.a, 6) AS x FROM t AS t0");
    }

    #[test]
    fn test_day_of_week_index() {
        let t = t();
        let expr = call(Func::DayOfWeekIndex, [t.col("ts").unwrap()])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT PMOD(DAYOFWEEK(t0.ts) - 2, 7) AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_temporal_literals_are_strings() {
        let day = lit(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).alias("x").unwrap();
        assert_eq!(compile(&day).unwrap(), "SELECT '2024-01-02' AS x");
    }

    #[test]
    fn test_array_literal_has_no_representation() {
        let arr = lit(Value::Array(vec![Value::Int(1)])).alias("x").unwrap();
        assert!(matches!(
            compile(&arr).unwrap_err(),
            RelqError::UnsupportedBackendType { .. }
        ));
    }

    #[test]
    fn test_truncate_units() {
        let t = t();
        let month = t
            .col("ts")
            .unwrap()
            .truncate(IntervalUnit::Month)
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&month).unwrap(),
            "SELECT DATE_TRUNC('MONTH', t0.ts) AS x FROM t AS t0"
        );
        let quarter = t
            .col("ts")
            .unwrap()
            .truncate(IntervalUnit::Quarter)
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&quarter).unwrap(),
            "SELECT TRUNC(t0.ts, 'Q') AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_timestamp_add_requires_literal_interval() {
        let t = t();
        let three_days =
            lit_typed(Value::Interval(3), DataType::interval(IntervalUnit::Day)).unwrap();
        let expr = call(Func::TimestampAdd, [t.col("ts").unwrap(), three_days])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT CAST(CAST(t0.ts AS TIMESTAMP) + INTERVAL 3 DAYS AS TIMESTAMP) AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_strftime_uses_java_patterns() {
        let t = t();
        let expr = call(Func::Strftime, [t.col("ts").unwrap(), lit("%Y/%m/%d")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT FROM_UNIXTIME(UNIX_TIMESTAMP(CAST(t0.ts AS STRING)), 'yyyy/MM/dd') AS x \
             FROM t AS t0"
        );
    }

    #[test]
    fn test_ranking_window_drops_frame_and_gets_order() {
        let t = t();
        let rn = analytic(AnalyticFunc::RowNumber, [])
            .unwrap()
            .over([t.col("g").unwrap()], [], Some(WindowFrame::full()))
            .unwrap()
            .alias("rn")
            .unwrap();
        assert_eq!(
            compile(&rn).unwrap(),
            "SELECT ROW_NUMBER() OVER (PARTITION BY t0.g ORDER BY NULL ASC) AS rn FROM t AS t0"
        );
    }

    #[test]
    fn test_row_sampling_unsupported() {
        let sampled = t().sample(0.1, SampleMethod::Row, None).unwrap();
        let err = compile(&sampled).unwrap_err();
        assert_eq!(err.as_unsupported().unwrap().kind, OpKind::Sample);
    }

    #[test]
    fn test_url_parts_use_parse_url() {
        let t = t();
        let host = call(Func::ExtractHost, [t.col("s").unwrap()]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&host).unwrap(),
            "SELECT PARSE_URL(t0.s, 'HOST') AS x FROM t AS t0"
        );
        let query = call(Func::ExtractQuery, [t.col("s").unwrap(), lit("q")])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&query).unwrap(),
            "SELECT PARSE_URL(t0.s, 'QUERY', 'q') AS x FROM t AS t0"
        );
        let fragment = call(Func::ExtractFragment, [t.col("s").unwrap()])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&fragment).unwrap(),
            "SELECT PARSE_URL(t0.s, 'REF') AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_log_puts_base_first() {
        let t = t();
        let log = call(Func::Log, [t.col("a").unwrap(), lit(3)]).unwrap().alias("x").unwrap();
        assert_eq!(compile(&log).unwrap(), "SELECT LOG(3, t0.a) AS x FROM t AS t0");
        let ln = call(Func::Log, [t.col("a").unwrap()]).unwrap().alias("x").unwrap();
        assert_eq!(compile(&ln).unwrap(), "SELECT LN(t0.a) AS x FROM t AS t0");
    }

    #[test]
    fn test_date_from_parts() {
        let expr = call(Func::DateFromYmd, [lit(2024), lit(1), lit(2)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT CAST(CONCAT(LPAD(CAST(2024 AS STRING), 4, '0'), '-', \
             LPAD(CAST(1 AS STRING), 2, '0'), '-', LPAD(CAST(2 AS STRING), 2, '0')) AS DATE) AS x"
        );
    }

    #[test]
    fn test_string_find_from_start() {
        let t = t();
        let expr = call(Func::StringFind, [t.col("s").unwrap(), lit("x"), lit(3)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT LOCATE('x', t0.s, 3 + 1) - 1 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_find_in_set_joins_values() {
        let t = t();
        let expr = call(Func::FindInSet, [t.col("s").unwrap(), lit("a"), t.col("g").unwrap()])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT FIND_IN_SET(t0.s, CONCAT_WS(',', 'a', t0.g)) - 1 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_renamed_conversions() {
        let t = t();
        let conv = call(Func::BaseConvert, [t.col("s").unwrap(), lit(16), lit(10)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(compile(&conv).unwrap(), "SELECT CONV(t0.s, 16, 10) AS x FROM t AS t0");
        let week = call(Func::ExtractWeekOfYear, [t.col("ts").unwrap()])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(compile(&week).unwrap(), "SELECT WEEKOFYEAR(t0.ts) AS x FROM t AS t0");
    }

    #[test]
    fn test_timestamp_and_date_differences() {
        let t = t();
        let ts = || t.col("ts").unwrap();
        let diff = call(Func::TimestampDiff, [ts(), ts()]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&diff).unwrap(),
            "SELECT UNIX_TIMESTAMP(t0.ts) - UNIX_TIMESTAMP(t0.ts) AS x FROM t AS t0"
        );
        let days = call(Func::DateDelta, [ts(), ts(), lit("day")]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&days).unwrap(),
            "SELECT DATEDIFF(t0.ts, t0.ts) AS x FROM t AS t0"
        );
        let months = call(Func::DateDelta, [ts(), ts(), lit("month")]).unwrap().alias("x").unwrap();
        assert!(matches!(
            compile(&months).unwrap_err(),
            RelqError::UnsupportedArgument(_)
        ));
    }

    #[test]
    fn test_unix_seconds_floor_negative_counts() {
        let t = t();
        let expr = t
            .col("a")
            .unwrap()
            .to_timestamp(TimeUnit::Millisecond)
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT CAST(FROM_UNIXTIME(CAST(FLOOR(t0.a / 1000) AS INT), 'yyyy-MM-dd HH:mm:ss') \
             AS TIMESTAMP) AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_denied_nth_value() {
        let t = t();
        let nth_value = analytic(AnalyticFunc::NthValue, [t.col("a").unwrap(), lit(2)])
            .unwrap()
            .over([], [t.col("a").unwrap()], None)
            .unwrap();
        let err = compile(&nth_value).unwrap_err();
        assert_eq!(
            err.as_unsupported().unwrap().kind,
            OpKind::Analytic(AnalyticFunc::NthValue)
        );
    }
}
