//! SQLite 3.

use super::{Dialect, DialectConfig, SamplePolicy};
use crate::ast::{AggFunc, DataType, Func, IntervalUnit, Node, Op, OpKind, TimeUnit, Value};
use crate::error::{RelqError, RelqResult};
use crate::sql::{SqlBinaryOp, SqlExpr, SqlUnaryOp};
use crate::transpiler::CompileContext;
use crate::transpiler::scalar::{self, call_arg, hex, literal_interval, nth, number, zero_based};
use crate::transpiler::util::convert_unit;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub(super) fn config() -> DialectConfig {
    DialectConfig::builder(Dialect::Sqlite)
        .unsupported([
            OpKind::Call(Func::Array),
            OpKind::Call(Func::ArrayLength),
            OpKind::Call(Func::ArrayPosition),
            OpKind::Call(Func::Map),
            OpKind::Call(Func::Unnest),
            OpKind::Call(Func::StringSplit),
            OpKind::Call(Func::Levenshtein),
            OpKind::Call(Func::RegexSearch),
            OpKind::Call(Func::RegexReplace),
            OpKind::Call(Func::RegexExtract),
            OpKind::Call(Func::Hash),
            OpKind::Call(Func::StringToTime),
            OpKind::Call(Func::LPad),
            OpKind::Call(Func::RPad),
            OpKind::Call(Func::Repeat),
            OpKind::Call(Func::Reverse),
            OpKind::Call(Func::FindInSet),
            OpKind::Call(Func::BaseConvert),
            OpKind::Call(Func::DateDelta),
            OpKind::Call(Func::TimestampDiff),
            OpKind::Call(Func::ExtractWeekOfYear),
            OpKind::Call(Func::ExtractProtocol),
            OpKind::Call(Func::ExtractAuthority),
            OpKind::Call(Func::ExtractUserInfo),
            OpKind::Call(Func::ExtractHost),
            OpKind::Call(Func::ExtractFile),
            OpKind::Call(Func::ExtractPath),
            OpKind::Call(Func::ExtractQuery),
            OpKind::Call(Func::ExtractFragment),
            OpKind::StructColumn,
            OpKind::HashBytes,
            OpKind::Reduction(AggFunc::Median),
            OpKind::Reduction(AggFunc::ApproxMedian),
            OpKind::Reduction(AggFunc::ArgMin),
            OpKind::Reduction(AggFunc::ArgMax),
            OpKind::Reduction(AggFunc::First),
            OpKind::Reduction(AggFunc::Last),
            OpKind::Reduction(AggFunc::Kurtosis),
            OpKind::Reduction(AggFunc::Variance),
            OpKind::Reduction(AggFunc::StandardDev),
            OpKind::Reduction(AggFunc::Covariance),
        ])
        .rename(OpKind::Call(Func::Date), "date")
        .rename(OpKind::Call(Func::Greatest), "max")
        .rename(OpKind::Call(Func::Least), "min")
        .rename(OpKind::Reduction(AggFunc::Any), "max")
        .rename(OpKind::Reduction(AggFunc::All), "min")
        .visitor(OpKind::Literal, literal)
        .visitor(OpKind::Cast, cast)
        .visitor(OpKind::Call(Func::RandomScalar), random)
        .visitor(OpKind::Call(Func::Cot), cot)
        .visitor(OpKind::Call(Func::StringContains), string_contains)
        .visitor(OpKind::Call(Func::StringFind), string_find)
        .visitor(OpKind::Call(Func::StartsWith), starts_with)
        .visitor(OpKind::Call(Func::EndsWith), ends_with)
        .visitor(OpKind::Call(Func::Capitalize), capitalize)
        .visitor(OpKind::Call(Func::BitwiseXor), bitwise_xor)
        .visitor(OpKind::Call(Func::ExtractYear), extract)
        .visitor(OpKind::Call(Func::ExtractMonth), extract)
        .visitor(OpKind::Call(Func::ExtractDay), extract)
        .visitor(OpKind::Call(Func::ExtractHour), extract)
        .visitor(OpKind::Call(Func::ExtractMinute), extract)
        .visitor(OpKind::Call(Func::ExtractSecond), extract)
        .visitor(OpKind::Call(Func::ExtractMillisecond), extract)
        .visitor(OpKind::Call(Func::ExtractMicrosecond), extract)
        .visitor(OpKind::Call(Func::ExtractDayOfYear), extract)
        .visitor(OpKind::Call(Func::ExtractEpochSeconds), extract)
        .visitor(OpKind::Call(Func::DayOfWeekIndex), day_of_week_index)
        .visitor(OpKind::Call(Func::DayOfWeekName), day_of_week_name)
        .visitor(OpKind::Call(Func::DateDiff), date_diff)
        .visitor(OpKind::Call(Func::DateFromYmd), date_from_ymd)
        .visitor(OpKind::Call(Func::TimestampAdd), date_add)
        .visitor(OpKind::Call(Func::DateAdd), date_add)
        .visitor(OpKind::Call(Func::Strftime), strftime)
        .visitor(
            OpKind::Reduction(AggFunc::ApproxCountDistinct),
            scalar::count_distinct,
        )
        .visitor(OpKind::TimestampTruncate, timestamp_truncate)
        .visitor(OpKind::TimestampFromUnix, timestamp_from_unix)
        .sample(SamplePolicy {
            methods: &[],
            supports_seed: false,
            physical_tables_only: false,
            random_fallback: true,
        })
        .build()
}

fn literal(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Literal { value, dtype } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a literal", node)));
    };
    // dates and times are stored as ISO-8601 text
    let expr = match value {
        Value::Date(d) => SqlExpr::string(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => SqlExpr::string(t.format("%H:%M:%S%.f").to_string()),
        Value::Timestamp(ts) => SqlExpr::string(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::Json(s) => SqlExpr::string(s.clone()),
        Value::String(s) => SqlExpr::string(s.clone()),
        Value::Uuid(u) => SqlExpr::string(u.to_string()),
        Value::Binary(bytes) => SqlExpr::Keyword(format!("X'{}'", hex(bytes))),
        Value::Float(f) if !f.is_finite() => {
            return Err(cx.unsupported_arg(node.kind(), "non-finite floating point value"));
        }
        Value::Interval(n) => {
            let unit = scalar::interval_unit(dtype);
            let text = modifier(*n, unit).ok_or_else(|| {
                let unit = unit.sql_name().to_lowercase();
                cx.unsupported_arg(node.kind(), format!("{} intervals", unit))
            })?;
            SqlExpr::string(text)
        }
        Value::Array(_) => return Err(cx.unsupported_arg(node.kind(), "array literal")),
        _ => scalar::literal(cx, value, dtype)?,
    };
    Ok(expr)
}

/// `CAST(STRFTIME(format, x) AS INTEGER)`.
fn strftime_int(format: &str, x: SqlExpr) -> SqlExpr {
    SqlExpr::cast(
        SqlExpr::func("strftime", vec![SqlExpr::string(format), x]),
        "INTEGER",
    )
}

fn epoch_seconds(x: SqlExpr) -> SqlExpr {
    strftime_int("%s", x)
}

fn cast(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Cast { arg, to } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a cast", node)));
    };
    if to.is_date() {
        return Ok(SqlExpr::func("date", vec![cx.expr(arg)?]));
    }
    if to.is_timestamp() {
        return Ok(SqlExpr::func("datetime", vec![cx.expr(arg)?]));
    }
    scalar::cast_with(cx, node, epoch_seconds)
}

fn random(_cx: &mut CompileContext<'_>, _node: &Node) -> RelqResult<SqlExpr> {
    // RANDOM() is a signed 64-bit integer
    let scaled = SqlExpr::binary(
        SqlExpr::func("random", Vec::new()),
        SqlBinaryOp::Divide,
        number("18446744073709551616.0"),
    );
    Ok(SqlExpr::binary(number("0.5"), SqlBinaryOp::Plus, scaled))
}

fn cot(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let tan = SqlExpr::func("tan", vec![nth(&cx.args(node)?, 0)?]);
    Ok(SqlExpr::binary(number("1.0"), SqlBinaryOp::Divide, tan))
}

/// `INSTR(haystack, needle)`, 1-based and 0 when absent.
fn instr(cx: &CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    Ok(SqlExpr::func("instr", cx.args(node)?))
}

// LIKE is case-insensitive in SQLite, so substring tests avoid it.
fn string_contains(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    Ok(SqlExpr::binary(instr(cx, node)?, SqlBinaryOp::Gt, SqlExpr::int(0)))
}

fn string_find(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    if call_arg(node, 2).is_ok() {
        return Err(cx.unsupported_arg(node.kind(), "start position"));
    }
    Ok(zero_based(instr(cx, node)?))
}

fn starts_with(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    let (x, prefix) = (nth(&args, 0)?, nth(&args, 1)?);
    let head = SqlExpr::func(
        "substr",
        vec![x, SqlExpr::int(1), SqlExpr::func("length", vec![prefix.clone()])],
    );
    Ok(SqlExpr::binary(head, SqlBinaryOp::Eq, prefix))
}

fn ends_with(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    let (x, suffix) = (nth(&args, 0)?, nth(&args, 1)?);
    let start = SqlExpr::Unary {
        op: SqlUnaryOp::Minus,
        expr: Box::new(SqlExpr::func("length", vec![suffix.clone()])),
    };
    let tail = SqlExpr::func("substr", vec![x, start]);
    Ok(SqlExpr::binary(tail, SqlBinaryOp::Eq, suffix))
}

fn capitalize(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    scalar::capitalize_by_parts(cx, node, "substr")
}

fn bitwise_xor(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    let (a, b) = (nth(&args, 0)?, nth(&args, 1)?);
    let or = SqlExpr::binary(a.clone(), SqlBinaryOp::BitOr, b.clone());
    let and = SqlExpr::binary(a, SqlBinaryOp::BitAnd, b);
    Ok(SqlExpr::binary(or, SqlBinaryOp::Minus, and))
}

fn extract(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::Call { func, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a call", node)));
    };
    let x = nth(&cx.args(node)?, 0)?;
    // %f is SS.SSS
    let fraction = |scale: i64| {
        let scaled = SqlExpr::binary(
            SqlExpr::func("strftime", vec![SqlExpr::string("%f"), x.clone()]),
            SqlBinaryOp::Multiply,
            SqlExpr::int(scale),
        );
        SqlExpr::binary(
            SqlExpr::cast(scaled, "INTEGER"),
            SqlBinaryOp::Modulo,
            SqlExpr::int(scale),
        )
    };
    let expr = match func {
        Func::ExtractYear => strftime_int("%Y", x),
        Func::ExtractMonth => strftime_int("%m", x),
        Func::ExtractDay => strftime_int("%d", x),
        Func::ExtractHour => strftime_int("%H", x),
        Func::ExtractMinute => strftime_int("%M", x),
        Func::ExtractSecond => strftime_int("%S", x),
        Func::ExtractDayOfYear => strftime_int("%j", x),
        Func::ExtractEpochSeconds => strftime_int("%s", x),
        Func::ExtractMillisecond => fraction(1000),
        Func::ExtractMicrosecond => fraction(1_000_000),
        other => {
            let kind = OpKind::Call(*other);
            return Err(RelqError::plan(format!("{} is not an extraction", kind)));
        }
    };
    Ok(expr)
}

/// 0 for Monday through 6 for Sunday.
fn day_of_week_index(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let sunday_first = strftime_int("%w", nth(&cx.args(node)?, 0)?);
    let shifted = SqlExpr::binary(sunday_first, SqlBinaryOp::Plus, SqlExpr::int(6));
    Ok(SqlExpr::binary(shifted, SqlBinaryOp::Modulo, SqlExpr::int(7)))
}

fn day_of_week_name(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let dow = strftime_int("%w", nth(&cx.args(node)?, 0)?);
    let cases = DAY_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                SqlExpr::binary(dow.clone(), SqlBinaryOp::Eq, SqlExpr::int(i as i64)),
                SqlExpr::string(*name),
            )
        })
        .collect();
    Ok(SqlExpr::Case {
        cases,
        default: None,
    })
}

fn date_diff(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    let days = SqlExpr::binary(
        SqlExpr::func("julianday", vec![nth(&args, 0)?]),
        SqlBinaryOp::Minus,
        SqlExpr::func("julianday", vec![nth(&args, 1)?]),
    );
    Ok(SqlExpr::cast(days, "INTEGER"))
}

fn date_from_ymd(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let mut args = vec![SqlExpr::string("%04d-%02d-%02d")];
    args.extend(cx.args(node)?);
    Ok(SqlExpr::func("date", vec![SqlExpr::func("printf", args)]))
}

/// Date modifier adding `n` units, such as `+14 days`.
fn modifier(n: i64, unit: IntervalUnit) -> Option<String> {
    let (n, name) = match unit {
        IntervalUnit::Year => (n, "years"),
        IntervalUnit::Quarter => (n * 3, "months"),
        IntervalUnit::Month => (n, "months"),
        IntervalUnit::Week => (n * 7, "days"),
        IntervalUnit::Day => (n, "days"),
        IntervalUnit::Hour => (n, "hours"),
        IntervalUnit::Minute => (n, "minutes"),
        IntervalUnit::Second => (n, "seconds"),
        _ => return None,
    };
    Some(format!("{:+} {}", n, name))
}

/// `DATETIME(x, '+n units')`; the interval must be a literal.
fn date_add(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let (n, unit) = literal_interval(call_arg(node, 1)?)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), "non-literal interval"))?;
    let text = modifier(n, unit).ok_or_else(|| {
        cx.unsupported_arg(node.kind(), format!("{} intervals", unit.sql_name().to_lowercase()))
    })?;
    let func = if node.dtype().is_some_and(DataType::is_date) {
        "date"
    } else {
        "datetime"
    };
    let x = cx.expr(call_arg(node, 0)?)?;
    Ok(SqlExpr::func(func, vec![x, SqlExpr::string(text)]))
}

fn strftime(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    Ok(SqlExpr::func("strftime", vec![nth(&args, 1)?, nth(&args, 0)?]))
}

fn timestamp_truncate(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::TimestampTruncate { arg, unit } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a truncation", node)));
    };
    let x = cx.expr(arg)?;
    let func = if arg.dtype().is_some_and(DataType::is_date) {
        "date"
    } else {
        "datetime"
    };
    let format = |f: &str| SqlExpr::func("strftime", vec![SqlExpr::string(f), x.clone()]);
    let modifiers: &[&str] = match unit {
        IntervalUnit::Year => &["start of year"],
        IntervalUnit::Month => &["start of month"],
        IntervalUnit::Week => &["-6 days", "weekday 1", "start of day"],
        IntervalUnit::Day => &["start of day"],
        IntervalUnit::Hour => return Ok(format("%Y-%m-%d %H:00:00")),
        IntervalUnit::Minute => return Ok(format("%Y-%m-%d %H:%M:00")),
        IntervalUnit::Second => return Ok(format("%Y-%m-%d %H:%M:%S")),
        other => {
            return Err(cx.unsupported_arg(
                node.kind(),
                format!("truncating to {}", other.sql_name().to_lowercase()),
            ));
        }
    };
    let mut args = vec![x];
    args.extend(modifiers.iter().map(|m| SqlExpr::string(*m)));
    Ok(SqlExpr::func(func, args))
}

fn timestamp_from_unix(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::TimestampFromUnix { arg, unit } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a unix timestamp", node)));
    };
    let seconds = convert_unit(cx.expr(arg)?, *unit, TimeUnit::Second, false);
    Ok(SqlExpr::func(
        "datetime",
        vec![seconds, SqlExpr::string("unixepoch")],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SampleMethod;
    use crate::ast::builders::{call, lit, lit_typed, table};
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
                ("d", DataType::date()),
            ],
        )
        .unwrap()
    }

    fn compile(expr: &Node) -> RelqResult<String> {
        Ok(Compiler::new(Dialect::Sqlite)
            .compile(expr, &CompileOptions::default())?
            .sql)
    }

    #[test]
    fn test_date_from_parts_and_find_start() {
        let t = t();
        let ymd = call(Func::DateFromYmd, [t.col("a").unwrap(), lit(1), lit(2)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&ymd).unwrap(),
            "SELECT DATE(PRINTF('%04d-%02d-%02d', t0.a, 1, 2)) AS x FROM t AS t0"
        );
        let from = call(Func::StringFind, [t.col("s").unwrap(), lit("x"), lit(2)])
            .unwrap()
            .alias("x")
            .unwrap();
        assert!(matches!(
            compile(&from).unwrap_err(),
            RelqError::UnsupportedArgument(_)
        ));
    }

    #[test]
    fn test_extract_through_strftime() {
        let t = t();
        let year = call(Func::ExtractYear, [t.col("ts").unwrap()]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&year).unwrap(),
            "SELECT CAST(STRFTIME('%Y', t0.ts) AS INTEGER) AS x FROM t AS t0"
        );
        let ms = call(Func::ExtractMillisecond, [t.col("ts").unwrap()])
            .unwrap()
            .alias("x")
            .unwrap();
        assert_eq!(
            compile(&ms).unwrap(),
            "SELECT CAST(STRFTIME('%f', t0.ts) * 1000 AS INTEGER) % 1000 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_day_of_week_index_starts_monday() {
        let t = t();
        let expr = call(Func::DayOfWeekIndex, [t.col("d").unwrap()]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT (CAST(STRFTIME('%w', t0.d) AS INTEGER) + 6) % 7 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_date_add_needs_literal_interval() {
        let t = t();
        let week = lit_typed(Value::Interval(2), DataType::interval(IntervalUnit::Week)).unwrap();
        let expr = call(Func::DateAdd, [t.col("d").unwrap(), week]).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT DATE(t0.d, '+14 days') AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_truncate_with_modifiers() {
        let t = t();
        let month = t.col("ts").unwrap().truncate(IntervalUnit::Month).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&month).unwrap(),
            "SELECT DATETIME(t0.ts, 'start of month') AS x FROM t AS t0"
        );
        let quarter = t.col("ts").unwrap().truncate(IntervalUnit::Quarter).unwrap();
        assert!(matches!(
            compile(&quarter).unwrap_err(),
            RelqError::UnsupportedArgument(_)
        ));
    }

    #[test]
    fn test_temporal_literals_are_text() {
        let day = lit(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).alias("x").unwrap();
        assert_eq!(compile(&day).unwrap(), "SELECT '2024-02-29' AS x");
        let bytes = lit(Value::Binary(vec![0xab])).alias("x").unwrap();
        assert_eq!(compile(&bytes).unwrap(), "SELECT X'ab' AS x");
    }

    #[test]
    fn test_contains_avoids_like() {
        let t = t();
        let expr = t.col("s").unwrap().contains(lit("x")).unwrap().alias("x").unwrap();
        assert_eq!(
            compile(&expr).unwrap(),
            "SELECT INSTR(t0.s, 'x') > 0 AS x FROM t AS t0"
        );
    }

    #[test]
    fn test_sample_falls_back_to_random() {
        let sampled = t()
            .select_columns(&["a"])
            .unwrap()
            .sample(0.5, SampleMethod::Row, None)
            .unwrap();
        let sql = compile(&sampled).unwrap();
        assert!(
            sql.contains("WHERE 0.5 + RANDOM() / 18446744073709551616.0 <= 0.5"),
            "{}",
            sql
        );
    }

    #[test]
    fn test_denied_functions() {
        let t = t();
        let rev = call(Func::Reverse, [t.col("s").unwrap()]).unwrap();
        let err = compile(&rev).unwrap_err();
        assert_eq!(err.as_unsupported().unwrap().kind, OpKind::Call(Func::Reverse));
    }
}
