//! Generic translations of scalar operations.
//!
//! These are used for every kind a dialect neither denies, overrides with a
//! visitor, nor renames. The `pub` helpers are the building blocks dialect
//! visitors compose.

use super::context::CompileContext;
use super::util::convert_unit;
use crate::ast::{
    AggFunc, BinaryOp, DataType, Func, IntervalUnit, Node, Op, TimeUnit, TypeKind,
    UnaryOp, Value, WindowFrame,
};
use crate::error::{RelqError, RelqResult};
use crate::rewrites::WindowSpec;
use crate::sql::{OrderByExpr, SqlBinaryOp, SqlExpr, SqlLiteral, SqlUnaryOp};

/// Default translation of a scalar node whose children are already compiled.
pub fn translate(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    match node.op() {
        Op::Field { rel, name } => Ok(SqlExpr::column(cx.alias(rel)?, name.clone())),
        Op::Literal { value, dtype } => literal(cx, value, dtype),
        Op::ScalarParameter { name, .. } => Ok(SqlExpr::Placeholder(name.clone())),
        Op::Alias { arg, .. } => cx.expr(arg),
        Op::SortKey { expr, .. } => cx.expr(expr),
        Op::Cast { .. } => cast_with(cx, node, extract_epoch),
        Op::Binary { op, left, right } => binary(cx, *op, left, right),
        Op::Unary { op, arg } => {
            let x = cx.expr(arg)?;
            Ok(match op {
                UnaryOp::Not => SqlExpr::not(x),
                UnaryOp::Negate => SqlExpr::Unary {
                    op: SqlUnaryOp::Minus,
                    expr: Box::new(x),
                },
                UnaryOp::IsNull => SqlExpr::IsNull {
                    expr: Box::new(x),
                    negated: false,
                },
                UnaryOp::NotNull => SqlExpr::IsNull {
                    expr: Box::new(x),
                    negated: true,
                },
            })
        }
        Op::IfElse { cases, default } => Ok(SqlExpr::Case {
            cases: cases
                .iter()
                .map(|(when, then)| Ok((cx.expr(when)?, cx.expr(then)?)))
                .collect::<RelqResult<Vec<_>>>()?,
            default: default.as_ref().map(|d| cx.expr(d)).transpose()?.map(Box::new),
        }),
        Op::InValues { arg, options } => Ok(SqlExpr::InList {
            expr: Box::new(cx.expr(arg)?),
            list: cx.exprs(options)?,
            negated: false,
        }),
        Op::StructColumn { values, .. } => Ok(SqlExpr::func("row", cx.exprs(values)?)),
        Op::Call { func, .. } => call(cx, node, *func),
        Op::Reduction { func, .. } => match func {
            AggFunc::ApproxMedian => Ok(SqlExpr::func(
                "approx_quantile",
                vec![nth(&cx.args(node)?, 0)?, number("0.5")],
            )),
            _ => reduction(cx, node, func.sql_name()),
        },
        Op::Analytic { func, .. } => Ok(SqlExpr::func(func.sql_name(), cx.args(node)?)),
        Op::WindowFunction { .. } => window(cx, node),
        Op::TimestampTruncate { arg, unit } => {
            if *unit == IntervalUnit::Nanosecond {
                return Err(cx.unsupported_arg(node.kind(), "nanosecond truncation"));
            }
            let x = cx.expr(arg)?;
            let truncated = SqlExpr::func(
                "date_trunc",
                vec![SqlExpr::string(unit.sql_name().to_lowercase()), x],
            );
            if is_date(arg) {
                return Ok(SqlExpr::cast(truncated, cx.type_name(&DataType::date())?));
            }
            Ok(truncated)
        }
        Op::TimestampFromUnix { arg, unit } => {
            let seconds = convert_unit(cx.expr(arg)?, *unit, TimeUnit::Second, false);
            Ok(SqlExpr::func("to_timestamp", vec![seconds]))
        }
        Op::HashBytes { arg, how } => Ok(SqlExpr::func(how.name(), vec![cx.expr(arg)?])),
        _ => Err(RelqError::plan(format!("{} is not a scalar", node))),
    }
}

/// Translate a call-like node as a plain call of `name`.
pub fn renamed(cx: &mut CompileContext<'_>, node: &Node, name: &str) -> RelqResult<SqlExpr> {
    match node.op() {
        Op::Reduction { .. } => reduction(cx, node, name),
        _ => Ok(SqlExpr::func(name, cx.args(node)?)),
    }
}

/// A literal value of type `dtype`.
pub fn literal(cx: &CompileContext<'_>, value: &Value, dtype: &DataType) -> RelqResult<SqlExpr> {
    let cast = |text: String| -> RelqResult<SqlExpr> {
        Ok(SqlExpr::cast(SqlExpr::string(text), cx.type_name(dtype)?))
    };
    match value {
        Value::Null => Ok(typed_null(cx, dtype)),
        Value::Bool(b) => Ok(SqlExpr::Literal(SqlLiteral::Bool(*b))),
        Value::Int(n) => Ok(SqlExpr::int(*n)),
        Value::UInt(n) => Ok(number(n.to_string())),
        Value::Float(f) if f.is_nan() => cast("NaN".to_string()),
        Value::Float(f) if f.is_infinite() => {
            cast(if *f > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
        }
        Value::Float(f) => Ok(number(format!("{:?}", f))),
        Value::Decimal(d) => Ok(number(d.to_string())),
        Value::String(s) if dtype.is_json() => cast(s.clone()),
        Value::String(s) => Ok(SqlExpr::string(s.clone())),
        Value::Json(s) => cast(s.clone()),
        Value::Binary(bytes) => Ok(SqlExpr::func("unhex", vec![SqlExpr::string(hex(bytes))])),
        Value::Date(d) => cast(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => cast(t.format("%H:%M:%S%.f").to_string()),
        Value::Timestamp(ts) => cast(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::Uuid(u) => match cx.type_name(dtype) {
            Ok(ty) => Ok(SqlExpr::cast(SqlExpr::string(u.to_string()), ty)),
            Err(_) => Ok(SqlExpr::string(u.to_string())),
        },
        Value::Interval(n) => Ok(SqlExpr::Interval {
            value: Box::new(SqlExpr::int(*n)),
            unit: interval_unit(dtype),
        }),
        Value::Array(items) => {
            let elem = dtype.element().cloned().unwrap_or_else(DataType::null);
            let items = items
                .iter()
                .map(|v| literal(cx, v, &elem))
                .collect::<RelqResult<Vec<_>>>()?;
            Ok(SqlExpr::Array(items))
        }
    }
}

/// `NULL` carrying its type, or a bare `NULL` when the dialect cannot spell it.
pub fn typed_null(cx: &CompileContext<'_>, dtype: &DataType) -> SqlExpr {
    if dtype.is_null() {
        return SqlExpr::null();
    }
    match cx.type_name(dtype) {
        Ok(ty) => SqlExpr::cast(SqlExpr::null(), ty),
        Err(_) => SqlExpr::null(),
    }
}

pub fn number(text: impl Into<String>) -> SqlExpr {
    SqlExpr::Literal(SqlLiteral::Number(text.into()))
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn interval_unit(dtype: &DataType) -> IntervalUnit {
    match dtype.kind {
        TypeKind::Interval(unit) => unit,
        _ => IntervalUnit::Second,
    }
}

fn extract_epoch(x: SqlExpr) -> SqlExpr {
    SqlExpr::Extract {
        field: "EPOCH".to_string(),
        expr: Box::new(x),
    }
}

/// `CAST`, with temporal to integer casts going through `epoch_seconds`
/// and scaled to the source timestamp's unit.
pub fn cast_with(
    cx: &mut CompileContext<'_>,
    node: &Node,
    epoch_seconds: fn(SqlExpr) -> SqlExpr,
) -> RelqResult<SqlExpr> {
    let Op::Cast { arg, to } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a cast", node)));
    };
    if matches!(arg.op(), Op::Literal { value: Value::Null, .. }) {
        return Ok(typed_null(cx, to));
    }
    let x = cx.expr(arg)?;
    if to.is_integer()
        && let Some(unit) = epoch_unit(arg)
    {
        let count = convert_unit(epoch_seconds(x), TimeUnit::Second, unit, false);
        return Ok(SqlExpr::cast(count, cx.type_name(to)?));
    }
    Ok(SqlExpr::cast(x, cx.type_name(to)?))
}

/// Unit an integer cast of a temporal value counts in, `None` for non-temporal values.
pub fn epoch_unit(node: &Node) -> Option<TimeUnit> {
    match node.dtype().map(|t| &t.kind) {
        Some(TypeKind::Timestamp { unit, .. }) => Some(*unit),
        Some(TypeKind::Date) => Some(TimeUnit::Second),
        _ => None,
    }
}

fn binary(
    cx: &mut CompileContext<'_>,
    op: BinaryOp,
    left: &Node,
    right: &Node,
) -> RelqResult<SqlExpr> {
    let mut l = cx.expr(left)?;
    let r = cx.expr(right)?;
    let sql_op = match op {
        BinaryOp::Add => SqlBinaryOp::Plus,
        BinaryOp::Subtract => SqlBinaryOp::Minus,
        BinaryOp::Multiply => SqlBinaryOp::Multiply,
        BinaryOp::Divide => {
            // integer operands would truncate
            if is_integer(left) && is_integer(right) {
                l = SqlExpr::cast(l, cx.type_name(&DataType::float64())?);
            }
            SqlBinaryOp::Divide
        }
        BinaryOp::FloorDivide => {
            return Ok(SqlExpr::func("floor", vec![SqlExpr::binary(l, SqlBinaryOp::Divide, r)]));
        }
        BinaryOp::Modulus => SqlBinaryOp::Modulo,
        BinaryOp::Equals => SqlBinaryOp::Eq,
        BinaryOp::NotEquals => SqlBinaryOp::NotEq,
        BinaryOp::Less => SqlBinaryOp::Lt,
        BinaryOp::LessEqual => SqlBinaryOp::LtEq,
        BinaryOp::Greater => SqlBinaryOp::Gt,
        BinaryOp::GreaterEqual => SqlBinaryOp::GtEq,
        BinaryOp::And => SqlBinaryOp::And,
        BinaryOp::Or => SqlBinaryOp::Or,
        BinaryOp::Xor => {
            let either = SqlExpr::binary(l.clone(), SqlBinaryOp::Or, r.clone());
            let both = SqlExpr::binary(l, SqlBinaryOp::And, r);
            return Ok(SqlExpr::binary(either, SqlBinaryOp::And, SqlExpr::not(both)));
        }
        BinaryOp::Like | BinaryOp::ILike => {
            return Ok(SqlExpr::Like {
                expr: Box::new(l),
                pattern: Box::new(r),
                negated: false,
                case_insensitive: op == BinaryOp::ILike,
            });
        }
    };
    Ok(SqlExpr::binary(l, sql_op, r))
}

fn is_integer(node: &Node) -> bool {
    node.dtype().is_some_and(DataType::is_integer)
}

fn is_date(node: &Node) -> bool {
    node.dtype().is_some_and(DataType::is_date)
}

/// An aggregate call of `name`, with the reduction's filter attached either
/// as `FILTER (WHERE ...)` or folded into `CASE WHEN` arguments.
pub fn reduction(cx: &mut CompileContext<'_>, node: &Node, name: &str) -> RelqResult<SqlExpr> {
    let Op::Reduction { func, filter, .. } = node.op() else {
        return Err(RelqError::plan(format!("{} is not a reduction", node)));
    };
    let mut args = match func {
        AggFunc::CountStar => vec![SqlExpr::Star],
        _ => cx.args(node)?,
    };
    let mut filter = filter.as_ref().map(|f| cx.expr(f)).transpose()?;

    if !cx.config.aggregate_filter
        && let Some(cond) = filter.take()
    {
        args = match func {
            AggFunc::CountStar => vec![when(cond, SqlExpr::int(1))],
            _ => args.into_iter().map(|a| when(cond.clone(), a)).collect(),
        };
    }

    Ok(SqlExpr::Func {
        name: name.to_string(),
        args,
        distinct: *func == AggFunc::CountDistinct,
        filter: filter.map(Box::new),
    })
}

fn when(cond: SqlExpr, then: SqlExpr) -> SqlExpr {
    SqlExpr::Case {
        cases: vec![(cond, then)],
        default: None,
    }
}

/// `COUNT(DISTINCT x)`, for engines without an approximate distinct count.
pub fn count_distinct(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    match reduction(cx, node, "count")? {
        SqlExpr::Func {
            name, args, filter, ..
        } => Ok(SqlExpr::Func {
            name,
            args,
            distinct: true,
            filter,
        }),
        other => Ok(other),
    }
}

/// Order keys of a window or select.
pub fn order_by(cx: &CompileContext<'_>, keys: &[Node]) -> RelqResult<Vec<OrderByExpr>> {
    keys.iter()
        .map(|key| match key.op() {
            Op::SortKey { expr, ascending } => Ok(OrderByExpr {
                expr: cx.expr(expr)?,
                asc: *ascending,
            }),
            _ => Ok(OrderByExpr {
                expr: cx.expr(key)?,
                asc: true,
            }),
        })
        .collect()
}

fn window(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let Op::WindowFunction {
        func,
        group_by,
        order_by: keys,
        frame,
    } = node.op()
    else {
        return Err(RelqError::plan(format!("{} is not a window", node)));
    };
    let spec = WindowSpec {
        order_by: order_by(cx, keys)?,
        frame: Some(frame.unwrap_or_else(WindowFrame::full)),
    };
    let spec = (cx.config.minimize_spec)(func, spec);
    Ok(SqlExpr::Window {
        func: Box::new(cx.expr(func)?),
        partition_by: cx.exprs(group_by)?,
        order_by: spec.order_by,
        frame: spec.frame,
    })
}

/// The `i`-th argument node of a call.
pub fn call_arg(node: &Node, i: usize) -> RelqResult<&Node> {
    let args = match node.op() {
        Op::Call { args, .. } | Op::Reduction { args, .. } | Op::Analytic { args, .. } => args,
        _ => return Err(RelqError::plan(format!("{} has no arguments", node))),
    };
    args.get(i)
        .ok_or_else(|| RelqError::plan(format!("{} has no argument {}", node, i)))
}

pub fn nth(args: &[SqlExpr], i: usize) -> RelqResult<SqlExpr> {
    args.get(i)
        .cloned()
        .ok_or_else(|| RelqError::plan(format!("missing argument {}", i)))
}

pub fn literal_i64(node: &Node) -> Option<i64> {
    match node.op() {
        Op::Literal { value, .. } => value.as_i64(),
        _ => None,
    }
}

pub fn literal_str(node: &Node) -> Option<&str> {
    match node.op() {
        Op::Literal { value, .. } => value.as_str(),
        _ => None,
    }
}

/// `(amount, unit)` of an interval literal.
pub fn literal_interval(node: &Node) -> Option<(i64, IntervalUnit)> {
    match node.op() {
        Op::Literal {
            value: Value::Interval(n),
            dtype,
        } => Some((*n, interval_unit(dtype))),
        _ => None,
    }
}

/// `haystack LIKE pattern` with the needle matched literally. `\` is the
/// default LIKE escape of every dialect that takes this path.
pub fn like_pattern(
    cx: &CompileContext<'_>,
    node: &Node,
    leading: bool,
    trailing: bool,
) -> RelqResult<SqlExpr> {
    let haystack = cx.expr(call_arg(node, 0)?)?;
    let needle = call_arg(node, 1)?;
    let wild = |on: bool| if on { "%" } else { "" };

    let pattern = match literal_str(needle) {
        Some(s) => {
            let escaped = escape_like(s);
            SqlExpr::string(format!("{}{}{}", wild(leading), escaped, wild(trailing)))
        }
        None => {
            let mut p = escape_like_expr(cx.expr(needle)?);
            if leading {
                p = SqlExpr::binary(SqlExpr::string("%"), SqlBinaryOp::Concat, p);
            }
            if trailing {
                p = SqlExpr::binary(p, SqlBinaryOp::Concat, SqlExpr::string("%"));
            }
            p
        }
    };
    Ok(SqlExpr::like(haystack, pattern))
}

/// Backslash-escape the LIKE wildcards and the escape character itself.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Runtime form of [`escape_like`] for needles that are not literals.
fn escape_like_expr(expr: SqlExpr) -> SqlExpr {
    ["\\", "%", "_"].into_iter().fold(expr, |acc, c| {
        SqlExpr::func(
            "replace",
            vec![acc, SqlExpr::string(c), SqlExpr::string(format!("\\{}", c))],
        )
    })
}

/// Substring arguments with the 0-based start moved to SQL's 1-based one.
pub fn substring_args(cx: &CompileContext<'_>, node: &Node) -> RelqResult<Vec<SqlExpr>> {
    let mut args = cx.args(node)?;
    let start_node = call_arg(node, 1)?;
    let start = match literal_i64(start_node) {
        Some(n) => SqlExpr::int(n + 1),
        None => SqlExpr::binary(cx.expr(start_node)?, SqlBinaryOp::Plus, SqlExpr::int(1)),
    };
    if args.len() < 2 {
        return Err(RelqError::plan("substring needs a start"));
    }
    args[1] = start;
    Ok(args)
}

/// `UPPER(first letter) || LOWER(rest)`.
pub fn capitalize_by_parts(
    cx: &CompileContext<'_>,
    node: &Node,
    substr: &str,
) -> RelqResult<SqlExpr> {
    let x = nth(&cx.args(node)?, 0)?;
    let first = SqlExpr::func(substr, vec![x.clone(), SqlExpr::int(1), SqlExpr::int(1)]);
    let head = SqlExpr::func("upper", vec![first]);
    let tail = SqlExpr::func("lower", vec![SqlExpr::func(substr, vec![x, SqlExpr::int(2)])]);
    Ok(SqlExpr::binary(head, SqlBinaryOp::Concat, tail))
}

/// `locate(substr, arg[, start + 1])`, 1-based.
pub fn locate(cx: &CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    let mut located = vec![nth(&args, 1)?, nth(&args, 0)?];
    if let Some(start) = args.get(2) {
        located.push(SqlExpr::binary(start.clone(), SqlBinaryOp::Plus, SqlExpr::int(1)));
    }
    Ok(SqlExpr::func("locate", located))
}

/// `find_in_set` over the values joined with commas, 0-based.
pub fn find_in_set(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<SqlExpr> {
    let mut args = cx.args(node)?.into_iter();
    let needle = args
        .next()
        .ok_or_else(|| RelqError::plan("find_in_set needs a needle"))?;
    let mut joined = vec![SqlExpr::string(",")];
    joined.extend(args);
    Ok(zero_based(SqlExpr::func(
        "find_in_set",
        vec![needle, SqlExpr::func("concat_ws", joined)],
    )))
}

/// Units accepted as the `part` of a date delta.
const DATE_PARTS: &[&str] = &["year", "quarter", "month", "week", "day"];

/// The literal `part` of a date delta, lowercased.
pub fn date_delta_part(cx: &CompileContext<'_>, node: &Node) -> RelqResult<String> {
    let part = literal_str(call_arg(node, 2)?)
        .ok_or_else(|| cx.unsupported_arg(node.kind(), "non-literal part"))?
        .to_ascii_lowercase();
    if !DATE_PARTS.contains(&part.as_str()) {
        return Err(cx.unsupported_arg(node.kind(), format!("part '{}'", part)));
    }
    Ok(part)
}

/// `expr - 1`, for functions whose SQL form is 1-based.
pub fn zero_based(expr: SqlExpr) -> SqlExpr {
    SqlExpr::binary(expr, SqlBinaryOp::Minus, SqlExpr::int(1))
}

fn bitwise(args: Vec<SqlExpr>, op: SqlBinaryOp) -> RelqResult<SqlExpr> {
    Ok(SqlExpr::binary(nth(&args, 0)?, op, nth(&args, 1)?))
}

fn call(cx: &mut CompileContext<'_>, node: &Node, func: Func) -> RelqResult<SqlExpr> {
    let args = cx.args(node)?;
    if func != Func::ExtractEpochSeconds
        && let Some(field) = func.extract_field()
    {
        return Ok(SqlExpr::Extract {
            field: field.to_string(),
            expr: Box::new(nth(&args, 0)?),
        });
    }

    let expr = match func {
        Func::StringContains => like_pattern(cx, node, true, true)?,
        Func::StartsWith => like_pattern(cx, node, false, true)?,
        Func::EndsWith => like_pattern(cx, node, true, false)?,
        Func::Substring => SqlExpr::func("substring", substring_args(cx, node)?),
        Func::StringFind if args.len() > 2 => {
            return Err(cx.unsupported_arg(node.kind(), "start position"));
        }
        Func::StringFind => zero_based(SqlExpr::func("strpos", args)),
        Func::StringConcat => args
            .into_iter()
            .reduce(|acc, a| SqlExpr::binary(acc, SqlBinaryOp::Concat, a))
            .ok_or_else(|| RelqError::plan("concat needs an argument"))?,
        Func::RegexSearch => bitwise(args, SqlBinaryOp::RegexMatch)?,
        Func::BitwiseAnd => bitwise(args, SqlBinaryOp::BitAnd)?,
        Func::BitwiseOr => bitwise(args, SqlBinaryOp::BitOr)?,
        Func::BitwiseXor => bitwise(args, SqlBinaryOp::BitXor)?,
        Func::BitwiseLeftShift => bitwise(args, SqlBinaryOp::ShiftLeft)?,
        Func::BitwiseRightShift => bitwise(args, SqlBinaryOp::ShiftRight)?,
        Func::BitwiseNot => SqlExpr::Unary {
            op: SqlUnaryOp::BitNot,
            expr: Box::new(nth(&args, 0)?),
        },
        Func::ExtractEpochSeconds => {
            SqlExpr::cast(extract_epoch(nth(&args, 0)?), cx.type_name(&DataType::int64())?)
        }
        Func::DayOfWeekIndex => zero_based(SqlExpr::Extract {
            field: "ISODOW".to_string(),
            expr: Box::new(nth(&args, 0)?),
        }),
        Func::DayOfWeekName => SqlExpr::func(
            "trim",
            vec![SqlExpr::func("to_char", vec![nth(&args, 0)?, SqlExpr::string("Day")])],
        ),
        Func::Date => SqlExpr::cast(nth(&args, 0)?, cx.type_name(&DataType::date())?),
        Func::TimestampNow => SqlExpr::Keyword("CURRENT_TIMESTAMP".to_string()),
        Func::DateDiff => {
            let date = cx.type_name(&DataType::date())?;
            SqlExpr::binary(
                SqlExpr::cast(nth(&args, 0)?, date.clone()),
                SqlBinaryOp::Minus,
                SqlExpr::cast(nth(&args, 1)?, date),
            )
        }
        Func::TimestampAdd | Func::DateAdd => bitwise(args, SqlBinaryOp::Plus)?,
        Func::TimestampDiff => bitwise(args, SqlBinaryOp::Minus)?,
        Func::DateDelta => {
            let part = date_delta_part(cx, node)?;
            SqlExpr::func(
                "date_diff",
                vec![SqlExpr::string(part), nth(&args, 1)?, nth(&args, 0)?],
            )
        }
        Func::Log => {
            let ln = |x| SqlExpr::func("ln", vec![x]);
            match args.get(1) {
                Some(base) => SqlExpr::binary(
                    ln(nth(&args, 0)?),
                    SqlBinaryOp::Divide,
                    ln(base.clone()),
                ),
                None => ln(nth(&args, 0)?),
            }
        }
        Func::StringToTime => {
            SqlExpr::cast(SqlExpr::func("strptime", args), cx.type_name(&DataType::time())?)
        }
        Func::ArrayPosition => zero_based(SqlExpr::func(
            "coalesce",
            vec![SqlExpr::func("array_position", args), SqlExpr::int(0)],
        )),
        Func::Array => SqlExpr::Array(args),
        _ => SqlExpr::func(func.sql_name(), args),
    };
    Ok(expr)
}

