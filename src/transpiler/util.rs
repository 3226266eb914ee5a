//! Small helpers shared by the default translations and dialect visitors.

use crate::ast::TimeUnit;
use crate::sql::{SqlBinaryOp, SqlExpr, SqlLiteral};

/// Rescale an integer time count from one unit to another.
///
/// Scaling down floors the quotient when `floor` is set, so negative counts
/// round towards the earlier instant. Otherwise it divides by a float and
/// sub-unit precision survives.
pub fn convert_unit(expr: SqlExpr, from: TimeUnit, to: TimeUnit, floor: bool) -> SqlExpr {
    let from_p = i32::from(from.precision());
    let to_p = i32::from(to.precision());
    match to_p - from_p {
        0 => expr,
        k if k > 0 => SqlExpr::binary(
            expr,
            SqlBinaryOp::Multiply,
            SqlExpr::int(10i64.pow(k as u32)),
        ),
        k if floor => SqlExpr::func(
            "floor",
            vec![SqlExpr::binary(
                expr,
                SqlBinaryOp::Divide,
                SqlExpr::int(10i64.pow((-k) as u32)),
            )],
        ),
        k => SqlExpr::binary(
            expr,
            SqlBinaryOp::Divide,
            SqlExpr::Literal(SqlLiteral::Number(format!("{}.0", 10i64.pow((-k) as u32)))),
        ),
    }
}

/// Conjunction of predicates, `None` when there are none.
pub fn and_all(predicates: Vec<SqlExpr>) -> Option<SqlExpr> {
    predicates
        .into_iter()
        .reduce(|acc, p| SqlExpr::binary(acc, SqlBinaryOp::And, p))
}

/// Rewrite a strftime-style format string through a `%x` → token table.
/// `%%` becomes `%` unless the table spells it. `None` when a directive has
/// no entry.
pub fn translate_format(format: &str, table: &[(char, &str)]) -> Option<String> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let directive = chars.next()?;
        match table.iter().find(|(d, _)| *d == directive) {
            Some((_, token)) => out.push_str(token),
            None if directive == '%' => out.push('%'),
            None => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::render_expr;
    use crate::transpiler::sql::duckdb::DuckDbGenerator;
    use pretty_assertions::assert_eq;

    fn render(expr: &SqlExpr) -> String {
        render_expr(expr, &DuckDbGenerator)
    }

    #[test]
    fn test_convert_unit() {
        let x = || SqlExpr::column("t0", "x");
        let up = convert_unit(x(), TimeUnit::Second, TimeUnit::Microsecond, false);
        assert_eq!(render(&up), "t0.x * 1000000");
        let down = convert_unit(x(), TimeUnit::Millisecond, TimeUnit::Second, false);
        assert_eq!(render(&down), "t0.x / 1000.0");
        let same = convert_unit(x(), TimeUnit::Second, TimeUnit::Second, true);
        assert_eq!(render(&same), "t0.x");
    }

    #[test]
    fn test_convert_unit_floors_when_scaling_down() {
        let x = || SqlExpr::column("t0", "x");
        let down = convert_unit(x(), TimeUnit::Millisecond, TimeUnit::Second, true);
        assert_eq!(render(&down), "FLOOR(t0.x / 1000)");
        let up = convert_unit(x(), TimeUnit::Second, TimeUnit::Millisecond, true);
        assert_eq!(render(&up), "t0.x * 1000");
    }

    #[test]
    fn test_and_all() {
        assert_eq!(and_all(Vec::new()), None);
        let both = and_all(vec![SqlExpr::column("t0", "a"), SqlExpr::column("t0", "b")]).unwrap();
        assert_eq!(render(&both), "t0.a AND t0.b");
    }

    #[test]
    fn test_translate_format() {
        let table = [('Y', "yyyy"), ('m', "MM"), ('d', "dd")];
        assert_eq!(translate_format("%Y-%m-%d 100%%", &table).as_deref(), Some("yyyy-MM-dd 100%"));
        assert_eq!(translate_format("%Q", &table), None);
        assert_eq!(translate_format("trailing %", &table), None);
    }
}
