//! Turn the SQL syntax tree into text.

use super::*;
use crate::ast::{FrameBound, FrameKind};
use crate::transpiler::traits::SqlGenerator;
use std::cell::RefCell;

/// Render a full query.
pub fn render_query(query: &Query, generator: &dyn SqlGenerator) -> String {
    render_query_with_params(query, generator).0
}

/// Render a full query along with the parameter bound at each placeholder
/// position.
pub fn render_query_with_params(
    query: &Query,
    generator: &dyn SqlGenerator,
) -> (String, Vec<String>) {
    let mut out = String::new();
    let renderer = Renderer::new(generator);
    renderer.query(query, &mut out);
    (out, renderer.params.into_inner())
}

/// Render a single expression.
pub fn render_expr(expr: &SqlExpr, generator: &dyn SqlGenerator) -> String {
    let mut out = String::new();
    Renderer::new(generator).expr(expr, &mut out);
    out
}

struct Renderer<'a> {
    g: &'a dyn SqlGenerator,
    /// Parameter names in placeholder order.
    params: RefCell<Vec<String>>,
}

impl<'a> Renderer<'a> {
    fn new(g: &'a dyn SqlGenerator) -> Self {
        Self {
            g,
            params: RefCell::new(Vec::new()),
        }
    }

    fn placeholder(&self, name: &str) -> String {
        let mut params = self.params.borrow_mut();
        let seen = self
            .g
            .numbered_placeholders()
            .then(|| params.iter().position(|p| p == name))
            .flatten();
        let index = match seen {
            Some(i) => i + 1,
            None => {
                params.push(name.to_string());
                params.len()
            }
        };
        self.g.placeholder(index)
    }
}

impl Renderer<'_> {
    fn query(&self, query: &Query, out: &mut String) {
        if !query.ctes.is_empty() {
            out.push_str("WITH ");
            for (i, cte) in query.ctes.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&self.g.quote_identifier(&cte.name));
                out.push_str(" AS (");
                self.query(&cte.query, out);
                out.push(')');
            }
            out.push(' ');
        }
        self.set_expr(&query.body, out);
    }

    fn set_expr(&self, body: &SetExpr, out: &mut String) {
        match body {
            SetExpr::Select(select) => self.select(select, out),
            SetExpr::SetOp {
                op,
                all,
                left,
                right,
            } => {
                self.set_expr(left, out);
                match op {
                    SetOperator::Union => out.push_str(" UNION "),
                }
                if *all {
                    out.push_str("ALL ");
                }
                self.set_expr(right, out);
            }
        }
    }

    fn select(&self, select: &Select, out: &mut String) {
        out.push_str("SELECT ");
        if select.distinct {
            out.push_str("DISTINCT ");
        }
        for (i, item) in select.projection.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match item {
                SelectItem::Wildcard => out.push('*'),
                SelectItem::Expr { expr, alias } => {
                    self.expr(expr, out);
                    if let Some(alias) = alias {
                        let redundant =
                            matches!(expr, SqlExpr::Column { name, .. } if name == alias);
                        if !redundant {
                            out.push_str(" AS ");
                            out.push_str(&self.g.quote_identifier(alias));
                        }
                    }
                }
            }
        }

        if let Some(from) = &select.from {
            out.push_str(" FROM ");
            self.factor(&from.relation, out);
            for join in &from.joins {
                out.push_str(match join.op {
                    JoinOperator::Inner => " INNER JOIN ",
                    JoinOperator::Left => " LEFT OUTER JOIN ",
                    JoinOperator::Right => " RIGHT OUTER JOIN ",
                    JoinOperator::Full => " FULL OUTER JOIN ",
                    JoinOperator::Cross => " CROSS JOIN ",
                });
                self.factor(&join.relation, out);
                if let Some(on) = &join.on {
                    out.push_str(" ON ");
                    self.expr(on, out);
                }
            }
        }

        if let Some(selection) = &select.selection {
            out.push_str(" WHERE ");
            self.expr(selection, out);
        }

        if !select.group_by.is_empty() {
            out.push_str(" GROUP BY ");
            self.list(&select.group_by, out);
        }

        if !select.order_by.is_empty() {
            out.push_str(" ORDER BY ");
            self.order_by(&select.order_by, out);
        }

        if select.limit.is_some() || select.offset.is_some() {
            out.push_str(&self.g.limit_offset(select.limit, select.offset));
        }
    }

    fn factor(&self, factor: &TableFactor, out: &mut String) {
        match factor {
            TableFactor::Table {
                name,
                database,
                alias,
            } => {
                if let Some(db) = database {
                    out.push_str(&self.g.quote_identifier(db));
                    out.push('.');
                }
                out.push_str(&self.g.quote_identifier(name));
                if let Some(alias) = alias {
                    out.push_str(" AS ");
                    out.push_str(&self.g.quote_identifier(alias));
                }
            }
            TableFactor::Derived { subquery, alias } => {
                out.push('(');
                self.query(subquery, out);
                out.push_str(") AS ");
                out.push_str(&self.g.quote_identifier(alias));
            }
            TableFactor::Sampled {
                relation,
                method,
                percent,
                seed,
            } => {
                self.factor(relation, out);
                out.push(' ');
                out.push_str(&self.g.table_sample(*method, *percent, *seed));
            }
        }
    }

    fn list(&self, exprs: &[SqlExpr], out: &mut String) {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.expr(e, out);
        }
    }

    fn order_by(&self, keys: &[OrderByExpr], out: &mut String) {
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.expr(&key.expr, out);
            out.push_str(if key.asc { " ASC" } else { " DESC" });
        }
    }

    /// Render `expr`, parenthesized when it binds looser than `min`.
    fn operand(&self, expr: &SqlExpr, min: u8, out: &mut String) {
        if expr.precedence() < min {
            out.push('(');
            self.expr(expr, out);
            out.push(')');
        } else {
            self.expr(expr, out);
        }
    }

    fn expr(&self, expr: &SqlExpr, out: &mut String) {
        match expr {
            SqlExpr::Column { table, name } => {
                if let Some(table) = table {
                    out.push_str(&self.g.quote_identifier(table));
                    out.push('.');
                }
                out.push_str(&self.g.quote_identifier(name));
            }
            SqlExpr::Star => out.push('*'),
            SqlExpr::Literal(lit) => match lit {
                SqlLiteral::Null => out.push_str("NULL"),
                SqlLiteral::Bool(b) => out.push_str(&self.g.bool_literal(*b)),
                SqlLiteral::Number(n) => out.push_str(n),
                SqlLiteral::String(s) => out.push_str(&self.g.string_literal(s)),
            },
            SqlExpr::Placeholder(name) => out.push_str(&self.placeholder(name)),
            SqlExpr::Keyword(k) => out.push_str(k),
            SqlExpr::Func {
                name,
                args,
                distinct,
                filter,
            } => {
                out.push_str(&name.to_uppercase());
                out.push('(');
                if *distinct {
                    out.push_str("DISTINCT ");
                }
                self.list(args, out);
                out.push(')');
                if let Some(filter) = filter {
                    out.push_str(" FILTER (WHERE ");
                    self.expr(filter, out);
                    out.push(')');
                }
            }
            SqlExpr::NamedArg { name, value } => {
                out.push_str(&self.g.quote_identifier(name));
                out.push_str(" := ");
                self.expr(value, out);
            }
            SqlExpr::Cast { expr, to } => {
                out.push_str("CAST(");
                self.expr(expr, out);
                out.push_str(" AS ");
                out.push_str(to);
                out.push(')');
            }
            SqlExpr::Binary {
                op: SqlBinaryOp::Concat,
                ..
            } => {
                let mut parts = Vec::new();
                self.concat_parts(expr, &mut parts);
                out.push_str(&self.g.string_concat(&parts));
            }
            SqlExpr::Binary { left, op, right } => {
                let prec = op.precedence();
                self.operand(left, prec, out);
                out.push(' ');
                out.push_str(binary_token(*op));
                out.push(' ');
                let same_assoc = matches!(
                    right.as_ref(),
                    SqlExpr::Binary { op: r, .. } if r == op && op.is_associative()
                );
                let min = if same_assoc { prec } else { prec + 1 };
                self.operand(right, min, out);
            }
            SqlExpr::Unary { op, expr: inner } => match op {
                SqlUnaryOp::Not => {
                    out.push_str("NOT ");
                    self.operand(inner, 4, out);
                }
                SqlUnaryOp::Minus => {
                    out.push('-');
                    let negative_literal = matches!(
                        inner.as_ref(),
                        SqlExpr::Literal(SqlLiteral::Number(n)) if n.starts_with('-')
                    );
                    if negative_literal || matches!(inner.as_ref(), SqlExpr::Unary { .. }) {
                        out.push('(');
                        self.expr(inner, out);
                        out.push(')');
                    } else {
                        self.operand(inner, 10, out);
                    }
                }
                SqlUnaryOp::BitNot => {
                    out.push('~');
                    self.operand(inner, 10, out);
                }
            },
            SqlExpr::IsNull { expr: inner, negated } => {
                self.operand(inner, 5, out);
                out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            SqlExpr::Case { cases, default } => {
                out.push_str("CASE");
                for (cond, result) in cases {
                    out.push_str(" WHEN ");
                    self.expr(cond, out);
                    out.push_str(" THEN ");
                    self.expr(result, out);
                }
                if let Some(default) = default {
                    out.push_str(" ELSE ");
                    self.expr(default, out);
                }
                out.push_str(" END");
            }
            SqlExpr::InList {
                expr: inner,
                list,
                negated,
            } => {
                self.operand(inner, 5, out);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                self.list(list, out);
                out.push(')');
            }
            SqlExpr::Like {
                expr: inner,
                pattern,
                negated,
                case_insensitive,
            } => {
                let not = if *negated { "NOT " } else { "" };
                if *case_insensitive && self.g.fuzzy_operator() != "ILIKE" {
                    out.push_str("LOWER(");
                    self.expr(inner, out);
                    out.push_str(&format!(") {}LIKE LOWER(", not));
                    self.expr(pattern, out);
                    out.push(')');
                } else {
                    let op = if *case_insensitive { "ILIKE" } else { "LIKE" };
                    self.operand(inner, 5, out);
                    out.push_str(&format!(" {}{} ", not, op));
                    self.operand(pattern, 5, out);
                }
            }
            SqlExpr::Interval { value, unit } => {
                let mut rendered = String::new();
                self.operand(value, 11, &mut rendered);
                out.push_str(&self.g.interval(&rendered, *unit));
            }
            SqlExpr::Extract { field, expr: inner } => {
                out.push_str("EXTRACT(");
                out.push_str(field);
                out.push_str(" FROM ");
                self.expr(inner, out);
                out.push(')');
            }
            SqlExpr::Array(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| {
                        let mut s = String::new();
                        self.expr(item, &mut s);
                        s
                    })
                    .collect();
                out.push_str(&self.g.array_literal(&rendered));
            }
            SqlExpr::Exists { subquery, negated } => {
                if *negated {
                    out.push_str("NOT ");
                }
                out.push_str("EXISTS (");
                self.query(subquery, out);
                out.push(')');
            }
            SqlExpr::Window {
                func,
                partition_by,
                order_by,
                frame,
            } => {
                self.expr(func, out);
                out.push_str(" OVER (");
                let mut sep = "";
                if !partition_by.is_empty() {
                    out.push_str("PARTITION BY ");
                    self.list(partition_by, out);
                    sep = " ";
                }
                if !order_by.is_empty() {
                    out.push_str(sep);
                    out.push_str("ORDER BY ");
                    self.order_by(order_by, out);
                    sep = " ";
                }
                if let Some(frame) = frame {
                    out.push_str(sep);
                    out.push_str(match frame.kind {
                        FrameKind::Rows => "ROWS",
                        FrameKind::Range => "RANGE",
                    });
                    out.push_str(" BETWEEN ");
                    out.push_str(&frame_bound(frame.start));
                    out.push_str(" AND ");
                    out.push_str(&frame_bound(frame.end));
                }
                out.push(')');
            }
            SqlExpr::Nested(inner) => {
                out.push('(');
                self.expr(inner, out);
                out.push(')');
            }
        }
    }

    fn concat_parts(&self, expr: &SqlExpr, parts: &mut Vec<String>) {
        match expr {
            SqlExpr::Binary {
                left,
                op: SqlBinaryOp::Concat,
                right,
            } => {
                self.concat_parts(left, parts);
                self.concat_parts(right, parts);
            }
            other => {
                let mut s = String::new();
                self.operand(other, 9, &mut s);
                parts.push(s);
            }
        }
    }
}

fn binary_token(op: SqlBinaryOp) -> &'static str {
    match op {
        SqlBinaryOp::Plus => "+",
        SqlBinaryOp::Minus => "-",
        SqlBinaryOp::Multiply => "*",
        SqlBinaryOp::Divide => "/",
        SqlBinaryOp::Modulo => "%",
        SqlBinaryOp::Eq => "=",
        SqlBinaryOp::NotEq => "<>",
        SqlBinaryOp::Lt => "<",
        SqlBinaryOp::LtEq => "<=",
        SqlBinaryOp::Gt => ">",
        SqlBinaryOp::GtEq => ">=",
        SqlBinaryOp::And => "AND",
        SqlBinaryOp::Or => "OR",
        SqlBinaryOp::Concat => "||",
        SqlBinaryOp::BitAnd => "&",
        SqlBinaryOp::BitOr => "|",
        SqlBinaryOp::BitXor => "^",
        SqlBinaryOp::ShiftLeft => "<<",
        SqlBinaryOp::ShiftRight => ">>",
        SqlBinaryOp::IntDiv => "DIV",
        SqlBinaryOp::RegexMatch => "~",
        SqlBinaryOp::RLike => "RLIKE",
        SqlBinaryOp::Custom(token) => token,
    }
}

fn frame_bound(bound: FrameBound) -> String {
    match bound {
        FrameBound::UnboundedPreceding => "UNBOUNDED PRECEDING".to_string(),
        FrameBound::Preceding(n) => format!("{} PRECEDING", n),
        FrameBound::CurrentRow => "CURRENT ROW".to_string(),
        FrameBound::Following(n) => format!("{} FOLLOWING", n),
        FrameBound::UnboundedFollowing => "UNBOUNDED FOLLOWING".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    fn col(t: &str, c: &str) -> SqlExpr {
        SqlExpr::column(t, c)
    }

    #[test]
    fn test_precedence_parentheses() {
        let g = Dialect::Postgres.generator();
        let sum = SqlExpr::binary(col("t0", "a"), SqlBinaryOp::Plus, SqlExpr::int(1));
        let product = SqlExpr::binary(sum.clone(), SqlBinaryOp::Multiply, SqlExpr::int(2));
        assert_eq!(render_expr(&product, g), "(t0.a + 1) * 2");

        let diff = SqlExpr::binary(
            SqlExpr::int(1),
            SqlBinaryOp::Minus,
            SqlExpr::binary(col("t0", "a"), SqlBinaryOp::Minus, SqlExpr::int(2)),
        );
        assert_eq!(render_expr(&diff, g), "1 - (t0.a - 2)");

        let chained = SqlExpr::binary(
            col("t0", "a"),
            SqlBinaryOp::And,
            SqlExpr::binary(col("t0", "b"), SqlBinaryOp::And, col("t0", "c")),
        );
        assert_eq!(render_expr(&chained, g), "t0.a AND t0.b AND t0.c");
    }

    #[test]
    fn test_concat_uses_generator() {
        let e = SqlExpr::binary(
            SqlExpr::string("%"),
            SqlBinaryOp::Concat,
            SqlExpr::binary(col("t0", "b"), SqlBinaryOp::Concat, SqlExpr::string("%")),
        );
        assert_eq!(render_expr(&e, Dialect::Postgres.generator()), "'%' || t0.b || '%'");
        assert_eq!(render_expr(&e, Dialect::MySql.generator()), "CONCAT('%', t0.b, '%')");
    }

    #[test]
    fn test_select_with_derived_table() {
        let inner = Query::select(Select {
            projection: vec![SelectItem::Expr {
                expr: col("t0", "a"),
                alias: Some("a".into()),
            }],
            from: Some(TableWithJoins {
                relation: TableFactor::Table {
                    name: "t".into(),
                    database: None,
                    alias: Some("t0".into()),
                },
                joins: vec![],
            }),
            ..Default::default()
        });
        let outer = Query::select(Select {
            projection: vec![SelectItem::Wildcard],
            from: Some(TableWithJoins {
                relation: TableFactor::Derived {
                    subquery: Box::new(inner),
                    alias: "t1".into(),
                },
                joins: vec![],
            }),
            order_by: vec![OrderByExpr {
                expr: SqlExpr::Column {
                    table: None,
                    name: "a".into(),
                },
                asc: false,
            }],
            limit: Some(10),
            ..Default::default()
        });
        assert_eq!(
            render_query(&outer, Dialect::DuckDb.generator()),
            "SELECT * FROM (SELECT t0.a FROM t AS t0) AS t1 ORDER BY a DESC LIMIT 10"
        );
    }

    #[test]
    fn test_window_frame() {
        let w = SqlExpr::Window {
            func: Box::new(SqlExpr::func("sum", vec![col("t0", "a")])),
            partition_by: vec![col("t0", "g")],
            order_by: vec![],
            frame: Some(crate::ast::WindowFrame::full()),
        };
        assert_eq!(
            render_expr(&w, Dialect::DuckDb.generator()),
            "SUM(t0.a) OVER (PARTITION BY t0.g \
             ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)"
        );
    }
}
