//! Rewrite passes.
//!
//! Pre-rewrites turn one IR graph into another before compilation and run in
//! the order the dialect configuration lists them. Post-rewrites patch the
//! generated SQL syntax tree for restrictions only visible in printed form.

mod distinct;
mod fuse;
mod sample;
mod window;

pub use distinct::split_select_distinct_with_order_by;
pub use fuse::fuse_selects;
pub use sample::lower_sample;
pub use window::{WindowSpec, minimize_spec, rewrite_empty_order_by_window};

use crate::dialect::PostRewrite;
use crate::sql::{
    Cte, Join, Query, Select, SetExpr, SqlExpr, SqlUnaryOp, TableFactor, TableWithJoins,
};
use crate::transpiler::context::Aliases;

/// Apply `rewrite` to every SELECT in `query`, innermost first.
pub fn apply_post(query: Query, rewrite: PostRewrite, aliases: &mut Aliases) -> Query {
    let ctes = query
        .ctes
        .into_iter()
        .map(|cte| Cte {
            name: cte.name,
            query: apply_post(cte.query, rewrite, aliases),
        })
        .collect();
    Query {
        ctes,
        body: set_expr(query.body, rewrite, aliases),
    }
}

fn set_expr(body: SetExpr, rewrite: PostRewrite, aliases: &mut Aliases) -> SetExpr {
    match body {
        SetExpr::Select(select) => {
            SetExpr::Select(Box::new(select_post(*select, rewrite, aliases)))
        }
        SetExpr::SetOp {
            op,
            all,
            left,
            right,
        } => SetExpr::SetOp {
            op,
            all,
            left: Box::new(set_expr(*left, rewrite, aliases)),
            right: Box::new(set_expr(*right, rewrite, aliases)),
        },
    }
}

fn select_post(mut select: Select, rewrite: PostRewrite, aliases: &mut Aliases) -> Select {
    if let Some(from) = select.from.take() {
        let relation = factor(from.relation, rewrite, aliases);
        let joins = from
            .joins
            .into_iter()
            .map(|join| Join {
                relation: factor(join.relation, rewrite, aliases),
                ..join
            })
            .collect();
        select.from = Some(TableWithJoins { relation, joins });
    }
    select.selection = select.selection.map(|e| subqueries(e, rewrite, aliases));
    rewrite(select, aliases)
}

fn factor(factor_: TableFactor, rewrite: PostRewrite, aliases: &mut Aliases) -> TableFactor {
    match factor_ {
        TableFactor::Derived { subquery, alias } => TableFactor::Derived {
            subquery: Box::new(apply_post(*subquery, rewrite, aliases)),
            alias,
        },
        TableFactor::Sampled {
            relation,
            method,
            percent,
            seed,
        } => TableFactor::Sampled {
            relation: Box::new(factor(*relation, rewrite, aliases)),
            method,
            percent,
            seed,
        },
        table => table,
    }
}

/// `EXISTS` subqueries of a WHERE clause.
fn subqueries(expr: SqlExpr, rewrite: PostRewrite, aliases: &mut Aliases) -> SqlExpr {
    match expr {
        SqlExpr::Exists { subquery, negated } => SqlExpr::Exists {
            subquery: Box::new(apply_post(*subquery, rewrite, aliases)),
            negated,
        },
        SqlExpr::Binary { left, op, right } => SqlExpr::Binary {
            left: Box::new(subqueries(*left, rewrite, aliases)),
            op,
            right: Box::new(subqueries(*right, rewrite, aliases)),
        },
        SqlExpr::Unary {
            op: SqlUnaryOp::Not,
            expr,
        } => SqlExpr::Unary {
            op: SqlUnaryOp::Not,
            expr: Box::new(subqueries(*expr, rewrite, aliases)),
        },
        other => other,
    }
}
