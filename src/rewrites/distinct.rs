//! Move ordering out of a `SELECT DISTINCT` when it sorts by columns the
//! select list does not contain.

use crate::sql::{OrderByExpr, Select, SelectItem, SqlExpr, TableFactor};
use crate::transpiler::context::Aliases;

pub fn split_select_distinct_with_order_by(mut select: Select, aliases: &mut Aliases) -> Select {
    if !select.distinct || select.order_by.iter().all(|key| projects(&select, &key.expr)) {
        return select;
    }

    let order_by: Vec<OrderByExpr> = std::mem::take(&mut select.order_by)
        .into_iter()
        .map(|key| OrderByExpr {
            expr: outer_name(&select, key.expr),
            asc: key.asc,
        })
        .collect();
    let limit = select.limit.take();
    let offset = select.offset.take();

    let inner = crate::sql::Query::select(select);
    Select {
        order_by,
        limit,
        offset,
        ..Select::star_from(TableFactor::Derived {
            subquery: Box::new(inner),
            alias: aliases.fresh(),
        })
    }
}

fn projects(select: &Select, expr: &SqlExpr) -> bool {
    select.projection.iter().any(|item| match item {
        SelectItem::Expr { expr: e, .. } => e == expr,
        SelectItem::Wildcard => false,
    })
}

/// The sort key as seen from outside the inner select.
fn outer_name(select: &Select, expr: SqlExpr) -> SqlExpr {
    let projected = select.projection.iter().find_map(|item| match item {
        SelectItem::Expr { expr: e, alias } if *e == expr => Some(alias.clone()),
        _ => None,
    });
    match (projected, expr) {
        (Some(Some(alias)), _) => unqualified(alias),
        (_, mut other) => {
            strip_qualifiers(&mut other);
            other
        }
    }
}

/// Drop the table alias from every column, which is out of scope outside.
fn strip_qualifiers(expr: &mut SqlExpr) {
    let mut stack = vec![expr];
    while let Some(e) = stack.pop() {
        match e {
            SqlExpr::Column { table, .. } => *table = None,
            other => stack.extend(other.children_mut()),
        }
    }
}

fn unqualified(name: String) -> SqlExpr {
    SqlExpr::Column { table: None, name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{Query, SqlBinaryOp, TableWithJoins};
    use pretty_assertions::assert_eq;

    fn distinct_a_order_by(key: &str) -> Select {
        Select {
            distinct: true,
            projection: vec![SelectItem::Expr {
                expr: SqlExpr::column("t0", "a"),
                alias: Some("a".into()),
            }],
            from: Some(TableWithJoins {
                relation: TableFactor::Table {
                    name: "t".into(),
                    database: None,
                    alias: Some("t0".into()),
                },
                joins: Vec::new(),
            }),
            order_by: vec![OrderByExpr {
                expr: SqlExpr::column("t0", key),
                asc: true,
            }],
            limit: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_order_by_outside_select_list_is_split() {
        let mut aliases = Aliases::default();
        let out = split_select_distinct_with_order_by(distinct_a_order_by("b"), &mut aliases);

        let mut inner = distinct_a_order_by("b");
        inner.order_by.clear();
        inner.limit = None;
        let expected = Select {
            order_by: vec![OrderByExpr {
                expr: SqlExpr::Column {
                    table: None,
                    name: "b".into(),
                },
                asc: true,
            }],
            limit: Some(10),
            ..Select::star_from(TableFactor::Derived {
                subquery: Box::new(Query::select(inner)),
                alias: "t0".into(),
            })
        };
        assert_eq!(out, expected);
    }

    #[test]
    fn test_order_by_projected_column_is_kept() {
        let mut aliases = Aliases::default();
        let select = distinct_a_order_by("a");
        assert_eq!(
            split_select_distinct_with_order_by(select.clone(), &mut aliases),
            select
        );
    }

    #[test]
    fn test_compound_key_loses_qualifiers() {
        let mut aliases = Aliases::default();
        let mut select = distinct_a_order_by("b");
        select.order_by[0].expr = SqlExpr::func(
            "lower",
            vec![SqlExpr::binary(
                SqlExpr::column("t0", "b"),
                SqlBinaryOp::Concat,
                SqlExpr::column("t0", "c"),
            )],
        );
        let out = split_select_distinct_with_order_by(select, &mut aliases);
        let bare = |name: &str| SqlExpr::Column {
            table: None,
            name: name.into(),
        };
        assert_eq!(
            out.order_by[0].expr,
            SqlExpr::func(
                "lower",
                vec![SqlExpr::binary(bare("b"), SqlBinaryOp::Concat, bare("c"))]
            )
        );
    }

    #[test]
    fn test_non_distinct_is_kept() {
        let mut aliases = Aliases::default();
        let mut select = distinct_a_order_by("b");
        select.distinct = false;
        assert_eq!(
            split_select_distinct_with_order_by(select.clone(), &mut aliases),
            select
        );
    }
}
