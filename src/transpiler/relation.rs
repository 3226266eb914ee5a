//! Translations of relation operations into SELECT layers.

use super::context::{CompileContext, RelSql};
use super::scalar;
use super::util::and_all;
use crate::ast::{JoinKind, Node, Op, OpKind};
use crate::error::{RelqError, RelqResult};
use crate::sql::{
    Join, JoinOperator, Query, Select, SelectItem, SetExpr, SetOperator, SqlExpr, SqlLiteral,
    TableFactor, TableWithJoins,
};

/// Translate a relation whose children are already compiled.
pub fn translate(cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<RelSql> {
    let select = match node.op() {
        Op::UnboundTable { name, database, .. } => {
            return Ok(RelSql::Table {
                name: name.clone(),
                database: database.clone(),
            });
        }
        Op::SelfReference { parent, .. } => return Ok(RelSql::Reference(parent.clone())),
        Op::DummyTable { values } => Select {
            projection: items(cx, values)?,
            ..Default::default()
        },
        Op::Project { parent, values } => Select {
            projection: items(cx, values)?,
            from: Some(from(cx, parent)?),
            ..Default::default()
        },
        Op::Select {
            parent,
            selections,
            sort_keys,
            distinct,
            limit,
            offset,
        } => Select {
            distinct: *distinct,
            projection: items(cx, selections)?,
            from: Some(from(cx, parent)?),
            order_by: scalar::order_by(cx, sort_keys)?,
            limit: *limit,
            offset: (*offset > 0).then_some(*offset),
            ..Default::default()
        },
        Op::Filter { parent, predicates } => Select {
            projection: columns(cx, parent)?,
            from: Some(from(cx, parent)?),
            selection: and_all(cx.exprs(predicates)?),
            ..Default::default()
        },
        Op::Aggregate {
            parent,
            groups,
            metrics,
        } => {
            let mut projection = items(cx, groups)?;
            projection.extend(items(cx, metrics)?);
            let group_by = groups
                .iter()
                .map(|(_, g)| cx.expr(g))
                .collect::<RelqResult<Vec<_>>>()?;
            Select {
                projection,
                from: Some(from(cx, parent)?),
                group_by,
                ..Default::default()
            }
        }
        Op::Join {
            kind,
            left,
            right,
            predicates,
        } => join(cx, node, *kind, left, right, predicates)?,
        Op::Sort { parent, keys } => Select {
            projection: columns(cx, parent)?,
            from: Some(from(cx, parent)?),
            order_by: scalar::order_by(cx, keys)?,
            ..Default::default()
        },
        Op::Limit { parent, n, offset } => Select {
            projection: columns(cx, parent)?,
            from: Some(from(cx, parent)?),
            limit: *n,
            offset: (*offset > 0).then_some(*offset),
            ..Default::default()
        },
        Op::Distinct { parent } => Select {
            distinct: true,
            projection: columns(cx, parent)?,
            from: Some(from(cx, parent)?),
            ..Default::default()
        },
        Op::Sample {
            parent,
            fraction,
            method,
            seed,
        } => Select {
            projection: columns(cx, parent)?,
            from: Some(TableWithJoins {
                relation: TableFactor::Sampled {
                    relation: Box::new(factor(cx, parent)?),
                    method: *method,
                    percent: (fraction.0 * 100.0 * 1e6).round() / 1e6,
                    seed: *seed,
                },
                joins: Vec::new(),
            }),
            ..Default::default()
        },
        Op::Union {
            left,
            right,
            distinct,
        } => {
            let operand = |rel: &Node| -> RelqResult<Box<SetExpr>> {
                Ok(Box::new(SetExpr::Select(Box::new(Select::star_from(factor(cx, rel)?)))))
            };
            return Ok(RelSql::Query(Query {
                ctes: Vec::new(),
                body: SetExpr::SetOp {
                    op: SetOperator::Union,
                    all: !distinct,
                    left: operand(left)?,
                    right: operand(right)?,
                },
            }));
        }
        _ => return Err(RelqError::plan(format!("{} is not a relation", node))),
    };
    Ok(RelSql::Query(Query::select(select)))
}

fn join(
    cx: &CompileContext<'_>,
    node: &Node,
    kind: JoinKind,
    left: &Node,
    right: &Node,
    predicates: &[Node],
) -> RelqResult<Select> {
    let on = and_all(cx.exprs(predicates)?);
    let op = match kind {
        JoinKind::Semi | JoinKind::Anti => {
            return exists_join(cx, kind == JoinKind::Anti, left, right, on);
        }
        JoinKind::Inner | JoinKind::Cross if on.is_none() => JoinOperator::Cross,
        JoinKind::Inner | JoinKind::Cross => JoinOperator::Inner,
        JoinKind::Left => JoinOperator::Left,
        JoinKind::Right => JoinOperator::Right,
        JoinKind::Outer if !cx.config.full_outer_join => {
            return Err(cx.unsupported_arg(OpKind::Join, "full outer join"));
        }
        JoinKind::Outer => JoinOperator::Full,
    };
    let join_schema = node
        .schema()
        .ok_or_else(|| RelqError::plan(format!("{} is not a relation", node)))?;
    let on = match op {
        JoinOperator::Cross => None,
        _ => Some(on.unwrap_or(SqlExpr::Literal(SqlLiteral::Bool(true)))),
    };

    let mut projection = columns(cx, left)?;
    let right_names = join_schema
        .names()
        .skip(projection.len())
        .map(str::to_string)
        .collect::<Vec<_>>();
    let right_alias = cx.alias(right)?;
    let right_schema = right
        .schema()
        .ok_or_else(|| RelqError::plan(format!("{} is not a relation", right)))?;
    for (name, out) in right_schema.names().zip(right_names) {
        projection.push(SelectItem::Expr {
            expr: SqlExpr::column(right_alias, name),
            alias: Some(out),
        });
    }
    Ok(Select {
        projection,
        from: Some(TableWithJoins {
            relation: factor(cx, left)?,
            joins: vec![Join {
                op,
                relation: factor(cx, right)?,
                on,
            }],
        }),
        ..Default::default()
    })
}

/// Semi and anti joins as `[NOT] EXISTS (SELECT 1 FROM right WHERE ...)`.
fn exists_join(
    cx: &CompileContext<'_>,
    negated: bool,
    left: &Node,
    right: &Node,
    on: Option<SqlExpr>,
) -> RelqResult<Select> {
    let probe = Select {
        projection: vec![SelectItem::Expr {
            expr: SqlExpr::int(1),
            alias: None,
        }],
        from: Some(from(cx, right)?),
        selection: on,
        ..Default::default()
    };
    Ok(Select {
        projection: columns(cx, left)?,
        from: Some(from(cx, left)?),
        selection: Some(SqlExpr::Exists {
            subquery: Box::new(Query::select(probe)),
            negated,
        }),
        ..Default::default()
    })
}

fn items(cx: &CompileContext<'_>, values: &[(String, Node)]) -> RelqResult<Vec<SelectItem>> {
    values
        .iter()
        .map(|(name, value)| {
            Ok(SelectItem::Expr {
                expr: cx.expr(value)?,
                alias: Some(name.clone()),
            })
        })
        .collect()
}

/// Every column of `parent`, qualified by its alias.
fn columns(cx: &CompileContext<'_>, parent: &Node) -> RelqResult<Vec<SelectItem>> {
    let alias = cx.alias(parent)?;
    let schema = parent
        .schema()
        .ok_or_else(|| RelqError::plan(format!("{} is not a relation", parent)))?;
    Ok(schema
        .names()
        .map(|name| SelectItem::Expr {
            expr: SqlExpr::column(alias, name),
            alias: Some(name.to_string()),
        })
        .collect())
}

fn from(cx: &CompileContext<'_>, rel: &Node) -> RelqResult<TableWithJoins> {
    Ok(TableWithJoins {
        relation: factor(cx, rel)?,
        joins: Vec::new(),
    })
}

/// How `rel` appears in a FROM clause.
pub fn factor(cx: &CompileContext<'_>, rel: &Node) -> RelqResult<TableFactor> {
    factor_as(cx, rel, cx.alias(rel)?.to_string())
}

fn factor_as(cx: &CompileContext<'_>, rel: &Node, alias: String) -> RelqResult<TableFactor> {
    if cx.is_cte(rel) {
        let name = cx.alias(rel)?.to_string();
        let alias = (name != alias).then_some(alias);
        return Ok(TableFactor::Table {
            name,
            database: None,
            alias,
        });
    }
    match cx.relation(rel)? {
        RelSql::Table { name, database } => Ok(TableFactor::Table {
            name: name.clone(),
            database: database.clone(),
            alias: Some(alias),
        }),
        RelSql::Query(query) => Ok(TableFactor::Derived {
            subquery: Box::new(query.clone()),
            alias,
        }),
        RelSql::Reference(parent) => factor_as(cx, parent, alias),
    }
}

/// The outermost query for `root`.
pub fn root_query(cx: &CompileContext<'_>, root: &Node) -> RelqResult<Query> {
    if !cx.is_cte(root)
        && let RelSql::Query(query) = cx.relation(root)?
    {
        return Ok(query.clone());
    }
    Ok(Query::select(Select::star_from(factor(cx, root)?)))
}
