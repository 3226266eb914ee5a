//! Fold projection, ordering, DISTINCT and LIMIT layers into `Select` nodes.
//!
//! Each fusion keeps the layer that observes the ordering as the one that
//! emits it, so `Distinct(Project(Sort(t, b), [a]))` becomes one
//! `SELECT DISTINCT a FROM t ORDER BY b`. Filters are never fused.

use crate::ast::{Node, Op};
use crate::dialect::DialectConfig;
use crate::error::{RelqError, RelqResult};

pub fn fuse_selects(node: &Node, _config: &DialectConfig) -> RelqResult<Node> {
    node.replace(fuse)
}

fn fuse(node: &Node) -> RelqResult<Node> {
    match node.op() {
        Op::Project { parent, values } => project(parent, values),
        Op::Sort { parent, keys } => sort(parent, keys),
        Op::Distinct { parent } => distinct(parent),
        Op::Limit { parent, n, offset } => limit(parent, *n, *offset),
        _ => Ok(node.clone()),
    }
}

/// Parts of a `Select` that another layer may still be folded into.
struct Open<'a> {
    parent: &'a Node,
    selections: &'a [(String, Node)],
    sort_keys: &'a [Node],
    distinct: bool,
}

/// The select under `node` if it has no LIMIT or OFFSET yet.
fn open_select(node: &Node) -> Option<Open<'_>> {
    match node.op() {
        Op::Select {
            parent,
            selections,
            sort_keys,
            distinct,
            limit: None,
            offset: 0,
        } => Some(Open {
            parent,
            selections,
            sort_keys,
            distinct: *distinct,
        }),
        _ => None,
    }
}

fn has_window(selections: &[(String, Node)]) -> bool {
    selections.iter().any(|(_, v)| v.has_window())
}

fn project(parent: &Node, values: &[(String, Node)]) -> RelqResult<Node> {
    if let Some(open) = open_select(parent)
        && !open.distinct
        && !has_window(open.selections)
    {
        let values = values
            .iter()
            .map(|(name, v)| Ok((name.clone(), v.dereference(parent, open.selections)?)))
            .collect::<RelqResult<Vec<_>>>()?;
        return select(open.parent, values, open.sort_keys.to_vec(), false, None, 0);
    }
    select(parent, values.to_vec(), Vec::new(), false, None, 0)
}

fn sort(parent: &Node, keys: &[Node]) -> RelqResult<Node> {
    if let Some(open) = open_select(parent)
        && !open.distinct
        && !has_window(open.selections)
    {
        // the newest ordering is the primary one
        let mut sort_keys = keys
            .iter()
            .map(|k| k.dereference(parent, open.selections))
            .collect::<RelqResult<Vec<_>>>()?;
        sort_keys.extend(open.sort_keys.iter().cloned());
        return select(open.parent, open.selections.to_vec(), sort_keys, false, None, 0);
    }
    select(parent, passthrough(parent)?, keys.to_vec(), false, None, 0)
}

fn distinct(parent: &Node) -> RelqResult<Node> {
    if let Some(open) = open_select(parent) {
        return select(
            open.parent,
            open.selections.to_vec(),
            open.sort_keys.to_vec(),
            true,
            None,
            0,
        );
    }
    select(parent, passthrough(parent)?, Vec::new(), true, None, 0)
}

fn limit(parent: &Node, n: Option<u64>, offset: u64) -> RelqResult<Node> {
    if let Some(open) = open_select(parent) {
        return select(
            open.parent,
            open.selections.to_vec(),
            open.sort_keys.to_vec(),
            open.distinct,
            n,
            offset,
        );
    }
    select(parent, passthrough(parent)?, Vec::new(), false, n, offset)
}

/// Every column of `rel`, unchanged.
fn passthrough(rel: &Node) -> RelqResult<Vec<(String, Node)>> {
    let schema = rel
        .schema()
        .ok_or_else(|| RelqError::plan(format!("{} is not a relation", rel)))?;
    schema
        .names()
        .map(|name| Ok((name.to_string(), rel.col(name)?)))
        .collect()
}

fn select(
    parent: &Node,
    selections: Vec<(String, Node)>,
    sort_keys: Vec<Node>,
    distinct: bool,
    limit: Option<u64>,
    offset: u64,
) -> RelqResult<Node> {
    Node::new(Op::Select {
        parent: parent.clone(),
        selections,
        sort_keys,
        distinct,
        limit,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::table;
    use crate::ast::{DataType, OpKind};
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table("t", [("a", DataType::int64()), ("b", DataType::string())]).unwrap()
    }

    fn run(node: &Node) -> Node {
        fuse_selects(node, Dialect::DuckDb.config()).unwrap()
    }

    #[test]
    fn test_distinct_project_sort_is_one_select() {
        let t = t();
        let sorted = t.order_by([t.col("b").unwrap()]).unwrap();
        let expr = sorted
            .project([("a", sorted.col("a").unwrap())])
            .unwrap()
            .distinct()
            .unwrap();
        let fused = run(&expr);
        match fused.op() {
            Op::Select {
                parent,
                selections,
                sort_keys,
                distinct,
                ..
            } => {
                assert!(parent.ptr_eq(&t));
                assert!(distinct);
                assert_eq!(selections, &vec![("a".to_string(), t.col("a").unwrap())]);
                assert_eq!(sort_keys, &vec![t.col("b").unwrap().asc().unwrap()]);
            }
            other => panic!("expected a select, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_is_not_fused() {
        let t = t();
        let projected = t.select_columns(&["a", "b"]).unwrap();
        let pred = projected.col("a").unwrap().gt(crate::ast::builders::lit(1)).unwrap();
        let filtered = projected.filter([pred]).unwrap();
        let fused = run(&filtered);
        assert_eq!(fused.kind(), OpKind::Filter);
        match fused.op() {
            Op::Filter { parent, .. } => assert_eq!(parent.kind(), OpKind::Select),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_limit_closes_the_select() {
        let t = t();
        let limited = t.limit(Some(5), 0).unwrap();
        let sorted = limited.order_by([limited.col("a").unwrap()]).unwrap();
        let fused = run(&sorted);
        match fused.op() {
            Op::Select { parent, sort_keys, limit, .. } => {
                // ordering after a limit needs its own layer
                assert_eq!(*limit, None);
                assert_eq!(sort_keys.len(), 1);
                assert!(matches!(parent.op(), Op::Select { limit: Some(5), .. }));
            }
            other => panic!("expected a select, got {:?}", other),
        }
    }

    #[test]
    fn test_later_sort_is_primary() {
        let t = t();
        let first = t.order_by([t.col("a").unwrap()]).unwrap();
        let second = first.order_by([first.col("b").unwrap()]).unwrap();
        match run(&second).op() {
            Op::Select { sort_keys, .. } => assert_eq!(
                sort_keys,
                &vec![t.col("b").unwrap().asc().unwrap(), t.col("a").unwrap().asc().unwrap()]
            ),
            other => panic!("expected a select, got {:?}", other),
        }
    }
}
