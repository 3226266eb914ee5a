//! Window specification rewrites.

use crate::ast::builders::null;
use crate::ast::{AnalyticFunc, DataType, Node, Op, OpKind, WindowFrame};
use crate::dialect::DialectConfig;
use crate::error::RelqResult;
use crate::sql::OrderByExpr;

/// The ordering and frame of a compiled window, before it is printed.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub order_by: Vec<OrderByExpr>,
    pub frame: Option<WindowFrame>,
}

/// Give order-dependent analytic functions without an ordering a constant
/// `ORDER BY NULL`, for engines that reject an empty ordering.
pub fn rewrite_empty_order_by_window(node: &Node, _config: &DialectConfig) -> RelqResult<Node> {
    node.replace(|n| match n.op() {
        Op::WindowFunction {
            func,
            group_by,
            order_by,
            frame,
        } if order_by.is_empty() && requires_order(func) => Node::new(Op::WindowFunction {
            func: func.clone(),
            group_by: group_by.clone(),
            order_by: vec![null(DataType::null()).asc()?],
            frame: *frame,
        }),
        _ => Ok(n.clone()),
    })
}

fn requires_order(func: &Node) -> bool {
    matches!(func.kind(), OpKind::Analytic(f) if f.requires_order())
}

/// Drop the parts of a window specification that do not change its result.
///
/// Ranking functions and `LAG`/`LEAD` ignore frames. An order-insensitive
/// reduction over the whole partition needs neither frame nor ordering.
pub fn minimize_spec(func: &Node, mut spec: WindowSpec) -> WindowSpec {
    match func.kind() {
        OpKind::Analytic(f)
            if f.is_rank() || matches!(f, AnalyticFunc::Lag | AnalyticFunc::Lead) =>
        {
            spec.frame = None;
        }
        OpKind::Reduction(f)
            if f.is_order_insensitive() && spec.frame.is_some_and(|w| w.is_full()) =>
        {
            spec.frame = None;
            spec.order_by.clear();
        }
        _ => {}
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{analytic, table};
    use crate::ast::{AggFunc, FrameBound, FrameKind};
    use crate::dialect::Dialect;
    use crate::sql::SqlExpr;
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table("t", [("a", DataType::int64()), ("g", DataType::string())]).unwrap()
    }

    fn spec(frame: Option<WindowFrame>) -> WindowSpec {
        WindowSpec {
            order_by: vec![OrderByExpr {
                expr: SqlExpr::column("t0", "a"),
                asc: true,
            }],
            frame,
        }
    }

    #[test]
    fn test_empty_order_by_gets_null_key() {
        let t = t();
        let rn = analytic(AnalyticFunc::RowNumber, []).unwrap();
        let w = rn.over([t.col("g").unwrap()], [], None).unwrap();
        let expr = t.project([("rn", w)]).unwrap();
        let out = rewrite_empty_order_by_window(&expr, Dialect::Impala.config()).unwrap();
        let Op::Project { values, .. } = out.op() else {
            panic!("expected a projection");
        };
        let Op::WindowFunction { order_by, .. } = values[0].1.op() else {
            panic!("expected a window");
        };
        assert_eq!(order_by, &vec![null(DataType::null()).asc().unwrap()]);
    }

    #[test]
    fn test_ordered_and_unordered_functions_untouched() {
        let t = t();
        let a = t.col("a").unwrap();
        let sum = a.sum().unwrap().over([], [], None).unwrap();
        let first = analytic(AnalyticFunc::FirstValue, [a.clone()])
            .unwrap()
            .over([], [], None)
            .unwrap();
        let expr = t.project([("s", sum), ("f", first)]).unwrap();
        let out = rewrite_empty_order_by_window(&expr, Dialect::Impala.config()).unwrap();
        assert!(out.ptr_eq(&expr));
    }

    #[test]
    fn test_rank_drops_frame() {
        let rank = analytic(AnalyticFunc::Rank, []).unwrap();
        let out = minimize_spec(&rank, spec(Some(WindowFrame::full())));
        assert_eq!(out, spec(None));
    }

    #[test]
    fn test_full_frame_sum_drops_ordering() {
        let sum = t().col("a").unwrap().sum().unwrap();
        let out = minimize_spec(&sum, spec(Some(WindowFrame::full())));
        assert_eq!(out.frame, None);
        assert!(out.order_by.is_empty());
    }

    #[test]
    fn test_running_sum_and_first_keep_spec() {
        let t = t();
        let running = WindowFrame {
            kind: FrameKind::Rows,
            start: FrameBound::UnboundedPreceding,
            end: FrameBound::CurrentRow,
        };
        let sum = t.col("a").unwrap().sum().unwrap();
        assert_eq!(minimize_spec(&sum, spec(Some(running))), spec(Some(running)));

        let first = crate::ast::builders::reduction(AggFunc::First, [t.col("a").unwrap()]).unwrap();
        assert_eq!(
            minimize_spec(&first, spec(Some(WindowFrame::full()))),
            spec(Some(WindowFrame::full()))
        );
    }
}
