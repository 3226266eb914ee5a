//! Convenience constructors for building expression graphs.
//!
//! Every builder goes through [`Node::new`], so the same validation applies
//! as for hand-built operations.

use crate::ast::node::{Fraction, Node, Op, Output, next_self_reference_id};
use crate::ast::ops::{
    AggFunc, AnalyticFunc, BinaryOp, Func, HashAlgorithm, JoinKind, SampleMethod, UnaryOp,
    WindowFrame,
};
use crate::ast::schema::Schema;
use crate::ast::types::{DataType, IntervalUnit, TimeUnit};
use crate::ast::values::Value;
use crate::error::{RelqError, RelqResult};

/// Create an unbound table.
pub fn table<I, S>(name: &str, fields: I) -> RelqResult<Node>
where
    I: IntoIterator<Item = (S, DataType)>,
    S: Into<String>,
{
    let schema = Schema::new(fields).map_err(|reason| {
        RelqError::type_error(crate::ast::ops::OpKind::UnboundTable, "schema", reason)
    })?;
    table_with_schema(name, None, schema)
}

pub fn table_with_schema(name: &str, database: Option<&str>, schema: Schema) -> RelqResult<Node> {
    Node::new(Op::UnboundTable {
        name: name.to_string(),
        schema,
        database: database.map(str::to_string),
    })
}

/// A literal with its inferred type.
pub fn lit(value: impl Into<Value>) -> Node {
    let value = value.into();
    let dtype = value.infer_type();
    Node::build(Op::Literal { value, dtype: dtype.clone() }, Output::Scalar(dtype))
}

/// A literal of an explicit type.
pub fn lit_typed(value: impl Into<Value>, dtype: DataType) -> RelqResult<Node> {
    Node::new(Op::Literal {
        value: value.into(),
        dtype,
    })
}

/// A typed NULL.
pub fn null(dtype: DataType) -> Node {
    let dtype = dtype.with_nullable(true);
    Node::build(
        Op::Literal {
            value: Value::Null,
            dtype: dtype.clone(),
        },
        Output::Scalar(dtype),
    )
}

pub fn param(name: &str, dtype: DataType) -> Node {
    Node::build(
        Op::ScalarParameter {
            name: name.to_string(),
            dtype: dtype.clone(),
        },
        Output::Scalar(dtype),
    )
}

pub fn call(func: Func, args: impl IntoIterator<Item = Node>) -> RelqResult<Node> {
    Node::new(Op::Call {
        func,
        args: args.into_iter().collect(),
    })
}

pub fn reduction(func: AggFunc, args: impl IntoIterator<Item = Node>) -> RelqResult<Node> {
    Node::new(Op::Reduction {
        func,
        args: args.into_iter().collect(),
        filter: None,
    })
}

pub fn analytic(func: AnalyticFunc, args: impl IntoIterator<Item = Node>) -> RelqResult<Node> {
    Node::new(Op::Analytic {
        func,
        args: args.into_iter().collect(),
    })
}

/// Searched CASE over `(condition, result)` pairs.
pub fn if_else(
    cases: impl IntoIterator<Item = (Node, Node)>,
    default: Option<Node>,
) -> RelqResult<Node> {
    Node::new(Op::IfElse {
        cases: cases.into_iter().collect(),
        default,
    })
}

pub fn struct_column<S: Into<String>>(
    fields: impl IntoIterator<Item = (S, Node)>,
) -> RelqResult<Node> {
    let (names, values): (Vec<String>, Vec<Node>) =
        fields.into_iter().map(|(n, v)| (n.into(), v)).unzip();
    Node::new(Op::StructColumn { names, values })
}

/// A single-row relation of constant values.
pub fn dummy_table<S: Into<String>>(
    values: impl IntoIterator<Item = (S, Node)>,
) -> RelqResult<Node> {
    Node::new(Op::DummyTable {
        values: values.into_iter().map(|(n, v)| (n.into(), v)).collect(),
    })
}

fn named<S: Into<String>>(values: impl IntoIterator<Item = (S, Node)>) -> Vec<(String, Node)> {
    values.into_iter().map(|(n, v)| (n.into(), v)).collect()
}

/// Wrap plain expressions into ascending sort keys.
fn sort_keys(keys: impl IntoIterator<Item = Node>) -> RelqResult<Vec<Node>> {
    keys.into_iter()
        .map(|k| match k.op() {
            Op::SortKey { .. } => Ok(k),
            _ => k.asc(),
        })
        .collect()
}

// Relations
impl Node {
    /// A field of this relation.
    pub fn col(&self, name: &str) -> RelqResult<Node> {
        Node::new(Op::Field {
            rel: self.clone(),
            name: name.to_string(),
        })
    }

    pub fn project<S: Into<String>>(
        &self,
        values: impl IntoIterator<Item = (S, Node)>,
    ) -> RelqResult<Node> {
        Node::new(Op::Project {
            parent: self.clone(),
            values: named(values),
        })
    }

    /// Project existing columns by name.
    pub fn select_columns(&self, names: &[&str]) -> RelqResult<Node> {
        let values = names
            .iter()
            .map(|n| Ok((n.to_string(), self.col(n)?)))
            .collect::<RelqResult<Vec<_>>>()?;
        self.project(values)
    }

    pub fn filter(&self, predicates: impl IntoIterator<Item = Node>) -> RelqResult<Node> {
        Node::new(Op::Filter {
            parent: self.clone(),
            predicates: predicates.into_iter().collect(),
        })
    }

    pub fn aggregate<S: Into<String>, T: Into<String>>(
        &self,
        groups: impl IntoIterator<Item = (S, Node)>,
        metrics: impl IntoIterator<Item = (T, Node)>,
    ) -> RelqResult<Node> {
        Node::new(Op::Aggregate {
            parent: self.clone(),
            groups: named(groups),
            metrics: named(metrics),
        })
    }

    pub fn join(
        &self,
        right: &Node,
        kind: JoinKind,
        predicates: impl IntoIterator<Item = Node>,
    ) -> RelqResult<Node> {
        Node::new(Op::Join {
            kind,
            left: self.clone(),
            right: right.clone(),
            predicates: predicates.into_iter().collect(),
        })
    }

    /// Sort by `keys`; plain expressions sort ascending.
    pub fn order_by(&self, keys: impl IntoIterator<Item = Node>) -> RelqResult<Node> {
        Node::new(Op::Sort {
            parent: self.clone(),
            keys: sort_keys(keys)?,
        })
    }

    pub fn limit(&self, n: Option<u64>, offset: u64) -> RelqResult<Node> {
        Node::new(Op::Limit {
            parent: self.clone(),
            n,
            offset,
        })
    }

    pub fn distinct(&self) -> RelqResult<Node> {
        Node::new(Op::Distinct {
            parent: self.clone(),
        })
    }

    pub fn sample(
        &self,
        fraction: f64,
        method: SampleMethod,
        seed: Option<u64>,
    ) -> RelqResult<Node> {
        Node::new(Op::Sample {
            parent: self.clone(),
            fraction: Fraction(fraction),
            method,
            seed,
        })
    }

    pub fn union(&self, other: &Node, distinct: bool) -> RelqResult<Node> {
        Node::new(Op::Union {
            left: self.clone(),
            right: other.clone(),
            distinct,
        })
    }

    /// A new, distinct reference to this relation.
    pub fn view(&self) -> RelqResult<Node> {
        Node::new(Op::SelfReference {
            parent: self.clone(),
            id: next_self_reference_id(),
        })
    }

    /// `COUNT(*)` over this relation.
    pub fn count_star(&self) -> RelqResult<Node> {
        reduction(AggFunc::CountStar, [self.clone()])
    }
}

// Scalars
impl Node {
    pub fn alias(&self, name: &str) -> RelqResult<Node> {
        Node::new(Op::Alias {
            arg: self.clone(),
            name: name.to_string(),
        })
    }

    pub fn cast(&self, to: DataType) -> RelqResult<Node> {
        Node::new(Op::Cast {
            arg: self.clone(),
            to,
        })
    }

    pub fn asc(&self) -> RelqResult<Node> {
        Node::new(Op::SortKey {
            expr: self.clone(),
            ascending: true,
        })
    }

    pub fn desc(&self) -> RelqResult<Node> {
        Node::new(Op::SortKey {
            expr: self.clone(),
            ascending: false,
        })
    }

    pub fn binary(&self, op: BinaryOp, other: Node) -> RelqResult<Node> {
        Node::new(Op::Binary {
            op,
            left: self.clone(),
            right: other,
        })
    }

    pub fn add(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Add, other)
    }

    pub fn sub(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Subtract, other)
    }

    pub fn mul(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Multiply, other)
    }

    pub fn div(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Divide, other)
    }

    pub fn eq(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Equals, other)
    }

    pub fn ne(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::NotEquals, other)
    }

    pub fn lt(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Less, other)
    }

    pub fn le(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::LessEqual, other)
    }

    pub fn gt(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Greater, other)
    }

    pub fn ge(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::GreaterEqual, other)
    }

    pub fn and(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::And, other)
    }

    pub fn or(&self, other: Node) -> RelqResult<Node> {
        self.binary(BinaryOp::Or, other)
    }

    pub fn not(&self) -> RelqResult<Node> {
        self.unary(UnaryOp::Not)
    }

    pub fn unary(&self, op: UnaryOp) -> RelqResult<Node> {
        Node::new(Op::Unary {
            op,
            arg: self.clone(),
        })
    }

    pub fn is_null(&self) -> RelqResult<Node> {
        self.unary(UnaryOp::IsNull)
    }

    pub fn isin(&self, options: impl IntoIterator<Item = Node>) -> RelqResult<Node> {
        Node::new(Op::InValues {
            arg: self.clone(),
            options: options.into_iter().collect(),
        })
    }

    pub fn contains(&self, needle: Node) -> RelqResult<Node> {
        call(Func::StringContains, [self.clone(), needle])
    }

    pub fn starts_with(&self, prefix: Node) -> RelqResult<Node> {
        call(Func::StartsWith, [self.clone(), prefix])
    }

    pub fn ends_with(&self, suffix: Node) -> RelqResult<Node> {
        call(Func::EndsWith, [self.clone(), suffix])
    }

    pub fn sum(&self) -> RelqResult<Node> {
        reduction(AggFunc::Sum, [self.clone()])
    }

    pub fn mean(&self) -> RelqResult<Node> {
        reduction(AggFunc::Mean, [self.clone()])
    }

    pub fn count(&self) -> RelqResult<Node> {
        reduction(AggFunc::Count, [self.clone()])
    }

    /// Attach a filter to a reduction.
    pub fn where_(&self, predicate: Node) -> RelqResult<Node> {
        match self.op() {
            Op::Reduction { func, args, .. } => Node::new(Op::Reduction {
                func: *func,
                args: args.clone(),
                filter: Some(predicate),
            }),
            _ => Err(RelqError::type_error(
                self.kind(),
                "where",
                "only reductions accept a filter",
            )),
        }
    }

    /// Evaluate this analytic function or reduction over a window.
    pub fn over(
        &self,
        group_by: impl IntoIterator<Item = Node>,
        order_by: impl IntoIterator<Item = Node>,
        frame: Option<WindowFrame>,
    ) -> RelqResult<Node> {
        Node::new(Op::WindowFunction {
            func: self.clone(),
            group_by: group_by.into_iter().collect(),
            order_by: sort_keys(order_by)?,
            frame,
        })
    }

    pub fn truncate(&self, unit: IntervalUnit) -> RelqResult<Node> {
        Node::new(Op::TimestampTruncate {
            arg: self.clone(),
            unit,
        })
    }

    pub fn to_timestamp(&self, unit: TimeUnit) -> RelqResult<Node> {
        Node::new(Op::TimestampFromUnix {
            arg: self.clone(),
            unit,
        })
    }

    pub fn hash_bytes(&self, how: HashAlgorithm) -> RelqResult<Node> {
        Node::new(Op::HashBytes {
            arg: self.clone(),
            how,
        })
    }
}
