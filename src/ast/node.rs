//! Immutable, hash-consed expression graph nodes.
//!
//! Every node is created through [`Node::new`], which resolves the output
//! type or schema of the operation and checks the integrity rules of the
//! graph. Structurally equal nodes share one allocation for as long as any
//! handle to them is alive.

use crate::ast::ops::{
    AggFunc, AnalyticFunc, ArgClass, BinaryOp, Func, HashAlgorithm, JoinKind, Nulls, OpKind,
    Returns, SampleMethod, Signature, UnaryOp, WindowFrame,
};
use crate::ast::schema::Schema;
use crate::ast::types::{DataType, IntervalUnit, TimeUnit, TypeKind};
use crate::ast::values::Value;
use crate::error::{RelqError, RelqResult};
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, Weak};

/// Sampling fraction, compared bitwise so it can be part of a node's identity.
#[derive(Debug, Clone, Copy)]
pub struct Fraction(pub f64);

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Fraction {}

impl Hash for Fraction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// One operation of the expression graph together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    UnboundTable {
        name: String,
        schema: Schema,
        database: Option<String>,
    },
    /// A single-row relation of constant expressions.
    DummyTable {
        values: Vec<(String, Node)>,
    },
    /// A distinct reference to a relation, used to self-join.
    SelfReference {
        parent: Node,
        id: u64,
    },
    Project {
        parent: Node,
        values: Vec<(String, Node)>,
    },
    /// Projection fused with ordering, DISTINCT and LIMIT into one layer.
    Select {
        parent: Node,
        selections: Vec<(String, Node)>,
        sort_keys: Vec<Node>,
        distinct: bool,
        limit: Option<u64>,
        offset: u64,
    },
    Filter {
        parent: Node,
        predicates: Vec<Node>,
    },
    Aggregate {
        parent: Node,
        groups: Vec<(String, Node)>,
        metrics: Vec<(String, Node)>,
    },
    Join {
        kind: JoinKind,
        left: Node,
        right: Node,
        predicates: Vec<Node>,
    },
    Sort {
        parent: Node,
        keys: Vec<Node>,
    },
    Limit {
        parent: Node,
        n: Option<u64>,
        offset: u64,
    },
    Distinct {
        parent: Node,
    },
    Sample {
        parent: Node,
        fraction: Fraction,
        method: SampleMethod,
        seed: Option<u64>,
    },
    Union {
        left: Node,
        right: Node,
        distinct: bool,
    },
    Field {
        rel: Node,
        name: String,
    },
    Literal {
        value: Value,
        dtype: DataType,
    },
    ScalarParameter {
        name: String,
        dtype: DataType,
    },
    Alias {
        arg: Node,
        name: String,
    },
    Cast {
        arg: Node,
        to: DataType,
    },
    SortKey {
        expr: Node,
        ascending: bool,
    },
    Binary {
        op: BinaryOp,
        left: Node,
        right: Node,
    },
    Unary {
        op: UnaryOp,
        arg: Node,
    },
    /// Searched CASE.
    IfElse {
        cases: Vec<(Node, Node)>,
        default: Option<Node>,
    },
    InValues {
        arg: Node,
        options: Vec<Node>,
    },
    StructColumn {
        names: Vec<String>,
        values: Vec<Node>,
    },
    Call {
        func: Func,
        args: Vec<Node>,
    },
    Reduction {
        func: AggFunc,
        args: Vec<Node>,
        filter: Option<Node>,
    },
    Analytic {
        func: AnalyticFunc,
        args: Vec<Node>,
    },
    WindowFunction {
        func: Node,
        group_by: Vec<Node>,
        order_by: Vec<Node>,
        frame: Option<WindowFrame>,
    },
    TimestampTruncate {
        arg: Node,
        unit: IntervalUnit,
    },
    TimestampFromUnix {
        arg: Node,
        unit: TimeUnit,
    },
    HashBytes {
        arg: Node,
        how: HashAlgorithm,
    },
}

/// What a node produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Output {
    Scalar(DataType),
    Relation(Schema),
}

#[derive(Debug)]
pub struct NodeData {
    op: Op,
    output: Output,
    depth: usize,
    hash: u64,
    /// Relations referenced by a scalar expression (fields and `COUNT(*)`).
    rels: Vec<Node>,
    has_reduction: bool,
    has_window: bool,
}

thread_local! {
    /// Children of nodes being dropped, released one at a time by the
    /// outermost drop on this thread.
    static PENDING_DROPS: RefCell<Option<Vec<Node>>> = const { RefCell::new(None) };
}

impl Drop for NodeData {
    // Dropping a long chain recursively would exhaust the stack.
    fn drop(&mut self) {
        let mut children: Vec<Node> = self.op.children().into_iter().cloned().collect();
        children.append(&mut self.rels);
        if children.is_empty() {
            return;
        }
        let nested = PENDING_DROPS.try_with(|pending| {
            let mut pending = pending.borrow_mut();
            match pending.as_mut() {
                Some(queue) => {
                    queue.append(&mut children);
                    true
                }
                None => {
                    *pending = Some(Vec::new());
                    false
                }
            }
        });
        // thread-local already torn down: fall back to a plain drop
        let Ok(false) = nested else {
            return;
        };

        let mut batch = children;
        while !batch.is_empty() {
            drop(batch);
            batch = PENDING_DROPS
                .try_with(|pending| {
                    let mut pending = pending.borrow_mut();
                    let next = pending.as_mut().map(std::mem::take).unwrap_or_default();
                    if next.is_empty() {
                        *pending = None;
                    }
                    next
                })
                .unwrap_or_default();
        }
    }
}

/// Appended to a right-side join column whose name the left side already uses.
pub const JOIN_RIGHT_SUFFIX: &str = "_right";

/// Shared handle to an immutable graph node.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

static INTERNER: LazyLock<Mutex<Interner>> = LazyLock::new(|| Mutex::new(Interner::default()));

static SELF_REFERENCE_IDS: AtomicU64 = AtomicU64::new(0);

#[derive(Default)]
struct Interner {
    buckets: HashMap<u64, Vec<Weak<NodeData>>>,
    inserts: usize,
}

impl Interner {
    const SWEEP_EVERY: usize = 4096;

    fn intern(&mut self, data: NodeData) -> Node {
        let bucket = self.buckets.entry(data.hash).or_default();
        for weak in bucket.iter() {
            if let Some(existing) = weak.upgrade()
                && existing.op == data.op
            {
                return Node(existing);
            }
        }
        bucket.retain(|w| w.strong_count() > 0);
        let node = Arc::new(data);
        bucket.push(Arc::downgrade(&node));

        self.inserts += 1;
        if self.inserts % Self::SWEEP_EVERY == 0 {
            self.buckets.retain(|_, bucket| {
                bucket.retain(|w| w.strong_count() > 0);
                !bucket.is_empty()
            });
        }
        Node(node)
    }
}

/// Fresh identifier for a `SelfReference`.
pub fn next_self_reference_id() -> u64 {
    SELF_REFERENCE_IDS.fetch_add(1, Ordering::Relaxed)
}

impl Node {
    /// Validate `op` and return the canonical node for it.
    pub fn new(op: Op) -> RelqResult<Node> {
        let kind = op.kind();
        let children = op.children();

        if kind != OpKind::WindowFunction
            && let Some(c) = children.iter().find(|c| matches!(c.kind(), OpKind::Analytic(_)))
        {
            return Err(RelqError::type_error(
                kind,
                c.kind().to_string(),
                "analytic functions are only valid inside a window function",
            ));
        }

        let output = resolve(&op)?;
        Ok(Node::build(op, output))
    }

    /// Intern an operation whose output is already known to be valid.
    pub(crate) fn build(op: Op, output: Output) -> Node {
        let kind = op.kind();
        let children = op.children();
        let depth = 1 + children.iter().map(|c| c.depth()).max().unwrap_or(0);

        let mut rels: Vec<Node> = Vec::new();
        let mut has_reduction = false;
        let mut has_window = false;
        if matches!(output, Output::Scalar(_)) {
            for child in &children {
                if child.is_relation() {
                    if !rels.iter().any(|r| r.ptr_eq(child)) {
                        rels.push((*child).clone());
                    }
                    continue;
                }
                for r in child.rels() {
                    if !rels.iter().any(|x| x.ptr_eq(r)) {
                        rels.push(r.clone());
                    }
                }
                has_reduction |= child.has_reduction();
                has_window |= child.has_window();
            }
            match kind {
                OpKind::Reduction(_) => has_reduction = true,
                OpKind::WindowFunction => {
                    has_reduction = false;
                    has_window = true;
                }
                _ => {}
            }
        }

        let mut hasher = DefaultHasher::new();
        op.hash(&mut hasher);
        let hash = hasher.finish();

        let data = NodeData {
            op,
            output,
            depth,
            hash,
            rels,
            has_reduction,
            has_window,
        };
        let mut interner = INTERNER.lock().unwrap_or_else(|e| e.into_inner());
        interner.intern(data)
    }

    pub fn op(&self) -> &Op {
        &self.0.op
    }

    pub fn kind(&self) -> OpKind {
        self.0.op.kind()
    }

    pub fn output(&self) -> &Output {
        &self.0.output
    }

    /// Output type of a scalar node.
    pub fn dtype(&self) -> Option<&DataType> {
        match &self.0.output {
            Output::Scalar(t) => Some(t),
            Output::Relation(_) => None,
        }
    }

    /// Output schema of a relation node.
    pub fn schema(&self) -> Option<&Schema> {
        match &self.0.output {
            Output::Relation(s) => Some(s),
            Output::Scalar(_) => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.0.output, Output::Relation(_))
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_relation()
    }

    pub fn depth(&self) -> usize {
        self.0.depth
    }

    pub fn structural_hash(&self) -> u64 {
        self.0.hash
    }

    pub fn rels(&self) -> &[Node] {
        &self.0.rels
    }

    /// Whether a reduction appears outside of any window function.
    pub fn has_reduction(&self) -> bool {
        self.0.has_reduction
    }

    pub fn has_window(&self) -> bool {
        self.0.has_window
    }

    pub fn children(&self) -> Vec<&Node> {
        self.0.op.children()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Name a scalar gets as a column when the caller gives none.
    pub fn default_name(&self) -> String {
        match self.op() {
            Op::Alias { name, .. } | Op::Field { name, .. } => name.clone(),
            _ => self.kind().to_string(),
        }
    }

    /// Every distinct node reachable from `self`, children before parents.
    pub fn postorder(&self) -> Vec<Node> {
        let mut seen: HashSet<Node> = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<(Node, bool)> = vec![(self.clone(), false)];
        while let Some((node, expanded)) = stack.pop() {
            if seen.contains(&node) {
                continue;
            }
            if expanded {
                seen.insert(node.clone());
                order.push(node);
                continue;
            }
            stack.push((node.clone(), true));
            for child in node.children().into_iter().rev() {
                if !seen.contains(child) {
                    stack.push((child.clone(), false));
                }
            }
        }
        order
    }

    /// Rebuild the graph bottom-up, applying `f` to every node after its
    /// children have been rebuilt. Each distinct node is visited once.
    pub fn replace<F>(&self, f: F) -> RelqResult<Node>
    where
        F: FnMut(&Node) -> RelqResult<Node>,
    {
        self.replace_until(|_| false, f)
    }

    /// Like [`Node::replace`], but nodes matching `stop` are kept as they
    /// are and not descended into.
    pub fn replace_until<S, F>(&self, stop: S, mut f: F) -> RelqResult<Node>
    where
        S: Fn(&Node) -> bool,
        F: FnMut(&Node) -> RelqResult<Node>,
    {
        let mut done: HashMap<Node, Node> = HashMap::new();
        let mut stack: Vec<(Node, bool)> = vec![(self.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            if done.contains_key(&node) {
                continue;
            }
            if stop(&node) {
                done.insert(node.clone(), node);
                continue;
            }
            if !expanded {
                stack.push((node.clone(), true));
                for child in node.children().into_iter().rev() {
                    if !done.contains_key(child) {
                        stack.push((child.clone(), false));
                    }
                }
                continue;
            }

            let old_children = node.children();
            let new_children: Vec<Node> = old_children
                .iter()
                .map(|c| done.get(*c).cloned().unwrap_or_else(|| (*c).clone()))
                .collect();
            let unchanged = old_children
                .iter()
                .zip(&new_children)
                .all(|(old, new)| old.ptr_eq(new));
            let rebuilt = if unchanged {
                node.clone()
            } else {
                Node::new(node.op().with_children(new_children)?)?
            };
            let out = f(&rebuilt)?;
            done.insert(node, out);
        }

        Ok(done.remove(self).unwrap_or_else(|| self.clone()))
    }

    /// Replace every field of `rel` inside this expression with the matching
    /// expression from `selections`. Relations are not descended into.
    pub fn dereference(&self, rel: &Node, selections: &[(String, Node)]) -> RelqResult<Node> {
        self.replace_until(
            |n| n.is_relation(),
            |n| {
                if let Op::Field { rel: r, name } = n.op()
                    && r.ptr_eq(rel)
                    && let Some((_, expr)) = selections.iter().find(|(s, _)| s == name)
                {
                    return Ok(unalias(expr));
                }
                Ok(n.clone())
            },
        )
    }
}

/// Strip a top-level alias.
pub fn unalias(node: &Node) -> Node {
    match node.op() {
        Op::Alias { arg, .. } => arg.clone(),
        _ => node.clone(),
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (self.0.hash == other.0.hash && self.0.op == other.0.op)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}", self)?;
        if let Some(t) = self.dtype() {
            write!(f, ": {}", t)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op() {
            Op::UnboundTable { name, .. } => write!(f, "UnboundTable({})", name),
            Op::Field { name, .. } => write!(f, "Field({})", name),
            Op::Literal { value, .. } => write!(f, "Literal({})", value),
            Op::ScalarParameter { name, .. } => write!(f, "ScalarParameter({})", name),
            Op::Alias { name, .. } => write!(f, "Alias({})", name),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::UnboundTable { .. } => OpKind::UnboundTable,
            Op::DummyTable { .. } => OpKind::DummyTable,
            Op::SelfReference { .. } => OpKind::SelfReference,
            Op::Project { .. } => OpKind::Project,
            Op::Select { .. } => OpKind::Select,
            Op::Filter { .. } => OpKind::Filter,
            Op::Aggregate { .. } => OpKind::Aggregate,
            Op::Join { .. } => OpKind::Join,
            Op::Sort { .. } => OpKind::Sort,
            Op::Limit { .. } => OpKind::Limit,
            Op::Distinct { .. } => OpKind::Distinct,
            Op::Sample { .. } => OpKind::Sample,
            Op::Union { .. } => OpKind::Union,
            Op::Field { .. } => OpKind::Field,
            Op::Literal { .. } => OpKind::Literal,
            Op::ScalarParameter { .. } => OpKind::ScalarParameter,
            Op::Alias { .. } => OpKind::Alias,
            Op::Cast { .. } => OpKind::Cast,
            Op::SortKey { .. } => OpKind::SortKey,
            Op::Binary { op, .. } => OpKind::Binary(*op),
            Op::Unary { op, .. } => OpKind::Unary(*op),
            Op::IfElse { .. } => OpKind::IfElse,
            Op::InValues { .. } => OpKind::InValues,
            Op::StructColumn { .. } => OpKind::StructColumn,
            Op::Call { func, .. } => OpKind::Call(*func),
            Op::Reduction { func, .. } => OpKind::Reduction(*func),
            Op::Analytic { func, .. } => OpKind::Analytic(*func),
            Op::WindowFunction { .. } => OpKind::WindowFunction,
            Op::TimestampTruncate { .. } => OpKind::TimestampTruncate,
            Op::TimestampFromUnix { .. } => OpKind::TimestampFromUnix,
            Op::HashBytes { .. } => OpKind::HashBytes,
        }
    }

    /// Child nodes in a fixed order, matching [`Op::with_children`].
    pub fn children(&self) -> Vec<&Node> {
        let mut out: Vec<&Node> = Vec::new();
        match self {
            Op::UnboundTable { .. } | Op::Literal { .. } | Op::ScalarParameter { .. } => {}
            Op::DummyTable { values } => out.extend(values.iter().map(|(_, v)| v)),
            Op::SelfReference { parent, .. }
            | Op::Limit { parent, .. }
            | Op::Distinct { parent }
            | Op::Sample { parent, .. } => out.push(parent),
            Op::Project { parent, values } => {
                out.push(parent);
                out.extend(values.iter().map(|(_, v)| v));
            }
            Op::Select {
                parent,
                selections,
                sort_keys,
                ..
            } => {
                out.push(parent);
                out.extend(selections.iter().map(|(_, v)| v));
                out.extend(sort_keys);
            }
            Op::Filter { parent, predicates } => {
                out.push(parent);
                out.extend(predicates);
            }
            Op::Aggregate {
                parent,
                groups,
                metrics,
            } => {
                out.push(parent);
                out.extend(groups.iter().map(|(_, v)| v));
                out.extend(metrics.iter().map(|(_, v)| v));
            }
            Op::Join {
                left,
                right,
                predicates,
                ..
            } => {
                out.push(left);
                out.push(right);
                out.extend(predicates);
            }
            Op::Sort { parent, keys } => {
                out.push(parent);
                out.extend(keys);
            }
            Op::Union { left, right, .. } | Op::Binary { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            Op::Field { rel, .. } => out.push(rel),
            Op::Alias { arg, .. }
            | Op::Cast { arg, .. }
            | Op::Unary { arg, .. }
            | Op::TimestampTruncate { arg, .. }
            | Op::TimestampFromUnix { arg, .. }
            | Op::HashBytes { arg, .. } => out.push(arg),
            Op::SortKey { expr, .. } => out.push(expr),
            Op::IfElse { cases, default } => {
                for (cond, result) in cases {
                    out.push(cond);
                    out.push(result);
                }
                out.extend(default);
            }
            Op::InValues { arg, options } => {
                out.push(arg);
                out.extend(options);
            }
            Op::StructColumn { values, .. } => out.extend(values),
            Op::Call { args, .. } | Op::Analytic { args, .. } => out.extend(args),
            Op::Reduction { args, filter, .. } => {
                out.extend(args);
                out.extend(filter);
            }
            Op::WindowFunction {
                func,
                group_by,
                order_by,
                ..
            } => {
                out.push(func);
                out.extend(group_by);
                out.extend(order_by);
            }
        }
        out
    }

    /// The same operation over new children, given in [`Op::children`] order.
    pub fn with_children(&self, children: Vec<Node>) -> RelqResult<Op> {
        let expected = self.children().len();
        if children.len() != expected {
            return Err(RelqError::type_error(
                self.kind(),
                "children",
                format!("expected {} children, got {}", expected, children.len()),
            ));
        }
        let kind = self.kind();
        let mut it = children.into_iter();
        let mut next = || {
            it.next()
                .ok_or_else(|| RelqError::type_error(kind, "children", "missing child"))
        };

        let op = match self {
            Op::UnboundTable { .. } | Op::Literal { .. } | Op::ScalarParameter { .. } => {
                self.clone()
            }
            Op::DummyTable { values } => Op::DummyTable {
                values: renamed(values, &mut next)?,
            },
            Op::SelfReference { id, .. } => Op::SelfReference {
                parent: next()?,
                id: *id,
            },
            Op::Project { values, .. } => Op::Project {
                parent: next()?,
                values: renamed(values, &mut next)?,
            },
            Op::Select {
                selections,
                sort_keys,
                distinct,
                limit,
                offset,
                ..
            } => Op::Select {
                parent: next()?,
                selections: renamed(selections, &mut next)?,
                sort_keys: several(sort_keys.len(), &mut next)?,
                distinct: *distinct,
                limit: *limit,
                offset: *offset,
            },
            Op::Filter { predicates, .. } => Op::Filter {
                parent: next()?,
                predicates: several(predicates.len(), &mut next)?,
            },
            Op::Aggregate { groups, metrics, .. } => Op::Aggregate {
                parent: next()?,
                groups: renamed(groups, &mut next)?,
                metrics: renamed(metrics, &mut next)?,
            },
            Op::Join {
                kind, predicates, ..
            } => Op::Join {
                kind: *kind,
                left: next()?,
                right: next()?,
                predicates: several(predicates.len(), &mut next)?,
            },
            Op::Sort { keys, .. } => Op::Sort {
                parent: next()?,
                keys: several(keys.len(), &mut next)?,
            },
            Op::Limit { n, offset, .. } => Op::Limit {
                parent: next()?,
                n: *n,
                offset: *offset,
            },
            Op::Distinct { .. } => Op::Distinct { parent: next()? },
            Op::Sample {
                fraction,
                method,
                seed,
                ..
            } => Op::Sample {
                parent: next()?,
                fraction: *fraction,
                method: *method,
                seed: *seed,
            },
            Op::Union { distinct, .. } => Op::Union {
                left: next()?,
                right: next()?,
                distinct: *distinct,
            },
            Op::Field { name, .. } => Op::Field {
                rel: next()?,
                name: name.clone(),
            },
            Op::Alias { name, .. } => Op::Alias {
                arg: next()?,
                name: name.clone(),
            },
            Op::Cast { to, .. } => Op::Cast {
                arg: next()?,
                to: to.clone(),
            },
            Op::SortKey { ascending, .. } => Op::SortKey {
                expr: next()?,
                ascending: *ascending,
            },
            Op::Binary { op, .. } => Op::Binary {
                op: *op,
                left: next()?,
                right: next()?,
            },
            Op::Unary { op, .. } => Op::Unary {
                op: *op,
                arg: next()?,
            },
            Op::IfElse { cases, default } => {
                let mut new_cases = Vec::with_capacity(cases.len());
                for _ in cases {
                    new_cases.push((next()?, next()?));
                }
                let default = match default {
                    Some(_) => Some(next()?),
                    None => None,
                };
                Op::IfElse {
                    cases: new_cases,
                    default,
                }
            }
            Op::InValues { options, .. } => Op::InValues {
                arg: next()?,
                options: several(options.len(), &mut next)?,
            },
            Op::StructColumn { names, values } => Op::StructColumn {
                names: names.clone(),
                values: several(values.len(), &mut next)?,
            },
            Op::Call { func, args } => Op::Call {
                func: *func,
                args: several(args.len(), &mut next)?,
            },
            Op::Analytic { func, args } => Op::Analytic {
                func: *func,
                args: several(args.len(), &mut next)?,
            },
            Op::Reduction { func, args, filter } => Op::Reduction {
                func: *func,
                args: several(args.len(), &mut next)?,
                filter: match filter {
                    Some(_) => Some(next()?),
                    None => None,
                },
            },
            Op::WindowFunction {
                group_by,
                order_by,
                frame,
                ..
            } => Op::WindowFunction {
                func: next()?,
                group_by: several(group_by.len(), &mut next)?,
                order_by: several(order_by.len(), &mut next)?,
                frame: *frame,
            },
            Op::TimestampTruncate { unit, .. } => Op::TimestampTruncate {
                arg: next()?,
                unit: *unit,
            },
            Op::TimestampFromUnix { unit, .. } => Op::TimestampFromUnix {
                arg: next()?,
                unit: *unit,
            },
            Op::HashBytes { how, .. } => Op::HashBytes {
                arg: next()?,
                how: *how,
            },
        };
        Ok(op)
    }
}

fn several<F>(n: usize, next: &mut F) -> RelqResult<Vec<Node>>
where
    F: FnMut() -> RelqResult<Node>,
{
    (0..n).map(|_| next()).collect()
}

fn renamed<F>(named: &[(String, Node)], next: &mut F) -> RelqResult<Vec<(String, Node)>>
where
    F: FnMut() -> RelqResult<Node>,
{
    named
        .iter()
        .map(|(name, _)| Ok((name.clone(), next()?)))
        .collect()
}

// ---------------------------------------------------------------------------
// Output resolution and integrity checks
// ---------------------------------------------------------------------------

fn scalar<'a>(kind: OpKind, arg: &str, node: &'a Node) -> RelqResult<&'a DataType> {
    node.dtype().ok_or_else(|| {
        RelqError::type_error(kind, arg, "expected a scalar expression, got a relation")
    })
}

fn relation<'a>(kind: OpKind, arg: &str, node: &'a Node) -> RelqResult<&'a Schema> {
    node.schema().ok_or_else(|| {
        RelqError::type_error(kind, arg, format!("expected a relation, got {}", node))
    })
}

fn boolean(kind: OpKind, arg: &str, node: &Node) -> RelqResult<()> {
    let ty = scalar(kind, arg, node)?;
    if ty.is_boolean() || ty.is_null() {
        Ok(())
    } else {
        Err(RelqError::type_error(
            kind,
            arg,
            format!("expected boolean, got {}", ty),
        ))
    }
}

/// Check that `value` only references relations in `allowed`.
fn references(kind: OpKind, arg: &str, value: &Node, allowed: &[&Node]) -> RelqResult<()> {
    for rel in value.rels() {
        if !allowed.iter().any(|a| a.ptr_eq(rel)) {
            return Err(RelqError::type_error(
                kind,
                arg,
                format!("{} references a relation that is not its parent", value),
            ));
        }
    }
    Ok(())
}

fn no_window(kind: OpKind, arg: &str, value: &Node) -> RelqResult<()> {
    if value.has_window() {
        return Err(RelqError::type_error(
            kind,
            arg,
            "window functions must be projected before they can be filtered on",
        ));
    }
    Ok(())
}

fn no_reduction(kind: OpKind, arg: &str, value: &Node) -> RelqResult<()> {
    if value.has_reduction() {
        return Err(RelqError::type_error(
            kind,
            arg,
            "reductions are only valid in aggregate metrics or window functions",
        ));
    }
    Ok(())
}

fn sort_keys(kind: OpKind, parent: &Node, keys: &[Node]) -> RelqResult<()> {
    for key in keys {
        if key.kind() != OpKind::SortKey {
            return Err(RelqError::type_error(
                kind,
                "keys",
                format!("expected a sort key, got {}", key),
            ));
        }
        references(kind, "keys", key, &[parent])?;
    }
    Ok(())
}

fn named_schema(kind: OpKind, named: &[&(String, Node)]) -> RelqResult<Schema> {
    let mut fields = Vec::with_capacity(named.len());
    for (name, value) in named {
        fields.push((name.clone(), scalar(kind, name, value)?.clone()));
    }
    Schema::new(fields).map_err(|reason| RelqError::type_error(kind, "values", reason))
}

fn comparable(l: &DataType, r: &DataType) -> bool {
    l.is_null()
        || r.is_null()
        || (l.is_numeric() && r.is_numeric())
        || (l.is_temporal() && r.is_temporal() && l.is_time() == r.is_time())
        || l.same_kind(r)
}

/// Common supertype of several scalar types.
pub fn common_type<'a, I>(types: I) -> Option<DataType>
where
    I: IntoIterator<Item = &'a DataType>,
{
    let mut acc: Option<DataType> = None;
    for t in types {
        acc = Some(match acc {
            None => t.clone(),
            Some(a) => {
                if a.is_null() || t.is_null() || (a.is_numeric() && t.is_numeric()) {
                    DataType::promote(&a, t)?
                } else if a.same_kind(t) {
                    let nullable = a.nullable || t.nullable;
                    a.with_nullable(nullable)
                } else {
                    return None;
                }
            }
        });
    }
    acc
}

fn binary_output(op: BinaryOp, l: &DataType, r: &DataType) -> Result<DataType, String> {
    let nullable = l.nullable || r.nullable;
    if op.is_comparison() {
        if comparable(l, r) {
            return Ok(DataType::boolean().with_nullable(nullable));
        }
        return Err(format!("cannot compare {} with {}", l, r));
    }
    if op.is_logical() {
        let ok = |t: &DataType| t.is_boolean() || t.is_null();
        if ok(l) && ok(r) {
            return Ok(DataType::boolean().with_nullable(nullable));
        }
        return Err(format!("expected boolean operands, got {} and {}", l, r));
    }
    if matches!(op, BinaryOp::Like | BinaryOp::ILike) {
        let ok = |t: &DataType| t.is_string() || t.is_null();
        if ok(l) && ok(r) {
            return Ok(DataType::boolean().with_nullable(nullable));
        }
        return Err(format!("expected string operands, got {} and {}", l, r));
    }

    // arithmetic
    if matches!(op, BinaryOp::Add | BinaryOp::Subtract) {
        if l.is_temporal() && r.is_interval() {
            return Ok(l.clone().with_nullable(nullable));
        }
        if op == BinaryOp::Add && l.is_interval() && r.is_temporal() {
            return Ok(r.clone().with_nullable(nullable));
        }
        if l.is_interval() && r.is_interval() {
            return Ok(l.clone().with_nullable(nullable));
        }
    }
    let promoted = DataType::promote(l, r)
        .ok_or_else(|| format!("expected numeric operands, got {} and {}", l, r))?;
    let out = match op {
        BinaryOp::Divide if !promoted.is_decimal() => DataType::float64().with_nullable(nullable),
        BinaryOp::FloorDivide if promoted.is_floating() => {
            DataType::int64().with_nullable(nullable)
        }
        _ => promoted,
    };
    Ok(out)
}

fn check_signature(kind: OpKind, sig: &Signature, args: &[Node]) -> RelqResult<DataType> {
    let too_many = sig.max_args().is_some_and(|max| args.len() > max);
    if args.len() < sig.min_args() || too_many {
        let expected = match sig.max_args() {
            Some(max) if max == sig.min_args() => format!("{}", max),
            Some(max) => format!("{} to {}", sig.min_args(), max),
            None => format!("at least {}", sig.min_args()),
        };
        return Err(RelqError::type_error(
            kind,
            "args",
            format!("expected {} arguments, got {}", expected, args.len()),
        ));
    }

    let mut types: Vec<Option<&DataType>> = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let (name, class) = sig
            .param_at(i)
            .ok_or_else(|| RelqError::type_error(kind, "args", "too many arguments"))?;
        if class == ArgClass::Relation {
            relation(kind, name, arg)?;
            types.push(None);
            continue;
        }
        let ty = scalar(kind, name, arg)?;
        if !class.accepts(ty) {
            return Err(RelqError::type_error(
                kind,
                name,
                format!("expected {}, got {}", class.describe(), ty),
            ));
        }
        types.push(Some(ty));
    }

    let arg_type = |i: usize| {
        types
            .get(i)
            .copied()
            .flatten()
            .ok_or_else(|| RelqError::type_error(kind, "args", format!("missing argument {}", i)))
    };
    let scalars: Vec<&DataType> = types.iter().flatten().copied().collect();

    let mut out = match &sig.returns {
        Returns::Fixed(k) => DataType::new(k.clone()),
        Returns::Arg(i) => arg_type(*i)?.clone(),
        Returns::Promoted => DataType::promote(arg_type(0)?, arg_type(1)?).ok_or_else(|| {
            RelqError::type_error(kind, "args", "arguments have no common numeric type")
        })?,
        Returns::Common => common_type(scalars.iter().copied())
            .ok_or_else(|| RelqError::type_error(kind, "args", "arguments have no common type"))?,
        Returns::ArrayOf(i) => {
            let elem = if sig.variadic.is_some() {
                common_type(scalars.iter().copied()).ok_or_else(|| {
                    RelqError::type_error(kind, "args", "array elements have no common type")
                })?
            } else {
                arg_type(*i)?.clone()
            };
            DataType::array(elem)
        }
        Returns::Element(i) => arg_type(*i)?
            .element()
            .cloned()
            .ok_or_else(|| RelqError::type_error(kind, "arg", "expected an array"))?,
        Returns::MapOf(k, v) => {
            let key = arg_type(*k)?.element().cloned().unwrap_or_else(DataType::null);
            let value = arg_type(*v)?.element().cloned().unwrap_or_else(DataType::null);
            DataType::map(key, value)
        }
        Returns::Rounded => {
            let t = arg_type(0)?;
            if t.is_decimal() {
                t.clone()
            } else if args.len() > 1 && t.is_floating() {
                DataType::float64()
            } else {
                DataType::int64()
            }
        }
        Returns::Sum => {
            let t = arg_type(0)?;
            if t.is_decimal() {
                t.clone()
            } else if t.is_floating() {
                DataType::float64()
            } else if t.is_unsigned_integer() {
                DataType::new(TypeKind::UInt64)
            } else {
                DataType::int64()
            }
        }
    };

    out.nullable = match sig.nulls {
        Nulls::Propagate => scalars.iter().any(|t| t.nullable),
        Nulls::IfAll => !scalars.is_empty() && scalars.iter().all(|t| t.nullable),
        Nulls::Always => true,
        Nulls::Never => false,
    };
    Ok(out)
}

fn resolve(op: &Op) -> RelqResult<Output> {
    let kind = op.kind();
    let out = match op {
        Op::UnboundTable { name, schema, .. } => {
            if name.is_empty() {
                return Err(RelqError::type_error(kind, "name", "table name is empty"));
            }
            Output::Relation(schema.clone())
        }
        Op::DummyTable { values } => {
            if values.is_empty() {
                return Err(RelqError::type_error(kind, "values", "no values"));
            }
            for (name, value) in values {
                references(kind, name, value, &[])?;
            }
            Output::Relation(named_schema(kind, &values.iter().collect::<Vec<_>>())?)
        }
        Op::SelfReference { parent, .. }
        | Op::Distinct { parent }
        | Op::Limit { parent, .. } => {
            Output::Relation(relation(kind, "parent", parent)?.clone())
        }
        Op::Sample {
            parent, fraction, ..
        } => {
            let schema = relation(kind, "parent", parent)?.clone();
            if !(fraction.0 > 0.0 && fraction.0 <= 1.0) {
                return Err(RelqError::type_error(
                    kind,
                    "fraction",
                    format!("sample fraction must be in (0, 1], got {}", fraction.0),
                ));
            }
            Output::Relation(schema)
        }
        Op::Project { parent, values } => {
            relation(kind, "parent", parent)?;
            if values.is_empty() {
                return Err(RelqError::type_error(kind, "values", "no values"));
            }
            for (name, value) in values {
                references(kind, name, value, &[parent])?;
                no_reduction(kind, name, value)?;
            }
            Output::Relation(named_schema(kind, &values.iter().collect::<Vec<_>>())?)
        }
        Op::Select {
            parent,
            selections,
            sort_keys: keys,
            ..
        } => {
            relation(kind, "parent", parent)?;
            if selections.is_empty() {
                return Err(RelqError::type_error(kind, "selections", "no selections"));
            }
            for (name, value) in selections {
                references(kind, name, value, &[parent])?;
                no_reduction(kind, name, value)?;
            }
            sort_keys(kind, parent, keys)?;
            Output::Relation(named_schema(kind, &selections.iter().collect::<Vec<_>>())?)
        }
        Op::Filter { parent, predicates } => {
            let schema = relation(kind, "parent", parent)?.clone();
            if predicates.is_empty() {
                return Err(RelqError::type_error(kind, "predicates", "no predicates"));
            }
            for pred in predicates {
                boolean(kind, "predicates", pred)?;
                references(kind, "predicates", pred, &[parent])?;
                no_reduction(kind, "predicates", pred)?;
                no_window(kind, "predicates", pred)?;
            }
            Output::Relation(schema)
        }
        Op::Aggregate {
            parent,
            groups,
            metrics,
        } => {
            relation(kind, "parent", parent)?;
            if groups.is_empty() && metrics.is_empty() {
                return Err(RelqError::type_error(kind, "metrics", "no groups or metrics"));
            }
            for (name, group) in groups {
                references(kind, name, group, &[parent])?;
                no_reduction(kind, name, group)?;
            }
            for (name, metric) in metrics {
                references(kind, name, metric, &[parent])?;
            }
            let named: Vec<&(String, Node)> = groups.iter().chain(metrics.iter()).collect();
            Output::Relation(named_schema(kind, &named)?)
        }
        Op::Join {
            kind: how,
            left,
            right,
            predicates,
        } => {
            let ls = relation(kind, "left", left)?;
            let rs = relation(kind, "right", right)?;
            if left.ptr_eq(right) {
                return Err(RelqError::type_error(
                    kind,
                    "right",
                    "joining a relation with itself requires a self reference",
                ));
            }
            for pred in predicates {
                boolean(kind, "predicates", pred)?;
                references(kind, "predicates", pred, &[left, right])?;
                no_reduction(kind, "predicates", pred)?;
                no_window(kind, "predicates", pred)?;
            }
            let schema = if how.keeps_right() {
                ls.merge(rs, JOIN_RIGHT_SUFFIX)
                    .map_err(|reason| RelqError::type_error(kind, "right", reason))?
            } else {
                ls.clone()
            };
            Output::Relation(schema)
        }
        Op::Sort { parent, keys } => {
            let schema = relation(kind, "parent", parent)?.clone();
            sort_keys(kind, parent, keys)?;
            Output::Relation(schema)
        }
        Op::Union { left, right, .. } => {
            let ls = relation(kind, "left", left)?;
            let rs = relation(kind, "right", right)?;
            if ls != rs {
                return Err(RelqError::type_error(
                    kind,
                    "right",
                    "union inputs must have equal schemas",
                ));
            }
            Output::Relation(ls.clone())
        }
        Op::Field { rel, name } => {
            let schema = relation(kind, "rel", rel)?;
            let ty = schema.get(name).ok_or_else(|| {
                RelqError::type_error(kind, "name", format!("no column named '{}'", name))
            })?;
            Output::Scalar(ty.clone())
        }
        Op::Literal { value, dtype } => {
            if !value.fits(dtype) {
                return Err(RelqError::type_error(
                    kind,
                    "value",
                    format!("{} is not a valid {}", value, dtype),
                ));
            }
            Output::Scalar(dtype.clone())
        }
        Op::ScalarParameter { dtype, .. } => Output::Scalar(dtype.clone()),
        Op::Alias { arg, name } => {
            if name.is_empty() {
                return Err(RelqError::type_error(kind, "name", "alias is empty"));
            }
            Output::Scalar(scalar(kind, "arg", arg)?.clone())
        }
        Op::Cast { arg, to } => {
            let from = scalar(kind, "arg", arg)?;
            Output::Scalar(to.clone().with_nullable(from.nullable))
        }
        Op::SortKey { expr, .. } => Output::Scalar(scalar(kind, "expr", expr)?.clone()),
        Op::Binary { op, left, right } => {
            let l = scalar(kind, "left", left)?;
            let r = scalar(kind, "right", right)?;
            let out = binary_output(*op, l, r)
                .map_err(|reason| RelqError::type_error(kind, "right", reason))?;
            Output::Scalar(out)
        }
        Op::Unary { op, arg } => {
            let t = scalar(kind, "arg", arg)?;
            let out = match op {
                UnaryOp::Not => {
                    boolean(kind, "arg", arg)?;
                    DataType::boolean().with_nullable(t.nullable)
                }
                UnaryOp::Negate => {
                    if !(t.is_numeric() || t.is_interval()) {
                        return Err(RelqError::type_error(
                            kind,
                            "arg",
                            format!("expected a numeric value, got {}", t),
                        ));
                    }
                    t.clone()
                }
                UnaryOp::IsNull | UnaryOp::NotNull => DataType::boolean().not_null(),
            };
            Output::Scalar(out)
        }
        Op::IfElse { cases, default } => {
            if cases.is_empty() {
                return Err(RelqError::type_error(kind, "cases", "no cases"));
            }
            let mut results = Vec::with_capacity(cases.len() + 1);
            for (cond, result) in cases {
                boolean(kind, "cases", cond)?;
                results.push(scalar(kind, "cases", result)?);
            }
            let nullable_default = match default {
                Some(d) => {
                    results.push(scalar(kind, "default", d)?);
                    false
                }
                None => true,
            };
            let mut out = common_type(results.iter().copied()).ok_or_else(|| {
                RelqError::type_error(kind, "cases", "case results have no common type")
            })?;
            out.nullable |= nullable_default;
            Output::Scalar(out)
        }
        Op::InValues { arg, options } => {
            let t = scalar(kind, "arg", arg)?;
            if options.is_empty() {
                return Err(RelqError::type_error(kind, "options", "no options"));
            }
            let mut nullable = t.nullable;
            for option in options {
                let o = scalar(kind, "options", option)?;
                if !comparable(t, o) {
                    return Err(RelqError::type_error(
                        kind,
                        "options",
                        format!("cannot compare {} with {}", t, o),
                    ));
                }
                nullable |= o.nullable;
            }
            Output::Scalar(DataType::boolean().with_nullable(nullable))
        }
        Op::StructColumn { names, values } => {
            if names.is_empty() || names.len() != values.len() {
                return Err(RelqError::type_error(
                    kind,
                    "names",
                    "expected one name per value",
                ));
            }
            let mut fields = Vec::with_capacity(names.len());
            for (name, value) in names.iter().zip(values) {
                fields.push((name.clone(), scalar(kind, name, value)?.clone()));
            }
            let schema =
                Schema::new(fields).map_err(|reason| RelqError::type_error(kind, "names", reason))?;
            Output::Scalar(DataType::new(TypeKind::Struct(schema.fields().to_vec())).not_null())
        }
        Op::Call { func, args } => Output::Scalar(check_signature(kind, &func.signature(), args)?),
        Op::Analytic { func, args } => {
            Output::Scalar(check_signature(kind, &func.signature(), args)?)
        }
        Op::Reduction { func, args, filter } => {
            let out = check_signature(kind, &func.signature(), args)?;
            for arg in args.iter().filter(|a| a.is_scalar()) {
                if arg.has_reduction() {
                    return Err(RelqError::type_error(
                        kind,
                        "arg",
                        "reductions cannot be nested",
                    ));
                }
            }
            if let Some(filter) = filter {
                boolean(kind, "where", filter)?;
                if let Some(rel) = args.iter().find(|a| a.is_relation()) {
                    references(kind, "where", filter, &[rel])?;
                }
            }
            Output::Scalar(out)
        }
        Op::WindowFunction {
            func,
            group_by,
            order_by,
            ..
        } => {
            if !matches!(func.kind(), OpKind::Analytic(_) | OpKind::Reduction(_)) {
                return Err(RelqError::type_error(
                    kind,
                    "func",
                    format!("expected an analytic function or reduction, got {}", func),
                ));
            }
            for key in group_by {
                scalar(kind, "group_by", key)?;
            }
            for key in order_by {
                if key.kind() != OpKind::SortKey {
                    return Err(RelqError::type_error(
                        kind,
                        "order_by",
                        format!("expected a sort key, got {}", key),
                    ));
                }
            }
            Output::Scalar(scalar(kind, "func", func)?.clone())
        }
        Op::TimestampTruncate { arg, unit } => {
            let t = scalar(kind, "arg", arg)?;
            if !(t.is_timestamp() || t.is_date() || t.is_time()) {
                return Err(RelqError::type_error(
                    kind,
                    "arg",
                    format!("expected a temporal value, got {}", t),
                ));
            }
            if t.is_date() && !unit.is_date_unit() {
                return Err(RelqError::type_error(
                    kind,
                    "unit",
                    format!("cannot truncate a date to {}", unit.sql_name().to_lowercase()),
                ));
            }
            if t.is_time() && unit.is_date_unit() {
                return Err(RelqError::type_error(
                    kind,
                    "unit",
                    format!("cannot truncate a time to {}", unit.sql_name().to_lowercase()),
                ));
            }
            Output::Scalar(t.clone())
        }
        Op::TimestampFromUnix { arg, .. } => {
            let t = scalar(kind, "arg", arg)?;
            if !t.is_integer() && !t.is_null() {
                return Err(RelqError::type_error(
                    kind,
                    "arg",
                    format!("expected an integer value, got {}", t),
                ));
            }
            Output::Scalar(DataType::timestamp().with_nullable(t.nullable))
        }
        Op::HashBytes { arg, .. } => {
            let t = scalar(kind, "arg", arg)?;
            if !(t.is_string() || t.is_binary() || t.is_null()) {
                return Err(RelqError::type_error(
                    kind,
                    "arg",
                    format!("expected a string or binary value, got {}", t),
                ));
            }
            Output::Scalar(DataType::binary().with_nullable(t.nullable))
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{analytic, lit, table};

    fn t() -> Node {
        table(
            "t",
            [("a", DataType::int64()), ("b", DataType::string())],
        )
        .unwrap()
    }

    #[test]
    fn test_hash_consing_returns_same_allocation() {
        let x = t().col("a").unwrap();
        let y = t().col("a").unwrap();
        assert!(x.ptr_eq(&y));
        assert_eq!(x.structural_hash(), y.structural_hash());
    }

    #[test]
    fn test_unknown_field_is_type_error() {
        let err = t().col("zzz").unwrap_err();
        match err {
            RelqError::Type { op, arg, .. } => {
                assert_eq!(op, OpKind::Field);
                assert_eq!(arg, "name");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_signature_mismatch_names_argument() {
        let a = t().col("a").unwrap();
        let b = t().col("b").unwrap();
        let err = Node::new(Op::Call {
            func: Func::StringContains,
            args: vec![b, a],
        })
        .unwrap_err();
        match err {
            RelqError::Type { op, arg, .. } => {
                assert_eq!(op, OpKind::Call(Func::StringContains));
                assert_eq!(arg, "needle");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_filter_predicate_must_be_boolean() {
        let a = t().col("a").unwrap();
        let err = t().filter([a]).unwrap_err();
        assert!(matches!(err, RelqError::Type { op: OpKind::Filter, .. }));
    }

    #[test]
    fn test_projection_of_foreign_relation_rejected() {
        let other = table("u", [("c", DataType::int64())]).unwrap();
        let c = other.col("c").unwrap();
        let err = t().project([("c", c)]).unwrap_err();
        assert!(matches!(err, RelqError::Type { op: OpKind::Project, .. }));
    }

    #[test]
    fn test_analytic_outside_window_rejected() {
        let rn = Node::new(Op::Analytic {
            func: AnalyticFunc::RowNumber,
            args: vec![],
        })
        .unwrap();
        let err = Node::new(Op::Binary {
            op: BinaryOp::Add,
            left: rn,
            right: lit(1),
        })
        .unwrap_err();
        assert!(matches!(err, RelqError::Type { .. }));
    }

    #[test]
    fn test_sample_fraction_bounds() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let err = t().sample(bad, SampleMethod::Row, None).unwrap_err();
            assert!(matches!(err, RelqError::Type { op: OpKind::Sample, .. }));
        }
        assert!(t().sample(1.0, SampleMethod::Row, None).is_ok());
    }

    #[test]
    fn test_replace_rebuilds_parents_once() {
        let a = t().col("a").unwrap();
        let expr = a.add(a.clone()).unwrap();
        let mut visits = 0;
        let out = expr
            .replace(|n| {
                visits += 1;
                if let Op::Literal { .. } = n.op() {
                    return Ok(n.clone());
                }
                Ok(n.clone())
            })
            .unwrap();
        assert!(out.ptr_eq(&expr));
        // table, field, add
        assert_eq!(visits, 3);
    }

    #[test]
    fn test_depth() {
        let a = t().col("a").unwrap();
        assert_eq!(t().depth(), 1);
        assert_eq!(a.depth(), 2);
        assert_eq!(a.add(lit(1)).unwrap().depth(), 3);
    }

    #[test]
    fn test_window_predicate_rejected() {
        let t = t();
        let rn = analytic(AnalyticFunc::RowNumber, [])
            .unwrap()
            .over([t.col("b").unwrap()], [t.col("a").unwrap()], None)
            .unwrap();
        let err = t.filter([rn.le(lit(3)).unwrap()]).unwrap_err();
        match err {
            RelqError::Type { op, arg, .. } => {
                assert_eq!(op, OpKind::Filter);
                assert_eq!(arg, "predicates");
            }
            other => panic!("unexpected error {other}"),
        }

        let projected = t.project([("a", t.col("a").unwrap()), ("rn", rn)]).unwrap();
        let outer = projected.col("rn").unwrap().le(lit(3)).unwrap();
        assert!(projected.filter([outer]).is_ok());
    }

    #[test]
    fn test_dropping_deep_graph_is_iterative() {
        let mut expr = t().col("a").unwrap();
        for _ in 0..100_000 {
            expr = expr.add(lit(1)).unwrap();
        }
        assert_eq!(expr.depth(), 100_002);
        drop(expr);

        // the thread can still build and drop graphs afterwards
        let again = t().col("a").unwrap().add(lit(1)).unwrap();
        assert_eq!(again.depth(), 3);
    }

    #[test]
    fn test_join_suffixes_shared_right_columns() {
        let u = table("u", [("a", DataType::int64()), ("c", DataType::string())]).unwrap();
        let joined = t().join(&u, JoinKind::Inner, []).unwrap();
        let names: Vec<&str> = joined.schema().unwrap().names().collect();
        assert_eq!(names, vec!["a", "b", "a_right", "c"]);

        let semi = t().join(&u, JoinKind::Semi, []).unwrap();
        let names: Vec<&str> = semi.schema().unwrap().names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_join_rejects_suffix_collision() {
        let u = table("u", [("a", DataType::int64()), ("a_right", DataType::int64())]).unwrap();
        let err = t().join(&u, JoinKind::Inner, []).unwrap_err();
        assert!(matches!(err, RelqError::Type { op: OpKind::Join, .. }));
    }
}
