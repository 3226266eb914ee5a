//! Per-call compilation state.

use crate::ast::{Node, Op, OpKind};
use crate::dialect::{Dialect, DialectConfig};
use crate::error::{RelqError, RelqResult};
use crate::sql::{Cte, Query, SqlExpr};
use std::collections::{HashMap, HashSet};

/// Custom translation of one scalar operation kind.
pub type Visitor = fn(&mut CompileContext<'_>, &Node) -> RelqResult<SqlExpr>;

/// Call-scoped `t0`, `t1`, ... alias counter.
#[derive(Debug, Default)]
pub struct Aliases {
    next: usize,
}

impl Aliases {
    pub fn fresh(&mut self) -> String {
        let alias = format!("t{}", self.next);
        self.next += 1;
        alias
    }
}

/// Number of visits per operation kind during one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    visits: HashMap<OpKind, usize>,
}

impl CompileStats {
    pub fn visits(&self, kind: OpKind) -> usize {
        self.visits.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.visits.values().sum()
    }

    pub(crate) fn record(&mut self, kind: OpKind) {
        *self.visits.entry(kind).or_insert(0) += 1;
    }
}

/// A compiled relation.
#[derive(Debug, Clone)]
pub enum RelSql {
    /// A physical table, referenced by name.
    Table {
        name: String,
        database: Option<String>,
    },
    /// A SELECT layer.
    Query(Query),
    /// Another alias for an already compiled relation.
    Reference(Node),
}

pub struct CompileContext<'a> {
    pub config: &'a DialectConfig,
    pub aliases: Aliases,
    pub stats: CompileStats,
    exprs: HashMap<Node, SqlExpr>,
    relations: HashMap<Node, RelSql>,
    rel_aliases: HashMap<Node, String>,
    ctes: HashSet<Node>,
    cte_queries: Vec<Cte>,
}

impl<'a> CompileContext<'a> {
    pub fn new(config: &'a DialectConfig, ctes: HashSet<Node>) -> Self {
        Self {
            config,
            aliases: Aliases::default(),
            stats: CompileStats::default(),
            exprs: HashMap::new(),
            relations: HashMap::new(),
            rel_aliases: HashMap::new(),
            ctes,
            cte_queries: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// The translation of an already visited scalar.
    pub fn expr(&self, node: &Node) -> RelqResult<SqlExpr> {
        self.exprs
            .get(node)
            .cloned()
            .ok_or_else(|| RelqError::plan(format!("{} was not compiled before its parent", node)))
    }

    /// Translations of several scalars, in order.
    pub fn exprs(&self, nodes: &[Node]) -> RelqResult<Vec<SqlExpr>> {
        nodes.iter().map(|n| self.expr(n)).collect()
    }

    /// Translated scalar arguments of a call-like node.
    pub fn args(&self, node: &Node) -> RelqResult<Vec<SqlExpr>> {
        match node.op() {
            Op::Call { args, .. } | Op::Analytic { args, .. } | Op::Reduction { args, .. } => args
                .iter()
                .filter(|a| a.is_scalar())
                .map(|a| self.expr(a))
                .collect(),
            _ => Ok(node
                .children()
                .into_iter()
                .filter(|c| c.is_scalar())
                .map(|c| self.expr(c))
                .collect::<RelqResult<Vec<_>>>()?),
        }
    }

    /// Dialect spelling of a logical type.
    pub fn type_name(&self, ty: &crate::ast::DataType) -> RelqResult<String> {
        self.config.types.to_string(ty)
    }

    pub fn unsupported_arg(&self, kind: OpKind, reason: impl Into<String>) -> RelqError {
        RelqError::unsupported_arg(kind, self.dialect(), reason)
    }

    pub fn alias(&self, rel: &Node) -> RelqResult<&str> {
        self.rel_aliases
            .get(rel)
            .map(String::as_str)
            .ok_or_else(|| RelqError::plan(format!("relation {} has no alias", rel)))
    }

    pub fn is_cte(&self, rel: &Node) -> bool {
        self.ctes.contains(rel)
    }

    pub fn relation(&self, rel: &Node) -> RelqResult<&RelSql> {
        self.relations
            .get(rel)
            .ok_or_else(|| RelqError::plan(format!("{} was not compiled before its parent", rel)))
    }

    pub(crate) fn assign_alias(&mut self, rel: &Node) {
        if !self.rel_aliases.contains_key(rel) {
            let alias = self.aliases.fresh();
            self.rel_aliases.insert(rel.clone(), alias);
        }
    }

    pub(crate) fn store_expr(&mut self, node: &Node, expr: SqlExpr) {
        self.exprs.insert(node.clone(), expr);
    }

    pub(crate) fn push_cte(&mut self, name: String, query: Query) {
        self.cte_queries.push(Cte { name, query });
    }

    /// Shared relations in the order they were compiled.
    pub(crate) fn take_ctes(&mut self) -> Vec<Cte> {
        std::mem::take(&mut self.cte_queries)
    }

    pub(crate) fn store_relation(&mut self, node: &Node, rel: RelSql) {
        self.relations.insert(node.clone(), rel);
    }
}
