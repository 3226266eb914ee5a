//! Expression graph to SQL compiler.
//!
//! [`Compiler::compile`] runs the dialect's pre-rewrites, walks the graph
//! bottom-up exactly once per distinct node and renders the resulting SQL
//! syntax tree with the dialect's [`SqlGenerator`].

pub mod context;
pub mod relation;
pub mod scalar;
pub mod sql;
pub mod traits;
pub mod util;

pub use context::{CompileContext, CompileStats, RelSql, Visitor};
pub use traits::{SqlGenerator, escape_identifier, escape_identifier_with};

use crate::ast::builders::{dummy_table, lit_typed};
use crate::ast::{Node, Op, Schema, Value};
use crate::dialect::{Dialect, DialectConfig};
use crate::error::{RelqError, RelqResult};
use crate::rewrites;
use crate::sql::{Query, render_query_with_params};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Deepest graph compiled by default.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Per-call compilation options.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Values for `ScalarParameter`s, by name. Unbound parameters become placeholders.
    pub params: HashMap<String, Value>,
    /// Outermost row limit.
    pub limit: Option<u64>,
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            params: HashMap::new(),
            limit: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Result of one compilation.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub sql: String,
    /// Columns of the result set.
    pub schema: Schema,
    pub query: Query,
    /// Unbound parameter names, one per placeholder position of `sql`.
    pub params: Vec<String>,
    pub stats: CompileStats,
}

/// Compiles graphs for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    config: &'static DialectConfig,
}

impl Compiler {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            config: dialect.config(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    pub fn config(&self) -> &'static DialectConfig {
        self.config
    }

    pub fn compile(&self, node: &Node, options: &CompileOptions) -> RelqResult<Compiled> {
        if node.depth() > options.max_depth {
            return Err(RelqError::ExpressionTooDeep {
                depth: node.depth(),
                limit: options.max_depth,
            });
        }

        let mut root = to_relation(node)?;
        if let Some(n) = options.limit {
            root = root.limit(Some(n), 0)?;
        }
        if !options.params.is_empty() {
            root = bind_params(&root, &options.params)?;
        }
        for (name, rewrite) in &self.config.pre_rewrites {
            debug!(dialect = %self.config.dialect, rewrite = *name, "pre-rewrite");
            root = rewrite(&root, self.config)?;
        }

        let ctes = find_ctes(&root);
        if !ctes.is_empty() {
            debug!(count = ctes.len(), "shared relations become CTEs");
        }
        let mut cx = CompileContext::new(self.config, ctes);
        for n in root.postorder() {
            self.visit(&mut cx, &n)?;
        }

        let mut query = relation::root_query(&cx, &root)?;
        query.ctes = cx.take_ctes();
        for (name, rewrite) in &self.config.post_rewrites {
            debug!(dialect = %self.config.dialect, rewrite = *name, "post-rewrite");
            query = rewrites::apply_post(query, *rewrite, &mut cx.aliases);
        }

        let (sql, params) = render_query_with_params(&query, self.config.generator);
        let schema = root
            .schema()
            .cloned()
            .ok_or_else(|| RelqError::plan("compiled root is not a relation"))?;
        Ok(Compiled {
            sql,
            schema,
            query,
            params,
            stats: cx.stats,
        })
    }

    /// Compile one node whose children are already compiled.
    fn visit(&self, cx: &mut CompileContext<'_>, node: &Node) -> RelqResult<()> {
        let kind = node.kind();
        cx.stats.record(kind);
        trace!(%kind, "visit");

        if self.config.is_unsupported(kind) {
            return Err(RelqError::unsupported(kind, self.config.dialect, ""));
        }

        if node.is_relation() {
            cx.assign_alias(node);
            let rel = relation::translate(cx, node)?;
            if cx.is_cte(node)
                && let RelSql::Query(query) = &rel
            {
                let name = cx.alias(node)?.to_string();
                cx.push_cte(name, query.clone());
            }
            cx.store_relation(node, rel);
            return Ok(());
        }

        let expr = if let Some(visitor) = self.config.visitor(kind) {
            visitor(cx, node)?
        } else if let Some(name) = self.config.rename(kind) {
            scalar::renamed(cx, node, name)?
        } else {
            scalar::translate(cx, node)?
        };
        cx.store_expr(node, expr);
        Ok(())
    }
}

/// Wrap a scalar root into a relation producing it as its only column.
fn to_relation(node: &Node) -> RelqResult<Node> {
    if node.is_relation() {
        return Ok(node.clone());
    }
    let name = node.default_name();
    match node.rels() {
        [] => dummy_table([(name, node.clone())]),
        [parent] if node.has_reduction() => {
            parent.aggregate(Vec::<(String, Node)>::new(), [(name, node.clone())])
        }
        [parent] => parent.project([(name, node.clone())]),
        rels => Err(RelqError::plan(format!(
            "a scalar root must reference one relation, found {}",
            rels.len()
        ))),
    }
}

fn bind_params(root: &Node, params: &HashMap<String, Value>) -> RelqResult<Node> {
    root.replace(|n| match n.op() {
        Op::ScalarParameter { name, dtype } => match params.get(name) {
            Some(value) => lit_typed(value.clone(), dtype.clone()),
            None => Ok(n.clone()),
        },
        _ => Ok(n.clone()),
    })
}

/// Derived relations used as a source by two or more relations.
fn find_ctes(root: &Node) -> HashSet<Node> {
    let mut uses: HashMap<Node, usize> = HashMap::new();
    for node in root.postorder().into_iter().filter(Node::is_relation) {
        for child in node.children() {
            if child.is_relation() {
                *uses.entry(child.clone()).or_insert(0) += 1;
            }
        }
    }
    uses.into_iter()
        .filter(|(rel, n)| {
            *n > 1 && !matches!(rel.op(), Op::UnboundTable { .. } | Op::SelfReference { .. })
        })
        .map(|(rel, _)| rel)
        .collect()
}

/// Trait for converting expression graphs to SQL.
pub trait ToSql {
    /// Convert this graph to SQL using the default dialect (DuckDB).
    fn to_sql(&self) -> RelqResult<String> {
        self.to_sql_with_dialect(Dialect::default())
    }

    /// Convert this graph to SQL for a specific dialect.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> RelqResult<String>;
}

impl ToSql for Node {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> RelqResult<String> {
        Ok(Compiler::new(dialect)
            .compile(self, &CompileOptions::default())?
            .sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{lit, param, table};
    use crate::ast::{DataType, OpKind};
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table("t", [("a", DataType::int64()), ("b", DataType::string())]).unwrap()
    }

    #[test]
    fn test_bare_table() {
        assert_eq!(t().to_sql().unwrap(), "SELECT * FROM t AS t0");
    }

    #[test]
    fn test_scalar_root_is_projected() {
        let t = t();
        let expr = t.col("a").unwrap().add(lit(1)).unwrap().alias("c").unwrap();
        assert_eq!(expr.to_sql().unwrap(), "SELECT t0.a + 1 AS c FROM t AS t0");
    }

    #[test]
    fn test_scalar_reduction_root_is_aggregated() {
        let t = t();
        let total = t.col("a").unwrap().sum().unwrap().alias("total").unwrap();
        assert_eq!(
            total.to_sql().unwrap(),
            "SELECT SUM(t0.a) AS total FROM t AS t0"
        );
    }

    #[test]
    fn test_outer_limit() {
        let options = CompileOptions::new().limit(10);
        let out = Compiler::new(Dialect::Postgres).compile(&t(), &options).unwrap();
        assert_eq!(out.sql, "SELECT t0.a, t0.b FROM t AS t0 LIMIT 10");
        assert_eq!(out.schema, t().schema().cloned().unwrap());
    }

    #[test]
    fn test_depth_limit() {
        let t = t();
        let mut expr = t.col("a").unwrap();
        for _ in 0..10 {
            expr = expr.add(lit(1)).unwrap();
        }
        let options = CompileOptions::new().max_depth(5);
        let err = Compiler::new(Dialect::DuckDb).compile(&expr, &options).unwrap_err();
        assert!(matches!(err, RelqError::ExpressionTooDeep { limit: 5, .. }));
    }

    #[test]
    fn test_params_bound_and_unbound() {
        let t = t();
        let a = t.col("a").unwrap();
        let filtered = t
            .filter([
                a.gt(param("lo", DataType::int64())).unwrap(),
                a.lt(param("hi", DataType::int64())).unwrap(),
            ])
            .unwrap();
        let compiler = Compiler::new(Dialect::Postgres);

        let out = compiler.compile(&filtered, &CompileOptions::default()).unwrap();
        assert_eq!(
            out.sql,
            "SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > $1 AND t0.a < $2"
        );

        assert_eq!(out.params, vec!["lo", "hi"]);

        let options = CompileOptions::new().param("lo", 3i64);
        let out = compiler.compile(&filtered, &options).unwrap();
        assert_eq!(
            out.sql,
            "SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > 3 AND t0.a < $1"
        );
        assert_eq!(out.params, vec!["hi"]);
    }

    #[test]
    fn test_placeholders_follow_text_order() {
        let t = t();
        let lo = param("lo", DataType::int64());
        let filtered = t.filter([t.col("a").unwrap().gt(lo.clone()).unwrap()]).unwrap();
        let shifted = filtered.col("a").unwrap().add(lo).unwrap();
        let bumped = filtered.col("a").unwrap().add(param("step", DataType::int64())).unwrap();
        let expr = filtered.project([("x", shifted), ("y", bumped)]).unwrap();

        let pg = Compiler::new(Dialect::Postgres)
            .compile(&expr, &CompileOptions::default())
            .unwrap();
        assert_eq!(
            pg.sql,
            "SELECT t1.a + $1 AS x, t1.a + $2 AS y \
             FROM (SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > $1) AS t1"
        );
        assert_eq!(pg.params, vec!["lo", "step"]);

        let mysql = Compiler::new(Dialect::MySql)
            .compile(&expr, &CompileOptions::default())
            .unwrap();
        assert_eq!(
            mysql.sql,
            "SELECT t1.a + ? AS x, t1.a + ? AS y \
             FROM (SELECT t0.a, t0.b FROM t AS t0 WHERE t0.a > ?) AS t1"
        );
        assert_eq!(mysql.params, vec!["lo", "step", "lo"]);
    }

    #[test]
    fn test_every_distinct_node_visited_once() {
        let t = t();
        let a = t.col("a").unwrap();
        let doubled = a.add(a.clone()).unwrap().add(a.clone()).unwrap().alias("x").unwrap();
        let out = Compiler::new(Dialect::DuckDb)
            .compile(&doubled, &CompileOptions::default())
            .unwrap();
        assert_eq!(out.stats.visits(OpKind::Field), 1);
        assert_eq!(out.stats.visits(OpKind::UnboundTable), 1);
    }
}
