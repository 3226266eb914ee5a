//! JSON plan documents.
//!
//! A plan document describes an expression graph without Rust code:
//!
//! ```json
//! {
//!   "relations": [
//!     {"name": "t", "plan": {"op": "table", "name": "t",
//!                            "columns": [{"name": "a", "type": "BIGINT"},
//!                                        {"name": "b", "type": "VARCHAR"}]}}
//!   ],
//!   "root": {"op": "filter", "parent": {"op": "ref", "name": "t"},
//!            "predicates": [{"expr": "call", "func": "StringContains",
//!                            "args": [{"expr": "column", "name": "b"},
//!                                     {"expr": "literal", "value": "x"}]}]}
//! }
//! ```
//!
//! Type strings use DuckDB spelling. Every node is built through the
//! [`crate::ast::builders`] constructors, so plans are validated exactly like
//! graphs built in Rust.

use crate::ast::builders::{
    analytic, call, dummy_table, if_else, lit, lit_typed, param, reduction, struct_column,
};
use crate::ast::{
    AggFunc, AnalyticFunc, BinaryOp, DataType, Func, HashAlgorithm, IntervalUnit, JoinKind, Node,
    Op, SampleMethod, Schema, TimeUnit, TypeKind, UnaryOp, Value, WindowFrame,
};
use crate::error::{RelqError, RelqResult};
use crate::types::TypeMapper;
use crate::types::DuckDbTypes;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// A whole plan: named relations, then the root built from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Relations referenced by name from later relations and the root.
    /// A relation referenced more than once is one shared node.
    #[serde(default)]
    pub relations: Vec<NamedRelation>,
    pub root: RootPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRelation {
    pub name: String,
    pub plan: RelationPlan,
}

/// The root is a relation, or a scalar expression over at most one relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RootPlan {
    Relation(RelationPlan),
    Scalar(ScalarRoot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRoot {
    /// Relation that bare column references resolve against.
    #[serde(default)]
    pub from: Option<String>,
    pub value: ExprPlan,
    #[serde(default)]
    pub alias: Option<String>,
}

/// A column type: a DuckDB type string, or the logical type as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Name(String),
    Logical(DataType),
}

impl TypeRef {
    pub fn resolve(&self, nullable: bool) -> RelqResult<DataType> {
        match self {
            TypeRef::Name(raw) => DuckDbTypes.from_string(raw, nullable),
            TypeRef::Logical(ty) => Ok(ty.clone().with_nullable(nullable)),
        }
    }
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlan {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: TypeRef,
    #[serde(default = "yes")]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedExpr {
    pub name: String,
    pub value: ExprPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RelationPlan {
    Table {
        name: String,
        #[serde(default)]
        database: Option<String>,
        columns: Vec<ColumnPlan>,
    },
    /// A relation from the document's `relations` list.
    Ref { name: String },
    /// A fresh self-reference of a named relation, for self joins.
    View { name: String },
    Values { values: Vec<NamedExpr> },
    Project {
        parent: Box<RelationPlan>,
        values: Vec<NamedExpr>,
    },
    Filter {
        parent: Box<RelationPlan>,
        predicates: Vec<ExprPlan>,
    },
    Aggregate {
        parent: Box<RelationPlan>,
        #[serde(default)]
        groups: Vec<NamedExpr>,
        #[serde(default)]
        metrics: Vec<NamedExpr>,
    },
    Join {
        left: Box<RelationPlan>,
        right: Box<RelationPlan>,
        #[serde(default = "inner")]
        kind: JoinKind,
        #[serde(default)]
        predicates: Vec<ExprPlan>,
    },
    Sort {
        parent: Box<RelationPlan>,
        keys: Vec<ExprPlan>,
    },
    Limit {
        parent: Box<RelationPlan>,
        #[serde(default)]
        n: Option<u64>,
        #[serde(default)]
        offset: u64,
    },
    Distinct { parent: Box<RelationPlan> },
    Sample {
        parent: Box<RelationPlan>,
        fraction: f64,
        #[serde(default = "row")]
        method: SampleMethod,
        #[serde(default)]
        seed: Option<u64>,
    },
    Union {
        left: Box<RelationPlan>,
        right: Box<RelationPlan>,
        #[serde(default)]
        distinct: bool,
    },
}

fn inner() -> JoinKind {
    JoinKind::Inner
}

fn row() -> SampleMethod {
    SampleMethod::Row
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePlan {
    pub when: ExprPlan,
    pub then: ExprPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum ExprPlan {
    /// A column of the enclosing relation. `from` picks a side of a join
    /// (`left`/`right`) or a named relation.
    Column {
        name: String,
        #[serde(default)]
        from: Option<String>,
    },
    Literal {
        value: serde_json::Value,
        #[serde(default, rename = "type")]
        dtype: Option<TypeRef>,
    },
    Param {
        name: String,
        #[serde(rename = "type")]
        dtype: TypeRef,
    },
    Call {
        func: Func,
        #[serde(default)]
        args: Vec<ExprPlan>,
    },
    Reduction {
        func: AggFunc,
        #[serde(default)]
        args: Vec<ExprPlan>,
        #[serde(default, rename = "where")]
        filter: Option<Box<ExprPlan>>,
    },
    CountStar {
        #[serde(default)]
        from: Option<String>,
    },
    Analytic {
        func: AnalyticFunc,
        #[serde(default)]
        args: Vec<ExprPlan>,
    },
    Window {
        func: Box<ExprPlan>,
        #[serde(default)]
        group_by: Vec<ExprPlan>,
        #[serde(default)]
        order_by: Vec<ExprPlan>,
        #[serde(default)]
        frame: Option<WindowFrame>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprPlan>,
        right: Box<ExprPlan>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<ExprPlan>,
    },
    Cast {
        arg: Box<ExprPlan>,
        to: TypeRef,
    },
    Case {
        cases: Vec<CasePlan>,
        #[serde(default)]
        default: Option<Box<ExprPlan>>,
    },
    In {
        arg: Box<ExprPlan>,
        options: Vec<ExprPlan>,
    },
    SortKey {
        arg: Box<ExprPlan>,
        #[serde(default = "yes")]
        ascending: bool,
    },
    Struct { fields: Vec<NamedExpr> },
    Truncate {
        arg: Box<ExprPlan>,
        unit: IntervalUnit,
    },
    FromUnix {
        arg: Box<ExprPlan>,
        unit: TimeUnit,
    },
    HashBytes {
        arg: Box<ExprPlan>,
        how: HashAlgorithm,
    },
}

impl FromStr for PlanDocument {
    type Err = RelqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl PlanDocument {
    /// Build the root node.
    pub fn build(&self) -> RelqResult<Node> {
        let mut builder = PlanBuilder::default();
        for relation in &self.relations {
            if builder.named.contains_key(&relation.name) {
                return Err(RelqError::plan(format!(
                    "relation '{}' is defined twice",
                    relation.name
                )));
            }
            let node = builder.relation(&relation.plan)?;
            debug!(name = %relation.name, "plan relation");
            builder.named.insert(relation.name.clone(), node);
        }
        match &self.root {
            RootPlan::Relation(plan) => builder.relation(plan),
            RootPlan::Scalar(root) => builder.scalar_root(root),
        }
    }
}

/// Parse and build a plan document.
pub fn load(json: &str) -> RelqResult<Node> {
    json.parse::<PlanDocument>()?.build()
}

/// Relations that column references resolve against.
struct Scope<'a> {
    entries: Vec<(&'a str, Node)>,
}

impl<'a> Scope<'a> {
    fn one(rel: Node) -> Self {
        Self {
            entries: vec![("", rel)],
        }
    }

    fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

#[derive(Default)]
struct PlanBuilder {
    named: HashMap<String, Node>,
}

impl PlanBuilder {
    fn lookup(&self, name: &str) -> RelqResult<Node> {
        self.named
            .get(name)
            .cloned()
            .ok_or_else(|| RelqError::plan(format!("unknown relation '{}'", name)))
    }

    fn relation(&self, plan: &RelationPlan) -> RelqResult<Node> {
        match plan {
            RelationPlan::Table {
                name,
                database,
                columns,
            } => {
                let fields = columns
                    .iter()
                    .map(|c| Ok((c.name.clone(), c.dtype.resolve(c.nullable)?)))
                    .collect::<RelqResult<Vec<_>>>()?;
                let schema = Schema::new(fields).map_err(RelqError::plan)?;
                crate::ast::builders::table_with_schema(name, database.as_deref(), schema)
            }
            RelationPlan::Ref { name } => self.lookup(name),
            RelationPlan::View { name } => self.lookup(name)?.view(),
            RelationPlan::Values { values } => {
                let values = self.named_exprs(values, &Scope::empty())?;
                dummy_table(values)
            }
            RelationPlan::Project { parent, values } => {
                let parent = self.relation(parent)?;
                let values = self.named_exprs(values, &Scope::one(parent.clone()))?;
                parent.project(values)
            }
            RelationPlan::Filter { parent, predicates } => {
                let parent = self.relation(parent)?;
                let predicates = self.exprs(predicates, &Scope::one(parent.clone()))?;
                parent.filter(predicates)
            }
            RelationPlan::Aggregate {
                parent,
                groups,
                metrics,
            } => {
                let parent = self.relation(parent)?;
                let scope = Scope::one(parent.clone());
                let groups = self.named_exprs(groups, &scope)?;
                let metrics = self.named_exprs(metrics, &scope)?;
                parent.aggregate(groups, metrics)
            }
            RelationPlan::Join {
                left,
                right,
                kind,
                predicates,
            } => {
                let left = self.relation(left)?;
                let right = self.relation(right)?;
                let scope = Scope {
                    entries: vec![("left", left.clone()), ("right", right.clone())],
                };
                let predicates = self.exprs(predicates, &scope)?;
                left.join(&right, *kind, predicates)
            }
            RelationPlan::Sort { parent, keys } => {
                let parent = self.relation(parent)?;
                let keys = self.exprs(keys, &Scope::one(parent.clone()))?;
                parent.order_by(keys)
            }
            RelationPlan::Limit { parent, n, offset } => self.relation(parent)?.limit(*n, *offset),
            RelationPlan::Distinct { parent } => self.relation(parent)?.distinct(),
            RelationPlan::Sample {
                parent,
                fraction,
                method,
                seed,
            } => self.relation(parent)?.sample(*fraction, *method, *seed),
            RelationPlan::Union {
                left,
                right,
                distinct,
            } => self.relation(left)?.union(&self.relation(right)?, *distinct),
        }
    }

    fn scalar_root(&self, root: &ScalarRoot) -> RelqResult<Node> {
        let scope = match &root.from {
            Some(name) => Scope::one(self.lookup(name)?),
            None => Scope::empty(),
        };
        let value = self.expr(&root.value, &scope)?;
        match &root.alias {
            Some(alias) => value.alias(alias),
            None => Ok(value),
        }
    }

    fn named_exprs(
        &self,
        values: &[NamedExpr],
        scope: &Scope<'_>,
    ) -> RelqResult<Vec<(String, Node)>> {
        values
            .iter()
            .map(|v| Ok((v.name.clone(), self.expr(&v.value, scope)?)))
            .collect()
    }

    fn exprs(&self, plans: &[ExprPlan], scope: &Scope<'_>) -> RelqResult<Vec<Node>> {
        plans.iter().map(|p| self.expr(p, scope)).collect()
    }

    /// The relation a column reference points at.
    fn resolve(&self, name: &str, from: Option<&str>, scope: &Scope<'_>) -> RelqResult<Node> {
        if let Some(label) = from {
            if let Some((_, rel)) = scope.entries.iter().find(|(l, _)| *l == label) {
                return Ok(rel.clone());
            }
            return self.lookup(label);
        }
        let mut matches = scope
            .entries
            .iter()
            .filter(|(_, rel)| rel.schema().is_some_and(|s| s.contains(name)));
        match (matches.next(), matches.next()) {
            (Some((_, rel)), None) => Ok(rel.clone()),
            (Some(_), Some(_)) => Err(RelqError::plan(format!(
                "column '{}' is ambiguous, set \"from\"",
                name
            ))),
            (None, _) => Err(RelqError::plan(format!(
                "no relation in scope has column '{}'",
                name
            ))),
        }
    }

    fn expr(&self, plan: &ExprPlan, scope: &Scope<'_>) -> RelqResult<Node> {
        match plan {
            ExprPlan::Column { name, from } => {
                self.resolve(name, from.as_deref(), scope)?.col(name)
            }
            ExprPlan::Literal { value, dtype } => match dtype {
                Some(ty) => {
                    let ty = ty.resolve(true)?;
                    lit_typed(json_value(value, Some(&ty))?, ty)
                }
                None => Ok(lit(json_value(value, None)?)),
            },
            ExprPlan::Param { name, dtype } => Ok(param(name, dtype.resolve(true)?)),
            ExprPlan::Call { func, args } => call(*func, self.exprs(args, scope)?),
            ExprPlan::Reduction { func, args, filter } => {
                let agg = reduction(*func, self.exprs(args, scope)?)?;
                match filter {
                    Some(predicate) => agg.where_(self.expr(predicate, scope)?),
                    None => Ok(agg),
                }
            }
            ExprPlan::CountStar { from } => {
                let rel = match from.as_deref() {
                    Some(label) => self.resolve("", Some(label), scope)?,
                    None => match scope.entries.as_slice() {
                        [(_, rel)] => rel.clone(),
                        _ => {
                            return Err(RelqError::plan(
                                "count_star needs exactly one relation in scope",
                            ));
                        }
                    },
                };
                rel.count_star()
            }
            ExprPlan::Analytic { func, args } => analytic(*func, self.exprs(args, scope)?),
            ExprPlan::Window {
                func,
                group_by,
                order_by,
                frame,
            } => self.expr(func, scope)?.over(
                self.exprs(group_by, scope)?,
                self.exprs(order_by, scope)?,
                *frame,
            ),
            ExprPlan::Binary { op, left, right } => {
                self.expr(left, scope)?.binary(*op, self.expr(right, scope)?)
            }
            ExprPlan::Unary { op, arg } => self.expr(arg, scope)?.unary(*op),
            ExprPlan::Cast { arg, to } => self.expr(arg, scope)?.cast(to.resolve(true)?),
            ExprPlan::Case { cases, default } => {
                let cases = cases
                    .iter()
                    .map(|c| Ok((self.expr(&c.when, scope)?, self.expr(&c.then, scope)?)))
                    .collect::<RelqResult<Vec<_>>>()?;
                let default = default.as_ref().map(|d| self.expr(d, scope)).transpose()?;
                if_else(cases, default)
            }
            ExprPlan::In { arg, options } => {
                self.expr(arg, scope)?.isin(self.exprs(options, scope)?)
            }
            ExprPlan::SortKey { arg, ascending } => {
                let key = self.expr(arg, scope)?;
                if *ascending { key.asc() } else { key.desc() }
            }
            ExprPlan::Struct { fields } => struct_column(self.named_exprs(fields, scope)?),
            ExprPlan::Truncate { arg, unit } => self.expr(arg, scope)?.truncate(*unit),
            ExprPlan::FromUnix { arg, unit } => self.expr(arg, scope)?.to_timestamp(*unit),
            ExprPlan::HashBytes { arg, how } => self.expr(arg, scope)?.hash_bytes(*how),
        }
    }
}

/// Convert a JSON literal, reading strings as the declared type when one is given.
pub fn json_value(json: &serde_json::Value, ty: Option<&DataType>) -> RelqResult<Value> {
    use serde_json::Value as Json;

    let bad = |what: &str| RelqError::plan(format!("cannot read {} as {}", json, what));
    let kind = ty.map(|t| &t.kind);
    let value = match (json, kind) {
        (Json::Null, _) => Value::Null,
        (Json::Bool(b), _) => Value::Bool(*b),
        (Json::Number(n), Some(TypeKind::Decimal { .. })) => {
            Value::Decimal(Decimal::from_str(&n.to_string()).map_err(|_| bad("decimal"))?)
        }
        (Json::Number(n), Some(TypeKind::Interval(_))) => {
            Value::Interval(n.as_i64().ok_or_else(|| bad("interval"))?)
        }
        (Json::Number(n), Some(k)) if matches!(k, TypeKind::Float32 | TypeKind::Float64) => {
            Value::Float(n.as_f64().ok_or_else(|| bad("float"))?)
        }
        (Json::Number(n), _) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Value::Int(i),
            (None, Some(u)) => Value::UInt(u),
            _ => Value::Float(n.as_f64().ok_or_else(|| bad("number"))?),
        },
        (Json::String(s), Some(TypeKind::Date)) => {
            Value::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| bad("date"))?)
        }
        (Json::String(s), Some(TypeKind::Time)) => {
            Value::Time(NaiveTime::parse_from_str(s, "%H:%M:%S%.f").map_err(|_| bad("time"))?)
        }
        (Json::String(s), Some(TypeKind::Timestamp { .. })) => Value::Timestamp(
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                .map_err(|_| bad("timestamp"))?,
        ),
        (Json::String(s), Some(TypeKind::Uuid)) => {
            Value::Uuid(uuid::Uuid::parse_str(s).map_err(|_| bad("uuid"))?)
        }
        (Json::String(s), Some(TypeKind::Decimal { .. })) => {
            Value::Decimal(Decimal::from_str(s).map_err(|_| bad("decimal"))?)
        }
        (Json::String(s), Some(TypeKind::Json)) => Value::Json(s.clone()),
        (Json::String(s), Some(TypeKind::Binary)) => Value::Binary(s.as_bytes().to_vec()),
        (Json::String(s), _) => Value::String(s.clone()),
        (Json::Array(items), _) => {
            let elem = ty.and_then(|t| t.element());
            Value::Array(
                items
                    .iter()
                    .map(|item| json_value(item, elem))
                    .collect::<RelqResult<Vec<_>>>()?,
            )
        }
        (Json::Object(_), _) => Value::Json(json.to_string()),
    };
    Ok(value)
}

/// Read a `name=value` text for each parameter, against the type the
/// parameter is declared with in `node`.
pub fn text_params(node: &Node, raw: &[(String, String)]) -> RelqResult<Vec<(String, Value)>> {
    let declared: HashMap<String, DataType> = node
        .postorder()
        .into_iter()
        .filter_map(|n| match n.op() {
            Op::ScalarParameter { name, dtype } => Some((name.clone(), dtype.clone())),
            _ => None,
        })
        .collect();
    raw.iter()
        .map(|(name, text)| {
            let ty = declared
                .get(name)
                .ok_or_else(|| RelqError::plan(format!("the plan has no parameter '{}'", name)))?;
            Ok((name.clone(), text_value(text, ty)?))
        })
        .collect()
}

/// A command-line value as a literal of `ty`.
pub fn text_value(text: &str, ty: &DataType) -> RelqResult<Value> {
    use serde_json::Value as Json;

    let textual = matches!(
        ty.kind,
        TypeKind::String
            | TypeKind::Binary
            | TypeKind::Date
            | TypeKind::Time
            | TypeKind::Timestamp { .. }
            | TypeKind::Uuid
            | TypeKind::Decimal { .. }
            | TypeKind::Json
    );
    let json = if textual {
        Json::String(text.to_string())
    } else {
        serde_json::from_str(text).unwrap_or_else(|_| Json::String(text.to_string()))
    };
    json_value(&json, Some(ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::transpiler::{CompileOptions, Compiler};
    use pretty_assertions::assert_eq;

    const CONTAINS_PLAN: &str = r#"{
        "relations": [
            {"name": "t", "plan": {"op": "table", "name": "t", "columns": [
                {"name": "a", "type": "BIGINT"},
                {"name": "b", "type": "VARCHAR"}
            ]}}
        ],
        "root": {"op": "filter",
                 "parent": {"op": "project", "parent": {"op": "ref", "name": "t"},
                            "values": [{"name": "a", "value": {"expr": "column", "name": "a"}},
                                       {"name": "b", "value": {"expr": "column", "name": "b"}}]},
                 "predicates": [{"expr": "call", "func": "StringContains",
                                 "args": [{"expr": "column", "name": "b"},
                                          {"expr": "literal", "value": "x"}]}]}
    }"#;

    #[test]
    fn test_plan_compiles_like_builders() {
        let node = load(CONTAINS_PLAN).unwrap();
        let sql = Compiler::new(Dialect::Postgres)
            .compile(&node, &CompileOptions::default())
            .unwrap()
            .sql;
        assert_eq!(
            sql,
            "SELECT t1.a, t1.b FROM (SELECT t0.a, t0.b FROM t AS t0) AS t1 WHERE t1.b LIKE '%x%'"
        );
    }

    #[test]
    fn test_column_types_from_strings() {
        let node = load(CONTAINS_PLAN).unwrap();
        let schema = node.schema().unwrap();
        assert_eq!(schema.get("a"), Some(&DataType::int64()));
        assert_eq!(schema.get("b"), Some(&DataType::string()));
    }

    #[test]
    fn test_unknown_relation() {
        let err = load(r#"{"root": {"op": "ref", "name": "missing"}}"#).unwrap_err();
        assert!(matches!(err, RelqError::Plan(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = load(r#"{"root": {"op": "nope"}}"#).unwrap_err();
        assert!(matches!(err, RelqError::Json(_)));
    }

    #[test]
    fn test_ambiguous_join_column_needs_side() {
        let plan = r#"{
            "relations": [
                {"name": "l", "plan": {"op": "table", "name": "l",
                                       "columns": [{"name": "id", "type": "INTEGER"}]}},
                {"name": "r", "plan": {"op": "table", "name": "r",
                                       "columns": [{"name": "id", "type": "INTEGER"}]}}
            ],
            "root": {"op": "join", "left": {"op": "ref", "name": "l"},
                     "right": {"op": "ref", "name": "r"},
                     "predicates": [{"expr": "binary", "op": "Equals",
                                     "left": {"expr": "column", "name": "id"},
                                     "right": {"expr": "column", "name": "id", "from": "right"}}]}
        }"#;
        let err = load(plan).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));

        let fixed = plan.replacen(
            r#"{"expr": "column", "name": "id"}"#,
            r#"{"expr": "column", "name": "id", "from": "left"}"#,
            1,
        );
        let node = load(&fixed).unwrap();
        assert!(matches!(node.op(), Op::Join { .. }));
        let names: Vec<&str> = node.schema().unwrap().names().collect();
        assert_eq!(names, vec!["id", "id_right"]);
    }

    #[test]
    fn test_text_params_follow_declared_types() {
        let plan = r#"{
            "relations": [
                {"name": "t", "plan": {"op": "table", "name": "t", "columns": [
                    {"name": "d", "type": "DATE"},
                    {"name": "n", "type": "BIGINT"},
                    {"name": "s", "type": "VARCHAR"}
                ]}}
            ],
            "root": {"op": "filter", "parent": {"op": "ref", "name": "t"},
                     "predicates": [
                        {"expr": "binary", "op": "GreaterEqual",
                         "left": {"expr": "column", "name": "d"},
                         "right": {"expr": "param", "name": "since", "type": "DATE"}},
                        {"expr": "binary", "op": "Less",
                         "left": {"expr": "column", "name": "n"},
                         "right": {"expr": "param", "name": "max", "type": "BIGINT"}},
                        {"expr": "binary", "op": "Equals",
                         "left": {"expr": "column", "name": "s"},
                         "right": {"expr": "param", "name": "code", "type": "VARCHAR"}}
                     ]}
        }"#;
        let node = load(plan).unwrap();
        let raw = [
            ("since".to_string(), "2024-01-01".to_string()),
            ("max".to_string(), "10".to_string()),
            ("code".to_string(), "007".to_string()),
        ];
        let values = text_params(&node, &raw).unwrap();
        let since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(&values[0].1, Value::Date(d) if *d == since));
        assert!(matches!(values[1].1, Value::Int(10)));
        assert!(matches!(&values[2].1, Value::String(s) if s == "007"));

        let mut options = CompileOptions::default();
        options.params.extend(values);
        let sql = Compiler::new(Dialect::Postgres).compile(&node, &options).unwrap().sql;
        assert_eq!(
            sql,
            "SELECT t0.d, t0.n, t0.s FROM t AS t0 \
             WHERE t0.d >= CAST('2024-01-01' AS DATE) AND t0.n < 10 AND t0.s = '007'"
        );

        let unknown = [("nope".to_string(), "1".to_string())];
        assert!(matches!(text_params(&node, &unknown), Err(RelqError::Plan(_))));
    }

    #[test]
    fn test_typed_literals() {
        let date = json_value(&serde_json::json!("2024-02-29"), Some(&DataType::date())).unwrap();
        let leap_day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert!(matches!(date, Value::Date(d) if d == leap_day));

        let ts = json_value(
            &serde_json::json!("2024-02-29T10:30:00"),
            Some(&DataType::timestamp()),
        )
        .unwrap();
        assert!(matches!(ts, Value::Timestamp(_)));

        assert!(matches!(
            json_value(&serde_json::json!(3), None).unwrap(),
            Value::Int(3)
        ));
        assert!(json_value(&serde_json::json!("soon"), Some(&DataType::date())).is_err());
    }

    #[test]
    fn test_scalar_root() {
        let plan = r#"{"root": {"value": {"expr": "literal", "value": 1}, "alias": "one"}}"#;
        let node = load(plan).unwrap();
        let sql = Compiler::new(Dialect::DuckDb)
            .compile(&node, &CompileOptions::default())
            .unwrap()
            .sql;
        assert_eq!(sql, "SELECT 1 AS one");
    }
}
