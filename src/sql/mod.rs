//! Dialect SQL syntax tree.
//!
//! The compiler only builds and combines these values; text is produced by
//! [`render`] through a dialect's [`SqlGenerator`](crate::transpiler::SqlGenerator).

pub mod render;

use crate::ast::{IntervalUnit, SampleMethod, WindowFrame};

pub use render::{render_expr, render_query, render_query_with_params};

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub ctes: Vec<Cte>,
    pub body: SetExpr,
}

impl Query {
    pub fn select(select: Select) -> Self {
        Self {
            ctes: Vec::new(),
            body: SetExpr::Select(Box::new(select)),
        }
    }

    /// The top-level SELECT, if the body is one.
    pub fn as_select(&self) -> Option<&Select> {
        match &self.body {
            SetExpr::Select(s) => Some(s),
            SetExpr::SetOp { .. } => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut Select> {
        match &mut self.body {
            SetExpr::Select(s) => Some(s),
            SetExpr::SetOp { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub query: Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    Select(Box<Select>),
    SetOp {
        op: SetOperator,
        all: bool,
        left: Box<SetExpr>,
        right: Box<SetExpr>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Option<TableWithJoins>,
    pub selection: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    /// `SELECT * FROM <relation>`.
    pub fn star_from(relation: TableFactor) -> Self {
        Self {
            projection: vec![SelectItem::Wildcard],
            from: Some(TableWithJoins {
                relation,
                joins: Vec::new(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Expr { expr: SqlExpr, alias: Option<String> },
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub op: JoinOperator,
    pub relation: TableFactor,
    pub on: Option<SqlExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table {
        name: String,
        database: Option<String>,
        alias: Option<String>,
    },
    Derived {
        subquery: Box<Query>,
        alias: String,
    },
    Sampled {
        relation: Box<TableFactor>,
        method: SampleMethod,
        percent: f64,
        seed: Option<u64>,
    },
}

impl TableFactor {
    /// The name columns of this factor are qualified with.
    pub fn alias(&self) -> Option<&str> {
        match self {
            TableFactor::Table { alias, name, .. } => Some(alias.as_deref().unwrap_or(name)),
            TableFactor::Derived { alias, .. } => Some(alias),
            TableFactor::Sampled { relation, .. } => relation.alias(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: SqlExpr,
    pub asc: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlLiteral {
    Null,
    Bool(bool),
    /// Already formatted numeric text.
    Number(String),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBinaryOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    /// Integer division keyword (`DIV`).
    IntDiv,
    /// Postgres regex match `~`.
    RegexMatch,
    /// `RLIKE` / `REGEXP` style operators.
    RLike,
    /// Any other dialect operator token, binding like bitwise OR.
    Custom(&'static str),
}

impl SqlBinaryOp {
    pub fn precedence(&self) -> u8 {
        match self {
            SqlBinaryOp::Or => 1,
            SqlBinaryOp::And => 2,
            SqlBinaryOp::Eq
            | SqlBinaryOp::NotEq
            | SqlBinaryOp::Lt
            | SqlBinaryOp::LtEq
            | SqlBinaryOp::Gt
            | SqlBinaryOp::GtEq
            | SqlBinaryOp::RegexMatch
            | SqlBinaryOp::RLike => 4,
            SqlBinaryOp::BitOr | SqlBinaryOp::BitXor | SqlBinaryOp::Custom(_) => 5,
            SqlBinaryOp::BitAnd => 6,
            SqlBinaryOp::ShiftLeft | SqlBinaryOp::ShiftRight => 7,
            SqlBinaryOp::Plus | SqlBinaryOp::Minus | SqlBinaryOp::Concat => 8,
            SqlBinaryOp::Multiply
            | SqlBinaryOp::Divide
            | SqlBinaryOp::Modulo
            | SqlBinaryOp::IntDiv => 9,
        }
    }

    pub fn is_associative(&self) -> bool {
        matches!(
            self,
            SqlBinaryOp::And
                | SqlBinaryOp::Or
                | SqlBinaryOp::Plus
                | SqlBinaryOp::Multiply
                | SqlBinaryOp::Concat
                | SqlBinaryOp::BitAnd
                | SqlBinaryOp::BitOr
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlUnaryOp {
    Not,
    Minus,
    BitNot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column {
        table: Option<String>,
        name: String,
    },
    /// `*` as a function argument.
    Star,
    Literal(SqlLiteral),
    /// Unbound parameter, numbered when rendered.
    Placeholder(String),
    /// A bare keyword such as `CURRENT_TIMESTAMP`.
    Keyword(String),
    Func {
        name: String,
        args: Vec<SqlExpr>,
        distinct: bool,
        filter: Option<Box<SqlExpr>>,
    },
    /// `name := value` argument.
    NamedArg {
        name: String,
        value: Box<SqlExpr>,
    },
    Cast {
        expr: Box<SqlExpr>,
        to: String,
    },
    Binary {
        left: Box<SqlExpr>,
        op: SqlBinaryOp,
        right: Box<SqlExpr>,
    },
    Unary {
        op: SqlUnaryOp,
        expr: Box<SqlExpr>,
    },
    IsNull {
        expr: Box<SqlExpr>,
        negated: bool,
    },
    Case {
        cases: Vec<(SqlExpr, SqlExpr)>,
        default: Option<Box<SqlExpr>>,
    },
    InList {
        expr: Box<SqlExpr>,
        list: Vec<SqlExpr>,
        negated: bool,
    },
    Like {
        expr: Box<SqlExpr>,
        pattern: Box<SqlExpr>,
        negated: bool,
        case_insensitive: bool,
    },
    Interval {
        value: Box<SqlExpr>,
        unit: IntervalUnit,
    },
    Extract {
        field: String,
        expr: Box<SqlExpr>,
    },
    Array(Vec<SqlExpr>),
    Exists {
        subquery: Box<Query>,
        negated: bool,
    },
    Window {
        func: Box<SqlExpr>,
        partition_by: Vec<SqlExpr>,
        order_by: Vec<OrderByExpr>,
        frame: Option<WindowFrame>,
    },
    Nested(Box<SqlExpr>),
}

impl SqlExpr {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        SqlExpr::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn null() -> Self {
        SqlExpr::Literal(SqlLiteral::Null)
    }

    pub fn int(n: i64) -> Self {
        SqlExpr::Literal(SqlLiteral::Number(n.to_string()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        SqlExpr::Literal(SqlLiteral::String(s.into()))
    }

    pub fn func(name: impl Into<String>, args: Vec<SqlExpr>) -> Self {
        SqlExpr::Func {
            name: name.into(),
            args,
            distinct: false,
            filter: None,
        }
    }

    pub fn binary(left: SqlExpr, op: SqlBinaryOp, right: SqlExpr) -> Self {
        SqlExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn cast(expr: SqlExpr, to: impl Into<String>) -> Self {
        SqlExpr::Cast {
            expr: Box::new(expr),
            to: to.into(),
        }
    }

    pub fn not(expr: SqlExpr) -> Self {
        SqlExpr::Unary {
            op: SqlUnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    pub fn like(expr: SqlExpr, pattern: SqlExpr) -> Self {
        SqlExpr::Like {
            expr: Box::new(expr),
            pattern: Box::new(pattern),
            negated: false,
            case_insensitive: false,
        }
    }

    /// Direct sub-expressions, not descending into subqueries.
    pub fn children_mut(&mut self) -> Vec<&mut SqlExpr> {
        match self {
            SqlExpr::Column { .. }
            | SqlExpr::Star
            | SqlExpr::Literal(_)
            | SqlExpr::Placeholder(_)
            | SqlExpr::Keyword(_)
            | SqlExpr::Exists { .. } => Vec::new(),
            SqlExpr::Func { args, filter, .. } => {
                let mut out: Vec<&mut SqlExpr> = args.iter_mut().collect();
                out.extend(filter.as_deref_mut());
                out
            }
            SqlExpr::NamedArg { value: e, .. }
            | SqlExpr::Cast { expr: e, .. }
            | SqlExpr::Unary { expr: e, .. }
            | SqlExpr::IsNull { expr: e, .. }
            | SqlExpr::Interval { value: e, .. }
            | SqlExpr::Extract { expr: e, .. }
            | SqlExpr::Nested(e) => vec![e.as_mut()],
            SqlExpr::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            SqlExpr::Case { cases, default } => {
                let mut out = Vec::new();
                for (when, then) in cases.iter_mut() {
                    out.push(when);
                    out.push(then);
                }
                out.extend(default.as_deref_mut());
                out
            }
            SqlExpr::InList { expr, list, .. } => {
                let mut out = vec![expr.as_mut()];
                out.extend(list.iter_mut());
                out
            }
            SqlExpr::Like { expr, pattern, .. } => vec![expr.as_mut(), pattern.as_mut()],
            SqlExpr::Array(items) => items.iter_mut().collect(),
            SqlExpr::Window {
                func,
                partition_by,
                order_by,
                ..
            } => {
                let mut out = vec![func.as_mut()];
                out.extend(partition_by.iter_mut());
                out.extend(order_by.iter_mut().map(|k| &mut k.expr));
                out
            }
        }
    }

    /// Binding strength used to decide where parentheses are needed.
    pub fn precedence(&self) -> u8 {
        match self {
            SqlExpr::Binary { op, .. } => op.precedence(),
            SqlExpr::Unary {
                op: SqlUnaryOp::Not,
                ..
            }
            | SqlExpr::Exists { negated: true, .. } => 3,
            SqlExpr::IsNull { .. } | SqlExpr::InList { .. } | SqlExpr::Like { .. } => 4,
            SqlExpr::Unary { .. } => 10,
            _ => 11,
        }
    }
}
