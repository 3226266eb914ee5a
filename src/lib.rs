//! # relq
//!
//! One relational expression graph, many SQL dialects.
//!
//! Queries are built as an immutable graph of [`ast::Node`]s, rewritten by a
//! per-dialect pipeline and compiled bottom-up into dialect SQL.
//!
//! ## Quick Example
//!
//! ```
//! use relq::prelude::*;
//!
//! let t = table("t", [("a", DataType::int64()), ("b", DataType::string())]).unwrap();
//! let expr = t
//!     .select_columns(&["a", "b"])
//!     .unwrap();
//! let filtered = expr.filter([expr.col("b").unwrap().contains(lit("x")).unwrap()]).unwrap();
//!
//! let sql = relq::compile(&filtered, Dialect::Impala).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT t1.a, t1.b FROM (SELECT t0.a, t0.b FROM t AS t0) AS t1 WHERE LOCATE('x', t1.b) > 0"
//! );
//! ```
//!
//! ## Layout
//!
//! | Module        | Role                                          |
//! |---------------|-----------------------------------------------|
//! | [`ast`]       | Expression graph, types, values, builders     |
//! | [`rewrites`]  | Graph and SQL rewrite passes                  |
//! | [`transpiler`]| Memoized compiler and SQL generators          |
//! | [`dialect`]   | Per-dialect configuration                     |
//! | [`types`]     | Type strings to and from logical types        |
//! | [`plan`]      | JSON plan documents                           |

pub mod ast;
pub mod config;
pub mod dialect;
pub mod error;
pub mod plan;
pub mod rewrites;
pub mod sql;
pub mod transpiler;
pub mod types;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::config::RelqConfig;
    pub use crate::dialect::Dialect;
    pub use crate::error::*;
    pub use crate::transpiler::{CompileOptions, Compiled, Compiler};
    pub use crate::types::TypeMapper;
}

/// Compile `node` for `dialect` with default options and return the SQL text.
pub fn compile(node: &ast::Node, dialect: dialect::Dialect) -> error::RelqResult<String> {
    let options = transpiler::CompileOptions::default();
    let compiled = transpiler::Compiler::new(dialect).compile(node, &options)?;
    Ok(compiled.sql)
}
