//! Per-dialect SQL generators.

pub mod duckdb;
pub mod impala;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

/// `LIMIT`/`OFFSET` suffix shared by dialects that accept a bare `OFFSET`.
pub(crate) fn standard_limit_offset(limit: Option<u64>, offset: Option<u64>) -> String {
    let mut sql = String::new();
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {}", n));
    }
    if let Some(n) = offset {
        sql.push_str(&format!(" OFFSET {}", n));
    }
    sql
}
