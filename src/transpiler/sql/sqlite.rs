use crate::transpiler::escape_identifier;
use crate::transpiler::traits::SqlGenerator;

/// SQLite Generator.
pub struct SqliteGenerator;

impl SqliteGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SqlGenerator for SqliteGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn fuzzy_operator(&self) -> &str {
        "LIKE"
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "1".to_string() } else { "0".to_string() }
    }

    fn string_concat(&self, parts: &[String]) -> String {
        parts.join(" || ")
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (None, Some(n)) => format!(" LIMIT -1 OFFSET {}", n),
            _ => super::standard_limit_offset(limit, offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(SqliteGenerator::new().limit_offset(None, Some(3)), " LIMIT -1 OFFSET 3");
        assert_eq!(SqliteGenerator::new().bool_literal(true), "1");
    }
}
