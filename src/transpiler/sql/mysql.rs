use crate::transpiler::traits::{SqlGenerator, backslash_string_literal, escape_identifier_with};

/// MySQL Generator.
pub struct MysqlGenerator;

impl MysqlGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SqlGenerator for MysqlGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier_with(name, '`')
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

    fn string_literal(&self, value: &str) -> String {
        backslash_string_literal(value)
    }

    fn string_concat(&self, parts: &[String]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // OFFSET is only valid after a LIMIT
        let limit = match (limit, offset) {
            (None, Some(_)) => Some(u64::MAX),
            _ => limit,
        };
        super::standard_limit_offset(limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(
            MysqlGenerator::new().limit_offset(None, Some(5)),
            " LIMIT 18446744073709551615 OFFSET 5"
        );
    }

    #[test]
    fn test_backtick_quoting() {
        assert_eq!(MysqlGenerator::new().quote_identifier("order"), "`order`");
        assert_eq!(MysqlGenerator::new().quote_identifier("a"), "a");
    }
}
