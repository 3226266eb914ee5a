use crate::ast::IntervalUnit;
use crate::transpiler::traits::{SqlGenerator, backslash_string_literal, escape_identifier_with};

/// Impala Generator.
pub struct ImpalaGenerator;

impl SqlGenerator for ImpalaGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier_with(name, '`')
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn fuzzy_operator(&self) -> &str {
        "ILIKE"
    }

    fn bool_literal(&self, val: bool) -> String {
        if val {
            "TRUE".to_string()
        } else {
            "FALSE".to_string()
        }
    }

    fn string_literal(&self, value: &str) -> String {
        backslash_string_literal(value)
    }

    fn string_concat(&self, parts: &[String]) -> String {
        // `||` means OR unless the server runs with PIPES_AS_CONCAT
        format!("CONCAT({})", parts.join(", "))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let limit = match (limit, offset) {
            (None, Some(_)) => Some(i64::MAX as u64),
            _ => limit,
        };
        super::standard_limit_offset(limit, offset)
    }

    fn interval(&self, value: &str, unit: IntervalUnit) -> String {
        format!("INTERVAL {} {}S", value, unit.sql_name())
    }
}
