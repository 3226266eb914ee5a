use crate::ast::IntervalUnit;
use crate::transpiler::escape_identifier;
use crate::transpiler::traits::SqlGenerator;

pub struct PostgresGenerator;

impl Default for PostgresGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SqlGenerator for PostgresGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn numbered_placeholders(&self) -> bool {
        true
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

    fn string_concat(&self, parts: &[String]) -> String {
        parts.join(" || ")
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        super::standard_limit_offset(limit, offset)
    }

    fn interval(&self, value: &str, unit: IntervalUnit) -> String {
        // Postgres only takes constant interval strings
        if value.parse::<i64>().is_ok() {
            format!("INTERVAL '{} {}'", value, unit.sql_name())
        } else {
            format!("({} * INTERVAL '1 {}')", value, unit.sql_name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_forms() {
        let g = PostgresGenerator::new();
        assert_eq!(g.interval("3", IntervalUnit::Day), "INTERVAL '3 DAY'");
        assert_eq!(g.interval("t0.n", IntervalUnit::Hour), "(t0.n * INTERVAL '1 HOUR')");
    }
}
