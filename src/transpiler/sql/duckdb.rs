use crate::ast::SampleMethod;
use crate::transpiler::escape_identifier;
use crate::transpiler::traits::{SqlGenerator, format_percent};

pub struct DuckDbGenerator;

impl SqlGenerator for DuckDbGenerator {
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

    fn array_literal(&self, items: &[String]) -> String {
        format!("[{}]", items.join(", "))
    }

    fn table_sample(&self, method: SampleMethod, percent: f64, seed: Option<u64>) -> String {
        let method = match method {
            SampleMethod::Row => "bernoulli",
            SampleMethod::Block => "system",
        };
        let mut sql = format!("TABLESAMPLE {}({}%)", method, format_percent(percent));
        if let Some(seed) = seed {
            sql.push_str(&format!(" REPEATABLE ({})", seed));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sample() {
        assert_eq!(
            DuckDbGenerator.table_sample(SampleMethod::Row, 12.5, Some(7)),
            "TABLESAMPLE bernoulli(12.5%) REPEATABLE (7)"
        );
    }
}
