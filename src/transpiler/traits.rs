//! Transpiler traits and utilities.

use crate::ast::{IntervalUnit, SampleMethod};

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "all",
    "and",
    "as",
    "asc",
    "between",
    "by",
    "case",
    "cast",
    "check",
    "constraint",
    "create",
    "cross",
    "default",
    "delete",
    "desc",
    "distinct",
    "drop",
    "else",
    "end",
    "except",
    "exists",
    "false",
    "from",
    "full",
    "group",
    "having",
    "in",
    "inner",
    "insert",
    "intersect",
    "interval",
    "is",
    "join",
    "key",
    "left",
    "like",
    "limit",
    "not",
    "null",
    "offset",
    "on",
    "or",
    "order",
    "outer",
    "over",
    "partition",
    "primary",
    "references",
    "right",
    "rows",
    "select",
    "table",
    "then",
    "true",
    "union",
    "update",
    "user",
    "using",
    "when",
    "where",
    "window",
    "with",
];

/// Escape an identifier with double quotes if it's a reserved word or
/// contains anything but lowercase letters, digits and underscores.
pub fn escape_identifier(name: &str) -> String {
    escape_identifier_with(name, '"')
}

/// Like [`escape_identifier`] with a dialect-specific quote character.
pub fn escape_identifier_with(name: &str, quote: char) -> String {
    let needs_escaping = name.is_empty()
        || RESERVED_WORDS.contains(&name.to_ascii_lowercase().as_str())
        || name
            .chars()
            .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))
        || name.chars().next().is_some_and(|c| c.is_ascii_digit());

    if needs_escaping {
        let doubled: String = [quote, quote].iter().collect();
        format!("{q}{}{q}", name.replace(quote, &doubled), q = quote)
    } else {
        name.to_string()
    }
}

/// String literal for engines that read `\` as an escape inside quotes.
pub fn backslash_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Trait for dialect-specific SQL generation.
pub trait SqlGenerator {
    /// Quote an identifier (table, column or alias name).
    fn quote_identifier(&self, name: &str) -> String;
    /// Generate the parameter placeholder (e.g., $1, ?) for a 1-based index.
    fn placeholder(&self, index: usize) -> String;
    /// Whether placeholders carry their position, so a repeated parameter
    /// reuses its number instead of taking a new `?`.
    fn numbered_placeholders(&self) -> bool {
        false
    }
    /// Get the case-insensitive matching operator, `LIKE` when there is none.
    fn fuzzy_operator(&self) -> &str;
    /// Get the boolean literal (TRUE/FALSE vs 1/0).
    fn bool_literal(&self, val: bool) -> String;
    /// Generate string concatenation expression (e.g. 'a' || 'b' vs CONCAT('a', 'b')).
    fn string_concat(&self, parts: &[String]) -> String;
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String;

    /// Quote a string literal.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Generate an interval of `value` units, where `value` is rendered SQL.
    fn interval(&self, value: &str, unit: IntervalUnit) -> String {
        format!("INTERVAL {} {}", value, unit.sql_name())
    }

    /// Generate an array constructor.
    fn array_literal(&self, items: &[String]) -> String {
        format!("ARRAY[{}]", items.join(", "))
    }

    /// Generate the sampling clause appended to a table reference.
    fn table_sample(&self, method: SampleMethod, percent: f64, seed: Option<u64>) -> String {
        let method = match method {
            SampleMethod::Row => "BERNOULLI",
            SampleMethod::Block => "SYSTEM",
        };
        let mut sql = format!("TABLESAMPLE {} ({})", method, format_percent(percent));
        if let Some(seed) = seed {
            sql.push_str(&format!(" REPEATABLE ({})", seed));
        }
        sql
    }
}

/// Render a sampling percentage without a trailing `.0`.
pub fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{}", percent as i64)
    } else {
        format!("{}", percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("col"), "col");
        assert_eq!(escape_identifier("order"), "\"order\"");
        assert_eq!(escape_identifier("MixedCase"), "\"MixedCase\"");
        assert_eq!(escape_identifier("a b"), "\"a b\"");
        assert_eq!(escape_identifier("1st"), "\"1st\"");
        assert_eq!(escape_identifier_with("we`ird", '`'), "`we``ird`");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(50.0), "50");
        assert_eq!(format_percent(12.5), "12.5");
    }
}
