//! Conversion between logical types and backend type strings.
//!
//! Every dialect parses its type strings through the shared grammar in
//! [`parser`] and interprets the resulting [`TypeSyntax`] tree.

pub mod duckdb;
pub mod impala;
pub mod mysql;
pub mod parser;
pub mod postgres;
pub mod sqlite;

pub use duckdb::DuckDbTypes;
pub use impala::ImpalaTypes;
pub use mysql::MySqlTypes;
pub use parser::{TypeParam, TypeSyntax, parse_type};
pub use postgres::PostgresTypes;
pub use sqlite::SqliteTypes;

use crate::ast::{DataType, Schema, TypeKind};
use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};

/// Maps logical types to and from one dialect's type strings.
pub trait TypeMapper: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// DDL spelling of a logical type. Nullability is not part of the string.
    fn to_string(&self, ty: &DataType) -> RelqResult<String>;

    /// Interpret a parsed type string. `raw` is the original text, used in errors
    /// and kept by best-effort `Unknown` types.
    fn from_syntax(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TypeKind>;

    fn from_string(&self, raw: &str, nullable: bool) -> RelqResult<DataType> {
        let syntax = parse_type(raw)
            .map_err(|reason| RelqError::type_mapping(raw, self.dialect(), reason))?;
        let kind = self.from_syntax(&syntax, raw)?;
        Ok(DataType { kind, nullable })
    }

    /// Element types inside arrays, maps and structs are always nullable.
    fn nested(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<DataType> {
        Ok(DataType::new(self.from_syntax(syntax, raw)?))
    }

    fn unknown_name(&self, raw: &str) -> RelqError {
        RelqError::type_mapping(raw, self.dialect(), "unknown type name")
    }
}

/// Build a schema from `(name, type string, nullable)` column descriptions.
pub fn schema_from_columns<I, N, T>(mapper: &dyn TypeMapper, columns: I) -> RelqResult<Schema>
where
    I: IntoIterator<Item = (N, T, bool)>,
    N: Into<String>,
    T: AsRef<str>,
{
    let mut fields = Vec::new();
    for (name, raw, nullable) in columns {
        let ty = mapper.from_string(raw.as_ref(), nullable)?;
        fields.push((name.into(), ty));
    }
    Schema::new(fields)
        .map_err(|reason| RelqError::type_mapping("<schema>", mapper.dialect(), reason))
}

/// Exactly `n` type parameters, mapped as nested types.
fn type_args(
    mapper: &(impl TypeMapper + ?Sized),
    syntax: &TypeSyntax,
    n: usize,
    raw: &str,
) -> RelqResult<Vec<DataType>> {
    let params = syntax.type_params();
    if params.len() != n || syntax.params().len() != n {
        return Err(RelqError::type_mapping(
            raw,
            mapper.dialect(),
            format!("expected {} type parameter(s)", n),
        ));
    }
    params.into_iter().map(|p| mapper.nested(p, raw)).collect()
}

/// `NAME(p, s)` decimal parameters; a missing scale defaults to 0.
fn decimal_args(
    mapper: &(impl TypeMapper + ?Sized),
    syntax: &TypeSyntax,
    raw: &str,
) -> RelqResult<TypeKind> {
    let narrow = |n: i64| {
        u8::try_from(n).map_err(|_| {
            RelqError::type_mapping(raw, mapper.dialect(), "decimal precision out of range")
        })
    };
    let (precision, scale) = match syntax.numbers().as_slice() {
        [] => (None, None),
        [p] => (Some(narrow(*p)?), Some(0)),
        [p, s] => (Some(narrow(*p)?), Some(narrow(*s)?)),
        _ => {
            return Err(RelqError::type_mapping(
                raw,
                mapper.dialect(),
                "too many decimal parameters",
            ));
        }
    };
    Ok(TypeKind::Decimal { precision, scale })
}

/// `DECIMAL(p, s)` spelling shared by every dialect.
fn decimal_string(name: &str, precision: Option<u8>, scale: Option<u8>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) => format!("{}({}, {})", name, p, s),
        (Some(p), None) => format!("{}({})", name, p),
        _ => name.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn round_trip_failures(mapper: &dyn TypeMapper) -> Vec<String> {
    let mut failures = Vec::new();
    for ty in DataType::primitives() {
        for nullable in [true, false] {
            let ty = ty.clone().with_nullable(nullable);
            let Ok(text) = mapper.to_string(&ty) else {
                continue;
            };
            match mapper.from_string(&text, nullable) {
                Ok(back) if back == ty => {}
                Ok(back) => failures.push(format!("{} -> {} -> {}", ty, text, back)),
                Err(e) => failures.push(format!("{} -> {} -> {}", ty, text, e)),
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_columns() {
        let schema = schema_from_columns(
            &PostgresTypes,
            [("id", "bigint", false), ("name", "character varying(20)", true)],
        )
        .unwrap();
        assert_eq!(schema.get("id"), Some(&DataType::int64().not_null()));
        assert_eq!(schema.get("name"), Some(&DataType::string()));
    }

    #[test]
    fn test_schema_from_columns_duplicate() {
        let columns = [("a", "INTEGER", true), ("a", "VARCHAR", true)];
        let err = schema_from_columns(&DuckDbTypes, columns).unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'a'"));
    }

    #[test]
    fn test_unparseable_type_string() {
        let err = SqliteTypes.from_string("DECIMAL(10", true).unwrap_err();
        assert!(matches!(err, RelqError::TypeMapping { .. }));
    }
}
