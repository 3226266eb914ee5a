//! Impala (Hive metastore) type names.

use super::{TypeMapper, TypeSyntax, decimal_args, decimal_string, type_args};
use crate::ast::{DataType, TimeUnit, TypeKind};
use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};
use crate::transpiler::escape_identifier_with;

pub struct ImpalaTypes;

impl TypeMapper for ImpalaTypes {
    fn dialect(&self) -> Dialect {
        Dialect::Impala
    }

    fn to_string(&self, ty: &DataType) -> RelqResult<String> {
        let s = match &ty.kind {
            TypeKind::Boolean => "BOOLEAN".to_string(),
            TypeKind::Int8 => "TINYINT".to_string(),
            TypeKind::Int16 => "SMALLINT".to_string(),
            TypeKind::Int32 => "INT".to_string(),
            TypeKind::Int64 => "BIGINT".to_string(),
            TypeKind::Float32 => "FLOAT".to_string(),
            TypeKind::Float64 => "DOUBLE".to_string(),
            TypeKind::Decimal { precision, scale } => decimal_string("DECIMAL", *precision, *scale),
            TypeKind::String => "STRING".to_string(),
            TypeKind::Binary => "BINARY".to_string(),
            TypeKind::Date => "DATE".to_string(),
            TypeKind::Timestamp {
                unit: TimeUnit::Microsecond,
                timezone: None,
            } => "TIMESTAMP".to_string(),
            TypeKind::Array(elem) => format!("ARRAY<{}>", self.to_string(elem)?),
            TypeKind::Map(k, v) => format!("MAP<{},{}>", self.to_string(k)?, self.to_string(v)?),
            TypeKind::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| {
                        Ok(format!("{}:{}", escape_identifier_with(name, '`'), self.to_string(t)?))
                    })
                    .collect::<RelqResult<Vec<_>>>()?;
                format!("STRUCT<{}>", fields.join(","))
            }
            TypeKind::Unknown(raw) => raw.clone(),
            _ => return Err(RelqError::backend_type(ty, self.dialect())),
        };
        Ok(s)
    }

    fn from_syntax(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TypeKind> {
        let name = match syntax {
            TypeSyntax::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| Ok((name.clone(), self.nested(t, raw)?)))
                    .collect::<RelqResult<Vec<_>>>()?;
                return Ok(TypeKind::Struct(fields));
            }
            TypeSyntax::Array(_) => {
                return Err(RelqError::type_mapping(raw, self.dialect(), "use ARRAY<T> for arrays"));
            }
            TypeSyntax::Named { name, .. } => name.as_str(),
        };

        let kind = match name {
            "BOOLEAN" => TypeKind::Boolean,
            "TINYINT" => TypeKind::Int8,
            "SMALLINT" => TypeKind::Int16,
            "INT" | "INTEGER" => TypeKind::Int32,
            "BIGINT" => TypeKind::Int64,
            "FLOAT" => TypeKind::Float32,
            "DOUBLE" | "REAL" => TypeKind::Float64,
            "DECIMAL" => decimal_args(self, syntax, raw)?,
            "STRING" | "VARCHAR" | "CHAR" => TypeKind::String,
            "BINARY" => TypeKind::Binary,
            "DATE" => TypeKind::Date,
            "TIMESTAMP" => TypeKind::Timestamp {
                unit: TimeUnit::Microsecond,
                timezone: None,
            },
            "ARRAY" => {
                let mut args = type_args(self, syntax, 1, raw)?;
                match args.pop() {
                    Some(elem) => TypeKind::Array(Box::new(elem)),
                    None => return Err(self.unknown_name(raw)),
                }
            }
            "MAP" => {
                let mut args = type_args(self, syntax, 2, raw)?;
                let value = args.pop();
                let key = args.pop();
                match (key, value) {
                    (Some(k), Some(v)) => TypeKind::Map(Box::new(k), Box::new(v)),
                    _ => return Err(self.unknown_name(raw)),
                }
            }
            _ => return Err(self.unknown_name(raw)),
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::round_trip_failures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        assert_eq!(round_trip_failures(&ImpalaTypes), Vec::<String>::new());
    }

    #[test]
    fn test_complex_types() {
        let t = ImpalaTypes
            .from_string("MAP<STRING,ARRAY<STRUCT<a:INT,b:DECIMAL(9,2)>>>", true)
            .unwrap();
        assert_eq!(
            ImpalaTypes.to_string(&t).unwrap(),
            "MAP<STRING,ARRAY<STRUCT<a:INT,b:DECIMAL(9, 2)>>>"
        );
    }

    #[test]
    fn test_varchar_is_string() {
        assert_eq!(
            ImpalaTypes.from_string("VARCHAR(20)", false).unwrap(),
            DataType::string().not_null()
        );
    }

    #[test]
    fn test_unsupported() {
        for ty in [DataType::time(), DataType::uuid(), DataType::json()] {
            assert!(matches!(
                ImpalaTypes.to_string(&ty),
                Err(RelqError::UnsupportedBackendType { .. })
            ));
        }
    }
}
