//! SQLite declared types.
//!
//! SQLite accepts any declared type name. Names outside the table below are
//! resolved with SQLite's column affinity rules when they name one of its
//! storage classes. SQLite gives every other name NUMERIC affinity; here
//! that fallback only covers names that spell a number (`NUMBER`,
//! `DEC...`), and anything else is a mapping error.

use super::{TypeMapper, TypeSyntax, decimal_args, decimal_string};
use crate::ast::{DataType, TimeUnit, TypeKind};
use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};

pub struct SqliteTypes;

/// Affinity of an unrecognized declared type, `None` when the name says
/// nothing about its storage class.
fn affinity(name: &str) -> Option<TypeKind> {
    let kind = if name.contains("INT") {
        TypeKind::Int64
    } else if name.contains("CHAR") || name.contains("CLOB") || name.contains("TEXT") {
        TypeKind::String
    } else if name.contains("BLOB") {
        TypeKind::Binary
    } else if name.contains("REAL") || name.contains("FLOA") || name.contains("DOUB") {
        TypeKind::Float64
    } else if name.contains("NUM") || name.starts_with("DEC") {
        TypeKind::Decimal {
            precision: None,
            scale: None,
        }
    } else {
        return None;
    };
    Some(kind)
}

impl TypeMapper for SqliteTypes {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn to_string(&self, ty: &DataType) -> RelqResult<String> {
        let s = match &ty.kind {
            TypeKind::Null => "NULL".to_string(),
            TypeKind::Boolean => "BOOLEAN".to_string(),
            TypeKind::Int8 => "TINYINT".to_string(),
            TypeKind::Int16 => "SMALLINT".to_string(),
            TypeKind::Int32 => "INT".to_string(),
            TypeKind::Int64 => "BIGINT".to_string(),
            TypeKind::Float32 => "FLOAT".to_string(),
            TypeKind::Float64 => "DOUBLE".to_string(),
            TypeKind::Decimal { precision, scale } => decimal_string("NUMERIC", *precision, *scale),
            TypeKind::String => "TEXT".to_string(),
            TypeKind::Binary => "BLOB".to_string(),
            TypeKind::Date => "DATE".to_string(),
            TypeKind::Time => "TIME".to_string(),
            TypeKind::Timestamp {
                unit: TimeUnit::Microsecond,
                timezone: None,
            } => "TIMESTAMP".to_string(),
            TypeKind::Json => "JSON".to_string(),
            TypeKind::Unknown(raw) => raw.clone(),
            _ => return Err(RelqError::backend_type(ty, self.dialect())),
        };
        Ok(s)
    }

    fn from_syntax(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TypeKind> {
        let TypeSyntax::Named { name, .. } = syntax else {
            return Err(RelqError::type_mapping(
                raw,
                self.dialect(),
                "nested types are not supported",
            ));
        };

        let kind = match name.as_str() {
            "NULL" => TypeKind::Null,
            "BOOLEAN" | "BOOL" => TypeKind::Boolean,
            "TINYINT" => TypeKind::Int8,
            "SMALLINT" => TypeKind::Int16,
            "INT" | "MEDIUMINT" => TypeKind::Int32,
            "INTEGER" | "BIGINT" => TypeKind::Int64,
            "FLOAT" => TypeKind::Float32,
            "DOUBLE" | "DOUBLE PRECISION" | "REAL" => TypeKind::Float64,
            "NUMERIC" | "DECIMAL" => decimal_args(self, syntax, raw)?,
            "TEXT" => TypeKind::String,
            "BLOB" => TypeKind::Binary,
            "DATE" => TypeKind::Date,
            "TIME" => TypeKind::Time,
            "TIMESTAMP" | "DATETIME" => TypeKind::Timestamp {
                unit: TimeUnit::Microsecond,
                timezone: None,
            },
            "JSON" => TypeKind::Json,
            other => affinity(other).ok_or_else(|| self.unknown_name(raw))?,
        };
        Ok(kind)
    }
}
