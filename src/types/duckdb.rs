//! DuckDB type names.

use super::{TypeMapper, TypeSyntax, decimal_args, decimal_string, type_args};
use crate::ast::{DataType, GeoKind, TimeUnit, TypeKind};
use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};
use crate::transpiler::escape_identifier;

pub struct DuckDbTypes;

impl TypeMapper for DuckDbTypes {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn to_string(&self, ty: &DataType) -> RelqResult<String> {
        let s = match &ty.kind {
            TypeKind::Null => "NULL".to_string(),
            TypeKind::Boolean => "BOOLEAN".to_string(),
            TypeKind::Int8 => "TINYINT".to_string(),
            TypeKind::Int16 => "SMALLINT".to_string(),
            TypeKind::Int32 => "INTEGER".to_string(),
            TypeKind::Int64 => "BIGINT".to_string(),
            TypeKind::UInt8 => "UTINYINT".to_string(),
            TypeKind::UInt16 => "USMALLINT".to_string(),
            TypeKind::UInt32 => "UINTEGER".to_string(),
            TypeKind::UInt64 => "UBIGINT".to_string(),
            TypeKind::Float32 => "FLOAT".to_string(),
            TypeKind::Float64 => "DOUBLE".to_string(),
            TypeKind::Decimal { precision, scale } => decimal_string("DECIMAL", *precision, *scale),
            TypeKind::String => "VARCHAR".to_string(),
            TypeKind::Binary => "BLOB".to_string(),
            TypeKind::Date => "DATE".to_string(),
            TypeKind::Time => "TIME".to_string(),
            TypeKind::Timestamp { unit, timezone } => match (unit, timezone) {
                (TimeUnit::Microsecond, Some(_)) => "TIMESTAMP WITH TIME ZONE".to_string(),
                (_, Some(_)) => return Err(RelqError::backend_type(ty, self.dialect())),
                (TimeUnit::Second, None) => "TIMESTAMP_S".to_string(),
                (TimeUnit::Millisecond, None) => "TIMESTAMP_MS".to_string(),
                (TimeUnit::Microsecond, None) => "TIMESTAMP".to_string(),
                (TimeUnit::Nanosecond, None) => "TIMESTAMP_NS".to_string(),
            },
            TypeKind::Interval(_) => "INTERVAL".to_string(),
            TypeKind::Array(elem) => format!("{}[]", self.to_string(elem)?),
            TypeKind::Map(k, v) => format!("MAP({}, {})", self.to_string(k)?, self.to_string(v)?),
            TypeKind::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| {
                        Ok(format!("{} {}", escape_identifier(name), self.to_string(t)?))
                    })
                    .collect::<RelqResult<Vec<_>>>()?;
                format!("STRUCT({})", fields.join(", "))
            }
            TypeKind::Geospatial(_) => "GEOMETRY".to_string(),
            TypeKind::Uuid => "UUID".to_string(),
            TypeKind::Json => "JSON".to_string(),
            TypeKind::Unknown(raw) => raw.clone(),
        };
        Ok(s)
    }

    fn from_syntax(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TypeKind> {
        let name = match syntax {
            TypeSyntax::Array(elem) => {
                return Ok(TypeKind::Array(Box::new(self.nested(elem, raw)?)));
            }
            TypeSyntax::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| Ok((name.clone(), self.nested(t, raw)?)))
                    .collect::<RelqResult<Vec<_>>>()?;
                return Ok(TypeKind::Struct(fields));
            }
            TypeSyntax::Named { name, .. } => name.as_str(),
        };

        let timestamp = |unit| TypeKind::Timestamp {
            unit,
            timezone: None,
        };
        let kind = match name {
            "NULL" => TypeKind::Null,
            "BOOLEAN" | "BOOL" | "LOGICAL" => TypeKind::Boolean,
            "TINYINT" | "INT1" => TypeKind::Int8,
            "SMALLINT" | "INT2" | "SHORT" => TypeKind::Int16,
            "INTEGER" | "INT" | "INT4" | "SIGNED" => TypeKind::Int32,
            "BIGINT" | "INT8" | "LONG" => TypeKind::Int64,
            "HUGEINT" => TypeKind::Decimal {
                precision: Some(38),
                scale: Some(0),
            },
            "UTINYINT" => TypeKind::UInt8,
            "USMALLINT" => TypeKind::UInt16,
            "UINTEGER" => TypeKind::UInt32,
            "UBIGINT" => TypeKind::UInt64,
            "FLOAT" | "FLOAT4" | "REAL" => TypeKind::Float32,
            "DOUBLE" | "FLOAT8" => TypeKind::Float64,
            "DECIMAL" | "NUMERIC" => decimal_args(self, syntax, raw)?,
            "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" | "ENUM" => TypeKind::String,
            "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => TypeKind::Binary,
            "DATE" => TypeKind::Date,
            "TIME" => TypeKind::Time,
            "TIMESTAMP" | "DATETIME" => timestamp(TimeUnit::Microsecond),
            "TIMESTAMP_S" => timestamp(TimeUnit::Second),
            "TIMESTAMP_MS" => timestamp(TimeUnit::Millisecond),
            "TIMESTAMP_NS" => timestamp(TimeUnit::Nanosecond),
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => TypeKind::Timestamp {
                unit: TimeUnit::Microsecond,
                timezone: Some("UTC".to_string()),
            },
            "INTERVAL" => TypeKind::Interval(crate::ast::IntervalUnit::Microsecond),
            "MAP" => {
                let mut args = type_args(self, syntax, 2, raw)?;
                let value = args.pop();
                let key = args.pop();
                match (key, value) {
                    (Some(k), Some(v)) => TypeKind::Map(Box::new(k), Box::new(v)),
                    _ => return Err(self.unknown_name(raw)),
                }
            }
            "UUID" => TypeKind::Uuid,
            "JSON" => TypeKind::Json,
            "GEOMETRY" | "WKB_BLOB" => TypeKind::Geospatial(GeoKind::Geometry),
            "POINT_2D" => TypeKind::Geospatial(GeoKind::Point),
            "LINESTRING_2D" => TypeKind::Geospatial(GeoKind::LineString),
            "POLYGON_2D" => TypeKind::Geospatial(GeoKind::Polygon),
            "BOX_2D" => TypeKind::Unknown(raw.to_string()),
            _ => return Err(self.unknown_name(raw)),
        };
        Ok(kind)
    }
}
