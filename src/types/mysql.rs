//! MySQL type names.

use super::{TypeMapper, TypeSyntax, decimal_args, decimal_string};
use crate::ast::{DataType, GeoKind, TimeUnit, TypeKind};
use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};

pub struct MySqlTypes;

impl MySqlTypes {
    fn unit(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TimeUnit> {
        match syntax.numbers().as_slice() {
            [] | [0] => Ok(TimeUnit::Second),
            [1..=3] => Ok(TimeUnit::Millisecond),
            [4..=6] => Ok(TimeUnit::Microsecond),
            _ => Err(RelqError::type_mapping(
                raw,
                self.dialect(),
                "fractional seconds precision must be between 0 and 6",
            )),
        }
    }
}

impl TypeMapper for MySqlTypes {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn to_string(&self, ty: &DataType) -> RelqResult<String> {
        let unsupported = || RelqError::backend_type(ty, self.dialect());
        let s = match &ty.kind {
            TypeKind::Boolean => "BOOLEAN".to_string(),
            TypeKind::Int8 => "TINYINT".to_string(),
            TypeKind::Int16 => "SMALLINT".to_string(),
            TypeKind::Int32 => "INT".to_string(),
            TypeKind::Int64 => "BIGINT".to_string(),
            TypeKind::UInt8 => "TINYINT UNSIGNED".to_string(),
            TypeKind::UInt16 => "SMALLINT UNSIGNED".to_string(),
            TypeKind::UInt32 => "INT UNSIGNED".to_string(),
            TypeKind::UInt64 => "BIGINT UNSIGNED".to_string(),
            TypeKind::Float32 => "FLOAT".to_string(),
            TypeKind::Float64 => "DOUBLE".to_string(),
            TypeKind::Decimal { precision, scale } => decimal_string("DECIMAL", *precision, *scale),
            TypeKind::String => "TEXT".to_string(),
            TypeKind::Binary => "BLOB".to_string(),
            TypeKind::Date => "DATE".to_string(),
            TypeKind::Time => "TIME".to_string(),
            TypeKind::Timestamp { unit, timezone } => {
                // TIMESTAMP columns are stored as UTC, DATETIME carries no zone
                let base = if timezone.is_some() { "TIMESTAMP" } else { "DATETIME" };
                match unit {
                    TimeUnit::Second => base.to_string(),
                    TimeUnit::Millisecond => format!("{}(3)", base),
                    TimeUnit::Microsecond => format!("{}(6)", base),
                    TimeUnit::Nanosecond => return Err(unsupported()),
                }
            }
            TypeKind::Geospatial(GeoKind::Geography) => return Err(unsupported()),
            TypeKind::Geospatial(kind) => kind.name().to_ascii_uppercase(),
            TypeKind::Json => "JSON".to_string(),
            TypeKind::Unknown(raw) => raw.clone(),
            TypeKind::Null
            | TypeKind::Interval(_)
            | TypeKind::Array(_)
            | TypeKind::Map(..)
            | TypeKind::Struct(_)
            | TypeKind::Uuid => return Err(unsupported()),
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
        let name = name.trim_end_matches(" ZEROFILL");

        let kind = match name {
            "BOOLEAN" | "BOOL" => TypeKind::Boolean,
            "TINYINT" if syntax.numbers() == [1] => TypeKind::Boolean,
            "BIT" if syntax.numbers().as_slice() == [1] || syntax.params().is_empty() => {
                TypeKind::Boolean
            }
            "BIT" => TypeKind::Int64,
            "TINYINT" => TypeKind::Int8,
            "SMALLINT" | "YEAR" => TypeKind::Int16,
            "MEDIUMINT" | "INT" | "INTEGER" => TypeKind::Int32,
            "BIGINT" => TypeKind::Int64,
            "TINYINT UNSIGNED" => TypeKind::UInt8,
            "SMALLINT UNSIGNED" => TypeKind::UInt16,
            "MEDIUMINT UNSIGNED" | "INT UNSIGNED" | "INTEGER UNSIGNED" => TypeKind::UInt32,
            "BIGINT UNSIGNED" => TypeKind::UInt64,
            "FLOAT" => TypeKind::Float32,
            "DOUBLE" | "DOUBLE PRECISION" | "REAL" => TypeKind::Float64,
            "DECIMAL" | "NUMERIC" | "DEC" | "FIXED" => decimal_args(self, syntax, raw)?,
            "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" => TypeKind::String,
            "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                TypeKind::Binary
            }
            "DATE" => TypeKind::Date,
            "TIME" => TypeKind::Time,
            "DATETIME" => TypeKind::Timestamp {
                unit: self.unit(syntax, raw)?,
                timezone: None,
            },
            "TIMESTAMP" => TypeKind::Timestamp {
                unit: self.unit(syntax, raw)?,
                timezone: Some("UTC".to_string()),
            },
            "JSON" => TypeKind::Json,
            other => match GeoKind::from_name(other) {
                Some(kind) if kind != GeoKind::Geography => TypeKind::Geospatial(kind),
                _ => return Err(self.unknown_name(raw)),
            },
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
        assert_eq!(round_trip_failures(&MySqlTypes), Vec::<String>::new());
    }

    #[test]
    fn test_tinyint_one_is_boolean() {
        assert_eq!(
            MySqlTypes.from_string("tinyint(1)", true).unwrap(),
            DataType::boolean()
        );
        assert_eq!(
            MySqlTypes.from_string("tinyint(4)", true).unwrap(),
            DataType::int8()
        );
    }

    #[test]
    fn test_unsigned_display_width() {
        assert_eq!(
            MySqlTypes.from_string("int(10) unsigned", false).unwrap(),
            DataType::new(TypeKind::UInt32).not_null()
        );
    }

    #[test]
    fn test_datetime_vs_timestamp() {
        assert_eq!(
            MySqlTypes.from_string("datetime(6)", true).unwrap(),
            DataType::timestamp()
        );
        assert_eq!(
            MySqlTypes.from_string("timestamp(6)", true).unwrap(),
            DataType::timestamp_tz(TimeUnit::Microsecond, "UTC")
        );
    }

    #[test]
    fn test_no_nested_types() {
        assert!(MySqlTypes.to_string(&DataType::array(DataType::int32())).is_err());
        assert!(MySqlTypes.to_string(&DataType::uuid()).is_err());
    }
}
