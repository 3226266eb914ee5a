//! PostgreSQL type names, including the PostGIS geometry family.

use super::{TypeMapper, TypeParam, TypeSyntax, decimal_args, decimal_string};
use crate::ast::{DataType, GeoKind, IntervalUnit, TimeUnit, TypeKind};
use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};

pub struct PostgresTypes;

impl PostgresTypes {
    /// Fractional-second precision to unit. Postgres keeps at most microseconds.
    fn unit(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TimeUnit> {
        match syntax.numbers().as_slice() {
            [] => Ok(TimeUnit::Microsecond),
            [0] => Ok(TimeUnit::Second),
            [1..=3] => Ok(TimeUnit::Millisecond),
            [4..=6] => Ok(TimeUnit::Microsecond),
            _ => Err(RelqError::type_mapping(
                raw,
                self.dialect(),
                "timestamp precision must be between 0 and 6",
            )),
        }
    }

    fn geo_kind(&self, syntax: &TypeSyntax, default: GeoKind, raw: &str) -> RelqResult<GeoKind> {
        match syntax.params().first() {
            None | Some(TypeParam::Number(_)) => Ok(default),
            Some(TypeParam::Type(TypeSyntax::Named { name, .. })) => {
                // GEOMETRY(POINTZ, 4326) and friends drop the dimension suffix
                let base = name.trim_end_matches(['Z', 'M']);
                GeoKind::from_name(base).ok_or_else(|| {
                    RelqError::type_mapping(raw, self.dialect(), "unknown geometry subtype")
                })
            }
            Some(_) => Err(RelqError::type_mapping(
                raw,
                self.dialect(),
                "unknown geometry subtype",
            )),
        }
    }
}

impl TypeMapper for PostgresTypes {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn to_string(&self, ty: &DataType) -> RelqResult<String> {
        let unsupported = || RelqError::backend_type(ty, self.dialect());
        let s = match &ty.kind {
            TypeKind::Boolean => "BOOLEAN".to_string(),
            TypeKind::Int16 => "SMALLINT".to_string(),
            TypeKind::Int32 => "INTEGER".to_string(),
            TypeKind::Int64 => "BIGINT".to_string(),
            TypeKind::Float32 => "REAL".to_string(),
            TypeKind::Float64 => "DOUBLE PRECISION".to_string(),
            TypeKind::Decimal { precision, scale } => decimal_string("NUMERIC", *precision, *scale),
            TypeKind::String => "TEXT".to_string(),
            TypeKind::Binary => "BYTEA".to_string(),
            TypeKind::Date => "DATE".to_string(),
            TypeKind::Time => "TIME".to_string(),
            TypeKind::Timestamp { unit, timezone } => {
                let base = if timezone.is_some() { "TIMESTAMPTZ" } else { "TIMESTAMP" };
                match unit {
                    TimeUnit::Second => format!("{}(0)", base),
                    TimeUnit::Millisecond => format!("{}(3)", base),
                    TimeUnit::Microsecond => base.to_string(),
                    TimeUnit::Nanosecond => return Err(unsupported()),
                }
            }
            TypeKind::Interval(_) => "INTERVAL".to_string(),
            TypeKind::Array(elem) => format!("{}[]", self.to_string(elem)?),
            TypeKind::Map(k, v) if k.is_string() && v.is_string() => "HSTORE".to_string(),
            TypeKind::Geospatial(GeoKind::Geometry) => "GEOMETRY".to_string(),
            TypeKind::Geospatial(GeoKind::Geography) => "GEOGRAPHY".to_string(),
            TypeKind::Geospatial(kind) => format!("GEOMETRY({})", kind.name().to_ascii_uppercase()),
            TypeKind::Uuid => "UUID".to_string(),
            TypeKind::Json => "JSONB".to_string(),
            TypeKind::Unknown(raw) => raw.clone(),
            TypeKind::Null
            | TypeKind::Int8
            | TypeKind::UInt8
            | TypeKind::UInt16
            | TypeKind::UInt32
            | TypeKind::UInt64
            | TypeKind::Map(..)
            | TypeKind::Struct(_) => return Err(unsupported()),
        };
        Ok(s)
    }

    fn from_syntax(&self, syntax: &TypeSyntax, raw: &str) -> RelqResult<TypeKind> {
        let name = match syntax {
            TypeSyntax::Array(elem) => {
                return Ok(TypeKind::Array(Box::new(self.nested(elem, raw)?)));
            }
            TypeSyntax::Struct(_) => {
                return Err(RelqError::type_mapping(
                    raw,
                    self.dialect(),
                    "anonymous row types are not supported",
                ));
            }
            TypeSyntax::Named { name, .. } => name.as_str(),
        };

        let kind = match name {
            "BOOLEAN" | "BOOL" => TypeKind::Boolean,
            "SMALLINT" | "INT2" | "SMALLSERIAL" => TypeKind::Int16,
            "INTEGER" | "INT" | "INT4" | "SERIAL" => TypeKind::Int32,
            "BIGINT" | "INT8" | "BIGSERIAL" => TypeKind::Int64,
            "REAL" | "FLOAT4" => TypeKind::Float32,
            "DOUBLE PRECISION" | "FLOAT8" => TypeKind::Float64,
            "NUMERIC" | "DECIMAL" => decimal_args(self, syntax, raw)?,
            "TEXT" | "VARCHAR" | "CHARACTER VARYING" | "CHAR" | "CHARACTER" | "BPCHAR" | "NAME"
            | "CITEXT" | "INET" | "CIDR" | "MACADDR" => TypeKind::String,
            "BYTEA" => TypeKind::Binary,
            "DATE" => TypeKind::Date,
            "TIME" | "TIME WITHOUT TIME ZONE" => TypeKind::Time,
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => TypeKind::Timestamp {
                unit: self.unit(syntax, raw)?,
                timezone: None,
            },
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => TypeKind::Timestamp {
                unit: self.unit(syntax, raw)?,
                timezone: Some("UTC".to_string()),
            },
            "INTERVAL" => TypeKind::Interval(IntervalUnit::Microsecond),
            "UUID" => TypeKind::Uuid,
            "JSON" | "JSONB" => TypeKind::Json,
            "HSTORE" => TypeKind::Map(Box::new(DataType::string()), Box::new(DataType::string())),
            "GEOMETRY" => TypeKind::Geospatial(self.geo_kind(syntax, GeoKind::Geometry, raw)?),
            "GEOGRAPHY" => TypeKind::Geospatial(GeoKind::Geography),
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
        assert_eq!(round_trip_failures(&PostgresTypes), Vec::<String>::new());
    }

    #[test]
    fn test_timestamp_precision() {
        let t = PostgresTypes
            .from_string("timestamp(3) with time zone", true)
            .unwrap();
        assert_eq!(t, DataType::timestamp_tz(TimeUnit::Millisecond, "UTC"));

        let t = PostgresTypes.from_string("timestamp(5)", true).unwrap();
        assert_eq!(t, DataType::timestamp());

        let err = PostgresTypes.from_string("timestamp(9)", true).unwrap_err();
        assert!(matches!(err, RelqError::TypeMapping { .. }));
    }

    #[test]
    fn test_postgis_and_hstore() {
        let t = PostgresTypes.from_string("geometry(PointZ,4326)", true).unwrap();
        assert_eq!(t.kind, TypeKind::Geospatial(GeoKind::Point));
        assert_eq!(PostgresTypes.to_string(&t).unwrap(), "GEOMETRY(POINT)");

        let t = PostgresTypes.from_string("hstore", true).unwrap();
        assert_eq!(t, DataType::map(DataType::string(), DataType::string()));
    }

    #[test]
    fn test_unsupported_backend_types() {
        for ty in [DataType::int8(), DataType::new(TypeKind::UInt32)] {
            assert!(matches!(
                PostgresTypes.to_string(&ty),
                Err(RelqError::UnsupportedBackendType { .. })
            ));
        }
    }

    #[test]
    fn test_arrays() {
        let t = PostgresTypes.from_string("integer[]", true).unwrap();
        assert_eq!(t, DataType::array(DataType::int32()));
        assert_eq!(PostgresTypes.to_string(&t).unwrap(), "INTEGER[]");
    }
}
