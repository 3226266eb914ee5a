//! Logical data types shared by every dialect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution of a timestamp value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Millisecond,
    #[default]
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    pub fn short(&self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Microsecond => "us",
            TimeUnit::Nanosecond => "ns",
        }
    }

    /// Number of fractional second digits (`TIMESTAMP(p)`).
    pub fn precision(&self) -> u8 {
        match self {
            TimeUnit::Second => 0,
            TimeUnit::Millisecond => 3,
            TimeUnit::Microsecond => 6,
            TimeUnit::Nanosecond => 9,
        }
    }

    pub fn from_precision(p: u32) -> Option<Self> {
        match p {
            0 => Some(TimeUnit::Second),
            3 => Some(TimeUnit::Millisecond),
            6 => Some(TimeUnit::Microsecond),
            9 => Some(TimeUnit::Nanosecond),
            _ => None,
        }
    }
}

/// Unit of an interval or of a temporal truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl IntervalUnit {
    /// Compact unit code (`Y`, `Q`, `M`, `W`, `D`, `h`, `m`, `s`, `ms`, `us`, `ns`).
    pub fn short(&self) -> &'static str {
        match self {
            IntervalUnit::Year => "Y",
            IntervalUnit::Quarter => "Q",
            IntervalUnit::Month => "M",
            IntervalUnit::Week => "W",
            IntervalUnit::Day => "D",
            IntervalUnit::Hour => "h",
            IntervalUnit::Minute => "m",
            IntervalUnit::Second => "s",
            IntervalUnit::Millisecond => "ms",
            IntervalUnit::Microsecond => "us",
            IntervalUnit::Nanosecond => "ns",
        }
    }

    /// SQL keyword for the unit.
    pub fn sql_name(&self) -> &'static str {
        match self {
            IntervalUnit::Year => "YEAR",
            IntervalUnit::Quarter => "QUARTER",
            IntervalUnit::Month => "MONTH",
            IntervalUnit::Week => "WEEK",
            IntervalUnit::Day => "DAY",
            IntervalUnit::Hour => "HOUR",
            IntervalUnit::Minute => "MINUTE",
            IntervalUnit::Second => "SECOND",
            IntervalUnit::Millisecond => "MILLISECOND",
            IntervalUnit::Microsecond => "MICROSECOND",
            IntervalUnit::Nanosecond => "NANOSECOND",
        }
    }

    pub fn is_date_unit(&self) -> bool {
        matches!(
            self,
            IntervalUnit::Year
                | IntervalUnit::Quarter
                | IntervalUnit::Month
                | IntervalUnit::Week
                | IntervalUnit::Day
        )
    }
}

impl From<TimeUnit> for IntervalUnit {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Second => IntervalUnit::Second,
            TimeUnit::Millisecond => IntervalUnit::Millisecond,
            TimeUnit::Microsecond => IntervalUnit::Microsecond,
            TimeUnit::Nanosecond => IntervalUnit::Nanosecond,
        }
    }
}

/// Geospatial subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoKind {
    Geometry,
    Geography,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeoKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeoKind::Geometry => "geometry",
            GeoKind::Geography => "geography",
            GeoKind::Point => "point",
            GeoKind::LineString => "linestring",
            GeoKind::Polygon => "polygon",
            GeoKind::MultiPoint => "multipoint",
            GeoKind::MultiLineString => "multilinestring",
            GeoKind::MultiPolygon => "multipolygon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "geometry" => GeoKind::Geometry,
            "geography" => GeoKind::Geography,
            "point" => GeoKind::Point,
            "linestring" => GeoKind::LineString,
            "polygon" => GeoKind::Polygon,
            "multipoint" => GeoKind::MultiPoint,
            "multilinestring" => GeoKind::MultiLineString,
            "multipolygon" => GeoKind::MultiPolygon,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Float32,
    Float64,
    Decimal {
        precision: Option<u8>,
        scale: Option<u8>,
    },
    String,
    Binary,
    Date,
    Time,
    Timestamp {
        #[serde(default)]
        unit: TimeUnit,
        #[serde(default)]
        timezone: Option<String>,
    },
    Interval(IntervalUnit),
    Array(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Struct(Vec<(String, DataType)>),
    Geospatial(GeoKind),
    Uuid,
    Json,
    /// Best-effort catch-all for backend extension types, keeps the raw name.
    Unknown(String),
}

/// A logical type plus the nullability of this occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub kind: TypeKind,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl DataType {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    pub fn null() -> Self {
        Self::new(TypeKind::Null)
    }
    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }
    pub fn int8() -> Self {
        Self::new(TypeKind::Int8)
    }
    pub fn int16() -> Self {
        Self::new(TypeKind::Int16)
    }
    pub fn int32() -> Self {
        Self::new(TypeKind::Int32)
    }
    pub fn int64() -> Self {
        Self::new(TypeKind::Int64)
    }
    pub fn float32() -> Self {
        Self::new(TypeKind::Float32)
    }
    pub fn float64() -> Self {
        Self::new(TypeKind::Float64)
    }
    pub fn decimal(precision: u8, scale: u8) -> Self {
        Self::new(TypeKind::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        })
    }
    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }
    pub fn binary() -> Self {
        Self::new(TypeKind::Binary)
    }
    pub fn date() -> Self {
        Self::new(TypeKind::Date)
    }
    pub fn time() -> Self {
        Self::new(TypeKind::Time)
    }
    pub fn timestamp() -> Self {
        Self::new(TypeKind::Timestamp {
            unit: TimeUnit::Microsecond,
            timezone: None,
        })
    }
    pub fn timestamp_tz(unit: TimeUnit, timezone: impl Into<String>) -> Self {
        Self::new(TypeKind::Timestamp {
            unit,
            timezone: Some(timezone.into()),
        })
    }
    pub fn interval(unit: IntervalUnit) -> Self {
        Self::new(TypeKind::Interval(unit))
    }
    pub fn array(elem: DataType) -> Self {
        Self::new(TypeKind::Array(Box::new(elem)))
    }
    pub fn map(key: DataType, value: DataType) -> Self {
        Self::new(TypeKind::Map(Box::new(key), Box::new(value)))
    }
    pub fn uuid() -> Self {
        Self::new(TypeKind::Uuid)
    }
    pub fn json() -> Self {
        Self::new(TypeKind::Json)
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn not_null(self) -> Self {
        self.with_nullable(false)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, TypeKind::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, TypeKind::Boolean)
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Int8 | TypeKind::Int16 | TypeKind::Int32 | TypeKind::Int64
        )
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::UInt8 | TypeKind::UInt16 | TypeKind::UInt32 | TypeKind::UInt64
        )
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.kind, TypeKind::Float32 | TypeKind::Float64)
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self.kind, TypeKind::Decimal { .. })
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating() || self.is_decimal()
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::String)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.kind, TypeKind::Binary)
    }

    pub fn is_date(&self) -> bool {
        matches!(self.kind, TypeKind::Date)
    }

    pub fn is_time(&self) -> bool {
        matches!(self.kind, TypeKind::Time)
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self.kind, TypeKind::Timestamp { .. })
    }

    pub fn is_temporal(&self) -> bool {
        self.is_date() || self.is_time() || self.is_timestamp()
    }

    pub fn is_interval(&self) -> bool {
        matches!(self.kind, TypeKind::Interval(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, TypeKind::Map(..))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    pub fn is_nested(&self) -> bool {
        self.is_array() || self.is_map() || self.is_struct()
    }

    pub fn is_geospatial(&self) -> bool {
        matches!(self.kind, TypeKind::Geospatial(_))
    }

    pub fn is_uuid(&self) -> bool {
        matches!(self.kind, TypeKind::Uuid)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.kind, TypeKind::Json)
    }

    /// Element type of an array, if this is one.
    pub fn element(&self) -> Option<&DataType> {
        match &self.kind {
            TypeKind::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Width in bits of integer and floating types.
    pub fn bit_width(&self) -> Option<u8> {
        let width = match self.kind {
            TypeKind::Int8 | TypeKind::UInt8 => 8,
            TypeKind::Int16 | TypeKind::UInt16 => 16,
            TypeKind::Int32 | TypeKind::UInt32 | TypeKind::Float32 => 32,
            TypeKind::Int64 | TypeKind::UInt64 | TypeKind::Float64 => 64,
            _ => return None,
        };
        Some(width)
    }

    /// Types compare equal ignoring nullability.
    pub fn same_kind(&self, other: &DataType) -> bool {
        self.kind == other.kind
    }

    /// Common numeric type of two operands, `None` when either is not numeric.
    pub fn promote(left: &DataType, right: &DataType) -> Option<DataType> {
        let nullable = left.nullable || right.nullable;
        if left.is_null() {
            return Some(right.clone().with_nullable(true));
        }
        if right.is_null() {
            return Some(left.clone().with_nullable(true));
        }
        if !left.is_numeric() || !right.is_numeric() {
            return None;
        }
        let kind = if left.is_floating() || right.is_floating() {
            if matches!(left.kind, TypeKind::Float32) && matches!(right.kind, TypeKind::Float32) {
                TypeKind::Float32
            } else {
                TypeKind::Float64
            }
        } else if left.is_decimal() || right.is_decimal() {
            match (&left.kind, &right.kind) {
                (
                    TypeKind::Decimal {
                        precision: p1,
                        scale: s1,
                    },
                    TypeKind::Decimal {
                        precision: p2,
                        scale: s2,
                    },
                ) => TypeKind::Decimal {
                    precision: p1.max(p2).to_owned(),
                    scale: s1.max(s2).to_owned(),
                },
                (TypeKind::Decimal { .. }, _) => left.kind.clone(),
                _ => right.kind.clone(),
            }
        } else {
            let width = left.bit_width()?.max(right.bit_width()?);
            let unsigned = left.is_unsigned_integer() && right.is_unsigned_integer();
            match (width, unsigned) {
                (8, true) => TypeKind::UInt8,
                (16, true) => TypeKind::UInt16,
                (32, true) => TypeKind::UInt32,
                (_, true) => TypeKind::UInt64,
                (8, false) => TypeKind::Int8,
                (16, false) => TypeKind::Int16,
                (32, false) => TypeKind::Int32,
                _ => TypeKind::Int64,
            }
        };
        Some(DataType { kind, nullable })
    }

    /// Primitive (non-parametric, non-nested) types exercised by mapper round trips.
    pub fn primitives() -> Vec<DataType> {
        vec![
            DataType::boolean(),
            DataType::int8(),
            DataType::int16(),
            DataType::int32(),
            DataType::int64(),
            DataType::new(TypeKind::UInt8),
            DataType::new(TypeKind::UInt16),
            DataType::new(TypeKind::UInt32),
            DataType::new(TypeKind::UInt64),
            DataType::float32(),
            DataType::float64(),
            DataType::decimal(10, 2),
            DataType::decimal(38, 9),
            DataType::string(),
            DataType::binary(),
            DataType::date(),
            DataType::time(),
            DataType::timestamp(),
            DataType::new(TypeKind::Timestamp {
                unit: TimeUnit::Second,
                timezone: None,
            }),
            DataType::new(TypeKind::Timestamp {
                unit: TimeUnit::Millisecond,
                timezone: None,
            }),
            DataType::new(TypeKind::Timestamp {
                unit: TimeUnit::Nanosecond,
                timezone: None,
            }),
            DataType::timestamp_tz(TimeUnit::Microsecond, "UTC"),
            DataType::uuid(),
            DataType::json(),
        ]
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Null => write!(f, "null"),
            TypeKind::Boolean => write!(f, "boolean"),
            TypeKind::Int8 => write!(f, "int8"),
            TypeKind::Int16 => write!(f, "int16"),
            TypeKind::Int32 => write!(f, "int32"),
            TypeKind::Int64 => write!(f, "int64"),
            TypeKind::UInt8 => write!(f, "uint8"),
            TypeKind::UInt16 => write!(f, "uint16"),
            TypeKind::UInt32 => write!(f, "uint32"),
            TypeKind::UInt64 => write!(f, "uint64"),
            TypeKind::Float32 => write!(f, "float32"),
            TypeKind::Float64 => write!(f, "float64"),
            TypeKind::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "decimal({}, {})", p, s),
                (Some(p), None) => write!(f, "decimal({})", p),
                _ => write!(f, "decimal"),
            },
            TypeKind::String => write!(f, "string"),
            TypeKind::Binary => write!(f, "binary"),
            TypeKind::Date => write!(f, "date"),
            TypeKind::Time => write!(f, "time"),
            TypeKind::Timestamp { unit, timezone } => match timezone {
                Some(tz) => write!(f, "timestamp({}, '{}')", unit.short(), tz),
                None => write!(f, "timestamp({})", unit.short()),
            },
            TypeKind::Interval(unit) => write!(f, "interval('{}')", unit.short()),
            TypeKind::Array(elem) => write!(f, "array<{}>", elem),
            TypeKind::Map(k, v) => write!(f, "map<{}, {}>", k, v),
            TypeKind::Struct(fields) => {
                write!(f, "struct<")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, ">")
            }
            TypeKind::Geospatial(kind) => write!(f, "{}", kind.name()),
            TypeKind::Uuid => write!(f, "uuid"),
            TypeKind::Json => write!(f, "json"),
            TypeKind::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.nullable {
            write!(f, "!")?;
        }
        write!(f, "{}", self.kind)
    }
}
