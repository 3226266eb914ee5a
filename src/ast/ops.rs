//! Operation kinds and their declared signatures.

use crate::ast::types::{DataType, IntervalUnit, TimeUnit, TypeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulus,
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Xor,
    Like,
    ILike,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::FloorDivide
                | BinaryOp::Modulus
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }

    /// Operator token in standard SQL, `None` for operators without one.
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulus => "%",
            BinaryOp::Equals => "=",
            BinaryOp::NotEquals => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Like => "LIKE",
            BinaryOp::ILike => "ILIKE",
            BinaryOp::FloorDivide | BinaryOp::Xor => return None,
        };
        Some(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    NotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
    Cross,
    Semi,
    Anti,
}

impl JoinKind {
    /// Whether the right side's columns are part of the output.
    pub fn keeps_right(&self) -> bool {
        !matches!(self, JoinKind::Semi | JoinKind::Anti)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMethod {
    Row,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Rows,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

/// Explicit window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowFrame {
    pub kind: FrameKind,
    pub start: FrameBound,
    pub end: FrameBound,
}

impl WindowFrame {
    /// The whole partition, which is what a window without a frame means.
    pub fn full() -> Self {
        Self {
            kind: FrameKind::Rows,
            start: FrameBound::UnboundedPreceding,
            end: FrameBound::UnboundedFollowing,
        }
    }

    pub fn is_full(&self) -> bool {
        self.start == FrameBound::UnboundedPreceding && self.end == FrameBound::UnboundedFollowing
    }
}

/// Scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Func {
    // strings
    StringLength,
    Lowercase,
    Uppercase,
    Reverse,
    Strip,
    LStrip,
    RStrip,
    Capitalize,
    StringContains,
    StartsWith,
    EndsWith,
    Substring,
    StringFind,
    LPad,
    RPad,
    Repeat,
    StringReplace,
    RegexSearch,
    RegexReplace,
    RegexExtract,
    StringSplit,
    StringConcat,
    Levenshtein,
    /// 0-based position of the needle among the values, -1 when absent.
    FindInSet,
    BaseConvert,
    ExtractProtocol,
    ExtractAuthority,
    ExtractUserInfo,
    ExtractHost,
    ExtractFile,
    ExtractPath,
    ExtractQuery,
    ExtractFragment,
    // math
    Abs,
    Ceil,
    Floor,
    Round,
    Sqrt,
    Exp,
    Ln,
    Log2,
    Log10,
    /// Logarithm to an optional base, natural without one.
    Log,
    Power,
    Sign,
    Degrees,
    Radians,
    Cot,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    BitwiseLeftShift,
    BitwiseRightShift,
    // temporal
    ExtractYear,
    ExtractMonth,
    ExtractDay,
    ExtractHour,
    ExtractMinute,
    ExtractSecond,
    ExtractMillisecond,
    ExtractMicrosecond,
    ExtractDayOfYear,
    ExtractWeekOfYear,
    ExtractEpochSeconds,
    DayOfWeekIndex,
    DayOfWeekName,
    Date,
    TimestampNow,
    DateDiff,
    /// Whole `part`s between two dates, `part` a literal unit name.
    DateDelta,
    TimestampDiff,
    DateFromYmd,
    TimestampAdd,
    DateAdd,
    Strftime,
    StringToTime,
    // misc
    Coalesce,
    NullIf,
    Greatest,
    Least,
    Hash,
    TypeOf,
    RandomScalar,
    ArrayLength,
    ArrayPosition,
    Array,
    Map,
    Unnest,
}

/// Reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    Count,
    CountStar,
    CountDistinct,
    Sum,
    Mean,
    Min,
    Max,
    Any,
    All,
    Variance,
    StandardDev,
    Covariance,
    Median,
    ApproxMedian,
    ApproxCountDistinct,
    ArgMin,
    ArgMax,
    First,
    Last,
    Kurtosis,
}

/// Functions only valid inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalyticFunc {
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    NTile,
    Lag,
    Lead,
    FirstValue,
    LastValue,
    NthValue,
}

impl AnalyticFunc {
    /// Functions whose result is undefined without an ordering.
    pub fn requires_order(&self) -> bool {
        matches!(
            self,
            AnalyticFunc::RowNumber
                | AnalyticFunc::Rank
                | AnalyticFunc::DenseRank
                | AnalyticFunc::PercentRank
                | AnalyticFunc::CumeDist
                | AnalyticFunc::NTile
                | AnalyticFunc::Lag
                | AnalyticFunc::Lead
        )
    }

    /// Ranking functions ignore any frame clause.
    pub fn is_rank(&self) -> bool {
        matches!(
            self,
            AnalyticFunc::RowNumber
                | AnalyticFunc::Rank
                | AnalyticFunc::DenseRank
                | AnalyticFunc::PercentRank
                | AnalyticFunc::CumeDist
                | AnalyticFunc::NTile
        )
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            AnalyticFunc::RowNumber => "row_number",
            AnalyticFunc::Rank => "rank",
            AnalyticFunc::DenseRank => "dense_rank",
            AnalyticFunc::PercentRank => "percent_rank",
            AnalyticFunc::CumeDist => "cume_dist",
            AnalyticFunc::NTile => "ntile",
            AnalyticFunc::Lag => "lag",
            AnalyticFunc::Lead => "lead",
            AnalyticFunc::FirstValue => "first_value",
            AnalyticFunc::LastValue => "last_value",
            AnalyticFunc::NthValue => "nth_value",
        }
    }

    pub fn signature(&self) -> Signature {
        use ArgClass::*;
        match self {
            AnalyticFunc::RowNumber | AnalyticFunc::Rank | AnalyticFunc::DenseRank => {
                Signature::new(&[], Returns::Fixed(TypeKind::Int64)).nulls(Nulls::Never)
            }
            AnalyticFunc::PercentRank | AnalyticFunc::CumeDist => {
                Signature::new(&[], Returns::Fixed(TypeKind::Float64)).nulls(Nulls::Never)
            }
            AnalyticFunc::NTile => {
                Signature::new(&[("buckets", Integer)], Returns::Fixed(TypeKind::Int64))
            }
            AnalyticFunc::Lag | AnalyticFunc::Lead => {
                Signature::new(&[("arg", Any)], Returns::Arg(0))
                    .optional("offset", Integer)
                    .optional("default", Any)
                    .nulls(Nulls::Always)
            }
            AnalyticFunc::FirstValue | AnalyticFunc::LastValue => {
                Signature::new(&[("arg", Any)], Returns::Arg(0))
            }
            AnalyticFunc::NthValue => {
                Signature::new(&[("arg", Any), ("nth", Integer)], Returns::Arg(0))
                    .nulls(Nulls::Always)
            }
        }
    }
}

impl AggFunc {
    /// Aggregates whose value over a full frame does not depend on row order.
    pub fn is_order_insensitive(&self) -> bool {
        !matches!(
            self,
            AggFunc::First | AggFunc::Last | AggFunc::ArgMin | AggFunc::ArgMax
        )
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            AggFunc::Count | AggFunc::CountStar | AggFunc::CountDistinct => "count",
            AggFunc::Sum => "sum",
            AggFunc::Mean => "avg",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Any => "bool_or",
            AggFunc::All => "bool_and",
            AggFunc::Variance => "var_samp",
            AggFunc::StandardDev => "stddev_samp",
            AggFunc::Covariance => "covar_samp",
            AggFunc::Median => "median",
            AggFunc::ApproxMedian => "approx_median",
            AggFunc::ApproxCountDistinct => "approx_count_distinct",
            AggFunc::ArgMin => "arg_min",
            AggFunc::ArgMax => "arg_max",
            AggFunc::First => "first",
            AggFunc::Last => "last",
            AggFunc::Kurtosis => "kurtosis",
        }
    }

    pub fn signature(&self) -> Signature {
        use ArgClass::*;
        match self {
            AggFunc::Count | AggFunc::CountDistinct | AggFunc::ApproxCountDistinct => {
                Signature::new(&[("arg", Any)], Returns::Fixed(TypeKind::Int64)).nulls(Nulls::Never)
            }
            AggFunc::CountStar => {
                Signature::new(&[("arg", Relation)], Returns::Fixed(TypeKind::Int64))
                    .nulls(Nulls::Never)
            }
            AggFunc::Sum => {
                Signature::new(&[("arg", NumericOrBoolean)], Returns::Sum).nulls(Nulls::Always)
            }
            AggFunc::Mean | AggFunc::Variance | AggFunc::StandardDev | AggFunc::Kurtosis => {
                Signature::new(&[("arg", NumericOrBoolean)], Returns::Fixed(TypeKind::Float64))
                    .nulls(Nulls::Always)
            }
            AggFunc::Covariance => Signature::new(
                &[("left", Numeric), ("right", Numeric)],
                Returns::Fixed(TypeKind::Float64),
            )
            .nulls(Nulls::Always),
            AggFunc::Min
            | AggFunc::Max
            | AggFunc::Median
            | AggFunc::First
            | AggFunc::Last => {
                Signature::new(&[("arg", Any)], Returns::Arg(0)).nulls(Nulls::Always)
            }
            AggFunc::ApproxMedian => {
                Signature::new(&[("arg", Numeric)], Returns::Arg(0)).nulls(Nulls::Always)
            }
            AggFunc::Any | AggFunc::All => {
                Signature::new(&[("arg", Boolean)], Returns::Fixed(TypeKind::Boolean))
                    .nulls(Nulls::Always)
            }
            AggFunc::ArgMin | AggFunc::ArgMax => {
                Signature::new(&[("arg", Any), ("key", Any)], Returns::Arg(0)).nulls(Nulls::Always)
            }
        }
    }
}

impl Func {
    /// Name used by the generic function-call translation.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Func::StringLength => "length",
            Func::Lowercase => "lower",
            Func::Uppercase => "upper",
            Func::Reverse => "reverse",
            Func::Strip => "trim",
            Func::LStrip => "ltrim",
            Func::RStrip => "rtrim",
            Func::Capitalize => "initcap",
            Func::StringContains => "contains",
            Func::StartsWith => "starts_with",
            Func::EndsWith => "ends_with",
            Func::Substring => "substring",
            Func::StringFind => "strpos",
            Func::LPad => "lpad",
            Func::RPad => "rpad",
            Func::Repeat => "repeat",
            Func::StringReplace => "replace",
            Func::RegexSearch => "regexp_matches",
            Func::RegexReplace => "regexp_replace",
            Func::RegexExtract => "regexp_extract",
            Func::StringSplit => "string_split",
            Func::StringConcat => "concat",
            Func::Levenshtein => "levenshtein",
            Func::FindInSet => "find_in_set",
            Func::BaseConvert => "conv",
            Func::ExtractProtocol
            | Func::ExtractAuthority
            | Func::ExtractUserInfo
            | Func::ExtractHost
            | Func::ExtractFile
            | Func::ExtractPath
            | Func::ExtractQuery
            | Func::ExtractFragment => "parse_url",
            Func::Abs => "abs",
            Func::Ceil => "ceil",
            Func::Floor => "floor",
            Func::Round => "round",
            Func::Sqrt => "sqrt",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Log2 => "log2",
            Func::Log10 => "log10",
            Func::Log => "log",
            Func::Power => "power",
            Func::Sign => "sign",
            Func::Degrees => "degrees",
            Func::Radians => "radians",
            Func::Cot => "cot",
            Func::BitwiseAnd => "bit_and",
            Func::BitwiseOr => "bit_or",
            Func::BitwiseXor => "xor",
            Func::BitwiseNot => "bit_not",
            Func::BitwiseLeftShift => "shift_left",
            Func::BitwiseRightShift => "shift_right",
            Func::ExtractYear => "year",
            Func::ExtractMonth => "month",
            Func::ExtractDay => "day",
            Func::ExtractHour => "hour",
            Func::ExtractMinute => "minute",
            Func::ExtractSecond => "second",
            Func::ExtractMillisecond => "millisecond",
            Func::ExtractMicrosecond => "microsecond",
            Func::ExtractDayOfYear => "dayofyear",
            Func::ExtractWeekOfYear => "weekofyear",
            Func::ExtractEpochSeconds => "epoch",
            Func::DayOfWeekIndex => "dayofweek",
            Func::DayOfWeekName => "dayname",
            Func::Date => "date",
            Func::TimestampNow => "now",
            Func::DateDiff => "datediff",
            Func::DateDelta => "date_diff",
            Func::TimestampDiff => "timestamp_diff",
            Func::DateFromYmd => "make_date",
            Func::TimestampAdd => "timestamp_add",
            Func::DateAdd => "date_add",
            Func::Strftime => "strftime",
            Func::StringToTime => "strptime",
            Func::Coalesce => "coalesce",
            Func::NullIf => "nullif",
            Func::Greatest => "greatest",
            Func::Least => "least",
            Func::Hash => "hash",
            Func::TypeOf => "typeof",
            Func::RandomScalar => "random",
            Func::ArrayLength => "cardinality",
            Func::ArrayPosition => "array_position",
            Func::Array => "array",
            Func::Map => "map",
            Func::Unnest => "unnest",
        }
    }

    /// Field keyword for `EXTRACT(<field> FROM x)` translations.
    pub fn extract_field(&self) -> Option<&'static str> {
        let field = match self {
            Func::ExtractYear => "YEAR",
            Func::ExtractMonth => "MONTH",
            Func::ExtractDay => "DAY",
            Func::ExtractHour => "HOUR",
            Func::ExtractMinute => "MINUTE",
            Func::ExtractSecond => "SECOND",
            Func::ExtractMillisecond => "MILLISECOND",
            Func::ExtractMicrosecond => "MICROSECOND",
            Func::ExtractDayOfYear => "DOY",
            Func::ExtractWeekOfYear => "WEEK",
            Func::ExtractEpochSeconds => "EPOCH",
            _ => return None,
        };
        Some(field)
    }

    pub fn signature(&self) -> Signature {
        use ArgClass::*;
        let fixed = Returns::Fixed;
        match self {
            Func::StringLength => Signature::new(&[("arg", String)], fixed(TypeKind::Int32)),
            Func::Lowercase
            | Func::Uppercase
            | Func::Reverse
            | Func::Strip
            | Func::LStrip
            | Func::RStrip
            | Func::Capitalize => Signature::new(&[("arg", String)], fixed(TypeKind::String)),
            Func::StringContains => Signature::new(
                &[("haystack", String), ("needle", String)],
                fixed(TypeKind::Boolean),
            ),
            Func::StartsWith => {
                Signature::new(&[("arg", String), ("start", String)], fixed(TypeKind::Boolean))
            }
            Func::EndsWith => {
                Signature::new(&[("arg", String), ("end", String)], fixed(TypeKind::Boolean))
            }
            Func::Substring => {
                Signature::new(&[("arg", String), ("start", Integer)], fixed(TypeKind::String))
                    .optional("length", Integer)
            }
            Func::StringFind => {
                Signature::new(&[("arg", String), ("substr", String)], fixed(TypeKind::Int64))
                    .optional("start", Integer)
            }
            Func::LPad | Func::RPad => Signature::new(
                &[("arg", String), ("length", Integer), ("pad", String)],
                fixed(TypeKind::String),
            ),
            Func::Repeat => {
                Signature::new(&[("arg", String), ("times", Integer)], fixed(TypeKind::String))
            }
            Func::StringReplace | Func::RegexReplace => Signature::new(
                &[("arg", String), ("pattern", String), ("replacement", String)],
                fixed(TypeKind::String),
            ),
            Func::RegexSearch => {
                Signature::new(&[("arg", String), ("pattern", String)], fixed(TypeKind::Boolean))
            }
            Func::RegexExtract => Signature::new(
                &[("arg", String), ("pattern", String), ("index", Integer)],
                fixed(TypeKind::String),
            ),
            Func::StringSplit => Signature::new(
                &[("arg", String), ("delimiter", String)],
                Returns::ArrayOf(0),
            ),
            Func::StringConcat => {
                Signature::new(&[("arg", String)], fixed(TypeKind::String)).variadic("rest", String)
            }
            Func::Levenshtein => {
                Signature::new(&[("left", String), ("right", String)], fixed(TypeKind::Int64))
            }
            Func::FindInSet => {
                Signature::new(&[("needle", String)], fixed(TypeKind::Int64))
                    .variadic("values", String)
            }
            Func::BaseConvert => Signature::new(
                &[("arg", Any), ("from_base", Integer), ("to_base", Integer)],
                fixed(TypeKind::String),
            ),
            Func::ExtractQuery => {
                Signature::new(&[("arg", String)], fixed(TypeKind::String)).optional("key", String)
            }
            Func::ExtractProtocol
            | Func::ExtractAuthority
            | Func::ExtractUserInfo
            | Func::ExtractHost
            | Func::ExtractFile
            | Func::ExtractPath
            | Func::ExtractFragment => Signature::new(&[("arg", String)], fixed(TypeKind::String)),
            Func::Abs | Func::Sign => Signature::new(&[("arg", Numeric)], Returns::Arg(0)),
            Func::Ceil | Func::Floor => Signature::new(&[("arg", Numeric)], Returns::Rounded),
            Func::Round => {
                Signature::new(&[("arg", Numeric)], Returns::Rounded).optional("digits", Integer)
            }
            Func::Sqrt
            | Func::Exp
            | Func::Ln
            | Func::Log2
            | Func::Log10
            | Func::Degrees
            | Func::Radians
            | Func::Cot => Signature::new(&[("arg", Numeric)], fixed(TypeKind::Float64)),
            Func::Log => {
                Signature::new(&[("arg", Numeric)], fixed(TypeKind::Float64))
                    .optional("base", Numeric)
            }
            Func::Power => Signature::new(
                &[("base", Numeric), ("exponent", Numeric)],
                fixed(TypeKind::Float64),
            ),
            Func::BitwiseAnd
            | Func::BitwiseOr
            | Func::BitwiseXor
            | Func::BitwiseLeftShift
            | Func::BitwiseRightShift => {
                Signature::new(&[("left", Integer), ("right", Integer)], Returns::Promoted)
            }
            Func::BitwiseNot => Signature::new(&[("arg", Integer)], Returns::Arg(0)),
            Func::ExtractYear
            | Func::ExtractMonth
            | Func::ExtractDay
            | Func::ExtractDayOfYear
            | Func::ExtractWeekOfYear
            | Func::ExtractHour
            | Func::ExtractMinute
            | Func::ExtractSecond
            | Func::ExtractMillisecond
            | Func::ExtractMicrosecond => {
                Signature::new(&[("arg", Temporal)], fixed(TypeKind::Int32))
            }
            Func::ExtractEpochSeconds => {
                Signature::new(&[("arg", Timestamp)], fixed(TypeKind::Int64))
            }
            Func::DayOfWeekIndex => Signature::new(&[("arg", Temporal)], fixed(TypeKind::Int16)),
            Func::DayOfWeekName => Signature::new(&[("arg", Temporal)], fixed(TypeKind::String)),
            Func::Date => Signature::new(&[("arg", Temporal)], fixed(TypeKind::Date)),
            Func::TimestampNow => Signature::new(
                &[],
                fixed(TypeKind::Timestamp {
                    unit: TimeUnit::Microsecond,
                    timezone: None,
                }),
            )
            .nulls(Nulls::Never),
            Func::DateDiff => {
                Signature::new(&[("left", Date), ("right", Date)], fixed(TypeKind::Int32))
            }
            Func::DateDelta => Signature::new(
                &[("left", Date), ("right", Date), ("part", String)],
                fixed(TypeKind::Int64),
            ),
            Func::TimestampDiff => Signature::new(
                &[("left", Timestamp), ("right", Timestamp)],
                fixed(TypeKind::Interval(IntervalUnit::Second)),
            ),
            Func::DateFromYmd => Signature::new(
                &[("year", Integer), ("month", Integer), ("day", Integer)],
                fixed(TypeKind::Date),
            ),
            Func::TimestampAdd => {
                Signature::new(&[("left", Timestamp), ("right", Interval)], Returns::Arg(0))
            }
            Func::DateAdd => {
                Signature::new(&[("left", Date), ("right", Interval)], Returns::Arg(0))
            }
            Func::Strftime => Signature::new(
                &[("arg", Temporal), ("format_str", String)],
                fixed(TypeKind::String),
            ),
            Func::StringToTime => {
                Signature::new(&[("arg", String), ("format_str", String)], fixed(TypeKind::Time))
            }
            Func::Coalesce => Signature::new(&[("arg", Any)], Returns::Common)
                .variadic("rest", Any)
                .nulls(Nulls::IfAll),
            Func::NullIf => {
                Signature::new(&[("arg", Any), ("null_if_expr", Any)], Returns::Arg(0))
                    .nulls(Nulls::Always)
            }
            Func::Greatest | Func::Least => {
                Signature::new(&[("arg", Any)], Returns::Common).variadic("rest", Any)
            }
            Func::Hash => Signature::new(&[("arg", Any)], fixed(TypeKind::Int64)),
            Func::TypeOf => Signature::new(&[("arg", Any)], fixed(TypeKind::String)),
            Func::RandomScalar => Signature::new(&[], fixed(TypeKind::Float64)).nulls(Nulls::Never),
            Func::ArrayLength => Signature::new(&[("arg", Array)], fixed(TypeKind::Int64)),
            Func::ArrayPosition => {
                Signature::new(&[("arg", Array), ("other", Any)], fixed(TypeKind::Int64))
            }
            Func::Array => {
                Signature::new(&[("arg", Any)], Returns::ArrayOf(0)).variadic("rest", Any)
            }
            Func::Map => {
                Signature::new(&[("keys", Array), ("values", Array)], Returns::MapOf(0, 1))
            }
            Func::Unnest => Signature::new(&[("arg", Array)], Returns::Element(0)),
        }
    }
}

/// Argument classes a signature can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    Any,
    Numeric,
    NumericOrBoolean,
    Integer,
    String,
    Boolean,
    Temporal,
    Timestamp,
    Date,
    Interval,
    Array,
    Relation,
}

impl ArgClass {
    /// Whether a scalar of type `ty` satisfies this class. NULL satisfies every class.
    pub fn accepts(&self, ty: &DataType) -> bool {
        if ty.is_null() {
            return !matches!(self, ArgClass::Relation);
        }
        match self {
            ArgClass::Any => true,
            ArgClass::Numeric => ty.is_numeric(),
            ArgClass::NumericOrBoolean => ty.is_numeric() || ty.is_boolean(),
            ArgClass::Integer => ty.is_integer(),
            ArgClass::String => ty.is_string(),
            ArgClass::Boolean => ty.is_boolean(),
            ArgClass::Temporal => ty.is_temporal(),
            ArgClass::Timestamp => ty.is_timestamp(),
            ArgClass::Date => ty.is_date() || ty.is_timestamp(),
            ArgClass::Interval => ty.is_interval(),
            ArgClass::Array => ty.is_array(),
            ArgClass::Relation => false,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ArgClass::Any => "any value",
            ArgClass::Numeric => "a numeric value",
            ArgClass::NumericOrBoolean => "a numeric or boolean value",
            ArgClass::Integer => "an integer value",
            ArgClass::String => "a string value",
            ArgClass::Boolean => "a boolean value",
            ArgClass::Temporal => "a date, time or timestamp value",
            ArgClass::Timestamp => "a timestamp value",
            ArgClass::Date => "a date value",
            ArgClass::Interval => "an interval value",
            ArgClass::Array => "an array value",
            ArgClass::Relation => "a relation",
        }
    }
}

/// How a function's output type is derived from its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Returns {
    Fixed(TypeKind),
    Arg(usize),
    /// Numeric promotion of the first two arguments.
    Promoted,
    /// Common type of all arguments.
    Common,
    ArrayOf(usize),
    Element(usize),
    MapOf(usize, usize),
    /// Integer unless an explicit `digits` argument or a decimal input keeps the type.
    Rounded,
    /// Integer and boolean sums widen to int64, floats to float64.
    Sum,
}

/// How output nullability follows the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// Nullable if any argument is nullable.
    Propagate,
    /// Nullable only if every argument is nullable.
    IfAll,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: &'static str,
    pub class: ArgClass,
    pub optional: bool,
}

/// Declared shape of a function-like operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub variadic: Option<(&'static str, ArgClass)>,
    pub returns: Returns,
    pub nulls: Nulls,
}

impl Signature {
    pub fn new(required: &[(&'static str, ArgClass)], returns: Returns) -> Self {
        Self {
            params: required
                .iter()
                .map(|(name, class)| Param {
                    name,
                    class: *class,
                    optional: false,
                })
                .collect(),
            variadic: None,
            returns,
            nulls: Nulls::Propagate,
        }
    }

    pub fn optional(mut self, name: &'static str, class: ArgClass) -> Self {
        self.params.push(Param {
            name,
            class,
            optional: true,
        });
        self
    }

    pub fn variadic(mut self, name: &'static str, class: ArgClass) -> Self {
        self.variadic = Some((name, class));
        self
    }

    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = nulls;
        self
    }

    pub fn min_args(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    pub fn max_args(&self) -> Option<usize> {
        match self.variadic {
            Some(_) => None,
            None => Some(self.params.len()),
        }
    }

    /// Name and class of the argument at `index`.
    pub fn param_at(&self, index: usize) -> Option<(&'static str, ArgClass)> {
        match self.params.get(index) {
            Some(p) => Some((p.name, p.class)),
            None => self.variadic,
        }
    }
}

/// Truncation target of `TimestampTruncate`.
pub type TruncateUnit = IntervalUnit;

/// The kind tag of every IR operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    UnboundTable,
    DummyTable,
    SelfReference,
    Project,
    Select,
    Filter,
    Aggregate,
    Join,
    Sort,
    Limit,
    Distinct,
    Sample,
    Union,
    Field,
    Literal,
    ScalarParameter,
    Alias,
    Cast,
    SortKey,
    IfElse,
    InValues,
    StructColumn,
    WindowFunction,
    TimestampTruncate,
    TimestampFromUnix,
    HashBytes,
    Binary(BinaryOp),
    Unary(UnaryOp),
    Call(Func),
    Reduction(AggFunc),
    Analytic(AnalyticFunc),
}

impl OpKind {
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            OpKind::UnboundTable
                | OpKind::DummyTable
                | OpKind::SelfReference
                | OpKind::Project
                | OpKind::Select
                | OpKind::Filter
                | OpKind::Aggregate
                | OpKind::Join
                | OpKind::Sort
                | OpKind::Limit
                | OpKind::Distinct
                | OpKind::Sample
                | OpKind::Union
        )
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Binary(op) => write!(f, "{:?}", op),
            OpKind::Unary(op) => write!(f, "{:?}", op),
            OpKind::Call(func) => write!(f, "{:?}", func),
            OpKind::Reduction(func) => write!(f, "{:?}", func),
            OpKind::Analytic(func) => write!(f, "{:?}", func),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_uses_operation_name() {
        assert_eq!(OpKind::Call(Func::StringContains).to_string(), "StringContains");
        assert_eq!(OpKind::Binary(BinaryOp::Xor).to_string(), "Xor");
        assert_eq!(OpKind::Sample.to_string(), "Sample");
    }

    #[test]
    fn test_signature_arity() {
        let sig = Func::Substring.signature();
        assert_eq!(sig.min_args(), 2);
        assert_eq!(sig.max_args(), Some(3));
        let sig = Func::StringConcat.signature();
        assert_eq!(sig.max_args(), None);
        assert_eq!(sig.param_at(5), Some(("rest", ArgClass::String)));
    }

    #[test]
    fn test_null_accepted_by_scalar_classes() {
        assert!(ArgClass::String.accepts(&DataType::null()));
        assert!(!ArgClass::Relation.accepts(&DataType::null()));
    }
}
