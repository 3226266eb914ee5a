//! The relational expression graph.

pub mod builders;
pub mod node;
pub mod ops;
pub mod schema;
pub mod types;
pub mod values;

pub use node::{Fraction, Node, Op, Output};
pub use ops::{
    AggFunc, AnalyticFunc, BinaryOp, FrameBound, FrameKind, Func, HashAlgorithm, JoinKind, OpKind,
    SampleMethod, UnaryOp, WindowFrame,
};
pub use schema::Schema;
pub use types::{DataType, GeoKind, IntervalUnit, TimeUnit, TypeKind};
pub use values::Value;
