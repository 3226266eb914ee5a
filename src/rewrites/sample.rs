//! Lower `Sample` nodes a dialect cannot render natively.

use crate::ast::builders::{call, lit};
use crate::ast::{Func, Node, Op, OpKind, SampleMethod};
use crate::dialect::DialectConfig;
use crate::error::{RelqError, RelqResult};

pub fn lower_sample(node: &Node, config: &DialectConfig) -> RelqResult<Node> {
    node.replace(|n| match n.op() {
        Op::Sample {
            parent,
            fraction,
            method,
            seed,
        } => lower(config, n, parent, fraction.0, *method, *seed),
        _ => Ok(n.clone()),
    })
}

fn lower(
    config: &DialectConfig,
    node: &Node,
    parent: &Node,
    fraction: f64,
    method: SampleMethod,
    seed: Option<u64>,
) -> RelqResult<Node> {
    let policy = &config.sample;
    let reason = if !policy.methods.contains(&method) {
        format!("{:?} sampling", method)
    } else if seed.is_some() && !policy.supports_seed {
        "seeded sampling".to_string()
    } else if policy.physical_tables_only && parent.kind() != OpKind::UnboundTable {
        "sampling a derived relation".to_string()
    } else {
        return Ok(node.clone());
    };

    if policy.random_fallback && seed.is_none() {
        tracing::debug!(dialect = %config.dialect, %reason, "sampling with random()");
        let keep = call(Func::RandomScalar, [])?.le(lit(fraction))?;
        return parent.filter([keep]);
    }
    Err(RelqError::unsupported(OpKind::Sample, config.dialect, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DataType;
    use crate::ast::builders::table;
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    fn t() -> Node {
        table("t", [("a", DataType::int64())]).unwrap()
    }

    #[test]
    fn test_native_sample_is_kept() {
        let sampled = t().sample(0.1, SampleMethod::Row, Some(7)).unwrap();
        let out = lower_sample(&sampled, Dialect::DuckDb.config()).unwrap();
        assert!(out.ptr_eq(&sampled));
    }

    #[test]
    fn test_derived_relation_falls_back_to_random() {
        let t = t();
        let projected = t.select_columns(&["a"]).unwrap();
        let sampled = projected.sample(0.25, SampleMethod::Row, None).unwrap();
        let out = lower_sample(&sampled, Dialect::Postgres.config()).unwrap();
        match out.op() {
            Op::Filter { parent, predicates } => {
                assert!(parent.ptr_eq(&projected));
                let expected = call(Func::RandomScalar, []).unwrap().le(lit(0.25)).unwrap();
                assert_eq!(predicates, &vec![expected]);
            }
            other => panic!("expected a filter, got {:?}", other),
        }
    }

    #[test]
    fn test_seeded_fallback_is_unsupported() {
        let sampled = t().sample(0.5, SampleMethod::Row, Some(1)).unwrap();
        let err = lower_sample(&sampled, Dialect::MySql.config()).unwrap_err();
        let unsupported = err.as_unsupported().unwrap();
        assert_eq!(unsupported.kind, OpKind::Sample);
        assert_eq!(unsupported.dialect, Dialect::MySql);
    }

    #[test]
    fn test_row_sampling_unsupported_without_fallback() {
        let sampled = t().sample(0.5, SampleMethod::Row, None).unwrap();
        assert!(lower_sample(&sampled, Dialect::Impala.config()).is_err());
        let block = t().sample(0.5, SampleMethod::Block, None).unwrap();
        assert!(lower_sample(&block, Dialect::Impala.config()).is_ok());
    }
}
