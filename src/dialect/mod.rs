//! Supported SQL dialects and their compile-time configuration.
//!
//! Each dialect is one static [`DialectConfig`], built lazily by
//! [`DialectConfig::builder`]: the builder starts from the base configuration
//! and every dialect module extends or overrides it explicitly.

mod duckdb;
mod impala;
mod mysql;
mod postgres;
mod sqlite;

use crate::ast::{Node, OpKind, SampleMethod};
use crate::error::{RelqError, RelqResult};
use crate::rewrites::{self, WindowSpec};
use crate::sql::Select;
use crate::transpiler::context::{Aliases, Visitor};
use crate::transpiler::sql::{
    duckdb::DuckDbGenerator, impala::ImpalaGenerator, mysql::MysqlGenerator,
    postgres::PostgresGenerator, sqlite::SqliteGenerator,
};
use crate::transpiler::traits::SqlGenerator;
use crate::types::{DuckDbTypes, ImpalaTypes, MySqlTypes, PostgresTypes, SqliteTypes, TypeMapper};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// SQL dialect to compile for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    DuckDb,
    Postgres,
    MySql,
    Sqlite,
    Impala,
}

static DUCKDB_GENERATOR: DuckDbGenerator = DuckDbGenerator;
static POSTGRES_GENERATOR: PostgresGenerator = PostgresGenerator;
static MYSQL_GENERATOR: MysqlGenerator = MysqlGenerator;
static SQLITE_GENERATOR: SqliteGenerator = SqliteGenerator;
static IMPALA_GENERATOR: ImpalaGenerator = ImpalaGenerator;

static DUCKDB: LazyLock<DialectConfig> = LazyLock::new(duckdb::config);
static POSTGRES: LazyLock<DialectConfig> = LazyLock::new(postgres::config);
static MYSQL: LazyLock<DialectConfig> = LazyLock::new(mysql::config);
static SQLITE: LazyLock<DialectConfig> = LazyLock::new(sqlite::config);
static IMPALA: LazyLock<DialectConfig> = LazyLock::new(impala::config);

impl Dialect {
    pub fn all() -> [Dialect; 5] {
        [
            Dialect::DuckDb,
            Dialect::Postgres,
            Dialect::MySql,
            Dialect::Sqlite,
            Dialect::Impala,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::DuckDb => "duckdb",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Impala => "impala",
        }
    }

    /// Get the SQL generator for this dialect.
    pub fn generator(&self) -> &'static (dyn SqlGenerator + Sync) {
        match self {
            Dialect::DuckDb => &DUCKDB_GENERATOR,
            Dialect::Postgres => &POSTGRES_GENERATOR,
            Dialect::MySql => &MYSQL_GENERATOR,
            Dialect::Sqlite => &SQLITE_GENERATOR,
            Dialect::Impala => &IMPALA_GENERATOR,
        }
    }

    pub fn types(&self) -> &'static dyn TypeMapper {
        match self {
            Dialect::DuckDb => &DuckDbTypes,
            Dialect::Postgres => &PostgresTypes,
            Dialect::MySql => &MySqlTypes,
            Dialect::Sqlite => &SqliteTypes,
            Dialect::Impala => &ImpalaTypes,
        }
    }

    /// The process-wide configuration of this dialect.
    pub fn config(&self) -> &'static DialectConfig {
        match self {
            Dialect::DuckDb => &DUCKDB,
            Dialect::Postgres => &POSTGRES,
            Dialect::MySql => &MYSQL,
            Dialect::Sqlite => &SQLITE,
            Dialect::Impala => &IMPALA,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = RelqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Dialect::DuckDb),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "impala" => Ok(Dialect::Impala),
            other => Err(RelqError::Config(format!("unknown dialect '{}'", other))),
        }
    }
}

/// IR to IR rewrite run before compilation.
pub type PreRewrite = fn(&Node, &DialectConfig) -> RelqResult<Node>;

/// Rewrite of one generated SELECT, applied bottom-up to every SELECT of the output.
pub type PostRewrite = fn(Select, &mut Aliases) -> Select;

/// Strip the window spec parts a function does not need.
pub type MinimizeSpec = fn(&Node, WindowSpec) -> WindowSpec;

/// How a dialect samples relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePolicy {
    /// Methods rendered natively as `TABLESAMPLE`.
    pub methods: &'static [SampleMethod],
    pub supports_seed: bool,
    /// Native sampling applies to physical tables only.
    pub physical_tables_only: bool,
    /// Lower unsupported sampling to `random() <= fraction` when no seed is requested.
    pub random_fallback: bool,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self {
            methods: &[SampleMethod::Row, SampleMethod::Block],
            supports_seed: true,
            physical_tables_only: false,
            random_fallback: false,
        }
    }
}

/// Everything the compiler needs to know about one dialect.
pub struct DialectConfig {
    pub dialect: Dialect,
    pub unsupported: HashSet<OpKind>,
    pub renames: HashMap<OpKind, &'static str>,
    pub visitors: HashMap<OpKind, Visitor>,
    pub types: &'static dyn TypeMapper,
    pub pre_rewrites: Vec<(&'static str, PreRewrite)>,
    pub post_rewrites: Vec<(&'static str, PostRewrite)>,
    pub sample: SamplePolicy,
    pub minimize_spec: MinimizeSpec,
    /// `FILTER (WHERE ...)` on aggregates; otherwise filters become `CASE WHEN`.
    pub aggregate_filter: bool,
    pub full_outer_join: bool,
    pub generator: &'static (dyn SqlGenerator + Sync),
}

impl fmt::Debug for DialectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectConfig")
            .field("dialect", &self.dialect)
            .field("unsupported", &self.unsupported)
            .field("renames", &self.renames)
            .field("visitors", &self.visitors.keys().collect::<Vec<_>>())
            .field(
                "pre_rewrites",
                &self.pre_rewrites.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field(
                "post_rewrites",
                &self.post_rewrites.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("sample", &self.sample)
            .finish()
    }
}

impl DialectConfig {
    /// Start from the base configuration.
    pub fn builder(dialect: Dialect) -> DialectConfigBuilder {
        DialectConfigBuilder::new(dialect)
    }

    pub fn is_unsupported(&self, kind: OpKind) -> bool {
        self.unsupported.contains(&kind)
    }

    pub fn rename(&self, kind: OpKind) -> Option<&'static str> {
        self.renames.get(&kind).copied()
    }

    pub fn visitor(&self, kind: OpKind) -> Option<Visitor> {
        self.visitors.get(&kind).copied()
    }
}

/// Explicit base→dialect composition of a [`DialectConfig`].
pub struct DialectConfigBuilder {
    dialect: Dialect,
    unsupported: HashSet<OpKind>,
    renames: HashMap<OpKind, &'static str>,
    visitors: HashMap<OpKind, Visitor>,
    types: &'static dyn TypeMapper,
    dialect_pre: Vec<(&'static str, PreRewrite)>,
    base_pre: Vec<(&'static str, PreRewrite)>,
    post_rewrites: Vec<(&'static str, PostRewrite)>,
    sample: SamplePolicy,
    minimize_spec: MinimizeSpec,
    aggregate_filter: bool,
    full_outer_join: bool,
    generator: &'static (dyn SqlGenerator + Sync),
}

impl DialectConfigBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            unsupported: HashSet::new(),
            renames: HashMap::new(),
            visitors: HashMap::new(),
            types: dialect.types(),
            dialect_pre: Vec::new(),
            base_pre: vec![
                ("lower_sample", rewrites::lower_sample as PreRewrite),
                ("fuse_selects", rewrites::fuse_selects as PreRewrite),
            ],
            post_rewrites: Vec::new(),
            sample: SamplePolicy::default(),
            minimize_spec: rewrites::minimize_spec,
            aggregate_filter: true,
            full_outer_join: true,
            generator: dialect.generator(),
        }
    }

    /// Deny operation kinds.
    pub fn unsupported(mut self, kinds: impl IntoIterator<Item = OpKind>) -> Self {
        self.unsupported.extend(kinds);
        self
    }

    /// Translate `kind` as a plain call of `name`.
    pub fn rename(mut self, kind: OpKind, name: &'static str) -> Self {
        self.renames.insert(kind, name);
        self
    }

    pub fn visitor(mut self, kind: OpKind, visitor: Visitor) -> Self {
        self.visitors.insert(kind, visitor);
        self
    }

    pub fn types(mut self, types: &'static dyn TypeMapper) -> Self {
        self.types = types;
        self
    }

    /// Add a dialect pre-rewrite. Dialect rewrites run before the base ones.
    pub fn pre_rewrite(mut self, name: &'static str, rewrite: PreRewrite) -> Self {
        self.dialect_pre.push((name, rewrite));
        self
    }

    pub fn post_rewrite(mut self, name: &'static str, rewrite: PostRewrite) -> Self {
        self.post_rewrites.push((name, rewrite));
        self
    }

    pub fn sample(mut self, policy: SamplePolicy) -> Self {
        self.sample = policy;
        self
    }

    pub fn minimize_spec(mut self, hook: MinimizeSpec) -> Self {
        self.minimize_spec = hook;
        self
    }

    pub fn aggregate_filter(mut self, supported: bool) -> Self {
        self.aggregate_filter = supported;
        self
    }

    pub fn full_outer_join(mut self, supported: bool) -> Self {
        self.full_outer_join = supported;
        self
    }

    pub fn build(self) -> DialectConfig {
        let mut pre_rewrites = self.dialect_pre;
        pre_rewrites.extend(self.base_pre);
        DialectConfig {
            dialect: self.dialect,
            unsupported: self.unsupported,
            renames: self.renames,
            visitors: self.visitors,
            types: self.types,
            pre_rewrites,
            post_rewrites: self.post_rewrites,
            sample: self.sample,
            minimize_spec: self.minimize_spec,
            aggregate_filter: self.aggregate_filter,
            full_outer_join: self.full_outer_join,
            generator: self.generator,
        }
    }
}
