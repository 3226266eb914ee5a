//! relq: compile relational plans to SQL
//!
//! # Usage
//!
//! ```bash
//! # Compile a JSON plan for a dialect
//! relq compile plan.json --dialect impala --limit 100
//!
//! # Bind a parameter
//! relq compile plan.json --param min_total=10
//!
//! # Parse a backend type string
//! relq type postgres "numeric(10, 2)[]"
//!
//! # Render a logical type as DDL
//! relq ddl mysql '{"kind": "int64"}'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use relq::config::RelqConfig;
use relq::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Relational expression compiler - one plan, many SQL dialects",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    relq compile plan.json --dialect postgres
    relq compile plan.json -d impala --limit 10 --param since=2024-01-01
    relq type duckdb 'STRUCT(a INTEGER, b VARCHAR[])'
    relq dialects")]
struct Cli {
    /// Config file (defaults to ./relq.toml, then the user config directory)
    #[arg(short, long, env = "RELQ_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON plan document to SQL
    Compile {
        /// Plan file, `-` for stdin
        plan: PathBuf,
        /// Target SQL dialect
        #[arg(short, long)]
        dialect: Option<Dialect>,
        /// Outermost row limit
        #[arg(short, long)]
        limit: Option<u64>,
        /// Parameter values as name=value, read as the parameter's declared type
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Also print the result schema
        #[arg(long)]
        schema: bool,
    },
    /// Parse a backend type string into a logical type
    Type {
        dialect: Dialect,
        type_string: String,
        #[arg(long)]
        not_null: bool,
    },
    /// Render a logical type (JSON) as a backend type string
    Ddl { dialect: Dialect, type_json: String },
    /// List dialects with their unsupported operations and renames
    Dialects,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RelqConfig::from_file(path)?,
        None => RelqConfig::load()?,
    };
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Compile {
            plan,
            dialect,
            limit,
            params,
            schema,
        } => compile_plan(&config, &plan, dialect, limit, params, schema, cli.verbose),
        Commands::Type {
            dialect,
            type_string,
            not_null,
        } => parse_type(dialect, &type_string, not_null),
        Commands::Ddl { dialect, type_json } => render_type(dialect, &type_json),
        Commands::Dialects => {
            show_dialects();
            Ok(())
        }
    }
}

fn init_tracing(config: &RelqConfig, verbose: bool) {
    let fallback = if verbose { "relq=debug" } else { config.log_filter.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Split `name=value`; the value is typed once the plan is loaded.
fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn compile_plan(
    config: &RelqConfig,
    path: &PathBuf,
    dialect: Option<Dialect>,
    limit: Option<u64>,
    params: Vec<(String, String)>,
    show_schema: bool,
    verbose: bool,
) -> Result<()> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading plan from stdin")?
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    let node = relq::plan::load(&text).with_context(|| format!("loading plan {}", path.display()))?;

    let dialect = dialect.unwrap_or(config.dialect);
    let mut options = config.compile_options();
    if let Some(n) = limit {
        options.limit = Some(n);
    }
    options
        .params
        .extend(relq::plan::text_params(&node, &params).context("reading --param values")?);

    let compiled = Compiler::new(dialect).compile(&node, &options)?;

    if verbose {
        println!("{} {}", "Dialect:".dimmed(), dialect.to_string().cyan());
        println!(
            "{} {} nodes",
            "Visited:".dimmed(),
            compiled.stats.total().to_string().cyan()
        );
        if !compiled.params.is_empty() {
            println!(
                "{} {}",
                "Placeholders:".dimmed(),
                compiled.params.join(", ").cyan()
            );
        }
    }
    println!("{}", compiled.sql);

    if show_schema {
        println!();
        println!("{}", "Schema:".green().bold());
        for (name, ty) in compiled.schema.iter() {
            println!("  {} {}", name.white(), ty.to_string().yellow());
        }
    }
    Ok(())
}

fn parse_type(dialect: Dialect, raw: &str, not_null: bool) -> Result<()> {
    let ty = dialect.types().from_string(raw, !not_null)?;
    println!("{}", serde_json::to_string_pretty(&ty)?);
    match dialect.types().to_string(&ty) {
        Ok(canonical) => println!("{} {}", "Canonical:".dimmed(), canonical.cyan()),
        Err(e) => println!("{} {}", "No DDL form:".yellow(), e),
    }
    Ok(())
}

fn render_type(dialect: Dialect, json: &str) -> Result<()> {
    let ty: DataType = serde_json::from_str(json).context("type must be a JSON logical type")?;
    println!("{}", dialect.types().to_string(&ty)?);
    Ok(())
}

fn show_dialects() {
    for dialect in Dialect::all() {
        let config = dialect.config();
        println!("{}", dialect.to_string().cyan().bold());

        let mut unsupported: Vec<String> =
            config.unsupported.iter().map(|k| k.to_string()).collect();
        unsupported.sort();
        if !unsupported.is_empty() {
            println!("  {} {}", "Unsupported:".dimmed(), unsupported.join(", ").red());
        }

        let mut renames: Vec<String> = config
            .renames
            .iter()
            .map(|(k, name)| format!("{} → {}", k, name))
            .collect();
        renames.sort();
        if !renames.is_empty() {
            println!("  {}", "Renames:".dimmed());
            for rename in renames {
                println!("    {}", rename.white());
            }
        }

        let rewrites: Vec<&str> = config.pre_rewrites.iter().map(|(n, _)| *n).collect();
        println!("  {} {}", "Rewrites:".dimmed(), rewrites.join(" → ").yellow());
        println!();
    }
}
