//! BabelDB CLI - translate and run federated queries
//!
//! Usage:
//!   babel translate <sql>
//!   babel query [--db <path>] [--dialect <dialect>] [--staleness <ms>] <sql>
//!   babel ddl --alias <name> [--dialect <dialect>] [--path <jq>] [--types <overrides>] <text>
//!   babel views <dir>
//!
//! Examples:
//!   babel translate "SELECT * FROM S_AAPL"
//!   babel query "SELECT SUM(qty) FROM QUERY_WEB('file:///tmp/orders.csv')"
//!   babel ddl --alias prices --dialect duckdb "sym,px\nAAPL,1.5"
//!   babel views ./data | duckdb analytics.duckdb

use clap::{Parser, Subcommand, ValueEnum};
use babeldb::backend::{local_files, ConnectionFederation, SqliteConnection};
use babeldb::config::{ConnectionConfig, Driver, Settings};
use babeldb::dispatch::{Dispatcher, Fetcher};
use babeldb::materialize::build_script;
use babeldb::registry::SymbolRegistry;
use babeldb::sql::Dialect;
use babeldb::{ingest, BabelDb, ColumnarTable};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "babel")]
#[command(about = "BabelDB - materialize pseudo-functions and symbols into SQL tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a query is rewritten, as JSON
    Translate {
        /// SQL text
        sql: String,
    },

    /// Run a query against a SQLite backing engine
    Query {
        /// SQL text
        sql: String,

        /// SQLite database file (defaults to the configured connection, else in-memory)
        #[arg(long)]
        db: Option<String>,

        /// Dialect for materialized tables
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Staleness budget forwarded to federated sub-queries
        #[arg(short, long)]
        staleness: Option<u64>,
    },

    /// Print the materialization script for inline data
    Ddl {
        /// Delimited, JSON, or HTML text
        text: String,

        /// Table name
        #[arg(short, long)]
        alias: String,

        /// SQL dialect to generate
        #[arg(short, long, default_value = "h2")]
        dialect: DialectArg,

        /// JSON path narrowing the input
        #[arg(short, long)]
        path: Option<String>,

        /// Column type overrides, e.g. "{qty: 'INTEGER'}"
        #[arg(short, long)]
        types: Option<String>,
    },

    /// Print DuckDB views over the CSV and Parquet files in a directory
    Views {
        /// Directory to scan
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    H2,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::H2 => Dialect::H2,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

/// Reads `file://` URLs and plain paths from disk.
struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch_url(&self, url: &str, _method: &str, _body: Option<&str>) -> Option<String> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        match fs::read_to_string(path) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch failed");
                None
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("BABEL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Translate { sql } => cmd_translate(&sql),
        Commands::Query {
            sql,
            db,
            dialect,
            staleness,
        } => cmd_query(&settings, &sql, db, dialect, staleness),
        Commands::Ddl {
            text,
            alias,
            dialect,
            path,
            types,
        } => cmd_ddl(&text, &alias, dialect, path.as_deref(), types.as_deref()),
        Commands::Views { dir } => cmd_views(&dir),
    }
}

fn cmd_translate(sql: &str) -> ExitCode {
    let translation = match babeldb::translate(sql) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Translation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&translation) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_query(
    settings: &Settings,
    sql: &str,
    db: Option<String>,
    dialect: Option<DialectArg>,
    staleness: Option<u64>,
) -> ExitCode {
    let (config, configured_dialect) = match db {
        Some(path) => (ConnectionConfig::sqlite(path), None),
        None => match settings.default_connection() {
            Some((_, conn)) => match conn.to_config().and_then(|c| Ok((c, Some(conn.dialect()?)))) {
                Ok(resolved) => resolved,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    return ExitCode::FAILURE;
                }
            },
            None => (ConnectionConfig::in_memory(), None),
        },
    };
    let dialect = dialect
        .map(Dialect::from)
        .or(configured_dialect)
        .unwrap_or(settings.engine.dialect);

    if config.driver != Driver::Sqlite {
        eprintln!("Unsupported driver for query: {}", config.driver);
        return ExitCode::FAILURE;
    }

    let connection = match SqliteConnection::open(&config) {
        Ok(c) => c.with_dialect(dialect),
        Err(e) => {
            eprintln!("Error opening '{}': {}", config.to_connection_string(), e);
            return ExitCode::FAILURE;
        }
    };
    let federation = match ConnectionFederation::from_settings(settings) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let registry = SymbolRegistry::global();
    if !federation.is_empty() {
        if let Err(e) = registry.refresh(federation.as_ref(), &settings.registry.symbol_query) {
            tracing::warn!(error = %e, "symbol registry refresh failed");
        }
    }

    let dispatcher = Dispatcher::new(Arc::new(FileFetcher))
        .with_executor(federation)
        .with_registry(registry)
        .with_max_search_results(settings.registry.max_search_results);
    let engine = BabelDb::new(Arc::new(connection), dispatcher);

    match engine.execute(sql, staleness.unwrap_or(settings.engine.default_staleness_ms)) {
        Ok(table) => {
            print_table(&table);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Query error: {}", e);
            if let Some(fragment) = e.offending_fragment() {
                eprintln!("  near: {}", fragment);
            }
            ExitCode::FAILURE
        }
    }
}

fn cmd_ddl(
    text: &str,
    alias: &str,
    dialect: DialectArg,
    path: Option<&str>,
    types: Option<&str>,
) -> ExitCode {
    let text = text.replace("\\n", "\n");
    match ingest::from_text(&text, path, types, false) {
        Ok(table) => {
            println!("{}", build_script(&table, alias, dialect.into()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Ingestion error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_views(dir: &Path) -> ExitCode {
    match local_files::local_files(dir) {
        Ok(statements) => {
            for statement in statements {
                println!("{};", statement);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error reading '{}': {}", dir.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn print_table(table: &ColumnarTable) {
    let names = table.names();
    let rows: Vec<Vec<String>> = table
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(names.clone()));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
    println!("({} rows)", table.row_count());
}
