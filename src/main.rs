//! CLI entry point for `dmadmin`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use dmadmin::config::AdminConfig;
use dmadmin::console::{run_sql, ConsoleOptions};
use dmadmin::exec::catalog::{list_tables, schema_listing, SchemaListing};
use dmadmin::exec::sqlite::SqliteConnection;
use dmadmin::exec::table::browse_table;
use dmadmin::sql::names::split_schema_and_relation;
use dmadmin::sql::pager::PageRequest;
use serde::Serialize;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dmadmin",
    about = "Run console statements and browse tables with charset normalization and paging"
)]
struct Cli {
    /// Statement to run
    sql: Option<String>,

    /// SQLite database file
    #[arg(long)]
    db: PathBuf,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Active schema (defaults to the configured or current schema)
    #[arg(long)]
    schema: Option<String>,

    /// Page to show, 1-based
    #[arg(long, default_value_t = 1)]
    page: u64,

    /// Rows per page (overrides `max_rows`)
    #[arg(long)]
    page_size: Option<u64>,

    /// Browse `[schema.]table` instead of running a statement
    #[arg(long, conflicts_with = "sql")]
    table: Option<String>,

    /// List schemas and the tables of the active schema
    #[arg(long, conflicts_with_all = ["sql", "table"])]
    list_schemas: bool,

    /// Print debug diagnostics on stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match AdminConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {e}", path.display());
                process::exit(2);
            }
        },
        None => AdminConfig::default(),
    };
    if let Some(page_size) = cli.page_size {
        if page_size == 0 {
            eprintln!("--page-size must be at least 1");
            process::exit(2);
        }
        config.max_rows = page_size;
    }

    let mut conn = match SqliteConnection::open(&cli.db) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Error opening {}: {e}", cli.db.display());
            process::exit(2);
        }
    };
    let charsets = config.charsets();

    let listing = schema_listing(
        &mut conn,
        cli.schema.as_deref().unwrap_or(""),
        &config.default_schema,
        &charsets,
    );
    let schema = listing.active.clone();
    debug!(schema = %schema, schemas = listing.schemas.len(), "active schema");

    if cli.list_schemas {
        let tables = if schema.is_empty() {
            Vec::new()
        } else {
            list_tables(&mut conn, &schema, &charsets)
        };
        print_json(&SchemaOverview { listing, tables });
        return;
    }

    if let Some(table) = &cli.table {
        let (table_schema, table_name) = match split_schema_and_relation(table) {
            Some(parts) => parts,
            None => (schema.clone(), table.trim().to_string()),
        };
        let request = PageRequest::new(cli.page, config.page_size());
        match browse_table(&mut conn, &table_schema, &table_name, request, &charsets) {
            Ok(page) => print_json(&page),
            Err(e) => {
                eprintln!("{}", e.display_message(&charsets));
                process::exit(1);
            }
        }
        return;
    }

    let options = ConsoleOptions::from_config(&config, &schema, cli.page);
    let outcome = run_sql(&mut conn, cli.sql.as_deref().unwrap_or(""), &options);
    print_json(&outcome);
    if !outcome.is_success() {
        process::exit(1);
    }
}

#[derive(Serialize)]
struct SchemaOverview {
    #[serde(flatten)]
    listing: SchemaListing,
    tables: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            process::exit(2);
        }
    }
}
