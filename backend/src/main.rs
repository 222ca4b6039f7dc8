//! Salesboard CLI - sales volume and market share pivot
//!
//! # Commands
//!
//! ```bash
//! salesboard --source dados.xlsx serve              # Start HTTP server (port 3000)
//! salesboard --source dados.xlsx pivot -m A -y 2023 # Print a pivot table as JSON
//! salesboard --source batches/ options              # Distinct filter values
//! salesboard --source dados.csv inspect             # Typed records + coercion report
//! ```
//!
//! `--source` falls back to `SALESBOARD_SOURCE` (a `.env` file is honoured).

use clap::{Parser, Subcommand};
use salesboard::{config, FilterSelection, RecordStore, SelectionRequest, ServerConfig};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salesboard")]
#[command(about = "Sales volume and market share pivot tables", long_about = None)]
struct Cli {
    /// Spreadsheet, CSV or JSON file, or a directory of JSON batches
    #[arg(short, long, global = true, env = "SALESBOARD_SOURCE")]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = config::DEFAULT_PORT, env = "SALESBOARD_PORT")]
        port: u16,

        /// Directory served under /static
        #[arg(long, env = "SALESBOARD_STATIC_DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Print the pivot table for a selection
    Pivot {
        /// Accepted manufacturer (repeatable)
        #[arg(short, long = "manufacturer")]
        manufacturers: Vec<String>,

        /// Accepted year (repeatable)
        #[arg(short, long = "year")]
        years: Vec<i64>,

        /// Accepted country (repeatable)
        #[arg(short, long = "country")]
        countries: Vec<String>,

        /// Accepted product type (repeatable)
        #[arg(short, long = "type")]
        types: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print distinct values for each filter
    Options,

    /// Print typed records and the coercion report
    Inspect {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    config::init_tracing();

    let cli = Cli::parse();

    let result = match load_store(cli.source.as_deref()) {
        Ok(store) => match cli.command {
            Commands::Serve { port, static_dir } => cmd_serve(store, port, static_dir).await,
            Commands::Pivot {
                manufacturers,
                years,
                countries,
                types,
                output,
            } => {
                let selection = FilterSelection::all()
                    .with_manufacturers(manufacturers)
                    .with_years(years)
                    .with_countries(countries)
                    .with_types(types);
                cmd_pivot(&store, &selection, output.as_deref())
            }
            Commands::Options => cmd_options(&store),
            Commands::Inspect { output } => cmd_inspect(&store, output.as_deref()),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_store(source: Option<&Path>) -> Result<RecordStore, Box<dyn std::error::Error>> {
    let source = source.ok_or("no source given: pass --source or set SALESBOARD_SOURCE")?;
    Ok(RecordStore::load_path(source)?)
}

async fn cmd_serve(
    store: RecordStore,
    port: u16,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig { port, static_dir };
    salesboard::server::start_server(config, store).await?;
    Ok(())
}

fn cmd_pivot(
    store: &RecordStore,
    selection: &FilterSelection,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = store.query(&SelectionRequest::from_selection(selection))?;

    eprintln!("📊 {} groups from {} records", table.rows.len(), table.filtered_records);
    if !table.is_empty() && table.share_sum() != 100 {
        eprintln!("   Shares sum to {}% after rounding", table.share_sum());
    }

    let json = serde_json::to_string_pretty(&table.rows)?;
    write_output(&json, output)
}

fn cmd_options(store: &RecordStore) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&store.options())?);
    Ok(())
}

fn cmd_inspect(store: &RecordStore, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = store.snapshot();

    eprintln!("📄 {} records", snapshot.records.len());
    eprintln!("   Invalid years:   {}", snapshot.report.invalid_years);
    eprintln!("   Invalid months:  {}", snapshot.report.invalid_months);
    eprintln!("   Invalid volumes: {}", snapshot.report.invalid_volumes);
    eprintln!("   Years from 'Ano': {}", snapshot.report.aliased_years);

    let records: Vec<_> = snapshot
        .records
        .iter()
        .map(|r| {
            json!({
                "date": r.date(),
                "record": r,
            })
        })
        .collect();

    let json = serde_json::to_string_pretty(&json!({
        "report": snapshot.report,
        "records": records,
    }))?;
    write_output(&json, output)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
