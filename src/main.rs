//! Rewrite nested fields of newline-delimited JSON records
//!
//! Usage: reshape --config filter.json [--input records.ndjson]

use anyhow::{Context, Result, bail};
use clap::Parser;
use reshape::FilterConfig;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reshape", version, about = "Rewrite nested fields of JSON records")]
struct Args {
    /// Filter configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Records to read, one JSON object per line [default: stdin]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Only compile the configuration and print a summary
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = FilterConfig::from_path(&args.config)?;
    let schema = config
        .compile()
        .with_context(|| format!("Invalid filter configuration '{}'", args.config.display()))?;

    if args.check {
        println!("✓ Configuration compiled");
        println!("  Columns: {}", config.columns.len());
        println!("  Add columns: {}", config.add_columns.len());
        println!("  Drop columns: {}", config.drop_columns.len());
        println!("  Visited paths: {}", schema.visit_path_count());
        if schema.has_drop_columns() && !config.columns.is_empty() {
            println!("  Note: drop_columns is set, so columns only selects flat fields");
        }
        return Ok(());
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open input '{}'", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());
    let visitor = schema.visitor();

    for (i, line) in reader.lines().enumerate() {
        let number = i + 1;
        let line = line.with_context(|| format!("Failed to read record {}", number))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(&line)
            .with_context(|| format!("Record {} is not valid JSON", number))?;
        let Value::Object(record) = record else {
            bail!("Record {} is not a JSON object", number);
        };

        serde_json::to_writer(&mut out, &visitor.rewrite_record(record))?;
        out.write_all(b"\n")?;
    }

    out.flush()?;
    Ok(())
}
